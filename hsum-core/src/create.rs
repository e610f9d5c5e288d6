use crate::algorithm::Algorithm;
use crate::error::{HashsumError, Result};
use crate::job::Job;
use crate::manifest::{ChecksumEntry, ChecksumManifest, InputMode};
use std::sync::atomic::{AtomicBool, Ordering};

/// Digest every path and build a manifest in input order.
///
/// Paths are stored exactly as given and read relative to the job's base
/// directory. Creation is fail-fast: once one file fails, files not yet
/// started are skipped, and the error returned is the failure with the lowest
/// input index. No partial manifest is produced.
pub fn create<P: AsRef<str> + Sync>(
    paths: &[P],
    algorithm: Algorithm,
    mode: InputMode,
    job: &Job,
) -> Result<ChecksumManifest> {
    let failed = AtomicBool::new(false);
    let results = job.run(paths.len(), |i| {
        if failed.load(Ordering::Relaxed) {
            return Ok(None);
        }
        let entry_path = paths[i].as_ref();
        let digest = job
            .resolve(entry_path)
            .and_then(|fs_path| job.engine().digest(&fs_path, algorithm))
            .and_then(|d| ChecksumEntry::new(d, mode, entry_path));
        match digest {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                failed.store(true, Ordering::Relaxed);
                Err(e)
            }
        }
    });

    if job.cancel_token().is_cancelled() {
        return Err(HashsumError::Cancelled);
    }

    let mut manifest = ChecksumManifest::new(algorithm);
    let mut first_err = None;
    for r in results {
        match r {
            Ok(Some(entry)) if first_err.is_none() => manifest.push(entry)?,
            Ok(_) => {}
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_err {
        tracing::warn!(error = %e, "manifest creation failed");
        return Err(e);
    }
    tracing::info!(files = manifest.len(), algorithm = %algorithm, "manifest created");
    Ok(manifest)
}
