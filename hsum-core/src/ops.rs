//! Entry points for a host application (file manager, CLI): create a manifest
//! from selected files, verify a manifest file.

use crate::algorithm::Algorithm;
use crate::config::EngineConfig;
use crate::create::create;
use crate::error::Result;
use crate::job::{CancelToken, Job};
use crate::manifest::{ChecksumManifest, InputMode};
use crate::verify::{verify, VerificationReport};
use std::path::Path;

/// Manifest bytes for `paths`, using the configured algorithm and mode.
/// Relative paths are read from the current directory and stored verbatim.
pub fn create_manifest<P: AsRef<str> + Sync>(paths: &[P], cfg: &EngineConfig) -> Result<Vec<u8>> {
    let job = Job::new(cfg)?;
    create_manifest_with(paths, cfg.algorithm, cfg.input_mode, &job)
}

pub fn create_manifest_with<P: AsRef<str> + Sync>(
    paths: &[P],
    algorithm: Algorithm,
    mode: InputMode,
    job: &Job,
) -> Result<Vec<u8>> {
    let manifest = create(paths, algorithm, mode, job)?;
    Ok(manifest.to_text().into_bytes())
}

/// Verify a manifest file, inferring the algorithm from its name. Entry paths
/// are resolved against the manifest's directory.
pub fn verify_manifest(manifest_path: &Path, cfg: &EngineConfig) -> Result<VerificationReport> {
    verify_manifest_with(manifest_path, None, cfg, None)
}

pub fn verify_manifest_with(
    manifest_path: &Path,
    algorithm: Option<Algorithm>,
    cfg: &EngineConfig,
    cancel: Option<CancelToken>,
) -> Result<VerificationReport> {
    let manifest = ChecksumManifest::read(manifest_path, algorithm, cfg.parse_mode)?;
    tracing::debug!(
        manifest = %manifest_path.display(),
        entries = manifest.len(),
        algorithm = %manifest.algorithm(),
        "verifying"
    );
    let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
    let mut job = Job::new(cfg)?.with_base_dir(base);
    if let Some(token) = cancel {
        job = job.with_cancel(token);
    }
    verify(&manifest, &job)
}
