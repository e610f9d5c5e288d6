use crate::algorithm::Algorithm;
use crate::error::{HashsumError, Result};
use crate::job::Job;
use crate::manifest::{ChecksumEntry, ChecksumManifest};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Matched,
    Mismatched { observed: String },
    Unreadable { reason: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct VerifiedEntry {
    pub entry: ChecksumEntry,
    pub outcome: VerificationOutcome,
}

/// One outcome per manifest entry, in manifest order.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationReport {
    pub algorithm: Algorithm,
    pub results: Vec<VerifiedEntry>,
}

impl VerificationReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    fn count(&self, pred: impl Fn(&VerificationOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn matched(&self) -> usize {
        self.count(|o| matches!(o, VerificationOutcome::Matched))
    }

    pub fn mismatched(&self) -> usize {
        self.count(|o| matches!(o, VerificationOutcome::Mismatched { .. }))
    }

    pub fn unreadable(&self) -> usize {
        self.count(|o| matches!(o, VerificationOutcome::Unreadable { .. }))
    }

    /// True when every entry matched.
    pub fn is_ok(&self) -> bool {
        self.matched() == self.len()
    }
}

/// Re-hash every entry and classify it. Per-file failures become
/// `Unreadable` outcomes; the only error is cancellation.
pub fn verify(manifest: &ChecksumManifest, job: &Job) -> Result<VerificationReport> {
    let algorithm = manifest.algorithm();
    let entries = manifest.entries();
    let outcomes = job.run(entries.len(), |i| Ok(check_entry(&entries[i], algorithm, job)));

    let mut results = Vec::with_capacity(entries.len());
    for (entry, outcome) in entries.iter().zip(outcomes) {
        results.push(VerifiedEntry { entry: entry.clone(), outcome: outcome? });
    }
    if job.cancel_token().is_cancelled() {
        return Err(HashsumError::Cancelled);
    }

    let report = VerificationReport { algorithm, results };
    tracing::info!(
        total = report.len(),
        matched = report.matched(),
        mismatched = report.mismatched(),
        unreadable = report.unreadable(),
        "verification finished"
    );
    Ok(report)
}

fn check_entry(entry: &ChecksumEntry, algorithm: Algorithm, job: &Job) -> VerificationOutcome {
    let observed = job
        .resolve(entry.path())
        .and_then(|p| job.engine().digest(&p, algorithm));
    match observed {
        Ok(d) if entry.matches(&d) => VerificationOutcome::Matched,
        Ok(d) => {
            tracing::debug!(path = entry.path(), expected = entry.digest(), observed = %d, "mismatch");
            VerificationOutcome::Mismatched { observed: d }
        }
        Err(e) => {
            tracing::warn!(path = entry.path(), error = %e, "unreadable");
            VerificationOutcome::Unreadable { reason: e.to_string() }
        }
    }
}
