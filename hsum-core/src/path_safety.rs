use crate::error::{HashsumError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPolicy {
    /// Reject absolute paths, `..` and anything resolving outside the base.
    pub confine_to_base: bool,
    pub follow_symlinks: bool,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self { confine_to_base: false, follow_symlinks: true }
    }
}

fn unsafe_path(entry: &str, reason: impl Into<String>) -> HashsumError {
    HashsumError::UnsafePath { path: entry.to_string(), reason: reason.into() }
}

/// Resolve a manifest entry path against `base` (the manifest's directory).
///
/// Absolute entries are used as-is unless the policy confines paths to the
/// base. With `follow_symlinks` off, the entry and every component below the
/// base are checked for symlinks. A path that does not exist is returned
/// unchanged so the read reports the real I/O error.
pub fn resolve_entry_path(base: Option<&Path>, entry: &str, policy: PathPolicy) -> Result<PathBuf> {
    let rel = Path::new(entry);
    if policy.confine_to_base {
        if rel.is_absolute() || rel.has_root() {
            return Err(unsafe_path(entry, "absolute paths are not allowed"));
        }
        if rel.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(unsafe_path(entry, "parent traversal not allowed"));
        }
    }
    let candidate = match base {
        Some(b) if !rel.is_absolute() => b.join(rel),
        _ => rel.to_path_buf(),
    };

    if !policy.follow_symlinks {
        let mut checks = vec![candidate.clone()];
        if let (Some(b), false) = (base, rel.is_absolute()) {
            let mut cur = b.to_path_buf();
            for comp in rel.components() {
                cur = cur.join(comp);
                checks.push(cur.clone());
            }
        }
        for p in checks {
            if let Ok(m) = std::fs::symlink_metadata(&p) {
                if m.file_type().is_symlink() {
                    return Err(unsafe_path(entry, format!("symlink in path {:?}", p)));
                }
            }
        }
        return Ok(candidate);
    }

    if policy.confine_to_base {
        if let Some(b) = base {
            let (Ok(base_can), Ok(cand_can)) =
                (std::fs::canonicalize(b), std::fs::canonicalize(&candidate))
            else {
                return Ok(candidate);
            };
            if !cand_can.starts_with(&base_can) {
                return Err(unsafe_path(entry, "path escapes base directory"));
            }
            return Ok(cand_can);
        }
    }
    Ok(candidate)
}
