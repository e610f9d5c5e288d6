//! Batch execution: a bounded worker pool, a base directory for entry paths,
//! and a cooperative cancellation token.

use crate::config::EngineConfig;
use crate::digest::DigestEngine;
use crate::error::{HashsumError, Result};
use crate::path_safety::{resolve_entry_path, PathPolicy};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancel flag. Checked between files, never in the middle of a digest.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct Job {
    engine: DigestEngine,
    pool: rayon::ThreadPool,
    base_dir: Option<PathBuf>,
    policy: PathPolicy,
    cancel: CancelToken,
}

impl Job {
    pub fn new(cfg: &EngineConfig) -> Result<Self> {
        let threads = cfg.worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hsum-worker-{i}"))
            .build()?;
        Ok(Self {
            engine: cfg.digest_engine(),
            pool,
            base_dir: None,
            policy: cfg.paths,
            cancel: CancelToken::new(),
        })
    }

    /// Relative entry paths are resolved against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn engine(&self) -> &DigestEngine {
        &self.engine
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub(crate) fn resolve(&self, entry: &str) -> Result<PathBuf> {
        resolve_entry_path(self.base_dir.as_deref(), entry, self.policy)
    }

    /// Run `f` over `0..n` on the pool. Results come back in index order
    /// whatever order the workers finished in. Items not yet started when the
    /// token fires yield `Cancelled`.
    pub(crate) fn run<T, F>(&self, n: usize, f: F) -> Vec<Result<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        self.pool.install(|| {
            (0..n)
                .into_par_iter()
                .map(|i| {
                    if self.cancel.is_cancelled() {
                        return Err(HashsumError::Cancelled);
                    }
                    f(i)
                })
                .collect()
        })
    }
}
