use crate::algorithm::Algorithm;
use crate::digest::{DigestEngine, ReadStrategy, DEFAULT_BUFFER_SIZE, DEFAULT_MMAP_THRESHOLD};
use crate::error::{HashsumError, Result};
use crate::manifest::{InputMode, ParseMode};
use crate::path_safety::PathPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine settings, usually loaded from a TOML file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Algorithm for new manifests when nothing else decides.
    pub algorithm: Algorithm,
    pub input_mode: InputMode,
    /// Worker threads for batch hashing; 0 = available parallelism.
    pub concurrency: usize,
    pub read_strategy: ReadStrategy,
    /// Files at or above this size are memory-mapped under `read_strategy = "auto"`.
    pub mmap_threshold: u64,
    pub buffer_size: usize,
    pub parse_mode: ParseMode,
    pub paths: PathPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256,
            input_mode: InputMode::Binary,
            concurrency: 0,
            read_strategy: ReadStrategy::Auto,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
            buffer_size: DEFAULT_BUFFER_SIZE,
            parse_mode: ParseMode::Strict,
            paths: PathPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| HashsumError::io(path, e))?;
        let cfg: EngineConfig = toml::from_str(&data)
            .map_err(|source| HashsumError::Config { path: path.to_path_buf(), source })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn digest_engine(&self) -> DigestEngine {
        DigestEngine::new(self.read_strategy, self.mmap_threshold, self.buffer_size)
    }

    /// Thread count after resolving `concurrency = 0`.
    pub fn worker_threads(&self) -> usize {
        if self.concurrency > 0 {
            return self.concurrency;
        }
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }
}
