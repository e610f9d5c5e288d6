//! File digests computed without buffering whole files in memory.
//!
//! Large files are memory-mapped, small ones are streamed through a fixed
//! buffer. Either way every requested hasher sees the same bytes in a single
//! pass, so [`DigestEngine::digest_all`] costs one read of the file.

use crate::algorithm::Algorithm;
use crate::error::{HashsumError, Result};
use digest::DynDigest;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const DEFAULT_MMAP_THRESHOLD: u64 = 1 << 20;
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStrategy {
    /// Map files at or above the threshold, stream the rest.
    #[default]
    Auto,
    Mmap,
    Stream,
}

#[derive(Clone, Debug)]
pub struct DigestEngine {
    strategy: ReadStrategy,
    mmap_threshold: u64,
    buffer_size: usize,
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self {
            strategy: ReadStrategy::Auto,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl DigestEngine {
    pub fn new(strategy: ReadStrategy, mmap_threshold: u64, buffer_size: usize) -> Self {
        Self { strategy, mmap_threshold, buffer_size: buffer_size.max(1) }
    }

    /// Lower-case hex digest of the file at `path`.
    pub fn digest(&self, path: &Path, algorithm: Algorithm) -> Result<String> {
        let mut out = self.digest_many(path, &[algorithm])?;
        Ok(out.remove(0).1)
    }

    /// Every supported digest of one file, in [`Algorithm::ALL`] order.
    pub fn digest_all(&self, path: &Path) -> Result<Vec<(Algorithm, String)>> {
        self.digest_many(path, &Algorithm::ALL)
    }

    /// Digests for each of `algorithms`, computed in one pass over the file.
    pub fn digest_many(
        &self,
        path: &Path,
        algorithms: &[Algorithm],
    ) -> Result<Vec<(Algorithm, String)>> {
        let mut hashers: Vec<Box<dyn DynDigest>> =
            algorithms.iter().map(|a| a.hasher()).collect();
        self.feed(path, &mut hashers)?;
        Ok(algorithms
            .iter()
            .zip(hashers)
            .map(|(algo, h)| (*algo, hex::encode(h.finalize())))
            .collect())
    }

    fn feed(&self, path: &Path, hashers: &mut [Box<dyn DynDigest>]) -> Result<()> {
        let f = File::open(path).map_err(|e| HashsumError::io(path, e))?;
        let meta = f.metadata().map_err(|e| HashsumError::io(path, e))?;
        if meta.is_dir() {
            return Err(HashsumError::io(path, io::Error::other("is a directory")));
        }
        let len = meta.len();
        let use_mmap = match self.strategy {
            ReadStrategy::Mmap => true,
            ReadStrategy::Stream => false,
            ReadStrategy::Auto => len >= self.mmap_threshold,
        };
        tracing::debug!(path = %path.display(), bytes = len, mmap = use_mmap, "digest");

        if use_mmap {
            if len == 0 {
                return Ok(());
            }
            // Read-only map; the file must not be truncated while it is mapped.
            let map = unsafe { Mmap::map(&f) }.map_err(|e| HashsumError::io(path, e))?;
            for h in hashers.iter_mut() {
                h.update(&map);
            }
            return Ok(());
        }

        let mut reader = f;
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashsumError::io(path, e)),
            };
            for h in hashers.iter_mut() {
                h.update(&buf[..n]);
            }
        }
        Ok(())
    }
}
