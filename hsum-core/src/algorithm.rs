use crate::error::HashsumError;
use digest::DynDigest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Hash algorithms a manifest can be written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Md5,
    Sha256,
    Sha512,
    Blake2b,
    Blake2s,
}

/// Manifest extensions that identify their algorithm. SHA-512 has no entry.
const INFERENCE_TABLE: &[(&str, Algorithm)] = &[
    ("md5", Algorithm::Md5),
    ("sha256", Algorithm::Sha256),
    ("blake2b", Algorithm::Blake2b),
    ("blake2s", Algorithm::Blake2s),
];

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Md5,
        Algorithm::Sha256,
        Algorithm::Sha512,
        Algorithm::Blake2b,
        Algorithm::Blake2s,
    ];

    /// Lower-case symbolic name, as used in config files and CLI flags.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
            Algorithm::Blake2b => "blake2b",
            Algorithm::Blake2s => "blake2s",
        }
    }

    /// Extension given to newly written manifests.
    pub fn extension(self) -> &'static str {
        self.name()
    }

    /// Length of a digest in hex characters.
    pub fn hex_len(self) -> usize {
        match self {
            Algorithm::Md5 => 32,
            Algorithm::Sha256 | Algorithm::Blake2s => 64,
            Algorithm::Sha512 | Algorithm::Blake2b => 128,
        }
    }

    /// Fresh streaming hasher for this algorithm.
    pub fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            Algorithm::Md5 => Box::<md5::Md5>::default(),
            Algorithm::Sha256 => Box::<sha2::Sha256>::default(),
            Algorithm::Sha512 => Box::<sha2::Sha512>::default(),
            Algorithm::Blake2b => Box::<blake2::Blake2b512>::default(),
            Algorithm::Blake2s => Box::<blake2::Blake2s256>::default(),
        }
    }

    /// Infer the algorithm from a manifest file name such as `sums.sha256`
    /// or `sums.sha256.txt`. A single trailing `.txt` is ignored.
    pub fn infer_from_extension(filename: &str) -> Option<Algorithm> {
        let stem = filename.strip_suffix(".txt").unwrap_or(filename);
        let ext = Path::new(stem).extension()?.to_str()?;
        INFERENCE_TABLE
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, algo)| *algo)
    }

    /// Like [`Algorithm::infer_from_extension`] but reports failure as an error.
    pub fn infer_from_path(path: &Path) -> Result<Algorithm, HashsumError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::infer_from_extension(&name).ok_or(HashsumError::AlgorithmInference { name })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::Blake2b => "BLAKE2b",
            Algorithm::Blake2s => "BLAKE2s",
        })
    }
}

impl FromStr for Algorithm {
    type Err = HashsumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_ascii_lowercase().replace('-', "");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == folded)
            .ok_or_else(|| HashsumError::UnknownAlgorithm(s.to_string()))
    }
}
