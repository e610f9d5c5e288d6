pub mod algorithm;
pub mod config;
pub mod create;
pub mod digest;
pub mod error;
pub mod job;
pub mod manifest;
pub mod ops;
pub mod path_safety;
pub mod verify;

pub use algorithm::Algorithm;
pub use config::EngineConfig;
pub use digest::{DigestEngine, ReadStrategy};
pub use error::{FormatIssue, HashsumError, Result};
pub use job::{CancelToken, Job};
pub use manifest::{ChecksumEntry, ChecksumManifest, InputMode, ParseMode};
pub use verify::{VerificationOutcome, VerificationReport, VerifiedEntry};
