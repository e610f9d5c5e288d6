use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a manifest line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatIssue {
    /// No space separates the digest from the rest of the line.
    MissingSeparator,
    /// The character after the first space is neither `*` nor a space.
    BadMarker(char),
    /// Nothing follows the separator.
    MissingMarker,
    EmptyDigest,
    NonHexDigest,
    DigestLength { expected: usize, found: usize },
    EmptyPath,
    BlankLine,
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatIssue::MissingSeparator => write!(f, "no space between digest and path"),
            FormatIssue::BadMarker(c) => write!(f, "unrecognized mode marker {c:?}"),
            FormatIssue::MissingMarker => write!(f, "missing mode marker"),
            FormatIssue::EmptyDigest => write!(f, "empty digest"),
            FormatIssue::NonHexDigest => write!(f, "digest is not hexadecimal"),
            FormatIssue::DigestLength { expected, found } => {
                write!(f, "digest has {found} hex chars, expected {expected}")
            }
            FormatIssue::EmptyPath => write!(f, "empty path"),
            FormatIssue::BlankLine => write!(f, "blank line"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HashsumError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed manifest line {line}: {kind}")]
    Format { line: usize, kind: FormatIssue },

    #[error("cannot infer checksum algorithm from '{name}'")]
    AlgorithmInference { name: String },

    #[error("unknown checksum algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("invalid checksum entry: {0}")]
    InvalidEntry(String),

    #[error("unsafe path '{path}': {reason}")]
    UnsafePath { path: String, reason: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid config '{}': {source}", .path.display())]
    Config { path: PathBuf, source: toml::de::Error },

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl HashsumError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn format(line: usize, kind: FormatIssue) -> Self {
        Self::Format { line, kind }
    }
}

pub type Result<T> = std::result::Result<T, HashsumError>;
