//! Plain-text checksum manifests: `<digest> <marker><path>` per line.
//!
//! The marker is `*` for binary mode and a space for text mode. Only the first
//! space on a line is a delimiter, so paths may contain spaces freely.

use crate::algorithm::Algorithm;
use crate::error::{FormatIssue, HashsumError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Binary,
    Text,
}

impl InputMode {
    pub fn marker(self) -> char {
        match self {
            InputMode::Binary => '*',
            InputMode::Text => ' ',
        }
    }

    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '*' => Some(InputMode::Binary),
            ' ' => Some(InputMode::Text),
            _ => None,
        }
    }
}

/// What to do with a line that does not fit the grammar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Fail on the first malformed line.
    #[default]
    Strict,
    /// Log and skip malformed lines.
    Lenient,
}

/// One manifest record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChecksumEntry {
    digest: String,
    mode: InputMode,
    path: String,
}

impl ChecksumEntry {
    pub fn new(digest: impl Into<String>, mode: InputMode, path: impl Into<String>) -> Result<Self> {
        let digest = digest.into();
        let path = path.into();
        if let Some(issue) = digest_issue(&digest, None) {
            return Err(HashsumError::InvalidEntry(format!("{issue} in '{digest}'")));
        }
        if path.is_empty() {
            return Err(HashsumError::InvalidEntry("empty path".into()));
        }
        if path.contains(|c| c == '\n' || c == '\r') {
            return Err(HashsumError::InvalidEntry(format!("line break in path {path:?}")));
        }
        Ok(Self { digest, mode, path })
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Case-insensitive comparison against a computed digest.
    pub fn matches(&self, observed: &str) -> bool {
        self.digest.eq_ignore_ascii_case(observed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChecksumManifest {
    algorithm: Algorithm,
    entries: Vec<ChecksumEntry>,
}

impl ChecksumManifest {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm, entries: Vec::new() }
    }

    /// Build a manifest from existing entries, checking digest lengths.
    pub fn from_entries(algorithm: Algorithm, entries: Vec<ChecksumEntry>) -> Result<Self> {
        let mut m = Self::new(algorithm);
        for e in entries {
            m.push(e)?;
        }
        Ok(m)
    }

    pub fn push(&mut self, entry: ChecksumEntry) -> Result<()> {
        if entry.digest.len() != self.algorithm.hex_len() {
            return Err(HashsumError::InvalidEntry(format!(
                "{} digest for '{}' has {} hex chars, expected {}",
                self.algorithm,
                entry.path,
                entry.digest.len(),
                self.algorithm.hex_len()
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn entries(&self) -> &[ChecksumEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_text(&self) -> String {
        serialize(self)
    }

    /// Read a manifest file. Without an explicit algorithm it is inferred
    /// from the file name.
    pub fn read(path: &Path, algorithm: Option<Algorithm>, mode: ParseMode) -> Result<Self> {
        let algorithm = match algorithm {
            Some(a) => a,
            None => Algorithm::infer_from_path(path)?,
        };
        let text = fs::read_to_string(path).map_err(|e| HashsumError::io(path, e))?;
        parse_with(&text, algorithm, mode)
    }
}

/// Strict parse: any malformed line is an error.
pub fn parse(text: &str, algorithm: Algorithm) -> Result<ChecksumManifest> {
    parse_with(text, algorithm, ParseMode::Strict)
}

pub fn parse_with(text: &str, algorithm: Algorithm, mode: ParseMode) -> Result<ChecksumManifest> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let used = lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);

    let mut manifest = ChecksumManifest::new(algorithm);
    for (i, line) in lines[..used].iter().enumerate() {
        let lineno = i + 1;
        match parse_line(line, algorithm) {
            Ok(entry) => manifest.entries.push(entry),
            Err(issue) => match mode {
                ParseMode::Strict => return Err(HashsumError::format(lineno, issue)),
                ParseMode::Lenient => {
                    tracing::warn!(line = lineno, %issue, "skipping malformed manifest line");
                }
            },
        }
    }
    Ok(manifest)
}

fn parse_line(line: &str, algorithm: Algorithm) -> std::result::Result<ChecksumEntry, FormatIssue> {
    if line.is_empty() {
        return Err(FormatIssue::BlankLine);
    }
    let (digest, meta) = line.split_once(' ').ok_or(FormatIssue::MissingSeparator)?;
    let marker = meta.chars().next().ok_or(FormatIssue::MissingMarker)?;
    let mode = InputMode::from_marker(marker).ok_or(FormatIssue::BadMarker(marker))?;
    if let Some(issue) = digest_issue(digest, Some(algorithm.hex_len())) {
        return Err(issue);
    }
    let path = &meta[marker.len_utf8()..];
    if path.is_empty() {
        return Err(FormatIssue::EmptyPath);
    }
    Ok(ChecksumEntry { digest: digest.to_string(), mode, path: path.to_string() })
}

fn digest_issue(digest: &str, expected_len: Option<usize>) -> Option<FormatIssue> {
    if digest.is_empty() {
        return Some(FormatIssue::EmptyDigest);
    }
    if !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Some(FormatIssue::NonHexDigest);
    }
    match expected_len {
        Some(expected) if digest.len() != expected => {
            Some(FormatIssue::DigestLength { expected, found: digest.len() })
        }
        _ => None,
    }
}

/// Render a manifest; `parse` on the result yields an equal manifest.
pub fn serialize(manifest: &ChecksumManifest) -> String {
    let mut out = String::new();
    for e in &manifest.entries {
        out.push_str(&e.digest);
        out.push(' ');
        out.push(e.mode.marker());
        out.push_str(&e.path);
        out.push_str(LINE_ENDING);
    }
    out
}
