//! Errors produced while lexing, parsing and validating

use std::fmt;
use thiserror::Error;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownDirective,
    NotAllowedHere,
    InvalidArguments,
    InvalidFlag,
    UnbalancedBraces,
    Unterminated,
    ScriptBlock,
    IncludeNotFound,
    IncludeGlob,
    IncludeCycle,
    Io,
}

impl ErrorKind {
    /// Errors after which no reliable token stream exists for the file
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::UnbalancedBraces
                | ErrorKind::Unterminated
                | ErrorKind::ScriptBlock
                | ErrorKind::Io
        )
    }
}

/// A located configuration error
///
/// Renders as `<file>:<line> <reason>`, or `<file> <reason>` when no line
/// is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConfigError {
    pub kind: ErrorKind,
    pub reason: String,
    pub file: String,
    pub line: Option<usize>,
}

impl ConfigError {
    pub fn new(kind: ErrorKind, reason: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            reason: reason.into(),
            file: file.into(),
            line: Some(line),
        }
    }

    /// Error with no usable line number (the file itself could not be read)
    pub fn unlocated(kind: ErrorKind, reason: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            file: file.into(),
            line: None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{} {}", self.file, line, self.reason),
            None => write!(f, "{} {}", self.file, self.reason),
        }
    }
}

impl From<ConfigError> for ngxclair_core::Error {
    fn from(err: ConfigError) -> Self {
        ngxclair_core::Error::Config(err.to_string())
    }
}
