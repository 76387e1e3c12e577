//! Error types for the PII redaction library.
//!
//! Errors are split by who is at fault: the caller's input (validation),
//! the deployment (configuration), or a detector collaborator (detection).
//! Malformed detector spans are not errors at all; see
//! [`DropReason`](crate::redaction::DropReason).

use crate::detector::DetectionError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for redaction operations.
pub type AnonifyResult<T> = Result<T, AnonifyError>;

/// Coarse classification of an [`AnonifyError`].
///
/// An outer layer (HTTP handler, CLI) maps kinds to its own status codes
/// without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input text failed a pre-redaction policy check.
    Validation,
    /// The pipeline or an engine was set up incorrectly.
    Configuration,
    /// A detector failed while scanning the text.
    Detection,
    /// Anything else (I/O, serialization).
    Internal,
}

impl ErrorKind {
    /// HTTP status code an API layer should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Configuration => 500,
            ErrorKind::Detection => 502,
            ErrorKind::Internal => 500,
        }
    }

    /// Process exit code used by the command-line tool.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Validation => 3,
            ErrorKind::Detection => 4,
            ErrorKind::Internal => 5,
        }
    }
}

/// Error type for all redaction operations.
#[derive(Debug)]
pub enum AnonifyError {
    /// A detector failed; the stage that owned it is named by `method`.
    Detection {
        method: String,
        source: DetectionError,
    },

    /// Input text was rejected before any detector ran.
    Validation { validator: String, message: String },

    /// No validators/engines configured, or an engine setting is invalid.
    Configuration { parameter: String, reason: String },

    /// Regex compilation failed or a rule label is unusable.
    PatternError { pattern: String, reason: String },

    /// Error occurred while reading or writing files
    Io { path: PathBuf, source: io::Error },

    /// JSON encoding or decoding failed
    Serialization { source: serde_json::Error },
}

impl AnonifyError {
    /// Shorthand for a configuration error.
    pub fn configuration(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns the kind used to pick status and exit codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Detection { .. } => ErrorKind::Detection,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Configuration { .. } | Self::PatternError { .. } => ErrorKind::Configuration,
            Self::Io { .. } | Self::Serialization { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true when the caller's input, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl fmt::Display for AnonifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detection { method, source } => {
                write!(f, "Detection failed in stage '{}': {}", method, source)
            }
            Self::Validation { message, .. } => {
                write!(f, "Validation error: {}", message)
            }
            Self::Configuration { parameter, reason } => {
                write!(f, "Configuration error for '{}': {}", parameter, reason)
            }
            Self::PatternError { pattern, reason } => {
                write!(f, "Pattern error for '{}': {}", pattern, reason)
            }
            Self::Io { path, source } => {
                write!(f, "IO error for path '{}': {}", path.display(), source)
            }
            Self::Serialization { source } => {
                write!(f, "Serialization error: {}", source)
            }
        }
    }
}

impl std::error::Error for AnonifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Detection { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Serialization { source } => Some(source),
            _ => None,
        }
    }
}

impl From<regex::Error> for AnonifyError {
    fn from(err: regex::Error) -> Self {
        Self::PatternError {
            pattern: "<unknown>".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AnonifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { source: err }
    }
}
