//! Detector collaborators.
//!
//! A detector turns text into candidate entities. The redaction engine only
//! sees the [`Detector`] trait, so regex rules, an external NER model and
//! precomputed entities are interchangeable.

pub mod external;
pub mod pattern;

pub use external::{CommandDetector, StaticDetector};
pub use pattern::PatternDetector;

use crate::domain::{RawEntity, DEFAULT_LABEL_KEY};
use thiserror::Error;

/// Failure inside a detector.
///
/// An empty result is never an error; these variants mean the detector could
/// not produce an answer at all.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("{detector}: {message}")]
    Backend { detector: String, message: String },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("could not decode entities from {detector}: {source}")]
    Decode {
        detector: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of candidate PII spans.
///
/// Implementations must return a finite list and must be safe to share
/// between threads; any loaded model or compiled pattern is read-only after
/// construction.
pub trait Detector: Send + Sync {
    /// Scans `text` and returns unvalidated entities.
    fn detect(&self, text: &str) -> Result<Vec<RawEntity>, DetectionError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Field of each entity that holds its category.
    fn label_key(&self) -> &str {
        DEFAULT_LABEL_KEY
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&self, text: &str) -> Result<Vec<RawEntity>, DetectionError> {
        (**self).detect(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn label_key(&self) -> &str {
        (**self).label_key()
    }
}
