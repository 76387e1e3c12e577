//! Regex rules exposed as a span detector.

use super::{DetectionError, Detector};
use crate::domain::patterns::default_patterns;
use crate::domain::{PiiPattern, RawEntity, DEFAULT_LABEL_KEY};

/// Runs every rule against the same input text and reports all matches.
///
/// Unlike the sequential regex engine, matches of different rules may
/// overlap here; the span engine's resolver decides between them.
pub struct PatternDetector {
    patterns: Vec<Box<dyn PiiPattern>>,
}

impl PatternDetector {
    pub fn new(patterns: Vec<Box<dyn PiiPattern>>) -> Self {
        Self { patterns }
    }

    /// Adds a rule after the existing ones.
    pub fn with_pattern(mut self, pattern: impl PiiPattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(default_patterns())
    }
}

impl Detector for PatternDetector {
    fn detect(&self, text: &str) -> Result<Vec<RawEntity>, DetectionError> {
        Ok(self
            .patterns
            .iter()
            .flat_map(|p| p.find_spans(text))
            .map(|span| RawEntity::labelled(span.start as i64, span.end as i64, &span.label))
            .collect())
    }

    fn name(&self) -> &str {
        "pattern"
    }

    fn label_key(&self) -> &str {
        DEFAULT_LABEL_KEY
    }
}
