//! Test fixtures: mock detectors.

use anonify::{DetectionError, Detector, RawEntity};

/// Detector returning a fixed list of entities in a chosen order.
pub struct MockDetector {
    name: String,
    entities: Vec<RawEntity>,
}

impl MockDetector {
    pub fn new(entities: Vec<RawEntity>) -> Self {
        Self {
            name: "mock".to_string(),
            entities,
        }
    }

    /// Builds entities for each `(needle, label)` found in `text`, by byte offset.
    pub fn finding(text: &str, needles: &[(&str, &str)]) -> Self {
        let entities = needles
            .iter()
            .map(|(needle, label)| {
                let start = text
                    .find(needle)
                    .unwrap_or_else(|| panic!("'{}' not in text", needle));
                RawEntity::labelled(start as i64, (start + needle.len()) as i64, label)
            })
            .collect();
        Self::new(entities)
    }

    /// Reverses the emission order.
    pub fn reversed(mut self) -> Self {
        self.entities.reverse();
        self
    }

    /// Rotates the emission order left by `n`.
    pub fn rotated(mut self, n: usize) -> Self {
        if !self.entities.is_empty() {
            let n = n % self.entities.len();
            self.entities.rotate_left(n);
        }
        self
    }
}

impl Detector for MockDetector {
    fn detect(&self, _text: &str) -> Result<Vec<RawEntity>, DetectionError> {
        Ok(self.entities.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Detector that always fails, standing in for an unreachable model.
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _text: &str) -> Result<Vec<RawEntity>, DetectionError> {
        Err(DetectionError::Backend {
            detector: "failing".to_string(),
            message: "model endpoint unreachable".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}
