//! Domain models for PII detection.
//!
//! This module holds the values that flow between detectors and the
//! redaction engine: raw detector output, validated entity spans, and the
//! built-in regex rules for each PII category.

pub mod labels;
pub mod patterns;

pub use labels::normalize_label;
pub use patterns::{EmailPattern, Ipv4Pattern, Ipv6Pattern, RegexRule, UrlPattern};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default field carrying the category name in model output.
pub const DEFAULT_LABEL_KEY: &str = "entity_group";

/// Unvalidated entity as reported by a detector.
///
/// Offsets are signed and optional because detectors are untrusted: the
/// normalizer rejects anything missing or out of range. Every other field
/// (`entity_group`, `score`, `word`, ...) is kept in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub start: Option<i64>,

    #[serde(default)]
    pub end: Option<i64>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawEntity {
    /// Creates an entity with offsets and a label stored under `label_key`.
    pub fn new(start: i64, end: i64, label_key: &str, label: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(label_key.to_string(), Value::String(label.to_string()));
        Self {
            start: Some(start),
            end: Some(end),
            fields,
        }
    }

    /// Creates an entity using the default `entity_group` label field.
    pub fn labelled(start: i64, end: i64, label: &str) -> Self {
        Self::new(start, end, DEFAULT_LABEL_KEY, label)
    }

    /// Adds an extra field, e.g. a model confidence score.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Returns the label stored under `label_key`, if it is a string.
    pub fn label(&self, label_key: &str) -> Option<&str> {
        self.fields.get(label_key).and_then(Value::as_str)
    }
}

/// A validated PII occurrence.
///
/// `start..end` is a non-empty byte range on UTF-8 boundaries of the text the
/// span was normalized against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true if the two half-open ranges share at least one offset.
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A PII category recognised by a single regular expression.
pub trait PiiPattern: Send + Sync {
    /// Category name used in placeholders, e.g. `EMAIL`.
    fn label(&self) -> &str;

    fn pattern(&self) -> &Regex;

    fn extract_all<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.pattern().find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Returns the matches as spans over `text`, in order of appearance.
    fn find_spans(&self, text: &str) -> Vec<EntitySpan> {
        self.pattern()
            .find_iter(text)
            .map(|m| EntitySpan::new(m.start(), m.end(), self.label()))
            .collect()
    }
}

/// Returns true if `label` can appear inside a placeholder token.
///
/// Placeholders are only disjoint from the detectors' patterns while labels
/// stay in `[A-Z0-9_]`.
pub fn is_placeholder_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
