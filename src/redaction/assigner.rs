//! Placeholder numbering.
//!
//! Each label has its own counter. Counters advance in the order spans are
//! given, which the resolver guarantees to be reading order, so the first
//! email in the text is always `EMAIL_1` no matter which detector found it
//! first.

use crate::domain::EntitySpan;
use std::collections::BTreeMap;

/// Key used in `replaced_values`, e.g. `EMAIL_1`.
pub fn placeholder_key(label: &str, index: usize) -> String {
    format!("{}_{}", label, index)
}

/// Token written into the text, e.g. `[EMAIL_1]`.
pub fn placeholder_token(key: &str) -> String {
    format!("[{}]", key)
}

/// One span to replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderAssignment {
    pub start: usize,
    pub end: usize,
    pub key: String,
    pub token: String,
}

/// Next counter value per label.
///
/// Threaded by value through successive passes so numbering can continue
/// across several patterns or detectors of the same stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCounters {
    start_at: usize,
    next: BTreeMap<String, usize>,
}

impl LabelCounters {
    pub fn new(start_at: usize) -> Self {
        Self {
            start_at,
            next: BTreeMap::new(),
        }
    }

    /// Returns the counter for `label` and advances it.
    fn take(&mut self, label: &str) -> usize {
        let next = self.next.entry(label.to_string()).or_insert(self.start_at);
        let current = *next;
        *next += 1;
        current
    }

    /// Number of placeholders issued per label. Labels never seen are absent.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.next
            .iter()
            .map(|(label, next)| (label.clone(), next - self.start_at))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Default for LabelCounters {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Output of [`PlaceholderAssigner::assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assigned {
    pub assignments: Vec<PlaceholderAssignment>,
    /// Placeholder key to original substring.
    pub replaced_values: BTreeMap<String, String>,
    pub counters: LabelCounters,
}

impl Assigned {
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.counters.counts()
    }
}

#[derive(Debug, Clone)]
pub struct PlaceholderAssigner {
    start_at: usize,
}

impl PlaceholderAssigner {
    pub fn new(start_at: usize) -> Self {
        Self { start_at }
    }

    pub fn start_at(&self) -> usize {
        self.start_at
    }

    /// Numbers `spans` with fresh counters.
    ///
    /// `spans` must be non-overlapping, in left-to-right order, and index
    /// into `text`.
    pub fn assign(&self, text: &str, spans: &[EntitySpan]) -> Assigned {
        self.assign_with(text, spans, LabelCounters::new(self.start_at))
    }

    /// Numbers `spans` continuing from `counters`.
    pub fn assign_with(&self, text: &str, spans: &[EntitySpan], counters: LabelCounters) -> Assigned {
        let initial = Assigned {
            assignments: Vec::with_capacity(spans.len()),
            replaced_values: BTreeMap::new(),
            counters,
        };

        spans.iter().fold(initial, |mut acc, span| {
            let index = acc.counters.take(&span.label);
            let key = placeholder_key(&span.label, index);
            acc.replaced_values
                .insert(key.clone(), text[span.start..span.end].to_string());
            acc.assignments.push(PlaceholderAssignment {
                start: span.start,
                end: span.end,
                token: placeholder_token(&key),
                key,
            });
            acc
        })
    }
}

impl Default for PlaceholderAssigner {
    fn default() -> Self {
        Self::new(1)
    }
}
