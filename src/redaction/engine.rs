//! Redaction engines.
//!
//! An engine is one cleaning stage: it takes text and returns the redacted
//! text with its placeholder mapping and per-label counts. Two engines are
//! provided:
//!
//! - [`RegexEngine`] applies one pattern at a time, each on the previous
//!   pattern's output, numbering matches as it goes.
//! - [`SpanEngine`] asks one or more [`Detector`]s for spans and runs them
//!   through normalize → resolve → assign → rewrite.

use super::assigner::{LabelCounters, PlaceholderAssigner};
use super::normalizer::{NormalizerConfig, OffsetUnit, SpanNormalizer};
use super::resolver::resolve;
use super::output::{restore, restore_positions};
use super::rewriter::{rewrite_tracked, Placement};
use crate::detector::Detector;
use crate::domain::patterns::default_patterns;
use crate::domain::{EntitySpan, PiiPattern, RawEntity};
use crate::error::{AnonifyError, AnonifyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

/// Output of a single engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionResult {
    /// Identifier of the engine that produced this result.
    pub method: String,

    pub cleaned_text: String,

    /// Placeholder key (`EMAIL_1`) to the original substring.
    pub replaced_values: BTreeMap<String, String>,

    /// Label to number of placeholders issued.
    pub replaced_count: BTreeMap<String, usize>,

    /// Token positions of each rewrite pass that replaced anything, in the
    /// order the passes ran. The last entry indexes `cleaned_text`.
    #[serde(default)]
    pub placements: Vec<Vec<Placement>>,
}

impl RedactionResult {
    /// Returns true if anything was replaced.
    pub fn has_redactions(&self) -> bool {
        !self.replaced_values.is_empty()
    }

    /// Total number of placeholders across all labels.
    pub fn total_redacted(&self) -> usize {
        self.replaced_count.values().sum()
    }

    /// Rebuilds the input text by undoing each pass at its recorded
    /// positions, last pass first.
    pub fn restore(&self) -> String {
        if self.placements.is_empty() {
            return restore(&self.cleaned_text, &self.replaced_values);
        }
        restore_positions(&self.cleaned_text, &self.placements, &self.replaced_values)
            .unwrap_or_else(|| restore(&self.cleaned_text, &self.replaced_values))
    }
}

/// A cleaning stage.
///
/// `clean` must be pure for a given input and configuration; the two
/// projections rerun it rather than caching anything between calls.
pub trait RedactionEngine: Send + Sync {
    /// Identifier used to namespace this engine's keys in merged results.
    fn method(&self) -> &str;

    fn clean(&self, text: &str) -> AnonifyResult<RedactionResult>;

    fn replaced_values(&self, text: &str) -> AnonifyResult<BTreeMap<String, String>> {
        Ok(self.clean(text)?.replaced_values)
    }

    fn replaced_count(&self, text: &str) -> AnonifyResult<BTreeMap<String, usize>> {
        Ok(self.clean(text)?.replaced_count)
    }
}

/// Accumulator threaded through the passes of one stage.
struct StageState {
    text: String,
    counters: LabelCounters,
    replaced_values: BTreeMap<String, String>,
    placements: Vec<Vec<Placement>>,
}

impl StageState {
    fn new(text: &str, start_at: usize) -> Self {
        Self {
            text: text.to_string(),
            counters: LabelCounters::new(start_at),
            replaced_values: BTreeMap::new(),
            placements: Vec::new(),
        }
    }

    /// Numbers `spans` (resolved, over `self.text`) and rewrites the text.
    fn apply(self, assigner: &PlaceholderAssigner, spans: &[EntitySpan]) -> Self {
        if spans.is_empty() {
            return self;
        }
        let assigned = assigner.assign_with(&self.text, spans, self.counters);
        let (text, placements) = rewrite_tracked(&self.text, &assigned.assignments);
        let mut replaced_values = self.replaced_values;
        replaced_values.extend(assigned.replaced_values);
        let mut passes = self.placements;
        passes.push(placements);
        Self {
            text,
            counters: assigned.counters,
            replaced_values,
            placements: passes,
        }
    }

    fn into_result(self, method: &str) -> RedactionResult {
        RedactionResult {
            method: method.to_string(),
            replaced_count: self.counters.counts(),
            cleaned_text: self.text,
            replaced_values: self.replaced_values,
            placements: self.placements,
        }
    }
}

/// Sequential pattern substitution.
///
/// Patterns run in the order given. Counters are kept per label for the
/// whole stage, so two patterns sharing a label (IPv4 and IPv6 both report
/// `IP_ADDRESS`) never issue the same key.
pub struct RegexEngine {
    method: String,
    patterns: Vec<Box<dyn PiiPattern>>,
    assigner: PlaceholderAssigner,
}

impl RegexEngine {
    pub const METHOD: &'static str = "regex";

    pub fn new(patterns: Vec<Box<dyn PiiPattern>>) -> Self {
        Self {
            method: Self::METHOD.to_string(),
            patterns,
            assigner: PlaceholderAssigner::default(),
        }
    }

    /// Appends a pattern; it runs after all existing ones.
    pub fn with_pattern(mut self, pattern: impl PiiPattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_start_at(mut self, start_at: usize) -> Self {
        self.assigner = PlaceholderAssigner::new(start_at);
        self
    }

    /// Labels in application order.
    pub fn labels(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.label()).collect()
    }
}

impl Default for RegexEngine {
    /// URL, EMAIL, IP_ADDRESS (v4), IP_ADDRESS (v6).
    fn default() -> Self {
        Self::new(default_patterns())
    }
}

impl RedactionEngine for RegexEngine {
    fn method(&self) -> &str {
        &self.method
    }

    fn clean(&self, text: &str) -> AnonifyResult<RedactionResult> {
        if self.patterns.is_empty() {
            return Err(AnonifyError::configuration(
                "patterns",
                format!("regex engine '{}' has no patterns", self.method),
            ));
        }

        let state = self.patterns.iter().fold(
            StageState::new(text, self.assigner.start_at()),
            |state, pattern| {
                // A single regex never yields overlapping matches.
                let spans = pattern.find_spans(&state.text);
                if !spans.is_empty() {
                    debug!(label = pattern.label(), matches = spans.len(), "pattern matched");
                }
                state.apply(&self.assigner, &spans)
            },
        );

        Ok(state.into_result(&self.method))
    }
}

/// Detector-driven redaction with overlap resolution.
///
/// Detectors run in order; each sees the text as redacted by the ones before
/// it, and counters continue across them.
pub struct SpanEngine {
    method: String,
    detectors: Vec<Box<dyn Detector>>,
    normalizer: SpanNormalizer,
    assigner: PlaceholderAssigner,
}

impl SpanEngine {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            detectors: Vec::new(),
            normalizer: SpanNormalizer::default(),
            assigner: PlaceholderAssigner::default(),
        }
    }

    pub fn with_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn with_boxed_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn with_normalizer(mut self, config: NormalizerConfig) -> Self {
        self.normalizer = SpanNormalizer::new(config);
        self
    }

    pub fn with_trim_spans(self, trim_spans: bool) -> Self {
        let config = NormalizerConfig {
            trim_spans,
            ..self.normalizer.config().clone()
        };
        self.with_normalizer(config)
    }

    pub fn with_offset_unit(self, offset_unit: OffsetUnit) -> Self {
        let config = NormalizerConfig {
            offset_unit,
            ..self.normalizer.config().clone()
        };
        self.with_normalizer(config)
    }

    pub fn with_start_at(mut self, start_at: usize) -> Self {
        self.assigner = PlaceholderAssigner::new(start_at);
        self
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Redacts `text` using entities that were already detected.
    ///
    /// Malformed entities are dropped, never reported as errors.
    pub fn redact_entities(
        &self,
        text: &str,
        entities: &[RawEntity],
        label_key: &str,
    ) -> RedactionResult {
        let state = StageState::new(text, self.assigner.start_at());
        self.redact_pass(state, entities, label_key, &self.method)
            .into_result(&self.method)
    }

    fn redact_pass(
        &self,
        state: StageState,
        entities: &[RawEntity],
        label_key: &str,
        source: &str,
    ) -> StageState {
        let normalized = self.normalizer.normalize(&state.text, entities, label_key);
        for (index, reason) in &normalized.dropped {
            debug!(detector = source, index, %reason, "dropped entity");
        }
        if !normalized.dropped.is_empty() {
            warn!(
                method = %self.method,
                detector = source,
                dropped = normalized.dropped.len(),
                kept = normalized.spans.len(),
                "ignored malformed entities"
            );
        }

        let resolved = resolve(normalized.spans);
        state.apply(&self.assigner, &resolved)
    }
}

impl RedactionEngine for SpanEngine {
    fn method(&self) -> &str {
        &self.method
    }

    fn clean(&self, text: &str) -> AnonifyResult<RedactionResult> {
        if self.detectors.is_empty() {
            return Err(AnonifyError::configuration(
                "detectors",
                format!("span engine '{}' has no detectors", self.method),
            ));
        }

        let state = self.detectors.iter().try_fold(
            StageState::new(text, self.assigner.start_at()),
            |state, detector| {
                let entities = detector.detect(&state.text).map_err(|source| {
                    error!(method = %self.method, detector = detector.name(), error = %source, "detector failed");
                    AnonifyError::Detection {
                        method: self.method.clone(),
                        source,
                    }
                })?;
                debug!(detector = detector.name(), entities = entities.len(), "detector returned");
                Ok::<_, AnonifyError>(self.redact_pass(
                    state,
                    &entities,
                    detector.label_key(),
                    detector.name(),
                ))
            },
        )?;

        Ok(state.into_result(&self.method))
    }
}
