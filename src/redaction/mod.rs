//! Span redaction engine and pipeline service.
//!
//! The engine is split into four steps, each in its own module:
//!
//! 1. [`normalizer`]: validate and trim detector entities
//! 2. [`resolver`]: pick a non-overlapping, left-to-right subset
//! 3. [`assigner`]: number spans per label in reading order
//! 4. [`rewriter`]: splice placeholder tokens into the text
//!
//! [`engine`] composes them into cleaning stages and [`RedactionService`]
//! chains stages behind input validation.

pub mod assigner;
pub mod engine;
pub mod normalizer;
pub mod output;
pub mod resolver;
pub mod rewriter;

pub use assigner::{Assigned, LabelCounters, PlaceholderAssigner, PlaceholderAssignment};
pub use engine::{RedactionEngine, RedactionResult, RegexEngine, SpanEngine};
pub use normalizer::{DropReason, Normalized, NormalizerConfig, OffsetUnit, SpanNormalizer};
pub use output::{restore, PipelineOutput, NAMESPACE_SEPARATOR};
pub use resolver::resolve;
pub use rewriter::{rewrite, rewrite_tracked, Placement};

use crate::error::{AnonifyError, AnonifyResult};
use crate::validation::{RuleValidator, Validator, DEFAULT_MAX_LENGTH};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Redaction service coordinating validation and engine stages.
///
/// Each stage receives the previous stage's cleaned text. A failing stage
/// aborts the run; no partially redacted text is returned as if complete.
#[derive(Default)]
pub struct RedactionService {
    validators: Vec<Box<dyn Validator>>,
    engines: Vec<Box<dyn RedactionEngine>>,
}

impl RedactionService {
    /// Creates a service with no validators and no engines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard validation followed by the built-in regex engine.
    pub fn with_regex_defaults() -> Self {
        Self::new()
            .with_validator(RuleValidator::standard(DEFAULT_MAX_LENGTH))
            .with_engine(RegexEngine::default())
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Appends a stage; it runs after all existing ones.
    pub fn with_engine(mut self, engine: impl RedactionEngine + 'static) -> Self {
        self.engines.push(Box::new(engine));
        self
    }

    pub fn with_boxed_engine(mut self, engine: Box<dyn RedactionEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    /// Stage methods in execution order.
    pub fn methods(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.method()).collect()
    }

    /// Validates `text` and runs every stage over it.
    ///
    /// # Errors
    /// - [`AnonifyError::Configuration`] if no validators or no engines are
    ///   configured, or two engines share a method name
    /// - [`AnonifyError::Validation`] if a validator rejects the text
    /// - [`AnonifyError::Detection`] if a stage's detector fails
    pub fn run(&self, text: &str) -> AnonifyResult<PipelineOutput> {
        self.check_configuration()?;

        for validator in &self.validators {
            let (valid, message) = validator.validate(text);
            if !valid {
                debug!(validator = validator.name(), %message, "input rejected");
                return Err(AnonifyError::Validation {
                    validator: validator.name().to_string(),
                    message,
                });
            }
        }

        let output = self
            .engines
            .iter()
            .try_fold(PipelineOutput::new(text), |output, engine| {
                let stage = engine.clean(&output.cleaned_text).map_err(|e| {
                    error!(method = engine.method(), error = %e, "stage failed");
                    e
                })?;
                debug!(
                    method = engine.method(),
                    redacted = stage.total_redacted(),
                    "stage completed"
                );
                Ok::<_, AnonifyError>(output.merge(stage))
            })?;

        info!(
            methods = ?output.methods,
            redacted = output.total_redacted(),
            "redaction pipeline completed"
        );
        Ok(output)
    }

    fn check_configuration(&self) -> AnonifyResult<()> {
        if self.validators.is_empty() {
            return Err(AnonifyError::configuration(
                "validators",
                "No validation services configured",
            ));
        }
        if self.engines.is_empty() {
            return Err(AnonifyError::configuration(
                "engines",
                "No clean services configured",
            ));
        }

        if let Some(method) = self
            .methods()
            .into_iter()
            .find(|m| m.is_empty() || m.contains(NAMESPACE_SEPARATOR))
        {
            return Err(AnonifyError::configuration(
                "engines",
                format!(
                    "method '{}' must be non-empty and must not contain '{}'",
                    method, NAMESPACE_SEPARATOR
                ),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.methods().into_iter().find(|m| !seen.insert(*m)) {
            return Err(AnonifyError::configuration(
                "engines",
                format!("method '{}' is used by more than one stage", duplicate),
            ));
        }
        Ok(())
    }
}
