//! Pre-redaction input checks.
//!
//! Validation is pipeline policy, not part of the engines: an engine will
//! happily redact an empty string. The service runs every configured
//! [`Validator`] before the first engine and stops at the first rejection.

/// Default upper bound on input length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 5000;

/// A single yes/no check on the input text.
pub trait ValidationRule: Send + Sync {
    fn check(&self, text: &str) -> bool;

    fn name(&self) -> &str;

    fn description(&self) -> String;
}

/// Rejects text that is empty or only whitespace.
#[derive(Debug, Clone, Default)]
pub struct NonEmptyRule;

impl ValidationRule for NonEmptyRule {
    fn check(&self, text: &str) -> bool {
        !text.trim().is_empty()
    }

    fn name(&self) -> &str {
        "NonEmptyRule"
    }

    fn description(&self) -> String {
        "text must contain at least one non-whitespace character".to_string()
    }
}

/// Rejects text longer than `max_chars` characters.
#[derive(Debug, Clone)]
pub struct MaxLengthRule {
    max_chars: usize,
}

impl MaxLengthRule {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for MaxLengthRule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl ValidationRule for MaxLengthRule {
    fn check(&self, text: &str) -> bool {
        text.chars().nth(self.max_chars).is_none()
    }

    fn name(&self) -> &str {
        "MaxLengthRule"
    }

    fn description(&self) -> String {
        format!("text must be at most {} characters", self.max_chars)
    }
}

/// Checks text before redaction.
pub trait Validator: Send + Sync {
    /// Returns `(true, text)` when valid, `(false, reason)` otherwise.
    fn validate(&self, text: &str) -> (bool, String);

    fn name(&self) -> &str;
}

/// Applies rules in order and reports the first failing one.
#[derive(Default)]
pub struct RuleValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleValidator {
    pub fn new(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Non-empty text of at most `max_chars` characters.
    pub fn standard(max_chars: usize) -> Self {
        Self::default()
            .with_rule(NonEmptyRule)
            .with_rule(MaxLengthRule::new(max_chars))
    }
}

impl Validator for RuleValidator {
    fn validate(&self, text: &str) -> (bool, String) {
        match self.rules.iter().find(|rule| !rule.check(text)) {
            Some(rule) => (
                false,
                format!("Validation failed for rule: {}", rule.name()),
            ),
            None => (true, text.to_string()),
        }
    }

    fn name(&self) -> &str {
        "RuleValidator"
    }
}
