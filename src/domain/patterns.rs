//! Built-in regex rules.
//!
//! One rule per PII category. Every pattern is disjoint from placeholder
//! syntax (`[LABEL_n]`): none of them can match inside a bracketed,
//! underscore-joined upper-case token, so running the rules over already
//! redacted text never re-redacts a placeholder.

use super::{is_placeholder_label, PiiPattern};
use crate::error::{AnonifyError, AnonifyResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Email addresses, e.g. `fakemail@mail.com`.
#[derive(Debug, Clone, Default)]
pub struct EmailPattern;

impl EmailPattern {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b")
                .expect("Valid email regex")
        });
        &PATTERN
    }
}

impl PiiPattern for EmailPattern {
    fn label(&self) -> &str {
        "EMAIL"
    }

    fn pattern(&self) -> &Regex {
        Self::regex()
    }
}

/// Dotted-quad IPv4 addresses with each octet in `0..=255`.
#[derive(Debug, Clone, Default)]
pub struct Ipv4Pattern;

impl Ipv4Pattern {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
            )
            .expect("Valid IPv4 regex")
        });
        &PATTERN
    }
}

impl PiiPattern for Ipv4Pattern {
    fn label(&self) -> &str {
        "IP_ADDRESS"
    }

    fn pattern(&self) -> &Regex {
        Self::regex()
    }
}

/// IPv6 addresses, full and `::`-compressed forms.
///
/// Alternatives are ordered so the compressed forms with the most trailing
/// groups are tried first; the regex is leftmost-first, and `fe80::` must not
/// win over `fe80::1`.
#[derive(Debug, Clone, Default)]
pub struct Ipv6Pattern;

impl Ipv6Pattern {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(concat!(
                r"(?i)\b(?:(?:[0-9a-f]{1,4}:){7}[0-9a-f]{1,4}|",
                r"[0-9a-f]{1,4}:(?::[0-9a-f]{1,4}){1,6}|",
                r"(?:[0-9a-f]{1,4}:){1,2}(?::[0-9a-f]{1,4}){1,5}|",
                r"(?:[0-9a-f]{1,4}:){1,3}(?::[0-9a-f]{1,4}){1,4}|",
                r"(?:[0-9a-f]{1,4}:){1,4}(?::[0-9a-f]{1,4}){1,3}|",
                r"(?:[0-9a-f]{1,4}:){1,5}(?::[0-9a-f]{1,4}){1,2}|",
                r"(?:[0-9a-f]{1,4}:){1,6}:[0-9a-f]{1,4}|",
                r"(?:[0-9a-f]{1,4}:){1,7}:|",
                r":(?:(?::[0-9a-f]{1,4}){1,7}|:))\b",
            ))
            .expect("Valid IPv6 regex")
        });
        &PATTERN
    }
}

impl PiiPattern for Ipv6Pattern {
    fn label(&self) -> &str {
        "IP_ADDRESS"
    }

    fn pattern(&self) -> &Regex {
        Self::regex()
    }
}

/// `http(s)://` and `www.` URLs up to the next whitespace, quote or angle bracket.
#[derive(Debug, Clone, Default)]
pub struct UrlPattern;

impl UrlPattern {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#).expect("Valid URL regex")
        });
        &PATTERN
    }
}

impl PiiPattern for UrlPattern {
    fn label(&self) -> &str {
        "URL"
    }

    fn pattern(&self) -> &Regex {
        Self::regex()
    }
}

/// A caller-supplied rule compiled at construction time.
#[derive(Debug, Clone)]
pub struct RegexRule {
    label: String,
    regex: Regex,
}

impl RegexRule {
    /// Compiles `pattern` for the category `label`.
    ///
    /// Fails if the pattern does not compile or if the label could not be
    /// embedded in a placeholder (`[A-Z0-9_]+`).
    pub fn new(label: impl Into<String>, pattern: &str) -> AnonifyResult<Self> {
        let label = label.into();
        if !is_placeholder_label(&label) {
            return Err(AnonifyError::PatternError {
                pattern: pattern.to_string(),
                reason: format!("label '{}' must match [A-Z0-9_]+", label),
            });
        }
        let regex = Regex::new(pattern).map_err(|e| AnonifyError::PatternError {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { label, regex })
    }
}

impl PiiPattern for RegexRule {
    fn label(&self) -> &str {
        &self.label
    }

    fn pattern(&self) -> &Regex {
        &self.regex
    }
}

/// The built-in rules in application order.
///
/// URLs run before emails so that `https://user@host/...` is redacted as one
/// URL rather than leaving an email-shaped fragment behind.
pub fn default_patterns() -> Vec<Box<dyn PiiPattern>> {
    vec![
        Box::new(UrlPattern::new()),
        Box::new(EmailPattern::new()),
        Box::new(Ipv4Pattern::new()),
        Box::new(Ipv6Pattern::new()),
    ]
}
