//! PII redaction with typed, numbered placeholders.
//!
//! Text goes in; spans identified as personally identifiable information
//! come out replaced by placeholders such as `[EMAIL_1]`, together with a
//! mapping from each placeholder back to its original value and a count per
//! category.
//!
//! # Architecture
//!
//! - [`domain`]: entity types, label synonyms, built-in regex rules
//! - [`detector`]: the [`Detector`] trait and its regex/model implementations
//! - [`redaction`]: the span engine (normalize, resolve, assign, rewrite),
//!   cleaning stages and the [`RedactionService`] pipeline
//! - [`validation`]: input checks run before any stage
//! - [`error`]: error kinds an outer layer can map to status codes
//!
//! # Quick Start
//!
//! ```
//! use anonify::RedactionService;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedactionService::with_regex_defaults();
//! let output = service.run("My email is fakemail@mail.com")?;
//!
//! assert_eq!(output.cleaned_text, "My email is [EMAIL_1]");
//! assert_eq!(output.replaced_values["regex:EMAIL_1"], "fakemail@mail.com");
//! assert_eq!(output.restore(), "My email is fakemail@mail.com");
//! # Ok(())
//! # }
//! ```
//!
//! # Examples
//!
//! ## Redacting model output
//!
//! ```
//! use anonify::{RawEntity, RedactionEngine, SpanEngine, StaticDetector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let text = "Ada Lovelace wrote to Charles";
//! let entities = vec![
//!     RawEntity::labelled(22, 29, "PER"),
//!     RawEntity::labelled(0, 12, "PER"),
//! ];
//! let engine = SpanEngine::new("model").with_detector(StaticDetector::new("ner", entities));
//! let result = engine.clean(text)?;
//!
//! assert_eq!(result.cleaned_text, "[PERSON_1] wrote to [PERSON_2]");
//! # Ok(())
//! # }
//! ```

pub mod detector;
pub mod domain;
pub mod error;
pub mod redaction;
pub mod validation;

pub use detector::{CommandDetector, DetectionError, Detector, PatternDetector, StaticDetector};
pub use domain::{EntitySpan, PiiPattern, RawEntity, RegexRule};
pub use error::{AnonifyError, AnonifyResult, ErrorKind};
pub use redaction::{
    restore, OffsetUnit, PipelineOutput, RedactionEngine, RedactionResult, RedactionService,
    RegexEngine, SpanEngine,
};
pub use validation::{MaxLengthRule, NonEmptyRule, RuleValidator, ValidationRule, Validator};
