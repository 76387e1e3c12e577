//! End-to-end tests for the redaction service: validation, stage chaining,
//! namespacing of merged results and restoration.

use anonify::{
    AnonifyError, ErrorKind, MaxLengthRule, NonEmptyRule, PipelineOutput, RedactionService,
    RegexEngine, RuleValidator, SpanEngine,
};
use std::collections::BTreeMap;

mod common;
use common::*;

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn test_regex_pipeline_namespaces_keys() {
    let text = "My email is test@mail.com and my IP is 192.168.1.1";
    let output = RedactionService::with_regex_defaults().run(text).unwrap();

    assert_eq!(output.original_text, text);
    assert_eq!(
        output.cleaned_text,
        "My email is [EMAIL_1] and my IP is [IP_ADDRESS_1]"
    );
    assert_eq!(output.methods, vec!["regex"]);
    assert_eq!(
        output.replaced_values,
        map(&[
            ("regex:EMAIL_1", "test@mail.com"),
            ("regex:IP_ADDRESS_1", "192.168.1.1"),
        ])
    );
    assert_eq!(
        output.replaced_count,
        counts(&[("regex:EMAIL", 1), ("regex:IP_ADDRESS", 1)])
    );
    assert_eq!(output.restore(), text);
}

#[test]
fn test_text_without_pii_passes_through() {
    let text = "Nothing sensitive in here.";
    let output = RedactionService::with_regex_defaults().run(text).unwrap();
    assert_eq!(output.cleaned_text, text);
    assert_eq!(output.total_redacted(), 0);
    assert!(output.replaced_values.is_empty());
}

mod validation {
    use super::*;

    #[test]
    fn test_whitespace_only_input_rejected() {
        let err = RedactionService::with_regex_defaults().run("  ").unwrap_err();
        match &err {
            AnonifyError::Validation { validator, message } => {
                assert_eq!(validator, "RuleValidator");
                assert_eq!(message, "Validation failed for rule: NonEmptyRule");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.kind().status_code(), 400);
    }

    #[test]
    fn test_overlong_input_rejected_before_any_stage() {
        let model = MockDetector::new(Vec::new());
        let service = RedactionService::new()
            .with_validator(
                RuleValidator::default()
                    .with_rule(NonEmptyRule)
                    .with_rule(MaxLengthRule::new(10)),
            )
            .with_engine(SpanEngine::new("model").with_detector(model));

        let err = service.run("this is longer than ten").unwrap_err();
        assert!(err.to_string().contains("MaxLengthRule"));
    }

    #[test]
    fn test_length_counts_characters() {
        let service = RedactionService::new()
            .with_validator(RuleValidator::default().with_rule(MaxLengthRule::new(4)))
            .with_engine(RegexEngine::default());
        // Four characters, eight bytes.
        assert!(service.run("ÄÖÜß").is_ok());
        assert!(service.run("ÄÖÜßx").is_err());
    }
}

mod configuration {
    use super::*;

    #[test]
    fn test_no_validators() {
        let err = RedactionService::new()
            .with_engine(RegexEngine::default())
            .run("text")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("No validation services configured"));
    }

    #[test]
    fn test_no_engines() {
        let err = RedactionService::new()
            .with_validator(RuleValidator::standard(100))
            .run("text")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("No clean services configured"));
    }

    #[test]
    fn test_configuration_checked_before_validation() {
        // Empty input would fail validation, but the missing engines win.
        let err = RedactionService::new()
            .with_validator(RuleValidator::standard(100))
            .run("")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

mod chaining {
    use super::*;

    const TEXT: &str = "Contact Jane Doe at jane@doe.org";
    const AFTER_REGEX: &str = "Contact Jane Doe at [EMAIL_1]";

    #[test]
    fn test_model_stage_sees_regex_output() {
        let model = MockDetector::finding(AFTER_REGEX, &[("Jane Doe", "PER")]);
        let output = RedactionService::with_regex_defaults()
            .with_engine(SpanEngine::new("model").with_detector(model))
            .run(TEXT)
            .unwrap();

        assert_eq!(output.methods, vec!["regex", "model"]);
        assert_eq!(output.cleaned_text, "Contact [PERSON_1] at [EMAIL_1]");
        assert_eq!(
            output.replaced_values,
            map(&[
                ("model:PERSON_1", "Jane Doe"),
                ("regex:EMAIL_1", "jane@doe.org"),
            ])
        );
        assert_eq!(
            output.replaced_count,
            counts(&[("model:PERSON", 1), ("regex:EMAIL", 1)])
        );
        assert_eq!(output.stage_values("model"), map(&[("PERSON_1", "Jane Doe")]));
        assert_eq!(output.restore(), TEXT);
    }

    #[test]
    fn test_same_key_in_two_stages_does_not_collide() {
        let model = MockDetector::finding(AFTER_REGEX, &[("Contact", "EMAIL")]);
        let output = RedactionService::with_regex_defaults()
            .with_engine(SpanEngine::new("model").with_detector(model))
            .run(TEXT)
            .unwrap();

        assert_eq!(output.cleaned_text, "[EMAIL_1] Jane Doe at [EMAIL_1]");
        assert_eq!(output.replaced_values["regex:EMAIL_1"], "jane@doe.org");
        assert_eq!(output.replaced_values["model:EMAIL_1"], "Contact");
        assert_eq!(output.total_redacted(), 2);
    }

    #[test]
    fn test_later_stage_swallowing_placeholder_restores() {
        let model = MockDetector::finding(AFTER_REGEX, &[("Jane Doe at [EMAIL_1]", "PER")]);
        let output = RedactionService::with_regex_defaults()
            .with_engine(
                SpanEngine::new("model")
                    .with_trim_spans(false)
                    .with_detector(model),
            )
            .run(TEXT)
            .unwrap();

        assert_eq!(output.cleaned_text, "Contact [PERSON_1]");
        assert_eq!(output.restore(), TEXT);
    }

    #[test]
    fn test_two_detectors_in_one_stage_unwrap_in_reverse() {
        let text = "Acme CEO x";
        let org = MockDetector::finding(text, &[("Acme", "ORG")]);
        let per = MockDetector::finding("[ORGANIZATION_1] CEO x", &[("[ORGANIZATION_1] CEO", "PER")]);
        let output = RedactionService::with_regex_defaults()
            .with_engine(
                SpanEngine::new("model")
                    .with_trim_spans(false)
                    .with_detector(org)
                    .with_detector(per),
            )
            .run(text)
            .unwrap();

        assert_eq!(output.cleaned_text, "[PERSON_1] x");
        assert_eq!(output.restore(), text);
    }

    #[test]
    fn test_input_placeholders_survive_restore() {
        let text = "literal [EMAIL_1] then a@b.com";
        let output = RedactionService::with_regex_defaults().run(text).unwrap();

        assert_eq!(output.cleaned_text, "literal [EMAIL_1] then [EMAIL_1]");
        assert_eq!(output.restore(), text);
    }

    #[test]
    fn test_failing_stage_aborts_run() {
        let service = RedactionService::with_regex_defaults()
            .with_engine(SpanEngine::new("model").with_detector(FailingDetector));

        let err = service.run(TEXT).unwrap_err();
        match &err {
            AnonifyError::Detection { method, .. } => assert_eq!(method, "model"),
            other => panic!("expected detection error, got {:?}", other),
        }
        assert_eq!(err.kind().status_code(), 502);
        assert!(std::error::Error::source(&err).is_some());
    }
}

#[test]
fn test_output_json_shape() {
    let output = RedactionService::with_regex_defaults()
        .run("ping admin@host.io")
        .unwrap();
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json["cleaned_text"], "ping [EMAIL_1]");
    assert_eq!(json["methods"][0], "regex");
    assert_eq!(json["replaced_values"]["regex:EMAIL_1"], "admin@host.io");
    assert_eq!(json["replaced_count"]["regex:EMAIL"], 1);
    assert_eq!(json["placements"][0][0]["key"], "regex:EMAIL_1");
    assert_eq!(json["placements"][0][0]["start"], 5);

    let parsed: PipelineOutput = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, output);
}
