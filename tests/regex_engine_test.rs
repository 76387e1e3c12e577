//! Integration tests for the built-in regex engine.

use anonify::{RedactionEngine, RegexEngine, RegexRule};
use std::collections::BTreeMap;

mod common;
use common::*;

#[test]
fn test_single_email() {
    let text = "My email is fakemail@mail.com";
    let result = RegexEngine::default().clean(text).unwrap();

    assert_eq!(result.cleaned_text, "My email is [EMAIL_1]");
    assert_eq!(
        result.replaced_count,
        BTreeMap::from([("EMAIL".to_string(), 1)])
    );
    assert_eq!(
        result.replaced_values,
        BTreeMap::from([("EMAIL_1".to_string(), "fakemail@mail.com".to_string())])
    );
}

#[test]
fn test_two_urls_numbered_in_order() {
    let text = "Check my websites at https://a.com and https://b.com";
    let result = RegexEngine::default().clean(text).unwrap();

    assert_eq!(result.cleaned_text, "Check my websites at [URL_1] and [URL_2]");
    assert_eq!(result.replaced_values["URL_1"], "https://a.com");
    assert_eq!(result.replaced_values["URL_2"], "https://b.com");
    assert_eq!(result.replaced_count["URL"], 2);
}

#[test]
fn test_url_with_credentials_is_one_url() {
    // URLs run before emails, so the userinfo part is not a separate email.
    let text = "Fetch https://admin@intranet.example.com/status please";
    let result = RegexEngine::default().clean(text).unwrap();

    assert_eq!(result.cleaned_text, "Fetch [URL_1] please");
    assert!(!result.replaced_count.contains_key("EMAIL"));
}

#[test]
fn test_mixed_categories() {
    let text = "Mail ops@corp.io, host 192.168.1.1 or www.corp.io";
    let result = RegexEngine::default().clean(text).unwrap();

    assert_eq!(
        result.cleaned_text,
        "Mail [EMAIL_1], host [IP_ADDRESS_1] or [URL_1]"
    );
    assert_eq!(result.total_redacted(), 3);
    assert_mapping_consistent(text, &result);
    assert_restores(text, &result);
}

#[test]
fn test_repeated_value_gets_one_key_per_occurrence() {
    let text = "10.0.0.1, 10.0.0.2, 10.0.0.1";
    let result = RegexEngine::default().clean(text).unwrap();

    assert_eq!(
        result.cleaned_text,
        "[IP_ADDRESS_1], [IP_ADDRESS_2], [IP_ADDRESS_3]"
    );
    assert_eq!(result.replaced_values["IP_ADDRESS_1"], "10.0.0.1");
    assert_eq!(result.replaced_values["IP_ADDRESS_3"], "10.0.0.1");
    assert_eq!(result.replaced_count["IP_ADDRESS"], 3);
}

#[test]
fn test_invalid_octets_are_not_addresses() {
    let text = "version 300.1.2.3 is out";
    let result = RegexEngine::default().clean(text).unwrap();
    assert_eq!(result.cleaned_text, text);
    assert!(!result.has_redactions());
}

#[test]
fn test_cleaning_is_idempotent() {
    let engine = RegexEngine::default();
    let text = "a@b.com via http://x.org from 10.1.1.1 and fe80::1";
    let first = engine.clean(text).unwrap();
    let second = engine.clean(&first.cleaned_text).unwrap();

    assert_eq!(second.cleaned_text, first.cleaned_text);
    assert!(!second.has_redactions());
}

#[test]
fn test_start_at_offsets_numbering() {
    let result = RegexEngine::default()
        .with_start_at(0)
        .clean("x@y.com and z@y.com")
        .unwrap();
    assert_eq!(result.cleaned_text, "[EMAIL_0] and [EMAIL_1]");
    assert_eq!(result.replaced_count["EMAIL"], 2);
}

#[test]
fn test_custom_rule_runs_after_defaults() {
    let engine = RegexEngine::default()
        .with_pattern(RegexRule::new("EMPLOYEE_ID", r"\bEMP-\d{6}\b").unwrap());
    assert_eq!(
        engine.labels(),
        vec!["URL", "EMAIL", "IP_ADDRESS", "IP_ADDRESS", "EMPLOYEE_ID"]
    );

    let result = engine.clean("EMP-123456 wrote from hr@corp.io").unwrap();
    assert_eq!(result.cleaned_text, "[EMPLOYEE_ID_1] wrote from [EMAIL_1]");
}

#[test]
fn test_rule_label_must_fit_placeholder_syntax() {
    assert!(RegexRule::new("employee id", r"\d+").is_err());
    assert!(RegexRule::new("ID", r"(unclosed").is_err());
}

#[test]
fn test_empty_text() {
    let result = RegexEngine::default().clean("").unwrap();
    assert_eq!(result.cleaned_text, "");
    assert!(result.replaced_values.is_empty());
    assert!(result.replaced_count.is_empty());
}
