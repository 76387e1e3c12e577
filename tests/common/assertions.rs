//! Custom assertions for redaction testing.
//!
//! Provides domain-specific assertions that make tests more readable
//! and provide better error messages.

use anonify::{EntitySpan, RedactionResult};

/// Asserts that no two spans share an offset.
///
/// # Panics
/// Panics naming the first overlapping pair.
pub fn assert_no_overlap(spans: &[EntitySpan]) {
    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            assert!(
                a.end <= b.start || b.end <= a.start,
                "Spans {:?} and {:?} overlap",
                a,
                b
            );
        }
    }
}

/// Asserts that spans are sorted by start offset.
pub fn assert_left_to_right(spans: &[EntitySpan]) {
    for pair in spans.windows(2) {
        assert!(
            pair[0].start < pair[1].start,
            "Spans out of order: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Asserts that undoing the recorded replacements rebuilds `original`.
pub fn assert_restores(original: &str, result: &RedactionResult) {
    let restored = result.restore();
    assert_eq!(
        restored, original,
        "Restoring '{}' did not give back the original text",
        result.cleaned_text
    );
}

/// Asserts that every placeholder key appears exactly once in the output
/// and its value occurs in the original text.
pub fn assert_mapping_consistent(original: &str, result: &RedactionResult) {
    for (key, value) in &result.replaced_values {
        let token = format!("[{}]", key);
        assert_eq!(
            result.cleaned_text.matches(&token).count(),
            1,
            "Token {} should appear once in '{}'",
            token,
            result.cleaned_text
        );
        assert!(
            original.contains(value.as_str()),
            "Value '{}' for {} is not part of the original text",
            value,
            key
        );
    }
    let total: usize = result.replaced_count.values().sum();
    assert_eq!(
        total,
        result.replaced_values.len(),
        "Counts and mapping disagree"
    );
}
