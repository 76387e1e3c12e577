//! Label synonyms.
//!
//! NER models abbreviate their categories (`PER`, `LOC`, ...). Placeholders
//! use the long names so that a regex `EMAIL` and a model `EMAIL` or a
//! `PER` and a `PERSON` end up numbered under the same label.

const SYNONYMS: &[(&str, &str)] = &[
    ("PER", "PERSON"),
    ("LOC", "LOCATION"),
    ("ORG", "ORGANIZATION"),
    ("MISC", "MISCELLANEOUS"),
];

/// Maps a detector label to its canonical name.
///
/// Matching is case-sensitive; unknown labels are returned unchanged.
pub fn normalize_label(label: &str) -> &str {
    SYNONYMS
        .iter()
        .find(|(short, _)| *short == label)
        .map_or(label, |(_, long)| long)
}
