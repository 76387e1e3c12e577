//! Span normalization.
//!
//! Detector output is untrusted. The normalizer turns [`RawEntity`] values
//! into [`EntitySpan`]s that are guaranteed to slice the text safely, and
//! reports every entity it had to drop instead of failing the whole call.

use crate::domain::{normalize_label, EntitySpan, RawEntity};
use std::fmt;
use std::iter;

/// Unit the detector's offsets are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetUnit {
    /// UTF-8 byte offsets, as produced by the `regex` crate.
    #[default]
    Byte,
    /// Unicode scalar offsets, as produced by most NER tokenizers.
    Char,
}

/// Why a detector entity did not become a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingStart,
    MissingEnd,
    MissingLabel,
    NegativeOffset,
    OutOfBounds,
    EmptyRange,
    NotCharBoundary,
    TrimmedEmpty,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::MissingStart => "missing start offset",
            Self::MissingEnd => "missing end offset",
            Self::MissingLabel => "missing label",
            Self::NegativeOffset => "negative offset",
            Self::OutOfBounds => "end beyond text length",
            Self::EmptyRange => "start not before end",
            Self::NotCharBoundary => "offset inside a UTF-8 character",
            Self::TrimmedEmpty => "only whitespace or punctuation",
        };
        f.write_str(reason)
    }
}

/// Normalizer policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Strip whitespace and ASCII punctuation from both ends of each span.
    pub trim_spans: bool,
    pub offset_unit: OffsetUnit,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            trim_spans: true,
            offset_unit: OffsetUnit::Byte,
        }
    }
}

/// Output of [`SpanNormalizer::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Valid spans, in the order the detector reported them.
    pub spans: Vec<EntitySpan>,
    /// Index into the input slice and reason, for each dropped entity.
    pub dropped: Vec<(usize, DropReason)>,
}

#[derive(Debug, Clone, Default)]
pub struct SpanNormalizer {
    config: NormalizerConfig,
}

impl SpanNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Validates `entities` against `text`, reading labels from `label_key`.
    ///
    /// Returned spans are byte ranges on character boundaries of `text`,
    /// whatever unit the detector used.
    pub fn normalize(&self, text: &str, entities: &[RawEntity], label_key: &str) -> Normalized {
        let boundaries = match self.config.offset_unit {
            OffsetUnit::Byte => None,
            OffsetUnit::Char => Some(char_boundaries(text)),
        };

        let mut normalized = Normalized::default();
        for (index, entity) in entities.iter().enumerate() {
            match self.normalize_one(text, entity, label_key, boundaries.as_deref()) {
                Ok(span) => normalized.spans.push(span),
                Err(reason) => normalized.dropped.push((index, reason)),
            }
        }
        normalized
    }

    fn normalize_one(
        &self,
        text: &str,
        entity: &RawEntity,
        label_key: &str,
        boundaries: Option<&[usize]>,
    ) -> Result<EntitySpan, DropReason> {
        let start = entity.start.ok_or(DropReason::MissingStart)?;
        let end = entity.end.ok_or(DropReason::MissingEnd)?;
        let label = entity.label(label_key).ok_or(DropReason::MissingLabel)?;

        if start < 0 || end < 0 {
            return Err(DropReason::NegativeOffset);
        }
        let (start, end) = (start as usize, end as usize);

        let (start, end) = match boundaries {
            Some(boundaries) => {
                // boundaries has one entry per char plus the end of text.
                let last = boundaries.len() - 1;
                if end > last {
                    return Err(DropReason::OutOfBounds);
                }
                if start >= end {
                    return Err(DropReason::EmptyRange);
                }
                (boundaries[start], boundaries[end])
            }
            None => {
                if end > text.len() {
                    return Err(DropReason::OutOfBounds);
                }
                if start >= end {
                    return Err(DropReason::EmptyRange);
                }
                if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
                    return Err(DropReason::NotCharBoundary);
                }
                (start, end)
            }
        };

        let (start, end) = if self.config.trim_spans {
            trim_range(text, start, end).ok_or(DropReason::TrimmedEmpty)?
        } else {
            (start, end)
        };

        Ok(EntitySpan::new(start, end, normalize_label(label)))
    }
}

/// Whitespace and punctuation: ASCII, Latin-1 (`«»¡¿`), the General
/// Punctuation block (curly quotes, dashes, ellipsis), CJK symbols and the
/// full-width ASCII forms.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(c,
            '\u{00A1}' | '\u{00AB}' | '\u{00BB}' | '\u{00BF}'
            | '\u{2010}'..='\u{2027}'
            | '\u{2030}'..='\u{205E}'
            | '\u{3001}'..='\u{3003}'
            | '\u{3008}'..='\u{3011}'
            | '\u{3014}'..='\u{301F}'
            | '\u{FF01}'..='\u{FF0F}'
            | '\u{FF1A}'..='\u{FF20}'
            | '\u{FF3B}'..='\u{FF40}'
            | '\u{FF5B}'..='\u{FF65}')
}

/// Shrinks `start..end` past trimmable characters; `None` if nothing is left.
fn trim_range(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &text[start..end];
    let head = slice.trim_start_matches(is_trimmable);
    let new_start = start + (slice.len() - head.len());
    let body = head.trim_end_matches(is_trimmable);
    if body.is_empty() {
        return None;
    }
    Some((new_start, new_start + body.len()))
}

/// Byte offset of every char in `text`, followed by `text.len()`.
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(iter::once(text.len()))
        .collect()
}
