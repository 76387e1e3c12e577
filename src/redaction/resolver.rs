//! Overlap resolution.

use crate::domain::EntitySpan;

/// Selects a non-overlapping subset of `spans`, ordered left to right.
///
/// Spans are sorted by start, longer first on equal starts, then swept
/// greedily: a span is kept when it starts at or after the end of the last
/// kept span. Exact duplicates keep the detector's order (the sort is
/// stable), so the first reported label wins.
pub fn resolve(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.len().cmp(&a.len())));

    let (kept, _) = spans.into_iter().fold(
        (Vec::new(), None::<usize>),
        |(mut kept, last_end), span| match last_end {
            Some(last_end) if span.start < last_end => (kept, Some(last_end)),
            _ => {
                let end = span.end;
                kept.push(span);
                (kept, Some(end))
            }
        },
    );
    kept
}
