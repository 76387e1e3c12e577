//! Text rewriting.

use super::assigner::PlaceholderAssignment;
use serde::{Deserialize, Serialize};

/// Where a token was written: a byte range of the rewritten text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub start: usize,
    pub end: usize,
    pub key: String,
}

/// Replaces each assigned span of `text` with its placeholder token.
///
/// The output is built in one left-to-right pass, copying the untouched gap
/// before each span and then the token, so every offset is read from the
/// original `text` and never from a partially rewritten buffer. Assignments
/// may be given in any order; one that overlaps an earlier one is skipped.
pub fn rewrite(text: &str, assignments: &[PlaceholderAssignment]) -> String {
    rewrite_tracked(text, assignments).0
}

/// Like [`rewrite`], also returning where each token landed in the output.
pub fn rewrite_tracked(
    text: &str,
    assignments: &[PlaceholderAssignment],
) -> (String, Vec<Placement>) {
    let mut ordered: Vec<&PlaceholderAssignment> = assignments.iter().collect();
    ordered.sort_by_key(|a| (a.start, a.end));

    let capacity = text.len() + ordered.iter().map(|a| a.token.len()).sum::<usize>();
    let mut output = String::with_capacity(capacity);
    let mut placements = Vec::with_capacity(ordered.len());
    let mut cursor = 0;

    for assignment in ordered {
        if assignment.start < cursor {
            continue;
        }
        output.push_str(&text[cursor..assignment.start]);
        let start = output.len();
        output.push_str(&assignment.token);
        placements.push(Placement {
            start,
            end: output.len(),
            key: assignment.key.clone(),
        });
        cursor = assignment.end;
    }
    output.push_str(&text[cursor..]);
    (output, placements)
}
