//! Merged pipeline output and placeholder restoration.

use super::assigner::placeholder_token;
use super::engine::RedactionResult;
use super::rewriter::Placement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator between a stage's method and its own key.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Prefixes `key` with the method that produced it, e.g. `regex:EMAIL_1`.
pub fn namespaced(method: &str, key: &str) -> String {
    format!("{}{}{}", method, NAMESPACE_SEPARATOR, key)
}

/// Strips a namespace added by [`namespaced`]; plain keys pass through.
pub fn strip_namespace(key: &str) -> &str {
    key.rsplit_once(NAMESPACE_SEPARATOR)
        .map_or(key, |(_, local)| local)
}

/// Result of running every stage of a [`RedactionService`](super::RedactionService).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub original_text: String,
    pub cleaned_text: String,

    /// Stage methods in the order they ran.
    pub methods: Vec<String>,

    /// `method:KEY` to original substring, across all stages.
    pub replaced_values: BTreeMap<String, String>,

    /// `method:LABEL` to count, across all stages.
    pub replaced_count: BTreeMap<String, usize>,

    /// Token positions of every rewrite pass of every stage, in execution
    /// order, with `method:KEY` keys.
    #[serde(default)]
    pub placements: Vec<Vec<Placement>>,
}

impl PipelineOutput {
    pub fn new(original_text: &str) -> Self {
        Self {
            original_text: original_text.to_string(),
            cleaned_text: original_text.to_string(),
            ..Default::default()
        }
    }

    /// Folds the next stage's result in, namespacing its keys.
    ///
    /// The stage must have run on `self.cleaned_text`.
    pub fn merge(mut self, stage: RedactionResult) -> Self {
        let method = stage.method;
        self.replaced_values.extend(
            stage
                .replaced_values
                .into_iter()
                .map(|(key, value)| (namespaced(&method, &key), value)),
        );
        self.replaced_count.extend(
            stage
                .replaced_count
                .into_iter()
                .map(|(label, count)| (namespaced(&method, &label), count)),
        );
        self.placements
            .extend(stage.placements.into_iter().map(|pass| {
                pass.into_iter()
                    .map(|placement| Placement {
                        key: namespaced(&method, &placement.key),
                        ..placement
                    })
                    .collect::<Vec<_>>()
            }));
        self.cleaned_text = stage.cleaned_text;
        self.methods.push(method);
        self
    }

    /// Total number of placeholders across all stages.
    pub fn total_redacted(&self) -> usize {
        self.replaced_count.values().sum()
    }

    /// Values recorded by one stage, with the namespace removed.
    pub fn stage_values(&self, method: &str) -> BTreeMap<String, String> {
        let prefix = namespaced(method, "");
        self.replaced_values
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|local| (local.to_string(), value.clone()))
            })
            .collect()
    }

    /// Rebuilds the input text from `cleaned_text`.
    ///
    /// Each rewrite pass is undone at the positions it recorded, last pass
    /// first, so placeholder-shaped text that was already in the input is
    /// left alone and spans that swallowed an earlier token unwrap in the
    /// right order. Without recorded positions (output from an older run)
    /// this falls back to [`restore_text`](Self::restore_text).
    pub fn restore(&self) -> String {
        if self.placements.is_empty() {
            return self.restore_text(&self.cleaned_text);
        }
        restore_positions(&self.cleaned_text, &self.placements, &self.replaced_values)
            .unwrap_or_else(|| self.restore_text(&self.cleaned_text))
    }

    /// Replaces placeholder tokens in `text`, which may be an edited copy of
    /// `cleaned_text`.
    ///
    /// Passes are undone last to first, matching tokens by content. Tokens
    /// that were already present in the input are indistinguishable from
    /// issued ones and get replaced too; use [`restore`](Self::restore) on
    /// unedited output.
    pub fn restore_text(&self, text: &str) -> String {
        if self.placements.is_empty() {
            return self
                .methods
                .iter()
                .rev()
                .fold(text.to_string(), |text, method| {
                    restore(&text, &self.stage_values(method))
                });
        }
        self.placements
            .iter()
            .rev()
            .fold(text.to_string(), |text, pass| {
                pass.iter()
                    .fold(text, |text, placement| match self.replaced_values.get(&placement.key) {
                        Some(original) => text.replace(
                            &placeholder_token(strip_namespace(&placement.key)),
                            original,
                        ),
                        None => text,
                    })
            })
    }
}

/// Replaces every `[KEY]` token in `text` with its recorded original.
///
/// Keys may carry a `method:` namespace; it is ignored. Matching is by
/// content, so a token that was part of the input text is replaced as well.
pub fn restore(text: &str, replaced_values: &BTreeMap<String, String>) -> String {
    replaced_values
        .iter()
        .fold(text.to_string(), |text, (key, original)| {
            text.replace(&placeholder_token(strip_namespace(key)), original)
        })
}

/// Undoes rewrite passes last to first, splicing each original value back
/// at its recorded position.
///
/// Returns `None` when a placement no longer points at its token, as
/// happens once the text has been edited.
pub(crate) fn restore_positions(
    text: &str,
    passes: &[Vec<Placement>],
    replaced_values: &BTreeMap<String, String>,
) -> Option<String> {
    passes.iter().rev().try_fold(text.to_string(), |mut text, pass| {
        for placement in pass.iter().rev() {
            let original = replaced_values.get(&placement.key)?;
            let token = placeholder_token(strip_namespace(&placement.key));
            if text.get(placement.start..placement.end) != Some(token.as_str()) {
                return None;
            }
            text.replace_range(placement.start..placement.end, original);
        }
        Some(text)
    })
}
