use std::path::PathBuf;

use crate::ClientResult;
use crate::commands::common::{SourceSelection, prepare_run};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{GroupSuggestionRow, SuggestionsData};
use crate::detection::policy::{DETECTION_POLICY_V1, DETECTION_POLICY_VERSION};
use crate::detection::suggest::suggest_groups;
use crate::detection::types::GroupSuggestion;
use crate::import::ParserRegistry;

pub const COMMAND: &str = "suggest-groups";

#[derive(Debug, Clone)]
pub struct SuggestRunOptions {
    pub files: Vec<String>,
    pub source: Option<String>,
    pub config_path: Option<PathBuf>,
    pub tolerance: f64,
}

impl Default for SuggestRunOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            source: None,
            config_path: None,
            tolerance: DETECTION_POLICY_V1.default_tolerance,
        }
    }
}

pub fn run(options: SuggestRunOptions) -> ClientResult<SuccessEnvelope> {
    run_with_registry(options, &ParserRegistry::with_builtin())
}

#[doc(hidden)]
pub fn run_with_registry(
    options: SuggestRunOptions,
    registry: &ParserRegistry,
) -> ClientResult<SuccessEnvelope> {
    let prepared = prepare_run(
        SourceSelection {
            files: &options.files,
            source: options.source.as_deref(),
            config_path: options.config_path.as_deref(),
            tolerance: options.tolerance,
        },
        registry,
        COMMAND,
    )?;

    let suggestions = suggest_groups(&prepared.transactions, options.tolerance)
        .iter()
        .map(suggestion_row)
        .collect::<Vec<GroupSuggestionRow>>();

    success(
        COMMAND,
        SuggestionsData {
            policy_version: DETECTION_POLICY_VERSION.to_string(),
            transaction_count: prepared.transactions.len(),
            tolerance: options.tolerance,
            suggestions,
        },
    )
}

fn suggestion_row(suggestion: &GroupSuggestion) -> GroupSuggestionRow {
    GroupSuggestionRow {
        prefix: suggestion.prefix.clone(),
        pattern: suggestion.pattern.clone(),
        names: suggestion.names.clone(),
        month_count: suggestion.month_count,
        transaction_count: suggestion.transactions.len(),
        config_snippet: config_snippet(&suggestion.prefix, &suggestion.pattern),
    }
}

/// A `groups:` list entry ready to paste under the config's `groups:` key.
fn config_snippet(name: &str, pattern: &str) -> String {
    format!(
        "- name: {}\n  patterns:\n    - {}\n",
        yaml_quote(name),
        yaml_quote(pattern)
    )
}

fn yaml_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::config_snippet;

    #[test]
    fn snippet_single_quotes_patterns() {
        assert_eq!(
            config_snippet("K*KOMBUCHA", "^K\\*KOMBUCHA"),
            "- name: 'K*KOMBUCHA'\n  patterns:\n    - '^K\\*KOMBUCHA'\n"
        );
        assert!(config_snippet("Joe's", "^Joe's").contains("'Joe''s'"));
    }
}
