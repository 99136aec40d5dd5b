use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::detection::policy::{DETECTION_POLICY_V1, DetectionPolicy};
use crate::detection::subscriptions::{
    amounts_within_tolerance, filter_expenses, is_monthly_pattern, sort_chronologically,
};
use crate::detection::types::{GroupSuggestion, Transaction};

pub fn suggest_groups(transactions: &[Transaction], tolerance: f64) -> Vec<GroupSuggestion> {
    suggest_groups_with_policy(transactions, tolerance, DETECTION_POLICY_V1)
}

/// Proposes prefix groups for payees whose text varies between payments.
///
/// Only payees seen once or twice are considered, since anything more
/// frequent can already be detected on its own.
fn suggest_groups_with_policy(
    transactions: &[Transaction],
    tolerance: f64,
    policy: DetectionPolicy,
) -> Vec<GroupSuggestion> {
    let mut by_name: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for transaction in filter_expenses(transactions) {
        by_name
            .entry(transaction.text.clone())
            .or_default()
            .push(transaction);
    }

    let orphan_names = by_name
        .iter()
        .filter(|(_, rows)| policy.is_orphan(rows.len()))
        .map(|(name, _)| name.as_str())
        .collect::<Vec<&str>>();

    let candidates = find_prefix_groups(&orphan_names, &by_name, policy);
    let candidate_count = candidates.len();
    let likely = candidates
        .into_iter()
        .filter(|group| is_likely_subscription(&group.transactions, tolerance, policy))
        .collect::<Vec<GroupSuggestion>>();

    let mut suggestions = deduplicate_suggestions(likely, policy);
    suggestions.sort_by(|left, right| right.month_count.cmp(&left.month_count));
    debug!(
        orphans = orphan_names.len(),
        candidates = candidate_count,
        suggestions = suggestions.len(),
        "group suggestion finished"
    );
    suggestions
}

fn find_prefix_groups(
    names: &[&str],
    by_name: &BTreeMap<String, Vec<Transaction>>,
    policy: DetectionPolicy,
) -> Vec<GroupSuggestion> {
    let mut word_prefixes: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    let mut char_prefixes: BTreeMap<String, Vec<&str>> = BTreeMap::new();

    for name in names.iter().copied() {
        let words = name.split_whitespace().collect::<Vec<&str>>();
        if let Some(first) = words.first() {
            if first.chars().count() >= policy.word_prefix_min_chars {
                word_prefixes
                    .entry((*first).to_string())
                    .or_default()
                    .push(name);
            }
            if let Some(second) = words.get(1) {
                word_prefixes
                    .entry(format!("{first} {second}"))
                    .or_default()
                    .push(name);
            }
        }

        if !name.chars().any(char::is_whitespace) {
            let length = name.chars().count();
            for prefix_len in policy.char_prefix_lengths {
                if length > prefix_len {
                    char_prefixes
                        .entry(name.chars().take(prefix_len).collect())
                        .or_default()
                        .push(name);
                }
            }
        }
    }

    let mut ordered_keys = sorted_by_length(word_prefixes.keys());
    ordered_keys.extend(sorted_by_length(char_prefixes.keys()));

    let mut merged = word_prefixes.clone();
    for (prefix, matched) in &char_prefixes {
        merged
            .entry(prefix.clone())
            .or_default()
            .extend(matched.iter().copied());
    }

    let mut groups = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for prefix in ordered_keys {
        let Some(matched) = merged.get(&prefix) else {
            continue;
        };
        if matched.len() < policy.suggestion_min_names {
            continue;
        }

        let unique_names = unique_in_order(matched);
        if unique_names.len() < policy.suggestion_min_names {
            continue;
        }

        let mut sorted_names = unique_names.clone();
        sorted_names.sort();
        if !seen.insert(sorted_names.join("|")) {
            continue;
        }

        let mut pooled = unique_names
            .iter()
            .filter_map(|name| by_name.get(*name))
            .flatten()
            .cloned()
            .collect::<Vec<Transaction>>();
        sort_chronologically(&mut pooled);
        let month_count = pooled
            .iter()
            .map(Transaction::month_key)
            .collect::<BTreeSet<_>>()
            .len();

        groups.push(GroupSuggestion {
            pattern: format!("^{}", regex::escape(&prefix)),
            prefix,
            names: unique_names.into_iter().map(str::to_string).collect(),
            month_count,
            transactions: pooled,
        });
    }
    groups
}

fn sorted_by_length<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut sorted = keys.cloned().collect::<Vec<String>>();
    sorted.sort_by(|left, right| {
        left.chars()
            .count()
            .cmp(&right.chars().count())
            .then_with(|| left.cmp(right))
    });
    sorted
}

fn unique_in_order<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .copied()
        .filter(|name| seen.insert(*name))
        .collect()
}

fn is_likely_subscription(
    transactions: &[Transaction],
    tolerance: f64,
    policy: DetectionPolicy,
) -> bool {
    if transactions.len() < policy.suggestion_min_transactions {
        return false;
    }
    is_monthly_pattern(transactions) && amounts_within_tolerance(transactions, tolerance)
}

/// Keeps shorter prefixes first and drops later candidates that mostly cover
/// names already claimed.
fn deduplicate_suggestions(
    mut suggestions: Vec<GroupSuggestion>,
    policy: DetectionPolicy,
) -> Vec<GroupSuggestion> {
    suggestions.sort_by_key(|suggestion| suggestion.prefix.chars().count());

    let mut covered: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();
    for suggestion in suggestions {
        let new_names = suggestion
            .names
            .iter()
            .filter(|name| !covered.contains(*name))
            .count();
        if policy.adds_enough_coverage(new_names, suggestion.names.len()) {
            covered.extend(suggestion.names.iter().cloned());
            kept.push(suggestion);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use crate::detection::types::{Transaction, tx};

    use super::suggest_groups;

    fn rotating_invoices() -> Vec<Transaction> {
        vec![
            tx("2024-08-28", "K*KOMBUCHA 8812", -249.0),
            tx("2024-09-28", "K*KOMBUCHA 9130", -249.0),
            tx("2024-10-28", "K*KOMBUCHA 9544", -249.0),
            tx("2024-11-28", "K*KOMBUCHA 9902", -259.0),
            tx("2024-09-02", "Groceries", -812.0),
            tx("2024-09-09", "Groceries", -433.0),
            tx("2024-09-16", "Groceries", -390.0),
        ]
    }

    #[test]
    fn rotating_reference_numbers_share_a_word_prefix() {
        let suggestions = suggest_groups(&rotating_invoices(), 0.35);
        assert_eq!(suggestions.len(), 1);
        let suggestion = &suggestions[0];
        assert_eq!(suggestion.prefix, "K*KOMBUCHA");
        assert_eq!(suggestion.pattern, "^K\\*KOMBUCHA");
        assert_eq!(suggestion.month_count, 4);
        assert_eq!(suggestion.names.len(), 4);
        assert_eq!(suggestion.transactions.len(), 4);
    }

    #[test]
    fn character_prefixes_cover_names_without_spaces() {
        let rows = vec![
            tx("2024-08-05", "GOOGLE*GSUITE_A1", -72.0),
            tx("2024-09-05", "GOOGLE*GSUITE_B2", -72.0),
            tx("2024-10-05", "GOOGLE*GSUITE_C3", -72.0),
        ];
        let suggestions = suggest_groups(&rows, 0.35);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].prefix, "GOOGLE");
        assert_eq!(suggestions[0].pattern, "^GOOGLE");
    }

    #[test]
    fn multiple_payments_per_month_are_not_suggested() {
        let rows = vec![
            tx("2024-08-05", "Cafe Blue 1", -40.0),
            tx("2024-08-12", "Cafe Blue 2", -40.0),
            tx("2024-09-05", "Cafe Blue 3", -40.0),
        ];
        assert!(suggest_groups(&rows, 0.35).is_empty());
    }

    #[test]
    fn suggestions_are_stable_across_runs() {
        let first = suggest_groups(&rotating_invoices(), 0.35);
        let second = suggest_groups(&rotating_invoices(), 0.35);
        assert_eq!(first, second);
    }
}
