use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;

use crate::detection::date::MonthKey;
use crate::detection::policy::{DETECTION_POLICY_V1, DetectionPolicy};
use crate::detection::status::determine_status_with_policy;
use crate::detection::types::{DateRange, Subscription, Transaction};

/// Amount-drift tolerance, optionally overridden per payee.
///
/// Overrides are keyed by lowercased payee name, which is how config groups
/// with their own `tolerance` reach the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceSettings {
    pub default: f64,
    pub overrides: HashMap<String, f64>,
}

impl ToleranceSettings {
    pub fn uniform(tolerance: f64) -> Self {
        Self {
            default: tolerance,
            overrides: HashMap::new(),
        }
    }

    pub fn for_name(&self, name_key: &str) -> f64 {
        self.overrides
            .get(name_key)
            .copied()
            .unwrap_or(self.default)
    }
}

pub fn detect_subscriptions(
    complete: &[Transaction],
    all: &[Transaction],
    range: &DateRange,
    tolerance: f64,
) -> Vec<Subscription> {
    detect_subscriptions_with_tolerances(
        complete,
        all,
        range,
        &ToleranceSettings::uniform(tolerance),
    )
}

pub fn detect_subscriptions_with_tolerances(
    complete: &[Transaction],
    all: &[Transaction],
    range: &DateRange,
    tolerances: &ToleranceSettings,
) -> Vec<Subscription> {
    detect_subscriptions_with_policy(complete, all, range, tolerances, DETECTION_POLICY_V1)
}

fn detect_subscriptions_with_policy(
    complete: &[Transaction],
    all: &[Transaction],
    range: &DateRange,
    tolerances: &ToleranceSettings,
    policy: DetectionPolicy,
) -> Vec<Subscription> {
    let by_name = group_by_name_key(complete);
    let all_by_name = group_by_name_key(all);

    let mut subscriptions = Vec::new();
    for (key, rows) in &by_name {
        if rows.len() < policy.min_occurrences {
            continue;
        }

        let mut expenses = filter_expenses(rows);
        if expenses.len() < policy.min_occurrences {
            continue;
        }
        sort_chronologically(&mut expenses);

        let mut all_expenses = all_by_name
            .get(key)
            .map(|group| filter_expenses(group))
            .unwrap_or_default();
        sort_chronologically(&mut all_expenses);

        if !is_monthly_pattern(&all_expenses) {
            continue;
        }
        if !amounts_within_tolerance(&expenses, tolerances.for_name(key)) {
            continue;
        }

        let Some(subscription) = build_subscription(&expenses, all_expenses, range, policy)
        else {
            continue;
        };
        subscriptions.push(subscription);
    }

    subscriptions.sort_by(compare_subscriptions);
    subscriptions
}

/// Builds a subscription from its statistics rows and its full lifecycle.
///
/// `stats_rows` drive the average, range and typical day; `lifecycle` (sorted
/// ascending) provides dates, the latest amount and the display name.
pub(crate) fn build_subscription(
    stats_rows: &[Transaction],
    lifecycle: Vec<Transaction>,
    range: &DateRange,
    policy: DetectionPolicy,
) -> Option<Subscription> {
    let first = lifecycle.first()?;
    let last = lifecycle.last()?;
    let (min_amount, max_amount) = amount_range(stats_rows);
    let typical_day = typical_day(stats_rows);

    Some(Subscription {
        name: last.text.clone(),
        avg_amount: average_amount(stats_rows),
        latest_amount: last.amount,
        min_amount,
        max_amount,
        start_date: first.date,
        last_date: last.date,
        typical_day,
        status: determine_status_with_policy(last.date, typical_day, range.end, policy),
        transactions: lifecycle,
    })
}

fn group_by_name_key(transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    let mut groups: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for transaction in transactions {
        groups
            .entry(transaction.name_key())
            .or_default()
            .push(transaction.clone());
    }
    groups
}

pub fn filter_expenses(transactions: &[Transaction]) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| transaction.is_expense())
        .cloned()
        .collect()
}

pub fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.text.cmp(&right.text))
            .then_with(|| left.amount.total_cmp(&right.amount))
    });
}

/// True when no calendar month holds more than one of the transactions.
pub fn is_monthly_pattern(transactions: &[Transaction]) -> bool {
    let mut per_month: HashMap<MonthKey, usize> = HashMap::new();
    for transaction in transactions {
        *per_month.entry(transaction.month_key()).or_insert(0) += 1;
    }
    per_month.values().all(|count| *count == 1)
}

/// Checks consecutive relative changes against `tolerance`.
///
/// Expects chronologically sorted input. A change away from a zero amount is
/// never within tolerance, while zero followed by zero is.
pub fn amounts_within_tolerance(transactions: &[Transaction], tolerance: f64) -> bool {
    if transactions.len() < 2 {
        return transactions.len() == 1;
    }

    transactions.windows(2).all(|pair| {
        let previous = pair[0].abs_amount();
        let current = pair[1].abs_amount();
        if previous == 0.0 {
            return current == 0.0;
        }
        (current - previous).abs() / previous <= tolerance
    })
}

pub fn average_amount(transactions: &[Transaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    let sum: f64 = transactions.iter().map(|transaction| transaction.amount).sum();
    sum / (transactions.len() as f64)
}

/// Minimum and maximum absolute amounts.
pub fn amount_range(transactions: &[Transaction]) -> (f64, f64) {
    let mut amounts = transactions.iter().map(Transaction::abs_amount);
    let Some(first) = amounts.next() else {
        return (0.0, 0.0);
    };
    amounts.fold((first, first), |(min, max), amount| {
        (min.min(amount), max.max(amount))
    })
}

/// Truncated mean of the day-of-month values.
pub fn typical_day(transactions: &[Transaction]) -> u32 {
    if transactions.is_empty() {
        return 0;
    }
    let sum: u64 = transactions
        .iter()
        .map(|transaction| u64::from(transaction.date.day()))
        .sum();
    u32::try_from(sum / (transactions.len() as u64)).unwrap_or(0)
}

/// Active first, then larger average spend, then name.
pub fn compare_subscriptions(left: &Subscription, right: &Subscription) -> Ordering {
    left.status
        .cmp(&right.status)
        .then_with(|| right.avg_amount.abs().total_cmp(&left.avg_amount.abs()))
        .then_with(|| left.name.cmp(&right.name))
}
