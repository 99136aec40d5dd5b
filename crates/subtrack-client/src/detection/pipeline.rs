use tracing::{debug, info};

use crate::detection::coverage::{DataCoverage, analyze_coverage, filter_to_complete_months};
use crate::detection::known::{KnownSubscriptionRule, detect_known_subscriptions, filter_out_matched};
use crate::detection::subscriptions::{
    ToleranceSettings, compare_subscriptions, detect_subscriptions_with_tolerances,
};
use crate::detection::types::{Subscription, Transaction};

#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    pub coverage: DataCoverage,
    pub subscriptions: Vec<Subscription>,
    pub known_count: usize,
    pub pattern_count: usize,
}

/// Runs known-rule matching and pattern detection over one transaction set.
///
/// Known rules see every transaction, including the incomplete final month.
/// Payees they consume are removed before pattern detection, which only
/// establishes patterns from complete months.
pub fn run_detection(
    transactions: &[Transaction],
    rules: &[KnownSubscriptionRule],
    tolerances: &ToleranceSettings,
) -> DetectionOutcome {
    let coverage = analyze_coverage(transactions);
    let Some(range) = coverage.date_range else {
        debug!("no transactions to analyze");
        return DetectionOutcome::default();
    };
    debug!(
        start = %range.start,
        end = %range.end,
        complete_months = coverage.complete_month_count(),
        "analyzed data coverage"
    );

    let known = detect_known_subscriptions(transactions, &range, rules);
    let remaining = filter_out_matched(transactions, &known.matched_names);
    let complete = filter_to_complete_months(&remaining, &coverage);
    let detected = detect_subscriptions_with_tolerances(&complete, &remaining, &range, tolerances);

    let known_count = known.subscriptions.len();
    let pattern_count = detected.len();
    info!(
        transactions = transactions.len(),
        known = known_count,
        detected = pattern_count,
        "subscription detection finished"
    );

    let mut subscriptions = known.subscriptions;
    subscriptions.extend(detected);
    subscriptions.sort_by(compare_subscriptions);

    DetectionOutcome {
        coverage,
        subscriptions,
        known_count,
        pattern_count,
    }
}
