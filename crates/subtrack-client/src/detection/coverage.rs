use std::collections::BTreeSet;

use chrono::Datelike;

use crate::detection::date::MonthKey;
use crate::detection::types::{DateRange, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataCoverage {
    pub complete_months: BTreeSet<MonthKey>,
    pub date_range: Option<DateRange>,
}

impl DataCoverage {
    pub fn is_complete(&self, month: MonthKey) -> bool {
        self.complete_months.contains(&month)
    }

    pub fn complete_month_count(&self) -> usize {
        self.complete_months.len()
    }
}

/// Determines which calendar months the input fully covers.
///
/// Every month from the earliest transaction's month up to (but excluding) the
/// latest transaction's month is complete. The final month only counts when
/// the latest transaction falls on its last calendar day.
pub fn analyze_coverage(transactions: &[Transaction]) -> DataCoverage {
    let Some(first) = transactions.first() else {
        return DataCoverage::default();
    };

    let mut start = first.date;
    let mut end = first.date;
    for transaction in transactions {
        start = start.min(transaction.date);
        end = end.max(transaction.date);
    }

    let last_month = MonthKey::from_date(end);
    let mut complete_months = BTreeSet::new();
    let mut cursor = MonthKey::from_date(start);
    while cursor < last_month {
        complete_months.insert(cursor);
        cursor = cursor.next();
    }
    if end.day() == last_month.last_day() {
        complete_months.insert(last_month);
    }

    DataCoverage {
        complete_months,
        date_range: Some(DateRange { start, end }),
    }
}

pub fn filter_to_complete_months(
    transactions: &[Transaction],
    coverage: &DataCoverage,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| coverage.is_complete(transaction.month_key()))
        .cloned()
        .collect()
}
