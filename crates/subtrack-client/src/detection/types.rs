use chrono::NaiveDate;

use crate::detection::date::MonthKey;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub text: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(date: NaiveDate, text: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            text: text.into(),
            amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// Case-insensitive payee key used for grouping and known-match bookkeeping.
    pub fn name_key(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriptionStatus {
    Active,
    Stopped,
}

impl SubscriptionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Stopped => "stopped",
        }
    }
}

/// A payee classified as a monthly recurring charge.
///
/// `transactions` is sorted ascending by date; `start_date` and `last_date`
/// are its first and last dates. `min_amount` and `max_amount` are absolute
/// values while `avg_amount` and `latest_amount` keep the expense sign.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub name: String,
    pub avg_amount: f64,
    pub latest_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub transactions: Vec<Transaction>,
    pub start_date: NaiveDate,
    pub last_date: NaiveDate,
    pub typical_day: u32,
    pub status: SubscriptionStatus,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSuggestion {
    pub prefix: String,
    pub pattern: String,
    pub names: Vec<String>,
    pub month_count: usize,
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
pub(crate) fn tx(date: &str, text: &str, amount: f64) -> Transaction {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d");
    assert!(parsed.is_ok(), "bad test date {date}");
    Transaction::new(parsed.unwrap_or(NaiveDate::MIN), text, amount)
}
