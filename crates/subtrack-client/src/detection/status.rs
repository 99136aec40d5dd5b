use chrono::{Duration, NaiveDate};

use crate::detection::date::MonthKey;
use crate::detection::policy::{DETECTION_POLICY_V1, DetectionPolicy};
use crate::detection::types::SubscriptionStatus;

pub fn determine_status(
    last_payment: NaiveDate,
    typical_day: u32,
    data_end: NaiveDate,
) -> SubscriptionStatus {
    determine_status_with_policy(last_payment, typical_day, data_end, DETECTION_POLICY_V1)
}

/// Classifies a subscription from where its last payment sits relative to the
/// end of the data.
///
/// A payment in the final data month is active. A gap of more than one month
/// is stopped. With exactly one month between them, the payment is still
/// considered pending until the grace period after the expected billing day
/// in the final month has elapsed.
pub fn determine_status_with_policy(
    last_payment: NaiveDate,
    typical_day: u32,
    data_end: NaiveDate,
    policy: DetectionPolicy,
) -> SubscriptionStatus {
    let last_month = MonthKey::from_date(last_payment);
    let end_month = MonthKey::from_date(data_end);
    let months_diff = last_month.months_until(end_month);

    if months_diff <= 0 {
        return SubscriptionStatus::Active;
    }
    if months_diff > 1 {
        return SubscriptionStatus::Stopped;
    }

    let Some(expected) = end_month.clamped_day(typical_day) else {
        return SubscriptionStatus::Stopped;
    };
    let grace_end = expected + Duration::days(policy.grace_period_days);
    if data_end > grace_end {
        SubscriptionStatus::Stopped
    } else {
        SubscriptionStatus::Active
    }
}
