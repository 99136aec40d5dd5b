/// Detection policy identifier emitted with every result.
pub const DETECTION_POLICY_VERSION: &str = "subscriptions/v1";

/// Frozen thresholds for subscription detection and group suggestion.
#[derive(Debug, Clone, Copy)]
pub struct DetectionPolicy {
    pub min_occurrences: usize,
    pub grace_period_days: i64,
    pub default_tolerance: f64,
    pub min_complete_months_warning: usize,
    pub orphan_max_occurrences: usize,
    pub suggestion_min_names: usize,
    pub suggestion_min_transactions: usize,
    pub word_prefix_min_chars: usize,
    pub char_prefix_lengths: [usize; 4],
    pub min_new_coverage: f64,
}

impl DetectionPolicy {
    pub fn is_orphan(self, occurrences: usize) -> bool {
        occurrences <= self.orphan_max_occurrences
    }

    pub fn adds_enough_coverage(self, new_names: usize, total_names: usize) -> bool {
        if total_names == 0 {
            return false;
        }
        (new_names as f64) / (total_names as f64) > self.min_new_coverage
    }
}

pub const DETECTION_POLICY_V1: DetectionPolicy = DetectionPolicy {
    min_occurrences: 2,
    grace_period_days: 5,
    default_tolerance: 0.35,
    min_complete_months_warning: 3,
    orphan_max_occurrences: 2,
    suggestion_min_names: 3,
    suggestion_min_transactions: 3,
    word_prefix_min_chars: 3,
    char_prefix_lengths: [6, 8, 10, 12],
    min_new_coverage: 0.5,
};
