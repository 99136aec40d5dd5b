use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::detection::policy::{DETECTION_POLICY_V1, DetectionPolicy};
use crate::detection::subscriptions::{build_subscription, compare_subscriptions, sort_chronologically};
use crate::detection::types::{DateRange, Subscription, Transaction};

/// A payee pattern that identifies a subscription from a single occurrence.
///
/// The pattern is compiled case-insensitively at construction, so every rule
/// value is ready to match.
#[derive(Debug, Clone)]
pub struct KnownSubscriptionRule {
    pattern: String,
    regex: Regex,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub before: Option<NaiveDate>,
    pub after: Option<NaiveDate>,
}

impl KnownSubscriptionRule {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            min_amount: None,
            max_amount: None,
            before: None,
            after: None,
        })
    }

    pub fn with_amount_bounds(mut self, min_amount: Option<f64>, max_amount: Option<f64>) -> Self {
        self.min_amount = min_amount;
        self.max_amount = max_amount;
        self
    }

    pub fn with_date_bounds(mut self, before: Option<NaiveDate>, after: Option<NaiveDate>) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Pattern, absolute amount bounds (inclusive), `before` (exclusive) and
    /// `after` (inclusive) must all hold.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if !self.regex.is_match(&transaction.text) {
            return false;
        }

        let amount = transaction.abs_amount();
        if let Some(min) = self.min_amount
            && amount < min
        {
            return false;
        }
        if let Some(max) = self.max_amount
            && amount > max
        {
            return false;
        }

        if let Some(before) = self.before
            && transaction.date >= before
        {
            return false;
        }
        if let Some(after) = self.after
            && transaction.date < after
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnownMatches {
    pub subscriptions: Vec<Subscription>,
    /// Lowercased payee texts consumed by known rules.
    pub matched_names: HashSet<String>,
}

pub fn detect_known_subscriptions(
    transactions: &[Transaction],
    range: &DateRange,
    rules: &[KnownSubscriptionRule],
) -> KnownMatches {
    detect_known_subscriptions_with_policy(transactions, range, rules, DETECTION_POLICY_V1)
}

fn detect_known_subscriptions_with_policy(
    transactions: &[Transaction],
    range: &DateRange,
    rules: &[KnownSubscriptionRule],
    policy: DetectionPolicy,
) -> KnownMatches {
    let mut by_pattern: BTreeMap<&str, Vec<Transaction>> = BTreeMap::new();
    let mut matched_names = HashSet::new();

    for transaction in transactions.iter().filter(|row| row.is_expense()) {
        let Some(rule) = rules.iter().find(|rule| rule.matches(transaction)) else {
            continue;
        };
        matched_names.insert(transaction.name_key());
        by_pattern
            .entry(rule.pattern())
            .or_default()
            .push(transaction.clone());
    }

    let mut subscriptions = Vec::new();
    for (pattern, mut rows) in by_pattern {
        sort_chronologically(&mut rows);
        debug!(pattern, occurrences = rows.len(), "known rule matched");
        if let Some(subscription) = build_subscription(&rows, rows.clone(), range, policy) {
            subscriptions.push(subscription);
        }
    }
    subscriptions.sort_by(compare_subscriptions);

    KnownMatches {
        subscriptions,
        matched_names,
    }
}

/// Drops transactions whose payee text was consumed by a known rule.
pub fn filter_out_matched(
    transactions: &[Transaction],
    matched_names: &HashSet<String>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| !matched_names.contains(&transaction.name_key()))
        .cloned()
        .collect()
}

const VIDEO_STREAMING: &[&str] = &[
    r"NETFLIX",
    r"DISNEY\+",
    r"DISNEYPLUS",
    r"HBO\s*MAX",
    r"HBOMAX",
    r"AMAZON\s*PRIME",
    r"PRIME\s*VIDEO",
    r"APPLE\s*TV",
    r"PARAMOUNT\+",
    r"PARAMOUNTPLUS",
    r"PEACOCK",
    r"HULU",
    r"CRUNCHYROLL",
    r"VIAPLAY",
    r"DISCOVERY\+",
];

const MUSIC_AND_AUDIO: &[&str] = &[
    r"SPOTIFY",
    r"APPLE\s*MUSIC",
    r"TIDAL",
    r"DEEZER",
    r"YOUTUBE\s*(MUSIC|PREMIUM)",
    r"SOUNDCLOUD",
    r"AUDIBLE",
];

const GAMING: &[&str] = &[
    r"XBOX\s*(GAME\s*PASS|LIVE)",
    r"PLAYSTATION\s*(PLUS|NOW)",
    r"PS\s*PLUS",
    r"NINTENDO\s*ONLINE",
    r"EA\s*PLAY",
    r"UBISOFT\+",
    r"GEFORCE\s*NOW",
];

const CLOUD_AND_PRODUCTIVITY: &[&str] = &[
    r"DROPBOX",
    r"GOOGLE\s*(ONE|WORKSPACE|GSUITE)",
    r"ICLOUD",
    r"ONEDRIVE",
    r"MICROSOFT\s*365",
    r"OFFICE\s*365",
    r"ADOBE",
    r"CANVA",
    r"NOTION",
    r"EVERNOTE",
    r"1PASSWORD",
    r"LASTPASS",
    r"BITWARDEN",
    r"DASHLANE",
];

const COMMUNICATION: &[&str] = &[r"ZOOM", r"SLACK", r"DISCORD\s*NITRO"];

const VPN_AND_SECURITY: &[&str] = &[
    r"NORDVPN",
    r"EXPRESSVPN",
    r"SURFSHARK",
    r"MULLVAD",
    r"PROTONVPN",
    r"PROTON\s*(MAIL|DRIVE)",
];

const NEWS_AND_READING: &[&str] = &[
    r"NEW\s*YORK\s*TIMES",
    r"WASHINGTON\s*POST",
    r"WALL\s*STREET\s*JOURNAL",
    r"MEDIUM",
    r"SUBSTACK",
    r"KINDLE\s*UNLIMITED",
    r"SCRIBD",
];

const FITNESS: &[&str] = &[
    r"PELOTON",
    r"STRAVA",
    r"HEADSPACE",
    r"CALM",
    r"MYFITNESSPAL",
    r"FITBIT\s*PREMIUM",
];

const DEVELOPER_TOOLS: &[&str] = &[
    r"GITHUB",
    r"GITLAB",
    r"JETBRAINS",
    r"DIGITALOCEAN",
    r"HEROKU",
    r"NETLIFY",
    r"VERCEL",
];

pub const DEFAULT_CATALOG: &[(&str, &[&str])] = &[
    ("video", VIDEO_STREAMING),
    ("music", MUSIC_AND_AUDIO),
    ("gaming", GAMING),
    ("cloud", CLOUD_AND_PRODUCTIVITY),
    ("communication", COMMUNICATION),
    ("vpn", VPN_AND_SECURITY),
    ("news", NEWS_AND_READING),
    ("fitness", FITNESS),
    ("developer", DEVELOPER_TOOLS),
];

/// Built-in rules in catalog order, without amount or date bounds.
pub fn default_rules() -> Vec<KnownSubscriptionRule> {
    DEFAULT_CATALOG
        .iter()
        .flat_map(|(_, patterns)| patterns.iter())
        .filter_map(|pattern| KnownSubscriptionRule::new(pattern).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::detection::types::{DateRange, SubscriptionStatus, tx};

    use super::{
        DEFAULT_CATALOG, KnownSubscriptionRule, default_rules, detect_known_subscriptions,
        filter_out_matched,
    };

    fn date(value: &str) -> NaiveDate {
        let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
        assert!(parsed.is_ok());
        parsed.unwrap_or(NaiveDate::MIN)
    }

    fn rule(pattern: &str) -> KnownSubscriptionRule {
        let compiled = KnownSubscriptionRule::new(pattern);
        assert!(compiled.is_ok());
        match compiled {
            Ok(value) => value,
            Err(_) => unreachable!(),
        }
    }

    #[test]
    fn every_catalog_pattern_compiles() {
        let expected: usize = DEFAULT_CATALOG
            .iter()
            .map(|(_, patterns)| patterns.len())
            .sum();
        assert_eq!(default_rules().len(), expected);
        assert!(expected >= 70);
    }

    #[test]
    fn matching_is_case_insensitive_and_bounded() {
        let bounded = rule("spotify")
            .with_amount_bounds(Some(50.0), Some(200.0))
            .with_date_bounds(Some(date("2025-01-01")), Some(date("2024-06-01")));

        assert!(bounded.matches(&tx("2024-06-01", "SPOTIFY AB", -119.0)));
        assert!(bounded.matches(&tx("2024-12-31", "Spotify", -200.0)));
        assert!(!bounded.matches(&tx("2025-01-01", "Spotify", -119.0)));
        assert!(!bounded.matches(&tx("2024-05-31", "Spotify", -119.0)));
        assert!(!bounded.matches(&tx("2024-08-01", "Spotify", -20.0)));
        assert!(!bounded.matches(&tx("2024-08-01", "Spotify", -250.0)));
        assert!(!bounded.matches(&tx("2024-08-01", "Apple", -119.0)));
    }

    #[test]
    fn single_current_month_occurrence_is_reported() {
        let range = DateRange {
            start: date("2024-09-01"),
            end: date("2025-01-10"),
        };
        let rows = vec![
            tx("2025-01-03", "NETFLIX.COM", -129.0),
            tx("2025-01-04", "Grocery", -300.0),
            tx("2025-01-05", "Netflix refund", 129.0),
        ];
        let result = detect_known_subscriptions(&rows, &range, &default_rules());
        assert_eq!(result.subscriptions.len(), 1);
        let subscription = &result.subscriptions[0];
        assert_eq!(subscription.name, "NETFLIX.COM");
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(subscription.typical_day, 3);
        assert!(result.matched_names.contains("netflix.com"));
        assert!(!result.matched_names.contains("netflix refund"));

        let remaining = filter_out_matched(&rows, &result.matched_names);
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn first_matching_rule_wins_and_groups_by_pattern() {
        let range = DateRange {
            start: date("2024-10-01"),
            end: date("2024-12-31"),
        };
        let rules = vec![rule("apple\\s*music"), rule("apple")];
        let rows = vec![
            tx("2024-10-02", "APPLE MUSIC", -59.0),
            tx("2024-11-02", "Apple Music", -59.0),
            tx("2024-11-20", "APPLE STORE", -15.0),
        ];
        let result = detect_known_subscriptions(&rows, &range, &rules);
        assert_eq!(result.subscriptions.len(), 2);
        assert_eq!(result.subscriptions[0].name, "Apple Music");
        assert_eq!(result.subscriptions[0].transactions.len(), 2);
        assert_eq!(result.subscriptions[1].name, "APPLE STORE");
        assert_eq!(result.matched_names.len(), 2);
    }

    #[test]
    fn same_day_payees_name_the_subscription_by_greatest_text() {
        let range = DateRange {
            start: date("2024-10-01"),
            end: date("2024-12-20"),
        };
        let mut rows = vec![
            tx("2024-11-05", "SPOTIFY A", -119.0),
            tx("2024-12-05", "SPOTIFY A", -119.0),
            tx("2024-12-05", "Spotify B", -119.0),
        ];
        for _ in 0..2 {
            let result = detect_known_subscriptions(&rows, &range, &[rule("spotify")]);
            assert_eq!(result.subscriptions.len(), 1);
            assert_eq!(result.subscriptions[0].name, "Spotify B");
            assert_eq!(result.subscriptions[0].latest_amount, -119.0);
            rows.reverse();
        }
    }
}
