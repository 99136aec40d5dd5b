use std::cmp::Ordering;
use std::path::PathBuf;

use crate::ClientResult;
use crate::commands::common::{PreparedRun, SourceSelection, detect_for_run, prepare_run, round_to};
use crate::config::Config;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    CostSummary, CoverageSummary, DisplayFilter, SubscriptionCounts, SubscriptionRow,
    SubscriptionsData,
};
use crate::currency::resolve_currency;
use crate::detection::coverage::DataCoverage;
use crate::detection::date::format_iso_date;
use crate::detection::policy::{DETECTION_POLICY_V1, DETECTION_POLICY_VERSION};
use crate::detection::types::{Subscription, SubscriptionStatus};
use crate::import::ParserRegistry;

pub const COMMAND: &str = "detect";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Active,
    Stopped,
    All,
}

impl StatusFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Stopped => "stopped",
            Self::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "stopped" => Some(Self::Stopped),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn includes(self, status: SubscriptionStatus) -> bool {
        match self {
            Self::Active => status == SubscriptionStatus::Active,
            Self::Stopped => status == SubscriptionStatus::Stopped,
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Description,
    Amount,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Amount => "amount",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "amount" => Some(Self::Amount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectRunOptions {
    pub files: Vec<String>,
    pub source: Option<String>,
    pub config_path: Option<PathBuf>,
    pub tolerance: f64,
    pub show: StatusFilter,
    pub sort: SortField,
    pub sort_dir: SortDirection,
    pub tags: Vec<String>,
    pub currency: Option<String>,
}

impl Default for DetectRunOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            source: None,
            config_path: None,
            tolerance: DETECTION_POLICY_V1.default_tolerance,
            show: StatusFilter::default(),
            sort: SortField::default(),
            sort_dir: SortDirection::default(),
            tags: Vec::new(),
            currency: None,
        }
    }
}

pub fn run(options: DetectRunOptions) -> ClientResult<SuccessEnvelope> {
    run_with_registry(options, &ParserRegistry::with_builtin())
}

#[doc(hidden)]
pub fn run_with_registry(
    options: DetectRunOptions,
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
    let outcome = detect_for_run(&prepared);

    let counts = count_statuses(&outcome.subscriptions);
    let mut displayed = outcome
        .subscriptions
        .iter()
        .filter(|subscription| options.show.includes(subscription.status))
        .filter(|subscription| has_any_tag(&prepared.config, subscription, &options.tags))
        .collect::<Vec<&Subscription>>();
    sort_for_display(
        &mut displayed,
        &prepared.config,
        options.sort,
        options.sort_dir,
    );

    let rows = displayed
        .iter()
        .map(|subscription| subscription_row(subscription, &prepared.config))
        .collect::<Vec<SubscriptionRow>>();
    let monthly_total = displayed
        .iter()
        .filter(|subscription| subscription.is_active())
        .map(|subscription| subscription.latest_amount.abs())
        .sum::<f64>();

    let data = SubscriptionsData {
        policy_version: DETECTION_POLICY_VERSION.to_string(),
        config_path: prepared
            .config
            .path()
            .map(|path| path.display().to_string()),
        transaction_count: prepared.transactions.len(),
        coverage: coverage_summary(&outcome.coverage),
        counts,
        filter: DisplayFilter {
            show: options.show.as_str().to_string(),
            tags: options.tags.clone(),
            sort: options.sort.as_str().to_string(),
            sort_dir: options.sort_dir.as_str().to_string(),
        },
        summary: CostSummary {
            count: rows.len(),
            monthly_total: round_to(monthly_total, 2),
            yearly_total: round_to(monthly_total * 12.0, 2),
            currency: resolve_currency(options.currency.as_deref()),
        },
        subscriptions: rows,
        warnings: coverage_warnings(&prepared, &outcome.coverage),
    };

    success(COMMAND, data)
}

pub(crate) fn coverage_summary(coverage: &DataCoverage) -> CoverageSummary {
    CoverageSummary {
        start: coverage
            .date_range
            .map(|range| format_iso_date(&range.start)),
        end: coverage.date_range.map(|range| format_iso_date(&range.end)),
        complete_months: coverage
            .complete_months
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

pub(crate) fn coverage_warnings(prepared: &PreparedRun, coverage: &DataCoverage) -> Vec<String> {
    if prepared.transactions.is_empty() {
        return vec!["No transactions were found in the input files.".to_string()];
    }
    let minimum = DETECTION_POLICY_V1.min_complete_months_warning;
    if coverage.complete_month_count() < minimum {
        return vec![format!(
            "Less than {minimum} complete months of data. Subscription detection may be unreliable."
        )];
    }
    Vec::new()
}

fn count_statuses(subscriptions: &[Subscription]) -> SubscriptionCounts {
    let active = subscriptions
        .iter()
        .filter(|subscription| subscription.is_active())
        .count();
    SubscriptionCounts {
        total: subscriptions.len(),
        active,
        stopped: subscriptions.len() - active,
    }
}

/// Case-insensitive; an empty filter keeps everything.
fn has_any_tag(config: &Config, subscription: &Subscription, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let tags = config.tags(&subscription.name);
    wanted
        .iter()
        .any(|filter| tags.iter().any(|tag| tag.eq_ignore_ascii_case(filter)))
}

fn sort_for_display(
    subscriptions: &mut [&Subscription],
    config: &Config,
    field: SortField,
    direction: SortDirection,
) {
    subscriptions.sort_by(|left, right| {
        let ordering = compare_for_display(left, right, config, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_for_display(
    left: &Subscription,
    right: &Subscription,
    config: &Config,
    field: SortField,
) -> Ordering {
    match field {
        SortField::Amount => left
            .avg_amount
            .abs()
            .total_cmp(&right.avg_amount.abs())
            .then_with(|| left.name.cmp(&right.name)),
        SortField::Description => {
            let label = |subscription: &Subscription| {
                config
                    .description(&subscription.name)
                    .unwrap_or(&subscription.name)
                    .to_lowercase()
            };
            label(left)
                .cmp(&label(right))
                .then_with(|| left.name.cmp(&right.name))
        }
        SortField::Name => left
            .name
            .to_lowercase()
            .cmp(&right.name.to_lowercase())
            .then_with(|| left.name.cmp(&right.name)),
    }
}

fn subscription_row(subscription: &Subscription, config: &Config) -> SubscriptionRow {
    let latest = subscription.latest_amount.abs();
    SubscriptionRow {
        name: subscription.name.clone(),
        description: config.description(&subscription.name).map(str::to_string),
        tags: config.tags(&subscription.name).to_vec(),
        status: subscription.status.as_str().to_string(),
        typical_day: subscription.typical_day,
        start_date: format_iso_date(&subscription.start_date),
        last_date: format_iso_date(&subscription.last_date),
        latest_amount: round_to(latest, 2),
        average_amount: round_to(subscription.avg_amount.abs(), 2),
        min_amount: round_to(subscription.min_amount, 2),
        max_amount: round_to(subscription.max_amount, 2),
        yearly_cost: round_to(latest * 12.0, 2),
        transaction_count: subscription.transactions.len(),
    }
}
