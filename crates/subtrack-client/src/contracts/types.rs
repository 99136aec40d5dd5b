use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CoverageSummary {
    pub start: Option<String>,
    pub end: Option<String>,
    pub complete_months: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub status: String,
    pub typical_day: u32,
    pub start_date: String,
    pub last_date: String,
    pub latest_amount: f64,
    pub average_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub yearly_cost: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCounts {
    pub total: usize,
    pub active: usize,
    pub stopped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostSummary {
    pub count: usize,
    pub monthly_total: f64,
    pub yearly_total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayFilter {
    pub show: String,
    pub tags: Vec<String>,
    pub sort: String,
    pub sort_dir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionsData {
    pub policy_version: String,
    pub config_path: Option<String>,
    pub transaction_count: usize,
    pub coverage: CoverageSummary,
    pub counts: SubscriptionCounts,
    pub filter: DisplayFilter,
    pub subscriptions: Vec<SubscriptionRow>,
    pub summary: CostSummary,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSuggestionRow {
    pub prefix: String,
    pub pattern: String,
    pub names: Vec<String>,
    pub month_count: usize,
    pub transaction_count: usize,
    pub config_snippet: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsData {
    pub policy_version: String,
    pub transaction_count: usize,
    pub tolerance: f64,
    pub suggestions: Vec<GroupSuggestionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitConfigData {
    pub path: String,
    pub subscription_count: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRow {
    pub name: String,
    pub description: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcesData {
    pub sources: Vec<SourceRow>,
}
