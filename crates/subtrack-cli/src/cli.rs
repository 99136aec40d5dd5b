use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use subtrack_client::commands::detect::{SortDirection, SortField, StatusFilter};

pub const DEFAULT_TOLERANCE: f64 = 0.35;

pub fn parse_show(value: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(value).ok_or_else(|| "show must be one of: active, stopped, all".to_string())
}

pub fn parse_sort(value: &str) -> Result<SortField, String> {
    SortField::parse(value)
        .ok_or_else(|| "sort must be one of: name, description, amount".to_string())
}

pub fn parse_sort_dir(value: &str) -> Result<SortDirection, String> {
    SortDirection::parse(value).ok_or_else(|| "sort-dir must be one of: asc, desc".to_string())
}

pub fn parse_tolerance(value: &str) -> Result<f64, String> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| "tolerance must be a number such as 0.35".to_string())?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err("tolerance must be a finite number greater than or equal to 0".to_string());
    }
    Ok(parsed)
}

pub fn parse_currency(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err("currency must be a three-letter code such as SEK or USD".to_string());
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Extended help shown after `subtrack detect --help`.
pub const DETECT_AFTER_HELP: &str = "\
File arguments:
  Each file may carry a format prefix, e.g. `simple-csv:bank.csv`.
  Without a prefix, `--source` is used, then the file extension.
  Run `subtrack sources` to list the available formats.

How detection works:
  1. Payments matching known services (and your `known:` rules) are
     reported even if they only appear once.
  2. Everything else needs at least two consecutive months of payments
     with amounts within the tolerance of each other.
  3. A subscription is stopped when its billing day plus five days of
     grace has passed without a new payment.

Configuration:
  ~/.subtrack/config.yaml (or $SUBTRACK_CONFIG, or --config).
  Run `subtrack init-config --help` to generate a starting file.
";

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Transaction files, optionally prefixed with a format (`simple-csv:bank.csv`)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,
    /// Format to use for files without a prefix
    #[arg(long)]
    pub source: Option<String>,
    /// Path to the YAML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Maximum relative amount variation between consecutive payments
    #[arg(long, value_parser = parse_tolerance, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

#[derive(Debug, Parser)]
#[command(
    name = "subtrack",
    version,
    about = "Find recurring subscriptions in bank transaction exports",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log detection stages to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect subscriptions in one or more transaction files
    #[command(after_help = DETECT_AFTER_HELP)]
    Detect {
        #[command(flatten)]
        input: InputArgs,
        /// Which subscriptions to show
        #[arg(long, value_parser = parse_show, default_value = "active")]
        show: StatusFilter,
        /// Column to sort by
        #[arg(long, value_parser = parse_sort, default_value = "name")]
        sort: SortField,
        /// Sort direction
        #[arg(long = "sort-dir", value_parser = parse_sort_dir, default_value = "asc")]
        sort_dir: SortDirection,
        /// Only show subscriptions carrying this tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Currency code used for totals (default: detected from the locale)
        #[arg(long, value_parser = parse_currency)]
        currency: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Suggest config groups for merchants whose names vary between payments
    SuggestGroups {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write a config template listing every detected subscription
    InitConfig {
        /// Where to write the config file
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[command(flatten)]
        input: InputArgs,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
        #[arg(long)]
        json: bool,
    },
    /// List the supported transaction file formats
    Sources {
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
