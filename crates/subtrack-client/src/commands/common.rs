use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::detection::pipeline::{DetectionOutcome, run_detection};
use crate::detection::subscriptions::ToleranceSettings;
use crate::detection::types::Transaction;
use crate::import::ParserRegistry;
use crate::{ClientError, ClientResult};

/// Inputs shared by every command that reads transaction files.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceSelection<'a> {
    pub files: &'a [String],
    pub source: Option<&'a str>,
    pub config_path: Option<&'a Path>,
    pub tolerance: f64,
}

/// Loaded config plus transactions with config groups already applied.
#[derive(Debug, Clone)]
pub(crate) struct PreparedRun {
    pub config: Config,
    pub transactions: Vec<Transaction>,
    pub tolerances: ToleranceSettings,
}

pub(crate) fn prepare_run(
    selection: SourceSelection<'_>,
    registry: &ParserRegistry,
    command: &str,
) -> ClientResult<PreparedRun> {
    if selection.files.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "At least one transaction file is required.",
            Some(command),
        ));
    }
    let tolerance = validate_tolerance(selection.tolerance, command)?;
    let config = Config::resolve(selection.config_path)?;
    let raw = registry.load_files(selection.files, selection.source)?;
    info!(
        transactions = raw.len(),
        files = selection.files.len(),
        "loaded transactions"
    );

    let grouped = config.apply_groups(&raw);
    Ok(PreparedRun {
        config,
        transactions: grouped.transactions,
        tolerances: ToleranceSettings {
            default: tolerance,
            overrides: grouped.tolerances,
        },
    })
}

/// Runs detection and drops subscriptions matched by config exclusions.
pub(crate) fn detect_for_run(prepared: &PreparedRun) -> DetectionOutcome {
    let mut outcome = run_detection(
        &prepared.transactions,
        prepared.config.known_rules(),
        &prepared.tolerances,
    );
    outcome
        .subscriptions
        .retain(|subscription| !prepared.config.should_exclude(subscription));
    outcome
}

pub(crate) fn validate_tolerance(value: f64, command: &str) -> ClientResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ClientError::invalid_argument_for_command(
            "`tolerance` must be a non-negative number such as 0.35.",
            Some(command),
        ));
    }
    Ok(value)
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
