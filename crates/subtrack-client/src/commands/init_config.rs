use std::path::PathBuf;

use tracing::info;

use crate::commands::common::{SourceSelection, detect_for_run, prepare_run};
use crate::config::generate_template;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::InitConfigData;
use crate::detection::policy::DETECTION_POLICY_V1;
use crate::import::ParserRegistry;
use crate::{ClientError, ClientResult};

pub const COMMAND: &str = "init-config";

#[derive(Debug, Clone)]
pub struct InitConfigRunOptions {
    pub output_path: PathBuf,
    pub files: Vec<String>,
    pub source: Option<String>,
    pub config_path: Option<PathBuf>,
    pub tolerance: f64,
    pub force: bool,
}

impl Default for InitConfigRunOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::new(),
            files: Vec::new(),
            source: None,
            config_path: None,
            tolerance: DETECTION_POLICY_V1.default_tolerance,
            force: false,
        }
    }
}

pub fn run(options: InitConfigRunOptions) -> ClientResult<SuccessEnvelope> {
    run_with_registry(options, &ParserRegistry::with_builtin())
}

/// Detects subscriptions and writes a config template naming each of them.
#[doc(hidden)]
pub fn run_with_registry(
    options: InitConfigRunOptions,
    registry: &ParserRegistry,
) -> ClientResult<SuccessEnvelope> {
    if options.output_path.as_os_str().is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "An output path for the config template is required.",
            Some(COMMAND),
        ));
    }
    if options.output_path.exists() && !options.force {
        return Err(ClientError::invalid_argument_with_recovery(
            &format!(
                "`{}` already exists.",
                options.output_path.display()
            ),
            vec![
                "Choose another output path.".to_string(),
                "Pass `--force` to overwrite the existing file.".to_string(),
            ],
        ));
    }

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
    let template = generate_template(&outcome.subscriptions);
    template.save(&options.output_path)?;
    info!(
        path = %options.output_path.display(),
        subscriptions = template.descriptions.len(),
        "wrote config template"
    );

    success(
        COMMAND,
        InitConfigData {
            path: options.output_path.display().to_string(),
            subscription_count: template.descriptions.len(),
            names: template.descriptions.keys().cloned().collect(),
        },
    )
}
