use subtrack_client::commands;
use subtrack_client::commands::detect::DetectRunOptions;
use subtrack_client::commands::init_config::InitConfigRunOptions;
use subtrack_client::commands::suggest::SuggestRunOptions;
use subtrack_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, InputArgs};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Detect {
            input,
            show,
            sort,
            sort_dir,
            tags,
            currency,
            json: _,
        } => commands::detect::run(DetectRunOptions {
            files: input.files.clone(),
            source: input.source.clone(),
            config_path: input.config.clone(),
            tolerance: input.tolerance,
            show: *show,
            sort: *sort,
            sort_dir: *sort_dir,
            tags: tags.clone(),
            currency: currency.clone(),
        }),
        Commands::SuggestGroups { input, .. } => commands::suggest::run(suggest_options(input)),
        Commands::InitConfig {
            path, input, force, ..
        } => commands::init_config::run(InitConfigRunOptions {
            output_path: path.clone(),
            files: input.files.clone(),
            source: input.source.clone(),
            config_path: input.config.clone(),
            tolerance: input.tolerance,
            force: *force,
        }),
        Commands::Sources { .. } => commands::sources::run(),
    }
}

fn suggest_options(input: &InputArgs) -> SuggestRunOptions {
    SuggestRunOptions {
        files: input.files.clone(),
        source: input.source.clone(),
        config_path: input.config.clone(),
        tolerance: input.tolerance,
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::parse_from;

    use super::dispatch;

    #[test]
    fn sources_dispatches_without_reading_files() {
        let parsed = parse_from(["subtrack", "sources"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let result = dispatch(&cli);
            assert!(result.is_ok());
            if let Ok(success) = result {
                assert_eq!(success.command, "sources");
            }
        }
    }

    #[test]
    fn detect_reports_missing_files_as_client_errors() {
        let parsed = parse_from([
            "subtrack",
            "detect",
            "/definitely/not/here/transactions.csv",
            "--config",
            "/definitely/not/here/config.yaml",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let result = dispatch(&cli);
            assert!(result.is_err());
            if let Err(error) = result {
                assert!(!error.code.starts_with("internal_"));
            }
        }
    }
}
