use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const CONFIG_HELP_COMMAND: &str = "subtrack init-config --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `subtrack {cmd} --help` for usage."),
            None => "Run `subtrack --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn unknown_source(name: &str, available: &[&str]) -> Self {
        Self::new(
            "unknown_source",
            &format!("Unknown source format `{name}`."),
            vec![
                format!("Use one of: {}.", available.join(", ")),
                "Run `subtrack sources` to list supported formats.".to_string(),
            ],
        )
        .with_data(json!({
            "source": name,
            "available_sources": available,
        }))
    }

    pub fn undetected_source(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "unknown_source",
            &format!("Could not infer the source format of `{location}`."),
            vec![
                "Pass `--source <format>` or prefix the file as `<format>:<path>`.".to_string(),
                "Run `subtrack sources` to list supported formats.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn source_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "source_read_failed",
            &format!("Could not read transaction file `{location}`: {detail}"),
            vec!["Verify the path exists and is readable.".to_string()],
        )
    }

    pub fn source_parse_failed(path: &Path, source: &str, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "source_parse_failed",
            &format!("Could not parse `{location}` as {source}: {detail}"),
            vec![
                format!("Confirm the file is a `{source}` export."),
                "Pass a different `--source` if the format was guessed wrong.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
            "source": source,
        }))
    }

    pub fn config_not_found(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_not_found",
            &format!("Config file `{location}` does not exist."),
            vec![
                "Check the `--config` path.".to_string(),
                format!("Create one with `subtrack init-config {location} <files>`."),
            ],
        )
    }

    pub fn config_invalid(message: &str) -> Self {
        Self::new(
            "config_invalid",
            message,
            vec![
                "Fix the config file and rerun the command.".to_string(),
                format!("Run `{CONFIG_HELP_COMMAND}` to generate a fresh template."),
            ],
        )
    }

    pub fn config_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_write_failed",
            &format!("Could not write config file `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or choose another path."
            )],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ClientError;

    #[test]
    fn command_hint_is_attached_for_scoped_arguments() {
        let error = ClientError::invalid_argument_for_command("bad", Some("detect"));
        assert_eq!(error.code, "invalid_argument");
        assert_eq!(
            error.recovery_steps,
            vec!["Run `subtrack detect --help` for usage.".to_string()]
        );
        assert!(error.data.is_some());
    }

    #[test]
    fn unknown_source_lists_alternatives() {
        let error = ClientError::unknown_source("ofx", &["simple-json", "simple-csv"]);
        assert_eq!(error.code, "unknown_source");
        assert!(error.recovery_steps[0].contains("simple-json, simple-csv"));
        let error = ClientError::undetected_source(Path::new("data.txt"));
        assert!(error.message.contains("data.txt"));
    }
}
