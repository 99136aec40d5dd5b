mod error_text;
mod format;
mod json;
mod mode;
mod money;
mod setup_text;
mod subscriptions_text;
mod suggestions_text;

use std::io;

use subtrack_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "detect" => subscriptions_text::render_subscriptions(&success.data),
        "suggest-groups" => suggestions_text::render_suggestions(&success.data),
        "init-config" => setup_text::render_init_config(&success.data),
        "sources" => setup_text::render_sources(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
