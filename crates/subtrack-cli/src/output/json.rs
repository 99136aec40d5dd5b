use std::io;

use serde::Serialize;
use serde_json::{Value, json};
use subtrack_client::{ClientError, SuccessEnvelope};

/// Detect results are printed as the bare data object so scripts can read
/// `subscriptions` and `summary` at the top level; other commands keep the
/// envelope.
pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "detect" => success.data.clone(),
        "suggest-groups" | "init-config" | "sources" => json!({
            "ok": true,
            "version": success.version,
            "data": success.data.clone(),
        }),
        _ => {
            return Err(io::Error::other(format!(
                "JSON output is not supported for command `{}`",
                success.command
            )));
        }
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    if let Some(data) = &error.data
        && let Some(object) = payload.get_mut("error").and_then(Value::as_object_mut)
    {
        object.insert("data".to_string(), data.clone());
    }
    serialize_json_pretty(&payload)
}

fn serialize_json_pretty<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use subtrack_client::{ClientError, SuccessEnvelope};

    use super::{render_error_json, render_success_json};

    fn envelope(command: &str, data: Value) -> SuccessEnvelope {
        SuccessEnvelope {
            ok: true,
            command: command.to_string(),
            version: "v1".to_string(),
            data,
        }
    }

    #[test]
    fn detect_json_exposes_subscriptions_at_top_level() {
        let rendered = render_success_json(&envelope(
            "detect",
            json!({"subscriptions": [], "summary": {"count": 0}}),
        ));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed = serde_json::from_str::<Value>(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert!(value.get("subscriptions").is_some());
                assert_eq!(value["summary"]["count"], 0);
                assert!(value.get("ok").is_none());
            }
        }
    }

    #[test]
    fn other_commands_are_wrapped() {
        let rendered = render_success_json(&envelope("sources", json!({"sources": []})));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("\"ok\": true"));
            assert!(text.contains("\"sources\""));
        }
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(render_success_json(&envelope("mystery", json!({}))).is_err());
    }

    #[test]
    fn error_json_carries_recovery_steps() {
        let error = ClientError::invalid_argument_with_recovery(
            "bad input",
            vec!["Run `subtrack --help`.".to_string()],
        );
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed = serde_json::from_str::<Value>(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["error"]["code"], "invalid_argument");
                assert_eq!(value["error"]["recovery_steps"][0], "Run `subtrack --help`.");
            }
        }
    }
}
