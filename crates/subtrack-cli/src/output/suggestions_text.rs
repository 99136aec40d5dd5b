use std::io;

use serde_json::Value;

const MAX_LISTED_NAMES: usize = 5;

pub fn render_suggestions(data: &Value) -> io::Result<String> {
    let suggestions = data
        .get("suggestions")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("suggest-groups output is missing `suggestions`"))?;

    if suggestions.is_empty() {
        return Ok([
            "No group suggestions found.",
            "",
            "Merchants whose names change between payments will show up here once",
            "there are enough months of data to tell them apart from one-off spending.",
        ]
        .join("\n"));
    }

    let mut lines = vec![
        format!("Found {} potential group(s):", suggestions.len()),
        String::new(),
    ];
    for (index, suggestion) in suggestions.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.extend(render_one(suggestion));
    }
    Ok(lines.join("\n"))
}

fn render_one(suggestion: &Value) -> Vec<String> {
    let prefix = suggestion
        .get("prefix")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let months = suggestion
        .get("month_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let payments = suggestion
        .get("transaction_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let names = suggestion
        .get("names")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect::<Vec<&str>>())
        .unwrap_or_default();

    let mut lines = vec![format!(
        "  {prefix}  ({} names, {payments} payments over {months} months)",
        names.len()
    )];
    lines.extend(
        names
            .iter()
            .take(MAX_LISTED_NAMES)
            .map(|name| format!("    - {name}")),
    );
    if names.len() > MAX_LISTED_NAMES {
        lines.push(format!(
            "    ... and {} more",
            names.len() - MAX_LISTED_NAMES
        ));
    }

    if let Some(snippet) = suggestion.get("config_snippet").and_then(Value::as_str) {
        lines.push("  Add to config (under `groups:`):".to_string());
        lines.extend(snippet.lines().map(|line| format!("    {line}")));
    }
    lines
}
