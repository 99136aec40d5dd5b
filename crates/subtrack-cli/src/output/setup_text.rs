use std::io;

use serde_json::Value;

use super::format::{Column, render_table};

pub fn render_init_config(data: &Value) -> io::Result<String> {
    let path = data
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("init-config output is missing `path`"))?;
    let count = data
        .get("subscription_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let mut lines = vec![format!(
        "Wrote {path} with {count} detected subscription(s)."
    )];
    if count > 0 {
        lines.push(String::new());
        lines.push("Next steps:".to_string());
        lines.push(format!(
            "  1. Fill in the empty descriptions in {path}."
        ));
        lines.push(format!(
            "  2. Run `subtrack detect --config {path} <files>` to see them in the table."
        ));
    }
    Ok(lines.join("\n"))
}

pub fn render_sources(data: &Value) -> io::Result<String> {
    let sources = data
        .get("sources")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("sources output is missing `sources`"))?;

    let rows = sources
        .iter()
        .map(|source| {
            let field = |key: &str| {
                source
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let extensions = source
                .get("extensions")
                .and_then(Value::as_array)
                .map(|values| {
                    values
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|extension| format!(".{extension}"))
                        .collect::<Vec<String>>()
                        .join(", ")
                })
                .unwrap_or_default();
            vec![field("name"), extensions, field("description")]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Supported formats:".to_string(), String::new()];
    lines.extend(render_table(
        &[
            Column::left("Name"),
            Column::left("Extensions"),
            Column::left("Description"),
        ],
        &rows,
        None,
    ));
    lines.push(String::new());
    lines.push("Prefix a file with `<name>:` to force a format, e.g. `simple-csv:export.txt`.".to_string());
    Ok(lines.join("\n"))
}
