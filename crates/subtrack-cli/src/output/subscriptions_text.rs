use std::io;

use serde_json::Value;

use super::format::{Column, key_value_rows, render_table};
use super::money::{format_money, format_range};

pub fn render_subscriptions(data: &Value) -> io::Result<String> {
    let counts = data
        .get("counts")
        .ok_or_else(|| io::Error::other("detect output is missing `counts`"))?;
    let rows = data
        .get("subscriptions")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("detect output is missing `subscriptions`"))?;
    let currency = text_field(&data["summary"], "currency");

    let mut lines = vec![
        format!(
            "Found {} subscriptions ({} active, {} stopped)",
            count_field(counts, "total"),
            count_field(counts, "active"),
            count_field(counts, "stopped"),
        ),
        format!("Showing: {}", describe_filter(&data["filter"])),
    ];
    lines.extend(key_value_rows(&coverage_entries(data), 0));

    if let Some(warnings) = data.get("warnings").and_then(Value::as_array)
        && !warnings.is_empty()
    {
        lines.push(String::new());
        lines.extend(
            warnings
                .iter()
                .filter_map(Value::as_str)
                .map(|warning| format!("Warning: {warning}")),
        );
    }

    lines.push(String::new());
    if rows.is_empty() {
        lines.push("No subscriptions match the current filter.".to_string());
        return Ok(lines.join("\n"));
    }

    let layout = TableLayout::for_rows(rows);
    let body = rows
        .iter()
        .map(|row| layout.cells(row, &currency))
        .collect::<Vec<Vec<String>>>();
    let footer = layout.footer(&data["summary"], &currency);
    lines.extend(render_table(&layout.columns(), &body, Some(&footer)));

    Ok(lines.join("\n"))
}

/// Description and Tags columns only appear when at least one row uses them.
struct TableLayout {
    descriptions: bool,
    tags: bool,
}

impl TableLayout {
    fn for_rows(rows: &[Value]) -> Self {
        Self {
            descriptions: rows.iter().any(|row| row.get("description").is_some()),
            tags: rows.iter().any(|row| {
                row.get("tags")
                    .and_then(Value::as_array)
                    .is_some_and(|tags| !tags.is_empty())
            }),
        }
    }

    fn columns(&self) -> Vec<Column<'static>> {
        let mut columns = vec![Column::left("Name")];
        if self.descriptions {
            columns.push(Column::left("Description"));
        }
        if self.tags {
            columns.push(Column::left("Tags"));
        }
        columns.extend([
            Column::left("Status"),
            Column::right("Day"),
            Column::left("Started"),
            Column::left("Last Seen"),
            Column::right("Monthly"),
            Column::right("Yearly"),
        ]);
        columns
    }

    fn cells(&self, row: &Value, currency: &str) -> Vec<String> {
        let mut cells = vec![text_field(row, "name")];
        if self.descriptions {
            cells.push(text_field(row, "description"));
        }
        if self.tags {
            let tags = row
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<&str>>()
                        .join(", ")
                })
                .unwrap_or_default();
            cells.push(tags);
        }

        let status = text_field(row, "status");
        let low = amount_field(row, "min_amount").abs();
        let high = amount_field(row, "max_amount").abs();
        let yearly = if status == "active" {
            format_money(amount_field(row, "yearly_cost"), currency)
        } else {
            "-".to_string()
        };
        cells.extend([
            status,
            format!("~{}", count_field(row, "typical_day")),
            text_field(row, "start_date"),
            text_field(row, "last_date"),
            format_range(low.min(high), low.max(high), currency),
            yearly,
        ]);
        cells
    }

    fn footer(&self, summary: &Value, currency: &str) -> Vec<String> {
        let mut cells = vec!["Total (active)".to_string()];
        let blanks = 4 + usize::from(self.descriptions) + usize::from(self.tags);
        cells.extend(std::iter::repeat_n(String::new(), blanks));
        cells.push(format_money(amount_field(summary, "monthly_total"), currency));
        cells.push(format_money(amount_field(summary, "yearly_total"), currency));
        cells
    }
}

fn describe_filter(filter: &Value) -> String {
    let mut description = format!(
        "{}, sorted by {} ({})",
        text_field(filter, "show"),
        text_field(filter, "sort"),
        text_field(filter, "sort_dir"),
    );
    let tags = filter
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).collect::<Vec<&str>>())
        .unwrap_or_default();
    if !tags.is_empty() {
        description.push_str(&format!(", tags: {}", tags.join(", ")));
    }
    description
}

fn coverage_entries(data: &Value) -> Vec<(&'static str, String)> {
    let coverage = &data["coverage"];
    let period = match (
        coverage.get("start").and_then(Value::as_str),
        coverage.get("end").and_then(Value::as_str),
    ) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "no data".to_string(),
    };
    let months = coverage
        .get("complete_months")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let mut entries = vec![
        ("Period:", period),
        ("Complete months:", months.to_string()),
        ("Transactions:", count_field(data, "transaction_count").to_string()),
    ];
    if let Some(path) = data.get("config_path").and_then(Value::as_str) {
        entries.push(("Config:", path.to_string()));
    }
    entries
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn count_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn amount_field(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}
