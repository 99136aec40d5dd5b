use std::cmp;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

impl<'a> Column<'a> {
    pub const fn left(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Left,
        }
    }

    pub const fn right(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Right,
        }
    }
}

const INDENT: usize = 2;
const COLUMN_GAP: usize = 2;

/// Merchant names are frequently non-ASCII (`Å`, `ö`), so widths count chars.
fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn pad(value: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(value)));
    match align {
        Align::Left => format!("{value}{fill}"),
        Align::Right => format!("{fill}{value}"),
    }
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| display_width(label))
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{}  {value}", pad(label, label_width, Align::Left)))
        .collect()
}

/// Renders a header, a dashed rule, the rows and an optional footer row that
/// is separated from the body by a second rule.
pub fn render_table(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    footer: Option<&[String]>,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let mut widths = columns
        .iter()
        .map(|column| display_width(column.name))
        .collect::<Vec<usize>>();
    for row in rows.iter().map(Vec::as_slice).chain(footer) {
        for (slot, value) in widths.iter_mut().zip(row) {
            *slot = cmp::max(*slot, display_width(value));
        }
    }

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    let rule_width = widths.iter().sum::<usize>() + COLUMN_GAP * (widths.len() - 1);
    let rule = format!("{}{}", " ".repeat(INDENT), "-".repeat(rule_width));

    let mut output = vec![format_row(columns, &header, &widths), rule.clone()];
    output.extend(rows.iter().map(|row| format_row(columns, row, &widths)));
    if let Some(cells) = footer {
        output.push(rule);
        output.push(format_row(columns, cells, &widths));
    }
    output
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (column, width))| {
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            pad(value, *width, column.align)
        })
        .collect::<Vec<String>>();

    let line = format!("{}{}", " ".repeat(INDENT), pieces.join(&" ".repeat(COLUMN_GAP)));
    line.trim_end().to_string()
}
