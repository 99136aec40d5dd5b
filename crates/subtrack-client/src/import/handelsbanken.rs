use std::path::Path;

use calamine::{Data, Reader};
use chrono::{Duration, NaiveDate};

use crate::detection::date::parse_iso_date;
use crate::detection::types::Transaction;
use crate::import::amount::parse_amount;
use crate::import::registry::TransactionParser;
use crate::{ClientError, ClientResult};

pub const SOURCE_NAME: &str = "handelsbanken-xlsx";

const HEADER_MARKER: &str = "Reskontradatum";
const DATE_COLUMN: usize = 0;
const TEXT_COLUMN: usize = 2;
const AMOUNT_COLUMN: usize = 3;

/// Handelsbanken account export: a few preamble rows, then a header row that
/// starts with `Reskontradatum`, then one transaction per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandelsbankenXlsxParser;

impl TransactionParser for HandelsbankenXlsxParser {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn description(&self) -> &'static str {
        "Handelsbanken account export (.xlsx)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx"]
    }

    fn parse(&self, path: &Path) -> ClientResult<Vec<Transaction>> {
        let mut workbook = calamine::open_workbook_auto(path)
            .map_err(|error| ClientError::source_read_failed(path, &error.to_string()))?;
        let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
            return Err(ClientError::source_parse_failed(
                path,
                SOURCE_NAME,
                "workbook has no sheets",
            ));
        };
        let range = workbook
            .worksheet_range(&first_sheet)
            .map_err(|error| ClientError::source_parse_failed(path, SOURCE_NAME, &error.to_string()))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<String>>())
            .collect::<Vec<Vec<String>>>();
        Ok(transactions_from_rows(&rows))
    }
}

/// Rows before the header marker and rows that do not parse are skipped.
fn transactions_from_rows(rows: &[Vec<String>]) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut data_started = false;
    for row in rows {
        if row.first().map(String::as_str) == Some(HEADER_MARKER) {
            data_started = true;
            continue;
        }
        if !data_started || row.len() <= AMOUNT_COLUMN {
            continue;
        }

        let Some(date) = parse_iso_date(&row[DATE_COLUMN]) else {
            continue;
        };
        let Some(amount) = parse_amount(&row[AMOUNT_COLUMN]) else {
            continue;
        };
        transactions.push(Transaction::new(date, row[TEXT_COLUMN].trim(), amount));
    }
    transactions
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::DateTime(value) => excel_serial_to_date(value.as_f64()),
        Data::DateTimeIso(value) => value.chars().take(10).collect(),
        _ => String::new(),
    }
}

fn excel_serial_to_date(serial: f64) -> String {
    // Excel's day zero is 1899-12-30 once the 1900 leap-year bug is accounted for.
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .map(|base| base + Duration::days(serial.trunc() as i64))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
