use std::collections::HashMap;
use std::path::Path;

use crate::detection::date::parse_iso_date;
use crate::detection::types::Transaction;
use crate::import::amount::parse_amount;
use crate::import::read_source;
use crate::import::registry::TransactionParser;
use crate::{ClientError, ClientResult};

pub const SOURCE_NAME: &str = "simple-csv";

const REQUIRED_HEADERS: [&str; 3] = ["date", "text", "amount"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCsvParser;

impl TransactionParser for SimpleCsvParser {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn description(&self) -> &'static str {
        "CSV with a `date,text,amount` header row"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn parse(&self, path: &Path) -> ClientResult<Vec<Transaction>> {
        let body = read_source(path)?;
        parse_simple_csv(&body)
            .map_err(|detail| ClientError::source_parse_failed(path, SOURCE_NAME, &detail))
    }
}

pub(crate) fn parse_simple_csv(body: &str) -> Result<Vec<Transaction>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let index_by_name = reader
        .headers()
        .map_err(|_| "CSV header row is missing or unreadable".to_string())?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_ascii_lowercase(), index))
        .collect::<HashMap<String, usize>>();

    let missing = REQUIRED_HEADERS
        .iter()
        .filter(|name| !index_by_name.contains_key(**name))
        .copied()
        .collect::<Vec<&str>>();
    if !missing.is_empty() {
        return Err(format!("missing required headers: {}", missing.join(", ")));
    }

    let mut transactions = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let row_number = row_index + 1;
        let record = record.map_err(|_| format!("row {row_number} is malformed or not UTF-8"))?;
        let field = |name: &str| {
            index_by_name
                .get(name)
                .and_then(|index| record.get(*index))
                .unwrap_or_default()
        };

        let date = parse_iso_date(field("date"))
            .ok_or_else(|| format!("row {row_number} has an invalid date; expected YYYY-MM-DD"))?;
        let amount = parse_amount(field("amount"))
            .ok_or_else(|| format!("row {row_number} has an invalid amount"))?;
        transactions.push(Transaction::new(date, field("text"), amount));
    }

    Ok(transactions)
}
