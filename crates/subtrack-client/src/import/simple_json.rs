use std::path::Path;

use serde::Deserialize;

use crate::detection::date::parse_iso_date;
use crate::detection::types::Transaction;
use crate::import::read_source;
use crate::import::registry::TransactionParser;
use crate::{ClientError, ClientResult};

pub const SOURCE_NAME: &str = "simple-json";

/// `{"transactions": [{"date": "2025-01-15", "text": "Netflix", "amount": -99.0}]}`
#[derive(Debug, Deserialize)]
struct SimpleJsonDocument {
    transactions: Vec<SimpleJsonTransaction>,
}

#[derive(Debug, Deserialize)]
struct SimpleJsonTransaction {
    date: String,
    text: String,
    amount: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleJsonParser;

impl TransactionParser for SimpleJsonParser {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn description(&self) -> &'static str {
        "JSON object with a `transactions` array of {date, text, amount}"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, path: &Path) -> ClientResult<Vec<Transaction>> {
        let body = read_source(path)?;
        parse_simple_json(&body)
            .map_err(|detail| ClientError::source_parse_failed(path, SOURCE_NAME, &detail))
    }
}

pub(crate) fn parse_simple_json(body: &str) -> Result<Vec<Transaction>, String> {
    let document: SimpleJsonDocument =
        serde_json::from_str(body).map_err(|error| error.to_string())?;

    document
        .transactions
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let date = parse_iso_date(&row.date).ok_or_else(|| {
                format!(
                    "transaction {} has date `{}`; expected YYYY-MM-DD",
                    index + 1,
                    row.date
                )
            })?;
            Ok(Transaction::new(date, row.text, row.amount))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_simple_json;

    #[test]
    fn parses_transactions_array() {
        let parsed = parse_simple_json(
            r#"{"transactions": [
                {"date": "2025-01-15", "text": "Netflix", "amount": -99.0},
                {"date": "2025-02-15", "text": "Netflix", "amount": -99}
            ]}"#,
        );
        assert!(parsed.is_ok());
        if let Ok(rows) = parsed {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1].date.to_string(), "2025-02-15");
            assert_eq!(rows[1].amount, -99.0);
        }
    }

    #[test]
    fn invalid_dates_and_shapes_fail() {
        let bad_date = parse_simple_json(
            r#"{"transactions": [{"date": "15/01/2025", "text": "X", "amount": -1}]}"#,
        );
        assert!(bad_date.is_err());
        if let Err(detail) = bad_date {
            assert!(detail.contains("transaction 1"));
        }

        assert!(parse_simple_json(r#"[{"date": "2025-01-15"}]"#).is_err());
        assert!(parse_simple_json("").is_err());
    }
}
