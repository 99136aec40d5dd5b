#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use subtrack_client::SuccessEnvelope;
use subtrack_client::commands::detect::{self, DetectRunOptions};
use tempfile::{Builder, TempDir};

pub fn fixture_dir(prefix: &str) -> TempDir {
    let dir = Builder::new().prefix(prefix).tempdir();
    assert!(dir.is_ok());
    match dir {
        Ok(value) => value,
        Err(error) => panic!("could not create fixture dir: {error}"),
    }
}

/// One `(date, text, amount)` row.
pub type Row<'a> = (&'a str, &'a str, f64);

/// The same payment on `day` of each `YYYY-MM` month.
pub fn monthly(text: &str, day: u32, amount: f64, months: &[&str]) -> Vec<(String, String, f64)> {
    months
        .iter()
        .map(|month| (format!("{month}-{day:02}"), text.to_string(), amount))
        .collect()
}

pub fn owned(rows: &[Row<'_>]) -> Vec<(String, String, f64)> {
    rows.iter()
        .map(|(date, text, amount)| ((*date).to_string(), (*text).to_string(), *amount))
        .collect()
}

pub fn write_json_fixture(dir: &Path, name: &str, rows: &[(String, String, f64)]) -> PathBuf {
    let transactions = rows
        .iter()
        .map(|(date, text, amount)| json!({"date": date, "text": text, "amount": amount}))
        .collect::<Vec<Value>>();
    let body = json!({ "transactions": transactions }).to_string();
    write_file(dir, name, &body)
}

pub fn write_csv_fixture(dir: &Path, name: &str, rows: &[(String, String, f64)]) -> PathBuf {
    let mut body = String::from("date,text,amount\n");
    for (date, text, amount) in rows {
        body.push_str(&format!("{date},\"{text}\",{amount}\n"));
    }
    write_file(dir, name, &body)
}

pub fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    write_file(dir, "config.yaml", yaml)
}

pub fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let written = fs::write(&path, body);
    assert!(written.is_ok());
    path
}

pub fn detect_options(files: &[&Path], config: &Path, tolerance: f64) -> DetectRunOptions {
    DetectRunOptions {
        files: files.iter().map(|path| path.display().to_string()).collect(),
        config_path: Some(config.to_path_buf()),
        tolerance,
        currency: Some("SEK".to_string()),
        ..DetectRunOptions::default()
    }
}

pub fn detect_payload(options: DetectRunOptions) -> Value {
    envelope_data(detect::run(options))
}

pub fn envelope_data(result: subtrack_client::ClientResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok(), "command failed: {:?}", result.as_ref().err());
    match result {
        Ok(success) => success.data,
        Err(_) => Value::Null,
    }
}

pub fn subscription_names(data: &Value) -> Vec<String> {
    data["subscriptions"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn subscription<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    data["subscriptions"]
        .as_array()
        .and_then(|rows| rows.iter().find(|row| row["name"] == name))
}
