mod support;

use subtrack_client::commands::detect::{self, SortDirection, SortField, StatusFilter};
use support::detection_testkit::{
    detect_options, detect_payload, fixture_dir, monthly, owned, subscription,
    subscription_names, write_config, write_csv_fixture, write_json_fixture,
};

const NO_DEFAULT_KNOWN: &str = "use_default_known: false\n";

fn scenario_a_rows() -> Vec<(String, String, f64)> {
    owned(&[
        ("2025-01-15", "Netflix", -99.0),
        ("2025-02-15", "Netflix", -99.0),
        ("2025-03-15", "Netflix", -99.0),
        ("2025-04-10", "Netflix", -99.0),
        ("2025-02-03", "Amazon", -500.0),
        ("2025-01-05", "Grocery", -150.0),
        ("2025-02-05", "Grocery", -300.0),
        ("2025-03-05", "Grocery", -200.0),
    ])
}

#[test]
fn scenario_a_finds_only_the_steady_monthly_payment() {
    for config_body in ["", NO_DEFAULT_KNOWN] {
        let dir = fixture_dir("subtrack-scenario-a");
        let file = write_json_fixture(dir.path(), "rows.json", &scenario_a_rows());
        let config = write_config(dir.path(), config_body);

        let data = detect_payload(detect_options(&[&file], &config, 0.10));
        assert_eq!(subscription_names(&data), vec!["Netflix".to_string()]);

        let netflix = subscription(&data, "Netflix");
        assert!(netflix.is_some());
        if let Some(row) = netflix {
            assert_eq!(row["status"], "active");
            assert_eq!(row["average_amount"], 99.0);
            assert_eq!(row["transaction_count"], 4);
            assert_eq!(row["start_date"], "2025-01-15");
            assert_eq!(row["last_date"], "2025-04-10");
        }
        assert_eq!(data["coverage"]["complete_months"].as_array().map(Vec::len), Some(3));
        assert_eq!(data["warnings"].as_array().map(Vec::len), Some(0));
    }
}

#[test]
fn scenario_b_marks_a_lapsed_payment_as_stopped() {
    for config_body in ["", NO_DEFAULT_KNOWN] {
        let dir = fixture_dir("subtrack-scenario-b");
        let rows = owned(&[
            ("2025-01-15", "Spotify", -59.0),
            ("2025-02-15", "Spotify", -59.0),
            ("2025-04-20", "ICA", -45.0),
        ]);
        let file = write_json_fixture(dir.path(), "rows.json", &rows);
        let config = write_config(dir.path(), config_body);

        let mut options = detect_options(&[&file], &config, 0.10);
        options.show = StatusFilter::All;
        let data = detect_payload(options);

        assert_eq!(subscription_names(&data), vec!["Spotify".to_string()]);
        assert_eq!(data["counts"]["stopped"], 1);
        assert_eq!(data["counts"]["active"], 0);
        if let Some(row) = subscription(&data, "Spotify") {
            assert_eq!(row["status"], "stopped");
            assert_eq!(row["last_date"], "2025-02-15");
        }
        assert_eq!(data["summary"]["monthly_total"], 0.0);
    }
}

#[test]
fn stopped_subscriptions_are_hidden_by_default() {
    let dir = fixture_dir("subtrack-hidden");
    let rows = owned(&[
        ("2025-01-15", "Spotify", -59.0),
        ("2025-02-15", "Spotify", -59.0),
        ("2025-04-20", "ICA", -45.0),
    ]);
    let file = write_json_fixture(dir.path(), "rows.json", &rows);
    let config = write_config(dir.path(), NO_DEFAULT_KNOWN);

    let data = detect_payload(detect_options(&[&file], &config, 0.10));
    assert!(subscription_names(&data).is_empty());
    assert_eq!(data["counts"]["total"], 1);
    assert_eq!(data["summary"]["count"], 0);
}

#[test]
fn configured_known_rule_reports_a_single_current_month_payment() {
    let dir = fixture_dir("subtrack-known");
    let rows = owned(&[
        ("2025-01-03", "ICA", -120.0),
        ("2025-02-11", "ICA", -480.0),
        ("2025-03-20", "ICA", -75.0),
        ("2025-04-05", "GYMBOX STOCKHOLM", -299.0),
        ("2025-04-10", "ICA", -60.0),
    ]);
    let file = write_json_fixture(dir.path(), "rows.json", &rows);
    let config = write_config(
        dir.path(),
        "use_default_known: false\nknown:\n  - pattern: gymbox\n    max_amount: 500\n",
    );

    let data = detect_payload(detect_options(&[&file], &config, 0.35));
    assert_eq!(subscription_names(&data), vec!["GYMBOX STOCKHOLM".to_string()]);
    if let Some(row) = subscription(&data, "GYMBOX STOCKHOLM") {
        assert_eq!(row["status"], "active");
        assert_eq!(row["transaction_count"], 1);
        assert_eq!(row["yearly_cost"], 3588.0);
    }
}

fn grouped_fixture() -> Vec<(String, String, f64)> {
    let months = ["2025-01", "2025-02", "2025-03"];
    let mut rows = owned(&[
        ("2025-01-07", "K*KOMBUCHA 1123", -49.0),
        ("2025-02-07", "K*KOMBUCHA 2231", -49.0),
        ("2025-03-07", "K*KOMBUCHA 3378", -49.0),
        ("2025-03-31", "ICA", -12.0),
    ]);
    rows.extend(monthly("GYM AB", 1, -299.0, &months));
    rows.extend(monthly("PODCASTS", 20, -30.0, &months));
    rows
}

const GROUPED_CONFIG: &str = r"
use_default_known: false
groups:
  - name: Kombucha
    patterns: ['^K\*KOMBUCHA']
descriptions:
  Kombucha: Tea club
tags:
  Kombucha: [drinks]
  PODCASTS: [media]
exclude:
  - GYM
";

#[test]
fn config_groups_descriptions_tags_and_excludes_apply() {
    let dir = fixture_dir("subtrack-config");
    let file = write_json_fixture(dir.path(), "rows.json", &grouped_fixture());
    let config = write_config(dir.path(), GROUPED_CONFIG);

    let data = detect_payload(detect_options(&[&file], &config, 0.35));
    assert_eq!(
        subscription_names(&data),
        vec!["Kombucha".to_string(), "PODCASTS".to_string()]
    );
    if let Some(row) = subscription(&data, "Kombucha") {
        assert_eq!(row["description"], "Tea club");
        assert_eq!(row["tags"][0], "drinks");
        assert_eq!(row["transaction_count"], 3);
    }
    assert_eq!(data["summary"]["monthly_total"], 79.0);
    assert_eq!(data["summary"]["yearly_total"], 948.0);
    assert_eq!(data["summary"]["currency"], "SEK");
    assert_eq!(
        data["config_path"].as_str(),
        Some(config.display().to_string().as_str())
    );
}

#[test]
fn tag_filter_and_amount_sort_shape_the_listing() {
    let dir = fixture_dir("subtrack-filter");
    let file = write_json_fixture(dir.path(), "rows.json", &grouped_fixture());
    let config = write_config(dir.path(), GROUPED_CONFIG);

    let mut by_amount = detect_options(&[&file], &config, 0.35);
    by_amount.sort = SortField::Amount;
    by_amount.sort_dir = SortDirection::Desc;
    let sorted = detect_payload(by_amount);
    assert_eq!(
        subscription_names(&sorted),
        vec!["Kombucha".to_string(), "PODCASTS".to_string()]
    );

    let mut tagged = detect_options(&[&file], &config, 0.35);
    tagged.tags = vec!["DRINKS".to_string()];
    let filtered = detect_payload(tagged);
    assert_eq!(subscription_names(&filtered), vec!["Kombucha".to_string()]);
    assert_eq!(filtered["summary"]["monthly_total"], 49.0);
    assert_eq!(filtered["counts"]["total"], 2);
}

#[test]
fn group_tolerance_overrides_the_global_setting() {
    let dir = fixture_dir("subtrack-group-tolerance");
    let rows = owned(&[
        ("2025-01-12", "VATTENFALL EL", -100.0),
        ("2025-02-12", "VATTENFALL EL", -150.0),
        ("2025-03-12", "VATTENFALL EL", -120.0),
        ("2025-03-31", "ICA", -10.0),
    ]);
    let file = write_json_fixture(dir.path(), "rows.json", &rows);

    let strict = write_config(dir.path(), NO_DEFAULT_KNOWN);
    let data = detect_payload(detect_options(&[&file], &strict, 0.35));
    assert!(subscription_names(&data).is_empty());

    let relaxed = write_config(
        dir.path(),
        "use_default_known: false\ngroups:\n  - name: Electricity\n    patterns: [vattenfall]\n    tolerance: 0.6\n",
    );
    let data = detect_payload(detect_options(&[&file], &relaxed, 0.35));
    assert_eq!(subscription_names(&data), vec!["Electricity".to_string()]);
}

#[test]
fn csv_and_json_files_are_combined() {
    let dir = fixture_dir("subtrack-multi-file");
    let months = ["2025-01", "2025-02"];
    let json_file = write_json_fixture(
        dir.path(),
        "first.json",
        &monthly("PODCASTS", 20, -30.0, &months),
    );
    let csv_rows = monthly("PODCASTS", 20, -30.0, &["2025-03"]);
    let csv_file = write_csv_fixture(dir.path(), "second.txt", &csv_rows);
    let config = write_config(dir.path(), NO_DEFAULT_KNOWN);

    let mut options = detect_options(&[&json_file], &config, 0.35);
    options
        .files
        .push(format!("simple-csv:{}", csv_file.display()));
    let data = detect_payload(options);

    assert_eq!(data["transaction_count"], 3);
    if let Some(row) = subscription(&data, "PODCASTS") {
        assert_eq!(row["transaction_count"], 3);
        assert_eq!(row["last_date"], "2025-03-20");
    }
}

#[test]
fn short_history_adds_a_reliability_warning() {
    let dir = fixture_dir("subtrack-short");
    let file = write_json_fixture(
        dir.path(),
        "rows.json",
        &monthly("PODCASTS", 20, -30.0, &["2025-01", "2025-02"]),
    );
    let config = write_config(dir.path(), NO_DEFAULT_KNOWN);

    let data = detect_payload(detect_options(&[&file], &config, 0.35));
    let warnings = data["warnings"].as_array().cloned().unwrap_or_default();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]
            .as_str()
            .is_some_and(|warning| warning.starts_with("Less than 3 complete months"))
    );
}

#[test]
fn error_codes_describe_what_went_wrong() {
    let dir = fixture_dir("subtrack-errors");
    let file = write_json_fixture(dir.path(), "rows.json", &scenario_a_rows());
    let config = write_config(dir.path(), "");

    let mut unknown_source = detect_options(&[&file], &config, 0.35);
    unknown_source.source = Some("bogus-bank".to_string());
    let result = detect::run(unknown_source);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "unknown_source");
    }

    let missing_config = dir.path().join("nope.yaml");
    let result = detect::run(detect_options(&[&file], &missing_config, 0.35));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "config_not_found");
    }

    let missing_file = dir.path().join("missing.json");
    let result = detect::run(detect_options(&[&missing_file], &config, 0.35));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "source_read_failed");
    }

    let broken = write_config(dir.path(), "groups: [unclosed");
    let result = detect::run(detect_options(&[&file], &broken, 0.35));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "config_invalid");
    }
}
