//! End-to-end collection runs against a JSONL source directory.

// Integration tests use unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::unwrap_used, clippy::expect_used)]

use feedsift::config::FeedsiftConfig;
use feedsift::models::OUTPUT_COLUMNS;
use feedsift::services::CollectorService;
use feedsift::SentimentLabel;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_channel(dir: &Path, channel: &str, lines: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(format!("{channel}.jsonl")), lines.join("\n")).unwrap();
}

fn config(root: &TempDir) -> FeedsiftConfig {
    let mut config = FeedsiftConfig::default()
        .with_db_path(root.path().join("state").join("dupes.db"))
        .with_output_path(root.path().join("out").join("posts.csv"))
        .with_source_dir(root.path().join("feeds"))
        .with_channels(["Bitcoin", "ethereum", "CryptoCurrency"]);
    config.run_id = Some("20240101_120000".to_string());
    config
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(reader.headers().unwrap(), &csv::StringRecord::from(OUTPUT_COLUMNS.to_vec()));
    reader.records().map(Result::unwrap).collect()
}

#[test]
fn test_two_runs_only_write_new_content() {
    let root = TempDir::new().unwrap();
    let feeds = root.path().join("feeds");
    write_channel(
        &feeds,
        "Bitcoin",
        &[
            r#"{"id":"p1","title":"Bitcoin rises","body":"BTC up 5%","score":10,"created_at":1700000000}"#,
            r#"{"id":"p3","title":"Bitcoin rises","body":"BTC up 5%"}"#,
        ],
    );
    write_channel(&feeds, "ethereum", &[r#"{"post_id":"p2","title":"Ethereum news","content":"ETH crash fears"}"#]);
    // CryptoCurrency has no file: that channel fails, the others continue

    let config = config(&root);
    let summary = CollectorService::from_config(&config).unwrap().run_once().unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.survivors, 2);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.failed_channels, vec!["CryptoCurrency".to_string()]);
    assert_eq!(summary.sentiment.get(&SentimentLabel::Positive), Some(&1));
    assert_eq!(summary.sentiment.get(&SentimentLabel::Negative), Some(&1));

    let rows = read_rows(&config.output_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "p1");
    assert_eq!(&rows[0][5], "Bitcoin");
    assert_eq!(&rows[1][0], "p2");
    assert_eq!(&rows[1][5], "ethereum");
    assert!(rows.iter().all(|r| &r[14] == "20240101_120000"));

    // Second run: one new post, everything else already recorded
    write_channel(
        &feeds,
        "ethereum",
        &[
            r#"{"id":"p2","title":"Ethereum news","body":"ETH crash fears"}"#,
            r#"{"id":"p6","title":"Merge anniversary","body":""}"#,
        ],
    );
    let summary = CollectorService::from_config(&config).unwrap().run_once().unwrap();
    assert_eq!(summary.survivors, 1);
    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.duplicates_removed, 3);

    let rows = read_rows(&config.output_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "p6");
    assert_eq!(&rows[0][8], "neutral");
}

#[test]
fn test_sample_posts_with_sentiment_disabled() {
    let root = TempDir::new().unwrap();
    let mut config = config(&root);
    config.source_dir = None;
    config.sentiment_enabled = false;

    let summary = CollectorService::from_config(&config).unwrap().run_once().unwrap();
    assert_eq!(summary.survivors, 2);
    assert_eq!(summary.sentiment.get(&SentimentLabel::Neutral), Some(&2));

    let rows = read_rows(&config.output_path);
    assert_eq!(&rows[0][0], "dummy_1");
    assert_eq!(&rows[0][6], "https://reddit.com/dummy1");
    assert_eq!(&rows[0][7], "25");
    assert_eq!(&rows[0][9], "0.5");

    let again = CollectorService::from_config(&config).unwrap().run_once().unwrap();
    assert_eq!(again.survivors, 0);
    assert!(again.output_path.is_none());
}

#[test]
fn test_store_init_failure_is_fatal() {
    let root = TempDir::new().unwrap();
    let config = config(&root).with_db_path(root.path());
    assert!(CollectorService::from_config(&config).is_err());
}
