use dynacat::commands::ingest;
use dynacat::output::OutputFormat;
use dynacat_core::WorkflowSource;
use dynacat_core::status::TABLE_FILTERED_REASON;
use dynacat_db::fixtures::{self, MemoryCatalog};
use serde_json::Value;
use std::path::PathBuf;

fn config(filter: &str) -> WorkflowSource {
    WorkflowSource::from_json_str(&format!(
        r#"{{
            "type": "dynamodb",
            "serviceName": "local_dynamo",
            "serviceConnection": {{
                "config": {{
                    "type": "DynamoDB",
                    "awsConfig": {{ "awsRegion": "us-east-1" }},
                    "database": "analytics"
                }}
            }},
            "sourceConfig": {{ "config": {{ "tableFilterPattern": {filter} }} }}
        }}"#
    ))
    .expect("Failed to parse config")
}

fn output_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dynacat-{}-{}.jsonl", name, std::process::id()))
}

/// Test ingest writes one JSON line per accepted table
#[tokio::test]
async fn test_ingest_writes_json_lines() {
    let path = output_path("json-lines");

    let status = ingest::run_with_catalog(
        config(r#"{ "excludes": ["^tmp_"] }"#),
        fixtures::sample_catalog(),
        Some(&path),
        OutputFormat::Json,
    )
    .await
    .expect("Ingest failed");

    assert_eq!(status.success, vec!["users", "orders", "avatars"]);
    assert!(status.is_filtered("tmp_orders"));
    assert_eq!(status.filtered[0].reason, TABLE_FILTERED_REASON);

    let contents = std::fs::read_to_string(&path).expect("Failed to read output");
    let lines: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect();
    assert_eq!(lines.len(), 3);

    let users = &lines[0];
    assert_eq!(users["database"]["name"], "default");
    assert_eq!(users["databaseSchema"]["name"], "analytics");
    assert_eq!(users["table"]["name"], "users");
    assert_eq!(users["table"]["columns"][0]["name"], "user_id");
    assert_eq!(users["table"]["columns"][0]["dataType"], "STRING");
    assert_eq!(users["table"]["columns"][1]["dataType"], "NUMBER");

    let avatars = &lines[2];
    assert_eq!(avatars["table"]["columns"][1]["dataType"], "BINARY");

    std::fs::remove_file(&path).ok();
}

/// Test ingest keeps going past tables that fail to describe
#[tokio::test]
async fn test_ingest_records_failures() {
    let catalog = MemoryCatalog::new()
        .with_table("events", &[("id", "S")])
        .with_failing_table("broken")
        .with_table("sessions", &[("id", "S"), ("ttl", "N")]);

    let status = ingest::run_with_catalog(config("{}"), catalog, None, OutputFormat::Markdown)
        .await
        .expect("Ingest failed");

    assert_eq!(status.success, vec!["events", "sessions"]);
    assert_eq!(status.failures.len(), 1);
    assert_eq!(status.failures[0].name, "broken");
}

/// Test ingest with all output formats
#[tokio::test]
async fn test_ingest_output_formats() {
    for format in [
        OutputFormat::Table,
        OutputFormat::Json,
        OutputFormat::Markdown,
    ] {
        let result = ingest::run_with_catalog(
            config(r#"{ "includes": ["orders"] }"#),
            fixtures::sample_catalog(),
            None,
            format.clone(),
        )
        .await;

        assert!(
            result.is_ok(),
            "Ingest failed for {:?} format: {:?}",
            format,
            result.err()
        );
        let status = result.unwrap();
        assert_eq!(status.success, vec!["orders"]);
        assert_eq!(status.filtered.len(), 3);
        assert!(status.is_filtered("tmp_orders"));
    }
}

/// Test an invalid filter regex is reported before any table is read
#[tokio::test]
async fn test_ingest_rejects_bad_pattern() {
    let result = ingest::run_with_catalog(
        config(r#"{ "includes": ["(unclosed"] }"#),
        fixtures::sample_catalog(),
        None,
        OutputFormat::Json,
    )
    .await;

    assert!(result.is_err());
}
