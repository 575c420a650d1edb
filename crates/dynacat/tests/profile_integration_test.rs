use dynacat::commands::profile::{self, ProfileOptions};
use dynacat::output::OutputFormat;
use dynacat_db::test_utils::TestDb;
use std::time::Duration;

fn options(sample_size: usize) -> ProfileOptions {
    ProfileOptions {
        sample_size,
        timeout: Some(Duration::from_secs(30)),
        preview: 3,
    }
}

/// Test profile counts the table and a sample smaller than it
#[tokio::test]
async fn test_profile_random_sample() {
    let test_db = TestDb::with_orders()
        .await
        .expect("Failed to create test database");

    let result = profile::run(
        test_db.database_url(),
        "orders",
        &options(100),
        OutputFormat::Json,
    )
    .await
    .expect("Profile command failed");

    assert_eq!(result.table, "public.orders");
    assert_eq!(result.table_rows, 1000);
    assert_eq!(result.sample_rows, 100);
    assert_eq!(result.preview.len(), 3);
    assert!(result.preview[0].get("customer").is_some());

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test profile with all output formats
#[tokio::test]
async fn test_profile_output_formats() {
    let test_db = TestDb::with_orders()
        .await
        .expect("Failed to create test database");

    for format in [
        OutputFormat::Table,
        OutputFormat::Json,
        OutputFormat::Markdown,
    ] {
        let result = profile::run(
            test_db.database_url(),
            "public.orders",
            &options(5000),
            format.clone(),
        )
        .await;

        assert!(
            result.is_ok(),
            "Profile command failed for {:?} format: {:?}",
            format,
            result.err()
        );
        let result = result.unwrap();
        assert_eq!(result.table_rows, result.sample_rows);
    }

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test profile on an empty table
#[tokio::test]
async fn test_profile_empty_table() {
    let test_db = TestDb::with_empty_table()
        .await
        .expect("Failed to create test database");

    let result = profile::run(
        test_db.database_url(),
        "empty_events",
        &options(5000),
        OutputFormat::Json,
    )
    .await
    .expect("Profile command failed");

    assert_eq!(result.table_rows, 0);
    assert_eq!(result.sample_rows, 0);
    assert!(result.preview.is_empty());

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test profile reports a missing table as an error
#[tokio::test]
async fn test_profile_missing_table() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    let result = profile::run(
        test_db.database_url(),
        "does_not_exist",
        &options(5000),
        OutputFormat::Json,
    )
    .await;

    assert!(result.is_err());
}
