use super::ingest::{ConfigOverrides, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use dynacat_db::DynamoClient;
use std::path::Path;
use tracing::debug;

/// Check that the configured DynamoDB endpoint accepts requests
pub async fn run(config_path: &Path, overrides: &ConfigOverrides) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let connection = config.dynamodb_connection()?;

    debug!(
        region = connection.aws_config.aws_region.as_deref().unwrap_or("default chain"),
        "Testing DynamoDB connection"
    );
    let client = DynamoClient::new(&connection.aws_config).await;
    client
        .test_connection()
        .await
        .context("Failed to connect to DynamoDB")?;

    println!("{} {}", "Connection OK:".bold().green(), config.service_name);
    Ok(())
}
