use crate::output::{OutputFormat, ProfileResult, print_profile};
use anyhow::{Context, Result};
use dynacat_db::sampler::SAMPLE_ALIAS;
use dynacat_db::{ConnectionPool, QueryRunner, Sample, TableRef};
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub sample_size: usize,
    pub timeout: Option<Duration>,
    pub preview: usize,
}

/// Count rows of a table and its sample and preview a few sampled rows
pub async fn run(
    database_url: &str,
    table: &str,
    options: &ProfileOptions,
    format: OutputFormat,
) -> Result<ProfileResult> {
    let conn = ConnectionPool::new(database_url)
        .await
        .context("Failed to connect to database")?;

    let table = TableRef::parse(table);
    let sample = Sample::auto(conn.pool(), table.clone(), options.sample_size)
        .await
        .context("Failed to build sample")?;

    info!(table = %table.qualified(), strategy = %sample.strategy().info(), "Profiling table");

    let mut runner = QueryRunner::new(conn.pool(), &table, &sample);
    if let Some(timeout) = options.timeout {
        runner = runner.with_timeout(timeout);
    }

    let table_rows = count(
        runner
            .select_first_from_table(&["COUNT(*)"])
            .await
            .context("Failed to count table rows")?,
    )?;
    let sample_rows = count(
        runner
            .select_first_from_sample(&["COUNT(*)"])
            .await
            .context("Failed to count sample rows")?,
    )?;

    let preview_expr = format!("to_jsonb(\"{}\".*)", SAMPLE_ALIAS);
    let query = runner
        .build_query(&[preview_expr.as_str()])
        .select_from(sample.from_clause())
        .limit(options.preview);
    let preview = QueryRunner::select_all_from_query(query)
        .await
        .context("Failed to preview sample")?
        .iter()
        .map(|row| row.try_get::<Value, _>(0))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode sample rows")?;

    let result = ProfileResult {
        table: format!("{}.{}", table.schema, table.name),
        strategy: sample.strategy().info(),
        table_rows,
        sample_rows,
        preview,
    };

    print_profile(&result, &format)?;
    conn.close().await;

    Ok(result)
}

fn count(row: Option<PgRow>) -> Result<i64> {
    match row {
        Some(row) => row.try_get::<i64, _>(0).context("Failed to decode count"),
        None => Ok(0),
    }
}
