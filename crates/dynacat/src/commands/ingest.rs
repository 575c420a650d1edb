use crate::output::{OutputFormat, print_records, print_status};
use anyhow::{Context, Result};
use dynacat_core::sink::{JsonLinesSink, Sink};
use dynacat_core::{FilterPattern, SourceStatus, WorkflowSource};
use dynacat_db::{DynamoClient, DynamoDbSource, TableCatalog};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Command-line overrides applied on top of the workflow config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub database: Option<String>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Load the workflow config and apply command-line overrides
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<WorkflowSource> {
    let mut config = WorkflowSource::from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    apply_overrides(&mut config, overrides)?;
    Ok(config)
}

fn apply_overrides(config: &mut WorkflowSource, overrides: &ConfigOverrides) -> Result<()> {
    let connection = config
        .dynamodb_connection_mut()
        .context("Config does not describe a DynamoDB source")?;

    if let Some(region) = &overrides.region {
        connection.aws_config.aws_region = Some(region.clone());
    }
    if let Some(endpoint) = &overrides.endpoint_url {
        connection.aws_config.end_point_url = Some(endpoint.clone());
    }
    if let Some(database) = &overrides.database {
        connection.database = Some(database.clone());
    }

    if !overrides.includes.is_empty() || !overrides.excludes.is_empty() {
        let pattern = config
            .source_config
            .config
            .table_filter_pattern
            .get_or_insert_with(FilterPattern::default);
        pattern.includes.extend(overrides.includes.iter().cloned());
        pattern.excludes.extend(overrides.excludes.iter().cloned());
    }

    Ok(())
}

/// Run the ingest command against DynamoDB
pub async fn run(
    config_path: &Path,
    overrides: &ConfigOverrides,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<SourceStatus> {
    let config = load_config(config_path, overrides)?;
    let connection = config.dynamodb_connection()?.clone();
    let client = DynamoClient::new(&connection.aws_config).await;

    run_with_catalog(config, client, output.as_deref(), format).await
}

/// Drive a source over any catalog, writing records to the configured sink
///
/// JSON output streams JSON Lines to `output` (or stdout); the other formats
/// print a summary and only write records when `output` is given.
pub async fn run_with_catalog<C: TableCatalog>(
    config: WorkflowSource,
    catalog: C,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<SourceStatus> {
    let mut source =
        DynamoDbSource::create(config, catalog).context("Failed to create DynamoDB source")?;
    source.prepare();

    let mut sink: Option<Box<dyn Sink>> = match (output, &format) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Some(Box::new(JsonLinesSink::new(BufWriter::new(file))))
        }
        (None, OutputFormat::Json) => Some(Box::new(JsonLinesSink::new(io::stdout()))),
        (None, _) => None,
    };

    let progress = matches!(format, OutputFormat::Table).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .expect("Invalid progress bar template"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Listing tables...");
        pb
    });

    let mut records = Vec::new();
    while let Some(record) = source.next_record().await {
        if let Some(pb) = &progress {
            pb.set_message(format!("Ingested {}", record.table.name));
        }
        if let Some(sink) = sink.as_mut() {
            sink.write_record(&record)
                .with_context(|| format!("Failed to write record for {}", record.table.name))?;
        }
        records.push(record);
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    if let Some(mut sink) = sink {
        sink.close().context("Failed to flush output")?;
    }
    source.close();

    let status = source.status();
    info!(
        service = %source.service().name,
        scanned = status.success.len(),
        filtered = status.filtered.len(),
        warnings = status.warnings.len(),
        failures = status.failures.len(),
        "Ingestion finished"
    );
    if status.has_failures() {
        warn!("{} table(s) could not be ingested", status.failures.len());
    }

    print_records(&records, &format);
    print_status(status, &format)?;

    Ok(status.clone())
}
