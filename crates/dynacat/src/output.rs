use clap::ValueEnum;
use colored::Colorize;
use dynacat_core::{DatabaseAndTable, SourceStatus};
use serde::Serialize;
use serde_json::{Value, json};
use tabled::{
    Table, Tabled,
    settings::{
        Color, Modify, Style,
        object::{Columns, Object, Rows},
    },
};

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Database")]
    pub database: String,
    #[tabled(rename = "Schema")]
    pub schema: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Columns")]
    pub columns: String,
}

impl From<&DatabaseAndTable> for TableRow {
    fn from(record: &DatabaseAndTable) -> Self {
        Self {
            database: record.database.name.clone(),
            schema: record.database_schema.name.clone(),
            table: record.table.name.clone(),
            columns: describe_columns(record),
        }
    }
}

fn describe_columns(record: &DatabaseAndTable) -> String {
    record
        .table
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.display_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print a summary of ingested records
///
/// JSON output is written through the sink by the ingest command, so only
/// the table and markdown formats are handled here.
pub fn print_records(records: &[DatabaseAndTable], format: &OutputFormat) {
    match format {
        OutputFormat::Table => {
            if records.is_empty() {
                println!("{}", "No tables ingested.".yellow());
                return;
            }

            let rows: Vec<TableRow> = records.iter().map(TableRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());

            println!("\n{}", "Ingested Tables:".bold().green());
            println!("{}", table);
            println!("\nIngested {} table(s)\n", records.len());
        }
        OutputFormat::Markdown => {
            println!("# Ingested Tables\n");
            println!("| Database | Schema | Table | Columns |");
            println!("|----------|--------|-------|---------|");
            for record in records {
                println!(
                    "| {} | {} | {} | {} |",
                    record.database.name,
                    record.database_schema.name,
                    record.table.name,
                    describe_columns(record)
                );
            }
            println!("\nIngested {} table(s)\n", records.len());
        }
        OutputFormat::Json => {}
    }
}

#[derive(Tabled)]
pub struct StatusRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    #[tabled(rename = "Reason")]
    pub reason: String,
}

fn status_rows(status: &SourceStatus) -> Vec<StatusRow> {
    let filtered = status.filtered.iter().map(|entry| StatusRow {
        name: entry.name.clone(),
        outcome: "Filtered".to_string(),
        reason: entry.reason.clone(),
    });
    let warnings = status.warnings.iter().map(|entry| StatusRow {
        name: entry.name.clone(),
        outcome: "Warning".to_string(),
        reason: entry.reason.clone(),
    });
    let failures = status.failures.iter().map(|entry| StatusRow {
        name: entry.name.clone(),
        outcome: "Failed".to_string(),
        reason: entry.reason.clone(),
    });
    filtered.chain(warnings).chain(failures).collect()
}

/// Print the run status
///
/// In JSON mode the status goes to stderr so stdout stays a clean JSON Lines stream.
pub fn print_status(status: &SourceStatus, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json!({ "status": status }))?
            );
        }
        OutputFormat::Markdown => {
            println!("## Status\n");
            println!("- Scanned: {}", status.success.len());
            println!("- Filtered: {}", status.filtered.len());
            println!("- Warnings: {}", status.warnings.len());
            println!("- Failures: {}\n", status.failures.len());

            let rows = status_rows(status);
            if !rows.is_empty() {
                println!("| Name | Outcome | Reason |");
                println!("|------|---------|--------|");
                for row in rows {
                    println!("| {} | {} | {} |", row.name, row.outcome, row.reason);
                }
                println!();
            }
        }
        OutputFormat::Table => {
            println!("{}", "Status:".bold());
            println!("  Scanned: {}", status.success.len().to_string().green());
            println!("  Filtered: {}", status.filtered.len().to_string().cyan());
            println!("  Warnings: {}", status.warnings.len().to_string().yellow());
            println!("  Failures: {}", status.failures.len().to_string().red());

            let rows = status_rows(status);
            if !rows.is_empty() {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                table.with(
                    Modify::new(Columns::new(1..=1).intersect(Rows::new(1..)))
                        .with(Color::FG_YELLOW),
                );
                println!("{}", table);
            }
            println!();
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ProfileResult {
    pub table: String,
    pub strategy: String,
    pub table_rows: i64,
    pub sample_rows: i64,
    pub preview: Vec<Value>,
}

pub fn print_profile(result: &ProfileResult, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Markdown => {
            println!("# Profile: {}\n", result.table);
            println!("- Sampling strategy: {}", result.strategy);
            println!("- Table rows: {}", result.table_rows);
            println!("- Sample rows: {}\n", result.sample_rows);
            if !result.preview.is_empty() {
                println!("## Preview\n");
                println!("```json");
                for row in &result.preview {
                    println!("{}", row);
                }
                println!("```\n");
            }
        }
        OutputFormat::Table => {
            println!("\n{} {}\n", "Profiling".bold().green(), result.table);
            println!("  Sampling strategy: {}", result.strategy);
            println!("  Table rows: {}", result.table_rows);
            println!("  Sample rows: {}", result.sample_rows);

            if !result.preview.is_empty() {
                println!("\n{}", "Preview:".bold());
                for row in &result.preview {
                    println!("  {}", row.to_string().dimmed());
                }
            }
            println!();
        }
    }
    Ok(())
}
