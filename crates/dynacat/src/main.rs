use clap::{Args, Parser, Subcommand};
use dynacat::commands::{self, ingest::ConfigOverrides, profile::ProfileOptions};
use dynacat::logging;
use dynacat::output;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "dynacat",
    about = "A tool to ingest DynamoDB table metadata and profile tables through samples."
)]
#[command(author, version, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "DYNACAT_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Workflow config file (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// AWS region, overrides the config file
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// DynamoDB endpoint URL (e.g. DynamoDB Local), overrides the config file
    #[arg(long, env = "DYNAMODB_ENDPOINT_URL")]
    endpoint_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read every DynamoDB table and emit database/schema/table records
    Ingest {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Schema name the tables are registered under
        #[arg(long)]
        database: Option<String>,

        /// Only ingest tables matching this regex (repeatable)
        #[arg(long = "include")]
        includes: Vec<String>,

        /// Skip tables matching this regex (repeatable)
        #[arg(long = "exclude")]
        excludes: Vec<String>,

        /// Write JSON Lines records to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: output::OutputFormat,
    },

    /// Check that the configured DynamoDB endpoint is reachable
    TestConnection {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Count and preview rows of a table through a sample
    Profile {
        /// DB connection URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,

        /// Table name (schema.table, defaults to public)
        table: String,

        /// Number of rows to sample
        #[arg(short, long, default_value = "5000")]
        sample_size: usize,

        /// Abort any query running longer than this many seconds
        #[arg(short, long)]
        timeout_secs: Option<u64>,

        /// Number of sampled rows to show
        #[arg(short, long, default_value = "5")]
        preview: usize,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: output::OutputFormat,
    },
}

impl ConnectionArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            ..ConfigOverrides::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Ingest {
            connection,
            database,
            includes,
            excludes,
            output,
            format,
        } => {
            let overrides = ConfigOverrides {
                database,
                includes,
                excludes,
                ..connection.overrides()
            };
            commands::ingest::run(&connection.config, &overrides, output, format).await?;
        }
        Commands::TestConnection { connection } => {
            commands::test_connection::run(&connection.config, &connection.overrides()).await?;
        }
        Commands::Profile {
            database_url,
            table,
            sample_size,
            timeout_secs,
            preview,
            format,
        } => {
            let options = ProfileOptions {
                sample_size,
                timeout: timeout_secs.map(Duration::from_secs),
                preview,
            };
            commands::profile::run(&database_url, &table, &options, format).await?;
        }
    }
    Ok(())
}
