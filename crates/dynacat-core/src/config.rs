use crate::error::ConfigError;
use crate::filter::FilterPattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name used for the schema and database when the connection does not set one
pub const DEFAULT_DATABASE_NAME: &str = "default";

/// Top-level workflow source configuration
///
/// ```json
/// {
///   "type": "dynamodb",
///   "serviceName": "local_dynamodb",
///   "serviceConnection": {
///     "config": {
///       "type": "DynamoDB",
///       "awsConfig": { "awsRegion": "us-east-1" },
///       "database": "custom_database_name"
///     }
///   },
///   "sourceConfig": {
///     "config": { "tableFilterPattern": { "excludes": ["^tmp_"] } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub service_name: String,
    pub service_connection: ServiceConnection,
    #[serde(default)]
    pub source_config: SourceConfig,
}

impl WorkflowSource {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// The DynamoDB connection, or an error when another service is configured
    pub fn dynamodb_connection(&self) -> Result<&DynamoDbConnection, ConfigError> {
        match &self.service_connection.config {
            ConnectionConfig::DynamoDb(connection) => Ok(connection),
            other => Err(ConfigError::InvalidSource(other.service_type().to_string())),
        }
    }

    pub fn dynamodb_connection_mut(&mut self) -> Result<&mut DynamoDbConnection, ConfigError> {
        match &mut self.service_connection.config {
            ConnectionConfig::DynamoDb(connection) => Ok(connection),
            other => Err(ConfigError::InvalidSource(other.service_type().to_string())),
        }
    }

    pub fn table_filter_pattern(&self) -> Option<&FilterPattern> {
        self.source_config.config.table_filter_pattern.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConnection {
    pub config: ConnectionConfig,
}

/// Connection settings, tagged by service type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectionConfig {
    #[serde(rename = "DynamoDB")]
    DynamoDb(DynamoDbConnection),
    Glue(GlueConnection),
}

impl ConnectionConfig {
    pub fn service_type(&self) -> &'static str {
        match self {
            ConnectionConfig::DynamoDb(_) => "DynamoDB",
            ConnectionConfig::Glue(_) => "Glue",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamoDbConnection {
    #[serde(default)]
    pub aws_config: AwsCredentials,
    pub database: Option<String>,
}

impl DynamoDbConnection {
    /// Name the ingested schema is registered under
    pub fn schema_name(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub aws_region: Option<String>,
    #[serde(rename = "endPointURL")]
    pub end_point_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlueConnection {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub aws_region: Option<String>,
    pub database: Option<String>,
    #[serde(rename = "endPointURL")]
    pub end_point_url: Option<String>,
    pub host_port: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub config: DatabaseSourceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSourceConfig {
    pub table_filter_pattern: Option<FilterPattern>,
}
