use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading table metadata from the store
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("DynamoDB request failed: {0}")]
    Sdk(#[from] aws_sdk_dynamodb::Error),

    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("catalog request failed: {0}")]
    Request(String),
}

/// Errors raised by the query runner
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}
