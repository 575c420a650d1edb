use crate::error::CatalogError;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use dynacat_core::config::AwsCredentials;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

const CREDENTIALS_PROVIDER: &str = "dynacat-config";

#[derive(Debug, Clone)]
pub struct DynamoClient {
    client: Client,
}

impl DynamoClient {
    /// Create a new client from the connection's AWS settings
    ///
    /// Anything left unset (region, credentials) falls back to the default
    /// AWS provider chain: environment, profile, instance metadata.
    pub async fn new(aws: &AwsCredentials) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &aws.aws_region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let (Some(key), Some(secret)) = (&aws.aws_access_key_id, &aws.aws_secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key.clone(),
                secret.clone(),
                aws.aws_session_token.clone(),
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        if let Some(endpoint) = &aws.end_point_url {
            debug!(endpoint = %endpoint, "Using custom DynamoDB endpoint");
            loader = loader.endpoint_url(endpoint.clone());
        }

        let config = loader.load().await;
        Self {
            client: Client::new(&config),
        }
    }

    /// Get a reference to the underlying SDK client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Test the connection by listing at most one table
    pub async fn test_connection(&self) -> Result<(), CatalogError> {
        self.client
            .list_tables()
            .limit(1)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        Ok(())
    }
}

/// PostgreSQL pool the query runner borrows sessions from
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    pool: PgPool,
}

impl ConnectionPool {
    /// Create a new connection pool from a database URL
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the underlying PgPool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every connection; the pool cannot be used afterwards
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
