use crate::catalog::TableCatalog;
use crate::error::CatalogError;
use dynacat_core::AttributeDefinition;
use sqlx::PgPool;
use std::collections::HashSet;

/// In-memory [`TableCatalog`] with injectable failures
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: Vec<(String, Vec<AttributeDefinition>)>,
    failing: HashSet<String>,
    list_failure: Option<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with `(attribute name, attribute type)` pairs
    pub fn with_table(mut self, name: &str, attributes: &[(&str, &str)]) -> Self {
        let attributes = attributes
            .iter()
            .map(|(attr_name, attr_type)| AttributeDefinition::new(*attr_name, *attr_type))
            .collect();
        self.tables.push((name.to_string(), attributes));
        self
    }

    /// Add a table that is listed but cannot be described
    pub fn with_failing_table(mut self, name: &str) -> Self {
        self.tables.push((name.to_string(), Vec::new()));
        self.failing.insert(name.to_string());
        self
    }

    /// Make table listing itself fail
    pub fn with_list_failure(mut self, message: &str) -> Self {
        self.list_failure = Some(message.to_string());
        self
    }
}

impl TableCatalog for MemoryCatalog {
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(message) = &self.list_failure {
            return Err(CatalogError::Request(message.clone()));
        }
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn describe_attributes(
        &self,
        table: &str,
    ) -> Result<Vec<AttributeDefinition>, CatalogError> {
        if self.failing.contains(table) {
            return Err(CatalogError::Request(format!("describe {} failed", table)));
        }
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, attributes)| attributes.clone())
            .ok_or_else(|| CatalogError::TableNotFound(table.to_string()))
    }
}

/// A catalog shaped like a typical DynamoDB account
pub fn sample_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_table("users", &[("user_id", "S"), ("created_at", "N")])
        .with_table("orders", &[("order_id", "S"), ("customer_id", "S"), ("total", "N")])
        .with_table("tmp_orders", &[("order_id", "S")])
        .with_table("avatars", &[("user_id", "S"), ("image", "B")])
}

/// Create an orders table with 1000 rows
pub async fn create_orders(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id SERIAL PRIMARY KEY,
            customer TEXT NOT NULL,
            amount INTEGER NOT NULL,
            status TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO orders (customer, amount, status)
        SELECT
            'customer_' || (i % 50),
            (i % 100) + 1,
            CASE WHEN i % 10 = 0 THEN NULL ELSE 'shipped' END
        FROM generate_series(1, 1000) AS i
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create a table with no rows
pub async fn create_empty_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS empty_events (
            id SERIAL PRIMARY KEY,
            payload TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create a sessions table keyed by uuid, large enough to leave random sampling
pub async fn create_sessions(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO sessions (user_name)
        SELECT 'user_' || (i % 500)
        FROM generate_series(1, 150000) AS i
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Clean up all test tables
pub async fn cleanup(pool: &PgPool) -> Result<(), sqlx::Error> {
    for table in ["orders", "empty_events", "sessions"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}
