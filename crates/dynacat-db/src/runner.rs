//! Query execution against a table or its sample
//!
//! Centralises how profiling queries are run so that every query goes
//! through the same execution path, including the optional timeout.

use crate::error::QueryError;
use crate::sampler::Sample;
use futures::TryStreamExt;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

/// Schema-qualified table handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `schema.table`, defaulting the schema to `public`
    pub fn parse(table: &str) -> Self {
        match table.split_once('.') {
            Some((schema, name)) => Self::new(schema, name),
            None => Self::new("public", table),
        }
    }

    /// Quoted `"schema"."table"`
    pub fn qualified(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.name)
        )
    }
}

/// A SELECT bound to a pool, resolved with [`Query::first`] or [`Query::all`]
#[derive(Debug, Clone)]
pub struct Query<'a> {
    pool: &'a PgPool,
    entities: Vec<String>,
    from: Option<String>,
    filters: Vec<String>,
    limit: Option<usize>,
    timeout: Option<Duration>,
}

impl<'a> Query<'a> {
    /// Select `entities` (SQL expressions); an empty list selects `*`
    pub fn new(pool: &'a PgPool, entities: &[&str]) -> Self {
        Self {
            pool,
            entities: entities.iter().map(|e| e.to_string()).collect(),
            from: None,
            filters: Vec::new(),
            limit: None,
            timeout: None,
        }
    }

    pub fn select_from(mut self, from_clause: impl Into<String>) -> Self {
        self.from = Some(from_clause.into());
        self
    }

    /// Add a WHERE condition; conditions are AND-ed
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.filters.push(condition.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Rendered SQL
    pub fn sql(&self) -> String {
        let projection = if self.entities.is_empty() {
            "*".to_string()
        } else {
            self.entities.join(", ")
        };

        let mut sql = format!("SELECT {}", projection);
        if let Some(from) = &self.from {
            sql.push_str(" FROM ");
            sql.push_str(from);
        }
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }

    /// Cap the result at one row, keeping a tighter limit already set
    fn single_row(mut self) -> Self {
        self.limit = Some(self.limit.map_or(1, |limit| limit.min(1)));
        self
    }

    /// First row of the result, if any
    pub async fn first(self) -> Result<Option<PgRow>, QueryError> {
        let query = self.single_row();
        let sql = query.sql();

        let Some(limit) = query.timeout else {
            return Ok(sqlx::query(&sql).fetch_optional(query.pool).await?);
        };
        run_with_timeout(limit, async {
            let mut tx = begin_with_statement_timeout(query.pool, limit).await?;
            let row = sqlx::query(&sql).fetch_optional(&mut *tx).await?;
            tx.commit().await?;
            Ok(row)
        })
        .await
    }

    /// Every row of the result
    pub async fn all(self) -> Result<Vec<PgRow>, QueryError> {
        let sql = self.sql();

        let Some(limit) = self.timeout else {
            return Ok(sqlx::query(&sql).fetch(self.pool).try_collect::<Vec<_>>().await?);
        };
        run_with_timeout(limit, async {
            let mut tx = begin_with_statement_timeout(self.pool, limit).await?;
            let rows: Vec<PgRow> = sqlx::query(&sql).fetch(&mut *tx).try_collect().await?;
            tx.commit().await?;
            Ok(rows)
        })
        .await
    }
}

/// Runs queries against a table and a sample of it
///
/// The runner borrows the pool and both handles; opening and closing them
/// stays with the caller. When a timeout is set, every query built by the
/// runner fails with [`QueryError::Timeout`] once it runs longer than that.
#[derive(Debug, Clone)]
pub struct QueryRunner<'a> {
    pool: &'a PgPool,
    table: &'a TableRef,
    sample: &'a Sample,
    timeout: Option<Duration>,
}

impl<'a> QueryRunner<'a> {
    pub fn new(pool: &'a PgPool, table: &'a TableRef, sample: &'a Sample) -> Self {
        Self {
            pool,
            table,
            sample,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start a query carrying this runner's timeout
    pub fn build_query(&self, entities: &[&str]) -> Query<'a> {
        Query::new(self.pool, entities).with_timeout(self.timeout)
    }

    fn select_from_table(&self, entities: &[&str]) -> Query<'a> {
        self.build_query(entities).select_from(self.table.qualified())
    }

    fn select_from_sample(&self, entities: &[&str]) -> Query<'a> {
        self.build_query(entities).select_from(self.sample.from_clause())
    }

    pub async fn select_first_from_table(
        &self,
        entities: &[&str],
    ) -> Result<Option<PgRow>, QueryError> {
        self.select_from_table(entities).first().await
    }

    pub async fn select_all_from_table(&self, entities: &[&str]) -> Result<Vec<PgRow>, QueryError> {
        self.select_from_table(entities).all().await
    }

    pub async fn select_first_from_sample(
        &self,
        entities: &[&str],
    ) -> Result<Option<PgRow>, QueryError> {
        self.select_from_sample(entities).first().await
    }

    pub async fn select_all_from_sample(&self, entities: &[&str]) -> Result<Vec<PgRow>, QueryError> {
        self.select_from_sample(entities).all().await
    }

    pub async fn select_first_from_query(query: Query<'_>) -> Result<Option<PgRow>, QueryError> {
        query.first().await
    }

    pub async fn select_all_from_query(query: Query<'_>) -> Result<Vec<PgRow>, QueryError> {
        query.all().await
    }
}

/// SQLSTATE `query_canceled`, raised when `statement_timeout` fires
const QUERY_CANCELED: &str = "57014";

/// Open a transaction whose statements the server cancels after `limit`
async fn begin_with_statement_timeout(
    pool: &PgPool,
    limit: Duration,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(&statement_timeout_sql(limit))
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

fn statement_timeout_sql(limit: Duration) -> String {
    // statement_timeout = 0 disables the timeout
    format!("SET LOCAL statement_timeout = {}", limit.as_millis().max(1))
}

/// Bound `fut` by `limit` on the client side as well
///
/// Dropping the future rolls its transaction back and returns the
/// connection to the pool; the server-side cancellation is reported as the
/// same timeout.
async fn run_with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) if is_query_canceled(&err) => Err(QueryError::Timeout(limit)),
        Ok(Err(err)) => Err(QueryError::Database(err)),
        Err(_) => Err(QueryError::Timeout(limit)),
    }
}

fn is_query_canceled(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED))
}

/// Quote a postgresql identifier (schema/table/column name) to prevent sql injection
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
