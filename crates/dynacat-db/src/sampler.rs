use crate::runner::{TableRef, quote_identifier};
use sqlx::PgPool;

/// Alias the sample projection is exposed under
pub const SAMPLE_ALIAS: &str = "sample";

/// Sampling strategy selection based on table size
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    /// Every row of the table
    Full,

    /// Random sampling for smaller tables (< 100k rows)
    /// Simple ORDER BY random() LIMIT N
    Random { limit: usize },

    /// Reservoir sampling for medium tables (100K - 10M rows)
    /// uses primary key based random sampling for better performance
    ReservoirPK { sample_size: usize, pk: String },

    /// TABLESAMPLE for larger tables (> 10M rows)
    /// Postgresql's built in sampling - fast and no table locks
    TableSample { percentage: f32, limit: usize },
}

impl SamplingStrategy {
    /// Auto select the best sampling strategy based on table size
    ///
    /// # Strategy selection
    /// - sample covers the table: Full
    /// - < 100k rows: Random sampling
    /// - 100k - 10M rows: Reservoir sampling with PK, Random without one
    /// - > 10M rows: TABLESAMPLE
    pub async fn auto_select(
        pool: &PgPool,
        table: &TableRef,
        estimated_rows: Option<i64>,
        sample_size: usize,
    ) -> Result<Self, sqlx::Error> {
        let row_count = match estimated_rows {
            Some(count) if count > 0 => count,
            _ => get_row_count(pool, table).await?,
        };

        Ok(Self::for_row_count(row_count, sample_size, || async {
            find_primary_key(pool, table).await
        })
        .await)
    }

    async fn for_row_count<F, Fut>(row_count: i64, sample_size: usize, primary_key: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<PrimaryKey>, sqlx::Error>>,
    {
        if sample_size >= row_count.max(0) as usize {
            return Self::Full;
        }

        match row_count {
            n if n < 100_000 => Self::Random { limit: sample_size },
            n if n < 10_000_000 => match primary_key().await {
                Ok(Some(pk)) if pk.is_integer_key() => Self::ReservoirPK {
                    sample_size,
                    pk: pk.column,
                },
                _ => Self::Random { limit: sample_size },
            },
            _ => Self::TableSample {
                percentage: tablesample_percentage(row_count, sample_size),
                limit: sample_size,
            },
        }
    }

    /// Get the max number of rows this strategy returns
    pub fn max_samples(&self) -> usize {
        match self {
            Self::Full => usize::MAX,
            Self::Random { limit } => *limit,
            Self::ReservoirPK { sample_size, .. } => *sample_size,
            Self::TableSample { limit, .. } => *limit,
        }
    }

    /// SELECT statement producing the sampled rows of `table`
    pub fn build_query(&self, table: &TableRef) -> String {
        let table_quoted = table.qualified();

        match self {
            Self::Full => format!("SELECT * FROM {}", table_quoted),
            Self::Random { limit } => {
                format!("SELECT * FROM {} ORDER BY random() LIMIT {}", table_quoted, limit)
            }
            Self::ReservoirPK { sample_size, pk } => {
                let pk_quoted = quote_identifier(pk);
                // Random ids are looked up through the PK index instead of sorting the table
                format!(
                    "WITH random_ids AS (
                        SELECT DISTINCT floor(random() * (SELECT MAX({pk}) FROM {table}))::bigint + 1 AS rand_id
                        FROM generate_series(1, {oversample})
                    )
                    SELECT t.*
                    FROM {table} t
                    INNER JOIN random_ids r ON t.{pk} = r.rand_id
                    LIMIT {limit}",
                    pk = pk_quoted,
                    table = table_quoted,
                    oversample = sample_size * 2, // account for PK gaps
                    limit = sample_size
                )
            }
            Self::TableSample { percentage, limit } => format!(
                "SELECT * FROM {} TABLESAMPLE BERNOULLI({}) LIMIT {}",
                table_quoted, percentage, limit
            ),
        }
    }

    /// Human readable description of the strategy
    pub fn info(&self) -> String {
        match self {
            Self::Full => "Full table (all rows)".to_string(),
            Self::Random { limit } => format!("Random sampling (up to {} rows)", limit),
            Self::ReservoirPK { sample_size, pk } => format!(
                "Reservoir sampling using PK '{}' (up to {} rows)",
                pk, sample_size
            ),
            Self::TableSample { percentage, limit } => {
                format!("TABLESAMPLE {:.2}% (up to {} rows)", percentage, limit)
            }
        }
    }
}

/// A derived projection over a table, used in place of the table when profiling
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    table: TableRef,
    strategy: SamplingStrategy,
}

impl Sample {
    pub fn new(table: TableRef, strategy: SamplingStrategy) -> Self {
        Self { table, strategy }
    }

    /// Build a sample with an auto-selected strategy
    pub async fn auto(
        pool: &PgPool,
        table: TableRef,
        sample_size: usize,
    ) -> Result<Self, sqlx::Error> {
        let estimated_rows = estimate_row_count(pool, &table).await?;
        let strategy =
            SamplingStrategy::auto_select(pool, &table, estimated_rows, sample_size).await?;
        Ok(Self::new(table, strategy))
    }

    pub fn strategy(&self) -> &SamplingStrategy {
        &self.strategy
    }

    /// FROM clause exposing the sample as `"sample"`
    pub fn from_clause(&self) -> String {
        format!(
            "({}) AS {}",
            self.strategy.build_query(&self.table),
            quote_identifier(SAMPLE_ALIAS)
        )
    }
}

/// Get exact row count for a table
///
/// Executes COUNT(*); prefer `estimate_row_count` on large tables.
pub async fn get_row_count(pool: &PgPool, table: &TableRef) -> Result<i64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.qualified()))
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Planner statistics row estimate, if the table has been analyzed
pub async fn estimate_row_count(
    pool: &PgPool,
    table: &TableRef,
) -> Result<Option<i64>, sqlx::Error> {
    let estimate: Option<i64> = sqlx::query_scalar(
        r#"
          SELECT n_live_tup
          FROM pg_stat_user_tables
          WHERE schemaname = $1 AND relname = $2
          "#,
    )
    .bind(&table.schema)
    .bind(&table.name)
    .fetch_optional(pool)
    .await?;

    Ok(estimate)
}

/// Leading column of a table's primary key
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey {
    pub column: String,
    /// `regtype` name of the column, e.g. `integer` or `uuid`
    pub type_name: String,
    /// Number of columns in the key
    pub key_columns: i32,
}

impl PrimaryKey {
    /// Reservoir sampling draws random integer ids, so it needs a single
    /// integer key column
    pub fn is_integer_key(&self) -> bool {
        self.key_columns == 1
            && matches!(self.type_name.as_str(), "smallint" | "integer" | "bigint")
    }
}

/// Leading primary key column of `table`, if it has a primary key
pub async fn find_primary_key(
    pool: &PgPool,
    table: &TableRef,
) -> Result<Option<PrimaryKey>, sqlx::Error> {
    let row: Option<(String, String, i32)> = sqlx::query_as(
        r#"
          SELECT a.attname::text, a.atttypid::regtype::text, i.indnkeyatts::int4
          FROM pg_index i
          JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = i.indkey[0]
          WHERE i.indrelid = (quote_ident($1) || '.' || quote_ident($2))::regclass
            AND i.indisprimary
          "#,
    )
    .bind(&table.schema)
    .bind(&table.name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(column, type_name, key_columns)| PrimaryKey {
        column,
        type_name,
        key_columns,
    }))
}

fn tablesample_percentage(row_count: i64, sample_size: usize) -> f32 {
    // PostgreSQL rejects percentages above 100; tiny ones sample nothing
    (sample_size as f32 / row_count as f32 * 100.0).clamp(0.1, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableRef {
        TableRef::new("public", "users")
    }

    fn key(column: &str, type_name: &str, key_columns: i32) -> PrimaryKey {
        PrimaryKey {
            column: column.to_string(),
            type_name: type_name.to_string(),
            key_columns,
        }
    }

    async fn select_with_key(
        row_count: i64,
        sample_size: usize,
        pk: Option<PrimaryKey>,
    ) -> SamplingStrategy {
        SamplingStrategy::for_row_count(row_count, sample_size, || async move { Ok(pk) }).await
    }

    async fn select(row_count: i64, sample_size: usize, pk: Option<&str>) -> SamplingStrategy {
        select_with_key(row_count, sample_size, pk.map(|c| key(c, "integer", 1))).await
    }

    #[tokio::test]
    async fn test_auto_select_thresholds() {
        assert_eq!(select(500, 1000, None).await, SamplingStrategy::Full);
        assert_eq!(select(1000, 1000, None).await, SamplingStrategy::Full);
        assert_eq!(
            select(50_000, 1000, None).await,
            SamplingStrategy::Random { limit: 1000 }
        );
        assert_eq!(
            select(500_000, 1000, Some("id")).await,
            SamplingStrategy::ReservoirPK {
                sample_size: 1000,
                pk: "id".to_string()
            }
        );
        assert_eq!(
            select(500_000, 1000, None).await,
            SamplingStrategy::Random { limit: 1000 }
        );
        assert!(matches!(
            select(50_000_000, 1000, Some("id")).await,
            SamplingStrategy::TableSample { limit: 1000, .. }
        ));
    }

    #[test]
    fn test_strategy_max_samples() {
        let random = SamplingStrategy::Random { limit: 5000 };
        assert_eq!(random.max_samples(), 5000);

        let reservoir = SamplingStrategy::ReservoirPK {
            sample_size: 10000,
            pk: "id".to_string(),
        };
        assert_eq!(reservoir.max_samples(), 10000);

        let tablesample = SamplingStrategy::TableSample {
            percentage: 1.0,
            limit: 15000,
        };
        assert_eq!(tablesample.max_samples(), 15000);
        assert_eq!(SamplingStrategy::Full.max_samples(), usize::MAX);
    }

    #[test]
    fn test_build_query_full() {
        let query = SamplingStrategy::Full.build_query(&users());
        assert_eq!(query, "SELECT * FROM \"public\".\"users\"");
    }

    #[test]
    fn test_build_query_random() {
        let query = SamplingStrategy::Random { limit: 1000 }.build_query(&users());

        assert!(query.contains("ORDER BY random()"));
        assert!(query.contains("LIMIT 1000"));
        assert!(query.contains("\"public\".\"users\""));
    }

    #[test]
    fn test_build_query_reservoir() {
        let strategy = SamplingStrategy::ReservoirPK {
            sample_size: 5000,
            pk: "id".to_string(),
        };
        let query = strategy.build_query(&users());

        assert!(query.contains("WITH random_ids"));
        assert!(query.contains("generate_series(1, 10000)"));
        assert!(query.contains("INNER JOIN"));
        assert!(query.contains("t.\"id\" = r.rand_id"));
        assert!(query.contains("LIMIT 5000"));
    }

    #[test]
    fn test_build_query_tablesample() {
        let strategy = SamplingStrategy::TableSample {
            percentage: 0.5,
            limit: 10000,
        };
        let query = strategy.build_query(&users());

        assert!(query.contains("TABLESAMPLE BERNOULLI(0.5)"));
        assert!(query.contains("LIMIT 10000"));
    }

    #[test]
    fn test_sample_from_clause() {
        let sample = Sample::new(users(), SamplingStrategy::Random { limit: 10 });
        assert_eq!(
            sample.from_clause(),
            "(SELECT * FROM \"public\".\"users\" ORDER BY random() LIMIT 10) AS \"sample\""
        );
    }

    #[test]
    fn test_strategy_info() {
        assert_eq!(
            SamplingStrategy::Random { limit: 5000 }.info(),
            "Random sampling (up to 5000 rows)"
        );
        assert_eq!(
            SamplingStrategy::ReservoirPK {
                sample_size: 10000,
                pk: "user_id".to_string(),
            }
            .info(),
            "Reservoir sampling using PK 'user_id' (up to 10000 rows)"
        );
        assert_eq!(
            SamplingStrategy::TableSample {
                percentage: 2.5,
                limit: 20000,
            }
            .info(),
            "TABLESAMPLE 2.50% (up to 20000 rows)"
        );
    }

    #[tokio::test]
    async fn test_reservoir_requires_single_integer_key() {
        for type_name in ["smallint", "integer", "bigint"] {
            assert_eq!(
                select_with_key(500_000, 1000, Some(key("id", type_name, 1))).await,
                SamplingStrategy::ReservoirPK {
                    sample_size: 1000,
                    pk: "id".to_string()
                }
            );
        }

        for pk in [
            key("id", "uuid", 1),
            key("code", "text", 1),
            key("tenant_id", "bigint", 2),
        ] {
            assert_eq!(
                select_with_key(500_000, 1000, Some(pk)).await,
                SamplingStrategy::Random { limit: 1000 }
            );
        }
    }

    #[tokio::test]
    async fn test_key_lookup_error_falls_back_to_random() {
        let strategy = SamplingStrategy::for_row_count(500_000, 1000, || async {
            Err(sqlx::Error::RowNotFound)
        })
        .await;
        assert_eq!(strategy, SamplingStrategy::Random { limit: 1000 });
    }

    #[test]
    fn test_tablesample_percentage_bounds() {
        assert_eq!(tablesample_percentage(10_000_000, 10_000_011), 100.0);
        assert_eq!(tablesample_percentage(1_000_000_000, 100), 0.1);
    }
}
