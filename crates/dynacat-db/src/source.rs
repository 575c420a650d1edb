use crate::catalog::TableCatalog;
use crate::error::CatalogError;
use dynacat_core::columns::build_columns;
use dynacat_core::status::TABLE_FILTERED_REASON;
use dynacat_core::{
    ConfigError, Database, DatabaseAndTable, DatabaseSchema, DatabaseService, EntityReference,
    SourceStatus, Table, TableFilter, WorkflowSource,
};
use std::collections::VecDeque;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Service type recorded on the minted database service
pub const SERVICE_TYPE: &str = "DynamoDB";

/// Name of the database every DynamoDB table is registered under
pub const DATABASE_NAME: &str = "default";

/// Enumerates DynamoDB tables and yields one record per admitted table
pub struct DynamoDbSource<C> {
    config: WorkflowSource,
    catalog: C,
    service: DatabaseService,
    filter: TableFilter,
    status: SourceStatus,
    pending: Option<VecDeque<String>>,
}

impl<C: TableCatalog> DynamoDbSource<C> {
    /// Build a source from a workflow config
    ///
    /// Fails when the configured service connection is not a DynamoDB one or
    /// the table filter pattern does not compile.
    pub fn create(config: WorkflowSource, catalog: C) -> Result<Self, ConfigError> {
        config.dynamodb_connection()?;
        let filter = TableFilter::new(config.table_filter_pattern())?;
        let service = DatabaseService::new(config.service_name.clone(), SERVICE_TYPE);

        Ok(Self {
            config,
            catalog,
            service,
            filter,
            status: SourceStatus::new(),
            pending: None,
        })
    }

    pub fn prepare(&mut self) {}

    pub fn service(&self) -> &DatabaseService {
        &self.service
    }

    pub fn status(&self) -> &SourceStatus {
        &self.status
    }

    pub fn close(&mut self) {
        self.pending = None;
    }

    /// Produce the next record, or `None` once every table has been visited
    ///
    /// Tables are listed once on the first call. A table that fails to be
    /// described or mapped is logged, recorded as a failure and skipped.
    pub async fn next_record(&mut self) -> Option<DatabaseAndTable> {
        if self.pending.is_none() {
            self.pending = Some(self.list_tables().await);
        }

        while let Some(name) = self.pending.as_mut()?.pop_front() {
            if self.filter.filter_by_name(&name) {
                debug!(table = %name, "Skipping filtered table");
                self.status.filter(name, TABLE_FILTERED_REASON);
                continue;
            }

            match self.ingest_table(&name).await {
                Ok(record) => {
                    self.status.scanned(&name);
                    return Some(record);
                }
                Err(err) => {
                    debug!(table = %name, "{:?}", err);
                    error!("Failed to ingest table {}: {}", name, err);
                    self.status.failure(name, err.to_string());
                }
            }
        }

        None
    }

    /// Drain the source into a vector
    pub async fn records(&mut self) -> Vec<DatabaseAndTable> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await {
            records.push(record);
        }
        records
    }

    async fn list_tables(&mut self) -> VecDeque<String> {
        match self.catalog.list_tables().await {
            Ok(names) => {
                if names.is_empty() {
                    info!("No tables found for service {}", self.service.name);
                } else {
                    info!("Found {} table(s) for service {}", names.len(), self.service.name);
                }
                names.into()
            }
            Err(err) => {
                debug!("{:?}", err);
                error!("Failed to list tables: {}", err);
                self.status.failure("list_tables", err.to_string());
                VecDeque::new()
            }
        }
    }

    async fn ingest_table(&mut self, name: &str) -> Result<DatabaseAndTable, CatalogError> {
        let attributes = self.catalog.describe_attributes(name).await?;
        let mapping = build_columns(&attributes);
        for (column, err) in &mapping.skipped {
            self.status.warning(format!("{}.{}", name, column), err.to_string());
        }
        let columns = mapping.columns;

        let database = Database {
            id: Uuid::new_v4(),
            name: DATABASE_NAME.to_string(),
            service: self.service.reference(),
        };

        let schema_name = self
            .config
            .dynamodb_connection()
            .map(|connection| connection.schema_name().to_string())
            .unwrap_or_else(|_| DATABASE_NAME.to_string());

        let database_schema = DatabaseSchema {
            id: Uuid::new_v4(),
            name: schema_name,
            database: EntityReference::database(database.id),
            service: self.service.reference(),
        };

        let table = Table {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            columns,
        };

        Ok(DatabaseAndTable {
            database,
            database_schema,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{MemoryCatalog, sample_catalog};
    use dynacat_core::{DataType, FilterPattern};

    fn workflow(excludes: &[&str]) -> WorkflowSource {
        let mut source = WorkflowSource::from_json_str(
            r#"{
                "type": "dynamodb",
                "serviceName": "local_dynamodb",
                "serviceConnection": {
                    "config": { "type": "DynamoDB", "database": "custom_db" }
                }
            }"#,
        )
        .unwrap();
        source.source_config.config.table_filter_pattern = Some(FilterPattern {
            includes: vec![],
            excludes: excludes.iter().map(|s| s.to_string()).collect(),
        });
        source
    }

    #[tokio::test]
    async fn test_emits_one_record_per_table() {
        let mut source = DynamoDbSource::create(workflow(&[]), sample_catalog()).unwrap();
        source.prepare();

        let records = source.records().await;

        let names: Vec<&str> = records.iter().map(|r| r.table.name.as_str()).collect();
        assert_eq!(names, vec!["users", "orders", "tmp_orders", "avatars"]);
        assert_eq!(source.status().success.len(), 4);
    }

    #[tokio::test]
    async fn test_excluded_tables_are_recorded_as_filtered() {
        let mut source = DynamoDbSource::create(workflow(&["^tmp_"]), sample_catalog()).unwrap();

        let records = source.records().await;

        assert!(records.iter().all(|r| r.table.name != "tmp_orders"));
        assert_eq!(records.len(), 3);
        assert!(source.status().is_filtered("tmp_orders"));
        assert_eq!(
            source.status().filtered[0].reason,
            "Table pattern not allowed"
        );
    }

    #[tokio::test]
    async fn test_exclusion_ignores_table_name_case() {
        let catalog = MemoryCatalog::new()
            .with_table("TMP_orders", &[("id", "S")])
            .with_table("orders", &[("id", "S")]);
        let mut source = DynamoDbSource::create(workflow(&["tmp"]), catalog).unwrap();

        let records = source.records().await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].table.name, "orders");
        assert!(source.status().is_filtered("TMP_orders"));
    }

    #[tokio::test]
    async fn test_failing_table_does_not_stop_enumeration() {
        let catalog = MemoryCatalog::new()
            .with_table("first", &[("id", "S")])
            .with_failing_table("broken")
            .with_table("last", &[("id", "N")]);
        let mut source = DynamoDbSource::create(workflow(&[]), catalog).unwrap();

        let records = source.records().await;

        let names: Vec<&str> = records.iter().map(|r| r.table.name.as_str()).collect();
        assert_eq!(names, vec!["first", "last"]);
        assert_eq!(source.status().failures.len(), 1);
        assert_eq!(source.status().failures[0].name, "broken");
    }

    #[tokio::test]
    async fn test_record_hierarchy_and_fresh_ids() {
        let mut source = DynamoDbSource::create(workflow(&[]), sample_catalog()).unwrap();
        let service_id = source.service().id;

        let records = source.records().await;

        for record in &records {
            assert_eq!(record.database.name, "default");
            assert_eq!(record.database_schema.name, "custom_db");
            assert_eq!(record.database_schema.database.id, record.database.id);
            assert_eq!(record.database_schema.database.entity_type, "database");
            assert_eq!(record.database.service.id, service_id);
            assert_eq!(record.database_schema.service.id, service_id);
            assert_eq!(record.table.description, "");
        }
        assert_ne!(records[0].database.id, records[1].database.id);
        assert_ne!(records[0].database_schema.id, records[1].database_schema.id);
        assert_ne!(records[0].table.id, records[1].table.id);
    }

    #[tokio::test]
    async fn test_columns_are_mapped() {
        let mut source = DynamoDbSource::create(workflow(&[]), sample_catalog()).unwrap();

        let users = source.next_record().await.unwrap();

        assert_eq!(users.table.columns.len(), 2);
        assert_eq!(users.table.columns[0].name, "user_id");
        assert_eq!(users.table.columns[0].data_type, DataType::String);
        assert_eq!(users.table.columns[1].data_type, DataType::Number);
        assert!(users.table.columns.iter().all(|c| c.data_length == Some(1)));
    }

    #[tokio::test]
    async fn test_unparseable_column_is_skipped() {
        let catalog = MemoryCatalog::new().with_table("mixed", &[("id", "S"), ("shape", "GEO")]);
        let mut source = DynamoDbSource::create(workflow(&[]), catalog).unwrap();

        let record = source.next_record().await.unwrap();

        assert_eq!(record.table.columns.len(), 1);
        assert!(!source.status().has_failures());
        assert_eq!(source.status().warnings.len(), 1);
        assert_eq!(source.status().warnings[0].name, "mixed.shape");
        assert_eq!(source.status().success, vec!["mixed"]);
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_nothing() {
        let mut source = DynamoDbSource::create(workflow(&[]), MemoryCatalog::new()).unwrap();

        assert!(source.next_record().await.is_none());
        assert!(source.next_record().await.is_none());
        assert_eq!(source.status().total_seen(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_ends_sequence() {
        let catalog = sample_catalog().with_list_failure("access denied");
        let mut source = DynamoDbSource::create(workflow(&[]), catalog).unwrap();

        assert!(source.next_record().await.is_none());
        assert!(source.status().has_failures());
        assert_eq!(source.status().failures[0].name, "list_tables");
    }

    #[test]
    fn test_create_rejects_non_dynamodb_connection() {
        let config = WorkflowSource::from_json_str(
            r#"{
                "type": "glue",
                "serviceName": "svc",
                "serviceConnection": { "config": { "type": "Glue" } }
            }"#,
        )
        .unwrap();

        let result = DynamoDbSource::create(config, MemoryCatalog::new());
        assert!(matches!(result, Err(ConfigError::InvalidSource(_))));
    }

    #[test]
    fn test_create_rejects_invalid_filter() {
        let result = DynamoDbSource::create(workflow(&["[bad"]), MemoryCatalog::new());
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
