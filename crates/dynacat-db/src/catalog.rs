use crate::connection::DynamoClient;
use crate::error::CatalogError;
use dynacat_core::AttributeDefinition;

/// Read access to the tables of a key-value store
pub trait TableCatalog {
    /// Names of every table visible to the connection
    fn list_tables(&self) -> impl Future<Output = Result<Vec<String>, CatalogError>> + Send;

    /// Declared attribute definitions (key schema attributes) of a table
    fn describe_attributes(
        &self,
        table: &str,
    ) -> impl Future<Output = Result<Vec<AttributeDefinition>, CatalogError>> + Send;
}

impl TableCatalog for DynamoClient {
    /// List all tables, following `LastEvaluatedTableName` until exhausted
    async fn list_tables(&self) -> Result<Vec<String>, CatalogError> {
        let mut names = Vec::new();
        let mut start_after: Option<String> = None;

        loop {
            let response = self
                .client()
                .list_tables()
                .set_exclusive_start_table_name(start_after.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)?;

            names.extend(response.table_names().iter().cloned());

            match response.last_evaluated_table_name() {
                Some(last) => start_after = Some(last.to_string()),
                None => break,
            }
        }

        Ok(names)
    }

    async fn describe_attributes(
        &self,
        table: &str,
    ) -> Result<Vec<AttributeDefinition>, CatalogError> {
        let response = self
            .client()
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        let description = response
            .table()
            .ok_or_else(|| CatalogError::TableNotFound(table.to_string()))?;

        Ok(description
            .attribute_definitions()
            .iter()
            .map(|attribute| {
                AttributeDefinition::new(
                    attribute.attribute_name(),
                    attribute.attribute_type().as_str(),
                )
            })
            .collect())
    }
}
