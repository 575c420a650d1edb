pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod parser;
pub mod sink;
pub mod status;
pub mod types;

pub use config::{DynamoDbConnection, WorkflowSource};
pub use error::{ConfigError, TypeParseError};
pub use filter::{FilterPattern, TableFilter};
pub use status::SourceStatus;
pub use types::{
    AttributeDefinition, Column, DataType, Database, DatabaseAndTable, DatabaseSchema,
    DatabaseService, EntityReference, Table,
};
