pub mod catalog;
pub mod connection;
pub mod error;
pub mod fixtures;
pub mod runner;
pub mod sampler;
pub mod source;
pub mod test_utils; // Test utilities - available for integration tests

pub use catalog::TableCatalog;
pub use connection::{ConnectionPool, DynamoClient};
pub use error::{CatalogError, QueryError};
pub use runner::{Query, QueryRunner, TableRef};
pub use sampler::{Sample, SamplingStrategy};
pub use source::DynamoDbSource;
