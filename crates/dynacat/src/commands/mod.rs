pub mod ingest;
pub mod profile;
pub mod test_connection;
