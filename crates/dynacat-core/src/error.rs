use thiserror::Error;

/// Errors raised while turning a raw attribute type string into a column type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("empty type string")]
    Empty,

    #[error("unknown data type '{0}'")]
    UnknownType(String),

    #[error("unbalanced brackets in type '{0}'")]
    Unbalanced(String),

    #[error("malformed struct field '{0}' (expected name:type)")]
    MalformedField(String),

    #[error("invalid type arguments in '{0}'")]
    InvalidArguments(String),
}

/// Errors raised while loading or validating a workflow configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid source: expected a DynamoDB connection, but got {0}")]
    InvalidSource(String),

    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
