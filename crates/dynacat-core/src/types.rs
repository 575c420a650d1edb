use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Column data types understood by the catalog
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    String,
    Number,
    Binary,
    Boolean,
    Null,
    Set,
    Array,
    Map,
    Struct,
    Union,
    Int,
    Bigint,
    Smallint,
    Tinyint,
    Float,
    Double,
    Decimal,
    Numeric,
    Varchar,
    Char,
    Text,
    Date,
    Time,
    Timestamp,
    Json,
    Uuid,
}

impl DataType {
    /// Resolve a lowercase primitive type token (DynamoDB or SQL flavoured)
    pub fn from_token(token: &str) -> Option<Self> {
        let data_type = match token {
            // DynamoDB attribute type descriptors
            "s" => DataType::String,
            "n" => DataType::Number,
            "b" => DataType::Binary,
            "bool" => DataType::Boolean,
            "null" => DataType::Null,
            "ss" | "ns" | "bs" => DataType::Set,
            "l" => DataType::Array,
            "m" => DataType::Map,

            "string" => DataType::String,
            "varchar" | "character varying" => DataType::Varchar,
            "char" | "character" => DataType::Char,
            "text" => DataType::Text,
            "int" | "integer" => DataType::Int,
            "bigint" | "long" => DataType::Bigint,
            "smallint" => DataType::Smallint,
            "tinyint" => DataType::Tinyint,
            "float" | "real" => DataType::Float,
            "double" | "double precision" => DataType::Double,
            "decimal" => DataType::Decimal,
            "numeric" | "number" => DataType::Numeric,
            "boolean" => DataType::Boolean,
            "binary" | "bytes" => DataType::Binary,
            "date" => DataType::Date,
            "time" => DataType::Time,
            "timestamp" => DataType::Timestamp,
            "json" => DataType::Json,
            "uuid" => DataType::Uuid,
            _ => return None,
        };
        Some(data_type)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "STRING",
            DataType::Number => "NUMBER",
            DataType::Binary => "BINARY",
            DataType::Boolean => "BOOLEAN",
            DataType::Null => "NULL",
            DataType::Set => "SET",
            DataType::Array => "ARRAY",
            DataType::Map => "MAP",
            DataType::Struct => "STRUCT",
            DataType::Union => "UNION",
            DataType::Int => "INT",
            DataType::Bigint => "BIGINT",
            DataType::Smallint => "SMALLINT",
            DataType::Tinyint => "TINYINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::Numeric => "NUMERIC",
            DataType::Varchar => "VARCHAR",
            DataType::Char => "CHAR",
            DataType::Text => "TEXT",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Json => "JSON",
            DataType::Uuid => "UUID",
        };
        f.write_str(name)
    }
}

/// Raw key metadata as declared by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: String,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            attribute_type: attribute_type.into(),
        }
    }
}

/// Typed pointer from one entity to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub entity_type: String,
}

impl EntityReference {
    pub fn database_service(id: Uuid) -> Self {
        Self {
            id,
            entity_type: "databaseService".to_string(),
        }
    }

    pub fn database(id: Uuid) -> Self {
        Self {
            id,
            entity_type: "database".to_string(),
        }
    }
}

/// The service every ingested entity belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseService {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
}

impl DatabaseService {
    pub fn new(name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            service_type: service_type.into(),
        }
    }

    pub fn reference(&self) -> EntityReference {
        EntityReference::database_service(self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub id: Uuid,
    pub name: String,
    pub service: EntityReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub id: Uuid,
    pub name: String,
    pub database: EntityReference,
    pub service: EntityReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            data_type_display: None,
            data_length: None,
            precision: None,
            scale: None,
            array_data_type: None,
            children: Vec::new(),
            description: None,
        }
    }

    /// Type as shown to users, falling back to the bare data type
    pub fn display_type(&self) -> String {
        self.data_type_display
            .clone()
            .unwrap_or_else(|| self.data_type.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub columns: Vec<Column>,
}

/// A table together with the database and schema it is registered under
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAndTable {
    pub database: Database,
    pub database_schema: DatabaseSchema,
    pub table: Table,
}
