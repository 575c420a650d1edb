use crate::error::TypeParseError;
use crate::parser::{ParsedType, parse_datatype_string};
use crate::types::{AttributeDefinition, Column, DataType};
use tracing::{debug, error};

/// Longest column name the catalog accepts
pub const MAX_COLUMN_NAME_LENGTH: usize = 64;

/// Length assigned to columns whose type does not carry one
pub const DEFAULT_DATA_LENGTH: i32 = 1;

/// Columns of one table, plus the attributes that could not be mapped
#[derive(Debug, Default)]
pub struct ColumnMapping {
    pub columns: Vec<Column>,
    pub skipped: Vec<(String, TypeParseError)>,
}

/// Map attribute definitions to columns, skipping the ones that fail to parse
pub fn build_columns(attributes: &[AttributeDefinition]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for attribute in attributes {
        match build_column(attribute) {
            Ok(column) => mapping.columns.push(column),
            Err(err) => {
                debug!(attribute = %attribute.attribute_name, "{:?}", err);
                error!(
                    "Failed to parse column {}: {}",
                    attribute.attribute_name, err
                );
                mapping.skipped.push((attribute.attribute_name.clone(), err));
            }
        }
    }

    mapping
}

/// Map a single attribute definition to a column
pub fn build_column(attribute: &AttributeDefinition) -> Result<Column, TypeParseError> {
    let raw_type = normalize_attribute_type(&attribute.attribute_type);
    let name = truncate_name(&attribute.attribute_name);

    let mut column = match parse_datatype_string(&raw_type.to_lowercase())? {
        ParsedType::Single(descriptor) => descriptor.into_column(name),
        ParsedType::Union(_) => {
            let mut column = Column::new(name, DataType::Union);
            column.data_type_display = Some(raw_type);
            column
        }
    };

    column.data_length.get_or_insert(DEFAULT_DATA_LENGTH);
    Ok(column)
}

/// String-type descriptors are declared without whitespace
fn normalize_attribute_type(raw: &str) -> String {
    if raw.to_uppercase().contains('S') {
        raw.replace(' ', "")
    } else {
        raw.to_string()
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_COLUMN_NAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_attribute_defaults_length() {
        let column = build_column(&AttributeDefinition::new("pk", "S")).unwrap();

        assert_eq!(column.name, "pk");
        assert_eq!(column.data_type, DataType::String);
        assert_eq!(column.data_length, Some(1));
    }

    #[test]
    fn test_explicit_length_is_kept() {
        let column = build_column(&AttributeDefinition::new("code", "VARCHAR(12)")).unwrap();
        assert_eq!(column.data_length, Some(12));
    }

    #[test]
    fn test_union_type_keeps_raw_display() {
        let column =
            build_column(&AttributeDefinition::new("value", "UNIONTYPE<INT,STRING>")).unwrap();

        assert_eq!(column.data_type, DataType::Union);
        assert_eq!(
            column.data_type_display.as_deref(),
            Some("UNIONTYPE<INT,STRING>")
        );
        assert_eq!(column.data_length, Some(1));
    }

    #[test]
    fn test_whitespace_stripped_for_string_types() {
        let column =
            build_column(&AttributeDefinition::new("value", "uniontype< int, string >")).unwrap();
        assert_eq!(
            column.data_type_display.as_deref(),
            Some("uniontype<int,string>")
        );

        let column = build_column(&AttributeDefinition::new("n", " N ")).unwrap();
        assert_eq!(column.data_type, DataType::Number);
    }

    #[test]
    fn test_long_names_truncated_to_limit() {
        let long_name = "a".repeat(100);
        let column = build_column(&AttributeDefinition::new(long_name, "N")).unwrap();
        assert_eq!(column.name.chars().count(), MAX_COLUMN_NAME_LENGTH);

        let exact = "b".repeat(MAX_COLUMN_NAME_LENGTH);
        let column = build_column(&AttributeDefinition::new(exact.clone(), "N")).unwrap();
        assert_eq!(column.name, exact);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let name = "é".repeat(70);
        let column = build_column(&AttributeDefinition::new(name, "S")).unwrap();
        assert_eq!(column.name.chars().count(), MAX_COLUMN_NAME_LENGTH);
    }

    #[test]
    fn test_bad_attribute_is_skipped() {
        let attributes = vec![
            AttributeDefinition::new("id", "S"),
            AttributeDefinition::new("broken", "GEOMETRY"),
            AttributeDefinition::new("created", "N"),
        ];

        let mapping = build_columns(&attributes);

        assert_eq!(mapping.columns.len(), 2);
        assert_eq!(mapping.columns[0].name, "id");
        assert_eq!(mapping.columns[1].name, "created");
        assert_eq!(
            mapping.skipped,
            vec![(
                "broken".to_string(),
                TypeParseError::UnknownType("geometry".to_string())
            )]
        );
    }
}
