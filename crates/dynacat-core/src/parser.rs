//! Column type string parser
//!
//! Turns declared type strings such as `s`, `varchar(64)`, `decimal(10,2)`,
//! `array<string>`, `map<string,int>`, `struct<a:int,b:string>` or
//! `uniontype<int,string>` into structured type descriptors.

use crate::error::TypeParseError;
use crate::types::{Column, DataType};

/// Result of parsing a type string
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedType {
    /// A single, unambiguous type
    Single(TypeDescriptor),
    /// A union of candidate types, one entry per member
    Union(Vec<ParsedType>),
}

impl ParsedType {
    /// Data type this parse collapses to when a single type is required
    pub fn data_type(&self) -> DataType {
        match self {
            ParsedType::Single(descriptor) => descriptor.data_type,
            ParsedType::Union(_) => DataType::Union,
        }
    }
}

/// Structured description of a single type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub data_type: DataType,
    pub data_type_display: Option<String>,
    pub data_length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub array_data_type: Option<DataType>,
    pub children: Vec<Column>,
}

impl TypeDescriptor {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            data_type_display: None,
            data_length: None,
            precision: None,
            scale: None,
            array_data_type: None,
            children: Vec::new(),
        }
    }

    fn with_display(mut self, display: &str) -> Self {
        self.data_type_display = Some(display.to_string());
        self
    }

    /// Attach a column name to this descriptor
    pub fn into_column(self, name: impl Into<String>) -> Column {
        let mut column = Column::new(name, self.data_type);
        column.data_type_display = self.data_type_display;
        column.data_length = self.data_length;
        column.precision = self.precision;
        column.scale = self.scale;
        column.array_data_type = self.array_data_type;
        column.children = self.children;
        column
    }
}

/// Parse a declared type string
///
/// Matching is case-insensitive. Union types come back as
/// [`ParsedType::Union`] so callers can decide how to present them.
pub fn parse_datatype_string(input: &str) -> Result<ParsedType, TypeParseError> {
    let display = input.trim();
    if display.is_empty() {
        return Err(TypeParseError::Empty);
    }
    let lower = display.to_ascii_lowercase();

    if let Some(inner) = strip_wrapper(&lower, "array")? {
        let element = parse_datatype_string(inner)?;
        let mut descriptor = TypeDescriptor::new(DataType::Array).with_display(display);
        descriptor.array_data_type = Some(element.data_type());
        return Ok(ParsedType::Single(descriptor));
    }

    if let Some(inner) = strip_wrapper(&lower, "map")? {
        let parts = split_top_level(inner, ',')?;
        if parts.len() != 2 {
            return Err(TypeParseError::InvalidArguments(display.to_string()));
        }
        for part in parts {
            parse_datatype_string(part)?;
        }
        return Ok(ParsedType::Single(
            TypeDescriptor::new(DataType::Map).with_display(display),
        ));
    }

    if let Some(inner) = strip_wrapper(&lower, "struct")? {
        let mut descriptor = TypeDescriptor::new(DataType::Struct).with_display(display);
        if !inner.trim().is_empty() {
            for field in split_top_level(inner, ',')? {
                descriptor.children.push(parse_struct_field(field)?);
            }
        }
        return Ok(ParsedType::Single(descriptor));
    }

    let union_inner = match strip_wrapper(&lower, "uniontype")? {
        Some(inner) => Some(inner),
        None => strip_wrapper(&lower, "union")?,
    };
    if let Some(inner) = union_inner {
        if inner.trim().is_empty() {
            return Err(TypeParseError::InvalidArguments(display.to_string()));
        }
        let members = split_top_level(inner, ',')?
            .into_iter()
            .map(parse_datatype_string)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ParsedType::Union(members));
    }

    parse_primitive(&lower, display).map(ParsedType::Single)
}

/// Parse `name`, `name(n)` or `name(p,s)`
fn parse_primitive(lower: &str, display: &str) -> Result<TypeDescriptor, TypeParseError> {
    if lower.contains(['<', '>']) {
        return Err(TypeParseError::Unbalanced(display.to_string()));
    }

    let Some(open) = lower.find('(') else {
        let data_type = DataType::from_token(lower)
            .ok_or_else(|| TypeParseError::UnknownType(display.to_string()))?;
        return Ok(TypeDescriptor::new(data_type));
    };

    let args = lower[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| TypeParseError::Unbalanced(display.to_string()))?;
    let name = lower[..open].trim();
    let data_type = DataType::from_token(name)
        .ok_or_else(|| TypeParseError::UnknownType(display.to_string()))?;

    let numbers = args
        .split(',')
        .map(|arg| arg.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| TypeParseError::InvalidArguments(display.to_string()))?;

    let mut descriptor = TypeDescriptor::new(data_type).with_display(display);
    match numbers.as_slice() {
        [length] => descriptor.data_length = Some(*length),
        [precision, scale] => {
            descriptor.precision = Some(*precision);
            descriptor.scale = Some(*scale);
        }
        _ => return Err(TypeParseError::InvalidArguments(display.to_string())),
    }
    Ok(descriptor)
}

fn parse_struct_field(field: &str) -> Result<Column, TypeParseError> {
    let (name, type_string) = field
        .split_once(':')
        .ok_or_else(|| TypeParseError::MalformedField(field.trim().to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(TypeParseError::MalformedField(field.trim().to_string()));
    }

    Ok(match parse_datatype_string(type_string)? {
        ParsedType::Single(descriptor) => descriptor.into_column(name),
        ParsedType::Union(_) => {
            let mut column = Column::new(name, DataType::Union);
            column.data_type_display = Some(type_string.trim().to_string());
            column
        }
    })
}

/// Return the text between `keyword<` and the closing `>`, if `s` is such a wrapper
fn strip_wrapper<'a>(s: &'a str, keyword: &str) -> Result<Option<&'a str>, TypeParseError> {
    let Some(rest) = s.strip_prefix(keyword) else {
        return Ok(None);
    };
    let Some(rest) = rest.trim_start().strip_prefix('<') else {
        return Ok(None);
    };
    rest.strip_suffix('>')
        .map(Some)
        .ok_or_else(|| TypeParseError::Unbalanced(s.to_string()))
}

/// Split on `separator`, ignoring separators nested in `<>` or `()`
fn split_top_level(s: &str, separator: char) -> Result<Vec<&str>, TypeParseError> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (idx, ch) in s.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(TypeParseError::Unbalanced(s.to_string()));
                }
            }
            c if c == separator && depth == 0 => {
                parts.push(s[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(TypeParseError::Unbalanced(s.to_string()));
    }
    parts.push(s[start..].trim());
    Ok(parts)
}
