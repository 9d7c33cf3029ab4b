//! Per-field mapping for fixed-position (SINGLE) extraction and the target
//! type aliases shared by every strategy.
use serde::{Deserialize, Serialize};

/// The coercion target of an extracted cell value.
///
/// Parsed leniently from the alias spellings found in existing configuration
/// files; unknown names fall back to `Text`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
}

impl FieldType {
    pub fn parse(name: &str) -> FieldType {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "text" | "str" | "java.lang.string" => FieldType::Text,
            "int" | "integer" | "java.lang.integer" => FieldType::Integer,
            "long" | "java.lang.long" => FieldType::Long,
            "float" | "java.lang.float" => FieldType::Float,
            "double" | "java.lang.double" => FieldType::Double,
            "decimal" | "bigdecimal" | "java.math.bigdecimal" => FieldType::Decimal,
            "bool" | "boolean" | "java.lang.boolean" => FieldType::Boolean,
            "date" | "localdate" | "java.util.date" | "java.time.localdate" => FieldType::Date,
            "datetime" | "timestamp" | "localdatetime" | "java.time.localdatetime" => {
                FieldType::DateTime
            }
            _ => FieldType::Text,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "String",
            FieldType::Integer => "Integer",
            FieldType::Long => "Long",
            FieldType::Float => "Float",
            FieldType::Double => "Double",
            FieldType::Decimal => "BigDecimal",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::DateTime => "DateTime",
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        FieldType::parse(&name)
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        kind.as_str().to_owned()
    }
}

/// One fixed-position field of a SINGLE extractor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub order: i32,

    /// Name handed to the record's field sink.
    #[serde(rename = "javaFieldName")]
    pub field_name: String,

    #[serde(rename = "javaFieldType", default)]
    pub field_type: FieldType,

    /// A1-style coordinate; may embed a `${...}` expression when `is_dynamic`.
    #[serde(rename = "excelCell")]
    pub cell: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Regex applied to the raw text before coercion; for date fields this
    /// doubles as an explicit format string.
    #[serde(
        rename = "extractPattern",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extract_pattern: Option<String>,

    /// Fallback raw value coerced when the cell is blank.
    #[serde(
        rename = "defaultValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<String>,

    #[serde(rename = "isDynamic", default, skip_serializing_if = "Option::is_none")]
    pub is_dynamic: Option<bool>,
}

impl FieldConfig {
    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_aliases() {
        assert_eq!(FieldType::parse("java.lang.Integer"), FieldType::Integer);
        assert_eq!(FieldType::parse("String"), FieldType::Text);
        assert_eq!(FieldType::parse("localdate"), FieldType::Date);
        assert_eq!(FieldType::parse("BigDecimal"), FieldType::Decimal);
        assert_eq!(FieldType::parse("DOUBLE"), FieldType::Double);
        assert_eq!(FieldType::parse("something-else"), FieldType::Text);
    }

    #[test]
    fn deserializes_schema_keys() {
        let json = r#"{
            "order": 2,
            "javaFieldName": "wellName",
            "javaFieldType": "String",
            "excelCell": "B2",
            "isDynamic": true
        }"#;
        let field: FieldConfig = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_name, "wellName");
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.cell, "B2");
        assert!(field.is_dynamic());
        assert_eq!(field.order, 2);
    }
}
