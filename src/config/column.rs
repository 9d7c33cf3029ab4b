//! Per-column mapping for the table-shaped strategies (LIST, GROUP_LIST,
//! VERTICAL_LIST).
use serde::{Deserialize, Serialize};

use crate::config::field::FieldType;

/// One mapped column of a table extractor.
///
/// Horizontal strategies use `column_cell` (column letters); VERTICAL_LIST
/// uses `row_cell` (a one-based row number) instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default)]
    pub order: i32,

    #[serde(rename = "javaFieldName")]
    pub field_name: String,

    #[serde(rename = "javaFieldType", default)]
    pub field_type: FieldType,

    #[serde(
        rename = "columnCell",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub column_cell: Option<String>,

    #[serde(rename = "rowCell", default, skip_serializing_if = "Option::is_none")]
    pub row_cell: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Blank cells inherit the nearest non-blank value above (merged ranges
    /// flattened by the decoder leave only the anchor cell populated).
    #[serde(
        rename = "isMergeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_merge_type: Option<bool>,

    #[serde(rename = "isDynamic", default, skip_serializing_if = "Option::is_none")]
    pub is_dynamic: Option<bool>,

    #[serde(
        rename = "extractPattern",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extract_pattern: Option<String>,

    /// One-based row offset within a GROUP_LIST group; defaults to 1.
    #[serde(
        rename = "groupRowIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub group_row_index: Option<u32>,

    /// Fallback columns consulted when the primary cell is blank.
    #[serde(
        rename = "alternativeColumnCell",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alternative_column_cell: Vec<String>,

    /// Only `"fixed"` enables the fallback lookup.
    #[serde(
        rename = "alternativeStrategy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub alternative_strategy: Option<String>,
}

impl ColumnConfig {
    pub fn is_merge(&self) -> bool {
        self.is_merge_type.unwrap_or(false)
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic.unwrap_or(false)
    }

    pub fn uses_fixed_alternatives(&self) -> bool {
        !self.alternative_column_cell.is_empty()
            && self
                .alternative_strategy
                .as_deref()
                .is_some_and(|strategy| strategy.eq_ignore_ascii_case("fixed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_schema_keys() {
        let json = r#"{
            "order": 1,
            "javaFieldName": "depth",
            "javaFieldType": "Double",
            "columnCell": "C",
            "isMergeType": true,
            "alternativeColumnCell": ["D", "E"],
            "alternativeStrategy": "fixed"
        }"#;
        let column: ColumnConfig = serde_json::from_str(json).unwrap();
        assert_eq!(column.field_name, "depth");
        assert_eq!(column.field_type, FieldType::Double);
        assert_eq!(column.column_cell.as_deref(), Some("C"));
        assert!(column.is_merge());
        assert!(column.uses_fixed_alternatives());
    }

    #[test]
    fn alternative_lookup_requires_fixed_strategy() {
        let json = r#"{
            "javaFieldName": "depth",
            "alternativeColumnCell": ["D"],
            "alternativeStrategy": "nearest"
        }"#;
        let column: ColumnConfig = serde_json::from_str(json).unwrap();
        assert!(!column.uses_fixed_alternatives());
    }
}
