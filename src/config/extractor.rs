//! One extraction unit: the target type it produces, its strategy, its row
//! window and the field or column mappings it applies.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::bound::Bound;
use crate::config::field::FieldConfig;
use crate::config::table::TableConfig;

/// How the extractor shapes its output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    /// One record from fixed cell positions.
    Single,
    /// One record per data row.
    List,
    /// One record per fixed-size row group.
    GroupList,
    /// One record per data column (transposed table).
    VerticalList,
}

/// A marker row that fixes a dynamic bound when its text matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagConfig {
    pub text: String,

    /// Column letters the flag text is expected in.
    #[serde(rename = "columnCell")]
    pub column_cell: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// The JSON map key; injected on load, never serialized inline.
    #[serde(skip)]
    pub id: String,

    /// Registry key of the record type this extractor produces.
    #[serde(rename = "targetClass")]
    pub target_class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub order: i32,

    #[serde(rename = "resultType")]
    pub result_type: ResultType,

    /// Rows per record for GROUP_LIST.
    #[serde(
        rename = "groupRowCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub group_row_count: Option<i64>,

    #[serde(rename = "startRow", default, skip_serializing_if = "Bound::is_absent")]
    pub start_row: Bound,

    #[serde(
        rename = "startColumn",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_column: Option<String>,

    #[serde(rename = "endRow", default, skip_serializing_if = "Bound::is_absent")]
    pub end_row: Bound,

    #[serde(rename = "isDynamic", default, skip_serializing_if = "Option::is_none")]
    pub is_dynamic: Option<bool>,

    /// Whether this extractor's row window is fixed by flag rows.
    #[serde(
        rename = "isDynamicRows",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_dynamic_rows: Option<bool>,

    #[serde(rename = "startFlag", default, skip_serializing_if = "Option::is_none")]
    pub start_flag: Option<FlagConfig>,

    #[serde(rename = "endFlag", default, skip_serializing_if = "Option::is_none")]
    pub end_flag: Option<FlagConfig>,

    /// Fixed-position fields (SINGLE), keyed by an arbitrary label.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, FieldConfig>,

    /// Column mappings (LIST, GROUP_LIST, VERTICAL_LIST).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableConfig>,
}

impl ExtractorConfig {
    pub fn is_dynamic_rows(&self) -> bool {
        self.is_dynamic_rows.unwrap_or(false)
    }

    pub fn has_unresolved_bounds(&self) -> bool {
        self.start_row.is_unresolved() || self.end_row.is_unresolved()
    }

    /// Fields in ascending `order`, ties broken by label for determinism.
    pub fn ordered_fields(&self) -> Vec<(&str, &FieldConfig)> {
        let mut fields: Vec<(&str, &FieldConfig)> = self
            .fields
            .iter()
            .map(|(label, field)| (label.as_str(), field))
            .collect();
        fields.sort_by(|a, b| a.1.order.cmp(&b.1.order).then_with(|| a.0.cmp(b.0)));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_extractor() {
        let json = r#"{
            "targetClass": "com.acme.Well",
            "order": 1,
            "resultType": "LIST",
            "startRow": "5",
            "startColumn": "B",
            "endRow": "${header.endRow - 1}",
            "isDynamicRows": true,
            "endFlag": { "text": "合计", "columnCell": "A" },
            "table": { "columns": {} }
        }"#;
        let extractor: ExtractorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(extractor.result_type, ResultType::List);
        assert_eq!(extractor.start_row, Bound::Literal(5));
        assert!(extractor.end_row.is_unresolved());
        assert!(extractor.is_dynamic_rows());
        assert_eq!(extractor.end_flag.as_ref().unwrap().column_cell, "A");
    }

    #[test]
    fn rejects_unknown_result_type() {
        let json = r#"{ "targetClass": "x", "resultType": "PIVOT" }"#;
        assert!(serde_json::from_str::<ExtractorConfig>(json).is_err());
    }

    #[test]
    fn orders_fields_stably() {
        let json = r#"{
            "targetClass": "x",
            "resultType": "SINGLE",
            "fields": {
                "b": { "order": 2, "javaFieldName": "second", "excelCell": "B1" },
                "a": { "order": 1, "javaFieldName": "first", "excelCell": "A1" }
            }
        }"#;
        let extractor: ExtractorConfig = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = extractor
            .ordered_fields()
            .iter()
            .map(|(_, field)| field.field_name.as_str())
            .collect();
        assert_eq!(names, ["first", "second"]);
    }
}
