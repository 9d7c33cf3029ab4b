//! Configuration for plain column-series extraction: named numeric columns
//! read top to bottom without any record mapping.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ColumnSeriesConfig {
    #[serde(default)]
    pub columns: Vec<ColumnSeriesEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnSeriesEntry {
    #[serde(default)]
    pub order: i32,

    #[serde(rename = "excelFieldName")]
    pub field_name: String,

    /// Column letters to read.
    #[serde(rename = "columnCell")]
    pub column_cell: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ColumnSeriesConfig {
    /// Entries in ascending `order`, ties broken by field name.
    pub fn ordered_entries(&self) -> Vec<&ColumnSeriesEntry> {
        let mut entries: Vec<&ColumnSeriesEntry> = self.columns.iter().collect();
        entries.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.field_name.cmp(&b.field_name))
        });
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_and_orders() {
        let json = r#"{
            "columns": [
                { "order": 2, "excelFieldName": "pressure", "columnCell": "C", "unit": "MPa" },
                { "order": 1, "excelFieldName": "depth", "columnCell": "B" }
            ]
        }"#;
        let config: ColumnSeriesConfig = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = config
            .ordered_entries()
            .iter()
            .map(|entry| entry.field_name.as_str())
            .collect();
        assert_eq!(names, ["depth", "pressure"]);
    }
}
