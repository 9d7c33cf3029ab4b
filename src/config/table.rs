//! The table section of a list-shaped extractor: its mapped columns.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::column::ColumnConfig;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(
        rename = "startColumn",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_column: Option<String>,

    /// Column mappings keyed by an arbitrary configuration label.
    #[serde(default)]
    pub columns: HashMap<String, ColumnConfig>,
}

impl TableConfig {
    /// Columns in ascending `order`, ties broken by label for determinism.
    pub fn ordered_columns(&self) -> Vec<(&str, &ColumnConfig)> {
        let mut columns: Vec<(&str, &ColumnConfig)> = self
            .columns
            .iter()
            .map(|(label, column)| (label.as_str(), column))
            .collect();
        columns.sort_by(|a, b| a.1.order.cmp(&b.1.order).then_with(|| a.0.cmp(b.0)));
        columns
    }
}
