//! Plain column-series extraction: named numeric columns read top to
//! bottom, without any record mapping in between.
use log::warn;

use crate::config::{ColumnSeriesConfig, ColumnSeriesEntry};
use crate::sheet::reference::{col_to_index, ReferenceError};
use crate::sheet::SheetData;

/// One extracted column: its configured name and unit plus a value per
/// buffered row, in row order. Cells that do not parse as numbers are
/// `None`, keeping every series aligned with the sheet's rows.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSeries {
    pub field_name: String,
    pub unit: Option<String>,
    pub values: Vec<Option<f64>>,
}

/// Reads every configured column over the buffered rows, in ascending
/// `order`.
pub fn extract_column_series(
    data: &SheetData,
    config: &ColumnSeriesConfig,
) -> Result<Vec<ColumnSeries>, ReferenceError> {
    let mut series = Vec::new();
    for entry in config.ordered_entries() {
        series.push(extract_one(data, entry)?);
    }
    Ok(series)
}

fn extract_one(data: &SheetData, entry: &ColumnSeriesEntry) -> Result<ColumnSeries, ReferenceError> {
    let col = col_to_index(&entry.column_cell)?;
    let mut values = Vec::with_capacity(data.len());
    for (row, cells) in data.iter() {
        let value = cells.get(&col).and_then(|text| {
            let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '，').collect();
            let trimmed = cleaned.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(number) => Some(number),
                Err(_) => {
                    warn!(
                        "column '{}' row {}: '{text}' is not numeric",
                        entry.column_cell,
                        row + 1
                    );
                    None
                }
            }
        });
        values.push(value);
    }
    Ok(ColumnSeries {
        field_name: entry.field_name.clone(),
        unit: entry.unit.clone(),
        values,
    })
}
