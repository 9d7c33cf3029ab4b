//! VERTICAL_LIST strategy: a transposed table where each data column
//! becomes one record and each configured field names its own row.
use crate::config::{ColumnConfig, ExtractorConfig};
use crate::extract::record::{Record, TargetRegistry};
use crate::extract::{
    classify_end_row, find_last_data_column, find_last_data_row, is_blank, set_from_text, EndRow,
    FieldTarget,
};
use crate::result::{ExtractionError, SheetResult};
use crate::sheet::reference::{col_to_index, index_to_col};
use crate::sheet::SheetData;

pub(crate) fn extract(
    extractor: &ExtractorConfig,
    data: &SheetData,
    registry: &TargetRegistry,
    result: &mut SheetResult,
) -> Option<Vec<Box<dyn Record>>> {
    let start_row = match &extractor.start_row {
        crate::config::Bound::Unresolved(text) => {
            result.add_error(ExtractionError::structural(
                format!("start row '{text}' never resolved"),
                &extractor.id,
            ));
            return None;
        }
        bound => bound.row_index().unwrap_or(0),
    };
    let start_col = match &extractor.start_column {
        Some(letters) => match col_to_index(letters) {
            Ok(col) => col,
            Err(error) => {
                result.add_error(ExtractionError::structural(
                    error.to_string(),
                    &extractor.id,
                ));
                return None;
            }
        },
        None => 0,
    };
    let end_row = match classify_end_row(&extractor.end_row, &extractor.id, result) {
        EndRow::At(row) => row,
        EndRow::Auto => find_last_data_row(data, start_row, start_col),
        EndRow::Empty => return Some(Vec::new()),
        EndRow::Unresolved => return None,
    };
    if end_row < start_row {
        return Some(Vec::new());
    }

    let Some(table) = extractor.table.as_ref() else {
        return Some(Vec::new());
    };
    let columns = table.ordered_columns();
    let end_col = find_last_data_column(data, start_row, start_col, end_row);

    let mut records = Vec::new();
    for col in start_col..=end_col {
        let populated = (start_row..=end_row).any(|row| !is_blank(data.cell(row, col)));
        if !populated {
            continue;
        }
        let Some(mut record) = registry.create(&extractor.target_class) else {
            return None;
        };
        let mut has_data = false;
        for (_, column) in &columns {
            if fill_field(extractor, column, data, col, &mut record, result) {
                has_data = true;
            }
        }
        if has_data {
            records.push(record);
        }
    }
    Some(records)
}

/// Reads one configured field of one data column; returns whether a value
/// was set.
fn fill_field(
    extractor: &ExtractorConfig,
    column: &ColumnConfig,
    data: &SheetData,
    col: usize,
    record: &mut Box<dyn Record>,
    result: &mut SheetResult,
) -> bool {
    let Some(row_cell) = column.row_cell.as_deref() else {
        result.add_error(ExtractionError::structural(
            format!("column for field '{}' has no rowCell", column.field_name),
            &extractor.id,
        ));
        return false;
    };
    let row = match row_cell.trim().parse::<usize>() {
        Ok(number) if number >= 1 => number - 1,
        _ => {
            result.add_error(ExtractionError::structural(
                format!(
                    "rowCell '{row_cell}' of field '{}' is not a positive row number",
                    column.field_name
                ),
                &extractor.id,
            ));
            return false;
        }
    };

    let Some(raw) = data.cell(row, col) else {
        return false;
    };
    if raw.trim().is_empty() {
        return false;
    }

    let letters = index_to_col(col);
    let target = FieldTarget {
        extractor_id: &extractor.id,
        field_name: &column.field_name,
        field_type: column.field_type,
        pattern: column.extract_pattern.as_deref(),
        date_format: None,
        row: row + 1,
        column: &letters,
    };
    let raw = raw.trim().to_owned();
    set_from_text(record, &target, &raw, None, result)
}
