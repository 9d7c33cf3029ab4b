//! LIST strategy: one record per data row between the resolved row bounds.
use log::debug;

use crate::config::{ColumnConfig, ExtractorConfig};
use crate::extract::record::{Record, TargetRegistry};
use crate::extract::{
    classify_end_row, find_last_data_row, is_blank, required_start_row, set_from_text, EndRow,
    FieldTarget,
};
use crate::result::{ExtractionError, SheetResult};
use crate::sheet::reference::col_to_index;
use crate::sheet::SheetData;

pub(crate) fn extract(
    extractor: &ExtractorConfig,
    data: &SheetData,
    registry: &TargetRegistry,
    result: &mut SheetResult,
) -> Option<Vec<Box<dyn Record>>> {
    let start_row = required_start_row(&extractor.start_row, &extractor.id, result)?;
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

    let Some(table) = extractor.table.as_ref() else {
        return Some(Vec::new());
    };
    let columns = table.ordered_columns();

    let mut records = Vec::new();
    for row in start_row..=end_row {
        if !data.contains_row(row) {
            continue;
        }
        let Some(mut record) = registry.create(&extractor.target_class) else {
            return None;
        };
        let mut success_fills = 0usize;
        let mut fallback_fills = 0usize;
        for (_, column) in &columns {
            fill_column(
                extractor,
                column,
                data,
                row,
                start_row,
                &mut record,
                &mut success_fills,
                &mut fallback_fills,
                result,
            );
        }
        // A row whose values all came from merge or alternative-column
        // fallbacks is layout residue, not a data row.
        if fallback_fills < success_fills {
            records.push(record);
        } else {
            debug!(
                "extractor '{}': dropping row {} ({success_fills} filled, {fallback_fills} fallback)",
                extractor.id,
                row + 1
            );
        }
    }
    Some(records)
}

#[allow(clippy::too_many_arguments)]
fn fill_column(
    extractor: &ExtractorConfig,
    column: &ColumnConfig,
    data: &SheetData,
    row: usize,
    start_row: usize,
    record: &mut Box<dyn Record>,
    success_fills: &mut usize,
    fallback_fills: &mut usize,
    result: &mut SheetResult,
) {
    let Some(letters) = column.column_cell.as_deref() else {
        result.add_error(ExtractionError::structural(
            format!("column for field '{}' has no columnCell", column.field_name),
            &extractor.id,
        ));
        return;
    };
    let col = match col_to_index(letters) {
        Ok(col) => col,
        Err(error) => {
            result.add_error(ExtractionError::structural(
                error.to_string(),
                &extractor.id,
            ));
            return;
        }
    };

    let mut raw = data.cell(row, col).map(str::to_owned);
    let mut from_fallback = false;

    // Merged ranges leave only their anchor cell populated; walk upward
    // within the table to recover the anchor value.
    if is_blank(raw.as_deref()) && column.is_merge() && row > start_row {
        for above in (start_row..row).rev() {
            let candidate = data.cell(above, col);
            if !is_blank(candidate) {
                raw = candidate.map(str::to_owned);
                from_fallback = true;
                break;
            }
        }
    }

    if is_blank(raw.as_deref()) && column.uses_fixed_alternatives() {
        for alternative in &column.alternative_column_cell {
            let Ok(alt_col) = col_to_index(alternative) else {
                continue;
            };
            let candidate = data.cell(row, alt_col);
            if !is_blank(candidate) {
                raw = candidate.map(str::to_owned);
                from_fallback = true;
                break;
            }
        }
    }

    let Some(raw) = raw else {
        return;
    };
    if raw.trim().is_empty() {
        return;
    }
    if from_fallback {
        *fallback_fills += 1;
    }

    let target = FieldTarget {
        extractor_id: &extractor.id,
        field_name: &column.field_name,
        field_type: column.field_type,
        pattern: column.extract_pattern.as_deref(),
        date_format: None,
        row: row + 1,
        column: letters,
    };
    if set_from_text(record, &target, raw.trim(), None, result) {
        *success_fills += 1;
    }
}
