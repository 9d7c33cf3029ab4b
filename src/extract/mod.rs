//! The extraction engine: strategy dispatch plus the scans and value
//! plumbing every strategy shares.
pub mod columns;
pub mod convert;
pub mod record;

mod group_list;
mod list;
mod single;
mod vertical_list;

use std::collections::HashSet;

use log::{debug, info};
use regex::Regex;

use crate::config::{Bound, FieldType, MappingConfig, ResultType};
use crate::extract::record::{Record, TargetRegistry};
use crate::result::{ExtractionError, SheetResult};
use crate::sheet::SheetData;

/// Runs every extractor of the (fully resolved) config against the buffered
/// sheet, in ascending `order`. Extractors whose target class has no
/// registry binding are skipped; registered targets with no extractor at
/// all become structural errors.
pub fn run_extractors(
    config: &MappingConfig,
    data: &SheetData,
    registry: &TargetRegistry,
    result: &mut SheetResult,
) {
    for extractor in config.extractors() {
        if !registry.contains(&extractor.target_class) {
            debug!(
                "skipping extractor '{}': no binding for target '{}'",
                extractor.id, extractor.target_class
            );
            continue;
        }
        match extractor.result_type {
            ResultType::Single => {
                if let Some(record) = single::extract(extractor, data, registry, result) {
                    result.insert_single(&extractor.target_class, record);
                    info!("extractor '{}' produced one record", extractor.id);
                }
            }
            ResultType::List => {
                if let Some(records) = list::extract(extractor, data, registry, result) {
                    info!(
                        "extractor '{}' produced {} records",
                        extractor.id,
                        records.len()
                    );
                    result.insert_list(&extractor.target_class, records);
                }
            }
            ResultType::GroupList => {
                if let Some(records) = group_list::extract(extractor, data, registry, result) {
                    info!(
                        "extractor '{}' produced {} grouped records",
                        extractor.id,
                        records.len()
                    );
                    result.insert_list(&extractor.target_class, records);
                }
            }
            ResultType::VerticalList => {
                if let Some(records) = vertical_list::extract(extractor, data, registry, result) {
                    info!(
                        "extractor '{}' produced {} column records",
                        extractor.id,
                        records.len()
                    );
                    result.insert_list(&extractor.target_class, records);
                }
            }
        }
    }

    let configured: HashSet<&str> = config
        .extractors()
        .iter()
        .map(|extractor| extractor.target_class.as_str())
        .collect();
    for target in registry.targets() {
        if !configured.contains(target) {
            result.add_error(ExtractionError::structural(
                "no extractor configured for target class",
                target,
            ));
        }
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}

/// Resolves a start bound that the strategy requires; records a structural
/// error and returns `None` when it is missing or still an expression.
pub(crate) fn required_start_row(
    bound: &Bound,
    extractor_id: &str,
    result: &mut SheetResult,
) -> Option<usize> {
    match bound {
        Bound::Literal(_) => match bound.row_index() {
            Some(row) => Some(row),
            None => {
                result.add_error(ExtractionError::structural(
                    "start row is not a positive row number",
                    extractor_id,
                ));
                None
            }
        },
        Bound::Unresolved(text) => {
            result.add_error(ExtractionError::structural(
                format!("start row '{text}' never resolved"),
                extractor_id,
            ));
            None
        }
        Bound::Absent => {
            result.add_error(ExtractionError::structural(
                "start row missing",
                extractor_id,
            ));
            None
        }
    }
}

/// The end of a table window: a resolved row, the end of the sheet when the
/// bound is absent, or an empty window when the resolved row precedes the
/// start.
pub(crate) enum EndRow {
    At(usize),
    Auto,
    Empty,
    Unresolved,
}

pub(crate) fn classify_end_row(
    bound: &Bound,
    extractor_id: &str,
    result: &mut SheetResult,
) -> EndRow {
    match bound {
        Bound::Literal(value) if *value >= 1 => EndRow::At(*value as usize - 1),
        Bound::Literal(_) => EndRow::Empty,
        Bound::Absent => EndRow::Auto,
        Bound::Unresolved(text) => {
            result.add_error(ExtractionError::structural(
                format!("end row '{text}' never resolved"),
                extractor_id,
            ));
            EndRow::Unresolved
        }
    }
}

/// Walks down from `start_row` and returns the last row holding data at or
/// right of `start_col`. Three consecutive rows without data end the table.
pub(crate) fn find_last_data_row(data: &SheetData, start_row: usize, start_col: usize) -> usize {
    let mut last_row = start_row;
    let mut row = start_row;
    loop {
        match data.row(row) {
            None => {
                if row > start_row + 3 {
                    break;
                }
            }
            Some(cells) => {
                let has_data = cells
                    .iter()
                    .any(|(col, text)| *col >= start_col && !text.trim().is_empty());
                if has_data {
                    last_row = row;
                } else if row > last_row + 3 {
                    break;
                }
            }
        }
        row += 1;
    }
    last_row
}

/// The rightmost populated column within the row window, at or right of
/// `start_col`.
pub(crate) fn find_last_data_column(
    data: &SheetData,
    start_row: usize,
    start_col: usize,
    end_row: usize,
) -> usize {
    let mut last_col = start_col;
    for row in start_row..=end_row {
        if let Some(cells) = data.row(row) {
            let rightmost = cells
                .iter()
                .filter(|(col, text)| **col >= start_col && !text.trim().is_empty())
                .map(|(col, _)| *col)
                .max();
            if let Some(col) = rightmost {
                last_col = last_col.max(col);
            }
        }
    }
    last_col
}

/// Where an extracted value lands and how errors about it are labelled.
pub(crate) struct FieldTarget<'a> {
    pub extractor_id: &'a str,
    pub field_name: &'a str,
    pub field_type: FieldType,
    pub pattern: Option<&'a str>,
    /// Explicit date format, tried before the common pattern ladder.
    pub date_format: Option<&'a str>,
    /// One-based row for error reporting.
    pub row: usize,
    /// Column letters or field label for error reporting.
    pub column: &'a str,
}

/// Applies the extraction pattern, coerces and hands the value to the
/// record. Returns whether a value was actually set. Every failure is
/// recorded against the target's position; none aborts the caller.
pub(crate) fn set_from_text(
    record: &mut Box<dyn Record>,
    target: &FieldTarget<'_>,
    raw: &str,
    default_value: Option<&str>,
    result: &mut SheetResult,
) -> bool {
    let refined = match target.pattern {
        Some(pattern) => match apply_pattern(raw, pattern) {
            Ok(Some(extracted)) => extracted,
            Ok(None) => raw.to_owned(),
            Err(error) => {
                result.add_error(ExtractionError::at(
                    format!("bad extract pattern '{pattern}': {error}"),
                    target.extractor_id,
                    target.row,
                    target.column,
                ));
                raw.to_owned()
            }
        },
        None => raw.to_owned(),
    };

    let converted = match convert::convert_value(&refined, target.field_type, target.date_format) {
        Ok(converted) => converted,
        Err(error) => {
            result.add_error(ExtractionError::at(
                error.to_string(),
                target.extractor_id,
                target.row,
                target.column,
            ));
            return false;
        }
    };

    let value = match converted {
        Some(value) => Some(value),
        None => match default_value {
            Some(default) => {
                match convert::convert_value(default, target.field_type, target.date_format) {
                    Ok(value) => value,
                    Err(error) => {
                        result.add_error(ExtractionError::at(
                            format!("bad default value: {error}"),
                            target.extractor_id,
                            target.row,
                            target.column,
                        ));
                        None
                    }
                }
            }
            None => None,
        },
    };

    let Some(value) = value else {
        return false;
    };
    match record.set_field(target.field_name, value) {
        Ok(()) => true,
        Err(error) => {
            result.add_error(ExtractionError::at(
                error.to_string(),
                target.extractor_id,
                target.row,
                target.column,
            ));
            false
        }
    }
}

/// Runs a regex over the raw text: capture group 1 when the pattern has
/// one, otherwise the whole match. `Ok(None)` means the pattern did not
/// match and the raw text stands.
pub(crate) fn apply_pattern(raw: &str, pattern: &str) -> Result<Option<String>, regex::Error> {
    if pattern.is_empty() {
        return Ok(None);
    }
    let regex = Regex::new(pattern)?;
    match regex.captures(raw) {
        Some(captures) => {
            if regex.captures_len() > 1 {
                Ok(Some(
                    captures
                        .get(1)
                        .map(|group| group.as_str().to_owned())
                        .unwrap_or_default(),
                ))
            } else {
                Ok(Some(captures[0].to_owned()))
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_prefers_group_one() {
        assert_eq!(
            apply_pattern("井深 1520 m", r"(\d+)").unwrap().as_deref(),
            Some("1520")
        );
        assert_eq!(
            apply_pattern("abc-42", r"\d+").unwrap().as_deref(),
            Some("42")
        );
        assert_eq!(apply_pattern("no digits", r"(\d+)").unwrap(), None);
        assert!(apply_pattern("x", r"(unclosed").is_err());
    }

    #[test]
    fn last_data_row_stops_after_three_empty_rows() {
        let mut data = SheetData::new();
        for row in 4..=9 {
            data.set_cell(row, 0, "x");
        }
        data.set_cell(13, 0, "straggler after the gap");
        assert_eq!(find_last_data_row(&data, 4, 0), 9);
    }

    #[test]
    fn last_data_row_tolerates_small_gaps() {
        let mut data = SheetData::new();
        data.set_cell(4, 0, "x");
        data.set_cell(6, 0, "x");
        data.set_cell(8, 0, "x");
        assert_eq!(find_last_data_row(&data, 4, 0), 8);
    }

    #[test]
    fn last_data_row_ignores_columns_left_of_start() {
        let mut data = SheetData::new();
        data.set_cell(4, 2, "x");
        data.set_cell(5, 0, "left of the table");
        assert_eq!(find_last_data_row(&data, 4, 2), 4);
    }

    #[test]
    fn last_data_column_scans_the_window() {
        let mut data = SheetData::new();
        data.set_cell(2, 1, "a");
        data.set_cell(3, 4, "b");
        data.set_cell(9, 7, "outside the window");
        assert_eq!(find_last_data_column(&data, 2, 1, 4), 4);
    }
}
