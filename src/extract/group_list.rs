//! GROUP_LIST strategy: fixed-size row groups become one record each.
use crate::config::{ColumnConfig, ExtractorConfig};
use crate::extract::record::{Record, TargetRegistry};
use crate::extract::{
    classify_end_row, is_blank, required_start_row, set_from_text, EndRow, FieldTarget,
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
    let group_rows = match extractor.group_row_count {
        Some(count) if count > 0 => count as usize,
        _ => {
            result.add_error(ExtractionError::structural(
                "groupRowCount missing or not positive",
                &extractor.id,
            ));
            return None;
        }
    };
    let end_row = match classify_end_row(&extractor.end_row, &extractor.id, result) {
        EndRow::At(row) => row,
        EndRow::Auto => match data.last_row_index() {
            Some(last) => last,
            None => return Some(Vec::new()),
        },
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
    let group_count = (end_row - start_row + 1) / group_rows;

    let mut records = Vec::new();
    for group in 0..group_count {
        let group_start = start_row + group * group_rows;
        if !data.contains_row(group_start) {
            continue;
        }
        let Some(mut record) = registry.create(&extractor.target_class) else {
            return None;
        };
        let mut has_data = false;
        for (_, column) in &columns {
            if fill_column(
                extractor,
                column,
                data,
                group_start,
                group_rows,
                &mut record,
                result,
            ) {
                has_data = true;
            }
        }
        if has_data {
            records.push(record);
        }
    }
    Some(records)
}

/// Reads one column of one group; returns whether a value was set.
fn fill_column(
    extractor: &ExtractorConfig,
    column: &ColumnConfig,
    data: &SheetData,
    group_start: usize,
    group_rows: usize,
    record: &mut Box<dyn Record>,
    result: &mut SheetResult,
) -> bool {
    let Some(letters) = column.column_cell.as_deref() else {
        result.add_error(ExtractionError::structural(
            format!("column for field '{}' has no columnCell", column.field_name),
            &extractor.id,
        ));
        return false;
    };
    let col = match col_to_index(letters) {
        Ok(col) => col,
        Err(error) => {
            result.add_error(ExtractionError::structural(
                error.to_string(),
                &extractor.id,
            ));
            return false;
        }
    };

    let row_in_group = column.group_row_index.unwrap_or(1).max(1) as usize;
    let row = group_start + row_in_group - 1;
    let mut raw = data.cell(row, col).map(str::to_owned);

    // Three-row groups often carry a sub-header that shifts values by one
    // row; probe the neighbour row inside the group before giving up.
    if is_blank(raw.as_deref()) && group_rows == 3 {
        if row_in_group == 1 {
            raw = data.cell(row + 1, col).map(str::to_owned);
        } else if row_in_group == 3 {
            raw = data.cell(row - 1, col).map(str::to_owned);
        }
    }

    if is_blank(raw.as_deref()) && column.is_merge() {
        for offset in 0..group_rows {
            let candidate = data.cell(group_start + offset, col);
            if !is_blank(candidate) {
                raw = candidate.map(str::to_owned);
                break;
            }
        }
    }

    let Some(raw) = raw else {
        return false;
    };
    if raw.trim().is_empty() {
        return false;
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
    set_from_text(record, &target, raw.trim(), None, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingConfig;
    use crate::extract::record::{FieldSink, FieldSinkError, Value};

    #[derive(Default, Debug)]
    struct Test {
        name: Option<String>,
        pressure: Option<f64>,
        remark: Option<String>,
    }

    impl FieldSink for Test {
        fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError> {
            match name {
                "name" => self.name = value.as_text().map(str::to_owned),
                "pressure" => self.pressure = value.as_f64(),
                "remark" => self.remark = value.as_text().map(str::to_owned),
                other => return Err(FieldSinkError::UnknownField(other.to_owned())),
            }
            Ok(())
        }
    }

    fn registry() -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        registry.register::<Test>("Test");
        registry
    }

    const GROUPS: &str = r#"{
        "tests": {
            "targetClass": "Test",
            "resultType": "GROUP_LIST",
            "startRow": "1",
            "endRow": "9",
            "groupRowCount": 3,
            "table": {
                "columns": {
                    "name": {
                        "order": 1,
                        "javaFieldName": "name",
                        "javaFieldType": "String",
                        "columnCell": "A",
                        "groupRowIndex": 1
                    },
                    "pressure": {
                        "order": 2,
                        "javaFieldName": "pressure",
                        "javaFieldType": "Double",
                        "columnCell": "B",
                        "groupRowIndex": 2
                    },
                    "remark": {
                        "order": 3,
                        "javaFieldName": "remark",
                        "javaFieldType": "String",
                        "columnCell": "C",
                        "groupRowIndex": 3
                    }
                }
            }
        }
    }"#;

    #[test]
    fn partitions_rows_into_groups() {
        let mut data = SheetData::new();
        // Group 1: rows 0..2.
        data.set_cell(0, 0, "T1");
        data.set_cell(1, 1, "12.5");
        data.set_cell(2, 2, "ok");
        // Group 2: rows 3..5.
        data.set_cell(3, 0, "T2");
        data.set_cell(4, 1, "14");
        // Group 3: rows 6..8 left empty entirely.
        let config = MappingConfig::from_json_str(GROUPS).unwrap();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        let records = extract(config.get("tests").unwrap(), &data, &registry, &mut result)
            .expect("records");
        assert_eq!(records.len(), 2);
        let first = records[0].as_any().downcast_ref::<Test>().unwrap();
        assert_eq!(first.name.as_deref(), Some("T1"));
        assert_eq!(first.pressure, Some(12.5));
        assert_eq!(first.remark.as_deref(), Some("ok"));
        let second = records[1].as_any().downcast_ref::<Test>().unwrap();
        assert_eq!(second.name.as_deref(), Some("T2"));
        assert_eq!(second.remark, None);
    }

    #[test]
    fn three_row_groups_probe_neighbour_rows() {
        let mut data = SheetData::new();
        // Name sits one row below its slot (sub-header pushed it down);
        // remark sits one row above its slot.
        data.set_cell(0, 4, "sub-header");
        data.set_cell(1, 0, "T1");
        data.set_cell(1, 2, "shifted remark");
        data.set_cell(1, 1, "9.5");
        let config = MappingConfig::from_json_str(GROUPS).unwrap();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        let records = extract(config.get("tests").unwrap(), &data, &registry, &mut result)
            .expect("records");
        assert_eq!(records.len(), 1);
        let test = records[0].as_any().downcast_ref::<Test>().unwrap();
        assert_eq!(test.name.as_deref(), Some("T1"));
        assert_eq!(test.remark.as_deref(), Some("shifted remark"));
        assert_eq!(test.pressure, Some(9.5));
    }

    #[test]
    fn missing_group_row_count_is_structural() {
        let json = r#"{
            "tests": {
                "targetClass": "Test",
                "resultType": "GROUP_LIST",
                "startRow": "1",
                "table": { "columns": {} }
            }
        }"#;
        let config = MappingConfig::from_json_str(json).unwrap();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        assert!(
            extract(config.get("tests").unwrap(), &SheetData::new(), &registry, &mut result)
                .is_none()
        );
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].message.contains("groupRowCount"));
    }

    #[test]
    fn merge_columns_search_within_the_group() {
        let json = r#"{
            "tests": {
                "targetClass": "Test",
                "resultType": "GROUP_LIST",
                "startRow": "1",
                "endRow": "4",
                "groupRowCount": 2,
                "table": {
                    "columns": {
                        "name": {
                            "javaFieldName": "name",
                            "javaFieldType": "String",
                            "columnCell": "A",
                            "groupRowIndex": 1,
                            "isMergeType": true
                        }
                    }
                }
            }
        }"#;
        let mut data = SheetData::new();
        // Value lands on the second row of the first group.
        data.set_cell(0, 1, "anchor row exists");
        data.set_cell(1, 0, "T-merged");
        let config = MappingConfig::from_json_str(json).unwrap();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        let records = extract(config.get("tests").unwrap(), &data, &registry, &mut result)
            .expect("records");
        assert_eq!(records.len(), 1);
        let test = records[0].as_any().downcast_ref::<Test>().unwrap();
        assert_eq!(test.name.as_deref(), Some("T-merged"));
    }
}
