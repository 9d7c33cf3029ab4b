//! SINGLE strategy: one record assembled from fixed cell positions.
use crate::config::ExtractorConfig;
use crate::extract::record::{Record, TargetRegistry};
use crate::extract::{set_from_text, FieldTarget};
use crate::result::{ExtractionError, SheetResult};
use crate::sheet::reference::parse_cell_ref;
use crate::sheet::SheetData;

/// Reads every configured field from its cell. Field problems are recorded
/// and skipped; the record itself is always produced.
pub(crate) fn extract(
    extractor: &ExtractorConfig,
    data: &SheetData,
    registry: &TargetRegistry,
    result: &mut SheetResult,
) -> Option<Box<dyn Record>> {
    let mut record = registry.create(&extractor.target_class)?;
    for (label, field) in extractor.ordered_fields() {
        let position = match parse_cell_ref(&field.cell) {
            Ok(position) => position,
            Err(error) => {
                result.add_error(ExtractionError::structural(
                    format!("field '{label}': {error}"),
                    &extractor.id,
                ));
                continue;
            }
        };
        let raw = data.cell(position.row, position.col).unwrap_or("");
        let target = FieldTarget {
            extractor_id: &extractor.id,
            field_name: &field.field_name,
            field_type: field.field_type,
            pattern: field.extract_pattern.as_deref(),
            date_format: field.extract_pattern.as_deref(),
            row: position.row + 1,
            column: label,
        };
        set_from_text(
            &mut record,
            &target,
            raw,
            field.default_value.as_deref(),
            result,
        );
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingConfig;
    use crate::extract::record::{FieldSink, FieldSinkError, Value};

    #[derive(Default, Debug)]
    struct Summary {
        well_name: Option<String>,
        depth: Option<f64>,
        spud_date: Option<chrono::NaiveDate>,
    }

    impl FieldSink for Summary {
        fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError> {
            match name {
                "wellName" => self.well_name = value.as_text().map(str::to_owned),
                "depth" => self.depth = value.as_f64(),
                "spudDate" => self.spud_date = value.as_date(),
                other => return Err(FieldSinkError::UnknownField(other.to_owned())),
            }
            Ok(())
        }
    }

    fn config() -> MappingConfig {
        MappingConfig::from_json_str(
            r#"{
                "summary": {
                    "targetClass": "Summary",
                    "resultType": "SINGLE",
                    "fields": {
                        "name": {
                            "order": 1,
                            "javaFieldName": "wellName",
                            "javaFieldType": "String",
                            "excelCell": "B2"
                        },
                        "depth": {
                            "order": 2,
                            "javaFieldName": "depth",
                            "javaFieldType": "Double",
                            "excelCell": "B3",
                            "defaultValue": "0"
                        },
                        "spud": {
                            "order": 3,
                            "javaFieldName": "spudDate",
                            "javaFieldType": "Date",
                            "excelCell": "B4"
                        }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    fn registry() -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        registry.register::<Summary>("Summary");
        registry
    }

    #[test]
    fn reads_fixed_cells() {
        let mut data = SheetData::new();
        data.set_cell(1, 1, "XJ-17");
        data.set_cell(2, 1, "1，234.5");
        data.set_cell(3, 1, "2024-3-5");
        let config = config();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        let record = extract(config.get("summary").unwrap(), &data, &registry, &mut result)
            .expect("record");
        let summary = record.as_any().downcast_ref::<Summary>().unwrap();
        assert_eq!(summary.well_name.as_deref(), Some("XJ-17"));
        assert_eq!(summary.depth, Some(1234.5));
        assert_eq!(
            summary.spud_date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(result.errors().is_empty());
    }

    #[test]
    fn blank_cell_falls_back_to_default() {
        let mut data = SheetData::new();
        data.set_cell(1, 1, "XJ-17");
        let config = config();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        let record = extract(config.get("summary").unwrap(), &data, &registry, &mut result)
            .expect("record");
        let summary = record.as_any().downcast_ref::<Summary>().unwrap();
        assert_eq!(summary.depth, Some(0.0));
        assert_eq!(summary.spud_date, None);
        assert!(result.errors().is_empty());
    }

    #[test]
    fn bad_values_are_recorded_but_do_not_abort() {
        let mut data = SheetData::new();
        data.set_cell(1, 1, "XJ-17");
        data.set_cell(3, 1, "2024-13-99");
        let config = config();
        let registry = registry();
        let mut result = SheetResult::new(Some(0), "Sheet1");

        let record = extract(config.get("summary").unwrap(), &data, &registry, &mut result)
            .expect("record");
        let summary = record.as_any().downcast_ref::<Summary>().unwrap();
        assert_eq!(summary.well_name.as_deref(), Some("XJ-17"));
        assert_eq!(summary.spud_date, None);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].row, Some(4));
        assert!(result.success());
    }
}
