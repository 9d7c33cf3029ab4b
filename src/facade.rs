//! The public entry point: opens a workbook, drives the per-sheet pipeline
//! (collect rows, resolve positions, run extractors) and aggregates
//! results.
use std::path::Path;

use log::{error, info};

use crate::config::{Bound, ColumnSeriesConfig, MappingConfig};
use crate::error::SheetShiftError;
use crate::extract::columns::{extract_column_series, ColumnSeries};
use crate::extract::record::TargetRegistry;
use crate::extract::run_extractors;
use crate::resolver::FlagKind;
use crate::result::{BatchResult, ExtractionError, SheetResult};
use crate::sheet::source::{SourceError, Spreadsheet};
use crate::sheet::{RowCells, RowCollector, RowFilter, SheetData};

/// Runs the per-sheet pipeline over already-decoded rows: collect and scan,
/// resolve positions, run every extractor. This is exactly the path
/// `SheetExtractor::extract_sheet_by_index` takes after decoding; exposed
/// for feeding rows from other sources.
pub fn extract_rows<I>(
    config: &MappingConfig,
    registry: &TargetRegistry,
    rows: I,
    filter: Option<RowFilter>,
    sheet_index: Option<usize>,
    sheet_name: &str,
) -> SheetResult
where
    I: IntoIterator<Item = (usize, RowCells)>,
{
    let mut result = SheetResult::new(sheet_index, sheet_name);
    let mut config = config.clone();
    let mut collector = RowCollector::new(&config, filter);
    for (row_index, cells) in rows {
        collector.push_row(row_index, cells);
    }
    let (data, mut resolver) = collector.finish();
    if data.is_empty() {
        result.mark_failed();
        result.add_error(ExtractionError::sheet_level("sheet has no rows"));
        return result;
    }

    // Extractors whose flag rows never appeared cannot be positioned;
    // poison the affected bound so the solver and the engine both see the
    // failure.
    for (extractor_id, kind) in resolver.unmatched_flags() {
        result.add_error(ExtractionError::structural(
            format!("{} flag never matched", kind.as_str()),
            &extractor_id,
        ));
        if let Some(extractor) = config.get_mut(&extractor_id) {
            let marker = Bound::Unresolved(format!(
                "{} flag of '{}' never matched",
                kind.as_str(),
                extractor_id
            ));
            match kind {
                FlagKind::Start => extractor.start_row = marker,
                FlagKind::End => extractor.end_row = marker,
            }
        }
    }

    if let Err(resolve_error) = resolver.resolve(&mut config) {
        error!("sheet '{sheet_name}': {resolve_error}");
        result.mark_failed();
        result.add_error(ExtractionError::sheet_level(resolve_error.to_string()));
        // Extractors whose bounds did resolve still run below.
    }

    run_extractors(&config, &data, registry, &mut result);
    result
}

/// Extracts typed records from one workbook according to a mapping
/// configuration. The configuration is deep-cloned for every sheet pass,
/// so resolved positions never leak between sheets.
pub struct SheetExtractor {
    spreadsheet: Spreadsheet,
    config: MappingConfig,
    registry: TargetRegistry,
    sheet_names: Vec<String>,
    row_filter: Option<RowFilter>,
}

impl SheetExtractor {
    /// Opens a workbook; unsupported or unreadable files fail here, not
    /// during extraction.
    pub fn open<P: AsRef<Path>>(
        path: P,
        config: MappingConfig,
        registry: TargetRegistry,
    ) -> Result<Self, SheetShiftError> {
        let spreadsheet = Spreadsheet::open(path)?;
        let sheet_names = spreadsheet.sheet_names();
        Ok(SheetExtractor {
            spreadsheet,
            config,
            registry,
            sheet_names,
            row_filter: None,
        })
    }

    /// Restricts every pass to a one-based row window.
    pub fn with_row_filter(mut self, filter: RowFilter) -> Self {
        self.row_filter = Some(filter);
        self
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    /// First sheet whose name contains the given text.
    pub fn find_sheet_index_by_name(&self, name: &str) -> Option<usize> {
        self.sheet_names
            .iter()
            .position(|sheet| sheet.contains(name))
    }

    /// Runs the full pipeline over one sheet. Problems are reported inside
    /// the returned result; this never fails outward.
    pub fn extract_sheet_by_index(&mut self, index: usize) -> SheetResult {
        let Some(sheet_name) = self.sheet_names.get(index).cloned() else {
            let mut result = SheetResult::new(None, format!("#{index}"));
            result.mark_failed();
            result.add_error(ExtractionError::sheet_level(format!(
                "sheet index {index} out of range"
            )));
            return result;
        };
        let rows = match self.spreadsheet.read_rows(&sheet_name) {
            Ok(rows) => rows,
            Err(source_error) => {
                error!("failed to read sheet '{sheet_name}': {source_error}");
                let mut result = SheetResult::new(Some(index), sheet_name);
                result.mark_failed();
                result.add_error(ExtractionError::sheet_level(format!(
                    "failed to read sheet rows: {source_error}"
                )));
                return result;
            }
        };
        extract_rows(
            &self.config,
            &self.registry,
            rows,
            self.row_filter,
            Some(index),
            &sheet_name,
        )
    }

    /// Extracts the first sheet whose name contains the given text.
    pub fn extract_by_sheet_name(&mut self, name: &str) -> SheetResult {
        match self.find_sheet_index_by_name(name) {
            Some(index) => self.extract_sheet_by_index(index),
            None => {
                let mut result = SheetResult::new(None, name);
                result.mark_failed();
                result.add_error(ExtractionError::sheet_level(format!(
                    "no sheet name contains '{name}'"
                )));
                result
            }
        }
    }

    /// Runs the pipeline over every sheet of the workbook.
    pub fn extract_all_sheets(&mut self) -> BatchResult {
        let total = self.sheet_names.len();
        let mut batch = BatchResult::new(total);
        for index in 0..total {
            let result = self.extract_sheet_by_index(index);
            info!(
                "sheet {index} '{}': success={} errors={}",
                result.sheet_name(),
                result.success(),
                result.errors().len()
            );
            batch.add(index, result);
        }
        batch
    }

    /// Reads plain numeric column series from one sheet, honoring the row
    /// filter but skipping the mapping pipeline entirely.
    pub fn extract_column_series(
        &mut self,
        sheet_index: usize,
        series: &ColumnSeriesConfig,
    ) -> Result<Vec<ColumnSeries>, SheetShiftError> {
        let sheet_name = self
            .sheet_names
            .get(sheet_index)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound(format!("#{sheet_index}")))?;
        let rows = self.spreadsheet.read_rows(&sheet_name)?;
        let mut data = SheetData::new();
        for (row_index, cells) in rows {
            if let Some(filter) = &self.row_filter {
                if !filter.accepts(row_index) {
                    continue;
                }
            }
            data.insert_row(row_index, cells);
        }
        Ok(extract_column_series(&data, series)?)
    }
}
