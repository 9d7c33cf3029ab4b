//! In-memory sheet rows plus the single-pass collector that buffers them and
//! scans for flag rows along the way.
pub mod reference;
pub mod source;

use std::collections::BTreeMap;

use crate::config::MappingConfig;
use crate::resolver::PositionResolver;

/// One row: column index to raw cell text.
pub type RowCells = BTreeMap<usize, String>;

/// Ordered sheet contents, row index to row cells. Blank cells are simply
/// absent; lookups treat missing and whitespace-only values alike.
#[derive(Clone, Debug, Default)]
pub struct SheetData {
    rows: BTreeMap<usize, RowCells>,
}

impl SheetData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_row(&mut self, index: usize, cells: RowCells) {
        self.rows.insert(index, cells);
    }

    /// Sets a single cell, creating the row if needed.
    pub fn set_cell<S: Into<String>>(&mut self, row: usize, col: usize, value: S) {
        self.rows.entry(row).or_default().insert(col, value.into());
    }

    pub fn row(&self, index: usize) -> Option<&RowCells> {
        self.rows.get(&index)
    }

    pub fn contains_row(&self, index: usize) -> bool {
        self.rows.contains_key(&index)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(&col))
            .map(String::as_str)
    }

    pub fn last_row_index(&self) -> Option<usize> {
        self.rows.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &RowCells)> {
        self.rows.iter().map(|(index, cells)| (*index, cells))
    }
}

/// Optional one-based row window applied while streaming rows in.
#[derive(Copy, Clone, Debug, Default)]
pub struct RowFilter {
    pub start_row: Option<u32>,
    pub end_row: Option<u32>,
}

impl RowFilter {
    pub fn new(start_row: Option<u32>, end_row: Option<u32>) -> Self {
        RowFilter { start_row, end_row }
    }

    /// Whether a zero-based stream row falls inside the window.
    pub fn accepts(&self, row_index: usize) -> bool {
        if let Some(start) = self.start_row {
            if start >= 1 && row_index < start as usize - 1 {
                return false;
            }
        }
        if let Some(end) = self.end_row {
            if end >= 1 && row_index > end as usize - 1 {
                return false;
            }
        }
        true
    }
}

/// Buffers streamed rows and feeds each accepted row to the flag scanner.
/// Rows rejected by the filter are neither buffered nor scanned.
pub struct RowCollector {
    data: SheetData,
    filter: Option<RowFilter>,
    resolver: PositionResolver,
}

impl RowCollector {
    pub fn new(config: &MappingConfig, filter: Option<RowFilter>) -> Self {
        RowCollector {
            data: SheetData::new(),
            filter,
            resolver: PositionResolver::new(config),
        }
    }

    pub fn push_row(&mut self, row_index: usize, cells: RowCells) {
        if let Some(filter) = &self.filter {
            if !filter.accepts(row_index) {
                return;
            }
        }
        self.resolver.scan_row(row_index, &cells);
        self.data.insert_row(row_index, cells);
    }

    /// Hands the buffered sheet and the accumulated flag state onward.
    pub fn finish(self) -> (SheetData, PositionResolver) {
        (self.data, self.resolver)
    }
}
