//! # sheet-shift
//!
//! Configuration-driven extraction of typed records from semi-structured
//! spreadsheets.
//!
//! Real-world workbooks mix fixed summary cells, repeating tables,
//! multi-row record groups and transposed layouts on a single sheet. This
//! crate reads such sheets against an external JSON mapping configuration
//! instead of hand-written parsing code:
//!
//! - **SINGLE** — one record from fixed cell positions
//! - **LIST** — one record per data row, with auto-detected table ends,
//!   merged-cell recovery and alternative columns
//! - **GROUP_LIST** — one record per fixed-size row group
//! - **VERTICAL_LIST** — one record per data column of a transposed table
//!
//! Row windows may be pinned by flag rows ("合计" markers and the like) and
//! by `${other.endRow + 1}` expressions resolved against already-known
//! positions. Extraction is forgiving: cell-level problems are recorded in
//! the result and never abort a sheet.
//!
//! ## Example
//!
//! ```no_run
//! use sheet_shift::{MappingConfig, SheetExtractor, TargetRegistry};
//! use sheet_shift::{FieldSink, FieldSinkError, Value};
//!
//! #[derive(Default)]
//! struct Well { name: Option<String>, depth: Option<f64> }
//!
//! impl FieldSink for Well {
//!     fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError> {
//!         match name {
//!             "name" => self.name = value.as_text().map(str::to_owned),
//!             "depth" => self.depth = value.as_f64(),
//!             other => return Err(FieldSinkError::UnknownField(other.to_owned())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), sheet_shift::SheetShiftError> {
//! let config = MappingConfig::load("mapping.json")?;
//! let mut registry = TargetRegistry::new();
//! registry.register::<Well>("Well");
//!
//! let mut extractor = SheetExtractor::open("wells.xlsx", config, registry)?;
//! let mut result = extractor.extract_sheet_by_index(0);
//! for well in result.take_result_list::<Well>("Well") {
//!     println!("{:?} {:?}", well.name, well.depth);
//! }
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod error;
pub mod extract;
pub mod facade;
pub mod resolver;
pub mod result;
pub mod sheet;

pub use config::{ColumnSeriesConfig, MappingConfig};
pub use error::SheetShiftError;
pub use extract::columns::ColumnSeries;
pub use extract::record::{FieldSink, FieldSinkError, Record, TargetRegistry, Value};
pub use facade::{extract_rows, SheetExtractor};
pub use result::{BatchResult, ExtractionError, SheetResult};
pub use sheet::{RowCollector, RowFilter, SheetData};
