//! Workbook decoding: format dispatch over the calamine readers and
//! normalization of decoded cells to the raw text the engine consumes.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{
    open_workbook, Data, Ods, OdsError, Reader, Xls, XlsError, Xlsb, XlsbError, Xlsx, XlsxError,
};
use thiserror::Error;

use crate::sheet::RowCells;

/// Errors raised while opening or reading a workbook.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Xlsb error: {0}")]
    Xlsb(#[from] XlsbError),

    #[error("Xls error: {0}")]
    Xls(#[from] XlsError),

    #[error("Ods error: {0}")]
    Ods(#[from] OdsError),
}

type FileReader = BufReader<File>;

/// A workbook opened for reading, dispatched on file extension.
pub enum Spreadsheet {
    Xlsx(Xlsx<FileReader>),
    Xlsb(Xlsb<FileReader>),
    Xls(Xls<FileReader>),
    Ods(Ods<FileReader>),
}

impl Spreadsheet {
    /// Opens a workbook, choosing the decoder by file extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlam") => Ok(Self::Xlsx(open_workbook(path)?)),
            Some("xlsb") => Ok(Self::Xlsb(open_workbook(path)?)),
            Some("xls" | "xla") => Ok(Self::Xls(open_workbook(path)?)),
            Some("ods") => Ok(Self::Ods(open_workbook(path)?)),
            _ => Err(SourceError::UnsupportedFormat(
                path.to_string_lossy().into_owned(),
            )),
        }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(workbook) => workbook.sheet_names(),
            Self::Xlsb(workbook) => workbook.sheet_names(),
            Self::Xls(workbook) => workbook.sheet_names(),
            Self::Ods(workbook) => workbook.sheet_names(),
        }
    }

    /// Decodes one sheet into `(row index, cells)` pairs in row order.
    /// Blank cells are omitted; every kept value is the cell's text form.
    pub fn read_rows(&mut self, sheet_name: &str) -> Result<Vec<(usize, RowCells)>, SourceError> {
        let range = match self {
            Self::Xlsx(workbook) => workbook.worksheet_range(sheet_name)?,
            Self::Xlsb(workbook) => workbook.worksheet_range(sheet_name)?,
            Self::Xls(workbook) => workbook.worksheet_range(sheet_name)?,
            Self::Ods(workbook) => workbook.worksheet_range(sheet_name)?,
        };
        let (start_row, start_col) = match range.start() {
            Some(start) => (start.0 as usize, start.1 as usize),
            None => return Ok(Vec::new()),
        };
        let mut rows: std::collections::BTreeMap<usize, RowCells> =
            std::collections::BTreeMap::new();
        for (row, col, value) in range.used_cells() {
            if let Some(text) = cell_text(value) {
                rows.entry(start_row + row)
                    .or_default()
                    .insert(start_col + col, text);
            }
        }
        Ok(rows.into_iter().collect())
    }
}

/// Renders a decoded cell as the text the engine works with. Whole floats
/// lose their fractional point so numeric coercion sees "42", not "42.0".
fn cell_text(value: &Data) -> Option<String> {
    match value {
        Data::Empty => None,
        Data::String(text) => {
            if text.trim().is_empty() {
                None
            } else {
                Some(text.clone())
            }
        }
        Data::Int(number) => Some(number.to_string()),
        Data::Float(number) => {
            if number.fract() == 0.0 && number.abs() < 1e15 {
                Some(format!("{}", *number as i64))
            } else {
                Some(number.to_string())
            }
        }
        Data::Bool(flag) => Some(flag.to_string()),
        Data::DateTime(stamp) => stamp
            .as_datetime()
            .map(|moment| moment.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(text.clone()),
        Data::Error(_) => None,
    }
}
