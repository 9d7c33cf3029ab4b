//! Extraction outcomes: per-sheet results with partial-failure tracking and
//! the whole-workbook aggregate.
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::extract::record::Record;

/// One recorded extraction problem. Value equality drives deduplication:
/// the same message at the same position is reported once.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtractionError {
    pub message: String,
    pub extractor_id: Option<String>,
    /// One-based row number, when the error is tied to a row.
    pub row: Option<usize>,
    /// Column letters or field label, when the error is tied to one.
    pub column: Option<String>,
}

impl ExtractionError {
    pub fn structural(message: impl Into<String>, extractor_id: impl Into<String>) -> Self {
        ExtractionError {
            message: message.into(),
            extractor_id: Some(extractor_id.into()),
            row: None,
            column: None,
        }
    }

    pub fn at(
        message: impl Into<String>,
        extractor_id: impl Into<String>,
        row: usize,
        column: impl Into<String>,
    ) -> Self {
        ExtractionError {
            message: message.into(),
            extractor_id: Some(extractor_id.into()),
            row: Some(row),
            column: Some(column.into()),
        }
    }

    pub fn sheet_level(message: impl Into<String>) -> Self {
        ExtractionError {
            message: message.into(),
            extractor_id: None,
            row: None,
            column: None,
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.extractor_id {
            write!(f, "[{id}] ")?;
        }
        if let Some(row) = self.row {
            write!(f, "row {row} ")?;
        }
        if let Some(column) = &self.column {
            write!(f, "column {column} ")?;
        }
        f.write_str(&self.message)
    }
}

/// What one extractor produced for its target class.
pub enum Extracted {
    Single(Box<dyn Record>),
    List(Vec<Box<dyn Record>>),
}

/// The outcome of one sheet pass.
///
/// `success` reflects only whether the sheet could be processed at all
/// (rows loaded, positions resolved); field-level coercion problems are
/// recorded in `errors` without flipping it.
pub struct SheetResult {
    sheet_index: Option<usize>,
    sheet_name: String,
    success: bool,
    results: HashMap<String, Extracted>,
    errors: Vec<ExtractionError>,
}

impl SheetResult {
    pub fn new(sheet_index: Option<usize>, sheet_name: impl Into<String>) -> Self {
        SheetResult {
            sheet_index,
            sheet_name: sheet_name.into(),
            success: true,
            results: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn sheet_index(&self) -> Option<usize> {
        self.sheet_index
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub(crate) fn mark_failed(&mut self) {
        self.success = false;
    }

    /// Records an error unless an equal one was already seen; first-seen
    /// order is preserved.
    pub(crate) fn add_error(&mut self, error: ExtractionError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn errors(&self) -> &[ExtractionError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn insert_single(&mut self, target_class: &str, record: Box<dyn Record>) {
        self.results
            .insert(target_class.to_owned(), Extracted::Single(record));
    }

    pub(crate) fn insert_list(&mut self, target_class: &str, records: Vec<Box<dyn Record>>) {
        self.results
            .insert(target_class.to_owned(), Extracted::List(records));
    }

    pub fn contains_result(&self, target_class: &str) -> bool {
        self.results.contains_key(target_class)
    }

    /// Borrowed view of a SINGLE result, downcast to its concrete type.
    pub fn result<T: 'static>(&self, target_class: &str) -> Option<&T> {
        match self.results.get(target_class)? {
            Extracted::Single(record) => record.as_any().downcast_ref::<T>(),
            Extracted::List(_) => None,
        }
    }

    /// Borrowed view of a list result; empty when absent or not a list.
    pub fn result_list<T: 'static>(&self, target_class: &str) -> Vec<&T> {
        match self.results.get(target_class) {
            Some(Extracted::List(records)) => records
                .iter()
                .filter_map(|record| record.as_any().downcast_ref::<T>())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Removes and returns a SINGLE result by value.
    pub fn take_result<T: 'static>(&mut self, target_class: &str) -> Option<T> {
        match self.results.get(target_class) {
            Some(Extracted::Single(record)) if record.as_any().is::<T>() => {}
            _ => return None,
        }
        match self.results.remove(target_class) {
            Some(Extracted::Single(record)) => record.into_any().downcast::<T>().ok().map(|b| *b),
            _ => None,
        }
    }

    /// Removes and returns a list result by value; empty when absent.
    pub fn take_result_list<T: 'static>(&mut self, target_class: &str) -> Vec<T> {
        match self.results.get(target_class) {
            Some(Extracted::List(_)) => {}
            _ => return Vec::new(),
        }
        match self.results.remove(target_class) {
            Some(Extracted::List(records)) => records
                .into_iter()
                .filter_map(|record| record.into_any().downcast::<T>().ok().map(|b| *b))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for SheetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetResult")
            .field("sheet_index", &self.sheet_index)
            .field("sheet_name", &self.sheet_name)
            .field("success", &self.success)
            .field("targets", &self.results.keys().collect::<Vec<_>>())
            .field("errors", &self.errors)
            .finish()
    }
}

/// Results of extracting every sheet of a workbook, keyed by sheet index.
#[derive(Debug, Default)]
pub struct BatchResult {
    total_sheets: usize,
    sheets: BTreeMap<usize, SheetResult>,
}

impl BatchResult {
    pub fn new(total_sheets: usize) -> Self {
        BatchResult {
            total_sheets,
            sheets: BTreeMap::new(),
        }
    }

    pub(crate) fn add(&mut self, index: usize, result: SheetResult) {
        self.sheets.insert(index, result);
    }

    pub fn total_sheets(&self) -> usize {
        self.total_sheets
    }

    pub fn get(&self, index: usize) -> Option<&SheetResult> {
        self.sheets.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SheetResult> {
        self.sheets.get_mut(&index)
    }

    pub fn succeeded(&self) -> usize {
        self.sheets.values().filter(|sheet| sheet.success()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.sheets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SheetResult)> {
        self.sheets.iter().map(|(index, sheet)| (*index, sheet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::record::{FieldSink, FieldSinkError, Value};

    #[derive(Default, Debug, PartialEq)]
    struct Item {
        label: Option<String>,
    }

    impl FieldSink for Item {
        fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldSinkError> {
            match (name, value) {
                ("label", Value::Text(text)) => {
                    self.label = Some(text);
                    Ok(())
                }
                (name, _) => Err(FieldSinkError::UnknownField(name.to_owned())),
            }
        }
    }

    fn item(label: &str) -> Box<dyn Record> {
        Box::new(Item {
            label: Some(label.to_owned()),
        })
    }

    #[test]
    fn errors_dedup_preserving_order() {
        let mut result = SheetResult::new(Some(0), "Sheet1");
        result.add_error(ExtractionError::at("bad value", "rows", 5, "C"));
        result.add_error(ExtractionError::structural("no start row", "totals"));
        result.add_error(ExtractionError::at("bad value", "rows", 5, "C"));
        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.errors()[0].row, Some(5));
        assert!(result.success());
    }

    #[test]
    fn typed_getters_downcast() {
        let mut result = SheetResult::new(Some(0), "Sheet1");
        result.insert_single("Item", item("one"));
        result.insert_list("Items", vec![item("a"), item("b")]);

        assert_eq!(
            result.result::<Item>("Item").unwrap().label.as_deref(),
            Some("one")
        );
        assert_eq!(result.result_list::<Item>("Items").len(), 2);
        // Wrong shape or type yields nothing.
        assert!(result.result::<Item>("Items").is_none());
        assert!(result.result_list::<Item>("Item").is_empty());
        assert!(result.result::<String>("Item").is_none());

        let taken = result.take_result::<Item>("Item").unwrap();
        assert_eq!(taken.label.as_deref(), Some("one"));
        assert!(!result.contains_result("Item"));

        let list = result.take_result_list::<Item>("Items");
        assert_eq!(list.len(), 2);
        assert!(!result.contains_result("Items"));
    }

    #[test]
    fn take_with_wrong_type_keeps_the_result() {
        let mut result = SheetResult::new(Some(0), "Sheet1");
        result.insert_single("Item", item("one"));
        assert!(result.take_result::<String>("Item").is_none());
        assert!(result.contains_result("Item"));
    }

    #[test]
    fn batch_counts_successes() {
        let mut batch = BatchResult::new(2);
        let ok = SheetResult::new(Some(0), "A");
        let mut bad = SheetResult::new(Some(1), "B");
        bad.mark_failed();
        batch.add(0, ok);
        batch.add(1, bad);
        assert_eq!(batch.total_sheets(), 2);
        assert_eq!(batch.succeeded(), 1);
        assert!(!batch.all_succeeded());
        assert!(batch.get(1).is_some_and(|sheet| !sheet.success()));
    }
}
