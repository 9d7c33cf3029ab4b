//! The mapping configuration model: what to extract from where, loaded from
//! an external JSON document keyed by extractor id.
pub mod bound;
pub mod column;
pub mod extractor;
pub mod field;
pub mod series;
pub mod table;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

pub use bound::Bound;
pub use column::ColumnConfig;
pub use extractor::{ExtractorConfig, FlagConfig, ResultType};
pub use field::{FieldConfig, FieldType};
pub use series::{ColumnSeriesConfig, ColumnSeriesEntry};
pub use table::TableConfig;

/// Errors raised while loading or editing a mapping configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extractor '{0}' already exists")]
    DuplicateExtractor(String),

    #[error("Extractor '{0}' not found")]
    UnknownExtractor(String),
}

/// The full set of extractors for one workbook layout, ordered by ascending
/// `order`. `Clone` is a deep copy; every sheet pass works on its own clone
/// so resolved bounds never leak between sheets.
#[derive(Clone, Debug, Default)]
pub struct MappingConfig {
    extractors: Vec<ExtractorConfig>,
}

impl MappingConfig {
    /// Reads a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses the JSON map form: `{ "<extractor id>": { ... }, ... }`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let map: BTreeMap<String, ExtractorConfig> = serde_json::from_str(json)?;
        let mut extractors: Vec<ExtractorConfig> = map
            .into_iter()
            .map(|(id, mut extractor)| {
                extractor.id = id;
                extractor
            })
            .collect();
        Self::sort(&mut extractors);
        Ok(MappingConfig { extractors })
    }

    /// Serializes back to the JSON map form.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        let map: BTreeMap<&str, &ExtractorConfig> = self
            .extractors
            .iter()
            .map(|extractor| (extractor.id.as_str(), extractor))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    pub fn extractors(&self) -> &[ExtractorConfig] {
        &self.extractors
    }

    pub(crate) fn extractors_mut(&mut self) -> impl Iterator<Item = &mut ExtractorConfig> {
        self.extractors.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&ExtractorConfig> {
        self.extractors.iter().find(|extractor| extractor.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ExtractorConfig> {
        self.extractors
            .iter_mut()
            .find(|extractor| extractor.id == id)
    }

    /// Adds a new extractor; its id must be unused.
    pub fn add(&mut self, extractor: ExtractorConfig) -> Result<(), ConfigError> {
        if self.get(&extractor.id).is_some() {
            return Err(ConfigError::DuplicateExtractor(extractor.id));
        }
        self.extractors.push(extractor);
        Self::sort(&mut self.extractors);
        Ok(())
    }

    /// Replaces the extractor with the same id.
    pub fn update(&mut self, extractor: ExtractorConfig) -> Result<(), ConfigError> {
        let slot = self
            .extractors
            .iter_mut()
            .find(|existing| existing.id == extractor.id)
            .ok_or_else(|| ConfigError::UnknownExtractor(extractor.id.clone()))?;
        *slot = extractor;
        Self::sort(&mut self.extractors);
        Ok(())
    }

    /// Removes an extractor; returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.extractors.len();
        self.extractors.retain(|extractor| extractor.id != id);
        self.extractors.len() != before
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    fn sort(extractors: &mut [ExtractorConfig]) {
        extractors.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    }
}
