//! Dynamic position resolution: flag rows observed during the row scan fix
//! concrete bounds, then a bounded fixpoint evaluates every remaining
//! `${...}` bound against the shared environment until nothing is pending.
pub mod expr;

use std::collections::HashMap;

use log::{debug, warn};
use thiserror::Error;

use crate::config::{Bound, MappingConfig};
use crate::sheet::reference::col_to_index;
use crate::sheet::RowCells;

/// Ceiling on fixpoint rounds; reaching it means a dependency cycle or a
/// reference to a bound that can never exist.
pub const MAX_ROUNDS: usize = 1000;

/// Errors raised when the fixpoint cannot complete.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Row bounds still unresolved after {MAX_ROUNDS} rounds: {0:?}")]
    CeilingReached(Vec<String>),

    #[error("Row bounds cannot make progress: {0:?}")]
    NoProgress(Vec<String>),
}

/// Which bound a flag row fixes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagKind {
    Start,
    End,
}

impl FlagKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Start => "start",
            FlagKind::End => "end",
        }
    }
}

struct PendingFlag {
    extractor_id: String,
    text: String,
    column: usize,
    kind: FlagKind,
}

struct FlagMatch {
    extractor_id: String,
    kind: FlagKind,
    value: i64,
}

/// Accumulates flag matches during the row scan, then drives the fixpoint
/// over every extractor whose bounds are still expressions.
pub struct PositionResolver {
    waiting: Vec<PendingFlag>,
    matched: Vec<FlagMatch>,
    env: HashMap<String, i64>,
}

impl PositionResolver {
    /// Seeds the environment with every literal bound and registers the
    /// flags of extractors using flag-delimited row windows.
    pub fn new(config: &MappingConfig) -> Self {
        let mut env = HashMap::new();
        let mut waiting = Vec::new();
        for extractor in config.extractors() {
            if let Bound::Literal(value) = extractor.start_row {
                env.insert(format!("{}.startRow", extractor.id), value);
            }
            if let Bound::Literal(value) = extractor.end_row {
                env.insert(format!("{}.endRow", extractor.id), value);
            }
            if !extractor.is_dynamic_rows() {
                continue;
            }
            for (flag, kind) in [
                (&extractor.start_flag, FlagKind::Start),
                (&extractor.end_flag, FlagKind::End),
            ] {
                let Some(flag) = flag else { continue };
                match col_to_index(&flag.column_cell) {
                    Ok(column) => waiting.push(PendingFlag {
                        extractor_id: extractor.id.clone(),
                        text: strip_whitespace(&flag.text),
                        column,
                        kind,
                    }),
                    Err(error) => warn!(
                        "ignoring {} flag of extractor '{}': {error}",
                        kind.as_str(),
                        extractor.id
                    ),
                }
            }
        }
        PositionResolver {
            waiting,
            matched: Vec::new(),
            env,
        }
    }

    /// Checks one streamed row against every flag still waiting. A match
    /// fixes the end bound to the flag row itself, or the start bound to two
    /// rows below it (the flag row plus one header row). First match wins.
    pub fn scan_row(&mut self, row_index: usize, cells: &RowCells) {
        if self.waiting.is_empty() {
            return;
        }
        let mut index = 0;
        while index < self.waiting.len() {
            let flag = &self.waiting[index];
            let candidate = cells.get(&flag.column).map(|text| strip_whitespace(text));
            let hit = match candidate {
                Some(value) if !value.is_empty() => {
                    value.contains(&flag.text) || flag.text.contains(&value)
                }
                _ => false,
            };
            if !hit {
                index += 1;
                continue;
            }
            let flag = self.waiting.swap_remove(index);
            let (value, variable) = match flag.kind {
                FlagKind::End => (row_index as i64, format!("{}.endRow", flag.extractor_id)),
                FlagKind::Start => (
                    row_index as i64 + 2,
                    format!("{}.startRow", flag.extractor_id),
                ),
            };
            debug!(
                "{} flag of extractor '{}' matched at row {row_index}",
                flag.kind.as_str(),
                flag.extractor_id
            );
            self.env.insert(variable, value);
            self.matched.push(FlagMatch {
                extractor_id: flag.extractor_id,
                kind: flag.kind,
                value,
            });
        }
    }

    /// Extractors whose flags never matched, with the bound kind affected.
    pub fn unmatched_flags(&self) -> Vec<(String, FlagKind)> {
        self.waiting
            .iter()
            .map(|flag| (flag.extractor_id.clone(), flag.kind))
            .collect()
    }

    /// Fixes matched flag bounds into the config, then runs the fixpoint
    /// over every extractor still carrying an expression bound. Each round
    /// re-evaluates all pending bounds; resolved values enter the
    /// environment immediately so later extractors in the same round see
    /// them. A round that resolves nothing fails fast.
    pub fn resolve(&mut self, config: &mut MappingConfig) -> Result<(), ResolveError> {
        for matched in &self.matched {
            if let Some(extractor) = config.get_mut(&matched.extractor_id) {
                match matched.kind {
                    FlagKind::Start => extractor.start_row = Bound::Literal(matched.value),
                    FlagKind::End => extractor.end_row = Bound::Literal(matched.value),
                }
            }
        }

        let mut pending: Vec<String> = config
            .extractors()
            .iter()
            .filter(|extractor| extractor.has_unresolved_bounds())
            .map(|extractor| extractor.id.clone())
            .collect();

        let mut rounds = 0;
        while !pending.is_empty() {
            rounds += 1;
            if rounds > MAX_ROUNDS {
                return Err(ResolveError::CeilingReached(pending));
            }
            let mut progressed = 0usize;
            let mut still_pending = Vec::new();
            for id in &pending {
                if !self.resolve_extractor(config, id, &mut progressed) {
                    still_pending.push(id.clone());
                }
            }
            if progressed == 0 && !still_pending.is_empty() {
                return Err(ResolveError::NoProgress(still_pending));
            }
            pending = still_pending;
        }

        self.resolve_dynamic_fields(config);
        Ok(())
    }

    /// Tries both bounds of one extractor; returns whether it is now fully
    /// resolved.
    fn resolve_extractor(
        &mut self,
        config: &mut MappingConfig,
        id: &str,
        progressed: &mut usize,
    ) -> bool {
        let (start, end) = match config.get(id) {
            Some(extractor) => (extractor.start_row.clone(), extractor.end_row.clone()),
            None => return true,
        };
        let mut done = true;
        for (bound, suffix) in [(start, "startRow"), (end, "endRow")] {
            let Bound::Unresolved(template) = bound else {
                continue;
            };
            let Some(body) = expr::extract_expression(&template) else {
                // Not an expression; nothing will ever resolve it.
                done = false;
                continue;
            };
            match expr::evaluate(&body, &self.env) {
                Ok(value) => {
                    self.env.insert(format!("{id}.{suffix}"), value);
                    if let Some(extractor) = config.get_mut(id) {
                        match suffix {
                            "startRow" => extractor.start_row = Bound::Literal(value),
                            _ => extractor.end_row = Bound::Literal(value),
                        }
                    }
                    *progressed += 1;
                }
                Err(_) => done = false,
            }
        }
        done
    }

    /// Substitutes resolved values into dynamic field cells, permanently
    /// rewriting the coordinate text in the config clone.
    fn resolve_dynamic_fields(&self, config: &mut MappingConfig) {
        for extractor in config.extractors_mut() {
            for field in extractor.fields.values_mut() {
                if !field.is_dynamic() {
                    continue;
                }
                let Some(body) = expr::extract_expression(&field.cell) else {
                    continue;
                };
                match expr::evaluate(&body, &self.env) {
                    Ok(value) => {
                        field.cell = expr::replace_expression(&field.cell, &value.to_string());
                    }
                    Err(error) => warn!(
                        "dynamic cell '{}' of field '{}' left as-is: {error}",
                        field.cell, field.field_name
                    ),
                }
            }
        }
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
