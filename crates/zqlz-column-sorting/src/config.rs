//! Column sorting settings
//!
//! Settings are plain serde structs so they can live in a grid's JSON
//! configuration. Every field has a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::criteria::ColumnSortConfig;
use crate::error::{SortError, SortResult};
use crate::options::{ColumnSortOptions, ColumnSortOverrides};

/// What happens to the row order after rows are inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowInsertPolicy {
    /// Shift the map; new rows stay where they were inserted
    #[default]
    Shift,
    /// Shift the map, then sort again so new rows find their place
    Resort,
}

/// What happens to the sort when another component remaps rows
/// (row trimming, manual row moves)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRemapPolicy {
    /// Sort again with the current criteria
    #[default]
    Resort,
    /// Drop the sort and show rows in source order
    ClearSort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSortingConfig {
    /// Applied on enable when no saved state exists (visual columns)
    pub initial_config: Vec<ColumnSortConfig>,
    /// Allow more than one criterion at a time
    pub multi_column: bool,
    pub sort_empty_cells: bool,
    pub indicator: bool,
    pub header_action: bool,
    /// Per-column overrides keyed by physical column
    pub columns: BTreeMap<usize, ColumnSortOverrides>,
    pub row_insert_policy: RowInsertPolicy,
    pub row_remap_policy: RowRemapPolicy,
    /// Key under which sort state is saved; `None` disables persistence
    pub persistence_key: Option<String>,
}

impl Default for ColumnSortingConfig {
    fn default() -> Self {
        let defaults = ColumnSortOptions::default();
        Self {
            initial_config: Vec::new(),
            multi_column: true,
            sort_empty_cells: defaults.sort_empty_cells,
            indicator: defaults.indicator,
            header_action: defaults.header_action,
            columns: BTreeMap::new(),
            row_insert_policy: RowInsertPolicy::default(),
            row_remap_policy: RowRemapPolicy::default(),
            persistence_key: None,
        }
    }
}

impl ColumnSortingConfig {
    pub fn from_json(json: &str) -> SortResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that do not need the grid
    pub fn validate(&self) -> SortResult<()> {
        if !self.multi_column && self.initial_config.len() > 1 {
            return Err(SortError::InvalidConfiguration(format!(
                "initial_config has {} entries but multi_column is disabled",
                self.initial_config.len()
            )));
        }
        if let Some(key) = &self.persistence_key {
            if key.trim().is_empty() {
                return Err(SortError::InvalidConfiguration(
                    "persistence_key must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Plugin-wide option defaults described by this config
    pub fn default_options(&self) -> ColumnSortOptions {
        ColumnSortOptions {
            sort_empty_cells: self.sort_empty_cells,
            indicator: self.indicator,
            header_action: self.header_action,
            ..ColumnSortOptions::default()
        }
    }
}
