//! Per-column sort options
//!
//! Options resolve through three layers, lowest precedence first:
//! plugin-wide defaults, per-column overrides from the sorting settings,
//! and the host's own column metadata.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::criteria::SortDirection;
use crate::value::CellValue;

/// Default format used by the date strategy (`DD/MM/YYYY`)
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Built-in comparison strategy for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparatorKind {
    #[default]
    Generic,
    Numeric,
    Date,
}

type CompareFn = dyn Fn(&CellValue, &CellValue, SortDirection) -> Ordering + Send + Sync;

/// Caller-supplied comparison for one column.
///
/// Receives the direction and must return the final ordering for it:
/// `Less` places the first value before the second. `Equal` defers to the
/// next criterion.
#[derive(Clone)]
pub struct CustomComparator(Arc<CompareFn>);

impl CustomComparator {
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&CellValue, &CellValue, SortDirection) -> Ordering + Send + Sync + 'static,
    {
        Self(Arc::new(compare))
    }

    pub fn compare(&self, a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
        (self.0)(a, b, direction)
    }
}

impl fmt::Debug for CustomComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomComparator(..)")
    }
}

/// Fully resolved options for one physical column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSortOptions {
    /// Let empty cells follow the sort direction instead of always sinking to the bottom
    pub sort_empty_cells: bool,
    /// Show the sort indicator in the column header
    pub indicator: bool,
    /// Clicking the header changes the sort
    pub header_action: bool,
    pub comparator: ComparatorKind,
    /// chrono format string used by [`ComparatorKind::Date`]
    pub date_format: String,
    /// Replaces the built-in comparator when set
    #[serde(skip)]
    pub compare_function: Option<CustomComparator>,
}

impl Default for ColumnSortOptions {
    fn default() -> Self {
        Self {
            sort_empty_cells: false,
            indicator: true,
            header_action: true,
            comparator: ComparatorKind::Generic,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            compare_function: None,
        }
    }
}

/// Partial options; `None` fields inherit from the layer below
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSortOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_empty_cells: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<ComparatorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip)]
    pub compare_function: Option<CustomComparator>,
}

impl ColumnSortOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_empty_cells(mut self, value: bool) -> Self {
        self.sort_empty_cells = Some(value);
        self
    }

    pub fn indicator(mut self, value: bool) -> Self {
        self.indicator = Some(value);
        self
    }

    pub fn header_action(mut self, value: bool) -> Self {
        self.header_action = Some(value);
        self
    }

    pub fn comparator(mut self, kind: ComparatorKind) -> Self {
        self.comparator = Some(kind);
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn compare_function(mut self, compare: CustomComparator) -> Self {
        self.compare_function = Some(compare);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sort_empty_cells.is_none()
            && self.indicator.is_none()
            && self.header_action.is_none()
            && self.comparator.is_none()
            && self.date_format.is_none()
            && self.compare_function.is_none()
    }

    /// Fold `other` into `self`; fields set in `other` win
    pub fn merge(&mut self, other: &ColumnSortOverrides) {
        if other.sort_empty_cells.is_some() {
            self.sort_empty_cells = other.sort_empty_cells;
        }
        if other.indicator.is_some() {
            self.indicator = other.indicator;
        }
        if other.header_action.is_some() {
            self.header_action = other.header_action;
        }
        if other.comparator.is_some() {
            self.comparator = other.comparator;
        }
        if other.date_format.is_some() {
            self.date_format = other.date_format.clone();
        }
        if other.compare_function.is_some() {
            self.compare_function = other.compare_function.clone();
        }
    }

    pub fn apply_to(&self, options: &mut ColumnSortOptions) {
        if let Some(value) = self.sort_empty_cells {
            options.sort_empty_cells = value;
        }
        if let Some(value) = self.indicator {
            options.indicator = value;
        }
        if let Some(value) = self.header_action {
            options.header_action = value;
        }
        if let Some(kind) = self.comparator {
            options.comparator = kind;
        }
        if let Some(format) = &self.date_format {
            options.date_format = format.clone();
        }
        if let Some(compare) = &self.compare_function {
            options.compare_function = Some(compare.clone());
        }
    }
}

/// A partial settings change for [`SortState::update_column_options`](crate::SortState::update_column_options)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOptionsUpdate {
    /// Applied to the plugin-wide defaults
    pub defaults: ColumnSortOverrides,
    /// Merged into the per-column overrides, keyed by physical column
    pub columns: BTreeMap<usize, ColumnSortOverrides>,
}

impl SortOptionsUpdate {
    pub fn defaults(overrides: ColumnSortOverrides) -> Self {
        Self {
            defaults: overrides,
            columns: BTreeMap::new(),
        }
    }

    pub fn column(mut self, physical_column: usize, overrides: ColumnSortOverrides) -> Self {
        self.columns.insert(physical_column, overrides);
        self
    }
}
