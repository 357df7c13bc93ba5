//! Sort criteria types
//!
//! [`SortCriterion`] is the engine's internal form keyed by physical column.
//! [`ColumnSortConfig`] is what callers pass in and read back, keyed by visual column.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::SortError;

/// Sort direction for a single criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Apply this direction to an ascending ordering
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(SortError::InvalidDirection(other.to_string())),
        }
    }
}

/// A single sort key on a physical column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// Physical column index
    pub column: usize,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// A sort key as exchanged with callers, on a visual column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSortConfig {
    /// Visual column index
    pub column: usize,
    #[serde(rename = "sortOrder", alias = "direction")]
    pub direction: SortDirection,
}

impl ColumnSortConfig {
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn ascending(column: usize) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn descending(column: usize) -> Self {
        Self::new(column, SortDirection::Descending)
    }
}

/// Input accepted by [`ColumnSorting::sort`](crate::ColumnSorting::sort)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortRequest {
    /// Drop every criterion
    #[default]
    Clear,
    Single(ColumnSortConfig),
    Many(Vec<ColumnSortConfig>),
}

impl SortRequest {
    /// Normalize into an ordered sequence of configs
    pub fn into_configs(self) -> Vec<ColumnSortConfig> {
        match self {
            Self::Clear => Vec::new(),
            Self::Single(config) => vec![config],
            Self::Many(configs) => configs,
        }
    }
}

impl From<ColumnSortConfig> for SortRequest {
    fn from(config: ColumnSortConfig) -> Self {
        Self::Single(config)
    }
}

impl From<Vec<ColumnSortConfig>> for SortRequest {
    fn from(configs: Vec<ColumnSortConfig>) -> Self {
        Self::Many(configs)
    }
}

impl From<&[ColumnSortConfig]> for SortRequest {
    fn from(configs: &[ColumnSortConfig]) -> Self {
        Self::Many(configs.to_vec())
    }
}

impl From<Option<ColumnSortConfig>> for SortRequest {
    fn from(config: Option<ColumnSortConfig>) -> Self {
        config.map(Self::Single).unwrap_or(Self::Clear)
    }
}
