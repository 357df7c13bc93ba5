//! ZQLZ Column Sorting
//!
//! Stable multi-column row ordering for data grids. Sorting never touches the
//! grid's data: it produces a visual → physical row map that the grid consults
//! through a [`RowTranslator`].
//!
//! # Architecture
//!
//! ```text
//! Grid (GridHost) ──sort / row events──→ ColumnSorting
//!                                           ↓
//!                            SortState + CompositeComparator
//!                                           ↓
//! Grid ←──visual_to_physical── RowTranslator (RowOrderMap)
//! ```
//!
//! # Components
//!
//! - [`ColumnSorting`] - Orchestrates sort requests, row events and header clicks
//! - [`SortState`] - Criteria queue on physical columns plus layered column options
//! - [`CompositeComparator`] - Multi-key comparison with a stable final tie-break
//! - [`RowTranslator`] - Shared row map handle with scoped suppression
//! - [`SortStateStore`] - Load/save of sort state (in memory or SQLite)

mod comparator;
mod config;
mod criteria;
mod error;
mod host;
mod mapper;
mod options;
mod persistence;
mod sorter;
mod state;
mod value;

pub use comparator::{
    compare_empty, parse_date, CompositeComparator, KeyComparator, RowSnapshot, Strategy,
};
pub use config::{ColumnSortingConfig, RowInsertPolicy, RowRemapPolicy};
pub use criteria::{ColumnSortConfig, SortCriterion, SortDirection, SortRequest};
pub use error::{SortError, SortResult};
pub use host::{GridHost, SortObserver};
pub use mapper::{RowOrderMap, RowTranslator, TranslationGuard, TranslationSource};
pub use options::{
    ColumnSortOptions, ColumnSortOverrides, ComparatorKind, CustomComparator, SortOptionsUpdate,
    DEFAULT_DATE_FORMAT,
};
pub use persistence::{
    MemorySortStateStore, PersistedSortState, SortStateStore, SqliteSortStateStore,
};
pub use sorter::{ColumnSorting, HeaderSortState, SortOutcome};
pub use state::{validate_columns, InvalidCriteria, SortState};
pub use value::{CellValue, Number};
