//! Collaborator interfaces consumed by [`ColumnSorting`](crate::ColumnSorting)

use crate::criteria::ColumnSortConfig;
use crate::options::ColumnSortOverrides;
use crate::value::CellValue;

/// The grid that owns the data being sorted.
///
/// Rows passed to [`GridHost::cell_value`] are raw rows: the engine suppresses
/// its own translation while reading, so row `r` is the `r`-th row of the
/// source as the host sees it without sorting. Columns are visual.
pub trait GridHost {
    fn column_count(&self) -> usize;

    fn row_count(&self) -> usize;

    fn cell_value(&self, row: usize, visual_column: usize) -> CellValue;

    fn to_physical_column(&self, visual_column: usize) -> Option<usize>;

    fn to_visual_column(&self, physical_column: usize) -> Option<usize>;

    /// Schedule a redraw after the order changed
    fn request_render(&self) {}

    /// Trailing placeholder rows that never take part in sorting
    fn spare_rows(&self) -> usize {
        0
    }

    /// Upper bound on rows the grid displays
    fn max_rows(&self) -> usize {
        usize::MAX
    }

    /// Sort options from the host's column metadata; these win over every
    /// other layer
    fn column_meta(&self, _physical_column: usize) -> Option<ColumnSortOverrides> {
        None
    }
}

/// Receives sort notifications and may veto a sort before it happens
pub trait SortObserver {
    /// Called before any state changes. Returning `false` cancels the sort.
    fn before_sort(
        &self,
        _current: &[ColumnSortConfig],
        _requested: &[ColumnSortConfig],
        _is_valid: bool,
    ) -> bool {
        true
    }

    /// Called once the sort was applied or rejected; not called after a veto
    fn after_sort(
        &self,
        _previous: &[ColumnSortConfig],
        _current: &[ColumnSortConfig],
        _is_valid: bool,
    ) {
    }
}
