//! Multi-key row comparison
//!
//! Every sorted column contributes one [`KeyComparator`]. The
//! [`CompositeComparator`] walks them in priority order and falls through to
//! the next key whenever a key has no preference. Rows that tie on every key
//! keep their original relative order.

mod date;
mod generic;
mod numeric;

use std::cmp::Ordering;

use crate::criteria::{SortCriterion, SortDirection};
use crate::options::{ColumnSortOptions, ComparatorKind, CustomComparator};
use crate::value::CellValue;

pub use date::parse_date;

/// One row's sort keys, read fresh for every sort pass
#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    /// Row index before sorting; also the final tie-break
    pub row: usize,
    /// One value per criterion, in queue order
    pub values: Vec<CellValue>,
}

impl RowSnapshot {
    pub fn new(row: usize, values: Vec<CellValue>) -> Self {
        Self { row, values }
    }
}

/// Comparison strategy resolved for one sort key
#[derive(Debug, Clone)]
pub enum Strategy {
    Generic,
    Numeric,
    Date { format: String },
    Custom(CustomComparator),
}

impl Strategy {
    /// Pick the strategy for a column; a custom comparator always wins
    pub fn for_options(options: &ColumnSortOptions) -> Self {
        if let Some(compare) = &options.compare_function {
            return Self::Custom(compare.clone());
        }
        match options.comparator {
            ComparatorKind::Generic => Self::Generic,
            ComparatorKind::Numeric => Self::Numeric,
            ComparatorKind::Date => Self::Date {
                format: options.date_format.clone(),
            },
        }
    }
}

/// Ordering between an empty and a non-empty value.
///
/// Returns `None` when neither side is empty. Without `sort_empty_cells` an
/// empty value goes after a non-empty one whatever the direction.
pub fn compare_empty(
    a: &CellValue,
    b: &CellValue,
    direction: SortDirection,
    sort_empty_cells: bool,
) -> Option<Ordering> {
    match (a.is_empty(), b.is_empty()) {
        (false, false) => None,
        (true, true) => Some(Ordering::Equal),
        (true, false) if sort_empty_cells => Some(direction.apply(Ordering::Less)),
        (false, true) if sort_empty_cells => Some(direction.apply(Ordering::Greater)),
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
    }
}

/// Comparator for a single criterion
#[derive(Debug, Clone)]
pub struct KeyComparator {
    pub strategy: Strategy,
    pub direction: SortDirection,
    pub sort_empty_cells: bool,
}

impl KeyComparator {
    pub fn new(criterion: &SortCriterion, options: &ColumnSortOptions) -> Self {
        Self {
            strategy: Strategy::for_options(options),
            direction: criterion.direction,
            sort_empty_cells: options.sort_empty_cells,
        }
    }

    /// `Less` puts `a` first, `Greater` puts `b` first, `Equal` defers
    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        match &self.strategy {
            Strategy::Custom(compare) => compare.compare(a, b, self.direction),
            Strategy::Generic => {
                self.with_empty_rule(a, b, || self.direction.apply(generic::compare(a, b)))
            }
            Strategy::Numeric => {
                self.with_empty_rule(a, b, || numeric::compare(a, b, self.direction))
            }
            Strategy::Date { format } => {
                self.with_empty_rule(a, b, || date::compare(a, b, format, self.direction))
            }
        }
    }

    fn with_empty_rule(
        &self,
        a: &CellValue,
        b: &CellValue,
        compare: impl FnOnce() -> Ordering,
    ) -> Ordering {
        compare_empty(a, b, self.direction, self.sort_empty_cells).unwrap_or_else(compare)
    }
}

/// Composite comparator over every criterion in the queue
#[derive(Debug, Clone, Default)]
pub struct CompositeComparator {
    keys: Vec<KeyComparator>,
}

impl CompositeComparator {
    pub fn new(keys: Vec<KeyComparator>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compare two snapshots, falling back to the original row order
    pub fn compare(&self, a: &RowSnapshot, b: &RowSnapshot) -> Ordering {
        for (ix, key) in self.keys.iter().enumerate() {
            let ordering = match (a.values.get(ix), b.values.get(ix)) {
                (Some(va), Some(vb)) => key.compare(va, vb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.row.cmp(&b.row)
    }

    /// Stable sort of the snapshots in place
    pub fn sort(&self, rows: &mut [RowSnapshot]) {
        if self.is_empty() {
            return;
        }
        rows.sort_by(|a, b| self.compare(a, b));
    }
}
