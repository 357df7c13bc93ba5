//! Sort state: the criteria queue and per-column options

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::criteria::SortCriterion;
use crate::options::{ColumnSortOptions, ColumnSortOverrides, SortOptionsUpdate};

/// Why a criteria queue was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCriteria {
    ColumnOutOfRange { column: usize, column_count: usize },
    DuplicateColumn { column: usize },
    TooManyCriteria { count: usize },
}

impl std::fmt::Display for InvalidCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColumnOutOfRange {
                column,
                column_count,
            } => write!(f, "column {} is outside 0..{}", column, column_count),
            Self::DuplicateColumn { column } => write!(f, "column {} appears twice", column),
            Self::TooManyCriteria { count } => {
                write!(f, "{} criteria given but multi-column sorting is off", count)
            }
        }
    }
}

/// Check a queue of `(column, _)` pairs before commit.
///
/// Columns are checked against `column_count` in whatever coordinate space the
/// caller uses. With `multi_column` off at most one criterion is allowed.
pub fn validate_columns(
    columns: impl IntoIterator<Item = usize>,
    column_count: usize,
    multi_column: bool,
) -> Result<(), InvalidCriteria> {
    let mut seen = HashSet::new();
    for column in columns {
        if column >= column_count {
            return Err(InvalidCriteria::ColumnOutOfRange {
                column,
                column_count,
            });
        }
        if !seen.insert(column) {
            return Err(InvalidCriteria::DuplicateColumn { column });
        }
    }
    if !multi_column && seen.len() > 1 {
        return Err(InvalidCriteria::TooManyCriteria { count: seen.len() });
    }
    Ok(())
}

/// Holds the active criteria queue and the layered column options
#[derive(Debug, Clone, Default)]
pub struct SortState {
    criteria: Vec<SortCriterion>,
    defaults: ColumnSortOptions,
    column_overrides: BTreeMap<usize, ColumnSortOverrides>,
    /// Merged options keyed by physical column
    resolved: HashMap<usize, ColumnSortOptions>,
}

impl SortState {
    pub fn new(defaults: ColumnSortOptions) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Replace the whole queue.
    ///
    /// Callers validate first; a duplicate column here is a programming error.
    pub fn set_criteria(&mut self, criteria: Vec<SortCriterion>) {
        debug_assert!(
            validate_columns(criteria.iter().map(|c| c.column), usize::MAX, true).is_ok(),
            "criteria queue contains a duplicate column"
        );
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn is_column_sorted(&self, physical_column: usize) -> bool {
        self.index_in_queue(physical_column).is_some()
    }

    pub fn index_in_queue(&self, physical_column: usize) -> Option<usize> {
        self.criteria
            .iter()
            .position(|c| c.column == physical_column)
    }

    pub fn criterion(&self, physical_column: usize) -> Option<SortCriterion> {
        self.index_in_queue(physical_column)
            .map(|ix| self.criteria[ix])
    }

    pub fn defaults(&self) -> &ColumnSortOptions {
        &self.defaults
    }

    pub fn column_overrides(&self) -> &BTreeMap<usize, ColumnSortOverrides> {
        &self.column_overrides
    }

    /// Merge a partial settings change. The criteria queue is left alone.
    pub fn update_column_options(&mut self, update: &SortOptionsUpdate) {
        update.defaults.apply_to(&mut self.defaults);
        for (column, overrides) in &update.columns {
            self.column_overrides
                .entry(*column)
                .or_default()
                .merge(overrides);
        }
        self.column_overrides.retain(|_, o| !o.is_empty());
        self.invalidate_options();
    }

    /// Lay saved option layers over the live ones.
    ///
    /// Saved layers never carry a custom comparator, so one already set on the
    /// defaults or on a column is kept.
    pub fn restore_column_options(
        &mut self,
        mut defaults: ColumnSortOptions,
        column_overrides: BTreeMap<usize, ColumnSortOverrides>,
    ) {
        if defaults.compare_function.is_none() {
            defaults.compare_function = self.defaults.compare_function.take();
        }
        self.defaults = defaults;
        for (column, overrides) in &column_overrides {
            self.column_overrides
                .entry(*column)
                .or_default()
                .merge(overrides);
        }
        self.column_overrides.retain(|_, o| !o.is_empty());
        self.invalidate_options();
    }

    /// Resolve options for a physical column, memoized until the next invalidation.
    ///
    /// `host_meta` is only consulted on a cache miss.
    pub fn column_options(
        &mut self,
        physical_column: usize,
        host_meta: impl FnOnce() -> Option<ColumnSortOverrides>,
    ) -> &ColumnSortOptions {
        let defaults = &self.defaults;
        let column_overrides = &self.column_overrides;
        self.resolved.entry(physical_column).or_insert_with(|| {
            let mut options = defaults.clone();
            if let Some(overrides) = column_overrides.get(&physical_column) {
                overrides.apply_to(&mut options);
            }
            if let Some(meta) = host_meta() {
                meta.apply_to(&mut options);
            }
            options
        })
    }

    pub fn invalidate_options(&mut self) {
        self.resolved.clear();
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SortDirection;
    use crate::options::ComparatorKind;

    fn asc(column: usize) -> SortCriterion {
        SortCriterion::new(column, SortDirection::Ascending)
    }

    #[test]
    fn test_queue_queries() {
        let mut state = SortState::default();
        assert!(state.is_empty());

        state.set_criteria(vec![asc(3), SortCriterion::new(1, SortDirection::Descending)]);
        assert!(!state.is_empty());
        assert!(state.is_column_sorted(1));
        assert!(!state.is_column_sorted(0));
        assert_eq!(state.index_in_queue(3), Some(0));
        assert_eq!(state.index_in_queue(1), Some(1));
        assert_eq!(state.index_in_queue(2), None);
        assert_eq!(
            state.criterion(1).map(|c| c.direction),
            Some(SortDirection::Descending)
        );

        state.set_criteria(Vec::new());
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_criteria_replaces_wholesale() {
        let mut state = SortState::default();
        state.set_criteria(vec![asc(0), asc(1)]);
        state.set_criteria(vec![asc(2)]);
        assert_eq!(state.criteria(), &[asc(2)]);
    }

    #[test]
    fn test_validate_columns() {
        assert!(validate_columns([0, 2], 3, true).is_ok());
        assert!(validate_columns(std::iter::empty(), 0, true).is_ok());
        assert_eq!(
            validate_columns([0, 3], 3, true),
            Err(InvalidCriteria::ColumnOutOfRange {
                column: 3,
                column_count: 3
            })
        );
        assert_eq!(
            validate_columns([1, 0, 1], 3, true),
            Err(InvalidCriteria::DuplicateColumn { column: 1 })
        );
        assert_eq!(
            validate_columns([0, 1], 3, false),
            Err(InvalidCriteria::TooManyCriteria { count: 2 })
        );
        assert!(validate_columns([1], 3, false).is_ok());
    }

    #[test]
    fn test_update_options_keeps_criteria() {
        let mut state = SortState::default();
        state.set_criteria(vec![asc(0)]);
        state.update_column_options(&SortOptionsUpdate::defaults(
            ColumnSortOverrides::new().sort_empty_cells(true),
        ));
        assert_eq!(state.criteria(), &[asc(0)]);
        assert!(state.defaults().sort_empty_cells);
    }

    #[test]
    fn test_column_options_layers_and_cache() {
        let mut state = SortState::default();
        state.update_column_options(
            &SortOptionsUpdate::default()
                .column(1, ColumnSortOverrides::new().comparator(ComparatorKind::Date)),
        );

        let options = state
            .column_options(1, || Some(ColumnSortOverrides::new().date_format("%Y")))
            .clone();
        assert_eq!(options.comparator, ComparatorKind::Date);
        assert_eq!(options.date_format, "%Y");

        // Cached: the host layer is not consulted again
        let cached = state
            .column_options(1, || panic!("host metadata read on a cache hit"))
            .clone();
        assert_eq!(cached.date_format, "%Y");

        state.update_column_options(&SortOptionsUpdate::defaults(
            ColumnSortOverrides::new().indicator(false),
        ));
        let refreshed = state.column_options(1, || None).clone();
        assert!(!refreshed.indicator);
        assert_eq!(refreshed.date_format, crate::options::DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_restore_keeps_custom_comparator() {
        use crate::options::CustomComparator;
        use std::cmp::Ordering;

        let mut state = SortState::default();
        state.update_column_options(&SortOptionsUpdate::default().column(
            0,
            ColumnSortOverrides::new()
                .compare_function(CustomComparator::new(|_, _, _| Ordering::Equal)),
        ));

        let mut saved_columns = BTreeMap::new();
        saved_columns.insert(0, ColumnSortOverrides::new().indicator(false));
        saved_columns.insert(2, ColumnSortOverrides::new().comparator(ComparatorKind::Numeric));
        state.restore_column_options(
            ColumnSortOptions {
                sort_empty_cells: true,
                ..ColumnSortOptions::default()
            },
            saved_columns,
        );

        assert!(state.defaults().sort_empty_cells);
        let column = state.column_options(0, || None).clone();
        assert!(column.compare_function.is_some());
        assert!(!column.indicator);
        assert_eq!(
            state.column_options(2, || None).comparator,
            ComparatorKind::Numeric
        );
    }
}
