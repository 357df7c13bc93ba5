//! Numeric comparison

use std::cmp::Ordering;

use crate::criteria::SortDirection;
use crate::value::CellValue;

/// Compare two non-empty values as numbers.
///
/// A value that is not a number goes after one that is, in both directions.
/// Two non-numbers have no preference.
pub(super) fn compare(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(a), Some(b)) => direction.apply(a.compare(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
