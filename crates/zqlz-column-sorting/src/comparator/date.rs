//! Date comparison using the column's date format

use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

use crate::criteria::SortDirection;
use crate::value::CellValue;

/// Parse a cell as a point in time.
///
/// Native date values are taken as-is; text is parsed with `format` (chrono
/// `strftime` syntax), first as a date-time and then as a plain date.
pub fn parse_date(value: &CellValue, format: &str) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(date) => date.and_hms_opt(0, 0, 0),
        CellValue::DateTime(date_time) => Some(*date_time),
        CellValue::Null => None,
        other => {
            let text = other.to_string();
            let text = text.trim();
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, format)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
    }
}

/// Compare two non-empty values chronologically.
///
/// Unparsable values go after parsable ones in both directions; two
/// unparsable values have no preference.
pub(super) fn compare(
    a: &CellValue,
    b: &CellValue,
    format: &str,
    direction: SortDirection,
) -> Ordering {
    match (parse_date(a, format), parse_date(b, format)) {
        (Some(a), Some(b)) => direction.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
