//! Generic comparison: natural ordering inferred from the values themselves

use std::cmp::Ordering;

use crate::value::CellValue;

/// Ascending comparison of two non-empty values.
///
/// Numbers (and numeric text) come before anything that is not a number.
/// Text compares case-insensitively.
pub(super) fn compare(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Bool(a), CellValue::Bool(b)) => return a.cmp(b),
        (CellValue::Date(a), CellValue::Date(b)) => return a.cmp(b),
        (CellValue::DateTime(a), CellValue::DateTime(b)) => return a.cmp(b),
        _ => {}
    }

    match (a.as_number(), b.as_number()) {
        (Some(a), Some(b)) => a.compare(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(a, b),
    }
}

fn compare_text(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        _ => a
            .to_string()
            .to_lowercase()
            .cmp(&b.to_string().to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_numbers() {
        assert_eq!(compare(&CellValue::Int(2), &CellValue::Int(10)), Ordering::Less);
        assert_eq!(compare(&CellValue::Float(2.5), &CellValue::Int(2)), Ordering::Greater);
        assert_eq!(compare(&CellValue::Int(i64::MAX), &CellValue::Int(i64::MAX - 1)), Ordering::Greater);
    }

    #[test]
    fn test_numeric_text_compares_as_number() {
        assert_eq!(compare(&CellValue::from("10"), &CellValue::from("9")), Ordering::Greater);
        assert_eq!(compare(&CellValue::from("10"), &CellValue::Int(10)), Ordering::Equal);
    }

    #[test]
    fn test_large_integers_stay_transitive() {
        let two_53 = 9_007_199_254_740_992_i64;
        let float = CellValue::Float(two_53 as f64);
        let low = CellValue::Int(two_53);
        let high = CellValue::Int(two_53 + 1);

        assert_eq!(compare(&low, &float), Ordering::Equal);
        assert_eq!(compare(&high, &float), Ordering::Greater);
        assert_eq!(compare(&low, &high), Ordering::Less);
        assert_eq!(compare(&CellValue::from("9007199254740993"), &low), Ordering::Greater);
    }

    #[test]
    fn test_numbers_before_text() {
        assert_eq!(compare(&CellValue::Int(100), &CellValue::from("abc")), Ordering::Less);
        assert_eq!(compare(&CellValue::from("abc"), &CellValue::Float(0.5)), Ordering::Greater);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        assert_eq!(compare(&CellValue::from("apple"), &CellValue::from("Banana")), Ordering::Less);
        assert_eq!(compare(&CellValue::from("ABC"), &CellValue::from("abc")), Ordering::Equal);
        assert_eq!(compare(&CellValue::from("Émile"), &CellValue::from("émile")), Ordering::Equal);
    }

    #[test]
    fn test_bools_and_dates() {
        assert_eq!(compare(&CellValue::Bool(false), &CellValue::Bool(true)), Ordering::Less);
        let earlier = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(
            compare(&CellValue::Date(later), &CellValue::Date(earlier)),
            Ordering::Greater
        );
    }
}
