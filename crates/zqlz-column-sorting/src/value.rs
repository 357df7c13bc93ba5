//! Cell values as seen by the sorting engine

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A grid cell value that can be compared by the sort strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// No value at all
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without timezone
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Check if the value carries no meaningful content.
    ///
    /// Only `Null` and the empty string count as empty; whitespace is content.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to interpret the value as a number.
    ///
    /// Text is accepted when it parses as an integer, or as a finite float,
    /// after trimming.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            CellValue::Int(v) => Some(Number::Int(*v)),
            CellValue::Float(v) if !v.is_nan() => Some(Number::Float(*v)),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().map(Number::Int).or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(Number::Float)
                })
            }
            _ => None,
        }
    }
}

/// Numeric view of a cell. Never NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Exact comparison; integers are never rounded through `f64`
    pub fn compare(&self, other: &Number) -> Ordering {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Number::Int(a), Number::Float(b)) => compare_int_float(a, b),
            (Number::Float(a), Number::Int(b)) => compare_int_float(b, a).reverse(),
        }
    }
}

fn compare_int_float(int: i64, float: f64) -> Ordering {
    // 2^63, the first float past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        other => other,
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
            CellValue::Date(v) => write!(f, "{}", v),
            CellValue::DateTime(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(CellValue::Null.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Text(" ".to_string()).is_empty());
        assert!(!CellValue::Int(0).is_empty());
        assert!(!CellValue::Bool(false).is_empty());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::Int(4).as_number(), Some(Number::Int(4)));
        assert_eq!(CellValue::from(" 42 ").as_number(), Some(Number::Int(42)));
        assert_eq!(CellValue::from(" 2.5 ").as_number(), Some(Number::Float(2.5)));
        assert_eq!(CellValue::from("abc").as_number(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_number(), None);
        assert_eq!(CellValue::from("inf").as_number(), None);
    }

    #[test]
    fn test_mixed_number_comparison_is_exact() {
        let two_53 = 9_007_199_254_740_992_i64;
        let float = Number::Float(two_53 as f64);

        assert_eq!(Number::Int(two_53).compare(&float), Ordering::Equal);
        assert_eq!(Number::Int(two_53 + 1).compare(&float), Ordering::Greater);
        assert_eq!(float.compare(&Number::Int(two_53 + 1)), Ordering::Less);
        assert_eq!(Number::Int(two_53).compare(&Number::Int(two_53 + 1)), Ordering::Less);

        assert_eq!(Number::Int(2).compare(&Number::Float(2.5)), Ordering::Less);
        assert_eq!(Number::Int(-2).compare(&Number::Float(-2.5)), Ordering::Greater);
        assert_eq!(Number::Int(i64::MAX).compare(&Number::Float(f64::INFINITY)), Ordering::Less);
        assert_eq!(Number::Int(i64::MIN).compare(&Number::Float(-9.3e18)), Ordering::Greater);
        assert_eq!(Number::Int(i64::MIN).compare(&Number::Float(i64::MIN as f64)), Ordering::Equal);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(3)), CellValue::Int(3));
    }
}
