//! FILENAME: group-engine/src/modifiers.rs
//! Built-in key modifiers.
//!
//! Modifiers transform a key column's value before bucketing. The built-ins
//! cover the common date truncations; arbitrary transforms plug in through
//! `KeyModifier::new`.

use chrono::{Datelike, NaiveDate, NaiveTime};

use datatable::{ColumnType, Value};

use crate::definition::KeyModifier;

/// Date value -> 1-based month number; null for everything else.
pub fn month(value: &Value) -> Value {
    match value {
        Value::Date(d) => Value::Number(f64::from(d.month())),
        _ => Value::Null,
    }
}

/// Date value -> year number; null for everything else.
pub fn year(value: &Value) -> Value {
    match value {
        Value::Date(d) => Value::Number(f64::from(d.year())),
        _ => Value::Null,
    }
}

/// Date value -> midnight of the first day of its month, so rows bucket per
/// calendar month while the key stays a date.
pub fn truncate_to_month(value: &Value) -> Value {
    match value {
        Value::Date(d) => match NaiveDate::from_ymd_opt(d.year(), d.month(), 1) {
            Some(first) => Value::Date(first.and_time(NaiveTime::MIN)),
            None => Value::Null,
        },
        _ => Value::Null,
    }
}

/// `month` packaged as a ready-to-use modifier.
pub fn month_modifier() -> KeyModifier {
    KeyModifier::new(ColumnType::Number, month)
}

/// `year` packaged as a ready-to-use modifier.
pub fn year_modifier() -> KeyModifier {
    KeyModifier::new(ColumnType::Number, year)
}

/// `truncate_to_month` packaged as a ready-to-use modifier.
pub fn truncate_to_month_modifier() -> KeyModifier {
    KeyModifier::new(ColumnType::Date, truncate_to_month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(13, 45, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_month_is_one_based() {
        assert_eq!(month(&date(2021, 1, 15)), Value::Number(1.0));
        assert_eq!(month(&date(2021, 12, 31)), Value::Number(12.0));
        assert_eq!(month(&Value::Null), Value::Null);
        assert_eq!(month(&Value::Number(3.0)), Value::Null);
    }

    #[test]
    fn test_truncate_to_month_drops_day_and_clock() {
        let expected = Value::Date(
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_time(NaiveTime::MIN),
        );
        assert_eq!(truncate_to_month(&date(2021, 6, 17)), expected);
        assert_eq!(truncate_to_month(&date(2021, 6, 1)), expected);
    }

    #[test]
    fn test_year() {
        assert_eq!(year(&date(1999, 2, 3)), Value::Number(1999.0));
    }
}
