//! FILENAME: datatable/src/value.rs
//! PURPOSE: The closed value and column-type model for the data engine.
//! CONTEXT: Every cell holds a `Value`; every column declares a `ColumnType`.
//! The column's declared type is the authoritative tag for validation, not
//! the runtime shape of the value (guards against ambiguous cases like
//! numeric strings).

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

// ============================================================================
// COLUMN TYPES
// ============================================================================

/// The closed enumeration of permitted column types.
///
/// Serialized as the lowercase tokens `string`, `number`, `boolean`, `date`,
/// `datetime`, `timeofday` (the same tokens accepted by [`ColumnType::from_str`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Date,
    DateTime,
    TimeOfDay,
}

impl ColumnType {
    /// The lowercase token for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::TimeOfDay => "timeofday",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ColumnType::String),
            "number" => Ok(ColumnType::Number),
            "boolean" => Ok(ColumnType::Boolean),
            "date" => Ok(ColumnType::Date),
            "datetime" => Ok(ColumnType::DateTime),
            "timeofday" => Ok(ColumnType::TimeOfDay),
            other => Err(DataError::InvalidType(other.to_string())),
        }
    }
}

// ============================================================================
// TIME OF DAY
// ============================================================================

/// A wall-clock time without a date: hour, minute, second and an optional
/// millisecond component. Ordering treats an absent millisecond as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub millis: Option<u32>,
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        TimeOfDay { hours, minutes, seconds, millis: None }
    }

    pub fn with_millis(hours: u32, minutes: u32, seconds: u32, millis: u32) -> Self {
        TimeOfDay { hours, minutes, seconds, millis: Some(millis) }
    }

    /// The ordered quadruple with millis defaulted to zero. Used for
    /// comparison and hashing so that `12:00:00` equals `12:00:00.000`.
    pub fn components(&self) -> (u32, u32, u32, u32) {
        (self.hours, self.minutes, self.seconds, self.millis.unwrap_or(0))
    }
}

impl Ord for TimeOfDay {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }
}

impl PartialOrd for TimeOfDay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// The tagged variant a cell stores. A single `Date` variant serves both the
/// `date` and `datetime` column types; the column type only drives formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    String(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    TimeOfDay(TimeOfDay),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the runtime variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::TimeOfDay(_) => "timeofday",
        }
    }

    /// Whether this value may be stored in a column of the given type.
    /// Null is compatible with every column type; a `Date` value is accepted
    /// by both `date` and `datetime` columns.
    pub fn conforms_to(&self, column_type: ColumnType) -> bool {
        match self {
            Value::Null => true,
            Value::String(_) => column_type == ColumnType::String,
            Value::Number(_) => column_type == ColumnType::Number,
            Value::Boolean(_) => column_type == ColumnType::Boolean,
            Value::Date(_) => {
                column_type == ColumnType::Date || column_type == ColumnType::DateTime
            }
            Value::TimeOfDay(_) => column_type == ColumnType::TimeOfDay,
        }
    }

    /// Rank of the variant for cross-variant comparison. Values in a
    /// validated column share a variant, so this only decides the order of
    /// mixed data.
    fn variant_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::String(_) => 1,
            Value::Number(_) => 2,
            Value::Boolean(_) => 3,
            Value::Date(_) => 4,
            Value::TimeOfDay(_) => 5,
        }
    }
}

/// Total order over values: null sorts before every non-null value, values
/// of the same variant compare naturally (numbers via IEEE total order), and
/// mixed variants fall back to a fixed variant rank.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::TimeOfDay(x), Value::TimeOfDay(y)) => x.cmp(y),
        _ => a.variant_rank().cmp(&b.variant_rank()),
    }
}

// ============================================================================
// HASHABLE VALUE KEYS
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// A normalized, hashable representation of a `Value`. Used as keys for
/// distinct-value extraction, group bucketing and join indexes. Null is an
/// ordinary key value, so nulls bucket together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    String(String),
    Number(OrderedFloat),
    Boolean(bool),
    Date(NaiveDateTime),
    TimeOfDay(u32, u32, u32, u32),
}

impl From<&Value> for ValueKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::String(s) => ValueKey::String(s.clone()),
            Value::Number(n) => ValueKey::Number(OrderedFloat(*n)),
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Date(d) => ValueKey::Date(*d),
            Value::TimeOfDay(t) => {
                let (h, m, s, ms) = t.components();
                ValueKey::TimeOfDay(h, m, s, ms)
            }
        }
    }
}
