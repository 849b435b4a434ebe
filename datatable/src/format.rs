//! FILENAME: datatable/src/format.rs
//! PURPOSE: Default display-string generation and the pluggable formatter boundary.
//! CONTEXT: Locale-aware formatting lives outside the engine; it plugs in
//! through `ValueFormatter`. When no formatter is registered for a column
//! type, the fixed type-specific defaults below apply.

use std::collections::HashMap;

use crate::value::{ColumnType, Value};

/// External formatting contract: given a value and the column's opaque
/// pattern hint, produce a display string.
pub trait ValueFormatter {
    fn format(&self, value: &Value, pattern: Option<&str>) -> String;
}

/// Produces the default display string for a value of the given column type.
/// Fixed rules: nulls render empty, numbers drop a trailing ".0", booleans
/// render "true"/"false", dates render ISO-like, `datetime` adds the clock.
pub fn default_formatted_value(column_type: ColumnType, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Date(d) => {
            // The column type decides whether the clock portion shows.
            if column_type == ColumnType::Date {
                d.format("%Y-%m-%d").to_string()
            } else {
                d.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
        Value::TimeOfDay(t) => match t.millis {
            Some(ms) => format!("{:02}:{:02}:{:02}.{:03}", t.hours, t.minutes, t.seconds, ms),
            None => format!("{:02}:{:02}:{:02}", t.hours, t.minutes, t.seconds),
        },
    }
}

/// Format a number without unnecessary decimal places.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// A set of pluggable formatters keyed by column type. Column types without
/// an entry fall back to [`default_formatted_value`].
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: HashMap<ColumnType, Box<dyn ValueFormatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the formatter used for every column of `column_type`.
    pub fn register(&mut self, column_type: ColumnType, formatter: Box<dyn ValueFormatter>) {
        self.formatters.insert(column_type, formatter);
    }

    pub fn format(&self, column_type: ColumnType, value: &Value, pattern: Option<&str>) -> String {
        match self.formatters.get(&column_type) {
            Some(formatter) => formatter.format(value, pattern),
            None => default_formatted_value(column_type, value),
        }
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("types", &self.formatters.keys().collect::<Vec<_>>())
            .finish()
    }
}
