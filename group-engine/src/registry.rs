//! FILENAME: group-engine/src/registry.rs
//! The aggregation registry - how group values are reduced.
//!
//! Each registered aggregator maps a kind name ("sum", "count", ...) to a
//! reduce function over the value array of one group, plus the policy for
//! its output column type. The registry ships with the five built-in kinds
//! and accepts custom entries.

use rustc_hash::FxHashMap;

use datatable::{compare_values, ColumnType, Value};

/// How an aggregation kind determines its output column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Always this type, regardless of the input column (e.g. count).
    Fixed(ColumnType),
    /// The input column's own type (e.g. min/max).
    SameAsInput,
}

/// A registered aggregation kind.
pub struct Aggregator {
    output_type: OutputType,
    /// Whether the input column must be a number column (sum, avg).
    numeric_only: bool,
    reduce: Box<dyn Fn(&[Value]) -> Value>,
}

impl Aggregator {
    pub fn new(
        output_type: OutputType,
        numeric_only: bool,
        reduce: impl Fn(&[Value]) -> Value + 'static,
    ) -> Self {
        Aggregator { output_type, numeric_only, reduce: Box::new(reduce) }
    }

    pub fn output_type(&self, input_type: ColumnType) -> ColumnType {
        match self.output_type {
            OutputType::Fixed(t) => t,
            OutputType::SameAsInput => input_type,
        }
    }

    pub fn numeric_only(&self) -> bool {
        self.numeric_only
    }

    /// Reduces the values of one group (all rows, nulls included) to the
    /// aggregated output value.
    pub fn reduce(&self, values: &[Value]) -> Value {
        (self.reduce)(values)
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("output_type", &self.output_type)
            .field("numeric_only", &self.numeric_only)
            .finish()
    }
}

/// Kind-name to aggregator mapping. `Default` carries the built-ins.
pub struct AggregationRegistry {
    entries: FxHashMap<String, Aggregator>,
}

impl AggregationRegistry {
    /// An empty registry with no kinds at all.
    pub fn empty() -> Self {
        AggregationRegistry { entries: FxHashMap::default() }
    }

    /// Registers or replaces a kind.
    pub fn register(&mut self, kind: impl Into<String>, aggregator: Aggregator) {
        self.entries.insert(kind.into(), aggregator);
    }

    pub fn get(&self, kind: &str) -> Option<&Aggregator> {
        self.entries.get(kind)
    }
}

impl Default for AggregationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "count",
            Aggregator::new(OutputType::Fixed(ColumnType::Number), false, |values| {
                Value::Number(values.len() as f64)
            }),
        );
        registry.register(
            "sum",
            Aggregator::new(OutputType::Fixed(ColumnType::Number), true, |values| {
                let nums = numeric_values(values);
                if nums.is_empty() {
                    Value::Null
                } else {
                    Value::Number(nums.iter().sum())
                }
            }),
        );
        registry.register(
            "avg",
            Aggregator::new(OutputType::Fixed(ColumnType::Number), true, |values| {
                let nums = numeric_values(values);
                if nums.is_empty() {
                    Value::Null
                } else {
                    Value::Number(nums.iter().sum::<f64>() / nums.len() as f64)
                }
            }),
        );
        registry.register(
            "min",
            Aggregator::new(OutputType::SameAsInput, false, |values| extreme(values, true)),
        );
        registry.register(
            "max",
            Aggregator::new(OutputType::SameAsInput, false, |values| extreme(values, false)),
        );
        registry
    }
}

impl std::fmt::Debug for AggregationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationRegistry")
            .field("kinds", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The non-null numeric values of a group.
fn numeric_values(values: &[Value]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

/// Smallest or largest non-null value; null when the group holds none.
fn extreme(values: &[Value], smallest: bool) -> Value {
    let mut best: Option<&Value> = None;
    for value in values {
        if value.is_null() {
            continue;
        }
        match best {
            None => best = Some(value),
            Some(current) => {
                let ordering = compare_values(value, current);
                if (smallest && ordering == std::cmp::Ordering::Less)
                    || (!smallest && ordering == std::cmp::Ordering::Greater)
                {
                    best = Some(value);
                }
            }
        }
    }
    best.cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_includes_nulls() {
        let registry = AggregationRegistry::default();
        let count = registry.get("count").unwrap();
        let values = vec![Value::Number(1.0), Value::Null, Value::Number(2.0)];
        assert_eq!(count.reduce(&values), Value::Number(3.0));
    }

    #[test]
    fn test_sum_and_avg_skip_nulls() {
        let registry = AggregationRegistry::default();
        let values = vec![Value::Number(1.0), Value::Null, Value::Number(3.0)];
        assert_eq!(registry.get("sum").unwrap().reduce(&values), Value::Number(4.0));
        assert_eq!(registry.get("avg").unwrap().reduce(&values), Value::Number(2.0));

        let all_null = vec![Value::Null, Value::Null];
        assert_eq!(registry.get("sum").unwrap().reduce(&all_null), Value::Null);
        assert_eq!(registry.get("avg").unwrap().reduce(&all_null), Value::Null);
    }

    #[test]
    fn test_min_max_work_on_any_orderable_type() {
        let registry = AggregationRegistry::default();
        let values = vec![
            Value::String("pear".into()),
            Value::Null,
            Value::String("apple".into()),
        ];
        assert_eq!(
            registry.get("min").unwrap().reduce(&values),
            Value::String("apple".into())
        );
        assert_eq!(
            registry.get("max").unwrap().reduce(&values),
            Value::String("pear".into())
        );
    }

    #[test]
    fn test_output_type_policies() {
        let registry = AggregationRegistry::default();
        assert_eq!(
            registry.get("count").unwrap().output_type(ColumnType::String),
            ColumnType::Number
        );
        assert_eq!(
            registry.get("min").unwrap().output_type(ColumnType::Date),
            ColumnType::Date
        );
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = AggregationRegistry::default();
        registry.register(
            "first",
            Aggregator::new(OutputType::SameAsInput, false, |values| {
                values.first().cloned().unwrap_or(Value::Null)
            }),
        );
        let values = vec![Value::String("x".into()), Value::String("y".into())];
        assert_eq!(
            registry.get("first").unwrap().reduce(&values),
            Value::String("x".into())
        );
        assert!(registry.get("median").is_none());
    }
}
