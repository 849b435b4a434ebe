//! FILENAME: group-engine/src/definition.rs
//! Group operation descriptors - what a grouping IS.
//!
//! A group operation is described by an ordered list of key columns (each
//! optionally transformed by a modifier before bucketing) and an ordered
//! list of aggregation columns. The descriptors are transient inputs, not
//! long-lived entities.

use datatable::{ColumnType, Value};

/// A transform applied to a key column's value before bucketing, together
/// with the column type its output carries (e.g. a date-to-month modifier
/// declares a number output).
pub struct KeyModifier {
    output_type: ColumnType,
    apply: Box<dyn Fn(&Value) -> Value>,
}

impl KeyModifier {
    pub fn new(output_type: ColumnType, apply: impl Fn(&Value) -> Value + 'static) -> Self {
        KeyModifier { output_type, apply: Box::new(apply) }
    }

    pub fn output_type(&self) -> ColumnType {
        self.output_type
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.apply)(value)
    }
}

impl std::fmt::Debug for KeyModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyModifier").field("output_type", &self.output_type).finish()
    }
}

/// One key column of a group operation.
#[derive(Debug)]
pub struct GroupKeyColumn {
    /// Source column index.
    pub column: usize,

    /// Optional transform applied before bucketing.
    pub modifier: Option<KeyModifier>,

    /// Output label override; defaults to the source column's label.
    pub label: Option<String>,
}

impl GroupKeyColumn {
    pub fn new(column: usize) -> Self {
        GroupKeyColumn { column, modifier: None, label: None }
    }

    pub fn with_modifier(column: usize, modifier: KeyModifier) -> Self {
        GroupKeyColumn { column, modifier: Some(modifier), label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// One aggregation column of a group operation: which source column to
/// reduce, under which registered aggregation kind.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AggregationColumn {
    /// Source column index.
    pub column: usize,

    /// Registered aggregation kind name.
    pub kind: String,

    /// Output label override; defaults to the source column's label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AggregationColumn {
    pub fn new(column: usize, kind: impl Into<String>) -> Self {
        AggregationColumn { column, kind: kind.into(), label: None }
    }

    pub fn sum(column: usize) -> Self {
        Self::new(column, "sum")
    }

    pub fn count(column: usize) -> Self {
        Self::new(column, "count")
    }

    pub fn avg(column: usize) -> Self {
        Self::new(column, "avg")
    }

    pub fn min(column: usize) -> Self {
        Self::new(column, "min")
    }

    pub fn max(column: usize) -> Self {
        Self::new(column, "max")
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
