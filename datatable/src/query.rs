//! FILENAME: datatable/src/query.rs
//! PURPOSE: Index/type validation and the read-only query utilities.
//! CONTEXT: These functions operate on any `DataSource`, so they serve
//! tables and views alike and underpin the group and join engines. None of
//! them mutate; sorting and filtering return row-index permutations and
//! subsets rather than rearranged data. Indices in specs are never clamped:
//! an out-of-range sort/filter column is an error.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};
use crate::source::DataSource;
use crate::value::{compare_values, ColumnType, Value, ValueKey};

// ============================================================================
// VALIDATION
// ============================================================================

/// Fails with `IndexOutOfRange` unless `row` addresses an existing row.
pub fn validate_row_index(source: &dyn DataSource, row: usize) -> DataResult<()> {
    let len = source.num_rows();
    if row >= len {
        return Err(DataError::row_out_of_range(row, len));
    }
    Ok(())
}

/// Fails with `IndexOutOfRange` unless `col` addresses an existing column.
pub fn validate_column_index(source: &dyn DataSource, col: usize) -> DataResult<()> {
    let len = source.num_columns();
    if col >= len {
        return Err(DataError::column_out_of_range(col, len));
    }
    Ok(())
}

/// Fails with `TypeMismatch` when a non-null value does not conform to the
/// declared column type. Null is compatible with every type.
pub fn validate_type_match(column_type: ColumnType, value: &Value) -> DataResult<()> {
    if value.conforms_to(column_type) {
        Ok(())
    } else {
        Err(DataError::TypeMismatch {
            expected: column_type,
            found: value.kind_name().to_string(),
        })
    }
}

// ============================================================================
// DISTINCT VALUES AND RANGES
// ============================================================================

/// The distinct values of a column in first-occurrence order. Null counts as
/// a value and appears at the position of its first occurrence.
pub fn distinct_values(source: &dyn DataSource, col: usize) -> DataResult<Vec<Value>> {
    validate_column_index(source, col)?;
    let mut seen: HashSet<ValueKey> = HashSet::new();
    let mut distinct = Vec::new();
    for row in 0..source.num_rows() {
        let value = source.value(row, col)?;
        if seen.insert(ValueKey::from(&value)) {
            distinct.push(value);
        }
    }
    Ok(distinct)
}

/// Extremes of a column's non-null values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRange {
    pub min: Value,
    pub max: Value,
}

/// The minimum and maximum non-null value of a column, or None when the
/// column holds no non-null values.
pub fn column_range(source: &dyn DataSource, col: usize) -> DataResult<Option<ColumnRange>> {
    validate_column_index(source, col)?;
    let mut range: Option<ColumnRange> = None;
    for row in 0..source.num_rows() {
        let value = source.value(row, col)?;
        if value.is_null() {
            continue;
        }
        match &mut range {
            None => {
                range = Some(ColumnRange { min: value.clone(), max: value });
            }
            Some(r) => {
                if compare_values(&value, &r.min) == Ordering::Less {
                    r.min = value.clone();
                }
                if compare_values(&value, &r.max) == Ordering::Greater {
                    r.max = value;
                }
            }
        }
    }
    Ok(range)
}

// ============================================================================
// SORTING
// ============================================================================

/// One sort key: a column index and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: usize,
    #[serde(default)]
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(column: usize) -> Self {
        SortSpec { column, descending: false }
    }

    pub fn descending(column: usize) -> Self {
        SortSpec { column, descending: true }
    }
}

/// A stable permutation of row indices ordered by the sort keys in priority
/// order. Ties keep original row order. Null sorts before every non-null
/// value of the same column regardless of direction.
pub fn sorted_rows(source: &dyn DataSource, specs: &[SortSpec]) -> DataResult<Vec<usize>> {
    for spec in specs {
        validate_column_index(source, spec.column)?;
    }

    // Materialize the key columns once so the comparator stays infallible.
    let mut key_columns: Vec<Vec<Value>> = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut column = Vec::with_capacity(source.num_rows());
        for row in 0..source.num_rows() {
            column.push(source.value(row, spec.column)?);
        }
        key_columns.push(column);
    }

    let mut indices: Vec<usize> = (0..source.num_rows()).collect();
    indices.sort_by(|&a, &b| {
        for (spec, column) in specs.iter().zip(&key_columns) {
            let ordering = compare_for_sort(&column[a], &column[b], spec.descending);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(indices)
}

/// Direction-aware comparison with null pinned first in both directions.
fn compare_for_sort(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let ordering = compare_values(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

// ============================================================================
// FILTERING
// ============================================================================

/// One filter predicate over a single column. Every populated constraint
/// must hold for a row to pass this spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: usize,

    /// Exact-value constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Inclusive lower bound; null cell values never satisfy it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,

    /// Inclusive upper bound; null cell values never satisfy it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,

    /// Membership constraint: the cell value must be one of these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl FilterSpec {
    pub fn exact(column: usize, value: Value) -> Self {
        FilterSpec { column, value: Some(value), min: None, max: None, values: None }
    }

    pub fn range(column: usize, min: Option<Value>, max: Option<Value>) -> Self {
        FilterSpec { column, value: None, min, max, values: None }
    }

    pub fn one_of(column: usize, values: Vec<Value>) -> Self {
        FilterSpec { column, value: None, min: None, max: None, values: Some(values) }
    }
}

/// The indices of rows satisfying every filter spec (logical AND), in
/// original row order.
pub fn filtered_rows(source: &dyn DataSource, specs: &[FilterSpec]) -> DataResult<Vec<usize>> {
    for spec in specs {
        validate_column_index(source, spec.column)?;
    }

    let mut matching = Vec::new();
    for row in 0..source.num_rows() {
        let mut passes = true;
        for spec in specs {
            let value = source.value(row, spec.column)?;
            if !filter_matches(spec, &value) {
                passes = false;
                break;
            }
        }
        if passes {
            matching.push(row);
        }
    }
    Ok(matching)
}

fn filter_matches(spec: &FilterSpec, value: &Value) -> bool {
    if let Some(expected) = &spec.value {
        if ValueKey::from(value) != ValueKey::from(expected) {
            return false;
        }
    }
    if let Some(min) = &spec.min {
        if value.is_null() || compare_values(value, min) == Ordering::Less {
            return false;
        }
    }
    if let Some(max) = &spec.max {
        if value.is_null() || compare_values(value, max) == Ordering::Greater {
            return false;
        }
    }
    if let Some(allowed) = &spec.values {
        let key = ValueKey::from(value);
        if !allowed.iter().any(|v| ValueKey::from(v) == key) {
            return false;
        }
    }
    true
}
