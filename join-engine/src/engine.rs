//! FILENAME: join-engine/src/engine.rs
//! Join Engine - merges two sources' rows on paired key columns.
//!
//! Algorithm:
//! 1. Validate the key pairs (indices on both sides, equal column types)
//!    before any row is processed
//! 2. Index the right source's rows by their key tuple
//! 3. Walk the left rows in order, emitting one merged row per match; under
//!    left/full semantics an unmatched left row is emitted with the right
//!    side null
//! 4. Under right/full semantics, append the never-matched right rows in
//!    right order, with the shared key columns carrying the right key
//!    values and the remaining left columns null

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use datatable::{
    validate_column_index, Column, DataError, DataResult, DataSource, Table, Value, ValueKey,
};

/// The four join semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinMode {
    fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinMode::Left | JoinMode::Full)
    }

    fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinMode::Right | JoinMode::Full)
    }
}

type JoinKey = SmallVec<[ValueKey; 4]>;

/// Joins `left` and `right` on the paired key columns. Output columns are
/// all left columns followed by the right source's non-key columns (the
/// right key columns are never duplicated: on matched rows they equal the
/// left keys, and on right-only rows the shared key columns carry the right
/// key values).
pub fn join(
    left: &dyn DataSource,
    right: &dyn DataSource,
    mode: JoinMode,
    keys: &[(usize, usize)],
) -> DataResult<Table> {
    for &(left_col, right_col) in keys {
        validate_column_index(left, left_col)?;
        validate_column_index(right, right_col)?;
        let left_type = left.column_type(left_col)?;
        let right_type = right.column_type(right_col)?;
        if left_type != right_type {
            return Err(DataError::TypeMismatch {
                expected: left_type,
                found: right_type.to_string(),
            });
        }
    }

    let right_key_cols: Vec<usize> = keys.iter().map(|&(_, r)| r).collect();
    let right_value_cols: Vec<usize> =
        (0..right.num_columns()).filter(|c| !right_key_cols.contains(c)).collect();

    let mut output = build_output_schema(left, right, &right_value_cols)?;

    // Index right rows by key tuple, in right-table order.
    let mut right_index: FxHashMap<JoinKey, Vec<usize>> = FxHashMap::default();
    for row in 0..right.num_rows() {
        let key = row_key(right, row, &right_key_cols)?;
        right_index.entry(key).or_default().push(row);
    }
    let mut right_matched = vec![false; right.num_rows()];

    // Left-driven pass: matched rows, interleaved with left-only rows.
    let left_key_cols: Vec<usize> = keys.iter().map(|&(l, _)| l).collect();
    for row in 0..left.num_rows() {
        let key = row_key(left, row, &left_key_cols)?;
        match right_index.get(&key) {
            Some(matches) => {
                for &right_row in matches {
                    right_matched[right_row] = true;
                    let mut values = left_row_values(left, row)?;
                    for &col in &right_value_cols {
                        values.push(right.value(right_row, col)?);
                    }
                    output.add_row(values)?;
                }
            }
            None if mode.keeps_unmatched_left() => {
                let mut values = left_row_values(left, row)?;
                values.resize(values.len() + right_value_cols.len(), Value::Null);
                output.add_row(values)?;
            }
            None => {}
        }
    }

    // Right-only pass: key columns carry the right key values, the other
    // left columns stay null.
    if mode.keeps_unmatched_right() {
        for row in 0..right.num_rows() {
            if right_matched[row] {
                continue;
            }
            let mut values = vec![Value::Null; left.num_columns()];
            for &(left_col, right_col) in keys {
                values[left_col] = right.value(row, right_col)?;
            }
            for &col in &right_value_cols {
                values.push(right.value(row, col)?);
            }
            output.add_row(values)?;
        }
    }

    Ok(output)
}

fn build_output_schema(
    left: &dyn DataSource,
    right: &dyn DataSource,
    right_value_cols: &[usize],
) -> DataResult<Table> {
    let mut output = Table::new();
    for col in 0..left.num_columns() {
        let column = column_descriptor(left, col, &output)?;
        output.add_column_with(column)?;
    }
    for &col in right_value_cols {
        let column = column_descriptor(right, col, &output)?;
        output.add_column_with(column)?;
    }
    Ok(output)
}

/// Clones a source column's metadata; a non-empty id already taken in the
/// output is dropped rather than duplicated.
fn column_descriptor(
    source: &dyn DataSource,
    col: usize,
    output: &Table,
) -> DataResult<Column> {
    let mut column = Column::new(source.column_type(col)?);
    column.label = source.column_label(col)?;
    column.pattern = source.column_pattern(col)?;
    column.role = source.column_role(col)?;
    let id = source.column_id(col)?;
    if !id.is_empty() && output.column_index_by_id(&id).is_none() {
        column.id = id;
    }
    Ok(column)
}

fn row_key(source: &dyn DataSource, row: usize, cols: &[usize]) -> DataResult<JoinKey> {
    let mut key = JoinKey::new();
    for &col in cols {
        key.push(ValueKey::from(&source.value(row, col)?));
    }
    Ok(key)
}

fn left_row_values(left: &dyn DataSource, row: usize) -> DataResult<Vec<Value>> {
    let mut values = Vec::with_capacity(left.num_columns());
    for col in 0..left.num_columns() {
        values.push(left.value(row, col)?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datatable::ColumnType;

    fn left_table() -> Table {
        Table::from_values(
            &[ColumnType::String, ColumnType::Number],
            vec![
                vec![Value::String("A".into()), Value::Number(1.0)],
                vec![Value::String("B".into()), Value::Number(2.0)],
                vec![Value::String("C".into()), Value::Number(3.0)],
            ],
        )
        .unwrap()
    }

    fn right_table() -> Table {
        Table::from_values(
            &[ColumnType::String, ColumnType::Number],
            vec![
                vec![Value::String("A".into()), Value::Number(10.0)],
                vec![Value::String("A".into()), Value::Number(11.0)],
                vec![Value::String("D".into()), Value::Number(40.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_inner_join_emits_one_row_per_match() {
        let joined = join(&left_table(), &right_table(), JoinMode::Inner, &[(0, 0)]).unwrap();
        // Only "A" matches, twice.
        assert_eq!(joined.num_rows(), 2);
        assert_eq!(joined.num_columns(), 3);
        assert_eq!(joined.value(0, 0).unwrap(), Value::String("A".into()));
        assert_eq!(joined.value(0, 2).unwrap(), Value::Number(10.0));
        assert_eq!(joined.value(1, 2).unwrap(), Value::Number(11.0));
    }

    #[test]
    fn test_left_join_pads_unmatched_left_rows() {
        let joined = join(&left_table(), &right_table(), JoinMode::Left, &[(0, 0)]).unwrap();
        assert_eq!(joined.num_rows(), 4);
        // Unmatched "B" keeps its left values, right side null.
        assert_eq!(joined.value(2, 0).unwrap(), Value::String("B".into()));
        assert_eq!(joined.value(2, 1).unwrap(), Value::Number(2.0));
        assert_eq!(joined.value(2, 2).unwrap(), Value::Null);
    }

    #[test]
    fn test_right_join_appends_right_only_rows() {
        let joined = join(&left_table(), &right_table(), JoinMode::Right, &[(0, 0)]).unwrap();
        assert_eq!(joined.num_rows(), 3);
        // The right-only "D" row carries its key in the shared key column.
        assert_eq!(joined.value(2, 0).unwrap(), Value::String("D".into()));
        assert_eq!(joined.value(2, 1).unwrap(), Value::Null);
        assert_eq!(joined.value(2, 2).unwrap(), Value::Number(40.0));
    }

    #[test]
    fn test_full_join_row_order() {
        let joined = join(&left_table(), &right_table(), JoinMode::Full, &[(0, 0)]).unwrap();
        let names: Vec<Value> = (0..joined.num_rows())
            .map(|r| joined.value(r, 0).unwrap())
            .collect();
        // Left-driven rows in left order, then right-only rows.
        assert_eq!(
            names,
            vec![
                Value::String("A".into()),
                Value::String("A".into()),
                Value::String("B".into()),
                Value::String("C".into()),
                Value::String("D".into()),
            ]
        );
    }

    #[test]
    fn test_key_type_mismatch_fails_before_processing() {
        let right = Table::from_values(
            &[ColumnType::Number],
            vec![vec![Value::Number(1.0)]],
        )
        .unwrap();
        assert_eq!(
            join(&left_table(), &right, JoinMode::Inner, &[(0, 0)]),
            Err(DataError::TypeMismatch {
                expected: ColumnType::String,
                found: "number".to_string(),
            })
        );
    }

    #[test]
    fn test_multi_key_join() {
        let left = Table::from_values(
            &[ColumnType::String, ColumnType::Number, ColumnType::Number],
            vec![
                vec![Value::String("A".into()), Value::Number(1.0), Value::Number(100.0)],
                vec![Value::String("A".into()), Value::Number(2.0), Value::Number(200.0)],
            ],
        )
        .unwrap();
        let right = Table::from_values(
            &[ColumnType::String, ColumnType::Number, ColumnType::Boolean],
            vec![
                vec![Value::String("A".into()), Value::Number(2.0), Value::Boolean(true)],
            ],
        )
        .unwrap();

        let joined = join(&left, &right, JoinMode::Inner, &[(0, 0), (1, 1)]).unwrap();
        assert_eq!(joined.num_rows(), 1);
        assert_eq!(joined.value(0, 2).unwrap(), Value::Number(200.0));
        assert_eq!(joined.value(0, 3).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_null_keys_match_each_other() {
        let left = Table::from_values(
            &[ColumnType::String, ColumnType::Number],
            vec![vec![Value::Null, Value::Number(1.0)]],
        )
        .unwrap();
        let right = Table::from_values(
            &[ColumnType::String, ColumnType::Number],
            vec![vec![Value::Null, Value::Number(9.0)]],
        )
        .unwrap();
        let joined = join(&left, &right, JoinMode::Inner, &[(0, 0)]).unwrap();
        assert_eq!(joined.num_rows(), 1);
        assert_eq!(joined.value(0, 2).unwrap(), Value::Number(9.0));
    }

    #[test]
    fn test_inner_key_equality_and_left_row_count_properties() {
        let left = left_table();
        let right = right_table();

        let inner = join(&left, &right, JoinMode::Inner, &[(0, 0)]).unwrap();
        // Key column values on every inner row came from both sides equal.
        for row in 0..inner.num_rows() {
            assert_eq!(inner.value(row, 0).unwrap(), Value::String("A".into()));
        }

        let left_join = join(&left, &right, JoinMode::Left, &[(0, 0)]).unwrap();
        assert!(left_join.num_rows() >= left.num_rows());
    }
}
