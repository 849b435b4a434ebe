//! FILENAME: group-engine/src/engine.rs
//! Group Engine - buckets rows by composite key and reduces value columns.
//!
//! Algorithm:
//! 1. Validate every descriptor (indices, aggregation kinds, numeric-only
//!    kinds over number columns) before touching any row
//! 2. Scan rows once, computing each row's composite key from the modified
//!    key-column values; equal keys share one bucket, first occurrence
//!    fixes the bucket's output position
//! 3. For each bucket, reduce every aggregation column's value array
//! 4. Assemble the output table: key columns first, aggregation columns
//!    after, rows in first-occurrence order

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use datatable::{
    Column, ColumnType, DataError, DataResult, DataSource, Table, Value, ValueKey,
};

use crate::definition::{AggregationColumn, GroupKeyColumn};
use crate::registry::{AggregationRegistry, Aggregator};

/// Composite bucketing key; groups rarely use more than a few key columns.
type GroupKey = SmallVec<[ValueKey; 4]>;

/// Groups `source` rows on the key columns and reduces the aggregation
/// columns, using the built-in aggregation kinds.
pub fn group(
    source: &dyn DataSource,
    keys: &[GroupKeyColumn],
    aggregations: &[AggregationColumn],
) -> DataResult<Table> {
    group_with(&AggregationRegistry::default(), source, keys, aggregations)
}

/// Like [`group`], resolving aggregation kinds against a caller-supplied
/// registry. All validation happens before any row is processed: an unknown
/// kind fails with `UnsupportedAggregation`, a numeric-only kind over a
/// non-number column with `TypeMismatch`.
pub fn group_with(
    registry: &AggregationRegistry,
    source: &dyn DataSource,
    keys: &[GroupKeyColumn],
    aggregations: &[AggregationColumn],
) -> DataResult<Table> {
    for key in keys {
        datatable::validate_column_index(source, key.column)?;
    }
    let mut aggregators: Vec<&Aggregator> = Vec::with_capacity(aggregations.len());
    for agg in aggregations {
        datatable::validate_column_index(source, agg.column)?;
        let aggregator = registry
            .get(&agg.kind)
            .ok_or_else(|| DataError::UnsupportedAggregation(agg.kind.clone()))?;
        let input_type = source.column_type(agg.column)?;
        if aggregator.numeric_only() && input_type != ColumnType::Number {
            return Err(DataError::TypeMismatch {
                expected: ColumnType::Number,
                found: input_type.to_string(),
            });
        }
        aggregators.push(aggregator);
    }

    // One pass: bucket rows by composite key, first occurrence fixes order.
    let mut bucket_of: FxHashMap<GroupKey, usize> = FxHashMap::default();
    let mut bucket_keys: Vec<Vec<Value>> = Vec::new();
    let mut bucket_rows: Vec<Vec<usize>> = Vec::new();
    for row in 0..source.num_rows() {
        let mut key_values = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = source.value(row, key.column)?;
            let value = match &key.modifier {
                Some(modifier) => modifier.apply(&raw),
                None => raw,
            };
            key_values.push(value);
        }
        let composite: GroupKey = key_values.iter().map(ValueKey::from).collect();
        match bucket_of.get(&composite) {
            Some(&bucket) => bucket_rows[bucket].push(row),
            None => {
                bucket_of.insert(composite, bucket_keys.len());
                bucket_keys.push(key_values);
                bucket_rows.push(vec![row]);
            }
        }
    }

    // Output schema: key columns (modifier output type when modified),
    // then one column per aggregation. Ids are not carried over.
    let mut output = Table::new();
    for key in keys {
        let column_type = match &key.modifier {
            Some(modifier) => modifier.output_type(),
            None => source.column_type(key.column)?,
        };
        let label = match &key.label {
            Some(label) => label.clone(),
            None => source.column_label(key.column)?,
        };
        output.add_column_with(Column::new(column_type).with_label(label))?;
    }
    for (agg, aggregator) in aggregations.iter().zip(&aggregators) {
        let input_type = source.column_type(agg.column)?;
        let label = match &agg.label {
            Some(label) => label.clone(),
            None => source.column_label(agg.column)?,
        };
        output.add_column_with(Column::new(aggregator.output_type(input_type)).with_label(label))?;
    }

    for (key_values, rows) in bucket_keys.into_iter().zip(&bucket_rows) {
        let mut out_row = key_values;
        for (agg, aggregator) in aggregations.iter().zip(&aggregators) {
            let mut values = Vec::with_capacity(rows.len());
            for &row in rows {
                values.push(source.value(row, agg.column)?);
            }
            out_row.push(aggregator.reduce(&values));
        }
        output.add_row(out_row)?;
    }
    Ok(output)
}
