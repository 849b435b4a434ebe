//! FILENAME: group-engine/benches/group_calculations.rs
//! Benchmarks for the group engine's bucketing pass.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use datatable::{ColumnType, Table, Value};
use group_engine::{group, AggregationColumn, GroupKeyColumn};

fn build_table(rows: usize, keys: usize) -> Table {
    Table::from_values(
        &[ColumnType::String, ColumnType::Number, ColumnType::Number],
        (0..rows)
            .map(|i| {
                vec![
                    Value::String(format!("key-{}", i % keys)),
                    Value::Number((i % 50) as f64),
                    Value::Number(i as f64),
                ]
            })
            .collect(),
    )
    .expect("table build")
}

fn bench_group(c: &mut Criterion) {
    let small = build_table(1_000, 10);
    let large = build_table(100_000, 500);

    c.bench_function("group_1k_rows_10_keys", |b| {
        b.iter(|| {
            group(
                black_box(&small),
                &[GroupKeyColumn::new(0)],
                &[AggregationColumn::sum(2), AggregationColumn::count(1)],
            )
            .expect("group")
        })
    });

    c.bench_function("group_100k_rows_500_keys", |b| {
        b.iter(|| {
            group(
                black_box(&large),
                &[GroupKeyColumn::new(0)],
                &[
                    AggregationColumn::sum(2),
                    AggregationColumn::avg(2),
                    AggregationColumn::max(1),
                ],
            )
            .expect("group")
        })
    });

    c.bench_function("group_multi_key_100k_rows", |b| {
        b.iter(|| {
            group(
                black_box(&large),
                &[GroupKeyColumn::new(0), GroupKeyColumn::new(1)],
                &[AggregationColumn::count(2)],
            )
            .expect("group")
        })
    });
}

criterion_group!(benches, bench_group);
criterion_main!(benches);
