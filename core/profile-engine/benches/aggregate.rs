//! FILENAME: core/profile-engine/benches/aggregate.rs
//! Aggregation throughput over low- and high-cardinality columns.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use profile_engine::{Aggregator, RawRow, Value};

fn build_rows(rows: usize, distinct: usize) -> Vec<RawRow> {
    (0..rows)
        .map(|i| {
            let primary = if i % 50 == 0 {
                Value::Null
            } else {
                Value::Text(format!("key-{}", i % distinct))
            };
            let secondary = if i % 3 == 0 {
                Value::Null
            } else {
                Value::Integer((i % 90) as i64)
            };
            RawRow { primary, secondary }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let aggregator = Aggregator::default();
    let mut group = c.benchmark_group("aggregate");

    for &(rows, distinct) in &[(100_000, 20), (100_000, 5_000), (1_000_000, 100_000)] {
        let data = build_rows(rows, distinct);
        group.bench_with_input(
            BenchmarkId::new(format!("{}_rows", rows), distinct),
            &data,
            |b, data| b.iter(|| aggregator.aggregate(black_box(data))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
