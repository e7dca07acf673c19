//! Benchmark suite for resolution plan construction.
//!
//! Measures the cost of building resolution plans for:
//! - Wide records (many fields)
//! - Deeply nested records
//! - Recursive records
//! - Union-heavy schemas

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use flightplan::{parse_schema, resolve, AvroSchema, FieldSchema, RecordSchema};

/// A flat record with `width` long fields.
fn wide_record(width: usize) -> AvroSchema {
    let fields = (0..width)
        .map(|i| FieldSchema::new(format!("field_{}", i), AvroSchema::Long))
        .collect();
    AvroSchema::Record(RecordSchema::new("Wide", fields))
}

/// A chain of records nested `depth` levels deep.
fn deep_record(depth: usize) -> AvroSchema {
    let mut schema = AvroSchema::Int;
    for i in 0..depth {
        schema = AvroSchema::Record(RecordSchema::new(
            format!("Level{}", i),
            vec![FieldSchema::new("inner", schema)],
        ));
    }
    schema
}

/// A self-referential record.
fn recursive_record() -> AvroSchema {
    parse_schema(
        r#"{
            "type": "record",
            "name": "Node",
            "fields": [
                {"name": "value", "type": "long"},
                {"name": "children", "type": {"type": "array", "items": "Node"}}
            ]
        }"#,
    )
    .expect("valid schema")
}

/// A record whose fields are all optional unions.
fn union_heavy_record(width: usize) -> AvroSchema {
    let fields = (0..width)
        .map(|i| {
            FieldSchema::new(
                format!("field_{}", i),
                AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::String]),
            )
        })
        .collect();
    AvroSchema::Record(RecordSchema::new("Optionals", fields))
}

fn bench_wide_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_wide_record");
    for width in [10, 100, 1000] {
        let schema = wide_record(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &schema, |b, schema| {
            b.iter(|| resolve(black_box(schema), black_box(schema)).unwrap())
        });
    }
    group.finish();
}

fn bench_deep_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_deep_record");
    for depth in [10, 50, 100] {
        let schema = deep_record(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &schema, |b, schema| {
            b.iter(|| resolve(black_box(schema), black_box(schema)).unwrap())
        });
    }
    group.finish();
}

fn bench_recursive_record(c: &mut Criterion) {
    let schema = recursive_record();
    c.bench_function("resolve_recursive_record", |b| {
        b.iter(|| resolve(black_box(&schema), black_box(&schema)).unwrap())
    });
}

fn bench_union_heavy(c: &mut Criterion) {
    let schema = union_heavy_record(100);
    c.bench_function("resolve_union_heavy_record", |b| {
        b.iter(|| resolve(black_box(&schema), black_box(&schema)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_wide_records,
    bench_deep_records,
    bench_recursive_record,
    bench_union_heavy
);
criterion_main!(benches);
