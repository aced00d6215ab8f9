use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sql_splitter::dialect::DialectKind;
use sql_splitter::key::{split_range, ArithUuid, KeyValue};
use sql_splitter::query::{Compiler, Expr, TableExpr};
use sql_splitter::tableschema::ColumnType;
use std::hint::black_box;

fn checksum_query_for(num_columns: usize) -> String {
    let dialect = DialectKind::DuckDb.dialect();
    let mut compiler = Compiler::new(dialect.as_ref());

    let parts: Vec<(Expr, ColumnType)> = (0..num_columns)
        .map(|i| (Expr::column(format!("col_{i}")), ColumnType::Text))
        .collect();

    let table = TableExpr::path(&["t"]).select(vec![Expr::row_checksum(parts).alias("checksum")]);

    compiler.compile_root(&table)
}

fn bench_checksum_query_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum_query_compilation");

    for num_columns in [1, 4, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("compile", num_columns),
            &num_columns,
            |b, &num_columns| {
                b.iter(|| black_box(checksum_query_for(num_columns)))
            },
        );
    }

    group.finish();
}

fn bench_int_key_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_mesh_construction");

    for factor in [4, 32, 256] {
        group.bench_with_input(BenchmarkId::new("int_split_range", factor), &factor, |b, &factor| {
            b.iter(|| {
                let lo = KeyValue::Int(0);
                let hi = KeyValue::Int(1_000_000);
                black_box(split_range(&lo, &hi, factor).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_uuid_key_mesh(c: &mut Criterion) {
    let lo = KeyValue::Uuid(ArithUuid::parse("00000000-0000-0000-0000-000000000000").unwrap());
    let hi = KeyValue::Uuid(ArithUuid::parse("ffffffff-ffff-ffff-ffff-ffffffffffff").unwrap());

    c.bench_function("uuid_split_range_32", |b| {
        b.iter(|| black_box(split_range(&lo, &hi, 32).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_checksum_query_compilation,
    bench_int_key_mesh,
    bench_uuid_key_mesh,
);
criterion_main!(benches);
