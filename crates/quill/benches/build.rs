use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quill::prelude::*;
use quill::{Insert, pg_quote_literal};
use std::sync::Arc;

/// Quotes like Postgres, never executes.
struct NullConnection;

#[async_trait]
impl Connection for NullConnection {
    async fn query(&self, _sql: &str) -> DbResult<ResultSet> {
        Ok(ResultSet::default())
    }

    fn quote(&self, raw: &str) -> String {
        pg_quote_literal(raw)
    }
}

fn conn() -> Arc<dyn Connection> {
    Arc::new(NullConnection)
}

/// SELECT col0, col1, ... FROM t WHERE col0 = 'v0' AND col1 = 'v1' ...
fn select_with_conditions(conn: &Arc<dyn Connection>, n: usize) -> Select {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut q = Select::with_connection("t", conn.clone()).columns(&column_refs);
    for (i, col) in columns.iter().enumerate() {
        q = q.where_equal(col, format!("v{i}"));
    }
    q
}

fn bench_select_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build/select");
    let conn = conn();

    for n in [1, 5, 10, 50, 100] {
        let q = select_with_conditions(&conn, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &q, |b, q| {
            b.iter(|| black_box(q.build()));
        });
    }

    group.finish();
}

fn bench_construct_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build/construct_and_build");
    let conn = conn();

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let q = select_with_conditions(&conn, n);
                black_box(q.build());
            });
        });
    }

    group.finish();
}

fn bench_where_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("build/where_in");
    let conn = conn();

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let q = Select::with_connection("t", conn.clone()).where_in("id", values.clone());
                black_box(q.build());
            });
        });
    }

    group.finish();
}

fn bench_insert_escaping(c: &mut Criterion) {
    let mut group = c.benchmark_group("build/insert_escaping");
    let conn = conn();

    for n in [1, 10, 50] {
        let text = "it's a \\path\\ ".repeat(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| {
                let q = Insert::with_connection("t", conn.clone())
                    .set("a", text.as_str())
                    .set("b", 42)
                    .set("c", true);
                black_box(q.build());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select_build,
    bench_construct_and_build,
    bench_where_in,
    bench_insert_escaping
);
criterion_main!(benches);
