use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlshift::dialects::{Dialect, DialectType};
use sqlshift::{tokenize, transpile};

const SIMPLE_SELECT: &str = "SELECT a, b, c FROM table1";

const MEDIUM_SELECT: &str = r#"
SELECT
    c.id,
    c.name,
    COUNT(o.id) AS order_count,
    SUM(o.amount) AS revenue
FROM customers AS c
LEFT JOIN orders AS o ON c.id = o.customer_id
WHERE c.region ILIKE 'eu%'
    AND o.status NOT IN ('cancelled', 'refunded')
GROUP BY c.id, c.name
HAVING COUNT(o.id) > 5
ORDER BY revenue DESC
LIMIT 100
"#;

const COMPLEX_SELECT: &str = r#"
WITH
    recent AS (
        SELECT o.customer_id, o.amount, o.placed_at
        FROM orders AS o
        WHERE o.placed_at > CURRENT_DATE
            AND o.amount BETWEEN 10 AND 10000
    ),
    ranked AS (
        SELECT
            r.customer_id,
            r.amount,
            ROW_NUMBER() OVER (PARTITION BY r.customer_id ORDER BY r.amount DESC) AS rn
        FROM recent AS r
    )
SELECT
    k.customer_id,
    CAST(k.amount AS DECIMAL(12, 2)) AS top_amount,
    CASE
        WHEN k.amount > 1000 THEN 'large'
        WHEN k.amount > 100 THEN 'medium'
        ELSE 'small'
    END AS bucket,
    COALESCE(c.name, 'unknown') AS name
FROM ranked AS k
LEFT JOIN customers AS c ON c.id = k.customer_id
WHERE k.rn = 1
    AND EXISTS (SELECT 1 FROM payments AS p WHERE p.customer_id = k.customer_id)
ORDER BY top_amount DESC
LIMIT 50
"#;

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for (name, sql) in [("simple", SIMPLE_SELECT), ("medium", MEDIUM_SELECT), ("complex", COMPLEX_SELECT)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &sql, |b, sql| {
            b.iter(|| tokenize(black_box(sql)))
        });
    }
    group.finish();
}

fn bench_transpile_by_query_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile_by_size");

    for (name, sql) in [("simple", SIMPLE_SELECT), ("medium", MEDIUM_SELECT), ("complex", COMPLEX_SELECT)] {
        group.bench_function(name, |b| {
            b.iter(|| transpile(black_box(sql), DialectType::PostgreSQL, DialectType::MySQL))
        });
    }

    group.finish();
}

fn bench_transpile_dialect_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpile_dialect_pairs");

    let dialect_pairs = [
        ("PostgreSQL_to_MySQL", DialectType::PostgreSQL, DialectType::MySQL),
        ("PostgreSQL_to_TSQL", DialectType::PostgreSQL, DialectType::TSQL),
        ("PostgreSQL_to_BigQuery", DialectType::PostgreSQL, DialectType::BigQuery),
        ("DuckDB_to_Oracle", DialectType::DuckDB, DialectType::Oracle),
        ("Generic_to_SQLite", DialectType::Generic, DialectType::SQLite),
    ];

    for (name, source, target) in dialect_pairs {
        group.bench_with_input(BenchmarkId::new("complex_query", name), &COMPLEX_SELECT, |b, sql| {
            b.iter(|| transpile(black_box(sql), source, target))
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    let dialect = Dialect::get(DialectType::PostgreSQL);

    group.bench_function("medium_query", |b| {
        b.iter(|| {
            if let Ok(ast) = dialect.parse(black_box(MEDIUM_SELECT)) {
                for expr in &ast {
                    let _ = dialect.generate(black_box(expr));
                }
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_transpile_by_query_size,
    bench_transpile_dialect_pairs,
    bench_roundtrip
);
criterion_main!(benches);
