//! Identity Roundtrip Tests
//!
//! Canonically formatted statements must regenerate byte-for-byte in the
//! dialect they were written in.

use pretty_assertions::assert_eq;
use sqlshift::dialects::{Dialect, DialectType};

fn roundtrip(sql: &str, dialect: DialectType) -> String {
    let d = Dialect::get(dialect);
    let ast = d.parse(sql).unwrap_or_else(|e| panic!("Failed to parse {sql}: {e}"));
    assert_eq!(ast.len(), 1, "expected one statement in {sql}");
    d.generate(&ast[0]).expect("Failed to generate SQL")
}

fn assert_identity(sql: &str, dialect: DialectType) {
    assert_eq!(roundtrip(sql, dialect), sql, "not an exact roundtrip in {dialect}");
}

/// Regenerating already generated output must not change it
fn assert_stable(sql: &str, dialect: DialectType) {
    let first = roundtrip(sql, dialect);
    let second = roundtrip(&first, dialect);
    assert_eq!(first, second, "unstable roundtrip for {sql}");
}

const GENERIC_CORPUS: &[&str] = &[
    "SELECT a FROM t WHERE a = 1",
    "SELECT DISTINCT a, b FROM t",
    "SELECT a AS x, COUNT(*) FROM t GROUP BY a HAVING COUNT(*) > 1",
    "SELECT * FROM a LEFT JOIN b ON a.id = b.id",
    "SELECT * FROM a INNER JOIN b USING (id)",
    "SELECT a FROM t ORDER BY a DESC LIMIT 10 OFFSET 5",
    "SELECT CASE WHEN a = 1 THEN 'x' ELSE 'y' END FROM t",
    "SELECT CAST(a AS VARCHAR(10)) FROM t",
    "SELECT CAST(a AS DECIMAL(10, 2)) FROM t",
    "WITH x AS (SELECT 1) SELECT * FROM x",
    "SELECT a FROM t UNION ALL SELECT a FROM u",
    "SELECT a FROM t WHERE EXISTS (SELECT 1 FROM u)",
    "SELECT a FROM t WHERE b BETWEEN 1 AND 10",
    "SELECT x FROM (SELECT 1 AS x) AS s",
    "SELECT ROW_NUMBER() OVER (PARTITION BY a ORDER BY b) FROM t",
    "SELECT (a + b) * c, a * b + c FROM t",
    "SELECT a FROM t WHERE (a = 1 OR b = 2) AND c = 3",
    "INSERT INTO t (a, b) VALUES (1, 2)",
    "UPDATE t SET a = 1 WHERE b = 2",
    "DELETE FROM t WHERE a IS NULL",
    "CREATE TABLE t (a INT NOT NULL, b TEXT)",
    "DROP TABLE IF EXISTS t",
    "SELECT 'it''s'",
];

#[test]
fn test_generic_identity_corpus() {
    for sql in GENERIC_CORPUS {
        assert_identity(sql, DialectType::Generic);
    }
}

#[test]
fn test_generic_corpus_is_stable() {
    for sql in GENERIC_CORPUS {
        assert_stable(sql, DialectType::Generic);
    }
}

#[test]
fn test_not_in_is_normalized() {
    assert_eq!(
        roundtrip("SELECT a FROM t WHERE a NOT IN (1, 2, 3)", DialectType::Generic),
        "SELECT a FROM t WHERE NOT a IN (1, 2, 3)"
    );
    assert_identity("SELECT a FROM t WHERE NOT a IN (1, 2, 3)", DialectType::Generic);
}

#[test]
fn test_postgres_identity() {
    assert_identity("SELECT a::INT FROM t", DialectType::PostgreSQL);
    assert_identity("SELECT a FROM t WHERE a ILIKE '%x%'", DialectType::PostgreSQL);
    assert_identity("SELECT ARRAY[1, 2]", DialectType::PostgreSQL);
    assert_identity(r"SELECT E'a\tb'", DialectType::PostgreSQL);
    assert_identity(r"SELECT E'line\nnext\\end'", DialectType::PostgreSQL);
}

#[test]
fn test_duckdb_escape_string_identity() {
    assert_identity(r"SELECT E'a\tb'", DialectType::DuckDB);
}

#[test]
fn test_mysql_identity() {
    assert_identity("SELECT `my col` FROM t", DialectType::MySQL);
    assert_identity("SELECT a <=> b", DialectType::MySQL);
    assert_identity(r"SELECT 'a\nb'", DialectType::MySQL);
    assert_identity(r"SELECT 'tab\there\r\0'", DialectType::MySQL);
    assert_identity(r"SELECT 'back\\slash'", DialectType::MySQL);
}

#[test]
fn test_tsql_identity() {
    assert_identity("SELECT TOP 10 a FROM t", DialectType::TSQL);
    assert_identity("SELECT [my col] FROM [t]", DialectType::TSQL);
}

#[test]
fn test_bare_exponent_is_not_an_identifier() {
    assert_eq!(roundtrip("SELECT 1e", DialectType::Generic), "SELECT 1 AS e");
}

#[test]
fn test_oracle_identity() {
    assert_identity("SELECT a FROM t FETCH FIRST 10 ROWS ONLY", DialectType::Oracle);
}

#[test]
fn test_sqlite_cast_is_idempotent() {
    let once = roundtrip("SELECT CAST(a AS INT)", DialectType::SQLite);
    assert_eq!(once, "SELECT CAST(a AS INTEGER)");
    assert_identity(&once, DialectType::SQLite);
}
