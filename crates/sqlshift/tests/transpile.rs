//! Transpilation Tests
//!
//! Cross-dialect conversions through the top-level API.

use pretty_assertions::assert_eq;
use sqlshift::{transpile, transpile_by_name, transpile_with, DialectType, ErrorKind, ErrorLevel, TranspileOptions};

fn one(sql: &str, read: DialectType, write: DialectType) -> String {
    let mut out = transpile(sql, read, write).unwrap_or_else(|e| panic!("{read} -> {write} failed for {sql}: {e}"));
    assert_eq!(out.len(), 1);
    out.remove(0)
}

#[test]
fn test_ilike_rewritten_for_dialects_without_it() {
    for write in [DialectType::MySQL, DialectType::SQLite, DialectType::TSQL, DialectType::Oracle] {
        assert_eq!(
            one("SELECT a FROM t WHERE a ILIKE '%x%'", DialectType::PostgreSQL, write),
            "SELECT a FROM t WHERE a LIKE '%x%'"
        );
    }
}

#[test]
fn test_ilike_kept_where_supported() {
    for write in [DialectType::Generic, DialectType::PostgreSQL, DialectType::DuckDB] {
        assert_eq!(
            one("SELECT a FROM t WHERE a ILIKE '%x%'", DialectType::PostgreSQL, write),
            "SELECT a FROM t WHERE a ILIKE '%x%'"
        );
    }
}

#[test]
fn test_not_in_normalized_in_every_dialect() {
    for write in DialectType::ALL {
        assert_eq!(
            one("SELECT a FROM t WHERE a NOT IN (1, 2, 3)", DialectType::Generic, write),
            "SELECT a FROM t WHERE NOT a IN (1, 2, 3)",
            "dialect {write}"
        );
    }
}

#[test]
fn test_type_mapping_is_deterministic() {
    let once = one("SELECT CAST(a AS INT)", DialectType::Generic, DialectType::SQLite);
    assert_eq!(once, "SELECT CAST(a AS INTEGER)");
    assert_eq!(one(&once, DialectType::SQLite, DialectType::SQLite), once);
}

#[test]
fn test_limit_styles() {
    let sql = "SELECT a FROM t LIMIT 10";
    assert_eq!(one(sql, DialectType::PostgreSQL, DialectType::TSQL), "SELECT TOP 10 a FROM t");
    assert_eq!(
        one(sql, DialectType::PostgreSQL, DialectType::Oracle),
        "SELECT a FROM t FETCH FIRST 10 ROWS ONLY"
    );
    assert_eq!(one(sql, DialectType::TSQL, DialectType::DuckDB), sql);
}

#[test]
fn test_identifier_quotes_follow_target() {
    let sql = "SELECT `my col` FROM t";
    assert_eq!(one(sql, DialectType::MySQL, DialectType::PostgreSQL), r#"SELECT "my col" FROM t"#);
    assert_eq!(one(sql, DialectType::MySQL, DialectType::TSQL), "SELECT [my col] FROM t");
    assert_eq!(one(sql, DialectType::MySQL, DialectType::BigQuery), sql);
}

#[test]
fn test_multiple_statements() {
    let out = transpile("SELECT 1; SELECT 2", DialectType::Generic, DialectType::Generic).unwrap();
    assert_eq!(out, vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn test_qualify_without_support_is_an_error() {
    let sql = "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1";
    let err = transpile(sql, DialectType::DuckDB, DialectType::MySQL).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert_eq!(err.to_string(), "Unsupported: QUALIFY is not supported in mysql");
}

#[test]
fn test_unsupported_level_raise() {
    let options = TranspileOptions::new("postgres", "mysql").with_unsupported_level(ErrorLevel::Raise);
    let err = transpile_with("SELECT a FROM t WHERE a ILIKE 'x'", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_warn_keeps_one_slot_per_statement() {
    let options = TranspileOptions::new("generic", "generic").with_error_level(ErrorLevel::Warn);
    let out = transpile_with("SELECT 1; SELECT * FROM; SELECT 2", &options).unwrap();
    assert_eq!(out, vec!["SELECT 1", "", "SELECT 2"]);
}

#[test]
fn test_pretty_output() {
    let options = TranspileOptions::new("generic", "postgres").pretty(true);
    let out = transpile_with("SELECT a, b FROM t WHERE a = 1", &options).unwrap();
    assert_eq!(out, vec!["SELECT\n  a,\n  b\nFROM t\nWHERE a = 1"]);
}

#[test]
fn test_dialect_settings_in_name() {
    let out = transpile_by_name("SELECT COUNT(*) FROM t", "generic", "mysql, normalize_functions = lower").unwrap();
    assert_eq!(out, vec!["SELECT count(*) FROM t"]);
}

#[test]
fn test_unknown_dialect_name() {
    let err = transpile_by_name("SELECT 1", "generic", "nosuchdb").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownDialect);
}

#[test]
fn test_function_rewrites() {
    assert_eq!(
        one("SELECT NVL(a, 0) FROM t", DialectType::Oracle, DialectType::PostgreSQL),
        "SELECT COALESCE(a, 0) FROM t"
    );
    assert_eq!(
        one("SELECT IFNULL(a, 0) FROM t", DialectType::MySQL, DialectType::TSQL),
        "SELECT ISNULL(a, 0) FROM t"
    );
    assert_eq!(
        one("SELECT TRY_CAST(a AS INT)", DialectType::DuckDB, DialectType::BigQuery),
        "SELECT SAFE_CAST(a AS INT64)"
    );
}
