//! Tests for custom dialect support.
//!
//! These cover the `CustomDialectBuilder` API, scoped registries, the
//! process-wide registry, and name-based transpilation.

use pretty_assertions::assert_eq;
use sqlshift::dialects::{CustomDialectBuilder, Dialect, DialectRegistry, DialectType};
use sqlshift::expressions::{Expression, ExpressionKind};
use sqlshift::generator::{Generator, IdentifierQuoteStyle, NormalizeFunctions};
use sqlshift::{transpile_by_name, unregister_custom_dialect, ErrorKind};

/// Removes a name from the process-wide registry, even on panic.
struct DialectGuard(&'static str);

impl Drop for DialectGuard {
    fn drop(&mut self) {
        let _ = unregister_custom_dialect(self.0);
    }
}

fn roundtrip(dialect: &Dialect, sql: &str) -> String {
    let ast = dialect.parse(sql).unwrap();
    dialect.generate(&ast[0]).unwrap()
}

#[test]
fn test_lowercase_functions() {
    let d = CustomDialectBuilder::new("lower_funcs")
        .based_on(DialectType::PostgreSQL)
        .generator_config_modifier(|gc| gc.normalize_functions = NormalizeFunctions::Lower)
        .build()
        .unwrap();

    assert_eq!(d.name(), "lower_funcs");
    assert_eq!(d.dialect_type(), DialectType::PostgreSQL);
    assert_eq!(roundtrip(&d, "SELECT COUNT(*), MAX(id) FROM users"), "SELECT count(*), max(id) FROM users");
}

#[test]
fn test_inherits_base_rewrites() {
    let d = CustomDialectBuilder::new("pg_child")
        .based_on(DialectType::PostgreSQL)
        .build()
        .unwrap();
    assert_eq!(roundtrip(&d, "SELECT NVL(a, 0) FROM t"), "SELECT COALESCE(a, 0) FROM t");
}

#[test]
fn test_tokenizer_and_quote_modifiers() {
    let d = CustomDialectBuilder::new("backticks")
        .tokenizer_config_modifier(|tc| {
            tc.identifiers.insert('`', '`');
        })
        .generator_config_modifier(|gc| gc.identifier_quote_style = IdentifierQuoteStyle::BACKTICK)
        .build()
        .unwrap();
    assert_eq!(roundtrip(&d, r#"SELECT `a b`, "c d" FROM t"#), "SELECT `a b`, `c d` FROM t");
}

#[test]
fn test_render_override() {
    let d = CustomDialectBuilder::new("shouting_nulls")
        .render_override(ExpressionKind::Null, |g: &mut Generator, _e: &Expression| {
            g.write("NULL /* nothing */");
            Ok(())
        })
        .build()
        .unwrap();
    assert_eq!(roundtrip(&d, "SELECT NULL"), "SELECT NULL /* nothing */");
}

#[test]
fn test_transform_runs_after_base() {
    let d = CustomDialectBuilder::new("strlen")
        .based_on(DialectType::TSQL)
        .transform_fn(|e| match e {
            // TSQL has already turned LENGTH into LEN by now
            Expression::Function(mut f) if f.name == "LEN" => {
                f.name = "DATALENGTH".to_string();
                Ok(Expression::Function(f))
            }
            other => Ok(other),
        })
        .build()
        .unwrap();
    assert_eq!(roundtrip(&d, "SELECT LENGTH(a) FROM t"), "SELECT DATALENGTH(a) FROM t");
}

#[test]
fn test_empty_name_is_rejected() {
    let err = CustomDialectBuilder::new("  ").build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSetting);
}

#[test]
fn test_scoped_registry() {
    let mut registry = DialectRegistry::with_builtins();
    CustomDialectBuilder::new("Scoped_Only")
        .based_on(DialectType::MySQL)
        .register_into(&mut registry)
        .unwrap();

    assert!(registry.contains("scoped_only"));
    let d = registry.get_or_raise("SCOPED_ONLY").unwrap();
    assert_eq!(roundtrip(&d, "SELECT `x`, y FROM t"), "SELECT `x`, y FROM t");

    // The process-wide registry is untouched
    assert_eq!(sqlshift::get_or_raise("scoped_only").unwrap_err().kind(), ErrorKind::UnknownDialect);

    let err = CustomDialectBuilder::new("scoped_only").register_into(&mut registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSetting);
}

#[test]
fn test_global_registration_and_transpile_by_name() {
    let _guard = DialectGuard("global_custom");

    CustomDialectBuilder::new("global_custom")
        .based_on(DialectType::SQLite)
        .generator_config_modifier(|gc| gc.normalize_functions = NormalizeFunctions::Lower)
        .register()
        .unwrap();

    let out = transpile_by_name("SELECT COALESCE(a, 1), CAST(b AS INT) FROM t", "postgres", "global_custom").unwrap();
    assert_eq!(out, vec!["SELECT coalesce(a, 1), CAST(b AS INTEGER) FROM t"]);

    assert!(unregister_custom_dialect("global_custom").unwrap());
    assert!(transpile_by_name("SELECT 1", "generic", "global_custom").is_err());
}

#[test]
fn test_builtins_cannot_be_unregistered() {
    let err = unregister_custom_dialect("postgres").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSetting);
    assert!(Dialect::get_by_name("postgres").is_ok());
}
