//! PostgreSQL Dialect
//!
//! Key differences from generic SQL:
//! - `x::type` casts are kept as written
//! - `E'..'` escape strings
//! - No TRY_CAST (rewritten to CAST), no QUALIFY
//! - NVL/IFNULL become COALESCE
//! - Arrays are spelled `INT[]` and constructed with `ARRAY[...]`
//! - Type mappings: TINYINT→SMALLINT, FLOAT→REAL, DOUBLE→DOUBLE PRECISION, binary→BYTEA

use super::{binary_as_function, is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression, ExpressionKind};
use crate::generator::{ArrayTypeStyle, GeneratorConfig, RenderTable};
use crate::tokens::TokenizerConfig;
use std::collections::HashMap;

/// PostgreSQL dialect
pub struct PostgresDialect;

pub(super) fn postgres_type_map() -> HashMap<DataTypeKind, String> {
    [
        (DataTypeKind::TinyInt, "SMALLINT"),
        (DataTypeKind::Float, "REAL"),
        (DataTypeKind::Double, "DOUBLE PRECISION"),
        (DataTypeKind::DateTime, "TIMESTAMP"),
        (DataTypeKind::Binary, "BYTEA"),
        (DataTypeKind::VarBinary, "BYTEA"),
        (DataTypeKind::Blob, "BYTEA"),
    ]
    .into_iter()
    .map(|(kind, name)| (kind, name.to_string()))
    .collect()
}

impl DialectImpl for PostgresDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::PostgreSQL
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        TokenizerConfig {
            escape_string_prefix: true,
            ..Default::default()
        }
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            dialect: Some(DialectType::PostgreSQL),
            supports_double_colon_cast: true,
            supports_escape_string: true,
            supports_try_cast: false,
            supports_qualify: false,
            array_type_style: ArrayTypeStyle::Suffix,
            array_keyword_required: true,
            type_map: postgres_type_map(),
            ..Default::default()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        let mut overrides = RenderTable::new();
        overrides.insert(ExpressionKind::RegexpLike, binary_as_function("REGEXP_LIKE"));
        overrides
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        match expr {
            // TRY_CAST -> CAST
            Expression::TryCast(c) => Ok(Expression::Cast(c)),

            Expression::Function(f) if is_call_to(&f, &["NVL", "IFNULL"]) => Ok(rename(f, "COALESCE")),
            Expression::Function(f) if is_call_to(&f, &["RAND"]) => Ok(rename(f, "RANDOM")),
            Expression::Function(f) if is_call_to(&f, &["LEN"]) => Ok(rename(f, "LENGTH")),

            _ => Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::Dialect;
    use pretty_assertions::assert_eq;

    fn roundtrip(sql: &str) -> String {
        let dialect = Dialect::get(DialectType::PostgreSQL);
        let ast = dialect.parse(sql).unwrap();
        dialect.generate(&ast[0]).unwrap()
    }

    #[test]
    fn test_double_colon_cast_preserved() {
        assert_eq!(roundtrip("SELECT a::INT FROM t"), "SELECT a::INT FROM t");
    }

    #[test]
    fn test_ifnull_becomes_coalesce() {
        assert_eq!(roundtrip("SELECT IFNULL(a, 0) FROM t"), "SELECT COALESCE(a, 0) FROM t");
    }

    #[test]
    fn test_array_types_and_literals() {
        assert_eq!(roundtrip("SELECT CAST(x AS INT[])"), "SELECT CAST(x AS INT[])");
        assert_eq!(roundtrip("SELECT ARRAY[1, 2]"), "SELECT ARRAY[1, 2]");
    }

    #[test]
    fn test_double_type_spelling() {
        assert_eq!(roundtrip("SELECT CAST(x AS DOUBLE)"), "SELECT CAST(x AS DOUBLE PRECISION)");
    }
}
