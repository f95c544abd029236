//! DuckDB Dialect
//!
//! Close to PostgreSQL syntax, but also supports QUALIFY, TRY_CAST and
//! `ILIKE`; arrays are written `INT[]` and `[1, 2]`.

use super::{binary_as_function, is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression, ExpressionKind};
use crate::generator::{ArrayTypeStyle, GeneratorConfig, RenderTable};
use crate::tokens::TokenizerConfig;

/// DuckDB dialect
pub struct DuckDBDialect;

impl DialectImpl for DuckDBDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::DuckDB
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        TokenizerConfig {
            escape_string_prefix: true,
            ..Default::default()
        }
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            dialect: Some(DialectType::DuckDB),
            supports_double_colon_cast: true,
            supports_escape_string: true,
            array_type_style: ArrayTypeStyle::Suffix,
            type_map: [
                (DataTypeKind::Binary, "BLOB"),
                (DataTypeKind::VarBinary, "BLOB"),
                (DataTypeKind::NChar, "TEXT"),
                (DataTypeKind::NVarChar, "TEXT"),
                (DataTypeKind::DateTime, "TIMESTAMP"),
            ]
            .into_iter()
            .map(|(kind, name)| (kind, name.to_string()))
            .collect(),
            ..Default::default()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        let mut overrides = RenderTable::new();
        overrides.insert(ExpressionKind::RegexpLike, binary_as_function("REGEXP_MATCHES"));
        overrides
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        match expr {
            Expression::Function(f) if is_call_to(&f, &["NVL"]) => Ok(rename(f, "COALESCE")),
            Expression::Function(f) if is_call_to(&f, &["LEN", "CHAR_LENGTH"]) => Ok(rename(f, "LENGTH")),
            Expression::Function(f) if is_call_to(&f, &["RAND"]) => Ok(rename(f, "RANDOM")),
            _ => Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_postgres_to_duckdb() {
        let postgres = Dialect::get(DialectType::PostgreSQL);
        let duckdb = Dialect::get(DialectType::DuckDB);
        let out = postgres
            .transpile("SELECT a::INT[], b ILIKE '%x%' FROM t", &duckdb)
            .unwrap();
        assert_eq!(out, vec!["SELECT a::INT[], b ILIKE '%x%' FROM t"]);
    }

    #[test]
    fn test_regexp_matches() {
        let duckdb = Dialect::get(DialectType::DuckDB);
        let out = Dialect::get(DialectType::MySQL)
            .transpile("SELECT a REGEXP 'x'", &duckdb)
            .unwrap();
        assert_eq!(out, vec!["SELECT REGEXP_MATCHES(a, 'x')"]);
    }
}
