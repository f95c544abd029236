//! Redshift Dialect
//!
//! Built from PostgreSQL. Redshift differs in that it:
//! - has no array types or DISTINCT ON
//! - supports QUALIFY
//! - spells unbounded text as `VARCHAR(MAX)`

use super::postgres::{postgres_type_map, PostgresDialect};
use super::{DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression};
use crate::generator::{ArrayTypeStyle, GeneratorConfig, RenderTable};
use crate::parser::ParserConfig;
use crate::tokens::TokenizerConfig;

/// Redshift dialect
pub struct RedshiftDialect;

impl DialectImpl for RedshiftDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Redshift
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        PostgresDialect.tokenizer_config()
    }

    fn parser_config(&self) -> ParserConfig {
        PostgresDialect.parser_config()
    }

    fn generator_config(&self) -> GeneratorConfig {
        let mut type_map = postgres_type_map();
        type_map.insert(DataTypeKind::Text, "VARCHAR(MAX)".to_string());
        type_map.insert(DataTypeKind::Uuid, "VARCHAR(36)".to_string());
        GeneratorConfig {
            dialect: Some(DialectType::Redshift),
            supports_qualify: true,
            supports_distinct_on: false,
            array_type_style: ArrayTypeStyle::Angle,
            array_keyword_required: false,
            type_map,
            ..PostgresDialect.generator_config()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        PostgresDialect.render_overrides()
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        PostgresDialect.transform_expr(expr)
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inherits_postgres_rewrites() {
        let redshift = Dialect::get(DialectType::Redshift);
        let ast = redshift.parse("SELECT NVL(a, 0), CAST(b AS TEXT) FROM t").unwrap();
        assert_eq!(
            redshift.generate(&ast[0]).unwrap(),
            "SELECT COALESCE(a, 0), CAST(b AS VARCHAR(MAX)) FROM t"
        );
    }

    #[test]
    fn test_qualify_is_kept() {
        let redshift = Dialect::get(DialectType::Redshift);
        let sql = "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (PARTITION BY a ORDER BY b) = 1";
        let ast = redshift.parse(sql).unwrap();
        assert_eq!(redshift.generate(&ast[0]).unwrap(), sql);
    }
}
