//! BigQuery Dialect
//!
//! Key differences from standard SQL:
//! - Backticks quote identifiers (including dotted paths)
//! - Single or double quotes for strings, backslash escapes, `#` comments
//! - `b'..'` is a bytes literal
//! - Type names: INT64, FLOAT64, STRING, BYTES, BOOL, NUMERIC
//! - SAFE_CAST instead of TRY_CAST, REGEXP_CONTAINS for regex matching

use super::{binary_as_function, is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression, ExpressionKind};
use crate::generator::{Generator, GeneratorConfig, IdentifierQuoteStyle, RenderFn, RenderTable};
use crate::tokens::TokenizerConfig;
use std::sync::Arc;

/// BigQuery dialect
pub struct BigQueryDialect;

impl DialectImpl for BigQueryDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::BigQuery
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        let mut config = TokenizerConfig::default();
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        config.quotes.insert('"', '"');
        config.string_escapes.push('\\');
        config.comments.insert("#".to_string(), None);
        config.b_prefix_is_byte_string = true;
        config
    }

    fn generator_config(&self) -> GeneratorConfig {
        use DataTypeKind::*;
        let type_map = [
            (TinyInt, "INT64"),
            (SmallInt, "INT64"),
            (Int, "INT64"),
            (BigInt, "INT64"),
            (Float, "FLOAT64"),
            (Double, "FLOAT64"),
            (Decimal, "NUMERIC"),
            (Boolean, "BOOL"),
            (Char, "STRING"),
            (VarChar, "STRING"),
            (NChar, "STRING"),
            (NVarChar, "STRING"),
            (Text, "STRING"),
            (Uuid, "STRING"),
            (Binary, "BYTES"),
            (VarBinary, "BYTES"),
            (Blob, "BYTES"),
            (Timestamp, "DATETIME"),
            (TimestampTz, "TIMESTAMP"),
        ]
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect();

        GeneratorConfig {
            dialect: Some(DialectType::BigQuery),
            identifier_quote_style: IdentifierQuoteStyle::BACKTICK,
            escape_backslash: true,
            supports_ilike: false,
            supports_distinct_on: false,
            supports_aggregate_filter: false,
            type_map,
            ..Default::default()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        let mut overrides = RenderTable::new();
        overrides.insert(ExpressionKind::RegexpLike, binary_as_function("REGEXP_CONTAINS"));

        // SAFE_CAST(x AS t)
        let safe_cast: RenderFn = Arc::new(|g: &mut Generator, e: &Expression| match e {
            Expression::TryCast(c) => {
                g.write_keyword("SAFE_CAST");
                g.write("(");
                g.generate_expression(&c.this)?;
                g.write_space();
                g.write_keyword("AS");
                g.write_space();
                g.write_data_type(&c.to)?;
                g.write(")");
                Ok(())
            }
            _ => g.generate_default(e),
        });
        overrides.insert(ExpressionKind::TryCast, safe_cast);
        overrides
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        match expr {
            Expression::Function(f) if is_call_to(&f, &["NVL"]) => Ok(rename(f, "IFNULL")),
            Expression::Function(f) if is_call_to(&f, &["LEN", "CHAR_LENGTH"]) => Ok(rename(f, "LENGTH")),
            Expression::Function(f) if is_call_to(&f, &["RANDOM"]) => Ok(rename(f, "RAND")),
            _ => Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    fn to_bigquery(sql: &str) -> String {
        let bigquery = Dialect::get(DialectType::BigQuery);
        Dialect::get(DialectType::Generic).transpile(sql, &bigquery).unwrap().remove(0)
    }

    #[test]
    fn test_type_names() {
        assert_eq!(
            to_bigquery("SELECT CAST(a AS BIGINT), CAST(b AS VARCHAR)"),
            "SELECT CAST(a AS INT64), CAST(b AS STRING)"
        );
    }

    #[test]
    fn test_try_cast_is_safe_cast() {
        assert_eq!(to_bigquery("SELECT TRY_CAST(a AS INT)"), "SELECT SAFE_CAST(a AS INT64)");
    }

    #[test]
    fn test_regexp() {
        assert_eq!(to_bigquery("SELECT a RLIKE 'x'"), "SELECT REGEXP_CONTAINS(a, 'x')");
    }

    #[test]
    fn test_qualify_supported() {
        let sql = "SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1";
        assert_eq!(to_bigquery(sql), sql);
    }
}
