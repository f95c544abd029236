//! T-SQL (SQL Server) Dialect
//!
//! Key differences from standard SQL:
//! - `[...]` quotes identifiers
//! - Row limits are `SELECT TOP n`, or `OFFSET .. FETCH NEXT` with an offset
//! - Booleans are `1`/`0`; BOOLEAN is spelled BIT
//! - `+` concatenates strings
//! - GETDATE() instead of CURRENT_TIMESTAMP, ISNULL instead of IFNULL/NVL
//! - JSON paths use JSON_QUERY / JSON_VALUE

use super::{binary_as_function, is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataType, DataTypeKind, Expression, ExpressionKind, Function};
use crate::generator::{
    Generator, GeneratorConfig, IdentifierQuoteStyle, LimitStyle, RenderFn, RenderTable, PREC_TERM,
};
use crate::tokens::{TokenType, TokenizerConfig};
use std::sync::Arc;

/// T-SQL dialect
pub struct TSQLDialect;

fn getdate() -> Expression {
    Expression::Function(Box::new(Function::new("GETDATE", Vec::new())))
}

impl DialectImpl for TSQLDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::TSQL
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        let mut config = TokenizerConfig::default().with_keywords([("TOP", TokenType::Top)]);
        config.identifiers.insert('[', ']');
        config
    }

    fn generator_config(&self) -> GeneratorConfig {
        use DataTypeKind::*;
        let type_map = [
            (Boolean, "BIT"),
            (Double, "FLOAT"),
            (Text, "VARCHAR(MAX)"),
            (Blob, "VARBINARY(MAX)"),
            (Json, "NVARCHAR(MAX)"),
            (Timestamp, "DATETIME2"),
            (TimestampTz, "DATETIMEOFFSET"),
            (Uuid, "UNIQUEIDENTIFIER"),
        ]
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect();

        GeneratorConfig {
            dialect: Some(DialectType::TSQL),
            identifier_quote_style: IdentifierQuoteStyle::BRACKET,
            limit_style: LimitStyle::Top,
            numeric_booleans: true,
            supports_ilike: false,
            supports_qualify: false,
            supports_distinct_on: false,
            supports_aggregate_filter: false,
            null_ordering_supported: false,
            type_map,
            ..Default::default()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        let mut overrides = RenderTable::new();
        let concat: RenderFn = Arc::new(|g: &mut Generator, e: &Expression| match e {
            Expression::Concat(op) => g.write_binary(op, "+", PREC_TERM),
            _ => g.generate_default(e),
        });
        overrides.insert(ExpressionKind::Concat, concat);
        overrides.insert(ExpressionKind::JsonExtract, binary_as_function("JSON_QUERY"));
        overrides.insert(ExpressionKind::JsonExtractScalar, binary_as_function("JSON_VALUE"));
        overrides
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        match expr {
            Expression::Transaction(mut t) => {
                t.keyword = true;
                Ok(Expression::Transaction(t))
            }
            Expression::CurrentTimestamp => Ok(getdate()),
            // CURRENT_DATE -> CAST(GETDATE() AS DATE)
            Expression::CurrentDate => Ok(getdate().cast(DataType::new(DataTypeKind::Date))),
            Expression::Function(f) if is_call_to(&f, &["NOW"]) => Ok(rename(f, "GETDATE")),
            Expression::Function(f) if is_call_to(&f, &["IFNULL", "NVL"]) => Ok(rename(f, "ISNULL")),
            Expression::Function(f) if is_call_to(&f, &["LENGTH", "CHAR_LENGTH"]) => Ok(rename(f, "LEN")),
            _ => Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    fn to_tsql(sql: &str) -> String {
        let tsql = Dialect::get(DialectType::TSQL);
        Dialect::get(DialectType::Generic).transpile(sql, &tsql).unwrap().remove(0)
    }

    #[test]
    fn test_limit_becomes_top() {
        assert_eq!(to_tsql("SELECT a FROM t LIMIT 5"), "SELECT TOP 5 a FROM t");
    }

    #[test]
    fn test_top_is_read_back_as_limit() {
        let tsql = Dialect::get(DialectType::TSQL);
        let out = tsql.transpile("SELECT TOP 3 a FROM t", &Dialect::get(DialectType::PostgreSQL)).unwrap();
        assert_eq!(out, vec!["SELECT a FROM t LIMIT 3"]);
    }

    #[test]
    fn test_offset_without_order_by_gets_placeholder_order() {
        assert_eq!(
            to_tsql("SELECT a FROM t LIMIT 5 OFFSET 2"),
            "SELECT a FROM t ORDER BY (SELECT NULL) OFFSET 2 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_limit_with_offset_uses_fetch() {
        assert_eq!(
            to_tsql("SELECT a FROM t ORDER BY a LIMIT 5 OFFSET 10"),
            "SELECT a FROM t ORDER BY a OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_booleans_and_current_date() {
        assert_eq!(
            to_tsql("SELECT TRUE, CURRENT_DATE"),
            "SELECT 1, CAST(GETDATE() AS DATE)"
        );
    }

    #[test]
    fn test_concat_uses_plus() {
        assert_eq!(to_tsql("SELECT a || 'x'"), "SELECT a + 'x'");
    }

    #[test]
    fn test_begin_transaction() {
        assert_eq!(to_tsql("BEGIN"), "BEGIN TRANSACTION");
    }

    #[test]
    fn test_reserved_names_use_brackets() {
        assert_eq!(to_tsql(r#"SELECT "from" FROM "my table""#), "SELECT [from] FROM [my table]");
    }
}
