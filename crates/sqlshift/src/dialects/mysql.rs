//! MySQL Dialect
//!
//! Key differences from standard SQL:
//! - `||` is OR, not string concatenation (concatenation is `CONCAT(..)`)
//! - Backticks for identifiers; double quotes delimit strings
//! - Backslash escapes in strings, `#` line comments
//! - `<=>` null-safe equality, `REGEXP` predicate
//! - No TRY_CAST, ILIKE, QUALIFY, DISTINCT ON or aggregate FILTER

use super::{is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression, ExpressionKind};
use crate::generator::{Generator, GeneratorConfig, IdentifierQuoteStyle, RenderFn, RenderTable, PREC_EQUALITY, PREC_RANGE};
use crate::parser::ParserConfig;
use crate::tokens::TokenizerConfig;
use std::sync::Arc;

/// MySQL dialect
pub struct MySQLDialect;

/// Flatten nested concatenations into one argument list
fn concat_operands<'a>(expr: &'a Expression, out: &mut Vec<&'a Expression>) {
    match expr {
        Expression::Concat(op) => {
            concat_operands(&op.left, out);
            concat_operands(&op.right, out);
        }
        other => out.push(other),
    }
}

impl DialectImpl for MySQLDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::MySQL
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        let mut config = TokenizerConfig::default();
        config.identifiers.clear();
        config.identifiers.insert('`', '`');
        // Double quotes delimit strings unless ANSI_QUOTES is set
        config.quotes.insert('"', '"');
        config.string_escapes.push('\\');
        config.comments.insert("#".to_string(), None);
        config
    }

    fn parser_config(&self) -> ParserConfig {
        ParserConfig { dpipe_is_or: true }
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            dialect: Some(DialectType::MySQL),
            identifier_quote_style: IdentifierQuoteStyle::BACKTICK,
            escape_backslash: true,
            supports_ilike: false,
            supports_qualify: false,
            supports_try_cast: false,
            supports_distinct_on: false,
            supports_aggregate_filter: false,
            null_ordering_supported: false,
            type_map: [
                (DataTypeKind::TimestampTz, "TIMESTAMP"),
                (DataTypeKind::Uuid, "CHAR(36)"),
            ]
            .into_iter()
            .map(|(kind, name)| (kind, name.to_string()))
            .collect(),
            ..Default::default()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        let mut overrides = RenderTable::new();

        let concat: RenderFn = Arc::new(|g: &mut Generator, e: &Expression| {
            let mut operands = Vec::new();
            concat_operands(e, &mut operands);
            g.write_function_call("CONCAT", &operands)
        });
        overrides.insert(ExpressionKind::Concat, concat);

        let null_safe_eq: RenderFn = Arc::new(|g: &mut Generator, e: &Expression| match e {
            Expression::NullSafeEq(op) => g.write_binary(op, "<=>", PREC_EQUALITY),
            _ => g.generate_default(e),
        });
        overrides.insert(ExpressionKind::NullSafeEq, null_safe_eq);

        let regexp: RenderFn = Arc::new(|g: &mut Generator, e: &Expression| match e {
            Expression::RegexpLike(op) => g.write_binary(op, "REGEXP", PREC_RANGE),
            _ => g.generate_default(e),
        });
        overrides.insert(ExpressionKind::RegexpLike, regexp);

        overrides
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        match expr {
            Expression::TryCast(c) => Ok(Expression::Cast(c)),
            Expression::Function(f) if is_call_to(&f, &["NVL"]) => Ok(rename(f, "IFNULL")),
            Expression::Function(f) if is_call_to(&f, &["LEN"]) => Ok(rename(f, "CHAR_LENGTH")),
            Expression::Function(f) if is_call_to(&f, &["RANDOM"]) => Ok(rename(f, "RAND")),
            _ => Ok(expr),
        }
    }
}
