//! SQLite Dialect
//!
//! SQLite has type affinities rather than types, so every canonical type is
//! mapped onto INTEGER, REAL, TEXT or BLOB. Other differences:
//! - `"..."`, `[...]` and backticks all quote identifiers
//! - RAND is RANDOM, NVL is IFNULL
//! - No TRY_CAST, ILIKE, QUALIFY or DISTINCT ON

use super::{is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression, ExpressionKind};
use crate::generator::{Generator, GeneratorConfig, RenderFn, RenderTable, PREC_RANGE};
use crate::tokens::TokenizerConfig;
use std::sync::Arc;

/// SQLite dialect
pub struct SQLiteDialect;

impl DialectImpl for SQLiteDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::SQLite
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        let mut config = TokenizerConfig::default();
        config.identifiers.insert('[', ']');
        config.identifiers.insert('`', '`');
        config.nested_comments = false;
        config
    }

    fn generator_config(&self) -> GeneratorConfig {
        use DataTypeKind::*;
        let type_map = [
            (Boolean, "INTEGER"),
            (TinyInt, "INTEGER"),
            (SmallInt, "INTEGER"),
            (Int, "INTEGER"),
            (BigInt, "INTEGER"),
            (Float, "REAL"),
            (Double, "REAL"),
            (Decimal, "REAL"),
            (Char, "TEXT"),
            (VarChar, "TEXT"),
            (NChar, "TEXT"),
            (NVarChar, "TEXT"),
            (Date, "TEXT"),
            (Time, "TEXT"),
            (Timestamp, "TEXT"),
            (TimestampTz, "TEXT"),
            (DateTime, "TEXT"),
            (Json, "TEXT"),
            (Uuid, "TEXT"),
            (Binary, "BLOB"),
            (VarBinary, "BLOB"),
        ]
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect();

        GeneratorConfig {
            dialect: Some(DialectType::SQLite),
            supports_ilike: false,
            supports_qualify: false,
            supports_try_cast: false,
            supports_distinct_on: false,
            type_map,
            ..Default::default()
        }
    }

    fn render_overrides(&self) -> RenderTable {
        let mut overrides = RenderTable::new();
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
            Expression::Function(f) if is_call_to(&f, &["RAND"]) => {
                // RANDOM() takes no seed
                let mut f = f;
                f.args.clear();
                Ok(rename(f, "RANDOM"))
            }
            Expression::Function(f) if is_call_to(&f, &["NVL"]) => Ok(rename(f, "IFNULL")),
            Expression::Function(f) if is_call_to(&f, &["LEN", "CHAR_LENGTH"]) => Ok(rename(f, "LENGTH")),
            _ => Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    fn to_sqlite(sql: &str) -> String {
        let sqlite = Dialect::get(DialectType::SQLite);
        Dialect::get(DialectType::Generic).transpile(sql, &sqlite).unwrap().remove(0)
    }

    #[test]
    fn test_int_maps_to_integer() {
        assert_eq!(to_sqlite("SELECT CAST(a AS INT)"), "SELECT CAST(a AS INTEGER)");
    }

    #[test]
    fn test_type_mapping_is_idempotent() {
        let once = to_sqlite("SELECT CAST(a AS INT)");
        let sqlite = Dialect::get(DialectType::SQLite);
        let twice = sqlite.transpile(&once, &sqlite).unwrap().remove(0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rand_becomes_random() {
        assert_eq!(to_sqlite("SELECT RAND(42)"), "SELECT RANDOM()");
    }

    #[test]
    fn test_bracket_identifiers() {
        let sqlite = Dialect::get(DialectType::SQLite);
        let ast = sqlite.parse("SELECT [order] FROM t").unwrap();
        assert_eq!(sqlite.generate(&ast[0]).unwrap(), r#"SELECT "order" FROM t"#);
    }
}
