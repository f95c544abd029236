//! Oracle Dialect
//!
//! Key differences from standard SQL:
//! - Row limits are `FETCH FIRST n ROWS ONLY`
//! - Table aliases are written without AS
//! - BOOLEAN is NUMBER(1); VARCHAR is VARCHAR2
//! - NVL instead of IFNULL; no ILIKE, QUALIFY, TRY_CAST or aggregate FILTER

use super::{is_call_to, rename, DialectImpl, DialectType};
use crate::error::Result;
use crate::expressions::{DataTypeKind, Expression};
use crate::generator::{GeneratorConfig, LimitStyle};

/// Oracle dialect
pub struct OracleDialect;

impl DialectImpl for OracleDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Oracle
    }

    fn generator_config(&self) -> GeneratorConfig {
        use DataTypeKind::*;
        let type_map = [
            (Boolean, "NUMBER(1)"),
            (TinyInt, "NUMBER"),
            (BigInt, "NUMBER"),
            (Decimal, "NUMBER"),
            (Double, "DOUBLE PRECISION"),
            (VarChar, "VARCHAR2"),
            (NVarChar, "NVARCHAR2"),
            (Text, "CLOB"),
            (VarBinary, "BLOB"),
            (Binary, "RAW"),
            (DateTime, "DATE"),
        ]
        .into_iter()
        .map(|(kind, name)| (kind, name.to_string()))
        .collect();

        GeneratorConfig {
            dialect: Some(DialectType::Oracle),
            limit_style: LimitStyle::FetchFirst,
            table_alias_as: false,
            supports_ilike: false,
            supports_qualify: false,
            supports_try_cast: false,
            supports_distinct_on: false,
            supports_aggregate_filter: false,
            type_map,
            ..Default::default()
        }
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        match expr {
            Expression::TryCast(c) => Ok(Expression::Cast(c)),
            Expression::Function(f) if is_call_to(&f, &["IFNULL"]) => Ok(rename(f, "NVL")),
            Expression::Function(f) if is_call_to(&f, &["LEN", "CHAR_LENGTH"]) => Ok(rename(f, "LENGTH")),
            _ => Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    fn to_oracle(sql: &str) -> String {
        let oracle = Dialect::get(DialectType::Oracle);
        Dialect::get(DialectType::Generic).transpile(sql, &oracle).unwrap().remove(0)
    }

    #[test]
    fn test_boolean_type_drops_params() {
        assert_eq!(
            to_oracle("CREATE TABLE t (flag BOOLEAN, name VARCHAR(20))"),
            "CREATE TABLE t (flag NUMBER(1), name VARCHAR2(20))"
        );
    }

    #[test]
    fn test_fetch_first_and_alias_without_as() {
        assert_eq!(
            to_oracle("SELECT x.a FROM t AS x LIMIT 3"),
            "SELECT x.a FROM t x FETCH FIRST 3 ROWS ONLY"
        );
    }

    #[test]
    fn test_ifnull_becomes_nvl() {
        assert_eq!(to_oracle("SELECT IFNULL(a, 1) FROM t"), "SELECT NVL(a, 1) FROM t");
    }
}
