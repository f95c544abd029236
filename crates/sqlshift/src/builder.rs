//! Fluent SQL Builder API
//!
//! Builds [`Expression`] trees without writing SQL text.
//!
//! - **Expression helpers** ([`col`], [`lit`], [`star`], [`null`], [`boolean`], [`func`],
//!   [`cast`], [`alias`], [`condition`]) create leaf-level [`Expr`] values.
//! - **Statement starters** ([`select`], [`from`], [`delete`], [`insert_into`], [`update`],
//!   [`union`], [`case`]) return builder structs.
//! - **[`Expr`]** wraps an [`Expression`] and exposes operator methods (`.eq()`, `.gt()`,
//!   `.and()`, `.like()`, ...).
//! - **[`IntoExpr`]** and **[`IntoLiteral`]** coerce `&str`, integers, floats and bools.
//!
//! # Examples
//!
//! ```
//! use sqlshift::builder::*;
//!
//! let sql = select(["id", "name"])
//!     .from("users")
//!     .where_(col("age").gt(lit(18)))
//!     .order_by(["name"])
//!     .limit(10)
//!     .to_sql();
//! assert_eq!(sql, "SELECT id, name FROM users WHERE age > 18 ORDER BY name LIMIT 10");
//! ```

use crate::error::Result;
use crate::expressions::*;
use crate::generator::Generator;
use crate::parser::{ParseOptions, Parser, ParserConfig};
use crate::tokens::Tokenizer;

fn is_safe_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic()) && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn builder_identifier(name: &str) -> Identifier {
    if is_safe_identifier_name(name) {
        Identifier::new(name)
    } else {
        Identifier::quoted(name)
    }
}

fn builder_table_ref(name: &str) -> TableRef {
    let mut parts: Vec<&str> = name.split('.').collect();
    let mut table = TableRef::new("");
    table.name = builder_identifier(parts.pop().unwrap_or_default());
    table.db = parts.pop().map(builder_identifier);
    table.catalog = parts.pop().map(builder_identifier);
    table
}

// ---------------------------------------------------------------------------
// Expression helpers
// ---------------------------------------------------------------------------

/// Column reference. A dotted name is split on the last `.` into table and column.
///
/// ```
/// use sqlshift::builder::col;
///
/// assert_eq!(col("users.name").to_sql(), "users.name");
/// assert_eq!(col("my col").to_sql(), "\"my col\"");
/// ```
pub fn col(name: &str) -> Expr {
    let (table, column) = match name.rsplit_once('.') {
        Some((table, column)) => (Some(builder_identifier(table)), column),
        None => (None, name),
    };
    Expr(Expression::Column(Column {
        name: builder_identifier(column),
        table,
        db: None,
    }))
}

/// Literal from any [`IntoLiteral`] value.
pub fn lit<V: IntoLiteral>(value: V) -> Expr {
    value.into_literal()
}

pub fn star() -> Expr {
    Expr(Expression::star())
}

pub fn null() -> Expr {
    Expr(Expression::null())
}

pub fn boolean(value: bool) -> Expr {
    Expr(Expression::boolean(value))
}

/// Table reference; `"db.table"` and `"catalog.db.table"` are split on `.`.
pub fn table(name: &str) -> Expr {
    Expr(Expression::Table(builder_table_ref(name)))
}

/// Function call.
///
/// ```
/// use sqlshift::builder::{col, func, star};
///
/// assert_eq!(func("upper", [col("name")]).to_sql(), "UPPER(name)");
/// assert_eq!(func("COUNT", [star()]).to_sql(), "COUNT(*)");
/// ```
pub fn func(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Expression::function(name, args.into_iter().map(|a| a.0).collect()))
}

/// `CAST(expr AS to)`. `to` is parsed as a type (`"DECIMAL(10, 2)"`,
/// `"ARRAY<INT>"`); text that is not a valid type is kept as a
/// user-defined type name.
///
/// ```
/// use sqlshift::builder::{cast, col};
///
/// assert_eq!(cast(col("id"), "varchar(10)").to_sql(), "CAST(id AS VARCHAR(10))");
/// ```
pub fn cast(expr: Expr, to: &str) -> Expr {
    let data_type = parse_data_type(to).unwrap_or_else(|_| DataType::new(DataTypeKind::from_name(to)));
    Expr(expr.0.cast(data_type))
}

fn parse_data_type(sql: &str) -> Result<DataType> {
    let tokens = Tokenizer::default().tokenize(sql)?;
    Parser::new(ParseOptions::default(), ParserConfig::default()).parse_data_type_tokens(tokens, sql)
}

pub fn not(expr: Expr) -> Expr {
    expr.not()
}

pub fn and(left: Expr, right: Expr) -> Expr {
    left.and(right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    left.or(right)
}

pub fn alias(expr: Expr, name: &str) -> Expr {
    Expr(Expression::Alias(Box::new(Alias::new(expr.0, builder_identifier(name)))))
}

/// Parse a SQL expression fragment.
///
/// ```
/// use sqlshift::builder::*;
///
/// let cond = condition("age > 18 AND status = 'active'").unwrap();
/// let sql = select([star()]).from("users").where_(cond).to_sql();
/// assert_eq!(sql, "SELECT * FROM users WHERE age > 18 AND status = 'active'");
/// ```
pub fn condition(sql: &str) -> Result<Expr> {
    let tokens = Tokenizer::default().tokenize(sql)?;
    let mut parser = Parser::new(ParseOptions::default(), ParserConfig::default());
    parser.parse_expression_tokens(tokens, sql).map(Expr)
}

pub fn count(expr: Expr) -> Expr {
    func("COUNT", [expr])
}

pub fn count_star() -> Expr {
    func("COUNT", [star()])
}

pub fn count_distinct(expr: Expr) -> Expr {
    let mut f = Function::new("COUNT", vec![expr.0]);
    f.distinct = true;
    Expr(Expression::Function(Box::new(f)))
}

pub fn sum(expr: Expr) -> Expr {
    func("SUM", [expr])
}

pub fn avg(expr: Expr) -> Expr {
    func("AVG", [expr])
}

pub fn min_(expr: Expr) -> Expr {
    func("MIN", [expr])
}

pub fn max_(expr: Expr) -> Expr {
    func("MAX", [expr])
}

pub fn coalesce(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    func("COALESCE", exprs)
}

pub fn current_date_() -> Expr {
    Expr(Expression::CurrentDate)
}

pub fn current_timestamp_() -> Expr {
    Expr(Expression::CurrentTimestamp)
}

// ---------------------------------------------------------------------------
// Expr wrapper
// ---------------------------------------------------------------------------

/// An [`Expression`] with fluent operator methods.
///
/// ```
/// use sqlshift::builder::*;
///
/// let condition = col("age").gte(lit(18)).and(col("active").eq(boolean(true)));
/// assert_eq!(condition.to_sql(), "age >= 18 AND active = TRUE");
/// ```
#[derive(Debug, Clone)]
pub struct Expr(pub Expression);

fn binary(left: Expr, right: Expr, make: fn(Box<BinaryOp>) -> Expression) -> Expr {
    Expr(make(Box::new(BinaryOp::new(left.0, right.0))))
}

impl Expr {
    pub fn into_inner(self) -> Expression {
        self.0
    }

    /// Generic-dialect SQL; empty if generation fails
    pub fn to_sql(&self) -> String {
        Generator::sql(&self.0).unwrap_or_default()
    }

    pub fn eq(self, other: Expr) -> Expr {
        binary(self, other, Expression::Eq)
    }

    pub fn neq(self, other: Expr) -> Expr {
        binary(self, other, Expression::Neq)
    }

    pub fn lt(self, other: Expr) -> Expr {
        binary(self, other, Expression::Lt)
    }

    pub fn lte(self, other: Expr) -> Expr {
        binary(self, other, Expression::Lte)
    }

    pub fn gt(self, other: Expr) -> Expr {
        binary(self, other, Expression::Gt)
    }

    pub fn gte(self, other: Expr) -> Expr {
        binary(self, other, Expression::Gte)
    }

    pub fn and(self, other: Expr) -> Expr {
        binary(self, other, Expression::And)
    }

    pub fn or(self, other: Expr) -> Expr {
        binary(self, other, Expression::Or)
    }

    pub fn not(self) -> Expr {
        Expr(self.0.not())
    }

    pub fn add(self, other: Expr) -> Expr {
        binary(self, other, Expression::Add)
    }

    pub fn sub(self, other: Expr) -> Expr {
        binary(self, other, Expression::Sub)
    }

    pub fn mul(self, other: Expr) -> Expr {
        binary(self, other, Expression::Mul)
    }

    pub fn div(self, other: Expr) -> Expr {
        binary(self, other, Expression::Div)
    }

    /// `self || other`
    pub fn concat(self, other: Expr) -> Expr {
        binary(self, other, Expression::Concat)
    }

    pub fn is_null(self) -> Expr {
        binary(self, null(), Expression::Is)
    }

    /// `NOT self IS NULL`
    pub fn is_not_null(self) -> Expr {
        self.is_null().not()
    }

    pub fn in_list(self, values: impl IntoIterator<Item = Expr>) -> Expr {
        Expr(Expression::In(Box::new(In {
            this: self.0,
            expressions: values.into_iter().map(|v| v.0).collect(),
            query: None,
        })))
    }

    pub fn not_in(self, values: impl IntoIterator<Item = Expr>) -> Expr {
        self.in_list(values).not()
    }

    pub fn between(self, low: Expr, high: Expr) -> Expr {
        Expr(Expression::Between(Box::new(Between {
            this: self.0,
            low: low.0,
            high: high.0,
        })))
    }

    pub fn like(self, pattern: Expr) -> Expr {
        Expr(Expression::Like(Box::new(LikeOp::new(self.0, pattern.0))))
    }

    pub fn ilike(self, pattern: Expr) -> Expr {
        Expr(Expression::ILike(Box::new(LikeOp::new(self.0, pattern.0))))
    }

    pub fn rlike(self, pattern: Expr) -> Expr {
        binary(self, pattern, Expression::RegexpLike)
    }

    pub fn alias(self, name: &str) -> Expr {
        alias(self, name)
    }

    pub fn cast(self, to: &str) -> Expr {
        cast(self, to)
    }

    pub fn asc(self) -> Expr {
        self.ordered(false)
    }

    pub fn desc(self) -> Expr {
        self.ordered(true)
    }

    fn ordered(self, desc: bool) -> Expr {
        Expr(Expression::Ordered(Box::new(Ordered {
            this: self.0,
            desc,
            nulls_first: None,
        })))
    }
}

// ---------------------------------------------------------------------------
// SelectBuilder
// ---------------------------------------------------------------------------

/// Start a SELECT with the given projections.
pub fn select<I, E>(expressions: I) -> SelectBuilder
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    SelectBuilder::new().select_cols(expressions)
}

/// Start a SELECT from its FROM clause.
///
/// ```
/// use sqlshift::builder::*;
///
/// let sql = from("users").select_cols(["id", "name"]).to_sql();
/// assert_eq!(sql, "SELECT id, name FROM users");
/// ```
pub fn from(table_name: &str) -> SelectBuilder {
    SelectBuilder::new().from(table_name)
}

/// Fluent SELECT builder.
///
/// ```
/// use sqlshift::builder::*;
///
/// let sql = select(["u.id", "u.name"])
///     .from_as("users", "u")
///     .left_join("orders AS o", col("u.id").eq(col("o.user_id")))
///     .where_(col("u.active").eq(boolean(true)))
///     .group_by(["u.id", "u.name"])
///     .order_by([col("u.name").desc()])
///     .limit(100)
///     .to_sql();
/// assert_eq!(
///     sql,
///     "SELECT u.id, u.name FROM users AS u LEFT JOIN orders AS o ON u.id = o.user_id \
///      WHERE u.active = TRUE GROUP BY u.id, u.name ORDER BY u.name DESC LIMIT 100"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    select: Select,
}

fn ordered(expr: Expr) -> Expression {
    match expr.0 {
        e @ Expression::Ordered(_) => e,
        other => Expression::Ordered(Box::new(Ordered {
            this: other,
            desc: false,
            nulls_first: None,
        })),
    }
}

/// `"orders AS o"` or `"orders"` as a table source
fn table_source(spec: &str) -> Expression {
    let mut parts = spec.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let mut table = builder_table_ref(name);
    let alias = match (parts.next(), parts.next()) {
        (Some(kw), Some(alias)) if kw.eq_ignore_ascii_case("AS") => Some(alias),
        (Some(alias), None) => Some(alias),
        _ => None,
    };
    table.alias = alias.map(builder_identifier);
    Expression::Table(table)
}

impl SelectBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn select_cols<I, E>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        for expr in expressions {
            self.select.add_column(expr.into_expr().0);
        }
        self
    }

    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    /// Add a table to FROM; `"orders AS o"` carries an alias
    pub fn from(mut self, table_name: &str) -> Self {
        self.select.from.push(table_source(table_name));
        self
    }

    pub fn from_as(mut self, table_name: &str, alias: &str) -> Self {
        let mut table = builder_table_ref(table_name);
        table.alias = Some(builder_identifier(alias));
        self.select.from.push(Expression::Table(table));
        self
    }

    /// Add an arbitrary source such as a [`subquery`]
    pub fn from_expr(mut self, expr: Expr) -> Self {
        self.select.from.push(expr.0);
        self
    }

    pub fn join(self, table_name: &str, on: Expr) -> Self {
        self.join_with(table_name, None, Some(JoinKind::Inner), on)
    }

    pub fn left_join(self, table_name: &str, on: Expr) -> Self {
        self.join_with(table_name, Some(JoinSide::Left), None, on)
    }

    fn join_with(mut self, table_name: &str, side: Option<JoinSide>, kind: Option<JoinKind>, on: Expr) -> Self {
        let mut join = Join::new(table_source(table_name));
        join.side = side;
        join.kind = kind;
        join.on = Some(on.0);
        self.select.joins.push(Expression::Join(Box::new(join)));
        self
    }

    /// AND a condition into WHERE
    pub fn where_(mut self, condition: Expr) -> Self {
        self.select.add_where(condition.0);
        self
    }

    pub fn group_by<I, E>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.select
            .group_by
            .extend(expressions.into_iter().map(|e| e.into_expr().0));
        self
    }

    pub fn having(mut self, condition: Expr) -> Self {
        self.select.having = Some(condition.0);
        self
    }

    pub fn qualify(mut self, condition: Expr) -> Self {
        self.select.qualify = Some(condition.0);
        self
    }

    /// Plain expressions sort ascending
    pub fn order_by<I, E>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.select
            .order_by
            .extend(expressions.into_iter().map(|e| ordered(e.into_expr())));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.select.limit = Some(lit(count).0);
        self
    }

    pub fn offset(mut self, count: usize) -> Self {
        self.select.offset = Some(lit(count).0);
        self
    }

    pub fn build(self) -> Expression {
        Expression::Select(Box::new(self.select))
    }

    pub fn to_sql(self) -> String {
        Generator::sql(&self.build()).unwrap_or_default()
    }
}

/// `(query) AS alias` for use as a table source
pub fn subquery(query: SelectBuilder, alias: &str) -> Expr {
    Expr(Expression::Subquery(Box::new(Subquery {
        this: query.build(),
        alias: Some(builder_identifier(alias)),
        column_aliases: Vec::new(),
    })))
}

// ---------------------------------------------------------------------------
// Set operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// Builder for UNION / INTERSECT / EXCEPT.
///
/// ```
/// use sqlshift::builder::*;
///
/// let sql = union_all(select(["id"]).from("a"), select(["id"]).from("b"))
///     .order_by(["id"])
///     .limit(5)
///     .to_sql();
/// assert_eq!(sql, "SELECT id FROM a UNION ALL SELECT id FROM b ORDER BY id LIMIT 5");
/// ```
#[derive(Debug, Clone)]
pub struct SetOpBuilder {
    kind: SetOpKind,
    op: SetOperation,
}

fn set_op(kind: SetOpKind, left: SelectBuilder, right: SelectBuilder, distinct: bool) -> SetOpBuilder {
    SetOpBuilder {
        kind,
        op: SetOperation::new(left.build(), right.build(), distinct),
    }
}

pub fn union(left: SelectBuilder, right: SelectBuilder) -> SetOpBuilder {
    set_op(SetOpKind::Union, left, right, true)
}

pub fn union_all(left: SelectBuilder, right: SelectBuilder) -> SetOpBuilder {
    set_op(SetOpKind::Union, left, right, false)
}

pub fn intersect(left: SelectBuilder, right: SelectBuilder) -> SetOpBuilder {
    set_op(SetOpKind::Intersect, left, right, true)
}

pub fn except_(left: SelectBuilder, right: SelectBuilder) -> SetOpBuilder {
    set_op(SetOpKind::Except, left, right, true)
}

impl SetOpBuilder {
    pub fn order_by<I, E>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.op
            .order_by
            .extend(expressions.into_iter().map(|e| ordered(e.into_expr())));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.op.limit = Some(lit(count).0);
        self
    }

    pub fn build(self) -> Expression {
        let op = Box::new(self.op);
        match self.kind {
            SetOpKind::Union => Expression::Union(op),
            SetOpKind::Intersect => Expression::Intersect(op),
            SetOpKind::Except => Expression::Except(op),
        }
    }

    pub fn to_sql(self) -> String {
        Generator::sql(&self.build()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// DML builders
// ---------------------------------------------------------------------------

/// ```
/// use sqlshift::builder::*;
///
/// let sql = delete("users").where_(col("id").eq(lit(1))).to_sql();
/// assert_eq!(sql, "DELETE FROM users WHERE id = 1");
/// ```
pub fn delete(table_name: &str) -> DeleteBuilder {
    DeleteBuilder {
        delete: Delete {
            table: Expression::Table(builder_table_ref(table_name)),
            where_: None,
        },
    }
}

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    delete: Delete,
}

impl DeleteBuilder {
    pub fn where_(mut self, condition: Expr) -> Self {
        self.delete.where_ = Some(match self.delete.where_.take() {
            Some(existing) => existing.and(condition.0),
            None => condition.0,
        });
        self
    }

    pub fn build(self) -> Expression {
        Expression::Delete(Box::new(self.delete))
    }

    pub fn to_sql(self) -> String {
        Generator::sql(&self.build()).unwrap_or_default()
    }
}

/// ```
/// use sqlshift::builder::*;
///
/// let sql = insert_into("users")
///     .columns(["id", "name"])
///     .values([lit(1), lit("Alice")])
///     .values([lit(2), lit("Bob")])
///     .to_sql();
/// assert_eq!(sql, "INSERT INTO users (id, name) VALUES (1, 'Alice'), (2, 'Bob')");
/// ```
pub fn insert_into(table_name: &str) -> InsertBuilder {
    InsertBuilder {
        table: Expression::Table(builder_table_ref(table_name)),
        columns: Vec::new(),
        rows: Vec::new(),
        query: None,
    }
}

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: Expression,
    columns: Vec<Identifier>,
    rows: Vec<Expression>,
    query: Option<Expression>,
}

impl InsertBuilder {
    pub fn columns<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.columns.extend(names.into_iter().map(builder_identifier));
        self
    }

    /// Append one VALUES row
    pub fn values(mut self, row: impl IntoIterator<Item = Expr>) -> Self {
        self.rows.push(Expression::Tuple(Box::new(Tuple {
            expressions: row.into_iter().map(|e| e.0).collect(),
        })));
        self
    }

    /// `INSERT ... SELECT`; replaces any VALUES rows
    pub fn query(mut self, query: SelectBuilder) -> Self {
        self.query = Some(query.build());
        self
    }

    pub fn build(self) -> Expression {
        let source = self.query.unwrap_or_else(|| {
            Expression::Values(Box::new(Values {
                rows: self.rows,
                alias: None,
                column_aliases: Vec::new(),
            }))
        });
        Expression::Insert(Box::new(Insert {
            with: None,
            table: self.table,
            columns: self.columns,
            source,
        }))
    }

    pub fn to_sql(self) -> String {
        Generator::sql(&self.build()).unwrap_or_default()
    }
}

/// ```
/// use sqlshift::builder::*;
///
/// let sql = update("users")
///     .set("name", lit("Bob"))
///     .where_(col("id").eq(lit(1)))
///     .to_sql();
/// assert_eq!(sql, "UPDATE users SET name = 'Bob' WHERE id = 1");
/// ```
pub fn update(table_name: &str) -> UpdateBuilder {
    UpdateBuilder {
        update: Update {
            table: Expression::Table(builder_table_ref(table_name)),
            set: Vec::new(),
            from: None,
            where_: None,
        },
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    update: Update,
}

impl UpdateBuilder {
    pub fn set(mut self, column: &str, value: Expr) -> Self {
        self.update.set.push(col(column).eq(value).0);
        self
    }

    pub fn from(mut self, table_name: &str) -> Self {
        self.update.from = Some(table_source(table_name));
        self
    }

    pub fn where_(mut self, condition: Expr) -> Self {
        self.update.where_ = Some(match self.update.where_.take() {
            Some(existing) => existing.and(condition.0),
            None => condition.0,
        });
        self
    }

    pub fn build(self) -> Expression {
        Expression::Update(Box::new(self.update))
    }

    pub fn to_sql(self) -> String {
        Generator::sql(&self.build()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// CASE
// ---------------------------------------------------------------------------

/// Searched CASE.
///
/// ```
/// use sqlshift::builder::*;
///
/// let expr = case()
///     .when(col("x").gt(lit(0)), lit("positive"))
///     .else_(lit("non-positive"))
///     .build();
/// assert_eq!(expr.to_sql(), "CASE WHEN x > 0 THEN 'positive' ELSE 'non-positive' END");
/// ```
pub fn case() -> CaseBuilder {
    CaseBuilder {
        operand: None,
        whens: Vec::new(),
        else_: None,
    }
}

/// Simple CASE on `operand`
pub fn case_of(operand: Expr) -> CaseBuilder {
    CaseBuilder {
        operand: Some(operand.0),
        whens: Vec::new(),
        else_: None,
    }
}

#[derive(Debug, Clone)]
pub struct CaseBuilder {
    operand: Option<Expression>,
    whens: Vec<(Expression, Expression)>,
    else_: Option<Expression>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Expr, result: Expr) -> Self {
        self.whens.push((condition.0, result.0));
        self
    }

    pub fn else_(mut self, result: Expr) -> Self {
        self.else_ = Some(result.0);
        self
    }

    pub fn build(self) -> Expr {
        Expr(Expression::Case(Box::new(Case {
            operand: self.operand,
            whens: self.whens,
            else_: self.else_,
        })))
    }
}

// ---------------------------------------------------------------------------
// Conversion traits
// ---------------------------------------------------------------------------

/// Values usable where an expression is expected. Strings become columns.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        col(self)
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        col(&self)
    }
}

impl IntoExpr for Expression {
    fn into_expr(self) -> Expr {
        Expr(self)
    }
}

/// Values usable as literals. Strings become string literals.
pub trait IntoLiteral {
    fn into_literal(self) -> Expr;
}

impl IntoLiteral for &str {
    fn into_literal(self) -> Expr {
        Expr(Expression::string(self))
    }
}

impl IntoLiteral for String {
    fn into_literal(self) -> Expr {
        Expr(Expression::string(self))
    }
}

macro_rules! integer_literals {
    ($($t:ty),*) => {
        $(
            impl IntoLiteral for $t {
                fn into_literal(self) -> Expr {
                    Expr(Expression::Literal(Literal::Number(self.to_string())))
                }
            }
        )*
    };
}

integer_literals!(i32, i64, u32, u64, usize);

impl IntoLiteral for f64 {
    fn into_literal(self) -> Expr {
        Expr(Expression::float(self))
    }
}

impl IntoLiteral for bool {
    fn into_literal(self) -> Expr {
        boolean(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::{Dialect, DialectType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_qualified_table_and_column() {
        let sql = select(["t.x"]).from("cat.db.t").to_sql();
        assert_eq!(sql, "SELECT t.x FROM cat.db.t");
    }

    #[test]
    fn test_where_calls_are_anded() {
        let sql = select([star()])
            .from("t")
            .where_(col("a").eq(lit(1)))
            .where_(col("b").is_not_null())
            .to_sql();
        assert_eq!(sql, "SELECT * FROM t WHERE a = 1 AND NOT b IS NULL");
    }

    #[test]
    fn test_precedence_is_preserved() {
        let expr = col("a").add(col("b")).mul(lit(2));
        assert_eq!(expr.to_sql(), "(a + b) * 2");
        let expr = col("x").eq(lit(1)).or(col("y").eq(lit(2))).and(col("z"));
        assert_eq!(expr.to_sql(), "(x = 1 OR y = 2) AND z");
    }

    #[test]
    fn test_not_in_and_between() {
        assert_eq!(col("a").not_in([lit(1), lit(2)]).to_sql(), "NOT a IN (1, 2)");
        assert_eq!(col("a").between(lit(1), lit(9)).to_sql(), "a BETWEEN 1 AND 9");
    }

    #[test]
    fn test_subquery_source() {
        let inner = select(["id"]).from("t").where_(col("x").gt(lit(0)));
        let sql = select(["s.id"]).from_expr(subquery(inner, "s")).to_sql();
        assert_eq!(sql, "SELECT s.id FROM (SELECT id FROM t WHERE x > 0) AS s");
    }

    #[test]
    fn test_insert_from_select() {
        let sql = insert_into("archive")
            .columns(["id"])
            .query(select(["id"]).from("live"))
            .to_sql();
        assert_eq!(sql, "INSERT INTO archive (id) SELECT id FROM live");
    }

    #[test]
    fn test_cast_with_unknown_type_name() {
        assert_eq!(cast(col("g"), "geography").to_sql(), "CAST(g AS geography)");
    }

    #[test]
    fn test_condition_rejects_garbage() {
        assert!(condition("a = ").is_err());
    }

    #[test]
    fn test_built_tree_renders_in_any_dialect() {
        let expr = select(["id"]).from("t").limit(3).build();
        assert_eq!(
            Dialect::get(DialectType::TSQL).generate(&expr).unwrap(),
            "SELECT TOP 3 id FROM t"
        );
    }
}
