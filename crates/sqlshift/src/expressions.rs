//! SQL Expression AST (Abstract Syntax Tree).
//!
//! The central type is [`Expression`], a closed tagged enum with one variant
//! per SQL construct. Inner structs carry the fields for each variant, and
//! heap-heavy payloads are boxed to keep the enum small. Generation and
//! analysis code dispatch with exhaustive `match`, so a new variant must be
//! handled everywhere before the crate compiles.
//!
//! # Variant Groups
//!
//! | Group | Examples |
//! |---|---|
//! | **Queries** | `Select`, `Union`, `Intersect`, `Except`, `Subquery`, `Values`, `Cte` |
//! | **DML** | `Insert`, `Update`, `Delete` |
//! | **DDL** | `CreateTable`, `ColumnDef`, `Constraint`, `CreateView`, `Drop` |
//! | **Session** | `Use`, `Transaction`, `Commit`, `Rollback`, `Command` |
//! | **Clauses** | `Alias`, `Join`, `Ordered` |
//! | **Operators** | `And`, `Or`, `Add`, `Eq`, `Like`, `Not`, `In`, `Between` |
//! | **Functions** | `Function`, `WindowFunction`, `Extract`, `Cast`, `Case` |
//! | **Literals** | `Literal`, `Boolean`, `Null`, `Interval`, `Array` |
//! | **Names** | `Identifier`, `Column`, `Table`, `Star`, `Parameter` |
//!
//! Each node owns its children outright, so a node has exactly one
//! attachment point at any time. Parent navigation is computed on demand by
//! [`crate::traversal::TreeContext`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represent any SQL expression or statement as a single, recursive AST node.
///
/// ```
/// use sqlshift::expressions::Expression;
///
/// let expr = Expression::column("id").eq(Expression::number(42));
/// assert_eq!(expr.sql(), "id = 42");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    // Literals
    Literal(Literal),
    Boolean(BooleanLiteral),
    Null(Null),

    // Names
    Identifier(Identifier),
    Column(Column),
    Table(TableRef),
    Star(Star),
    Parameter(Parameter),
    Placeholder(Placeholder),

    // Queries
    Select(Box<Select>),
    Union(Box<SetOperation>),
    Intersect(Box<SetOperation>),
    Except(Box<SetOperation>),
    Subquery(Box<Subquery>),
    Values(Box<Values>),
    Cte(Box<Cte>),

    // DML
    Insert(Box<Insert>),
    Update(Box<Update>),
    Delete(Box<Delete>),

    // DDL
    CreateTable(Box<CreateTable>),
    ColumnDef(Box<ColumnDef>),
    Constraint(Box<TableConstraint>),
    CreateView(Box<CreateView>),
    Drop(Box<DropObject>),

    // Session and transaction control
    Use(Box<Use>),
    Transaction(Box<Transaction>),
    Commit(Box<Commit>),
    Rollback(Box<Rollback>),
    /// Statement kept as raw text
    Command(Box<Command>),

    // Clauses
    Alias(Box<Alias>),
    Join(Box<Join>),
    Ordered(Box<Ordered>),

    // Types and casts
    Cast(Box<Cast>),
    TryCast(Box<Cast>),
    DataType(DataType),

    // Compound expressions
    Case(Box<Case>),
    Paren(Box<Paren>),
    Tuple(Box<Tuple>),
    Array(Box<ArrayExpr>),
    Bracket(Box<Bracket>),
    Interval(Box<Interval>),
    Extract(Box<Extract>),
    Function(Box<Function>),
    WindowFunction(Box<WindowFunction>),
    Collate(Box<Collate>),

    // Predicates
    Exists(Box<Exists>),
    In(Box<In>),
    Between(Box<Between>),
    Like(Box<LikeOp>),
    ILike(Box<LikeOp>),
    RegexpLike(Box<BinaryOp>),
    Is(Box<BinaryOp>),

    // Unary operators
    Not(Box<UnaryOp>),
    Neg(Box<UnaryOp>),
    BitwiseNot(Box<UnaryOp>),
    Any(Box<UnaryOp>),
    All(Box<UnaryOp>),

    // Binary operators
    And(Box<BinaryOp>),
    Or(Box<BinaryOp>),
    Add(Box<BinaryOp>),
    Sub(Box<BinaryOp>),
    Mul(Box<BinaryOp>),
    Div(Box<BinaryOp>),
    Mod(Box<BinaryOp>),
    Eq(Box<BinaryOp>),
    Neq(Box<BinaryOp>),
    NullSafeEq(Box<BinaryOp>),
    Lt(Box<BinaryOp>),
    Lte(Box<BinaryOp>),
    Gt(Box<BinaryOp>),
    Gte(Box<BinaryOp>),
    Concat(Box<BinaryOp>),
    BitwiseAnd(Box<BinaryOp>),
    BitwiseOr(Box<BinaryOp>),
    BitwiseXor(Box<BinaryOp>),
    ShiftLeft(Box<BinaryOp>),
    ShiftRight(Box<BinaryOp>),
    JsonExtract(Box<BinaryOp>),
    JsonExtractScalar(Box<BinaryOp>),

    // Niladic functions
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
}

/// Fieldless tag naming the variant of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpressionKind {
    Literal,
    Boolean,
    Null,
    Identifier,
    Column,
    Table,
    Star,
    Parameter,
    Placeholder,
    Select,
    Union,
    Intersect,
    Except,
    Subquery,
    Values,
    Cte,
    Insert,
    Update,
    Delete,
    CreateTable,
    ColumnDef,
    Constraint,
    CreateView,
    Drop,
    Use,
    Transaction,
    Commit,
    Rollback,
    Command,
    Alias,
    Join,
    Ordered,
    Cast,
    TryCast,
    DataType,
    Case,
    Paren,
    Tuple,
    Array,
    Bracket,
    Interval,
    Extract,
    Function,
    WindowFunction,
    Collate,
    Exists,
    In,
    Between,
    Like,
    ILike,
    RegexpLike,
    Is,
    Not,
    Neg,
    BitwiseNot,
    Any,
    All,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    NullSafeEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Concat,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    JsonExtract,
    JsonExtractScalar,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Generates the child visitor for shared and mutable borrows from one body.
///
/// The callback receives the argument role, the index within a list role
/// (`None` for single-valued roles), and the child itself.
macro_rules! visit_children {
    ($name:ident $(, $m:tt)?) => {
        pub fn $name<'a, F>(&'a $($m)? self, mut f: F)
        where
            F: FnMut(&'static str, Option<usize>, &'a $($m)? Expression),
        {
            match self {
                Expression::Literal(_)
                | Expression::Boolean(_)
                | Expression::Null(_)
                | Expression::Identifier(_)
                | Expression::Column(_)
                | Expression::Table(_)
                | Expression::Star(_)
                | Expression::Parameter(_)
                | Expression::Placeholder(_)
                | Expression::DataType(_)
                | Expression::Use(_)
                | Expression::Transaction(_)
                | Expression::Commit(_)
                | Expression::Rollback(_)
                | Expression::Command(_)
                | Expression::CurrentDate
                | Expression::CurrentTime
                | Expression::CurrentTimestamp => {}

                Expression::Select(s) => {
                    if let Some(with) = & $($m)? s.with {
                        for (i, c) in (& $($m)? with.ctes).into_iter().enumerate() {
                            f("with", Some(i), c);
                        }
                    }
                    for (i, c) in (& $($m)? s.distinct_on).into_iter().enumerate() {
                        f("distinct_on", Some(i), c);
                    }
                    for (i, c) in (& $($m)? s.expressions).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                    for (i, c) in (& $($m)? s.from).into_iter().enumerate() {
                        f("from", Some(i), c);
                    }
                    for (i, c) in (& $($m)? s.joins).into_iter().enumerate() {
                        f("joins", Some(i), c);
                    }
                    if let Some(c) = & $($m)? s.where_ {
                        f("where", None, c);
                    }
                    for (i, c) in (& $($m)? s.group_by).into_iter().enumerate() {
                        f("group", Some(i), c);
                    }
                    if let Some(c) = & $($m)? s.having {
                        f("having", None, c);
                    }
                    for window in & $($m)? s.windows {
                        let spec = & $($m)? window.spec;
                        for (i, c) in (& $($m)? spec.partition_by).into_iter().enumerate() {
                            f("partition_by", Some(i), c);
                        }
                        for (i, c) in (& $($m)? spec.order_by).into_iter().enumerate() {
                            f("order", Some(i), c);
                        }
                        if let Some(frame) = & $($m)? spec.frame {
                            for bound in [& $($m)? frame.start].into_iter().chain(& $($m)? frame.end) {
                                if let FrameBound::Preceding(c) | FrameBound::Following(c) = bound {
                                    f("frame", None, c);
                                }
                            }
                        }
                    }
                    if let Some(c) = & $($m)? s.qualify {
                        f("qualify", None, c);
                    }
                    for (i, c) in (& $($m)? s.order_by).into_iter().enumerate() {
                        f("order", Some(i), c);
                    }
                    if let Some(c) = & $($m)? s.limit {
                        f("limit", None, c);
                    }
                    if let Some(c) = & $($m)? s.offset {
                        f("offset", None, c);
                    }
                }
                Expression::Union(s) | Expression::Intersect(s) | Expression::Except(s) => {
                    if let Some(with) = & $($m)? s.with {
                        for (i, c) in (& $($m)? with.ctes).into_iter().enumerate() {
                            f("with", Some(i), c);
                        }
                    }
                    f("this", None, & $($m)? s.left);
                    f("expression", None, & $($m)? s.right);
                    for (i, c) in (& $($m)? s.order_by).into_iter().enumerate() {
                        f("order", Some(i), c);
                    }
                    if let Some(c) = & $($m)? s.limit {
                        f("limit", None, c);
                    }
                    if let Some(c) = & $($m)? s.offset {
                        f("offset", None, c);
                    }
                }
                Expression::Subquery(s) => f("this", None, & $($m)? s.this),
                Expression::Values(v) => {
                    for (i, c) in (& $($m)? v.rows).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                }
                Expression::Cte(c) => f("this", None, & $($m)? c.this),

                Expression::Insert(ins) => {
                    if let Some(with) = & $($m)? ins.with {
                        for (i, c) in (& $($m)? with.ctes).into_iter().enumerate() {
                            f("with", Some(i), c);
                        }
                    }
                    f("this", None, & $($m)? ins.table);
                    f("expression", None, & $($m)? ins.source);
                }
                Expression::Update(u) => {
                    f("this", None, & $($m)? u.table);
                    for (i, c) in (& $($m)? u.set).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                    if let Some(c) = & $($m)? u.from {
                        f("from", None, c);
                    }
                    if let Some(c) = & $($m)? u.where_ {
                        f("where", None, c);
                    }
                }
                Expression::Delete(d) => {
                    f("this", None, & $($m)? d.table);
                    if let Some(c) = & $($m)? d.where_ {
                        f("where", None, c);
                    }
                }

                Expression::CreateTable(ct) => {
                    f("this", None, & $($m)? ct.table);
                    for (i, c) in (& $($m)? ct.columns).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                    if let Some(c) = & $($m)? ct.as_query {
                        f("expression", None, c);
                    }
                }
                Expression::ColumnDef(cd) => {
                    for (i, constraint) in (& $($m)? cd.constraints).into_iter().enumerate() {
                        if let ColumnConstraint::Default(c) | ColumnConstraint::Check(c) = constraint {
                            f("constraints", Some(i), c);
                        }
                    }
                }
                Expression::Constraint(tc) => {
                    if let TableConstraintKind::Check(c) = & $($m)? tc.kind {
                        f("this", None, c);
                    }
                }
                Expression::CreateView(v) => {
                    f("this", None, & $($m)? v.name);
                    f("expression", None, & $($m)? v.query);
                }
                Expression::Drop(d) => {
                    for (i, c) in (& $($m)? d.names).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                }

                Expression::Alias(a) => f("this", None, & $($m)? a.this),
                Expression::Join(j) => {
                    f("this", None, & $($m)? j.this);
                    if let Some(c) = & $($m)? j.on {
                        f("on", None, c);
                    }
                }
                Expression::Ordered(o) => f("this", None, & $($m)? o.this),

                Expression::Cast(c) | Expression::TryCast(c) => f("this", None, & $($m)? c.this),
                Expression::Case(c) => {
                    if let Some(operand) = & $($m)? c.operand {
                        f("this", None, operand);
                    }
                    for (i, (condition, result)) in (& $($m)? c.whens).into_iter().enumerate() {
                        f("ifs", Some(2 * i), condition);
                        f("ifs", Some(2 * i + 1), result);
                    }
                    if let Some(default) = & $($m)? c.else_ {
                        f("default", None, default);
                    }
                }
                Expression::Paren(p) => f("this", None, & $($m)? p.this),
                Expression::Tuple(t) => {
                    for (i, c) in (& $($m)? t.expressions).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                }
                Expression::Array(a) => {
                    for (i, c) in (& $($m)? a.expressions).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                }
                Expression::Bracket(b) => {
                    f("this", None, & $($m)? b.this);
                    for (i, c) in (& $($m)? b.index).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                }
                Expression::Interval(iv) => f("this", None, & $($m)? iv.this),
                Expression::Extract(e) => f("this", None, & $($m)? e.this),
                Expression::Function(func) => {
                    for (i, c) in (& $($m)? func.args).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                    if let Some(c) = & $($m)? func.filter {
                        f("filter", None, c);
                    }
                }
                Expression::WindowFunction(w) => {
                    f("this", None, & $($m)? w.this);
                    let spec = & $($m)? w.over;
                    for (i, c) in (& $($m)? spec.partition_by).into_iter().enumerate() {
                        f("partition_by", Some(i), c);
                    }
                    for (i, c) in (& $($m)? spec.order_by).into_iter().enumerate() {
                        f("order", Some(i), c);
                    }
                    if let Some(frame) = & $($m)? spec.frame {
                        for bound in [& $($m)? frame.start].into_iter().chain(& $($m)? frame.end) {
                            if let FrameBound::Preceding(c) | FrameBound::Following(c) = bound {
                                f("frame", None, c);
                            }
                        }
                    }
                }
                Expression::Collate(c) => f("this", None, & $($m)? c.this),

                Expression::Exists(e) => f("this", None, & $($m)? e.this),
                Expression::In(inn) => {
                    f("this", None, & $($m)? inn.this);
                    for (i, c) in (& $($m)? inn.expressions).into_iter().enumerate() {
                        f("expressions", Some(i), c);
                    }
                    if let Some(c) = & $($m)? inn.query {
                        f("query", None, c);
                    }
                }
                Expression::Between(b) => {
                    f("this", None, & $($m)? b.this);
                    f("low", None, & $($m)? b.low);
                    f("high", None, & $($m)? b.high);
                }
                Expression::Like(l) | Expression::ILike(l) => {
                    f("this", None, & $($m)? l.left);
                    f("expression", None, & $($m)? l.right);
                    if let Some(c) = & $($m)? l.escape {
                        f("escape", None, c);
                    }
                }

                Expression::Not(u)
                | Expression::Neg(u)
                | Expression::BitwiseNot(u)
                | Expression::Any(u)
                | Expression::All(u) => f("this", None, & $($m)? u.this),

                Expression::RegexpLike(b)
                | Expression::Is(b)
                | Expression::And(b)
                | Expression::Or(b)
                | Expression::Add(b)
                | Expression::Sub(b)
                | Expression::Mul(b)
                | Expression::Div(b)
                | Expression::Mod(b)
                | Expression::Eq(b)
                | Expression::Neq(b)
                | Expression::NullSafeEq(b)
                | Expression::Lt(b)
                | Expression::Lte(b)
                | Expression::Gt(b)
                | Expression::Gte(b)
                | Expression::Concat(b)
                | Expression::BitwiseAnd(b)
                | Expression::BitwiseOr(b)
                | Expression::BitwiseXor(b)
                | Expression::ShiftLeft(b)
                | Expression::ShiftRight(b)
                | Expression::JsonExtract(b)
                | Expression::JsonExtractScalar(b) => {
                    f("this", None, & $($m)? b.left);
                    f("expression", None, & $($m)? b.right);
                }
            }
        }
    };
}

impl Expression {
    visit_children!(for_each_child);
    visit_children!(for_each_child_mut, mut);

    /// The kind tag of this node
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Literal(_) => ExpressionKind::Literal,
            Expression::Boolean(_) => ExpressionKind::Boolean,
            Expression::Null(_) => ExpressionKind::Null,
            Expression::Identifier(_) => ExpressionKind::Identifier,
            Expression::Column(_) => ExpressionKind::Column,
            Expression::Table(_) => ExpressionKind::Table,
            Expression::Star(_) => ExpressionKind::Star,
            Expression::Parameter(_) => ExpressionKind::Parameter,
            Expression::Placeholder(_) => ExpressionKind::Placeholder,
            Expression::Select(_) => ExpressionKind::Select,
            Expression::Union(_) => ExpressionKind::Union,
            Expression::Intersect(_) => ExpressionKind::Intersect,
            Expression::Except(_) => ExpressionKind::Except,
            Expression::Subquery(_) => ExpressionKind::Subquery,
            Expression::Values(_) => ExpressionKind::Values,
            Expression::Cte(_) => ExpressionKind::Cte,
            Expression::Insert(_) => ExpressionKind::Insert,
            Expression::Update(_) => ExpressionKind::Update,
            Expression::Delete(_) => ExpressionKind::Delete,
            Expression::CreateTable(_) => ExpressionKind::CreateTable,
            Expression::ColumnDef(_) => ExpressionKind::ColumnDef,
            Expression::Constraint(_) => ExpressionKind::Constraint,
            Expression::CreateView(_) => ExpressionKind::CreateView,
            Expression::Drop(_) => ExpressionKind::Drop,
            Expression::Use(_) => ExpressionKind::Use,
            Expression::Transaction(_) => ExpressionKind::Transaction,
            Expression::Commit(_) => ExpressionKind::Commit,
            Expression::Rollback(_) => ExpressionKind::Rollback,
            Expression::Command(_) => ExpressionKind::Command,
            Expression::Alias(_) => ExpressionKind::Alias,
            Expression::Join(_) => ExpressionKind::Join,
            Expression::Ordered(_) => ExpressionKind::Ordered,
            Expression::Cast(_) => ExpressionKind::Cast,
            Expression::TryCast(_) => ExpressionKind::TryCast,
            Expression::DataType(_) => ExpressionKind::DataType,
            Expression::Case(_) => ExpressionKind::Case,
            Expression::Paren(_) => ExpressionKind::Paren,
            Expression::Tuple(_) => ExpressionKind::Tuple,
            Expression::Array(_) => ExpressionKind::Array,
            Expression::Bracket(_) => ExpressionKind::Bracket,
            Expression::Interval(_) => ExpressionKind::Interval,
            Expression::Extract(_) => ExpressionKind::Extract,
            Expression::Function(_) => ExpressionKind::Function,
            Expression::WindowFunction(_) => ExpressionKind::WindowFunction,
            Expression::Collate(_) => ExpressionKind::Collate,
            Expression::Exists(_) => ExpressionKind::Exists,
            Expression::In(_) => ExpressionKind::In,
            Expression::Between(_) => ExpressionKind::Between,
            Expression::Like(_) => ExpressionKind::Like,
            Expression::ILike(_) => ExpressionKind::ILike,
            Expression::RegexpLike(_) => ExpressionKind::RegexpLike,
            Expression::Is(_) => ExpressionKind::Is,
            Expression::Not(_) => ExpressionKind::Not,
            Expression::Neg(_) => ExpressionKind::Neg,
            Expression::BitwiseNot(_) => ExpressionKind::BitwiseNot,
            Expression::Any(_) => ExpressionKind::Any,
            Expression::All(_) => ExpressionKind::All,
            Expression::And(_) => ExpressionKind::And,
            Expression::Or(_) => ExpressionKind::Or,
            Expression::Add(_) => ExpressionKind::Add,
            Expression::Sub(_) => ExpressionKind::Sub,
            Expression::Mul(_) => ExpressionKind::Mul,
            Expression::Div(_) => ExpressionKind::Div,
            Expression::Mod(_) => ExpressionKind::Mod,
            Expression::Eq(_) => ExpressionKind::Eq,
            Expression::Neq(_) => ExpressionKind::Neq,
            Expression::NullSafeEq(_) => ExpressionKind::NullSafeEq,
            Expression::Lt(_) => ExpressionKind::Lt,
            Expression::Lte(_) => ExpressionKind::Lte,
            Expression::Gt(_) => ExpressionKind::Gt,
            Expression::Gte(_) => ExpressionKind::Gte,
            Expression::Concat(_) => ExpressionKind::Concat,
            Expression::BitwiseAnd(_) => ExpressionKind::BitwiseAnd,
            Expression::BitwiseOr(_) => ExpressionKind::BitwiseOr,
            Expression::BitwiseXor(_) => ExpressionKind::BitwiseXor,
            Expression::ShiftLeft(_) => ExpressionKind::ShiftLeft,
            Expression::ShiftRight(_) => ExpressionKind::ShiftRight,
            Expression::JsonExtract(_) => ExpressionKind::JsonExtract,
            Expression::JsonExtractScalar(_) => ExpressionKind::JsonExtractScalar,
            Expression::CurrentDate => ExpressionKind::CurrentDate,
            Expression::CurrentTime => ExpressionKind::CurrentTime,
            Expression::CurrentTimestamp => ExpressionKind::CurrentTimestamp,
        }
    }

    /// Every child with its argument role and list index, in source order.
    pub fn args(&self) -> Vec<(&'static str, Option<usize>, &Expression)> {
        let mut out = Vec::new();
        self.for_each_child(|role, index, child| out.push((role, index, child)));
        out
    }

    /// Mutable counterpart of [`Expression::args`].
    pub fn args_mut(&mut self) -> Vec<(&'static str, Option<usize>, &mut Expression)> {
        let mut out = Vec::new();
        self.for_each_child_mut(|role, index, child| out.push((role, index, child)));
        out
    }

    /// The first child under `role`.
    pub fn arg(&self, role: &str) -> Option<&Expression> {
        self.args().into_iter().find(|(r, _, _)| *r == role).map(|(_, _, e)| e)
    }

    /// The `this` argument, the primary operand of most nodes.
    pub fn this(&self) -> Option<&Expression> {
        self.arg("this")
    }

    /// Children listed under the `expressions` role.
    pub fn expressions(&self) -> Vec<&Expression> {
        self.args()
            .into_iter()
            .filter(|(r, _, _)| *r == "expressions")
            .map(|(_, _, e)| e)
            .collect()
    }

    /// Deep clone that starts a fresh, unattached tree.
    pub fn copy(&self) -> Expression {
        self.clone()
    }

    /// Detach this node, leaving `NULL` at its former position.
    pub fn take(&mut self) -> Expression {
        std::mem::replace(self, Expression::Null(Null))
    }

    /// Replace this node in place, returning the detached previous node.
    pub fn replace(&mut self, with: Expression) -> Expression {
        std::mem::replace(self, with)
    }

    /// Returns `true` if this expression is a top-level SQL statement.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Expression::Select(_)
                | Expression::Union(_)
                | Expression::Intersect(_)
                | Expression::Except(_)
                | Expression::Subquery(_)
                | Expression::Values(_)
                | Expression::Insert(_)
                | Expression::Update(_)
                | Expression::Delete(_)
                | Expression::CreateTable(_)
                | Expression::CreateView(_)
                | Expression::Drop(_)
                | Expression::Use(_)
                | Expression::Transaction(_)
                | Expression::Commit(_)
                | Expression::Rollback(_)
                | Expression::Command(_)
        )
    }

    /// Whether this is a query that can appear as a subquery or set operand
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Expression::Select(_)
                | Expression::Union(_)
                | Expression::Intersect(_)
                | Expression::Except(_)
                | Expression::Values(_)
        )
    }

    /// Name of a named node: column, table, identifier, function, CTE.
    pub fn name(&self) -> Option<&str> {
        match self {
            Expression::Identifier(id) => Some(&id.name),
            Expression::Column(c) => Some(&c.name.name),
            Expression::Table(t) => Some(&t.name.name),
            Expression::Function(f) => Some(&f.name),
            Expression::Cte(c) => Some(&c.alias.name),
            Expression::ColumnDef(c) => Some(&c.name.name),
            _ => None,
        }
    }

    /// Alias name for aliased nodes
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Expression::Alias(a) => Some(&a.alias.name),
            Expression::Table(t) => t.alias.as_ref().map(|a| a.name.as_str()),
            Expression::Subquery(s) => s.alias.as_ref().map(|a| a.name.as_str()),
            Expression::Values(v) => v.alias.as_ref().map(|a| a.name.as_str()),
            _ => None,
        }
    }

    /// The name an output column of a SELECT is known by.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Expression::Alias(a) => Some(&a.alias.name),
            Expression::Column(c) => Some(&c.name.name),
            Expression::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }

    // Constructors

    pub fn number(n: i64) -> Self {
        Expression::Literal(Literal::Number(n.to_string()))
    }

    pub fn float(f: f64) -> Self {
        Expression::Literal(Literal::Number(f.to_string()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(s.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Boolean(BooleanLiteral { value })
    }

    pub fn null() -> Self {
        Expression::Null(Null)
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(Identifier::new(name))
    }

    /// Unqualified column reference
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(Column::new(name))
    }

    /// Qualified column reference (`table.column`)
    pub fn qualified_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        let mut c = Column::new(column);
        c.table = Some(Identifier::new(table));
        Expression::Column(c)
    }

    pub fn table(name: impl Into<String>) -> Self {
        Expression::Table(TableRef::new(name))
    }

    pub fn star() -> Self {
        Expression::Star(Star { table: None })
    }

    /// Function call with an unquoted name
    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function(Box::new(Function::new(name, args)))
    }

    /// Wrap this expression in an `AS` alias
    pub fn alias(self, name: impl Into<String>) -> Self {
        Expression::Alias(Box::new(Alias::new(self, Identifier::new(name))))
    }

    pub fn and(self, other: Expression) -> Self {
        Expression::And(Box::new(BinaryOp::new(self, other)))
    }

    pub fn or(self, other: Expression) -> Self {
        Expression::Or(Box::new(BinaryOp::new(self, other)))
    }

    pub fn eq(self, other: Expression) -> Self {
        Expression::Eq(Box::new(BinaryOp::new(self, other)))
    }

    pub fn not(self) -> Self {
        Expression::Not(Box::new(UnaryOp::new(self)))
    }

    pub fn paren(self) -> Self {
        Expression::Paren(Box::new(Paren { this: self }))
    }

    pub fn cast(self, to: DataType) -> Self {
        Expression::Cast(Box::new(Cast {
            this: self,
            to,
            double_colon: false,
        }))
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            Expression::Select(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut Select> {
        match self {
            Expression::Select(s) => Some(s),
            _ => None,
        }
    }

    /// Generate SQL for this expression using the generic dialect.
    ///
    /// Returns an empty string if generation fails; use
    /// [`crate::generate`] to observe the error.
    pub fn sql(&self) -> String {
        crate::generator::Generator::sql(self).unwrap_or_default()
    }

    /// Generate SQL for this expression in a specific dialect.
    pub fn sql_for(&self, dialect: crate::dialects::DialectType) -> String {
        crate::generate(self, dialect).unwrap_or_default()
    }

    /// Serialize the tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::internal(format!("failed to serialize expression: {e}")))
    }

    /// Rebuild a tree from [`Expression::to_json`] output
    pub fn from_json(json: &str) -> Result<Expression> {
        serde_json::from_str(json).map_err(|e| Error::internal(format!("failed to deserialize expression: {e}")))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Literal constant, stored as source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// `'hello'`
    String(String),
    /// `42`, `3.14`, `1e10`
    Number(String),
    /// `X'FF'`
    HexString(String),
    /// `B'0101'`
    BitString(String),
    /// `b'..'` in dialects where that means bytes
    ByteString(String),
    /// `N'abc'`
    NationalString(String),
    /// `E'..'`
    EscapeString(String),
}

impl Literal {
    pub fn is_string(&self) -> bool {
        !matches!(self, Literal::Number(_))
    }

    pub fn value(&self) -> &str {
        match self {
            Literal::String(s)
            | Literal::Number(s)
            | Literal::HexString(s)
            | Literal::BitString(s)
            | Literal::ByteString(s)
            | Literal::NationalString(s)
            | Literal::EscapeString(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Null;

/// A name: table, column, alias, or keyword used as a name.
///
/// `quoted` records whether the source delimited it; the generator quotes
/// it with the target dialect's identifier quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(default)]
    pub quoted: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: true,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.name.replace('"', "\"\""))
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Column reference, optionally qualified by table and database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: Identifier,
    pub table: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<Identifier>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Identifier::new(name),
            table: None,
            db: None,
        }
    }
}

/// Table reference with optional qualifiers and alias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: Identifier,
    pub db: Option<Identifier>,
    pub catalog: Option<Identifier>,
    pub alias: Option<Identifier>,
    /// `AS t(c1, c2)`
    #[serde(default)]
    pub column_aliases: Vec<Identifier>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Identifier::new(name),
            db: None,
            catalog: None,
            alias: None,
            column_aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(Identifier::new(alias));
        self
    }
}

/// `*` or `t.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub table: Option<Identifier>,
}

/// Named or numbered bind parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub style: ParameterStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterStyle {
    /// `$1`
    Dollar,
    /// `:name`
    Colon,
    /// `@name`
    At,
    /// `@@name`
    DoubleAt,
}

/// `?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder;

/// `WITH [RECURSIVE] name AS (...), ...`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct With {
    pub recursive: bool,
    /// Each entry is an [`Expression::Cte`]
    pub ctes: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub this: Expression,
    pub alias: Identifier,
    #[serde(default)]
    pub columns: Vec<Identifier>,
}

/// A complete SELECT statement.
///
/// Empty lists and `None` fields are omitted from generated SQL.
/// `from` holds comma-separated sources; `joins` holds [`Expression::Join`]
/// nodes and `order_by` holds [`Expression::Ordered`] nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    pub with: Option<With>,
    pub distinct: bool,
    /// `DISTINCT ON (...)`
    #[serde(default)]
    pub distinct_on: Vec<Expression>,
    pub expressions: Vec<Expression>,
    pub from: Vec<Expression>,
    pub joins: Vec<Expression>,
    pub where_: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    #[serde(default)]
    pub windows: Vec<NamedWindow>,
    pub qualify: Option<Expression>,
    pub order_by: Vec<Expression>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a projection in place
    pub fn add_column(&mut self, expr: Expression) -> &mut Self {
        self.expressions.push(expr);
        self
    }

    /// AND a condition into the WHERE clause in place
    pub fn add_where(&mut self, condition: Expression) -> &mut Self {
        self.where_ = Some(match self.where_.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }
}

/// `UNION`, `INTERSECT` or `EXCEPT`, distinguished by the enclosing variant.
///
/// Trailing `ORDER BY`/`LIMIT` apply to the whole operation and live here,
/// not on the right operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOperation {
    pub with: Option<With>,
    pub left: Expression,
    pub right: Expression,
    /// `false` for the `ALL` form
    pub distinct: bool,
    #[serde(default)]
    pub order_by: Vec<Expression>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

impl SetOperation {
    pub fn new(left: Expression, right: Expression, distinct: bool) -> Self {
        Self {
            with: None,
            left,
            right,
            distinct,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// Parenthesized query, optionally aliased
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    pub this: Expression,
    pub alias: Option<Identifier>,
    #[serde(default)]
    pub column_aliases: Vec<Identifier>,
}

/// `VALUES (..), (..)`; each row is an [`Expression::Tuple`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Values {
    pub rows: Vec<Expression>,
    pub alias: Option<Identifier>,
    #[serde(default)]
    pub column_aliases: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub with: Option<With>,
    pub table: Expression,
    #[serde(default)]
    pub columns: Vec<Identifier>,
    /// VALUES or a query
    pub source: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: Expression,
    /// Assignments as [`Expression::Eq`] nodes
    pub set: Vec<Expression>,
    pub from: Option<Expression>,
    pub where_: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table: Expression,
    pub where_: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub table: Expression,
    pub if_not_exists: bool,
    pub temporary: bool,
    pub replace: bool,
    /// [`Expression::ColumnDef`] and [`Expression::Constraint`] entries
    pub columns: Vec<Expression>,
    pub as_query: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: Identifier,
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub constraints: Vec<ColumnConstraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    Default(Expression),
    Check(Expression),
    References { table: TableRef, columns: Vec<Identifier> },
    Collate(Identifier),
}

/// Table-level constraint in CREATE TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstraint {
    pub name: Option<Identifier>,
    pub kind: TableConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableConstraintKind {
    PrimaryKey(Vec<Identifier>),
    Unique(Vec<Identifier>),
    Check(Expression),
    ForeignKey {
        columns: Vec<Identifier>,
        table: TableRef,
        references: Vec<Identifier>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateView {
    pub name: Expression,
    pub replace: bool,
    pub if_not_exists: bool,
    #[serde(default)]
    pub columns: Vec<Identifier>,
    pub query: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropObject {
    /// Object kind keyword, uppercase (`TABLE`, `VIEW`, `INDEX`, `SCHEMA`)
    pub kind: String,
    pub if_exists: bool,
    pub names: Vec<Expression>,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Use {
    /// Optional object kind such as `DATABASE` or `SCHEMA`
    pub kind: Option<String>,
    pub this: Identifier,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Whether the TRANSACTION keyword was written
    pub keyword: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Commit;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rollback;

/// Statement the parser does not model, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Leading keyword, uppercase
    pub this: String,
    /// Raw remainder of the statement
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub this: Expression,
    pub alias: Identifier,
    #[serde(default)]
    pub column_aliases: Vec<Identifier>,
}

impl Alias {
    pub fn new(this: Expression, alias: Identifier) -> Self {
        Self {
            this,
            alias,
            column_aliases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinSide {
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Outer,
    Cross,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub this: Expression,
    pub side: Option<JoinSide>,
    pub kind: Option<JoinKind>,
    #[serde(default)]
    pub natural: bool,
    pub on: Option<Expression>,
    #[serde(default)]
    pub using: Vec<Identifier>,
}

impl Join {
    /// Plain `JOIN this`
    pub fn new(this: Expression) -> Self {
        Self {
            this,
            side: None,
            kind: None,
            natural: false,
            on: None,
            using: Vec::new(),
        }
    }
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordered {
    pub this: Expression,
    pub desc: bool,
    /// Explicit `NULLS FIRST` / `NULLS LAST`, if written
    pub nulls_first: Option<bool>,
}

/// `CAST(x AS t)`; also the payload of `TRY_CAST`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub this: Expression,
    pub to: DataType,
    /// Written with the `::` operator
    #[serde(default)]
    pub double_colon: bool,
}

/// Canonical type names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    NChar,
    NVarChar,
    Text,
    Binary,
    VarBinary,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    DateTime,
    Interval,
    Json,
    Uuid,
    Array,
    /// Any other name, kept as written
    UserDefined(String),
}

impl DataTypeKind {
    /// Resolve a written type name, including common aliases.
    pub fn from_name(name: &str) -> DataTypeKind {
        let upper = name.to_uppercase();
        match upper.as_str() {
            "BOOLEAN" | "BOOL" => DataTypeKind::Boolean,
            "TINYINT" => DataTypeKind::TinyInt,
            "SMALLINT" | "INT2" => DataTypeKind::SmallInt,
            "INT" | "INTEGER" | "INT4" => DataTypeKind::Int,
            "BIGINT" | "INT8" | "INT64" => DataTypeKind::BigInt,
            "FLOAT" | "REAL" | "FLOAT4" => DataTypeKind::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT64" => DataTypeKind::Double,
            "DECIMAL" | "NUMERIC" | "NUMBER" => DataTypeKind::Decimal,
            "CHAR" | "CHARACTER" => DataTypeKind::Char,
            "VARCHAR" | "CHARACTER VARYING" | "VARCHAR2" => DataTypeKind::VarChar,
            "NCHAR" => DataTypeKind::NChar,
            "NVARCHAR" | "NVARCHAR2" => DataTypeKind::NVarChar,
            "TEXT" | "STRING" | "CLOB" => DataTypeKind::Text,
            "BINARY" => DataTypeKind::Binary,
            "VARBINARY" | "BYTEA" | "BYTES" => DataTypeKind::VarBinary,
            "BLOB" => DataTypeKind::Blob,
            "DATE" => DataTypeKind::Date,
            "TIME" => DataTypeKind::Time,
            "TIMESTAMP" => DataTypeKind::Timestamp,
            "TIMESTAMPTZ" => DataTypeKind::TimestampTz,
            "DATETIME" | "DATETIME2" => DataTypeKind::DateTime,
            "INTERVAL" => DataTypeKind::Interval,
            "JSON" | "JSONB" => DataTypeKind::Json,
            "UUID" | "UNIQUEIDENTIFIER" => DataTypeKind::Uuid,
            "ARRAY" => DataTypeKind::Array,
            _ => DataTypeKind::UserDefined(name.to_string()),
        }
    }

    /// Spelling used when no dialect mapping applies
    pub fn canonical_name(&self) -> &str {
        match self {
            DataTypeKind::Boolean => "BOOLEAN",
            DataTypeKind::TinyInt => "TINYINT",
            DataTypeKind::SmallInt => "SMALLINT",
            DataTypeKind::Int => "INT",
            DataTypeKind::BigInt => "BIGINT",
            DataTypeKind::Float => "FLOAT",
            DataTypeKind::Double => "DOUBLE",
            DataTypeKind::Decimal => "DECIMAL",
            DataTypeKind::Char => "CHAR",
            DataTypeKind::VarChar => "VARCHAR",
            DataTypeKind::NChar => "NCHAR",
            DataTypeKind::NVarChar => "NVARCHAR",
            DataTypeKind::Text => "TEXT",
            DataTypeKind::Binary => "BINARY",
            DataTypeKind::VarBinary => "VARBINARY",
            DataTypeKind::Blob => "BLOB",
            DataTypeKind::Date => "DATE",
            DataTypeKind::Time => "TIME",
            DataTypeKind::Timestamp => "TIMESTAMP",
            DataTypeKind::TimestampTz => "TIMESTAMPTZ",
            DataTypeKind::DateTime => "DATETIME",
            DataTypeKind::Interval => "INTERVAL",
            DataTypeKind::Json => "JSON",
            DataTypeKind::Uuid => "UUID",
            DataTypeKind::Array => "ARRAY",
            DataTypeKind::UserDefined(name) => name,
        }
    }
}

/// A data type with its parameters: `DECIMAL(10, 2)`, `ARRAY<INT>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    pub kind: DataTypeKind,
    /// Raw parameter text such as `10` or `MAX`
    #[serde(default)]
    pub params: Vec<String>,
    /// Element types of nested types
    #[serde(default)]
    pub nested: Vec<DataType>,
}

impl DataType {
    pub fn new(kind: DataTypeKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn array_of(element: DataType) -> Self {
        Self {
            kind: DataTypeKind::Array,
            params: Vec::new(),
            nested: vec![element],
        }
    }
}

/// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub operand: Option<Expression>,
    pub whens: Vec<(Expression, Expression)>,
    pub else_: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paren {
    pub this: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub expressions: Vec<Expression>,
}

/// Array constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpr {
    pub expressions: Vec<Expression>,
    /// Written with the ARRAY keyword
    #[serde(default)]
    pub keyword: bool,
}

/// Subscript: `x[1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub this: Expression,
    pub index: Vec<Expression>,
}

/// `INTERVAL '1' DAY`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub this: Expression,
    /// Unit keyword, uppercase
    pub unit: Option<String>,
}

/// `EXTRACT(part FROM this)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extract {
    /// Date part, uppercase
    pub part: String,
    pub this: Expression,
}

/// Function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Name as written
    pub name: String,
    pub args: Vec<Expression>,
    #[serde(default)]
    pub distinct: bool,
    /// Whether the name was a quoted identifier
    #[serde(default)]
    pub quoted: bool,
    /// Aggregate `FILTER (WHERE ...)`
    #[serde(default)]
    pub filter: Option<Expression>,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
            quoted: false,
            filter: None,
        }
    }
}

/// `func(...) OVER (...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFunction {
    pub this: Expression,
    pub over: Over,
}

/// Window specification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Over {
    /// Reference to a named window (`OVER w` or `OVER (w ...)`)
    pub window_name: Option<Identifier>,
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<Expression>,
    pub frame: Option<WindowFrame>,
}

impl Over {
    /// `OVER w` with nothing else
    pub fn is_bare_reference(&self) -> bool {
        self.window_name.is_some() && self.partition_by.is_empty() && self.order_by.is_empty() && self.frame.is_none()
    }
}

/// `WINDOW name AS (spec)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedWindow {
    pub name: Identifier,
    pub spec: Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    Preceding(Expression),
    Following(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFrame {
    pub kind: FrameKind,
    pub start: FrameBound,
    /// Present for the `BETWEEN start AND end` form
    pub end: Option<FrameBound>,
}

/// `this COLLATE collation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collate {
    pub this: Expression,
    pub collation: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exists {
    pub this: Expression,
}

/// `this IN (expressions)` or `this IN (query)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct In {
    pub this: Expression,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    pub query: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Between {
    pub this: Expression,
    pub low: Expression,
    pub high: Expression,
}

/// Payload of LIKE and ILIKE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeOp {
    pub left: Expression,
    pub right: Expression,
    pub escape: Option<Expression>,
}

impl LikeOp {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self {
            left,
            right,
            escape: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOp {
    pub left: Expression,
    pub right: Expression,
}

impl BinaryOp {
    pub fn new(left: Expression, right: Expression) -> Self {
        Self { left, right }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub this: Expression,
}

impl UnaryOp {
    pub fn new(this: Expression) -> Self {
        Self { this }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_select() -> Expression {
        let mut select = Select::new();
        select
            .add_column(Expression::column("a"))
            .add_column(Expression::column("b").alias("x"));
        select.from.push(Expression::table("t"));
        select.where_ = Some(Expression::column("a").eq(Expression::number(1)));
        Expression::Select(Box::new(select))
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Expression::number(1).kind(), ExpressionKind::Literal);
        assert_eq!(sample_select().kind(), ExpressionKind::Select);
        assert_eq!(Expression::CurrentDate.kind(), ExpressionKind::CurrentDate);
    }

    #[test]
    fn test_args_roles_in_order() {
        let select = sample_select();
        let roles: Vec<(&str, Option<usize>)> = select.args().into_iter().map(|(r, i, _)| (r, i)).collect();
        assert_eq!(
            roles,
            vec![
                ("expressions", Some(0)),
                ("expressions", Some(1)),
                ("from", Some(0)),
                ("where", None)
            ]
        );
        assert_eq!(select.expressions().len(), 2);
        assert_eq!(select.arg("where").map(|w| w.kind()), Some(ExpressionKind::Eq));
    }

    #[test]
    fn test_case_args_interleave_conditions() {
        let case = Expression::Case(Box::new(Case {
            operand: None,
            whens: vec![(Expression::column("a"), Expression::number(1))],
            else_: Some(Expression::number(0)),
        }));
        let roles: Vec<&str> = case.args().into_iter().map(|(r, _, _)| r).collect();
        assert_eq!(roles, vec!["ifs", "ifs", "default"]);
    }

    #[test]
    fn test_args_mut_rewrites_children() {
        let mut expr = Expression::column("a").eq(Expression::number(1));
        for (_, _, child) in expr.args_mut() {
            if let Expression::Literal(Literal::Number(n)) = child {
                *n = "2".to_string();
            }
        }
        assert_eq!(expr.sql(), "a = 2");
    }

    #[test]
    fn test_copy_is_independent() {
        let original = sample_select();
        let mut copy = original.copy();
        copy.as_select_mut().unwrap().add_column(Expression::column("c"));
        assert_eq!(original.as_select().unwrap().expressions.len(), 2);
        assert_eq!(copy.as_select().unwrap().expressions.len(), 3);
    }

    #[test]
    fn test_take_detaches() {
        let mut expr = Expression::column("a").eq(Expression::number(1));
        let detached = match &mut expr {
            Expression::Eq(op) => op.right.take(),
            _ => unreachable!(),
        };
        assert_eq!(detached, Expression::number(1));
        assert_eq!(expr.sql(), "a = NULL");
    }

    #[test]
    fn test_names() {
        assert_eq!(Expression::column("a").name(), Some("a"));
        assert_eq!(Expression::column("a").alias("b").alias_name(), Some("b"));
        assert_eq!(Expression::function("f", vec![]).name(), Some("f"));
    }

    #[test]
    fn test_data_type_aliases() {
        assert_eq!(DataTypeKind::from_name("integer"), DataTypeKind::Int);
        assert_eq!(DataTypeKind::from_name("DOUBLE PRECISION"), DataTypeKind::Double);
        assert_eq!(
            DataTypeKind::from_name("geometry"),
            DataTypeKind::UserDefined("geometry".to_string())
        );
        assert_eq!(DataTypeKind::Int.canonical_name(), "INT");
    }

    #[test]
    fn test_json_round_trip() {
        let expr = sample_select();
        let json = expr.to_json().unwrap();
        assert_eq!(Expression::from_json(&json).unwrap(), expr);
    }
}
