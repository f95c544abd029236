//! SQL Generator
//!
//! Converts an [`Expression`] tree back into SQL text. Every node kind has a
//! base rendering in [`Generator::generate_default`]; a dialect changes the
//! output in two ways:
//!
//! - data in [`GeneratorConfig`] (quotes, type names, limit style, ...)
//! - a [`RenderTable`] of per-kind overrides consulted before the base rule
//!
//! Parentheses are added only where operator precedence requires them, so
//! the output re-parses to the same tree.

use crate::dialects::DialectType;
use crate::error::{Error, ErrorLevel, Result};
use crate::expressions::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Render override for one node kind
pub type RenderFn = Arc<dyn Fn(&mut Generator, &Expression) -> Result<()> + Send + Sync>;

/// Per-kind render overrides
pub type RenderTable = HashMap<ExpressionKind, RenderFn>;

/// Function name normalization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeFunctions {
    #[default]
    Upper,
    Lower,
    /// Keep names as written
    None,
}

/// How row limits are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitStyle {
    /// `LIMIT n OFFSET m`
    #[default]
    Limit,
    /// `SELECT TOP n` (T-SQL)
    Top,
    /// `OFFSET m ROWS FETCH FIRST n ROWS ONLY`
    FetchFirst,
}

/// How array types are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayTypeStyle {
    /// `ARRAY<INT>`
    #[default]
    Angle,
    /// `INT[]`
    Suffix,
}

/// Identifier quote style (start/end characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierQuoteStyle {
    pub start: char,
    pub end: char,
}

impl Default for IdentifierQuoteStyle {
    fn default() -> Self {
        Self::DOUBLE_QUOTE
    }
}

impl IdentifierQuoteStyle {
    /// PostgreSQL, Oracle, standard SQL
    pub const DOUBLE_QUOTE: Self = Self { start: '"', end: '"' };
    /// MySQL, BigQuery
    pub const BACKTICK: Self = Self { start: '`', end: '`' };
    /// T-SQL
    pub const BRACKET: Self = Self { start: '[', end: ']' };
}

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Newline and indent per clause
    pub pretty: bool,
    pub indent: String,
    /// Quote every identifier, not just the ones that need it
    pub identify: bool,
    pub uppercase_keywords: bool,
    pub normalize_functions: NormalizeFunctions,
    pub identifier_quote_style: IdentifierQuoteStyle,
    /// Quote char for string literals
    pub string_quote: char,
    /// Escape backslashes and control chars inside string literals
    pub escape_backslash: bool,
    /// `E'..'` strings can be written back with their prefix
    pub supports_escape_string: bool,
    pub limit_style: LimitStyle,
    pub array_type_style: ArrayTypeStyle,
    /// Array literals must use the `ARRAY[...]` form
    pub array_keyword_required: bool,
    /// Booleans written as `1`/`0`
    pub numeric_booleans: bool,
    pub supports_qualify: bool,
    pub supports_ilike: bool,
    pub supports_double_colon_cast: bool,
    pub supports_try_cast: bool,
    pub supports_distinct_on: bool,
    pub supports_aggregate_filter: bool,
    pub null_ordering_supported: bool,
    /// `AS` between a table and its alias
    pub table_alias_as: bool,
    /// How lossy fallbacks are reported
    pub unsupported_level: ErrorLevel,
    /// Canonical type -> dialect spelling
    pub type_map: HashMap<DataTypeKind, String>,
    pub dialect: Option<DialectType>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
            identify: false,
            uppercase_keywords: true,
            normalize_functions: NormalizeFunctions::Upper,
            identifier_quote_style: IdentifierQuoteStyle::DOUBLE_QUOTE,
            string_quote: '\'',
            escape_backslash: false,
            supports_escape_string: false,
            limit_style: LimitStyle::Limit,
            array_type_style: ArrayTypeStyle::Angle,
            array_keyword_required: false,
            numeric_booleans: false,
            supports_qualify: true,
            supports_ilike: true,
            supports_double_colon_cast: false,
            supports_try_cast: true,
            supports_distinct_on: true,
            supports_aggregate_filter: true,
            null_ordering_supported: true,
            table_alias_as: true,
            unsupported_level: ErrorLevel::Warn,
            type_map: HashMap::new(),
            dialect: None,
        }
    }
}

// Binding strength of each operator level, loosest first. Render overrides
// pass these to `write_binary` and `write_operand`.
pub const PREC_OR: u8 = 1;
pub const PREC_AND: u8 = 2;
pub const PREC_NOT: u8 = 3;
pub const PREC_EQUALITY: u8 = 4;
pub const PREC_COMPARISON: u8 = 5;
pub const PREC_RANGE: u8 = 6;
pub const PREC_BITWISE: u8 = 7;
pub const PREC_TERM: u8 = 8;
pub const PREC_FACTOR: u8 = 9;
pub const PREC_UNARY: u8 = 10;
pub const PREC_POSTFIX: u8 = 11;
pub const PREC_ATOM: u8 = 12;

/// Binding strength of the operator at the root of `expr`
pub fn precedence(expr: &Expression) -> u8 {
    use Expression as E;
    match expr {
        E::Or(_) => PREC_OR,
        E::And(_) => PREC_AND,
        E::Not(_) => PREC_NOT,
        E::Eq(_) | E::Neq(_) | E::NullSafeEq(_) => PREC_EQUALITY,
        E::Lt(_) | E::Lte(_) | E::Gt(_) | E::Gte(_) => PREC_COMPARISON,
        E::In(_) | E::Between(_) | E::Like(_) | E::ILike(_) | E::RegexpLike(_) | E::Is(_) => PREC_RANGE,
        E::Concat(_) | E::BitwiseAnd(_) | E::BitwiseOr(_) | E::BitwiseXor(_) | E::ShiftLeft(_) | E::ShiftRight(_) => {
            PREC_BITWISE
        }
        E::Add(_) | E::Sub(_) => PREC_TERM,
        E::Mul(_) | E::Div(_) | E::Mod(_) => PREC_FACTOR,
        E::Neg(_) | E::BitwiseNot(_) => PREC_UNARY,
        E::Cast(c) if c.double_colon => PREC_POSTFIX,
        E::Bracket(_) | E::JsonExtract(_) | E::JsonExtractScalar(_) | E::Collate(_) => PREC_POSTFIX,
        _ => PREC_ATOM,
    }
}

/// SQL Generator
pub struct Generator {
    config: GeneratorConfig,
    overrides: RenderTable,
    output: String,
    indent_level: usize,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self::with_overrides(config, RenderTable::new())
    }

    pub fn with_overrides(config: GeneratorConfig, overrides: RenderTable) -> Self {
        Self {
            config,
            overrides,
            output: String::new(),
            indent_level: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render `expr` with the generic configuration.
    pub fn sql(expr: &Expression) -> Result<String> {
        Generator::new().generate(expr)
    }

    /// Render a whole tree, returning the SQL text.
    pub fn generate(&mut self, expr: &Expression) -> Result<String> {
        self.output.clear();
        self.indent_level = 0;
        self.generate_expression(expr)?;
        tracing::trace!(target: "sqlshift::generator", kind = %expr.kind(), len = self.output.len(), "generated");
        Ok(std::mem::take(&mut self.output))
    }

    /// Render one node, consulting the override table first.
    pub fn generate_expression(&mut self, expr: &Expression) -> Result<()> {
        if let Some(render) = self.overrides.get(&expr.kind()).cloned() {
            return render(self, expr);
        }
        self.generate_default(expr)
    }

    /// Name used in unsupported-construct errors
    pub fn dialect_name(&self) -> String {
        self.config
            .dialect
            .map(|d| d.to_string())
            .unwrap_or_else(|| DialectType::Generic.to_string())
    }

    /// Report a lossy fallback according to `unsupported_level`.
    pub fn unsupported(&mut self, feature: &str) -> Result<()> {
        match self.config.unsupported_level {
            ErrorLevel::Ignore => Ok(()),
            ErrorLevel::Warn => {
                tracing::warn!(
                    target: "sqlshift::generator",
                    dialect = %self.dialect_name(),
                    "{} is not supported, falling back",
                    feature
                );
                Ok(())
            }
            ErrorLevel::Raise | ErrorLevel::Immediate => Err(Error::unsupported(feature, self.dialect_name())),
        }
    }

    // ---------------------------------------------------------------------
    // Output helpers
    // ---------------------------------------------------------------------

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    pub fn write_space(&mut self) {
        self.output.push(' ');
    }

    pub fn write_keyword(&mut self, keyword: &str) {
        if self.config.uppercase_keywords {
            self.output.push_str(keyword);
        } else {
            self.output.push_str(&keyword.to_lowercase());
        }
    }

    /// Clause separator: a space, or a newline at the current indent
    fn write_sep(&mut self) {
        if self.config.pretty {
            self.output.push('\n');
            for _ in 0..self.indent_level {
                self.output.push_str(&self.config.indent);
            }
        } else {
            self.output.push(' ');
        }
    }

    fn needs_quotes(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let valid_start = chars.next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false);
        !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') || crate::tokens::is_reserved_word(name)
    }

    pub fn write_identifier(&mut self, id: &Identifier) {
        if id.quoted || self.config.identify || self.needs_quotes(&id.name) {
            let IdentifierQuoteStyle { start, end } = self.config.identifier_quote_style;
            self.output.push(start);
            for ch in id.name.chars() {
                if ch == end {
                    self.output.push(end);
                }
                self.output.push(ch);
            }
            self.output.push(end);
        } else {
            self.output.push_str(&id.name);
        }
    }

    fn write_identifier_list(&mut self, ids: &[Identifier]) {
        self.write("(");
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_identifier(id);
        }
        self.write(")");
    }

    /// Write a quoted string literal, escaping per the dialect.
    pub fn write_string(&mut self, value: &str) {
        self.write_string_escaped(value, self.config.escape_backslash);
    }

    fn write_string_escaped(&mut self, value: &str, escape_backslash: bool) {
        let quote = self.config.string_quote;
        self.output.push(quote);
        for ch in value.chars() {
            if escape_backslash {
                let escaped = match ch {
                    '\\' => Some('\\'),
                    '\n' => Some('n'),
                    '\r' => Some('r'),
                    '\t' => Some('t'),
                    '\0' => Some('0'),
                    _ => None,
                };
                if let Some(e) = escaped {
                    self.output.push('\\');
                    self.output.push(e);
                    continue;
                }
            }
            if ch == quote {
                self.output.push(quote);
            }
            self.output.push(ch);
        }
        self.output.push(quote);
    }

    pub fn write_list(&mut self, items: &[Expression]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_expression(item)?;
        }
        Ok(())
    }

    /// Render `expr`, parenthesized when it binds looser than `min`
    pub fn write_operand(&mut self, expr: &Expression, min: u8) -> Result<()> {
        if precedence(expr) < min {
            self.write("(");
            self.generate_expression(expr)?;
            self.write(")");
            Ok(())
        } else {
            self.generate_expression(expr)
        }
    }

    /// Left-associative binary operator at level `prec`
    pub fn write_binary(&mut self, op: &BinaryOp, symbol: &str, prec: u8) -> Result<()> {
        self.write_operand(&op.left, prec)?;
        self.write_space();
        self.write_keyword(symbol);
        self.write_space();
        self.write_operand(&op.right, prec + 1)
    }

    /// `NAME(arg, ...)` with the name normalized per the dialect
    pub fn write_function_call(&mut self, name: &str, args: &[&Expression]) -> Result<()> {
        let name = self.normalize_function_name(name);
        self.write(&name);
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_expression(arg)?;
        }
        self.write(")");
        Ok(())
    }

    fn normalize_function_name(&self, name: &str) -> String {
        match self.config.normalize_functions {
            NormalizeFunctions::Upper => name.to_uppercase(),
            NormalizeFunctions::Lower => name.to_lowercase(),
            NormalizeFunctions::None => name.to_string(),
        }
    }

    pub fn write_data_type(&mut self, dt: &DataType) -> Result<()> {
        if dt.kind == DataTypeKind::Array {
            let Some(element) = dt.nested.first() else {
                self.write("ARRAY");
                return Ok(());
            };
            return match self.config.array_type_style {
                ArrayTypeStyle::Angle => {
                    self.write("ARRAY<");
                    self.write_data_type(element)?;
                    self.write(">");
                    Ok(())
                }
                ArrayTypeStyle::Suffix => {
                    self.write_data_type(element)?;
                    self.write("[]");
                    Ok(())
                }
            };
        }

        let name = match self.config.type_map.get(&dt.kind) {
            Some(mapped) => mapped.clone(),
            None => dt.kind.canonical_name().to_string(),
        };
        self.write(&name);
        // A compound spelling such as NUMBER(1) already carries its parameters
        if !dt.params.is_empty() && !name.contains('(') {
            self.write("(");
            self.write(&dt.params.join(", "));
            self.write(")");
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Base rendering
    // ---------------------------------------------------------------------

    /// The dialect-agnostic rendering of `expr`.
    pub fn generate_default(&mut self, expr: &Expression) -> Result<()> {
        use Expression as E;
        match expr {
            E::Literal(lit) => self.generate_literal(lit),
            E::Boolean(b) => {
                let text = match (self.config.numeric_booleans, b.value) {
                    (true, true) => "1",
                    (true, false) => "0",
                    (false, true) => "TRUE",
                    (false, false) => "FALSE",
                };
                self.write_keyword(text);
            }
            E::Null(_) => self.write_keyword("NULL"),
            E::Identifier(id) => self.write_identifier(id),
            E::Column(c) => {
                for part in [&c.db, &c.table].into_iter().flatten() {
                    self.write_identifier(part);
                    self.write(".");
                }
                self.write_identifier(&c.name);
            }
            E::Table(t) => self.generate_table(t),
            E::Star(s) => {
                if let Some(table) = &s.table {
                    self.write_identifier(table);
                    self.write(".");
                }
                self.write("*");
            }
            E::Parameter(p) => {
                let prefix = match p.style {
                    ParameterStyle::Dollar => "$",
                    ParameterStyle::Colon => ":",
                    ParameterStyle::At => "@",
                    ParameterStyle::DoubleAt => "@@",
                };
                self.write(prefix);
                self.write(&p.name);
            }
            E::Placeholder(_) => self.write("?"),

            E::Select(s) => self.generate_select(s)?,
            E::Union(s) => self.generate_set_operation(s, "UNION")?,
            E::Intersect(s) => self.generate_set_operation(s, "INTERSECT")?,
            E::Except(s) => self.generate_set_operation(s, "EXCEPT")?,
            E::Subquery(s) => {
                self.write_wrapped_query(&s.this)?;
                let with_as = self.config.table_alias_as;
                self.write_alias_suffix(s.alias.as_ref(), &s.column_aliases, with_as);
            }
            E::Values(v) => self.generate_values(v, false)?,
            E::Cte(c) => {
                self.write_identifier(&c.alias);
                if !c.columns.is_empty() {
                    self.write_identifier_list(&c.columns);
                }
                self.write_space();
                self.write_keyword("AS");
                self.write_space();
                self.write_wrapped_query(&c.this)?;
            }

            E::Insert(i) => self.generate_insert(i)?,
            E::Update(u) => self.generate_update(u)?,
            E::Delete(d) => {
                self.write_keyword("DELETE FROM");
                self.write_space();
                self.generate_expression(&d.table)?;
                if let Some(cond) = &d.where_ {
                    self.write_sep();
                    self.write_keyword("WHERE");
                    self.write_space();
                    self.generate_expression(cond)?;
                }
            }
            E::CreateTable(c) => self.generate_create_table(c)?,
            E::ColumnDef(c) => self.generate_column_def(c)?,
            E::Constraint(c) => self.generate_table_constraint(c)?,
            E::CreateView(v) => {
                self.write_keyword("CREATE");
                if v.replace {
                    self.write_keyword(" OR REPLACE");
                }
                self.write_keyword(" VIEW");
                if v.if_not_exists {
                    self.write_keyword(" IF NOT EXISTS");
                }
                self.write_space();
                self.generate_expression(&v.name)?;
                if !v.columns.is_empty() {
                    self.write_space();
                    self.write_identifier_list(&v.columns);
                }
                self.write_space();
                self.write_keyword("AS");
                self.write_space();
                self.generate_expression(&v.query)?;
            }
            E::Drop(d) => {
                self.write_keyword("DROP");
                self.write_space();
                self.write_keyword(&d.kind);
                if d.if_exists {
                    self.write_keyword(" IF EXISTS");
                }
                self.write_space();
                self.write_list(&d.names)?;
                if d.cascade {
                    self.write_keyword(" CASCADE");
                }
            }
            E::Use(u) => {
                self.write_keyword("USE");
                if let Some(kind) = &u.kind {
                    self.write_space();
                    self.write_keyword(kind);
                }
                self.write_space();
                self.write_identifier(&u.this);
            }
            E::Transaction(t) => {
                self.write_keyword("BEGIN");
                if t.keyword {
                    self.write_keyword(" TRANSACTION");
                }
            }
            E::Commit(_) => self.write_keyword("COMMIT"),
            E::Rollback(_) => self.write_keyword("ROLLBACK"),
            E::Command(c) => {
                self.write_keyword(&c.this);
                if !c.expression.is_empty() {
                    self.write_space();
                    self.write(&c.expression);
                }
            }

            E::Alias(a) => {
                self.generate_expression(&a.this)?;
                self.write_alias_suffix(Some(&a.alias), &a.column_aliases, true);
            }
            E::Join(j) => self.generate_join(j)?,
            E::Ordered(o) => {
                self.generate_expression(&o.this)?;
                if o.desc {
                    self.write_keyword(" DESC");
                }
                if let Some(nulls_first) = o.nulls_first {
                    if self.config.null_ordering_supported {
                        self.write_keyword(if nulls_first { " NULLS FIRST" } else { " NULLS LAST" });
                    } else {
                        self.unsupported("NULLS FIRST/LAST")?;
                    }
                }
            }

            E::Cast(c) => self.generate_cast(c, "CAST")?,
            E::TryCast(c) => {
                if self.config.supports_try_cast {
                    self.generate_cast(c, "TRY_CAST")?;
                } else {
                    self.unsupported("TRY_CAST")?;
                    self.generate_cast(c, "CAST")?;
                }
            }
            E::DataType(dt) => self.write_data_type(dt)?,

            E::Case(c) => {
                self.write_keyword("CASE");
                if let Some(operand) = &c.operand {
                    self.write_space();
                    self.generate_expression(operand)?;
                }
                for (condition, result) in &c.whens {
                    self.write_space();
                    self.write_keyword("WHEN");
                    self.write_space();
                    self.generate_expression(condition)?;
                    self.write_space();
                    self.write_keyword("THEN");
                    self.write_space();
                    self.generate_expression(result)?;
                }
                if let Some(else_) = &c.else_ {
                    self.write_space();
                    self.write_keyword("ELSE");
                    self.write_space();
                    self.generate_expression(else_)?;
                }
                self.write_space();
                self.write_keyword("END");
            }
            E::Paren(p) => {
                self.write("(");
                self.generate_expression(&p.this)?;
                self.write(")");
            }
            E::Tuple(t) => {
                self.write("(");
                self.write_list(&t.expressions)?;
                self.write(")");
            }
            E::Array(a) => {
                if a.keyword || self.config.array_keyword_required {
                    self.write_keyword("ARRAY");
                }
                self.write("[");
                self.write_list(&a.expressions)?;
                self.write("]");
            }
            E::Bracket(b) => {
                self.write_operand(&b.this, PREC_POSTFIX)?;
                self.write("[");
                self.write_list(&b.index)?;
                self.write("]");
            }
            E::Interval(i) => {
                self.write_keyword("INTERVAL");
                self.write_space();
                self.generate_expression(&i.this)?;
                if let Some(unit) = &i.unit {
                    self.write_space();
                    self.write_keyword(unit);
                }
            }
            E::Extract(e) => {
                self.write_keyword("EXTRACT");
                self.write("(");
                self.write_keyword(&e.part);
                self.write_space();
                self.write_keyword("FROM");
                self.write_space();
                self.generate_expression(&e.this)?;
                self.write(")");
            }
            E::Function(f) => self.generate_function(f)?,
            E::WindowFunction(w) => {
                self.generate_expression(&w.this)?;
                self.write_space();
                self.write_keyword("OVER");
                self.write_space();
                if w.over.is_bare_reference() {
                    if let Some(name) = &w.over.window_name {
                        self.write_identifier(name);
                    }
                } else {
                    self.generate_window_spec(&w.over)?;
                }
            }
            E::Collate(c) => {
                self.write_operand(&c.this, PREC_POSTFIX)?;
                self.write_space();
                self.write_keyword("COLLATE");
                self.write_space();
                self.write_identifier(&c.collation);
            }

            E::Exists(e) => {
                self.write_keyword("EXISTS");
                self.write_space();
                self.write_wrapped_query(&e.this)?;
            }
            E::In(i) => {
                self.write_operand(&i.this, PREC_RANGE)?;
                self.write_space();
                self.write_keyword("IN");
                self.write_space();
                match &i.query {
                    Some(query) => self.write_wrapped_query(query)?,
                    None => {
                        self.write("(");
                        self.write_list(&i.expressions)?;
                        self.write(")");
                    }
                }
            }
            E::Between(b) => {
                self.write_operand(&b.this, PREC_RANGE)?;
                self.write_space();
                self.write_keyword("BETWEEN");
                self.write_space();
                self.write_operand(&b.low, PREC_BITWISE)?;
                self.write_space();
                self.write_keyword("AND");
                self.write_space();
                self.write_operand(&b.high, PREC_BITWISE)?;
            }
            E::Like(op) => self.generate_like(op, "LIKE")?,
            E::ILike(op) => {
                if self.config.supports_ilike {
                    self.generate_like(op, "ILIKE")?;
                } else {
                    self.unsupported("ILIKE")?;
                    self.generate_like(op, "LIKE")?;
                }
            }
            E::RegexpLike(op) => self.write_binary(op, "RLIKE", PREC_RANGE)?,
            E::Is(op) => self.write_binary(op, "IS", PREC_RANGE)?,

            E::Not(op) => {
                self.write_keyword("NOT");
                self.write_space();
                self.write_operand(&op.this, PREC_NOT)?;
            }
            E::Neg(op) => {
                self.write("-");
                // "--" would start a comment
                let starts_with_minus = matches!(&op.this, E::Neg(_))
                    || matches!(&op.this, E::Literal(Literal::Number(n)) if n.starts_with('-'));
                if starts_with_minus {
                    self.write_space();
                }
                self.write_operand(&op.this, PREC_UNARY)?;
            }
            E::BitwiseNot(op) => {
                self.write("~");
                self.write_operand(&op.this, PREC_UNARY)?;
            }
            E::Any(op) => {
                self.write_keyword("ANY");
                self.write_space();
                self.write_wrapped_query(&op.this)?;
            }
            E::All(op) => {
                self.write_keyword("ALL");
                self.write_space();
                self.write_wrapped_query(&op.this)?;
            }

            E::And(op) => self.write_binary(op, "AND", PREC_AND)?,
            E::Or(op) => self.write_binary(op, "OR", PREC_OR)?,
            E::Add(op) => self.write_binary(op, "+", PREC_TERM)?,
            E::Sub(op) => self.write_binary(op, "-", PREC_TERM)?,
            E::Mul(op) => self.write_binary(op, "*", PREC_FACTOR)?,
            E::Div(op) => self.write_binary(op, "/", PREC_FACTOR)?,
            E::Mod(op) => self.write_binary(op, "%", PREC_FACTOR)?,
            E::Eq(op) => self.write_binary(op, "=", PREC_EQUALITY)?,
            E::Neq(op) => self.write_binary(op, "<>", PREC_EQUALITY)?,
            // Written as a range predicate, so operands bind at that level
            E::NullSafeEq(op) => self.write_binary(op, "IS NOT DISTINCT FROM", PREC_RANGE)?,
            E::Lt(op) => self.write_binary(op, "<", PREC_COMPARISON)?,
            E::Lte(op) => self.write_binary(op, "<=", PREC_COMPARISON)?,
            E::Gt(op) => self.write_binary(op, ">", PREC_COMPARISON)?,
            E::Gte(op) => self.write_binary(op, ">=", PREC_COMPARISON)?,
            E::Concat(op) => self.write_binary(op, "||", PREC_BITWISE)?,
            E::BitwiseAnd(op) => self.write_binary(op, "&", PREC_BITWISE)?,
            E::BitwiseOr(op) => self.write_binary(op, "|", PREC_BITWISE)?,
            E::BitwiseXor(op) => self.write_binary(op, "^", PREC_BITWISE)?,
            E::ShiftLeft(op) => self.write_binary(op, "<<", PREC_BITWISE)?,
            E::ShiftRight(op) => self.write_binary(op, ">>", PREC_BITWISE)?,
            E::JsonExtract(op) => {
                self.write_operand(&op.left, PREC_POSTFIX)?;
                self.write(" -> ");
                self.write_operand(&op.right, PREC_ATOM)?;
            }
            E::JsonExtractScalar(op) => {
                self.write_operand(&op.left, PREC_POSTFIX)?;
                self.write(" ->> ");
                self.write_operand(&op.right, PREC_ATOM)?;
            }

            E::CurrentDate => self.write_keyword("CURRENT_DATE"),
            E::CurrentTime => self.write_keyword("CURRENT_TIME"),
            E::CurrentTimestamp => self.write_keyword("CURRENT_TIMESTAMP"),
        }
        Ok(())
    }

    fn generate_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Number(n) => self.write(n),
            Literal::String(s) => self.write_string(s),
            Literal::NationalString(s) => {
                self.write("N");
                self.write_string(s);
            }
            Literal::HexString(s) => {
                self.write("X'");
                self.write(s);
                self.write("'");
            }
            Literal::BitString(s) => {
                self.write("B'");
                self.write(s);
                self.write("'");
            }
            Literal::ByteString(s) => {
                self.write("b");
                self.write_string(s);
            }
            Literal::EscapeString(s) => {
                if self.config.supports_escape_string {
                    self.write("E");
                    self.write_string_escaped(s, true);
                } else {
                    self.write_string(s);
                }
            }
        }
    }

    fn generate_table(&mut self, t: &TableRef) {
        for part in [&t.catalog, &t.db].into_iter().flatten() {
            self.write_identifier(part);
            self.write(".");
        }
        self.write_identifier(&t.name);
        let with_as = self.config.table_alias_as;
        self.write_alias_suffix(t.alias.as_ref(), &t.column_aliases, with_as);
    }

    fn write_alias_suffix(&mut self, alias: Option<&Identifier>, columns: &[Identifier], with_as: bool) {
        let Some(alias) = alias else {
            return;
        };
        self.write_space();
        if with_as {
            self.write_keyword("AS");
            self.write_space();
        }
        self.write_identifier(alias);
        if !columns.is_empty() {
            self.write_identifier_list(columns);
        }
    }

    /// `(query)`, indented in pretty mode
    fn write_wrapped_query(&mut self, query: &Expression) -> Result<()> {
        self.write("(");
        if self.config.pretty && query.is_query() {
            self.indent_level += 1;
            self.write_sep();
            self.generate_expression(query)?;
            self.indent_level -= 1;
            self.write_sep();
        } else {
            self.generate_expression(query)?;
        }
        self.write(")");
        Ok(())
    }

    fn generate_with(&mut self, with: &With) -> Result<()> {
        self.write_keyword("WITH");
        if with.recursive {
            self.write_keyword(" RECURSIVE");
        }
        self.write_space();
        self.write_list(&with.ctes)?;
        self.write_sep();
        Ok(())
    }

    fn generate_select(&mut self, s: &Select) -> Result<()> {
        if let Some(with) = &s.with {
            self.generate_with(with)?;
        }
        self.write_keyword("SELECT");

        let use_top = self.config.limit_style == LimitStyle::Top && s.offset.is_none();
        if use_top {
            if let Some(limit) = &s.limit {
                self.write_space();
                self.write_keyword("TOP");
                self.write_space();
                self.write_operand(limit, PREC_ATOM)?;
            }
        }

        if s.distinct {
            self.write_space();
            self.write_keyword("DISTINCT");
            if !s.distinct_on.is_empty() {
                if self.config.supports_distinct_on {
                    self.write_space();
                    self.write_keyword("ON");
                    self.write(" (");
                    self.write_list(&s.distinct_on)?;
                    self.write(")");
                } else {
                    self.unsupported("DISTINCT ON")?;
                }
            }
        }

        if self.config.pretty {
            self.indent_level += 1;
            for (i, expr) in s.expressions.iter().enumerate() {
                if i > 0 {
                    self.write(",");
                }
                self.write_sep();
                self.generate_expression(expr)?;
            }
            self.indent_level -= 1;
        } else {
            self.write_space();
            self.write_list(&s.expressions)?;
        }

        if !s.from.is_empty() {
            self.write_sep();
            self.write_keyword("FROM");
            self.write_space();
            for (i, source) in s.from.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.generate_table_source(source)?;
            }
        }
        for join in &s.joins {
            self.write_sep();
            self.generate_expression(join)?;
        }
        if let Some(cond) = &s.where_ {
            self.write_sep();
            self.write_keyword("WHERE");
            self.write_space();
            self.generate_expression(cond)?;
        }
        if !s.group_by.is_empty() {
            self.write_sep();
            self.write_keyword("GROUP BY");
            self.write_space();
            self.write_list(&s.group_by)?;
        }
        if let Some(cond) = &s.having {
            self.write_sep();
            self.write_keyword("HAVING");
            self.write_space();
            self.generate_expression(cond)?;
        }
        if !s.windows.is_empty() {
            self.write_sep();
            self.write_keyword("WINDOW");
            self.write_space();
            for (i, window) in s.windows.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write_identifier(&window.name);
                self.write_space();
                self.write_keyword("AS");
                self.write_space();
                self.generate_window_spec(&window.spec)?;
            }
        }
        if let Some(cond) = &s.qualify {
            if !self.config.supports_qualify {
                return Err(Error::unsupported("QUALIFY", self.dialect_name()));
            }
            self.write_sep();
            self.write_keyword("QUALIFY");
            self.write_space();
            self.generate_expression(cond)?;
        }
        self.generate_order_and_limit(&s.order_by, if use_top { None } else { s.limit.as_ref() }, s.offset.as_ref())
    }

    fn generate_order_and_limit(
        &mut self,
        order_by: &[Expression],
        limit: Option<&Expression>,
        offset: Option<&Expression>,
    ) -> Result<()> {
        if !order_by.is_empty() {
            self.write_sep();
            self.write_keyword("ORDER BY");
            self.write_space();
            self.write_list(order_by)?;
        } else if offset.is_some() && self.config.limit_style == LimitStyle::Top {
            // OFFSET .. FETCH needs an ORDER BY in T-SQL
            self.write_sep();
            self.write_keyword("ORDER BY");
            self.write(" (");
            self.write_keyword("SELECT NULL");
            self.write(")");
        }

        match self.config.limit_style {
            LimitStyle::Limit => {
                if let Some(limit) = limit {
                    self.write_sep();
                    self.write_keyword("LIMIT");
                    self.write_space();
                    self.generate_expression(limit)?;
                }
                if let Some(offset) = offset {
                    self.write_sep();
                    self.write_keyword("OFFSET");
                    self.write_space();
                    self.generate_expression(offset)?;
                }
            }
            LimitStyle::Top | LimitStyle::FetchFirst => {
                if let Some(offset) = offset {
                    self.write_sep();
                    self.write_keyword("OFFSET");
                    self.write_space();
                    self.generate_expression(offset)?;
                    self.write_space();
                    self.write_keyword("ROWS");
                }
                if let Some(limit) = limit {
                    self.write_sep();
                    self.write_keyword("FETCH");
                    self.write_space();
                    self.write_keyword(if offset.is_some() { "NEXT" } else { "FIRST" });
                    self.write_space();
                    self.generate_expression(limit)?;
                    self.write_space();
                    self.write_keyword("ROWS ONLY");
                }
            }
        }
        Ok(())
    }

    /// A FROM or JOIN source; VALUES must be parenthesized there
    fn generate_table_source(&mut self, source: &Expression) -> Result<()> {
        match source {
            Expression::Values(v) => self.generate_values(v, true),
            _ => self.generate_expression(source),
        }
    }

    fn generate_values(&mut self, v: &Values, as_source: bool) -> Result<()> {
        let wrap = as_source || v.alias.is_some();
        if wrap {
            self.write("(");
        }
        self.write_keyword("VALUES");
        self.write_space();
        self.write_list(&v.rows)?;
        if wrap {
            self.write(")");
        }
        let with_as = self.config.table_alias_as;
        self.write_alias_suffix(v.alias.as_ref(), &v.column_aliases, with_as);
        Ok(())
    }

    fn generate_set_operation(&mut self, s: &SetOperation, keyword: &str) -> Result<()> {
        if let Some(with) = &s.with {
            self.generate_with(with)?;
        }
        self.generate_expression(&s.left)?;
        self.write_sep();
        self.write_keyword(keyword);
        if !s.distinct {
            self.write_keyword(" ALL");
        }
        self.write_sep();

        // A right operand that would absorb or regroup trailing clauses keeps its own parens
        let wrap_right = match &s.right {
            Expression::Union(_) | Expression::Intersect(_) | Expression::Except(_) => true,
            Expression::Select(sel) => !sel.order_by.is_empty() || sel.limit.is_some() || sel.offset.is_some(),
            _ => false,
        };
        if wrap_right {
            self.write_wrapped_query(&s.right)?;
        } else {
            self.generate_expression(&s.right)?;
        }
        self.generate_order_and_limit(&s.order_by, s.limit.as_ref(), s.offset.as_ref())
    }

    fn generate_join(&mut self, j: &Join) -> Result<()> {
        if j.natural {
            self.write_keyword("NATURAL ");
        }
        match j.side {
            Some(JoinSide::Left) => self.write_keyword("LEFT "),
            Some(JoinSide::Right) => self.write_keyword("RIGHT "),
            Some(JoinSide::Full) => self.write_keyword("FULL "),
            None => {}
        }
        match j.kind {
            Some(JoinKind::Inner) => self.write_keyword("INNER "),
            Some(JoinKind::Outer) => self.write_keyword("OUTER "),
            Some(JoinKind::Cross) => self.write_keyword("CROSS "),
            None => {}
        }
        self.write_keyword("JOIN");
        self.write_space();
        self.generate_table_source(&j.this)?;
        if let Some(on) = &j.on {
            self.write_space();
            self.write_keyword("ON");
            self.write_space();
            self.generate_expression(on)?;
        } else if !j.using.is_empty() {
            self.write_space();
            self.write_keyword("USING");
            self.write_space();
            self.write_identifier_list(&j.using);
        }
        Ok(())
    }

    fn generate_insert(&mut self, i: &Insert) -> Result<()> {
        if let Some(with) = &i.with {
            self.generate_with(with)?;
        }
        self.write_keyword("INSERT INTO");
        self.write_space();
        self.generate_expression(&i.table)?;
        if !i.columns.is_empty() {
            self.write_space();
            self.write_identifier_list(&i.columns);
        }
        self.write_sep();
        self.generate_expression(&i.source)
    }

    fn generate_update(&mut self, u: &Update) -> Result<()> {
        self.write_keyword("UPDATE");
        self.write_space();
        self.generate_expression(&u.table)?;
        self.write_space();
        self.write_keyword("SET");
        self.write_space();
        self.write_list(&u.set)?;
        if let Some(from) = &u.from {
            self.write_sep();
            self.write_keyword("FROM");
            self.write_space();
            self.generate_table_source(from)?;
        }
        if let Some(cond) = &u.where_ {
            self.write_sep();
            self.write_keyword("WHERE");
            self.write_space();
            self.generate_expression(cond)?;
        }
        Ok(())
    }

    fn generate_create_table(&mut self, c: &CreateTable) -> Result<()> {
        self.write_keyword("CREATE");
        if c.replace {
            self.write_keyword(" OR REPLACE");
        }
        if c.temporary {
            self.write_keyword(" TEMPORARY");
        }
        self.write_keyword(" TABLE");
        if c.if_not_exists {
            self.write_keyword(" IF NOT EXISTS");
        }
        self.write_space();
        self.generate_expression(&c.table)?;
        if !c.columns.is_empty() {
            self.write(" (");
            if self.config.pretty {
                self.indent_level += 1;
                for (i, column) in c.columns.iter().enumerate() {
                    if i > 0 {
                        self.write(",");
                    }
                    self.write_sep();
                    self.generate_expression(column)?;
                }
                self.indent_level -= 1;
                self.write_sep();
            } else {
                self.write_list(&c.columns)?;
            }
            self.write(")");
        }
        if let Some(query) = &c.as_query {
            self.write_space();
            self.write_keyword("AS");
            self.write_space();
            self.generate_expression(query)?;
        }
        Ok(())
    }

    fn generate_column_def(&mut self, c: &ColumnDef) -> Result<()> {
        self.write_identifier(&c.name);
        if let Some(dt) = &c.data_type {
            self.write_space();
            self.write_data_type(dt)?;
        }
        for constraint in &c.constraints {
            self.write_space();
            match constraint {
                ColumnConstraint::NotNull => self.write_keyword("NOT NULL"),
                ColumnConstraint::Null => self.write_keyword("NULL"),
                ColumnConstraint::PrimaryKey => self.write_keyword("PRIMARY KEY"),
                ColumnConstraint::Unique => self.write_keyword("UNIQUE"),
                ColumnConstraint::Default(value) => {
                    self.write_keyword("DEFAULT");
                    self.write_space();
                    self.write_operand(value, PREC_UNARY)?;
                }
                ColumnConstraint::Check(cond) => {
                    self.write_keyword("CHECK");
                    self.write(" (");
                    self.generate_expression(cond)?;
                    self.write(")");
                }
                ColumnConstraint::References { table, columns } => {
                    self.write_keyword("REFERENCES");
                    self.write_space();
                    self.generate_table(table);
                    if !columns.is_empty() {
                        self.write_space();
                        self.write_identifier_list(columns);
                    }
                }
                ColumnConstraint::Collate(name) => {
                    self.write_keyword("COLLATE");
                    self.write_space();
                    self.write_identifier(name);
                }
            }
        }
        Ok(())
    }

    fn generate_table_constraint(&mut self, c: &TableConstraint) -> Result<()> {
        if let Some(name) = &c.name {
            self.write_keyword("CONSTRAINT");
            self.write_space();
            self.write_identifier(name);
            self.write_space();
        }
        match &c.kind {
            TableConstraintKind::PrimaryKey(columns) => {
                self.write_keyword("PRIMARY KEY");
                self.write_space();
                self.write_identifier_list(columns);
            }
            TableConstraintKind::Unique(columns) => {
                self.write_keyword("UNIQUE");
                self.write_space();
                self.write_identifier_list(columns);
            }
            TableConstraintKind::Check(cond) => {
                self.write_keyword("CHECK");
                self.write(" (");
                self.generate_expression(cond)?;
                self.write(")");
            }
            TableConstraintKind::ForeignKey {
                columns,
                table,
                references,
            } => {
                self.write_keyword("FOREIGN KEY");
                self.write_space();
                self.write_identifier_list(columns);
                self.write_space();
                self.write_keyword("REFERENCES");
                self.write_space();
                self.generate_table(table);
                if !references.is_empty() {
                    self.write_space();
                    self.write_identifier_list(references);
                }
            }
        }
        Ok(())
    }

    fn generate_cast(&mut self, c: &Cast, keyword: &str) -> Result<()> {
        if c.double_colon && keyword == "CAST" && self.config.supports_double_colon_cast {
            self.write_operand(&c.this, PREC_POSTFIX)?;
            self.write("::");
            return self.write_data_type(&c.to);
        }
        self.write_keyword(keyword);
        self.write("(");
        self.generate_expression(&c.this)?;
        self.write_space();
        self.write_keyword("AS");
        self.write_space();
        self.write_data_type(&c.to)?;
        self.write(")");
        Ok(())
    }

    fn generate_like(&mut self, op: &LikeOp, keyword: &str) -> Result<()> {
        self.write_operand(&op.left, PREC_RANGE)?;
        self.write_space();
        self.write_keyword(keyword);
        self.write_space();
        self.write_operand(&op.right, PREC_BITWISE)?;
        if let Some(escape) = &op.escape {
            self.write_space();
            self.write_keyword("ESCAPE");
            self.write_space();
            self.write_operand(escape, PREC_BITWISE)?;
        }
        Ok(())
    }

    fn generate_function(&mut self, f: &Function) -> Result<()> {
        // Without FILTER support, fold the condition into the aggregate argument
        if let (Some(filter), false) = (&f.filter, self.config.supports_aggregate_filter) {
            let mut folded = Function::new(f.name.clone(), Vec::with_capacity(f.args.len()));
            folded.distinct = f.distinct;
            folded.quoted = f.quoted;
            for arg in &f.args {
                let value = match arg {
                    Expression::Star(_) => Expression::number(1),
                    other => other.clone(),
                };
                folded.args.push(Expression::Case(Box::new(Case {
                    operand: None,
                    whens: vec![(filter.clone(), value)],
                    else_: None,
                })));
            }
            return self.generate_function(&folded);
        }

        if f.quoted {
            self.write_identifier(&Identifier::quoted(f.name.clone()));
        } else {
            let name = self.normalize_function_name(&f.name);
            self.write(&name);
        }
        self.write("(");
        if f.distinct {
            self.write_keyword("DISTINCT");
            self.write_space();
        }
        self.write_list(&f.args)?;
        self.write(")");
        if let Some(filter) = &f.filter {
            self.write_space();
            self.write_keyword("FILTER");
            self.write(" (");
            self.write_keyword("WHERE");
            self.write_space();
            self.generate_expression(filter)?;
            self.write(")");
        }
        Ok(())
    }

    fn generate_window_spec(&mut self, over: &Over) -> Result<()> {
        self.write("(");
        let mut first = true;
        let mut gap = |g: &mut Generator| {
            if !first {
                g.write_space();
            }
            first = false;
        };
        if let Some(name) = &over.window_name {
            gap(self);
            self.write_identifier(name);
        }
        if !over.partition_by.is_empty() {
            gap(self);
            self.write_keyword("PARTITION BY");
            self.write_space();
            self.write_list(&over.partition_by)?;
        }
        if !over.order_by.is_empty() {
            gap(self);
            self.write_keyword("ORDER BY");
            self.write_space();
            self.write_list(&over.order_by)?;
        }
        if let Some(frame) = &over.frame {
            gap(self);
            self.write_keyword(match frame.kind {
                FrameKind::Rows => "ROWS",
                FrameKind::Range => "RANGE",
            });
            self.write_space();
            match &frame.end {
                Some(end) => {
                    self.write_keyword("BETWEEN");
                    self.write_space();
                    self.generate_frame_bound(&frame.start)?;
                    self.write_space();
                    self.write_keyword("AND");
                    self.write_space();
                    self.generate_frame_bound(end)?;
                }
                None => self.generate_frame_bound(&frame.start)?,
            }
        }
        self.write(")");
        Ok(())
    }

    fn generate_frame_bound(&mut self, bound: &FrameBound) -> Result<()> {
        match bound {
            FrameBound::UnboundedPreceding => self.write_keyword("UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => self.write_keyword("UNBOUNDED FOLLOWING"),
            FrameBound::CurrentRow => self.write_keyword("CURRENT ROW"),
            FrameBound::Preceding(offset) => {
                self.write_operand(offset, PREC_TERM)?;
                self.write_keyword(" PRECEDING");
            }
            FrameBound::Following(offset) => {
                self.write_operand(offset, PREC_TERM)?;
                self.write_keyword(" FOLLOWING");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn col(name: &str) -> Expression {
        Expression::column(name)
    }

    fn sql_with(expr: &Expression, config: GeneratorConfig) -> String {
        Generator::with_config(config).generate(expr).unwrap()
    }

    fn simple_select() -> Select {
        let mut select = Select::new();
        select.add_column(col("a"));
        select.from.push(Expression::table("t"));
        select
    }

    #[test]
    fn test_parens_only_where_needed() {
        let sum = Expression::Add(Box::new(BinaryOp::new(col("a"), col("b"))));
        let product = Expression::Mul(Box::new(BinaryOp::new(sum.clone(), col("c"))));
        assert_eq!(Generator::sql(&product).unwrap(), "(a + b) * c");

        let product = Expression::Mul(Box::new(BinaryOp::new(col("a"), col("b"))));
        let sum = Expression::Add(Box::new(BinaryOp::new(product, col("c"))));
        assert_eq!(Generator::sql(&sum).unwrap(), "a * b + c");
    }

    #[test]
    fn test_right_operand_of_same_level_is_wrapped() {
        let inner = Expression::Sub(Box::new(BinaryOp::new(col("b"), col("c"))));
        let outer = Expression::Sub(Box::new(BinaryOp::new(col("a"), inner)));
        assert_eq!(Generator::sql(&outer).unwrap(), "a - (b - c)");
    }

    #[test]
    fn test_or_inside_and_is_wrapped() {
        let either = col("a").or(col("b"));
        let both = either.and(col("c"));
        assert_eq!(Generator::sql(&both).unwrap(), "(a OR b) AND c");
    }

    #[test]
    fn test_negated_in_renders_prefix_not() {
        let inn = Expression::In(Box::new(In {
            this: col("a"),
            expressions: vec![Expression::number(1), Expression::number(2)],
            query: None,
        }));
        assert_eq!(Generator::sql(&inn.not()).unwrap(), "NOT a IN (1, 2)");
    }

    #[test]
    fn test_double_negation_keeps_space() {
        let neg = Expression::Neg(Box::new(UnaryOp::new(Expression::Neg(Box::new(UnaryOp::new(col("x")))))));
        assert_eq!(Generator::sql(&neg).unwrap(), "- -x");
    }

    #[test]
    fn test_ilike_falls_back_to_like() {
        let like = Expression::ILike(Box::new(LikeOp::new(col("a"), Expression::string("%x%"))));
        let config = GeneratorConfig {
            supports_ilike: false,
            ..Default::default()
        };
        assert_eq!(sql_with(&like, config), "a LIKE '%x%'");
    }

    #[test]
    fn test_qualify_without_support_is_an_error() {
        let mut select = simple_select();
        select.qualify = Some(col("a").eq(Expression::number(1)));
        let config = GeneratorConfig {
            supports_qualify: false,
            dialect: Some(DialectType::MySQL),
            ..Default::default()
        };
        let err = Generator::with_config(config)
            .generate(&Expression::Select(Box::new(select)))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported: QUALIFY is not supported in mysql");
    }

    #[test]
    fn test_raise_level_turns_fallbacks_into_errors() {
        let cast = Expression::TryCast(Box::new(Cast {
            this: col("a"),
            to: DataType::new(DataTypeKind::Int),
            double_colon: false,
        }));
        let config = GeneratorConfig {
            supports_try_cast: false,
            unsupported_level: ErrorLevel::Raise,
            ..Default::default()
        };
        assert!(Generator::with_config(config).generate(&cast).is_err());
    }

    #[test]
    fn test_type_map_and_compound_spelling() {
        let mut type_map = HashMap::new();
        type_map.insert(DataTypeKind::Int, "INTEGER".to_string());
        type_map.insert(DataTypeKind::Boolean, "NUMBER(1)".to_string());
        let config = GeneratorConfig {
            type_map,
            ..Default::default()
        };

        let int_cast = col("a").cast(DataType::new(DataTypeKind::Int));
        assert_eq!(sql_with(&int_cast, config.clone()), "CAST(a AS INTEGER)");

        let bool_cast = col("a").cast(DataType::new(DataTypeKind::Boolean).with_params(["5"]));
        assert_eq!(sql_with(&bool_cast, config), "CAST(a AS NUMBER(1))");
    }

    #[test]
    fn test_array_type_styles() {
        let cast = col("a").cast(DataType::array_of(DataType::new(DataTypeKind::Int)));
        assert_eq!(Generator::sql(&cast).unwrap(), "CAST(a AS ARRAY<INT>)");
        let config = GeneratorConfig {
            array_type_style: ArrayTypeStyle::Suffix,
            ..Default::default()
        };
        assert_eq!(sql_with(&cast, config), "CAST(a AS INT[])");
    }

    #[test]
    fn test_limit_styles() {
        let mut select = simple_select();
        select.limit = Some(Expression::number(10));
        let expr = Expression::Select(Box::new(select));

        assert_eq!(Generator::sql(&expr).unwrap(), "SELECT a FROM t LIMIT 10");

        let top = GeneratorConfig {
            limit_style: LimitStyle::Top,
            ..Default::default()
        };
        assert_eq!(sql_with(&expr, top), "SELECT TOP 10 a FROM t");

        let fetch = GeneratorConfig {
            limit_style: LimitStyle::FetchFirst,
            ..Default::default()
        };
        assert_eq!(sql_with(&expr, fetch), "SELECT a FROM t FETCH FIRST 10 ROWS ONLY");
    }

    #[test]
    fn test_identifier_quoting() {
        let mut select = Select::new();
        select.add_column(col("select"));
        select.add_column(col("my col"));
        select.add_column(col("ok"));
        let expr = Expression::Select(Box::new(select));
        assert_eq!(Generator::sql(&expr).unwrap(), r#"SELECT "select", "my col", ok"#);

        let config = GeneratorConfig {
            identify: true,
            identifier_quote_style: IdentifierQuoteStyle::BRACKET,
            ..Default::default()
        };
        assert_eq!(sql_with(&expr, config), "SELECT [select], [my col], [ok]");
    }

    #[test]
    fn test_string_escaping() {
        let s = Expression::string(r"it's a \ test");
        assert_eq!(Generator::sql(&s).unwrap(), r"'it''s a \ test'");
        let config = GeneratorConfig {
            escape_backslash: true,
            ..Default::default()
        };
        assert_eq!(sql_with(&s, config), r"'it''s a \\ test'");
    }

    #[test]
    fn test_control_chars_reescaped_with_backslash_escapes() {
        let s = Expression::string("a\nb\tc\rd\0e");
        let config = GeneratorConfig {
            escape_backslash: true,
            ..Default::default()
        };
        assert_eq!(sql_with(&s, config), r"'a\nb\tc\rd\0e'");
    }

    #[test]
    fn test_escape_string_prefix_follows_config() {
        let s = Expression::Literal(Literal::EscapeString("a\tb".to_string()));
        assert_eq!(Generator::sql(&s).unwrap(), "'a\tb'");
        let config = GeneratorConfig {
            supports_escape_string: true,
            ..Default::default()
        };
        assert_eq!(sql_with(&s, config), r"E'a\tb'");
    }

    #[test]
    fn test_function_name_normalization() {
        let f = Expression::function("coalesce", vec![col("a"), Expression::number(0)]);
        assert_eq!(Generator::sql(&f).unwrap(), "COALESCE(a, 0)");
        let config = GeneratorConfig {
            normalize_functions: NormalizeFunctions::None,
            ..Default::default()
        };
        assert_eq!(sql_with(&f, config), "coalesce(a, 0)");
    }

    #[test]
    fn test_filter_folds_into_case_without_support() {
        let mut count = Function::new("COUNT", vec![Expression::star()]);
        count.filter = Some(col("x").eq(Expression::number(1)));
        let expr = Expression::Function(Box::new(count));
        assert_eq!(Generator::sql(&expr).unwrap(), "COUNT(*) FILTER (WHERE x = 1)");
        let config = GeneratorConfig {
            supports_aggregate_filter: false,
            ..Default::default()
        };
        assert_eq!(sql_with(&expr, config), "COUNT(CASE WHEN x = 1 THEN 1 END)");
    }

    #[test]
    fn test_pretty_select() {
        let mut select = simple_select();
        select.add_column(col("b"));
        select.where_ = Some(col("a").eq(Expression::number(1)));
        let config = GeneratorConfig {
            pretty: true,
            ..Default::default()
        };
        assert_eq!(
            sql_with(&Expression::Select(Box::new(select)), config),
            "SELECT\n  a,\n  b\nFROM t\nWHERE a = 1"
        );
    }

    #[test]
    fn test_override_table_takes_precedence() {
        let mut overrides = RenderTable::new();
        let render: RenderFn = Arc::new(|g: &mut Generator, _e: &Expression| {
            g.write("<null>");
            Ok(())
        });
        overrides.insert(ExpressionKind::Null, render);
        let mut generator = Generator::with_overrides(GeneratorConfig::default(), overrides);
        let expr = col("a").eq(Expression::null());
        assert_eq!(generator.generate(&expr).unwrap(), "a = <null>");
    }
}
