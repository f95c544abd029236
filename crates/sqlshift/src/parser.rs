//! SQL Parser -- converts a token stream into an [`Expression`] AST.
//!
//! The token stream is split into statements on `;` before parsing. Each
//! statement is parsed by recursive descent; binary operators use
//! precedence climbing with one function per level, loosest first:
//!
//! | Level | Operators |
//! |---|---|
//! | or | `OR` |
//! | and | `AND` |
//! | not | prefix `NOT` |
//! | equality | `=`, `<>`, `!=`, `<=>` |
//! | comparison | `<`, `<=`, `>`, `>=` |
//! | range | `[NOT] IN`, `[NOT] BETWEEN`, `[NOT] LIKE`, `[NOT] ILIKE`, `[NOT] RLIKE`, `IS [NOT]` |
//! | bitwise | `&`, `\|`, `^`, `<<`, `>>`, `\|\|` |
//! | term | `+`, `-` |
//! | factor | `*`, `/`, `%` |
//! | unary | `-`, `~` |
//! | postfix | `::type`, `[index]`, `->`, `->>`, `COLLATE` |
//!
//! All binary levels are left-associative. A negated predicate such as
//! `x NOT IN (...)` becomes `Not(In(..))`.
//!
//! Grammar violations are reported according to the [`ErrorLevel`] in
//! [`ParseOptions`]. A failed statement yields `None` and parsing resumes
//! at the next statement.

use crate::error::{highlight_sql, Error, ErrorLevel, ParseError, ParseErrorDetail, Result};
use crate::expressions::*;
use crate::tokens::{Token, TokenType};
use serde::{Deserialize, Serialize};

/// Caller-facing parse options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub error_level: ErrorLevel,
    /// Upper bound on individually listed errors in a merged message
    pub max_errors: usize,
    /// Chars of source context shown on each side of an error
    pub error_message_context: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_level: ErrorLevel::Raise,
            max_errors: 3,
            error_message_context: 100,
        }
    }
}

impl ParseOptions {
    pub fn with_error_level(mut self, error_level: ErrorLevel) -> Self {
        self.error_level = error_level;
        self
    }
}

/// Dialect-specific grammar switches
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// `||` means logical OR rather than string concatenation
    pub dpipe_is_or: bool,
}

/// Statements plus the errors recorded while parsing them
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// One entry per statement; `None` where the statement failed to parse
    pub statements: Vec<Option<Expression>>,
    /// Errors recorded under [`ErrorLevel::Warn`]
    pub errors: Vec<ParseErrorDetail>,
}

const INTERVAL_UNITS: &[&str] = &[
    "YEAR", "YEARS", "QUARTER", "MONTH", "MONTHS", "WEEK", "WEEKS", "DAY", "DAYS", "HOUR", "HOURS", "MINUTE",
    "MINUTES", "SECOND", "SECONDS", "MILLISECOND", "MILLISECONDS", "MICROSECOND", "MICROSECONDS",
];

const TYPED_LITERALS: &[&str] = &["DATE", "TIME", "TIMESTAMP", "DATETIME"];

/// Deepest nesting of parentheses, subqueries and prefix operators accepted
pub const MAX_NESTING_DEPTH: usize = 100;

/// Recursive-descent SQL parser
pub struct Parser {
    options: ParseOptions,
    config: ParserConfig,
    sql: String,
    chars: Vec<char>,
    tokens: Vec<Token>,
    index: usize,
    errors: Vec<ParseErrorDetail>,
    /// Kind requested by [`Parser::parse_into`]
    into: Option<ExpressionKind>,
    depth: usize,
}

impl Parser {
    pub fn new(options: ParseOptions, config: ParserConfig) -> Self {
        Self {
            options,
            config,
            sql: String::new(),
            chars: Vec::new(),
            tokens: Vec::new(),
            index: 0,
            errors: Vec::new(),
            into: None,
            depth: 0,
        }
    }

    /// Errors recorded by the last call to [`Parser::parse`]
    pub fn errors(&self) -> &[ParseErrorDetail] {
        &self.errors
    }

    /// Parse every statement in `tokens`, which were produced from `sql`.
    pub fn parse(&mut self, tokens: Vec<Token>, sql: &str) -> Result<ParseOutput> {
        self.sql = sql.to_string();
        self.chars = sql.chars().collect();
        self.errors.clear();

        let mut statements = Vec::new();
        for chunk in split_statements(tokens) {
            self.tokens = chunk;
            self.index = 0;
            self.depth = 0;
            let before = self.errors.len();

            let statement = match self.parse_statement_checked() {
                Ok(expr) => Some(expr),
                Err(Error::Parse(e)) if self.options.error_level != ErrorLevel::Immediate => {
                    self.record(e.errors);
                    None
                }
                Err(e) => return Err(e),
            };

            if self.options.error_level == ErrorLevel::Raise && self.errors.len() > before {
                let details = std::mem::take(&mut self.errors);
                return Err(Error::Parse(ParseError::from_details(details, self.options.max_errors)));
            }
            statements.push(statement);
        }

        if self.options.error_level == ErrorLevel::Warn && !self.errors.is_empty() {
            tracing::warn!(
                target: "sqlshift::parser",
                "{}",
                crate::error::concat_messages(&self.errors, self.options.max_errors)
            );
        }
        tracing::trace!(target: "sqlshift::parser", statements = statements.len(), "parsed");

        Ok(ParseOutput {
            statements,
            errors: self.errors.clone(),
        })
    }

    /// Parse statements that must all be of `kind`.
    pub fn parse_into(&mut self, tokens: Vec<Token>, sql: &str, kind: ExpressionKind) -> Result<ParseOutput> {
        self.into = Some(kind);
        let result = self.parse(tokens, sql);
        self.into = None;
        result
    }

    fn record(&mut self, details: Vec<ParseErrorDetail>) {
        match self.options.error_level {
            ErrorLevel::Ignore => {}
            ErrorLevel::Warn => {
                for detail in &details {
                    tracing::error!(target: "sqlshift::parser", "{}", detail);
                }
                self.errors.extend(details);
            }
            ErrorLevel::Raise | ErrorLevel::Immediate => self.errors.extend(details),
        }
    }

    /// Parse one statement and flag any tokens left over in the chunk.
    fn parse_statement_checked(&mut self) -> Result<Expression> {
        let statement = self.parse_statement()?;
        if !self.at_end() {
            let err = self.error("Invalid expression / Unexpected token");
            self.soft_error(err)?;
        }
        if let Some(kind) = self.into {
            if statement.kind() != kind {
                let err = self.error(format!("Failed to parse into {}", kind));
                return Err(err);
            }
        }
        Ok(statement)
    }

    /// Record an error without abandoning the statement, unless the level
    /// requires raising right away.
    fn soft_error(&mut self, err: Error) -> Result<()> {
        if self.options.error_level == ErrorLevel::Immediate {
            return Err(err);
        }
        if let Error::Parse(e) = err {
            self.record(e.errors);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Token navigation
    // ---------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    fn peek_type(&self) -> Option<TokenType> {
        self.peek().map(|t| t.token_type)
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek_type() == Some(token_type)
    }

    fn check_at(&self, offset: usize, token_type: TokenType) -> bool {
        self.peek_at(offset).map(|t| t.token_type) == Some(token_type)
    }

    /// Case-insensitive match on the text of an unquoted word
    fn check_text_at(&self, offset: usize, text: &str) -> bool {
        self.peek_at(offset)
            .map(|t| t.token_type != TokenType::Identifier && !t.token_type.is_string() && t.text.eq_ignore_ascii_case(text))
            .unwrap_or(false)
    }

    fn check_text(&self, text: &str) -> bool {
        self.check_text_at(0, text)
    }

    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn matches(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn match_text(&mut self, text: &str) -> bool {
        if self.check_text(text) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType, what: &str) -> Result<Token> {
        if self.check(token_type) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.error(format!("Expecting {}", what)))
    }

    /// Consume `>`, splitting a `>>` token in two when closing nested types
    fn expect_closing_angle(&mut self) -> Result<()> {
        if self.matches(TokenType::Gt) {
            return Ok(());
        }
        if let Some(token) = self.tokens.get_mut(self.index) {
            if token.token_type == TokenType::GtGt {
                token.token_type = TokenType::Gt;
                token.text = ">".to_string();
                token.span.start += 1;
                return Ok(());
            }
        }
        Err(self.error("Expecting >"))
    }

    /// Build a parse error positioned at the current token (or the last one)
    fn error(&self, description: impl Into<String>) -> Error {
        let description = description.into();
        let token = self.peek().or_else(|| self.tokens.last());
        let (line, column, start, end) = match token {
            Some(t) => (t.span.line, t.span.column, t.span.start, t.span.end.saturating_sub(1).max(t.span.start)),
            None => (1, 1, 0, 0),
        };

        let (start_context, highlight, end_context) =
            match highlight_sql(&self.sql, &[(start, end)], self.options.error_message_context) {
                Ok(h) => (h.start_context, h.highlight, h.end_context),
                Err(_) => (String::new(), String::new(), String::new()),
            };

        Error::Parse(ParseError::from_detail(ParseErrorDetail {
            description,
            line,
            column,
            start_context,
            highlight,
            end_context,
            into_expression: self.into.map(|k| k.to_string()),
        }))
    }

    fn is_identifier_token(token: &Token) -> bool {
        matches!(token.token_type, TokenType::Var | TokenType::Identifier) || token.token_type.is_soft_keyword()
    }

    fn check_identifier(&self) -> bool {
        self.peek().map(Self::is_identifier_token).unwrap_or(false)
    }

    /// Whether the tokens at `offset`, after any `(`, begin a query
    fn is_query_start_at(&self, mut offset: usize) -> bool {
        while self.check_at(offset, TokenType::LParen) {
            offset += 1;
        }
        matches!(
            self.peek_at(offset).map(|t| t.token_type),
            Some(TokenType::Select | TokenType::With | TokenType::Values)
        )
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Expression> {
        let Some(token_type) = self.peek_type() else {
            return Err(self.error("Expected a statement"));
        };

        match token_type {
            TokenType::With => {
                let with = self.parse_with()?;
                if self.check(TokenType::Insert) {
                    self.parse_insert(Some(with))
                } else {
                    let query = self.parse_query()?;
                    self.attach_with(query, with)
                }
            }
            TokenType::Select | TokenType::Values => self.parse_query(),
            TokenType::LParen if self.is_query_start_at(0) => self.parse_query(),
            TokenType::Insert => self.parse_insert(None),
            TokenType::Update => self.parse_update(),
            TokenType::Delete => self.parse_delete(),
            TokenType::Create => self.parse_create(),
            TokenType::Drop => self.parse_drop(),
            TokenType::Use => self.parse_use(),
            TokenType::Begin => {
                self.advance();
                let keyword = self.matches(TokenType::Transaction);
                if !keyword {
                    self.match_text("WORK");
                }
                Ok(Expression::Transaction(Box::new(Transaction { keyword })))
            }
            TokenType::Var if self.check_text("START") && self.check_at(1, TokenType::Transaction) => {
                self.index += 2;
                Ok(Expression::Transaction(Box::new(Transaction { keyword: true })))
            }
            TokenType::Commit => {
                self.advance();
                if !self.matches(TokenType::Transaction) {
                    self.match_text("WORK");
                }
                Ok(Expression::Commit(Box::new(Commit)))
            }
            TokenType::Rollback => {
                self.advance();
                if !self.matches(TokenType::Transaction) {
                    self.match_text("WORK");
                }
                Ok(Expression::Rollback(Box::new(Rollback)))
            }
            TokenType::Command => Ok(self.parse_as_command()),
            _ => self.parse_expression(),
        }
    }

    /// Keep the rest of the statement verbatim behind its leading keyword
    fn parse_as_command(&mut self) -> Expression {
        let keyword = self.advance().map(|t| t.text.to_uppercase()).unwrap_or_default();
        let expression = match (self.peek(), self.tokens.last()) {
            (Some(first), Some(last)) => self.chars[first.span.start..last.span.end.min(self.chars.len())]
                .iter()
                .collect(),
            _ => String::new(),
        };
        self.index = self.tokens.len();
        Expression::Command(Box::new(Command {
            this: keyword,
            expression,
        }))
    }

    fn attach_with(&self, mut query: Expression, with: With) -> Result<Expression> {
        match &mut query {
            Expression::Select(s) => s.with = Some(with),
            Expression::Union(s) | Expression::Intersect(s) | Expression::Except(s) => s.with = Some(with),
            _ => return Err(self.error("WITH must be followed by SELECT or a set operation")),
        }
        Ok(query)
    }

    fn parse_with(&mut self) -> Result<With> {
        self.expect(TokenType::With, "WITH")?;
        let recursive = self.matches(TokenType::Recursive);
        let mut ctes = Vec::new();
        loop {
            let alias = self.parse_identifier()?;
            let columns = if self.check(TokenType::LParen) {
                self.parse_identifier_list()?
            } else {
                Vec::new()
            };
            self.expect(TokenType::As, "AS")?;
            self.expect(TokenType::LParen, "(")?;
            let this = self.parse_query()?;
            self.expect(TokenType::RParen, ")")?;
            ctes.push(Expression::Cte(Box::new(Cte { this, alias, columns })));
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        Ok(With { recursive, ctes })
    }

    /// A query: SELECT, VALUES, or a chain of set operations
    pub(crate) fn parse_query(&mut self) -> Result<Expression> {
        self.nested(Self::parse_query_inner)
    }

    fn parse_query_inner(&mut self) -> Result<Expression> {
        if self.check(TokenType::With) {
            let with = self.parse_with()?;
            let query = self.parse_query()?;
            return self.attach_with(query, with);
        }

        let mut left = self.parse_query_operand()?;

        loop {
            let op = match self.peek_type() {
                Some(t @ (TokenType::Union | TokenType::Intersect | TokenType::Except)) => t,
                _ => break,
            };
            self.advance();
            let distinct = if self.matches(TokenType::All) {
                false
            } else {
                self.matches(TokenType::Distinct);
                true
            };
            let right = self.parse_query_operand()?;

            let mut set_op = SetOperation::new(left, right, distinct);
            // Trailing modifiers of an unparenthesized right operand belong to the whole operation
            if let Expression::Select(select) = &mut set_op.right {
                set_op.order_by = std::mem::take(&mut select.order_by);
                set_op.limit = select.limit.take();
                set_op.offset = select.offset.take();
            }

            left = match op {
                TokenType::Union => Expression::Union(Box::new(set_op)),
                TokenType::Intersect => Expression::Intersect(Box::new(set_op)),
                _ => Expression::Except(Box::new(set_op)),
            };
        }

        if let Expression::Union(s) | Expression::Intersect(s) | Expression::Except(s) = &mut left {
            if s.order_by.is_empty() && self.matches(TokenType::OrderBy) {
                s.order_by = self.parse_ordered_list()?;
            }
            if s.limit.is_none() && self.matches(TokenType::Limit) {
                s.limit = Some(self.parse_expression()?);
            }
            if s.offset.is_none() && self.matches(TokenType::Offset) {
                s.offset = Some(self.parse_expression()?);
                let _ = self.matches(TokenType::Rows) || self.matches(TokenType::Row);
            }
        }

        Ok(left)
    }

    fn parse_query_operand(&mut self) -> Result<Expression> {
        match self.peek_type() {
            Some(TokenType::Select) => self.parse_select(),
            Some(TokenType::Values) => self.parse_values(),
            Some(TokenType::LParen) if self.is_query_start_at(1) => {
                self.advance();
                let this = self.parse_query()?;
                self.expect(TokenType::RParen, ")")?;
                Ok(Expression::Subquery(Box::new(Subquery {
                    this,
                    alias: None,
                    column_aliases: Vec::new(),
                })))
            }
            _ => Err(self.error("Expected SELECT, VALUES or a parenthesized query")),
        }
    }

    fn parse_select(&mut self) -> Result<Expression> {
        self.expect(TokenType::Select, "SELECT")?;
        let mut select = Select::new();

        if self.matches(TokenType::Top) {
            select.limit = Some(self.parse_primary()?);
        }

        if self.matches(TokenType::Distinct) {
            select.distinct = true;
            if self.matches(TokenType::On) {
                self.expect(TokenType::LParen, "(")?;
                select.distinct_on = self.parse_expression_list()?;
                self.expect(TokenType::RParen, ")")?;
            }
        } else {
            self.matches(TokenType::All);
        }

        loop {
            let expr = self.parse_expression()?;
            select.expressions.push(self.parse_alias(expr)?);
            if !self.matches(TokenType::Comma) {
                break;
            }
        }

        if self.matches(TokenType::From) {
            loop {
                select.from.push(self.parse_table_source()?);
                if !self.matches(TokenType::Comma) {
                    break;
                }
            }
            while let Some(join) = self.parse_join()? {
                select.joins.push(join);
            }
        }

        if self.matches(TokenType::Where) {
            select.where_ = Some(self.parse_expression()?);
        }
        if self.matches(TokenType::GroupBy) {
            select.group_by = self.parse_expression_list()?;
        }
        if self.matches(TokenType::Having) {
            select.having = Some(self.parse_expression()?);
        }
        if self.matches(TokenType::Window) {
            loop {
                let name = self.parse_identifier()?;
                self.expect(TokenType::As, "AS")?;
                self.expect(TokenType::LParen, "(")?;
                let spec = self.parse_window_spec()?;
                select.windows.push(NamedWindow { name, spec });
                if !self.matches(TokenType::Comma) {
                    break;
                }
            }
        }
        if self.matches(TokenType::Qualify) {
            select.qualify = Some(self.parse_expression()?);
        }
        if self.matches(TokenType::OrderBy) {
            select.order_by = self.parse_ordered_list()?;
        }
        if self.matches(TokenType::Limit) {
            let first = self.parse_expression()?;
            if self.matches(TokenType::Comma) {
                select.offset = Some(first);
                select.limit = Some(self.parse_expression()?);
            } else {
                select.limit = Some(first);
            }
        }
        if self.matches(TokenType::Offset) {
            select.offset = Some(self.parse_expression()?);
            let _ = self.matches(TokenType::Rows) || self.matches(TokenType::Row);
        }
        if self.matches(TokenType::Fetch) {
            if !self.matches(TokenType::First) {
                self.expect(TokenType::Next, "FIRST or NEXT")?;
            }
            let count = if self.check(TokenType::Rows) || self.check(TokenType::Row) {
                Expression::number(1)
            } else {
                self.parse_term()?
            };
            if !self.matches(TokenType::Rows) {
                self.expect(TokenType::Row, "ROWS")?;
            }
            self.expect(TokenType::Only, "ONLY")?;
            select.limit = Some(count);
        }

        Ok(Expression::Select(Box::new(select)))
    }

    fn parse_values(&mut self) -> Result<Expression> {
        self.expect(TokenType::Values, "VALUES")?;
        let mut rows = Vec::new();
        loop {
            if self.matches(TokenType::LParen) {
                let expressions = self.parse_expression_list()?;
                self.expect(TokenType::RParen, ")")?;
                rows.push(Expression::Tuple(Box::new(Tuple { expressions })));
            } else {
                let expr = self.parse_expression()?;
                rows.push(Expression::Tuple(Box::new(Tuple { expressions: vec![expr] })));
            }
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        Ok(Expression::Values(Box::new(Values {
            rows,
            alias: None,
            column_aliases: Vec::new(),
        })))
    }

    /// Optional `[AS] alias` after a projection
    fn parse_alias(&mut self, expr: Expression) -> Result<Expression> {
        let explicit = self.matches(TokenType::As);
        let alias = if explicit {
            if self.check(TokenType::String) {
                self.advance().map(|t| Identifier::quoted(t.text))
            } else {
                Some(self.parse_identifier()?)
            }
        } else if self.check_identifier() {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        Ok(match alias {
            Some(alias) => Expression::Alias(Box::new(Alias::new(expr, alias))),
            None => expr,
        })
    }

    /// `[AS] alias [(col, ...)]` after a table source
    fn parse_table_alias(&mut self) -> Result<(Option<Identifier>, Vec<Identifier>)> {
        let explicit = self.matches(TokenType::As);
        if !explicit && !self.check_identifier() {
            return Ok((None, Vec::new()));
        }
        let alias = self.parse_identifier()?;
        let columns = if self.check(TokenType::LParen) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        Ok((Some(alias), columns))
    }

    fn parse_table_source(&mut self) -> Result<Expression> {
        if self.check(TokenType::LParen) && self.is_query_start_at(1) {
            self.advance();
            let this = self.parse_query()?;
            self.expect(TokenType::RParen, ")")?;
            let (alias, column_aliases) = self.parse_table_alias()?;
            return Ok(match this {
                Expression::Values(mut v) => {
                    v.alias = alias;
                    v.column_aliases = column_aliases;
                    Expression::Values(v)
                }
                this => Expression::Subquery(Box::new(Subquery {
                    this,
                    alias,
                    column_aliases,
                })),
            });
        }

        if self.check(TokenType::Values) {
            let mut values = self.parse_values()?;
            let (alias, column_aliases) = self.parse_table_alias()?;
            if let Expression::Values(v) = &mut values {
                v.alias = alias;
                v.column_aliases = column_aliases;
            }
            return Ok(values);
        }

        if !self.check_identifier() {
            return Err(self.error("Expected table name"));
        }

        // Table-valued function
        if self.check_at(1, TokenType::LParen) {
            let token = self.advance().ok_or_else(|| self.error("Expected table name"))?;
            let func = self.parse_function(token.text, token.token_type == TokenType::Identifier)?;
            let (alias, column_aliases) = self.parse_table_alias()?;
            return Ok(match alias {
                Some(alias) => {
                    let mut a = Alias::new(func, alias);
                    a.column_aliases = column_aliases;
                    Expression::Alias(Box::new(a))
                }
                None => func,
            });
        }

        let mut table = self.parse_table_parts()?;
        let (alias, column_aliases) = self.parse_table_alias()?;
        table.alias = alias;
        table.column_aliases = column_aliases;
        Ok(Expression::Table(table))
    }

    /// `[catalog.][db.]name`
    fn parse_table_parts(&mut self) -> Result<TableRef> {
        let mut parts = vec![self.parse_identifier()?];
        while self.matches(TokenType::Dot) {
            parts.push(self.parse_identifier()?);
        }
        if parts.len() > 3 {
            return Err(self.error("Too many parts in table name"));
        }
        let name = parts.pop().ok_or_else(|| self.error("Expected table name"))?;
        let db = parts.pop();
        let catalog = parts.pop();
        Ok(TableRef {
            name,
            db,
            catalog,
            alias: None,
            column_aliases: Vec::new(),
        })
    }

    fn parse_join(&mut self) -> Result<Option<Expression>> {
        let start = self.index;
        let natural = self.matches(TokenType::Natural);
        let side = if self.matches(TokenType::Left) {
            Some(JoinSide::Left)
        } else if self.matches(TokenType::Right) {
            Some(JoinSide::Right)
        } else if self.matches(TokenType::Full) {
            Some(JoinSide::Full)
        } else {
            None
        };
        let kind = if self.matches(TokenType::Inner) {
            Some(JoinKind::Inner)
        } else if self.matches(TokenType::Outer) {
            Some(JoinKind::Outer)
        } else if self.matches(TokenType::Cross) {
            Some(JoinKind::Cross)
        } else {
            None
        };

        if !self.matches(TokenType::Join) {
            self.index = start;
            return Ok(None);
        }

        let mut join = Join::new(self.parse_table_source()?);
        join.natural = natural;
        join.side = side;
        join.kind = kind;

        if self.matches(TokenType::On) {
            join.on = Some(self.parse_expression()?);
        } else if self.matches(TokenType::Using) {
            join.using = self.parse_identifier_list()?;
        }
        Ok(Some(Expression::Join(Box::new(join))))
    }

    fn parse_insert(&mut self, with: Option<With>) -> Result<Expression> {
        self.expect(TokenType::Insert, "INSERT")?;
        self.matches(TokenType::Into);
        let table = Expression::Table(self.parse_table_parts()?);
        let columns = if self.check(TokenType::LParen) && !self.is_query_start_at(1) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        let source = if self.check(TokenType::Values) {
            self.parse_values()?
        } else if self.is_query_start_at(0) {
            self.parse_query()?
        } else {
            return Err(self.error("Expected VALUES or a query"));
        };
        Ok(Expression::Insert(Box::new(Insert {
            with,
            table,
            columns,
            source,
        })))
    }

    fn parse_update(&mut self) -> Result<Expression> {
        self.expect(TokenType::Update, "UPDATE")?;
        let table = self.parse_table_source()?;
        self.expect(TokenType::Set, "SET")?;
        let mut set = Vec::new();
        loop {
            let assignment = self.parse_expression()?;
            if !matches!(assignment, Expression::Eq(_)) {
                return Err(self.error("Expected column = value"));
            }
            set.push(assignment);
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        let from = if self.matches(TokenType::From) {
            Some(self.parse_table_source()?)
        } else {
            None
        };
        let where_ = if self.matches(TokenType::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Expression::Update(Box::new(Update {
            table,
            set,
            from,
            where_,
        })))
    }

    fn parse_delete(&mut self) -> Result<Expression> {
        self.expect(TokenType::Delete, "DELETE")?;
        self.matches(TokenType::From);
        let table = self.parse_table_source()?;
        let where_ = if self.matches(TokenType::Where) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Expression::Delete(Box::new(Delete { table, where_ })))
    }

    fn parse_if_not_exists(&mut self) -> Result<bool> {
        if self.matches(TokenType::If) {
            self.expect(TokenType::Not, "NOT")?;
            self.expect(TokenType::Exists, "EXISTS")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_create(&mut self) -> Result<Expression> {
        let start = self.index;
        self.expect(TokenType::Create, "CREATE")?;
        let replace = if self.matches(TokenType::Or) {
            self.expect(TokenType::Replace, "REPLACE")?;
            true
        } else {
            false
        };
        let temporary = self.matches(TokenType::Temporary);

        if self.matches(TokenType::Table) {
            let if_not_exists = self.parse_if_not_exists()?;
            let table = Expression::Table(self.parse_table_parts()?);
            let mut columns = Vec::new();
            if self.matches(TokenType::LParen) {
                loop {
                    columns.push(self.parse_column_def_or_constraint()?);
                    if !self.matches(TokenType::Comma) {
                        break;
                    }
                }
                self.expect(TokenType::RParen, ")")?;
            }
            let as_query = if self.matches(TokenType::As) {
                Some(self.parse_query()?)
            } else {
                None
            };
            if columns.is_empty() && as_query.is_none() {
                return Err(self.error("Expected column definitions or AS query"));
            }
            return Ok(Expression::CreateTable(Box::new(CreateTable {
                table,
                if_not_exists,
                temporary,
                replace,
                columns,
                as_query,
            })));
        }

        if self.matches(TokenType::View) {
            let if_not_exists = self.parse_if_not_exists()?;
            let name = Expression::Table(self.parse_table_parts()?);
            let columns = if self.check(TokenType::LParen) {
                self.parse_identifier_list()?
            } else {
                Vec::new()
            };
            self.expect(TokenType::As, "AS")?;
            let query = self.parse_query()?;
            return Ok(Expression::CreateView(Box::new(CreateView {
                name,
                replace,
                if_not_exists,
                columns,
                query,
            })));
        }

        // CREATE INDEX, CREATE FUNCTION, ... are kept verbatim
        self.index = start;
        Ok(self.parse_as_command())
    }

    fn parse_column_def_or_constraint(&mut self) -> Result<Expression> {
        let is_constraint = matches!(
            self.peek_type(),
            Some(TokenType::Constraint | TokenType::Primary | TokenType::Unique | TokenType::Check)
        ) || (self.check_text("FOREIGN") && self.check_text_at(1, "KEY"));
        if is_constraint {
            return self.parse_table_constraint();
        }

        let name = self.parse_identifier()?;
        let data_type = if matches!(
            self.peek_type(),
            Some(TokenType::Var | TokenType::Identifier | TokenType::Type | TokenType::Interval | TokenType::Array)
        ) {
            Some(self.parse_data_type()?)
        } else {
            None
        };

        let mut constraints = Vec::new();
        loop {
            if self.check(TokenType::Not) && self.check_at(1, TokenType::Null) {
                self.index += 2;
                constraints.push(ColumnConstraint::NotNull);
            } else if self.matches(TokenType::Null) {
                constraints.push(ColumnConstraint::Null);
            } else if self.matches(TokenType::Primary) {
                self.expect(TokenType::Key, "KEY")?;
                constraints.push(ColumnConstraint::PrimaryKey);
            } else if self.matches(TokenType::Unique) {
                constraints.push(ColumnConstraint::Unique);
            } else if self.matches(TokenType::Default) {
                constraints.push(ColumnConstraint::Default(self.parse_unary()?));
            } else if self.matches(TokenType::Check) {
                self.expect(TokenType::LParen, "(")?;
                let condition = self.parse_expression()?;
                self.expect(TokenType::RParen, ")")?;
                constraints.push(ColumnConstraint::Check(condition));
            } else if self.matches(TokenType::References) {
                let table = self.parse_table_parts()?;
                let columns = if self.check(TokenType::LParen) {
                    self.parse_identifier_list()?
                } else {
                    Vec::new()
                };
                constraints.push(ColumnConstraint::References { table, columns });
            } else if self.matches(TokenType::Collate) {
                constraints.push(ColumnConstraint::Collate(self.parse_identifier()?));
            } else {
                break;
            }
        }

        Ok(Expression::ColumnDef(Box::new(ColumnDef {
            name,
            data_type,
            constraints,
        })))
    }

    fn parse_table_constraint(&mut self) -> Result<Expression> {
        let name = if self.matches(TokenType::Constraint) {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let kind = if self.matches(TokenType::Primary) {
            self.expect(TokenType::Key, "KEY")?;
            TableConstraintKind::PrimaryKey(self.parse_identifier_list()?)
        } else if self.matches(TokenType::Unique) {
            TableConstraintKind::Unique(self.parse_identifier_list()?)
        } else if self.matches(TokenType::Check) {
            self.expect(TokenType::LParen, "(")?;
            let condition = self.parse_expression()?;
            self.expect(TokenType::RParen, ")")?;
            TableConstraintKind::Check(condition)
        } else if self.match_text("FOREIGN") {
            self.expect(TokenType::Key, "KEY")?;
            let columns = self.parse_identifier_list()?;
            self.expect(TokenType::References, "REFERENCES")?;
            let table = self.parse_table_parts()?;
            let references = if self.check(TokenType::LParen) {
                self.parse_identifier_list()?
            } else {
                Vec::new()
            };
            TableConstraintKind::ForeignKey {
                columns,
                table,
                references,
            }
        } else {
            return Err(self.error("Expected PRIMARY KEY, UNIQUE, CHECK or FOREIGN KEY"));
        };

        Ok(Expression::Constraint(Box::new(TableConstraint { name, kind })))
    }

    fn parse_drop(&mut self) -> Result<Expression> {
        self.expect(TokenType::Drop, "DROP")?;
        let kind = match self.advance() {
            Some(t) if matches!(t.token_type, TokenType::Table | TokenType::View | TokenType::Var) => t.text.to_uppercase(),
            _ => return Err(self.error("Expected object kind after DROP")),
        };
        let if_exists = if self.matches(TokenType::If) {
            self.expect(TokenType::Exists, "EXISTS")?;
            true
        } else {
            false
        };
        let mut names = Vec::new();
        loop {
            names.push(Expression::Table(self.parse_table_parts()?));
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        let cascade = self.match_text("CASCADE");
        if !cascade {
            self.match_text("RESTRICT");
        }
        Ok(Expression::Drop(Box::new(DropObject {
            kind,
            if_exists,
            names,
            cascade,
        })))
    }

    fn parse_use(&mut self) -> Result<Expression> {
        self.expect(TokenType::Use, "USE")?;
        let kind = ["DATABASE", "SCHEMA", "CATALOG", "WAREHOUSE", "ROLE"]
            .iter()
            .find(|k| self.check_text(k) && self.peek_at(1).map(Self::is_identifier_token).unwrap_or(false))
            .map(|k| k.to_string());
        if kind.is_some() {
            self.advance();
        }
        let this = self.parse_identifier()?;
        Ok(Expression::Use(Box::new(Use { kind, this })))
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    pub(crate) fn parse_expression(&mut self) -> Result<Expression> {
        self.nested(Self::parse_or)
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    fn nested<T>(&mut self, parse: fn(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!("Nesting deeper than {MAX_NESTING_DEPTH} levels")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut list = Vec::new();
        loop {
            list.push(self.parse_expression()?);
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        Ok(list)
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.matches(TokenType::Or) || (self.config.dpipe_is_or && self.matches(TokenType::DPipe)) {
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;
        while self.matches(TokenType::And) {
            let right = self.parse_not()?;
            left = Expression::And(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression> {
        if self.matches(TokenType::Not) {
            let this = self.nested(Self::parse_not)?;
            return Ok(Expression::Not(Box::new(UnaryOp::new(this))));
        }
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        loop {
            let build: fn(Box<BinaryOp>) -> Expression = match self.peek_type() {
                Some(TokenType::Eq) => Expression::Eq,
                Some(TokenType::Neq) => Expression::Neq,
                Some(TokenType::NullsafeEq) => Expression::NullSafeEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = build(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let mut left = self.parse_range()?;
        loop {
            let build: fn(Box<BinaryOp>) -> Expression = match self.peek_type() {
                Some(TokenType::Lt) => Expression::Lt,
                Some(TokenType::Lte) => Expression::Lte,
                Some(TokenType::Gt) => Expression::Gt,
                Some(TokenType::Gte) => Expression::Gte,
                _ => break,
            };
            self.advance();
            let right = self.parse_range()?;
            left = build(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn is_range_token(token_type: Option<TokenType>) -> bool {
        matches!(
            token_type,
            Some(TokenType::In | TokenType::Between | TokenType::Like | TokenType::ILike | TokenType::RLike)
        )
    }

    fn parse_range(&mut self) -> Result<Expression> {
        let mut this = self.parse_bitwise()?;
        loop {
            let negate = self.check(TokenType::Not) && Self::is_range_token(self.peek_at(1).map(|t| t.token_type));
            if negate {
                self.advance();
            }
            this = match self.peek_type() {
                Some(TokenType::In) => {
                    self.advance();
                    self.parse_in(this)?
                }
                Some(TokenType::Between) => {
                    self.advance();
                    let low = self.parse_bitwise()?;
                    self.expect(TokenType::And, "AND")?;
                    let high = self.parse_bitwise()?;
                    Expression::Between(Box::new(Between { this, low, high }))
                }
                Some(TokenType::Like) => {
                    self.advance();
                    Expression::Like(Box::new(self.parse_like_rhs(this)?))
                }
                Some(TokenType::ILike) => {
                    self.advance();
                    Expression::ILike(Box::new(self.parse_like_rhs(this)?))
                }
                Some(TokenType::RLike) => {
                    self.advance();
                    let right = self.parse_bitwise()?;
                    Expression::RegexpLike(Box::new(BinaryOp::new(this, right)))
                }
                Some(TokenType::Is) => {
                    self.advance();
                    self.parse_is(this)?
                }
                _ => break,
            };
            if negate {
                this = Expression::Not(Box::new(UnaryOp::new(this)));
            }
        }
        Ok(this)
    }

    fn parse_in(&mut self, this: Expression) -> Result<Expression> {
        self.expect(TokenType::LParen, "(")?;
        let node = if self.is_query_start_at(0) {
            let query = self.parse_query()?;
            In {
                this,
                expressions: Vec::new(),
                query: Some(query),
            }
        } else {
            let expressions = if self.check(TokenType::RParen) {
                Vec::new()
            } else {
                self.parse_expression_list()?
            };
            In {
                this,
                expressions,
                query: None,
            }
        };
        self.expect(TokenType::RParen, ")")?;
        Ok(Expression::In(Box::new(node)))
    }

    fn parse_like_rhs(&mut self, left: Expression) -> Result<LikeOp> {
        let right = self.parse_bitwise()?;
        let escape = if self.matches(TokenType::Escape) {
            Some(self.parse_bitwise()?)
        } else {
            None
        };
        Ok(LikeOp { left, right, escape })
    }

    fn parse_is(&mut self, this: Expression) -> Result<Expression> {
        let negate = self.matches(TokenType::Not);
        if self.matches(TokenType::Distinct) {
            self.expect(TokenType::From, "FROM")?;
            let right = self.parse_bitwise()?;
            let same = Expression::NullSafeEq(Box::new(BinaryOp::new(this, right)));
            return Ok(if negate {
                same
            } else {
                Expression::Not(Box::new(UnaryOp::new(same)))
            });
        }
        let right = if self.matches(TokenType::Null) {
            Expression::null()
        } else if self.matches(TokenType::True) {
            Expression::boolean(true)
        } else if self.matches(TokenType::False) {
            Expression::boolean(false)
        } else {
            return Err(self.error("Expected NULL, TRUE, FALSE or DISTINCT FROM after IS"));
        };
        let is = Expression::Is(Box::new(BinaryOp::new(this, right)));
        Ok(if negate {
            Expression::Not(Box::new(UnaryOp::new(is)))
        } else {
            is
        })
    }

    fn parse_bitwise(&mut self) -> Result<Expression> {
        let mut left = self.parse_term()?;
        loop {
            let build: fn(Box<BinaryOp>) -> Expression = match self.peek_type() {
                Some(TokenType::Amp) => Expression::BitwiseAnd,
                Some(TokenType::Pipe) => Expression::BitwiseOr,
                Some(TokenType::Caret) => Expression::BitwiseXor,
                Some(TokenType::LtLt) => Expression::ShiftLeft,
                Some(TokenType::GtGt) => Expression::ShiftRight,
                Some(TokenType::DPipe) if !self.config.dpipe_is_or => Expression::Concat,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = build(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expression> {
        let mut left = self.parse_factor()?;
        loop {
            let build: fn(Box<BinaryOp>) -> Expression = match self.peek_type() {
                Some(TokenType::Plus) => Expression::Add,
                Some(TokenType::Dash) => Expression::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = build(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let build: fn(Box<BinaryOp>) -> Expression = match self.peek_type() {
                Some(TokenType::Star) => Expression::Mul,
                Some(TokenType::Slash) => Expression::Div,
                Some(TokenType::Percent) => Expression::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = build(Box::new(BinaryOp::new(left, right)));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if self.matches(TokenType::Dash) {
            let this = self.nested(Self::parse_unary)?;
            return Ok(Expression::Neg(Box::new(UnaryOp::new(this))));
        }
        if self.matches(TokenType::Plus) {
            return self.nested(Self::parse_unary);
        }
        if self.matches(TokenType::Tilde) {
            let this = self.nested(Self::parse_unary)?;
            return Ok(Expression::BitwiseNot(Box::new(UnaryOp::new(this))));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut this = self.parse_primary()?;
        loop {
            if self.matches(TokenType::DColon) {
                let to = self.parse_data_type()?;
                this = Expression::Cast(Box::new(Cast {
                    this,
                    to,
                    double_colon: true,
                }));
            } else if self.matches(TokenType::LBracket) {
                let index = self.parse_expression_list()?;
                self.expect(TokenType::RBracket, "]")?;
                this = Expression::Bracket(Box::new(Bracket { this, index }));
            } else if self.matches(TokenType::Arrow) {
                let right = self.parse_primary()?;
                this = Expression::JsonExtract(Box::new(BinaryOp::new(this, right)));
            } else if self.matches(TokenType::DArrow) {
                let right = self.parse_primary()?;
                this = Expression::JsonExtractScalar(Box::new(BinaryOp::new(this, right)));
            } else if self.matches(TokenType::Collate) {
                let collation = if self.check(TokenType::String) {
                    self.advance().map(|t| Identifier::quoted(t.text)).unwrap_or_else(|| Identifier::new(""))
                } else {
                    self.parse_identifier()?
                };
                this = Expression::Collate(Box::new(Collate { this, collation }));
            } else {
                break;
            }
        }
        Ok(this)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("Expected an expression"));
        };

        let literal = |t: &Token| -> Option<Literal> {
            Some(match t.token_type {
                TokenType::Number => Literal::Number(t.text.clone()),
                TokenType::String => Literal::String(t.text.clone()),
                TokenType::NationalString => Literal::NationalString(t.text.clone()),
                TokenType::HexString => Literal::HexString(t.text.clone()),
                TokenType::BitString => Literal::BitString(t.text.clone()),
                TokenType::ByteString => Literal::ByteString(t.text.clone()),
                TokenType::EscapeString => Literal::EscapeString(t.text.clone()),
                _ => return None,
            })
        };
        if let Some(lit) = literal(&token) {
            self.advance();
            return Ok(Expression::Literal(lit));
        }

        match token.token_type {
            TokenType::Null => {
                self.advance();
                Ok(Expression::null())
            }
            TokenType::True | TokenType::False => {
                self.advance();
                Ok(Expression::boolean(token.token_type == TokenType::True))
            }
            TokenType::Star => {
                self.advance();
                Ok(Expression::star())
            }
            TokenType::Placeholder => {
                self.advance();
                Ok(Expression::Placeholder(Placeholder))
            }
            TokenType::Parameter => {
                self.advance();
                Ok(Expression::Parameter(parameter_from_text(&token.text)))
            }
            TokenType::LParen => self.parse_paren(),
            TokenType::LBracket => {
                self.advance();
                let expressions = if self.check(TokenType::RBracket) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.expect(TokenType::RBracket, "]")?;
                Ok(Expression::Array(Box::new(ArrayExpr {
                    expressions,
                    keyword: false,
                })))
            }
            TokenType::Array if self.check_at(1, TokenType::LBracket) => {
                self.index += 2;
                let expressions = if self.check(TokenType::RBracket) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.expect(TokenType::RBracket, "]")?;
                Ok(Expression::Array(Box::new(ArrayExpr {
                    expressions,
                    keyword: true,
                })))
            }
            TokenType::Case => self.parse_case(),
            TokenType::Cast | TokenType::TryCast => {
                self.advance();
                self.expect(TokenType::LParen, "(")?;
                let this = self.parse_expression()?;
                self.expect(TokenType::As, "AS")?;
                let to = self.parse_data_type()?;
                self.expect(TokenType::RParen, ")")?;
                let cast = Box::new(Cast {
                    this,
                    to,
                    double_colon: false,
                });
                Ok(if token.token_type == TokenType::Cast {
                    Expression::Cast(cast)
                } else {
                    Expression::TryCast(cast)
                })
            }
            TokenType::Extract => {
                self.advance();
                self.expect(TokenType::LParen, "(")?;
                let part = match self.advance() {
                    Some(t) if t.token_type != TokenType::RParen => t.text.to_uppercase(),
                    _ => return Err(self.error("Expected date part")),
                };
                self.expect(TokenType::From, "FROM")?;
                let this = self.parse_expression()?;
                self.expect(TokenType::RParen, ")")?;
                Ok(Expression::Extract(Box::new(Extract { part, this })))
            }
            TokenType::Interval => {
                self.advance();
                let this = self.parse_unary_operand()?;
                let unit = match self.peek() {
                    Some(t)
                        if t.token_type == TokenType::Var
                            && INTERVAL_UNITS.iter().any(|u| t.text.eq_ignore_ascii_case(u)) =>
                    {
                        let unit = t.text.to_uppercase();
                        self.advance();
                        Some(unit)
                    }
                    _ => None,
                };
                Ok(Expression::Interval(Box::new(Interval { this, unit })))
            }
            TokenType::Exists => {
                self.advance();
                self.expect(TokenType::LParen, "(")?;
                let this = self.parse_query()?;
                self.expect(TokenType::RParen, ")")?;
                Ok(Expression::Exists(Box::new(Exists { this })))
            }
            TokenType::Any | TokenType::All => {
                self.advance();
                self.expect(TokenType::LParen, "(")?;
                let this = if self.is_query_start_at(0) {
                    self.parse_query()?
                } else {
                    self.parse_expression()?
                };
                self.expect(TokenType::RParen, ")")?;
                let op = Box::new(UnaryOp::new(this));
                Ok(if token.token_type == TokenType::Any {
                    Expression::Any(op)
                } else {
                    Expression::All(op)
                })
            }
            TokenType::CurrentDate | TokenType::CurrentTime | TokenType::CurrentTimestamp => {
                self.advance();
                if self.check(TokenType::LParen) && self.check_at(1, TokenType::RParen) {
                    self.index += 2;
                }
                Ok(match token.token_type {
                    TokenType::CurrentDate => Expression::CurrentDate,
                    TokenType::CurrentTime => Expression::CurrentTime,
                    _ => Expression::CurrentTimestamp,
                })
            }
            TokenType::Var
                if TYPED_LITERALS.iter().any(|t| token.text.eq_ignore_ascii_case(t))
                    && self.check_at(1, TokenType::String) =>
            {
                let to = DataType::new(DataTypeKind::from_name(&token.text));
                self.advance();
                let value = self.advance().map(|t| t.text).unwrap_or_default();
                Ok(Expression::Cast(Box::new(Cast {
                    this: Expression::string(value),
                    to,
                    double_colon: false,
                })))
            }
            TokenType::Left | TokenType::Right | TokenType::Insert if self.check_at(1, TokenType::LParen) => {
                self.advance();
                self.parse_function(token.text, false)
            }
            _ if Self::is_identifier_token(&token) => self.parse_column_or_function(),
            _ => Err(self.error(format!("Expected an expression but got '{}'", token.text))),
        }
    }

    /// Operand of INTERVAL: a literal, a parameter or a parenthesized expression
    fn parse_unary_operand(&mut self) -> Result<Expression> {
        if self.check(TokenType::Dash) {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_paren(&mut self) -> Result<Expression> {
        self.expect(TokenType::LParen, "(")?;
        if self.is_query_start_at(0) {
            let this = self.parse_query()?;
            self.expect(TokenType::RParen, ")")?;
            return Ok(Expression::Subquery(Box::new(Subquery {
                this,
                alias: None,
                column_aliases: Vec::new(),
            })));
        }
        if self.matches(TokenType::RParen) {
            return Ok(Expression::Tuple(Box::new(Tuple { expressions: Vec::new() })));
        }
        let first = self.parse_expression()?;
        if self.matches(TokenType::Comma) {
            let mut expressions = vec![first];
            expressions.extend(self.parse_expression_list()?);
            self.expect(TokenType::RParen, ")")?;
            return Ok(Expression::Tuple(Box::new(Tuple { expressions })));
        }
        self.expect(TokenType::RParen, ")")?;
        Ok(first.paren())
    }

    fn parse_case(&mut self) -> Result<Expression> {
        self.expect(TokenType::Case, "CASE")?;
        let operand = if self.check(TokenType::When) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let mut whens = Vec::new();
        while self.matches(TokenType::When) {
            let condition = self.parse_expression()?;
            self.expect(TokenType::Then, "THEN")?;
            let result = self.parse_expression()?;
            whens.push((condition, result));
        }
        if whens.is_empty() {
            return Err(self.error("Expected WHEN"));
        }

        let else_ = if self.matches(TokenType::Else) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenType::End, "END")?;

        Ok(Expression::Case(Box::new(Case { operand, whens, else_ })))
    }

    fn parse_column_or_function(&mut self) -> Result<Expression> {
        let token = self.advance().ok_or_else(|| self.error("Expected an identifier"))?;
        let quoted = token.token_type == TokenType::Identifier;
        if self.check(TokenType::LParen) {
            return self.parse_function(token.text, quoted);
        }

        let mut parts = vec![Identifier {
            name: token.text,
            quoted,
        }];
        while self.check(TokenType::Dot) {
            if self.check_at(1, TokenType::Star) {
                self.index += 2;
                return Ok(Expression::Star(Star { table: parts.pop() }));
            }
            let next_is_name = self
                .peek_at(1)
                .map(|t| t.token_type == TokenType::Identifier || is_word(&t.text))
                .unwrap_or(false);
            if !next_is_name {
                break;
            }
            self.advance();
            let part = self.advance().ok_or_else(|| self.error("Expected an identifier"))?;
            parts.push(Identifier {
                quoted: part.token_type == TokenType::Identifier,
                name: part.text,
            });
        }

        // schema.func(...)
        if parts.len() > 1 && self.check(TokenType::LParen) {
            let name = parts.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(".");
            return self.parse_function(name, false);
        }
        if parts.len() > 3 {
            return Err(self.error("Too many parts in column name"));
        }

        let name = parts.pop().ok_or_else(|| self.error("Expected an identifier"))?;
        let table = parts.pop();
        let db = parts.pop();
        Ok(Expression::Column(Column { name, table, db }))
    }

    fn parse_function(&mut self, name: String, quoted: bool) -> Result<Expression> {
        self.expect(TokenType::LParen, "(")?;
        let distinct = self.matches(TokenType::Distinct);
        let mut args = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                if self.check(TokenType::Star)
                    && matches!(self.peek_at(1).map(|t| t.token_type), Some(TokenType::RParen | TokenType::Comma))
                {
                    self.advance();
                    args.push(Expression::star());
                } else {
                    args.push(self.parse_expression()?);
                }
                if !self.matches(TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RParen, ")")?;

        let filter = if self.check(TokenType::Filter) && self.check_at(1, TokenType::LParen) {
            self.index += 2;
            self.expect(TokenType::Where, "WHERE")?;
            let condition = self.parse_expression()?;
            self.expect(TokenType::RParen, ")")?;
            Some(condition)
        } else {
            None
        };

        let function = Expression::Function(Box::new(Function {
            name,
            args,
            distinct,
            quoted,
            filter,
        }));

        if self.matches(TokenType::Over) {
            let over = if self.matches(TokenType::LParen) {
                self.parse_window_spec()?
            } else {
                Over {
                    window_name: Some(self.parse_identifier()?),
                    ..Over::default()
                }
            };
            return Ok(Expression::WindowFunction(Box::new(WindowFunction { this: function, over })));
        }
        Ok(function)
    }

    /// Window specification body; the opening `(` is already consumed
    fn parse_window_spec(&mut self) -> Result<Over> {
        let mut over = Over::default();
        if matches!(self.peek_type(), Some(TokenType::Var | TokenType::Identifier)) {
            over.window_name = Some(self.parse_identifier()?);
        }
        if self.matches(TokenType::PartitionBy) {
            over.partition_by = self.parse_expression_list()?;
        }
        if self.matches(TokenType::OrderBy) {
            over.order_by = self.parse_ordered_list()?;
        }
        let frame_kind = if self.matches(TokenType::Rows) {
            Some(FrameKind::Rows)
        } else if self.matches(TokenType::Range) {
            Some(FrameKind::Range)
        } else {
            None
        };
        if let Some(kind) = frame_kind {
            let (start, end) = if self.matches(TokenType::Between) {
                let start = self.parse_frame_bound()?;
                self.expect(TokenType::And, "AND")?;
                (start, Some(self.parse_frame_bound()?))
            } else {
                (self.parse_frame_bound()?, None)
            };
            over.frame = Some(WindowFrame { kind, start, end });
        }
        self.expect(TokenType::RParen, ")")?;
        Ok(over)
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound> {
        if self.matches(TokenType::Unbounded) {
            if self.matches(TokenType::Preceding) {
                return Ok(FrameBound::UnboundedPreceding);
            }
            self.expect(TokenType::Following, "PRECEDING or FOLLOWING")?;
            return Ok(FrameBound::UnboundedFollowing);
        }
        if self.matches(TokenType::Current) {
            self.expect(TokenType::Row, "ROW")?;
            return Ok(FrameBound::CurrentRow);
        }
        let offset = self.parse_term()?;
        if self.matches(TokenType::Preceding) {
            Ok(FrameBound::Preceding(offset))
        } else {
            self.expect(TokenType::Following, "PRECEDING or FOLLOWING")?;
            Ok(FrameBound::Following(offset))
        }
    }

    fn parse_ordered_list(&mut self) -> Result<Vec<Expression>> {
        let mut list = Vec::new();
        loop {
            let this = self.parse_expression()?;
            let desc = if self.matches(TokenType::Desc) {
                true
            } else {
                self.matches(TokenType::Asc);
                false
            };
            let nulls_first = if self.matches(TokenType::Nulls) {
                if self.matches(TokenType::First) {
                    Some(true)
                } else {
                    self.expect(TokenType::Last, "FIRST or LAST")?;
                    Some(false)
                }
            } else {
                None
            };
            list.push(Expression::Ordered(Box::new(Ordered { this, desc, nulls_first })));
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        Ok(list)
    }

    /// Parse a data type such as `DECIMAL(10, 2)`, `ARRAY<INT>` or `INT[]`
    pub(crate) fn parse_data_type(&mut self) -> Result<DataType> {
        let token = match self.advance() {
            Some(t)
                if matches!(
                    t.token_type,
                    TokenType::Var | TokenType::Identifier | TokenType::Type | TokenType::Interval | TokenType::Array
                ) =>
            {
                t
            }
            _ => {
                if self.index > 0 {
                    self.index -= 1;
                }
                return Err(self.error("Expected a data type"));
            }
        };

        let kind = if token.token_type == TokenType::Identifier {
            DataTypeKind::UserDefined(token.text.clone())
        } else {
            DataTypeKind::from_name(&token.text)
        };

        let mut data_type = if kind == DataTypeKind::Array && self.matches(TokenType::Lt) {
            let element = self.parse_data_type()?;
            self.expect_closing_angle()?;
            DataType::array_of(element)
        } else {
            let mut dt = DataType::new(kind);
            if self.matches(TokenType::LParen) {
                loop {
                    match self.advance() {
                        Some(t) if t.token_type != TokenType::RParen && t.token_type != TokenType::Comma => {
                            dt.params.push(t.text)
                        }
                        _ => return Err(self.error("Expected a type parameter")),
                    }
                    if !self.matches(TokenType::Comma) {
                        break;
                    }
                }
                self.expect(TokenType::RParen, ")")?;
            }
            if dt.kind == DataTypeKind::Timestamp {
                if self.check(TokenType::With) && self.check_text_at(1, "TIME") && self.check_text_at(2, "ZONE") {
                    self.index += 3;
                    dt.kind = DataTypeKind::TimestampTz;
                } else if self.check_text("WITHOUT") && self.check_text_at(1, "TIME") && self.check_text_at(2, "ZONE") {
                    self.index += 3;
                }
            }
            dt
        };

        while self.check(TokenType::LBracket) && self.check_at(1, TokenType::RBracket) {
            self.index += 2;
            data_type = DataType::array_of(data_type);
        }
        Ok(data_type)
    }

    fn parse_identifier(&mut self) -> Result<Identifier> {
        match self.peek() {
            Some(t) if Self::is_identifier_token(t) => {
                let quoted = t.token_type == TokenType::Identifier;
                let name = t.text.clone();
                self.index += 1;
                Ok(Identifier { name, quoted })
            }
            _ => Err(self.error("Expected an identifier")),
        }
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<Identifier>> {
        self.expect(TokenType::LParen, "(")?;
        let mut list = Vec::new();
        loop {
            list.push(self.parse_identifier()?);
            if !self.matches(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RParen, ")")?;
        Ok(list)
    }

    /// Parse a lone expression, failing on trailing tokens
    pub fn parse_expression_tokens(&mut self, tokens: Vec<Token>, sql: &str) -> Result<Expression> {
        self.sql = sql.to_string();
        self.chars = sql.chars().collect();
        self.tokens = tokens;
        self.index = 0;
        self.depth = 0;
        let expr = self.parse_expression()?;
        if !self.at_end() {
            return Err(self.error("Invalid expression / Unexpected token"));
        }
        Ok(expr)
    }

    /// Parse a standalone data type, e.g. for `DataType` nodes built from text
    pub fn parse_data_type_tokens(&mut self, tokens: Vec<Token>, sql: &str) -> Result<DataType> {
        self.sql = sql.to_string();
        self.chars = sql.chars().collect();
        self.tokens = tokens;
        self.index = 0;
        let data_type = self.parse_data_type()?;
        if !self.at_end() {
            return Err(self.error("Invalid expression / Unexpected token"));
        }
        Ok(data_type)
    }
}

/// Split at top-level `;`, dropping empty statements
fn split_statements(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        if token.token_type == TokenType::Semicolon {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(token);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn parameter_from_text(text: &str) -> Parameter {
    let (style, name) = if let Some(rest) = text.strip_prefix("@@") {
        (ParameterStyle::DoubleAt, rest)
    } else if let Some(rest) = text.strip_prefix('@') {
        (ParameterStyle::At, rest)
    } else if let Some(rest) = text.strip_prefix('$') {
        (ParameterStyle::Dollar, rest)
    } else {
        (ParameterStyle::Colon, text.trim_start_matches(':'))
    };
    Parameter {
        name: name.to_string(),
        style,
    }
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Tokenizer;

    fn parse_with_level(sql: &str, error_level: ErrorLevel) -> Result<ParseOutput> {
        let tokens = Tokenizer::default().tokenize(sql)?;
        let mut parser = Parser::new(ParseOptions::default().with_error_level(error_level), ParserConfig::default());
        parser.parse(tokens, sql)
    }

    fn parse(sql: &str) -> Expression {
        parse_with_level(sql, ErrorLevel::Raise)
            .unwrap()
            .statements
            .remove(0)
            .unwrap()
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        match parse("1 + 2 * 3") {
            Expression::Add(op) => assert!(matches!(op.right, Expression::Mul(_))),
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        match parse("a OR b AND c") {
            Expression::Or(op) => assert!(matches!(op.right, Expression::And(_))),
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_operators_are_left_associative() {
        match parse("a - b - c") {
            Expression::Sub(op) => assert!(matches!(op.left, Expression::Sub(_))),
            other => panic!("expected Sub, got {other:?}"),
        }
    }

    #[test]
    fn test_not_in_becomes_negated_predicate() {
        let expr = parse("SELECT a FROM t WHERE a NOT IN (1, 2, 3)");
        let where_ = expr.as_select().unwrap().where_.as_ref().unwrap();
        match where_ {
            Expression::Not(op) => match &op.this {
                Expression::In(inn) => assert_eq!(inn.expressions.len(), 3),
                other => panic!("expected In, got {other:?}"),
            },
            other => panic!("expected Not, got {other:?}"),
        }
    }

    #[test]
    fn test_is_not_null() {
        let expr = parse("a IS NOT NULL");
        assert!(matches!(&expr, Expression::Not(op) if matches!(op.this, Expression::Is(_))));
    }

    #[test]
    fn test_case_with_and_without_operand() {
        match parse("CASE WHEN a = 1 THEN 'x' ELSE 'y' END") {
            Expression::Case(c) => {
                assert!(c.operand.is_none());
                assert_eq!(c.whens.len(), 1);
                assert!(c.else_.is_some());
            }
            other => panic!("expected Case, got {other:?}"),
        }
        match parse("CASE a WHEN 1 THEN 'x' WHEN 2 THEN 'y' END") {
            Expression::Case(c) => {
                assert!(c.operand.is_some());
                assert_eq!(c.whens.len(), 2);
            }
            other => panic!("expected Case, got {other:?}"),
        }
    }

    #[test]
    fn test_select_clauses() {
        let expr = parse(
            "SELECT DISTINCT a, COUNT(*) AS n FROM t AS x LEFT JOIN u ON x.id = u.id \
             WHERE a > 1 GROUP BY a HAVING COUNT(*) > 2 ORDER BY n DESC NULLS LAST LIMIT 10 OFFSET 5",
        );
        let select = expr.as_select().unwrap();
        assert!(select.distinct);
        assert_eq!(select.expressions.len(), 2);
        assert_eq!(select.joins.len(), 1);
        assert!(select.having.is_some());
        assert_eq!(select.order_by.len(), 1);
        assert!(select.limit.is_some());
        assert!(select.offset.is_some());
        match &select.order_by[0] {
            Expression::Ordered(o) => {
                assert!(o.desc);
                assert_eq!(o.nulls_first, Some(false));
            }
            other => panic!("expected Ordered, got {other:?}"),
        }
    }

    #[test]
    fn test_union_takes_trailing_modifiers() {
        match parse("SELECT a FROM t UNION ALL SELECT a FROM u ORDER BY a LIMIT 1") {
            Expression::Union(u) => {
                assert!(!u.distinct);
                assert_eq!(u.order_by.len(), 1);
                assert!(u.limit.is_some());
                assert!(u.right.as_select().unwrap().order_by.is_empty());
            }
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn test_with_clause() {
        let expr = parse("WITH x AS (SELECT 1 AS a) SELECT a FROM x");
        let with = expr.as_select().unwrap().with.as_ref().unwrap();
        assert_eq!(with.ctes.len(), 1);
        assert_eq!(with.ctes[0].name(), Some("x"));
    }

    #[test]
    fn test_window_function() {
        let expr = parse("ROW_NUMBER() OVER (PARTITION BY a ORDER BY b ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)");
        match expr {
            Expression::WindowFunction(w) => {
                assert_eq!(w.over.partition_by.len(), 1);
                let frame = w.over.frame.unwrap();
                assert_eq!(frame.start, FrameBound::UnboundedPreceding);
                assert_eq!(frame.end, Some(FrameBound::CurrentRow));
            }
            other => panic!("expected WindowFunction, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_array_type_splits_shift_token() {
        match parse("CAST(x AS ARRAY<ARRAY<INT>>)") {
            Expression::Cast(c) => {
                assert_eq!(c.to.kind, DataTypeKind::Array);
                assert_eq!(c.to.nested[0].kind, DataTypeKind::Array);
                assert_eq!(c.to.nested[0].nested[0].kind, DataTypeKind::Int);
            }
            other => panic!("expected Cast, got {other:?}"),
        }
    }

    #[test]
    fn test_double_colon_cast() {
        match parse("a::DECIMAL(10, 2)") {
            Expression::Cast(c) => {
                assert!(c.double_colon);
                assert_eq!(c.to.params, vec!["10".to_string(), "2".to_string()]);
            }
            other => panic!("expected Cast, got {other:?}"),
        }
    }

    #[test]
    fn test_create_table() {
        let expr = parse("CREATE TABLE IF NOT EXISTS t (id INT PRIMARY KEY, name VARCHAR(10) NOT NULL, PRIMARY KEY (id))");
        match expr {
            Expression::CreateTable(c) => {
                assert!(c.if_not_exists);
                assert_eq!(c.columns.len(), 3);
                assert_eq!(c.columns[2].kind(), ExpressionKind::Constraint);
            }
            other => panic!("expected CreateTable, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_statement_is_command() {
        match parse("SHOW TABLES FROM db") {
            Expression::Command(c) => {
                assert_eq!(c.this, "SHOW");
                assert_eq!(c.expression, "TABLES FROM db");
            }
            other => panic!("expected Command, got {other:?}"),
        }
    }

    #[test]
    fn test_statements_split_on_semicolon() {
        let out = parse_with_level("SELECT 1; SELECT 2;", ErrorLevel::Raise).unwrap();
        assert_eq!(out.statements.len(), 2);
    }

    const THREE_BROKEN: &str = "SELECT * FROM; SELECT (1; SELECT 1 +";

    #[test]
    fn test_warn_collects_every_error() {
        let out = parse_with_level(THREE_BROKEN, ErrorLevel::Warn).unwrap();
        assert_eq!(out.errors.len(), 3);
        assert_eq!(out.statements, vec![None, None, None]);
    }

    #[test]
    fn test_ignore_drops_errors() {
        let out = parse_with_level(THREE_BROKEN, ErrorLevel::Ignore).unwrap();
        assert!(out.errors.is_empty());
        assert_eq!(out.statements.len(), 3);
    }

    #[test]
    fn test_raise_stops_after_first_failed_statement() {
        let err = parse_with_level("SELECT 1; SELECT * FROM; SELECT (1", ErrorLevel::Raise).unwrap_err();
        assert_eq!(err.details().len(), 1);
        assert_eq!(err.details()[0].description, "Expected table name");
    }

    #[test]
    fn test_immediate_raises_first_error() {
        let err = parse_with_level(THREE_BROKEN, ErrorLevel::Immediate).unwrap_err();
        assert_eq!(err.details().len(), 1);
        assert_eq!(err.details()[0].line, 1);
    }

    #[test]
    fn test_leftover_tokens_are_a_soft_error() {
        let out = parse_with_level("SELECT 1 2 3", ErrorLevel::Warn).unwrap();
        assert_eq!(out.errors.len(), 1);
        assert!(out.statements[0].is_some());
    }

    #[test]
    fn test_error_detail_context() {
        let err = parse_with_level("SELECT a FROM t WHERE (b", ErrorLevel::Raise).unwrap_err();
        let detail = &err.details()[0];
        assert_eq!(detail.description, "Expecting )");
        assert_eq!(detail.highlight, "b");
        assert_eq!(detail.start_context, "SELECT a FROM t WHERE (");
        assert_eq!(detail.column, 24);
    }

    #[test]
    fn test_parse_into_rejects_other_kinds() {
        let sql = "SELECT 1";
        let tokens = Tokenizer::default().tokenize(sql).unwrap();
        let mut parser = Parser::new(ParseOptions::default(), ParserConfig::default());
        let err = parser.parse_into(tokens, sql, ExpressionKind::Insert).unwrap_err();
        assert_eq!(err.details()[0].into_expression.as_deref(), Some("Insert"));
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        // Own stack so the limit, not the default test thread size, decides the outcome
        let handle = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(|| {
                let sql = format!("SELECT {}1{}", "(".repeat(5000), ")".repeat(5000));
                let err = parse_with_level(&sql, ErrorLevel::Raise).unwrap_err();
                let description = err.details()[0].description.clone();

                let query = format!("{}SELECT 1{}", "(".repeat(5000), ")".repeat(5000));
                let out = parse_with_level(&query, ErrorLevel::Warn).unwrap();
                (description, out.errors.len(), out.statements)
            })
            .unwrap();
        let (description, errors, statements) = handle.join().unwrap();
        assert_eq!(description, format!("Nesting deeper than {MAX_NESTING_DEPTH} levels"));
        assert_eq!(errors, 1);
        assert_eq!(statements, vec![None]);
    }

    #[test]
    fn test_moderate_nesting_still_parses() {
        let sql = format!("SELECT {}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse_with_level(&sql, ErrorLevel::Raise).is_ok());
    }
}
