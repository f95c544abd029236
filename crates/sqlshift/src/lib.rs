//! sqlshift - SQL parsing and dialect translation library
//!
//! This library tokenizes SQL text, builds a dialect-neutral abstract
//! syntax tree, and renders that tree back to SQL for any supported dialect.
//!
//! # Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Tokenizer** - Converts SQL string to token stream
//! 2. **Parser** - Builds AST from tokens
//! 3. **Generator** - Converts AST back to SQL string
//!
//! Each stage is configured per dialect through plain config values, and a
//! dialect can replace the rendering of individual node kinds.
//!
//! ```
//! use sqlshift::{transpile, DialectType};
//!
//! let out = transpile(
//!     "SELECT a FROM t WHERE a ILIKE '%x%'",
//!     DialectType::PostgreSQL,
//!     DialectType::MySQL,
//! )
//! .unwrap();
//! assert_eq!(out, vec!["SELECT a FROM t WHERE a LIKE '%x%'"]);
//! ```

pub mod builder;
pub mod dialects;
pub mod error;
pub mod expressions;
pub mod generator;
pub mod parser;
pub mod tokens;
pub mod traversal;
pub mod trie;

use serde::{Deserialize, Serialize};

pub use dialects::{
    get_or_raise, register_dialect, unregister_custom_dialect, CustomDialectBuilder, Dialect, DialectImpl,
    DialectRef, DialectRegistry, DialectType,
};
pub use error::{
    concat_messages, highlight_sql, Error, ErrorKind, ErrorLevel, Highlight, ParseError, ParseErrorDetail, Result,
};
pub use expressions::{Expression, ExpressionKind};
pub use generator::{Generator, GeneratorConfig, NormalizeFunctions};
pub use parser::{ParseOptions, ParseOutput, Parser, ParserConfig};
pub use tokens::{Span, Token, TokenType, Tokenizer, TokenizerConfig};
pub use traversal::{get_columns, get_tables, transform, BfsIter, DfsIter, ExpressionWalk, TreeContext};
pub use trie::{new_trie_from_keys, Trie, TrieResult};

/// Options for [`transpile_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspileOptions {
    /// Source dialect name, optionally with settings (`"mysql, identify"`)
    pub read: String,
    /// Target dialect name, optionally with settings
    pub write: String,
    pub error_level: ErrorLevel,
    /// Force pretty output regardless of the target's settings
    pub pretty: bool,
    /// Level for constructs the target can only approximate
    pub unsupported_level: ErrorLevel,
    /// Force quoting of every identifier
    pub identify: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            read: DialectType::Generic.to_string(),
            write: DialectType::Generic.to_string(),
            error_level: ErrorLevel::Raise,
            pretty: false,
            unsupported_level: ErrorLevel::Warn,
            identify: false,
        }
    }
}

impl TranspileOptions {
    pub fn new(read: impl Into<String>, write: impl Into<String>) -> Self {
        Self {
            read: read.into(),
            write: write.into(),
            ..Self::default()
        }
    }

    pub fn with_error_level(mut self, error_level: ErrorLevel) -> Self {
        self.error_level = error_level;
        self
    }

    pub fn with_unsupported_level(mut self, level: ErrorLevel) -> Self {
        self.unsupported_level = level;
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn identify(mut self, identify: bool) -> Self {
        self.identify = identify;
        self
    }
}

/// Tokenize SQL with the generic dialect's lexical rules.
pub fn tokenize(sql: &str) -> Result<Vec<Token>> {
    Dialect::get(DialectType::Generic).tokenize(sql)
}

/// Transpile SQL from one dialect to another.
///
/// # Arguments
/// * `sql` - The SQL string to transpile
/// * `read` - The source dialect to parse with
/// * `write` - The target dialect to generate
///
/// # Returns
/// One string per top-level statement
pub fn transpile(sql: &str, read: DialectType, write: DialectType) -> Result<Vec<String>> {
    Dialect::get(read).transpile(sql, &Dialect::get(write))
}

/// Transpile with dialect names resolved through the process-wide registry.
///
/// Statements that fail to parse under [`ErrorLevel::Ignore`] or
/// [`ErrorLevel::Warn`] come back as empty strings so the output keeps one
/// entry per input statement.
///
/// ```
/// use sqlshift::{transpile_with, TranspileOptions};
///
/// let out = transpile_with("SELECT a FROM t", &TranspileOptions::new("postgres", "tsql").identify(true)).unwrap();
/// assert_eq!(out, vec!["SELECT [a] FROM [t]"]);
/// ```
pub fn transpile_with(sql: &str, options: &TranspileOptions) -> Result<Vec<String>> {
    let read = get_or_raise(options.read.as_str())?;
    let write = get_or_raise(options.write.as_str())?;

    let output = read.parse_with(sql, ParseOptions::default().with_error_level(options.error_level))?;

    let mut config = write.generator_config().clone();
    config.pretty |= options.pretty;
    config.identify |= options.identify;
    config.unsupported_level = options.unsupported_level;

    tracing::debug!(
        target: "sqlshift::dialects",
        read = %read.name(),
        write = %write.name(),
        statements = output.statements.len(),
        "transpiling"
    );

    output
        .statements
        .iter()
        .map(|statement| match statement {
            Some(expr) => write.generate_with(expr, config.clone()),
            None => Ok(String::new()),
        })
        .collect()
}

/// Transpile SQL from one dialect to another, using string dialect names.
///
/// This supports both built-in dialect names (e.g., "postgresql", "mysql") and
/// custom dialects registered via [`CustomDialectBuilder`].
pub fn transpile_by_name(sql: &str, read: &str, write: &str) -> Result<Vec<String>> {
    let read_dialect = get_or_raise(read)?;
    let write_dialect = get_or_raise(write)?;
    read_dialect.transpile(sql, &write_dialect)
}

/// Parse SQL into an AST.
///
/// Failed statements are an error; see [`parse_with`] for the other error levels.
pub fn parse(sql: &str, dialect: DialectType) -> Result<Vec<Expression>> {
    Dialect::get(dialect).parse(sql)
}

/// Parse SQL under explicit [`ParseOptions`].
///
/// The output holds one slot per statement, `None` where a statement could
/// not be parsed and the error level let the parser carry on.
pub fn parse_with<'a>(sql: &str, dialect: impl Into<DialectRef<'a>>, options: ParseOptions) -> Result<ParseOutput> {
    get_or_raise(dialect)?.parse_with(sql, options)
}

/// Parse a single SQL statement.
///
/// # Returns
/// The parsed expression, or an error if the input holds more or fewer than one
pub fn parse_one(sql: &str, dialect: DialectType) -> Result<Expression> {
    let mut expressions = parse(sql, dialect)?;

    if expressions.len() != 1 {
        return Err(Error::parse(format!("Expected 1 statement, found {}", expressions.len())));
    }

    Ok(expressions.remove(0))
}

/// Parse statements that must all be of `kind`.
pub fn parse_into(sql: &str, dialect: DialectType, kind: ExpressionKind) -> Result<Vec<Expression>> {
    let d = Dialect::get(dialect);
    let tokens = d.tokenize(sql)?;
    let mut parser = Parser::new(ParseOptions::default(), d.parser_config().clone());
    let output = parser.parse_into(tokens, sql, kind)?;
    Ok(output.statements.into_iter().flatten().collect())
}

/// Generate SQL from an AST.
pub fn generate(expression: &Expression, dialect: DialectType) -> Result<String> {
    Dialect::get(dialect).generate(expression)
}

/// Check that `sql` parses and that every top-level node is a statement.
///
/// ```
/// use sqlshift::{validate, DialectType};
///
/// assert!(validate("SELECT 1", DialectType::Generic).is_ok());
/// assert!(validate("a + 1", DialectType::Generic).is_err());
/// ```
pub fn validate(sql: &str, dialect: DialectType) -> Result<()> {
    for expr in parse(sql, dialect)? {
        // The parser accepts a bare expression at the top level.
        if !expr.is_statement() {
            return Err(Error::parse(format!(
                "Invalid expression / Unexpected token: {} is not a statement",
                expr.kind()
            )));
        }
    }
    Ok(())
}
