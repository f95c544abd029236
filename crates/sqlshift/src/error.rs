//! Error types for sqlshift
//!
//! Every fallible operation returns [`Result`], whose error side is the
//! closed [`Error`] enum. Parse failures carry structured
//! [`ParseErrorDetail`] records with the source context around the
//! offending token, produced by [`highlight_sql`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The result type for sqlshift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Escape sequence opening an underlined run in highlighted SQL.
pub const ANSI_UNDERLINE: &str = "\u{1b}[4m";
/// Escape sequence closing an underlined run.
pub const ANSI_RESET: &str = "\u{1b}[0m";

/// Errors that can occur during SQL tokenization, parsing and generation
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Lexical failure (unterminated string, comment, or identifier)
    #[error("Tokenization error at line {line}, column {column}: {message}")]
    Tokenize {
        message: String,
        line: usize,
        column: usize,
        /// Char offset into the source where scanning stopped
        position: usize,
    },

    /// One or more grammar violations
    #[error("{0}")]
    Parse(ParseError),

    /// Error during SQL generation
    #[error("Generation error: {0}")]
    Generate(String),

    /// Construct has no valid rendering in the target dialect
    #[error("Unsupported: {feature} is not supported in {dialect}")]
    Unsupported { feature: String, dialect: String },

    /// Raised by query optimization passes
    #[error("Optimization error: {0}")]
    Optimize(String),

    /// Raised by schema resolution
    #[error("Schema error: {0}")]
    Schema(String),

    /// Raised by query execution
    #[error("Execution error: {0}")]
    Execute(String),

    /// Dialect name that is not present in the registry
    #[error("Unknown dialect '{0}'")]
    UnknownDialect(String),

    /// Malformed dialect setting or registry operation
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// Internal error (should not happen in normal usage)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Kind tag of an [`Error`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Tokenize,
    Parse,
    Generate,
    Unsupported,
    Optimize,
    Schema,
    Execute,
    UnknownDialect,
    InvalidSetting,
    Internal,
}

impl Error {
    /// Create a tokenization error
    pub fn tokenize(message: impl Into<String>, line: usize, column: usize, position: usize) -> Self {
        Error::Tokenize {
            message: message.into(),
            line,
            column,
            position,
        }
    }

    /// Create a parse error from a single message without positional detail
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(ParseError::new(message))
    }

    /// Create a generation error
    pub fn generate(message: impl Into<String>) -> Self {
        Error::Generate(message.into())
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: impl Into<String>, dialect: impl Into<String>) -> Self {
        Error::Unsupported {
            feature: feature.into(),
            dialect: dialect.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    /// The kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Tokenize { .. } => ErrorKind::Tokenize,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Generate(_) => ErrorKind::Generate,
            Error::Unsupported { .. } => ErrorKind::Unsupported,
            Error::Optimize(_) => ErrorKind::Optimize,
            Error::Schema(_) => ErrorKind::Schema,
            Error::Execute(_) => ErrorKind::Execute,
            Error::UnknownDialect(_) => ErrorKind::UnknownDialect,
            Error::InvalidSetting(_) => ErrorKind::InvalidSetting,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Structured parse details, empty for every other kind
    pub fn details(&self) -> &[ParseErrorDetail] {
        match self {
            Error::Parse(e) => &e.errors,
            _ => &[],
        }
    }
}

/// Policy deciding how the parser surfaces grammar violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorLevel {
    /// Drop errors and move on to the next statement
    Ignore,
    /// Record errors, log them, and keep going
    Warn,
    /// Collect errors and raise once the current statement has been parsed
    #[default]
    Raise,
    /// Raise on the first error
    Immediate,
}

/// One grammar violation with its position and surrounding source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseErrorDetail {
    pub description: String,
    /// 1-based line of the offending token
    pub line: usize,
    /// 1-based column of the offending token
    pub column: usize,
    /// Source text preceding the highlight
    pub start_context: String,
    /// The offending text
    pub highlight: String,
    /// Source text following the highlight
    pub end_context: String,
    /// Name of the construct being parsed when parsing into a specific kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub into_expression: Option<String>,
}

impl fmt::Display for ParseErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. Line {}, Col: {}.\n  {}{}{}{}{}",
            self.description,
            self.line,
            self.column,
            self.start_context,
            ANSI_UNDERLINE,
            self.highlight,
            ANSI_RESET,
            self.end_context
        )
    }
}

/// A structural error: a merged message plus every individual detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub errors: Vec<ParseErrorDetail>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Wrap a single detail; the message is the detail's rendering.
    pub fn from_detail(detail: ParseErrorDetail) -> Self {
        Self {
            message: detail.to_string(),
            errors: vec![detail],
        }
    }

    /// Merge details into one error whose message lists at most
    /// `max_errors` of them.
    pub fn from_details(errors: Vec<ParseErrorDetail>, max_errors: usize) -> Self {
        Self {
            message: concat_messages(&errors, max_errors),
            errors,
        }
    }

    /// Flatten several parse errors into their combined detail list.
    pub fn merge(errors: impl IntoIterator<Item = ParseError>) -> Vec<ParseErrorDetail> {
        errors.into_iter().flat_map(|e| e.errors).collect()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Join up to `maximum` error messages, appending a count of the rest.
///
/// ```
/// use sqlshift::error::concat_messages;
///
/// let msg = concat_messages(&["a", "b", "c"], 2);
/// assert_eq!(msg, "a\n\nb\n\n... and 1 more");
/// ```
pub fn concat_messages<E: fmt::Display>(errors: &[E], maximum: usize) -> String {
    let mut parts: Vec<String> = errors.iter().take(maximum).map(|e| e.to_string()).collect();
    if errors.len() > maximum {
        parts.push(format!("... and {} more", errors.len() - maximum));
    }
    parts.join("\n\n")
}

/// Output of [`highlight_sql`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Context, underlined runs and trailing context joined together
    pub formatted: String,
    pub start_context: String,
    /// Text from the first highlighted char through the last
    pub highlight: String,
    pub end_context: String,
}

/// Underline one or more inclusive `(start, end)` char spans of `sql`.
///
/// Spans are sorted, and overlapping or adjacent spans are merged into one
/// run. Leading and trailing context are clamped to `context_length` chars.
///
/// ```
/// use sqlshift::error::highlight_sql;
///
/// let h = highlight_sql("0123456789", &[(2, 5), (4, 8)], 2).unwrap();
/// assert_eq!(h.start_context, "01");
/// assert_eq!(h.highlight, "2345678");
/// assert_eq!(h.end_context, "9");
/// ```
pub fn highlight_sql(sql: &str, positions: &[(usize, usize)], context_length: usize) -> Result<Highlight> {
    if positions.is_empty() {
        return Err(Error::internal("highlight_sql requires at least one (start, end) span"));
    }

    let chars: Vec<char> = sql.chars().collect();
    let len = chars.len();
    let slice = |from: usize, to: usize| -> String { chars[from.min(len)..to.min(len)].iter().collect() };

    let mut spans: Vec<(usize, usize)> = positions
        .iter()
        .map(|&(start, end)| (start.min(len), end.max(start)))
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let first = merged[0].0;
    let start_context = slice(first.saturating_sub(context_length), first);
    let mut formatted = start_context.clone();
    let mut previous_end = first;

    for (start, end) in merged {
        let run_end = end.saturating_add(1).min(len);
        if start >= run_end {
            continue;
        }
        if start > previous_end {
            formatted.push_str(&slice(previous_end, start));
        }
        formatted.push_str(ANSI_UNDERLINE);
        formatted.push_str(&slice(start, run_end));
        formatted.push_str(ANSI_RESET);
        previous_end = run_end;
    }

    let end_context = slice(previous_end, previous_end.saturating_add(context_length));
    formatted.push_str(&end_context);

    Ok(Highlight {
        formatted,
        start_context,
        highlight: slice(first, previous_end),
        end_context,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_merges_overlapping_spans() {
        let h = highlight_sql("0123456789", &[(2, 5), (4, 8)], 2).unwrap();
        assert_eq!(h.start_context, "01");
        assert_eq!(h.highlight, "2345678");
        assert_eq!(h.end_context, "9");
        assert_eq!(h.formatted, format!("01{}2345678{}9", ANSI_UNDERLINE, ANSI_RESET));
    }

    #[test]
    fn test_highlight_merges_adjacent_spans() {
        let h = highlight_sql("abcdefgh", &[(4, 5), (2, 3)], 1).unwrap();
        assert_eq!(h.highlight, "cdef");
        assert_eq!(h.formatted, format!("b{}cdef{}g", ANSI_UNDERLINE, ANSI_RESET));
    }

    #[test]
    fn test_highlight_disjoint_spans() {
        let h = highlight_sql("SELECT a FROM b", &[(0, 1), (9, 12)], 3).unwrap();
        assert_eq!(h.start_context, "");
        assert_eq!(h.highlight, "SELECT a FROM");
        assert_eq!(h.end_context, " b");
        assert_eq!(
            h.formatted,
            format!("{u}SE{r}LECT a {u}FROM{r} b", u = ANSI_UNDERLINE, r = ANSI_RESET)
        );
    }

    #[test]
    fn test_highlight_clamps_to_bounds() {
        let h = highlight_sql("abc", &[(1, 50)], 100).unwrap();
        assert_eq!(h.start_context, "a");
        assert_eq!(h.highlight, "bc");
        assert_eq!(h.end_context, "");
    }

    #[test]
    fn test_highlight_requires_spans() {
        assert!(highlight_sql("abc", &[], 10).is_err());
    }

    #[test]
    fn test_concat_messages() {
        let errors = ["first", "second", "third", "fourth"];
        assert_eq!(concat_messages(&errors, 5), "first\n\nsecond\n\nthird\n\nfourth");
        assert_eq!(concat_messages(&errors, 2), "first\n\nsecond\n\n... and 2 more");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::unsupported("QUALIFY", "mysql").kind(), ErrorKind::Unsupported);
        assert_eq!(Error::tokenize("x", 1, 1, 0).kind(), ErrorKind::Tokenize);
        assert_eq!(Error::parse("x").kind(), ErrorKind::Parse);
        assert!(Error::generate("x").details().is_empty());
    }

    #[test]
    fn test_unsupported_message() {
        let err = Error::unsupported("QUALIFY", "mysql");
        assert_eq!(err.to_string(), "Unsupported: QUALIFY is not supported in mysql");
    }
}
