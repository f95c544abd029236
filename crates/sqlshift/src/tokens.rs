//! Token types and tokenization for SQL parsing
//!
//! The [`Tokenizer`] is a char-stream scanner driven entirely by a
//! [`TokenizerConfig`]: quote pairs, escape characters, comment markers and
//! the keyword table all come from the dialect. Multi-character operators
//! and multi-word keywords are recognized through a [`Trie`] built from the
//! keyword table, so the longest match always wins.

use crate::error::{Error, Result};
use crate::trie::{Trie, TrieResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Position of a token in the source SQL
///
/// Offsets count chars, not bytes, so they line up with
/// [`crate::error::highlight_sql`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Starting char offset
    pub start: usize,
    /// Ending char offset (exclusive)
    pub end: usize,
    /// Line number of the first char (1-based)
    pub line: usize,
    /// Column number of the first char (1-based)
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self { start, end, line, column }
    }
}

/// A token in the SQL token stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    /// Matched text. Quoted strings and identifiers hold their unescaped
    /// content; multi-word keywords hold the canonical single-spaced form.
    pub text: String,
    pub span: Span,
    /// Comments that appeared before this token
    #[serde(default)]
    pub comments: Vec<String>,
    /// Comments that appeared after this token, before the next one
    #[serde(default)]
    pub trailing_comments: Vec<String>,
}

impl Token {
    pub fn new(token_type: TokenType, text: impl Into<String>, span: Span) -> Self {
        Self {
            token_type,
            text: text.into(),
            span,
            comments: Vec::new(),
            trailing_comments: Vec::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.token_type, self.text)
    }
}

/// All token types recognized by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Dash,
    Plus,
    Star,
    Slash,
    Percent,
    Semicolon,
    Colon,
    DColon,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Neq,
    NullsafeEq,
    Amp,
    Pipe,
    Caret,
    Tilde,
    DPipe,
    LtLt,
    GtGt,
    Arrow,
    DArrow,

    // Literals and names
    String,
    NationalString,
    HexString,
    BitString,
    ByteString,
    EscapeString,
    Number,
    /// Quoted identifier
    Identifier,
    /// Unquoted word that is not a keyword
    Var,
    /// Multi-word type name such as `DOUBLE PRECISION`
    Type,
    /// `$1`, `:name`, `@name`
    Parameter,
    /// `?`
    Placeholder,

    // Keywords
    All,
    And,
    Any,
    Array,
    As,
    Asc,
    Begin,
    Between,
    By,
    Case,
    Cast,
    Check,
    Collate,
    Command,
    Commit,
    Constraint,
    Create,
    Cross,
    Current,
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
    Default,
    Delete,
    Desc,
    Distinct,
    Drop,
    Else,
    End,
    Escape,
    Except,
    Exists,
    Extract,
    False,
    Fetch,
    Filter,
    First,
    Following,
    For,
    From,
    Full,
    GroupBy,
    Having,
    If,
    ILike,
    In,
    Inner,
    Insert,
    Intersect,
    Interval,
    Into,
    Is,
    Join,
    Key,
    Last,
    Left,
    Like,
    Limit,
    Natural,
    Next,
    Not,
    Null,
    Nulls,
    Offset,
    On,
    Only,
    Or,
    OrderBy,
    Outer,
    Over,
    PartitionBy,
    Preceding,
    Primary,
    Qualify,
    Range,
    Recursive,
    References,
    Replace,
    Right,
    RLike,
    Rollback,
    Row,
    Rows,
    Select,
    Set,
    Table,
    Temporary,
    Then,
    Ties,
    Top,
    Transaction,
    True,
    TryCast,
    Unbounded,
    Union,
    Unique,
    Update,
    Use,
    Using,
    Values,
    View,
    When,
    Where,
    Window,
    With,
}

impl TokenType {
    /// Keywords that may still be used as plain identifiers
    pub fn is_soft_keyword(&self) -> bool {
        matches!(
            self,
            TokenType::Array
                | TokenType::Begin
                | TokenType::Commit
                | TokenType::Current
                | TokenType::Escape
                | TokenType::Filter
                | TokenType::First
                | TokenType::Following
                | TokenType::If
                | TokenType::Key
                | TokenType::Last
                | TokenType::Next
                | TokenType::Nulls
                | TokenType::Only
                | TokenType::Preceding
                | TokenType::Range
                | TokenType::Recursive
                | TokenType::Replace
                | TokenType::Rollback
                | TokenType::Row
                | TokenType::Rows
                | TokenType::Temporary
                | TokenType::Ties
                | TokenType::Transaction
                | TokenType::Unbounded
                | TokenType::Use
                | TokenType::View
                | TokenType::Command
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            TokenType::String
                | TokenType::NationalString
                | TokenType::HexString
                | TokenType::BitString
                | TokenType::ByteString
                | TokenType::EscapeString
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Whether `word` is a base keyword that cannot appear as a bare identifier
pub fn is_reserved_word(word: &str) -> bool {
    let upper = word.to_uppercase();
    BASE_KEYWORDS
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|(_, token_type)| !token_type.is_soft_keyword() && *token_type != TokenType::Type)
        .unwrap_or(false)
}

const BASE_KEYWORDS: &[(&str, TokenType)] = &[
    ("ALL", TokenType::All),
    ("AND", TokenType::And),
    ("ANY", TokenType::Any),
    ("SOME", TokenType::Any),
    ("ARRAY", TokenType::Array),
    ("AS", TokenType::As),
    ("ASC", TokenType::Asc),
    ("BEGIN", TokenType::Begin),
    ("BETWEEN", TokenType::Between),
    ("BY", TokenType::By),
    ("CASE", TokenType::Case),
    ("CAST", TokenType::Cast),
    ("CHECK", TokenType::Check),
    ("COLLATE", TokenType::Collate),
    ("COMMIT", TokenType::Commit),
    ("CONSTRAINT", TokenType::Constraint),
    ("CREATE", TokenType::Create),
    ("CROSS", TokenType::Cross),
    ("CURRENT", TokenType::Current),
    ("CURRENT_DATE", TokenType::CurrentDate),
    ("CURRENT_TIME", TokenType::CurrentTime),
    ("CURRENT_TIMESTAMP", TokenType::CurrentTimestamp),
    ("DEFAULT", TokenType::Default),
    ("DELETE", TokenType::Delete),
    ("DESC", TokenType::Desc),
    ("DISTINCT", TokenType::Distinct),
    ("DROP", TokenType::Drop),
    ("ELSE", TokenType::Else),
    ("END", TokenType::End),
    ("ESCAPE", TokenType::Escape),
    ("EXCEPT", TokenType::Except),
    ("MINUS", TokenType::Except),
    ("EXISTS", TokenType::Exists),
    ("EXTRACT", TokenType::Extract),
    ("FALSE", TokenType::False),
    ("FETCH", TokenType::Fetch),
    ("FILTER", TokenType::Filter),
    ("FIRST", TokenType::First),
    ("FOLLOWING", TokenType::Following),
    ("FOR", TokenType::For),
    ("FROM", TokenType::From),
    ("FULL", TokenType::Full),
    ("GROUP BY", TokenType::GroupBy),
    ("HAVING", TokenType::Having),
    ("IF", TokenType::If),
    ("ILIKE", TokenType::ILike),
    ("IN", TokenType::In),
    ("INNER", TokenType::Inner),
    ("INSERT", TokenType::Insert),
    ("INTERSECT", TokenType::Intersect),
    ("INTERVAL", TokenType::Interval),
    ("INTO", TokenType::Into),
    ("IS", TokenType::Is),
    ("JOIN", TokenType::Join),
    ("KEY", TokenType::Key),
    ("LAST", TokenType::Last),
    ("LEFT", TokenType::Left),
    ("LIKE", TokenType::Like),
    ("LIMIT", TokenType::Limit),
    ("NATURAL", TokenType::Natural),
    ("NEXT", TokenType::Next),
    ("NOT", TokenType::Not),
    ("NULL", TokenType::Null),
    ("NULLS", TokenType::Nulls),
    ("OFFSET", TokenType::Offset),
    ("ON", TokenType::On),
    ("ONLY", TokenType::Only),
    ("OR", TokenType::Or),
    ("ORDER BY", TokenType::OrderBy),
    ("OUTER", TokenType::Outer),
    ("OVER", TokenType::Over),
    ("PARTITION BY", TokenType::PartitionBy),
    ("PRECEDING", TokenType::Preceding),
    ("PRIMARY", TokenType::Primary),
    ("QUALIFY", TokenType::Qualify),
    ("RANGE", TokenType::Range),
    ("RECURSIVE", TokenType::Recursive),
    ("REFERENCES", TokenType::References),
    ("REPLACE", TokenType::Replace),
    ("RIGHT", TokenType::Right),
    ("RLIKE", TokenType::RLike),
    ("REGEXP", TokenType::RLike),
    ("ROLLBACK", TokenType::Rollback),
    ("ROW", TokenType::Row),
    ("ROWS", TokenType::Rows),
    ("SELECT", TokenType::Select),
    ("SET", TokenType::Set),
    ("TABLE", TokenType::Table),
    ("TEMPORARY", TokenType::Temporary),
    ("TEMP", TokenType::Temporary),
    ("THEN", TokenType::Then),
    ("TIES", TokenType::Ties),
    ("TRANSACTION", TokenType::Transaction),
    ("TRUE", TokenType::True),
    ("TRY_CAST", TokenType::TryCast),
    ("UNBOUNDED", TokenType::Unbounded),
    ("UNION", TokenType::Union),
    ("UNIQUE", TokenType::Unique),
    ("UPDATE", TokenType::Update),
    ("USE", TokenType::Use),
    ("USING", TokenType::Using),
    ("VALUES", TokenType::Values),
    ("VIEW", TokenType::View),
    ("WHEN", TokenType::When),
    ("WHERE", TokenType::Where),
    ("WINDOW", TokenType::Window),
    ("WITH", TokenType::With),
    // Statements the parser keeps as raw commands
    ("ANALYZE", TokenType::Command),
    ("CALL", TokenType::Command),
    ("COMMENT", TokenType::Command),
    ("EXECUTE", TokenType::Command),
    ("EXPLAIN", TokenType::Command),
    ("GRANT", TokenType::Command),
    ("REVOKE", TokenType::Command),
    ("SHOW", TokenType::Command),
    ("TRUNCATE", TokenType::Command),
    // Multi-word type names
    ("DOUBLE PRECISION", TokenType::Type),
    ("CHARACTER VARYING", TokenType::Type),
    // Multi-character operators
    ("<=", TokenType::Lte),
    (">=", TokenType::Gte),
    ("<>", TokenType::Neq),
    ("!=", TokenType::Neq),
    ("==", TokenType::Eq),
    ("<=>", TokenType::NullsafeEq),
    ("::", TokenType::DColon),
    ("||", TokenType::DPipe),
    ("<<", TokenType::LtLt),
    (">>", TokenType::GtGt),
    ("->", TokenType::Arrow),
    ("->>", TokenType::DArrow),
];

const BASE_SINGLE_TOKENS: &[(char, TokenType)] = &[
    ('(', TokenType::LParen),
    (')', TokenType::RParen),
    ('[', TokenType::LBracket),
    (']', TokenType::RBracket),
    (',', TokenType::Comma),
    ('.', TokenType::Dot),
    ('-', TokenType::Dash),
    ('+', TokenType::Plus),
    ('*', TokenType::Star),
    ('/', TokenType::Slash),
    ('%', TokenType::Percent),
    (';', TokenType::Semicolon),
    (':', TokenType::Colon),
    ('<', TokenType::Lt),
    ('>', TokenType::Gt),
    ('=', TokenType::Eq),
    ('&', TokenType::Amp),
    ('|', TokenType::Pipe),
    ('^', TokenType::Caret),
    ('~', TokenType::Tilde),
    ('?', TokenType::Placeholder),
];

/// Tokenizer configuration for a dialect
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Uppercase keyword or operator spelling -> token type
    pub keywords: HashMap<String, TokenType>,
    /// Single character tokens
    pub single_tokens: HashMap<char, TokenType>,
    /// String quote characters (start -> end)
    pub quotes: HashMap<char, char>,
    /// Identifier quote characters (start -> end)
    pub identifiers: HashMap<char, char>,
    /// Comment markers (start -> end, `None` for line comments)
    pub comments: HashMap<String, Option<String>>,
    /// Characters escaping the next char inside a string. A quote char in
    /// this list escapes itself by doubling.
    pub string_escapes: Vec<char>,
    /// Whether block comments nest
    pub nested_comments: bool,
    /// Whether `b'...'` is a byte string rather than a bit string
    pub b_prefix_is_byte_string: bool,
    /// Whether `E'...'` introduces a backslash-escaped string
    pub escape_string_prefix: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        let keywords = BASE_KEYWORDS.iter().map(|(k, t)| (k.to_string(), *t)).collect();
        let single_tokens = BASE_SINGLE_TOKENS.iter().copied().collect();

        let mut comments = HashMap::new();
        comments.insert("--".to_string(), None);
        comments.insert("/*".to_string(), Some("*/".to_string()));

        Self {
            keywords,
            single_tokens,
            quotes: HashMap::from([('\'', '\'')]),
            identifiers: HashMap::from([('"', '"')]),
            comments,
            string_escapes: vec!['\''],
            nested_comments: true,
            b_prefix_is_byte_string: false,
            escape_string_prefix: false,
        }
    }
}

impl TokenizerConfig {
    /// Add or override keyword entries
    pub fn with_keywords<'k>(mut self, entries: impl IntoIterator<Item = (&'k str, TokenType)>) -> Self {
        for (key, token_type) in entries {
            self.keywords.insert(key.to_uppercase(), token_type);
        }
        self
    }

    /// Whether backslash acts as an escape inside strings
    pub fn backslash_escapes(&self) -> bool {
        self.string_escapes.contains(&'\\')
    }
}

/// Keys that need trie matching: anything containing whitespace or a
/// non-word char. Plain words are resolved after scanning the whole word.
fn needs_trie(key: &str) -> bool {
    key.chars().any(|c| c.is_whitespace() || !(c.is_alphanumeric() || c == '_'))
}

/// SQL tokenizer bound to one configuration
#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
    keyword_trie: Trie<TokenType>,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        let mut keyword_trie = Trie::new();
        keyword_trie.extend(
            config
                .keywords
                .iter()
                .filter(|(key, _)| needs_trie(key))
                .map(|(key, token_type)| (key.as_str(), *token_type)),
        );
        Self { config, keyword_trie }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize a SQL string
    pub fn tokenize(&self, sql: &str) -> Result<Vec<Token>> {
        let mut state = TokenizerState::new(sql, &self.config, &self.keyword_trie);
        let tokens = state.tokenize()?;
        tracing::trace!(target: "sqlshift::tokenizer", tokens = tokens.len(), "tokenized");
        Ok(tokens)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

/// Internal state for tokenization
struct TokenizerState<'a> {
    chars: Vec<char>,
    size: usize,
    tokens: Vec<Token>,
    start: usize,
    start_line: usize,
    start_column: usize,
    current: usize,
    line: usize,
    column: usize,
    comments: Vec<String>,
    config: &'a TokenizerConfig,
    keyword_trie: &'a Trie<TokenType>,
}

impl<'a> TokenizerState<'a> {
    fn new(sql: &str, config: &'a TokenizerConfig, keyword_trie: &'a Trie<TokenType>) -> Self {
        let chars: Vec<char> = sql.chars().collect();
        let size = chars.len();
        Self {
            chars,
            size,
            tokens: Vec::new(),
            start: 0,
            start_line: 1,
            start_column: 1,
            current: 0,
            line: 1,
            column: 1,
            comments: Vec::new(),
            config,
            keyword_trie,
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            if self.peek().is_whitespace() {
                self.advance();
                continue;
            }
            self.mark_start();
            if self.scan_comment()? {
                continue;
            }
            self.scan_token()?;
        }

        // Comments after the last token have nowhere else to go
        if let Some(last) = self.tokens.last_mut() {
            last.trailing_comments.append(&mut self.comments);
        }

        Ok(std::mem::take(&mut self.tokens))
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.size
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn mark_start(&mut self) {
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn starts_with(&self, text: &str) -> bool {
        let mut i = self.current;
        for ch in text.chars() {
            if self.chars.get(i) != Some(&ch) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::tokenize(message, self.start_line, self.start_column, self.start)
    }

    /// Consume a comment if one starts here. Returns whether one did.
    fn scan_comment(&mut self) -> Result<bool> {
        let marker = self
            .config
            .comments
            .iter()
            .filter(|(open, _)| self.starts_with(open))
            .max_by_key(|(open, _)| open.len())
            .map(|(open, close)| (open.clone(), close.clone()));

        let Some((open, close)) = marker else {
            return Ok(false);
        };

        self.advance_by(open.chars().count());
        let content_start = self.current;

        let text = match close {
            None => {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
                self.slice(content_start, self.current)
            }
            Some(close) => {
                let mut depth = 1;
                let content_end;
                loop {
                    if self.is_at_end() {
                        return Err(self.error("Unterminated comment"));
                    }
                    if self.config.nested_comments && self.starts_with(&open) {
                        self.advance_by(open.chars().count());
                        depth += 1;
                    } else if self.starts_with(&close) {
                        depth -= 1;
                        if depth == 0 {
                            content_end = self.current;
                            self.advance_by(close.chars().count());
                            break;
                        }
                        self.advance_by(close.chars().count());
                    } else {
                        self.advance();
                    }
                }
                self.slice(content_start, content_end)
            }
        };

        let text = text.trim().to_string();
        let same_line = self
            .tokens
            .last()
            .map(|t| t.span.line == self.start_line)
            .unwrap_or(false);
        match self.tokens.last_mut() {
            Some(last) if same_line && self.comments.is_empty() => last.trailing_comments.push(text),
            _ => self.comments.push(text),
        }
        Ok(true)
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.peek();

        if let Some(&end) = self.config.quotes.get(&c) {
            return self.scan_string(TokenType::String, end, self.config.backslash_escapes());
        }
        if let Some(&end) = self.config.identifiers.get(&c) {
            return self.scan_quoted_identifier(end);
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_ascii_digit()) {
            return self.scan_number();
        }
        if self.scan_prefixed_string()? {
            return Ok(());
        }
        if self.scan_parameter() {
            return Ok(());
        }
        if self.scan_keyword() {
            return Ok(());
        }
        if let Some(&token_type) = self.config.single_tokens.get(&c) {
            self.advance();
            self.add_token(token_type);
            return Ok(());
        }
        if is_identifier_start(c) {
            return self.scan_identifier_or_keyword();
        }

        self.advance();
        Err(self.error(format!("Unexpected character '{}'", c)))
    }

    /// Longest match against the keyword trie. Whitespace runs inside the
    /// input match a single space in the key; a word-like match must end at
    /// a word boundary.
    fn scan_keyword(&mut self) -> bool {
        let first = self.peek().to_ascii_uppercase();
        let (result, mut node) = self.keyword_trie.step(first);
        if result == TrieResult::Failed {
            return false;
        }

        let mut consumed = 1;
        let mut word = String::from(first);
        let mut best: Option<(usize, String, TokenType)> = None;
        if let (TrieResult::Exists, Some(n)) = (result, node) {
            best = n.value().map(|t| (consumed, word.clone(), *t));
        }

        while let Some(current) = node {
            let mut ch = self.peek_at(consumed);
            if ch == '\0' {
                break;
            }
            let mut width = 1;
            if ch.is_whitespace() {
                while self.peek_at(consumed + width).is_whitespace() {
                    width += 1;
                }
                ch = ' ';
            }
            let (result, next) = current.step(ch.to_ascii_uppercase());
            if result == TrieResult::Failed {
                break;
            }
            consumed += width;
            word.push(ch.to_ascii_uppercase());
            if result == TrieResult::Exists {
                if let Some(token_type) = next.and_then(|n| n.value()) {
                    best = Some((consumed, word.clone(), *token_type));
                }
            }
            node = next;
        }

        let Some((length, text, token_type)) = best else {
            return false;
        };

        let word_like = text.chars().last().map(is_identifier_char).unwrap_or(false);
        if word_like && is_identifier_char(self.peek_at(length)) {
            return false;
        }
        // A trie key that is only a prefix of a plain word (e.g. "GROUP BYX")
        // falls through to identifier scanning.
        self.advance_by(length);
        self.add_token_with_text(token_type, text);
        true
    }

    fn scan_string(&mut self, token_type: TokenType, end_quote: char, backslash: bool) -> Result<()> {
        self.advance(); // opening quote
        let mut value = String::new();
        let doubled = self.config.string_escapes.contains(&end_quote);

        loop {
            if self.is_at_end() {
                return Err(self.error(format!("Missing {} from {}:{}", end_quote, self.start_line, self.start_column)));
            }
            let c = self.peek();
            if c == end_quote {
                if self.peek_at(1) == end_quote && (doubled || end_quote == '\'') {
                    value.push(end_quote);
                    self.advance_by(2);
                    continue;
                }
                self.advance();
                break;
            }
            if c == '\\' && backslash {
                self.advance();
                if self.is_at_end() {
                    continue;
                }
                let escaped = self.advance();
                value.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '0' => '\0',
                    other => other,
                });
                continue;
            }
            value.push(self.advance());
        }

        self.add_token_with_text(token_type, value);
        Ok(())
    }

    fn scan_quoted_identifier(&mut self, end_quote: char) -> Result<()> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error(format!("Missing {} from {}:{}", end_quote, self.start_line, self.start_column)));
            }
            let c = self.advance();
            if c == end_quote {
                if self.peek() == end_quote {
                    value.push(end_quote);
                    self.advance();
                    continue;
                }
                break;
            }
            value.push(c);
        }
        self.add_token_with_text(TokenType::Identifier, value);
        Ok(())
    }

    /// `N'..'`, `X'..'`, `B'..'` and `E'..'`
    fn scan_prefixed_string(&mut self) -> Result<bool> {
        let prefix = self.peek().to_ascii_uppercase();
        let quote = self.peek_at(1);
        let Some(&end) = self.config.quotes.get(&quote) else {
            return Ok(false);
        };

        let (token_type, backslash) = match prefix {
            'N' => (TokenType::NationalString, self.config.backslash_escapes()),
            'X' => (TokenType::HexString, false),
            'B' if self.config.b_prefix_is_byte_string => (TokenType::ByteString, true),
            'B' => (TokenType::BitString, false),
            'E' if self.config.escape_string_prefix => (TokenType::EscapeString, true),
            _ => return Ok(false),
        };

        self.advance(); // prefix
        self.scan_string(token_type, end, backslash)?;
        Ok(true)
    }

    /// `$1`, `:name`, `@name` and `@@name`
    fn scan_parameter(&mut self) -> bool {
        let c = self.peek();
        let next = self.peek_at(1);
        let matched = match c {
            '$' => next.is_ascii_digit(),
            ':' => is_identifier_start(next),
            '@' => is_identifier_start(next) || next == '@',
            _ => false,
        };
        if !matched {
            return false;
        }

        self.advance();
        if c == '@' && self.peek() == '@' {
            self.advance();
        }
        while is_identifier_char(self.peek()) {
            self.advance();
        }
        self.add_token(TokenType::Parameter);
        true
    }

    fn scan_number(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_at(1) != '.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        if matches!(self.peek(), 'e' | 'E') {
            let sign = matches!(self.peek_at(1), '+' | '-');
            let digit_at = if sign { 2 } else { 1 };
            if !self.peek_at(digit_at).is_ascii_digit() {
                // A bare exponent marker ends the number: `1e` is `1` then `e`
                self.add_token(TokenType::Number);
                return Ok(());
            }
            self.advance_by(digit_at);
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        // 1a and 1_x are identifiers, not numbers followed by names
        if is_identifier_start(self.peek()) {
            return self.scan_identifier_or_keyword();
        }
        self.add_token(TokenType::Number);
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<()> {
        while is_identifier_char(self.peek()) {
            self.advance();
        }
        let text = self.slice(self.start, self.current);
        let token_type = self
            .config
            .keywords
            .get(&text.to_uppercase())
            .copied()
            .unwrap_or(TokenType::Var);
        self.add_token_with_text(token_type, text);
        Ok(())
    }

    fn slice(&self, from: usize, to: usize) -> String {
        self.chars[from..to].iter().collect()
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.slice(self.start, self.current);
        self.add_token_with_text(token_type, text);
    }

    fn add_token_with_text(&mut self, token_type: TokenType, text: String) {
        let span = Span::new(self.start, self.current, self.start_line, self.start_column);
        let mut token = Token::new(token_type, text, span);
        token.comments.append(&mut self.comments);
        self.tokens.push(token);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(sql: &str) -> Vec<TokenType> {
        Tokenizer::default()
            .tokenize(sql)
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_simple_select() {
        let tokens = Tokenizer::default().tokenize("SELECT a, b FROM t").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.token_type).collect::<Vec<_>>(),
            vec![
                TokenType::Select,
                TokenType::Var,
                TokenType::Comma,
                TokenType::Var,
                TokenType::From,
                TokenType::Var
            ]
        );
        assert_eq!(tokens[1].text, "a");
        assert_eq!(tokens[5].span, Span::new(17, 18, 1, 18));
    }

    #[test]
    fn test_keywords_keep_original_case() {
        let tokens = Tokenizer::default().tokenize("select Foo").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Select);
        assert_eq!(tokens[0].text, "select");
        assert_eq!(tokens[1].text, "Foo");
    }

    #[test]
    fn test_escaped_string() {
        let tokens = Tokenizer::default().tokenize("SELECT 'it''s'").unwrap();
        assert_eq!(tokens[1].token_type, TokenType::String);
        assert_eq!(tokens[1].text, "it's");
    }

    #[test]
    fn test_backslash_escapes() {
        let config = TokenizerConfig {
            string_escapes: vec!['\'', '\\'],
            ..Default::default()
        };
        let tokens = Tokenizer::new(config).tokenize(r"SELECT 'a\'b\nc'").unwrap();
        assert_eq!(tokens[1].text, "a'b\nc");
    }

    #[test]
    fn test_multi_char_operators_longest_match() {
        assert_eq!(
            types("a <=> b <= c <> d != e < f"),
            vec![
                TokenType::Var,
                TokenType::NullsafeEq,
                TokenType::Var,
                TokenType::Lte,
                TokenType::Var,
                TokenType::Neq,
                TokenType::Var,
                TokenType::Neq,
                TokenType::Var,
                TokenType::Lt,
                TokenType::Var
            ]
        );
        assert_eq!(types("x::INT"), vec![TokenType::Var, TokenType::DColon, TokenType::Var]);
        assert_eq!(types("j ->> 'k'"), vec![TokenType::Var, TokenType::DArrow, TokenType::String]);
        assert_eq!(types("a || b"), vec![TokenType::Var, TokenType::DPipe, TokenType::Var]);
    }

    #[test]
    fn test_multi_word_keywords_collapse_whitespace() {
        let tokens = Tokenizer::default().tokenize("GROUP \n  BY a ORDER BY b").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::GroupBy);
        assert_eq!(tokens[0].text, "GROUP BY");
        assert_eq!(tokens[2].token_type, TokenType::OrderBy);
    }

    #[test]
    fn test_multi_word_keyword_needs_word_boundary() {
        assert_eq!(types("grouping"), vec![TokenType::Var]);
        assert_eq!(types("group byx"), vec![TokenType::Var, TokenType::Var]);
        assert_eq!(types("double precision"), vec![TokenType::Type]);
    }

    #[test]
    fn test_numbers() {
        let tokens = Tokenizer::default().tokenize("1 2.5 .5 1e10 3.0E-2").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2.5", ".5", "1e10", "3.0E-2"]);
        assert!(tokens.iter().all(|t| t.token_type == TokenType::Number));
    }

    #[test]
    fn test_bare_exponent_marker_ends_number() {
        let tokens = Tokenizer::default().tokenize("SELECT 1e").unwrap();
        let kinds: Vec<(TokenType, &str)> = tokens.iter().map(|t| (t.token_type, t.text.as_str())).collect();
        assert_eq!(
            kinds,
            vec![(TokenType::Select, "SELECT"), (TokenType::Number, "1"), (TokenType::Var, "e")]
        );
    }

    #[test]
    fn test_prefixed_strings() {
        assert_eq!(
            types("N'a' X'FF' B'01'"),
            vec![TokenType::NationalString, TokenType::HexString, TokenType::BitString]
        );
    }

    #[test]
    fn test_parameters() {
        let tokens = Tokenizer::default().tokenize("? $1 :name @var").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Placeholder);
        let params: Vec<&str> = tokens[1..].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(params, vec!["$1", ":name", "@var"]);
    }

    #[test]
    fn test_comments_attach_to_tokens() {
        let tokens = Tokenizer::default()
            .tokenize("/* lead */ SELECT a -- trailing\nFROM t")
            .unwrap();
        assert_eq!(tokens[0].comments, vec!["lead".to_string()]);
        assert_eq!(tokens[1].trailing_comments, vec!["trailing".to_string()]);
    }

    #[test]
    fn test_quoted_identifier() {
        let tokens = Tokenizer::default().tokenize(r#"SELECT "my ""col""""#).unwrap();
        assert_eq!(tokens[1].token_type, TokenType::Identifier);
        assert_eq!(tokens[1].text, r#"my "col""#);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = Tokenizer::default().tokenize("SELECT 'abc").unwrap_err();
        match err {
            Error::Tokenize { line, column, position, .. } => {
                assert_eq!((line, column, position), (1, 8, 7));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        assert!(Tokenizer::default().tokenize("SELECT 1 /* open").is_err());
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = Tokenizer::default().tokenize("SELECT\n  a").unwrap();
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
    }
}
