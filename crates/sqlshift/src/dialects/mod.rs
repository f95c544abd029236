//! SQL Dialects
//!
//! A dialect is configuration data for the three pipeline stages plus two
//! hooks: a bottom-up AST rewrite applied before generation, and a table of
//! render overrides keyed by node kind. Built-in dialects implement
//! [`DialectImpl`]; [`CustomDialectBuilder`] derives new ones from them.
//!
//! Dialects are resolved by name through a [`DialectRegistry`]. The
//! process-wide registry is filled with the built-ins on first use and is
//! meant to be extended during startup, before concurrent lookups begin.

mod bigquery;
mod duckdb;
mod generic;
mod mysql;
mod oracle;
mod postgres;
mod redshift;
mod sqlite;
mod tsql;

pub use bigquery::BigQueryDialect;
pub use duckdb::DuckDBDialect;
pub use generic::GenericDialect;
pub use mysql::MySQLDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use redshift::RedshiftDialect;
pub use sqlite::SQLiteDialect;
pub use tsql::TSQLDialect;

use crate::error::{Error, Result};
use crate::expressions::{Expression, Function};
use crate::generator::{Generator, GeneratorConfig, NormalizeFunctions, RenderFn, RenderTable};
use crate::parser::{ParseOptions, ParseOutput, Parser, ParserConfig};
use crate::tokens::{Token, Tokenizer, TokenizerConfig};
use crate::traversal;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Built-in dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectType {
    #[default]
    Generic,
    PostgreSQL,
    Redshift,
    MySQL,
    SQLite,
    TSQL,
    BigQuery,
    DuckDB,
    Oracle,
}

impl DialectType {
    pub const ALL: [DialectType; 9] = [
        DialectType::Generic,
        DialectType::PostgreSQL,
        DialectType::Redshift,
        DialectType::MySQL,
        DialectType::SQLite,
        DialectType::TSQL,
        DialectType::BigQuery,
        DialectType::DuckDB,
        DialectType::Oracle,
    ];

    /// Registry names for this dialect; the first is canonical
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            DialectType::Generic => &["generic"],
            DialectType::PostgreSQL => &["postgres", "postgresql"],
            DialectType::Redshift => &["redshift"],
            DialectType::MySQL => &["mysql"],
            DialectType::SQLite => &["sqlite"],
            DialectType::TSQL => &["tsql", "mssql"],
            DialectType::BigQuery => &["bigquery"],
            DialectType::DuckDB => &["duckdb"],
            DialectType::Oracle => &["oracle"],
        }
    }
}

impl fmt::Display for DialectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.names()[0])
    }
}

impl FromStr for DialectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        if lower.is_empty() {
            return Ok(DialectType::Generic);
        }
        DialectType::ALL
            .into_iter()
            .find(|d| d.names().contains(&lower.as_str()))
            .ok_or(Error::UnknownDialect(s.to_string()))
    }
}

/// Behaviour of one dialect.
///
/// Every method has a default, so a dialect only states where it differs
/// from generic SQL.
pub trait DialectImpl: Send + Sync {
    fn dialect_type(&self) -> DialectType;

    fn tokenizer_config(&self) -> TokenizerConfig {
        TokenizerConfig::default()
    }

    fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
    }

    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            dialect: Some(self.dialect_type()),
            ..Default::default()
        }
    }

    /// Per-kind render rules that replace the generic ones
    fn render_overrides(&self) -> RenderTable {
        RenderTable::new()
    }

    /// Rewrite one node for this dialect. Applied bottom-up to a copy of
    /// the tree before generation.
    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        Ok(expr)
    }
}

fn builtin(dialect_type: DialectType) -> Arc<dyn DialectImpl> {
    match dialect_type {
        DialectType::Generic => Arc::new(GenericDialect),
        DialectType::PostgreSQL => Arc::new(PostgresDialect),
        DialectType::Redshift => Arc::new(RedshiftDialect),
        DialectType::MySQL => Arc::new(MySQLDialect),
        DialectType::SQLite => Arc::new(SQLiteDialect),
        DialectType::TSQL => Arc::new(TSQLDialect),
        DialectType::BigQuery => Arc::new(BigQueryDialect),
        DialectType::DuckDB => Arc::new(DuckDBDialect),
        DialectType::Oracle => Arc::new(OracleDialect),
    }
}

/// A ready-to-use dialect: configurations are built once and shared.
#[derive(Clone)]
pub struct Dialect {
    name: String,
    inner: Arc<dyn DialectImpl>,
    tokenizer: Tokenizer,
    parser_config: ParserConfig,
    generator_config: GeneratorConfig,
    overrides: RenderTable,
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("dialect_type", &self.inner.dialect_type())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

impl Dialect {
    /// Build a dialect from its implementation
    pub fn from_impl(name: impl Into<String>, inner: Arc<dyn DialectImpl>) -> Self {
        Self {
            name: name.into(),
            tokenizer: Tokenizer::new(inner.tokenizer_config()),
            parser_config: inner.parser_config(),
            generator_config: inner.generator_config(),
            overrides: inner.render_overrides(),
            inner,
        }
    }

    /// A built-in dialect
    pub fn get(dialect_type: DialectType) -> Self {
        Self::from_impl(dialect_type.to_string(), builtin(dialect_type))
    }

    /// Resolve a name, with optional settings, through the process-wide registry
    pub fn get_by_name(name: &str) -> Result<Self> {
        get_or_raise(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect_type(&self) -> DialectType {
        self.inner.dialect_type()
    }

    pub fn tokenizer_config(&self) -> &TokenizerConfig {
        self.tokenizer.config()
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser_config
    }

    pub fn generator_config(&self) -> &GeneratorConfig {
        &self.generator_config
    }

    pub fn tokenize(&self, sql: &str) -> Result<Vec<Token>> {
        self.tokenizer.tokenize(sql)
    }

    /// Parse with [`ErrorLevel::Raise`](crate::ErrorLevel::Raise)
    pub fn parse(&self, sql: &str) -> Result<Vec<Expression>> {
        let output = self.parse_with(sql, ParseOptions::default())?;
        Ok(output.statements.into_iter().flatten().collect())
    }

    pub fn parse_with(&self, sql: &str, options: ParseOptions) -> Result<ParseOutput> {
        let tokens = self.tokenize(sql)?;
        let mut parser = Parser::new(options, self.parser_config.clone());
        parser.parse(tokens, sql)
    }

    /// Apply this dialect's rewrite to every node of `expr`
    pub fn transform(&self, expr: Expression) -> Result<Expression> {
        let inner = Arc::clone(&self.inner);
        traversal::transform(expr, &mut |node| inner.transform_expr(node))
    }

    pub fn generate(&self, expr: &Expression) -> Result<String> {
        self.generate_with(expr, self.generator_config.clone())
    }

    /// Generate with an adjusted copy of this dialect's generator config
    pub fn generate_with(&self, expr: &Expression, config: GeneratorConfig) -> Result<String> {
        let transformed = self.transform(expr.copy())?;
        let mut generator = Generator::with_overrides(config, self.overrides.clone());
        generator.generate(&transformed)
    }

    /// Parse `sql` in this dialect and generate every statement for `target`
    pub fn transpile(&self, sql: &str, target: &Dialect) -> Result<Vec<String>> {
        tracing::debug!(target: "sqlshift::dialects", read = %self.name, write = %target.name, "transpiling");
        self.parse(sql)?
            .iter()
            .map(|statement| target.generate(statement))
            .collect()
    }

    fn apply_settings(&mut self, settings: &[(String, String)]) -> Result<()> {
        for (key, value) in settings {
            let config = &mut self.generator_config;
            match key.as_str() {
                "normalize_functions" => {
                    config.normalize_functions = match value.as_str() {
                        "upper" | "true" => NormalizeFunctions::Upper,
                        "lower" => NormalizeFunctions::Lower,
                        "none" | "false" => NormalizeFunctions::None,
                        other => {
                            return Err(Error::InvalidSetting(format!(
                                "normalize_functions must be upper, lower or none, got '{other}'"
                            )))
                        }
                    }
                }
                "identify" => config.identify = parse_flag(key, value)?,
                "pretty" => config.pretty = parse_flag(key, value)?,
                "uppercase_keywords" => config.uppercase_keywords = parse_flag(key, value)?,
                other => return Err(Error::InvalidSetting(format!("unknown dialect setting '{other}'"))),
            }
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::InvalidSetting(format!("{key} expects true or false, got '{other}'"))),
    }
}

/// Split `"mysql, normalize_functions = lower"` into a name and settings.
/// A bare key means `true`.
fn parse_dialect_settings(spec: &str) -> Result<(String, Vec<(String, String)>)> {
    let mut parts = spec.split(',');
    let name = parts.next().unwrap_or_default().trim().to_lowercase();
    let mut settings = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            return Err(Error::InvalidSetting(format!("empty setting in '{spec}'")));
        }
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (part, "true"),
        };
        settings.push((key.to_lowercase(), value.to_lowercase()));
    }
    Ok((name, settings))
}

/// What [`DialectRegistry::get_or_raise`] accepts
#[derive(Debug, Clone)]
pub enum DialectRef<'a> {
    /// A registered name, optionally followed by settings
    Name(&'a str),
    Type(DialectType),
    Instance(&'a Dialect),
}

impl<'a> From<&'a str> for DialectRef<'a> {
    fn from(name: &'a str) -> Self {
        DialectRef::Name(name)
    }
}

impl<'a> From<&'a String> for DialectRef<'a> {
    fn from(name: &'a String) -> Self {
        DialectRef::Name(name.as_str())
    }
}

impl From<DialectType> for DialectRef<'_> {
    fn from(dialect_type: DialectType) -> Self {
        DialectRef::Type(dialect_type)
    }
}

impl<'a> From<&'a Dialect> for DialectRef<'a> {
    fn from(dialect: &'a Dialect) -> Self {
        DialectRef::Instance(dialect)
    }
}

/// Case-insensitive name -> dialect map
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, Dialect>,
}

impl DialectRegistry {
    /// An empty registry. Lookups of the empty name still yield generic SQL.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for dialect_type in DialectType::ALL {
            let dialect = Dialect::get(dialect_type);
            for name in dialect_type.names() {
                registry.dialects.insert(name.to_string(), dialect.clone());
            }
        }
        registry
    }

    /// Register `dialect` under every name in `names`.
    ///
    /// Fails without registering anything if a name is empty or taken.
    pub fn register(&mut self, names: &[&str], dialect: Dialect) -> Result<()> {
        let keys: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
        if keys.is_empty() {
            return Err(Error::InvalidSetting("a dialect needs at least one name".to_string()));
        }
        for key in &keys {
            if key.is_empty() {
                return Err(Error::InvalidSetting("dialect names cannot be empty".to_string()));
            }
            if self.dialects.contains_key(key) {
                return Err(Error::InvalidSetting(format!("dialect '{key}' is already registered")));
            }
        }
        for key in keys {
            tracing::debug!(target: "sqlshift::dialects", name = %key, base = %dialect.dialect_type(), "registered dialect");
            self.dialects.insert(key, dialect.clone());
        }
        Ok(())
    }

    /// Remove a name; returns whether it was registered
    pub fn unregister(&mut self, name: &str) -> bool {
        self.dialects.remove(&name.trim().to_lowercase()).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(&name.trim().to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dialects.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a name, type or instance to a dialect.
    ///
    /// An empty name means generic SQL. Names may carry settings after a
    /// comma: `"mysql, normalize_functions = lower"`.
    pub fn get_or_raise<'a>(&self, dialect: impl Into<DialectRef<'a>>) -> Result<Dialect> {
        match dialect.into() {
            DialectRef::Instance(d) => Ok(d.clone()),
            DialectRef::Type(t) => Ok(self
                .dialects
                .get(t.names()[0])
                .cloned()
                .unwrap_or_else(|| Dialect::get(t))),
            DialectRef::Name(spec) => {
                let (name, settings) = parse_dialect_settings(spec)?;
                let mut resolved = if name.is_empty() {
                    Dialect::get(DialectType::Generic)
                } else {
                    self.dialects
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| Error::UnknownDialect(name.clone()))?
                };
                resolved.apply_settings(&settings)?;
                Ok(resolved)
            }
        }
    }
}

static REGISTRY: Lazy<RwLock<DialectRegistry>> = Lazy::new(|| RwLock::new(DialectRegistry::with_builtins()));

fn lock_error() -> Error {
    Error::internal("dialect registry lock poisoned")
}

/// Resolve through the process-wide registry
pub fn get_or_raise<'a>(dialect: impl Into<DialectRef<'a>>) -> Result<Dialect> {
    REGISTRY.read().map_err(|_| lock_error())?.get_or_raise(dialect)
}

/// Add names to the process-wide registry
pub fn register_dialect(names: &[&str], dialect: Dialect) -> Result<()> {
    REGISTRY.write().map_err(|_| lock_error())?.register(names, dialect)
}

/// Remove a name from the process-wide registry
pub fn unregister_custom_dialect(name: &str) -> Result<bool> {
    let lower = name.trim().to_lowercase();
    if DialectType::ALL.iter().any(|d| d.names().contains(&lower.as_str())) {
        return Err(Error::InvalidSetting(format!("cannot unregister built-in dialect '{lower}'")));
    }
    Ok(REGISTRY.write().map_err(|_| lock_error())?.unregister(&lower))
}

type TransformFn = Arc<dyn Fn(Expression) -> Result<Expression> + Send + Sync>;
type ConfigModifier<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Derives a new dialect from a built-in one.
///
/// ```
/// use sqlshift::dialects::{CustomDialectBuilder, DialectType};
/// use sqlshift::generator::NormalizeFunctions;
///
/// let dialect = CustomDialectBuilder::new("lowercase_pg")
///     .based_on(DialectType::PostgreSQL)
///     .generator_config_modifier(|c| c.normalize_functions = NormalizeFunctions::Lower)
///     .build()
///     .unwrap();
/// let ast = dialect.parse("SELECT COUNT(*) FROM t").unwrap();
/// assert_eq!(dialect.generate(&ast[0]).unwrap(), "SELECT count(*) FROM t");
/// ```
pub struct CustomDialectBuilder {
    name: String,
    base: DialectType,
    tokenizer_modifiers: Vec<ConfigModifier<TokenizerConfig>>,
    parser_modifiers: Vec<ConfigModifier<ParserConfig>>,
    generator_modifiers: Vec<ConfigModifier<GeneratorConfig>>,
    overrides: RenderTable,
    transform: Option<TransformFn>,
}

impl CustomDialectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: DialectType::Generic,
            tokenizer_modifiers: Vec::new(),
            parser_modifiers: Vec::new(),
            generator_modifiers: Vec::new(),
            overrides: RenderTable::new(),
            transform: None,
        }
    }

    pub fn based_on(mut self, base: DialectType) -> Self {
        self.base = base;
        self
    }

    pub fn tokenizer_config_modifier(mut self, f: impl FnOnce(&mut TokenizerConfig) + Send + 'static) -> Self {
        self.tokenizer_modifiers.push(Box::new(f));
        self
    }

    pub fn parser_config_modifier(mut self, f: impl FnOnce(&mut ParserConfig) + Send + 'static) -> Self {
        self.parser_modifiers.push(Box::new(f));
        self
    }

    pub fn generator_config_modifier(mut self, f: impl FnOnce(&mut GeneratorConfig) + Send + 'static) -> Self {
        self.generator_modifiers.push(Box::new(f));
        self
    }

    /// Replace the render rule for one node kind
    pub fn render_override(
        mut self,
        kind: crate::expressions::ExpressionKind,
        render: impl Fn(&mut Generator, &Expression) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        let render: RenderFn = Arc::new(render);
        self.overrides.insert(kind, render);
        self
    }

    /// Node rewrite run after the base dialect's own rewrite
    pub fn transform_fn(mut self, f: impl Fn(Expression) -> Result<Expression> + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<Dialect> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidSetting("custom dialect name cannot be empty".to_string()));
        }
        let base = builtin(self.base);

        let mut tokenizer_config = base.tokenizer_config();
        for modify in self.tokenizer_modifiers {
            modify(&mut tokenizer_config);
        }
        let mut parser_config = base.parser_config();
        for modify in self.parser_modifiers {
            modify(&mut parser_config);
        }
        let mut generator_config = base.generator_config();
        for modify in self.generator_modifiers {
            modify(&mut generator_config);
        }
        let mut overrides = base.render_overrides();
        overrides.extend(self.overrides);

        let custom = CustomDialect {
            base,
            tokenizer_config,
            parser_config,
            generator_config,
            overrides,
            transform: self.transform,
        };
        Ok(Dialect::from_impl(self.name.trim().to_lowercase(), Arc::new(custom)))
    }

    /// Build and add to `registry` under the builder's name
    pub fn register_into(self, registry: &mut DialectRegistry) -> Result<Dialect> {
        let dialect = self.build()?;
        registry.register(&[dialect.name()], dialect.clone())?;
        Ok(dialect)
    }

    /// Build and add to the process-wide registry
    pub fn register(self) -> Result<Dialect> {
        let dialect = self.build()?;
        register_dialect(&[dialect.name()], dialect.clone())?;
        Ok(dialect)
    }
}

struct CustomDialect {
    base: Arc<dyn DialectImpl>,
    tokenizer_config: TokenizerConfig,
    parser_config: ParserConfig,
    generator_config: GeneratorConfig,
    overrides: RenderTable,
    transform: Option<TransformFn>,
}

impl DialectImpl for CustomDialect {
    fn dialect_type(&self) -> DialectType {
        self.base.dialect_type()
    }

    fn tokenizer_config(&self) -> TokenizerConfig {
        self.tokenizer_config.clone()
    }

    fn parser_config(&self) -> ParserConfig {
        self.parser_config.clone()
    }

    fn generator_config(&self) -> GeneratorConfig {
        self.generator_config.clone()
    }

    fn render_overrides(&self) -> RenderTable {
        self.overrides.clone()
    }

    fn transform_expr(&self, expr: Expression) -> Result<Expression> {
        let expr = self.base.transform_expr(expr)?;
        match &self.transform {
            Some(transform) => transform(expr),
            None => Ok(expr),
        }
    }
}

/// Whether `f` is an unquoted call to one of `names` (uppercase)
pub(crate) fn is_call_to(f: &Function, names: &[&str]) -> bool {
    !f.quoted && names.iter().any(|n| f.name.eq_ignore_ascii_case(n))
}

/// The same call under another name
pub(crate) fn rename(mut f: Box<Function>, name: &str) -> Expression {
    f.name = name.to_string();
    Expression::Function(f)
}

/// Render override writing a binary node as `NAME(left, right)`
pub(crate) fn binary_as_function(name: &'static str) -> RenderFn {
    Arc::new(move |g: &mut Generator, e: &Expression| {
        let (Expression::RegexpLike(op)
        | Expression::NullSafeEq(op)
        | Expression::Concat(op)
        | Expression::JsonExtract(op)
        | Expression::JsonExtractScalar(op)) = e
        else {
            return g.generate_default(e);
        };
        g.write_function_call(name, &[&op.left, &op.right])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dialect_type_names() {
        assert_eq!(DialectType::PostgreSQL.to_string(), "postgres");
        assert_eq!("PostgreSQL".parse::<DialectType>().unwrap(), DialectType::PostgreSQL);
        assert_eq!("mssql".parse::<DialectType>().unwrap(), DialectType::TSQL);
        assert_eq!("".parse::<DialectType>().unwrap(), DialectType::Generic);
        assert!("nope".parse::<DialectType>().is_err());
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = DialectRegistry::with_builtins();
        let dialect = registry.get_or_raise("DuckDB").unwrap();
        assert_eq!(dialect.dialect_type(), DialectType::DuckDB);
        assert_eq!(registry.get_or_raise("").unwrap().dialect_type(), DialectType::Generic);
    }

    #[test]
    fn test_unknown_dialect() {
        let registry = DialectRegistry::with_builtins();
        let err = registry.get_or_raise("nosuchdb").unwrap_err();
        assert!(matches!(err, Error::UnknownDialect(ref n) if n == "nosuchdb"));
    }

    #[test]
    fn test_settings_in_name() {
        let registry = DialectRegistry::with_builtins();
        let dialect = registry.get_or_raise("mysql, normalize_functions = lower").unwrap();
        assert_eq!(dialect.generator_config().normalize_functions, NormalizeFunctions::Lower);

        let dialect = registry.get_or_raise("postgres, identify").unwrap();
        assert!(dialect.generator_config().identify);

        let err = registry.get_or_raise("mysql, colour = blue").unwrap_err();
        assert!(matches!(err, Error::InvalidSetting(_)));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = DialectRegistry::with_builtins();
        let err = registry
            .register(&["mine", "postgres"], Dialect::get(DialectType::PostgreSQL))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSetting(_)));
        assert!(!registry.contains("mine"));
    }

    #[test]
    fn test_instance_passes_through() {
        let registry = DialectRegistry::new();
        let dialect = Dialect::get(DialectType::Oracle);
        let resolved = registry.get_or_raise(&dialect).unwrap();
        assert_eq!(resolved.name(), "oracle");
        assert_eq!(registry.get_or_raise(DialectType::SQLite).unwrap().name(), "sqlite");
    }

    #[test]
    fn test_custom_dialect_in_scoped_registry() {
        let mut registry = DialectRegistry::new();
        CustomDialectBuilder::new("Shouty")
            .transform_fn(|e| match e {
                Expression::Function(f) if is_call_to(&f, &["LEN"]) => Ok(rename(f, "CHAR_LENGTH")),
                other => Ok(other),
            })
            .register_into(&mut registry)
            .unwrap();

        let dialect = registry.get_or_raise("shouty").unwrap();
        let ast = dialect.parse("SELECT len(x) FROM t").unwrap();
        assert_eq!(dialect.generate(&ast[0]).unwrap(), "SELECT CHAR_LENGTH(x) FROM t");
    }
}
