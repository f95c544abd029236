//! Error Handling Tests
//!
//! Error levels, error kinds and the positional detail carried by parse failures.

use pretty_assertions::assert_eq;
use sqlshift::error::{highlight_sql, ANSI_RESET, ANSI_UNDERLINE};
use sqlshift::{parse, parse_one, parse_with, validate, DialectType, ErrorKind, ErrorLevel, ParseOptions};

const THREE_BROKEN: &str = "SELECT * FROM; SELECT (1; SELECT 1 +";

fn options(level: ErrorLevel) -> ParseOptions {
    ParseOptions::default().with_error_level(level)
}

mod error_levels {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_warn_returns_every_error() {
        let out = parse_with(THREE_BROKEN, DialectType::Generic, options(ErrorLevel::Warn)).unwrap();
        assert_eq!(out.errors.len(), 3);
        assert!(out.statements.iter().all(Option::is_none));
    }

    #[test]
    fn test_ignore_returns_no_errors() {
        let out = parse_with(THREE_BROKEN, DialectType::Generic, options(ErrorLevel::Ignore)).unwrap();
        assert!(out.errors.is_empty());
        assert_eq!(out.statements.len(), 3);
    }

    #[test]
    fn test_warn_keeps_good_statements() {
        let out = parse_with("SELECT 1; SELECT (; SELECT 2", DialectType::Generic, options(ErrorLevel::Warn)).unwrap();
        assert_eq!(out.errors.len(), 1);
        assert!(out.statements[0].is_some());
        assert!(out.statements[1].is_none());
        assert!(out.statements[2].is_some());
    }

    #[test]
    fn test_immediate_raises_on_first_statement() {
        let err = parse_with(THREE_BROKEN, DialectType::Generic, options(ErrorLevel::Immediate)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.details().len(), 1);
        assert_eq!(err.details()[0].description, "Expected table name");
    }

    #[test]
    fn test_raise_is_the_default() {
        assert_eq!(ParseOptions::default().error_level, ErrorLevel::Raise);
        let err = parse(THREE_BROKEN, DialectType::Generic).unwrap_err();
        assert_eq!(err.details().len(), 1);
    }

    #[test]
    fn test_max_errors_bounds_the_message() {
        let mut opts = options(ErrorLevel::Warn);
        opts.max_errors = 1;
        let out = parse_with(THREE_BROKEN, DialectType::Generic, opts).unwrap();
        let merged = sqlshift::concat_messages(&out.errors, 1);
        assert!(merged.ends_with("... and 2 more"), "got {merged}");
    }
}

mod details {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detail_carries_position_and_context() {
        let err = parse("SELECT a FROM t WHERE (b", DialectType::Generic).unwrap_err();
        let detail = &err.details()[0];
        assert_eq!(detail.description, "Expecting )");
        assert_eq!(detail.line, 1);
        assert_eq!(detail.column, 24);
        assert_eq!(detail.start_context, "SELECT a FROM t WHERE (");
        assert_eq!(detail.highlight, "b");
        assert_eq!(detail.end_context, "");
    }

    #[test]
    fn test_detail_serializes() {
        let err = parse("SELECT a FROM t WHERE (b", DialectType::Generic).unwrap_err();
        let json = serde_json::to_value(&err.details()[0]).unwrap();
        assert_eq!(json["description"], "Expecting )");
        assert_eq!(json["line"], 1);
    }

    #[test]
    fn test_highlight_merges_overlapping_spans() {
        let h = highlight_sql("0123456789", &[(2, 5), (4, 8)], 2).unwrap();
        assert_eq!(h.start_context, "01");
        assert_eq!(h.highlight, "2345678");
        assert_eq!(h.end_context, "9");
        assert_eq!(h.formatted, format!("01{ANSI_UNDERLINE}2345678{ANSI_RESET}9"));
    }
}

mod kinds {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unterminated_string_is_a_tokenize_error() {
        let err = parse("SELECT 'abc", DialectType::Generic).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tokenize);
    }

    #[test]
    fn test_parse_one_rejects_multiple_statements() {
        let err = parse_one("SELECT 1; SELECT 2", DialectType::Generic).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(parse_one("SELECT 1", DialectType::Generic).is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(validate("SELECT a FROM t", DialectType::Generic).is_ok());
        assert!(validate("SELECT a FROM", DialectType::Generic).is_err());
        assert!(validate("1 + 1", DialectType::Generic).is_err());
    }

    #[test]
    fn test_unknown_dialect() {
        let err = parse_with("SELECT 1", "nosuchdb", ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownDialect);
        assert_eq!(err.to_string(), "Unknown dialect 'nosuchdb'");
    }
}
