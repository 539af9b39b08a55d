//! Error types.
//!
//! Malformed rule text fails with [`ParseError`], malformed metric records
//! with [`DecodeError`]. Neither is partial: a failed parse returns no rules
//! and a failed decode returns no metrics. Rule/metric mismatches are not
//! errors; see [`crate::Violation`].

use thiserror::Error;

/// A rule file could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error on line {line}: {kind}")]
pub struct ParseError {
    line: usize,
    #[source]
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(line: usize, kind: ParseErrorKind) -> Self {
        ParseError { line, kind }
    }

    /// 1-based line of the offending rule.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// Underlying cause of a [`ParseError`].
///
/// Offending tokens are rendered as their text, or as `end of line` /
/// `end of input`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected a path, but got {0}")]
    ExpectedPath(String),

    #[error("expected an operator, but got {0}")]
    ExpectedOperator(String),

    #[error("expected a number, but got {0}")]
    ExpectedNumber(String),

    #[error("cannot convert '{0}' to a number")]
    InvalidNumber(String),

    #[error("expected ',', but got {0}")]
    ExpectedComma(String),

    #[error("unexpected '/'")]
    UnexpectedSlash,

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),

    #[error("expected a single rule, but got more")]
    TrailingRule,
}

/// A metric record could not be decoded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("decode error on line {line}: {kind}")]
pub struct DecodeError {
    line: usize,
    #[source]
    kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(line: usize, kind: DecodeErrorKind) -> Self {
        DecodeError { line, kind }
    }

    /// 1-based line of the offending record.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

/// Underlying cause of a [`DecodeError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("expected 3 fields (path value timestamp), but got {0}")]
    FieldCount(usize),

    #[error("invalid value '{0}'")]
    InvalidValue(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Errors surfaced by the reader-based entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid graph definitions: {0}")]
    GraphDef(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn parse_error_renders_line_and_cause() {
        let e = ParseError::new(1, ParseErrorKind::ExpectedNumber("end of line".to_string()));
        assert_eq!(e.to_string(), "parse error on line 1: expected a number, but got end of line");
        assert_eq!(e.line(), 1);
        let source = e.source().unwrap();
        assert_eq!(source.to_string(), "expected a number, but got end of line");
    }

    #[test]
    fn decode_error_renders_line_and_cause() {
        let e = DecodeError::new(3, DecodeErrorKind::FieldCount(2));
        assert_eq!(e.to_string(), "decode error on line 3: expected 3 fields (path value timestamp), but got 2");
        assert_eq!(e.kind(), &DecodeErrorKind::FieldCount(2));
    }

    #[test]
    fn crate_error_is_transparent_for_parse_errors() {
        let e: Error = ParseError::new(4, ParseErrorKind::UnexpectedSlash).into();
        assert_eq!(e.to_string(), "parse error on line 4: unexpected '/'");
    }
}
