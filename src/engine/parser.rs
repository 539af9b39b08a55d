//! Rule file parser.
//!
//! The grammar is line oriented:
//!
//! ```text
//! line     := [ '~' ] path [ exprlist ]
//! exprlist := expr (',' expr)*
//! expr     := ('<' | '<=' | '>' | '>=') number
//! ```
//!
//! Blank and comment-only lines are skipped. Rules come back in source order,
//! and lines repeating a path stay separate rules (they OR together at match
//! time). There is no error recovery: the first defect fails the whole parse.

use super::lexer::{Lexer, Token};
use crate::{Expr, ParseError, ParseErrorKind, Rule};

const LOG_TARGET: &str = "parser";

/// Pull parser producing one [`Rule`] per call to [`Parser::parse_rule`].
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Line on which the most recent rule started.
    line: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser { lexer: Lexer::new(input), line: 1 }
    }

    /// Parse the next rule, or return `None` once the input is exhausted.
    pub fn parse_rule(&mut self) -> Result<Option<Rule>, ParseError> {
        let first = loop {
            let token = self.lexer.next_token().map_err(|kind| ParseError::new(self.lexer.line(), kind))?;
            if token != Token::Newline {
                break token;
            }
        };
        if first == Token::Eof {
            return Ok(None);
        }
        self.line = self.lexer.line();

        let mut required = true;
        let mut token = first;
        if token == Token::Tilde {
            required = false;
            token = self.next_token()?;
        }
        let path = match token {
            Token::Text(path) => path,
            Token::Eof => return Err(self.error(ParseErrorKind::UnexpectedEof("a path"))),
            other => return Err(self.error(ParseErrorKind::ExpectedPath(other.describe()))),
        };

        let mut exprs = Vec::new();
        let mut token = self.next_token()?;
        if !matches!(token, Token::Newline | Token::Eof) {
            loop {
                let op = match token {
                    Token::Op(op) => op,
                    Token::Eof => return Err(self.error(ParseErrorKind::UnexpectedEof("an operator"))),
                    other => return Err(self.error(ParseErrorKind::ExpectedOperator(other.describe()))),
                };
                let value = self.lexer.number().map_err(|kind| self.error(kind))?;
                exprs.push(Expr::new(op, value));

                match self.next_token()? {
                    Token::Newline | Token::Eof => break,
                    Token::Comma => token = self.next_token()?,
                    other => return Err(self.error(ParseErrorKind::ExpectedComma(other.describe()))),
                }
            }
        }

        let rule = Rule { required, path, exprs };
        log::trace!(target: LOG_TARGET, "line {}: {rule}", self.line);
        Ok(Some(rule))
    }

    /// Parse every remaining rule.
    pub fn parse_all(mut self) -> Result<Vec<Rule>, ParseError> {
        let mut rules = Vec::new();
        while let Some(rule) = self.parse_rule()? {
            rules.push(rule);
        }
        log::debug!(target: LOG_TARGET, "parsed {} rules from {} lines", rules.len(), self.lexer.line());
        Ok(rules)
    }

    /// Line on which the most recently parsed rule started.
    pub fn line(&self) -> usize {
        self.line
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.lexer.next_token().map_err(|kind| self.error(kind))
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.line, kind)
    }
}

/// Parse text that must hold exactly one rule.
pub fn parse_single_rule(text: &str) -> Result<Rule, ParseError> {
    let mut parser = Parser::new(text);
    let Some(rule) = parser.parse_rule()? else {
        return Err(ParseError::new(parser.line(), ParseErrorKind::UnexpectedEof("a path")));
    };
    if parser.parse_rule()?.is_some() {
        return Err(ParseError::new(parser.line(), ParseErrorKind::TrailingRule));
    }
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_rules;

    #[test]
    fn parses_rule_files() {
        let cases: Vec<(&str, Vec<Rule>)> = vec![
            ("a.b.c >0", vec![rule!("a.b.c", [> 0.0])]),
            ("~a.b.c", vec![rule!(~ "a.b.c")]),
            ("a.b.c\nd.e.f\n", vec![rule!("a.b.c"), rule!("d.e.f")]),
            ("a.b.c <0.2, <=.3, >0,>=10.00", vec![rule!("a.b.c", [< 0.2, <= 0.3, > 0.0, >= 10.0])]),
            ("//comment\na.b.c.xyz", vec![rule!("a.b.c.xyz")]),
            ("a.b.c.xyz // comment", vec![rule!("a.b.c.xyz")]),
            ("a.b.c >=0 // comment\n", vec![rule!("a.b.c", [>= 0.0])]),
            ("\n\n  \t\n~ x.#.y\t>-5 ,< 5\n\n", vec![rule!(~ "x.#.y", [> -5.0, < 5.0])]),
            ("local.signal.level >=0, <2\nlocal.signal.level >=3, <5", vec![
                rule!("local.signal.level", [>= 0.0, < 2.0]),
                rule!("local.signal.level", [>= 3.0, < 5.0]),
            ]),
            ("10.disks.sda >1", vec![rule!("10.disks.sda", [> 1.0])]),
            ("", vec![]),
            ("// only a comment", vec![]),
        ];
        for (input, want) in cases {
            let got = parse_rules(input).unwrap_or_else(|e| panic!("parse_rules({input:?}): {e}"));
            assert_eq!(got, want, "parse_rules({input:?})");
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        let cases: Vec<(&str, usize, ParseErrorKind)> = vec![
            (">3", 1, ParseErrorKind::ExpectedPath("'>'".into())),
            ("~", 1, ParseErrorKind::UnexpectedEof("a path")),
            ("~\na.b", 1, ParseErrorKind::ExpectedPath("end of line".into())),
            ("~~a.b", 1, ParseErrorKind::ExpectedPath("'~'".into())),
            ("a.b.c 3", 1, ParseErrorKind::ExpectedOperator("'3'".into())),
            ("a.b.c >", 1, ParseErrorKind::UnexpectedEof("a number")),
            ("a.b.c >\n", 1, ParseErrorKind::ExpectedNumber("end of line".into())),
            ("a.b.c >x", 1, ParseErrorKind::ExpectedNumber("'x'".into())),
            ("a.b.c >1.2.3", 1, ParseErrorKind::InvalidNumber("1.2.3".into())),
            ("a.b.c >1,\n", 1, ParseErrorKind::ExpectedOperator("end of line".into())),
            ("a.b.c >1,", 1, ParseErrorKind::UnexpectedEof("an operator")),
            ("a.b.c >1 <2", 1, ParseErrorKind::ExpectedComma("'<'".into())),
            ("a.b.c >1x", 1, ParseErrorKind::ExpectedComma("'x'".into())),
            ("a.b.c / comment", 1, ParseErrorKind::UnexpectedSlash),
            ("a.b\n\n// note\nc.d >= // oops\n", 4, ParseErrorKind::ExpectedNumber("end of line".into())),
        ];
        for (input, line, kind) in cases {
            let err = parse_rules(input).expect_err(input);
            assert_eq!(err.line(), line, "line for {input:?}");
            assert_eq!(err.kind(), &kind, "cause for {input:?}");
        }
    }

    #[test]
    fn failure_returns_no_rules() {
        // A valid first line must not leak out when a later line fails.
        assert!(parse_rules("a.b.c >0\nd.e.f >").is_err());
    }

    #[test]
    fn pull_parser_reports_rule_lines() {
        let mut parser = Parser::new("\n// x\na.b\n\nc.d\n");
        assert_eq!(parser.parse_rule().unwrap(), Some(rule!("a.b")));
        assert_eq!(parser.line(), 3);
        assert_eq!(parser.parse_rule().unwrap(), Some(rule!("c.d")));
        assert_eq!(parser.line(), 5);
        assert_eq!(parser.parse_rule().unwrap(), None);
    }

    #[test]
    fn single_rule() {
        assert_eq!("~a.b <=1".parse::<Rule>().unwrap(), rule!(~ "a.b", [<= 1.0]));

        let err = "a.b\nc.d".parse::<Rule>().unwrap_err();
        assert_eq!((err.line(), err.kind()), (2, &ParseErrorKind::TrailingRule));

        let err = "// nothing".parse::<Rule>().unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::UnexpectedEof("a path"));
    }
}
