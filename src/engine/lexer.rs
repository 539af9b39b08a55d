//! Character-level scanning for rule text.
//!
//! The lexer walks the input one `char` at a time with a single character of
//! lookahead (`Peekable::next_if`), which is all the grammar needs to tell
//! `<` from `<=` and `/` from `//`.
//!
//! Two scanning entry points exist because a path and a number overlap
//! lexically (`1.5` is a valid stem run):
//!
//! - [`Lexer::next_token`] classifies structural tokens and otherwise reads a
//!   run of non-whitespace characters as [`Token::Text`].
//! - [`Lexer::number`] is called by the parser right after an operator and
//!   reads a numeric literal.
//!
//! Comments (`//` to end of line) are skipped inside the lexer; the newline
//! that ends the comment is still returned as [`Token::Newline`].

use crate::{Operator, ParseErrorKind};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Tilde,
    Op(Operator),
    Comma,
    /// Run of non-whitespace characters (a path in practice).
    Text(String),
    Newline,
    Eof,
}

impl Token {
    /// Human readable form used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Tilde => "'~'".to_string(),
            Token::Op(op) => format!("'{op}'"),
            Token::Comma => "','".to_string(),
            Token::Text(text) => format!("'{text}'"),
            Token::Newline => "end of line".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// 1-based line of the next unread character.
    line: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Lexer { chars: input.chars().peekable(), line: 1 }
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Read the next structural token, skipping blanks and comments.
    pub(crate) fn next_token(&mut self) -> Result<Token, ParseErrorKind> {
        loop {
            self.skip_blanks();
            let Some(c) = self.chars.next() else {
                return Ok(Token::Eof);
            };
            let token = match c {
                '\n' => {
                    self.line += 1;
                    Token::Newline
                }
                '/' => {
                    if self.chars.next_if_eq(&'/').is_none() {
                        return Err(ParseErrorKind::UnexpectedSlash);
                    }
                    self.skip_comment();
                    continue;
                }
                '~' => Token::Tilde,
                '<' => Token::Op(if self.chars.next_if_eq(&'=').is_some() {
                    Operator::LessEqual
                } else {
                    Operator::LessThan
                }),
                '>' => Token::Op(if self.chars.next_if_eq(&'=').is_some() {
                    Operator::GreaterEqual
                } else {
                    Operator::GreaterThan
                }),
                ',' => Token::Comma,
                first => {
                    let mut text = String::from(first);
                    while let Some(c) = self.chars.next_if(|c| !c.is_whitespace()) {
                        text.push(c);
                    }
                    Token::Text(text)
                }
            };
            return Ok(token);
        }
    }

    /// Read a decimal literal: optional `-`, digits and at most one `.`.
    ///
    /// When nothing numeric follows, the next token is consumed to describe
    /// what was found instead.
    pub(crate) fn number(&mut self) -> Result<f64, ParseErrorKind> {
        self.skip_blanks();
        let mut text = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit() || *c == '.' || *c == '-') {
            text.push(c);
        }
        if text.is_empty() {
            return Err(match self.next_token()? {
                Token::Eof => ParseErrorKind::UnexpectedEof("a number"),
                found => ParseErrorKind::ExpectedNumber(found.describe()),
            });
        }
        text.parse::<f64>().map_err(|_| ParseErrorKind::InvalidNumber(text))
    }

    /// Whitespace other than newline is insignificant.
    fn skip_blanks(&mut self) {
        while self.chars.next_if(|c| *c != '\n' && c.is_whitespace()).is_some() {}
    }

    /// Skip to (but not past) the end of the line.
    fn skip_comment(&mut self) {
        while self.chars.next_if(|c| *c != '\n').is_some() {}
    }
}
