//! Recursive descent parser for Jmm
//!
//! Converts the token stream into the typed AST in `crate::ast`.

mod declarations;
mod expressions;
mod statements;

use logos::Logos;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span and source text
#[derive(Debug, Clone, Copy)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

/// Jmm parser
///
/// The whole source is lexed up front; parsing then walks the token
/// vector with one token of lookahead.
#[derive(Debug)]
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) tokens: Vec<SpannedToken<'a>>,
    pub(crate) pos: usize,
    pub(crate) source_map: SourceMap,
}

impl<'a> Parser<'a> {
    /// Lex the source and create a parser. Fails on the first
    /// unrecognized character sequence.
    pub fn new(source: &'a str) -> ParseResult<Self> {
        let source_map = SourceMap::new(source);
        let mut tokens = Vec::new();
        let mut lexer = Token::lexer(source);
        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let span = source_map.span(range.start, range.end);
            match result {
                Ok(token) => tokens.push(SpannedToken {
                    token,
                    span,
                    text: &source[range],
                }),
                Err(()) => {
                    return Err(ParseError::LexerError {
                        text: source[range].to_string(),
                        span,
                    })
                }
            }
        }
        Ok(Self {
            source,
            tokens,
            pos: 0,
            source_map,
        })
    }

    /// Parse a whole program: imports, then exactly one class.
    pub fn parse(mut self) -> ParseResult<Program> {
        let mut imports = Vec::new();
        while self.check(Token::KwImport) {
            imports.push(self.parse_import()?);
        }
        let class = self.parse_class()?;
        if let Some(tok) = self.current() {
            return Err(ParseError::unexpected(
                tok.token.describe(),
                "end of input",
                tok.span,
            ));
        }
        Ok(Program { imports, class })
    }

    // ==================== Token Management ====================

    pub(crate) fn current(&self) -> Option<&SpannedToken<'a>> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn check(&self, expected: Token) -> bool {
        self.current().map(|t| t.token == expected).unwrap_or(false)
    }

    pub(crate) fn check_next(&self, expected: Token) -> bool {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.token == expected)
            .unwrap_or(false)
    }

    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let tok = self.tokens.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Consume the current token if it matches
    pub(crate) fn eat(&mut self, expected: Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail
    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        match self.current() {
            Some(tok) if tok.token == expected => {
                let tok = *tok;
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(ParseError::unexpected(
                tok.token.describe(),
                expected.describe(),
                tok.span,
            )),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.describe().to_string(),
                span: self.eof_span(),
            }),
        }
    }

    /// Consume an identifier and return its text and span
    pub(crate) fn expect_ident(&mut self) -> ParseResult<(String, Span)> {
        let tok = self.expect(Token::Ident)?;
        Ok((tok.text.to_string(), tok.span))
    }

    /// Span pointing at the end of the source, for EOF errors
    pub(crate) fn eof_span(&self) -> Span {
        let end = self.source.len();
        self.source_map.span(end, end)
    }

    /// Span of the current token, or the EOF span
    pub(crate) fn current_span(&self) -> Span {
        self.current().map(|t| t.span).unwrap_or(self.eof_span())
    }
}

/// Parse a Jmm source string into a `Program`
pub fn parse_program(source: &str) -> ParseResult<Program> {
    Parser::new(source)?.parse()
}
