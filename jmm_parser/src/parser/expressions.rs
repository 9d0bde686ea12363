//! Expression parsing
//!
//! Precedence, loosest first: `||`, `&&`, `==`, relational, additive,
//! multiplicative, unary `!`, postfix (`[..]`, `.m(..)`, `.length`).

use super::Parser;
use crate::ast::{BinaryOp, Expr};
use crate::error::{ParseError, ParseResult};
use crate::token::Token;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(Token::OrOr) {
            let rhs = self.parse_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.eat(Token::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_relational()?;
        while self.eat(Token::EqEq) {
            let rhs = self.parse_relational()?;
            lhs = binary(BinaryOp::Eq, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current().map(|t| t.token) {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current().map(|t| t.token) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current().map(|t| t.token) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.check(Token::Bang) {
            let start = self.advance().map(|t| t.span).unwrap_or_default();
            let operand = self.parse_unary()?;
            let span = start.merge(&operand.span());
            return Ok(Expr::Not {
                expr: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(Token::LBracket) {
                self.advance();
                let index = self.parse_expr()?;
                let end = self.expect(Token::RBracket)?.span;
                let span = expr.span().merge(&end);
                expr = Expr::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span,
                };
            } else if self.check(Token::Dot) {
                self.advance();
                let (name, name_span) = self.expect_ident()?;
                if self.check(Token::LParen) {
                    let (args, end) = self.parse_args()?;
                    let span = expr.span().merge(&end);
                    expr = Expr::Call {
                        receiver: Box::new(expr),
                        method: name,
                        args,
                        span,
                    };
                } else {
                    let span = expr.span().merge(&name_span);
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field: name,
                        span,
                    };
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// `'(' (expr (',' expr)*)? ')'` and returns the arguments with the
    /// closing parenthesis span
    fn parse_args(&mut self) -> ParseResult<(Vec<Expr>, crate::span::Span)> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(Token::RParen)?.span;
        Ok((args, end))
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let tok = match self.current() {
            Some(tok) => *tok,
            None => {
                return Err(ParseError::UnexpectedEof {
                    expected: "an expression".to_string(),
                    span: self.eof_span(),
                })
            }
        };
        match tok.token {
            Token::Int => {
                self.advance();
                let value = tok.text.parse::<i32>().map_err(|_| {
                    ParseError::IntegerOutOfRange {
                        literal: tok.text.to_string(),
                        span: tok.span,
                    }
                })?;
                Ok(Expr::IntLiteral {
                    value,
                    span: tok.span,
                })
            }
            Token::True | Token::False => {
                self.advance();
                Ok(Expr::BoolLiteral {
                    value: tok.token == Token::True,
                    span: tok.span,
                })
            }
            Token::Ident => {
                self.advance();
                Ok(Expr::Identifier {
                    name: tok.text.to_string(),
                    span: tok.span,
                })
            }
            Token::KwThis => {
                self.advance();
                Ok(Expr::This { span: tok.span })
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.expect(Token::RParen)?.span;
                Ok(Expr::Paren {
                    expr: Box::new(inner),
                    span: tok.span.merge(&end),
                })
            }
            Token::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(Token::RBracket) {
                    loop {
                        elements.push(self.parse_expr()?);
                        if !self.eat(Token::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(Token::RBracket)?.span;
                Ok(Expr::ArrayLiteral {
                    elements,
                    span: tok.span.merge(&end),
                })
            }
            Token::KwNew => {
                self.advance();
                if self.eat(Token::KwInt) {
                    self.expect(Token::LBracket)?;
                    let size = self.parse_expr()?;
                    let end = self.expect(Token::RBracket)?.span;
                    Ok(Expr::NewArray {
                        size: Box::new(size),
                        span: tok.span.merge(&end),
                    })
                } else {
                    let (class, _) = self.expect_ident()?;
                    self.expect(Token::LParen)?;
                    let end = self.expect(Token::RParen)?.span;
                    Ok(Expr::NewObject {
                        class,
                        span: tok.span.merge(&end),
                    })
                }
            }
            other => Err(ParseError::unexpected(
                other.describe(),
                "an expression",
                tok.span,
            )),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span().merge(&rhs.span());
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span,
    }
}
