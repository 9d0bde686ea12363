//! Statement parsing

use super::Parser;
use crate::ast::Stmt;
use crate::error::ParseResult;
use crate::token::Token;

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current().map(|t| t.token) {
            Some(Token::LBrace) => self.parse_block(),
            Some(Token::KwIf) => self.parse_if(),
            Some(Token::KwWhile) => self.parse_while(),
            Some(Token::KwReturn) => self.parse_return(),
            Some(Token::Ident) if self.check_next(Token::Assign) => self.parse_assign(),
            Some(Token::Ident) if self.check_next(Token::LBracket) => self.parse_array_assign(),
            _ => self.parse_expr_stmt(),
        }
    }

    /// `'{' stmt* '}'`
    fn parse_block(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::LBrace)?.span;
        let mut stmts = Vec::new();
        while !self.check(Token::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect(Token::RBrace)?.span;
        Ok(Stmt::Block {
            stmts,
            span: start.merge(&end),
        })
    }

    /// `'if' '(' expr ')' stmt 'else' stmt`; the else branch is mandatory
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwIf)?.span;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        self.expect(Token::KwElse)?;
        let else_branch = Box::new(self.parse_stmt()?);
        let span = start.merge(&else_branch.span());
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
            span,
        })
    }

    /// `'while' '(' expr ')' stmt`
    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwWhile)?.span;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        let span = start.merge(&body.span());
        Ok(Stmt::While { cond, body, span })
    }

    /// `'return' expr ';'`
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(Token::KwReturn)?.span;
        let value = self.parse_expr()?;
        let end = self.expect(Token::Semicolon)?.span;
        Ok(Stmt::Return {
            value,
            span: start.merge(&end),
        })
    }

    /// `ID '=' expr ';'`
    fn parse_assign(&mut self) -> ParseResult<Stmt> {
        let (name, start) = self.expect_ident()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        let end = self.expect(Token::Semicolon)?.span;
        Ok(Stmt::Assign {
            name,
            value,
            span: start.merge(&end),
        })
    }

    /// `ID '[' expr ']' '=' expr ';'`
    fn parse_array_assign(&mut self) -> ParseResult<Stmt> {
        let (name, start) = self.expect_ident()?;
        self.expect(Token::LBracket)?;
        let index = self.parse_expr()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        let end = self.expect(Token::Semicolon)?.span;
        Ok(Stmt::ArrayAssign {
            name,
            index,
            value,
            span: start.merge(&end),
        })
    }

    /// `expr ';'`
    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expr()?;
        let end = self.expect(Token::Semicolon)?.span;
        let span = expr.span().merge(&end);
        Ok(Stmt::Expr { expr, span })
    }
}
