//! Import, class, field and method declarations

use super::Parser;
use crate::ast::{ClassDecl, ImportDecl, MethodDecl, Param, TypeNode, VarDecl};
use crate::error::{ParseError, ParseResult};
use crate::token::Token;

impl<'a> Parser<'a> {
    /// `import ID ('.' ID)* ';'`
    pub(crate) fn parse_import(&mut self) -> ParseResult<ImportDecl> {
        let start = self.expect(Token::KwImport)?.span;
        let (first, _) = self.expect_ident()?;
        let mut path = vec![first];
        while self.eat(Token::Dot) {
            let (segment, _) = self.expect_ident()?;
            path.push(segment);
        }
        let end = self.expect(Token::Semicolon)?.span;
        Ok(ImportDecl {
            path,
            span: start.merge(&end),
        })
    }

    /// `class ID ('extends' ID)? '{' (varDecl | methodDecl)* '}'`
    pub(crate) fn parse_class(&mut self) -> ParseResult<ClassDecl> {
        let start = self.expect(Token::KwClass)?.span;
        let (name, _) = self.expect_ident()?;
        let extends = if self.eat(Token::KwExtends) {
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        self.expect(Token::LBrace)?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(Token::RBrace) {
            let member_start = self.current_span();
            let is_public = self.eat(Token::KwPublic);
            let is_static = self.eat(Token::KwStatic);
            let ty = self.parse_type()?;
            let (member_name, _) = self.expect_ident()?;
            if self.check(Token::LParen) {
                methods.push(self.parse_method(member_name, is_public, is_static, ty, member_start)?);
            } else {
                if is_public || is_static {
                    return Err(ParseError::invalid(
                        "fields cannot carry 'public' or 'static' modifiers",
                        member_start,
                    ));
                }
                let end = self.expect(Token::Semicolon)?.span;
                fields.push(VarDecl {
                    name: member_name,
                    ty,
                    span: member_start.merge(&end),
                });
            }
        }
        let end = self.expect(Token::RBrace)?.span;
        Ok(ClassDecl {
            name,
            extends,
            fields,
            methods,
            span: start.merge(&end),
        })
    }

    /// `('int' | 'boolean' | 'void' | ID) ('[' ']' | '...')?`
    ///
    /// Varargs in an illegal position (field, local, return) is accepted
    /// here and rejected by the semantic passes, which can point at it
    /// with a proper diagnostic.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeNode> {
        let tok = match self.current() {
            Some(tok) if tok.token.starts_type() => *tok,
            Some(tok) => {
                return Err(ParseError::unexpected(
                    tok.token.describe(),
                    "a type",
                    tok.span,
                ))
            }
            None => {
                return Err(ParseError::UnexpectedEof {
                    expected: "a type".to_string(),
                    span: self.eof_span(),
                })
            }
        };
        self.advance();
        let name = tok.text.to_string();
        let mut span = tok.span;
        let mut is_array = false;
        let mut is_varargs = false;
        if self.check(Token::LBracket) {
            self.advance();
            let end = self.expect(Token::RBracket)?.span;
            is_array = true;
            span = span.merge(&end);
        } else if self.check(Token::Ellipsis) {
            let end = self.advance().map(|t| t.span).unwrap_or(span);
            // Varargs is an array at every later stage
            is_array = true;
            is_varargs = true;
            span = span.merge(&end);
        }
        if name == "void" && is_array {
            return Err(ParseError::invalid("'void' cannot form an array type", span));
        }
        Ok(TypeNode {
            name,
            is_array,
            is_varargs,
            span,
        })
    }

    /// Parse a method once its return type and name have been consumed
    fn parse_method(
        &mut self,
        name: String,
        is_public: bool,
        is_static: bool,
        return_type: TypeNode,
        start: crate::span::Span,
    ) -> ParseResult<MethodDecl> {
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.check(Token::RParen) {
            loop {
                let ty = self.parse_type()?;
                let (param_name, param_span) = self.expect_ident()?;
                params.push(Param {
                    name: param_name,
                    span: ty.span.merge(&param_span),
                    ty,
                });
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;

        let mut locals = Vec::new();
        while self.at_var_decl() {
            locals.push(self.parse_var_decl()?);
        }
        let mut body = Vec::new();
        while !self.check(Token::RBrace) {
            body.push(self.parse_stmt()?);
        }
        let end = self.expect(Token::RBrace)?.span;
        Ok(MethodDecl {
            name,
            is_public,
            is_static,
            return_type,
            params,
            locals,
            body,
            span: start.merge(&end),
        })
    }

    /// A local declaration starts with a primitive type keyword, with
    /// two consecutive identifiers (`A obj;`), or with an identifier
    /// and an empty bracket pair (`String[] names;`). An identifier
    /// followed by `[` and an expression is an array assignment.
    fn at_var_decl(&self) -> bool {
        if self.check(Token::KwInt) || self.check(Token::KwBoolean) {
            return true;
        }
        if !self.check(Token::Ident) {
            return false;
        }
        self.check_next(Token::Ident)
            || (self.check_next(Token::LBracket)
                && self
                    .tokens
                    .get(self.pos + 2)
                    .map(|t| t.token == Token::RBracket)
                    .unwrap_or(false))
    }

    /// `type ID ';'`
    fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let ty = self.parse_type()?;
        let (name, _) = self.expect_ident()?;
        let end = self.expect(Token::Semicolon)?.span;
        Ok(VarDecl {
            span: ty.span.merge(&end),
            name,
            ty,
        })
    }
}
