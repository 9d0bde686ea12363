//! OLLIR text reader
//!
//! Re-parses the emitted OLLIR into the [`ClassUnit`] model. The
//! reader accepts exactly the dialect the emitter produces: one class,
//! `.field`/`.construct`/`.method` members, `;`-terminated statements,
//! labels on their own lines.

use super::{
    AluOp, Call, CallKind, ClassUnit, Cond, Element, Field, Instr, InstrKind, Method, Param, Rhs,
    Var,
};
use crate::types::{BaseType, Type};
use logos::Logos;
use thiserror::Error;

/// OLLIR tokens
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Tok {
    #[token(":=")]
    Walrus,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r#""[^"]*""#)]
    Str,
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
}

/// Errors while reading OLLIR text back in. These indicate an emitter
/// bug, not a user mistake.
#[derive(Error, Debug, Clone)]
pub enum OllirParseError {
    #[error("unexpected token '{found}' in OLLIR text, expected {expected}")]
    Unexpected { found: String, expected: String },
    #[error("unexpected end of OLLIR text, expected {expected}")]
    Eof { expected: String },
    #[error("unrecognized OLLIR token '{text}'")]
    Lexer { text: String },
    #[error("label '{label}' attached to no instruction")]
    DanglingLabel { label: String },
}

type Result<T> = std::result::Result<T, OllirParseError>;

/// Parse an OLLIR program into its class unit
pub fn parse_class_unit(source: &str) -> Result<ClassUnit> {
    Reader::new(source)?.parse()
}

#[derive(Debug)]
struct Reader<'a> {
    tokens: Vec<(Tok, &'a str)>,
    pos: usize,
    class_name: String,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut lexer = Tok::lexer(source);
        while let Some(result) = lexer.next() {
            match result {
                Ok(tok) => tokens.push((tok, lexer.slice())),
                Err(()) => {
                    return Err(OllirParseError::Lexer {
                        text: lexer.slice().to_string(),
                    })
                }
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            class_name: String::new(),
        })
    }

    // ==================== Token helpers ====================

    fn peek(&self) -> Option<Tok> {
        self.tokens.get(self.pos).map(|(tok, _)| *tok)
    }

    fn peek_text(&self) -> &'a str {
        self.tokens.get(self.pos).map(|(_, text)| *text).unwrap_or("")
    }

    fn peek2(&self) -> Option<Tok> {
        self.tokens.get(self.pos + 1).map(|(tok, _)| *tok)
    }

    fn bump(&mut self) -> Option<(Tok, &'a str)> {
        let tok = self.tokens.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at_ident(&self, text: &str) -> bool {
        self.peek() == Some(Tok::Ident) && self.peek_text() == text
    }

    fn expect(&mut self, expected: Tok, what: &str) -> Result<&'a str> {
        match self.bump() {
            Some((tok, text)) if tok == expected => Ok(text),
            Some((_, text)) => Err(OllirParseError::Unexpected {
                found: text.to_string(),
                expected: what.to_string(),
            }),
            None => Err(OllirParseError::Eof {
                expected: what.to_string(),
            }),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        let text = self.expect(Tok::Ident, keyword)?;
        if text == keyword {
            Ok(())
        } else {
            Err(OllirParseError::Unexpected {
                found: text.to_string(),
                expected: keyword.to_string(),
            })
        }
    }

    /// An operand or member name: a plain identifier or a quoted one
    fn name_token(&mut self) -> Result<String> {
        match self.bump() {
            Some((Tok::Ident, text)) => Ok(text.to_string()),
            Some((Tok::Str, text)) => Ok(text.trim_matches('"').to_string()),
            Some((_, text)) => Err(OllirParseError::Unexpected {
                found: text.to_string(),
                expected: "a name".to_string(),
            }),
            None => Err(OllirParseError::Eof {
                expected: "a name".to_string(),
            }),
        }
    }

    /// A `.`-prefixed type suffix
    fn parse_type(&mut self) -> Result<Type> {
        self.expect(Tok::Dot, "'.'")?;
        let text = self.expect(Tok::Ident, "a type name")?;
        Ok(match text {
            "i32" => Type::int(),
            "bool" => Type::boolean(),
            "V" => Type::void(),
            "String" => Type::new(BaseType::String, false),
            "array" => {
                let inner = self.parse_type()?;
                Type::new(inner.base, true)
            }
            class => Type::class(class),
        })
    }

    // ==================== Class structure ====================

    fn parse(mut self) -> Result<ClassUnit> {
        let mut imports = Vec::new();
        while self.at_ident("import") {
            self.bump();
            let mut path = vec![self.expect(Tok::Ident, "an import segment")?.to_string()];
            while self.peek() == Some(Tok::Dot) {
                self.bump();
                path.push(self.expect(Tok::Ident, "an import segment")?.to_string());
            }
            self.expect(Tok::Semi, "';'")?;
            imports.push(path.join("."));
        }

        self.class_name = self.expect(Tok::Ident, "a class name")?.to_string();
        let super_class = if self.at_ident("extends") {
            self.bump();
            let parent = self.expect(Tok::Ident, "a superclass name")?.to_string();
            if parent == "Object" {
                None
            } else {
                Some(parent)
            }
        } else {
            None
        };
        self.expect(Tok::LBrace, "'{'")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while self.peek() != Some(Tok::RBrace) {
            self.expect(Tok::Dot, "'.'")?;
            let member = self.expect(Tok::Ident, "'field', 'construct' or 'method'")?;
            match member {
                "field" => {
                    self.expect_keyword("public")?;
                    let name = self.name_token()?;
                    let ty = self.parse_type()?;
                    self.expect(Tok::Semi, "';'")?;
                    fields.push(Field { name, ty });
                }
                "construct" => methods.push(self.parse_construct()?),
                "method" => methods.push(self.parse_method()?),
                other => {
                    return Err(OllirParseError::Unexpected {
                        found: other.to_string(),
                        expected: "'field', 'construct' or 'method'".to_string(),
                    })
                }
            }
        }
        self.expect(Tok::RBrace, "'}'")?;

        Ok(ClassUnit {
            class_name: self.class_name.clone(),
            super_class,
            imports,
            fields,
            methods,
        })
    }

    fn parse_construct(&mut self) -> Result<Method> {
        self.expect(Tok::Ident, "the class name")?;
        self.expect(Tok::LParen, "'('")?;
        self.expect(Tok::RParen, "')'")?;
        let return_type = self.parse_type()?;
        self.expect(Tok::LBrace, "'{'")?;
        let instructions = self.parse_instructions()?;
        let mut method = Method {
            name: "<init>".to_string(),
            is_public: true,
            is_static: false,
            is_constructor: true,
            params: Vec::new(),
            return_type,
            instructions,
            vars: Vec::new(),
            registers: Default::default(),
        };
        collect_vars(&mut method);
        method.assign_default_registers();
        Ok(method)
    }

    fn parse_method(&mut self) -> Result<Method> {
        let mut is_public = false;
        let mut is_static = false;
        loop {
            if self.at_ident("public") && self.peek2() != Some(Tok::LParen) {
                is_public = true;
                self.bump();
            } else if self.at_ident("static") && self.peek2() != Some(Tok::LParen) {
                is_static = true;
                self.bump();
            } else {
                break;
            }
        }
        let name = self.name_token()?;
        self.expect(Tok::LParen, "'('")?;
        let mut params = Vec::new();
        if self.peek() != Some(Tok::RParen) {
            loop {
                let name = self.name_token()?;
                let ty = self.parse_type()?;
                params.push(Param { name, ty });
                if self.peek() == Some(Tok::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(Tok::RParen, "')'")?;
        let return_type = self.parse_type()?;
        self.expect(Tok::LBrace, "'{'")?;
        let instructions = self.parse_instructions()?;

        let mut method = Method {
            name,
            is_public,
            is_static,
            is_constructor: false,
            params,
            return_type,
            instructions,
            vars: Vec::new(),
            registers: Default::default(),
        };
        collect_vars(&mut method);
        method.assign_default_registers();
        Ok(method)
    }

    // ==================== Instructions ====================

    fn parse_instructions(&mut self) -> Result<Vec<Instr>> {
        let mut instructions = Vec::new();
        let mut pending_labels: Vec<String> = Vec::new();
        while self.peek() != Some(Tok::RBrace) {
            if self.peek() == Some(Tok::Ident) && self.peek2() == Some(Tok::Colon) {
                pending_labels.push(self.peek_text().to_string());
                self.bump();
                self.bump();
                continue;
            }
            let kind = self.parse_instruction_kind()?;
            instructions.push(Instr {
                id: instructions.len(),
                labels: std::mem::take(&mut pending_labels),
                kind,
            });
        }
        self.expect(Tok::RBrace, "'}'")?;
        if let Some(label) = pending_labels.into_iter().next() {
            return Err(OllirParseError::DanglingLabel { label });
        }
        Ok(instructions)
    }

    fn parse_instruction_kind(&mut self) -> Result<InstrKind> {
        if self.peek() == Some(Tok::Ident) {
            match self.peek_text() {
                "ret" => {
                    self.bump();
                    let ty = self.parse_type()?;
                    let value = if self.peek() == Some(Tok::Semi) {
                        None
                    } else {
                        Some(self.parse_element()?)
                    };
                    self.expect(Tok::Semi, "';'")?;
                    return Ok(InstrKind::Return { ty, value });
                }
                "goto" => {
                    self.bump();
                    let target = self.expect(Tok::Ident, "a label")?.to_string();
                    self.expect(Tok::Semi, "';'")?;
                    return Ok(InstrKind::Goto { target });
                }
                "if" => {
                    self.bump();
                    self.expect(Tok::LParen, "'('")?;
                    let cond = self.parse_cond()?;
                    self.expect(Tok::RParen, "')'")?;
                    self.expect_keyword("goto")?;
                    let target = self.expect(Tok::Ident, "a label")?.to_string();
                    self.expect(Tok::Semi, "';'")?;
                    return Ok(InstrKind::CondBranch { cond, target });
                }
                "putfield" => {
                    self.bump();
                    self.expect(Tok::LParen, "'('")?;
                    let object = self.parse_element()?;
                    self.expect(Tok::Comma, "','")?;
                    let field = self.name_token()?;
                    let field_ty = self.parse_type()?;
                    self.expect(Tok::Comma, "','")?;
                    let value = self.parse_element()?;
                    self.expect(Tok::RParen, "')'")?;
                    self.parse_type()?;
                    self.expect(Tok::Semi, "';'")?;
                    return Ok(InstrKind::PutField {
                        object,
                        field,
                        field_ty,
                        value,
                    });
                }
                "invokestatic" | "invokevirtual" | "invokespecial" | "arraylength" | "new"
                | "ldc" => {
                    let call = self.parse_call()?;
                    self.expect(Tok::Semi, "';'")?;
                    return Ok(InstrKind::Call(call));
                }
                _ => {}
            }
        }

        // An assignment: destination, ':=', type, right-hand side
        let dest = self.parse_dest()?;
        self.expect(Tok::Walrus, "':='")?;
        self.parse_type()?;
        let rhs = self.parse_rhs()?;
        self.expect(Tok::Semi, "';'")?;
        Ok(InstrKind::Assign { dest, rhs })
    }

    fn parse_dest(&mut self) -> Result<Element> {
        let name = self.name_token()?;
        if self.peek() == Some(Tok::LBracket) {
            self.bump();
            let index = self.parse_element()?;
            self.expect(Tok::RBracket, "']'")?;
            let ty = self.parse_type()?;
            Ok(Element::ArrayAccess {
                name,
                index: Box::new(index),
                ty,
            })
        } else {
            let ty = self.parse_type()?;
            Ok(Element::Operand { name, ty })
        }
    }

    fn parse_rhs(&mut self) -> Result<Rhs> {
        if self.peek() == Some(Tok::Bang) {
            self.bump();
            self.parse_type()?;
            let operand = self.parse_element()?;
            return Ok(Rhs::Unary { operand });
        }
        if self.peek() == Some(Tok::Ident) {
            match self.peek_text() {
                "getfield" => {
                    self.bump();
                    self.expect(Tok::LParen, "'('")?;
                    let object = self.parse_element()?;
                    self.expect(Tok::Comma, "','")?;
                    let field = self.name_token()?;
                    self.parse_type()?;
                    self.expect(Tok::RParen, "')'")?;
                    let ty = self.parse_type()?;
                    return Ok(Rhs::GetField { object, field, ty });
                }
                "invokestatic" | "invokevirtual" | "invokespecial" | "arraylength" | "new"
                | "ldc" => {
                    return Ok(Rhs::Call(self.parse_call()?));
                }
                _ => {}
            }
        }
        let lhs = self.parse_element()?;
        if let Some(op) = self.peek_alu_op() {
            self.bump();
            self.parse_type()?;
            let rhs = self.parse_element()?;
            return Ok(Rhs::Binary { lhs, op, rhs });
        }
        Ok(Rhs::Simple(lhs))
    }

    fn parse_cond(&mut self) -> Result<Cond> {
        if self.peek() == Some(Tok::Bang) {
            self.bump();
            self.parse_type()?;
            let operand = self.parse_element()?;
            return Ok(Cond::Not(operand));
        }
        let lhs = self.parse_element()?;
        if let Some(op) = self.peek_alu_op() {
            self.bump();
            self.parse_type()?;
            let rhs = self.parse_element()?;
            return Ok(Cond::Compare { lhs, op, rhs });
        }
        Ok(Cond::Single(lhs))
    }

    fn peek_alu_op(&self) -> Option<AluOp> {
        match self.peek()? {
            Tok::Plus => Some(AluOp::Add),
            Tok::Minus => Some(AluOp::Sub),
            Tok::Star => Some(AluOp::Mul),
            Tok::Slash => Some(AluOp::Div),
            Tok::Lt => Some(AluOp::Lt),
            Tok::Le => Some(AluOp::Le),
            Tok::Gt => Some(AluOp::Gt),
            Tok::Ge => Some(AluOp::Ge),
            Tok::EqEq => Some(AluOp::Eq),
            Tok::AndAnd => Some(AluOp::And),
            Tok::OrOr => Some(AluOp::Or),
            _ => None,
        }
    }

    fn parse_call(&mut self) -> Result<Call> {
        let keyword = self.expect(Tok::Ident, "an invocation keyword")?;
        match keyword {
            "invokestatic" | "invokevirtual" | "invokespecial" => {
                let kind = match keyword {
                    "invokestatic" => CallKind::Static,
                    "invokevirtual" => CallKind::Virtual,
                    _ => CallKind::Special,
                };
                self.expect(Tok::LParen, "'('")?;
                let caller = self.parse_element()?;
                self.expect(Tok::Comma, "','")?;
                let method = self
                    .expect(Tok::Str, "a quoted method name")?
                    .trim_matches('"')
                    .to_string();
                let mut args = Vec::new();
                while self.peek() == Some(Tok::Comma) {
                    self.bump();
                    args.push(self.parse_element()?);
                }
                self.expect(Tok::RParen, "')'")?;
                let return_type = self.parse_type()?;
                Ok(Call {
                    kind,
                    caller,
                    method: Some(method),
                    args,
                    return_type,
                })
            }
            "new" => {
                self.expect(Tok::LParen, "'('")?;
                let target = self.expect(Tok::Ident, "'array' or a class name")?;
                if target == "array" {
                    self.expect(Tok::Comma, "','")?;
                    let size = self.parse_element()?;
                    self.expect(Tok::RParen, "')'")?;
                    let return_type = self.parse_type()?;
                    Ok(Call {
                        kind: CallKind::NewArray,
                        caller: Element::Operand {
                            name: "array".to_string(),
                            ty: return_type.clone(),
                        },
                        method: None,
                        args: vec![size],
                        return_type,
                    })
                } else {
                    let class = target.to_string();
                    self.expect(Tok::RParen, "')'")?;
                    let return_type = self.parse_type()?;
                    Ok(Call {
                        kind: CallKind::New,
                        caller: Element::Operand {
                            name: class.clone(),
                            ty: Type::class(class),
                        },
                        method: None,
                        args: Vec::new(),
                        return_type,
                    })
                }
            }
            "arraylength" => {
                self.expect(Tok::LParen, "'('")?;
                let caller = self.parse_element()?;
                self.expect(Tok::RParen, "')'")?;
                let return_type = self.parse_type()?;
                Ok(Call {
                    kind: CallKind::ArrayLength,
                    caller,
                    method: None,
                    args: Vec::new(),
                    return_type,
                })
            }
            "ldc" => {
                self.expect(Tok::LParen, "'('")?;
                let caller = self.parse_element()?;
                self.expect(Tok::RParen, "')'")?;
                let return_type = self.parse_type()?;
                Ok(Call {
                    kind: CallKind::Ldc,
                    caller,
                    method: None,
                    args: Vec::new(),
                    return_type,
                })
            }
            other => Err(OllirParseError::Unexpected {
                found: other.to_string(),
                expected: "an invocation keyword".to_string(),
            }),
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        match self.peek() {
            Some(Tok::Minus) => {
                self.bump();
                let magnitude = self.parse_int_literal()?;
                let ty = self.parse_type()?;
                Ok(Element::Literal {
                    value: (-magnitude) as i32,
                    ty,
                })
            }
            Some(Tok::Int) => {
                let magnitude = self.parse_int_literal()?;
                let ty = self.parse_type()?;
                Ok(Element::Literal {
                    value: magnitude as i32,
                    ty,
                })
            }
            Some(Tok::Str) => {
                let name = self.name_token()?;
                if self.peek() == Some(Tok::LBracket) {
                    self.bump();
                    let index = self.parse_element()?;
                    self.expect(Tok::RBracket, "']'")?;
                    let ty = self.parse_type()?;
                    return Ok(Element::ArrayAccess {
                        name,
                        index: Box::new(index),
                        ty,
                    });
                }
                let ty = self.parse_type()?;
                Ok(Element::Operand { name, ty })
            }
            Some(Tok::Ident) => {
                if self.peek_text() == "this" {
                    self.bump();
                    return Ok(Element::Operand {
                        name: "this".to_string(),
                        ty: Type::class(self.class_name.clone()),
                    });
                }
                let name = self.name_token()?;
                match self.peek() {
                    Some(Tok::LBracket) => {
                        self.bump();
                        let index = self.parse_element()?;
                        self.expect(Tok::RBracket, "']'")?;
                        let ty = self.parse_type()?;
                        Ok(Element::ArrayAccess {
                            name,
                            index: Box::new(index),
                            ty,
                        })
                    }
                    Some(Tok::Dot) => {
                        let ty = self.parse_type()?;
                        Ok(Element::Operand { name, ty })
                    }
                    // A bare name is a class reference (static receiver)
                    _ => Ok(Element::Operand {
                        name: name.clone(),
                        ty: Type::class(name),
                    }),
                }
            }
            Some(_) => Err(OllirParseError::Unexpected {
                found: self.peek_text().to_string(),
                expected: "an operand".to_string(),
            }),
            None => Err(OllirParseError::Eof {
                expected: "an operand".to_string(),
            }),
        }
    }

    fn parse_int_literal(&mut self) -> Result<i64> {
        let text = self.expect(Tok::Int, "an integer literal")?;
        text.parse::<i64>()
            .map_err(|_| OllirParseError::Unexpected {
                found: text.to_string(),
                expected: "an integer literal".to_string(),
            })
    }
}

// ==================== Variable collection ====================

/// Record every named variable of the method, in first-appearance
/// order. Class references used as static-call receivers and the
/// receiver `this` are not variables.
fn collect_vars(method: &mut Method) {
    let mut vars: Vec<Var> = Vec::new();
    for instr in &method.instructions {
        match &instr.kind {
            InstrKind::Assign { dest, rhs } => {
                record_element(&mut vars, &method.params, dest);
                match rhs {
                    Rhs::Simple(element) | Rhs::Unary { operand: element } => {
                        record_element(&mut vars, &method.params, element)
                    }
                    Rhs::Binary { lhs, rhs, .. } => {
                        record_element(&mut vars, &method.params, lhs);
                        record_element(&mut vars, &method.params, rhs);
                    }
                    Rhs::Call(call) => record_call(&mut vars, &method.params, call),
                    Rhs::GetField { .. } => {}
                }
            }
            InstrKind::Call(call) => record_call(&mut vars, &method.params, call),
            InstrKind::PutField { value, .. } => record_element(&mut vars, &method.params, value),
            InstrKind::Return { value, .. } => {
                if let Some(element) = value {
                    record_element(&mut vars, &method.params, element);
                }
            }
            InstrKind::CondBranch { cond, .. } => match cond {
                Cond::Single(element) | Cond::Not(element) => {
                    record_element(&mut vars, &method.params, element)
                }
                Cond::Compare { lhs, rhs, .. } => {
                    record_element(&mut vars, &method.params, lhs);
                    record_element(&mut vars, &method.params, rhs);
                }
            },
            InstrKind::Goto { .. } => {}
        }
    }
    method.vars = vars;
}

fn record(vars: &mut Vec<Var>, params: &[Param], name: &str, ty: &Type) {
    if name == "this" {
        return;
    }
    if params.iter().any(|p| p.name == name) {
        return;
    }
    if vars.iter().any(|v| v.name == name) {
        return;
    }
    vars.push(Var {
        name: name.to_string(),
        ty: ty.clone(),
    });
}

fn record_element(vars: &mut Vec<Var>, params: &[Param], element: &Element) {
    match element {
        Element::Literal { .. } => {}
        Element::Operand { name, ty } => {
            // A bare class reference carries its own name as type
            if ty.class_name() == Some(name.as_str()) {
                return;
            }
            record(vars, params, name, ty);
        }
        Element::ArrayAccess { name, ty, index } => {
            record(vars, params, name, &ty.to_array());
            if let Element::Operand { name, ty } = index.as_ref() {
                record(vars, params, name, ty);
            }
        }
    }
}

fn record_call(vars: &mut Vec<Var>, params: &[Param], call: &Call) {
    if !matches!(call.kind, CallKind::Static | CallKind::New | CallKind::Ldc) {
        record_element(vars, params, &call.caller);
    }
    for arg in &call.args {
        record_element(vars, params, arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE: &str = r#"
import io;

Simple extends Object {
    .field public count.i32;

    .construct Simple().V {
        invokespecial(this, "<init>").V;
    }

    .method public add(a.i32, b.i32).i32 {
        t1.i32 :=.i32 a.i32 +.i32 b.i32;
        ret.i32 t1.i32;
    }

    .method public static main(args.array.String).V {
        invokestatic(io, "println", 1.i32).V;
        ret.V;
    }
}
"#;

    #[test]
    fn test_parse_class_structure() {
        let unit = parse_class_unit(SIMPLE).expect("parse failed");
        assert_eq!(unit.class_name, "Simple");
        assert_eq!(unit.super_class, None);
        assert_eq!(unit.imports, vec!["io".to_string()]);
        assert_eq!(unit.fields.len(), 1);
        assert_eq!(unit.fields[0].name, "count");
        assert_eq!(unit.methods.len(), 3);
        assert!(unit.methods[0].is_constructor);
    }

    #[test]
    fn test_parse_binary_assign_and_return() {
        let unit = parse_class_unit(SIMPLE).expect("parse failed");
        let add = &unit.methods[1];
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.instructions.len(), 2);
        let InstrKind::Assign { dest, rhs } = &add.instructions[0].kind else {
            panic!("expected assign, got {:?}", add.instructions[0].kind);
        };
        assert_eq!(dest.name(), Some("t1"));
        assert!(matches!(rhs, Rhs::Binary { op: AluOp::Add, .. }));
        assert!(matches!(
            &add.instructions[1].kind,
            InstrKind::Return { value: Some(_), .. }
        ));
    }

    #[test]
    fn test_static_call_receiver_is_not_a_variable() {
        let unit = parse_class_unit(SIMPLE).expect("parse failed");
        let main = &unit.methods[2];
        assert!(main.vars.is_empty(), "unexpected vars: {:?}", main.vars);
        let InstrKind::Call(call) = &main.instructions[0].kind else {
            panic!("expected call");
        };
        assert_eq!(call.kind, CallKind::Static);
        assert_eq!(call.method.as_deref(), Some("println"));
    }

    #[test]
    fn test_default_registers() {
        let unit = parse_class_unit(SIMPLE).expect("parse failed");
        let add = &unit.methods[1];
        assert_eq!(add.registers["this"], 0);
        assert_eq!(add.registers["a"], 1);
        assert_eq!(add.registers["b"], 2);
        assert_eq!(add.registers["t1"], 3);
        let main = &unit.methods[2];
        assert_eq!(main.registers["args"], 0);
    }

    #[test]
    fn test_control_flow_successors() {
        let src = r#"
Loop extends Object {
    .construct Loop().V {
        invokespecial(this, "<init>").V;
    }
    .method public f(n.i32).i32 {
        i.i32 :=.i32 0.i32;
        L_while0:
        if (i.i32 <.i32 n.i32) goto L_body0;
        goto L_endwhile0;
        L_body0:
        i.i32 :=.i32 i.i32 +.i32 1.i32;
        goto L_while0;
        L_endwhile0:
        ret.i32 i.i32;
    }
}
"#;
        let unit = parse_class_unit(src).expect("parse failed");
        let f = &unit.methods[1];
        assert_eq!(f.instructions.len(), 6);
        // The conditional branch goes to the body and falls through
        assert_eq!(f.successors(1), vec![3, 2]);
        // The back edge goes to the condition
        assert_eq!(f.successors(4), vec![1]);
        // The return has no successors
        assert_eq!(f.successors(5), vec![]);
        // Labels stick to the right instructions
        assert_eq!(f.label_index("L_while0"), Some(1));
        assert_eq!(f.label_index("L_endwhile0"), Some(5));
    }

    #[test]
    fn test_parse_field_access_and_arrays() {
        let src = r#"
Store extends Object {
    .field public data.array.i32;
    .construct Store().V {
        invokespecial(this, "<init>").V;
    }
    .method public put(x.i32).V {
        t1.array.i32 :=.array.i32 getfield(this, data.array.i32).array.i32;
        t1[0.i32].i32 :=.i32 x.i32;
        putfield(this, count.i32, x.i32).V;
        ret.V;
    }
}
"#;
        let unit = parse_class_unit(src).expect("parse failed");
        let put = &unit.methods[1];
        assert!(matches!(
            &put.instructions[0].kind,
            InstrKind::Assign {
                rhs: Rhs::GetField { .. },
                ..
            }
        ));
        let InstrKind::Assign { dest, .. } = &put.instructions[1].kind else {
            panic!("expected assign");
        };
        assert!(matches!(dest, Element::ArrayAccess { .. }));
        assert!(matches!(
            &put.instructions[2].kind,
            InstrKind::PutField { field, .. } if field == "count"
        ));
        assert_eq!(put.var_type("t1"), Some(&Type::int_array()));
    }

    #[test]
    fn test_parse_quoted_operand_name() {
        let src = r#"
Odd extends Object {
    .construct Odd().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        "ret".i32 :=.i32 3.i32;
        ret.i32 "ret".i32;
    }
}
"#;
        let unit = parse_class_unit(src).expect("parse failed");
        let f = &unit.methods[1];
        assert_eq!(f.vars.len(), 1);
        assert_eq!(f.vars[0].name, "ret");
    }

    #[test]
    fn test_parse_negative_literal() {
        let src = r#"
Neg extends Object {
    .construct Neg().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        x.i32 :=.i32 -3.i32;
        ret.i32 x.i32;
    }
}
"#;
        let unit = parse_class_unit(src).expect("parse failed");
        let InstrKind::Assign { rhs, .. } = &unit.methods[1].instructions[0].kind else {
            panic!("expected assign");
        };
        assert!(matches!(
            rhs,
            Rhs::Simple(Element::Literal { value: -3, .. })
        ));
    }
}
