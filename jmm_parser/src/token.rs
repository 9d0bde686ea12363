//! Token definitions for the Jmm lexer

use logos::Logos;

/// Jmm tokens
///
/// Whitespace and both comment forms are skipped by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("import")]
    KwImport,
    #[token("class")]
    KwClass,
    #[token("extends")]
    KwExtends,
    #[token("public")]
    KwPublic,
    #[token("static")]
    KwStatic,
    #[token("return")]
    KwReturn,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("new")]
    KwNew,
    #[token("this")]
    KwThis,
    #[token("int")]
    KwInt,
    #[token("boolean")]
    KwBoolean,
    #[token("void")]
    KwVoid,

    // ==================== Boolean Literals ====================
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ==================== Delimiters ====================
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

    // ==================== Punctuation ====================
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("=")]
    Assign,

    // ==================== Operators ====================
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
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
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // ==================== Literals & Identifiers ====================
    /// Integer literal: `0` or a nonzero digit followed by digits
    #[regex("0|[1-9][0-9]*")]
    Int,
    /// Identifier: letter, `_` or `$`, then letters, digits, `_`, `$`
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
}

impl Token {
    /// Human-readable description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwImport => "'import'",
            Token::KwClass => "'class'",
            Token::KwExtends => "'extends'",
            Token::KwPublic => "'public'",
            Token::KwStatic => "'static'",
            Token::KwReturn => "'return'",
            Token::KwIf => "'if'",
            Token::KwElse => "'else'",
            Token::KwWhile => "'while'",
            Token::KwNew => "'new'",
            Token::KwThis => "'this'",
            Token::KwInt => "'int'",
            Token::KwBoolean => "'boolean'",
            Token::KwVoid => "'void'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Dot => "'.'",
            Token::Ellipsis => "'...'",
            Token::Assign => "'='",
            Token::AndAnd => "'&&'",
            Token::OrOr => "'||'",
            Token::Bang => "'!'",
            Token::Lt => "'<'",
            Token::Le => "'<='",
            Token::Gt => "'>'",
            Token::Ge => "'>='",
            Token::EqEq => "'=='",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Int => "integer literal",
            Token::Ident => "identifier",
        }
    }

    /// Check whether this token can begin a type
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            Token::KwInt | Token::KwBoolean | Token::KwVoid | Token::Ident
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_lex_keywords_and_idents() {
        assert_eq!(
            lex("class Foo extends Bar"),
            vec![Token::KwClass, Token::Ident, Token::KwExtends, Token::Ident]
        );
    }

    #[test]
    fn test_lex_operators() {
        assert_eq!(
            lex("a && b < c + 1"),
            vec![
                Token::Ident,
                Token::AndAnd,
                Token::Ident,
                Token::Lt,
                Token::Ident,
                Token::Plus,
                Token::Int
            ]
        );
    }

    #[test]
    fn test_lex_ellipsis_before_dot() {
        assert_eq!(lex("int... a.b"), vec![
            Token::KwInt,
            Token::Ellipsis,
            Token::Ident,
            Token::Dot,
            Token::Ident
        ]);
    }

    #[test]
    fn test_lex_skips_comments() {
        assert_eq!(
            lex("a // line comment\n/* block\ncomment */ b"),
            vec![Token::Ident, Token::Ident]
        );
    }

    #[test]
    fn test_lex_rejects_leading_zero_digits() {
        // "01" lexes as two separate integer literals, not one
        assert_eq!(lex("01"), vec![Token::Int, Token::Int]);
    }
}
