//! Token definitions for the type-descriptor lexer


use logos::Logos;

/// Type-descriptor tokens
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("var")]
    KwVar,
    #[token("strided")]
    KwStrided,
    #[token("string")]
    KwString,

    // ==================== Delimiters ====================
    #[token(",")]
    Comma,
    #[token("*")]
    Star,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // ==================== Literals ====================
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r#""[^"\n]*""#)]
    #[regex(r"'[^'\n]*'")]
    StringLiteral,

    // ==================== Identifiers ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

impl Token {
    /// Check if this token separates a dimension from what follows it
    pub fn is_dimension_separator(&self) -> bool {
        matches!(self, Token::Comma | Token::Star)
    }

    /// Check if this token can name a struct field
    ///
    /// Keywords are reserved only in type position, so `{string: int32}` is
    /// a valid struct.
    pub fn is_field_name(&self) -> bool {
        matches!(
            self,
            Token::Ident | Token::KwVar | Token::KwStrided | Token::KwString
        )
    }

    /// Human-readable description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwVar => "'var'",
            Token::KwStrided => "'strided'",
            Token::KwString => "'string'",
            Token::Comma => "','",
            Token::Star => "'*'",
            Token::Semicolon => "';'",
            Token::Colon => "':'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::Integer => "integer",
            Token::StringLiteral => "string literal",
            Token::Ident => "identifier",
        }
    }
}

/// Check if an identifier is a symbolic dimension (`M`, `N`, `DIM_2`)
///
/// Symbolic dimensions start with an uppercase letter and contain no
/// lowercase letters. They parse as strided dimensions.
pub fn is_symbolic_dimension(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && !text.chars().any(|c| c.is_ascii_lowercase())
}
