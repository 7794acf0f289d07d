//! Recursive descent parser for type-descriptor strings
//!
//! ```text
//! type   := (dim sep)* leaf
//! sep    := ',' | '*'
//! dim    := INTEGER | 'var' | 'strided' | SYMBOLIC
//! leaf   := scalar | string | struct
//! string := 'string' [ '(' (INTEGER [',' ENC] | ENC) ')' ]
//! struct := '{' field (';' field)* [';'] '}'
//! field  := NAME ':' type
//! ```

use crate::descriptor::{
    Dimension, LeafType, ScalarKind, StringEncoding, StringType, StructField, StructType,
    TypeDescriptor,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::Span;
use crate::token::{is_symbolic_dimension, Token};

/// Type-descriptor parser
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Current token (None at end of input)
    current: Option<SpannedToken<'a>>,
}

impl<'a> Parser<'a> {
    /// Create a parser and prime it with the first token
    pub fn new(source: &'a str) -> ParseResult<Self> {
        let mut parser = Self {
            lexer: Lexer::new(source),
            current: None,
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Parse a complete descriptor, rejecting trailing input
    pub fn parse_type(mut self) -> ParseResult<TypeDescriptor> {
        let ty = self.type_descriptor()?;
        self.finish()?;
        Ok(ty)
    }

    /// Parse a leaf type, rejecting any dimensions
    pub fn parse_leaf(mut self) -> ParseResult<LeafType> {
        if let Some(tok) = &self.current {
            if self.starts_dimension(tok) {
                return Err(ParseError::UnexpectedDimensions {
                    found: tok.text.to_string(),
                    span: tok.span,
                });
            }
        }
        let leaf = self.leaf()?;
        self.finish()?;
        Ok(leaf)
    }

    // ==================== Token Management ====================

    fn advance(&mut self) -> ParseResult<Option<SpannedToken<'a>>> {
        let next = self.lexer.next_token().transpose()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check(&self, expected: &Token) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| &t.token == expected)
    }

    /// Consume current token if it matches, return error otherwise
    fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        match self.current.take() {
            Some(tok) if tok.token == expected => {
                self.advance()?;
                Ok(tok)
            }
            Some(tok) => Err(ParseError::unexpected_token(
                tok.text,
                expected.describe(),
                tok.span,
            )),
            None => Err(ParseError::unexpected_eof(
                expected.describe(),
                self.lexer.eof_span(),
            )),
        }
    }

    /// Take the current token, failing at end of input
    fn bump(&mut self, expected: &str) -> ParseResult<SpannedToken<'a>> {
        match self.current.take() {
            Some(tok) => {
                self.advance()?;
                Ok(tok)
            }
            None => Err(ParseError::unexpected_eof(expected, self.lexer.eof_span())),
        }
    }

    fn finish(&self) -> ParseResult<()> {
        match &self.current {
            None => Ok(()),
            Some(tok) => Err(ParseError::unexpected_token(
                tok.text,
                "end of input",
                tok.span,
            )),
        }
    }

    fn starts_dimension(&self, tok: &SpannedToken<'a>) -> bool {
        match tok.token {
            Token::Integer | Token::KwVar | Token::KwStrided => true,
            Token::Ident => is_symbolic_dimension(tok.text),
            _ => false,
        }
    }

    // ==================== Grammar ====================

    fn type_descriptor(&mut self) -> ParseResult<TypeDescriptor> {
        let mut dims = Vec::new();
        while let Some(tok) = &self.current {
            if !self.starts_dimension(tok) {
                break;
            }
            let tok = self.bump("a dimension")?;
            dims.push(dimension(&tok)?);
            self.separator()?;
        }
        let leaf = self.leaf()?;
        Ok(TypeDescriptor { dims, leaf })
    }

    fn separator(&mut self) -> ParseResult<()> {
        match &self.current {
            Some(tok) if tok.token.is_dimension_separator() => {
                self.advance()?;
                Ok(())
            }
            Some(tok) => Err(ParseError::unexpected_token(
                tok.text,
                "',' or '*' after dimension",
                tok.span,
            )),
            None => Err(ParseError::unexpected_eof(
                "',' or '*' after dimension",
                self.lexer.eof_span(),
            )),
        }
    }

    fn leaf(&mut self) -> ParseResult<LeafType> {
        let tok = self.bump("a type")?;
        match tok.token {
            Token::KwString => Ok(LeafType::String(self.string_params()?)),
            Token::LBrace => Ok(LeafType::Struct(self.struct_body(tok.span)?)),
            Token::Ident => ScalarKind::from_name(tok.text)
                .map(LeafType::Scalar)
                .ok_or(ParseError::UnknownType {
                    name: tok.text.to_string(),
                    span: tok.span,
                }),
            _ => Err(ParseError::unexpected_token(tok.text, "a type", tok.span)),
        }
    }

    /// Optional `(width, "ENC")` suffix after `string`
    fn string_params(&mut self) -> ParseResult<StringType> {
        if !self.check(&Token::LParen) {
            return Ok(StringType::default());
        }
        self.advance()?;

        let mut ty = StringType::default();
        if self.check(&Token::Integer) {
            let tok = self.bump("a width")?;
            ty.fixed_width = Some(parse_usize(&tok)?);
            if self.check(&Token::Comma) {
                self.advance()?;
                ty.encoding = self.encoding()?;
            }
        } else {
            ty.encoding = self.encoding()?;
        }

        self.expect(Token::RParen)?;
        Ok(ty)
    }

    fn encoding(&mut self) -> ParseResult<StringEncoding> {
        let tok = self.expect(Token::StringLiteral)?;
        let name = &tok.text[1..tok.text.len() - 1];
        StringEncoding::from_name(name).ok_or(ParseError::InvalidEncoding {
            name: name.to_string(),
            span: tok.span,
        })
    }

    fn struct_body(&mut self, open: Span) -> ParseResult<StructType> {
        let mut fields: Vec<StructField> = Vec::new();

        loop {
            if self.check(&Token::RBrace) && !fields.is_empty() {
                break;
            }
            let name = match self.current.take() {
                Some(tok) if tok.token.is_field_name() => {
                    self.advance()?;
                    tok
                }
                Some(tok) => {
                    return Err(ParseError::unexpected_token(
                        tok.text,
                        "a field name",
                        tok.span,
                    ))
                }
                None => {
                    return Err(ParseError::unexpected_eof(
                        format!("a field name to close struct opened at {}", open),
                        self.lexer.eof_span(),
                    ))
                }
            };
            if fields.iter().any(|f| f.name == name.text) {
                return Err(ParseError::DuplicateField {
                    name: name.text.to_string(),
                    span: name.span,
                });
            }

            self.expect(Token::Colon)?;
            let ty = self.type_descriptor()?;
            fields.push(StructField::new(name.text, ty));

            if self.check(&Token::Semicolon) {
                self.advance()?;
            } else {
                break;
            }
        }

        self.expect(Token::RBrace)?;
        StructType::new(fields).map_err(|name| ParseError::DuplicateField { name, span: open })
    }
}

fn dimension(tok: &SpannedToken<'_>) -> ParseResult<Dimension> {
    Ok(match tok.token {
        Token::Integer => Dimension::Fixed(parse_usize(tok)?),
        Token::KwVar => Dimension::Var,
        _ => Dimension::Strided,
    })
}

fn parse_usize(tok: &SpannedToken<'_>) -> ParseResult<usize> {
    tok.text.parse().map_err(|_| ParseError::InvalidNumber {
        literal: tok.text.to_string(),
        span: tok.span,
    })
}
