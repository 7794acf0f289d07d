//! Lexer for type-descriptor strings
//!
//! Wraps the logos-generated lexer with spans that carry line/column
//! information and with one token of lookahead.

use logos::Logos;

use crate::error::ParseError;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// Type-descriptor lexer
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    /// Peeked token (for lookahead)
    peeked: Option<Option<Result<SpannedToken<'a>, ParseError>>>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("source", &self.source)
            .field("position", &self.inner.span().end)
            .finish()
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Zero-width span at the end of input, used for EOF errors
    pub fn eof_span(&self) -> Span {
        let end = self.source.len();
        self.source_map.span(end, end)
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            let next = self.lex();
            self.peeked = Some(next);
        }
        self.peeked.as_ref().and_then(|t| t.as_ref())
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        let result = self.inner.next()?;
        let range = self.inner.span();
        let span = self.source_map.span(range.start, range.end);

        Some(match result {
            Ok(token) => Ok(SpannedToken::new(token, span, &self.source[range])),
            Err(()) => Err(ParseError::LexerError { span }),
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<SpannedToken<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a type string
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans() {
        let tokens: Vec<_> = tokenize("3, var,\n  int32")
            .into_iter()
            .map(|t| t.unwrap())
            .collect();

        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[2].token, Token::KwVar);
        assert_eq!(tokens[2].span.start, 3);
        assert_eq!(tokens[4].text, "int32");
        assert_eq!((tokens[4].span.line, tokens[4].span.column), (2, 3));
    }

    #[test]
    fn test_peek_then_next() {
        let mut lexer = Lexer::new("N * bool");
        assert_eq!(lexer.peek().unwrap().as_ref().unwrap().text, "N");
        assert_eq!(lexer.next_token().unwrap().unwrap().text, "N");
        assert_eq!(lexer.next_token().unwrap().unwrap().token, Token::Star);
        assert_eq!(lexer.next_token().unwrap().unwrap().text, "bool");
        assert!(lexer.peek().is_none());
        assert!(lexer.next_token().is_none());
    }

    #[test]
    fn test_lexer_error_span() {
        let err = tokenize("3, @int32")
            .into_iter()
            .find_map(|t| t.err())
            .unwrap();
        assert_eq!(err.span().start, 3);
    }
}
