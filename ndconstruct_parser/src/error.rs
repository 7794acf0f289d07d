//! Parse error types

use crate::span::Span;
use thiserror::Error;

/// Parse error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token
    #[error("unexpected token '{found}' at {span}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    /// Unexpected end of input
    #[error("unexpected end of input at {span}, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    /// Dimension size that does not fit in `usize`
    #[error("invalid dimension size '{literal}' at {span}")]
    InvalidNumber { literal: String, span: Span },

    /// Identifier in leaf position that names no known type
    #[error("unknown type '{name}' at {span}")]
    UnknownType { name: String, span: Span },

    /// String encoding name that is not recognised
    #[error("unknown string encoding '{name}' at {span}")]
    InvalidEncoding { name: String, span: Span },

    /// Struct declares the same field twice
    #[error("duplicate field '{name}' in struct type at {span}")]
    DuplicateField { name: String, span: Span },

    /// Dimensions were given where only a leaf type is allowed
    #[error("expected a leaf type without dimensions, found '{found}' at {span}")]
    UnexpectedDimensions { found: String, span: Span },

    /// Lexer error
    #[error("unrecognized token at {span}")]
    LexerError { span: Span },
}

impl ParseError {
    /// Get the span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::UnknownType { span, .. }
            | ParseError::InvalidEncoding { span, .. }
            | ParseError::DuplicateField { span, .. }
            | ParseError::UnexpectedDimensions { span, .. }
            | ParseError::LexerError { span } => span,
        }
    }

    /// Create an unexpected token error
    pub fn unexpected_token(
        found: impl Into<String>,
        expected: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    /// Format error with source context
    ///
    /// Returns the offending source line with a marker under the span.
    pub fn format_with_context(&self, source: &str) -> String {
        let span = self.span();
        let Some(line) = source.lines().nth(span.line.saturating_sub(1)) else {
            return String::new();
        };

        let col = span.column.saturating_sub(1);
        let marker = "^".repeat(span.len().min(line.len().saturating_sub(col)).max(1));

        format!(
            "  {} | {}\n  {} | {}{}",
            span.line,
            line,
            " ".repeat(span.line.to_string().len()),
            " ".repeat(col),
            marker
        )
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
