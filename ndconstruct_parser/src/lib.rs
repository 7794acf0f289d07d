//! ndconstruct_parser
//!
//! Parser and model for the array type-descriptor strings used as
//! construction hints, e.g. `3, var, int32` or
//! `N, {name: string; scores: var, float64}`.
//!
//! # Example
//!
//! ```
//! use ndconstruct_parser::{parse_type, Dimension, LeafType, ScalarKind};
//!
//! let ty = parse_type("3, var, int32").expect("parse failed");
//!
//! assert_eq!(ty.dims, vec![Dimension::Fixed(3), Dimension::Var]);
//! assert_eq!(ty.leaf, LeafType::Scalar(ScalarKind::Int32));
//! assert_eq!(ty.to_string(), "3, var, int32");
//! ```

pub mod descriptor;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

// Re-exports
pub use descriptor::{
    Dimension, LeafType, ScalarKind, StringEncoding, StringType, StructField, StructType,
    TypeDescriptor,
};
pub use error::{ParseError, ParseResult};
pub use lexer::{tokenize, Lexer, SpannedToken};
pub use parser::Parser;
pub use span::{SourceMap, Span};
pub use token::Token;

/// Parse a full type descriptor (dimensions and leaf)
///
/// # Example
///
/// ```
/// use ndconstruct_parser::parse_type;
///
/// let ty = parse_type("M * string(4, 'A')").unwrap();
/// assert_eq!(ty.to_string(), "strided, string(4, \"A\")");
/// ```
pub fn parse_type(source: &str) -> ParseResult<TypeDescriptor> {
    Parser::new(source)?.parse_type()
}

/// Parse a leaf type; any dimension is an error
pub fn parse_leaf(source: &str) -> ParseResult<LeafType> {
    Parser::new(source)?.parse_leaf()
}
