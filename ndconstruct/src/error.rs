//! Construction error types
//!
//! Every failure aborts the whole construction. Display strings carry the
//! error kind as a prefix (`BroadcastError: ...`) so messages stay greppable
//! when they are surfaced through a host binding.

use std::fmt;

use ndconstruct_parser::ParseError;
use ndconstruct_storage::StorageError;
use thiserror::Error;

/// How many elements were observed when a count check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Exactly(usize),
    /// Iterator sources stop being pulled as soon as the limit is crossed
    AtLeast(usize),
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Exactly(n) => write!(f, "{}", n),
            Found::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Coarse error category, stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShapeMismatch,
    FieldMismatch,
    TypeUnification,
    UnsupportedSource,
    Parse,
    Config,
    Storage,
}

/// Construction error type
#[derive(Debug, Error)]
pub enum ConstructError {
    /// Fewer elements than a fixed or strided extent requires
    #[error("BroadcastError: too few elements at dimension {depth}: expected {expected}, found {found}")]
    TooFew {
        depth: usize,
        expected: usize,
        found: usize,
    },

    /// More elements than a fixed or strided extent allows
    #[error("BroadcastError: too many elements at dimension {depth}: expected {expected}, found {found}")]
    TooMany {
        depth: usize,
        expected: usize,
        found: Found,
    },

    /// Nesting that cannot be mapped onto the dimensions
    #[error("BroadcastError: {0}")]
    Shape(String),

    /// Mapping key with no matching struct field
    #[error("FieldMismatchError: input mapping has key '{key}' but struct {ty} has no such field")]
    UndeclaredField { key: String, ty: String },

    /// Struct field absent from a mapping record
    #[error("FieldMismatchError: input mapping is missing field '{field}' of struct {ty}")]
    MissingField { field: String, ty: String },

    /// Positional record whose length differs from the field count
    #[error("FieldMismatchError: struct {ty} has {expected} fields, record has {found}")]
    FieldCount {
        ty: String,
        expected: usize,
        found: Found,
    },

    /// Projection through a field that does not exist
    #[error("FieldMismatchError: type {ty} has no field '{field}'")]
    NoSuchField { field: String, ty: String },

    #[error("TypeUnificationError: {0}")]
    TypeUnification(String),

    #[error("UnsupportedSourceError: {0}")]
    UnsupportedSource(String),

    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),

    #[error("ConfigError: {0}")]
    Config(String),

    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),

    /// Stored blocks do not match the array's type
    #[error("StorageError: corrupt layout: {0}")]
    Layout(String),
}

impl ConstructError {
    /// Create a shape mismatch error
    pub fn shape<S: Into<String>>(msg: S) -> Self {
        ConstructError::Shape(msg.into())
    }

    /// Create a type unification error
    pub fn type_unification<S: Into<String>>(msg: S) -> Self {
        ConstructError::TypeUnification(msg.into())
    }

    /// Create an unsupported source error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        ConstructError::UnsupportedSource(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ConstructError::Config(msg.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConstructError::TooFew { .. }
            | ConstructError::TooMany { .. }
            | ConstructError::Shape(_) => ErrorKind::ShapeMismatch,
            ConstructError::UndeclaredField { .. }
            | ConstructError::MissingField { .. }
            | ConstructError::FieldCount { .. }
            | ConstructError::NoSuchField { .. } => ErrorKind::FieldMismatch,
            ConstructError::TypeUnification(_) => ErrorKind::TypeUnification,
            ConstructError::UnsupportedSource(_) => ErrorKind::UnsupportedSource,
            ConstructError::Parse(_) => ErrorKind::Parse,
            ConstructError::Config(_) => ErrorKind::Config,
            ConstructError::Storage(_) | ConstructError::Layout(_) => ErrorKind::Storage,
        }
    }
}

/// Result type alias for construction
pub type ConstructResult<T> = Result<T, ConstructError>;
