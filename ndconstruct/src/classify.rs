//! Value classification
//!
//! `classify` is the one place that decides how a nested value is treated:
//! as a scalar, a sequence, a mapping, or a lazy iterator. Strings and
//! booleans are scalars.

use std::fmt;

use indexmap::IndexMap;

use crate::value::{Value, ValueIter};

/// Coarse category of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Scalar,
    Sequence,
    Mapping,
    Iterator,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Scalar => write!(f, "scalar"),
            Classification::Sequence => write!(f, "sequence"),
            Classification::Mapping => write!(f, "mapping"),
            Classification::Iterator => write!(f, "iterator"),
        }
    }
}

/// Borrowed view of a scalar value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarRef<'a> {
    Bool(bool),
    Int(i128),
    Float(f64),
    Complex(f64, f64),
    Str(&'a str),
}

impl ScalarRef<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarRef::Bool(_) => "bool",
            ScalarRef::Int(_) => "int",
            ScalarRef::Float(_) => "float",
            ScalarRef::Complex(..) => "complex",
            ScalarRef::Str(_) => "string",
        }
    }
}

/// Classified view of a value
///
/// Iterators are handed out by `&mut` so the caller keeps the only pull
/// cursor.
#[derive(Debug)]
pub enum Classified<'a> {
    Scalar(ScalarRef<'a>),
    Sequence {
        items: &'a mut Vec<Value>,
        /// Tuples double as positional records
        tuple: bool,
    },
    Mapping(&'a mut IndexMap<String, Value>),
    Iterator(&'a mut ValueIter),
}

impl Classified<'_> {
    pub fn classification(&self) -> Classification {
        match self {
            Classified::Scalar(_) => Classification::Scalar,
            Classified::Sequence { .. } => Classification::Sequence,
            Classified::Mapping(_) => Classification::Mapping,
            Classified::Iterator(_) => Classification::Iterator,
        }
    }
}

/// Classify a value
pub fn classify(value: &mut Value) -> Classified<'_> {
    match value {
        Value::Bool(b) => Classified::Scalar(ScalarRef::Bool(*b)),
        Value::Int(i) => Classified::Scalar(ScalarRef::Int(*i)),
        Value::Float(f) => Classified::Scalar(ScalarRef::Float(*f)),
        Value::Complex(re, im) => Classified::Scalar(ScalarRef::Complex(*re, *im)),
        Value::Str(s) => Classified::Scalar(ScalarRef::Str(s)),
        Value::List(items) => Classified::Sequence {
            items,
            tuple: false,
        },
        Value::Tuple(items) => Classified::Sequence { items, tuple: true },
        Value::Dict(map) => Classified::Mapping(map),
        Value::Iter(it) => Classified::Iterator(it),
    }
}

impl Value {
    /// Category of this value without borrowing it mutably
    pub fn classification(&self) -> Classification {
        match self {
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Complex(..) | Value::Str(_) => {
                Classification::Scalar
            }
            Value::List(_) | Value::Tuple(_) => Classification::Sequence,
            Value::Dict(_) => Classification::Mapping,
            Value::Iter(_) => Classification::Iterator,
        }
    }
}

/// Element of a dimension: borrowed from a sequence or pulled from an iterator
#[derive(Debug)]
pub enum Child<'a> {
    Borrowed(&'a mut Value),
    Owned(Value),
}

impl Child<'_> {
    pub fn value(&mut self) -> &mut Value {
        match self {
            Child::Borrowed(v) => v,
            Child::Owned(v) => v,
        }
    }
}

/// Elements of a value used as a dimension, in source order
#[derive(Debug)]
pub enum Children<'a> {
    Sequence(std::slice::IterMut<'a, Value>),
    Iterator(&'a mut ValueIter),
}

impl<'a> Children<'a> {
    /// Remaining length if it is known without pulling
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            Children::Sequence(items) => Some(items.len()),
            Children::Iterator(it) => it.known_len(),
        }
    }

    pub fn is_iterator(&self) -> bool {
        matches!(self, Children::Iterator(_))
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = Child<'a>;

    fn next(&mut self) -> Option<Child<'a>> {
        match self {
            Children::Sequence(items) => items.next().map(Child::Borrowed),
            Children::Iterator(it) => it.next().map(Child::Owned),
        }
    }
}
