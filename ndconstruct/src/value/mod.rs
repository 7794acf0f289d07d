//! Input value model
//!
//! `Value` is the nested, heterogeneous input to construction. It is also the
//! shape a constructed array reads back as, minus `Iter`.

mod iter;
mod json;

pub use iter::ValueIter;

use indexmap::IndexMap;

/// One nested input value
#[derive(Debug)]
pub enum Value {
    Bool(bool),
    /// Wide enough for every signed and unsigned 64-bit integer
    Int(i128),
    Float(f64),
    Complex(f64, f64),
    Str(String),
    List(Vec<Value>),
    /// Sequence that also reads as a positional record
    Tuple(Vec<Value>),
    /// String-keyed mapping, in insertion order
    Dict(IndexMap<String, Value>),
    /// Lazy one-shot source
    Iter(ValueIter),
}

impl Value {
    /// Wrap a lazy source
    pub fn iter<I>(source: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Value::Iter(ValueIter::new(source))
    }

    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn dict<K: Into<String>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Name of the value's variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(..) => "complex",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Iter(_) => "iterator",
        }
    }
}

/// Structural equality; iterators never compare equal
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Complex(ar, ai), Value::Complex(br, bi)) => ar == br && ai == bi,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i128::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, i128);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Dict(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_equality_is_ordered() {
        let a = Value::dict([("x", 1), ("y", 2)]);
        let b = Value::dict([("y", 2), ("x", 1)]);
        assert_ne!(a, b);
        assert_eq!(a, Value::dict([("x", 1), ("y", 2)]));
    }

    #[test]
    fn test_iterators_never_equal() {
        let a = Value::iter(Vec::new());
        let b = Value::iter(Vec::new());
        assert_ne!(a, b);
    }

    #[test]
    fn test_list_tuple_distinct() {
        assert_ne!(Value::list([1, 2]), Value::tuple([1, 2]));
        assert_eq!(Value::from(u64::MAX), Value::Int(u64::MAX as i128));
    }
}
