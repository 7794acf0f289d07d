//! Storable element kinds and single stored values

use std::fmt;

use half::f16;
use serde::{Deserialize, Serialize};

/// Element kind of a column
///
/// One kind per storable scalar, plus `String` for variable-width text and
/// `FixedBytes(width)` for fixed-width encoded strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    ComplexFloat32,
    ComplexFloat64,
    String,
    FixedBytes(usize),
}

impl ElementKind {
    /// Size of one element in bytes, `None` for variable-width strings
    pub fn byte_size(&self) -> Option<usize> {
        Some(match self {
            ElementKind::Bool | ElementKind::Int8 | ElementKind::UInt8 => 1,
            ElementKind::Int16 | ElementKind::UInt16 | ElementKind::Float16 => 2,
            ElementKind::Int32 | ElementKind::UInt32 | ElementKind::Float32 => 4,
            ElementKind::Int64
            | ElementKind::UInt64
            | ElementKind::Float64
            | ElementKind::ComplexFloat32 => 8,
            ElementKind::ComplexFloat64 => 16,
            ElementKind::FixedBytes(width) => *width,
            ElementKind::String => return None,
        })
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Bool => write!(f, "Bool"),
            ElementKind::Int8 => write!(f, "Int8"),
            ElementKind::Int16 => write!(f, "Int16"),
            ElementKind::Int32 => write!(f, "Int32"),
            ElementKind::Int64 => write!(f, "Int64"),
            ElementKind::UInt8 => write!(f, "UInt8"),
            ElementKind::UInt16 => write!(f, "UInt16"),
            ElementKind::UInt32 => write!(f, "UInt32"),
            ElementKind::UInt64 => write!(f, "UInt64"),
            ElementKind::Float16 => write!(f, "Float16"),
            ElementKind::Float32 => write!(f, "Float32"),
            ElementKind::Float64 => write!(f, "Float64"),
            ElementKind::ComplexFloat32 => write!(f, "ComplexF32"),
            ElementKind::ComplexFloat64 => write!(f, "ComplexF64"),
            ElementKind::String => write!(f, "String"),
            ElementKind::FixedBytes(w) => write!(f, "Bytes{{{}}}", w),
        }
    }
}

/// One stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F16(f16),
    F32(f32),
    F64(f64),
    /// Complex as (re, im)
    C32(f32, f32),
    C64(f64, f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Element kind this scalar is stored as
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::Bool(_) => ElementKind::Bool,
            Scalar::I8(_) => ElementKind::Int8,
            Scalar::I16(_) => ElementKind::Int16,
            Scalar::I32(_) => ElementKind::Int32,
            Scalar::I64(_) => ElementKind::Int64,
            Scalar::U8(_) => ElementKind::UInt8,
            Scalar::U16(_) => ElementKind::UInt16,
            Scalar::U32(_) => ElementKind::UInt32,
            Scalar::U64(_) => ElementKind::UInt64,
            Scalar::F16(_) => ElementKind::Float16,
            Scalar::F32(_) => ElementKind::Float32,
            Scalar::F64(_) => ElementKind::Float64,
            Scalar::C32(..) => ElementKind::ComplexFloat32,
            Scalar::C64(..) => ElementKind::ComplexFloat64,
            Scalar::Str(_) => ElementKind::String,
            Scalar::Bytes(b) => ElementKind::FixedBytes(b.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(Scalar::C32(1.0, 0.0).kind(), ElementKind::ComplexFloat32);
        assert_eq!(Scalar::F16(f16::from_f32(0.5)).kind(), ElementKind::Float16);
        assert_eq!(
            Scalar::Bytes(vec![b'a', 0, 0]).kind(),
            ElementKind::FixedBytes(3)
        );
    }

    #[test]
    fn test_byte_sizes() {
        assert_eq!(ElementKind::ComplexFloat64.byte_size(), Some(16));
        assert_eq!(ElementKind::FixedBytes(12).byte_size(), Some(12));
        assert_eq!(ElementKind::String.byte_size(), None);
    }
}
