//! Type-segregated column storage
//!
//! A `Column` holds one homogeneous run of elements without boxing. Fixed
//! width strings are packed back to back in a single byte buffer.

use half::f16;

use crate::element::{ElementKind, Scalar};
use crate::error::{StorageError, StorageResult};

/// Homogeneous element storage
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F16(Vec<f16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    C32(Vec<(f32, f32)>),
    C64(Vec<(f64, f64)>),
    Str(Vec<String>),
    /// `len` elements of `width` bytes each, packed in `data`
    FixedBytes {
        width: usize,
        len: usize,
        data: Vec<u8>,
    },
}

/// Apply an expression to the inner `Vec` of every vector-backed variant,
/// with a separate arm for packed fixed-width bytes.
macro_rules! column_dispatch {
    ($col:expr, $v:ident => $body:expr, fixed($w:ident, $n:ident, $d:ident) => $fixed:expr) => {
        match $col {
            Column::Bool($v) => $body,
            Column::I8($v) => $body,
            Column::I16($v) => $body,
            Column::I32($v) => $body,
            Column::I64($v) => $body,
            Column::U8($v) => $body,
            Column::U16($v) => $body,
            Column::U32($v) => $body,
            Column::U64($v) => $body,
            Column::F16($v) => $body,
            Column::F32($v) => $body,
            Column::F64($v) => $body,
            Column::C32($v) => $body,
            Column::C64($v) => $body,
            Column::Str($v) => $body,
            Column::FixedBytes {
                width: $w,
                len: $n,
                data: $d,
            } => $fixed,
        }
    };
}

impl Column {
    /// Create an empty column with room for `capacity` elements
    pub fn with_capacity(kind: ElementKind, capacity: usize) -> Self {
        match kind {
            ElementKind::Bool => Column::Bool(Vec::with_capacity(capacity)),
            ElementKind::Int8 => Column::I8(Vec::with_capacity(capacity)),
            ElementKind::Int16 => Column::I16(Vec::with_capacity(capacity)),
            ElementKind::Int32 => Column::I32(Vec::with_capacity(capacity)),
            ElementKind::Int64 => Column::I64(Vec::with_capacity(capacity)),
            ElementKind::UInt8 => Column::U8(Vec::with_capacity(capacity)),
            ElementKind::UInt16 => Column::U16(Vec::with_capacity(capacity)),
            ElementKind::UInt32 => Column::U32(Vec::with_capacity(capacity)),
            ElementKind::UInt64 => Column::U64(Vec::with_capacity(capacity)),
            ElementKind::Float16 => Column::F16(Vec::with_capacity(capacity)),
            ElementKind::Float32 => Column::F32(Vec::with_capacity(capacity)),
            ElementKind::Float64 => Column::F64(Vec::with_capacity(capacity)),
            ElementKind::ComplexFloat32 => Column::C32(Vec::with_capacity(capacity)),
            ElementKind::ComplexFloat64 => Column::C64(Vec::with_capacity(capacity)),
            ElementKind::String => Column::Str(Vec::with_capacity(capacity)),
            ElementKind::FixedBytes(width) => Column::FixedBytes {
                width,
                len: 0,
                data: Vec::with_capacity(capacity.saturating_mul(width)),
            },
        }
    }

    /// Element kind of this column
    pub fn kind(&self) -> ElementKind {
        match self {
            Column::Bool(_) => ElementKind::Bool,
            Column::I8(_) => ElementKind::Int8,
            Column::I16(_) => ElementKind::Int16,
            Column::I32(_) => ElementKind::Int32,
            Column::I64(_) => ElementKind::Int64,
            Column::U8(_) => ElementKind::UInt8,
            Column::U16(_) => ElementKind::UInt16,
            Column::U32(_) => ElementKind::UInt32,
            Column::U64(_) => ElementKind::UInt64,
            Column::F16(_) => ElementKind::Float16,
            Column::F32(_) => ElementKind::Float32,
            Column::F64(_) => ElementKind::Float64,
            Column::C32(_) => ElementKind::ComplexFloat32,
            Column::C64(_) => ElementKind::ComplexFloat64,
            Column::Str(_) => ElementKind::String,
            Column::FixedBytes { width, .. } => ElementKind::FixedBytes(*width),
        }
    }

    pub fn len(&self) -> usize {
        column_dispatch!(self, v => v.len(), fixed(_w, n, _d) => *n)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the column can hold without reallocating
    pub fn capacity(&self) -> usize {
        column_dispatch!(self, v => v.capacity(), fixed(w, n, d) => {
            if *w == 0 {
                *n
            } else {
                d.capacity() / *w
            }
        })
    }

    /// Bytes held by the stored elements
    pub fn byte_len(&self) -> usize {
        match self {
            Column::Str(v) => v.iter().map(String::len).sum(),
            column => column.len() * column.kind().byte_size().unwrap_or_default(),
        }
    }

    /// Reserve room for exactly `additional` more elements
    pub fn reserve_exact(&mut self, additional: usize) {
        column_dispatch!(self, v => v.reserve_exact(additional), fixed(w, _n, d) => {
            d.reserve_exact(additional * *w)
        })
    }

    pub fn shrink_to_fit(&mut self) {
        column_dispatch!(self, v => v.shrink_to_fit(), fixed(_w, _n, d) => d.shrink_to_fit())
    }

    /// Append one value, which must match the column's kind exactly
    pub fn push(&mut self, value: Scalar) -> StorageResult<()> {
        match (self, value) {
            (Column::Bool(v), Scalar::Bool(x)) => v.push(x),
            (Column::I8(v), Scalar::I8(x)) => v.push(x),
            (Column::I16(v), Scalar::I16(x)) => v.push(x),
            (Column::I32(v), Scalar::I32(x)) => v.push(x),
            (Column::I64(v), Scalar::I64(x)) => v.push(x),
            (Column::U8(v), Scalar::U8(x)) => v.push(x),
            (Column::U16(v), Scalar::U16(x)) => v.push(x),
            (Column::U32(v), Scalar::U32(x)) => v.push(x),
            (Column::U64(v), Scalar::U64(x)) => v.push(x),
            (Column::F16(v), Scalar::F16(x)) => v.push(x),
            (Column::F32(v), Scalar::F32(x)) => v.push(x),
            (Column::F64(v), Scalar::F64(x)) => v.push(x),
            (Column::C32(v), Scalar::C32(re, im)) => v.push((re, im)),
            (Column::C64(v), Scalar::C64(re, im)) => v.push((re, im)),
            (Column::Str(v), Scalar::Str(x)) => v.push(x),
            (Column::FixedBytes { width, len, data }, Scalar::Bytes(bytes))
                if bytes.len() == *width =>
            {
                data.extend_from_slice(&bytes);
                *len += 1;
            }
            (column, value) => {
                return Err(StorageError::KindMismatch {
                    expected: column.kind(),
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Read back the element at `index`
    pub fn get(&self, index: usize) -> Option<Scalar> {
        Some(match self {
            Column::Bool(v) => Scalar::Bool(*v.get(index)?),
            Column::I8(v) => Scalar::I8(*v.get(index)?),
            Column::I16(v) => Scalar::I16(*v.get(index)?),
            Column::I32(v) => Scalar::I32(*v.get(index)?),
            Column::I64(v) => Scalar::I64(*v.get(index)?),
            Column::U8(v) => Scalar::U8(*v.get(index)?),
            Column::U16(v) => Scalar::U16(*v.get(index)?),
            Column::U32(v) => Scalar::U32(*v.get(index)?),
            Column::U64(v) => Scalar::U64(*v.get(index)?),
            Column::F16(v) => Scalar::F16(*v.get(index)?),
            Column::F32(v) => Scalar::F32(*v.get(index)?),
            Column::F64(v) => Scalar::F64(*v.get(index)?),
            Column::C32(v) => {
                let (re, im) = *v.get(index)?;
                Scalar::C32(re, im)
            }
            Column::C64(v) => {
                let (re, im) = *v.get(index)?;
                Scalar::C64(re, im)
            }
            Column::Str(v) => Scalar::Str(v.get(index)?.clone()),
            Column::FixedBytes { width, len, data } => {
                if index >= *len {
                    return None;
                }
                Scalar::Bytes(data[index * width..(index + 1) * width].to_vec())
            }
        })
    }

    /// Iterate over all stored elements
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}
