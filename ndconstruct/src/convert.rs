//! Lossless scalar conversion
//!
//! Input scalars are converted to the element kind of the target leaf.
//! Any conversion that would change the value is a `TypeUnificationError`.

use half::f16;
use ndconstruct_parser::{LeafType, ScalarKind, StringEncoding, StringType};
use ndconstruct_storage::{ElementKind, Scalar};
use num_traits::ToPrimitive;

use crate::classify::ScalarRef;
use crate::error::{ConstructError, ConstructResult};
use crate::value::Value;

/// Storage kind of a string leaf
pub fn string_element_kind(ty: &StringType) -> ElementKind {
    match ty.fixed_width {
        Some(width) => ElementKind::FixedBytes(width * ty.encoding.code_unit_size()),
        None => ElementKind::String,
    }
}

pub fn scalar_element_kind(kind: ScalarKind) -> ElementKind {
    match kind {
        ScalarKind::Bool => ElementKind::Bool,
        ScalarKind::Int8 => ElementKind::Int8,
        ScalarKind::Int16 => ElementKind::Int16,
        ScalarKind::Int32 => ElementKind::Int32,
        ScalarKind::Int64 => ElementKind::Int64,
        ScalarKind::UInt8 => ElementKind::UInt8,
        ScalarKind::UInt16 => ElementKind::UInt16,
        ScalarKind::UInt32 => ElementKind::UInt32,
        ScalarKind::UInt64 => ElementKind::UInt64,
        ScalarKind::Float16 => ElementKind::Float16,
        ScalarKind::Float32 => ElementKind::Float32,
        ScalarKind::Float64 => ElementKind::Float64,
        ScalarKind::ComplexFloat32 => ElementKind::ComplexFloat32,
        ScalarKind::ComplexFloat64 => ElementKind::ComplexFloat64,
    }
}

fn lossy(value: ScalarRef<'_>, target: impl std::fmt::Display) -> ConstructError {
    let shown = match value {
        ScalarRef::Bool(b) => b.to_string(),
        ScalarRef::Int(i) => i.to_string(),
        ScalarRef::Float(f) => f.to_string(),
        ScalarRef::Complex(re, im) => format!("{}{:+}im", re, im),
        ScalarRef::Str(s) => format!("{:?}", s),
    };
    ConstructError::type_unification(format!(
        "cannot convert {} {} to {} without loss",
        value.type_name(),
        shown,
        target
    ))
}

/// Convert a scalar to a leaf's storage representation
pub fn convert(value: ScalarRef<'_>, leaf: &LeafType) -> ConstructResult<Scalar> {
    match leaf {
        LeafType::Scalar(kind) => convert_scalar(value, *kind),
        LeafType::String(ty) => match value {
            ScalarRef::Str(s) => encode_string(s, ty),
            _ => Err(lossy(value, ty)),
        },
        LeafType::Struct(st) => Err(ConstructError::type_unification(format!(
            "expected a record for struct {}, found {} scalar",
            st,
            value.type_name()
        ))),
    }
}

/// Real part of a numeric scalar, when it has no imaginary component
fn real(value: ScalarRef<'_>) -> Option<Real> {
    match value {
        ScalarRef::Bool(b) => Some(Real::Int(i128::from(b))),
        ScalarRef::Int(i) => Some(Real::Int(i)),
        ScalarRef::Float(f) => Some(Real::Float(f)),
        ScalarRef::Complex(re, im) if im == 0.0 => Some(Real::Float(re)),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Real {
    Int(i128),
    Float(f64),
}

impl Real {
    /// Exact integer value, if there is one
    fn integral(self) -> Option<i128> {
        match self {
            Real::Int(i) => Some(i),
            Real::Float(f) if f.is_finite() && f.fract() == 0.0 => f.to_i128(),
            Real::Float(_) => None,
        }
    }

    /// Exact `f64` value, if there is one
    fn to_f64_exact(self) -> Option<f64> {
        match self {
            Real::Int(i) => {
                let f = i.to_f64()?;
                (f.to_i128() == Some(i)).then_some(f)
            }
            Real::Float(f) => Some(f),
        }
    }
}

/// Narrow an `f64` to `f32`, rejecting finite values that overflow
fn narrow_f32(f: f64) -> Option<f32> {
    let n = f as f32;
    (n.is_finite() || !f.is_finite()).then_some(n)
}

fn narrow_f16(f: f64) -> Option<f16> {
    let n = f16::from_f64(f);
    (n.is_finite() || !f.is_finite()).then_some(n)
}

pub fn convert_scalar(value: ScalarRef<'_>, kind: ScalarKind) -> ConstructResult<Scalar> {
    let converted = match kind {
        ScalarKind::Bool => match value {
            ScalarRef::Bool(b) => Some(Scalar::Bool(b)),
            ScalarRef::Int(0) => Some(Scalar::Bool(false)),
            ScalarRef::Int(1) => Some(Scalar::Bool(true)),
            _ => None,
        },
        ScalarKind::Int8 => real(value).and_then(Real::integral).and_then(|i| i.to_i8()).map(Scalar::I8),
        ScalarKind::Int16 => real(value).and_then(Real::integral).and_then(|i| i.to_i16()).map(Scalar::I16),
        ScalarKind::Int32 => real(value).and_then(Real::integral).and_then(|i| i.to_i32()).map(Scalar::I32),
        ScalarKind::Int64 => real(value).and_then(Real::integral).and_then(|i| i.to_i64()).map(Scalar::I64),
        ScalarKind::UInt8 => real(value).and_then(Real::integral).and_then(|i| i.to_u8()).map(Scalar::U8),
        ScalarKind::UInt16 => real(value).and_then(Real::integral).and_then(|i| i.to_u16()).map(Scalar::U16),
        ScalarKind::UInt32 => real(value).and_then(Real::integral).and_then(|i| i.to_u32()).map(Scalar::U32),
        ScalarKind::UInt64 => real(value).and_then(Real::integral).and_then(|i| i.to_u64()).map(Scalar::U64),
        ScalarKind::Float16 => real(value)
            .and_then(Real::to_f64_exact)
            .and_then(narrow_f16)
            .map(Scalar::F16),
        ScalarKind::Float32 => real(value)
            .and_then(Real::to_f64_exact)
            .and_then(narrow_f32)
            .map(Scalar::F32),
        ScalarKind::Float64 => real(value).and_then(Real::to_f64_exact).map(Scalar::F64),
        ScalarKind::ComplexFloat32 => complex_parts(value)
            .and_then(|(re, im)| Some((narrow_f32(re)?, narrow_f32(im)?)))
            .map(|(re, im)| Scalar::C32(re, im)),
        ScalarKind::ComplexFloat64 => {
            complex_parts(value).map(|(re, im)| Scalar::C64(re, im))
        }
    };
    converted.ok_or_else(|| lossy(value, kind))
}

fn complex_parts(value: ScalarRef<'_>) -> Option<(f64, f64)> {
    match value {
        ScalarRef::Complex(re, im) => Some((re, im)),
        ScalarRef::Str(_) => None,
        _ => Some((real(value)?.to_f64_exact()?, 0.0)),
    }
}

/// Encode text into a string leaf's representation
///
/// Variable-width strings are stored verbatim. Fixed-width strings are
/// stored as little-endian code units, zero padded to the declared width.
pub fn encode_string(text: &str, ty: &StringType) -> ConstructResult<Scalar> {
    if ty.encoding == StringEncoding::Ascii && !text.is_ascii() {
        return Err(ConstructError::type_unification(format!(
            "string {:?} is not ASCII",
            text
        )));
    }
    let Some(width) = ty.fixed_width else {
        return Ok(Scalar::Str(text.to_string()));
    };

    let mut bytes: Vec<u8> = match ty.encoding {
        StringEncoding::Ascii | StringEncoding::Utf8 => text.as_bytes().to_vec(),
        StringEncoding::Utf16 => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        StringEncoding::Utf32 => text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect(),
    };
    let unit = ty.encoding.code_unit_size();
    let units = bytes.len() / unit;
    if units > width {
        return Err(ConstructError::type_unification(format!(
            "string {:?} has {} code units, more than the fixed width of {}",
            text, units, width
        )));
    }
    bytes.resize(width * unit, 0);
    Ok(Scalar::Bytes(bytes))
}

/// Decode a fixed-width string, dropping trailing zero code units
pub fn decode_fixed(bytes: &[u8], encoding: StringEncoding) -> ConstructResult<String> {
    let invalid = || {
        ConstructError::Layout(format!("stored {} string is not valid", encoding.name()))
    };
    match encoding {
        StringEncoding::Ascii | StringEncoding::Utf8 => {
            let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
            String::from_utf8(bytes[..end].to_vec()).map_err(|_| invalid())
        }
        StringEncoding::Utf16 => {
            let mut units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            while units.last() == Some(&0) {
                units.pop();
            }
            String::from_utf16(&units).map_err(|_| invalid())
        }
        StringEncoding::Utf32 => {
            let mut units: Vec<u32> = bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            while units.last() == Some(&0) {
                units.pop();
            }
            units
                .into_iter()
                .map(|u| char::from_u32(u).ok_or_else(invalid))
                .collect()
        }
    }
}

/// Read a stored element back as a `Value`
pub fn scalar_to_value(scalar: Scalar, leaf: &LeafType) -> ConstructResult<Value> {
    Ok(match scalar {
        Scalar::Bool(b) => Value::Bool(b),
        Scalar::I8(x) => Value::Int(x.into()),
        Scalar::I16(x) => Value::Int(x.into()),
        Scalar::I32(x) => Value::Int(x.into()),
        Scalar::I64(x) => Value::Int(x.into()),
        Scalar::U8(x) => Value::Int(x.into()),
        Scalar::U16(x) => Value::Int(x.into()),
        Scalar::U32(x) => Value::Int(x.into()),
        Scalar::U64(x) => Value::Int(x.into()),
        Scalar::F16(x) => Value::Float(x.to_f64()),
        Scalar::F32(x) => Value::Float(x.into()),
        Scalar::F64(x) => Value::Float(x),
        Scalar::C32(re, im) => Value::Complex(re.into(), im.into()),
        Scalar::C64(re, im) => Value::Complex(re, im),
        Scalar::Str(s) => Value::Str(s),
        Scalar::Bytes(bytes) => {
            let encoding = match leaf {
                LeafType::String(ty) => ty.encoding,
                _ => StringEncoding::Utf8,
            };
            Value::Str(decode_fixed(&bytes, encoding)?)
        }
    })
}
