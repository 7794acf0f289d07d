//! Type descriptor model
//!
//! A [`TypeDescriptor`] is an ordered list of dimensions (outermost first)
//! followed by a [`LeafType`]. Zero dimensions describe a scalar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One dimension of an array type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Every element at this level has exactly `n` children
    Fixed(usize),
    /// Uniform extent discovered from the data
    Strided,
    /// Per-element lengths
    Var,
}

impl Dimension {
    pub fn is_var(&self) -> bool {
        matches!(self, Dimension::Var)
    }

    /// Extent if it is known from the type alone
    pub fn fixed_extent(&self) -> Option<usize> {
        match self {
            Dimension::Fixed(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Fixed(n) => write!(f, "{}", n),
            Dimension::Strided => write!(f, "strided"),
            Dimension::Var => write!(f, "var"),
        }
    }
}

/// Primitive scalar element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
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
    /// Complex with 32-bit float components
    ComplexFloat32,
    /// Complex with 64-bit float components
    ComplexFloat64,
}

impl ScalarKind {
    /// Look up a scalar kind by its type-string name
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => ScalarKind::Bool,
            "int8" => ScalarKind::Int8,
            "int16" => ScalarKind::Int16,
            "int32" => ScalarKind::Int32,
            "int64" => ScalarKind::Int64,
            "uint8" => ScalarKind::UInt8,
            "uint16" => ScalarKind::UInt16,
            "uint32" => ScalarKind::UInt32,
            "uint64" => ScalarKind::UInt64,
            "float16" => ScalarKind::Float16,
            "float32" => ScalarKind::Float32,
            "float64" => ScalarKind::Float64,
            "cfloat32" | "complex64" => ScalarKind::ComplexFloat32,
            "cfloat64" | "complex128" | "complex" => ScalarKind::ComplexFloat64,
            _ => return None,
        })
    }

    /// Canonical type-string name
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float16 => "float16",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::ComplexFloat32 => "cfloat32",
            ScalarKind::ComplexFloat64 => "cfloat64",
        }
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64
        )
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32 | ScalarKind::UInt64
        )
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_float(&self) -> bool {
        matches!(
            self,
            ScalarKind::Float16 | ScalarKind::Float32 | ScalarKind::Float64
        )
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, ScalarKind::ComplexFloat32 | ScalarKind::ComplexFloat64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Character encoding of a string leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StringEncoding {
    Ascii,
    #[default]
    Utf8,
    Utf16,
    Utf32,
}

impl StringEncoding {
    /// Look up an encoding by any of its accepted names
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "A" | "ascii" | "us-ascii" => StringEncoding::Ascii,
            "U8" | "utf8" | "utf-8" => StringEncoding::Utf8,
            "U16" | "utf16" | "utf-16" => StringEncoding::Utf16,
            "U32" | "utf32" | "utf-32" => StringEncoding::Utf32,
            _ => return None,
        })
    }

    /// Short canonical name used in type strings
    pub fn name(&self) -> &'static str {
        match self {
            StringEncoding::Ascii => "A",
            StringEncoding::Utf8 => "U8",
            StringEncoding::Utf16 => "U16",
            StringEncoding::Utf32 => "U32",
        }
    }

    /// Size in bytes of one code unit
    pub fn code_unit_size(&self) -> usize {
        match self {
            StringEncoding::Ascii | StringEncoding::Utf8 => 1,
            StringEncoding::Utf16 => 2,
            StringEncoding::Utf32 => 4,
        }
    }
}

/// String leaf: an encoding and an optional fixed width in code units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StringType {
    pub encoding: StringEncoding,
    pub fixed_width: Option<usize>,
}

impl StringType {
    /// Variable-width string in the given encoding
    pub fn variable(encoding: StringEncoding) -> Self {
        Self {
            encoding,
            fixed_width: None,
        }
    }

    /// Fixed-width string of `width` code units
    pub fn fixed(width: usize, encoding: StringEncoding) -> Self {
        Self {
            encoding,
            fixed_width: Some(width),
        }
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.fixed_width, self.encoding) {
            (None, StringEncoding::Utf8) => write!(f, "string"),
            (None, enc) => write!(f, "string(\"{}\")", enc.name()),
            (Some(w), StringEncoding::Utf8) => write!(f, "string({})", w),
            (Some(w), enc) => write!(f, "string({}, \"{}\")", w, enc.name()),
        }
    }
}

/// A named struct field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl StructField {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Struct leaf with ordered, uniquely named fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StructType {
    fields: Vec<StructField>,
}

impl StructType {
    /// Build a struct type, returning the first repeated name on conflict
    pub fn new(fields: Vec<StructField>) -> Result<Self, String> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(field.name.clone());
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[StructField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field.name, field.ty)?;
        }
        write!(f, "}}")
    }
}

/// Element type of an array
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafType {
    Scalar(ScalarKind),
    String(StringType),
    Struct(StructType),
}

impl LeafType {
    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            LeafType::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, LeafType::Struct(_))
    }
}

impl From<ScalarKind> for LeafType {
    fn from(kind: ScalarKind) -> Self {
        LeafType::Scalar(kind)
    }
}

impl From<StringType> for LeafType {
    fn from(ty: StringType) -> Self {
        LeafType::String(ty)
    }
}

impl From<StructType> for LeafType {
    fn from(ty: StructType) -> Self {
        LeafType::Struct(ty)
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafType::Scalar(k) => write!(f, "{}", k),
            LeafType::String(s) => write!(f, "{}", s),
            LeafType::Struct(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for LeafType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse_leaf(s)
    }
}

/// Full array type: dimensions outer to inner, then the leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub dims: Vec<Dimension>,
    pub leaf: LeafType,
}

impl TypeDescriptor {
    pub fn new(dims: Vec<Dimension>, leaf: impl Into<LeafType>) -> Self {
        Self {
            dims,
            leaf: leaf.into(),
        }
    }

    /// Zero-dimensional descriptor
    pub fn scalar(leaf: impl Into<LeafType>) -> Self {
        Self::new(Vec::new(), leaf)
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Descriptor of the elements below the first `depth` dimensions
    pub fn inner(&self, depth: usize) -> TypeDescriptor {
        TypeDescriptor {
            dims: self.dims.get(depth..).unwrap_or_default().to_vec(),
            leaf: self.leaf.clone(),
        }
    }
}

impl From<LeafType> for TypeDescriptor {
    fn from(leaf: LeafType) -> Self {
        Self::scalar(leaf)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dim in &self.dims {
            write!(f, "{}, ", dim)?;
        }
        write!(f, "{}", self.leaf)
    }
}

impl FromStr for TypeDescriptor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse_type(s)
    }
}
