//! Construction entry point
//!
//! `construct` runs the four stages in order: probe the value's nesting,
//! unify it with the hint into one descriptor, compile a layout plan, and
//! write the value into a fresh arena.

use std::fmt;

use ndconstruct_parser::{parse_leaf, parse_type, LeafType, TypeDescriptor};
use tracing::debug;

use crate::array::ConstructedArray;
use crate::config::ConstructConfig;
use crate::error::ConstructResult;
use crate::materialize::{materialize, Plan};
use crate::probe::{probe, ProbeMode};
use crate::unify::unify;
use crate::value::Value;

/// What the caller knows about the array's type
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Hint {
    /// Everything is inferred from the data
    #[default]
    Infer,
    /// Dimensions and leaf are given; iterators are never pulled ahead
    Full(TypeDescriptor),
    /// Only the leaf is given; dimensions are inferred
    Uniform(LeafType),
}

impl Hint {
    /// Parse a full descriptor such as `"3, var, int32"`
    pub fn full(source: &str) -> ConstructResult<Self> {
        Ok(Hint::Full(parse_type(source)?))
    }

    /// Parse a leaf type such as `"{x: int32; y: float64}"`
    pub fn uniform(source: &str) -> ConstructResult<Self> {
        Ok(Hint::Uniform(parse_leaf(source)?))
    }

    fn mode(&self) -> ProbeMode<'_> {
        match self {
            Hint::Infer => ProbeMode::Infer,
            Hint::Full(ty) => ProbeMode::Full(ty),
            Hint::Uniform(leaf) => ProbeMode::Uniform(leaf),
        }
    }
}

impl From<TypeDescriptor> for Hint {
    fn from(ty: TypeDescriptor) -> Self {
        Hint::Full(ty)
    }
}

impl From<LeafType> for Hint {
    fn from(leaf: LeafType) -> Self {
        Hint::Uniform(leaf)
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Infer => write!(f, "infer"),
            Hint::Full(ty) => write!(f, "{}", ty),
            Hint::Uniform(leaf) => write!(f, "uniform {}", leaf),
        }
    }
}

/// Builds arrays under one configuration
#[derive(Debug, Clone, Default)]
pub struct Constructor {
    config: ConstructConfig,
}

impl Constructor {
    pub fn new(config: ConstructConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConstructConfig {
        &self.config
    }

    /// Build an array from `value`
    ///
    /// The value is consumed: iterators inside it are drained at most once.
    pub fn construct(&self, mut value: Value, hint: &Hint) -> ConstructResult<ConstructedArray> {
        let span = tracing::debug_span!("construct", hint = %hint);
        let _enter = span.enter();

        let mode = hint.mode();
        let shape = probe(&mut value, mode)?;
        debug!(%mode, ndim = shape.ndim(), "probed");

        let ty = unify(&shape, mode, &self.config)?;
        debug!(ty = %ty, "unified");

        let plan = Plan::compile(&ty);
        let out = materialize(&mut value, &plan, &self.config)?;
        let stats = out.arena.stats();
        debug!(
            fixed = stats.fixed_regions,
            growable = stats.growable_regions,
            reallocations = stats.reallocations,
            bytes = stats.bytes,
            "materialized"
        );

        Ok(ConstructedArray::new(ty, plan, out))
    }
}

/// Build an array with the default configuration
pub fn construct(value: Value, hint: &Hint) -> ConstructResult<ConstructedArray> {
    Constructor::default().construct(value, hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_hint_parsing() {
        assert_eq!(Hint::full("3, int32").unwrap().to_string(), "3, int32");
        assert_eq!(Hint::uniform("int8").unwrap().to_string(), "uniform int8");
        assert_eq!(Hint::full("3, int").unwrap_err().kind(), ErrorKind::Parse);
        assert_eq!(Hint::uniform("3, int8").unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_uniform_hint_infers_dims() {
        let hint = Hint::uniform("int16").unwrap();
        let arr = construct(Value::List(vec![Value::list([1, 2]), Value::list([3, 4])]), &hint).unwrap();
        assert_eq!(arr.ty().to_string(), "2, 2, int16");
    }

    #[test]
    fn test_configured_default_leaf() {
        let config = ConstructConfig::from_toml_str("default_leaf = \"string\"").unwrap();
        let arr = Constructor::new(config)
            .construct(Value::List(vec![]), &Hint::Infer)
            .unwrap();
        assert_eq!(arr.ty().to_string(), "0, string");
    }
}
