//! Type unification
//!
//! Combines a probed shape with the caller's hint into the one descriptor
//! the array is materialized as.

use ndconstruct_parser::{
    Dimension, LeafType, ScalarKind, StringEncoding, StringType, StructField, StructType,
    TypeDescriptor,
};

use crate::config::{ConstructConfig, IntegerWidth};
use crate::error::{ConstructError, ConstructResult, Found};
use crate::probe::{Extent, LeafSample, LevelProbe, ProbeMode, ProbedShape};

/// Resolve the final descriptor
pub fn unify(
    shape: &ProbedShape,
    mode: ProbeMode<'_>,
    config: &ConstructConfig,
) -> ConstructResult<TypeDescriptor> {
    match mode {
        ProbeMode::Full(ty) => {
            check_hinted_dims(shape, ty)?;
            Ok(ty.clone())
        }
        ProbeMode::Uniform(leaf) => Ok(TypeDescriptor {
            dims: infer_dims(shape),
            leaf: leaf.clone(),
        }),
        ProbeMode::Infer => infer(shape, config),
    }
}

fn infer(shape: &ProbedShape, config: &ConstructConfig) -> ConstructResult<TypeDescriptor> {
    Ok(TypeDescriptor {
        dims: infer_dims(shape),
        leaf: infer_leaf(&shape.leaf, config)?,
    })
}

/// Hinted extents must match what the data shows; iterator levels are
/// checked later, while they are pulled.
fn check_hinted_dims(shape: &ProbedShape, ty: &TypeDescriptor) -> ConstructResult<()> {
    for (depth, dim) in ty.dims.iter().enumerate() {
        let Some(level) = shape.levels.get(depth) else {
            break;
        };
        match dim {
            Dimension::Fixed(n) => check_extent(level, depth, *n)?,
            Dimension::Strided => {
                if level.from_iterator {
                    return Err(ConstructError::unsupported(format!(
                        "strided dimension {} cannot be sourced from an iterator",
                        depth
                    )));
                }
                if let Extent::Irregular { min, max } = level.extent {
                    return Err(ConstructError::shape(format!(
                        "strided dimension {} requires a uniform extent, found lengths {} to {}",
                        depth, min, max
                    )));
                }
            }
            Dimension::Var => {}
        }
    }
    Ok(())
}

fn check_extent(level: &LevelProbe, depth: usize, expected: usize) -> ConstructResult<()> {
    let (min, max) = match level.extent {
        Extent::Unseen => return Ok(()),
        Extent::AllEqual(n) => (n, n),
        Extent::Irregular { min, max } => (min, max),
    };
    if min < expected {
        Err(ConstructError::TooFew {
            depth,
            expected,
            found: min,
        })
    } else if max > expected {
        Err(ConstructError::TooMany {
            depth,
            expected,
            found: Found::Exactly(max),
        })
    } else {
        Ok(())
    }
}

fn infer_dims(shape: &ProbedShape) -> Vec<Dimension> {
    (0..shape.ndim())
        .map(|depth| match shape.levels.get(depth) {
            Some(level) if level.from_iterator || level.partial => Dimension::Var,
            Some(LevelProbe {
                extent: Extent::AllEqual(n),
                ..
            }) => Dimension::Fixed(*n),
            Some(LevelProbe {
                extent: Extent::Irregular { .. },
                ..
            }) => Dimension::Var,
            _ => Dimension::Fixed(0),
        })
        .collect()
}

fn infer_leaf(sample: &LeafSample, config: &ConstructConfig) -> ConstructResult<LeafType> {
    Ok(match sample {
        LeafSample::None => config.default_leaf.clone(),
        LeafSample::Bool => LeafType::Scalar(ScalarKind::Bool),
        LeafSample::Int { min, max } => LeafType::Scalar(integer_kind(*min, *max, config)?),
        LeafSample::Float => LeafType::Scalar(ScalarKind::Float64),
        LeafSample::Complex => LeafType::Scalar(ScalarKind::ComplexFloat64),
        LeafSample::String => LeafType::String(StringType::variable(StringEncoding::Utf8)),
        LeafSample::Struct(fields) => {
            let fields = fields
                .iter()
                .map(|(name, shape)| Ok(StructField::new(name.clone(), infer(shape, config)?)))
                .collect::<ConstructResult<Vec<_>>>()?;
            let st = StructType::new(fields).map_err(|name| {
                ConstructError::type_unification(format!("duplicate inferred field '{}'", name))
            })?;
            LeafType::Struct(st)
        }
    })
}

/// Narrowest integer kind (not below the configured width) holding `min..=max`
fn integer_kind(min: i128, max: i128, config: &ConstructConfig) -> ConstructResult<ScalarKind> {
    let fits = |lo: i128, hi: i128| min >= lo && max <= hi;

    if config.integer_width == IntegerWidth::Int32
        && fits(i128::from(i32::MIN), i128::from(i32::MAX))
    {
        Ok(ScalarKind::Int32)
    } else if fits(i128::from(i64::MIN), i128::from(i64::MAX)) {
        Ok(ScalarKind::Int64)
    } else if fits(0, i128::from(u64::MAX)) {
        Ok(ScalarKind::UInt64)
    } else {
        Err(ConstructError::type_unification(format!(
            "integers in range {}..={} do not fit any 64-bit integer type",
            min, max
        )))
    }
}
