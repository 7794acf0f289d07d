//! Shape probing
//!
//! Walks a nested value once and records, per nesting depth, whether every
//! container at that depth had the same length and whether any of them was
//! an iterator. In inference mode it also samples the leaves so the unifier
//! can pick an element type.
//!
//! How far iterators are consumed depends on the mode:
//!
//! - `Full`: the dimensions are given, iterators are never pulled;
//! - `Uniform`: an iterator is peeked for one element to discover the
//!   nesting below it, and everything below is marked partially observed;
//! - `Infer`: iterators are drained into their replay queue, since every
//!   leaf takes part in inference.

use std::fmt;

use indexmap::IndexMap;
use ndconstruct_parser::{LeafType, TypeDescriptor};
use tracing::trace;

use crate::classify::{classify, Classification, Classified, ScalarRef};
use crate::error::{ConstructError, ConstructResult};
use crate::value::Value;

/// Observed lengths of the containers at one depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extent {
    /// No container with a known length was seen
    #[default]
    Unseen,
    AllEqual(usize),
    Irregular { min: usize, max: usize },
}

impl Extent {
    fn observe(&mut self, len: usize) {
        *self = match *self {
            Extent::Unseen => Extent::AllEqual(len),
            Extent::AllEqual(n) if n == len => Extent::AllEqual(n),
            Extent::AllEqual(n) => Extent::Irregular {
                min: n.min(len),
                max: n.max(len),
            },
            Extent::Irregular { min, max } => Extent::Irregular {
                min: min.min(len),
                max: max.max(len),
            },
        };
    }
}

/// Summary of one depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelProbe {
    pub extent: Extent,
    /// Some container at this depth is an iterator
    pub from_iterator: bool,
    /// Some container at this depth sits below a peeked iterator
    pub partial: bool,
}

/// Leaf candidates seen so far, already joined along the promotion lattice
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LeafSample {
    #[default]
    None,
    Bool,
    Int {
        min: i128,
        max: i128,
    },
    Float,
    Complex,
    String,
    /// Inferred from mappings; one sub-probe per field in first-seen key order
    Struct(IndexMap<String, ProbedShape>),
}

impl LeafSample {
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            LeafSample::Bool => Some(0),
            LeafSample::Int { .. } => Some(1),
            LeafSample::Float => Some(2),
            LeafSample::Complex => Some(3),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LeafSample::None => "nothing",
            LeafSample::Bool => "bool",
            LeafSample::Int { .. } => "int",
            LeafSample::Float => "float",
            LeafSample::Complex => "complex",
            LeafSample::String => "string",
            LeafSample::Struct(_) => "struct",
        }
    }

    fn from_scalar(scalar: ScalarRef<'_>) -> Self {
        match scalar {
            ScalarRef::Bool(_) => LeafSample::Bool,
            ScalarRef::Int(i) => LeafSample::Int { min: i, max: i },
            ScalarRef::Float(_) => LeafSample::Float,
            ScalarRef::Complex(..) => LeafSample::Complex,
            ScalarRef::Str(_) => LeafSample::String,
        }
    }

    /// Join a scalar observation into this sample
    fn join_scalar(&mut self, scalar: ScalarRef<'_>) -> ConstructResult<()> {
        let incoming = LeafSample::from_scalar(scalar);
        let joined = match (std::mem::take(self), incoming) {
            (LeafSample::None, x) => x,
            (LeafSample::String, LeafSample::String) => LeafSample::String,
            (LeafSample::Int { min: a, max: b }, LeafSample::Int { min: c, max: d }) => {
                LeafSample::Int {
                    min: a.min(c),
                    max: b.max(d),
                }
            }
            (LeafSample::Int { min, max }, LeafSample::Bool)
            | (LeafSample::Bool, LeafSample::Int { min, max }) => LeafSample::Int {
                min: min.min(0),
                max: max.max(1),
            },
            (current, incoming) => match (current.numeric_rank(), incoming.numeric_rank()) {
                (Some(a), Some(b)) => {
                    if a >= b {
                        current
                    } else {
                        incoming
                    }
                }
                _ => {
                    return Err(ConstructError::type_unification(format!(
                        "cannot unify {} and {} leaves",
                        current.name(),
                        incoming.name()
                    )))
                }
            },
        };
        *self = joined;
        Ok(())
    }
}

/// Per-call summary of a value's nesting
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbedShape {
    /// One entry per container depth, outermost first
    pub levels: Vec<LevelProbe>,
    /// Depth at which leaves (scalars or records) were found
    pub leaf_depth: Option<usize>,
    pub leaf: LeafSample,
}

impl ProbedShape {
    /// Number of dimensions the observed nesting implies
    pub fn ndim(&self) -> usize {
        self.leaf_depth.unwrap_or(self.levels.len())
    }

    fn level_mut(&mut self, depth: usize) -> &mut LevelProbe {
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, LevelProbe::default);
        }
        &mut self.levels[depth]
    }

    fn enter_container(&mut self, depth: usize) -> ConstructResult<&mut LevelProbe> {
        if self.leaf_depth == Some(depth) {
            return Err(ConstructError::shape(format!(
                "inconsistent nesting: found a container at depth {} where leaves were found",
                depth
            )));
        }
        Ok(self.level_mut(depth))
    }

    fn enter_leaf(&mut self, depth: usize) -> ConstructResult<()> {
        match self.leaf_depth {
            Some(d) if d != depth => Err(ConstructError::shape(format!(
                "inconsistent nesting: found leaves at depths {} and {}",
                d, depth
            ))),
            _ if self.levels.len() > depth => Err(ConstructError::shape(format!(
                "inconsistent nesting: found a leaf at depth {} where containers were found",
                depth
            ))),
            _ => {
                self.leaf_depth = Some(depth);
                Ok(())
            }
        }
    }
}

/// How much the prober may learn from the data
#[derive(Debug, Clone, Copy)]
pub enum ProbeMode<'t> {
    Infer,
    Uniform(&'t LeafType),
    Full(&'t TypeDescriptor),
}

impl fmt::Display for ProbeMode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMode::Infer => write!(f, "infer"),
            ProbeMode::Uniform(_) => write!(f, "uniform"),
            ProbeMode::Full(_) => write!(f, "full"),
        }
    }
}

/// Probe a value
pub fn probe(value: &mut Value, mode: ProbeMode<'_>) -> ConstructResult<ProbedShape> {
    let mut shape = ProbedShape::default();
    Prober { mode }.visit(&mut shape, value, 0, false)?;
    Ok(shape)
}

struct Prober<'t> {
    mode: ProbeMode<'t>,
}

impl Prober<'_> {
    fn visit(
        &self,
        shape: &mut ProbedShape,
        value: &mut Value,
        depth: usize,
        partial: bool,
    ) -> ConstructResult<()> {
        if let ProbeMode::Full(ty) = self.mode {
            return self.visit_hinted(shape, value, depth, ty.ndim());
        }

        match classify(value) {
            Classified::Scalar(scalar) => {
                shape.enter_leaf(depth)?;
                if let ProbeMode::Infer = self.mode {
                    shape.leaf.join_scalar(scalar)?;
                }
                Ok(())
            }
            Classified::Mapping(map) => {
                shape.enter_leaf(depth)?;
                if let ProbeMode::Infer = self.mode {
                    self.sample_record(shape, map)?;
                }
                Ok(())
            }
            Classified::Sequence { items, tuple } => {
                if self.is_positional_record(items, tuple) {
                    return shape.enter_leaf(depth);
                }
                let level = shape.enter_container(depth)?;
                level.extent.observe(items.len());
                level.partial |= partial;
                for child in items.iter_mut() {
                    self.visit(shape, child, depth + 1, partial)?;
                }
                Ok(())
            }
            Classified::Iterator(it) => {
                let level = shape.enter_container(depth)?;
                level.from_iterator = true;
                level.partial |= partial;
                match self.mode {
                    ProbeMode::Uniform(_) => {
                        if let Some(first) = it.peek_mut() {
                            trace!(depth, "peeked iterator");
                            self.visit(shape, first, depth + 1, true)?;
                        }
                    }
                    _ => {
                        let items = it.buffer_all();
                        shape.levels[depth].extent.observe(items.len());
                        for child in items.iter_mut() {
                            self.visit(shape, child, depth + 1, partial)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Full-hint probing: check the hinted dimensions only, never pulling
    fn visit_hinted(
        &self,
        shape: &mut ProbedShape,
        value: &mut Value,
        depth: usize,
        ndim: usize,
    ) -> ConstructResult<()> {
        if depth == ndim {
            return Ok(());
        }
        match classify(value) {
            Classified::Sequence { items, .. } => {
                shape.level_mut(depth).extent.observe(items.len());
                for child in items.iter_mut() {
                    self.visit_hinted(shape, child, depth + 1, ndim)?;
                }
                Ok(())
            }
            Classified::Iterator(_) => {
                shape.level_mut(depth).from_iterator = true;
                Ok(())
            }
            Classified::Mapping(_) => Err(ConstructError::shape(format!(
                "a mapping cannot be used as dimension {}",
                depth
            ))),
            Classified::Scalar(scalar) => Err(ConstructError::shape(format!(
                "expected a sequence for dimension {}, found {} scalar",
                depth,
                scalar.type_name()
            ))),
        }
    }

    /// Whether a sequence at leaf position is a record rather than a dimension
    ///
    /// Only applies under a uniform struct hint: tuples always are records,
    /// lists are when non-empty and flat.
    fn is_positional_record(&self, items: &[Value], tuple: bool) -> bool {
        match self.mode {
            ProbeMode::Uniform(leaf) if leaf.is_struct() => {
                tuple
                    || (!items.is_empty()
                        && items
                            .iter()
                            .all(|v| v.classification() == Classification::Scalar))
            }
            _ => false,
        }
    }

    /// Fold one mapping into the inferred struct sample
    fn sample_record(
        &self,
        shape: &mut ProbedShape,
        map: &mut IndexMap<String, Value>,
    ) -> ConstructResult<()> {
        match &mut shape.leaf {
            LeafSample::None => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (key, value) in map.iter_mut() {
                    let mut field = ProbedShape::default();
                    self.visit(&mut field, value, 0, false)?;
                    fields.insert(key.clone(), field);
                }
                shape.leaf = LeafSample::Struct(fields);
                Ok(())
            }
            LeafSample::Struct(fields) => {
                let keys = || format!("{{{}}}", fields.keys().cloned().collect::<Vec<_>>().join(", "));
                if let Some(key) = map.keys().find(|k| !fields.contains_key(*k)) {
                    return Err(ConstructError::UndeclaredField {
                        key: key.clone(),
                        ty: keys(),
                    });
                }
                if let Some(field) = fields.keys().find(|k| !map.contains_key(*k)) {
                    return Err(ConstructError::MissingField {
                        field: field.clone(),
                        ty: keys(),
                    });
                }
                for (key, value) in map.iter_mut() {
                    if let Some(field) = fields.get_mut(key) {
                        self.visit(field, value, 0, false)?;
                    }
                }
                Ok(())
            }
            other => Err(ConstructError::type_unification(format!(
                "cannot unify {} and struct leaves",
                other.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndconstruct_parser::{parse_leaf, parse_type};
    use pretty_assertions::assert_eq;

    fn ints(values: &[i128]) -> Value {
        Value::List(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn test_regular_nesting() {
        let mut v = Value::List(vec![ints(&[1, 2]), ints(&[3, 4]), ints(&[5, 6])]);
        let shape = probe(&mut v, ProbeMode::Infer).unwrap();
        assert_eq!(shape.ndim(), 2);
        assert_eq!(shape.levels[0].extent, Extent::AllEqual(3));
        assert_eq!(shape.levels[1].extent, Extent::AllEqual(2));
        assert_eq!(shape.leaf, LeafSample::Int { min: 1, max: 6 });
    }

    #[test]
    fn test_irregular_level() {
        let mut v = Value::List(vec![ints(&[1]), ints(&[]), ints(&[1, 2, 3])]);
        let shape = probe(&mut v, ProbeMode::Infer).unwrap();
        assert_eq!(shape.levels[1].extent, Extent::Irregular { min: 0, max: 3 });
    }

    #[test]
    fn test_inconsistent_nesting() {
        let mut v = Value::List(vec![Value::Int(1), ints(&[2])]);
        let err = probe(&mut v, ProbeMode::Infer).unwrap_err();
        assert!(err.to_string().contains("inconsistent nesting"));

        let mut v = Value::List(vec![ints(&[2]), Value::Int(1)]);
        assert!(probe(&mut v, ProbeMode::Infer).is_err());
    }

    #[test]
    fn test_infer_drains_iterators_into_replay() {
        let mut v = Value::iter((0..4).map(Value::Int));
        let shape = probe(&mut v, ProbeMode::Infer).unwrap();
        assert_eq!(
            shape.levels[0],
            LevelProbe {
                extent: Extent::AllEqual(4),
                from_iterator: true,
                partial: false
            }
        );
        match &v {
            Value::Iter(it) => assert_eq!(it.known_len(), Some(4)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_uniform_peeks_one_element() {
        let leaf = parse_leaf("int32").unwrap();
        let mut v = Value::iter((0..3).map(|i| ints(&[i, i])));
        let shape = probe(&mut v, ProbeMode::Uniform(&leaf)).unwrap();

        assert_eq!(shape.ndim(), 2);
        assert!(shape.levels[0].from_iterator);
        assert!(shape.levels[1].partial);
        assert_eq!(shape.leaf, LeafSample::None);
        match &v {
            Value::Iter(it) => assert_eq!((it.pulled(), it.buffered()), (1, 1)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_full_never_pulls() {
        let ty = parse_type("3, var, int32").unwrap();
        let mut v = Value::List(vec![
            Value::iter((0..2).map(Value::Int)),
            ints(&[1, 2, 3]),
            ints(&[]),
        ]);
        let shape = probe(&mut v, ProbeMode::Full(&ty)).unwrap();
        assert_eq!(shape.levels[0].extent, Extent::AllEqual(3));
        assert!(shape.levels[1].from_iterator);
        assert_eq!(shape.levels[1].extent, Extent::Irregular { min: 0, max: 3 });
        match &v {
            Value::List(items) => match &items[0] {
                Value::Iter(it) => assert_eq!(it.pulled(), 0),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_full_rejects_scalar_dimension() {
        let ty = parse_type("2, 2, int32").unwrap();
        let mut v = Value::List(vec![ints(&[1, 2]), Value::Int(3)]);
        let err = probe(&mut v, ProbeMode::Full(&ty)).unwrap_err();
        assert!(err.to_string().starts_with("BroadcastError"));
    }

    #[test]
    fn test_leaf_lattice() {
        let mut v = Value::List(vec![Value::Bool(true), Value::Int(7), Value::Float(0.5)]);
        assert_eq!(probe(&mut v, ProbeMode::Infer).unwrap().leaf, LeafSample::Float);

        let mut v = Value::List(vec![Value::Int(1), Value::Complex(0.0, 1.0)]);
        assert_eq!(probe(&mut v, ProbeMode::Infer).unwrap().leaf, LeafSample::Complex);

        let mut v = Value::List(vec![Value::Int(1), Value::from("a")]);
        let err = probe(&mut v, ProbeMode::Infer).unwrap_err();
        assert_eq!(err.to_string(), "TypeUnificationError: cannot unify int and string leaves");
    }

    #[test]
    fn test_struct_sample() {
        let mut v = Value::List(vec![
            Value::dict([("x", Value::Int(1)), ("y", Value::from("a"))]),
            Value::dict([("y", Value::from("b")), ("x", Value::Float(2.0))]),
        ]);
        let shape = probe(&mut v, ProbeMode::Infer).unwrap();
        let LeafSample::Struct(fields) = shape.leaf else {
            panic!("expected struct sample");
        };
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(fields["x"].leaf, LeafSample::Float);
        assert_eq!(fields["y"].leaf, LeafSample::String);
    }

    #[test]
    fn test_struct_sample_key_mismatch() {
        let mut v = Value::List(vec![
            Value::dict([("x", 1), ("y", 2)]),
            Value::dict([("x", 1), ("z", 2)]),
        ]);
        let err = probe(&mut v, ProbeMode::Infer).unwrap_err();
        assert!(matches!(err, ConstructError::UndeclaredField { ref key, .. } if key == "z"));

        let mut v = Value::List(vec![Value::dict([("x", 1), ("y", 2)]), Value::dict([("x", 1)])]);
        let err = probe(&mut v, ProbeMode::Infer).unwrap_err();
        assert!(matches!(err, ConstructError::MissingField { ref field, .. } if field == "y"));
    }

    #[test]
    fn test_uniform_struct_records() {
        let leaf = parse_leaf("{a: int32; b: float64}").unwrap();
        let mut v = Value::List(vec![Value::list([1, 2]), Value::tuple([3, 4])]);
        let shape = probe(&mut v, ProbeMode::Uniform(&leaf)).unwrap();
        assert_eq!(shape.ndim(), 1);
        assert_eq!(shape.levels[0].extent, Extent::AllEqual(2));
    }
}
