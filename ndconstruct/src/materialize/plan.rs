//! Layout plan
//!
//! A `Plan` is the resolved descriptor in the form the writer and reader walk:
//! every strided dimension gets a slot for its discovered extent, and every
//! leaf knows its storage kind.

use ndconstruct_parser::{Dimension, LeafType, StructType, TypeDescriptor};
use ndconstruct_storage::ElementKind;

use crate::convert::{scalar_element_kind, string_element_kind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDim {
    Fixed(usize),
    /// Index into the extent table
    Strided(usize),
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanLeaf {
    Element { kind: ElementKind, leaf: LeafType },
    Struct { ty: StructType, fields: Vec<PlanNode> },
}

/// Dimensions and leaf of one descriptor (the array or a struct field)
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub dims: Vec<PlanDim>,
    pub leaf: PlanLeaf,
}

impl PlanNode {
    /// Index of the first var dimension at or after `from`, or `dims.len()`
    pub fn next_var(&self, from: usize) -> usize {
        self.dims
            .iter()
            .skip(from)
            .position(|d| *d == PlanDim::Var)
            .map_or(self.dims.len(), |i| from + i)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub root: PlanNode,
    /// Number of strided dimensions in the whole descriptor
    pub strided_slots: usize,
}

impl Plan {
    pub fn compile(ty: &TypeDescriptor) -> Plan {
        let mut slots = 0;
        let root = node(ty, &mut slots);
        Plan {
            root,
            strided_slots: slots,
        }
    }
}

fn node(ty: &TypeDescriptor, slots: &mut usize) -> PlanNode {
    let dims = ty
        .dims
        .iter()
        .map(|dim| match dim {
            Dimension::Fixed(n) => PlanDim::Fixed(*n),
            Dimension::Var => PlanDim::Var,
            Dimension::Strided => {
                *slots += 1;
                PlanDim::Strided(*slots - 1)
            }
        })
        .collect();

    let leaf = match &ty.leaf {
        LeafType::Scalar(kind) => PlanLeaf::Element {
            kind: scalar_element_kind(*kind),
            leaf: ty.leaf.clone(),
        },
        LeafType::String(st) => PlanLeaf::Element {
            kind: string_element_kind(st),
            leaf: ty.leaf.clone(),
        },
        LeafType::Struct(st) => PlanLeaf::Struct {
            ty: st.clone(),
            fields: st.fields().iter().map(|f| node(&f.ty, slots)).collect(),
        },
    };

    PlanNode { dims, leaf }
}
