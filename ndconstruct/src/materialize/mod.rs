//! Buffer materialization
//!
//! Writes a value into arena regions in one depth-first pass, following a
//! `Plan`. The layout is struct-of-arrays:
//!
//! - regular dimensions (fixed or strided) are flattened row-major into the
//!   block of their parent;
//! - each struct field owns its own block;
//! - each element of a var dimension owns a `VarRow` whose block holds that
//!   element's children, in growable regions frozen when the row completes.

mod plan;
mod writer;

pub use plan::{Plan, PlanDim, PlanLeaf, PlanNode};

use ndconstruct_storage::{RegionArena, RegionId};

use crate::config::ConstructConfig;
use crate::error::ConstructResult;
use crate::value::Value;
use writer::Writer;

/// Storage of some number of instances of a plan node suffix
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Elements of a scalar or string leaf
    Leaf(RegionId),
    /// One block per struct field
    Struct(Vec<Block>),
    /// One row per instance of a var dimension
    Var(Vec<VarRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarRow {
    pub len: usize,
    pub block: Block,
}

/// Result of a successful pass
#[derive(Debug)]
pub struct Materialized {
    pub arena: RegionArena,
    pub root: Block,
    /// Discovered extent per strided slot; `None` if never reached
    pub extents: Vec<Option<usize>>,
}

/// Write `value` according to `plan`
///
/// On error the arena is dropped with everything written so far.
pub fn materialize(
    value: &mut Value,
    plan: &Plan,
    config: &ConstructConfig,
) -> ConstructResult<Materialized> {
    let mut writer = Writer::new(RegionArena::new(config.growth), plan.strided_slots);
    let root = writer.write_root(value, &plan.root)?;
    Ok(writer.finish(root))
}
