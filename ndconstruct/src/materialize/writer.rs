use ndconstruct_storage::RegionArena;
use tracing::trace;

use super::{Block, Materialized, PlanDim, PlanLeaf, PlanNode, VarRow};
use crate::classify::{classify, Children, Classified};
use crate::convert::convert;
use crate::error::{ConstructError, ConstructResult, Found};
use crate::record::resolve_record;
use crate::value::Value;

/// Region size request, in instances of the node suffix being allocated
#[derive(Debug, Clone, Copy)]
enum Sizing {
    Exact(usize),
    /// Expected count, used as the starting capacity
    Growable(usize),
}

#[derive(Debug)]
pub(super) struct Writer {
    arena: RegionArena,
    extents: Vec<Option<usize>>,
}

impl Writer {
    pub(super) fn new(arena: RegionArena, strided_slots: usize) -> Self {
        Self {
            arena,
            extents: vec![None; strided_slots],
        }
    }

    pub(super) fn write_root(&mut self, value: &mut Value, node: &PlanNode) -> ConstructResult<Block> {
        let mut block = self.allocate(node, 0, Sizing::Exact(1));
        self.write(value, node, 0, &mut block)?;
        self.freeze(&block)?;
        Ok(block)
    }

    pub(super) fn finish(self, root: Block) -> Materialized {
        Materialized {
            arena: self.arena,
            root,
            extents: self.extents,
        }
    }

    fn extent(&self, dim: PlanDim) -> Option<usize> {
        match dim {
            PlanDim::Fixed(n) => Some(n),
            PlanDim::Strided(slot) => self.extents[slot],
            PlanDim::Var => None,
        }
    }

    /// Elements per instance across `dims[from..to]`, if all are known yet
    fn segment_len(&self, node: &PlanNode, from: usize, to: usize) -> Option<usize> {
        node.dims[from..to]
            .iter()
            .try_fold(1usize, |acc, dim| acc.checked_mul(self.extent(*dim)?))
    }

    /// Allocate the block for instances of `node` from dimension `depth` on
    fn allocate(&mut self, node: &PlanNode, depth: usize, sizing: Sizing) -> Block {
        let var = node.next_var(depth);
        if var < node.dims.len() {
            return Block::Var(Vec::new());
        }

        let sizing = match (sizing, self.segment_len(node, depth, var)) {
            (Sizing::Exact(n), Some(per)) => n.checked_mul(per).map_or(Sizing::Growable(n), Sizing::Exact),
            (Sizing::Growable(n), Some(per)) => Sizing::Growable(n.saturating_mul(per)),
            (Sizing::Exact(n) | Sizing::Growable(n), None) => Sizing::Growable(n),
        };

        match &node.leaf {
            PlanLeaf::Element { kind, .. } => Block::Leaf(match sizing {
                Sizing::Exact(len) => self.arena.allocate_fixed(*kind, len),
                Sizing::Growable(hint) => {
                    let capacity = hint.max(self.arena.policy().initial_capacity);
                    self.arena.allocate_growable(*kind, capacity)
                }
            }),
            PlanLeaf::Struct { fields, .. } => Block::Struct(
                fields
                    .iter()
                    .map(|field| self.allocate(field, 0, sizing))
                    .collect(),
            ),
        }
    }

    /// Write one instance of `node` from dimension `depth` on
    fn write(
        &mut self,
        value: &mut Value,
        node: &PlanNode,
        depth: usize,
        block: &mut Block,
    ) -> ConstructResult<()> {
        let Some(dim) = node.dims.get(depth).copied() else {
            return self.write_leaf(value, node, block);
        };

        match dim {
            PlanDim::Var => self.write_var(value, node, depth, block),
            PlanDim::Fixed(n) => {
                let children = children(value, depth)?;
                self.write_regular(children, node, depth, block, n)
            }
            PlanDim::Strided(slot) => {
                let children = children(value, depth)?;
                if children.is_iterator() {
                    return Err(ConstructError::unsupported(format!(
                        "strided dimension {} cannot be sourced from an iterator",
                        depth
                    )));
                }
                let len = children.len_hint().unwrap_or_default();
                let expected = *self.extents[slot].get_or_insert(len);
                self.write_regular(children, node, depth, block, expected)
            }
        }
    }

    fn write_regular(
        &mut self,
        children: Children<'_>,
        node: &PlanNode,
        depth: usize,
        block: &mut Block,
        expected: usize,
    ) -> ConstructResult<()> {
        if let Some(len) = children.len_hint() {
            if len < expected {
                return Err(ConstructError::TooFew {
                    depth,
                    expected,
                    found: len,
                });
            }
            if len > expected {
                return Err(ConstructError::TooMany {
                    depth,
                    expected,
                    found: Found::Exactly(len),
                });
            }
        }

        let mut written = 0;
        for mut child in children {
            // only reachable for iterators, whose length is not known up front
            if written == expected {
                return Err(ConstructError::TooMany {
                    depth,
                    expected,
                    found: Found::AtLeast(expected + 1),
                });
            }
            self.write(child.value(), node, depth + 1, block)?;
            written += 1;
        }
        if written < expected {
            return Err(ConstructError::TooFew {
                depth,
                expected,
                found: written,
            });
        }
        Ok(())
    }

    fn write_var(
        &mut self,
        value: &mut Value,
        node: &PlanNode,
        depth: usize,
        block: &mut Block,
    ) -> ConstructResult<()> {
        let Block::Var(rows) = block else {
            return Err(layout("var", block));
        };
        let children = children(value, depth)?;
        let from_iterator = children.is_iterator();
        let hint = children.len_hint().unwrap_or_default();

        let mut row = self.allocate(node, depth + 1, Sizing::Growable(hint));
        let mut len = 0;
        for mut child in children {
            self.write(child.value(), node, depth + 1, &mut row)?;
            len += 1;
        }
        self.freeze(&row)?;
        if from_iterator {
            trace!(depth, len, "pulled var row");
        }

        rows.push(VarRow { len, block: row });
        Ok(())
    }

    fn write_leaf(&mut self, value: &mut Value, node: &PlanNode, block: &mut Block) -> ConstructResult<()> {
        match &node.leaf {
            PlanLeaf::Element { leaf, .. } => {
                let Block::Leaf(id) = block else {
                    return Err(layout("leaf", block));
                };
                let scalar = match classify(value) {
                    Classified::Scalar(scalar) => convert(scalar, leaf)?,
                    Classified::Mapping(_) => {
                        return Err(ConstructError::type_unification(format!(
                            "expected a {} scalar, found a mapping",
                            leaf
                        )))
                    }
                    other => {
                        return Err(ConstructError::shape(format!(
                            "expected a {} scalar, found a {}",
                            leaf,
                            other.classification()
                        )))
                    }
                };
                self.arena.append(*id, scalar)?;
                Ok(())
            }
            PlanLeaf::Struct { ty, fields } => {
                let Block::Struct(blocks) = block else {
                    return Err(layout("struct", block));
                };
                let values = resolve_record(value, ty)?;
                for ((field_value, field_node), field_block) in
                    values.into_iter().zip(fields).zip(blocks.iter_mut())
                {
                    self.write(field_value, field_node, 0, field_block)?;
                }
                Ok(())
            }
        }
    }

    /// Freeze the regions a block owns directly; var rows freeze themselves
    fn freeze(&mut self, block: &Block) -> ConstructResult<()> {
        match block {
            Block::Leaf(id) => self.arena.freeze(*id)?,
            Block::Struct(fields) => {
                for field in fields {
                    self.freeze(field)?;
                }
            }
            Block::Var(_) => {}
        }
        Ok(())
    }
}

/// Elements of a value used as dimension `depth`
fn children(value: &mut Value, depth: usize) -> ConstructResult<Children<'_>> {
    match classify(value) {
        Classified::Sequence { items, .. } => Ok(Children::Sequence(items.iter_mut())),
        Classified::Iterator(it) => Ok(Children::Iterator(it)),
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

fn layout(expected: &str, found: &Block) -> ConstructError {
    let found = match found {
        Block::Leaf(_) => "leaf",
        Block::Struct(_) => "struct",
        Block::Var(_) => "var",
    };
    ConstructError::Layout(format!("expected a {} block, found a {} block", expected, found))
}
