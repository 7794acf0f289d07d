//! Constructed arrays
//!
//! A `ConstructedArray` owns its descriptor and every region written for it.
//! Reading it back yields nested `Value`s: lists for dimensions, `Dict`s (in
//! field order) for struct records.

use indexmap::IndexMap;
use ndconstruct_parser::{LeafType, StructField, TypeDescriptor};
use ndconstruct_storage::{ArenaStats, RegionArena};

use crate::convert::scalar_to_value;
use crate::error::{ConstructError, ConstructResult};
use crate::materialize::{Block, Materialized, Plan, PlanDim, PlanLeaf, PlanNode};
use crate::value::Value;

#[derive(Debug)]
pub struct ConstructedArray {
    ty: TypeDescriptor,
    plan: Plan,
    arena: RegionArena,
    root: Block,
    extents: Vec<Option<usize>>,
}

impl ConstructedArray {
    pub(crate) fn new(ty: TypeDescriptor, plan: Plan, out: Materialized) -> Self {
        Self {
            ty,
            plan,
            arena: out.arena,
            root: out.root,
            extents: out.extents,
        }
    }

    /// The resolved descriptor
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn ndim(&self) -> usize {
        self.ty.ndim()
    }

    /// Extent of the outermost dimension; 1 for a zero-dimensional array
    pub fn len(&self) -> usize {
        match self.plan.root.dims.first() {
            None => 1,
            Some(PlanDim::Var) => match &self.root {
                Block::Var(rows) => rows.first().map_or(0, |row| row.len),
                _ => 0,
            },
            Some(dim) => self.extent(*dim),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extent per dimension; `None` for var dimensions
    pub fn shape(&self) -> Vec<Option<usize>> {
        self.plan
            .root
            .dims
            .iter()
            .map(|dim| match dim {
                PlanDim::Var => None,
                dim => Some(self.extent(*dim)),
            })
            .collect()
    }

    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Read the whole array back
    pub fn to_value(&self) -> ConstructResult<Value> {
        self.read_instance(&self.plan.root, 0, &self.root, 0, &[])
    }

    /// Project a struct field across all dimensions
    ///
    /// `path` is dot separated, so `"pos.x"` selects field `x` of field `pos`.
    /// The result nests the array's dimensions outside the field's own.
    pub fn field(&self, path: &str) -> ConstructResult<Value> {
        let indices = self.resolve_path(path)?;
        self.read_instance(&self.plan.root, 0, &self.root, 0, &indices)
    }

    /// Descriptor of a projected field
    pub fn field_type(&self, path: &str) -> ConstructResult<TypeDescriptor> {
        let mut ty = &self.ty;
        for name in path.split('.') {
            ty = &self.field_of(ty, name)?.1.ty;
        }
        Ok(ty.clone())
    }

    fn field_of<'t>(
        &self,
        ty: &'t TypeDescriptor,
        name: &str,
    ) -> ConstructResult<(usize, &'t StructField)> {
        let no_such_field = || ConstructError::NoSuchField {
            field: name.to_string(),
            ty: ty.to_string(),
        };
        let LeafType::Struct(st) = &ty.leaf else {
            return Err(no_such_field());
        };
        let index = st.index_of(name).ok_or_else(no_such_field)?;
        Ok((index, &st.fields()[index]))
    }

    fn resolve_path(&self, path: &str) -> ConstructResult<Vec<usize>> {
        let mut ty = &self.ty;
        let mut indices = Vec::new();
        for name in path.split('.') {
            let (index, field) = self.field_of(ty, name)?;
            indices.push(index);
            ty = &field.ty;
        }
        Ok(indices)
    }

    fn extent(&self, dim: PlanDim) -> usize {
        match dim {
            PlanDim::Fixed(n) => n,
            PlanDim::Strided(slot) => self.extents.get(slot).copied().flatten().unwrap_or(0),
            PlanDim::Var => 0,
        }
    }

    /// Read instance `index` of `node` from dimension `depth` on
    fn read_instance(
        &self,
        node: &PlanNode,
        depth: usize,
        block: &Block,
        index: usize,
        path: &[usize],
    ) -> ConstructResult<Value> {
        let var = node.next_var(depth);
        let extents: Vec<usize> = node.dims[depth..var].iter().map(|d| self.extent(*d)).collect();
        let mut flat = index * extents.iter().product::<usize>();
        self.read_regular(node, var, block, &extents, &mut flat, path)
    }

    /// Nest the regular dimensions up to `var`, reading cells in row-major order
    fn read_regular(
        &self,
        node: &PlanNode,
        var: usize,
        block: &Block,
        extents: &[usize],
        flat: &mut usize,
        path: &[usize],
    ) -> ConstructResult<Value> {
        if let Some((&n, rest)) = extents.split_first() {
            let items = (0..n)
                .map(|_| self.read_regular(node, var, block, rest, flat, path))
                .collect::<ConstructResult<Vec<_>>>()?;
            return Ok(Value::List(items));
        }

        let cell = *flat;
        *flat += 1;
        if var < node.dims.len() {
            self.read_row(node, var, block, cell, path)
        } else {
            self.read_leaf(&node.leaf, block, cell, path)
        }
    }

    fn read_row(
        &self,
        node: &PlanNode,
        var: usize,
        block: &Block,
        cell: usize,
        path: &[usize],
    ) -> ConstructResult<Value> {
        let Block::Var(rows) = block else {
            return Err(ConstructError::Layout("expected a var block".to_string()));
        };
        let row = rows
            .get(cell)
            .ok_or_else(|| ConstructError::Layout(format!("missing var row {}", cell)))?;
        let items = (0..row.len)
            .map(|i| self.read_instance(node, var + 1, &row.block, i, path))
            .collect::<ConstructResult<Vec<_>>>()?;
        Ok(Value::List(items))
    }

    fn read_leaf(
        &self,
        leaf: &PlanLeaf,
        block: &Block,
        cell: usize,
        path: &[usize],
    ) -> ConstructResult<Value> {
        match (leaf, block) {
            (PlanLeaf::Element { leaf, .. }, Block::Leaf(id)) => {
                let scalar = self.arena.column(*id)?.get(cell).ok_or_else(|| {
                    ConstructError::Layout(format!("region {} has no element {}", id, cell))
                })?;
                scalar_to_value(scalar, leaf)
            }
            (PlanLeaf::Struct { ty, fields }, Block::Struct(blocks)) => match path.split_first() {
                Some((&index, rest)) => {
                    let (node, block) = fields.get(index).zip(blocks.get(index)).ok_or_else(|| {
                        ConstructError::Layout(format!("missing field {} of {}", index, ty))
                    })?;
                    self.read_instance(node, 0, block, cell, rest)
                }
                None => {
                    let mut record = IndexMap::with_capacity(fields.len());
                    for ((name, node), block) in ty.names().zip(fields).zip(blocks) {
                        record.insert(name.to_string(), self.read_instance(node, 0, block, cell, &[])?);
                    }
                    Ok(Value::Dict(record))
                }
            },
            _ => Err(ConstructError::Layout(
                "block does not match the leaf type".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{construct, Hint};
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_len_and_shape() {
        let arr = construct(
            Value::List(vec![Value::list([1, 2]), Value::list([3])]),
            &Hint::Infer,
        )
        .unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.shape(), vec![Some(2), None]);

        let arr = construct(Value::Int(4), &Hint::Infer).unwrap();
        assert_eq!((arr.ndim(), arr.len()), (0, 1));
        assert_eq!(arr.to_value().unwrap(), Value::Int(4));
    }

    #[test]
    fn test_outer_var_len() {
        let arr = construct(Value::iter((0..5).map(Value::Int)), &Hint::Infer).unwrap();
        assert_eq!(arr.len(), 5);
        assert_eq!(arr.shape(), vec![None]);
    }

    #[test]
    fn test_unreached_strided_is_zero() {
        let hint = Hint::full("var, M, int8").unwrap();
        let arr = construct(Value::List(vec![]), &hint).unwrap();
        assert_eq!(arr.shape(), vec![None, Some(0)]);
        assert!(arr.is_empty());
    }

    #[test]
    fn test_field_projection() {
        let hint = Hint::full("2, {a: int8; b: {c: 2, bool}}").unwrap();
        let value = Value::List(vec![
            Value::dict([
                ("a", Value::Int(1)),
                ("b", Value::dict([("c", Value::list([true, false]))])),
            ]),
            Value::dict([
                ("a", Value::Int(2)),
                ("b", Value::dict([("c", Value::list([false, true]))])),
            ]),
        ]);
        let arr = construct(value, &hint).unwrap();

        assert_eq!(arr.field("a").unwrap(), Value::list([1, 2]));
        assert_eq!(
            arr.field("b.c").unwrap(),
            Value::List(vec![Value::list([true, false]), Value::list([false, true])])
        );
        assert_eq!(arr.field_type("b.c").unwrap().to_string(), "2, bool");

        let err = arr.field("b.d").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldMismatch);
        assert_eq!(
            err.to_string(),
            "FieldMismatchError: type {c: 2, bool} has no field 'd'"
        );
        assert!(arr.field("a.x").is_err());
    }
}
