//! Struct field resolution
//!
//! A record is either positional (list, tuple or iterator, matched to the
//! fields by position) or keyed (mapping, matched by name). Either way the
//! resolver hands back one value per declared field, in declaration order.

use ndconstruct_parser::StructType;

use crate::classify::{classify, Classified};
use crate::error::{ConstructError, ConstructResult, Found};
use crate::value::Value;

/// Field values of one record, in the struct's field order
pub fn resolve_record<'v>(
    value: &'v mut Value,
    ty: &StructType,
) -> ConstructResult<Vec<&'v mut Value>> {
    let expected = ty.len();
    match classify(value) {
        Classified::Sequence { items, .. } => {
            if items.len() != expected {
                return Err(field_count(ty, Found::Exactly(items.len())));
            }
            Ok(items.iter_mut().collect())
        }
        Classified::Iterator(it) => {
            // one past the field count tells "exact" from "too many"
            let buffered = it.fill(expected + 1);
            if buffered > expected {
                return Err(field_count(ty, Found::AtLeast(buffered)));
            }
            if buffered < expected {
                return Err(field_count(ty, Found::Exactly(buffered)));
            }
            Ok(it.buffered_mut().collect())
        }
        Classified::Mapping(map) => {
            if let Some(key) = map.keys().find(|k| ty.index_of(k).is_none()) {
                return Err(ConstructError::UndeclaredField {
                    key: key.clone(),
                    ty: ty.to_string(),
                });
            }
            let mut slots: Vec<Option<&'v mut Value>> = (0..expected).map(|_| None).collect();
            for (key, field) in map.iter_mut() {
                if let Some(index) = ty.index_of(key) {
                    slots[index] = Some(field);
                }
            }
            slots
                .into_iter()
                .zip(ty.names())
                .map(|(slot, name)| {
                    slot.ok_or_else(|| ConstructError::MissingField {
                        field: name.to_string(),
                        ty: ty.to_string(),
                    })
                })
                .collect()
        }
        Classified::Scalar(scalar) => Err(ConstructError::type_unification(format!(
            "expected a record for struct {}, found {} scalar",
            ty,
            scalar.type_name()
        ))),
    }
}

fn field_count(ty: &StructType, found: Found) -> ConstructError {
    ConstructError::FieldCount {
        ty: ty.to_string(),
        expected: ty.len(),
        found,
    }
}
