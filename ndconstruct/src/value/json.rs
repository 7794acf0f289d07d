//! Conversion from `serde_json` documents

use indexmap::IndexMap;

use super::Value;
use crate::error::ConstructError;

impl TryFrom<serde_json::Value> for Value {
    type Error = ConstructError;

    /// Objects keep their key order; `null` has no element type and is
    /// rejected.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match json {
            serde_json::Value::Null => {
                return Err(ConstructError::unsupported(
                    "null has no array element type",
                ))
            }
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Int(i128::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<Result<IndexMap<_, _>, ConstructError>>()?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = Value::try_from(json!({"b": [1, 2.5], "a": "x"})).unwrap();
        assert_eq!(
            value,
            Value::dict([
                ("b", Value::List(vec![Value::Int(1), Value::Float(2.5)])),
                ("a", Value::from("x")),
            ])
        );
    }

    #[test]
    fn test_large_unsigned() {
        let value = Value::try_from(json!(u64::MAX)).unwrap();
        assert_eq!(value, Value::Int(i128::from(u64::MAX)));
    }

    #[test]
    fn test_null_rejected() {
        let err = Value::try_from(json!([1, null])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSource);
    }
}
