//! End-to-end construction tests

mod common;

use common::{build, generator, infer, value};
use ndconstruct::{construct, ConstructError, ErrorKind, Found, Hint, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_empty_inputs_default_to_float() {
    let arr = infer(value(json!([]))).unwrap();
    assert_eq!(arr.ty().to_string(), "0, float64");
    assert_eq!(arr.shape(), vec![Some(0)]);

    let arr = infer(value(json!([[], [], []]))).unwrap();
    assert_eq!(arr.ty().to_string(), "3, 0, float64");
    assert_eq!(arr.shape(), vec![Some(3), Some(0)]);
    assert_eq!(arr.to_value().unwrap(), value(json!([[], [], []])));
}

#[test]
fn test_scalar_leaves_round_trip() {
    let cases = [
        ("3, bool", json!([true, false, true])),
        ("2, int8", json!([-128, 127])),
        ("2, uint16", json!([0, 65535])),
        ("2, int64", json!([i64::MIN, i64::MAX])),
        ("2, uint64", json!([0, u64::MAX])),
        ("2, float16", json!([0.5, -2.0])),
        ("2, float32", json!([1.25, 3.0])),
        ("2, 2, float64", json!([[0.1, 0.2], [0.3, 0.4]])),
    ];
    for (hint, input) in cases {
        let arr = build(value(input.clone()), hint).unwrap_or_else(|e| panic!("{hint}: {e}"));
        assert_eq!(arr.to_value().unwrap(), value(input), "{hint}");
    }
}

#[test]
fn test_complex_round_trip() {
    let input = Value::List(vec![Value::Complex(1.0, -2.0), Value::Int(3)]);
    let arr = build(input, "2, cfloat64").unwrap();
    assert_eq!(
        arr.to_value().unwrap(),
        Value::List(vec![Value::Complex(1.0, -2.0), Value::Complex(3.0, 0.0)])
    );
}

#[test]
fn test_string_encodings_round_trip() {
    let cases = [
        ("3, string", json!(["a", "héllo", ""])),
        ("2, string(\"A\")", json!(["plain", "text"])),
        ("2, string(4, \"A\")", json!(["abc", "abcd"])),
        ("2, string(6)", json!(["héllo", ""])),
        ("2, string(3, \"U16\")", json!(["ab", "日本"])),
        ("1, string(2, \"U32\")", json!(["😀x"])),
    ];
    for (hint, input) in cases {
        let arr = build(value(input.clone()), hint).unwrap_or_else(|e| panic!("{hint}: {e}"));
        assert_eq!(arr.to_value().unwrap(), value(input), "{hint}");
    }
}

#[test]
fn test_nested_struct_round_trip() {
    let input = value(json!([
        {"y": {"b": 0.5, "a": "first"}, "x": [1, 2], "z": [3]},
        {"x": [3, 4], "z": [0], "y": {"a": "second", "b": -1.5}},
    ]));
    let arr = build(input, "2, {x: 2, int16; y: {a: string; b: float64}; z: 1, cfloat32}").unwrap();

    let record = |x: [i32; 2], a: &str, b: f64, z: f64| {
        Value::dict([
            ("x", Value::list(x)),
            ("y", Value::dict([("a", Value::from(a)), ("b", Value::from(b))])),
            ("z", Value::List(vec![Value::Complex(z, 0.0)])),
        ])
    };
    assert_eq!(
        arr.to_value().unwrap(),
        Value::List(vec![record([1, 2], "first", 0.5, 3.0), record([3, 4], "second", -1.5, 0.0)])
    );
}

#[test]
fn test_three_levels_of_struct() {
    let input = value(json!({"a": {"b": {"c": [1, 2]}}, "d": [[1.5], [2.5]]}));
    let arr = build(input, "{a: {b: {c: 2, int8}}; d: 2, 1, float32}").unwrap();
    assert_eq!(arr.ndim(), 0);
    assert_eq!(
        arr.to_value().unwrap(),
        value(json!({"a": {"b": {"c": [1, 2]}}, "d": [[1.5], [2.5]]}))
    );
}

#[test]
fn test_fixed_extent_from_generator() {
    let arr = build(generator(10, |x| Value::Int(2 * x + 5)), "10, int32").unwrap();
    assert_eq!(arr.to_value().unwrap(), Value::list((0..10).map(|x| 2 * x + 5)));

    let err = build(generator(10, |x| Value::Int(2 * x + 5)), "11, int32").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    insta::assert_snapshot!(
        err.to_string(),
        @"BroadcastError: too few elements at dimension 0: expected 11, found 10"
    );

    let err = build(generator(10, |x| Value::Int(2 * x + 5)), "9, int32").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    insta::assert_snapshot!(
        err.to_string(),
        @"BroadcastError: too many elements at dimension 0: expected 9, found at least 10"
    );
}

#[test]
fn test_huge_fixed_extent_over_short_generator() {
    let err = build(generator(3, Value::Int), "2305843009213693952, int64").unwrap_err();
    assert!(matches!(
        err,
        ConstructError::TooFew {
            depth: 0,
            expected: 2305843009213693952,
            found: 3
        }
    ));

    let rows = Value::List(vec![generator(3, Value::Int), generator(3, Value::Int)]);
    let err = build(rows, "2, 1000000000000, int8").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert!(matches!(err, ConstructError::TooFew { depth: 1, found: 3, .. }));
}

#[test]
fn test_fixed_extent_from_sequence() {
    let err = build(value(json!([[1, 2], [3, 4, 5]])), "2, 2, int32").unwrap_err();
    assert!(matches!(
        err,
        ConstructError::TooMany {
            depth: 1,
            expected: 2,
            found: Found::Exactly(3)
        }
    ));
}

#[test]
fn test_strided_iterator_is_rejected() {
    for n in [0, 3] {
        let err = build(generator(n, Value::Int), "M, int32").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSource);
    }

    // inside a pulled row, the writer catches it
    let input = generator(1, |_| generator(2, Value::Int));
    let err = build(input, "var, strided, int32").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedSource);
}

#[test]
fn test_strided_requires_uniform_extent() {
    let err = build(value(json!([[1, 2], [3]])), "2, M, int32").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

    let arr = build(value(json!([[1, 2], [3, 4]])), "2, M, int32").unwrap();
    assert_eq!(arr.shape(), vec![Some(2), Some(2)]);
}

#[test]
fn test_ragged_rows() {
    let input = json!([[1, 2, 3], [-10, -5, 0, 5, 10], [2, 10]]);
    for hint in ["3, var, int32", "strided, var, int32"] {
        let arr = build(value(input.clone()), hint).unwrap();
        assert_eq!(arr.shape(), vec![Some(3), None]);
        assert_eq!(arr.to_value().unwrap(), value(input.clone()), "{hint}");
        assert_eq!(arr.stats().growable_regions, 3);
    }
}

#[test]
fn test_ragged_rows_mixing_generators_and_lists() {
    let input = Value::List(vec![
        generator(3, |x| Value::Int(x + 1)),
        generator(5, |x| Value::Int(5 * x - 10)),
        Value::list([2, 10]),
    ]);
    let arr = build(input, "M, var, int32").unwrap();
    assert_eq!(arr.shape(), vec![Some(3), None]);
    assert_eq!(
        arr.to_value().unwrap(),
        value(json!([[1, 2, 3], [-10, -5, 0, 5, 10], [2, 10]]))
    );
}

#[test]
fn test_nested_generators() {
    let nested = || generator(4, |i| generator(i, |j| Value::Int(2 * j)));
    let expected = value(json!([[], [0], [0, 2], [0, 2, 4]]));

    let arr = build(nested(), "var, var, int32").unwrap();
    assert_eq!(arr.to_value().unwrap(), expected);

    let arr = infer(nested()).unwrap();
    assert_eq!(arr.ty().to_string(), "var, var, int32");
    assert_eq!(arr.to_value().unwrap(), expected);
}

#[test]
fn test_inner_fixed_applies_to_pulled_rows() {
    let rows = generator(3, |i| Value::list([i, i]));
    let arr = build(rows, "var, 2, int32").unwrap();
    assert_eq!(arr.to_value().unwrap(), value(json!([[0, 0], [1, 1], [2, 2]])));

    let rows = generator(3, |i| Value::List((0..=i).map(Value::Int).collect()));
    let err = build(rows, "var, 2, int32").unwrap_err();
    assert!(matches!(err, ConstructError::TooFew { depth: 1, .. }));
}

#[test]
fn test_uniform_hint_over_generator() {
    let hint = Hint::uniform("int32").unwrap();
    let arr = construct(generator(3, Value::Int), &hint).unwrap();
    assert_eq!(arr.ty().to_string(), "var, int32");
    assert_eq!(arr.to_value().unwrap(), Value::list([0, 1, 2]));
}

#[test]
fn test_uniform_struct_hint_accepts_positional_records() {
    let hint = Hint::uniform("{x: int32; y: float64}").unwrap();
    let input = Value::List(vec![Value::list([1, 2]), Value::tuple([3, 4])]);
    let arr = construct(input, &hint).unwrap();
    assert_eq!(arr.ty().to_string(), "2, {x: int32; y: float64}");
    assert_eq!(
        arr.to_value().unwrap(),
        value(json!([{"x": 1, "y": 2.0}, {"x": 3, "y": 4.0}]))
    );
}

#[test]
fn test_uniform_struct_hint_over_ragged_tuples() {
    let record = |count: i32, size: &str| Value::Tuple(vec![Value::from(count), Value::from(size)]);
    let input = Value::List(vec![
        Value::List(vec![record(1, "a"), record(2, "b")]),
        Value::List(vec![record(3, "c")]),
    ]);
    let hint = Hint::uniform("{count: int32; size: string(1, \"A\")}").unwrap();
    let arr = construct(input, &hint).unwrap();
    assert_eq!(arr.ty().to_string(), "2, var, {count: int32; size: string(1, \"A\")}");
    assert_eq!(arr.field("count").unwrap(), value(json!([[1, 2], [3]])));
    assert_eq!(arr.field("size").unwrap(), value(json!([["a", "b"], ["c"]])));
}

#[test]
fn test_uniform_struct_hint_field_mismatch() {
    let hint = Hint::uniform("{x: int32; y: int32; z: int32}").unwrap();
    for input in [json!([0, 1]), json!({"x": 0, "z": 1})] {
        let err = construct(value(input.clone()), &hint).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldMismatch, "{input}");
    }
}

#[test]
fn test_field_resolution() {
    let hint = "var, {x: int32; y: int32; z: int32}";

    let arr = build(value(json!([{"z": 3, "x": 1, "y": 2}, [4, 5, 6]])), hint).unwrap();
    assert_eq!(
        arr.to_value().unwrap(),
        value(json!([{"x": 1, "y": 2, "z": 3}, {"x": 4, "y": 5, "z": 6}]))
    );

    for input in [
        json!([{"x": 0, "z": 1}]),
        json!([[0, 1]]),
        json!([{"x": 0, "y": 1, "z": 2, "w": 3}]),
        json!([[0, 1, 2, 3]]),
    ] {
        let err = build(value(input.clone()), hint).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldMismatch, "{input}");
    }
}

#[test]
fn test_strided_var_struct() {
    let input = json!([
        [{"count": 1, "size": "a"}],
        [{"size": "b", "count": 2}, {"count": 3, "size": "c"}],
        [],
    ]);
    let arr = build(value(input), "N, var, {count: int32; size: string(1, \"A\")}").unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr.field("count").unwrap(), value(json!([[1], [2, 3], []])));
    assert_eq!(arr.field("size").unwrap(), value(json!([["a"], ["b", "c"], []])));

    let err = build(
        value(json!([[{"count": 1, "size": "ab"}]])),
        "N, var, {count: int32; size: string(1, \"A\")}",
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeUnification);
}

#[test]
fn test_large_generator_grows_var_region() {
    const N: i128 = 100_000;
    let arr = build(generator(N, |x| Value::Int(x % 1000)), "var, int32").unwrap();

    let stats = arr.stats();
    assert_eq!(stats.growable_regions, 1);
    assert!(stats.reallocations > 1, "{stats:?}");

    let Value::List(items) = arr.to_value().unwrap() else {
        panic!("expected a list");
    };
    assert_eq!(items.len(), N as usize);
    assert!(items
        .iter()
        .enumerate()
        .all(|(i, v)| *v == Value::Int(i as i128 % 1000)));
}

#[test]
fn test_inferred_records() {
    let input = json!([
        {"name": "a", "pos": [1.0, 2.0]},
        {"name": "bc", "pos": [3, 4.5]},
    ]);
    let arr = infer(value(input)).unwrap();
    assert_eq!(arr.ty().to_string(), "2, {name: string; pos: 2, float64}");
    assert_eq!(arr.field("pos").unwrap(), value(json!([[1.0, 2.0], [3.0, 4.5]])));
    assert_eq!(arr.field_type("pos").unwrap().to_string(), "2, float64");
}

#[test]
fn test_projection_through_var_dims() {
    let input = json!([
        [{"p": {"x": 1.0, "y": 2.0}, "id": 1}],
        [{"p": {"x": 3.0, "y": 4.0}, "id": 2}, {"p": {"x": 5.0, "y": 6.0}, "id": 3}],
    ]);
    let arr = build(value(input), "2, var, {p: {x: float64; y: float64}; id: int32}").unwrap();
    assert_eq!(arr.field("p.x").unwrap(), value(json!([[1.0], [3.0, 5.0]])));
    assert_eq!(arr.field("id").unwrap(), value(json!([[1], [2, 3]])));

    let err = arr.field("p.z").unwrap_err();
    assert!(matches!(err, ConstructError::NoSuchField { ref field, .. } if field == "z"));
}

#[test]
fn test_type_unification_errors() {
    let err = infer(value(json!([1, "a"]))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeUnification);

    for (hint, input) in [
        ("2, int8", json!([1, 300])),
        ("2, int32", json!([1.5, 2])),
        ("1, uint8", json!([-1])),
        ("1, string(2)", json!(["abc"])),
        ("1, int32", json!(["1"])),
        ("1, {a: int32}", json!([5])),
    ] {
        let err = build(value(input), hint).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeUnification, "{hint}");
    }
}

#[test]
fn test_shape_errors() {
    for (hint, input) in [
        ("2, int32", json!({"a": 1})),
        ("2, 2, int32", json!([[1, 2], 3])),
        ("2, int32", json!([1, [2]])),
    ] {
        let err = build(value(input), hint).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch, "{hint}");
    }

    let err = infer(value(json!([1, [2]]))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
}

#[test]
fn test_invalid_hint_is_a_parse_error() {
    let err = build(value(json!([1])), "1, int33").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
