//! Shared helpers for integration tests
// Not every test target uses every helper.
#![allow(dead_code)]

use ndconstruct::{construct, ConstructResult, ConstructedArray, Hint, Value};
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log filter for test runs
pub const LOG_ENV: &str = "NDCONSTRUCT_LOG";

/// Install a test-writer subscriber once; filtered by `NDCONSTRUCT_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_test_writer()
        .try_init();
}

/// Convert a `json!` document into an input value
pub fn value(json: serde_json::Value) -> Value {
    Value::try_from(json).unwrap_or_else(|e| panic!("bad test input: {e}"))
}

/// A lazy source yielding `f(0) .. f(n - 1)`
pub fn generator(n: i128, f: impl Fn(i128) -> Value + 'static) -> Value {
    Value::iter((0..n).map(f))
}

pub fn build(input: Value, hint: &str) -> ConstructResult<ConstructedArray> {
    init_tracing();
    construct(input, &Hint::full(hint)?)
}

pub fn infer(input: Value) -> ConstructResult<ConstructedArray> {
    init_tracing();
    construct(input, &Hint::Infer)
}
