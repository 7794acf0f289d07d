//! Configuration loading and its effect on construction

mod common;

use std::io::Write;

use common::{init_tracing, value};
use ndconstruct::{
    ConstructConfig, Constructor, ErrorKind, Hint, IntegerWidth, Value, CONFIG_ENV,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    init_tracing();
    let file = config_file(
        r#"
        default_leaf = "int8"
        integer_width = "int64"
        initial_var_capacity = 1
        growth_factor = 1.5
        "#,
    );
    let config = ConstructConfig::load(file.path()).unwrap();
    assert_eq!(config.integer_width, IntegerWidth::Int64);

    let constructor = Constructor::new(config);
    let arr = constructor.construct(value(json!([1, 2])), &Hint::Infer).unwrap();
    assert_eq!(arr.ty().to_string(), "2, int64");

    let arr = constructor.construct(value(json!([[]])), &Hint::Infer).unwrap();
    assert_eq!(arr.ty().to_string(), "1, 0, int8");
}

#[test]
fn test_growth_policy_drives_reallocations() {
    let file = config_file("initial_var_capacity = 1\ngrowth_factor = 1.5\n");
    let constructor = Constructor::new(ConstructConfig::load(file.path()).unwrap());

    let source = Value::iter((0..10).map(Value::Int));
    let arr = constructor
        .construct(source, &Hint::full("var, int32").unwrap())
        .unwrap();
    // capacities 1, 2, 3, 5, 8, 12
    assert_eq!(arr.stats().reallocations, 5);
    assert_eq!(arr.len(), 10);
}

#[test]
fn test_missing_and_invalid_files() {
    let err = ConstructConfig::load("/nonexistent/ndconstruct.toml").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let file = config_file("growth_factor = 0.5");
    let err = ConstructConfig::load(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().starts_with("ConfigError: growth_factor"));
}

#[test]
fn test_from_env() {
    let file = config_file("integer_width = \"int64\"");
    std::env::set_var(CONFIG_ENV, file.path());
    let config = ConstructConfig::from_env();
    std::env::remove_var(CONFIG_ENV);
    assert_eq!(config.unwrap().integer_width, IntegerWidth::Int64);
}
