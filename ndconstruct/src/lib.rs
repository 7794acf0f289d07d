//! ndconstruct
//!
//! Builds typed, possibly ragged multi-dimensional arrays from nested values.
//!
//! Construction takes a `Value` (scalars, lists, tuples, mappings and lazy
//! iterators, arbitrarily nested) and an optional hint, and goes through:
//!
//! - `classify`: one dispatch point deciding how each value is treated
//! - `probe`: per-depth extents, iterator involvement and leaf samples
//! - `unify`: one `TypeDescriptor` from the probe and the hint
//! - `record`: struct field resolution for keyed and positional records
//! - `materialize`: a single depth-first write into arena regions
//!
//! ```
//! use ndconstruct::{construct, Hint, Value};
//!
//! let rows = Value::List(vec![Value::list([1, 2, 3]), Value::list([4])]);
//! let arr = construct(rows, &Hint::full("2, var, int64").unwrap()).unwrap();
//! assert_eq!(arr.shape(), vec![Some(2), None]);
//! ```

pub mod array;
pub mod classify;
pub mod config;
pub mod construct;
pub mod convert;
pub mod error;
pub mod materialize;
pub mod probe;
pub mod record;
pub mod unify;
pub mod value;

pub use array::ConstructedArray;
pub use classify::{classify, Classification, Classified, ScalarRef};
pub use config::{ConstructConfig, IntegerWidth, CONFIG_ENV};
pub use construct::{construct, Constructor, Hint};
pub use error::{ConstructError, ConstructResult, ErrorKind, Found};
pub use value::{Value, ValueIter};

pub use ndconstruct_parser::{
    parse_leaf, parse_type, Dimension, LeafType, ScalarKind, StringEncoding, StringType,
    StructField, StructType, TypeDescriptor,
};
pub use ndconstruct_storage::{ArenaStats, GrowthPolicy};
