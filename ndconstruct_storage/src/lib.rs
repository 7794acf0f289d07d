//! ndconstruct storage
//!
//! This crate provides the buffers that constructed arrays are written into:
//!
//! - `ElementKind` / `Scalar` for the storable element types
//! - `Column` for type-segregated vector storage
//! - `RegionArena` for fixed and growable regions with freeze semantics
//! - `StorageError` for error handling

pub mod arena;
pub mod column;
pub mod element;
pub mod error;

pub use arena::{ArenaStats, GrowthPolicy, RegionArena, RegionId, MAX_INITIAL_RESERVE};
pub use column::Column;
pub use element::{ElementKind, Scalar};
pub use error::{StorageError, StorageResult};
