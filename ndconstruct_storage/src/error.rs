//! Storage error types

use thiserror::Error;

use crate::arena::RegionId;
use crate::element::ElementKind;

/// Errors raised by the region arena
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// Append past the declared length of a fixed region
    #[error("RegionFull: fixed region {region} already holds {len} elements")]
    RegionFull { region: RegionId, len: usize },

    /// Fixed region frozen before every slot was written
    #[error("Underfilled: fixed region {region} holds {written} of {len} elements")]
    Underfilled {
        region: RegionId,
        written: usize,
        len: usize,
    },

    /// Write to or re-freeze of a frozen region
    #[error("Frozen: region {0} is frozen")]
    Frozen(RegionId),

    /// Scalar does not match the region's element kind
    #[error("KindMismatch: cannot store {found} in a {expected} region")]
    KindMismatch {
        expected: ElementKind,
        found: ElementKind,
    },

    /// Region id not issued by this arena
    #[error("UnknownRegion: no region {0}")]
    UnknownRegion(RegionId),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
