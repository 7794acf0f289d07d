//! Region arena
//!
//! Every buffer written during one construction lives in a `RegionArena`.
//! Regions are addressed by position (`RegionId`) and come in two flavours:
//!
//! - **fixed** regions have a length known up front and must be filled
//!   completely before they are frozen;
//! - **growable** regions start small and grow geometrically as elements are
//!   appended, with each reallocation counted in [`ArenaStats`].
//!
//! Freezing trims a region's capacity and makes it read-only. Dropping the
//! arena releases every region at once, which is how a failed construction
//! discards partial output.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::column::Column;
use crate::element::{ElementKind, Scalar};
use crate::error::{StorageError, StorageResult};

/// Most elements reserved for a region before any are written
///
/// Requested sizes come from hinted extents that the data has not confirmed
/// yet, so larger regions grow as they fill.
pub const MAX_INITIAL_RESERVE: usize = 1 << 16;

/// Position of a region inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capacity policy for growable regions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPolicy {
    /// Capacity a growable region never shrinks below while growing
    pub initial_capacity: usize,
    /// Multiplier applied on each reallocation (must exceed 1.0)
    pub growth_factor: f64,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            initial_capacity: 8,
            growth_factor: 2.0,
        }
    }
}

impl GrowthPolicy {
    /// Capacity to grow to once `capacity` is exhausted
    pub fn next_capacity(&self, capacity: usize) -> usize {
        let scaled = (capacity as f64 * self.growth_factor).ceil() as usize;
        scaled.max(capacity + 1).max(self.initial_capacity)
    }
}

/// Allocation counters for one arena
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaStats {
    pub fixed_regions: usize,
    pub growable_regions: usize,
    pub reallocations: usize,
    /// Bytes held by stored elements, string contents included
    pub bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RegionState {
    Fixed { len: usize },
    Growable { capacity: usize },
    Frozen,
}

#[derive(Debug, Clone)]
struct Region {
    column: Column,
    state: RegionState,
}

/// Owner of every region written by one construction
#[derive(Debug, Clone, Default)]
pub struct RegionArena {
    regions: Vec<Region>,
    policy: GrowthPolicy,
    stats: ArenaStats,
}

impl RegionArena {
    pub fn new(policy: GrowthPolicy) -> Self {
        Self {
            regions: Vec::new(),
            policy,
            stats: ArenaStats::default(),
        }
    }

    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            bytes: self.regions.iter().map(|r| r.column.byte_len()).sum(),
            ..self.stats
        }
    }

    /// Number of regions allocated so far
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Allocate a region that will hold exactly `len` elements
    ///
    /// At most [`MAX_INITIAL_RESERVE`] elements are reserved up front; the
    /// exact length is enforced by `append` and `freeze`.
    pub fn allocate_fixed(&mut self, kind: ElementKind, len: usize) -> RegionId {
        self.stats.fixed_regions += 1;
        self.push_region(Region {
            column: Column::with_capacity(kind, len.min(MAX_INITIAL_RESERVE)),
            state: RegionState::Fixed { len },
        })
    }

    /// Allocate a region that starts with room for `capacity` elements
    pub fn allocate_growable(&mut self, kind: ElementKind, capacity: usize) -> RegionId {
        let capacity = capacity.min(MAX_INITIAL_RESERVE);
        self.stats.growable_regions += 1;
        self.push_region(Region {
            column: Column::with_capacity(kind, capacity),
            state: RegionState::Growable { capacity },
        })
    }

    fn push_region(&mut self, region: Region) -> RegionId {
        let id = RegionId(self.regions.len());
        self.regions.push(region);
        id
    }

    fn region(&self, id: RegionId) -> StorageResult<&Region> {
        self.regions.get(id.0).ok_or(StorageError::UnknownRegion(id))
    }

    fn region_mut(&mut self, id: RegionId) -> StorageResult<&mut Region> {
        self.regions
            .get_mut(id.0)
            .ok_or(StorageError::UnknownRegion(id))
    }

    /// Append one element, growing the region if it is growable and full
    pub fn append(&mut self, id: RegionId, value: Scalar) -> StorageResult<()> {
        let policy = self.policy;
        let region = self.regions.get_mut(id.0).ok_or(StorageError::UnknownRegion(id))?;
        let written = region.column.len();

        match &mut region.state {
            RegionState::Frozen => return Err(StorageError::Frozen(id)),
            RegionState::Fixed { len } => {
                if written >= *len {
                    return Err(StorageError::RegionFull {
                        region: id,
                        len: *len,
                    });
                }
            }
            RegionState::Growable { capacity } => {
                if written >= *capacity {
                    let grown = policy.next_capacity(*capacity);
                    region.column.reserve_exact(grown - written);
                    trace!(region = id.0, from = *capacity, to = grown, "grow region");
                    *capacity = grown;
                    self.stats.reallocations += 1;
                }
            }
        }

        region.column.push(value)
    }

    /// Make a region read-only, trimming unused capacity
    pub fn freeze(&mut self, id: RegionId) -> StorageResult<()> {
        let region = self.region_mut(id)?;
        let written = region.column.len();
        match region.state {
            RegionState::Frozen => return Err(StorageError::Frozen(id)),
            RegionState::Fixed { len } if written < len => {
                return Err(StorageError::Underfilled {
                    region: id,
                    written,
                    len,
                })
            }
            RegionState::Fixed { .. } | RegionState::Growable { .. } => {}
        }
        if region.column.capacity() > written {
            region.column.shrink_to_fit();
        }
        region.state = RegionState::Frozen;
        Ok(())
    }

    pub fn is_frozen(&self, id: RegionId) -> StorageResult<bool> {
        Ok(self.region(id)?.state == RegionState::Frozen)
    }

    /// Read access to a region's elements
    pub fn column(&self, id: RegionId) -> StorageResult<&Column> {
        Ok(&self.region(id)?.column)
    }

    /// Number of elements written to a region
    pub fn region_len(&self, id: RegionId) -> StorageResult<usize> {
        Ok(self.region(id)?.column.len())
    }
}
