//! Per-table construction parameters.

use crate::error::MapError;

/// Tombstone share of the capacity above which a table purges
/// tombstones (rebuilds at the same capacity) before using a fresh slot.
pub const DEFAULT_TOMBSTONE_RATIO: f64 = 0.20;

/// Construction parameters for `IntMap` and `StrMap`.
///
/// ```
/// use probe_map::{IntMap, MapConfig, IdentityHash};
///
/// let config = MapConfig::new(16).with_max_capacity(1024);
/// let mut m: IntMap<&str> = IntMap::with_config(config, IdentityHash).unwrap();
/// m.set(1, "one").unwrap();
/// assert_eq!(m.get(1), Some(&"one"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapConfig {
    /// Initial slot count; must be a non-zero power of two.
    pub capacity: usize,
    /// Growth past this many slots fails with `CapacityExceeded`.
    pub max_capacity: Option<usize>,
    /// See [`DEFAULT_TOMBSTONE_RATIO`]. Must lie in `(0, 1]`.
    pub tombstone_ratio: f64,
}

impl MapConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max_capacity: None,
            tombstone_ratio: DEFAULT_TOMBSTONE_RATIO,
        }
    }

    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    pub fn with_tombstone_ratio(mut self, ratio: f64) -> Self {
        self.tombstone_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if !self.capacity.is_power_of_two() {
            return Err(MapError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if let Some(max) = self.max_capacity {
            if !max.is_power_of_two() || max < self.capacity {
                return Err(MapError::InvalidConfig {
                    message: "max_capacity must be a power of two no smaller than capacity",
                });
            }
        }
        if !(self.tombstone_ratio > 0.0 && self.tombstone_ratio <= 1.0) {
            return Err(MapError::InvalidConfig {
                message: "tombstone_ratio must lie in (0, 1]",
            });
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new(8)
    }
}
