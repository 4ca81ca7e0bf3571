//! Error type shared by every table operation that can fail.

use thiserror::Error;

/// Failure of a construction or growth step. Every variant leaves the
/// table exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Initial capacity was zero or not a power of two.
    #[error("capacity {capacity} is not a non-zero power of two")]
    InvalidCapacity { capacity: usize },

    /// A `MapConfig` field other than the capacity is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: &'static str },

    /// The allocator refused the slot array or the ordered index.
    #[error("allocation of {slots} slots failed")]
    AllocationFailed { slots: usize },

    /// Doubling the capacity would overflow `usize`.
    #[error("capacity overflow while growing")]
    CapacityOverflow,

    /// Growth would pass the configured maximum capacity.
    #[error("growing to {requested} slots exceeds the configured maximum of {max}")]
    CapacityExceeded { requested: usize, max: usize },
}
