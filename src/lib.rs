//! probe-map: open-addressing hash tables keyed by `i64` or by byte
//! strings, iterating in insertion order.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one open-addressing engine shared by two typed front ends, so
//!   probing, tombstones, growth and ordering are implemented once.
//! - Layers:
//!   - `probe`: load factor, the probe sequence and the `SlotHasher`
//!     trait with the stock hashers.
//!   - `ordered_index`: the ordered slot index, an append-only record of
//!     written slots that gives insertion-order iteration without scanning
//!     the slot array.
//!   - `probe_table::ProbeTable<K, V>`: slot array, node arena, counters
//!     and the rebuild path. Key-agnostic: callers hand in the hash, an
//!     equality closure and a re-hash closure.
//!   - `IntMap<V, H>` and `StrMap<K, V, H>`: the public tables. They own
//!     a hasher and translate typed keys into engine calls.
//!
//! Constraints
//! - Capacity is always a power of two; home slot is `hash & (capacity - 1)`.
//! - Probe walk: home slot, then `+ 1·p + 3·p²` for `p = 1, 2, …`, at most
//!   `capacity` positions.
//! - A new key is placed only while `len + 1 < 0.60 · capacity`; the table
//!   doubles first otherwise.
//! - Deletes leave tombstones. Inserts may reuse them; rebuilds evict them.
//! - Iteration order is insertion order, kept across rebuilds. A deleted
//!   and re-inserted key moves to the end.
//! - Single-threaded: tables are `!Send`/`!Sync`. In debug builds a hasher
//!   that calls back into the table it is hashing for panics.
//!
//! Ownership
//! - Tables own their keys and values. Overwrite, delete and drop of the
//!   table each drop the affected key or value exactly once. To keep data
//!   caller-owned, store references (`&str`, `&[u8]`) or `Rc`s.
//!
//! Failure
//! - Only construction and growth fail, with [`MapError`]. A failed growth
//!   leaves the table's contents as they were and the entry not inserted.
//! - The slot array and the ordered index are reserved fallibly and report
//!   `AllocationFailed`. The node arena (one node per occupied slot) grows
//!   through `slotmap`'s infallible allocation, so running out of memory
//!   there aborts like any std collection.
//!
//! Logging
//! - Rebuilds report through the `log` facade: `debug` per rebuild,
//!   `trace` for ordered-index growth, `warn` when a rebuild has to double
//!   again to place every entry.

mod access;
pub mod config;
pub mod error;
pub mod int_map;
pub mod iter;
mod ordered_index;
pub mod probe;
mod probe_table;
mod probe_table_proptest;
pub mod str_map;

// Public surface
pub use config::{MapConfig, DEFAULT_TOMBSTONE_RATIO};
pub use error::MapError;
pub use int_map::IntMap;
pub use iter::{Cursor, Iter, Keys, Values};
pub use probe::{
    threshold_for, IdentityHash, MixHash, ProbeSeq, RollingHash, SlotHasher, StdHash, LOAD_FACTOR,
};
pub use str_map::StrMap;
