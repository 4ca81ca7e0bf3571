//! Probe & hash engine: home slots and the probe sequence walked by every
//! lookup, insert and delete.
//!
//! The sequence from a home slot `h` visits `h`, then repeatedly adds
//! `1·p + 3·p²` for `p = 1, 2, 3, …`, masked to the table size. Its
//! cumulative offset is `n·(n+1)²`, a polynomial, so modulo a power-of-two
//! capacity it repeats with a period dividing the capacity. A walk
//! therefore never needs more than `capacity` positions to see every slot
//! it can ever reach.

use core::hash::{BuildHasher, Hash};

/// Occupancy fraction at which a table grows before the next insert.
pub const LOAD_FACTOR: f64 = 0.60;

const PROBE_LINEAR: usize = 1;
const PROBE_QUADRATIC: usize = 3;

/// Live-entry threshold for a table of `capacity` slots.
#[inline]
pub fn threshold_for(capacity: usize) -> usize {
    (capacity as f64 * LOAD_FACTOR) as usize
}

/// Slot positions visited for one hash, home slot first.
///
/// Yields at most `mask + 1` positions; positions may repeat once the
/// sequence wraps its period.
#[derive(Clone, Debug)]
pub struct ProbeSeq {
    pos: usize,
    mask: usize,
    probe: usize,
    remaining: usize,
}

impl ProbeSeq {
    #[inline]
    pub fn new(hash: u64, mask: usize) -> Self {
        Self {
            pos: (hash as usize) & mask,
            mask,
            probe: 0,
            remaining: mask.wrapping_add(1).max(1),
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.probe > 0 {
            let p = self.probe;
            let step = PROBE_LINEAR
                .wrapping_mul(p)
                .wrapping_add(PROBE_QUADRATIC.wrapping_mul(p).wrapping_mul(p));
            self.pos = self.pos.wrapping_add(step) & self.mask;
        }
        self.probe += 1;
        Some(self.pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Maps a key to a 64-bit hash; tables mask it down to a home slot.
///
/// Implementations must be deterministic for the lifetime of a table:
/// growth re-hashes stored keys with the same hasher.
pub trait SlotHasher<Q: ?Sized> {
    fn hash_key(&self, key: &Q) -> u64;
}

/// Integer identity: home slot is `key & mask`.
///
/// Keys sharing their low bits pile onto the same home slot; prefer
/// [`MixHash`] for strided or aligned keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityHash;

impl SlotHasher<i64> for IdentityHash {
    #[inline]
    fn hash_key(&self, key: &i64) -> u64 {
        *key as u64
    }
}

/// SplitMix64 finalizer over the integer key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MixHash;

impl SlotHasher<i64> for MixHash {
    #[inline]
    fn hash_key(&self, key: &i64) -> u64 {
        let mut z = (*key as u64).wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

/// Polynomial rolling hash over the key bytes: `hash = hash * 31 + byte`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RollingHash;

impl SlotHasher<[u8]> for RollingHash {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u64 {
        key.iter()
            .fold(0u64, |h, &b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
    }
}

/// Adapter for any std `BuildHasher` (e.g. `RandomState`).
#[derive(Clone, Debug, Default)]
pub struct StdHash<S>(pub S);

impl<S, Q> SlotHasher<Q> for StdHash<S>
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    #[inline]
    fn hash_key(&self, key: &Q) -> u64 {
        self.0.hash_one(key)
    }
}
