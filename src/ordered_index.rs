//! Ordered slot index: the insertion-order record of written slots.
//!
//! Open addressing scatters entries across the slot array, so iterating
//! that array gives hash order and costs O(capacity). The index keeps one
//! entry per insertion instead, holding the slot position it wrote. A
//! delete retires its entry in place; iteration skips retired entries.

use crate::error::MapError;

/// Marker for an entry whose slot was deleted. Slot positions are always
/// below the table capacity, so the value can never collide with one.
const RETIRED: usize = usize::MAX;

/// Backing storage grows by this factor when full.
const GROWTH_FACTOR: usize = 4;

#[derive(Debug)]
pub(crate) struct OrderedSlotIndex {
    entries: Vec<usize>,
    capacity: usize,
    retired: usize,
}

impl OrderedSlotIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, MapError> {
        let capacity = capacity.max(1);
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|_| MapError::AllocationFailed { slots: capacity })?;
        Ok(Self {
            entries,
            capacity,
            retired: 0,
        })
    }

    /// Entries recorded since the last rebuild, retired ones included.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn retired(&self) -> usize {
        self.retired
    }

    pub(crate) fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity()
    }

    /// Guarantee room for one more `push` without reallocating, growing
    /// the backing storage 4x when it is full. Leaves the index untouched
    /// on failure.
    pub(crate) fn reserve_one(&mut self) -> Result<(), MapError> {
        if !self.is_full() {
            return Ok(());
        }
        let new_capacity = self
            .capacity
            .checked_mul(GROWTH_FACTOR)
            .ok_or(MapError::CapacityOverflow)?;
        self.entries
            .try_reserve_exact(new_capacity - self.entries.len())
            .map_err(|_| MapError::AllocationFailed {
                slots: new_capacity,
            })?;
        log::trace!(
            "ordered slot index grew from {} to {} entries",
            self.capacity,
            new_capacity
        );
        self.capacity = new_capacity;
        Ok(())
    }

    /// Record `slot` as the newest insertion; returns its index position.
    pub(crate) fn push(&mut self, slot: usize) -> Result<usize, MapError> {
        self.reserve_one()?;
        let pos = self.entries.len();
        self.entries.push(slot);
        Ok(pos)
    }

    /// Retire the entry at `pos`. Retiring twice is a no-op.
    pub(crate) fn retire(&mut self, pos: usize) {
        if let Some(entry) = self.entries.get_mut(pos) {
            if *entry != RETIRED {
                *entry = RETIRED;
                self.retired += 1;
            }
        }
    }

    /// First live entry at or after `from`, as `(position, slot)`.
    pub(crate) fn next_live(&self, from: usize) -> Option<(usize, usize)> {
        self.entries
            .get(from..)?
            .iter()
            .position(|&slot| slot != RETIRED)
            .map(|offset| (from + offset, self.entries[from + offset]))
    }

    /// Live entries in insertion order, as `(position, slot)`.
    pub(crate) fn iter_live(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, slot)| slot != RETIRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_slots(idx: &OrderedSlotIndex) -> Vec<usize> {
        idx.iter_live().map(|(_, slot)| slot).collect()
    }

    /// Invariant: positions are handed out in insertion order.
    #[test]
    fn push_returns_sequential_positions() {
        let mut idx = OrderedSlotIndex::with_capacity(8).unwrap();
        assert_eq!(idx.push(5).unwrap(), 0);
        assert_eq!(idx.push(1).unwrap(), 1);
        assert_eq!(idx.push(7).unwrap(), 2);
        assert_eq!(live_slots(&idx), vec![5, 1, 7]);
    }

    /// Invariant: a full index grows its storage 4x and keeps its prefix.
    #[test]
    fn full_index_grows_fourfold() {
        let mut idx = OrderedSlotIndex::with_capacity(2).unwrap();
        idx.push(3).unwrap();
        idx.push(4).unwrap();
        assert!(idx.is_full());
        assert_eq!(idx.capacity(), 2);

        idx.push(9).unwrap();
        assert_eq!(idx.capacity(), 8);
        assert_eq!(live_slots(&idx), vec![3, 4, 9]);
    }

    /// Invariant: retired entries are skipped but keep their positions.
    #[test]
    fn retire_hides_entry_without_shifting() {
        let mut idx = OrderedSlotIndex::with_capacity(4).unwrap();
        for slot in [10, 11, 12] {
            idx.push(slot).unwrap();
        }
        idx.retire(1);
        idx.retire(1);
        assert_eq!(idx.retired(), 1);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.next_live(0), Some((0, 10)));
        assert_eq!(idx.next_live(1), Some((2, 12)));
        assert_eq!(idx.next_live(3), None);
        assert_eq!(idx.next_live(99), None);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut idx = OrderedSlotIndex::with_capacity(0).unwrap();
        assert_eq!(idx.capacity(), 1);
        idx.push(0).unwrap();
        idx.push(0).unwrap();
        assert_eq!(idx.capacity(), 4);
    }

    #[test]
    fn impossible_reservation_fails_cleanly() {
        assert_eq!(
            OrderedSlotIndex::with_capacity(usize::MAX / 2).unwrap_err(),
            MapError::AllocationFailed {
                slots: usize::MAX / 2
            }
        );
    }
}
