//! ProbeTable: the key-agnostic open-addressing engine behind `IntMap`
//! and `StrMap`.
//!
//! Layout
//! - `cells`: the slot array. `None` marks a never-used slot; `Some(node)`
//!   points into the node arena.
//! - `nodes`: a slotmap arena of `Node`s. A node whose `entry` is `None` is
//!   a tombstone: its key and value were handed back at delete time, the
//!   node itself stays so probe walks keep passing through its slot. Rebuilds
//!   evict tombstones.
//! - `order`: the ordered slot index. Every live node stores its own
//!   position in it, so a delete retires exactly its own entry.
//!
//! Callers pass the query hash plus a key-equality closure, and a re-hash
//! closure for operations that may rebuild, in the style of hashbrown's
//! `HashTable`. The table never hashes keys itself.
//!
//! Growth policy
//! - A new live entry is placed only while `len + 1 < threshold`; otherwise
//!   the table doubles first. Updates of a present key never grow.
//! - A walk that finds neither a free slot nor a tombstone forces a
//!   doubling; a rebuild that cannot place an entry doubles again.
//! - Rebuilds allocate the new slot array and index before touching the
//!   table, so a failed allocation leaves it unchanged.
//!
//! Ordered index
//! - Outside rebuilds the index only appends and retires, so positions stay
//!   put and a cursor keeps its place. It grows 4x when full.
//! - Every rebuild writes a fresh index holding only live entries. Once the
//!   index spans `ORDER_SPAN` times the slot count and is at least half
//!   retired, the next new key triggers a same-capacity rebuild instead of
//!   another 4x growth.

use crate::access::ExclusiveAccess;
use crate::config::MapConfig;
use crate::error::MapError;
use crate::iter::Cursor;
use crate::ordered_index::OrderedSlotIndex;
use crate::probe::{threshold_for, ProbeSeq};
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Node<K, V> {
    entry: Option<(K, V)>,
    order: usize,
}

/// Where an insert-side walk stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// The slot holds the query key.
    Match(usize),
    /// Key absent; first tombstone on the walk.
    Reuse(usize),
    /// Key absent; never-used slot and no tombstone before it.
    Free(usize),
    /// Key absent; the walk saw only other live keys.
    Exhausted,
}

type Cells = Vec<Option<DefaultKey>>;

/// Index capacity, as a multiple of the slot count, past which a mostly
/// retired index is rebuilt rather than grown.
const ORDER_SPAN: usize = 4;

fn alloc_cells(capacity: usize) -> Result<Cells, MapError> {
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(capacity)
        .map_err(|_| MapError::AllocationFailed { slots: capacity })?;
    cells.resize(capacity, None);
    Ok(cells)
}

struct Slots<K, V> {
    cells: Cells,
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    order: OrderedSlotIndex,
    len: usize,
    tombstones: usize,
    mask: usize,
    threshold: usize,
    max_capacity: Option<usize>,
    tombstone_ratio: f64,
}

impl<K, V> Slots<K, V> {
    fn new(config: &MapConfig) -> Result<Self, MapError> {
        config.validate()?;
        let capacity = config.capacity;
        let cells = alloc_cells(capacity)?;
        let order = OrderedSlotIndex::with_capacity(capacity)?;
        Ok(Self {
            cells,
            nodes: SlotMap::with_capacity(threshold_for(capacity)),
            order,
            len: 0,
            tombstones: 0,
            mask: capacity - 1,
            threshold: threshold_for(capacity),
            max_capacity: config.max_capacity,
            tombstone_ratio: config.tombstone_ratio,
        })
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn threshold(&self) -> usize {
        self.threshold
    }

    fn tombstones(&self) -> usize {
        self.tombstones
    }

    fn node_at(&self, pos: usize) -> Option<&Node<K, V>> {
        self.cells[pos].and_then(|node| self.nodes.get(node))
    }

    /// Lookup/delete walk: stops at the first never-used slot. Tombstones
    /// never match, so the walk passes through them.
    fn find_node(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<DefaultKey> {
        for pos in ProbeSeq::new(hash, self.mask) {
            let node = self.cells[pos]?;
            if let Some((k, _)) = &self.nodes[node].entry {
                if eq(k) {
                    return Some(node);
                }
            }
        }
        None
    }

    /// Insert walk: remembers the first tombstone but keeps going until a
    /// match or a never-used slot, so a key stored past a tombstone is
    /// found rather than duplicated.
    fn search(&self, hash: u64, eq: &impl Fn(&K) -> bool) -> Probe {
        let mut reusable = None;
        for pos in ProbeSeq::new(hash, self.mask) {
            let Some(node) = self.node_at(pos) else {
                return match reusable {
                    Some(tomb) => Probe::Reuse(tomb),
                    None => Probe::Free(pos),
                };
            };
            match &node.entry {
                Some((k, _)) if eq(k) => return Probe::Match(pos),
                Some(_) => {}
                None => {
                    reusable.get_or_insert(pos);
                }
            }
        }
        reusable.map_or(Probe::Exhausted, Probe::Reuse)
    }

    fn get(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &V)> {
        let node = self.find_node(hash, eq)?;
        self.nodes[node].entry.as_ref().map(|(k, v)| (k, v))
    }

    fn get_mut(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<&mut V> {
        let node = self.find_node(hash, eq)?;
        self.nodes[node].entry.as_mut().map(|(_, v)| v)
    }

    /// Store `key -> value`; `eq(stored, &key)` decides key equality. A
    /// present key is overwritten in place and the previous pair returned.
    /// Otherwise the table may rebuild first, then the pair takes a
    /// tombstone or a never-used slot and is appended to the ordered index.
    fn insert(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        eq: impl Fn(&K, &K) -> bool,
        rehash: impl Fn(&K) -> u64,
    ) -> Result<Option<(K, V)>, MapError> {
        let eq = |stored: &K| eq(stored, &key);
        let mut probe = self.search(hash, &eq);
        if let Probe::Match(pos) = probe {
            if let Some(node) = self.cells[pos] {
                return Ok(self.nodes[node].entry.replace((key, value)));
            }
        }

        if self.len + 1 >= self.threshold {
            let mut target = self.doubled(self.capacity())?;
            while self.len + 1 >= threshold_for(target) {
                target = self.doubled(target)?;
            }
            self.rebuild(target, &rehash)?;
            probe = self.search(hash, &eq);
        } else if self.order_is_stale()
            || (matches!(probe, Probe::Free(_)) && self.over_tombstone_budget())
        {
            self.rebuild(self.capacity(), &rehash)?;
            probe = self.search(hash, &eq);
        }

        let (pos, reuse) = loop {
            match probe {
                Probe::Reuse(pos) => break (pos, true),
                Probe::Free(pos) => break (pos, false),
                // A rebuild cannot produce a match for an absent key.
                Probe::Match(_) | Probe::Exhausted => {
                    let target = self.doubled(self.capacity())?;
                    self.rebuild(target, &rehash)?;
                    probe = self.search(hash, &eq);
                }
            }
        };

        let at = self.order.push(pos)?;
        match self.cells[pos] {
            Some(node) if reuse => {
                let node = &mut self.nodes[node];
                node.entry = Some((key, value));
                node.order = at;
                self.tombstones -= 1;
            }
            _ => {
                let node = self.nodes.insert(Node {
                    entry: Some((key, value)),
                    order: at,
                });
                self.cells[pos] = Some(node);
            }
        }
        self.len += 1;
        Ok(None)
    }

    /// Take the pair out of its slot, leaving a tombstone and retiring its
    /// ordered-index entry.
    fn remove(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(K, V)> {
        let node = self.find_node(hash, eq)?;
        let node = &mut self.nodes[node];
        let entry = node.entry.take()?;
        self.order.retire(node.order);
        self.len -= 1;
        self.tombstones += 1;
        Some(entry)
    }

    /// Double the capacity once (or more, if an entry cannot be placed).
    fn grow(&mut self, rehash: impl Fn(&K) -> u64) -> Result<(), MapError> {
        let target = self.doubled(self.capacity())?;
        self.rebuild(target, &rehash)
    }

    /// Next live pair at or after `cursor`, advancing it past the pair.
    fn next_entry(&self, cursor: &mut Cursor) -> Option<(&K, &V)> {
        while let Some((at, slot)) = self.order.next_live(cursor.position) {
            cursor.position = at + 1;
            if let Some((k, v)) = self.node_at(slot).and_then(|n| n.entry.as_ref()) {
                return Some((k, v));
            }
        }
        cursor.position = cursor.position.max(self.order.len());
        None
    }

    fn doubled(&self, capacity: usize) -> Result<usize, MapError> {
        let target = capacity
            .checked_mul(2)
            .ok_or(MapError::CapacityOverflow)?;
        match self.max_capacity {
            Some(max) if target > max => Err(MapError::CapacityExceeded {
                requested: target,
                max,
            }),
            _ => Ok(target),
        }
    }

    fn over_tombstone_budget(&self) -> bool {
        self.tombstones > 0
            && self.tombstones as f64 > self.tombstone_ratio * self.capacity() as f64
    }

    /// Full, at least half retired, and already grown well past the slot
    /// count.
    fn order_is_stale(&self) -> bool {
        self.order.is_full()
            && self.order.retired() * 2 >= self.order.len()
            && self.order.capacity() >= ORDER_SPAN * self.capacity()
    }

    fn rebuild(&mut self, capacity: usize, rehash: &impl Fn(&K) -> u64) -> Result<(), MapError> {
        let mut target = capacity;
        let (cells, order) = loop {
            match self.rehome(target, rehash)? {
                Some(built) => break built,
                None => {
                    let next = self.doubled(target)?;
                    log::warn!(
                        "rebuild at {} slots could not place every entry; retrying at {}",
                        target,
                        next
                    );
                    target = next;
                }
            }
        };
        self.commit(cells, order);
        Ok(())
    }

    /// Build a slot array and index of `capacity` holding every live entry,
    /// walking the old index so insertion order survives. `None` when some
    /// entry finds no reachable free slot.
    fn rehome(
        &self,
        capacity: usize,
        rehash: &impl Fn(&K) -> u64,
    ) -> Result<Option<(Cells, OrderedSlotIndex)>, MapError> {
        let mut cells = alloc_cells(capacity)?;
        let mut order = OrderedSlotIndex::with_capacity(capacity)?;
        let mask = capacity - 1;
        for (_, slot) in self.order.iter_live() {
            let Some(node) = self.cells[slot] else {
                continue;
            };
            let Some((key, _)) = &self.nodes[node].entry else {
                continue;
            };
            let free = ProbeSeq::new(rehash(key), mask).find(|&pos| cells[pos].is_none());
            let Some(pos) = free else {
                return Ok(None);
            };
            cells[pos] = Some(node);
            order.push(pos)?;
        }
        Ok(Some((cells, order)))
    }

    fn commit(&mut self, cells: Cells, order: OrderedSlotIndex) {
        let old_capacity = self.capacity();
        let evicted = self.tombstones;
        for (at, slot) in order.iter_live() {
            if let Some(node) = cells[slot] {
                if let Some(node) = self.nodes.get_mut(node) {
                    node.order = at;
                }
            }
        }
        self.nodes.retain(|_, node| node.entry.is_some());
        self.mask = cells.len() - 1;
        self.threshold = threshold_for(cells.len());
        self.cells = cells;
        self.order = order;
        self.tombstones = 0;
        log::debug!(
            "rebuilt probe table: {} -> {} slots, {} live, {} tombstones evicted",
            old_capacity,
            self.capacity(),
            self.len,
            evicted
        );
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        let capacity = self.capacity();
        assert!(capacity.is_power_of_two());
        assert_eq!(self.cells.len(), capacity);
        assert_eq!(self.threshold, threshold_for(capacity));
        assert!(self.len <= self.threshold, "len {} over threshold {}", self.len, self.threshold);

        let live = self.nodes.values().filter(|n| n.entry.is_some()).count();
        assert_eq!(live, self.len);
        assert_eq!(self.nodes.len() - live, self.tombstones);
        assert_eq!(
            self.cells.iter().filter(|c| c.is_some()).count(),
            self.nodes.len(),
            "every node sits in exactly one slot"
        );

        let mut seen = 0;
        for (at, slot) in self.order.iter_live() {
            let node = self.node_at(slot).expect("live index entry points at a node");
            assert!(node.entry.is_some(), "live index entry points at a tombstone");
            assert_eq!(node.order, at);
            seen += 1;
        }
        assert_eq!(seen, self.len);
    }
}

/// Open-addressing table with its exclusive-access guard. Every entry
/// point enters the guard before touching the slots.
pub(crate) struct ProbeTable<K, V> {
    slots: Slots<K, V>,
    access: ExclusiveAccess,
}

impl<K, V> ProbeTable<K, V> {
    pub(crate) fn new(config: &MapConfig) -> Result<Self, MapError> {
        Ok(Self {
            slots: Slots::new(config)?,
            access: ExclusiveAccess::new(),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) fn threshold(&self) -> usize {
        self.slots.threshold()
    }

    pub(crate) fn tombstones(&self) -> usize {
        self.slots.tombstones()
    }

    pub(crate) fn get(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(&K, &V)> {
        let _g = self.access.enter();
        self.slots.get(hash, eq)
    }

    pub(crate) fn get_mut(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<&mut V> {
        let _g = self.access.enter();
        self.slots.get_mut(hash, eq)
    }

    pub(crate) fn insert(
        &mut self,
        hash: u64,
        key: K,
        value: V,
        eq: impl Fn(&K, &K) -> bool,
        rehash: impl Fn(&K) -> u64,
    ) -> Result<Option<(K, V)>, MapError> {
        let _g = self.access.enter();
        self.slots.insert(hash, key, value, eq, rehash)
    }

    pub(crate) fn remove(&mut self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<(K, V)> {
        let _g = self.access.enter();
        self.slots.remove(hash, eq)
    }

    pub(crate) fn grow(&mut self, rehash: impl Fn(&K) -> u64) -> Result<(), MapError> {
        let _g = self.access.enter();
        self.slots.grow(rehash)
    }

    pub(crate) fn next_entry(&self, cursor: &mut Cursor) -> Option<(&K, &V)> {
        let _g = self.access.enter();
        self.slots.next_entry(cursor)
    }

    /// Structural invariants; panics on the first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.slots.assert_invariants();
    }
}
