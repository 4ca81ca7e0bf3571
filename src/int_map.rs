//! IntMap: open-addressing table keyed by `i64`.
//!
//! Every `i64` is a valid key, `i64::MAX` included: tombstones are a state
//! of the slot, not a reserved key value.
//!
//! Values are owned by the table. Overwrite, delete and drop of the table
//! each drop a stored value exactly once; to keep values caller-owned,
//! store a reference or an `Rc`.

use crate::config::MapConfig;
use crate::error::MapError;
use crate::iter::{Cursor, Iter, Keys, Values};
use crate::probe::{IdentityHash, SlotHasher};
use crate::probe_table::ProbeTable;
use core::fmt;

pub struct IntMap<V, H = IdentityHash> {
    table: ProbeTable<i64, V>,
    hasher: H,
}

impl<V> IntMap<V> {
    /// Empty table with `capacity` slots (a non-zero power of two) and the
    /// identity hash.
    pub fn new(capacity: usize) -> Result<Self, MapError> {
        Self::with_hasher(capacity, IdentityHash)
    }
}

impl<V, H> IntMap<V, H>
where
    H: SlotHasher<i64>,
{
    pub fn with_hasher(capacity: usize, hasher: H) -> Result<Self, MapError> {
        Self::with_config(MapConfig::new(capacity), hasher)
    }

    pub fn with_config(config: MapConfig, hasher: H) -> Result<Self, MapError> {
        Ok(Self {
            table: ProbeTable::new(&config)?,
            hasher,
        })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Current slot count; always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Live-entry count at which the next new key doubles the table.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Deleted slots still holding their place until the next rebuild.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Fails only when a required growth fails; the table is then left
    /// exactly as it was.
    pub fn set(&mut self, key: i64, value: V) -> Result<(), MapError> {
        self.insert(key, value).map(drop)
    }

    /// Like [`set`](Self::set), returning the value that was replaced.
    pub fn insert(&mut self, key: i64, value: V) -> Result<Option<V>, MapError> {
        let hasher = &self.hasher;
        let hash = hasher.hash_key(&key);
        let old = self
            .table
            .insert(hash, key, value, |a, b| a == b, |k| hasher.hash_key(k))?;
        Ok(old.map(|(_, v)| v))
    }

    pub fn get(&self, key: i64) -> Option<&V> {
        let hash = self.hasher.hash_key(&key);
        self.table.get(hash, |k| *k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let hash = self.hasher.hash_key(&key);
        self.table.get_mut(hash, |k| *k == key)
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Delete `key`, dropping its value. Returns false when absent.
    pub fn delete(&mut self, key: i64) -> bool {
        self.remove(key).is_some()
    }

    /// Delete `key` and hand its value back instead of dropping it.
    pub fn remove(&mut self, key: i64) -> Option<V> {
        let hash = self.hasher.hash_key(&key);
        self.table.remove(hash, |k| *k == key).map(|(_, v)| v)
    }

    /// Double the capacity now rather than on a later insert.
    pub fn grow(&mut self) -> Result<(), MapError> {
        let hasher = &self.hasher;
        self.table.grow(|k| hasher.hash_key(k))
    }

    /// Step `cursor` to the next live entry.
    ///
    /// ```
    /// use probe_map::{Cursor, IntMap};
    ///
    /// let mut m = IntMap::new(8).unwrap();
    /// m.set(7, "seven").unwrap();
    /// m.set(3, "three").unwrap();
    ///
    /// let mut cursor = Cursor::start();
    /// assert_eq!(m.next_entry(&mut cursor), Some((7, &"seven")));
    /// assert_eq!(m.next_entry(&mut cursor), Some((3, &"three")));
    /// assert_eq!(m.next_entry(&mut cursor), None);
    /// ```
    pub fn next_entry(&self, cursor: &mut Cursor) -> Option<(i64, &V)> {
        self.table.next_entry(cursor).map(|(k, v)| (*k, v))
    }

    pub fn next_key(&self, cursor: &mut Cursor) -> Option<i64> {
        self.next_entry(cursor).map(|(k, _)| k)
    }

    pub fn next_value(&self, cursor: &mut Cursor) -> Option<&V> {
        self.next_entry(cursor).map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> Iter<'_, i64, V> {
        Iter::new(&self.table)
    }

    pub fn keys(&self) -> Keys<'_, i64, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, i64, V> {
        Values { inner: self.iter() }
    }

    /// Tear the table down, dropping every stored value.
    pub fn release(self) {
        drop(self);
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.table.assert_invariants();
    }
}

impl<'a, V, H> IntoIterator for &'a IntMap<V, H>
where
    H: SlotHasher<i64>,
{
    type Item = (&'a i64, &'a V);
    type IntoIter = Iter<'a, i64, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, H: SlotHasher<i64>> fmt::Debug for IntMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
