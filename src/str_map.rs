//! StrMap: open-addressing table keyed by byte strings.
//!
//! The key type decides who owns key memory: `String`, `Vec<u8>` or
//! `Box<[u8]>` keys are owned and dropped by the table, while `&str` or
//! `&[u8]` keys stay caller-owned. Either way keys compare byte-wise over
//! their full length, and lookups accept any `AsRef<[u8]>` query.

use crate::config::MapConfig;
use crate::error::MapError;
use crate::iter::{Cursor, Iter, Keys, Values};
use crate::probe::{RollingHash, SlotHasher};
use crate::probe_table::ProbeTable;
use core::fmt;

pub struct StrMap<K, V, H = RollingHash> {
    table: ProbeTable<K, V>,
    hasher: H,
}

impl<K, V> StrMap<K, V>
where
    K: AsRef<[u8]>,
{
    /// Empty table with `capacity` slots (a non-zero power of two) and the
    /// rolling hash.
    pub fn new(capacity: usize) -> Result<Self, MapError> {
        Self::with_hasher(capacity, RollingHash)
    }
}

impl<K, V, H> StrMap<K, V, H>
where
    K: AsRef<[u8]>,
    H: SlotHasher<[u8]>,
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

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Store `value` under `key`. On overwrite both the old key and the old
    /// value are dropped and the new key is kept.
    pub fn set(&mut self, key: K, value: V) -> Result<(), MapError> {
        self.insert(key, value).map(drop)
    }

    /// Like [`set`](Self::set), returning the replaced key and value.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<(K, V)>, MapError> {
        let hasher = &self.hasher;
        let hash = hasher.hash_key(key.as_ref());
        self.table.insert(
            hash,
            key,
            value,
            |a, b| a.as_ref() == b.as_ref(),
            |k| hasher.hash_key(k.as_ref()),
        )
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        let query = key.as_ref();
        let hash = self.hasher.hash_key(query);
        self.table.get(hash, |k| k.as_ref() == query)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        let query = key.as_ref();
        let hash = self.hasher.hash_key(query);
        self.table.get_mut(hash, |k| k.as_ref() == query)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        self.get_key_value(key).is_some()
    }

    /// Delete `key`, dropping the stored key and value. Returns false when
    /// absent.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        self.remove_entry(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Delete `key` and hand back the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        let query = key.as_ref();
        let hash = self.hasher.hash_key(query);
        self.table.remove(hash, |k| k.as_ref() == query)
    }

    pub fn grow(&mut self) -> Result<(), MapError> {
        let hasher = &self.hasher;
        self.table.grow(|k| hasher.hash_key(k.as_ref()))
    }

    /// Step `cursor` to the next live entry.
    pub fn next_entry(&self, cursor: &mut Cursor) -> Option<(&K, &V)> {
        self.table.next_entry(cursor)
    }

    pub fn next_key(&self, cursor: &mut Cursor) -> Option<&K> {
        self.next_entry(cursor).map(|(k, _)| k)
    }

    pub fn next_value(&self, cursor: &mut Cursor) -> Option<&V> {
        self.next_entry(cursor).map(|(_, v)| v)
    }

    /// Entries in insertion order.
    ///
    /// ```
    /// use probe_map::StrMap;
    ///
    /// let mut m = StrMap::new(8).unwrap();
    /// m.set("ba", 2).unwrap();
    /// m.set("ab", 1).unwrap();
    /// let keys: Vec<&str> = m.keys().copied().collect();
    /// assert_eq!(keys, ["ba", "ab"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Tear the table down, dropping every stored key and value.
    pub fn release(self) {
        drop(self);
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.table.assert_invariants();
    }
}

impl<'a, K, V, H> IntoIterator for &'a StrMap<K, V, H>
where
    K: AsRef<[u8]>,
    H: SlotHasher<[u8]>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H> fmt::Debug for StrMap<K, V, H>
where
    K: AsRef<[u8]> + fmt::Debug,
    V: fmt::Debug,
    H: SlotHasher<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
