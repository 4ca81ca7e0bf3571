//! Insertion-order iteration shared by `IntMap` and `StrMap`.
//!
//! Both tables walk their ordered slot index through a [`Cursor`]. The
//! lazy iterators below are thin wrappers around a cursor; the cursor
//! itself is public so callers can step a table by hand and keep their
//! place between calls.

use crate::probe_table::ProbeTable;
use core::iter::FusedIterator;

/// Opaque position in a table's insertion order.
///
/// A cursor is plain data: it does not borrow the table, so it may be kept
/// across mutations. Deletes and updates never move positions, and entries
/// inserted after the cursor's position are still visited.
///
/// Only a rebuild renumbers positions. Rebuilds happen when a new key
/// doubles the table, on `grow`, on a tombstone purge, and when a new key
/// finds the ordered index grown to four times the slot count and mostly
/// deleted. A cursor held across a rebuild may skip entries; restart from
/// [`Cursor::start`] when that matters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub(crate) position: usize,
}

impl Cursor {
    /// Cursor before the first entry.
    pub const fn start() -> Self {
        Self { position: 0 }
    }
}

/// Iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    table: &'a ProbeTable<K, V>,
    cursor: Cursor,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(table: &'a ProbeTable<K, V>) -> Self {
        Self {
            table,
            cursor: Cursor::start(),
            remaining: table.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.table.next_entry(&mut self.cursor)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

/// Iterator over keys in insertion order.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over values in insertion order.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}
