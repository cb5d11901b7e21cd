// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::rtree::RTreeF64;
use crate::types::Aabb2D;

/// Generational handle for entries.
///
/// A key stays valid until its entry is removed; a reused slot gets a new
/// generation, so stale keys never alias a different entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<T, P> {
    generation: u32,
    aabb: Aabb2D<T>,
    payload: P,
}

/// A generic AABB index parameterized by a spatial backend.
///
/// Insertions and removals are applied to the backend immediately.
#[derive(Debug)]
pub struct IndexGeneric<T: Copy + PartialOrd + Debug, P: Copy + Debug, B: Backend<T>> {
    entries: Vec<Option<Entry<T, P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    len: usize,
    backend: B,
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T, P, B> Default for IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Create an empty index around an existing (empty) backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            backend,
        }
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] += 1;
            idx
        } else {
            self.entries.push(None);
            self.generations.push(1);
            self.entries.len() - 1
        };
        let generation = self.generations[idx];
        self.entries[idx] = Some(Entry {
            generation,
            aabb,
            payload,
        });
        self.backend.insert(idx, aabb);
        self.len += 1;
        Key::new(idx, generation)
    }

    /// Remove an entry, returning its payload.
    ///
    /// Returns `None` for stale or unknown keys; the index is unchanged.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        self.entry(key)?;
        let entry = self.entries[key.idx()].take()?;
        let removed = self.backend.remove(key.idx());
        debug_assert!(removed, "backend lost track of slot {}", key.idx());
        self.free_list.push(key.idx());
        self.len -= 1;
        Some(entry.payload)
    }

    /// The AABB an entry was stored under.
    pub fn aabb(&self, key: Key) -> Option<Aabb2D<T>> {
        self.entry(key).map(|e| e.aabb)
    }

    /// Whether `key` refers to a live entry.
    pub fn contains_key(&self, key: Key) -> bool {
        self.entry(key).is_some()
    }

    /// Clear the index.
    ///
    /// Slot generations survive, so keys issued before the clear stay stale.
    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
        self.free_list.clear();
        self.free_list.extend((0..self.entries.len()).rev());
        self.len = 0;
        self.backend.clear();
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        self.backend.query_rect(rect).filter_map(move |i| {
            let e = self.entries.get(i)?.as_ref()?;
            Some((Key::new(i, e.generation), e.payload))
        })
    }

    /// Whether any entry's AABB intersects the given rectangle.
    pub fn any_in_rect(&self, rect: Aabb2D<T>) -> bool {
        self.backend.any_in_rect(rect)
    }

    /// Iterate over all live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Aabb2D<T>, P)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            let e = e.as_ref()?;
            Some((Key::new(i, e.generation), e.aabb, e.payload))
        })
    }

    fn entry(&self, key: Key) -> Option<&Entry<T, P>> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }
}

/// Default index using a flat vector backend.
pub type Index<T, P> = IndexGeneric<T, P, FlatVec<T>>;

/// Index over `f64` boxes backed by an R-tree.
pub type RTreeIndex<P> = IndexGeneric<f64, P, RTreeF64>;

impl<P: Copy + Debug> Index<f64, P> {
    /// Create an R-tree-backed index (f64 coordinates).
    pub fn with_rtree() -> RTreeIndex<P> {
        IndexGeneric::with_backend(RTreeF64::default())
    }

    /// Build an R-tree-backed index in bulk from entries.
    pub fn with_rtree_bulk(entries: &[(Aabb2D<f64>, P)]) -> RTreeIndex<P> {
        let mut idx = IndexGeneric::with_backend(RTreeF64::default());
        let mut pairs: Vec<(usize, Aabb2D<f64>)> = Vec::with_capacity(entries.len());
        for (i, (aabb, payload)) in entries.iter().copied().enumerate() {
            idx.entries.push(Some(Entry {
                generation: 1,
                aabb,
                payload,
            }));
            idx.generations.push(1);
            pairs.push((i, aabb));
        }
        idx.len = entries.len();
        idx.backend = RTreeF64::bulk_load(&pairs);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn insert_and_query() {
        let mut idx: Index<i64, u32> = Index::new();
        let _ = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        let _ = idx.insert(Aabb2D::new(5, 5, 15, 15), 2);
        let mut hits: Vec<_> = idx
            .query_rect(Aabb2D::new(12, 12, 20, 20))
            .map(|(_, p)| p)
            .collect();
        hits.sort_unstable();
        assert_eq!(hits, [2]);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn remove_returns_payload_once() {
        let mut idx: Index<i64, u32> = Index::new();
        let k = idx.insert(Aabb2D::new(0, 0, 10, 10), 7);
        assert_eq!(idx.remove(k), Some(7));
        assert_eq!(idx.remove(k), None, "stale key removes nothing");
        assert!(idx.is_empty());
        assert_eq!(idx.query_rect(Aabb2D::new(1, 1, 2, 2)).count(), 0);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut idx: Index<i64, u32> = Index::new();
        let k1 = idx.insert(Aabb2D::new(0, 0, 1, 1), 1);
        let _ = idx.remove(k1);
        let k2 = idx.insert(Aabb2D::new(0, 0, 1, 1), 2);
        assert_ne!(k1, k2, "slot reuse must not alias the old key");
        assert!(!idx.contains_key(k1));
        assert_eq!(idx.remove(k1), None);
        assert_eq!(idx.aabb(k2), Some(Aabb2D::new(0, 0, 1, 1)));
    }

    #[test]
    fn keys_stay_stale_across_clear() {
        let mut idx: Index<i64, u32> = Index::new();
        let k1 = idx.insert(Aabb2D::new(0, 0, 1, 1), 1);
        idx.clear();
        let k2 = idx.insert(Aabb2D::new(0, 0, 1, 1), 2);
        assert_ne!(k1, k2);
        assert_eq!(idx.remove(k1), None, "pre-clear key must not remove the new entry");
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn rtree_index_matches_flat_index() {
        let mut flat: Index<f64, u32> = Index::new();
        let mut tree = Index::<f64, u32>::with_rtree();
        for i in 0..200_u32 {
            let x = f64::from(i % 20) * 7.0;
            let y = f64::from(i / 20) * 7.0;
            let r = Aabb2D::from_xywh(x, y, 5.0, 5.0);
            let _ = flat.insert(r, i);
            let _ = tree.insert(r, i);
        }
        let q = Aabb2D::new(20.0, 20.0, 60.0, 45.0);
        let mut a: Vec<_> = flat.query_rect(q).map(|(_, p)| p).collect();
        let mut b: Vec<_> = tree.query_rect(q).map(|(_, p)| p).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn bulk_rtree_supports_removal() {
        let entries: Vec<_> = (0..10_u32)
            .map(|i| (Aabb2D::from_xywh(f64::from(i) * 10.0, 0.0, 5.0, 5.0), i))
            .collect();
        let mut idx = Index::<f64, u32>::with_rtree_bulk(&entries);
        assert_eq!(idx.len(), 10);
        let (k, _, _) = idx.iter().find(|(_, _, p)| *p == 4).unwrap();
        assert_eq!(idx.remove(k), Some(4));
        assert!(!idx.any_in_rect(Aabb2D::from_xywh(41.0, 1.0, 1.0, 1.0)));
        let k = idx.insert(Aabb2D::from_xywh(41.0, 1.0, 1.0, 1.0), 99);
        assert_eq!(idx.query_rect(Aabb2D::from_xywh(41.0, 1.0, 1.0, 1.0)).next(), Some((k, 99)));
    }
}
