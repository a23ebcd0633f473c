// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::rtree::RTree;
use crate::types::{Aabb2D, Scalar};

/// Generational handle for entries.
///
/// A key stays invalid after its entry is removed, even when the slot is
/// later reused for a new entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are 32-bit; an index never holds more than u32::MAX slots."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Slot<T, P> {
    generation: u32,
    entry: Option<(Aabb2D<T>, P)>,
}

/// A generic AABB index parameterized by a spatial backend.
///
/// Changes reach the backend immediately; queries always observe the latest
/// inserts, moves and removals.
#[derive(Debug)]
pub struct IndexGeneric<T: Scalar, P: Copy + Debug, B: Backend<T>> {
    slots: Vec<Slot<T, P>>,
    free_list: Vec<usize>,
    len: usize,
    backend: B,
    scratch: Vec<usize>,
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Scalar,
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
    T: Scalar,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Scalar,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Create an empty index over a preconfigured backend.
    ///
    /// The backend is cleared so stale slots can't leak into query results.
    pub fn with_backend(mut backend: B) -> Self {
        backend.clear();
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            backend,
            scratch: Vec::new(),
        }
    }

    /// Reserve space for at least `n` more entries.
    pub fn reserve(&mut self, n: usize) {
        self.slots.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Access the backend, mostly for diagnostics.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn claim_slot(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        self.len += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some((aabb, payload));
            Key::new(idx, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                entry: Some((aabb, payload)),
            });
            Key::new(self.slots.len() - 1, 1)
        }
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let key = self.claim_slot(aabb, payload);
        self.backend.insert(key.idx(), aabb);
        key
    }

    /// Insert many entries at once, letting the backend pack them.
    ///
    /// Returns keys in input order.
    pub fn bulk_load(&mut self, entries: &[(Aabb2D<T>, P)]) -> Vec<Key> {
        let mut keys = Vec::with_capacity(entries.len());
        let mut pairs = Vec::with_capacity(entries.len());
        for &(aabb, payload) in entries {
            let key = self.claim_slot(aabb, payload);
            pairs.push((key.idx(), aabb));
            keys.push(key);
        }
        self.backend.bulk_load(&pairs);
        keys
    }

    /// Move an existing entry. Returns `false` for stale keys.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        let Some((current, _)) = self.entry_mut(key) else {
            return false;
        };
        if *current != aabb {
            *current = aabb;
            self.backend.update(key.idx(), aabb);
        }
        true
    }

    /// Remove an entry, returning its payload. Stale keys return `None`.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        self.entry_mut(key)?;
        let (_, payload) = self.slots[key.idx()].entry.take()?;
        self.backend.remove(key.idx());
        self.free_list.push(key.idx());
        self.len -= 1;
        Some(payload)
    }

    /// Look up an entry's box and payload.
    pub fn get(&self, key: Key) -> Option<(Aabb2D<T>, P)> {
        let slot = self.slots.get(key.idx())?;
        if slot.generation != key.1 {
            return None;
        }
        slot.entry
    }

    /// Iterate over all live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Aabb2D<T>, P)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entry
                .map(|(aabb, payload)| (Key::new(i, s.generation), aabb, payload))
        })
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
        self.backend.clear();
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&mut self, x: T, y: T) -> impl Iterator<Item = (Key, P)> + '_ {
        self.scratch.clear();
        self.backend.visit_point(x, y, &mut self.scratch);
        self.resolve_scratch()
    }

    /// Query for entries whose AABB intersects the given rectangle.
    ///
    /// Boxes that only touch `rect` along an edge or corner are included.
    pub fn query_rect(&mut self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        self.scratch.clear();
        self.backend.visit_rect(&rect, &mut self.scratch);
        self.resolve_scratch()
    }

    fn resolve_scratch(&self) -> impl Iterator<Item = (Key, P)> + '_ {
        self.scratch.iter().filter_map(|&i| {
            let slot = self.slots.get(i)?;
            let (_, payload) = slot.entry?;
            Some((Key::new(i, slot.generation), payload))
        })
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut (Aabb2D<T>, P)> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.1 {
            return None;
        }
        slot.entry.as_mut()
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Scalar,
    P: Copy + Debug + PartialEq,
    B: Backend<T>,
{
    /// Remove every entry carrying `payload`. Returns how many were removed.
    pub fn remove_payload(&mut self, payload: &P) -> usize {
        let keys: Vec<Key> = self
            .iter()
            .filter(|(_, _, p)| p == payload)
            .map(|(k, _, _)| k)
            .collect();
        keys.into_iter()
            .filter(|&k| self.remove(k).is_some())
            .count()
    }
}

/// Default index using a flat vector backend.
pub type Index<T, P> = IndexGeneric<T, P, FlatVec<T>>;

/// Index backed by an R-tree.
pub type RTreeIndex<T, P> = IndexGeneric<T, P, RTree<T>>;

impl<T: Scalar, P: Copy + Debug> Index<T, P> {
    /// Create an R-tree-backed index.
    pub fn with_rtree() -> RTreeIndex<T, P> {
        RTreeIndex::new()
    }

    /// Build an R-tree-backed index in bulk from entries.
    pub fn with_rtree_bulk(entries: &[(Aabb2D<T>, P)]) -> (RTreeIndex<T, P>, Vec<Key>) {
        let mut idx = RTreeIndex::new();
        let keys = idx.bulk_load(entries);
        (idx, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn insert_update_remove_and_query() {
        let mut idx: Index<i64, u32> = Index::new();
        let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        assert!(idx.update(k1, Aabb2D::new(5, 5, 15, 15)));

        let hits: Vec<_> = idx.query_point(12, 12).collect();
        assert_eq!(hits, vec![(k1, 1)]);

        assert_eq!(idx.remove(k1), Some(1));
        assert_eq!(idx.query_point(12, 12).count(), 0);
        assert!(idx.is_empty());
    }

    #[test]
    fn stale_keys_do_not_alias_reused_slots() {
        let mut idx: Index<i64, u32> = Index::new();
        let old = idx.insert(Aabb2D::new(0, 0, 1, 1), 1);
        idx.remove(old);
        let new = idx.insert(Aabb2D::new(0, 0, 1, 1), 2);
        // Same slot, different generation.
        assert_ne!(old, new);
        assert_eq!(idx.remove(old), None);
        assert!(!idx.update(old, Aabb2D::new(5, 5, 6, 6)));
        assert_eq!(idx.get(new).map(|(_, p)| p), Some(2));
    }

    #[test]
    fn remove_payload_drops_all_matches() {
        let mut idx = Index::<f64, u32>::with_rtree();
        idx.insert(Aabb2D::new(0.0, 0.0, 1.0, 1.0), 7);
        idx.insert(Aabb2D::new(2.0, 2.0, 3.0, 3.0), 8);
        idx.insert(Aabb2D::new(4.0, 4.0, 5.0, 5.0), 7);
        assert_eq!(idx.remove_payload(&7), 2);
        assert_eq!(idx.remove_payload(&7), 0);
        let all: Vec<_> = idx
            .query_rect(Aabb2D::new(-10.0, -10.0, 10.0, 10.0))
            .map(|(_, p)| p)
            .collect();
        assert_eq!(all, vec![8]);
    }

    #[test]
    fn bulk_keys_follow_input_order() {
        let entries: Vec<_> = (0..50_i64)
            .map(|i| (Aabb2D::new(i * 10, 0, i * 10 + 5, 5), i))
            .collect();
        let (mut idx, keys) = Index::with_rtree_bulk(&entries);
        assert_eq!(idx.len(), 50);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(idx.get(*key).map(|(_, p)| p), Some(i as i64));
        }
        let hits: Vec<_> = idx.query_point(123, 3).map(|(_, p)| p).collect();
        assert_eq!(hits, vec![12]);
    }
}
