// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use alloc::vec::Vec;

use crate::types::{Aabb2D, Scalar};

/// Spatial backend abstraction used by [`IndexGeneric`](crate::IndexGeneric).
///
/// Backends store opaque slot numbers alongside boxes; the index owns payloads
/// and generations. Queries append matching slots to a caller-provided buffer
/// in no particular order.
pub trait Backend<T: Scalar> {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Remove a slot. Returns `false` if the slot was not present.
    fn remove(&mut self, slot: usize) -> bool;

    /// Move an existing slot to a new box.
    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.remove(slot);
        self.insert(slot, aabb);
    }

    /// Insert many slots at once. Backends with a packing builder override this.
    fn bulk_load(&mut self, items: &[(usize, Aabb2D<T>)]) {
        for &(slot, aabb) in items {
            self.insert(slot, aabb);
        }
    }

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Append slots whose box contains the point.
    fn visit_point(&self, x: T, y: T, out: &mut Vec<usize>) {
        self.visit_rect(&Aabb2D::point(x, y), out);
    }

    /// Append slots whose box intersects `rect` (closed intervals).
    fn visit_rect(&self, rect: &Aabb2D<T>, out: &mut Vec<usize>);
}
