// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Flat vector backend with linear scans.
#[derive(Clone)]
pub struct FlatVec<T> {
    entries: Vec<Option<Aabb2D<T>>>,
}

impl<T> Default for FlatVec<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &self.entries.len())
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> Backend<T> for FlatVec<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(aabb);
    }

    fn remove(&mut self, slot: usize) -> bool {
        self.entries
            .get_mut(slot)
            .and_then(Option::take)
            .is_some()
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.insert(slot, aabb);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn visit_point(&self, x: T, y: T, out: &mut Vec<usize>) {
        out.extend(
            self.entries
                .iter()
                .enumerate()
                .filter_map(|(i, e)| e.filter(|a| a.contains_point(x, y)).map(|_| i)),
        );
    }

    fn visit_rect(&self, rect: &Aabb2D<T>, out: &mut Vec<usize>) {
        out.extend(
            self.entries
                .iter()
                .enumerate()
                .filter_map(|(i, e)| e.filter(|a| a.intersects(rect)).map(|_| i)),
        );
    }
}
