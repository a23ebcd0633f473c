// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bottom-to-top paint order.

use stratum_surface::LayerId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    id: LayerId,
    z: i32,
    // Registration order, the tie-break for equal z.
    seq: u64,
}

/// Paint order of the registered layers. Last paints on top.
#[derive(Clone, Debug, Default)]
pub(crate) struct ZOrder {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl ZOrder {
    /// Add `id`. Without an explicit z it stacks above everything.
    pub(crate) fn insert(&mut self, id: LayerId, z: Option<i32>) {
        let z = z.unwrap_or_else(|| {
            self.entries
                .iter()
                .map(|e| e.z)
                .max()
                .map_or(0, |top| top.saturating_add(1))
        });
        self.entries.push(Entry {
            id,
            z,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.sort();
    }

    pub(crate) fn remove(&mut self, id: LayerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Listed ids go to the bottom in the given order; the rest keep their
    /// relative order above them. Every z becomes its position.
    pub(crate) fn reorder(&mut self, ids: &[LayerId]) {
        let mut next = Vec::with_capacity(self.entries.len());
        for id in ids {
            if next.iter().any(|e: &Entry| e.id == *id) {
                continue;
            }
            if let Some(entry) = self.entries.iter().find(|e| e.id == *id) {
                next.push(*entry);
            }
        }
        for entry in &self.entries {
            if !ids.contains(&entry.id) {
                next.push(*entry);
            }
        }
        for (z, entry) in next.iter_mut().enumerate() {
            entry.z = i32::try_from(z).unwrap_or(i32::MAX);
        }
        self.entries = next;
    }

    pub(crate) fn set_z(&mut self, id: LayerId, z: i32) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.z = z;
        self.sort();
        true
    }

    pub(crate) fn z_of(&self, id: LayerId) -> Option<i32> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.z)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| (e.z, e.seq));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> LayerId {
        LayerId::new(raw).unwrap()
    }

    fn ids(order: &ZOrder) -> Vec<u32> {
        order.ids().map(LayerId::get).collect()
    }

    #[test]
    fn registration_stacks_upward() {
        let mut o = ZOrder::default();
        for raw in 1..=3 {
            o.insert(id(raw), None);
        }
        assert_eq!(ids(&o), [1, 2, 3]);
        assert_eq!(o.z_of(id(3)), Some(2));
    }

    #[test]
    fn explicit_z_sorts_with_registration_tiebreak() {
        let mut o = ZOrder::default();
        o.insert(id(1), Some(5));
        o.insert(id(2), Some(-1));
        o.insert(id(3), Some(5));
        o.insert(id(4), None);
        assert_eq!(ids(&o), [2, 1, 3, 4]);
        assert_eq!(o.z_of(id(4)), Some(6));
    }

    #[test]
    fn reorder_puts_listed_first_and_keeps_the_rest() {
        let mut o = ZOrder::default();
        for raw in 1..=5 {
            o.insert(id(raw), None);
        }
        o.reorder(&[id(4), id(2), id(4), id(9)]);
        assert_eq!(ids(&o), [4, 2, 1, 3, 5]);
        assert_eq!(o.z_of(id(5)), Some(4));
    }

    #[test]
    fn set_z_moves_a_layer() {
        let mut o = ZOrder::default();
        for raw in 1..=3 {
            o.insert(id(raw), None);
        }
        assert!(o.set_z(id(1), 10));
        assert_eq!(ids(&o), [2, 3, 1]);
        assert!(!o.set_z(id(7), 0));
        assert!(o.remove(id(3)));
        assert!(!o.remove(id(3)));
        assert_eq!(ids(&o), [2, 1]);
    }
}
