// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The R-tree must report exactly what a linear scan reports, across
//! inserts, moves and removals.

use proptest::prelude::*;
use stratum_index::{Aabb2D, Index, Key};

fn arb_box() -> impl Strategy<Value = Aabb2D<f64>> {
    (-500.0..500.0_f64, -500.0..500.0_f64, 0.0..80.0_f64, 0.0..80.0_f64)
        .prop_map(|(x, y, w, h)| Aabb2D::new(x, y, x + w, y + h))
}

fn sorted(mut v: Vec<u32>) -> Vec<u32> {
    v.sort_unstable();
    v
}

proptest! {
    #[test]
    fn rtree_matches_flat_scan(
        boxes in prop::collection::vec(arb_box(), 0..200),
        moves in prop::collection::vec((any::<prop::sample::Index>(), arb_box()), 0..80),
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..60),
        queries in prop::collection::vec(arb_box(), 1..10),
    ) {
        let mut flat: Index<f64, u32> = Index::new();
        let mut tree = Index::<f64, u32>::with_rtree();
        let mut keys: Vec<(Key, Key)> = Vec::new();
        for (i, b) in boxes.iter().enumerate() {
            let id = u32::try_from(i).unwrap();
            keys.push((flat.insert(*b, id), tree.insert(*b, id)));
        }
        for (which, to) in &moves {
            if keys.is_empty() {
                break;
            }
            let (kf, kt) = keys[which.index(keys.len())];
            prop_assert!(flat.update(kf, *to));
            prop_assert!(tree.update(kt, *to));
            prop_assert_eq!(flat.get(kf), tree.get(kt));
        }
        for r in &removals {
            if keys.is_empty() {
                break;
            }
            let (kf, kt) = keys.swap_remove(r.index(keys.len()));
            prop_assert_eq!(flat.remove(kf), tree.remove(kt));
        }
        prop_assert_eq!(flat.len(), tree.len());

        for q in &queries {
            let a = sorted(flat.query_rect(*q).map(|(_, p)| p).collect());
            let b = sorted(tree.query_rect(*q).map(|(_, p)| p).collect());
            prop_assert_eq!(a, b);

            let (cx, cy) = (q.min_x, q.max_y);
            let a = sorted(flat.query_point(cx, cy).map(|(_, p)| p).collect());
            let b = sorted(tree.query_point(cx, cy).map(|(_, p)| p).collect());
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn bulk_loaded_rtree_matches_flat_scan(
        boxes in prop::collection::vec(arb_box(), 1..400),
        q in arb_box(),
    ) {
        let entries: Vec<_> = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| (*b, u32::try_from(i).unwrap()))
            .collect();
        let mut flat: Index<f64, u32> = Index::new();
        flat.bulk_load(&entries);
        let (mut tree, _) = Index::with_rtree_bulk(&entries);

        let a = sorted(flat.query_rect(q).map(|(_, p)| p).collect());
        let b = sorted(tree.query_rect(q).map(|(_, p)| p).collect());
        prop_assert_eq!(a, b);
    }
}
