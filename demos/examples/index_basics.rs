// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stratum Index on its own: bulk-load a scene, move a box, cull by viewport.

use stratum_index::{Aabb2D, Index};

fn main() {
    env_logger::init();

    let scene: Vec<_> = (0..100_u32)
        .map(|i| {
            let (x, y) = (f64::from(i % 10) * 100.0, f64::from(i / 10) * 100.0);
            (Aabb2D::new(x, y, x + 80.0, y + 80.0), i)
        })
        .collect();
    let (mut idx, keys) = Index::with_rtree_bulk(&scene);

    let viewport = Aabb2D::new(0.0, 0.0, 250.0, 150.0);
    let mut visible: Vec<_> = idx.query_rect(viewport).map(|(_, id)| id).collect();
    visible.sort_unstable();
    println!("visible: {visible:?}");

    // Move tile 0 out of the viewport.
    if let Some(&k0) = keys.first() {
        idx.update(k0, Aabb2D::new(2000.0, 2000.0, 2080.0, 2080.0));
    }
    let mut visible: Vec<_> = idx.query_rect(viewport).map(|(_, id)| id).collect();
    visible.sort_unstable();
    println!("after move: {visible:?}");

    let hits: Vec<_> = idx.query_point(150.0, 50.0).map(|(_, id)| id).collect();
    println!("hits at (150, 50): {hits:?}");
}
