// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Culling workload against the `rstar` crate: one bulk load, then a batch of
//! viewport-sized rect queries and point picks over overlapping layer boxes.

#![cfg(feature = "compare_rstar")]

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use stratum_index::{Aabb2D, Index};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

// Overlapping cards of varying size, laid out like a busy whiteboard.
fn scene(n: usize) -> Vec<Aabb2D<f64>> {
    (0..n)
        .map(|i| {
            let x = ((i * 37) % 2000) as f64;
            let y = ((i * 53) % 1500) as f64;
            let w = 40.0 + ((i * 7) % 120) as f64;
            let h = 30.0 + ((i * 11) % 90) as f64;
            Aabb2D::from_xywh(x, y, w, h)
        })
        .collect()
}

// A camera sweeping across the scene.
fn viewports() -> Vec<Aabb2D<f64>> {
    (0..32)
        .map(|i| Aabb2D::from_xywh(f64::from(i) * 50.0, f64::from(i) * 30.0, 800.0, 600.0))
        .collect()
}

fn bench_culling(c: &mut Criterion) {
    let mut group = c.benchmark_group("culling_vs_rstar");
    let cams = viewports();
    for &n in &[1_000_usize, 10_000] {
        let boxes = scene(n);
        let entries: Vec<_> = boxes.iter().copied().zip(0_u32..).collect();
        let tree_rects: Vec<_> = boxes
            .iter()
            .map(|r| Rectangle::from_corners([r.min_x, r.min_y], [r.max_x, r.max_y]))
            .collect();
        group.throughput(Throughput::Elements(cams.len() as u64));

        let (mut ours, _) = Index::with_rtree_bulk(&entries);
        group.bench_function(format!("stratum_viewports_n{n}"), |b| {
            b.iter(|| {
                let hits: usize = cams.iter().map(|cam| ours.query_rect(*cam).count()).sum();
                black_box(hits)
            });
        });

        let theirs = RTree::bulk_load(tree_rects);
        group.bench_function(format!("rstar_viewports_n{n}"), |b| {
            b.iter(|| {
                let hits: usize = cams
                    .iter()
                    .map(|cam| {
                        let env = AABB::from_corners([cam.min_x, cam.min_y], [cam.max_x, cam.max_y]);
                        theirs.locate_in_envelope_intersecting(&env).count()
                    })
                    .sum();
                black_box(hits)
            });
        });

        group.bench_function(format!("stratum_picks_n{n}"), |b| {
            b.iter(|| {
                let hits: usize = cams
                    .iter()
                    .map(|cam| ours.query_point(cam.min_x + 400.0, cam.min_y + 300.0).count())
                    .sum();
                black_box(hits)
            });
        });

        group.bench_function(format!("rstar_picks_n{n}"), |b| {
            b.iter(|| {
                let hits: usize = cams
                    .iter()
                    .map(|cam| {
                        let p = AABB::from_point([cam.min_x + 400.0, cam.min_y + 300.0]);
                        theirs.locate_in_envelope_intersecting(&p).count()
                    })
                    .sum();
                black_box(hits)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_culling);
criterion_main!(benches);
