// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use stratum_index::{Aabb2D, Index};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Aabb2D::from_xywh(x as f64 * cell, y as f64 * cell, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        ((x >> 11) as f64) / ((1u64 << 53) as f64)
    }
}

/// Shapes scattered over a large board, as a whiteboard scene would hold.
fn gen_scene_rects(count: usize, board: f64) -> Vec<Aabb2D<f64>> {
    let mut rng = Rng(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let (x, y) = (rng.next_f64() * board, rng.next_f64() * board);
            let (w, h) = (20.0 + rng.next_f64() * 200.0, 20.0 + rng.next_f64() * 120.0);
            Aabb2D::from_corners(x, y, x + w, y + h)
        })
        .collect()
}

fn viewport_query() -> Aabb2D<f64> {
    Aabb2D::from_xywh(1000.0, 1000.0, 1600.0, 1200.0)
}

fn bench_flatvec(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatvec");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_query_n{n}"), |b| {
            b.iter_batched(
                Index::<f64, u32>::new,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        idx.insert(r, i as u32);
                    }
                    let hits = idx
                        .query_rect(Aabb2D::from_xywh(100.0, 100.0, 400.0, 400.0))
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_rtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_query_n{n}"), |b| {
            b.iter_batched(
                Index::<f64, u32>::with_rtree,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        idx.insert(r, i as u32);
                    }
                    let hits = idx
                        .query_rect(Aabb2D::from_xywh(100.0, 100.0, 400.0, 400.0))
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            );
        });
        let entries: Vec<_> = rects
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| (r, i as u32))
            .collect();
        group.bench_function(format!("bulk_query_n{n}"), |b| {
            b.iter(|| {
                let (mut idx, _) = Index::with_rtree_bulk(&entries);
                let hits = idx
                    .query_rect(Aabb2D::from_xywh(100.0, 100.0, 400.0, 400.0))
                    .count();
                black_box(hits);
            });
        });
    }
    group.finish();
}

fn bench_viewport_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport_query");
    for &count in &[1_000usize, 10_000] {
        let rects = gen_scene_rects(count, 20_000.0);
        let entries: Vec<_> = rects
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| (r, i as u32))
            .collect();

        let mut flat = Index::<f64, u32>::new();
        flat.bulk_load(&entries);
        group.bench_function(format!("flatvec_{count}"), |b| {
            b.iter(|| black_box(flat.query_rect(viewport_query()).count()));
        });

        let (mut tree, _) = Index::with_rtree_bulk(&entries);
        group.bench_function(format!("rtree_{count}"), |b| {
            b.iter(|| black_box(tree.query_rect(viewport_query()).count()));
        });
    }
    group.finish();
}

fn bench_rtree_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_churn");
    let rects = gen_scene_rects(5_000, 20_000.0);
    group.bench_function("move_every_shape", |b| {
        b.iter_batched(
            || {
                let mut idx = Index::<f64, u32>::with_rtree();
                let keys: Vec<_> = rects
                    .iter()
                    .enumerate()
                    .map(|(i, r)| idx.insert(*r, i as u32))
                    .collect();
                (idx, keys)
            },
            |(mut idx, keys)| {
                for (key, r) in keys.iter().zip(&rects) {
                    let moved = Aabb2D::new(r.min_x + 15.0, r.min_y, r.max_x + 15.0, r.max_y);
                    idx.update(*key, moved);
                }
                black_box(idx.query_rect(viewport_query()).count());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_flatvec,
    bench_rtree,
    bench_viewport_queries,
    bench_rtree_churn
);
criterion_main!(benches);
