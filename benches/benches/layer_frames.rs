// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Vec2};
use stratum_layers::{LayerManager, LayerManagerConfig, LayerProps};
use stratum_surface::Color;
use stratum_view::{Bounds, EventKind, InputEvent};

/// A scene of `count` small rectangles laid out on a grid much larger than
/// the viewport.
fn scene(count: usize) -> LayerManager {
    let mut m = LayerManager::new(LayerManagerConfig::default().with_size(800, 600));
    m.attach_cpu_canvas().unwrap();
    m.run();
    let side = (count as f64).sqrt().ceil() as usize;
    for i in 0..count {
        let (x, y) = ((i % side) as f64 * 60.0, (i / side) as f64 * 60.0);
        let rect = Rect::new(x, y, x + 40.0, y + 40.0);
        m.register(
            LayerProps::new(move |canvas, _| {
                canvas.set_fill_color(Color::rgb(90, 120, 200));
                canvas.fill_rect(rect);
                Ok(())
            })
            .with_bounds(Bounds::new(rect.x0, rect.y0, rect.x1, rect.y1)),
        )
        .unwrap();
    }
    m
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    group.sample_size(20);
    for &count in &[500usize, 5_000] {
        let mut m = scene(count);
        group.bench_function(format!("full_repaint_{count}"), |b| {
            b.iter(|| {
                m.redraw();
                black_box(m.tick(Duration::ZERO));
            });
        });

        let mut m = scene(count);
        m.tick(Duration::ZERO);
        let mut flip = 1.0;
        group.bench_function(format!("wheel_pan_requery_{count}"), |b| {
            b.iter(|| {
                flip = -flip;
                let ev = InputEvent::wheel(Point::new(400.0, 300.0), Vec2::new(25.0 * flip, 0.0));
                black_box(m.handle_viewport_event(&ev));
            });
        });
    }
    group.finish();
}

fn bench_hit_routing(c: &mut Criterion) {
    let mut m = scene(2_000);
    m.tick(Duration::ZERO);
    let mut x = 0.0;
    c.bench_function("pointer_move_routing", |b| {
        b.iter(|| {
            x = (x + 7.0) % 800.0;
            m.handle_event(&InputEvent::mouse(EventKind::PointerMove, Point::new(x, 20.0)));
            black_box(m.active_layer_id());
        });
    });
}

criterion_group!(benches, bench_frames, bench_hit_routing);
criterion_main!(benches);
