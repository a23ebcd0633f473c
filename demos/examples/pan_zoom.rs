// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan and zoom over a large scene and watch the culled set change.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p stratum_demos --example pan_zoom`

use std::time::Duration;

use kurbo::{Point, Rect, Vec2};
use stratum_layers::{LayerManager, LayerManagerConfig, LayerProps};
use stratum_surface::Color;
use stratum_view::{Bounds, EventKind, InputEvent, Modifiers};

fn main() {
    env_logger::init();

    let mut manager = LayerManager::new(LayerManagerConfig::default().with_size(400, 300));
    if let Err(err) = manager.attach_cpu_canvas() {
        log::error!("{err}");
        return;
    }

    // A 40 x 40 grid of tiles, far larger than the viewport.
    for i in 0..1600_u32 {
        let (x, y) = (f64::from(i % 40) * 50.0, f64::from(i / 40) * 50.0);
        let rect = Rect::new(x, y, x + 40.0, y + 40.0);
        let shade = u8::try_from(i % 200).unwrap_or(0);
        let props = LayerProps::new(move |canvas, _| {
            canvas.set_fill_color(Color::rgb(40, shade, 160));
            canvas.fill_rect(rect);
            Ok(())
        })
        .with_bounds(Bounds::new(rect.x0, rect.y0, rect.x1, rect.y1));
        if manager.register(props).is_err() {
            return;
        }
    }

    manager.run();
    let mut now = Duration::ZERO;
    let mut report = |manager: &mut LayerManager, label: &str| {
        let outcome = manager.tick(now);
        now += Duration::from_millis(16);
        let t = manager.renderer().transform();
        println!(
            "{label:<18} visible {:>4}  scale {:>5.2}  {outcome:?}",
            manager.visible_layer_ids().len(),
            t.map_or(0.0, |t| t.scale_x),
        );
    };
    report(&mut manager, "initial");

    // Drag the scene left by 300 screen pixels.
    manager.handle_viewport_event(&InputEvent::mouse(EventKind::MouseDown, Point::new(350.0, 150.0)));
    manager.handle_viewport_event(&InputEvent::mouse(EventKind::MouseMove, Point::new(50.0, 150.0)));
    manager.handle_viewport_event(&InputEvent::mouse(EventKind::MouseUp, Point::new(50.0, 150.0)));
    report(&mut manager, "after drag");

    // Scroll down.
    manager.handle_viewport_event(&InputEvent::wheel(Point::new(200.0, 150.0), Vec2::new(0.0, 400.0)));
    report(&mut manager, "after scroll");

    // Zoom out around the center until the clamp holds.
    let zoom_out = InputEvent::wheel(Point::new(200.0, 150.0), Vec2::new(0.0, 1.0))
        .with_modifiers(Modifiers::CTRL);
    for _ in 0..40 {
        if !manager.handle_viewport_event(&zoom_out) {
            break;
        }
    }
    report(&mut manager, "zoomed out");

    let zoom_in = InputEvent::wheel(Point::new(200.0, 150.0), Vec2::new(0.0, -1.0))
        .with_modifiers(Modifiers::CTRL);
    for _ in 0..12 {
        manager.handle_viewport_event(&zoom_in);
    }
    report(&mut manager, "zoomed in");
}
