// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register a few layers, paint a frame and route pointer moves to them.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p stratum_demos --example layers_basic`

use std::time::Duration;

use kurbo::{Point, Rect};
use stratum_layers::{LayerManager, LayerManagerConfig, LayerProps};
use stratum_surface::{Color, DrawError, Shadow};
use stratum_view::{Bounds, EventKind, InputEvent};

const CONFIG: &str = r#"{ "width": 320, "height": 200, "pixel_ratio": 2.0 }"#;

fn card(name: &'static str, rect: Rect, color: Color) -> LayerProps {
    LayerProps::new(move |canvas, _| {
        canvas.set_shadow(Some(Shadow {
            color: Color::rgba(0, 0, 0, 80),
            offset: kurbo::Vec2::new(3.0, 3.0),
            blur: 6.0,
        }));
        canvas.set_fill_color(color);
        canvas.fill_rounded_rect(rect, 8.0);
        Ok(())
    })
    .with_bounds(Bounds::new(rect.x0, rect.y0, rect.x1, rect.y1))
    .with_dispatcher(move |kind, ev| {
        println!("{name:>6} <- {kind:<12} at ({:.0}, {:.0})", ev.x, ev.y);
    })
}

fn main() {
    env_logger::init();

    let config = match LayerManagerConfig::from_json_str(CONFIG) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    let mut manager = LayerManager::new(config);
    if let Err(err) = manager.attach_cpu_canvas() {
        log::error!("{err}");
        return;
    }

    let cards = [
        ("red", Rect::new(20.0, 20.0, 140.0, 120.0), Color::rgb(220, 60, 60)),
        ("green", Rect::new(90.0, 60.0, 210.0, 160.0), Color::rgb(60, 180, 90)),
        ("blue", Rect::new(170.0, 30.0, 300.0, 130.0), Color::rgb(60, 90, 220)),
    ];
    for (name, rect, color) in cards {
        if let Err(err) = manager.register(card(name, rect, color)) {
            log::error!("{err}");
            return;
        }
    }
    // Logged at warn and skipped; the cards still paint.
    if let Err(err) =
        manager.register(LayerProps::new(|_, _| Err(DrawError::msg("this layer always fails"))))
    {
        log::error!("{err}");
    }

    manager.run();
    println!("frame: {:?}", manager.tick(Duration::ZERO));

    // Sweep the pointer left to right across the cards.
    for x in (0..320).step_by(40) {
        let ev = InputEvent::mouse(EventKind::PointerMove, Point::new(f64::from(x), 80.0));
        manager.handle_event(&ev);
    }

    let Some(png) = manager
        .renderer()
        .context()
        .and_then(|canvas| canvas.hit_surface().encode_png())
    else {
        return;
    };
    let path = std::env::temp_dir().join("stratum_hit_surface.png");
    match std::fs::write(&path, png) {
        Ok(()) => println!("hit surface written to {}", path.display()),
        Err(err) => log::warn!("couldn't write {}: {err}", path.display()),
    }
}
