// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan and zoom controller.
//!
//! The viewport turns pointer gestures into changes of the [`Renderer`]'s
//! transform:
//!
//! - press, move, release: drag-to-pan; the grabbed world point stays under
//!   the cursor;
//! - wheel: pan by the scroll delta;
//! - wheel with control held: zoom in 5% steps around the cursor, clamped to
//!   50%..1000% of the unit scale (10..200 steps).
//!
//! Every method reports whether the transform changed, so the owner knows
//! when to re-query visibility and repaint.

use kurbo::Point;

use crate::event::{EventKind, InputEvent};
use crate::geometry::Bounds;
use crate::renderer::Renderer;

/// Smallest zoom step.
pub const MIN_ZOOM_STEP: f64 = 10.0;
/// Largest zoom step.
pub const MAX_ZOOM_STEP: f64 = 200.0;

const ZOOM_IN: f64 = 1.1;
const ZOOM_OUT: f64 = 0.9;

/// Drag state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    /// No button held.
    #[default]
    Idle,
    /// Dragging the scene.
    Dragging,
}

/// Camera controller.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
    state: DragState,
    drag_start: Point,
    current_position: Point,
    current_cursor: Point,
}

impl Viewport {
    /// Idle viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// World point grabbed by the current drag or wheel gesture.
    pub fn drag_start(&self) -> Point {
        self.drag_start
    }

    /// Route a pointer event to the matching gesture handler.
    ///
    /// Press kinds start a drag, move kinds pan while dragging, release and
    /// cancel kinds end it, and wheel events pan or zoom. Returns whether the
    /// transform changed.
    pub fn handle_event(&mut self, renderer: &mut Renderer, event: &InputEvent) -> bool {
        match event.kind {
            EventKind::MouseDown | EventKind::PointerDown => {
                self.pointer_down(renderer, event);
                false
            }
            EventKind::MouseMove | EventKind::PointerMove => self.pointer_move(renderer, event),
            EventKind::MouseUp
            | EventKind::PointerUp
            | EventKind::PointerCancel
            | EventKind::MouseLeave => {
                self.pointer_up();
                false
            }
            EventKind::Wheel => self.wheel(renderer, event),
            _ => false,
        }
    }

    /// Start a drag at the event's page position.
    pub fn pointer_down(&mut self, renderer: &Renderer, event: &InputEvent) {
        let Some(mouse) = event.mouse_input() else {
            return;
        };
        self.state = DragState::Dragging;
        self.drag_start = renderer.transformed_point(mouse.page.x, mouse.page.y);
    }

    /// End the drag.
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    /// Pan so the grabbed point follows the cursor.
    pub fn pointer_move(&mut self, renderer: &mut Renderer, event: &InputEvent) -> bool {
        if !self.is_dragging() || !renderer.has_context() {
            return false;
        }
        let Some(mouse) = event.mouse_input() else {
            return false;
        };
        self.current_cursor = renderer.transformed_point(mouse.page.x, mouse.page.y);
        let delta = self.current_cursor - self.drag_start;
        renderer.translate_by(delta);
        delta.x != 0.0 || delta.y != 0.0
    }

    /// Pan by the wheel delta, or zoom around the cursor when control is held.
    pub fn wheel(&mut self, renderer: &mut Renderer, event: &InputEvent) -> bool {
        if !renderer.has_context() {
            return false;
        }
        let Some(mouse) = event.mouse_input() else {
            return false;
        };
        self.drag_start = renderer.transformed_point(mouse.page.x, mouse.page.y);
        self.current_position = mouse.page;
        if event.ctrl_key() {
            self.zoom(renderer, event)
        } else {
            self.pan(renderer, event)
        }
    }

    fn pan(&mut self, renderer: &mut Renderer, event: &InputEvent) -> bool {
        self.current_position -= event.wheel_delta;
        self.current_cursor =
            renderer.transformed_point(self.current_position.x, self.current_position.y);
        let delta = self.current_cursor - self.drag_start;
        renderer.translate_by(delta);
        delta.x != 0.0 || delta.y != 0.0
    }

    fn zoom(&mut self, renderer: &mut Renderer, event: &InputEvent) -> bool {
        let Some(mouse) = event.mouse_input() else {
            return false;
        };
        let Some(transform) = renderer.transform() else {
            return false;
        };
        self.current_position -= event.wheel_delta;
        let cursor = renderer.transformed_point(mouse.client.x, mouse.client.y);
        self.current_cursor = cursor;

        let factor = if event.wheel_delta.y < 0.0 {
            ZOOM_IN
        } else {
            ZOOM_OUT
        };
        let next = scale_to_percentage(transform.scale_x * factor);
        if !(MIN_ZOOM_STEP..=MAX_ZOOM_STEP).contains(&next) {
            return false;
        }
        let scale = percentage_to_scale(next) / transform.scale_x;
        // Already at the clamped step.
        if (scale - 1.0).abs() < 1e-12 {
            return false;
        }
        renderer.translate(cursor.x, cursor.y);
        renderer.scale(scale, scale);
        renderer.translate(-cursor.x, -cursor.y);
        log::trace!("zoom step {next} (scale {})", transform.scale_x * scale);
        true
    }

    /// Screen position of a layer's first corner, given the page position of
    /// an event over the layer.
    ///
    /// Overlays (text editors, context menus) use this to sit on top of the
    /// layer they belong to. `None` without a drawing context.
    pub fn layer_origin_on_screen(
        &self,
        renderer: &Renderer,
        page: Point,
        bounds: &Bounds,
    ) -> Option<Point> {
        let transform = renderer.transform()?;
        let transformed = renderer.transformed_point(page.x, page.y);
        let scale = if transform.scale_x != transform.initial_scale {
            transform.scale_x / transform.initial_scale
        } else {
            1.0
        };
        Some(Point::new(
            page.x + (bounds.x0 - transformed.x) * scale,
            page.y + (bounds.y0 - transformed.y) * scale,
        ))
    }
}

/// Zoom step for a transform scale: `ceil(scale · 20)` clamped to
/// `[10, 200]`.
///
/// Values within `1e-9` of a whole step are snapped first, so a scale that
/// came from [`percentage_to_scale`] maps back to the same step.
pub fn scale_to_percentage(scale: f64) -> f64 {
    let raw = scale * 200.0 / 10.0;
    let nearest = raw.round();
    let snapped = if (raw - nearest).abs() < 1e-9 {
        nearest
    } else {
        raw
    };
    snapped.ceil().clamp(MIN_ZOOM_STEP, MAX_ZOOM_STEP)
}

/// Transform scale for a zoom step: `step · 10 / 200`.
pub fn percentage_to_scale(percentage: f64) -> f64 {
    percentage * 10.0 / 200.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;
    use kurbo::Vec2;
    use proptest::prelude::*;

    fn renderer() -> Renderer {
        let mut r = Renderer::new(200, 200, 1.0);
        r.attach_cpu().unwrap();
        r
    }

    fn zoom_event(at: Point, delta_y: f64) -> InputEvent {
        InputEvent::wheel(at, Vec2::new(0.0, delta_y)).with_modifiers(Modifiers::CTRL)
    }

    #[test]
    fn percentages_are_exact_inverses() {
        for step in 10..=200 {
            let step = f64::from(step);
            assert_eq!(scale_to_percentage(percentage_to_scale(step)), step);
        }
        assert_eq!(scale_to_percentage(0.01), 10.0);
        assert_eq!(scale_to_percentage(50.0), 200.0);
        assert_eq!(scale_to_percentage(1.1), 22.0);
    }

    #[test]
    fn drag_keeps_grabbed_point_under_cursor() {
        let mut r = renderer();
        let mut vp = Viewport::new();
        let down = InputEvent::mouse(EventKind::MouseDown, Point::new(50.0, 50.0));
        assert!(!vp.handle_event(&mut r, &down));
        assert!(vp.is_dragging());

        let moved = InputEvent::mouse(EventKind::MouseMove, Point::new(80.0, 40.0));
        assert!(vp.handle_event(&mut r, &moved));
        assert_eq!(r.transformed_point(80.0, 40.0), Point::new(50.0, 50.0));

        let up = InputEvent::mouse(EventKind::MouseUp, Point::new(80.0, 40.0));
        vp.handle_event(&mut r, &up);
        assert_eq!(vp.state(), DragState::Idle);
        let after = InputEvent::mouse(EventKind::MouseMove, Point::new(0.0, 0.0));
        assert!(!vp.handle_event(&mut r, &after));
    }

    #[test]
    fn wheel_without_ctrl_pans() {
        let mut r = renderer();
        let mut vp = Viewport::new();
        let ev = InputEvent::wheel(Point::new(100.0, 100.0), Vec2::new(10.0, -20.0));
        assert!(vp.handle_event(&mut r, &ev));
        let t = r.transform().unwrap();
        assert_eq!((t.translation_x, t.translation_y), (-10.0, 20.0));
        assert_eq!(t.scale_x, 1.0);
    }

    #[test]
    fn zoom_in_step_from_rest() {
        let mut r = renderer();
        let mut vp = Viewport::new();
        assert!(vp.wheel(&mut r, &zoom_event(Point::ORIGIN, -1.0)));
        let s = r.transform().unwrap().scale_x;
        assert!((s - 1.1).abs() < 1e-12, "{s}");
        assert!(vp.wheel(&mut r, &zoom_event(Point::ORIGIN, 1.0)));
        let s = r.transform().unwrap().scale_x;
        // 1.1 * 0.9 = 0.99 rounds up to the 1.0 step.
        assert!((s - 1.0).abs() < 1e-12, "{s}");
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut r = renderer();
        let mut vp = Viewport::new();
        for _ in 0..100 {
            vp.wheel(&mut r, &zoom_event(Point::new(20.0, 30.0), 1.0));
        }
        assert!((r.transform().unwrap().scale_x - 0.5).abs() < 1e-12);
        assert!(!vp.wheel(&mut r, &zoom_event(Point::new(20.0, 30.0), 1.0)));

        for _ in 0..100 {
            vp.wheel(&mut r, &zoom_event(Point::new(20.0, 30.0), -1.0));
        }
        assert!((r.transform().unwrap().scale_x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_after_pan_is_anchored_at_cursor() {
        let mut r = renderer();
        let mut vp = Viewport::new();
        vp.wheel(&mut r, &InputEvent::wheel(Point::ORIGIN, Vec2::new(-35.0, 12.0)));

        let cursor = Point::new(120.0, 80.0);
        let world_before = r.transformed_point(cursor.x, cursor.y);
        assert!(vp.wheel(&mut r, &zoom_event(cursor, -3.0)));
        let world_after = r.transformed_point(cursor.x, cursor.y);
        assert!(
            world_before.distance(world_after) < 1e-9,
            "{world_before:?} moved to {world_after:?}"
        );
    }

    #[test]
    fn layer_origin_tracks_zoom() {
        let mut r = Renderer::new(100, 100, 2.0);
        r.attach_cpu().unwrap();
        let vp = Viewport::new();
        let bounds = Bounds::new(10.0, 20.0, 50.0, 60.0);
        // At rest world and screen agree, so the origin is the corner itself.
        let p = vp
            .layer_origin_on_screen(&r, Point::new(30.0, 30.0), &bounds)
            .unwrap();
        assert_eq!(p, Point::new(10.0, 20.0));

        r.scale(2.0, 2.0);
        let p = vp
            .layer_origin_on_screen(&r, Point::new(30.0, 30.0), &bounds)
            .unwrap();
        assert_eq!(p, r.screen_point(Point::new(10.0, 20.0)));
    }

    #[test]
    fn no_context_means_no_change() {
        let mut r = Renderer::new(10, 10, 1.0);
        let mut vp = Viewport::new();
        assert!(!vp.wheel(&mut r, &zoom_event(Point::ORIGIN, -1.0)));
        assert_eq!(
            vp.layer_origin_on_screen(&r, Point::ORIGIN, &Bounds::default()),
            None
        );
    }

    proptest! {
        #[test]
        fn zoom_stays_on_the_step_grid(
            steps in proptest::collection::vec((any::<bool>(), 0.0..400.0_f64, 0.0..400.0_f64), 1..60)
        ) {
            let mut r = renderer();
            let mut vp = Viewport::new();
            for (zoom_in, x, y) in steps {
                let dy = if zoom_in { -1.0 } else { 1.0 };
                vp.wheel(&mut r, &zoom_event(Point::new(x, y), dy));
                let s = r.transform().unwrap().scale_x;
                let step = s * 20.0;
                prop_assert!((0.5 - 1e-9..=10.0 + 1e-9).contains(&s), "scale {s}");
                prop_assert!((step - step.round()).abs() < 1e-6, "off-grid scale {s}");
            }
        }
    }
}
