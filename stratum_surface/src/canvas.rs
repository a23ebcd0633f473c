// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dual-paint drawing context: one primary surface, one hit-test surface.
//!
//! [`HitCanvas`] exposes a Canvas-2D-like immediate API. Every primitive that
//! changes pixels runs twice:
//!
//! - on the primary surface with the real paint (colors, alpha, shadows,
//!   blending), and
//! - on the hit surface with the active layer's encoded id color, opaque and
//!   without anti-aliasing, so every painted hit pixel decodes exactly.
//!
//! Geometry state (transform, current path, line width, caps, joins) is shared
//! by both paints. Style-only state is never mirrored. Images mirror only their
//! destination rectangle.
//!
//! ```
//! use kurbo::Rect;
//! use stratum_surface::{Color, HitCanvas, LayerId};
//!
//! let mut canvas = HitCanvas::new(100, 100).unwrap();
//! let id = LayerId::new(7).unwrap();
//!
//! canvas.set_active_layer_id(Some(id));
//! canvas.set_fill_color(Color::rgba(255, 0, 0, 40));
//! canvas.fill_rect(Rect::new(10.0, 10.0, 50.0, 50.0));
//!
//! assert_eq!(canvas.layer_id_at(20.0, 20.0), Some(id));
//! assert_eq!(canvas.layer_id_at(80.0, 80.0), None);
//! ```

use core::f64::consts::TAU;

use kurbo::{Affine, Arc, BezPath, Circle, PathEl, Point, Rect, RoundedRect, Shape, Vec2};

use crate::codec::{LayerId, decode_layer_id, layer_color};
use crate::error::SurfaceResult;
use crate::image::Image;
use crate::paint::{BlendMode, Color, LineCap, LineJoin, PaintStyle, Shadow, StrokeStyle};
use crate::surface::{PixmapSurface, Surface};

/// Flattening tolerance for arcs and rounded shapes, in user units.
const TOLERANCE: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
struct DrawState {
    transform: Affine,
    fill: Color,
    stroke_color: Color,
    stroke: StrokeStyle,
    global_alpha: f32,
    blend: BlendMode,
    shadow: Option<Shadow>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Color::BLACK,
            stroke_color: Color::BLACK,
            stroke: StrokeStyle::default(),
            global_alpha: 1.0,
            blend: BlendMode::SourceOver,
            shadow: None,
        }
    }
}

impl DrawState {
    fn paint(&self, color: Color) -> PaintStyle {
        PaintStyle {
            color,
            global_alpha: self.global_alpha,
            blend: self.blend,
            shadow: self.shadow,
            anti_alias: true,
        }
    }
}

/// Drawing context painting a primary surface and a same-size hit surface.
pub struct HitCanvas {
    primary: Box<dyn Surface>,
    hit: PixmapSurface,
    state: DrawState,
    stack: Vec<DrawState>,
    path: BezPath,
    active: Option<LayerId>,
}

impl core::fmt::Debug for HitCanvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HitCanvas")
            .field("width", &self.primary.width())
            .field("height", &self.primary.height())
            .field("active", &self.active)
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl HitCanvas {
    /// CPU canvas of the given device size.
    pub fn new(width: u32, height: u32) -> SurfaceResult<Self> {
        Self::with_primary(Box::new(PixmapSurface::new(width, height)?))
    }

    /// Canvas over a caller-supplied primary surface.
    ///
    /// The hit surface is allocated to match the primary's size.
    pub fn with_primary(primary: Box<dyn Surface>) -> SurfaceResult<Self> {
        let hit = PixmapSurface::new(primary.width(), primary.height())?;
        Ok(Self {
            primary,
            hit,
            state: DrawState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            active: None,
        })
    }

    /// Device width.
    pub fn width(&self) -> u32 {
        self.primary.width()
    }

    /// Device height.
    pub fn height(&self) -> u32 {
        self.primary.height()
    }

    /// The primary surface.
    pub fn primary(&self) -> &dyn Surface {
        self.primary.as_ref()
    }

    /// The hit-test surface.
    pub fn hit_surface(&self) -> &PixmapSurface {
        &self.hit
    }

    /// Resize both surfaces. Contents are discarded; drawing state is kept.
    pub fn resize(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        self.primary.resize(width, height)?;
        self.hit.resize(width, height)
    }

    /// Bring the hit surface back to the primary's size if they drifted apart.
    fn sync_hit_size(&mut self) {
        let (w, h) = (self.primary.width(), self.primary.height());
        if self.hit.width() == w && self.hit.height() == h {
            return;
        }
        if let Err(err) = self.hit.resize(w, h) {
            log::warn!("hit surface resize to {w}x{h} failed: {err}");
        }
    }

    // --- layer ids -------------------------------------------------------

    /// Set the layer whose id color subsequent draws paint on the hit surface.
    ///
    /// With `None`, draws touch only the primary surface.
    pub fn set_active_layer_id(&mut self, id: Option<LayerId>) {
        self.active = id;
    }

    /// The layer currently painting.
    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active
    }

    /// Layer whose silhouette covers device pixel `(x, y)`.
    pub fn layer_id_at(&self, x: f64, y: f64) -> Option<LayerId> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let (x, y) = (x.floor(), y.floor());
        if x >= f64::from(self.hit.width()) || y >= f64::from(self.hit.height()) {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Bounds-checked against the surface size above."
        )]
        let [r, g, b, _] = self.hit.pixel(x as u32, y as u32)?;
        decode_layer_id(r, g, b)
    }

    fn hit_paint(&self) -> Option<PaintStyle> {
        self.active.map(|id| PaintStyle::exact(layer_color(id)))
    }

    // --- state stack ------------------------------------------------------

    /// Push the current drawing state.
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the last saved state. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    /// Number of saved states.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Restore until only `depth` states remain saved.
    pub fn restore_to_depth(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.restore();
        }
    }

    // --- transform --------------------------------------------------------

    /// The current user-to-device transform.
    pub fn get_transform(&self) -> Affine {
        self.state.transform
    }

    /// Replace the current transform.
    pub fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    /// Reset to identity.
    pub fn reset_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    /// Post-multiply the current transform.
    pub fn transform(&mut self, t: Affine) {
        self.state.transform = self.state.transform * t;
    }

    /// Translate user space.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(Affine::translate((dx, dy)));
    }

    /// Scale user space.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.transform(Affine::scale_non_uniform(sx, sy));
    }

    /// Rotate user space by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.transform(Affine::rotate(angle));
    }

    // --- style (primary only) ----------------------------------------------

    /// Fill color.
    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    /// Stroke color.
    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
    }

    /// Alpha multiplier for everything drawn afterwards.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Compositing mode.
    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    /// Drop shadow for fills and strokes.
    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    // --- stroke geometry (shared) ------------------------------------------

    /// Line width in user units.
    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.stroke.width = width;
        }
    }

    /// Line width in user units.
    pub fn line_width(&self) -> f64 {
        self.state.stroke.width
    }

    /// Stroke end caps.
    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.stroke.cap = cap;
    }

    /// Stroke joins.
    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.stroke.join = join;
    }

    // --- current path -------------------------------------------------------

    /// Start a new, empty path.
    pub fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    /// The path built so far.
    pub fn current_path(&self) -> &BezPath {
        &self.path
    }

    /// Start a new subpath.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    /// Straight segment; starts a subpath when none is open.
    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((x, y));
        } else {
            self.path.line_to((x, y));
        }
    }

    /// Quadratic Bézier segment.
    pub fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((cx, cy));
        }
        self.path.quad_to((cx, cy), (x, y));
    }

    /// Cubic Bézier segment.
    pub fn bezier_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.path.move_to((c1x, c1y));
        }
        self.path.curve_to((c1x, c1y), (c2x, c2y), (x, y));
    }

    /// Circular arc around `(cx, cy)` from `start` to `end` radians.
    ///
    /// Connects to the current point with a line, like the web canvas.
    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        let radius = radius.abs();
        let center = Point::new(cx, cy);
        let start_point = center + Vec2::from_angle(start) * radius;
        if self.path.elements().is_empty() {
            self.path.move_to(start_point);
        } else {
            self.path.line_to(start_point);
        }
        let arc = Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle: start,
            sweep_angle: arc_sweep(start, end, anticlockwise),
            x_rotation: 0.0,
        };
        for el in arc.append_iter(TOLERANCE) {
            self.path.push(el);
        }
    }

    /// Closed rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.path.move_to((x, y));
        self.path.line_to((x + w, y));
        self.path.line_to((x + w, y + h));
        self.path.line_to((x, y + h));
        self.path.close_path();
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        if !self.path.elements().is_empty() {
            self.path.push(PathEl::ClosePath);
        }
    }

    // --- mirrored primitives -----------------------------------------------

    /// Fill the current path.
    pub fn fill(&mut self) {
        let path = core::mem::take(&mut self.path);
        self.fill_path(&path);
        self.path = path;
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) {
        let path = core::mem::take(&mut self.path);
        self.stroke_path(&path);
        self.path = path;
    }

    /// Fill an arbitrary path with the fill color.
    pub fn fill_path(&mut self, path: &BezPath) {
        self.sync_hit_size();
        let t = self.state.transform;
        let paint = self.state.paint(self.state.fill);
        self.primary.fill_path(path, &paint, t);
        if let Some(hit) = self.hit_paint() {
            self.hit.fill_path(path, &hit, t);
        }
    }

    /// Stroke an arbitrary path with the stroke color and line settings.
    pub fn stroke_path(&mut self, path: &BezPath) {
        self.sync_hit_size();
        let t = self.state.transform;
        let stroke = self.state.stroke;
        let paint = self.state.paint(self.state.stroke_color);
        self.primary.stroke_path(path, &paint, &stroke, t);
        if let Some(hit) = self.hit_paint() {
            self.hit.stroke_path(path, &hit, &stroke, t);
        }
    }

    /// Fill any `kurbo` shape.
    pub fn fill_shape(&mut self, shape: &impl Shape) {
        self.fill_path(&shape.to_path(TOLERANCE));
    }

    /// Stroke any `kurbo` shape.
    pub fn stroke_shape(&mut self, shape: &impl Shape) {
        self.stroke_path(&shape.to_path(TOLERANCE));
    }

    /// Fill a rectangle without touching the current path.
    pub fn fill_rect(&mut self, rect: Rect) {
        self.fill_shape(&rect.abs());
    }

    /// Stroke a rectangle without touching the current path.
    pub fn stroke_rect(&mut self, rect: Rect) {
        self.stroke_shape(&rect.abs());
    }

    /// Clear a rectangle on both surfaces, regardless of the active layer.
    pub fn clear_rect(&mut self, rect: Rect) {
        self.sync_hit_size();
        let t = self.state.transform;
        self.primary.clear_rect(rect, t);
        self.hit.clear_rect(rect, t);
    }

    /// Clear both surfaces entirely.
    pub fn clear(&mut self) {
        self.sync_hit_size();
        self.primary.clear();
        self.hit.clear();
    }

    /// Draw an image into `dest`; the hit surface receives `dest` as a solid rectangle.
    pub fn draw_image(&mut self, image: &Image, dest: Rect) {
        self.sync_hit_size();
        let t = self.state.transform;
        let paint = self.state.paint(Color::BLACK);
        self.primary.draw_image(image, dest, &paint, t);
        if let Some(hit) = self.hit_paint() {
            self.hit.fill_path(&dest.abs().to_path(TOLERANCE), &hit, t);
        }
    }

    // --- drawer helpers ------------------------------------------------------

    /// Filled rectangle with rounded corners.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f64) {
        self.fill_shape(&RoundedRect::from_rect(rect.abs(), radius.max(0.0)));
    }

    /// Filled circle.
    pub fn fill_circle(&mut self, center: Point, radius: f64) {
        self.fill_shape(&Circle::new(center, radius.abs()));
    }

    /// Stroked quadratic curve from `from` to `to`.
    pub fn stroke_quadratic_curve(&mut self, from: Point, ctrl: Point, to: Point) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.quad_to(ctrl, to);
        self.stroke_path(&path);
    }

    /// Stroked cubic curve from `from` to `to`.
    pub fn stroke_bezier_curve(&mut self, from: Point, c1: Point, c2: Point, to: Point) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.curve_to(c1, c2, to);
        self.stroke_path(&path);
    }
}

/// Canvas arc sweep: clockwise sweeps are normalized into `[0, 2π]`,
/// anticlockwise ones into `[-2π, 0]`.
fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    let delta = end - start;
    if anticlockwise {
        if delta <= -TAU {
            return -TAU;
        }
        let d = delta % TAU;
        if d > 0.0 { d - TAU } else { d }
    } else {
        if delta >= TAU {
            return TAU;
        }
        let d = delta % TAU;
        if d < 0.0 { d + TAU } else { d }
    }
}
