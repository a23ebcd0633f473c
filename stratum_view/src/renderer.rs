// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The camera: owner of the drawing context and its user-to-device transform.
//!
//! Coordinates come in three flavors:
//!
//! - device pixels, where the surfaces live;
//! - screen (CSS) pixels, device pixels divided by the initial pixel ratio;
//! - world units, where layers draw.
//!
//! The context's transform maps world to device. It starts as a plain
//! `scale(initial_pixel_ratio)` and accumulates the viewport's pans and zooms.

use kurbo::{Affine, Point, Rect, Vec2};
use stratum_surface::{HitCanvas, SurfaceError, SurfaceResult};

use crate::geometry::RectDimension;

/// Size and density of the drawing surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CanvasOptions {
    /// Width in screen pixels.
    pub width: u32,
    /// Height in screen pixels.
    pub height: u32,
    /// Device pixel ratio at initialization.
    pub initial_pixel_ratio: f64,
    /// Current horizontal scale of the transform.
    pub pixel_ratio: f64,
}

/// The context's affine transform split into named parts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TransformationMatrix {
    /// Horizontal translation, device pixels.
    pub translation_x: f64,
    /// Vertical translation, device pixels.
    pub translation_y: f64,
    /// Horizontal scale, including the pixel ratio.
    pub scale_x: f64,
    /// Vertical scale, including the pixel ratio.
    pub scale_y: f64,
    /// Horizontal skew.
    pub skew_x: f64,
    /// Vertical skew.
    pub skew_y: f64,
    /// Device pixel ratio captured at initialization.
    pub initial_scale: f64,
}

impl TransformationMatrix {
    fn from_affine(affine: Affine, initial_scale: f64) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self {
            translation_x: e,
            translation_y: f,
            scale_x: a,
            scale_y: d,
            skew_x: c,
            skew_y: b,
            initial_scale,
        }
    }
}

/// Owns the drawing context and answers transform queries.
#[derive(Debug)]
pub struct Renderer {
    canvas: Option<HitCanvas>,
    width: u32,
    height: u32,
    initial_pixel_ratio: f64,
    pixel_ratio: f64,
}

impl Renderer {
    /// Renderer for a `width × height` screen-pixel viewport. No surface is
    /// attached yet.
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self {
            canvas: None,
            width,
            height,
            initial_pixel_ratio: pixel_ratio,
            pixel_ratio,
        }
    }

    /// Attach a drawing context, replacing any previous one.
    ///
    /// The context's transform is reset to `scale(initial_pixel_ratio)`.
    pub fn attach(&mut self, mut canvas: HitCanvas) -> Option<HitCanvas> {
        canvas.set_transform(Affine::scale(self.initial_pixel_ratio));
        self.pixel_ratio = self.initial_pixel_ratio;
        self.canvas.replace(canvas)
    }

    /// Allocate a CPU context sized to the viewport at the current ratio and
    /// attach it.
    pub fn attach_cpu(&mut self) -> SurfaceResult<()> {
        let (w, h) = device_size(self.width, self.height, self.initial_pixel_ratio)?;
        self.attach(HitCanvas::new(w, h)?);
        Ok(())
    }

    /// Detach and return the drawing context.
    pub fn detach(&mut self) -> Option<HitCanvas> {
        self.canvas.take()
    }

    /// Whether a context is attached.
    pub fn has_context(&self) -> bool {
        self.canvas.is_some()
    }

    /// The attached context.
    pub fn context(&self) -> Option<&HitCanvas> {
        self.canvas.as_ref()
    }

    /// The attached context, mutably.
    pub fn context_mut(&mut self) -> Option<&mut HitCanvas> {
        self.canvas.as_mut()
    }

    /// Size and density.
    pub fn canvas_options(&self) -> CanvasOptions {
        CanvasOptions {
            width: self.width,
            height: self.height,
            initial_pixel_ratio: self.initial_pixel_ratio,
            pixel_ratio: self.pixel_ratio,
        }
    }

    /// Device pixel ratio captured at initialization (or the last resize).
    pub fn initial_pixel_ratio(&self) -> f64 {
        self.initial_pixel_ratio
    }

    /// The current transform. `None` without a context.
    pub fn transform(&self) -> Option<TransformationMatrix> {
        let canvas = self.canvas.as_ref()?;
        Some(TransformationMatrix::from_affine(
            canvas.get_transform(),
            self.initial_pixel_ratio,
        ))
    }

    /// Map a screen point to world units.
    ///
    /// Without a context the point comes back unchanged.
    pub fn transformed_point(&self, x: f64, y: f64) -> Point {
        let Some(t) = self.transform() else {
            return Point::new(x, y);
        };
        let inverse_zoom = 1.0 / (t.scale_x / t.initial_scale);
        Point::new(
            inverse_zoom * x - inverse_zoom * (t.translation_x / t.initial_scale),
            inverse_zoom * y - inverse_zoom * (t.translation_y / t.initial_scale),
        )
    }

    /// Map a world point to screen pixels; the inverse of
    /// [`transformed_point`](Self::transformed_point).
    pub fn screen_point(&self, world: Point) -> Point {
        let Some(t) = self.transform() else {
            return world;
        };
        Point::new(
            (t.scale_x * world.x + t.translation_x) / t.initial_scale,
            (t.scale_y * world.y + t.translation_y) / t.initial_scale,
        )
    }

    /// World rectangle that has to be cleared and repainted each frame.
    ///
    /// Deliberately generous: it covers at least twice the viewport, plus
    /// whatever the current pan has exposed.
    pub fn visible_world_rect(&self) -> Option<RectDimension> {
        let t = self.transform()?;
        let inverse_scale = (2.0 / t.scale_x).max(2.0);
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        Some(RectDimension {
            x: if t.translation_x > 0.0 {
                -t.translation_x * inverse_scale
            } else {
                0.0
            },
            y: if t.translation_y > 0.0 {
                -t.translation_y * inverse_scale
            } else {
                0.0
            },
            width: w * inverse_scale + t.translation_x.abs() * inverse_scale,
            height: h * inverse_scale + t.translation_y.abs() * inverse_scale,
        })
    }

    /// Scale world space. The new horizontal scale becomes the pixel ratio.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        canvas.scale(sx, sy);
        self.pixel_ratio = canvas.get_transform().as_coeffs()[0];
    }

    /// Translate world space by `(dx, dy)` world units.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.translate(dx, dy);
        }
    }

    /// Translate world space by `delta` world units.
    pub fn translate_by(&mut self, delta: Vec2) {
        self.translate(delta.x, delta.y);
    }

    /// Clear a world rectangle on both surfaces.
    pub fn clear_rect(&mut self, rect: &RectDimension) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.clear_rect(rect.to_rect());
        }
    }

    /// Resize the viewport.
    ///
    /// Both surfaces are reallocated at the device size. The camera is kept:
    /// when the pixel ratio changes the transform is rescaled so the same
    /// world region stays on screen.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f64) -> SurfaceResult<()> {
        let (dw, dh) = device_size(width, height, pixel_ratio)?;
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.resize(dw, dh)?;
            let rescale = pixel_ratio / self.initial_pixel_ratio;
            if rescale != 1.0 {
                canvas.set_transform(Affine::scale(rescale) * canvas.get_transform());
                self.pixel_ratio *= rescale;
            }
        } else {
            self.pixel_ratio = pixel_ratio;
        }
        self.width = width;
        self.height = height;
        self.initial_pixel_ratio = pixel_ratio;
        Ok(())
    }

    /// Screen-space rectangle of the whole viewport.
    pub fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Device size of a `width × height` viewport at `pixel_ratio`.
///
/// Errors report the screen-pixel size that couldn't be scaled.
pub fn device_size(width: u32, height: u32, pixel_ratio: f64) -> SurfaceResult<(u32, u32)> {
    let scaled = |v: u32| f64::from(v) * pixel_ratio;
    let (w, h) = (scaled(width).round(), scaled(height).round());
    if !(w >= 1.0 && h >= 1.0 && w <= f64::from(u32::MAX) && h <= f64::from(u32::MAX)) {
        return Err(SurfaceError::InvalidSize { width, height });
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Range-checked against u32 above."
    )]
    Ok((w as u32, h as u32))
}

/// Largest pixel ratio not above `target` whose device surface fits in
/// `max_pixels`.
///
/// The ratio is lowered by `decrement` until `width·r × height·r` fits or the
/// next step would reach zero.
pub fn max_pixel_ratio(
    width: u32,
    height: u32,
    target: f64,
    decrement: f64,
    max_pixels: u64,
) -> f64 {
    if decrement <= 0.0 {
        return target;
    }
    let (w, h) = (f64::from(width), f64::from(height));
    #[allow(
        clippy::cast_precision_loss,
        reason = "Pixel budgets are far below 2^53."
    )]
    let budget = max_pixels as f64;
    let mut ratio = target;
    while w * ratio * h * ratio > budget && ratio - decrement > 0.0 {
        ratio -= decrement;
    }
    ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn attached(width: u32, height: u32, ratio: f64) -> Renderer {
        let mut r = Renderer::new(width, height, ratio);
        r.attach_cpu().unwrap();
        r
    }

    #[test]
    fn detached_renderer_is_identity() {
        let r = Renderer::new(100, 100, 2.0);
        assert_eq!(r.transform(), None);
        assert_eq!(r.transformed_point(3.0, 4.0), Point::new(3.0, 4.0));
        assert_eq!(r.visible_world_rect(), None);
    }

    #[test]
    fn attach_scales_by_pixel_ratio() {
        let r = attached(40, 30, 2.0);
        let t = r.transform().unwrap();
        assert_eq!(t.scale_x, 2.0);
        assert_eq!(t.scale_y, 2.0);
        assert_eq!(t.translation_x, 0.0);
        assert_eq!(t.initial_scale, 2.0);
        let canvas = r.context().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (80, 60));
        // At rest, screen and world coincide.
        assert_eq!(r.transformed_point(7.0, 9.0), Point::new(7.0, 9.0));
    }

    #[test]
    fn transformed_point_undoes_pan_and_zoom() {
        let mut r = attached(100, 100, 2.0);
        r.translate(10.0, -5.0);
        r.scale(2.0, 2.0);
        let t = r.transform().unwrap();
        assert_eq!((t.translation_x, t.translation_y), (20.0, -10.0));
        assert_eq!(t.scale_x, 4.0);
        assert_eq!(r.canvas_options().pixel_ratio, 4.0);
        // World (0, 0) sits at screen (10, -5).
        let p = r.transformed_point(10.0, -5.0);
        assert!(p.distance(Point::ORIGIN) < 1e-12, "{p:?}");
        assert_eq!(r.screen_point(Point::new(1.0, 1.0)), Point::new(12.0, -3.0));
    }

    #[test]
    fn visible_rect_at_rest_and_after_pan() {
        let mut r = attached(100, 50, 1.0);
        assert_eq!(
            r.visible_world_rect(),
            Some(RectDimension::new(0.0, 0.0, 200.0, 100.0))
        );
        r.translate(10.0, -4.0);
        assert_eq!(
            r.visible_world_rect(),
            Some(RectDimension::new(-20.0, 0.0, 220.0, 108.0))
        );
        // Zooming out widens the inverse scale past 2.
        r.scale(0.5, 0.5);
        let v = r.visible_world_rect().unwrap();
        assert_eq!(v.width, 100.0 * 4.0 + 10.0 * 4.0);
    }

    #[test]
    fn resize_keeps_camera() {
        let mut r = attached(100, 100, 1.0);
        r.translate(5.0, 5.0);
        let world = r.transformed_point(30.0, 40.0);
        r.resize(200, 120, 2.0).unwrap();
        let canvas = r.context().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (400, 240));
        let after = r.transformed_point(30.0, 40.0);
        assert!(after.distance(world) < 1e-12, "{after:?} vs {world:?}");
        assert_eq!(r.canvas_options().initial_pixel_ratio, 2.0);
    }

    #[test]
    fn invalid_device_size_is_an_error() {
        assert!(device_size(0, 10, 1.0).is_err());
        assert!(device_size(10, 10, f64::NAN).is_err());
        assert_eq!(device_size(10, 7, 1.5).unwrap(), (15, 11));
    }

    #[test]
    fn pixel_ratio_steps_down_to_budget() {
        assert_eq!(max_pixel_ratio(100, 100, 2.0, 0.5, 40_000), 2.0);
        assert_eq!(max_pixel_ratio(100, 100, 2.0, 0.5, 10_000), 1.0);
        // Never reaches zero.
        let r = max_pixel_ratio(100, 100, 2.0, 0.5, 1);
        assert_eq!(r, 0.5);
        assert_eq!(max_pixel_ratio(100, 100, 3.0, 0.0, 1), 3.0);
    }

    proptest! {
        #[test]
        fn screen_world_round_trip(
            ratio in 0.5..3.0_f64,
            dx in -500.0..500.0_f64,
            dy in -500.0..500.0_f64,
            zoom in 0.1..10.0_f64,
            x in -1000.0..1000.0_f64,
            y in -1000.0..1000.0_f64,
        ) {
            let mut r = Renderer::new(64, 64, ratio);
            r.attach(HitCanvas::new(8, 8).unwrap());
            r.translate(dx, dy);
            r.scale(zoom, zoom);
            let world = r.transformed_point(x, y);
            let back = r.screen_point(world);
            prop_assert!((back.x - x).abs() < 1e-6 * (1.0 + x.abs()));
            prop_assert!((back.y - y).abs() < 1e-6 * (1.0 + y.abs()));
        }
    }
}
