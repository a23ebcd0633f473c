// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster surface abstraction and the CPU implementation on `tiny-skia`.

use kurbo::{Affine, BezPath, PathEl, Rect};
use tiny_skia::{
    FillRule, FilterQuality, Paint, PathBuilder, Pattern, Pixmap, SpreadMode, Stroke, Transform,
};

use crate::error::{SurfaceError, SurfaceResult};
use crate::image::Image;
use crate::paint::{BlendMode, LineCap, LineJoin, PaintStyle, StrokeStyle};

/// A device-pixel raster target.
///
/// Geometry arrives in user space together with the affine transform that
/// maps it to device pixels; the surface owns rasterization only.
pub trait Surface {
    /// Width in device pixels.
    fn width(&self) -> u32;

    /// Height in device pixels.
    fn height(&self) -> u32;

    /// Reallocate to a new size. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32) -> SurfaceResult<()>;

    /// Fill a path with the non-zero winding rule.
    fn fill_path(&mut self, path: &BezPath, paint: &PaintStyle, transform: Affine);

    /// Stroke a path.
    fn stroke_path(
        &mut self,
        path: &BezPath,
        paint: &PaintStyle,
        stroke: &StrokeStyle,
        transform: Affine,
    );

    /// Reset the pixels under `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect, transform: Affine);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Draw `image` scaled into `dest`.
    fn draw_image(&mut self, image: &Image, dest: Rect, paint: &PaintStyle, transform: Affine);

    /// Straight-alpha RGBA of one device pixel, `None` when out of bounds.
    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]>;
}

/// CPU surface backed by a `tiny-skia` pixmap.
#[derive(Clone, PartialEq)]
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl core::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish_non_exhaustive()
    }
}

impl PixmapSurface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> SurfaceResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
        Ok(Self { pixmap })
    }

    /// The backing pixmap.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encode the current contents as PNG.
    pub fn encode_png(&self) -> Option<Vec<u8>> {
        match self.pixmap.encode_png() {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("png encoding failed: {err}");
                None
            }
        }
    }

    fn skia_paint(paint: &PaintStyle) -> Paint<'static> {
        let mut p = Paint::default();
        let c = paint.color;
        p.set_color_rgba8(c.r, c.g, c.b, paint.effective_alpha());
        p.anti_alias = paint.anti_alias;
        p.blend_mode = skia_blend(paint.blend);
        p
    }

    fn shadow_paint(paint: &PaintStyle) -> Option<(Paint<'static>, Affine)> {
        let shadow = paint.shadow?;
        if shadow.color.a == 0 {
            return None;
        }
        let mut p = Paint::default();
        let alpha = PaintStyle {
            color: shadow.color,
            ..*paint
        }
        .effective_alpha();
        p.set_color_rgba8(shadow.color.r, shadow.color.g, shadow.color.b, alpha);
        p.anti_alias = paint.anti_alias;
        p.blend_mode = skia_blend(paint.blend);
        Some((p, Affine::translate(shadow.offset)))
    }
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        if width == self.width() && height == self.height() {
            self.clear();
            return Ok(());
        }
        *self = Self::new(width, height)?;
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, paint: &PaintStyle, transform: Affine) {
        let Some(sk_path) = skia_path(path) else {
            return;
        };
        if let Some((shadow, offset)) = Self::shadow_paint(paint) {
            self.pixmap.fill_path(
                &sk_path,
                &shadow,
                FillRule::Winding,
                skia_transform(offset * transform),
                None,
            );
        }
        self.pixmap.fill_path(
            &sk_path,
            &Self::skia_paint(paint),
            FillRule::Winding,
            skia_transform(transform),
            None,
        );
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        paint: &PaintStyle,
        stroke: &StrokeStyle,
        transform: Affine,
    ) {
        let Some(sk_path) = skia_path(path) else {
            return;
        };
        let sk_stroke = skia_stroke(stroke);
        if let Some((shadow, offset)) = Self::shadow_paint(paint) {
            self.pixmap.stroke_path(
                &sk_path,
                &shadow,
                &sk_stroke,
                skia_transform(offset * transform),
                None,
            );
        }
        self.pixmap.stroke_path(
            &sk_path,
            &Self::skia_paint(paint),
            &sk_stroke,
            skia_transform(transform),
            None,
        );
    }

    fn clear_rect(&mut self, rect: Rect, transform: Affine) {
        let Some(r) = skia_rect(rect) else {
            return;
        };
        let mut paint = Paint::default();
        paint.blend_mode = tiny_skia::BlendMode::Clear;
        paint.anti_alias = false;
        self.pixmap
            .fill_rect(r, &paint, skia_transform(transform), None);
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn draw_image(&mut self, image: &Image, dest: Rect, paint: &PaintStyle, transform: Affine) {
        let Some(r) = skia_rect(dest) else {
            return;
        };
        let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
        let pattern_ts = skia_transform(
            Affine::translate(dest.origin().to_vec2())
                * Affine::scale_non_uniform(dest.width() / iw, dest.height() / ih),
        );
        let mut p = Paint::default();
        p.shader = Pattern::new(
            image.pixmap().as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            f32::from(paint.effective_alpha()) / 255.0,
            pattern_ts,
        );
        p.anti_alias = paint.anti_alias;
        p.blend_mode = skia_blend(paint.blend);
        self.pixmap
            .fill_rect(r, &p, skia_transform(transform), None);
    }

    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "tiny-skia rasterizes in f32; scene coordinates stay well inside its range."
)]
fn f(v: f64) -> f32 {
    v as f32
}

fn skia_transform(t: Affine) -> Transform {
    let [a, b, c, d, e, ff] = t.as_coeffs();
    Transform::from_row(f(a), f(b), f(c), f(d), f(e), f(ff))
}

fn skia_rect(r: Rect) -> Option<tiny_skia::Rect> {
    let r = r.abs();
    tiny_skia::Rect::from_ltrb(f(r.x0), f(r.y0), f(r.x1), f(r.y1))
}

fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(f(p.x), f(p.y)),
            PathEl::LineTo(p) => pb.line_to(f(p.x), f(p.y)),
            PathEl::QuadTo(c, p) => pb.quad_to(f(c.x), f(c.y), f(p.x), f(p.y)),
            PathEl::CurveTo(c1, c2, p) => {
                pb.cubic_to(f(c1.x), f(c1.y), f(c2.x), f(c2.y), f(p.x), f(p.y));
            }
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn skia_stroke(stroke: &StrokeStyle) -> Stroke {
    Stroke {
        width: f(stroke.width.max(0.0)),
        miter_limit: f(stroke.miter_limit),
        line_cap: match stroke.cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        },
        line_join: match stroke.join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        },
        ..Stroke::default()
    }
}

fn skia_blend(mode: BlendMode) -> tiny_skia::BlendMode {
    use tiny_skia::BlendMode as Sk;
    match mode {
        BlendMode::SourceOver => Sk::SourceOver,
        BlendMode::SourceAtop => Sk::SourceAtop,
        BlendMode::DestinationOver => Sk::DestinationOver,
        BlendMode::DestinationOut => Sk::DestinationOut,
        BlendMode::Copy => Sk::Source,
        BlendMode::Xor => Sk::Xor,
        BlendMode::Multiply => Sk::Multiply,
        BlendMode::Screen => Sk::Screen,
        BlendMode::Darken => Sk::Darken,
        BlendMode::Lighten => Sk::Lighten,
    }
}
