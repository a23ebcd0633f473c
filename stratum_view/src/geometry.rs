// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain geometry helpers shared by the viewport, the layer manager and the
//! shapes drawn by collaborators.
//!
//! Two rectangle spellings appear throughout:
//!
//! - [`Bounds`]: two arbitrary corners, as a drag gesture produces them. The
//!   corners are not sorted; every consumer normalizes with min/max.
//! - [`RectDimension`]: origin plus size, as drawing calls take them.
//!
//! The spatial index consumes the normalized [`BBox`] form.

use kurbo::{Point, Rect};
use stratum_index::Aabb2D;

use crate::event::{InputEvent, InputSource};

/// Normalized box as stored in the spatial index.
pub type BBox = Aabb2D<f64>;

/// Two corners of a rectangle, in any order.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    /// First corner x.
    pub x0: f64,
    /// First corner y.
    pub y0: f64,
    /// Second corner x.
    pub x1: f64,
    /// Second corner y.
    pub y1: f64,
}

impl Bounds {
    /// Bounds from two corners.
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Bounds spanning `from` to `to`.
    pub fn from_points(from: Point, to: Point) -> Self {
        Self::new(from.x, from.y, to.x, to.y)
    }

    /// The first corner.
    pub fn start(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// The normalized kurbo rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1, self.y1).abs()
    }
}

/// Origin plus size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RectDimension {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl RectDimension {
    /// Rectangle at `(x, y)` with the given size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The same rectangle as a kurbo [`Rect`].
    pub fn to_rect(&self) -> Rect {
        Rect::from_origin_size((self.x, self.y), (self.width, self.height))
    }
}

impl From<Rect> for RectDimension {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// The four corners of an axis-aligned rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectCorners {
    /// `(x, y)`.
    pub top_left: Point,
    /// `(x + w, y)`.
    pub top_right: Point,
    /// `(x, y + h)`.
    pub bottom_left: Point,
    /// `(x + w, y + h)`.
    pub bottom_right: Point,
}

/// Surface-local position of a pointer event, scaled by `pixel_ratio`.
///
/// Mouse-like events use their offset. Touch events use the first changed
/// touch relative to the target's origin. Anything else resolves to the
/// origin.
pub fn calculate_position(event: &InputEvent, pixel_ratio: f64) -> Point {
    match &event.source {
        InputSource::Mouse(mouse) => (mouse.offset.to_vec2() * pixel_ratio).to_point(),
        InputSource::Touch(touch) => match touch.changed_touches.first() {
            Some(first) => ((*first - touch.target_origin) * pixel_ratio).to_point(),
            None => Point::ORIGIN,
        },
    }
}

/// Bounds spanned by the first and last points of a path.
pub fn path_bounds(path: &[Point]) -> Option<Bounds> {
    let (from, to) = (path.first()?, path.last()?);
    Some(Bounds::from_points(*from, *to))
}

/// Normalized rectangle spanned by the first and last points of a path.
pub fn rect_from_path(path: &[Point]) -> Option<RectDimension> {
    path_bounds(path).map(|b| rect_from_bounds(&b))
}

/// Normalize bounds into origin plus size.
pub fn rect_from_bounds(bounds: &Bounds) -> RectDimension {
    RectDimension::new(
        bounds.x0.min(bounds.x1),
        bounds.y0.min(bounds.y1),
        (bounds.x0 - bounds.x1).abs(),
        (bounds.y0 - bounds.y1).abs(),
    )
}

/// Corners of the rectangle at `(x, y)` with size `w × h`.
pub fn rect_corners(x: f64, y: f64, w: f64, h: f64) -> RectCorners {
    RectCorners {
        top_left: Point::new(x, y),
        top_right: Point::new(x + w, y),
        bottom_left: Point::new(x, y + h),
        bottom_right: Point::new(x + w, y + h),
    }
}

/// Midpoint of a 1D span.
pub fn middle_point(from: f64, to: f64) -> f64 {
    (from + to) / 2.0
}

/// Whether `p` lies strictly inside `rect`. Points on an edge are outside.
pub fn is_point_inside_rect(p: Point, rect: Rect) -> bool {
    p.x > rect.x0 && p.x < rect.x1 && p.y > rect.y0 && p.y < rect.y1
}

/// Normalized index box for `bounds`.
pub fn bbox_from_bounds(bounds: &Bounds) -> BBox {
    Aabb2D::from_corners(bounds.x0, bounds.y0, bounds.x1, bounds.y1)
}

/// Normalized index box for an origin-plus-size rectangle.
pub fn bbox_from_rect(rect: &RectDimension) -> BBox {
    Aabb2D::from_corners(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height)
}

/// Whether two bounds overlap. Shared edges and corners count as overlap.
pub fn is_overlapping(a: &Bounds, b: &Bounds) -> bool {
    bbox_from_bounds(a).intersects(&bbox_from_bounds(b))
}
