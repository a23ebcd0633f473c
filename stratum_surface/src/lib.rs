// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stratum Surface: raster drawing with a parallel hit-test surface.
//!
//! Many shapes share one drawing surface, so the platform can't say which
//! shape a pointer is over. This crate answers that with a second, same-size
//! surface that every draw call mirrors in a flat color encoding the painting
//! layer's id; a single pixel read then names the topmost layer under a point.
//!
//! - [`codec`]: [`LayerId`] and its reversible color encoding.
//! - [`HitCanvas`]: the dual-paint drawing context.
//! - [`Surface`]: the raster target abstraction, with [`PixmapSurface`] on `tiny-skia`.
//! - [`paint`]: colors and paint/stroke styles.
//!
//! Coordinates handed to [`HitCanvas::layer_id_at`] are device pixels.

pub mod canvas;
pub mod codec;
pub mod error;
pub mod image;
pub mod paint;
pub mod surface;

pub use canvas::HitCanvas;
pub use codec::{LayerId, MAX_LAYER_ID};
pub use error::{DrawError, SurfaceError, SurfaceResult};
pub use image::Image;
pub use paint::{BlendMode, Color, LineCap, LineJoin, PaintStyle, Shadow, StrokeStyle};
pub use surface::{PixmapSurface, Surface};
