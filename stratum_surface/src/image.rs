// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoded raster images that can be drawn onto surfaces.

use tiny_skia::{ColorU8, Pixmap};

use crate::error::{SurfaceError, SurfaceResult};
use crate::paint::Color;

/// An RGBA raster image held in premultiplied form.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pixmap: Pixmap,
}

impl Image {
    /// Build an image from straight-alpha RGBA bytes, row-major.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> SurfaceResult<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
        let expected = pixmap.pixels().len() * 4;
        if data.len() != expected {
            return Err(SurfaceError::ImageData {
                expected,
                actual: data.len(),
            });
        }
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// A single-color image.
    pub fn filled(width: u32, height: u32, color: Color) -> SurfaceResult<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        Ok(Self { pixmap })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffers() {
        let err = Image::from_rgba8(2, 2, &[0; 12]).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::ImageData {
                expected: 16,
                actual: 12
            }
        );
        assert!(Image::from_rgba8(0, 2, &[]).is_err());
    }

    #[test]
    fn stores_premultiplied_pixels() {
        let img = Image::from_rgba8(1, 1, &[200, 100, 50, 255]).unwrap();
        let p = img.pixmap().pixel(0, 0).unwrap();
        assert_eq!((p.red(), p.green(), p.blue(), p.alpha()), (200, 100, 50, 255));
    }
}
