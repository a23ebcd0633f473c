// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and paint/stroke styles handed to surfaces.

use kurbo::Vec2;

/// 8-bit straight-alpha RGBA color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (255 is opaque)
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from channels including alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let nibble = |i: usize| {
            digits
                .get(i..=i)
                .and_then(|d| u8::from_str_radix(d, 16).ok())
        };
        let byte = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|d| u8::from_str_radix(d, 16).ok())
        };
        match digits.len() {
            3 => Some(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

/// How source pixels combine with what's already on the surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Draw over existing content.
    #[default]
    SourceOver,
    /// Draw only where content exists.
    SourceAtop,
    /// Draw behind existing content.
    DestinationOver,
    /// Erase existing content where the source is opaque.
    DestinationOut,
    /// Replace existing content.
    Copy,
    /// Exclusive or.
    Xor,
    /// Multiply channels.
    Multiply,
    /// Screen channels.
    Screen,
    /// Keep the darker channel.
    Darken,
    /// Keep the lighter channel.
    Lighten,
}

/// Shape of open stroke ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Half-circle past the endpoint.
    Round,
    /// Half-square past the endpoint.
    Square,
}

/// Shape of stroke corners.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

/// Drop shadow painted under fills and strokes on the primary surface.
///
/// Raster backends without a blur stage paint the shadow unblurred.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Offset in device pixels.
    pub offset: Vec2,
    /// Blur radius in device pixels.
    pub blur: f64,
}

/// Everything a surface needs to color a shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PaintStyle {
    /// Base color.
    pub color: Color,
    /// Multiplier applied to `color.a`, in `[0, 1]`.
    pub global_alpha: f32,
    /// Compositing mode.
    pub blend: BlendMode,
    /// Optional drop shadow.
    pub shadow: Option<Shadow>,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
}

impl PaintStyle {
    /// Plain opaque-compositing paint of a single color.
    pub const fn solid(color: Color) -> Self {
        Self {
            color,
            global_alpha: 1.0,
            blend: BlendMode::SourceOver,
            shadow: None,
            anti_alias: true,
        }
    }

    /// The paint used on hit surfaces: exact color, no blending artifacts.
    pub const fn exact(color: Color) -> Self {
        Self {
            anti_alias: false,
            ..Self::solid(color)
        }
    }

    /// Final alpha after applying `global_alpha`.
    pub fn effective_alpha(&self) -> u8 {
        let a = f32::from(self.color.a) * self.global_alpha.clamp(0.0, 1.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Clamped to [0, 255] before the cast."
        )]
        let a = a.round().clamp(0.0, 255.0) as u8;
        a
    }
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self::solid(Color::BLACK)
    }
}

/// Stroke geometry shared by the primary and hit surfaces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in user units.
    pub width: f64,
    /// End caps.
    pub cap: LineCap,
    /// Corner joins.
    pub join: LineJoin,
    /// Miter limit ratio.
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}
