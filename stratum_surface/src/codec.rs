// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer ids and their color encoding on the hit-test surface.
//!
//! Each layer paints its silhouette onto the hit surface in a flat color
//! derived from its id. Reading one pixel back then answers "which layer is
//! under this point" without any geometric test.
//!
//! ## Encoding
//!
//! The id is doubled and the 24-bit result is split big-endian into red,
//! green and blue:
//!
//! ```text
//! id2 = id * 2
//! R = (id2 >> 16) & 0xFF
//! G = (id2 >> 8) & 0xFF
//! B = id2 & 0xFF
//! ```
//!
//! Every valid color is therefore even when read back as a packed 24-bit
//! integer. Odd values can only come from blending (anti-aliased edges,
//! partially transparent pixels) and are rejected as "no layer" rather than
//! guessed at. Packed `0` is the cleared background.
//!
//! ```
//! use stratum_surface::codec::{decode_layer_id, encode_layer_id};
//! use stratum_surface::LayerId;
//!
//! let id = LayerId::new(1234).unwrap();
//! let [r, g, b] = encode_layer_id(id);
//! assert_eq!(decode_layer_id(r, g, b), Some(id));
//!
//! // Background and blended pixels decode to nothing.
//! assert_eq!(decode_layer_id(0, 0, 0), None);
//! assert_eq!(decode_layer_id(r, g, b | 1), None);
//! ```

use core::fmt;
use core::num::NonZeroU32;

use crate::paint::Color;

/// Largest id that fits the 24-bit color encoding: `2^23 - 1`.
pub const MAX_LAYER_ID: u32 = (1 << 23) - 1;

/// Identifier of a registered layer.
///
/// Ids are positive; "no layer" is spelled `Option::<LayerId>::None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(NonZeroU32);

impl LayerId {
    /// Wrap a raw id. Returns `None` for `0` and for ids above [`MAX_LAYER_ID`].
    pub const fn new(raw: u32) -> Option<Self> {
        if raw > MAX_LAYER_ID {
            return None;
        }
        match NonZeroU32::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The raw id.
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Encode a layer id as the `[R, G, B]` triple painted on the hit surface.
pub fn encode_layer_id(id: LayerId) -> [u8; 3] {
    let [_, r, g, b] = (id.get() * 2).to_be_bytes();
    [r, g, b]
}

/// Opaque color for a layer's hit-surface silhouette.
pub fn layer_color(id: LayerId) -> Color {
    let [r, g, b] = encode_layer_id(id);
    Color::rgb(r, g, b)
}

/// Decode a hit-surface pixel.
///
/// Returns `None` for the background and for odd (blended) values.
pub fn decode_layer_id(r: u8, g: u8, b: u8) -> Option<LayerId> {
    let packed = u32::from_be_bytes([0, r, g, b]);
    if packed % 2 != 0 {
        return None;
    }
    LayerId::new(packed / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_round_trips() {
        // The id space is small enough to check exhaustively.
        for raw in 1..=MAX_LAYER_ID {
            let id = LayerId::new(raw).unwrap();
            let [r, g, b] = encode_layer_id(id);
            assert_eq!(decode_layer_id(r, g, b), Some(id), "id {raw}");
        }
    }

    #[test]
    fn odd_pixels_are_ambiguous() {
        assert_eq!(decode_layer_id(0, 0, 1), None);
        assert_eq!(decode_layer_id(0x12, 0x34, 0x57), None);
        assert_eq!(decode_layer_id(255, 255, 255), None);
    }

    #[test]
    fn id_bounds() {
        assert_eq!(LayerId::new(0), None);
        assert_eq!(LayerId::new(MAX_LAYER_ID + 1), None);
        let top = LayerId::new(MAX_LAYER_ID).unwrap();
        assert_eq!(encode_layer_id(top), [0xFF, 0xFF, 0xFE]);
        assert_eq!(
            encode_layer_id(LayerId::new(1).unwrap()),
            [0, 0, 2],
            "id 1 paints (0, 0, 2)"
        );
    }

    #[test]
    fn layer_color_is_opaque() {
        let c = layer_color(LayerId::new(300).unwrap());
        assert_eq!(c, Color::rgb(0, 2, 88));
    }
}
