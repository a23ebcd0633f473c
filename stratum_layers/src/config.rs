// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer manager configuration.

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// Settings for a [`LayerManager`](crate::LayerManager).
///
/// Missing fields take their defaults when deserializing, so a host can ship
/// a partial JSON document:
///
/// ```
/// use stratum_layers::LayerManagerConfig;
///
/// let cfg = LayerManagerConfig::from_json_str(r#"{ "pixel_ratio": 2.0, "autoplay": true }"#)
///     .unwrap();
/// assert_eq!(cfg.pixel_ratio, 2.0);
/// assert!(cfg.autoplay);
/// assert_eq!((cfg.width, cfg.height), (800, 600));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerManagerConfig {
    /// Viewport width in screen pixels.
    pub width: u32,
    /// Viewport height in screen pixels.
    pub height: u32,
    /// Device pixel ratio.
    pub pixel_ratio: f64,
    /// Repaint every tick, whether or not anything changed.
    pub autoplay: bool,
    /// Clear the visible world rectangle before each frame.
    pub autoclear: bool,
    /// Route pointer events to layer dispatchers.
    pub layer_events: bool,
    /// Resolve the layer under the pointer on move. When off, it is resolved
    /// on press.
    pub handle_events_on_layer_move: bool,
}

impl Default for LayerManagerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
            autoplay: false,
            autoclear: true,
            layer_events: true,
            handle_events_on_layer_move: true,
        }
    }
}

impl LayerManagerConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, LayerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the viewport size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the device pixel ratio.
    #[must_use]
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Enable or disable autoplay.
    #[must_use]
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Enable or disable clearing before each frame.
    #[must_use]
    pub fn with_autoclear(mut self, autoclear: bool) -> Self {
        self.autoclear = autoclear;
        self
    }

    /// Enable or disable layer event routing.
    #[must_use]
    pub fn with_layer_events(mut self, layer_events: bool) -> Self {
        self.layer_events = layer_events;
        self
    }

    /// Choose whether the active layer is resolved on move or on press.
    #[must_use]
    pub fn with_handle_events_on_layer_move(mut self, on_move: bool) -> Self {
        self.handle_events_on_layer_move = on_move;
        self
    }
}
