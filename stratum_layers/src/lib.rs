// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stratum Layers: many independently drawn layers on one surface.
//!
//! A layer is a draw callback, optionally an event dispatcher, and optionally
//! world bounds. The [`LayerManager`] keeps them in an explicit paint order,
//! culls the ones outside the camera with an R-tree, repaints only when
//! something changed, and routes pointer events to the layer under the
//! pointer by reading the hit surface that every draw call mirrors into.
//!
//! ## Frame loop
//!
//! ```text
//! clean --(register/unregister/reorder/pan/zoom/redraw)--> dirty
//! dirty --(tick)--> rendering --> clean
//! ```
//!
//! Within a frame each visible layer paints in z-order between a save and a
//! restore of the drawing state. A layer whose callback returns an error is
//! logged and skipped; the rest of the frame still paints.
//!
//! ## Pointer routing
//!
//! [`LayerManager::handle_event`] resolves the layer under the pointer on
//! move (or on press, see [`LayerManagerConfig::handle_events_on_layer_move`])
//! and forwards the event to it. Changing layers emits `pointerleave` and
//! `mouseleave` to the old one, then `pointerenter` and `mouseenter` to the
//! new one.
//!
//! ## Logging
//!
//! Registration, reorders and lifecycle changes log at `debug`, per-frame
//! summaries at `trace`, and draw failures at `warn`, through the `log`
//! facade.

pub mod active;
pub mod config;
pub mod error;
pub mod layer;
pub mod manager;
mod order;

pub use config::LayerManagerConfig;
pub use error::LayerError;
pub use layer::{Dispatcher, FrameOptions, LayerEvent, LayerHandle, LayerProps, RenderFn};
pub use manager::{FrameOutcome, LayerManager, SkipReason};

pub use stratum_surface::LayerId;
pub use stratum_view::CanvasOptions;
