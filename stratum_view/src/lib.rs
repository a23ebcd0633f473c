// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stratum View: the camera over a layered scene.
//!
//! - [`Renderer`] owns the [`HitCanvas`](stratum_surface::HitCanvas) and its
//!   transform, and converts between screen and world coordinates.
//! - [`Viewport`] turns drag and wheel gestures into pans and zooms.
//! - [`event`] is the platform-neutral pointer input model.
//! - [`geometry`] holds the small rectangle helpers shared with the layer
//!   manager and its collaborators.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use stratum_view::{InputEvent, Modifiers, Renderer, Viewport};
//!
//! let mut renderer = Renderer::new(320, 240, 2.0);
//! renderer.attach_cpu().unwrap();
//! let mut viewport = Viewport::new();
//!
//! // Ctrl + wheel up zooms in around the cursor.
//! let cursor = Point::new(100.0, 50.0);
//! let before = renderer.transformed_point(cursor.x, cursor.y);
//! let zoom = InputEvent::wheel(cursor, Vec2::new(0.0, -1.0)).with_modifiers(Modifiers::CTRL);
//! assert!(viewport.handle_event(&mut renderer, &zoom));
//!
//! let after = renderer.transformed_point(cursor.x, cursor.y);
//! assert!(before.distance(after) < 1e-9);
//! ```

pub mod event;
pub mod geometry;
pub mod renderer;
pub mod viewport;

pub use event::{EventKind, InputEvent, InputSource, Modifiers, MouseInput, TouchInput};
pub use geometry::{BBox, Bounds, RectCorners, RectDimension};
pub use renderer::{CanvasOptions, Renderer, TransformationMatrix, max_pixel_ratio};
pub use viewport::{DragState, Viewport};
