// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a layer is made of, and what it receives.

use core::fmt;
use core::time::Duration;

use stratum_index::Key;
use stratum_surface::{DrawError, HitCanvas, LayerId};
use stratum_view::{Bounds, CanvasOptions, EventKind, InputEvent, RectDimension, TransformationMatrix};

use crate::manager::LayerManager;

/// Draw callback. Runs once per frame while the layer is visible.
pub type RenderFn = Box<dyn FnMut(&mut HitCanvas, &FrameOptions) -> Result<(), DrawError>>;

/// Event callback. Receives the event kind and its details.
pub type Dispatcher = Box<dyn FnMut(EventKind, &LayerEvent)>;

/// Everything a render callback may want to know about the frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameOptions {
    /// Surface size and density.
    pub canvas: CanvasOptions,
    /// Camera transform at the start of the frame.
    pub transform: TransformationMatrix,
    /// World rectangle cleared for this frame.
    pub visible_area: RectDimension,
    /// Time since the first rendered frame.
    pub time: Duration,
    /// Number of frames rendered before this one.
    pub frame: u64,
}

/// An event routed to a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerEvent {
    /// Surface-local x, screen pixels.
    pub x: f64,
    /// Surface-local y, screen pixels.
    pub y: f64,
    /// The input event, re-typed for synthetic enter/leave notifications.
    pub original_event: InputEvent,
}

/// Registration request.
///
/// ```
/// use stratum_layers::LayerProps;
/// use stratum_view::Bounds;
///
/// let props = LayerProps::new(|canvas, _frame| {
///     canvas.fill_rect(kurbo::Rect::new(0.0, 0.0, 10.0, 10.0));
///     Ok(())
/// })
/// .with_bounds(Bounds::new(0.0, 0.0, 10.0, 10.0))
/// .with_dispatcher(|kind, event| println!("{kind} at {}, {}", event.x, event.y));
/// # let _ = props;
/// ```
pub struct LayerProps {
    pub(crate) render: RenderFn,
    pub(crate) dispatcher: Option<Dispatcher>,
    pub(crate) bounds: Option<Bounds>,
    pub(crate) z_index: Option<i32>,
}

impl fmt::Debug for LayerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerProps")
            .field("dispatcher", &self.dispatcher.is_some())
            .field("bounds", &self.bounds)
            .field("z_index", &self.z_index)
            .finish_non_exhaustive()
    }
}

impl LayerProps {
    /// Layer drawn by `render`, without bounds (always visible) and stacked on
    /// top of the existing layers.
    pub fn new(
        render: impl FnMut(&mut HitCanvas, &FrameOptions) -> Result<(), DrawError> + 'static,
    ) -> Self {
        Self {
            render: Box::new(render),
            dispatcher: None,
            bounds: None,
            z_index: None,
        }
    }

    /// Receive routed pointer events.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: impl FnMut(EventKind, &LayerEvent) + 'static) -> Self {
        self.dispatcher = Some(Box::new(dispatcher));
        self
    }

    /// World bounds used to cull the layer when it is off screen.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Explicit z-index. Without one the layer stacks on top.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }
}

/// Returned by [`LayerManager::register`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerHandle {
    id: LayerId,
}

impl LayerHandle {
    pub(crate) fn new(id: LayerId) -> Self {
        Self { id }
    }

    /// The registered layer's id.
    pub fn layer_id(&self) -> LayerId {
        self.id
    }

    /// Remove the layer from `manager`.
    pub fn unregister(self, manager: &mut LayerManager) {
        manager.unregister(self.id);
    }
}

pub(crate) struct Layer {
    pub(crate) render: RenderFn,
    pub(crate) dispatcher: Option<Dispatcher>,
    pub(crate) bounds: Option<Bounds>,
    pub(crate) key: Option<Key>,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("dispatcher", &self.dispatcher.is_some())
            .field("bounds", &self.bounds)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
