// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer manager: registry, visibility, frame loop and pointer routing.

use core::fmt;
use core::time::Duration;
use std::collections::{HashMap, HashSet};

use stratum_index::RTreeIndex;
use stratum_surface::{DrawError, HitCanvas, LayerId};
use stratum_view::geometry::{bbox_from_bounds, bbox_from_rect, calculate_position};
use stratum_view::{Bounds, CanvasOptions, EventKind, InputEvent, Renderer, Viewport};

use crate::active::{ActiveLayer, Transition};
use crate::config::LayerManagerConfig;
use crate::error::LayerError;
use crate::layer::{FrameOptions, Layer, LayerEvent, LayerHandle, LayerProps};
use crate::order::ZOrder;

/// Why [`LayerManager::tick`] didn't paint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The loop isn't running (never started, or destroyed).
    NotRunning,
    /// Nothing changed since the last frame.
    Clean,
    /// No drawing surface is attached. The frame stays pending.
    NoSurface,
}

/// Result of one [`LayerManager::tick`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was painted.
    Rendered {
        /// Number of layer callbacks invoked.
        layers: usize,
    },
    /// No frame was painted.
    Skipped(SkipReason),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
    Destroyed,
}

type CanvasHandler = Box<dyn FnMut(&InputEvent)>;
type LayerChangeHook = Box<dyn FnMut(LayerId)>;
type DrawErrorHook = Box<dyn FnMut(LayerId, &DrawError)>;
type ResizeHook = Box<dyn FnMut(&CanvasOptions)>;

#[derive(Default)]
struct Hooks {
    canvas_handler: Option<CanvasHandler>,
    on_layer_change: Option<LayerChangeHook>,
    on_draw_error: Option<DrawErrorHook>,
    on_resize: Option<ResizeHook>,
}

/// Multiplexes many independently drawn layers onto one surface.
///
/// The host drives it with three calls:
///
/// - [`tick`](Self::tick) once per animation frame;
/// - [`handle_event`](Self::handle_event) for every pointer event over the
///   surface, to route it to layers;
/// - [`handle_viewport_event`](Self::handle_viewport_event) for the events
///   that should pan and zoom the camera.
///
/// ```
/// use core::time::Duration;
/// use kurbo::{Point, Rect};
/// use stratum_layers::{FrameOutcome, LayerManager, LayerManagerConfig, LayerProps};
/// use stratum_surface::Color;
/// use stratum_view::{Bounds, EventKind, InputEvent};
///
/// let mut manager = LayerManager::new(LayerManagerConfig::default().with_size(200, 100));
/// manager.attach_cpu_canvas().unwrap();
///
/// let square = manager
///     .register(
///         LayerProps::new(|canvas, _| {
///             canvas.set_fill_color(Color::rgb(200, 40, 40));
///             canvas.fill_rect(Rect::new(10.0, 10.0, 60.0, 60.0));
///             Ok(())
///         })
///         .with_bounds(Bounds::new(10.0, 10.0, 60.0, 60.0)),
///     )
///     .unwrap();
///
/// manager.run();
/// assert_eq!(manager.tick(Duration::ZERO), FrameOutcome::Rendered { layers: 1 });
///
/// manager.handle_event(&InputEvent::mouse(EventKind::PointerMove, Point::new(30.0, 30.0)));
/// assert_eq!(manager.active_layer_id(), Some(square.layer_id()));
/// ```
pub struct LayerManager {
    config: LayerManagerConfig,
    renderer: Renderer,
    viewport: Viewport,
    layers: HashMap<LayerId, Layer>,
    order: ZOrder,
    index: RTreeIndex<f64, LayerId>,
    visible: Vec<LayerId>,
    active: ActiveLayer,
    next_id: u32,
    dirty: bool,
    state: LoopState,
    started_at: Option<Duration>,
    frame: u64,
    hooks: Hooks,
}

impl fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerManager")
            .field("config", &self.config)
            .field("renderer", &self.renderer)
            .field("layers", &self.layers.len())
            .field("visible", &self.visible)
            .field("active", &self.active.current())
            .field("dirty", &self.dirty)
            .field("state", &self.state)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl LayerManager {
    /// Manager with no surface attached and the loop stopped.
    pub fn new(config: LayerManagerConfig) -> Self {
        let renderer = Renderer::new(config.width, config.height, config.pixel_ratio);
        Self {
            config,
            renderer,
            viewport: Viewport::new(),
            layers: HashMap::new(),
            order: ZOrder::default(),
            index: RTreeIndex::new(),
            visible: Vec::new(),
            active: ActiveLayer::new(),
            next_id: 1,
            dirty: true,
            state: LoopState::Idle,
            started_at: None,
            frame: 0,
            hooks: Hooks::default(),
        }
    }

    // --- surfaces ---------------------------------------------------------

    /// Attach a drawing context. Its transform is reset to the pixel ratio.
    pub fn attach_canvas(&mut self, canvas: HitCanvas) {
        self.renderer.attach(canvas);
        self.search_visible_layers();
    }

    /// Allocate and attach a CPU drawing context sized to the configuration.
    pub fn attach_cpu_canvas(&mut self) -> Result<(), LayerError> {
        self.renderer.attach_cpu()?;
        self.search_visible_layers();
        Ok(())
    }

    /// Resize the viewport and both surfaces, keeping the camera.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f64) -> Result<(), LayerError> {
        self.renderer.resize(width, height, pixel_ratio)?;
        self.config.width = width;
        self.config.height = height;
        self.config.pixel_ratio = pixel_ratio;
        let options = self.renderer.canvas_options();
        if let Some(hook) = self.hooks.on_resize.as_mut() {
            hook(&options);
        }
        log::debug!("resized to {width}x{height} @ {pixel_ratio}");
        self.search_visible_layers();
        Ok(())
    }

    // --- registration -------------------------------------------------------

    /// Register a layer. Ids start at 1 and are never reused.
    pub fn register(&mut self, props: LayerProps) -> Result<LayerHandle, LayerError> {
        let id = LayerId::new(self.next_id).ok_or(LayerError::IdsExhausted)?;
        self.next_id += 1;

        let LayerProps {
            render,
            dispatcher,
            bounds,
            z_index,
        } = props;
        if dispatcher.is_some() && !self.config.layer_events {
            log::warn!("layer {id} has a dispatcher but layer events are disabled");
        }
        let key = bounds.map(|b| self.index.insert(bbox_from_bounds(&b), id));
        self.layers.insert(
            id,
            Layer {
                render,
                dispatcher,
                bounds,
                key,
            },
        );
        self.order.insert(id, z_index);
        log::debug!("registered layer {id}");
        self.search_visible_layers();
        Ok(LayerHandle::new(id))
    }

    /// Remove a layer. Unknown ids are ignored.
    pub fn unregister(&mut self, id: LayerId) {
        if let Some(layer) = self.layers.remove(&id) {
            if let Some(key) = layer.key {
                self.index.remove(key);
            }
            self.order.remove(id);
            self.active.forget(id);
            log::debug!("unregistered layer {id}");
            self.search_visible_layers();
        }
        self.redraw();
    }

    /// Move, add or drop a layer's culling bounds. Returns `false` for
    /// unknown ids.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Option<Bounds>) -> bool {
        let Some(layer) = self.layers.get_mut(&id) else {
            return false;
        };
        match (layer.key, bounds) {
            (Some(key), Some(b)) => {
                self.index.update(key, bbox_from_bounds(&b));
            }
            (Some(key), None) => {
                self.index.remove(key);
                layer.key = None;
            }
            (None, Some(b)) => layer.key = Some(self.index.insert(bbox_from_bounds(&b), id)),
            (None, None) => {}
        }
        layer.bounds = bounds;
        self.search_visible_layers();
        true
    }

    /// Request a repaint on the next tick.
    pub fn redraw(&mut self) {
        self.dirty = true;
    }

    // --- z-order --------------------------------------------------------------

    /// Stack `ids` bottom to top beneath every layer not listed.
    ///
    /// Unknown and repeated ids are skipped. Each layer's z-index becomes its
    /// position in the resulting sequence.
    pub fn reorder(&mut self, ids: &[LayerId]) {
        self.order.reorder(ids);
        log::debug!("reordered layers: {:?}", self.order.ids().collect::<Vec<_>>());
        self.search_visible_layers();
    }

    /// Set a layer's z-index. Equal z-indices paint in registration order.
    /// Returns `false` for unknown ids.
    pub fn set_z_index(&mut self, id: LayerId, z_index: i32) -> bool {
        if !self.order.set_z(id, z_index) {
            return false;
        }
        self.search_visible_layers();
        true
    }

    /// A layer's z-index.
    pub fn z_index(&self, id: LayerId) -> Option<i32> {
        self.order.z_of(id)
    }

    /// Registered ids, bottom to top.
    pub fn layer_sequence(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.order.ids()
    }

    // --- visibility -----------------------------------------------------------

    /// Recompute which layers intersect the visible world rectangle and mark
    /// the scene dirty.
    ///
    /// Layers without bounds are always visible. Without a surface every
    /// layer counts as visible.
    pub fn search_visible_layers(&mut self) {
        self.visible.clear();
        match self.renderer.visible_world_rect() {
            None => self.visible.extend(self.order.ids()),
            Some(area) => {
                let hits: HashSet<LayerId> = self
                    .index
                    .query_rect(bbox_from_rect(&area))
                    .map(|(_, id)| id)
                    .collect();
                let layers = &self.layers;
                self.visible.extend(self.order.ids().filter(|id| {
                    hits.contains(id) || layers.get(id).is_some_and(|l| l.bounds.is_none())
                }));
            }
        }
        self.redraw();
    }

    /// Visible ids, bottom to top.
    pub fn visible_layer_ids(&self) -> &[LayerId] {
        &self.visible
    }

    // --- frame loop -------------------------------------------------------------

    /// Start the loop. No effect after [`destroy`](Self::destroy).
    ///
    /// The culling index is rebuilt in one packing pass over every bounded
    /// layer registered so far.
    pub fn run(&mut self) {
        if self.state == LoopState::Idle {
            self.rebuild_index();
            self.state = LoopState::Running;
            log::debug!("render loop started");
        }
    }

    fn rebuild_index(&mut self) {
        let mut bounded: Vec<(LayerId, Bounds)> = self
            .layers
            .iter()
            .filter_map(|(id, layer)| layer.bounds.map(|b| (*id, b)))
            .collect();
        bounded.sort_unstable_by_key(|(id, _)| *id);
        let entries: Vec<_> = bounded
            .iter()
            .map(|(id, b)| (bbox_from_bounds(b), *id))
            .collect();
        self.index.clear();
        let keys = self.index.bulk_load(&entries);
        for ((id, _), key) in bounded.iter().zip(keys) {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.key = Some(key);
            }
        }
        log::trace!("bulk-loaded {} layer bounds", entries.len());
        self.search_visible_layers();
    }

    /// Stop the loop for good and release the drawing context.
    pub fn destroy(&mut self) {
        self.state = LoopState::Destroyed;
        self.renderer.detach();
        self.active = ActiveLayer::new();
        log::debug!("render loop destroyed");
    }

    /// Whether the loop is running.
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Paint one frame if anything changed.
    ///
    /// `now` is the host's monotonic clock; [`FrameOptions::time`] counts
    /// from the first painted frame.
    pub fn tick(&mut self, now: Duration) -> FrameOutcome {
        if self.state != LoopState::Running {
            return FrameOutcome::Skipped(SkipReason::NotRunning);
        }
        if self.config.autoplay {
            self.dirty = true;
        }
        if !self.dirty {
            return FrameOutcome::Skipped(SkipReason::Clean);
        }
        let (Some(transform), Some(visible_area)) =
            (self.renderer.transform(), self.renderer.visible_world_rect())
        else {
            return FrameOutcome::Skipped(SkipReason::NoSurface);
        };
        if self.config.autoclear {
            self.renderer.clear_rect(&visible_area);
        }
        let started = *self.started_at.get_or_insert(now);
        let options = FrameOptions {
            canvas: self.renderer.canvas_options(),
            transform,
            visible_area,
            time: now.saturating_sub(started),
            frame: self.frame,
        };
        let Some(canvas) = self.renderer.context_mut() else {
            return FrameOutcome::Skipped(SkipReason::NoSurface);
        };

        let mut painted = 0;
        for &id in &self.visible {
            let Some(layer) = self.layers.get_mut(&id) else {
                continue;
            };
            if let Some(hook) = self.hooks.on_layer_change.as_mut() {
                hook(id);
            }
            canvas.set_active_layer_id(Some(id));
            let depth = canvas.save_depth();
            canvas.save();
            let result = (layer.render)(canvas, &options);
            canvas.restore_to_depth(depth);
            painted += 1;
            if let Err(err) = result {
                log::warn!("layer {id} failed to draw: {err}");
                if let Some(hook) = self.hooks.on_draw_error.as_mut() {
                    hook(id, &err);
                }
            }
        }
        canvas.set_active_layer_id(None);

        self.dirty = false;
        self.frame += 1;
        log::trace!("frame {} painted {painted} layers", options.frame);
        FrameOutcome::Rendered { layers: painted }
    }

    // --- pointer routing ---------------------------------------------------------

    /// Host entry point for pointer events over the surface.
    ///
    /// The canvas handler sees the raw event first. With layer events enabled
    /// the active layer is then re-resolved for trigger kinds, and the event
    /// is forwarded to the active layer.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let Some(handler) = self.hooks.canvas_handler.as_mut() {
            handler(event);
        }
        if !self.config.layer_events {
            return;
        }
        if self.resolves_active_layer(event.kind) {
            self.find_active_layer(event);
        }
        self.dispatch_event(event);
    }

    fn resolves_active_layer(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::TouchStart => true,
            EventKind::PointerMove | EventKind::MouseMove => {
                self.config.handle_events_on_layer_move
            }
            EventKind::MouseDown | EventKind::PointerDown => {
                !self.config.handle_events_on_layer_move
            }
            _ => false,
        }
    }

    /// Resolve the layer under the event from the hit surface.
    ///
    /// When it changes, mouse-like events notify the old layer with
    /// `pointerleave` and `mouseleave`, then the new one with `pointerenter`
    /// and `mouseenter`. Touch events switch silently.
    pub fn find_active_layer(&mut self, event: &InputEvent) {
        let point = calculate_position(event, 1.0);
        let ratio = self.renderer.initial_pixel_ratio();
        let hit = self
            .renderer
            .context()
            .and_then(|c| c.layer_id_at(point.x * ratio, point.y * ratio))
            .filter(|id| self.layers.contains_key(id));

        let transitions = self.active.update(hit);
        if !event.kind.is_mouse_like() {
            return;
        }
        for transition in transitions {
            let (id, kinds) = match transition {
                Transition::Leave(id) => (id, [EventKind::PointerLeave, EventKind::MouseLeave]),
                Transition::Enter(id) => (id, [EventKind::PointerEnter, EventKind::MouseEnter]),
            };
            for kind in kinds {
                let details = LayerEvent {
                    x: point.x,
                    y: point.y,
                    original_event: event.with_kind(kind),
                };
                self.dispatch_layer_event(id, kind, &details);
            }
        }
    }

    /// Forward `event` to the active layer's dispatcher, if any.
    pub fn dispatch_event(&mut self, event: &InputEvent) {
        let Some(id) = self.active.current() else {
            return;
        };
        let point = calculate_position(event, 1.0);
        let details = LayerEvent {
            x: point.x,
            y: point.y,
            original_event: event.clone(),
        };
        self.dispatch_layer_event(id, event.kind, &details);
    }

    /// Send `pointerleave` and `mouseleave` to the active layer and clear it.
    ///
    /// For hosts whose pointer left the surface entirely.
    pub fn leave_active_layer(&mut self, event: &InputEvent) {
        for transition in self.active.clear() {
            let Transition::Leave(id) = transition else {
                continue;
            };
            for kind in [EventKind::PointerLeave, EventKind::MouseLeave] {
                let details = LayerEvent {
                    x: 0.0,
                    y: 0.0,
                    original_event: event.with_kind(kind),
                };
                self.dispatch_layer_event(id, kind, &details);
            }
        }
    }

    fn dispatch_layer_event(&mut self, id: LayerId, kind: EventKind, details: &LayerEvent) {
        if let Some(dispatch) = self
            .layers
            .get_mut(&id)
            .and_then(|l| l.dispatcher.as_mut())
        {
            dispatch(kind, details);
        }
    }

    /// Feed a pointer event to the camera. Returns whether the view changed;
    /// when it did, visibility is re-queried and a repaint is scheduled.
    pub fn handle_viewport_event(&mut self, event: &InputEvent) -> bool {
        let changed = self.viewport.handle_event(&mut self.renderer, event);
        if changed {
            self.search_visible_layers();
        }
        changed
    }

    // --- hooks --------------------------------------------------------------------

    /// Called with every event passed to [`handle_event`](Self::handle_event)
    /// before layer routing.
    pub fn set_canvas_handler(&mut self, handler: impl FnMut(&InputEvent) + 'static) {
        self.hooks.canvas_handler = Some(Box::new(handler));
    }

    /// Called before each layer's render callback.
    pub fn on_layer_change(&mut self, hook: impl FnMut(LayerId) + 'static) {
        self.hooks.on_layer_change = Some(Box::new(hook));
    }

    /// Called when a render callback returns an error.
    pub fn on_draw_error(&mut self, hook: impl FnMut(LayerId, &DrawError) + 'static) {
        self.hooks.on_draw_error = Some(Box::new(hook));
    }

    /// Called after every [`resize`](Self::resize).
    pub fn on_resize(&mut self, hook: impl FnMut(&CanvasOptions) + 'static) {
        self.hooks.on_resize = Some(Box::new(hook));
    }

    // --- accessors ----------------------------------------------------------------

    /// The layer under the pointer.
    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active.current()
    }

    /// Whether the next tick will paint.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of registered layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// A layer's culling bounds.
    pub fn bounds(&self, id: LayerId) -> Option<Bounds> {
        self.layers.get(&id).and_then(|l| l.bounds)
    }

    /// The camera.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The camera, mutably. Call
    /// [`search_visible_layers`](Self::search_visible_layers) after moving it
    /// by hand.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// The pan/zoom controller.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current configuration, including the latest size.
    pub fn config(&self) -> &LayerManagerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use std::cell::RefCell;
    use stratum_surface::Surface;
    use std::rc::Rc;

    fn manager() -> LayerManager {
        let mut m = LayerManager::new(LayerManagerConfig::default().with_size(100, 100));
        m.attach_cpu_canvas().unwrap();
        m.run();
        m
    }

    fn square(rect: Rect) -> LayerProps {
        LayerProps::new(move |canvas, _| {
            canvas.fill_rect(rect);
            Ok(())
        })
        .with_bounds(Bounds::new(rect.x0, rect.y0, rect.x1, rect.y1))
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut m = manager();
        let a = m.register(LayerProps::new(|_, _| Ok(()))).unwrap();
        let b = m.register(LayerProps::new(|_, _| Ok(()))).unwrap();
        assert_eq!((a.layer_id().get(), b.layer_id().get()), (1, 2));
        b.unregister(&mut m);
        let c = m.register(LayerProps::new(|_, _| Ok(()))).unwrap();
        assert_eq!(c.layer_id().get(), 3);
        assert_eq!(m.layer_count(), 2);
        assert!(!m.contains(b.layer_id()));
    }

    #[test]
    fn dirty_flag_paints_exactly_once() {
        let mut m = manager();
        m.register(square(Rect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
        assert!(m.is_dirty());
        assert_eq!(m.tick(Duration::ZERO), FrameOutcome::Rendered { layers: 1 });
        assert!(!m.is_dirty());
        assert_eq!(
            m.tick(Duration::from_millis(16)),
            FrameOutcome::Skipped(SkipReason::Clean)
        );
        m.redraw();
        assert_eq!(
            m.tick(Duration::from_millis(32)),
            FrameOutcome::Rendered { layers: 1 }
        );
    }

    #[test]
    fn run_bulk_loads_layers_registered_before_it() {
        let mut m = LayerManager::new(LayerManagerConfig::default().with_size(100, 100));
        m.attach_cpu_canvas().unwrap();
        let mut ids = Vec::new();
        for i in 0..50_u32 {
            let x = f64::from(i) * 10.0;
            let id = m.register(square(Rect::new(x, 0.0, x + 5.0, 5.0))).unwrap();
            ids.push(id.layer_id());
        }
        let unbounded = m.register(LayerProps::new(|_, _| Ok(()))).unwrap().layer_id();

        m.run();
        assert_eq!(m.index.len(), 50);
        // Boxes up to x = 200 meet the visible area at scale 1.
        let visible: Vec<_> = m.visible_layer_ids().to_vec();
        assert_eq!(visible.len(), 22);
        assert_eq!(visible.last(), Some(&unbounded));

        // Keys handed out by the bulk load stay valid for moves and removals.
        assert!(m.set_bounds(ids[0], Some(Bounds::new(900.0, 900.0, 905.0, 905.0))));
        assert!(!m.visible_layer_ids().contains(&ids[0]));
        m.unregister(ids[1]);
        assert_eq!(m.index.len(), 49);
        assert!(!m.visible_layer_ids().contains(&ids[1]));
        assert!(m.visible_layer_ids().contains(&ids[2]));
    }

    #[test]
    fn loop_states() {
        let mut m = LayerManager::new(LayerManagerConfig::default());
        assert_eq!(
            m.tick(Duration::ZERO),
            FrameOutcome::Skipped(SkipReason::NotRunning)
        );
        m.run();
        assert_eq!(
            m.tick(Duration::ZERO),
            FrameOutcome::Skipped(SkipReason::NoSurface)
        );
        assert!(m.is_dirty(), "a skipped frame stays pending");

        m.attach_cpu_canvas().unwrap();
        assert_eq!(m.tick(Duration::ZERO), FrameOutcome::Rendered { layers: 0 });

        m.destroy();
        m.run();
        m.redraw();
        assert!(!m.is_running());
        assert_eq!(
            m.tick(Duration::ZERO),
            FrameOutcome::Skipped(SkipReason::NotRunning)
        );
        assert!(m.renderer().context().is_none());
    }

    #[test]
    fn autoplay_repaints_every_tick() {
        let mut m = LayerManager::new(LayerManagerConfig::default().with_autoplay(true));
        m.attach_cpu_canvas().unwrap();
        m.run();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let seen = frames.clone();
        m.register(LayerProps::new(move |_, frame| {
            seen.borrow_mut().push((frame.frame, frame.time));
            Ok(())
        }))
        .unwrap();
        for ms in [100, 116, 132] {
            assert!(matches!(
                m.tick(Duration::from_millis(ms)),
                FrameOutcome::Rendered { .. }
            ));
        }
        assert_eq!(
            *frames.borrow(),
            [
                (0, Duration::ZERO),
                (1, Duration::from_millis(16)),
                (2, Duration::from_millis(32)),
            ]
        );
    }

    #[test]
    fn offscreen_layers_are_culled() {
        let mut m = manager();
        let near = m.register(square(Rect::new(10.0, 10.0, 20.0, 20.0))).unwrap();
        let far = m
            .register(square(Rect::new(5000.0, 5000.0, 5010.0, 5010.0)))
            .unwrap();
        let free = m.register(LayerProps::new(|_, _| Ok(()))).unwrap();
        assert_eq!(m.visible_layer_ids(), [near.layer_id(), free.layer_id()]);
        assert_eq!(m.tick(Duration::ZERO), FrameOutcome::Rendered { layers: 2 });

        assert!(m.set_bounds(far.layer_id(), Some(Bounds::new(30.0, 30.0, 40.0, 40.0))));
        assert_eq!(
            m.visible_layer_ids(),
            [near.layer_id(), far.layer_id(), free.layer_id()]
        );
        assert!(m.set_bounds(near.layer_id(), None));
        assert_eq!(m.bounds(near.layer_id()), None);
        assert_eq!(m.visible_layer_ids().len(), 3);
        assert!(!m.set_bounds(LayerId::new(99).unwrap(), None));
    }

    #[test]
    fn failed_layer_state_does_not_leak() {
        let mut m = manager();
        m.register(LayerProps::new(|canvas, _| {
            canvas.save();
            canvas.scale(100.0, 100.0);
            Err(DrawError::msg("boom"))
        }))
        .unwrap();
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        m.register(LayerProps::new(move |canvas, frame| {
            *s.borrow_mut() = Some(canvas.get_transform().as_coeffs()[0]);
            assert_eq!(frame.transform.scale_x, 1.0);
            Ok(())
        }))
        .unwrap();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let e = errors.clone();
        m.on_draw_error(move |id, err| e.borrow_mut().push((id.get(), err.to_string())));

        assert_eq!(m.tick(Duration::ZERO), FrameOutcome::Rendered { layers: 2 });
        assert_eq!(*seen.borrow(), Some(1.0));
        assert_eq!(*errors.borrow(), [(1, "boom".to_owned())]);
        assert_eq!(m.renderer().context().unwrap().save_depth(), 0);
    }

    #[test]
    fn resize_reallocates_and_notifies() {
        let mut m = manager();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let s = sizes.clone();
        m.on_resize(move |opts| s.borrow_mut().push((opts.width, opts.height)));
        m.tick(Duration::ZERO);
        m.resize(300, 150, 2.0).unwrap();
        assert!(m.is_dirty());
        assert_eq!(*sizes.borrow(), [(300, 150)]);
        let canvas = m.renderer().context().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (600, 300));
        assert_eq!(canvas.hit_surface().width(), 600);
        assert_eq!(m.config().pixel_ratio, 2.0);
        assert!(m.resize(0, 10, 1.0).is_err());
    }

    #[test]
    fn routing_can_be_switched_off() {
        let mut m = LayerManager::new(LayerManagerConfig::default().with_layer_events(false));
        m.attach_cpu_canvas().unwrap();
        m.run();
        let calls = Rc::new(RefCell::new(0));
        let c = calls.clone();
        m.register(square(Rect::new(0.0, 0.0, 50.0, 50.0)).with_dispatcher(move |_, _| {
            *c.borrow_mut() += 1;
        }))
        .unwrap();
        let raw = Rc::new(RefCell::new(Vec::new()));
        let r = raw.clone();
        m.set_canvas_handler(move |ev| r.borrow_mut().push(ev.kind));
        m.tick(Duration::ZERO);

        let ev = InputEvent::mouse(EventKind::PointerMove, kurbo::Point::new(10.0, 10.0));
        m.handle_event(&ev);
        assert_eq!(*raw.borrow(), [EventKind::PointerMove]);
        assert_eq!(m.active_layer_id(), None);
        assert_eq!(*calls.borrow(), 0);
    }
}
