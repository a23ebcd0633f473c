// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform-neutral pointer input.
//!
//! Hosts translate their native mouse, pointer, wheel and touch events into
//! [`InputEvent`] and feed them to the layer manager. Event names follow the
//! DOM spelling so hosts backed by a browser can map them one to one.

use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;
use kurbo::{Point, Vec2};

/// The event kinds routed to layers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `click`
    Click,
    /// `contextmenu`
    ContextMenu,
    /// `dblclick`
    DblClick,
    /// `auxclick`
    AuxClick,
    /// `mousedown`
    MouseDown,
    /// `mouseenter`
    MouseEnter,
    /// `mouseleave`
    MouseLeave,
    /// `mousemove`
    MouseMove,
    /// `mouseup`
    MouseUp,
    /// `wheel`
    Wheel,
    /// `touchcancel`
    TouchCancel,
    /// `touchend`
    TouchEnd,
    /// `touchmove`
    TouchMove,
    /// `touchstart`
    TouchStart,
    /// `pointerenter`
    PointerEnter,
    /// `pointerleave`
    PointerLeave,
    /// `pointerdown`
    PointerDown,
    /// `pointermove`
    PointerMove,
    /// `pointerup`
    PointerUp,
    /// `pointercancel`
    PointerCancel,
}

impl EventKind {
    /// Every supported kind.
    pub const ALL: [Self; 20] = [
        Self::Click,
        Self::ContextMenu,
        Self::DblClick,
        Self::AuxClick,
        Self::MouseDown,
        Self::MouseEnter,
        Self::MouseLeave,
        Self::MouseMove,
        Self::MouseUp,
        Self::Wheel,
        Self::TouchCancel,
        Self::TouchEnd,
        Self::TouchMove,
        Self::TouchStart,
        Self::PointerEnter,
        Self::PointerLeave,
        Self::PointerDown,
        Self::PointerMove,
        Self::PointerUp,
        Self::PointerCancel,
    ];

    /// DOM event name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::ContextMenu => "contextmenu",
            Self::DblClick => "dblclick",
            Self::AuxClick => "auxclick",
            Self::MouseDown => "mousedown",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::Wheel => "wheel",
            Self::TouchCancel => "touchcancel",
            Self::TouchEnd => "touchend",
            Self::TouchMove => "touchmove",
            Self::TouchStart => "touchstart",
            Self::PointerEnter => "pointerenter",
            Self::PointerLeave => "pointerleave",
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::PointerUp => "pointerup",
            Self::PointerCancel => "pointercancel",
        }
    }

    /// Touch kinds.
    pub const fn is_touch(self) -> bool {
        matches!(
            self,
            Self::TouchCancel | Self::TouchEnd | Self::TouchMove | Self::TouchStart
        )
    }

    /// Mouse, pointer and wheel kinds: everything that carries enter/leave
    /// semantics.
    pub const fn is_mouse_like(self) -> bool {
        !self.is_touch()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when parsing an unknown event name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported event kind `{0}`")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseEventKindError(s.to_owned()))
    }
}

bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Control.
        const CTRL  = 0b0000_0001;
        /// Shift.
        const SHIFT = 0b0000_0010;
        /// Alt / Option.
        const ALT   = 0b0000_0100;
        /// Meta / Command.
        const META  = 0b0000_1000;
    }
}

/// Coordinates of a mouse, pointer or wheel event.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MouseInput {
    /// Relative to the drawing surface's top-left corner.
    pub offset: Point,
    /// Relative to the document.
    pub page: Point,
    /// Relative to the visible viewport.
    pub client: Point,
}

/// Coordinates of a touch event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchInput {
    /// Client positions of the touches that changed with this event.
    pub changed_touches: Vec<Point>,
    /// Client position of the event target's top-left corner.
    pub target_origin: Point,
}

/// Where an event's coordinates come from.
#[derive(Clone, Debug, PartialEq)]
pub enum InputSource {
    /// Mouse, pointer or wheel.
    Mouse(MouseInput),
    /// Touch.
    Touch(TouchInput),
}

/// A pointer event as fed to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct InputEvent {
    /// What happened.
    pub kind: EventKind,
    /// Coordinates.
    pub source: InputSource,
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Wheel scroll delta; zero for non-wheel events.
    pub wheel_delta: Vec2,
}

impl InputEvent {
    /// Mouse-like event at `offset`, with page and client coordinates equal
    /// to it.
    pub fn mouse(kind: EventKind, offset: Point) -> Self {
        Self {
            kind,
            source: InputSource::Mouse(MouseInput {
                offset,
                page: offset,
                client: offset,
            }),
            modifiers: Modifiers::empty(),
            wheel_delta: Vec2::ZERO,
        }
    }

    /// Wheel event at `offset` scrolling by `delta`.
    pub fn wheel(offset: Point, delta: Vec2) -> Self {
        Self::mouse(EventKind::Wheel, offset).with_wheel_delta(delta)
    }

    /// Touch event.
    pub fn touch(kind: EventKind, changed_touches: Vec<Point>, target_origin: Point) -> Self {
        Self {
            kind,
            source: InputSource::Touch(TouchInput {
                changed_touches,
                target_origin,
            }),
            modifiers: Modifiers::empty(),
            wheel_delta: Vec2::ZERO,
        }
    }

    /// Copy of this event re-typed as `kind`.
    #[must_use]
    pub fn with_kind(&self, kind: EventKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    /// Set the held modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the wheel delta.
    #[must_use]
    pub fn with_wheel_delta(mut self, delta: Vec2) -> Self {
        self.wheel_delta = delta;
        self
    }

    /// Set the page position. No effect on touch events.
    #[must_use]
    pub fn with_page(mut self, page: Point) -> Self {
        if let InputSource::Mouse(m) = &mut self.source {
            m.page = page;
        }
        self
    }

    /// Set the client position. No effect on touch events.
    #[must_use]
    pub fn with_client(mut self, client: Point) -> Self {
        if let InputSource::Mouse(m) = &mut self.source {
            m.client = client;
        }
        self
    }

    /// Mouse coordinates, if this is a mouse-like event.
    pub fn mouse_input(&self) -> Option<&MouseInput> {
        match &self.source {
            InputSource::Mouse(m) => Some(m),
            InputSource::Touch(_) => None,
        }
    }

    /// Whether the control modifier is held.
    pub fn ctrl_key(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(
            "layer.click".parse::<EventKind>(),
            Err(ParseEventKindError("layer.click".into()))
        );
    }

    #[test]
    fn touch_kinds_are_not_mouse_like() {
        let touch: Vec<_> = EventKind::ALL.into_iter().filter(|k| k.is_touch()).collect();
        assert_eq!(
            touch,
            [
                EventKind::TouchCancel,
                EventKind::TouchEnd,
                EventKind::TouchMove,
                EventKind::TouchStart
            ]
        );
        assert!(EventKind::Wheel.is_mouse_like());
        assert!(EventKind::PointerEnter.is_mouse_like());
    }

    #[test]
    fn retyped_copy_keeps_coordinates() {
        let ev = InputEvent::mouse(EventKind::PointerMove, Point::new(3.0, 4.0))
            .with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        let leave = ev.with_kind(EventKind::PointerLeave);
        assert_eq!(leave.kind, EventKind::PointerLeave);
        assert_eq!(leave.source, ev.source);
        assert!(leave.ctrl_key());
    }
}
