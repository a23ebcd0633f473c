// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active layer tracking: compute leave/enter transitions when the layer
//! under the pointer changes.
//!
//! ```
//! use stratum_layers::active::{ActiveLayer, Transition};
//! use stratum_surface::LayerId;
//!
//! let (a, b) = (LayerId::new(1).unwrap(), LayerId::new(2).unwrap());
//! let mut active = ActiveLayer::new();
//! assert_eq!(active.update(Some(a)), vec![Transition::Enter(a)]);
//! assert_eq!(active.update(Some(b)), vec![Transition::Leave(a), Transition::Enter(b)]);
//! assert!(active.update(Some(b)).is_empty());
//! ```

use stratum_surface::LayerId;

/// Which layer, if any, currently owns the pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveLayer {
    current: Option<LayerId>,
}

/// An active-layer transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The pointer left the layer.
    Leave(LayerId),
    /// The pointer entered the layer.
    Enter(LayerId),
}

impl ActiveLayer {
    /// No active layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active layer.
    pub fn current(&self) -> Option<LayerId> {
        self.current
    }

    /// Switch to `next`, returning the leave (old layer) then enter (new
    /// layer) transitions. Empty when nothing changed.
    pub fn update(&mut self, next: Option<LayerId>) -> Vec<Transition> {
        if self.current == next {
            return Vec::new();
        }
        let out = self
            .current
            .map(Transition::Leave)
            .into_iter()
            .chain(next.map(Transition::Enter))
            .collect();
        self.current = next;
        out
    }

    /// Drop the active layer, returning its leave transition.
    pub fn clear(&mut self) -> Vec<Transition> {
        self.update(None)
    }

    /// Forget `id` without a transition if it is the active layer.
    pub fn forget(&mut self, id: LayerId) -> bool {
        if self.current == Some(id) {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> LayerId {
        LayerId::new(raw).unwrap()
    }

    #[test]
    fn enter_from_nothing() {
        let mut a = ActiveLayer::new();
        assert_eq!(a.update(Some(id(4))), vec![Transition::Enter(id(4))]);
        assert_eq!(a.current(), Some(id(4)));
    }

    #[test]
    fn leave_to_nothing() {
        let mut a = ActiveLayer::new();
        a.update(Some(id(4)));
        assert_eq!(a.update(None), vec![Transition::Leave(id(4))]);
        assert!(a.clear().is_empty());
    }

    #[test]
    fn forget_is_silent() {
        let mut a = ActiveLayer::new();
        a.update(Some(id(2)));
        assert!(!a.forget(id(3)));
        assert!(a.forget(id(2)));
        assert_eq!(a.current(), None);
        assert_eq!(a.update(Some(id(2))), vec![Transition::Enter(id(2))]);
    }
}
