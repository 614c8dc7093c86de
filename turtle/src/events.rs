// tortuga/turtle/src/events.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pointer and key listener tables.
//!
//! Tables only hand back the callbacks to run. Callers invoke them after
//! releasing whatever lock guards the table, so a callback may freely touch
//! the turtle or screen that owns it.

use crate::vector::Vec2D;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// A pointer callback receiving world coordinates.
pub type PointerCallback = Arc<dyn Fn(f64, f64) + Send + Sync>;

pub type KeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Primary mouse button.
pub const LEFT_BUTTON: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    Click,
    Release,
    Drag,
}

/// What the host reports about a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Up,
    Move,
}

/// Callbacks selected for one pointer event, with the point in world
/// coordinates.
#[must_use]
pub struct Dispatch {
    pub callbacks: Vec<PointerCallback>,
    pub at: Vec2D,
}

impl Dispatch {
    pub fn fire(self) {
        for callback in self.callbacks {
            callback(self.at.x, self.at.y);
        }
    }
}

#[derive(Clone, Default)]
pub struct PointerListeners {
    tables: HashMap<PointerEvent, BTreeMap<u8, Vec<PointerCallback>>>,
    held: HashSet<u8>,
}

impl PointerListeners {
    /// Binds `callback` to `button`.
    ///
    /// `None` drops every listener for `event`. With `add` false the
    /// button's existing listeners are replaced.
    pub fn bind(&mut self, event: PointerEvent, callback: Option<PointerCallback>, button: u8, add: bool) {
        let callback = match callback {
            Some(callback) => callback,
            None => {
                self.tables.remove(&event);
                return;
            }
        };
        let listeners = self.tables.entry(event).or_default().entry(button).or_default();
        if !add {
            listeners.clear();
        }
        listeners.push(callback);
    }

    pub fn count(&self, event: PointerEvent, button: u8) -> usize {
        self.tables
            .get(&event)
            .and_then(|table| table.get(&button))
            .map_or(0, Vec::len)
    }

    fn listeners(&self, event: PointerEvent, button: u8) -> Vec<PointerCallback> {
        self.tables
            .get(&event)
            .and_then(|table| table.get(&button))
            .cloned()
            .unwrap_or_default()
    }

    pub fn press(&mut self, button: u8) -> Vec<PointerCallback> {
        self.held.insert(button);
        self.listeners(PointerEvent::Click, button)
    }

    pub fn release(&mut self, button: u8) -> Vec<PointerCallback> {
        self.held.remove(&button);
        self.listeners(PointerEvent::Release, button)
    }

    pub fn select(&mut self, action: PointerAction, button: u8) -> Vec<PointerCallback> {
        match action {
            PointerAction::Down => self.press(button),
            PointerAction::Up => self.release(button),
            PointerAction::Move => self.moved(button),
        }
    }

    /// Drag listeners fire only while their button is held.
    pub fn moved(&self, button: u8) -> Vec<PointerCallback> {
        if self.held.contains(&button) {
            self.listeners(PointerEvent::Drag, button)
        } else {
            Vec::new()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Press,
    Release,
}

/// Key bindings. A binding without a key name matches every key.
#[derive(Clone, Default)]
pub struct KeyListeners {
    bindings: HashMap<(KeyEvent, Option<String>), KeyCallback>,
}

impl KeyListeners {
    /// Binds or, with `None`, unbinds.
    pub fn bind(&mut self, event: KeyEvent, callback: Option<KeyCallback>, key: Option<&str>) {
        let slot = (event, key.map(str::to_string));
        match callback {
            Some(callback) => {
                self.bindings.insert(slot, callback);
            }
            None => {
                self.bindings.remove(&slot);
            }
        }
    }

    pub fn dispatch(&self, event: KeyEvent, key: &str) -> Vec<KeyCallback> {
        [Some(key.to_string()), None]
            .into_iter()
            .filter_map(|slot| self.bindings.get(&(event, slot)).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, PointerCallback) {
        let hits = Arc::new(AtomicUsize::new(0));
        let clone = hits.clone();
        (hits, Arc::new(move |_, _| {
            clone.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn add_appends_and_replace_resets() {
        let mut listeners = PointerListeners::default();
        let (_, a) = counter();
        let (_, b) = counter();
        listeners.bind(PointerEvent::Click, Some(a.clone()), LEFT_BUTTON, false);
        listeners.bind(PointerEvent::Click, Some(b), LEFT_BUTTON, true);
        listeners.bind(PointerEvent::Click, Some(a.clone()), 3, false);
        assert_eq!(listeners.count(PointerEvent::Click, LEFT_BUTTON), 2);

        listeners.bind(PointerEvent::Click, Some(a), LEFT_BUTTON, false);
        assert_eq!(listeners.count(PointerEvent::Click, LEFT_BUTTON), 1);
        assert_eq!(listeners.count(PointerEvent::Click, 3), 1);

        listeners.bind(PointerEvent::Click, None, LEFT_BUTTON, false);
        assert_eq!(listeners.count(PointerEvent::Click, 3), 0);
    }

    #[test]
    fn drag_requires_a_held_button() {
        let mut listeners = PointerListeners::default();
        let (hits, drag) = counter();
        listeners.bind(PointerEvent::Drag, Some(drag), LEFT_BUTTON, false);

        assert!(listeners.moved(LEFT_BUTTON).is_empty());
        listeners.press(LEFT_BUTTON);
        for callback in listeners.moved(LEFT_BUTTON) {
            callback(1.0, 2.0);
        }
        listeners.release(LEFT_BUTTON);
        assert!(listeners.moved(LEFT_BUTTON).is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wildcard_keys() {
        let mut keys = KeyListeners::default();
        keys.bind(KeyEvent::Press, Some(Arc::new(|| {})), Some("Up"));
        keys.bind(KeyEvent::Press, Some(Arc::new(|| {})), None);
        assert_eq!(keys.dispatch(KeyEvent::Press, "Up").len(), 2);
        assert_eq!(keys.dispatch(KeyEvent::Press, "Down").len(), 1);
        assert!(keys.dispatch(KeyEvent::Release, "Up").is_empty());
        keys.bind(KeyEvent::Press, None, None);
        assert_eq!(keys.dispatch(KeyEvent::Press, "Down").len(), 0);
    }
}
