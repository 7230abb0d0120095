// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host input mapping.
//!
//! Hosts forward raw input as `(name, event)` pairs using DOM event names.
//! Only the names below are understood; anything else is ignored.

use crate::render::Point;
use ordoplay_anim_events::EventId;
use serde::{Deserialize, Serialize};

/// Host event names and the events they map to
pub const DOM_EVENT_MAP: &[(&str, EventId)] = &[
    ("click", EventId::MouseClick),
    ("dblclick", EventId::MouseDoubleClick),
    ("mouseup", EventId::MouseUp),
    ("mousedown", EventId::MouseDown),
    ("mousemove", EventId::MouseMove),
    ("keypress", EventId::KeyPress),
    ("keyup", EventId::KeyUp),
    ("keydown", EventId::KeyDown),
];

/// Map a host event name to an event identifier
pub fn map_dom_event(name: &str) -> Option<EventId> {
    DOM_EVENT_MAP
        .iter()
        .find(|(dom, _)| *dom == name)
        .map(|(_, event)| *event)
}

/// Raw input as delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer position in host coordinates
    Pointer {
        /// X coordinate
        x: f64,
        /// Y coordinate
        y: f64,
    },
    /// Keyboard key
    Key {
        /// Key name
        key: String,
    },
}

/// Pointer event in animation coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Which pointer event
    pub kind: EventId,
    /// Adapted position
    pub point: Point,
}

/// Keyboard event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which keyboard event
    pub kind: EventId,
    /// Key name
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_map() {
        assert_eq!(map_dom_event("dblclick"), Some(EventId::MouseDoubleClick));
        assert_eq!(map_dom_event("keydown"), Some(EventId::KeyDown));
        assert_eq!(DOM_EVENT_MAP.len(), 8);
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        assert_eq!(map_dom_event("touchstart"), None);
        assert_eq!(map_dom_event("resize"), None);
        assert_eq!(map_dom_event("Click"), None);
    }
}
