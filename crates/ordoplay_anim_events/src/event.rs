// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed registry of event identifiers.
//!
//! Every identifier any entity can fire lives in [`EventId`]. Entity types pick
//! their capability set out of this table once, as an associated constant, so
//! the set of events an instance accepts never changes at runtime.

use std::fmt;

/// Identifier of an event known to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventId {
    /// A host started displaying an animation
    NewPlayer,
    /// A host stopped displaying an animation
    PlayerDetach,
    /// Mouse click
    MouseClick,
    /// Mouse double click
    MouseDoubleClick,
    /// Mouse button released
    MouseUp,
    /// Mouse button pressed
    MouseDown,
    /// Mouse moved
    MouseMove,
    /// Key typed
    KeyPress,
    /// Key released
    KeyUp,
    /// Key pressed
    KeyDown,
    /// Error report
    Error,
    /// Playback content finished loading
    Load,
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback stopped
    Stop,
    /// Playback reached the end
    Complete,
    /// A timed band (scene or element) started
    BandStart,
    /// A timed band (scene or element) reached its end
    BandStop,
}

impl EventId {
    /// Every registered identifier, in declaration order
    pub const ALL: &'static [EventId] = &[
        EventId::NewPlayer,
        EventId::PlayerDetach,
        EventId::MouseClick,
        EventId::MouseDoubleClick,
        EventId::MouseUp,
        EventId::MouseDown,
        EventId::MouseMove,
        EventId::KeyPress,
        EventId::KeyUp,
        EventId::KeyDown,
        EventId::Error,
        EventId::Load,
        EventId::Play,
        EventId::Pause,
        EventId::Stop,
        EventId::Complete,
        EventId::BandStart,
        EventId::BandStop,
    ];

    /// Pointer events
    pub const MOUSE: &'static [EventId] = &[
        EventId::MouseClick,
        EventId::MouseDoubleClick,
        EventId::MouseUp,
        EventId::MouseDown,
        EventId::MouseMove,
    ];

    /// Keyboard events
    pub const KEYBOARD: &'static [EventId] =
        &[EventId::KeyPress, EventId::KeyUp, EventId::KeyDown];

    /// Registered name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewPlayer => "new_player",
            Self::PlayerDetach => "player_detach",
            Self::MouseClick => "mclick",
            Self::MouseDoubleClick => "mdclick",
            Self::MouseUp => "mup",
            Self::MouseDown => "mdown",
            Self::MouseMove => "mmove",
            Self::KeyPress => "kpress",
            Self::KeyUp => "kup",
            Self::KeyDown => "kdown",
            Self::Error => "error",
            Self::Load => "load",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Complete => "complete",
            Self::BandStart => "bandstart",
            Self::BandStop => "bandstop",
        }
    }

    /// Look an identifier up by its registered name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }

    /// Is this a pointer event
    pub fn is_mouse(&self) -> bool {
        Self::MOUSE.contains(self)
    }

    /// Is this a keyboard event
    pub fn is_keyboard(&self) -> bool {
        Self::KEYBOARD.contains(self)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_resolvable() {
        for event in EventId::ALL {
            assert_eq!(EventId::from_name(event.name()), Some(*event));
        }
        assert_eq!(EventId::from_name("resize"), None);
    }

    #[test]
    fn test_groups() {
        assert!(EventId::MouseMove.is_mouse());
        assert!(!EventId::MouseMove.is_keyboard());
        assert!(EventId::KeyUp.is_keyboard());
        assert!(!EventId::Error.is_mouse());
    }
}
