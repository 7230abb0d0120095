// SPDX-License-Identifier: MIT OR Apache-2.0
//! Monotonic playback clock.
//!
//! One [`Timeline`] tracks the global position of an animation, and every
//! scene owns another one for its local time. Both are plain values: a
//! position, a duration, a speed and an explicit [`ClockState`].

use serde::{Deserialize, Serialize};

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockState {
    /// Advancing on every tick
    #[default]
    Running,
    /// Ticks are ignored until resumed
    Paused,
    /// Forced to the terminal position; ticks are ignored until a seek
    Ended,
}

/// A time position tracker with pause, seek and speed control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    position: f64,
    duration: f64,
    /// Rate at which hosts should scale wall-clock time before ticking
    speed: f64,
    state: ClockState,
}

impl Timeline {
    /// Create a clock at position 0
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: duration.max(0.0),
            speed: 1.0,
            state: ClockState::Running,
        }
    }

    /// Current position
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Total duration
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change the duration; the position is kept as is
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
    }

    /// Playback speed multiplier
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the playback speed multiplier
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    /// Current state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Is the clock paused
    pub fn is_paused(&self) -> bool {
        self.state == ClockState::Paused
    }

    /// Was the clock forced to its end
    pub fn is_ended(&self) -> bool {
        self.state == ClockState::Ended
    }

    /// Advance by `dt` while running
    pub fn tick(&mut self, dt: f64) {
        if self.state == ClockState::Running {
            self.position += dt;
        }
    }

    /// Stop advancing
    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    /// Advance again after a pause
    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
        }
    }

    /// Seek to a position; leaves the ended state
    pub fn jump(&mut self, position: f64) {
        self.position = position.max(0.0);
        if self.state == ClockState::Ended {
            self.state = ClockState::Running;
        }
    }

    /// Seek to 0
    pub fn jump_to_start(&mut self) {
        self.jump(0.0);
    }

    /// Seek to the duration
    pub fn jump_to_end(&mut self) {
        self.jump(self.duration);
    }

    /// Force the terminal state at the end position
    pub fn end_now(&mut self) {
        self.position = self.duration;
        self.state = ClockState::Ended;
    }

    /// Back to position 0, running
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.state = ClockState::Running;
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_respects_pause() {
        let mut clock = Timeline::new(10.0);
        clock.tick(1.5);
        clock.pause();
        clock.tick(3.0);
        assert_eq!(clock.position(), 1.5);
        clock.resume();
        clock.tick(0.5);
        assert_eq!(clock.position(), 2.0);
    }

    #[test]
    fn test_end_now_is_terminal_until_seek() {
        let mut clock = Timeline::new(4.0);
        clock.end_now();
        assert!(clock.is_ended());
        assert_eq!(clock.position(), 4.0);

        clock.tick(1.0);
        assert_eq!(clock.position(), 4.0);
        // Resume is for pauses only
        clock.resume();
        assert!(clock.is_ended());

        clock.jump_to_start();
        assert_eq!(clock.state(), ClockState::Running);
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn test_jump_clamps_negative_positions() {
        let mut clock = Timeline::new(2.0);
        clock.jump(-3.0);
        assert_eq!(clock.position(), 0.0);
        clock.jump_to_end();
        assert_eq!(clock.position(), 2.0);
    }

    #[test]
    fn test_seek_keeps_pause() {
        let mut clock = Timeline::new(2.0);
        clock.pause();
        clock.jump(1.0);
        assert!(clock.is_paused());
    }
}
