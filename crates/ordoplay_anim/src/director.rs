// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback requests issued from inside event handlers.
//!
//! Handlers run while the animation is mid-tick, so they cannot borrow it.
//! Instead they capture a [`Director`] and queue [`Cue`]s; the animation
//! applies queued cues in order right after each scene sub-tick. Cues are
//! applied one after another, so the last scene change wins.

use crate::scene::SceneId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A queued playback request
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Make the scene at this index current
    SetScene(usize),
    /// Restart a scene by identity and make it current
    GoToScene(SceneId),
    /// Seek to a global time
    Jump(f64),
    /// Seek to the element or scene matched by a selector
    JumpTo(String),
    /// Seek to the very beginning
    JumpToStart,
    /// Pause playback
    Pause,
    /// Resume playback
    Resume,
}

/// Cloneable handle to an animation's cue queue
#[derive(Debug, Clone, Default)]
pub struct Director {
    cues: Rc<RefCell<VecDeque<Cue>>>,
}

impl Director {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cue
    pub fn cue(&self, cue: Cue) {
        self.cues.borrow_mut().push_back(cue);
    }

    /// Queue [`Cue::SetScene`]
    pub fn set_scene(&self, index: usize) {
        self.cue(Cue::SetScene(index));
    }

    /// Queue [`Cue::GoToScene`]
    pub fn go_to_scene(&self, scene: SceneId) {
        self.cue(Cue::GoToScene(scene));
    }

    /// Queue [`Cue::Jump`]
    pub fn jump(&self, time: f64) {
        self.cue(Cue::Jump(time));
    }

    /// Queue [`Cue::JumpTo`]
    pub fn jump_to(&self, selector: impl Into<String>) {
        self.cue(Cue::JumpTo(selector.into()));
    }

    /// Queue [`Cue::JumpToStart`]
    pub fn jump_to_start(&self) {
        self.cue(Cue::JumpToStart);
    }

    /// Queue [`Cue::Pause`]
    pub fn pause(&self) {
        self.cue(Cue::Pause);
    }

    /// Queue [`Cue::Resume`]
    pub fn resume(&self) {
        self.cue(Cue::Resume);
    }

    /// Number of cues waiting
    pub fn pending(&self) -> usize {
        self.cues.borrow().len()
    }

    pub(crate) fn next(&self) -> Option<Cue> {
        self.cues.borrow_mut().pop_front()
    }
}
