// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback errors.

use crate::element::ElementId;
use ordoplay_anim_events::EventError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Event misuse or a failing handler
    #[error(transparent)]
    Event(#[from] EventError),

    /// Scene index outside the scene list
    #[error("scene index {index} is out of range ({count} scenes)")]
    SceneIndex {
        /// Requested index
        index: usize,
        /// Number of scenes
        count: usize,
    },

    /// No element with this ID in the animation
    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    /// Background fill that cannot be turned into a brush
    #[error("invalid brush '{0}'")]
    InvalidBrush(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
