// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player errors.

use ordoplay_anim::PlaybackError;
use ordoplay_anim_events::EventError;
use thiserror::Error;

/// Errors raised while loading or running an animation
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be parsed or are not supported
    #[error("settings error: {0}")]
    Settings(String),

    /// Player version id that is neither `latest` nor `vX[.Y[.Z]]`
    #[error("invalid player version '{0}'")]
    Version(String),

    /// Playback failed
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Event misuse or a failing handler
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
