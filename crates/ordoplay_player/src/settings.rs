// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player settings.
//!
//! One RON file describes what to play and how:
//! - Playback options (frame rate, speed, zoom, repeat)
//! - Stage size and background
//! - Scenes and their element trees
//! - Fonts
//! - Scripted input and named handler bindings

use crate::error::{PlayerError, Result};
use ordoplay_anim::{Font, InputEvent, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Playback options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Frames per second of the render loop
    pub fps: u32,
    /// Speed multiplier
    pub speed: f64,
    /// Render zoom
    pub zoom: f64,
    /// Start over when the end is reached
    pub repeat: bool,
    /// Stop the clock when the last scene ends
    pub end_on_last_scene: bool,
    /// Stop the loop after this many frames
    pub max_frames: Option<u64>,
    /// Start playing as soon as resources are loaded
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            speed: 1.0,
            zoom: 1.0,
            repeat: false,
            end_on_last_scene: true,
            max_frames: Some(3_000),
            autoplay: true,
        }
    }
}

/// Stage options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    /// Width in animation units
    pub width: f64,
    /// Height in animation units
    pub height: f64,
    /// Background color spec
    pub background: Option<String>,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            background: None,
        }
    }
}

/// An element and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    /// Name used by selectors
    pub name: String,
    /// Band start in parent time
    pub start: f64,
    /// Band length; unbounded when missing
    pub duration: Option<f64>,
    /// Hit bounds
    pub bounds: Option<Rect>,
    /// Remote resources
    pub resources: Vec<String>,
    /// Children
    pub children: Vec<ElementSpec>,
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            start: 0.0,
            duration: None,
            bounds: None,
            resources: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    /// Scene name
    pub name: String,
    /// Scene length
    pub duration: f64,
    /// Root elements
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

/// Input replayed at a given frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Frame to deliver at
    pub frame: u64,
    /// DOM event name (`click`, `keydown`, ...)
    pub event: String,
    /// Event data
    pub input: InputEvent,
}

/// Named handler bound to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Selector of the scene or element; the animation itself when missing
    #[serde(default)]
    pub target: Option<String>,
    /// Registered event name (`bandstop`, `mclick`, ...)
    pub event: String,
    /// Action: `pause`, `resume`, `restart`, `jump:<time>` or `scene:<selector>`
    pub action: String,
}

/// Everything the player needs to run an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Settings format version
    pub version: u32,
    /// Player version id the content was made for
    pub player_version: String,
    /// Animation name
    pub name: Option<String>,
    /// Playback options
    pub playback: PlaybackSettings,
    /// Stage options
    pub stage: StageSettings,
    /// Scenes, in playback order; the default scene is used when empty
    pub scenes: Vec<SceneSpec>,
    /// Fonts
    pub fonts: Vec<Font>,
    /// Scripted input
    pub inputs: Vec<InputSpec>,
    /// Handler bindings
    pub actions: Vec<ActionSpec>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            player_version: "latest".to_string(),
            name: None,
            playback: PlaybackSettings::default(),
            stage: StageSettings::default(),
            scenes: Vec::new(),
            fonts: Vec::new(),
            inputs: Vec::new(),
            actions: Vec::new(),
        }
    }
}

impl PlayerSettings {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let settings: PlayerSettings =
            ron::from_str(content).map_err(|e| PlayerError::Settings(e.to_string()))?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(PlayerError::Settings(format!(
                "Settings version {} is newer than supported version {}",
                settings.version, SETTINGS_FORMAT_VERSION
            )));
        }

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        ron::ser::to_string_pretty(self, config).map_err(|e| PlayerError::Settings(e.to_string()))
    }

    /// Save settings to a file
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Seconds per frame
    pub fn frame_time(&self) -> f64 {
        1.0 / f64::from(self.playback.fps.max(1))
    }
}
