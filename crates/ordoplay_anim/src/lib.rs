// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene playback for OrdoPlay.
//!
//! This crate plays hierarchical, time-based animations:
//! - Scenes with their own clocks, played one after another
//! - Element trees with activity bands and band events
//! - Seeking by time, by scene or by element selector
//! - Host input routing and a drawing contract
//! - Remote resource and font loading
//!
//! ## Architecture
//!
//! Playback is built on:
//! - [`Timeline`] value clocks, one global and one per scene
//! - [`Animation`], which joins them with the scene transition algorithm
//! - The [`ordoplay_anim_events::Evented`] capability for every observable type
//! - A [`Director`] queue for playback changes requested from handlers

pub mod animation;
pub mod director;
pub mod element;
pub mod error;
pub mod fonts;
pub mod host;
pub mod input;
pub mod render;
pub mod resources;
pub mod scene;
pub mod search;
pub mod timeline;
pub mod traverse;

pub use animation::{Animation, AnimationEvent, AnimationId, JumpTarget, Later};
pub use director::{Cue, Director};
pub use element::{Band, Element, ElementEvent, ElementId};
pub use error::{PlaybackError, Result};
pub use fonts::{load_fonts, Font, FontDetector, FontSheet, FontWatch};
pub use host::{HostId, HostInfo};
pub use input::{map_dom_event, InputEvent, KeyEvent, PointerEvent, DOM_EVENT_MAP};
pub use render::{Background, Brush, Point, Rect, Surface};
pub use resources::{FileLoader, LoadState, LoaderFactory, ResourceLoader, ResourceManager};
pub use scene::{Scene, SceneEvent, SceneId};
pub use search::{find_all, find_one, FindAll, FindOne, Node};
pub use timeline::{ClockState, Timeline};
pub use traverse::Flow;
