// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Player - headless scene playback
//!
//! Plays an animation described by a RON settings file:
//! - Scenes with timed element trees
//! - Scene transitions on a global timeline
//! - Scripted pointer and keyboard input
//! - Remote resources and web fonts loaded before playback
//! - Named handler bindings (pause, jump, scene changes)
//!
//! ## Usage
//!
//! `ordoplay_player [settings.ron]`. Without a file the default animation
//! (one empty ten second scene) is played. Set `RUST_LOG` to adjust logging;
//! `trace` shows every draw call.

mod bridge;
mod compose;
mod error;
mod player;
mod resources;
mod settings;
mod surface;
mod version;

use bridge::InputBridge;
use error::Result;
use ordoplay_anim_events::{EventId, Evented};
use player::{LocalFontDetector, Player, PlayerEvent};
use settings::PlayerSettings;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ordoplay_player=debug,ordoplay_anim=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OrdoPlay Player v{}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).map(PathBuf::from);
    if let Err(e) = run(path.as_deref()) {
        tracing::error!("Player failed: {e}");
        std::process::exit(1);
    }
}

fn run(path: Option<&Path>) -> Result<()> {
    let settings = match path {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            PlayerSettings::load(path)?
        }
        None => {
            tracing::info!("No settings file given, playing the default animation");
            PlayerSettings::default()
        }
    };

    let mut player = Player::new("headless", Rc::new(LocalFontDetector));
    player.on(EventId::Complete, |event| {
        if let PlayerEvent::State(state) = event {
            tracing::info!("Playback {}", state.status_text());
        }
        Ok(())
    })?;
    player.on(EventId::PlayerDetach, |event| {
        if let PlayerEvent::Detached(host) = event {
            tracing::debug!("Host {host} released");
        }
        Ok(())
    })?;

    // Content made for an unknown player version is not played
    if let Err(e) = version::check_version(&settings.player_version) {
        player.report_error(&e.to_string());
        return Ok(());
    }

    let animation = compose::build_animation(&settings)?;
    let bridge = InputBridge::new(settings.inputs.clone());
    player.load(animation, bridge, settings.playback.autoplay)?;

    let frames = player.run(settings.frame_time(), settings.playback.max_frames)?;
    if let Some(animation) = player.animation() {
        tracing::info!(
            "Ran {frames} frames ({:.2} s played), {:.2} s of {:.2} s, state {}",
            player.elapsed_time,
            animation.time(),
            animation.duration(),
            player.state.status_text()
        );
        tracing::debug!(
            "Last frame: {} elements, {} fills",
            player.surface().drawn,
            player.surface().fills
        );
    }

    player.detach()?;
    Ok(())
}
