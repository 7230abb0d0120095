// SPDX-License-Identifier: MIT OR Apache-2.0
//! The headless player.
//!
//! This module handles:
//! - Attaching an animation and loading its remote resources
//! - Playing, pausing and stopping
//! - The per-frame loop: resources, input, tick, render, end of playback
//! - Detaching and disposing

use crate::bridge::InputBridge;
use crate::error::Result;
use crate::resources::ResourceCache;
use crate::surface::TraceSurface;
use ordoplay_anim::{Animation, Font, FontDetector, FontSheet, HostId, HostInfo};
use ordoplay_anim_events::{EventHandlers, EventId, Evented};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, error, info, trace, warn};

/// Player state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Nothing attached
    #[default]
    Idle,
    /// Waiting for remote resources
    Loading,
    /// Clock running
    Playing,
    /// Clock paused
    Paused,
    /// Loaded, at the start, not playing
    Stopped,
    /// Reached the end
    Ended,
}

impl PlayState {
    /// Is the clock running
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayState::Playing)
    }

    /// Status string for logs
    pub fn status_text(&self) -> &'static str {
        match self {
            PlayState::Idle => "Idle",
            PlayState::Loading => "Loading",
            PlayState::Playing => "Playing",
            PlayState::Paused => "Paused",
            PlayState::Stopped => "Stopped",
            PlayState::Ended => "Ended",
        }
    }
}

/// Payload of player events
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// State after the change
    State(PlayState),
    /// Host the animation was detached from
    Detached(HostId),
    /// Reported error
    Error(String),
}

/// Detects self-hosted fonts on the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFontDetector;

impl FontDetector for LocalFontDetector {
    fn detect(&self, font: &Font) -> bool {
        font.url
            .as_deref()
            .map(|url| url.strip_prefix("file://").unwrap_or(url))
            .is_some_and(|path| Path::new(path).is_file())
    }
}

/// Hosts one animation at a time
pub struct Player {
    /// Host identity given to the animation
    pub info: HostInfo,
    /// Current state
    pub state: PlayState,
    animation: Option<Animation>,
    cache: ResourceCache,
    detector: Rc<dyn FontDetector>,
    fonts: Option<FontSheet>,
    surface: TraceSurface,
    bridge: InputBridge,
    autoplay: bool,
    /// Frames run since load
    pub frame_count: u64,
    /// Playing time since load, in seconds
    pub elapsed_time: f64,
    handlers: EventHandlers<PlayerEvent>,
}

impl Player {
    /// Create a player
    pub fn new(name: impl Into<String>, detector: Rc<dyn FontDetector>) -> Self {
        let mut player = Self {
            info: HostInfo::new(name),
            state: PlayState::Idle,
            animation: None,
            cache: ResourceCache::new(),
            detector,
            fonts: None,
            surface: TraceSurface::default(),
            bridge: InputBridge::default(),
            autoplay: true,
            frame_count: 0,
            elapsed_time: 0.0,
            handlers: EventHandlers::new().with_default(EventId::Error, |event: &PlayerEvent| {
                if let PlayerEvent::Error(message) = event {
                    error!("{message}");
                }
                Ok(())
            }),
        };
        player.init_handlers();
        player
    }

    /// Attached animation
    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    /// Font stylesheet of the attached animation
    #[allow(dead_code)]
    pub fn fonts(&self) -> Option<&FontSheet> {
        self.fonts.as_ref()
    }

    /// Resource cache
    #[allow(dead_code)]
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Drawing surface
    pub fn surface(&self) -> &TraceSurface {
        &self.surface
    }

    /// Attach an animation, replacing the current one, and start loading its
    /// resources
    pub fn load(&mut self, mut animation: Animation, bridge: InputBridge, autoplay: bool) -> Result<()> {
        if self.animation.is_some() {
            self.detach()?;
        }

        animation.played_in(&self.info)?;
        animation.subscribe_events();
        let sheet =
            animation.load_remote_resources(self.info.id, self.detector.clone(), &mut self.cache);
        if let Some(link) = &sheet.link {
            debug!("Font stylesheet: {link}");
        }

        info!("Loading {animation} in '{}'", self.info.name);
        self.animation = Some(animation);
        self.fonts = Some(sheet);
        self.bridge = bridge;
        self.autoplay = autoplay;
        self.frame_count = 0;
        self.elapsed_time = 0.0;
        self.state = PlayState::Loading;
        Ok(())
    }

    /// Start or resume playback
    /// Returns true if the state changed
    pub fn play(&mut self) -> Result<bool> {
        let Some(animation) = self.animation.as_mut() else {
            return Ok(false);
        };
        match self.state {
            PlayState::Stopped | PlayState::Ended => {
                animation.jump_to_start();
                animation.resume();
                info!("Started playback");
            }
            PlayState::Paused => {
                animation.resume();
                info!("Resumed playback");
            }
            PlayState::Idle | PlayState::Loading | PlayState::Playing => return Ok(false),
        }
        self.set_state(PlayState::Playing, EventId::Play)?;
        Ok(true)
    }

    /// Pause playback
    #[allow(dead_code)]
    pub fn pause(&mut self) -> Result<bool> {
        if self.state != PlayState::Playing {
            return Ok(false);
        }
        if let Some(animation) = self.animation.as_mut() {
            animation.pause();
        }
        info!("Paused playback");
        self.set_state(PlayState::Paused, EventId::Pause)?;
        Ok(true)
    }

    /// Stop playback and rewind
    #[allow(dead_code)]
    pub fn stop(&mut self) -> Result<bool> {
        if !matches!(
            self.state,
            PlayState::Playing | PlayState::Paused | PlayState::Ended
        ) {
            return Ok(false);
        }
        if let Some(animation) = self.animation.as_mut() {
            animation.jump_to_start();
            animation.pause();
        }
        self.bridge.rewind();
        info!("Stopped playback");
        self.set_state(PlayState::Stopped, EventId::Stop)?;
        Ok(true)
    }

    /// Advance one frame while paused
    #[allow(dead_code)]
    pub fn step_frame(&mut self, dt: f64) -> Result<bool> {
        if self.state != PlayState::Paused {
            return Ok(false);
        }
        let Some(animation) = self.animation.as_mut() else {
            return Ok(false);
        };
        animation.resume();
        animation.tick(dt * animation.speed())?;
        animation.pause();
        animation.render(&mut self.surface)?;
        self.frame_count += 1;
        self.elapsed_time += dt;
        Ok(true)
    }

    /// Detach the animation and dispose it.
    ///
    /// The player is back to idle even when a detach handler fails; the
    /// failure is returned afterwards.
    pub fn detach(&mut self) -> Result<Option<Animation>> {
        let Some(mut animation) = self.animation.take() else {
            return Ok(None);
        };
        let id = self.info.id;
        animation.unsubscribe_events();
        let disposed = animation.dispose(Some(id));
        self.cache.release(id);
        self.fonts = None;
        self.state = PlayState::Idle;
        info!("Detached {animation} from '{}'", self.info.name);
        let fired = self.fire(EventId::PlayerDetach, &PlayerEvent::Detached(id));
        disposed?;
        fired?;
        Ok(Some(animation))
    }

    /// Report an error without failing
    pub fn report_error(&mut self, message: &str) {
        if let Err(e) = self.fire(EventId::Error, &PlayerEvent::Error(message.to_string())) {
            warn!("Error handler failed: {e}");
        }
    }

    /// Run one frame
    pub fn frame(&mut self, dt: f64) -> Result<()> {
        if self.animation.is_none() {
            return Ok(());
        }
        self.frame_count += 1;

        if self.state == PlayState::Loading {
            let pending = self.cache.pump(dt * 1000.0);
            if pending > 0 || !self.cache.is_settled() {
                trace!("{pending} resources pending");
                return Ok(());
            }
            for (url, reason) in self.cache.failures() {
                warn!("Playing without {url}: {reason}");
            }
            self.set_state(PlayState::Stopped, EventId::Load)?;
            if self.autoplay {
                self.play()?;
            }
        }

        if let Some(animation) = self.animation.as_mut() {
            self.bridge.deliver(self.frame_count, animation)?;
        }
        self.sync_pause()?;

        if self.state.is_playing() {
            if let Some(animation) = self.animation.as_mut() {
                animation.tick(dt * animation.speed())?;
                animation.invoke_all_laters();
            }
            self.elapsed_time += dt;
            self.sync_pause()?;
        }

        if let Some(animation) = self.animation.as_mut() {
            self.surface.begin_frame();
            animation.render(&mut self.surface)?;
            if !self.surface.is_balanced() {
                warn!("Unbalanced save/restore in frame {}", self.frame_count);
            }
        }

        if self.state == PlayState::Playing {
            self.check_end()?;
        }
        Ok(())
    }

    /// Run frames until playback ends, stalls or hits the frame limit
    /// Returns the number of frames run
    pub fn run(&mut self, dt: f64, max_frames: Option<u64>) -> Result<u64> {
        let start = self.frame_count;
        loop {
            let ran = self.frame_count - start;
            if max_frames.is_some_and(|max| ran >= max) {
                info!("Frame limit reached after {ran} frames");
                break;
            }
            let stalled = match self.state {
                PlayState::Idle | PlayState::Ended | PlayState::Stopped => true,
                PlayState::Paused => self.bridge.remaining() == 0,
                PlayState::Loading | PlayState::Playing => false,
            };
            if stalled {
                debug!("Loop done: {}", self.state.status_text());
                break;
            }
            self.frame(dt)?;
        }
        Ok(self.frame_count - start)
    }

    /// Follow pause and resume requests made from inside the animation
    fn sync_pause(&mut self) -> Result<()> {
        let Some(paused) = self.animation.as_ref().map(Animation::is_paused) else {
            return Ok(());
        };
        match self.state {
            PlayState::Playing if paused => self.set_state(PlayState::Paused, EventId::Pause),
            PlayState::Paused if !paused => self.set_state(PlayState::Playing, EventId::Play),
            _ => Ok(()),
        }
    }

    fn check_end(&mut self) -> Result<()> {
        let Some(animation) = self.animation.as_mut() else {
            return Ok(());
        };
        if !animation.is_finished() {
            return Ok(());
        }
        if animation.repeat {
            debug!("Repeating {animation}");
            animation.jump_to_start();
            self.bridge.rewind();
            return Ok(());
        }
        info!("Playback complete after {} frames", self.frame_count);
        self.set_state(PlayState::Ended, EventId::Complete)
    }

    fn set_state(&mut self, state: PlayState, event: EventId) -> Result<()> {
        self.state = state;
        self.fire(event, &PlayerEvent::State(state))?;
        Ok(())
    }
}

impl Evented for Player {
    type Payload = PlayerEvent;
    const EVENTS: &'static [EventId] = &[
        EventId::Load,
        EventId::Play,
        EventId::Pause,
        EventId::Stop,
        EventId::Complete,
        EventId::PlayerDetach,
        EventId::Error,
    ];

    fn event_handlers(&self) -> &EventHandlers<Self::Payload> {
        &self.handlers
    }

    fn event_handlers_mut(&mut self) -> &mut EventHandlers<Self::Payload> {
        &mut self.handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::InputSpec;
    use ordoplay_anim::{Element, InputEvent, Rect, Scene};
    use std::cell::RefCell;

    struct Never;

    impl FontDetector for Never {
        fn detect(&self, _font: &Font) -> bool {
            false
        }
    }

    fn player() -> Player {
        Player::new("test", Rc::new(Never))
    }

    fn one_second() -> Animation {
        let mut animation = Animation::new();
        animation.replace_scene(0, Scene::new("only", 1.0)).unwrap();
        animation
    }

    fn record(player: &mut Player) -> Rc<RefCell<Vec<EventId>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for &event in Player::EVENTS {
            let log = log.clone();
            player
                .on(event, move |_| {
                    log.borrow_mut().push(event);
                    Ok(())
                })
                .unwrap();
        }
        log
    }

    #[test]
    fn test_play_state() {
        assert_eq!(PlayState::default(), PlayState::Idle);
        assert!(PlayState::Playing.is_playing());
        assert_eq!(PlayState::Paused.status_text(), "Paused");
    }

    #[test]
    fn test_plays_to_the_end() {
        let mut player = player();
        let events = record(&mut player);
        player.load(one_second(), InputBridge::default(), true).unwrap();
        assert_eq!(player.state, PlayState::Loading);
        assert!(player.animation().unwrap().is_attached(player.info.id));

        let frames = player.run(0.25, Some(100)).unwrap();
        assert_eq!(frames, 4);
        assert_eq!(player.state, PlayState::Ended);
        assert_eq!(
            *events.borrow(),
            [EventId::Load, EventId::Play, EventId::Complete]
        );
        assert!(player.surface().is_balanced());
    }

    #[test]
    fn test_repeat_loops_until_frame_limit() {
        let mut player = player();
        let mut animation = one_second();
        animation.repeat = true;
        player.load(animation, InputBridge::default(), true).unwrap();

        assert_eq!(player.run(0.25, Some(10)).unwrap(), 10);
        assert_eq!(player.state, PlayState::Playing);
    }

    #[test]
    fn test_without_autoplay_waits_stopped() {
        let mut player = player();
        player.load(one_second(), InputBridge::default(), false).unwrap();
        player.frame(0.25).unwrap();
        assert_eq!(player.state, PlayState::Stopped);
        assert_eq!(player.animation().unwrap().time(), 0.0);

        assert!(player.play().unwrap());
        player.frame(0.25).unwrap();
        assert_eq!(player.animation().unwrap().time(), 0.25);
    }

    #[test]
    fn test_pause_resume_stop() {
        let mut player = player();
        player.load(one_second(), InputBridge::default(), true).unwrap();
        player.frame(0.25).unwrap();

        assert!(player.pause().unwrap());
        assert!(!player.pause().unwrap());
        player.frame(0.25).unwrap();
        assert_eq!(player.animation().unwrap().time(), 0.25);

        assert!(player.step_frame(0.25).unwrap());
        assert_eq!(player.animation().unwrap().time(), 0.5);
        assert_eq!(player.state, PlayState::Paused);

        assert!(player.play().unwrap());
        player.frame(0.25).unwrap();
        assert_eq!(player.animation().unwrap().time(), 0.75);

        assert!(player.stop().unwrap());
        assert_eq!(player.animation().unwrap().time(), 0.0);
        assert_eq!(player.state, PlayState::Stopped);
    }

    #[test]
    fn test_pause_requested_by_a_handler() {
        let mut button = Element::new("button").with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut animation = one_second();
        let director = animation.director();
        button
            .on(EventId::MouseClick, move |_| {
                director.pause();
                Ok(())
            })
            .unwrap();
        animation.add(button);

        let inputs = vec![InputSpec {
            frame: 2,
            event: "click".to_string(),
            input: InputEvent::Pointer { x: 5.0, y: 5.0 },
        }];
        let mut player = player();
        player.load(animation, InputBridge::new(inputs), true).unwrap();

        assert_eq!(player.run(0.25, Some(10)).unwrap(), 2);
        assert_eq!(player.state, PlayState::Paused);
        assert_eq!(player.animation().unwrap().time(), 0.25);
    }

    #[test]
    fn test_waits_for_fonts_until_timeout() {
        let mut animation = Animation::new();
        animation.add_font(Font {
            face: Some("Missing".to_string()),
            url: Some("/no/such/font.ttf".to_string()),
            ..Font::default()
        });
        let mut player = player();
        player.load(animation, InputBridge::default(), true).unwrap();
        assert!(player.fonts().unwrap().css.contains("Missing"));

        for _ in 0..10 {
            player.frame(1.0).unwrap();
        }
        assert_eq!(player.state, PlayState::Loading);
        player.frame(1.0).unwrap();
        assert_eq!(player.state, PlayState::Playing);
    }

    #[test]
    fn test_detach_disposes() {
        let mut player = player();
        let events = record(&mut player);
        player.load(one_second(), InputBridge::default(), true).unwrap();
        player.frame(0.25).unwrap();

        let animation = player.detach().unwrap().unwrap();
        assert!(!animation.is_attached(player.info.id));
        assert_eq!(player.state, PlayState::Idle);
        assert!(player.cache().is_empty());
        assert_eq!(events.borrow().last(), Some(&EventId::PlayerDetach));
        assert!(player.detach().unwrap().is_none());
    }

    #[test]
    fn test_failing_detach_handler_leaves_player_idle() {
        let mut animation = one_second();
        animation
            .on(EventId::PlayerDetach, |_| Err("busy".into()))
            .unwrap();
        animation.add(Element::new("logo").with_resource("/no/such/logo.png"));
        let mut player = player();
        player.load(animation, InputBridge::default(), true).unwrap();
        player.frame(0.25).unwrap();
        assert!(!player.cache().is_empty());

        assert!(player.detach().is_err());
        assert_eq!(player.state, PlayState::Idle);
        assert!(player.animation().is_none());
        assert!(player.fonts().is_none());
        assert!(player.cache().is_empty());
        assert_eq!(player.run(0.25, Some(10)).unwrap(), 0);
    }

    #[test]
    fn test_report_error_fires_error() {
        let mut player = player();
        let events = record(&mut player);
        player.report_error("bad version");
        assert_eq!(*events.borrow(), [EventId::Error]);
    }

    #[test]
    fn test_local_font_detector() {
        let manifest = Font {
            url: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml").to_string()),
            ..Font::default()
        };
        assert!(LocalFontDetector.detect(&manifest));
        assert!(!LocalFontDetector.detect(&Font::default()));
    }
}
