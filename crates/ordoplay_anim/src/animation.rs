// SPDX-License-Identifier: MIT OR Apache-2.0
//! The playback orchestrator.
//!
//! An [`Animation`] owns an ordered list of scenes, a cursor on the current
//! one and a global [`Timeline`]. Hosts call [`Animation::tick`] once per
//! frame and [`Animation::render`] right after.
//!
//! ## Scene transitions
//!
//! When a tick would carry the current scene to or past its end, the scene is
//! first ticked exactly to its boundary. Band handlers fired during that
//! sub-tick may queue scene changes through a [`Director`]; queued cues are
//! applied right after the sub-tick. If the cursor did not move, playback
//! advances to the next scene, and the rest of the tick is spent there, one
//! boundary after another. The time consumed by one `tick` call adds up to
//! its `dt`, unless the boundaries it reaches stop consuming time.

use crate::director::{Cue, Director};
use crate::element::{Element, ElementId};
use crate::error::{PlaybackError, Result};
use crate::fonts::{self, Font, FontDetector, FontSheet};
use crate::host::{HostId, HostInfo};
use crate::input::{map_dom_event, InputEvent, KeyEvent, PointerEvent};
use crate::render::{Background, Point, Rect, Surface};
use crate::resources::{FileLoader, ResourceLoader, ResourceManager};
use crate::scene::{Scene, SceneId};
use crate::search::{self, Node};
use crate::timeline::{ClockState, Timeline};
use crate::traverse::{self, Flow};
use indexmap::IndexMap;
use ordoplay_anim_events::{EventHandlers, EventId, Evented};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Unique identifier for an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub Uuid);

impl AnimationId {
    /// Create a new random animation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of animation events
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// Keyboard input
    Key(KeyEvent),
    /// A host attached or detached
    Host(HostId),
    /// Error report
    Error(String),
}

/// What [`Animation::jump_to`] should seek to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpTarget<'a> {
    /// Element or scene matched by a selector
    Selector(&'a str),
    /// Start of an element
    Element(ElementId),
    /// Start of a scene
    Scene(SceneId),
}

impl<'a> From<&'a str> for JumpTarget<'a> {
    fn from(selector: &'a str) -> Self {
        JumpTarget::Selector(selector)
    }
}

impl From<ElementId> for JumpTarget<'_> {
    fn from(id: ElementId) -> Self {
        JumpTarget::Element(id)
    }
}

impl From<SceneId> for JumpTarget<'_> {
    fn from(id: SceneId) -> Self {
        JumpTarget::Scene(id)
    }
}

/// Deferred callback run by [`Animation::invoke_all_laters`]
pub type Later = Box<dyn FnMut(&mut Animation)>;

/// A playable animation
pub struct Animation {
    /// Unique animation ID
    pub id: AnimationId,
    /// Optional name
    pub name: Option<String>,
    width: f64,
    height: f64,
    background: Option<Background>,
    zoom: f64,
    /// Scale of the last render pass, zoom included
    factor: f64,
    /// Never empty
    scenes: Vec<Scene>,
    current: usize,
    timeline: Timeline,
    /// Hosts by ID; detached hosts keep an empty slot
    targets: IndexMap<HostId, Option<HostInfo>>,
    /// Restart from the beginning once the end is reached
    pub repeat: bool,
    /// Stop the global clock when the last scene ends
    pub end_on_last_scene: bool,
    fonts: Vec<Font>,
    meta: IndexMap<String, String>,
    laters: Vec<Later>,
    /// Set by [`Animation::clear_all_laters`] while laters run
    laters_cleared: bool,
    director: Director,
    listens_input: bool,
    handlers: EventHandlers<AnimationEvent>,
}

impl Animation {
    /// Duration of the scene every animation starts with
    pub const DEFAULT_DURATION: f64 = 10.0;

    /// Create an animation holding one empty, unnamed scene
    pub fn new() -> Self {
        let id = AnimationId::new();
        let mut scene = Scene::new("", Self::DEFAULT_DURATION);
        scene.set_owner(Some(id));

        let mut animation = Self {
            id,
            name: None,
            width: 0.0,
            height: 0.0,
            background: None,
            zoom: 1.0,
            factor: 1.0,
            scenes: vec![scene],
            current: 0,
            timeline: Timeline::new(Self::DEFAULT_DURATION),
            targets: IndexMap::new(),
            repeat: false,
            end_on_last_scene: true,
            fonts: Vec::new(),
            meta: IndexMap::new(),
            laters: Vec::new(),
            laters_cleared: false,
            director: Director::new(),
            listens_input: false,
            handlers: EventHandlers::new(),
        };
        animation.init_handlers();
        animation
    }

    /// Set the name (builder form)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stage width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Stage height
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Set the stage size
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Set the background fill; it is turned into a brush on first render
    pub fn set_background(&mut self, spec: impl Into<String>) {
        self.background = Some(Background::Spec(spec.into()));
    }

    /// Zoom applied when rendering
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom applied when rendering
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    /// Scale of the last render pass
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Free-form metadata
    pub fn meta(&self) -> &IndexMap<String, String> {
        &self.meta
    }

    /// Free-form metadata, mutable
    pub fn meta_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.meta
    }

    /// Declared fonts
    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    /// Declare a font
    pub fn add_font(&mut self, font: Font) {
        self.fonts.push(font);
    }

    /// Handle for queueing playback changes from event handlers
    pub fn director(&self) -> Director {
        self.director.clone()
    }

    // Scenes

    /// Append a scene and return its ID
    pub fn add_scene(&mut self, mut scene: Scene) -> SceneId {
        scene.set_owner(Some(self.id));
        let id = scene.id;
        self.scenes.push(scene);
        self.sync_duration();
        id
    }

    /// Append a new empty scene
    pub fn add_new_scene(&mut self, name: impl Into<String>, duration: f64) -> SceneId {
        self.add_scene(Scene::new(name, duration))
    }

    /// Swap the scene at `index`, returning the old one.
    ///
    /// Replacing the current scene makes the new one current and running.
    pub fn replace_scene(&mut self, index: usize, mut scene: Scene) -> Result<Scene> {
        self.check_index(index)?;
        scene.set_owner(Some(self.id));
        let mut old = std::mem::replace(&mut self.scenes[index], scene);
        old.set_owner(None);
        if index == self.current {
            self.scenes[index].resume();
        }
        self.sync_duration();
        Ok(old)
    }

    /// Make the scene at `index` current and running
    pub fn set_current_scene(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.select(index);
        Ok(())
    }

    fn select(&mut self, index: usize) {
        self.current = index;
        self.scenes[index].resume();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.scenes.len() {
            return Err(PlaybackError::SceneIndex {
                index,
                count: self.scenes.len(),
            });
        }
        Ok(())
    }

    fn sync_duration(&mut self) {
        let total = self.scenes.iter().map(Scene::duration).sum();
        self.timeline.set_duration(total);
    }

    /// All scenes, in playback order
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Scene at `index`
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Scene at `index`, mutable
    pub fn scene_mut(&mut self, index: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(index)
    }

    /// Number of scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Index of the current scene
    pub fn current_scene_index(&self) -> usize {
        self.current
    }

    /// The current scene
    pub fn current_scene(&self) -> &Scene {
        &self.scenes[self.current]
    }

    /// The current scene, mutable
    pub fn current_scene_mut(&mut self) -> &mut Scene {
        &mut self.scenes[self.current]
    }

    /// Call `f` for every scene in order
    pub fn each_scene(&self, mut f: impl FnMut(&Scene)) {
        for scene in &self.scenes {
            f(scene);
        }
    }

    // Elements

    /// Add a root element to the current scene
    pub fn add(&mut self, element: Element) -> ElementId {
        self.current_scene_mut().add(element)
    }

    /// Detach an element from whichever scene holds it
    pub fn remove(&mut self, id: ElementId) -> Result<Element> {
        self.scenes
            .iter_mut()
            .find_map(|scene| scene.remove(id))
            .ok_or(PlaybackError::UnknownElement(id))
    }

    /// Do all scenes lack elements
    pub fn is_empty(&self) -> bool {
        self.scenes.iter().all(Scene::is_empty)
    }

    /// Root elements of every scene
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.scenes.iter().flat_map(|scene| scene.roots().iter())
    }

    /// First scene or element matching the selector
    pub fn find(&self, selector: &str) -> Option<Node<'_>> {
        search::find_one(selector).over(&self.scenes)
    }

    /// Every scene and element matching the selector
    pub fn find_all(&self, selector: &str) -> Vec<Node<'_>> {
        search::find_all(selector).over(&self.scenes)
    }

    /// Element by ID; `None` when it is not in the animation
    pub fn find_by_id(&self, id: ElementId) -> Option<&Element> {
        self.scenes.iter().find_map(|scene| scene.find_by_id(id))
    }

    /// Element by ID, mutable
    pub fn find_by_id_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.scenes
            .iter_mut()
            .find_map(|scene| scene.find_by_id_mut(id))
    }

    /// Start of an element in global time
    pub fn global_offset_of(&self, id: ElementId) -> Option<f64> {
        let mut base = 0.0;
        for scene in &self.scenes {
            if let Some(offset) = scene.offset_of(id) {
                return Some(base + offset);
            }
            base += scene.duration();
        }
        None
    }

    // Traversal

    /// Visit the root elements of every scene
    pub fn each<'a, R: Flow>(&'a self, mut visit: impl FnMut(&'a Element) -> R) -> bool {
        self.scenes
            .iter()
            .all(|scene| traverse::each(scene.roots(), &mut visit))
    }

    /// Visit the root elements of every scene, last first
    pub fn reverse_each<'a, R: Flow>(&'a self, mut visit: impl FnMut(&'a Element) -> R) -> bool {
        self.scenes
            .iter()
            .rev()
            .all(|scene| traverse::reverse_each(scene.roots(), &mut visit))
    }

    /// Visit every element of every scene in pre-order
    pub fn traverse<'a, R: Flow>(&'a self, mut visit: impl FnMut(&'a Element) -> R) -> bool {
        self.scenes
            .iter()
            .all(|scene| traverse::traverse(scene.roots(), &mut visit))
    }

    /// Visit every element in exactly the reverse of [`Animation::traverse`]
    pub fn reverse_traverse<'a, R: Flow>(
        &'a self,
        mut visit: impl FnMut(&'a Element) -> R,
    ) -> bool {
        self.scenes
            .iter()
            .rev()
            .all(|scene| traverse::reverse_traverse(scene.roots(), &mut visit))
    }

    fn visible_roots(&self) -> &[Element] {
        let scene = self.current_scene();
        if scene.is_active() {
            scene.roots()
        } else {
            &[]
        }
    }

    /// Visit the active root elements of the current scene, when it is active
    pub fn each_visible<'a, R: Flow>(&'a self, mut visit: impl FnMut(&'a Element) -> R) -> bool {
        traverse::each(self.visible_roots(), &mut |element: &'a Element| {
            !element.is_active() || visit(element).proceed()
        })
    }

    /// [`Animation::each_visible`], last first
    pub fn reverse_each_visible<'a, R: Flow>(
        &'a self,
        mut visit: impl FnMut(&'a Element) -> R,
    ) -> bool {
        traverse::reverse_each(self.visible_roots(), &mut |element: &'a Element| {
            !element.is_active() || visit(element).proceed()
        })
    }

    /// Visit the active elements of the current scene, when it is active
    pub fn traverse_visible<'a, R: Flow>(
        &'a self,
        mut visit: impl FnMut(&'a Element) -> R,
    ) -> bool {
        traverse::traverse_visible(self.visible_roots(), &mut visit)
    }

    /// [`Animation::traverse_visible`], in reverse
    pub fn reverse_traverse_visible<'a, R: Flow>(
        &'a self,
        mut visit: impl FnMut(&'a Element) -> R,
    ) -> bool {
        traverse::reverse_traverse_visible(self.visible_roots(), &mut visit)
    }

    // Playback

    /// Global time
    pub fn time(&self) -> f64 {
        self.timeline.position()
    }

    /// Global duration
    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    /// Set the global duration; a lone scene is resized along
    pub fn set_duration(&mut self, duration: f64) {
        if let [scene] = self.scenes.as_mut_slice() {
            scene.set_duration(duration);
        }
        self.timeline.set_duration(duration);
    }

    /// Playback speed hosts should scale time by
    pub fn speed(&self) -> f64 {
        self.timeline.speed()
    }

    /// Set the playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.timeline.set_speed(speed);
    }

    /// The global clock
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Is playback paused
    pub fn is_paused(&self) -> bool {
        self.timeline.is_paused()
    }

    /// Did the global clock reach its terminal state
    pub fn is_ended(&self) -> bool {
        self.timeline.is_ended()
    }

    /// Has playback run to the end, ended or not
    pub fn is_finished(&self) -> bool {
        self.is_ended() || self.time() >= self.duration()
    }

    /// Advance playback by `dt`
    pub fn tick(&mut self, dt: f64) -> Result<()> {
        let mut remaining = dt.max(0.0);
        // A legitimate chain of empty scenes crosses each of them at most once
        let mut idle_passes = 0;
        loop {
            if self.timeline.state() != ClockState::Running {
                return Ok(());
            }
            let scene = self.current_scene();
            if scene.time() + remaining < scene.duration() {
                self.current_scene_mut().tick(remaining)?;
                self.timeline.tick(remaining);
                trace!("Tick {remaining} -> {}", self.time());
                return self.apply_cues();
            }

            let Some(rest) = self.transition(remaining)? else {
                return Ok(());
            };
            if rest < remaining {
                idle_passes = 0;
            } else {
                idle_passes += 1;
                if idle_passes > self.scenes.len() {
                    warn!("Scene boundaries consume no time, dropping {rest} s");
                    return Ok(());
                }
            }
            if rest <= 0.0 {
                return Ok(());
            }
            remaining = rest;
        }
    }

    /// Run the current scene to its boundary and move on.
    ///
    /// Returns the time left to spend on the new current scene, or `None`
    /// when playback stopped at the boundary.
    fn transition(&mut self, dt: f64) -> Result<Option<f64>> {
        let index = self.current;
        let scene = &self.scenes[index];
        let left = (scene.duration() - scene.time()).max(0.0);
        let remainder = dt - left;

        self.scenes[index].tick(left)?;
        self.timeline.tick(left);
        self.apply_cues()?;
        if self.timeline.state() != ClockState::Running {
            return Ok(None);
        }

        if self.current == index {
            let next = index + 1;
            if next < self.scenes.len() {
                self.scenes[next].jump_to_start();
                self.select(next);
                debug!("Scene {index} ended, moving to scene {next}");
            } else if self.end_on_last_scene {
                self.timeline.end_now();
                debug!("Last scene ended at {}", self.time());
                return Ok(None);
            } else {
                // Let the last scene run over
                if remainder > 0.0 {
                    self.scenes[index].tick(remainder)?;
                    self.timeline.tick(remainder);
                    self.apply_cues()?;
                }
                return Ok(None);
            }
        }

        Ok(Some(remainder))
    }

    /// Apply every cue queued through the [`Director`]
    pub fn apply_cues(&mut self) -> Result<()> {
        while let Some(cue) = self.director.next() {
            debug!("Applying cue {cue:?}");
            match cue {
                Cue::SetScene(index) => self.set_current_scene(index)?,
                Cue::GoToScene(id) => self.go_to_scene(id),
                Cue::Jump(time) => self.jump(time),
                Cue::JumpTo(selector) => self.jump_to(selector.as_str()),
                Cue::JumpToStart => self.jump_to_start(),
                Cue::Pause => self.pause(),
                Cue::Resume => self.resume(),
            }
        }
        Ok(())
    }

    /// Pause the global clock and the current scene together
    pub fn pause(&mut self) {
        self.timeline.pause();
        self.current_scene_mut().pause();
    }

    /// Resume the global clock and the current scene together
    pub fn resume(&mut self) {
        self.timeline.resume();
        self.current_scene_mut().resume();
    }

    /// Seek to a global time
    pub fn jump(&mut self, time: f64) {
        self.timeline.jump(time);
        self.go_to_scene_at(self.time());
    }

    /// Make the scene containing global time `time` current, seeked to the
    /// matching local time
    pub fn go_to_scene_at(&mut self, time: f64) {
        let last = self.scenes.len() - 1;
        if time > self.duration() {
            self.select(last);
            self.scenes[last].jump_to_end();
            debug!("Seek past the end, on scene {last}");
            return;
        }

        let mut local = time;
        let mut index = 0;
        while index <= last && local > self.scenes[index].duration() {
            local -= self.scenes[index].duration();
            index += 1;
        }
        if index <= last {
            self.scenes[index].jump(local);
            self.select(index);
        } else {
            self.select(0);
            self.scenes[0].jump(time);
        }
        debug!("Seek to {time}, on scene {} at {local}", self.current);
    }

    /// Restart a scene and make it current; unknown scenes are ignored
    pub fn go_to_scene(&mut self, id: SceneId) {
        if let Some(index) = self.scenes.iter().position(|scene| scene.id == id) {
            self.scenes[index].jump_to_start();
            self.select(index);
        }
    }

    /// Seek to the start of a scene or an element; missing targets are ignored
    pub fn jump_to<'a>(&mut self, target: impl Into<JumpTarget<'a>>) {
        match target.into() {
            JumpTarget::Selector(selector) => {
                let resolved = match self.find(selector) {
                    Some(Node::Scene(scene)) => JumpTarget::Scene(scene.id),
                    Some(Node::Element(element)) => JumpTarget::Element(element.id),
                    None => return,
                };
                self.jump_to(resolved);
            }
            JumpTarget::Scene(id) => self.go_to_scene(id),
            JumpTarget::Element(id) => {
                if let Some(offset) = self.global_offset_of(id) {
                    self.timeline.jump(offset);
                    self.go_to_scene_at(self.time());
                }
            }
        }
    }

    /// Back to global time 0 on the first scene
    pub fn jump_to_start(&mut self) {
        self.timeline.jump_to_start();
        self.select(0);
        self.scenes[0].jump_to_start();
    }

    /// Reset the clocks of the animation and of every scene, back on the
    /// first scene
    pub fn reset(&mut self) {
        self.timeline.reset();
        for scene in &mut self.scenes {
            scene.reset();
        }
        self.current = 0;
    }

    // Hosts

    /// Record that a host displays this animation
    pub fn played_in(&mut self, host: &HostInfo) -> Result<()> {
        let attached = matches!(self.targets.get(&host.id), Some(Some(_)));
        self.targets.insert(host.id, Some(host.clone()));
        if !attached {
            info!("{self} attached to host '{}'", host.name);
            self.fire(EventId::NewPlayer, &AnimationEvent::Host(host.id))?;
        }
        Ok(())
    }

    /// Is the host currently attached
    pub fn is_attached(&self, host: HostId) -> bool {
        matches!(self.targets.get(&host), Some(Some(_)))
    }

    /// Hosts currently attached
    pub fn hosts(&self) -> impl Iterator<Item = &HostInfo> {
        self.targets.values().flatten()
    }

    /// Drop every handler and element; with a host, detach it first.
    ///
    /// A detached host keeps an empty slot until it attaches again. Disposal
    /// always completes; the first failure, detach handlers included, is
    /// returned afterwards.
    pub fn dispose(&mut self, host: Option<HostId>) -> Result<()> {
        let mut outcome = Ok(());
        if let Some(id) = host {
            let previous = self.targets.insert(id, None);
            if matches!(previous, Some(Some(_))) {
                info!("{self} detached from host {id}");
                let fired = self.fire(EventId::PlayerDetach, &AnimationEvent::Host(id));
                keep_first(&mut outcome, fired.map_err(PlaybackError::from));
            }
        }
        let cleared = self.dispose_handlers();
        keep_first(&mut outcome, cleared.map_err(PlaybackError::from));

        for scene in &mut self.scenes {
            keep_first(&mut outcome, scene.dispose_handlers().map_err(PlaybackError::from));
            for root in scene.take_roots() {
                keep_first(&mut outcome, dispose_tree(scene, root));
            }
        }
        self.laters.clear();
        self.laters_cleared = true;
        outcome
    }

    // Input

    /// Start accepting host input
    pub fn subscribe_events(&mut self) {
        self.listens_input = true;
    }

    /// Stop accepting host input
    pub fn unsubscribe_events(&mut self) {
        self.listens_input = false;
    }

    /// Is host input accepted
    pub fn listens_input(&self) -> bool {
        self.listens_input
    }

    /// Route one host input event.
    ///
    /// Pointer events go to the current scene when it is active, keyboard
    /// events are fired on the animation. Returns whether anything was
    /// dispatched.
    pub fn handle_input(&mut self, name: &str, event: &InputEvent) -> Result<bool> {
        if !self.listens_input {
            return Ok(false);
        }
        let Some(kind) = map_dom_event(name) else {
            trace!("Ignoring input '{name}'");
            return Ok(false);
        };

        let handled = match event {
            InputEvent::Pointer { x, y } if kind.is_mouse() => {
                let point = self.adapt(Point::new(*x, *y));
                let scene = &mut self.scenes[self.current];
                if scene.is_active() {
                    scene.dispatch_pointer(&PointerEvent { kind, point })?;
                    true
                } else {
                    false
                }
            }
            InputEvent::Key { key } if kind.is_keyboard() => {
                let payload = AnimationEvent::Key(KeyEvent {
                    kind,
                    key: key.clone(),
                });
                self.fire(kind, &payload)?;
                true
            }
            _ => {
                trace!("Input '{name}' does not carry a matching payload");
                false
            }
        };
        self.apply_cues()?;
        Ok(handled)
    }

    /// Convert a host point to animation space using the last render scale
    pub fn adapt(&self, point: Point) -> Point {
        Point::new(point.x / self.factor, point.y / self.factor)
    }

    // Rendering

    /// Draw the current frame
    pub fn render(&mut self, surface: &mut dyn Surface) -> Result<()> {
        let brush = match &mut self.background {
            Some(background) => Some(background.brush()?),
            None => None,
        };

        surface.save();
        self.factor = surface.pixel_ratio() * self.zoom;
        if self.zoom != 1.0 {
            surface.scale(self.zoom, self.zoom);
        }
        if let Some(brush) = brush {
            surface.fill_rect(&brush, Rect::new(0.0, 0.0, self.width, self.height));
        }
        self.scenes[self.current].render(surface);
        surface.restore();
        Ok(())
    }

    // Laters

    /// Queue a callback for [`Animation::invoke_all_laters`]
    pub fn invoke_later(&mut self, later: impl FnMut(&mut Animation) + 'static) {
        self.laters.push(Box::new(later));
    }

    /// Run every queued callback; the queue is kept.
    ///
    /// A callback that clears the queue stops the run, and only callbacks
    /// queued after the clear survive.
    pub fn invoke_all_laters(&mut self) {
        let mut laters = std::mem::take(&mut self.laters);
        self.laters_cleared = false;
        for later in &mut laters {
            later(self);
            if self.laters_cleared {
                break;
            }
        }
        if self.laters_cleared {
            return;
        }
        laters.append(&mut self.laters);
        self.laters = laters;
    }

    /// Drop every queued callback
    pub fn clear_all_laters(&mut self) {
        self.laters.clear();
        self.laters_cleared = true;
    }

    /// Number of queued callbacks
    pub fn later_count(&self) -> usize {
        self.laters.len()
    }

    // Remote resources

    /// Urls of every remote resource, self-hosted fonts included
    pub fn collect_remote_resources(&self) -> Vec<String> {
        let mut remotes = Vec::new();
        self.traverse(|element| {
            remotes.extend(element.resources().iter().cloned());
        });
        remotes.extend(
            self.fonts
                .iter()
                .filter(|font| font.google_name.is_none())
                .filter_map(|font| font.url.clone()),
        );
        remotes
    }

    /// Start loading every remote resource and font for a host
    pub fn load_remote_resources(
        &self,
        host: HostId,
        detector: Rc<dyn FontDetector>,
        manager: &mut dyn ResourceManager,
    ) -> FontSheet {
        self.traverse(|element| {
            if !element.has_remote_resources() {
                return;
            }
            for url in element.resources() {
                manager.load_or_get(host, url, &|| {
                    Box::new(FileLoader::new(url.clone())) as Box<dyn ResourceLoader>
                });
            }
        });
        fonts::load_fonts(&self.fonts, host, detector, manager)
    }
}

fn dispose_tree(scene: &mut Scene, mut element: Element) -> Result<()> {
    scene.unregister(element.id);
    let children = element.take_children();
    let mut outcome = element.dispose();
    for child in children {
        keep_first(&mut outcome, dispose_tree(scene, child));
    }
    outcome
}

fn keep_first(outcome: &mut Result<()>, result: Result<()>) {
    if outcome.is_ok() {
        *outcome = result;
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => write!(f, "[ Animation '{name}']"),
            _ => write!(f, "[ Animation ]"),
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("scenes", &self.scenes.len())
            .field("current", &self.current)
            .field("timeline", &self.timeline)
            .field("targets", &self.targets)
            .field("laters", &self.laters.len())
            .finish_non_exhaustive()
    }
}

impl Evented for Animation {
    type Payload = AnimationEvent;
    const EVENTS: &'static [EventId] = &[
        EventId::KeyPress,
        EventId::KeyUp,
        EventId::KeyDown,
        EventId::Error,
        EventId::NewPlayer,
        EventId::PlayerDetach,
    ];

    fn event_handlers(&self) -> &EventHandlers<AnimationEvent> {
        &self.handlers
    }

    fn event_handlers_mut(&mut self) -> &mut EventHandlers<AnimationEvent> {
        &mut self.handlers
    }
}
