// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scenes: timed chapters of an animation.

use crate::animation::AnimationId;
use crate::element::{Element, ElementId};
use crate::error::Result;
use crate::input::PointerEvent;
use crate::render::Surface;
use crate::timeline::Timeline;
use indexmap::IndexSet;
use ordoplay_anim_events::{EventHandlers, EventId, Evented};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId(pub Uuid);

impl SceneId {
    /// Create a new random scene ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of scene events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneEvent {
    /// Scene that fired
    pub scene: SceneId,
    /// Local time when it fired
    pub time: f64,
}

/// An ordered, timed tree of elements with its own clock
#[derive(Debug)]
pub struct Scene {
    /// Unique scene ID
    pub id: SceneId,
    /// Name used by selectors
    pub name: String,
    clock: Timeline,
    roots: Vec<Element>,
    /// Animation this scene was added to
    owner: Option<AnimationId>,
    /// Every element currently in the tree
    registry: IndexSet<ElementId>,
    started: bool,
    stopped: bool,
    handlers: EventHandlers<SceneEvent>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        let mut scene = Self {
            id: SceneId::new(),
            name: name.into(),
            clock: Timeline::new(duration),
            roots: Vec::new(),
            owner: None,
            registry: IndexSet::new(),
            started: false,
            stopped: false,
            handlers: EventHandlers::new(),
        };
        scene.init_handlers();
        scene
    }

    /// Length of the scene
    pub fn duration(&self) -> f64 {
        self.clock.duration()
    }

    /// Change the length of the scene
    pub fn set_duration(&mut self, duration: f64) {
        self.clock.set_duration(duration);
    }

    /// Local time
    pub fn time(&self) -> f64 {
        self.clock.position()
    }

    /// Is the local time within `[0, duration]`
    pub fn is_active(&self) -> bool {
        let time = self.time();
        time >= 0.0 && time <= self.duration()
    }

    /// Is the local clock paused
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Animation the scene belongs to
    pub fn owner(&self) -> Option<AnimationId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<AnimationId>) {
        self.owner = owner;
    }

    /// Advance the local clock, firing band events of the scene and its
    /// elements. Nothing happens while paused.
    pub fn tick(&mut self, dt: f64) -> Result<()> {
        if self.clock.is_paused() {
            return Ok(());
        }
        self.clock.tick(dt);
        let time = self.time();

        if !self.started {
            self.started = true;
            self.fire_band(EventId::BandStart)?;
        }
        for root in &mut self.roots {
            root.advance(time)?;
        }
        if !self.stopped && time >= self.duration() {
            self.stopped = true;
            self.fire_band(EventId::BandStop)?;
        }
        Ok(())
    }

    fn fire_band(&mut self, event: EventId) -> Result<()> {
        let payload = SceneEvent {
            scene: self.id,
            time: self.time(),
        };
        self.fire(event, &payload)?;
        Ok(())
    }

    /// Seek the local clock; no events fire
    pub fn jump(&mut self, time: f64) {
        self.clock.jump(time);
        let time = self.time();
        self.started = time > 0.0;
        self.stopped = time >= self.duration();
        for root in &mut self.roots {
            root.seek(time);
        }
    }

    /// Seek to 0 with band events armed again
    pub fn jump_to_start(&mut self) {
        self.clock.jump_to_start();
        self.rearm();
    }

    /// Seek to the duration
    pub fn jump_to_end(&mut self) {
        self.jump(self.duration());
    }

    /// Stop the local clock
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Restart the local clock after a pause
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Back to 0, running, band events armed again
    pub fn reset(&mut self) {
        self.clock.reset();
        self.rearm();
    }

    fn rearm(&mut self) {
        self.started = false;
        self.stopped = false;
        for root in &mut self.roots {
            root.restart();
        }
    }

    /// Add a root element, registering its whole subtree
    pub fn add(&mut self, element: Element) -> ElementId {
        let mut ids = Vec::new();
        element.collect_ids(&mut ids);
        self.registry.extend(ids);
        let id = element.id;
        self.roots.push(element);
        id
    }

    /// Detach an element from anywhere in the tree
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let removed = match self.roots.iter().position(|e| e.id == id) {
            Some(index) => Some(self.roots.remove(index)),
            None => self
                .roots
                .iter_mut()
                .find_map(|root| root.remove_descendant(id)),
        }?;

        let mut ids = Vec::new();
        removed.collect_ids(&mut ids);
        for id in ids {
            self.registry.shift_remove(&id);
        }
        Some(removed)
    }

    /// Forget an element without touching the tree; returns whether it was known
    pub fn unregister(&mut self, id: ElementId) -> bool {
        self.registry.shift_remove(&id)
    }

    /// Is the element part of this scene
    pub fn is_registered(&self, id: ElementId) -> bool {
        self.registry.contains(&id)
    }

    /// Number of registered elements
    pub fn element_count(&self) -> usize {
        self.registry.len()
    }

    /// Does the scene hold no elements
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root elements
    pub fn roots(&self) -> &[Element] {
        &self.roots
    }

    /// Root elements, mutable
    pub fn roots_mut(&mut self) -> &mut [Element] {
        &mut self.roots
    }

    pub(crate) fn take_roots(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.roots)
    }

    /// Find an element by ID
    pub fn find_by_id(&self, id: ElementId) -> Option<&Element> {
        self.roots.iter().find_map(|root| root.find_by_id(id))
    }

    /// Find an element by ID, mutable
    pub fn find_by_id_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.roots.iter_mut().find_map(|root| root.find_by_id_mut(id))
    }

    /// Start of an element in scene time
    pub fn offset_of(&self, id: ElementId) -> Option<f64> {
        self.roots.iter().find_map(|root| root.offset_of(id))
    }

    /// Deliver a pointer event to the hit elements, front to back
    pub fn dispatch_pointer(&mut self, event: &PointerEvent) -> Result<usize> {
        let mut hits = 0;
        for root in self.roots.iter_mut().rev() {
            hits += root.dispatch_pointer(event)?;
        }
        Ok(hits)
    }

    /// Draw the active elements
    pub fn render(&self, surface: &mut dyn Surface) {
        for root in &self.roots {
            root.render(surface);
        }
    }
}

impl Evented for Scene {
    type Payload = SceneEvent;
    const EVENTS: &'static [EventId] = &[EventId::BandStart, EventId::BandStop, EventId::Error];

    fn event_handlers(&self) -> &EventHandlers<SceneEvent> {
        &self.handlers
    }

    fn event_handlers_mut(&mut self) -> &mut EventHandlers<SceneEvent> {
        &mut self.handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_tick_fires_start_then_stop_at_boundary() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new("intro", 2.0);
        for event in [EventId::BandStart, EventId::BandStop] {
            let fired = fired.clone();
            scene
                .on(event, move |e| {
                    fired.borrow_mut().push((event, e.time));
                    Ok(())
                })
                .unwrap();
        }

        scene.tick(1.0).unwrap();
        scene.tick(1.0).unwrap();
        scene.tick(1.0).unwrap();
        assert_eq!(
            *fired.borrow(),
            vec![(EventId::BandStart, 1.0), (EventId::BandStop, 2.0)]
        );
        assert!(!scene.is_active());
    }

    #[test]
    fn test_paused_scene_ignores_ticks() {
        let mut scene = Scene::new("", 5.0);
        scene.pause();
        scene.tick(1.0).unwrap();
        assert_eq!(scene.time(), 0.0);
        scene.resume();
        scene.tick(1.0).unwrap();
        assert_eq!(scene.time(), 1.0);
    }

    #[test]
    fn test_registry_follows_tree() {
        let mut scene = Scene::new("", 5.0);
        let root = Element::new("root").with_child(Element::new("child"));
        let child = root.children()[0].id;
        let root = scene.add(root);
        assert_eq!(scene.element_count(), 2);
        assert!(scene.is_registered(child));

        let removed = scene.remove(root).unwrap();
        assert_eq!(removed.children().len(), 1);
        assert_eq!(scene.element_count(), 0);
        assert!(scene.is_empty());
        assert!(scene.remove(root).is_none());
    }

    #[test]
    fn test_jump_seeks_elements() {
        let mut scene = Scene::new("", 10.0);
        let id = scene.add(Element::new("late").with_band(4.0, Some(2.0)));
        scene.jump(5.0);
        let element = scene.find_by_id(id).unwrap();
        assert!(element.is_active());
        assert_eq!(element.local_time(), 1.0);
        assert_eq!(scene.offset_of(id), Some(4.0));

        scene.jump_to_end();
        assert_eq!(scene.time(), 10.0);
        assert!(scene.is_active());
    }
}
