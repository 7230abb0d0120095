// SPDX-License-Identifier: MIT OR Apache-2.0
//! Elements, the timed nodes of a scene tree.
//!
//! Every element lives in a band of its parent's time: it becomes active at
//! `band.start` and stays active up to and including `band.start +
//! band.duration`. Children are positioned in their parent's local time.

use crate::error::Result;
use crate::input::PointerEvent;
use crate::render::{Rect, Surface};
use ordoplay_anim_events::{EventHandlers, EventId, Evented};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

impl ElementId {
    /// Create a new random element ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Activity window in parent time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Start, in parent time
    pub start: f64,
    /// Length; `None` stays active forever
    pub duration: Option<f64>,
}

impl Band {
    /// Create a band
    pub fn new(start: f64, duration: Option<f64>) -> Self {
        Self {
            start,
            duration: duration.map(|d| d.max(0.0)),
        }
    }

    /// End in parent time, when bounded
    pub fn end(&self) -> Option<f64> {
        self.duration.map(|d| self.start + d)
    }

    /// Is `time` inside the band (both edges included)
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && self.end().map_or(true, |end| time <= end)
    }
}

impl Default for Band {
    fn default() -> Self {
        Self::new(0.0, None)
    }
}

/// Payload of element events
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    /// The element entered or left its band
    Band {
        /// Element the band belongs to
        element: ElementId,
        /// Local time of the element when it fired
        time: f64,
    },
    /// A pointer event hit the element
    Pointer {
        /// Element that was hit
        element: ElementId,
        /// Adapted pointer event
        event: PointerEvent,
    },
}

/// A node of a scene tree
#[derive(Debug)]
pub struct Element {
    /// Unique element ID
    pub id: ElementId,
    /// Name used by selectors
    pub name: String,
    band: Band,
    bounds: Option<Rect>,
    /// Remote resources (urls) this element needs before playback
    resources: Vec<String>,
    children: Vec<Element>,
    /// Last time seen from the parent
    parent_time: f64,
    entered: bool,
    left: bool,
    disposed: bool,
    handlers: EventHandlers<ElementEvent>,
}

impl Element {
    /// Create an element active from 0 onwards
    pub fn new(name: impl Into<String>) -> Self {
        let mut element = Self {
            id: ElementId::new(),
            name: name.into(),
            band: Band::default(),
            bounds: None,
            resources: Vec::new(),
            children: Vec::new(),
            parent_time: 0.0,
            entered: false,
            left: false,
            disposed: false,
            handlers: EventHandlers::new(),
        };
        element.init_handlers();
        element
    }

    /// Set the band (builder form)
    pub fn with_band(mut self, start: f64, duration: Option<f64>) -> Self {
        self.band = Band::new(start, duration);
        self
    }

    /// Set hit bounds (builder form)
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Declare a remote resource (builder form)
    pub fn with_resource(mut self, url: impl Into<String>) -> Self {
        self.resources.push(url.into());
        self
    }

    /// Append a child (builder form)
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child
    pub fn add_child(&mut self, child: Element) -> ElementId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Detach a descendant anywhere below this element
    pub fn remove_descendant(&mut self, id: ElementId) -> Option<Element> {
        if let Some(index) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(index));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    /// Band in parent time
    pub fn band(&self) -> Band {
        self.band
    }

    /// Hit bounds in animation space
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Declared remote resources
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Does the element need anything fetched
    pub fn has_remote_resources(&self) -> bool {
        !self.resources.is_empty()
    }

    /// Direct children
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Direct children, mutable
    pub fn children_mut(&mut self) -> &mut [Element] {
        &mut self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.children)
    }

    /// Time relative to the band start
    pub fn local_time(&self) -> f64 {
        self.parent_time - self.band.start
    }

    /// Is the element inside its band at the last seen time
    pub fn is_active(&self) -> bool {
        self.band.contains(self.parent_time)
    }

    /// Was [`Element::dispose`] called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Find this element or a descendant by ID
    pub fn find_by_id(&self, id: ElementId) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(id))
    }

    /// Find this element or a descendant by ID, mutable
    pub fn find_by_id_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_id_mut(id))
    }

    /// Start of a descendant in this element's parent time
    pub fn offset_of(&self, id: ElementId) -> Option<f64> {
        if self.id == id {
            return Some(self.band.start);
        }
        self.children
            .iter()
            .find_map(|child| child.offset_of(id))
            .map(|offset| self.band.start + offset)
    }

    /// IDs of the subtree in pre-order
    pub fn collect_ids(&self, out: &mut Vec<ElementId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    /// Move to a new parent time, firing band events on the way.
    ///
    /// A single step that jumps over the whole band fires both events.
    pub fn advance(&mut self, parent_time: f64) -> Result<()> {
        self.parent_time = parent_time;
        if !self.entered && parent_time >= self.band.start {
            self.entered = true;
            self.fire_band(EventId::BandStart)?;
        }
        if self.entered && !self.left && self.band.end().is_some_and(|end| parent_time >= end) {
            self.left = true;
            self.fire_band(EventId::BandStop)?;
        }

        let local = self.local_time();
        for child in &mut self.children {
            child.advance(local)?;
        }
        Ok(())
    }

    /// Move to a parent time without firing anything
    pub fn seek(&mut self, parent_time: f64) {
        self.parent_time = parent_time;
        self.entered = parent_time > self.band.start;
        self.left = self.band.end().is_some_and(|end| parent_time >= end);

        let local = self.local_time();
        for child in &mut self.children {
            child.seek(local);
        }
    }

    /// Back to parent time 0, band events armed again
    pub fn restart(&mut self) {
        self.parent_time = 0.0;
        self.entered = false;
        self.left = false;
        for child in &mut self.children {
            child.restart();
        }
    }

    fn fire_band(&mut self, event: EventId) -> Result<()> {
        let payload = ElementEvent::Band {
            element: self.id,
            time: self.local_time(),
        };
        self.fire(event, &payload)?;
        Ok(())
    }

    /// Deliver a pointer event to every active element of the subtree whose
    /// bounds contain the point, front to back. Returns how many were hit.
    pub fn dispatch_pointer(&mut self, event: &PointerEvent) -> Result<usize> {
        let mut hits = 0;
        for child in self.children.iter_mut().rev() {
            hits += child.dispatch_pointer(event)?;
        }

        let hit = self.is_active() && self.bounds.is_some_and(|b| b.contains(event.point));
        if hit {
            let payload = ElementEvent::Pointer {
                element: self.id,
                event: *event,
            };
            self.fire(event.kind, &payload)?;
            hits += 1;
        }
        Ok(hits)
    }

    /// Draw the subtree; inactive subtrees are skipped
    pub fn render(&self, surface: &mut dyn Surface) {
        if !self.is_active() {
            return;
        }
        surface.draw_element(self, self.local_time());
        for child in &self.children {
            child.render(surface);
        }
    }

    /// Drop handlers and mark the element disposed; children are untouched
    pub fn dispose(&mut self) -> Result<()> {
        self.disposed = true;
        self.dispose_handlers()?;
        Ok(())
    }
}

impl Evented for Element {
    type Payload = ElementEvent;
    const EVENTS: &'static [EventId] = &[
        EventId::BandStart,
        EventId::BandStop,
        EventId::MouseClick,
        EventId::MouseDoubleClick,
        EventId::MouseUp,
        EventId::MouseDown,
        EventId::MouseMove,
        EventId::Error,
    ];

    fn event_handlers(&self) -> &EventHandlers<ElementEvent> {
        &self.handlers
    }

    fn event_handlers_mut(&mut self) -> &mut EventHandlers<ElementEvent> {
        &mut self.handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(element: &mut Element, event: EventId, log: &Rc<RefCell<Vec<String>>>) {
        let log = log.clone();
        let name = element.name.clone();
        element
            .on(event, move |_| {
                log.borrow_mut().push(format!("{name}:{event}"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let band = Band::new(1.0, Some(2.0));
        assert!(!band.contains(0.9));
        assert!(band.contains(1.0));
        assert!(band.contains(3.0));
        assert!(!band.contains(3.1));
        assert!(Band::default().contains(1e9));
    }

    #[test]
    fn test_advance_fires_start_and_stop_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut element = Element::new("dot").with_band(1.0, Some(1.0));
        record(&mut element, EventId::BandStart, &log);
        record(&mut element, EventId::BandStop, &log);

        element.advance(0.5).unwrap();
        assert!(log.borrow().is_empty());
        element.advance(1.0).unwrap();
        element.advance(1.5).unwrap();
        element.advance(2.0).unwrap();
        element.advance(2.5).unwrap();

        let expected = vec![
            format!("dot:{}", EventId::BandStart),
            format!("dot:{}", EventId::BandStop),
        ];
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn test_skipped_band_fires_both() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut element = Element::new("blink").with_band(1.0, Some(0.5));
        record(&mut element, EventId::BandStart, &log);
        record(&mut element, EventId::BandStop, &log);

        element.advance(4.0).unwrap();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_seek_is_silent_and_restart_rearms() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut element = Element::new("a").with_band(0.0, Some(5.0));
        record(&mut element, EventId::BandStart, &log);

        element.seek(2.0);
        element.advance(2.5).unwrap();
        assert!(log.borrow().is_empty());

        element.restart();
        element.advance(0.0).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_children_live_in_parent_local_time() {
        let mut parent = Element::new("parent")
            .with_band(2.0, None)
            .with_child(Element::new("child").with_band(1.0, Some(1.0)));
        let child_id = parent.children()[0].id;

        parent.advance(3.5).unwrap();
        let child = parent.find_by_id(child_id).unwrap();
        assert_eq!(child.local_time(), 0.5);
        assert!(child.is_active());
        assert_eq!(parent.offset_of(child_id), Some(3.0));
    }

    #[test]
    fn test_pointer_hits_front_to_back() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut back = Element::new("back").with_bounds(bounds);
        let mut front = Element::new("front").with_bounds(bounds);
        let mut miss = Element::new("miss").with_bounds(Rect::new(50.0, 50.0, 1.0, 1.0));
        record(&mut back, EventId::MouseClick, &log);
        record(&mut front, EventId::MouseClick, &log);
        record(&mut miss, EventId::MouseClick, &log);
        let mut root = Element::new("root").with_child(back).with_child(front).with_child(miss);

        let event = PointerEvent {
            kind: EventId::MouseClick,
            point: Point::new(5.0, 5.0),
        };
        assert_eq!(root.dispatch_pointer(&event).unwrap(), 2);
        assert_eq!(
            *log.borrow(),
            vec![
                format!("front:{}", EventId::MouseClick),
                format!("back:{}", EventId::MouseClick),
            ]
        );
    }

    #[test]
    fn test_remove_descendant() {
        let mut root = Element::new("root").with_child(
            Element::new("mid").with_child(Element::new("leaf")),
        );
        let leaf = root.children()[0].children()[0].id;
        let removed = root.remove_descendant(leaf).unwrap();
        assert_eq!(removed.name, "leaf");
        assert!(root.find_by_id(leaf).is_none());
        assert!(root.remove_descendant(leaf).is_none());
    }
}
