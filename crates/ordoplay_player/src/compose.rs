// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builds an [`Animation`] out of player settings.

use crate::error::{PlayerError, Result};
use crate::settings::{ActionSpec, ElementSpec, PlayerSettings};
use ordoplay_anim::{Animation, Director, Element, ElementId, Node, Scene};
use ordoplay_anim_events::{EventId, Evented, Handler};
use tracing::{debug, warn};

/// Playback change a bound event triggers
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pause playback
    Pause,
    /// Resume playback
    Resume,
    /// Back to the start
    Restart,
    /// Seek to a global time
    Jump(f64),
    /// Seek to a scene or element by selector
    JumpTo(String),
}

impl Action {
    /// Parse `pause`, `resume`, `restart`, `jump:<time>` or `scene:<selector>`
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.trim() {
            "pause" => Some(Action::Pause),
            "resume" => Some(Action::Resume),
            "restart" => Some(Action::Restart),
            other => {
                if let Some(time) = other.strip_prefix("jump:") {
                    return time.trim().parse().ok().map(Action::Jump);
                }
                other
                    .strip_prefix("scene:")
                    .filter(|selector| !selector.is_empty())
                    .map(|selector| Action::JumpTo(selector.to_string()))
            }
        }
    }

    /// Handler queueing this action on a director
    pub fn handler<P: 'static>(&self, director: Director) -> Handler<P> {
        let action = self.clone();
        Box::new(move |_: &P| {
            match &action {
                Action::Pause => director.pause(),
                Action::Resume => director.resume(),
                Action::Restart => director.jump_to_start(),
                Action::Jump(time) => director.jump(*time),
                Action::JumpTo(selector) => director.jump_to(selector.clone()),
            }
            Ok(())
        })
    }
}

/// Build an element and its subtree
pub fn build_element(spec: &ElementSpec) -> Element {
    let mut element = Element::new(&spec.name).with_band(spec.start, spec.duration);
    if let Some(bounds) = spec.bounds {
        element = element.with_bounds(bounds);
    }
    for url in &spec.resources {
        element = element.with_resource(url);
    }
    for child in &spec.children {
        element.add_child(build_element(child));
    }
    element
}

/// Build the animation described by the settings
pub fn build_animation(settings: &PlayerSettings) -> Result<Animation> {
    let mut animation = Animation::new();
    animation.name = settings.name.clone();
    animation.set_size(settings.stage.width, settings.stage.height);
    if let Some(background) = &settings.stage.background {
        animation.set_background(background);
    }
    animation.set_zoom(settings.playback.zoom);
    animation.set_speed(settings.playback.speed);
    animation.repeat = settings.playback.repeat;
    animation.end_on_last_scene = settings.playback.end_on_last_scene;
    for font in &settings.fonts {
        animation.add_font(font.clone());
    }

    for (index, spec) in settings.scenes.iter().enumerate() {
        let mut scene = Scene::new(&spec.name, spec.duration);
        for element in &spec.elements {
            scene.add(build_element(element));
        }
        if index == 0 {
            animation.replace_scene(0, scene)?;
        } else {
            animation.add_scene(scene);
        }
    }

    for action in &settings.actions {
        bind_action(&mut animation, action)?;
    }

    debug!(
        "Built {animation}: {} scenes, {} s",
        animation.scene_count(),
        animation.duration()
    );
    Ok(animation)
}

enum Target {
    Animation,
    Scene(usize),
    Element(ElementId),
}

/// Subscribe the handler of one action binding
pub fn bind_action(animation: &mut Animation, spec: &ActionSpec) -> Result<()> {
    let event = EventId::from_name(&spec.event)
        .ok_or_else(|| PlayerError::Settings(format!("unknown event '{}'", spec.event)))?;
    let action = Action::parse(&spec.action);
    if action.is_none() {
        warn!("Unknown action '{}'", spec.action);
    }
    let director = animation.director();

    let target = match spec.target.as_deref() {
        None => Target::Animation,
        Some(selector) => match animation.find(selector) {
            Some(Node::Scene(scene)) => {
                let id = scene.id;
                let index = animation
                    .scenes()
                    .iter()
                    .position(|s| s.id == id)
                    .unwrap_or_default();
                Target::Scene(index)
            }
            Some(Node::Element(element)) => Target::Element(element.id),
            None => {
                return Err(PlayerError::Settings(format!(
                    "no scene or element matches '{selector}'"
                )))
            }
        },
    };

    match target {
        Target::Animation => {
            animation.on_boxed(event, action.map(|a| a.handler(director)))?;
        }
        Target::Scene(index) => {
            if let Some(scene) = animation.scene_mut(index) {
                scene.on_boxed(event, action.map(|a| a.handler(director)))?;
            }
        }
        Target::Element(id) => {
            if let Some(element) = animation.find_by_id_mut(id) {
                element.on_boxed(event, action.map(|a| a.handler(director)))?;
            }
        }
    }
    Ok(())
}
