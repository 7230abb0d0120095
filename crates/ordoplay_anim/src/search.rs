// SPDX-License-Identifier: MIT OR Apache-2.0
//! Element selectors.
//!
//! A selector is either a plain name, matched depth-first against every scene
//! and element, or an absolute path such as `/intro/logo/:0`. Path segments
//! match a name or, when written `:N`, the N-th child. The first segment
//! addresses scenes.

use crate::element::Element;
use crate::scene::Scene;

/// A search result
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A matching scene
    Scene(&'a Scene),
    /// A matching element
    Element(&'a Element),
}

impl<'a> Node<'a> {
    /// Name of the matched node
    pub fn name(&self) -> &'a str {
        match *self {
            Node::Scene(scene) => &scene.name,
            Node::Element(element) => &element.name,
        }
    }

    fn children(&self) -> &'a [Element] {
        match *self {
            Node::Scene(scene) => scene.roots(),
            Node::Element(element) => element.children(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Name(String),
    Path(Vec<Segment>),
}

impl Selector {
    fn parse(selector: &str) -> Self {
        let Some(path) = selector.strip_prefix('/') else {
            return Selector::Name(selector.to_string());
        };
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':').and_then(|n| n.parse().ok()) {
                Some(index) => Segment::Index(index),
                None => Segment::Name(s.to_string()),
            })
            .collect();
        Selector::Path(segments)
    }

    fn collect<'a>(&self, scenes: &'a [Scene], first_only: bool) -> Vec<Node<'a>> {
        match self {
            Selector::Name(name) => {
                let mut found = Vec::new();
                if name.is_empty() {
                    return found;
                }
                for scene in scenes {
                    if scene.name == *name {
                        found.push(Node::Scene(scene));
                    }
                    if first_only && !found.is_empty() {
                        break;
                    }
                    crate::traverse::traverse(scene.roots(), &mut |element: &'a Element| {
                        if element.name == *name {
                            found.push(Node::Element(element));
                        }
                        !(first_only && !found.is_empty())
                    });
                    if first_only && !found.is_empty() {
                        break;
                    }
                }
                found
            }
            Selector::Path(segments) => {
                let Some((first, rest)) = segments.split_first() else {
                    return Vec::new();
                };
                let mut level: Vec<Node<'a>> = match first {
                    Segment::Index(index) => scenes.get(*index).map(Node::Scene).into_iter().collect(),
                    Segment::Name(name) => scenes
                        .iter()
                        .filter(|s| s.name == *name)
                        .map(Node::Scene)
                        .collect(),
                };
                for segment in rest {
                    level = level
                        .iter()
                        .flat_map(|node| {
                            let children = node.children();
                            let picked: Vec<Node<'a>> = match segment {
                                Segment::Index(index) => {
                                    children.get(*index).map(Node::Element).into_iter().collect()
                                }
                                Segment::Name(name) => children
                                    .iter()
                                    .filter(|e| e.name == *name)
                                    .map(Node::Element)
                                    .collect(),
                            };
                            picked
                        })
                        .collect();
                }
                if first_only {
                    level.truncate(1);
                }
                level
            }
        }
    }
}

/// Lookup of the first match of a selector
#[derive(Debug, Clone)]
pub struct FindOne {
    selector: Selector,
}

impl FindOne {
    /// Run the lookup over a scene list
    pub fn over<'a>(&self, scenes: &'a [Scene]) -> Option<Node<'a>> {
        self.selector.collect(scenes, true).into_iter().next()
    }
}

/// Lookup of every match of a selector
#[derive(Debug, Clone)]
pub struct FindAll {
    selector: Selector,
}

impl FindAll {
    /// Run the lookup over a scene list
    pub fn over<'a>(&self, scenes: &'a [Scene]) -> Vec<Node<'a>> {
        self.selector.collect(scenes, false)
    }
}

/// Prepare a lookup for the first match
pub fn find_one(selector: &str) -> FindOne {
    FindOne {
        selector: Selector::parse(selector),
    }
}

/// Prepare a lookup for every match
pub fn find_all(selector: &str) -> FindAll {
    FindAll {
        selector: Selector::parse(selector),
    }
}
