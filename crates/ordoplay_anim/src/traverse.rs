// SPDX-License-Identifier: MIT OR Apache-2.0
//! Element tree walks.
//!
//! Visitors may return `()` to always continue, or a `bool` where `false`
//! stops the walk. Every walker returns `false` once a visitor stopped it so
//! callers can stop walking sibling trees as well.

use crate::element::Element;

/// Result of a visitor call
pub trait Flow {
    /// Should the walk go on
    fn proceed(self) -> bool;
}

impl Flow for () {
    fn proceed(self) -> bool {
        true
    }
}

impl Flow for bool {
    fn proceed(self) -> bool {
        self
    }
}

/// Visit direct nodes in order
pub fn each<'a, R, F>(nodes: &'a [Element], visit: &mut F) -> bool
where
    R: Flow,
    F: FnMut(&'a Element) -> R,
{
    nodes.iter().all(|node| visit(node).proceed())
}

/// Visit direct nodes in reverse order
pub fn reverse_each<'a, R, F>(nodes: &'a [Element], visit: &mut F) -> bool
where
    R: Flow,
    F: FnMut(&'a Element) -> R,
{
    nodes.iter().rev().all(|node| visit(node).proceed())
}

/// Visit whole subtrees in pre-order
pub fn traverse<'a, R, F>(nodes: &'a [Element], visit: &mut F) -> bool
where
    R: Flow,
    F: FnMut(&'a Element) -> R,
{
    for node in nodes {
        if !visit(node).proceed() || !traverse(node.children(), visit) {
            return false;
        }
    }
    true
}

/// Visit whole subtrees in exactly the reverse of [`traverse`]
pub fn reverse_traverse<'a, R, F>(nodes: &'a [Element], visit: &mut F) -> bool
where
    R: Flow,
    F: FnMut(&'a Element) -> R,
{
    for node in nodes.iter().rev() {
        if !reverse_traverse(node.children(), visit) || !visit(node).proceed() {
            return false;
        }
    }
    true
}

/// Like [`traverse`], but only active nodes are visited; inactive nodes are
/// still descended into
pub fn traverse_visible<'a, R, F>(nodes: &'a [Element], visit: &mut F) -> bool
where
    R: Flow,
    F: FnMut(&'a Element) -> R,
{
    traverse(nodes, &mut |node| !node.is_active() || visit(node).proceed())
}

/// Like [`reverse_traverse`], restricted to active nodes
pub fn reverse_traverse_visible<'a, R, F>(nodes: &'a [Element], visit: &mut F) -> bool
where
    R: Flow,
    F: FnMut(&'a Element) -> R,
{
    reverse_traverse(nodes, &mut |node| !node.is_active() || visit(node).proceed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Vec<Element> {
        vec![
            Element::new("a")
                .with_child(Element::new("a1"))
                .with_child(Element::new("a2")),
            Element::new("b").with_child(Element::new("b1")),
        ]
    }

    #[test]
    fn test_traverse_orders() {
        let nodes = forest();
        let mut forward = Vec::new();
        traverse(&nodes, &mut |e: &Element| forward.push(e.name.clone()));
        assert_eq!(forward, ["a", "a1", "a2", "b", "b1"]);

        let mut backward = Vec::new();
        reverse_traverse(&nodes, &mut |e: &Element| backward.push(e.name.clone()));
        forward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn test_each_stays_on_top_level() {
        let nodes = forest();
        let mut names = Vec::new();
        reverse_each(&nodes, &mut |e: &Element| names.push(e.name.clone()));
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_false_stops_the_walk() {
        let nodes = forest();
        let mut seen = Vec::new();
        let finished = traverse(&nodes, &mut |e: &Element| {
            seen.push(e.name.clone());
            e.name != "a1"
        });
        assert!(!finished);
        assert_eq!(seen, ["a", "a1"]);
    }

    #[test]
    fn test_visible_skips_but_descends() {
        let mut nodes = vec![Element::new("hidden")
            .with_band(5.0, Some(1.0))
            .with_child(Element::new("child").with_band(-10.0, None))];
        for node in &mut nodes {
            node.seek(0.0);
        }
        let mut names = Vec::new();
        traverse_visible(&nodes, &mut |e: &Element| names.push(e.name.clone()));
        assert_eq!(names, ["child"]);
    }
}
