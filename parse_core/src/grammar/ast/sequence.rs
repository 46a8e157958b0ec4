//! Ordered node collections
//!
//! A sequence is located by its first and last items. An empty sequence
//! has no items to take a location from, so the caller supplies one: a
//! zero-width location at the place where items would have appeared.

use crate::grammar::ast::nodes::Node;
use crate::utils::Location;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSequence {
    items: Vec<Node>,
    location: Location,
}

impl NodeSequence {
    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Node> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Node> {
        self.items.last()
    }

    pub fn into_items(self) -> Vec<Node> {
        self.items
    }
}

impl<'a> IntoIterator for &'a NodeSequence {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Build a sequence. Non-empty: located at `merge(first, last)`.
/// Empty: located at `empty_location`.
///
/// Items are expected in source order; only the ends are consulted.
pub fn make_sequence(items: Vec<Node>, empty_location: Location) -> NodeSequence {
    let location = match (items.first(), items.last()) {
        (Some(first), Some(last)) => first.location().merge(last.location()),
        _ => empty_location,
    };
    NodeSequence { items, location }
}
