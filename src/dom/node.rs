//! Owned node tree consumed by the Markdown converter.
//!
//! A [`Node`] is a detached deep copy of a page subtree. The sanitizer and
//! renderer only ever see these, so nothing they do can reach back into the
//! page they were cloned from.

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};
use super::query::Query;

/// Attribute carrying literal Markdown that replaces an element's rendering.
pub const RAW_ATTR: &str = "data-md-raw";

/// A text or element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// An element with a lowercase tag, ordered attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element. Tag names are case-insensitive and stored lowercase.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An opaque element whose rendering is exactly `text`.
    ///
    /// The text is stored both as the raw override and as the element's
    /// content, so HTML consumers still see it.
    pub fn raw(text: &str) -> Self {
        Self::new("span")
            .with_attr(RAW_ATTR, text)
            .with_child(Node::text(text))
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any existing value in place.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Direct element children, skipping text.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenation of all descendant text (DOM `textContent`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// The raw override, if present and non-empty.
    pub fn raw_override(&self) -> Option<&str> {
        self.attr(RAW_ATTR).filter(|raw| !raw.is_empty())
    }

    /// First descendant element (pre-order) satisfying `predicate`.
    pub fn find_descendant<F>(&self, predicate: &F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        for child in self.element_children() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(predicate) {
                return Some(found);
            }
        }
        None
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Shorthand for building element trees by hand.
    pub fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Self {
        let el = attrs
            .iter()
            .fold(Element::new(tag), |el, (name, value)| el.with_attr(name, value));
        Node::Element(el.with_children(children))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Tag name for elements, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(Element::tag)
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    /// Deep-copy an arena subtree into an owned tree.
    ///
    /// Comments and doctypes have no owned counterpart and yield `None`.
    pub fn from_dom(dom: &ArenaDom, id: ArenaNodeId) -> Option<Node> {
        clone_subtree(dom, id, None)
    }

    /// Deep-copy an arena subtree, dropping every descendant matching `exclude`.
    ///
    /// The root itself is always kept.
    pub fn from_dom_excluding(dom: &ArenaDom, id: ArenaNodeId, exclude: &Query) -> Option<Node> {
        clone_subtree(dom, id, Some(exclude))
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

fn clone_subtree(dom: &ArenaDom, id: ArenaNodeId, exclude: Option<&Query>) -> Option<Node> {
    let node = dom.get(id)?;
    let mut el = match &node.data {
        ArenaNodeData::Text(text) => return Some(Node::Text(text.clone())),
        ArenaNodeData::Comment(_) | ArenaNodeData::Doctype => return None,
        ArenaNodeData::Document => Element::new("#document"),
        ArenaNodeData::Element { name, attrs, .. } => {
            let mut el = Element::new(name.local.as_ref());
            el.attrs = attrs
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.clone()))
                .collect();
            el
        }
    };

    el.children = dom
        .children(id)
        .filter(|&child| !exclude.is_some_and(|query| query.matches(dom, child)))
        .filter_map(|child| clone_subtree(dom, child, exclude))
        .collect();

    Some(Node::Element(el))
}
