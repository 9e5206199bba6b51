//! Sanitizing cloner: strips UI chrome and freezes math before rendering.
//!
//! Both passes work on a fresh deep copy and only remove or replace whole
//! subtrees; sibling order is never changed.

use crate::dom::{Element, Node};

/// Attribute marking elements that belong to the message action bar.
const HIDE_FROM_ACTIONS_ATTR: &str = "hide-from-message-actions";
/// Class of table footers holding export/copy controls.
const TABLE_FOOTER_CLASS: &str = "table-footer";
const MATH_BLOCK_CLASS: &str = "math-block";
const MATH_INLINE_CLASS: &str = "math-inline";
/// Attribute carrying the TeX source of a rendered formula.
const MATH_SOURCE_ATTR: &str = "data-math";
const TEX_ENCODING: &str = "application/x-tex";

/// Produce a clone of `node` ready for Markdown rendering.
///
/// Message action elements are removed, then every `math-block` and
/// `math-inline` element with recoverable TeX is replaced by a raw element
/// rendering as `$$\n<tex>\n$$` or `$<tex>$`.
pub fn sanitize(node: &Node) -> Node {
    let mut clone = strip_actions(node);
    if let Node::Element(root) = &mut clone {
        replace_math(root, MATH_BLOCK_CLASS, |tex| format!("$$\n{tex}\n$$"));
        replace_math(root, MATH_INLINE_CLASS, |tex| format!("${tex}$"));
    }
    clone
}

/// Clone `node` without its message action elements.
///
/// A removed element takes its whole subtree with it. The root itself is
/// never removed, even if it is an action element.
pub fn strip_actions(node: &Node) -> Node {
    match node {
        Node::Element(el) if !is_message_action(el) => Node::Element(strip_children(el)),
        _ => node.clone(),
    }
}

fn strip_children(el: &Element) -> Element {
    let mut clone = Element::new(el.tag());
    for (name, value) in el.attrs() {
        clone.set_attr(name, value);
    }
    clone.with_children(el.children().iter().filter_map(|child| match child {
        Node::Text(_) => Some(child.clone()),
        Node::Element(child) if is_message_action(child) => None,
        Node::Element(child) => Some(Node::Element(strip_children(child))),
    }))
}

/// Buttons, anything flagged as hidden from message actions, and table footers.
pub fn is_message_action(el: &Element) -> bool {
    el.tag() == "button" || el.has_attr(HIDE_FROM_ACTIONS_ATTR) || el.has_class(TABLE_FOOTER_CLASS)
}

/// Replace every descendant carrying `class` whose TeX can be recovered.
///
/// Replaced subtrees are not searched further; elements without TeX are left
/// untouched and searched as usual.
fn replace_math(el: &mut Element, class: &str, wrap: fn(&str) -> String) {
    for child in el.children_mut().iter_mut() {
        let Node::Element(child_el) = child else {
            continue;
        };
        if child_el.has_class(class)
            && let Some(tex) = extract_tex(child_el)
        {
            *child = Node::Element(Element::raw(&wrap(&tex)));
            continue;
        }
        replace_math(child_el, class, wrap);
    }
}

/// TeX source of a math element: the `data-math` attribute, else the trimmed
/// text of a nested `annotation[encoding="application/x-tex"]`.
///
/// Returns `None` when neither yields any text.
pub fn extract_tex(el: &Element) -> Option<String> {
    if let Some(direct) = el.attr(MATH_SOURCE_ATTR).filter(|tex| !tex.is_empty()) {
        return Some(direct.to_string());
    }
    let annotation = el.find_descendant(&|e: &Element| {
        e.tag() == "annotation" && e.attr("encoding") == Some(TEX_ENCODING)
    })?;
    let tex = annotation.text_content().trim().to_string();
    (!tex.is_empty()).then_some(tex)
}
