//! Plain-text approximations of rendered page text.

use crate::dom::{Element, Node};
use crate::markdown::is_collapsible_space;

/// Elements laid out as blocks: their text starts and ends on its own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "caption",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "pre",
    "section",
    "summary",
    "table",
    "tr",
    "ul",
];

/// Elements never rendered as text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "noscript", "head", "title"];

/// Approximate `innerText` of a detached subtree.
///
/// Whitespace runs collapse to one space and are trimmed around line breaks,
/// block elements sit on their own lines (paragraphs separated by a blank
/// line), `<br>` is a newline, table cells are tab-separated and `<pre>`
/// keeps its text verbatim.
pub fn inner_text(node: &Node) -> String {
    let mut builder = TextBuilder::default();
    builder.node(node, false);
    builder.finish()
}

/// Normalize extracted text: NBSP becomes a space, tab/form-feed/CR runs
/// become one space, 3+ newlines become 2, and the ends are trimmed.
pub fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newlines = 0;
    let mut in_control_run = false;
    for c in text.chars() {
        let c = if c == '\u{a0}' { ' ' } else { c };
        if matches!(c, '\t' | '\u{c}' | '\r') {
            if !in_control_run {
                result.push(' ');
            }
            in_control_run = true;
            newlines = 0;
            continue;
        }
        in_control_run = false;
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        result.push(c);
    }
    result.trim_matches(is_collapsible_space).to_string()
}

#[derive(Default)]
struct TextBuilder {
    out: String,
    /// Line breaks owed before the next text.
    pending_breaks: usize,
}

impl TextBuilder {
    fn finish(mut self) -> String {
        self.trim_trailing_spaces();
        self.out
    }

    fn node(&mut self, node: &Node, in_pre: bool) {
        match node {
            Node::Text(text) if in_pre => self.push_text(text),
            Node::Text(text) => self.push_collapsed(text),
            Node::Element(el) => self.element(el, in_pre),
        }
    }

    fn element(&mut self, el: &Element, in_pre: bool) {
        let tag = el.tag();
        if HIDDEN_ELEMENTS.contains(&tag) {
            return;
        }
        match tag {
            "br" => {
                self.flush_breaks();
                self.trim_trailing_spaces();
                self.out.push('\n');
            }
            "p" => self.block(el, 2, in_pre),
            "pre" => self.block(el, 1, true),
            "td" | "th" => {
                if !self.out.is_empty() && !self.out.ends_with('\n') && self.pending_breaks == 0 {
                    self.out.push('\t');
                }
                self.children(el, in_pre);
            }
            _ if BLOCK_ELEMENTS.contains(&tag) => self.block(el, 1, in_pre),
            _ => self.children(el, in_pre),
        }
    }

    fn block(&mut self, el: &Element, breaks: usize, in_pre: bool) {
        self.request_breaks(breaks);
        self.children(el, in_pre);
        self.request_breaks(breaks);
    }

    fn children(&mut self, el: &Element, in_pre: bool) {
        for child in el.children() {
            self.node(child, in_pre);
        }
    }

    fn request_breaks(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    /// Emit owed line breaks, except at the very start of the text.
    fn flush_breaks(&mut self) {
        if self.pending_breaks > 0 && !self.out.is_empty() {
            self.trim_trailing_spaces();
            let have = self.out.chars().rev().take_while(|&c| c == '\n').count();
            for _ in have..self.pending_breaks {
                self.out.push('\n');
            }
        }
        self.pending_breaks = 0;
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_breaks();
        self.out.push_str(text);
    }

    fn push_collapsed(&mut self, text: &str) {
        let mut collapsed = String::with_capacity(text.len());
        let mut in_space = false;
        for c in text.chars() {
            if is_collapsible_space(c) && c != '\u{a0}' {
                in_space = true;
                continue;
            }
            if in_space {
                collapsed.push(' ');
                in_space = false;
            }
            collapsed.push(c);
        }
        let leading = text.starts_with(|c: char| is_collapsible_space(c) && c != '\u{a0}');
        if collapsed.is_empty() {
            // Whitespace-only text separates inline neighbours on the same line.
            if leading && self.pending_breaks == 0 && self.at_inline_position() {
                self.out.push(' ');
            }
            return;
        }
        self.flush_breaks();
        if leading && self.at_inline_position() {
            self.out.push(' ');
        }
        self.out.push_str(collapsed.trim_start_matches(' '));
        if in_space {
            self.out.push(' ');
        }
    }

    /// Text is being appended mid-line after something that isn't a space.
    fn at_inline_position(&self) -> bool {
        !self.out.is_empty() && !self.out.ends_with([' ', '\n', '\t'])
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches(' ').len();
        self.out.truncate(trimmed);
    }
}
