//! Conversion of rendered chat HTML to Markdown.
//!
//! The pipeline is split into pure stages:
//!
//! - [`sanitize`]: clone a page subtree without message action chrome and
//!   with formulas frozen to TeX
//! - [`render`]: structural HTML → Markdown rendering of an owned tree
//! - [`escape`]: string-level escaping and whitespace helpers
//!
//! [`extract_markdown`] chains the first two; [`html_to_markdown`] starts from
//! an HTML string.
//!
//! ## Design Notes
//!
//! - **Text escaping**: only `\`, `` ` ``, `*` and `_` are escaped, and not at
//!   all inside paragraphs and quotes whose source already contains `**`,
//!   `__`, `~~` or a backtick (the model's own Markdown shows through)
//! - **Raw passthrough**: any element carrying `data-md-raw` renders as that
//!   attribute's value, verbatim, in every context
//! - **Bold-only paragraphs** shorter than 200 UTF-16 units become `###`
//!   headings, matching how chat models mark section titles

mod escape;
mod render;
mod sanitize;

pub use escape::{
    collapse_blank_lines, collapse_whitespace, escape_inline_code, escape_markdown,
    escape_table_cell, has_markdown_markers, is_collapsible_space, utf16_len,
};
pub use render::{LineBreak, RenderContext, Renderer, extract_markdown, inline, render};
pub use sanitize::{extract_tex, is_message_action, sanitize, strip_actions};

use crate::dom::{Node, parse_html};

/// Parse an HTML document and render its body to Markdown.
///
/// Message actions and math markup are handled as in [`extract_markdown`].
///
/// # Examples
///
/// ```
/// use chatmark::markdown::html_to_markdown;
///
/// let md = html_to_markdown("<ul><li><b>Label</b> text</li><li>second</li></ul>");
/// assert_eq!(md, "- **Label** text\n- second");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    let dom = parse_html(html);
    Node::from_dom(&dom, dom.body())
        .map(|node| extract_markdown(&node))
        .unwrap_or_default()
}
