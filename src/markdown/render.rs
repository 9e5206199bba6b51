//! Structural HTML → Markdown rendering.
//!
//! Rendering walks the owned tree in two cooperating modes:
//!
//! - **Block mode** ([`Renderer::block`]) may append whole lines (paragraphs,
//!   headings, lists, tables, quotes, fences) to the line accumulator and
//!   returns whatever inline text it did not consume.
//! - **Inline mode** ([`inline`]) returns a text fragment and never touches
//!   the accumulator, so it is a free function.
//!
//! Both are total: unknown tags fall through to their children, and nothing
//! here can fail.

use crate::dom::{Element, Node};

use super::escape::{
    collapse_blank_lines, collapse_whitespace, escape_inline_code, escape_markdown,
    escape_table_cell, has_markdown_markers, utf16_len,
};
use super::sanitize::sanitize;

/// Bold-only paragraphs shorter than this (in UTF-16 units) become headings.
const BOLD_HEADING_MAX_LEN: usize = 200;

/// Tags that make a blockquote render its children as a nested document.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "ul",
    "ol",
    "pre",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "table",
    "blockquote",
    "hr",
];

/// How `<br>` renders in inline mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineBreak {
    /// A literal `<br>` tag, keeping the fragment on one line.
    #[default]
    Tag,
    /// A newline, for list items and blockquotes that re-prefix each line.
    Newline,
}

/// Per-call rendering flags threaded through the recursion.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    /// Inside a code block: code is emitted literally.
    pub in_pre: bool,
    /// Inside a list item.
    pub in_list: bool,
    /// `<br>` rendering mode.
    pub line_break: LineBreak,
    /// Source text already carries Markdown markers; do not escape it.
    pub allow_markdown: bool,
}

impl RenderContext {
    fn with_allow_markdown(self, allow_markdown: bool) -> Self {
        Self {
            allow_markdown,
            ..self
        }
    }
}

/// Render an owned tree to Markdown.
///
/// The tree is rendered as-is; use [`extract_markdown`] for page content that
/// still carries UI chrome or math markup.
///
/// # Examples
///
/// ```
/// use chatmark::dom::Node;
/// use chatmark::markdown::render;
///
/// let tree = Node::element("div", &[], vec![
///     Node::element("p", &[], vec![
///         Node::text("hello "),
///         Node::element("b", &[], vec![Node::text("world")]),
///     ]),
/// ]);
/// assert_eq!(render(&tree), "hello **world**");
/// ```
pub fn render(node: &Node) -> String {
    let mut renderer = Renderer::default();
    let rest = renderer.block(node, RenderContext::default());
    if !rest.is_empty() {
        renderer.push_line(rest);
    }
    collapse_blank_lines(&renderer.finish()).trim().to_string()
}

/// Sanitize a page subtree and render it to Markdown.
pub fn extract_markdown(node: &Node) -> String {
    render(&sanitize(node))
}

/// Line accumulator for one block-mode walk.
#[derive(Debug, Default)]
pub struct Renderer {
    lines: Vec<String>,
}

impl Renderer {
    /// Join the accumulated lines.
    pub fn finish(self) -> String {
        self.lines.join("\n").trim().to_string()
    }

    /// Append a line; an empty line becomes a (deduplicated) separator.
    fn push_line(&mut self, text: String) {
        if text.is_empty() {
            self.push_blank();
        } else {
            self.lines.push(text);
        }
    }

    /// Append a blank separator unless at the start or after another blank.
    fn push_blank(&mut self) {
        if self.lines.last().is_some_and(|last| !last.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Render a node in block mode, returning any unconsumed inline text.
    pub fn block(&mut self, node: &Node, ctx: RenderContext) -> String {
        let el = match node {
            Node::Text(text) => return render_text(text, ctx),
            Node::Element(el) => el,
        };
        if let Some(raw) = el.raw_override() {
            return raw.to_string();
        }

        match el.tag() {
            "br" => "\n".to_string(),
            "p" => {
                self.paragraph(el, ctx);
                String::new()
            }
            "div" => {
                for child in el.children() {
                    let rendered = self.block(child, ctx);
                    // Inter-element whitespace collapses to spaces; a `br` keeps its newline.
                    if !rendered.chars().all(|c| c == ' ') {
                        self.push_line(rendered);
                    }
                }
                String::new()
            }
            "b" | "strong" => format!("**{}**", self.block_children(el, ctx)),
            "i" | "em" => format!("*{}*", self.block_children(el, ctx)),
            "code" => code_span(el, ctx),
            "pre" => {
                let code = el.text_content();
                self.push_line("```".to_string());
                self.push_line(code.strip_suffix('\n').unwrap_or(&code).to_string());
                self.push_line("```".to_string());
                self.push_blank();
                String::new()
            }
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                let content = self.block_children(el, ctx);
                self.push_line(format!("{} {}", "#".repeat(level), content.trim()));
                self.push_blank();
                String::new()
            }
            tag @ ("ul" | "ol") => {
                let ordered = tag == "ol";
                for (index, item) in el.element_children().filter(|c| c.tag() == "li").enumerate() {
                    self.lines.push(list_item(item, ctx, ordered, index));
                }
                self.push_blank();
                String::new()
            }
            "li" => self.block_children(el, ctx),
            "table" => {
                self.lines.extend(table(el, ctx));
                self.push_blank();
                String::new()
            }
            "blockquote" => {
                self.blockquote(el, ctx);
                String::new()
            }
            "hr" => {
                self.push_line("---".to_string());
                self.push_blank();
                String::new()
            }
            "a" => link(el, self.block_children(el, ctx)),
            "img" => image(el),
            _ => self.block_children(el, ctx),
        }
    }

    fn block_children(&mut self, el: &Element, ctx: RenderContext) -> String {
        el.children()
            .iter()
            .map(|child| self.block(child, ctx))
            .collect()
    }

    /// A paragraph, or a level-3 heading when it holds nothing but a short bold run.
    fn paragraph(&mut self, el: &Element, ctx: RenderContext) {
        let ctx = ctx.with_allow_markdown(has_markdown_markers(&el.text_content()));
        let bold_only = matches!(el.children(), [only] if matches!(only.tag(), Some("b" | "strong")));

        let content = inline_children(el, ctx);
        let content = content.trim();

        if bold_only && !content.is_empty() && utf16_len(content) < BOLD_HEADING_MAX_LEN {
            let heading = content.strip_prefix("**").unwrap_or(content);
            let heading = heading.strip_suffix("**").unwrap_or(heading);
            self.push_line(format!("### {heading}"));
            self.push_blank();
            return;
        }

        self.push_line(content.to_string());
        self.push_blank();
    }

    fn blockquote(&mut self, el: &Element, ctx: RenderContext) {
        let has_block_child = el
            .element_children()
            .any(|child| BLOCK_TAGS.contains(&child.tag()));

        let inner = if has_block_child {
            render_fragment(el.children())
        } else {
            let ctx = RenderContext {
                line_break: LineBreak::Newline,
                ..ctx.with_allow_markdown(has_markdown_markers(&el.text_content()))
            };
            inline_children(el, ctx).trim().to_string()
        };

        if inner.is_empty() {
            return;
        }
        let quoted = inner
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.push_line(quoted);
        self.push_blank();
    }
}

/// Render sibling nodes as an isolated sub-document with fresh context.
fn render_fragment(children: &[Node]) -> String {
    let mut renderer = Renderer::default();
    let wrapper = Node::Element(Element::new("div").with_children(children.iter().cloned()));
    renderer.block(&wrapper, RenderContext::default());
    renderer.finish()
}

/// Render a node in inline mode.
pub fn inline(node: &Node, ctx: RenderContext) -> String {
    let el = match node {
        Node::Text(text) => return render_text(text, ctx),
        Node::Element(el) => el,
    };
    if let Some(raw) = el.raw_override() {
        return raw.to_string();
    }

    match el.tag() {
        "br" => match ctx.line_break {
            LineBreak::Newline => "\n".to_string(),
            LineBreak::Tag => "<br>".to_string(),
        },
        "b" | "strong" => format!("**{}**", inline_children(el, ctx)),
        "i" | "em" => format!("*{}*", inline_children(el, ctx)),
        "code" => code_span(el, ctx),
        "a" => link(el, inline_children(el, ctx)),
        "img" => image(el),
        _ => inline_children(el, ctx),
    }
}

fn inline_children(el: &Element, ctx: RenderContext) -> String {
    el.children().iter().map(|child| inline(child, ctx)).collect()
}

fn render_text(text: &str, ctx: RenderContext) -> String {
    let text = collapse_whitespace(text);
    if ctx.allow_markdown {
        text
    } else {
        escape_markdown(&text)
    }
}

fn code_span(el: &Element, ctx: RenderContext) -> String {
    let code = el.text_content();
    if ctx.in_pre {
        return code;
    }
    format!("`{}`", escape_inline_code(&code))
}

fn link(el: &Element, content: String) -> String {
    let href = el.attr("href").unwrap_or_default();
    let content = content.trim();
    let text = if content.is_empty() { href } else { content };
    if href.is_empty() {
        text.to_string()
    } else {
        format!("[{text}]({href})")
    }
}

fn image(el: &Element) -> String {
    let alt = el.attr("alt").unwrap_or_default();
    match el.attr("src") {
        Some(src) if !src.is_empty() => format!("![{alt}]({src})"),
        _ => String::new(),
    }
}

/// One list item: marker on the first line, continuation lines indented to
/// the marker's width, blank lines dropped.
fn list_item(item: &Element, ctx: RenderContext, ordered: bool, index: usize) -> String {
    let marker = if ordered {
        format!("{}. ", index + 1)
    } else {
        "- ".to_string()
    };
    let ctx = RenderContext {
        in_list: true,
        line_break: LineBreak::Newline,
        ..ctx
    };
    let raw = inline_children(item, ctx);
    let mut lines = raw.trim().split('\n').filter(|line| !line.is_empty());

    let Some(first) = lines.next() else {
        return marker.trim_end().to_string();
    };
    let indent = " ".repeat(marker.len());
    let mut out = format!("{marker}{first}");
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}

/// Table rows as pipe-delimited lines: header, separator, then body rows
/// padded or truncated to the header's width.
fn table(el: &Element, ctx: RenderContext) -> Vec<String> {
    let section = |tag: &str| el.element_children().find(|c| c.tag() == tag);

    let head_rows = section("thead")
        .map(|head| collect_rows(head, ctx))
        .unwrap_or_default();
    let mut body_rows = collect_rows(section("tbody").unwrap_or(el), ctx);

    let header = match head_rows.into_iter().next() {
        Some(header) => Some(header),
        None if !body_rows.is_empty() => Some(body_rows.remove(0)),
        None => None,
    };
    let header = header.unwrap_or_default();
    let column_count = header.len();

    let mut lines = Vec::with_capacity(body_rows.len() + 2);
    if column_count > 0 {
        lines.push(format!("| {} |", header.join(" | ")));
        lines.push(format!("| {} |", vec!["---"; column_count].join(" | ")));
    }
    for mut row in body_rows {
        row.resize(column_count, String::new());
        lines.push(format!("| {} |", row.join(" | ")));
    }
    lines
}

/// Cell text of every `tr` directly under `section`; rows without cells are skipped.
fn collect_rows(section: &Element, ctx: RenderContext) -> Vec<Vec<String>> {
    section
        .element_children()
        .filter(|row| row.tag() == "tr")
        .map(|row| {
            row.element_children()
                .filter(|cell| matches!(cell.tag(), "td" | "th"))
                .map(|cell| escape_table_cell(inline_children(cell, ctx).trim()))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}
