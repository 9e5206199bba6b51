//! Conversation export to Markdown and HTML documents.
//!
//! [`ConversationExporter`] drives an [`Extractor`] over a [`Page`]: it picks
//! the containers named by the [`Scope`], opens collapsed reasoning traces
//! when they are wanted, extracts each [`Turn`], and assembles both document
//! formats.
//!
//! # Example
//!
//! ```
//! use chatmark::export::{ConversationExporter, ExportOptions, MarkdownStyle};
//! use chatmark::extract::StaticPage;
//!
//! let mut page = StaticPage::from_html(r#"
//!     <div class="conversation-container">
//!       <div class="user-query-container"><div class="query-text">Hi</div></div>
//!       <div class="response-content"><div class="markdown"><p>Hello!</p></div></div>
//!     </div>"#);
//!
//! let exporter = ConversationExporter::new()?;
//! let options = ExportOptions::new().markdown_style(MarkdownStyle::Gemini);
//! let doc = exporter.export(&mut page, &options)?;
//!
//! assert_eq!(doc.turns[0].model, "Hello!");
//! assert!(doc.markdown.contains("### Gemini\n\nHello!"));
//! # Ok::<(), chatmark::Error>(())
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::{ExpandPolicy, Extractor, Page, SelectorConfig};

mod html;
mod markdown;

pub use html::{build_html, escape_html};
pub use markdown::build_markdown;

/// Number of characters of the prompt shown in a turn label.
const LABEL_HINT_CHARS: usize = 20;

/// Everything extracted from one conversation turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Visible prompt text.
    pub user: String,
    /// Reasoning trace as Markdown; empty when absent or collapsed.
    pub thoughts: String,
    pub thoughts_html: String,
    /// Answer as Markdown (or plain text from the fallback container).
    pub model: String,
    pub model_html: String,
}

/// Which turns to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    /// The last turn on the page.
    Current,
    /// The turn at this zero-based index.
    Select(usize),
}

impl Scope {
    /// Short name used in file names and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Current => "current",
            Scope::Select(_) => "select",
        }
    }
}

/// Heading layout of the Markdown document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownStyle {
    /// `## Turn N-1: User` / `## Turn N-2: Gemini`.
    #[default]
    Legacy,
    /// `## Turn N` with `### User` / `### Gemini` subsections.
    Gemini,
}

/// Section headings for each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub user: String,
    pub thoughts: String,
    pub model: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            user: "User".into(),
            thoughts: "Thought Process".into(),
            model: "Gemini".into(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub scope: Scope,
    pub markdown_style: MarkdownStyle,
    /// Expand and include reasoning traces.
    pub include_thoughts: bool,
    pub labels: Labels,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scope: Scope::All,
            markdown_style: MarkdownStyle::Legacy,
            include_thoughts: true,
            labels: Labels::default(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn markdown_style(mut self, style: MarkdownStyle) -> Self {
        self.markdown_style = style;
        self
    }

    pub fn include_thoughts(mut self, include: bool) -> Self {
        self.include_thoughts = include;
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Markdown,
    Html,
}

impl Format {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Html => "html",
        }
    }
}

/// The extracted turns with both assembled documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub turns: Vec<Turn>,
    pub html: String,
    pub markdown: String,
}

impl ExportDocument {
    /// Assemble both documents from extracted turns.
    pub fn build(turns: Vec<Turn>, options: &ExportOptions) -> Self {
        let markdown = build_markdown(
            &turns,
            options.markdown_style,
            options.include_thoughts,
            &options.labels,
        );
        let html = build_html(&turns, options.include_thoughts, &options.labels);
        Self {
            turns,
            html,
            markdown,
        }
    }

    /// The document in `format`.
    pub fn content(&self, format: Format) -> &str {
        match format {
            Format::Markdown => &self.markdown,
            Format::Html => &self.html,
        }
    }
}

/// One entry of the turn picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub index: usize,
    /// `"{index + 1}. {first 20 characters of the prompt}"`.
    pub label: String,
}

/// Exports conversations from a page.
#[derive(Debug, Clone)]
pub struct ConversationExporter {
    extractor: Extractor,
    expand_policy: ExpandPolicy,
}

impl ConversationExporter {
    /// Create an exporter with the default page selectors.
    pub fn new() -> Result<Self> {
        Self::with_selectors(&SelectorConfig::default())
    }

    /// Create an exporter with custom page selectors.
    pub fn with_selectors(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(config)?,
            expand_policy: ExpandPolicy::default(),
        })
    }

    pub fn with_expand_policy(mut self, policy: ExpandPolicy) -> Self {
        self.expand_policy = policy;
        self
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Extract the turns selected by `options.scope` and assemble the documents.
    ///
    /// With `include_thoughts`, each collapsed reasoning trace is expanded
    /// before extraction and collapsed again afterwards.
    pub fn export<P: Page + ?Sized>(
        &self,
        page: &mut P,
        options: &ExportOptions,
    ) -> Result<ExportDocument> {
        let positions = self
            .extractor
            .pick_conversations(page.dom(), options.scope)?;

        let mut turns = Vec::with_capacity(positions.len());
        for position in positions {
            let expanded = options.include_thoughts
                && self
                    .extractor
                    .ensure_thoughts_expanded(page, position, &self.expand_policy);

            let turn = self
                .extractor
                .conversation_at(page.dom(), position)
                .map(|container| self.extractor.extract_turn(page.dom(), container));

            self.extractor.restore_thoughts(page, position, expanded);
            // A container that vanished while toggling contributes an empty turn.
            turns.push(turn.unwrap_or_default());
        }
        debug!("extracted {} turns", turns.len());

        Ok(ExportDocument::build(turns, options))
    }

    /// Label every turn on the page for a turn picker.
    pub fn list_turns<P: Page + ?Sized>(&self, page: &P) -> Vec<TurnSummary> {
        let dom = page.dom();
        self.extractor
            .conversations(dom)
            .into_iter()
            .enumerate()
            .map(|(index, container)| {
                let user = self.extractor.user_text(dom, container);
                let hint = if user.is_empty() {
                    "(no text)".to_string()
                } else {
                    truncate_utf16(&user, LABEL_HINT_CHARS)
                };
                TurnSummary {
                    index,
                    label: format!("{}. {hint}", index + 1),
                }
            })
            .collect()
    }
}

/// Prefix of `text` holding at most `max` UTF-16 code units, never splitting
/// a character.
fn truncate_utf16(text: &str, max: usize) -> String {
    let mut units = 0;
    text.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= max
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::extract::StaticPage;

    const PAGE: &str = r#"
        <div class="conversation-container">
          <div class="user-query-container"><div class="query-text">What is a tomato, botanically speaking?</div></div>
          <div class="response-content"><div class="markdown"><p>A <b>fruit</b>.</p></div></div>
        </div>
        <div class="conversation-container">
          <div class="response-content"><div class="markdown"><p>Second answer</p></div></div>
        </div>"#;

    #[test]
    fn test_list_turns() {
        let exporter = ConversationExporter::new().unwrap();
        let page = StaticPage::from_html(PAGE);
        assert_eq!(
            exporter.list_turns(&page),
            vec![
                TurnSummary {
                    index: 0,
                    label: "1. What is a tomato, bo".into()
                },
                TurnSummary {
                    index: 1,
                    label: "2. (no text)".into()
                },
            ]
        );
    }

    #[test]
    fn test_export_current_turn() {
        let exporter = ConversationExporter::new().unwrap();
        let mut page = StaticPage::from_html(PAGE);
        let options = ExportOptions::new().scope(Scope::Current);
        let doc = exporter.export(&mut page, &options).unwrap();
        assert_eq!(doc.turns.len(), 1);
        assert_eq!(doc.turns[0].model, "Second answer");
        assert_eq!(doc.turns[0].user, "");
    }

    #[test]
    fn test_export_all_turns() {
        let exporter = ConversationExporter::new().unwrap();
        let mut page = StaticPage::from_html(PAGE);
        let doc = exporter.export(&mut page, &ExportOptions::default()).unwrap();
        assert_eq!(doc.turns.len(), 2);
        assert_eq!(doc.turns[0].model, "A **fruit**.");
        assert_eq!(doc.turns[0].model_html, "<p>A <b>fruit</b>.</p>");
        assert!(doc.markdown.contains("## Turn 2-2: Gemini\n\nSecond answer"));
        assert!(doc.html.contains("<h2>Turn 2</h2>"));
    }

    #[test]
    fn test_export_without_containers_fails() {
        let exporter = ConversationExporter::new().unwrap();
        let mut page = StaticPage::from_html("<p>empty</p>");
        assert!(exporter.export(&mut page, &ExportOptions::default()).is_err());
    }

    #[test]
    fn test_truncate_utf16() {
        assert_eq!(truncate_utf16("short", 20), "short");
        assert_eq!(truncate_utf16("abcdef", 3), "abc");
        assert_eq!(truncate_utf16("a🍅b", 2), "a");
        assert_eq!(truncate_utf16("a🍅b", 3), "a🍅");
    }

    #[test]
    fn test_turn_serializes_camel_case() {
        let turn = Turn {
            model_html: "<p>x</p>".into(),
            ..Turn::default()
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["modelHtml"], "<p>x</p>");
        assert_eq!(json["thoughtsHtml"], "");
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::All.as_str(), "all");
        assert_eq!(Scope::Select(3).as_str(), "select");
        assert_eq!(Format::Html.extension(), "html");
    }
}
