//! Conversation extraction from a chat page.
//!
//! The page is any [`Page`]: a parsed DOM plus the ability to click an element.
//! [`Extractor`] locates conversation turns with the configured selectors and
//! pulls out the user prompt, the model's reasoning trace and the answer, as
//! Markdown/plain text and as HTML.
//!
//! Clicking may rebuild the page, so containers are addressed by their
//! position in document order and re-resolved after every click rather than
//! held as node handles.

use log::debug;

use crate::dom::{ArenaDom, ArenaNodeId, Node, inner_html, parse_html};
use crate::error::{Error, Result};
use crate::export::{Scope, Turn};
use crate::markdown::{extract_markdown, strip_actions};
use crate::util::decode_html;

mod selectors;
mod text;
mod thoughts;

pub use selectors::{CompiledSelectors, SelectorConfig};
pub use text::{clean_text, inner_text};
pub use thoughts::ExpandPolicy;

/// A rendered page the extractor can read and interact with.
pub trait Page {
    /// The page's current document.
    fn dom(&self) -> &ArenaDom;

    /// Click `target`. Returns `false` if the page cannot dispatch clicks.
    ///
    /// After a successful click the document may have been rebuilt, so node
    /// ids obtained before the call must not be reused.
    fn click(&mut self, target: ArenaNodeId) -> bool;
}

/// A page snapshot parsed from saved HTML. It cannot be clicked.
#[derive(Debug, Default)]
pub struct StaticPage {
    dom: ArenaDom,
}

impl StaticPage {
    pub fn new(dom: ArenaDom) -> Self {
        Self { dom }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(parse_html(html))
    }

    /// Parse raw bytes, detecting the encoding from BOM or `<meta charset>`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_html(&decode_html(bytes))
    }
}

impl Page for StaticPage {
    fn dom(&self) -> &ArenaDom {
        &self.dom
    }

    fn click(&mut self, _target: ArenaNodeId) -> bool {
        debug!("static page ignores click");
        false
    }
}

/// Extracts conversation turns from a page using compiled selectors.
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: CompiledSelectors,
}

impl Extractor {
    /// Compile `config` into an extractor.
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            selectors: config.compile()?,
        })
    }

    pub fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }

    /// Every conversation container, in document order.
    pub fn conversations(&self, dom: &ArenaDom) -> Vec<ArenaNodeId> {
        self.selectors.conversation.select_all(dom, dom.document())
    }

    /// The container at `position` in document order.
    pub fn conversation_at(&self, dom: &ArenaDom, position: usize) -> Option<ArenaNodeId> {
        self.conversations(dom).get(position).copied()
    }

    /// Positions of the containers selected by `scope`.
    ///
    /// Fails with [`Error::MissingElement`] when the page has no containers
    /// or the selected index is out of range.
    pub fn pick_conversations(&self, dom: &ArenaDom, scope: Scope) -> Result<Vec<usize>> {
        let count = self.conversations(dom).len();
        let picked: Vec<usize> = match scope {
            Scope::All => (0..count).collect(),
            Scope::Current => count.checked_sub(1).into_iter().collect(),
            Scope::Select(index) if index < count => vec![index],
            Scope::Select(_) => Vec::new(),
        };
        debug!("picked {} of {count} conversation containers ({scope:?})", picked.len());

        if picked.is_empty() {
            return Err(Error::MissingElement(match scope {
                Scope::Select(index) if count > 0 => {
                    format!("conversation turn {index} (page has {count})")
                }
                _ => format!("conversation container `{}`", self.selectors.conversation.source()),
            }));
        }
        Ok(picked)
    }

    /// Extract every field of one turn.
    pub fn extract_turn(&self, dom: &ArenaDom, container: ArenaNodeId) -> Turn {
        Turn {
            user: self.user_text(dom, container),
            thoughts: self.model_thoughts(dom, container),
            thoughts_html: self.thoughts_html(dom, container),
            model: self.model_text(dom, container),
            model_html: self.model_html(dom, container),
        }
    }

    /// Visible text of the user prompt, or empty.
    ///
    /// Screen-reader-only labels and `aria-hidden` decorations are dropped.
    pub fn user_text(&self, dom: &ArenaDom, container: ArenaNodeId) -> String {
        self.selectors
            .user_text
            .select_first(dom, container)
            .and_then(|id| Node::from_dom_excluding(dom, id, &self.selectors.hidden))
            .map(|node| clean_text(&inner_text(&node)))
            .unwrap_or_default()
    }

    /// The reasoning trace as Markdown, or empty when collapsed or absent.
    pub fn model_thoughts(&self, dom: &ArenaDom, container: ArenaNodeId) -> String {
        let chunks: Vec<String> = self
            .thoughts_chunks(dom, container)
            .filter_map(|node| {
                let text = extract_markdown(&node);
                (!text.trim().is_empty()).then(|| clean_text(&text))
            })
            .collect();
        clean_text(&chunks.join("\n\n"))
    }

    /// The reasoning trace as HTML chunks joined by newlines.
    pub fn thoughts_html(&self, dom: &ArenaDom, container: ArenaNodeId) -> String {
        self.thoughts_chunks(dom, container)
            .filter_map(|node| trimmed_html(&node))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The model answer as Markdown, falling back to the response's plain text.
    pub fn model_text(&self, dom: &ArenaDom, container: ArenaNodeId) -> String {
        let answer = self.answer_nodes(dom, container).find_map(|node| {
            let text = extract_markdown(&node);
            (!text.trim().is_empty()).then(|| clean_text(&text))
        });
        if let Some(answer) = answer {
            return answer;
        }
        debug!("no markdown answer found, using fallback text");
        self.fallback_node(dom, container)
            .map(|node| clean_text(&inner_text(&node)))
            .unwrap_or_default()
    }

    /// The model answer as HTML, falling back to the whole response's HTML.
    pub fn model_html(&self, dom: &ArenaDom, container: ArenaNodeId) -> String {
        self.answer_nodes(dom, container)
            .find_map(|node| trimmed_html(&node))
            .or_else(|| {
                self.fallback_node(dom, container)
                    .and_then(|node| trimmed_html(&node))
            })
            .unwrap_or_default()
    }

    /// The reasoning trace toggle inside `container`.
    pub fn thoughts_toggle(&self, dom: &ArenaDom, container: ArenaNodeId) -> Option<ArenaNodeId> {
        self.selectors.thoughts_toggle.select_first(dom, container)
    }

    fn thoughts_containers(&self, dom: &ArenaDom, container: ArenaNodeId) -> Vec<ArenaNodeId> {
        self.selectors.thoughts_container.select_all(dom, container)
    }

    /// Markdown chunks of every reasoning trace, in document order.
    fn thoughts_chunks<'a>(
        &'a self,
        dom: &'a ArenaDom,
        container: ArenaNodeId,
    ) -> impl Iterator<Item = Node> + 'a {
        self.thoughts_containers(dom, container)
            .into_iter()
            .flat_map(move |thoughts| self.selectors.thoughts_markdown.select_all(dom, thoughts))
            .filter_map(move |id| Node::from_dom(dom, id))
    }

    /// Answer candidates: model markdown nodes outside any reasoning trace.
    fn answer_nodes<'a>(
        &'a self,
        dom: &'a ArenaDom,
        container: ArenaNodeId,
    ) -> impl Iterator<Item = Node> + 'a {
        let thoughts = self.thoughts_containers(dom, container);
        self.selectors
            .model_markdown
            .select_all(dom, container)
            .into_iter()
            .filter(move |&id| !thoughts.iter().any(|&t| dom.contains(t, id)))
            .filter_map(move |id| Node::from_dom(dom, id))
    }

    fn fallback_node(&self, dom: &ArenaDom, container: ArenaNodeId) -> Option<Node> {
        let id = self.selectors.model_fallback.select_first(dom, container)?;
        Node::from_dom(dom, id)
    }
}

/// Inner HTML of the action-stripped subtree, or `None` if blank.
fn trimmed_html(node: &Node) -> Option<String> {
    let stripped = strip_actions(node);
    let html = stripped.as_element().map(inner_html).unwrap_or_default();
    let html = html.trim();
    (!html.is_empty()).then(|| html.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="conversation-container">
          <div class="user-query-container">
            <div class="query-text">
              <span class="cdk-visually-hidden">You said</span>
              <p>How do I cook tomatoes?</p>
            </div>
          </div>
          <div class="response-content">
            <div class="thoughts-container">
              <div class="markdown"><p>Consider <b>heat</b>.</p></div>
            </div>
            <div class="markdown">
              <p>Roast them.</p>
              <div class="table-footer"><button>Export to Sheets</button></div>
            </div>
          </div>
        </div>
        <div class="conversation-container">
          <div class="user-query-container"><div class="query-text">Second</div></div>
          <div class="response-content"><span>Plain answer</span></div>
        </div>
    </body></html>"#;

    fn setup() -> (Extractor, StaticPage) {
        let extractor = Extractor::new(&SelectorConfig::default()).unwrap();
        (extractor, StaticPage::from_html(PAGE))
    }

    #[test]
    fn test_pick_conversations() {
        let (extractor, page) = setup();
        let dom = page.dom();
        assert_eq!(extractor.pick_conversations(dom, Scope::All).unwrap(), vec![0, 1]);
        assert_eq!(extractor.pick_conversations(dom, Scope::Current).unwrap(), vec![1]);
        assert_eq!(extractor.pick_conversations(dom, Scope::Select(0)).unwrap(), vec![0]);
        assert!(matches!(
            extractor.pick_conversations(dom, Scope::Select(5)),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn test_pick_on_empty_page() {
        let extractor = Extractor::new(&SelectorConfig::default()).unwrap();
        let page = StaticPage::from_html("<p>nothing here</p>");
        assert!(matches!(
            extractor.pick_conversations(page.dom(), Scope::All),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn test_user_text_skips_hidden_label() {
        let (extractor, page) = setup();
        let first = extractor.conversation_at(page.dom(), 0).unwrap();
        assert_eq!(extractor.user_text(page.dom(), first), "How do I cook tomatoes?");
    }

    #[test]
    fn test_thoughts_and_answer_are_separated() {
        let (extractor, page) = setup();
        let dom = page.dom();
        let first = extractor.conversation_at(dom, 0).unwrap();
        assert_eq!(extractor.model_thoughts(dom, first), "Consider **heat**.");
        assert_eq!(extractor.model_text(dom, first), "Roast them.");
        assert_eq!(
            extractor.thoughts_html(dom, first),
            "<p>Consider <b>heat</b>.</p>"
        );
    }

    #[test]
    fn test_model_html_drops_footer_controls() {
        let (extractor, page) = setup();
        let first = extractor.conversation_at(page.dom(), 0).unwrap();
        let html = extractor.model_html(page.dom(), first);
        assert!(html.starts_with("<p>Roast them.</p>"));
        assert!(!html.contains("Export to Sheets"));
    }

    #[test]
    fn test_fallback_answer() {
        let (extractor, page) = setup();
        let dom = page.dom();
        let second = extractor.conversation_at(dom, 1).unwrap();
        let turn = extractor.extract_turn(dom, second);
        assert_eq!(turn.user, "Second");
        assert_eq!(turn.model, "Plain answer");
        assert_eq!(turn.model_html, "<span>Plain answer</span>");
        assert_eq!(turn.thoughts, "");
        assert_eq!(turn.thoughts_html, "");
    }

    #[test]
    fn test_static_page_cannot_click() {
        let (extractor, mut page) = setup();
        let first = extractor.conversation_at(page.dom(), 0).unwrap();
        assert!(!page.click(first));
    }

    #[test]
    fn test_static_page_debug() {
        let page = StaticPage::default();
        let debug = format!("{page:?}");
        assert!(debug.starts_with("StaticPage"));
        assert!(debug.contains("ArenaDom"));
    }
}
