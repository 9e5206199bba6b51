//! Compiled CSS selector queries over the arena DOM.

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::Selector;

use super::arena::{ArenaDom, ArenaNodeId};
use super::element_ref::{ElementRef, PageSelectorImpl};
use crate::error::{Error, Result};

/// A parsed, comma-separated CSS selector list.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    selectors: Vec<Selector<PageSelectorImpl>>,
}

impl Query {
    /// Parse a selector list such as `.cdk-visually-hidden, [aria-hidden='true']`.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = selectors::parser::SelectorList::parse(
            &PageSelectorImpl,
            &mut parser,
            selectors::parser::ParseRelative::No,
        )
        .map_err(|e| Error::Selector {
            selector: source.to_string(),
            message: format!("{:?}", e.kind),
        })?;

        Ok(Self {
            source: source.to_string(),
            selectors: list.slice().to_vec(),
        })
    }

    /// The selector text this query was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any selector in the list.
    pub fn matches(&self, dom: &ArenaDom, id: ArenaNodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(dom, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );

        self.selectors.iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }

    /// All matching descendants of `root`, in document order (`querySelectorAll`).
    pub fn select_all(&self, dom: &ArenaDom, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        dom.descendants(root)
            .filter(|&id| self.matches(dom, id))
            .collect()
    }

    /// First matching descendant of `root` (`querySelector`).
    pub fn select_first(&self, dom: &ArenaDom, root: ArenaNodeId) -> Option<ArenaNodeId> {
        dom.descendants(root).find(|&id| self.matches(dom, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn names(dom: &ArenaDom, ids: &[ArenaNodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| dom.get_attr(id, "id").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_class_selector() {
        let dom = parse_html(
            r#"<div id="a" class="conversation-container"></div>
               <div id="b" class="other"></div>
               <div id="c" class="conversation-container x"></div>"#,
        );
        let query = Query::parse(".conversation-container").unwrap();
        let found = query.select_all(&dom, dom.document());
        assert_eq!(names(&dom, &found), ["a", "c"]);
    }

    #[test]
    fn test_descendant_selector() {
        let dom = parse_html(
            r#"<div class="user-query-container"><span><p id="q" class="query-text">hi</p></span></div>
               <p id="stray" class="query-text">no</p>"#,
        );
        let query = Query::parse(".user-query-container .query-text").unwrap();
        let found = query.select_all(&dom, dom.document());
        assert_eq!(names(&dom, &found), ["q"]);
    }

    #[test]
    fn test_attribute_selector_with_quotes() {
        let dom = parse_html(
            r#"<button id="t" data-test-id="thoughts-header-button">Show</button>
               <button id="u" data-test-id="other">Other</button>"#,
        );
        let query = Query::parse("[data-test-id='thoughts-header-button']").unwrap();
        let found = query.select_first(&dom, dom.document()).unwrap();
        assert_eq!(dom.get_attr(found, "id"), Some("t"));
    }

    #[test]
    fn test_selector_list() {
        let dom = parse_html(
            r#"<span id="a" class="cdk-visually-hidden">label</span>
               <span id="b" aria-hidden="true">icon</span>
               <span id="c" aria-hidden="false">text</span>"#,
        );
        let query = Query::parse(".cdk-visually-hidden, [aria-hidden='true']").unwrap();
        let found = query.select_all(&dom, dom.document());
        assert_eq!(names(&dom, &found), ["a", "b"]);
    }

    #[test]
    fn test_root_is_not_its_own_match() {
        let dom = parse_html(r#"<div class="markdown"><div id="inner" class="markdown"></div></div>"#);
        let query = Query::parse(".markdown").unwrap();
        let outer = query.select_first(&dom, dom.document()).unwrap();
        let found = query.select_all(&dom, outer);
        assert_eq!(names(&dom, &found), ["inner"]);
    }

    #[test]
    fn test_invalid_selector() {
        let err = Query::parse("..broken[").unwrap_err();
        assert!(matches!(err, Error::Selector { .. }));
    }
}
