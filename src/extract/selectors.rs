//! Page selectors and their compiled form.

use serde::{Deserialize, Serialize};

use crate::dom::Query;
use crate::error::Result;

/// CSS selectors locating conversation parts on the page.
///
/// Every field defaults to the markup the chat page currently ships, so a
/// JSON override only needs the selectors that changed:
///
/// ```
/// use chatmark::extract::SelectorConfig;
///
/// let config = SelectorConfig::from_json(r#"{"userText": ".prompt"}"#).unwrap();
/// assert_eq!(config.user_text, ".prompt");
/// assert_eq!(config.conversation, ".conversation-container");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorConfig {
    /// One container per conversation turn.
    pub conversation: String,
    /// The user's prompt text inside a turn.
    pub user_text: String,
    /// Rendered model answer inside a turn.
    pub model_markdown: String,
    /// Used when no model markdown node yields text.
    pub model_fallback: String,
    /// Collapsible reasoning trace.
    pub thoughts_container: String,
    /// Markdown chunks inside a reasoning trace.
    pub thoughts_markdown: String,
    /// Button expanding or collapsing the reasoning trace.
    pub thoughts_toggle: String,
    /// Elements present in the DOM but not shown to the user.
    pub hidden: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            conversation: ".conversation-container".into(),
            user_text: ".user-query-container .query-text".into(),
            model_markdown: ".response-content .markdown".into(),
            model_fallback: ".response-content".into(),
            thoughts_container: ".thoughts-container".into(),
            thoughts_markdown: ".markdown".into(),
            thoughts_toggle: "[data-test-id='thoughts-header-button']".into(),
            hidden: ".cdk-visually-hidden, [aria-hidden='true']".into(),
        }
    }
}

impl SelectorConfig {
    /// Parse a (possibly partial) JSON override.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile every selector, failing on the first one that does not parse.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            conversation: Query::parse(&self.conversation)?,
            user_text: Query::parse(&self.user_text)?,
            model_markdown: Query::parse(&self.model_markdown)?,
            model_fallback: Query::parse(&self.model_fallback)?,
            thoughts_container: Query::parse(&self.thoughts_container)?,
            thoughts_markdown: Query::parse(&self.thoughts_markdown)?,
            thoughts_toggle: Query::parse(&self.thoughts_toggle)?,
            hidden: Query::parse(&self.hidden)?,
        })
    }
}

/// [`SelectorConfig`] compiled to queries.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub conversation: Query,
    pub user_text: Query,
    pub model_markdown: Query,
    pub model_fallback: Query,
    pub thoughts_container: Query,
    pub thoughts_markdown: Query,
    pub thoughts_toggle: Query,
    pub hidden: Query,
}
