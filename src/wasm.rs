//! WASM bindings for in-page conversion.
//!
//! This module exposes the converter and the message handler to JavaScript
//! via wasm-bindgen. Pages are passed as serialized HTML.

use wasm_bindgen::prelude::*;

use crate::export::ConversationExporter;
use crate::extract::{SelectorConfig, StaticPage};
use crate::protocol::handle_message;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert an HTML fragment to Markdown.
///
/// Message action controls are dropped and KaTeX formulas become TeX.
#[wasm_bindgen(js_name = htmlToMarkdown)]
pub fn html_to_markdown(html: &str) -> String {
    crate::markdown::html_to_markdown(html)
}

/// Answer a JSON request (`EXPORT_GEMINI_CHAT` / `LIST_GEMINI_TURNS`)
/// against a snapshot of the page.
///
/// `selectors` is an optional JSON selector override. Returns the JSON
/// response; only selector or serialization failures throw.
#[wasm_bindgen(js_name = handleMessage)]
pub fn handle_message_js(
    page_html: &str,
    message: &str,
    selectors: Option<String>,
) -> Result<String, JsValue> {
    let config = match selectors {
        Some(json) => SelectorConfig::from_json(&json).map_err(to_js)?,
        None => SelectorConfig::default(),
    };
    let exporter = ConversationExporter::with_selectors(&config).map_err(to_js)?;
    let mut page = StaticPage::from_html(page_html);
    handle_message(&exporter, &mut page, message)
        .to_json()
        .map_err(to_js)
}

fn to_js(e: crate::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}
