//! # chatmark
//!
//! Export chat conversations from rendered pages to Markdown and HTML.
//!
//! ## Features
//!
//! - Structural HTML → Markdown conversion tuned for chat answers (bold
//!   labels, nested lists, tables, quotes, code, KaTeX formulas)
//! - Removal of in-message UI chrome (copy buttons, table export footers)
//! - Turn extraction with configurable CSS selectors, including collapsed
//!   reasoning traces
//! - Markdown and standalone HTML documents, plus a JSON message protocol
//!
//! ## Quick Start
//!
//! ```
//! use chatmark::markdown::html_to_markdown;
//!
//! let md = html_to_markdown("<p>hello <b>world</b></p><button>Copy</button>");
//! assert_eq!(md, "hello **world**");
//! ```
//!
//! ## Exporting a Conversation
//!
//! ```no_run
//! use chatmark::export::{ConversationExporter, ExportOptions, Scope};
//! use chatmark::extract::StaticPage;
//!
//! let bytes = std::fs::read("saved-chat.html")?;
//! let mut page = StaticPage::from_bytes(&bytes);
//!
//! let exporter = ConversationExporter::new()?;
//! let doc = exporter.export(&mut page, &ExportOptions::new().scope(Scope::Current))?;
//! println!("{}", doc.markdown);
//! # Ok::<(), chatmark::Error>(())
//! ```

pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod markdown;
pub mod protocol;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::{Element, Node};
pub use error::{Error, Result};
pub use export::{
    ConversationExporter, ExportDocument, ExportOptions, Format, MarkdownStyle, Scope, Turn,
};
pub use extract::{Page, SelectorConfig, StaticPage};
pub use markdown::{extract_markdown, html_to_markdown, render, sanitize};
