//! Page DOM: parsing, selector queries, and owned clones.
//!
//! - [`ArenaDom`]: the page as parsed by html5ever, read-only to the converter
//! - [`Query`]: compiled CSS selector lists evaluated against the arena
//! - [`Node`]: detached owned subtrees handed to the Markdown converter
//! - [`inner_html`]: serialization for the HTML export variant

mod arena;
mod element_ref;
mod node;
mod query;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use element_ref::{ElementRef, PageSelectorImpl};
pub use node::{Element, Node, RAW_ATTR};
pub use query::Query;
pub use serialize::{escape_attr, escape_text, inner_html, outer_html};
pub use tree_sink::{PageSink, parse_html};
