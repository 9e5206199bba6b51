//! HTML serialization of owned node trees (`innerHTML` / `outerHTML`).

use std::fmt::Write;

use super::node::{Element, Node};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Escape text content the way `innerHTML` does.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Serialize the children of an element.
pub fn inner_html(el: &Element) -> String {
    let mut out = String::new();
    write_children(el, &mut out);
    out
}

/// Serialize a node including its own tag.
pub fn outer_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

fn write_children(el: &Element, out: &mut String) {
    let raw_text = RAW_TEXT_ELEMENTS.contains(&el.tag());
    for child in el.children() {
        write_node(child, raw_text, out);
    }
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(el) => {
            let _ = write!(out, "<{}", el.tag());
            for (name, value) in el.attrs() {
                let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag()) {
                return;
            }
            write_children(el, out);
            let _ = write!(out, "</{}>", el.tag());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"say "hi" & go"#), "say &quot;hi&quot; &amp; go");
    }

    #[test]
    fn test_inner_html() {
        let el = Element::new("div").with_children(vec![
            Node::element("p", &[("class", "x")], vec![Node::text("1 < 2")]),
            Node::element("br", &[], vec![]),
            Node::element("img", &[("src", "a.png"), ("alt", "\"A\"")], vec![]),
        ]);
        assert_eq!(
            inner_html(&el),
            r#"<p class="x">1 &lt; 2</p><br><img src="a.png" alt="&quot;A&quot;">"#
        );
    }

    #[test]
    fn test_outer_html_raw_text() {
        let node = Node::element("style", &[], vec![Node::text("a > b { color: red }")]);
        assert_eq!(outer_html(&node), "<style>a > b { color: red }</style>");
    }
}
