//! Standalone HTML document assembly.

use super::{Labels, Turn};
use crate::dom::escape_text;

const STYLE_RULES: &[&str] = &[
    "body{font-family:system-ui, -apple-system, sans-serif;line-height:1.6;margin:24px;background:#f8f9fb;color:#111;}",
    ".turn{background:#fff;border:1px solid #e5e7eb;border-radius:12px;padding:16px;margin-bottom:16px;}",
    ".role{padding:8px 12px;border-radius:10px;margin-bottom:12px;}",
    ".role.user{background:#eef2ff;}",
    ".role.thoughts{background:#fff4e6;}",
    ".role.model{background:#ecfeff;}",
    ".content{white-space:normal;}",
    "pre, code{white-space:pre-wrap;}",
];

/// Escape plain text for HTML and turn newlines into `<br>`.
pub fn escape_html(text: &str) -> String {
    escape_text(text).replace('\n', "<br>")
}

/// Build a self-contained HTML page with one `<section>` per turn.
///
/// Answer and reasoning HTML is embedded as extracted; where it is missing
/// the escaped text is used instead.
pub fn build_html(turns: &[Turn], include_thoughts: bool, labels: &Labels) -> String {
    let body = turns
        .iter()
        .enumerate()
        .map(|(index, turn)| turn_section(index, turn, include_thoughts, labels))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut lines = vec![
        "<!doctype html>",
        r#"<html lang="ja">"#,
        "<head>",
        r#"<meta charset="utf-8">"#,
        "<title>Gemini Export</title>",
        "<style>",
    ];
    lines.extend_from_slice(STYLE_RULES);
    lines.extend_from_slice(&[
        "</style>",
        "</head>",
        "<body>",
        body.as_str(),
        "</body>",
        "</html>",
    ]);
    lines.join("\n")
}

fn turn_section(index: usize, turn: &Turn, include_thoughts: bool, labels: &Labels) -> String {
    let model_html = or_escaped(&turn.model_html, &turn.model);
    let thoughts_html = or_escaped(&turn.thoughts_html, &turn.thoughts);

    let mut parts = vec![
        r#"<section class="turn">"#.to_string(),
        format!("  <h2>Turn {}</h2>", index + 1),
    ];
    push_role(&mut parts, "user", &labels.user, &escape_html(&turn.user));
    if include_thoughts && !thoughts_html.is_empty() {
        push_role(&mut parts, "thoughts", &labels.thoughts, &thoughts_html);
    }
    push_role(&mut parts, "model", &labels.model, &model_html);
    parts.push("</section>".to_string());
    parts.join("\n")
}

fn push_role(parts: &mut Vec<String>, role: &str, label: &str, content: &str) {
    parts.extend([
        format!(r#"  <div class="role {role}">"#),
        format!("    <h3>{label}</h3>"),
        format!(r#"    <div class="content">{content}</div>"#),
        "  </div>".to_string(),
    ]);
}

fn or_escaped(html: &str, text: &str) -> String {
    if html.is_empty() {
        escape_html(text)
    } else {
        html.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b\n& c"), "a &lt; b<br>&amp; c");
    }

    #[test]
    fn test_turn_section() {
        let turn = Turn {
            user: "line1\nline2".into(),
            thoughts: "plan".into(),
            model: "ignored".into(),
            model_html: "<p>Answer</p>".into(),
            ..Turn::default()
        };
        let html = build_html(&[turn], true, &Labels::default());
        let expected = [
            r#"<section class="turn">"#,
            "  <h2>Turn 1</h2>",
            r#"  <div class="role user">"#,
            "    <h3>User</h3>",
            r#"    <div class="content">line1<br>line2</div>"#,
            "  </div>",
            r#"  <div class="role thoughts">"#,
            "    <h3>Thought Process</h3>",
            r#"    <div class="content">plan</div>"#,
            "  </div>",
            r#"  <div class="role model">"#,
            "    <h3>Gemini</h3>",
            r#"    <div class="content"><p>Answer</p></div>"#,
            "  </div>",
            "</section>",
        ]
        .join("\n");
        assert!(html.contains(&expected));
    }

    #[test]
    fn test_document_frame() {
        let html = build_html(&[], true, &Labels::default());
        assert!(html.starts_with("<!doctype html>\n<html lang=\"ja\">\n<head>"));
        assert!(html.contains("<title>Gemini Export</title>"));
        assert!(html.contains(".role.thoughts{background:#fff4e6;}"));
        assert!(html.ends_with("<body>\n\n</body>\n</html>"));
    }

    #[test]
    fn test_thoughts_hidden_when_disabled() {
        let turn = Turn {
            thoughts_html: "<p>plan</p>".into(),
            ..Turn::default()
        };
        let html = build_html(&[turn], false, &Labels::default());
        assert!(!html.contains("role thoughts"));
    }
}
