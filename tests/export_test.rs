//! End-to-end export tests against saved chat pages.
//!
//! Each fixture under `tests/fixtures` is a trimmed snapshot of the chat
//! page markup: hidden prompt labels, reasoning trace toggles, table footers.

use std::fs;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use chatmark::dom::{ArenaDom, ArenaNodeId, Query, parse_html};
use chatmark::export::{ConversationExporter, ExportOptions, MarkdownStyle, Scope};
use chatmark::extract::{ExpandPolicy, Page, StaticPage};
use chatmark::protocol::handle_message;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("{FIXTURES_DIR}/{name}")).expect("Failed to read fixture")
}

fn request(page: &mut impl Page, message: Value) -> Value {
    let exporter = ConversationExporter::new().unwrap();
    let response = handle_message(&exporter, page, &message.to_string());
    serde_json::to_value(response).unwrap()
}

/// A page whose reasoning trace toggle swaps between two saved snapshots.
struct TogglePage {
    collapsed: ArenaDom,
    expanded: ArenaDom,
    open: bool,
    clicks: usize,
}

impl TogglePage {
    fn new() -> Self {
        Self {
            collapsed: parse_html(&fixture("gemini-thoughts-collapsed.html")),
            expanded: parse_html(&fixture("gemini-thoughts-expanded.html")),
            open: false,
            clicks: 0,
        }
    }
}

impl Page for TogglePage {
    fn dom(&self) -> &ArenaDom {
        if self.open { &self.expanded } else { &self.collapsed }
    }

    fn click(&mut self, target: ArenaNodeId) -> bool {
        let toggle = Query::parse("[data-test-id='thoughts-header-button']").unwrap();
        assert!(toggle.matches(self.dom(), target), "clicked something other than the toggle");
        self.open = !self.open;
        self.clicks += 1;
        true
    }
}

#[test]
fn test_hidden_prompt_label_excluded() {
    let mut page = StaticPage::from_html(&fixture("gemini-user-hidden-label.html"));
    let response = request(
        &mut page,
        json!({"type": "EXPORT_GEMINI_CHAT", "scope": "current"}),
    );

    assert_eq!(response["ok"], true);
    let data = &response["data"];
    assert_eq!(data["turns"].as_array().unwrap().len(), 1);
    assert_eq!(data["turns"][0]["user"], "SynthIDはどうやって作れる？");

    let markdown = data["markdown"].as_str().unwrap();
    assert!(!markdown.contains("あなたのプロンプト"));
    assert!(markdown.contains("SynthIDはどうやって作れる？"));
}

#[test]
fn test_answer_markdown() {
    let mut page = StaticPage::from_html(&fixture("gemini-user-hidden-label.html"));
    let exporter = ConversationExporter::new().unwrap();
    let doc = exporter.export(&mut page, &ExportOptions::default()).unwrap();

    assert_eq!(
        doc.turns[0].model,
        "SynthIDは**電子透かし**技術です。\n\n\
         - **画像:** ピクセルに埋め込みます。\n\
         - **テキスト:** トークンの選択確率を調整します。"
    );
    assert!(!doc.html.contains("コピー"));
}

#[test]
fn test_markdown_style_switches_headings() {
    let html = fixture("gemini-user-hidden-label.html");

    for message in [
        json!({"type": "EXPORT_GEMINI_CHAT", "scope": "current"}),
        json!({"type": "EXPORT_GEMINI_CHAT", "scope": "current", "markdownStyle": "legacy"}),
    ] {
        let mut page = StaticPage::from_html(&html);
        let response = request(&mut page, message);
        let markdown = response["data"]["markdown"].as_str().unwrap();
        assert!(markdown.contains("## Turn 1-1: User"));
        assert!(markdown.contains("## Turn 1-2: Gemini"));
    }

    let mut page = StaticPage::from_html(&html);
    let response = request(
        &mut page,
        json!({"type": "EXPORT_GEMINI_CHAT", "scope": "current", "markdownStyle": "gemini"}),
    );
    let markdown = response["data"]["markdown"].as_str().unwrap();
    assert!(markdown.starts_with("\n## Turn 1\n\n### User\n\n"));
    assert!(markdown.contains("### Gemini"));
    assert!(!markdown.contains("Turn 1-1"));
}

#[test]
fn test_thoughts_included_by_default_and_can_be_disabled() {
    let html = fixture("gemini-thoughts-toggle.html");
    let thoughts = "まず要件を整理します。次に出力形式を分けて考えます。";

    let mut page = StaticPage::from_html(&html);
    let response = request(
        &mut page,
        json!({"type": "EXPORT_GEMINI_CHAT", "scope": "current", "markdownStyle": "gemini"}),
    );
    let data = &response["data"];
    assert_eq!(data["turns"][0]["thoughts"], thoughts);
    assert!(data["markdown"].as_str().unwrap().contains("### Thought Process"));
    assert!(data["markdown"].as_str().unwrap().contains("まず要件を整理します。"));
    assert!(data["html"].as_str().unwrap().contains("<h3>Thought Process</h3>"));

    let mut page = StaticPage::from_html(&html);
    let response = request(
        &mut page,
        json!({
            "type": "EXPORT_GEMINI_CHAT",
            "scope": "current",
            "markdownStyle": "gemini",
            "includeThoughts": false,
        }),
    );
    let data = &response["data"];
    assert_eq!(data["turns"][0]["thoughts"], thoughts);
    assert!(!data["markdown"].as_str().unwrap().contains("### Thought Process"));
    assert!(!data["markdown"].as_str().unwrap().contains("まず要件を整理します。"));
    assert!(!data["html"].as_str().unwrap().contains("<h3>Thought Process</h3>"));
}

#[test]
fn test_collapsed_thoughts_expanded_and_restored() {
    let mut page = TogglePage::new();
    let trace = Query::parse(".thoughts-container .markdown").unwrap();
    assert!(trace.select_first(page.dom(), page.dom().document()).is_none());

    let exporter = ConversationExporter::new()
        .unwrap()
        .with_expand_policy(ExpandPolicy::immediate(10));
    let options = ExportOptions::new()
        .scope(Scope::Current)
        .markdown_style(MarkdownStyle::Gemini);
    let doc = exporter.export(&mut page, &options).unwrap();

    assert!(doc.markdown.contains("### Thought Process"));
    assert!(doc.turns[0].thoughts.contains("Assessing Difficulty of Info Geom"));
    assert_eq!(page.clicks, 2);
    assert!(trace.select_first(page.dom(), page.dom().document()).is_none());
}

#[test]
fn test_collapsed_thoughts_left_alone_when_disabled() {
    let mut page = TogglePage::new();
    let exporter = ConversationExporter::new().unwrap();
    let options = ExportOptions::new().include_thoughts(false);
    let doc = exporter.export(&mut page, &options).unwrap();

    assert_eq!(page.clicks, 0);
    assert_eq!(doc.turns[0].thoughts, "");
    assert!(!doc.markdown.contains("Thought Process"));
}

#[test]
fn test_table_footer_controls_dropped() {
    let mut page = StaticPage::from_html(&fixture("gemini-table-footer.html"));
    let exporter = ConversationExporter::new().unwrap();
    let doc = exporter.export(&mut page, &ExportOptions::default()).unwrap();

    assert_eq!(
        doc.turns[0].model,
        [
            "## 🍅 トマト（Tomato）とは？",
            "",
            "| 栄養素 | 主な効果・効能 |",
            "| --- | --- |",
            "| **リコピン** | 強力な抗酸化作用。 |",
            "| **ビタミンC** | 免疫力アップ。 |",
            "",
            "> **豆知識：** 内容です。",
        ]
        .join("\n")
    );
    assert!(!doc.markdown.contains("エクスポート"));
    assert!(!doc.html.contains("エクスポート"));
    assert!(!doc.html.contains("table-footer"));
}

#[test]
fn test_math_and_order_preserved() {
    let mut page = StaticPage::from_html(&fixture("gemini-math-response.html"));
    let exporter = ConversationExporter::new().unwrap();
    let doc = exporter.export(&mut page, &ExportOptions::default()).unwrap();
    let markdown = &doc.turns[0].model;

    let expected_in_order = [
        "SVM（サポートベクターマシン）は、境界線",
        "その数式的な核心は",
        "---",
        "### 1. 線形モデルの基本形",
        "まず、データを分類する超平面",
        "$$\nf(x) = w^T x + b\n$$",
        "- $w$:",
        "- $b$:",
        "- $x$:",
        "このとき、ラベル $y$ を $1$ または $-1$",
        "$$\ny_i (w^T x_i + b) \\geq 1\n$$",
        "### 2. マージンの最大化",
        "マージンは $\\frac{2}{\\|w\\|}$ で表されます。",
    ];

    let mut last = None;
    for snippet in expected_in_order {
        let index = markdown
            .find(snippet)
            .unwrap_or_else(|| panic!("missing snippet: {snippet}\n---\n{markdown}"));
        assert!(last.is_none_or(|prev| index > prev), "order mismatch for: {snippet}");
        last = Some(index);
    }
}

#[test]
fn test_select_out_of_range_reports_error() {
    let mut page = StaticPage::from_html(&fixture("gemini-table-footer.html"));
    let response = request(
        &mut page,
        json!({"type": "EXPORT_GEMINI_CHAT", "scope": "select", "turnIndex": 3}),
    );
    assert_eq!(response["ok"], false);
    assert!(response["error"].as_str().unwrap().contains("turn 3"));
}

#[test]
fn test_list_turns() {
    let mut page = StaticPage::from_html(&fixture("gemini-user-hidden-label.html"));
    let response = request(&mut page, json!({"type": "LIST_GEMINI_TURNS"}));
    assert_eq!(
        response,
        json!({"ok": true, "data": {"turns": [{"index": 0, "label": "1. SynthIDはどうやって作れる？"}]}})
    );
}
