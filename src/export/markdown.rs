//! Markdown document assembly.

use super::{Labels, MarkdownStyle, Turn};

/// Join turns into one Markdown document.
///
/// Each turn opens with a blank line, so the document itself starts with an
/// empty line. The reasoning trace section is emitted only when
/// `include_thoughts` is set and the trace is non-empty.
pub fn build_markdown(
    turns: &[Turn],
    style: MarkdownStyle,
    include_thoughts: bool,
    labels: &Labels,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (index, turn) in turns.iter().enumerate() {
        let n = index + 1;
        let thoughts = (include_thoughts && !turn.thoughts.is_empty()).then_some(&turn.thoughts);

        let headings = match style {
            MarkdownStyle::Legacy => [
                format!("## Turn {n}-1: {}", labels.user),
                format!("## Turn {n}-1.5: {}", labels.thoughts),
                format!("## Turn {n}-2: {}", labels.model),
            ],
            MarkdownStyle::Gemini => {
                lines.extend([String::new(), format!("## Turn {n}")]);
                [
                    format!("### {}", labels.user),
                    format!("### {}", labels.thoughts),
                    format!("### {}", labels.model),
                ]
            }
        };
        let [user_heading, thoughts_heading, model_heading] = headings;

        push_section(&mut lines, user_heading, &turn.user);
        if let Some(thoughts) = thoughts {
            push_section(&mut lines, thoughts_heading, thoughts);
        }
        push_section(&mut lines, model_heading, &turn.model);
    }
    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, heading: String, body: &str) {
    lines.extend([String::new(), heading, String::new(), body.to_string()]);
}
