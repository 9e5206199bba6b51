//! Pure text transformation utilities for Markdown output.

/// Whitespace that collapses to a single space in rendered text.
///
/// Unicode `White_Space` plus the byte order mark, which browsers also treat
/// as collapsible.
pub fn is_collapsible_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Collapse every run of whitespace (including newlines and non-breaking
/// spaces) to one ordinary space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_collapsible_space(c) {
            if !in_space {
                result.push(' ');
            }
            in_space = true;
        } else {
            result.push(c);
            in_space = false;
        }
    }
    result
}

/// Escape the characters that would otherwise start Markdown syntax in
/// running text: backslash, backtick, asterisk and underscore.
///
/// # Examples
///
/// ```
/// use chatmark::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
/// assert_eq!(escape_markdown("snake_case"), "snake\\_case");
/// assert_eq!(escape_markdown("[link]"), "[link]");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 10);
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Escape pipes so cell text cannot split a table row.
pub fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Escape backticks inside an inline code span.
pub fn escape_inline_code(text: &str) -> String {
    text.replace('`', "\\`")
}

/// Whether raw source text already carries Markdown emphasis, strike or code
/// markers (`**`, `__`, `~~`, `` ` ``).
pub fn has_markdown_markers(text: &str) -> bool {
    text.contains("**") || text.contains("__") || text.contains("~~") || text.contains('`')
}

/// Collapse runs of three or more newlines to exactly two.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        result.push(c);
    }
    result
}

/// Length in UTF-16 code units, the unit page scripts measure strings in.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escape_emphasis() {
        assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
        assert_eq!(escape_markdown("_italic_"), "\\_italic\\_");
    }

    #[test]
    fn test_escape_code() {
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
    }

    #[test]
    fn test_other_punctuation_untouched() {
        assert_eq!(escape_markdown("# [a] | <b> ![c]"), "# [a] | <b> ![c]");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \t\n b"), "a b");
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a b");
        assert_eq!(collapse_whitespace("\u{3000}x\r\n"), " x ");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_escape_table_cell() {
        assert_eq!(escape_table_cell("a | b"), "a \\| b");
    }

    #[test]
    fn test_markdown_markers() {
        assert!(has_markdown_markers("**bold**"));
        assert!(has_markdown_markers("__init__"));
        assert!(has_markdown_markers("~~gone~~"));
        assert!(has_markdown_markers("use `x`"));
        assert!(!has_markdown_markers("*single* _single_ ~single~"));
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb\nc"), "a\n\nb\nc");
    }

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("栄養"), 2);
        assert_eq!(utf16_len("🍅"), 2);
    }

    proptest! {
        #[test]
        fn prop_collapsed_text_has_no_space_runs(s in "[a-z \t\r\u{c}\u{a0}\n]{0,40}") {
            let collapsed = collapse_whitespace(&s);
            prop_assert!(!collapsed.contains("  "));
            prop_assert!(!collapsed.contains('\u{a0}'), "nbsp survived in {:?}", collapsed);
            prop_assert!(!collapsed.contains('\t'));
            prop_assert!(!collapsed.contains('\r'));
        }

        #[test]
        fn prop_no_triple_newlines_survive(s in "[ab\n]{0,40}") {
            prop_assert!(!collapse_blank_lines(&s).contains("\n\n\n"));
        }

        #[test]
        fn prop_escaped_text_has_no_bare_markers(s in "[a-z*_`\\\\]{0,20}") {
            let escaped = escape_markdown(&s);
            let mut chars = escaped.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    let next = chars.next();
                    prop_assert!(matches!(next, Some('\\' | '`' | '*' | '_')));
                } else {
                    prop_assert!(!matches!(c, '`' | '*' | '_'));
                }
            }
        }
    }
}
