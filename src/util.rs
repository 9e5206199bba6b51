//! Utility functions with platform-specific implementations.

use std::borrow::Cow;
use std::time::Duration;

/// Get current time as milliseconds since Unix epoch.
///
/// On native platforms, uses `SystemTime::now()`.
/// On WASM, uses `js_sys::Date::now()`.
#[cfg(not(target_arch = "wasm32"))]
pub fn time_now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn time_now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// Block the current thread for `interval`.
///
/// `wasm32-unknown-unknown` has no blocking sleep, so this is a no-op there;
/// polling loops simply run their attempts back to back.
#[cfg(not(target_arch = "wasm32"))]
pub fn sleep(interval: Duration) {
    if !interval.is_zero() {
        std::thread::sleep(interval);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn sleep(_interval: Duration) {}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset="...">`)
/// 3. Falls back to Windows-1252
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode a saved HTML page, sniffing `<meta charset>` for the hint.
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    decode_text(bytes, extract_meta_charset(bytes))
}

/// Extract the charset from a `<meta charset="...">` declaration.
///
/// Only the first 1024 bytes are checked, matching the HTML prescan window.
/// Also recognizes the `content="text/html; charset=..."` form.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(1024);
    let prefix = &bytes[..check_len];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];
    let first = *after.first()?;

    let (start, terminator): (usize, &[u8]) = match first {
        b'"' | b'\'' => (1, std::slice::from_ref(&after[0])),
        _ => (0, b"\"'; >/"),
    };
    let end = after[start..]
        .iter()
        .position(|b| terminator.contains(b) || b.is_ascii_whitespace())?
        + start;
    if end == start {
        return None;
    }

    std::str::from_utf8(&after[start..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("こんにちは".as_bytes(), None), "こんにちは");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0x93/0x94 are curly quotes in CP1252 and invalid as UTF-8 here
        let bytes = [0x93, b'h', b'i', 0x94];
        assert_eq!(decode_text(&bytes, None), "\u{201c}hi\u{201d}");
    }

    #[test]
    fn test_decode_uses_hint() {
        // "テスト" in Shift_JIS
        let bytes = [0x83, 0x65, 0x83, 0x58, 0x83, 0x67];
        assert_eq!(decode_text(&bytes, Some("shift_jis")), "テスト");
    }

    #[test]
    fn test_meta_charset_quoted() {
        let html = br#"<html><head><meta charset="Shift_JIS"></head>"#;
        assert_eq!(extract_meta_charset(html), Some("Shift_JIS"));
    }

    #[test]
    fn test_meta_charset_http_equiv() {
        let html =
            br#"<meta http-equiv="Content-Type" content="text/html; charset=euc-jp">"#;
        assert_eq!(extract_meta_charset(html), Some("euc-jp"));
    }

    #[test]
    fn test_meta_charset_missing() {
        assert_eq!(extract_meta_charset(b"<html><body></body></html>"), None);
        assert_eq!(extract_meta_charset(b"charset="), None);
    }
}
