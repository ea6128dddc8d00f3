//! XML text escaping
//!
//! Besides the five predefined entities, SpreadsheetML encodes characters that XML 1.0 cannot
//! carry as `_xHHHH_`. A literal `_xHHHH_` in cell text therefore has its underscore written as
//! `_x005F_` so readers decode it back to the original text.

use std::borrow::Cow;

/// Escape text content (cell values, defined names)
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| needs_escape(c) || c == '_') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for (i, c) in s.char_indices() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '_' if escaped_char(&s[i..]).is_some() => out.push_str("_x005F_"),
            c if is_illegal(c) => out.push_str(&format!("_x{:04X}_", c as u32)),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape an attribute value (sheet names, format codes)
pub(crate) fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if is_illegal(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Whether text needs `xml:space="preserve"` to keep its outer whitespace
pub(crate) fn needs_preserve(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_whitespace()) || s.ends_with(|c: char| c.is_ascii_whitespace())
}

/// Decode `_xHHHH_` sequences.
///
/// Incomplete or invalid sequences are kept as written.
pub(crate) fn decode_escapes(s: &str) -> Cow<'_, str> {
    if !s.contains("_x") {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match escaped_char(candidate) {
            Some(c) => {
                out.push(c);
                rest = &candidate[7..];
            }
            None => {
                out.push('_');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// The character encoded by a `_xHHHH_` sequence at the start of `s`
fn escaped_char(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || bytes[1] != b'x' || bytes[6] != b'_' {
        return None;
    }
    let hex = s.get(2..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'') || (c as u32) < 0x20 || is_illegal(c)
}

/// Characters XML 1.0 can't carry literally; CR is included since parsers normalize it to LF.
pub(crate) fn is_illegal(c: char) -> bool {
    ((c as u32) < 0x20 && !matches!(c, '\t' | '\n')) || matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(escape_text("Taco"), Cow::Borrowed("Taco")));
        assert!(matches!(escape_text("snake_case"), Cow::Owned(_)));
        assert_eq!(escape_text("snake_case"), "snake_case");
    }

    #[test]
    fn test_markup_is_escaped() {
        assert_eq!(escape_text("</sheetData>"), "&lt;/sheetData&gt;");
        assert_eq!(
            escape_text(r#"<dimension ref="A1:B2"/>"#),
            "&lt;dimension ref=&quot;A1:B2&quot;/&gt;"
        );
        assert_eq!(escape_text("Tom & Jerry's"), "Tom &amp; Jerry&apos;s");
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(escape_text("a\u{1}b"), "a_x0001_b");
        assert_eq!(escape_text("line\r\nbreak"), "line_x000D_\nbreak");
        assert_eq!(escape_text("tab\there"), "tab\there");
    }

    #[test]
    fn test_literal_escape_sequence_is_protected() {
        assert_eq!(escape_text("_x0041_"), "_x005F_x0041_");
        assert_eq!(escape_text("_x00"), "_x00");
        assert_eq!(decode_escapes(&escape_text("_x0041_")), "_x0041_");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_escapes("a_x000D_b"), "a\rb");
        assert_eq!(decode_escapes("_x000d__x000a_"), "\r\n");
        assert_eq!(decode_escapes("_x005F_"), "_");
        assert_eq!(decode_escapes("_xyz_"), "_xyz_");
        assert_eq!(decode_escapes("_x12"), "_x12");
        assert_eq!(decode_escapes("__x0041_"), "_A");
    }

    #[test]
    fn test_round_trip_of_awkward_text() {
        for text in ["\u{1}\u{1f}", "_x0009_ and _x", "\r", "__x005F__"] {
            assert_eq!(decode_escapes(&escape_text(text)), text);
        }
    }

    #[test]
    fn test_attr() {
        assert_eq!(escape_attr("Sheet 1"), "Sheet 1");
        assert_eq!(escape_attr("A&B \"q\""), "A&amp;B &quot;q&quot;");
        assert_eq!(escape_attr("a\tb"), "a&#9;b");
    }

    #[test]
    fn test_needs_preserve() {
        assert!(needs_preserve(" lead"));
        assert!(needs_preserve("trail\n"));
        assert!(!needs_preserve("in side"));
        assert!(!needs_preserve(""));
    }
}
