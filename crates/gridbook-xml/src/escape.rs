//! OOXML string escape helpers.
//!
//! quick-xml handles the five predefined XML entities; this module covers
//! the escapes the OOXML spec layers on top of plain XML:
//!
//! - `_xHHHH_` sequences for characters XML 1.0 cannot carry (control
//!   characters and the non-characters U+FFFE/U+FFFF),
//! - HTML-flavored escaping for rendered cell text,
//! - W3C datetime formatting for `dcterms:` elements.

use chrono::{NaiveDateTime, Timelike};

/// Returns `true` for characters that must be written as `_xHHHH_` because
/// XML 1.0 cannot represent them literally.
fn needs_hex_escape(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Escape control characters in cell/string text as OOXML `_xHHHH_`
/// sequences. A literal `_x` that would otherwise be read back as an escape
/// is itself protected by escaping its underscore.
pub fn escape_ooxml(text: &str) -> String {
    if !text.chars().any(|c| needs_hex_escape(c)) && !contains_escape_lookalike(text) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 8);
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if needs_hex_escape(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else if c == '_' && is_escape_sequence_at(&chars, i) {
            out.push_str("_x005F_");
        } else {
            out.push(c);
        }
    }
    out
}

fn contains_escape_lookalike(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    (0..chars.len()).any(|i| chars[i] == '_' && is_escape_sequence_at(&chars, i))
}

/// Check whether `chars[i..]` starts a literal `_xHHHH_` sequence.
fn is_escape_sequence_at(chars: &[char], i: usize) -> bool {
    if i + 6 >= chars.len() {
        return false;
    }
    (chars[i + 1] == 'x' || chars[i + 1] == 'X')
        && chars[i + 2..i + 6].iter().all(|c| c.is_ascii_hexdigit())
        && chars[i + 6] == '_'
}

/// Reverse [`escape_ooxml`]: decode `_xHHHH_` sequences back to characters.
///
/// When `normalize_newlines` is set (the XLSX text path), `\r\n` pairs are
/// collapsed to `\n` afterwards.
pub fn unescape_ooxml(text: &str, normalize_newlines: bool) -> String {
    let mut out = if text.contains("_x") || text.contains("_X") {
        let chars: Vec<char> = text.chars().collect();
        let mut s = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '_' && is_escape_sequence_at(&chars, i) {
                let hex: String = chars[i + 2..i + 6].iter().collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) => {
                        s.push(c);
                        i += 7;
                        continue;
                    }
                    None => s.push(chars[i]),
                }
            } else {
                s.push(chars[i]);
            }
            i += 1;
        }
        s
    } else {
        text.to_string()
    };

    if normalize_newlines && out.contains("\r\n") {
        out = out.replace("\r\n", "\n");
    }
    out
}

/// Escape text for HTML output: the five predefined entities, `\n` as
/// `<br/>`, and control characters as numeric character references.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("<br/>"),
            c if needs_hex_escape(c) => out.push_str(&format!("&#x{:04X};", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Format a datetime as a W3C datetime string (ISO-8601, UTC, fractional
/// seconds stripped), e.g. `2024-01-15T10:30:00Z`.
pub fn write_w3c_datetime(dt: NaiveDateTime) -> String {
    let whole = dt.with_nanosecond(0).unwrap_or(dt);
    format!("{}Z", whole.format("%Y-%m-%dT%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape_ooxml("hello world"), "hello world");
        assert_eq!(escape_ooxml("tab\tand newline\n"), "tab\tand newline\n");
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape_ooxml("a\u{01}b"), "a_x0001_b");
        assert_eq!(escape_ooxml("\u{08}"), "_x0008_");
        assert_eq!(escape_ooxml("\u{1F}"), "_x001F_");
    }

    #[test]
    fn test_tab_and_newline_not_escaped() {
        // U+0009 and U+000A are legal XML characters.
        assert!(!escape_ooxml("\t\n").contains("_x"));
    }

    #[test]
    fn test_escape_literal_lookalike() {
        assert_eq!(escape_ooxml("_x0001_"), "_x005F_x0001_");
        assert_eq!(unescape_ooxml("_x005F_x0001_", false), "_x0001_");
    }

    #[test]
    fn test_unescape_roundtrip_controls() {
        for c in ('\u{01}'..='\u{08}').chain('\u{0B}'..='\u{1F}') {
            let s = format!("a{c}b");
            assert_eq!(unescape_ooxml(&escape_ooxml(&s), false), s);
        }
    }

    #[test]
    fn test_unescape_crlf_normalization() {
        assert_eq!(unescape_ooxml("line1\r\nline2", true), "line1\nline2");
        assert_eq!(unescape_ooxml("line1\r\nline2", false), "line1\r\nline2");
    }

    #[test]
    fn test_unescape_bad_sequence_left_alone() {
        assert_eq!(unescape_ooxml("_xZZZZ_", false), "_xZZZZ_");
        assert_eq!(unescape_ooxml("_x00", false), "_x00");
    }

    #[test]
    fn test_escape_html_entities() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_escape_html_newline_and_controls() {
        assert_eq!(escape_html("a\nb"), "a<br/>b");
        assert_eq!(escape_html("a\u{01}b"), "a&#x0001;b");
    }

    #[test]
    fn test_write_w3c_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_milli_opt(10, 30, 0, 250)
            .unwrap();
        assert_eq!(write_w3c_datetime(dt), "2024-01-15T10:30:00Z");
    }
}
