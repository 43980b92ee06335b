//! Number format engine: converts a (value, format) pair into display text.
//!
//! Supports the ECMA-376 built-in format ids, custom numeric patterns
//! (`0`, `#`, `,`, `.`, `%`, `E+`), date/time patterns (`y`, `m`, `d`, `h`,
//! `s`, `AM/PM`, elapsed `[h]`/`[mm]`/`[ss]`, fractional seconds `.0`),
//! multi-section formats (positive;negative;zero;text), color codes
//! (`[Red]`), conditional sections (`[>100]`), the text placeholder `@`,
//! and fraction formats (`# ?/?`).
//!
//! The format table is an explicit [`FormatTable`] threaded through each
//! read/write call; there is no process-wide registry.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::utils::constants::MAX_NUMFMT_ID;

/// First id available for custom formats registered without an explicit id.
pub const FIRST_CUSTOM_ID: u32 = 164;

/// Map a built-in number format id to its format code string.
///
/// Only the canonical set is listed here; locale aliases and accounting
/// formats resolve through [`alias_format_id`] and
/// [`accounting_format_code`].
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("m/d/yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        56 => Some("\u{4E0A}\u{5348}/\u{4E0B}\u{5348}hh\"\u{6642}\"mm\"\u{5206}\"ss\"\u{79D2}\""),
        _ => None,
    }
}

/// Map a locale-alias format id to the canonical built-in it renders as.
pub fn alias_format_id(id: u32) -> Option<u32> {
    match id {
        5..=8 => Some(id + 32),
        23..=26 => Some(0),
        27..=31 => Some(14),
        50..=58 => Some(14),
        59..=62 => Some(id - 58),
        67..=68 => Some(id - 58),
        69 => Some(18),
        70 => Some(19),
        71 => Some(20),
        72..=75 => Some(id - 58),
        76 => Some(20),
        77 => Some(21),
        78 => Some(22),
        79 => Some(45),
        80 => Some(46),
        81 => Some(47),
        82 => Some(0),
        _ => None,
    }
}

/// Literal accounting format strings for ids that are not aliases.
pub fn accounting_format_code(id: u32) -> Option<&'static str> {
    match id {
        41 => Some(r#"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"#),
        42 => Some(r#"_("$"* #,##0_);_("$"* \(#,##0\);_("$"* "-"_);_(@_)"#),
        43 => Some(r#"_(* #,##0.00_);_(* \(#,##0.00\);_(* "-"??_);_(@_)"#),
        44 => Some(r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#),
        63 => Some(r##""$"#,##0_);\("$"#,##0\)"##),
        64 => Some(r##""$"#,##0_);[Red]\("$"#,##0\)"##),
        65 => Some(r##""$"#,##0.00_);\("$"#,##0.00\)"##),
        66 => Some(r##""$"#,##0.00_);[Red]\("$"#,##0.00\)"##),
        _ => None,
    }
}

/// Per-call number format table: id -> format code.
///
/// Seeded with the built-ins; the workbook's styles part registers its
/// custom formats on top, preserving their ids.
#[derive(Debug, Clone)]
pub struct FormatTable {
    formats: BTreeMap<u32, String>,
}

impl FormatTable {
    /// A fresh table holding only the ECMA built-ins.
    pub fn new() -> Self {
        let mut formats = BTreeMap::new();
        for id in 0..=MAX_NUMFMT_ID {
            if let Some(code) = builtin_format_code(id) {
                formats.insert(id, code.to_string());
            }
        }
        Self { formats }
    }

    /// Resolve an id to its format code, following accounting literals and
    /// locale aliases for ids the table itself does not define.
    pub fn code_for(&self, id: u32) -> Option<String> {
        if let Some(code) = self.formats.get(&id) {
            return Some(code.clone());
        }
        if let Some(code) = accounting_format_code(id) {
            return Some(code.to_string());
        }
        if let Some(target) = alias_format_id(id) {
            return self.code_for(target);
        }
        None
    }

    /// Register a format code under an explicit id (styles-part loading).
    pub fn insert(&mut self, id: u32, code: &str) {
        self.formats.insert(id, code.to_string());
    }

    /// Register a format code without an id; reuses an existing slot when
    /// the code is already present, otherwise takes the first free slot at
    /// or above [`FIRST_CUSTOM_ID`].
    pub fn register(&mut self, code: &str) -> Result<u32> {
        if let Some((&id, _)) = self.formats.iter().find(|(_, c)| c.as_str() == code) {
            return Ok(id);
        }
        for id in FIRST_CUSTOM_ID..=MAX_NUMFMT_ID {
            if !self.formats.contains_key(&id) {
                self.formats.insert(id, code.to_string());
                return Ok(id);
            }
        }
        Err(Error::Internal(format!(
            "number format table is full; cannot register '{code}'"
        )))
    }

    /// Iterate over (id, code) pairs the table explicitly defines.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.formats.iter().map(|(&id, code)| (id, code.as_str()))
    }

    /// Ids above the built-in range that the table defines (the custom set
    /// a stylesheet writer must emit).
    pub fn custom_formats(&self) -> Vec<(u32, String)> {
        self.formats
            .iter()
            .filter(|(&id, code)| builtin_format_code(id) != Some(code.as_str()))
            .map(|(&id, code)| (id, code.clone()))
            .collect()
    }
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a numeric value using the format code registered under `id`.
/// Unknown ids fall back to `General`.
pub fn format_id(table: &FormatTable, id: u32, value: f64, date1904: bool) -> String {
    let code = table.code_for(id).unwrap_or_else(|| "General".to_string());
    format_number(value, &code, date1904)
}

/// Format a numeric value using the given format code string.
///
/// For format codes with date/time tokens, the value is interpreted as a
/// serial date (honoring `date1904`). Non-finite values render as the
/// matching error string.
pub fn format_number(value: f64, format_code: &str, date1904: bool) -> String {
    if value.is_nan() {
        return "#VALUE!".to_string();
    }
    if value.is_infinite() {
        return "#DIV/0!".to_string();
    }
    if format_code.is_empty() || format_code.eq_ignore_ascii_case("General") {
        return format_general(value);
    }

    let sections = parse_sections(format_code);
    let has_any_condition = sections.iter().any(|s| extract_condition(s).is_some());
    let section = pick_section(&sections, value);
    let (cleaned, _color) = strip_color_and_condition(section);

    // With multiple sections the negative section carries its own sign
    // presentation (parentheses, literal minus), so the value passes
    // through as its absolute value.
    let use_abs = if has_any_condition {
        sections.len() >= 2
    } else {
        sections.len() >= 2 && value < 0.0
    };
    let effective_value = if use_abs { value.abs() } else { value };

    if cleaned == "@" || cleaned == "General" {
        return format_general(effective_value);
    }

    if is_date_section(&cleaned) {
        return match format_date_time(effective_value, &cleaned, date1904) {
            Some(s) => s,
            None => format_general(effective_value),
        };
    }

    if cleaned.contains('?') && cleaned.contains('/') {
        return format_fraction(effective_value, &cleaned);
    }

    if format_has_unquoted_char(&cleaned, 'E') || format_has_unquoted_char(&cleaned, 'e') {
        return format_scientific(effective_value, &cleaned);
    }

    format_numeric(effective_value, &cleaned)
}

/// Format a text value: applies the fourth (text) section's `@` placeholder
/// when the code carries one; otherwise the text passes through.
pub fn format_text(format_code: &str, text: &str) -> String {
    let sections = parse_sections(format_code);
    let text_section = if sections.len() >= 4 {
        Some(sections[3])
    } else if sections.len() == 1 && format_has_unquoted_char(sections[0], '@') {
        Some(sections[0])
    } else {
        None
    };

    let Some(section) = text_section else {
        return text.to_string();
    };
    let (cleaned, _) = strip_color_and_condition(section);

    let mut out = String::with_capacity(cleaned.len() + text.len());
    let chars: Vec<char> = cleaned.chars().collect();
    let mut in_quotes = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if in_quotes {
            out.push(ch);
            i += 1;
            continue;
        }
        match ch {
            '@' => out.push_str(text),
            '\\' if i + 1 < chars.len() => {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '_' if i + 1 < chars.len() => {
                out.push(' ');
                i += 2;
                continue;
            }
            '*' if i + 1 < chars.len() => {
                i += 2;
                continue;
            }
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Returns true iff the format code contains any date/time token in any
/// section (so numeric cells carrying it should render as dates).
pub fn is_date_format(format_code: &str) -> bool {
    parse_sections(format_code).iter().any(|section| {
        let (cleaned, _) = strip_color_and_condition(section);
        is_date_section(&cleaned)
    })
}

// ------------------------------------------------------------------------
// Section handling
// ------------------------------------------------------------------------

fn parse_sections(format_code: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut prev_backslash = false;

    for (i, ch) in format_code.char_indices() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && ch == ';' {
            sections.push(&format_code[start..i]);
            start = i + 1;
        }
    }
    sections.push(&format_code[start..]);
    sections
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ConditionOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    op: ConditionOp,
    threshold: f64,
}

impl Condition {
    fn matches(&self, value: f64) -> bool {
        match self.op {
            ConditionOp::Gt => value > self.threshold,
            ConditionOp::Ge => value >= self.threshold,
            ConditionOp::Lt => value < self.threshold,
            ConditionOp::Le => value <= self.threshold,
            ConditionOp::Eq => (value - self.threshold).abs() < 1e-12,
            ConditionOp::Ne => (value - self.threshold).abs() >= 1e-12,
        }
    }
}

fn parse_condition(content: &str) -> Option<Condition> {
    let s = content.trim();
    if s.is_empty() {
        return None;
    }

    let (op, rest) = if let Some(r) = s.strip_prefix(">=") {
        (ConditionOp::Ge, r)
    } else if let Some(r) = s.strip_prefix("<=") {
        (ConditionOp::Le, r)
    } else if let Some(r) = s.strip_prefix("<>") {
        (ConditionOp::Ne, r)
    } else if let Some(r) = s.strip_prefix('>') {
        (ConditionOp::Gt, r)
    } else if let Some(r) = s.strip_prefix('<') {
        (ConditionOp::Lt, r)
    } else if let Some(r) = s.strip_prefix('=') {
        (ConditionOp::Eq, r)
    } else {
        return None;
    };

    let threshold: f64 = rest.trim().parse().ok()?;
    Some(Condition { op, threshold })
}

fn extract_condition(section: &str) -> Option<Condition> {
    let mut chars = section.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch == '[' {
            chars.next();
            let mut bracket_content = String::new();
            while let Some(&c) = chars.peek() {
                if c == ']' {
                    chars.next();
                    break;
                }
                bracket_content.push(c);
                chars.next();
            }
            let lower = bracket_content.to_ascii_lowercase();
            let is_known_non_condition = is_color_code(&lower)
                || lower.starts_with("dbnum")
                || lower.starts_with('$')
                || lower.starts_with("natnum")
                || lower.starts_with('h')
                || lower.starts_with("mm")
                || lower.starts_with("ss");
            if !is_known_non_condition {
                if let Some(cond) = parse_condition(&bracket_content) {
                    return Some(cond);
                }
            }
        } else {
            chars.next();
        }
    }
    None
}

/// Pick the format section to apply for a given value.
fn pick_section<'a>(sections: &[&'a str], value: f64) -> &'a str {
    let conditions: Vec<Option<Condition>> =
        sections.iter().map(|s| extract_condition(s)).collect();

    if conditions.iter().any(|c| c.is_some()) {
        for (i, cond) in conditions.iter().enumerate() {
            if let Some(c) = cond {
                if c.matches(value) {
                    return sections[i];
                }
            }
        }
        for (i, cond) in conditions.iter().enumerate() {
            if cond.is_none() {
                return sections[i];
            }
        }
        return sections.last().unwrap_or(&"General");
    }

    match sections.len() {
        0 => "General",
        1 => sections[0],
        2 => {
            if value >= 0.0 {
                sections[0]
            } else {
                sections[1]
            }
        }
        _ => {
            if value > 0.0 {
                sections[0]
            } else if value < 0.0 {
                sections[1]
            } else {
                sections[2]
            }
        }
    }
}

/// Strip color codes and conditional predicates from a format section,
/// returning the cleaned format string and the color name (if any).
/// Elapsed-time brackets (`[h]`, `[mm]`, `[ss]`) stay in place.
fn strip_color_and_condition(section: &str) -> (String, Option<String>) {
    let mut result = String::with_capacity(section.len());
    let mut color = None;
    let mut chars = section.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch == '[' {
            let mut bracket_content = String::new();
            chars.next();
            while let Some(&c) = chars.peek() {
                if c == ']' {
                    chars.next();
                    break;
                }
                bracket_content.push(c);
                chars.next();
            }
            let lower = bracket_content.to_ascii_lowercase();
            if is_color_code(&lower) {
                color = Some(bracket_content);
            } else if lower.starts_with('h') || lower.starts_with("mm") || lower.starts_with("ss")
            {
                result.push('[');
                result.push_str(&bracket_content);
                result.push(']');
            } else if parse_condition(&bracket_content).is_some()
                || lower.starts_with("dbnum")
                || lower.starts_with('$')
                || lower.starts_with("natnum")
            {
                // Condition handled during section selection; locale
                // modifiers are ignored.
            } else {
                result.push('[');
                result.push_str(&bracket_content);
                result.push(']');
            }
        } else {
            result.push(ch);
            chars.next();
        }
    }

    (result, color)
}

fn is_color_code(lower: &str) -> bool {
    matches!(
        lower,
        "red" | "blue" | "green" | "yellow" | "cyan" | "magenta" | "white" | "black"
    ) || (lower.starts_with("color")
        && lower[5..].parse::<u32>().map(|n| n >= 1 && n <= 56).unwrap_or(false))
}

// ------------------------------------------------------------------------
// General format
// ------------------------------------------------------------------------

fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let abs = value.abs();
    if (1e-4..1e15).contains(&abs) {
        // General shows up to ~11 significant digits.
        let s = format!("{:.10}", value);
        trim_trailing_zeros(&s)
    } else if abs < 1e-4 && abs > 0.0 {
        format!("{:.6E}", value)
    } else {
        format!("{}", value)
    }
}

fn trim_trailing_zeros(s: &str) -> String {
    if let Some(dot) = s.find('.') {
        let trimmed = s.trim_end_matches('0');
        if trimmed.len() == dot + 1 {
            trimmed[..dot].to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s.to_string()
    }
}

// ------------------------------------------------------------------------
// Date/time formatting
// ------------------------------------------------------------------------

fn is_date_section(format: &str) -> bool {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    for ch in format.chars() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        match ch {
            '\\' => prev_backslash = true,
            '"' => in_quotes = !in_quotes,
            c if !in_quotes => {
                if matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Calendar components of a serial date, with the phantom 1900-02-29
/// rendered as written.
fn date_components(serial: f64, date1904: bool) -> Option<(i32, u32, u32, usize)> {
    let s = if date1904 { serial + 1462.0 } else { serial };
    if s < 0.0 || s > crate::datetime::MAX_SERIAL {
        return None;
    }
    let date = s.floor() as i64;
    if date == 60 && !date1904 {
        // The fictional Lotus leap day renders as written.
        return Some((1900, 2, 29, 3));
    }
    let adjusted = if date > 60 { date - 1 } else { date };
    let nd =
        NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_signed(Duration::days(adjusted))?;
    Some((
        nd.year(),
        nd.month(),
        nd.day(),
        nd.weekday().num_days_from_monday() as usize,
    ))
}

fn format_date_time(value: f64, format: &str, date1904: bool) -> Option<String> {
    if value < 0.0 {
        return None;
    }

    let int_part = value.floor() as i64;
    let frac = value.fract();

    // Fractional-second tokens need the un-rounded seconds value.
    let has_subsec = has_fractional_seconds(format);
    let raw_seconds = frac * 86_400.0;
    let total_seconds = if has_subsec {
        raw_seconds.floor() as u64
    } else {
        raw_seconds.round() as u64
    };
    let mut hours = (total_seconds / 3600) as u32;
    let minutes = ((total_seconds % 3600) / 60) as u32;
    let seconds = (total_seconds % 60) as u32;
    let subsec = raw_seconds - total_seconds as f64;

    let (year, month, day, weekday) = date_components(value, date1904)?;

    let lower_fmt = format.to_ascii_lowercase();
    let has_ampm = lower_fmt.contains("am/pm") || lower_fmt.contains("a/p");
    let mut ampm_str = "";
    if has_ampm {
        if hours == 0 {
            hours = 12;
            ampm_str = "AM";
        } else if hours < 12 {
            ampm_str = "AM";
        } else if hours == 12 {
            ampm_str = "PM";
        } else {
            hours -= 12;
            ampm_str = "PM";
        }
    }

    const MONTHS_SHORT: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    const MONTHS_LONG: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    const DAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    const DAYS_LONG: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    let mut result = String::with_capacity(format.len() * 2);
    let chars: Vec<char> = format.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let mut in_quotes = false;

    while i < len {
        let ch = chars[i];

        if ch == '"' {
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if in_quotes {
            result.push(ch);
            i += 1;
            continue;
        }
        if ch == '\\' && i + 1 < len {
            result.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if ch == '_' && i + 1 < len {
            result.push(' ');
            i += 2;
            continue;
        }
        if ch == '*' && i + 1 < len {
            i += 2;
            continue;
        }

        // Elapsed-time brackets [h], [mm], [ss].
        if ch == '[' && i + 1 < len {
            let inner = chars[i + 1].to_ascii_lowercase();
            let count = count_char(&chars, i + 1, chars[i + 1]);
            let end = i + 1 + count;
            if end < len && chars[end] == ']' {
                match inner {
                    'h' => {
                        let elapsed = (int_part as u64) * 24 + total_seconds / 3600;
                        result.push_str(&pad_number(elapsed, count));
                        i = end + 1;
                        continue;
                    }
                    'm' => {
                        let elapsed = (int_part as u64) * 1440 + total_seconds / 60;
                        result.push_str(&pad_number(elapsed, count));
                        i = end + 1;
                        continue;
                    }
                    's' => {
                        let elapsed = (int_part as u64) * 86_400 + total_seconds;
                        result.push_str(&pad_number(elapsed, count));
                        i = end + 1;
                        continue;
                    }
                    _ => {}
                }
            }
            result.push(ch);
            i += 1;
            continue;
        }

        let lower = ch.to_ascii_lowercase();

        if lower == 'y' {
            let count = count_char(&chars, i, 'y');
            if count <= 2 {
                result.push_str(&format!("{:02}", year % 100));
            } else {
                result.push_str(&format!("{:04}", year));
            }
            i += count;
            continue;
        }

        if lower == 'm' {
            let count = count_char(&chars, i, 'm');
            if is_minute_context(&chars, i) {
                if count == 1 {
                    result.push_str(&minutes.to_string());
                } else {
                    result.push_str(&format!("{:02}", minutes));
                }
            } else {
                match count {
                    1 => result.push_str(&month.to_string()),
                    2 => result.push_str(&format!("{:02}", month)),
                    3 => result.push_str(MONTHS_SHORT[(month - 1) as usize]),
                    4 => result.push_str(MONTHS_LONG[(month - 1) as usize]),
                    5 => result.push_str(&MONTHS_SHORT[(month - 1) as usize][..1]),
                    _ => result.push_str(&format!("{:02}", month)),
                }
            }
            i += count;
            continue;
        }

        if lower == 'd' {
            let count = count_char(&chars, i, 'd');
            match count {
                1 => result.push_str(&day.to_string()),
                2 => result.push_str(&format!("{:02}", day)),
                3 => result.push_str(DAYS_SHORT[weekday]),
                _ => result.push_str(DAYS_LONG[weekday]),
            }
            i += count;
            continue;
        }

        if lower == 'h' {
            let count = count_char(&chars, i, 'h');
            if count == 1 {
                result.push_str(&hours.to_string());
            } else {
                result.push_str(&format!("{:02}", hours));
            }
            i += count;
            continue;
        }

        if lower == 's' {
            let count = count_char(&chars, i, 's');
            if count == 1 {
                result.push_str(&seconds.to_string());
            } else {
                result.push_str(&format!("{:02}", seconds));
            }
            i += count;
            continue;
        }

        if lower == 'a' {
            if i + 4 < len {
                let slice: String = chars[i..i + 5].iter().collect();
                if slice.eq_ignore_ascii_case("AM/PM") {
                    result.push_str(ampm_str);
                    i += 5;
                    continue;
                }
            }
            if i + 2 < len {
                let slice: String = chars[i..i + 3].iter().collect();
                if slice.eq_ignore_ascii_case("A/P") {
                    result.push(if ampm_str == "PM" { 'P' } else { 'A' });
                    i += 3;
                    continue;
                }
            }
            result.push(ch);
            i += 1;
            continue;
        }

        // Fractional seconds: '.0' after a seconds token.
        if ch == '.' && i + 1 < len && chars[i + 1] == '0' {
            result.push('.');
            let count = count_char(&chars, i + 1, '0');
            let digits = format!("{:.*}", count, subsec.abs());
            if let Some(dot_pos) = digits.find('.') {
                result.push_str(&digits[dot_pos + 1..]);
            }
            i += 1 + count;
            continue;
        }

        result.push(ch);
        i += 1;
    }

    Some(result)
}

fn has_fractional_seconds(format: &str) -> bool {
    let chars: Vec<char> = format.chars().collect();
    let mut in_quotes = false;
    for i in 0..chars.len() {
        let ch = chars[i];
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && ch == '.' && i + 1 < chars.len() && chars[i + 1] == '0' {
            return true;
        }
    }
    false
}

fn pad_number(n: u64, width: usize) -> String {
    format!("{:0>width$}", n, width = width)
}

/// Whether an `m` run at `pos` means minutes: there is an `h` just before
/// it or an `s` just after it (skipping separators).
fn is_minute_context(chars: &[char], pos: usize) -> bool {
    let mut j = pos;
    while j > 0 {
        j -= 1;
        let c = chars[j].to_ascii_lowercase();
        if c == 'h' {
            return true;
        }
        if c == ':' || c == ' ' || c == ']' || c == '[' {
            continue;
        }
        break;
    }
    let m_count = count_char(chars, pos, 'm');
    let mut k = pos + m_count;
    while k < chars.len() {
        let c = chars[k].to_ascii_lowercase();
        if c == 's' {
            return true;
        }
        if c == ':' || c == ' ' || c == '[' {
            k += 1;
            continue;
        }
        break;
    }
    false
}

fn count_char(chars: &[char], start: usize, target: char) -> usize {
    let lower_target = target.to_ascii_lowercase();
    let mut count = 0;
    let mut i = start;
    while i < chars.len() && chars[i].to_ascii_lowercase() == lower_target {
        count += 1;
        i += 1;
    }
    count
}

// ------------------------------------------------------------------------
// Numeric formatting
// ------------------------------------------------------------------------

/// Round half away from zero to `places` decimal places. A small nudge
/// absorbs binary representation error so decimal halves (1.005 at two
/// places) land on the away side.
fn round_half_away(value: f64, places: usize) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    let nudged = scaled + scaled.signum() * 1e-9;
    nudged.round() / factor
}

fn format_numeric(value: f64, format: &str) -> String {
    let is_negative = value < 0.0;
    let abs_val = value.abs();

    let has_percent = format_has_unquoted_char(format, '%');
    let display_val = if has_percent { abs_val * 100.0 } else { abs_val };

    let decimal_places = count_decimal_places(format);
    let has_comma_grouping = has_thousands_separator(format);

    // Each comma after the last digit placeholder scales down by 1000.
    let trailing_comma_count = count_trailing_commas(format);
    let display_val = display_val / 1000f64.powi(trailing_comma_count as i32);

    let rounded = round_half_away(display_val, decimal_places);
    let int_part = rounded.trunc() as u64;
    let frac_part =
        ((rounded - rounded.trunc()).abs() * 10f64.powi(decimal_places as i32)).round() as u64;

    let int_str = int_part.to_string();
    let int_display = if has_comma_grouping {
        add_thousands_separators(&int_str)
    } else {
        int_str
    };

    let min_int_digits = count_integer_zeros(format);
    let padded_int = if int_part == 0 && min_int_digits == 0 {
        // '#' with a zero integer part shows nothing before the point.
        String::new()
    } else if int_display.len() < min_int_digits {
        let mut s = "0".repeat(min_int_digits - int_display.len());
        s.push_str(&int_display);
        if has_comma_grouping {
            add_thousands_separators(&s)
        } else {
            s
        }
    } else {
        int_display
    };

    let number_string = if decimal_places > 0 {
        format!(
            "{}.{:0>width$}",
            padded_int,
            frac_part,
            width = decimal_places
        )
    } else {
        padded_int.clone()
    };

    // Walk the pattern, splicing the rendered number at the first run of
    // digit placeholders.
    let mut output = String::with_capacity(format.len() + 10);
    let chars: Vec<char> = format.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let mut in_quotes = false;
    let mut number_placed = false;

    while i < len {
        let ch = chars[i];

        if ch == '"' {
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if in_quotes {
            output.push(ch);
            i += 1;
            continue;
        }
        if ch == '\\' && i + 1 < len {
            output.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if ch == '_' && i + 1 < len {
            output.push(' ');
            i += 2;
            continue;
        }
        if ch == '*' && i + 1 < len {
            i += 2;
            continue;
        }

        if (ch == '0' || ch == '#' || ch == '?' || ch == ',' || ch == '.') && !number_placed {
            let num_end = find_numeric_end(&chars, i);
            if is_negative {
                output.push('-');
            }
            output.push_str(&number_string);
            number_placed = true;
            i = num_end;
            continue;
        }

        if (ch == '0' || ch == '#' || ch == '?' || ch == ',' || ch == '.') && number_placed {
            i += 1;
            continue;
        }

        output.push(ch);
        i += 1;
    }

    if !number_placed {
        let has_digit_placeholder = format.chars().any(|c| c == '0' || c == '#');
        if has_digit_placeholder {
            if is_negative {
                output.push('-');
            }
            output.push_str(&number_string);
        }
    }

    output
}

fn format_has_unquoted_char(format: &str, target: char) -> bool {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    for ch in format.chars() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && ch == target {
            return true;
        }
    }
    false
}

fn count_decimal_places(format: &str) -> usize {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    let mut found_dot = false;
    let mut count = 0;

    for ch in format.chars() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if ch == '.' && !found_dot {
            found_dot = true;
            continue;
        }
        if found_dot {
            if ch == '0' || ch == '#' || ch == '?' {
                count += 1;
            } else {
                break;
            }
        }
    }
    count
}

fn has_thousands_separator(format: &str) -> bool {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    let chars: Vec<char> = format.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if ch == ',' {
            let has_digit_before = chars[..i].iter().rev().any(|&c| c == '0' || c == '#');
            let has_digit_after = chars[i + 1..].iter().any(|&c| c == '0' || c == '#');
            if has_digit_before && has_digit_after {
                return true;
            }
        }
    }
    false
}

fn count_trailing_commas(format: &str) -> usize {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    let chars: Vec<char> = format.chars().collect();

    let mut last_digit_pos = None;
    for (i, &ch) in chars.iter().enumerate() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if ch == '0' || ch == '#' {
            last_digit_pos = Some(i);
        }
    }

    let mut count = 0;
    if let Some(pos) = last_digit_pos {
        for &ch in &chars[pos + 1..] {
            if ch == ',' {
                count += 1;
            } else {
                break;
            }
        }
    }
    count
}

fn count_integer_zeros(format: &str) -> usize {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    let mut count = 0;

    for ch in format.chars() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if ch == '.' {
            break;
        }
        if ch == '0' {
            count += 1;
        }
    }
    count
}

fn add_thousands_separators(s: &str) -> String {
    let len = s.len();
    if len <= 3 {
        return s.to_string();
    }
    let mut result = String::with_capacity(len + len / 3);
    let remainder = len % 3;
    if remainder > 0 {
        result.push_str(&s[..remainder]);
        result.push(',');
    }
    for (i, chunk) in s.as_bytes()[remainder..].chunks(3).enumerate() {
        if i > 0 {
            result.push(',');
        }
        result.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    result
}

fn find_numeric_end(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '0' | '#' | '?' | ',' | '.' => i += 1,
            _ => break,
        }
    }
    i
}

fn format_scientific(value: f64, format: &str) -> String {
    let decimal_places = count_decimal_places(format);
    let formatted = format!("{:.*E}", decimal_places, value.abs());

    let Some((mantissa, exp_str)) = formatted.split_once('E') else {
        return formatted;
    };
    let exp: i32 = exp_str.parse().unwrap_or(0);

    let exp_width = count_exponent_zeros(format).max(1);
    let has_plus = format.contains("E+") || format.contains("e+");
    let exp_sign = if exp >= 0 {
        if has_plus {
            "+"
        } else {
            ""
        }
    } else {
        "-"
    };

    let exp_display = format!(
        "{}{:0>width$}",
        exp_sign,
        exp.unsigned_abs(),
        width = exp_width
    );
    let sign = if value < 0.0 { "-" } else { "" };
    let e_char = if format_has_unquoted_char(format, 'e') {
        'e'
    } else {
        'E'
    };

    format!("{sign}{mantissa}{e_char}{exp_display}")
}

fn count_exponent_zeros(format: &str) -> usize {
    let upper = format.to_uppercase();
    if let Some(pos) = upper.find("E+").or_else(|| upper.find("E-")) {
        format[pos + 2..].chars().take_while(|&c| c == '0').count()
    } else {
        2
    }
}

fn format_fraction(value: f64, format: &str) -> String {
    let abs = value.abs();
    let whole = abs.floor() as i64;
    let frac = abs - whole as f64;
    let sign = if value < 0.0 { "-" } else { "" };

    let denom_q_count = format
        .split('/')
        .nth(1)
        .map(|s| s.chars().filter(|&c| c == '?').count())
        .unwrap_or(1);
    let max_denom: u64 = match denom_q_count {
        0 | 1 => 9,
        2 => 99,
        3 => 999,
        _ => 9999,
    };

    let has_whole = format.contains('#');

    if frac < 1e-10 {
        return format!("{sign}{whole}");
    }

    let (num, den) = best_fraction(frac, max_denom);

    if has_whole {
        if whole > 0 {
            format!("{sign}{whole} {num}/{den}")
        } else {
            format!("{sign}{num}/{den}")
        }
    } else {
        let total_num = whole as u64 * den + num;
        format!("{sign}{total_num}/{den}")
    }
}

fn best_fraction(value: f64, max_denom: u64) -> (u64, u64) {
    if value <= 0.0 {
        return (0, 1);
    }
    let mut best_num = 0u64;
    let mut best_den = 1u64;
    let mut best_err = value.abs();

    for den in 1..=max_denom {
        let num = (value * den as f64).round() as u64;
        if num == 0 {
            continue;
        }
        let err = (value - num as f64 / den as f64).abs();
        if err < best_err {
            best_err = err;
            best_num = num;
            best_den = den;
        }
        if best_err < 1e-10 {
            break;
        }
    }
    (best_num, best_den)
}
