//! Cell reference conversion utilities.
//!
//! Provides the [`CellRef`] and [`Range`] coordinate types and the functions
//! for converting between A1-style references (e.g. `"A1"`, `"$AB$100"`,
//! `"A1:C5"`) and 0-based `(col, row)` coordinates.

use std::fmt;

use crate::error::{Error, Result};
use crate::utils::constants::{MAX_COLUMNS, MAX_ROWS};

/// A 0-based cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub col: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match encode_cell_ref(*self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "#REF!"),
        }
    }
}

/// An inclusive 0-based cell range. Invariant: `start.col <= end.col` and
/// `start.row <= end.row`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: CellRef,
    pub end: CellRef,
}

impl Range {
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    /// The range covering a single cell.
    pub fn single(cell: CellRef) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.col >= self.start.col
            && cell.col <= self.end.col
            && cell.row >= self.start.row
            && cell.row <= self.end.row
    }

    /// Grow the range so it covers `cell`.
    pub fn expand_to(&mut self, cell: CellRef) {
        self.start.col = self.start.col.min(cell.col);
        self.start.row = self.start.row.min(cell.row);
        self.end.col = self.end.col.max(cell.col);
        self.end.row = self.end.row.max(cell.row);
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_range(*self))
    }
}

/// Convert a 0-based column index to its letter name.
///
/// # Examples
///
/// ```
/// use gridbook_core::utils::cell_ref::column_index_to_name;
///
/// assert_eq!(column_index_to_name(0).unwrap(), "A");
/// assert_eq!(column_index_to_name(25).unwrap(), "Z");
/// assert_eq!(column_index_to_name(26).unwrap(), "AA");
/// assert_eq!(column_index_to_name(16383).unwrap(), "XFD");
/// ```
pub fn column_index_to_name(col: u32) -> Result<String> {
    if col >= MAX_COLUMNS {
        return Err(Error::InvalidColumnIndex(i64::from(col)));
    }

    let mut n = col + 1;
    let mut result = String::with_capacity(3);
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    Ok(result)
}

/// Convert a column name (e.g. `"A"`, `"Z"`, `"AA"`, `"XFD"`) to a 0-based
/// column index.
///
/// # Examples
///
/// ```
/// use gridbook_core::utils::cell_ref::column_name_to_index;
///
/// assert_eq!(column_name_to_index("A").unwrap(), 0);
/// assert_eq!(column_name_to_index("Z").unwrap(), 25);
/// assert_eq!(column_name_to_index("AA").unwrap(), 26);
/// assert_eq!(column_name_to_index("XFD").unwrap(), 16383);
/// ```
pub fn column_name_to_index(name: &str) -> Result<u32> {
    if name.is_empty() {
        return Err(Error::InvalidCellReference("empty column name".to_string()));
    }

    let mut result: u32 = 0;
    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidCellReference(format!(
                "non-alphabetic character in column name: '{c}'"
            )));
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(digit))
            .ok_or(Error::InvalidColumnIndex(i64::MAX))?;
    }

    if result > MAX_COLUMNS {
        return Err(Error::InvalidColumnIndex(i64::from(result) - 1));
    }
    Ok(result - 1)
}

/// Parse an A1-style cell reference into a 0-based [`CellRef`].
///
/// Absolute-reference markers (`$`) are stripped before parsing.
///
/// # Examples
///
/// ```
/// use gridbook_core::utils::cell_ref::{decode_cell_ref, CellRef};
///
/// assert_eq!(decode_cell_ref("A1").unwrap(), CellRef { col: 0, row: 0 });
/// assert_eq!(decode_cell_ref("$B$3").unwrap(), CellRef { col: 1, row: 2 });
/// ```
pub fn decode_cell_ref(cell: &str) -> Result<CellRef> {
    let bytes = cell.as_bytes();
    let mut i = 0;

    if i < bytes.len() && bytes[i] == b'$' {
        i += 1;
    }
    let col_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    if i == col_start {
        return Err(Error::InvalidCellReference(cell.to_string()));
    }
    let col = column_name_to_index(&cell[col_start..i])?;

    if i < bytes.len() && bytes[i] == b'$' {
        i += 1;
    }
    let row_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if row_start == i || i != bytes.len() {
        return Err(Error::InvalidCellReference(cell.to_string()));
    }
    let row_1based: u32 = cell[row_start..]
        .parse()
        .map_err(|_| Error::InvalidCellReference(cell.to_string()))?;
    if row_1based == 0 || row_1based > MAX_ROWS {
        return Err(Error::InvalidRowIndex(i64::from(row_1based) - 1));
    }

    Ok(CellRef {
        col,
        row: row_1based - 1,
    })
}

/// Encode a 0-based [`CellRef`] as an A1-style reference.
pub fn encode_cell_ref(cell: CellRef) -> Result<String> {
    if cell.row >= MAX_ROWS {
        return Err(Error::InvalidRowIndex(i64::from(cell.row)));
    }
    let col_name = column_index_to_name(cell.col)?;
    Ok(format!("{col_name}{}", cell.row + 1))
}

/// Parse an A1-style range (`"A1:C5"` or single-cell `"B2"`).
pub fn decode_range(range: &str) -> Result<Range> {
    match range.split_once(':') {
        Some((a, b)) => {
            let start = decode_cell_ref(a)?;
            let end = decode_cell_ref(b)?;
            if end.col < start.col || end.row < start.row {
                return Err(Error::InvalidRange(range.to_string()));
            }
            Ok(Range { start, end })
        }
        None => {
            let cell = decode_cell_ref(range)?;
            Ok(Range::single(cell))
        }
    }
}

/// Encode a [`Range`] in A1 notation, collapsing single-cell ranges.
pub fn encode_range(range: Range) -> String {
    let start = encode_cell_ref(range.start).unwrap_or_else(|_| "A1".to_string());
    if range.start == range.end {
        return start;
    }
    let end = encode_cell_ref(range.end).unwrap_or_else(|_| "A1".to_string());
    format!("{start}:{end}")
}

/// Fast-path range decoder for hot loops: parses by byte code, no
/// allocation, no `$` handling. Returns `None` on any malformed input.
pub fn decode_range_fast(bytes: &[u8]) -> Option<Range> {
    let mut idx = 0;

    fn parse_cell(bytes: &[u8], idx: &mut usize) -> Option<CellRef> {
        let mut col: u32 = 0;
        let start = *idx;
        while *idx < bytes.len() {
            let b = bytes[*idx];
            if b.is_ascii_uppercase() {
                col = col * 26 + u32::from(b - b'A') + 1;
            } else if b.is_ascii_lowercase() {
                col = col * 26 + u32::from(b - b'a') + 1;
            } else {
                break;
            }
            *idx += 1;
        }
        if *idx == start || col == 0 || col > MAX_COLUMNS {
            return None;
        }
        let row_start = *idx;
        let mut row: u32 = 0;
        while *idx < bytes.len() {
            let b = bytes[*idx];
            if !b.is_ascii_digit() {
                break;
            }
            row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
            *idx += 1;
        }
        if *idx == row_start || row == 0 || row > MAX_ROWS {
            return None;
        }
        Some(CellRef {
            col: col - 1,
            row: row - 1,
        })
    }

    let start = parse_cell(bytes, &mut idx)?;
    if idx == bytes.len() {
        return Some(Range::single(start));
    }
    if bytes[idx] != b':' {
        return None;
    }
    idx += 1;
    let end = parse_cell(bytes, &mut idx)?;
    if idx != bytes.len() {
        return None;
    }
    Some(Range { start, end })
}

/// Quote a sheet name for use in a formula reference.
///
/// Names made entirely of word characters, CJK unified ideographs
/// (U+4E00..U+9FFF), or Hiragana/Katakana (U+3040..U+30FF) pass through
/// unchanged; anything else is wrapped in single quotes with internal
/// quotes doubled.
pub fn quote_sheet_name(name: &str) -> String {
    let safe = !name.is_empty()
        && name.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c == '_'
                || ('\u{4E00}'..='\u{9FFF}').contains(&c)
                || ('\u{3040}'..='\u{30FF}').contains(&c)
        });
    if safe {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

// =========================================================================
// Tests
// =========================================================================
