//! Formula text transforms.
//!
//! Rewrites between R1C1 and A1 reference styles, shifts relative
//! references (the operation that materializes shared formulas into their
//! non-origin cells), and strips the `_xlfn.` future-function prefix.
//! No evaluation happens here; formulas are carried as text.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::utils::cell_ref::{
    column_index_to_name, column_name_to_index, decode_cell_ref, decode_range,
};
use crate::utils::constants::{MAX_COLUMNS, MAX_ROWS};

fn r1c1_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)R(\[-?\d+\]|\d+)?C(\[-?\d+\]|\d+)?").expect("valid R1C1 regex")
    })
}

fn a1_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\$?)([A-Za-z]{1,3})(\$?)([1-9]\d*)").expect("valid A1 regex")
    })
}

fn is_boundary(b: Option<u8>) -> bool {
    match b {
        None => true,
        Some(b) => !(b.is_ascii_alphanumeric() || b == b'_' || b == b'.'),
    }
}

/// Positions inside double-quoted string literals, so reference rewrites
/// leave them alone.
fn quoted_mask(text: &str) -> Vec<bool> {
    let mut mask = vec![false; text.len()];
    let mut in_quotes = false;
    for (i, b) in text.bytes().enumerate() {
        if b == b'"' {
            in_quotes = !in_quotes;
            mask[i] = true;
        } else {
            mask[i] = in_quotes;
        }
    }
    mask
}

/// Rewrite R1C1-style tokens to A1 relative to `base` (0-based col, row).
///
/// Absolute tokens (`R1C1`) become `$`-anchored references; bracketed
/// offsets (`R[1]C[-1]`) and bare `RC` resolve against the base cell.
pub fn rc_to_a1(formula: &str, base_col: u32, base_row: u32) -> Result<String> {
    let mask = quoted_mask(formula);
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;

    for caps in r1c1_token_re().captures_iter(formula) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        let (start, end) = (m.start(), m.end());
        if start < last {
            continue;
        }
        let prev = formula.as_bytes().get(start.wrapping_sub(1)).copied();
        let next = formula.as_bytes().get(end).copied();
        if mask[start] || (start > 0 && !is_boundary(prev)) || !is_boundary(next) {
            continue;
        }

        let (row, abs_row) = match caps.get(1).map(|g| g.as_str()) {
            None => (i64::from(base_row), false),
            Some(tok) if tok.starts_with('[') => {
                let delta: i64 = tok[1..tok.len() - 1]
                    .parse()
                    .map_err(|_| Error::InvalidCellReference(tok.to_string()))?;
                (i64::from(base_row) + delta, false)
            }
            Some(tok) => {
                let n: i64 = tok
                    .parse()
                    .map_err(|_| Error::InvalidCellReference(tok.to_string()))?;
                (n - 1, true)
            }
        };
        let (col, abs_col) = match caps.get(2).map(|g| g.as_str()) {
            None => (i64::from(base_col), false),
            Some(tok) if tok.starts_with('[') => {
                let delta: i64 = tok[1..tok.len() - 1]
                    .parse()
                    .map_err(|_| Error::InvalidCellReference(tok.to_string()))?;
                (i64::from(base_col) + delta, false)
            }
            Some(tok) => {
                let n: i64 = tok
                    .parse()
                    .map_err(|_| Error::InvalidCellReference(tok.to_string()))?;
                (n - 1, true)
            }
        };

        if row < 0 || row >= i64::from(MAX_ROWS) || col < 0 || col >= i64::from(MAX_COLUMNS) {
            return Err(Error::InvalidCellReference(m.as_str().to_string()));
        }

        out.push_str(&formula[last..start]);
        if abs_col {
            out.push('$');
        }
        out.push_str(&column_index_to_name(col as u32)?);
        if abs_row {
            out.push('$');
        }
        out.push_str(&(row + 1).to_string());
        last = end;
    }
    out.push_str(&formula[last..]);
    Ok(out)
}

/// Rewrite A1-style references to R1C1 relative to `base` (0-based col,
/// row): the inverse of [`rc_to_a1`]. Absolute parts become 1-based
/// literals; relative parts become `[offset]`, omitted for zero.
pub fn a1_to_rc(formula: &str, base_col: u32, base_row: u32) -> Result<String> {
    let mask = quoted_mask(formula);
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;

    for caps in a1_token_re().captures_iter(formula) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        let (start, end) = (m.start(), m.end());
        if start < last {
            continue;
        }
        let prev = formula.as_bytes().get(start.wrapping_sub(1)).copied();
        let next = formula.as_bytes().get(end).copied();
        // A trailing '(' marks a function call (LOG10(...)), not a ref.
        if mask[start]
            || (start > 0 && !is_boundary(prev))
            || !is_boundary(next)
            || next == Some(b'(')
        {
            continue;
        }

        let abs_col = !caps[1].is_empty();
        let abs_row = !caps[3].is_empty();
        let Ok(col) = column_name_to_index(&caps[2]) else {
            continue;
        };
        let Ok(row_1) = caps[4].parse::<u32>() else {
            continue;
        };
        if row_1 > MAX_ROWS {
            continue;
        }
        let row = row_1 - 1;

        out.push_str(&formula[last..start]);
        out.push('R');
        if abs_row {
            out.push_str(&row_1.to_string());
        } else {
            let delta = i64::from(row) - i64::from(base_row);
            if delta != 0 {
                out.push_str(&format!("[{delta}]"));
            }
        }
        out.push('C');
        if abs_col {
            out.push_str(&(col + 1).to_string());
        } else {
            let delta = i64::from(col) - i64::from(base_col);
            if delta != 0 {
                out.push_str(&format!("[{delta}]"));
            }
        }
        last = end;
    }
    out.push_str(&formula[last..]);
    Ok(out)
}

/// Shift every relative A1 reference in `formula` by `(d_col, d_row)`.
/// `$`-anchored components are untouched. References that would move off
/// the grid collapse to `#REF!`.
pub fn shift_formula(formula: &str, d_col: i64, d_row: i64) -> Result<String> {
    let mask = quoted_mask(formula);
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;

    for caps in a1_token_re().captures_iter(formula) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        let (start, end) = (m.start(), m.end());
        if start < last {
            continue;
        }
        let prev = formula.as_bytes().get(start.wrapping_sub(1)).copied();
        let next = formula.as_bytes().get(end).copied();
        // A trailing '(' marks a function call (LOG10(...)), not a ref.
        if mask[start]
            || (start > 0 && !is_boundary(prev))
            || !is_boundary(next)
            || next == Some(b'(')
        {
            continue;
        }

        let abs_col = !caps[1].is_empty();
        let abs_row = !caps[3].is_empty();
        let Ok(col) = column_name_to_index(&caps[2]) else {
            continue;
        };
        let Ok(row_1) = caps[4].parse::<u32>() else {
            continue;
        };
        if row_1 > MAX_ROWS {
            continue;
        }

        let new_col = if abs_col {
            i64::from(col)
        } else {
            i64::from(col) + d_col
        };
        let new_row = if abs_row {
            i64::from(row_1) - 1
        } else {
            i64::from(row_1) - 1 + d_row
        };

        out.push_str(&formula[last..start]);
        if new_col < 0
            || new_col >= i64::from(MAX_COLUMNS)
            || new_row < 0
            || new_row >= i64::from(MAX_ROWS)
        {
            out.push_str("#REF!");
        } else {
            if abs_col {
                out.push('$');
            }
            out.push_str(&column_index_to_name(new_col as u32)?);
            if abs_row {
                out.push('$');
            }
            out.push_str(&(new_row + 1).to_string());
        }
        last = end;
    }
    out.push_str(&formula[last..]);
    Ok(out)
}

/// Shift a shared formula from the group range's origin to `cell`: the
/// delta is `cell - range.start`.
pub fn shift_formula_for_cell(formula: &str, range: &str, cell: &str) -> Result<String> {
    let range = decode_range(range)?;
    let cell = decode_cell_ref(cell)?;
    let d_col = i64::from(cell.col) - i64::from(range.start.col);
    let d_row = i64::from(cell.row) - i64::from(range.start.row);
    shift_formula(formula, d_col, d_row)
}

/// Remove every `_xlfn.` future-function prefix.
pub fn strip_xlfn(formula: &str) -> String {
    formula.replace("_xlfn.", "")
}

/// Heuristic used by text importers: a string longer than one character
/// could be a formula.
pub fn is_fuzzy_formula(formula: &str) -> bool {
    formula.len() > 1
}
