//! Formula listing: one `ref=formula` line per non-empty cell, values as
//! literals.

use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Worksheet;
use crate::utils::cell_ref::{decode_range, encode_cell_ref};

/// List the formulas and literal values of a sheet.
///
/// Array formulas emit once, at their origin, keyed by the array range.
/// String literals are prefixed with `'`, booleans render as TRUE/FALSE,
/// and blank cells are skipped.
pub fn sheet_to_formulae(ws: &Worksheet) -> Result<Vec<String>> {
    let mut out = Vec::new();

    for (at, cell) in ws.iter() {
        let a1 = encode_cell_ref(at)?;

        if let Some(ref formula) = cell.formula {
            if let Some(ref range) = cell.array_range {
                let parsed = decode_range(range)?;
                if parsed.start == at {
                    out.push(format!("{range}={formula}"));
                }
                continue;
            }
            out.push(format!("{a1}={formula}"));
            continue;
        }
        if cell.array_range.is_some() {
            // Non-origin member of an array group.
            continue;
        }

        match &cell.value {
            CellValue::Empty => {}
            CellValue::Text(s) => out.push(format!("{a1}='{s}")),
            CellValue::Bool(b) => {
                out.push(format!("{a1}={}", if *b { "TRUE" } else { "FALSE" }))
            }
            value => out.push(format!("{a1}={value}")),
        }
    }

    Ok(out)
}
