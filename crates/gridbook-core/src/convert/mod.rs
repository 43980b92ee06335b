//! High-level conversions between worksheets and common tabular forms:
//! arrays of arrays, rows of records, CSV/TSV, HTML tables, and the
//! formula listing.

pub mod aoa;
pub mod csv;
pub mod formulae;
pub mod html;
pub mod records;

use crate::cell::{Cell, CellValue, NumberFormat};
use crate::numfmt::{self, FormatTable};

/// Display text for a cell during export: the cached display when present,
/// otherwise the value formatted through the cell's own number format.
/// Formatter trouble falls back to plain string coercion.
pub(crate) fn cell_display_text(cell: &Cell, table: &FormatTable, date1904: bool) -> String {
    if let Some(ref w) = cell.display {
        return w.clone();
    }
    match &cell.value {
        CellValue::Number(n) => match &cell.num_fmt {
            Some(NumberFormat::Code(code)) => numfmt::format_number(*n, code, date1904),
            Some(NumberFormat::Id(id)) => numfmt::format_id(table, *id, *n, date1904),
            None => cell.value.to_string(),
        },
        CellValue::DateTime(dt) => {
            let serial = crate::datetime::datetime_to_serial(*dt, date1904);
            match &cell.num_fmt {
                Some(NumberFormat::Code(code)) => numfmt::format_number(serial, code, date1904),
                Some(NumberFormat::Id(id)) => numfmt::format_id(table, *id, serial, date1904),
                None => numfmt::format_id(table, 14, serial, date1904),
            }
        }
        other => other.to_string(),
    }
}
