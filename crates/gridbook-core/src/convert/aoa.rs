//! Array-of-arrays conversions.

use chrono::NaiveDateTime;

use crate::cell::{error_codes, Cell, CellValue, NumberFormat};
use crate::datetime::{datetime_to_serial, local_to_utc};
use crate::error::Result;
use crate::numfmt::FormatTable;
use crate::sheet::Worksheet;
use crate::utils::cell_ref::CellRef;

/// One input value for the array importer. `Skip` leaves the grid position
/// untouched; `Null` follows the null policy from the options.
#[derive(Debug, Clone, PartialEq)]
pub enum AoaCell {
    Skip,
    Null,
    Number(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDateTime),
    /// A value paired with a formula.
    Formula(Box<AoaCell>, String),
    /// A pre-built cell placed verbatim.
    Cell(Cell),
}

impl From<f64> for AoaCell {
    fn from(n: f64) -> Self {
        AoaCell::Number(n)
    }
}

impl From<i32> for AoaCell {
    fn from(n: i32) -> Self {
        AoaCell::Number(f64::from(n))
    }
}

impl From<bool> for AoaCell {
    fn from(b: bool) -> Self {
        AoaCell::Bool(b)
    }
}

impl From<&str> for AoaCell {
    fn from(s: &str) -> Self {
        AoaCell::Text(s.to_string())
    }
}

impl From<String> for AoaCell {
    fn from(s: String) -> Self {
        AoaCell::Text(s)
    }
}

impl From<NaiveDateTime> for AoaCell {
    fn from(dt: NaiveDateTime) -> Self {
        AoaCell::Date(dt)
    }
}

/// Where imported rows land on the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Origin {
    /// The sheet origin (A1).
    #[default]
    Start,
    /// The first row after the current used range.
    Append,
    /// An explicit anchor cell.
    At(CellRef),
}

/// Options for the array importer.
#[derive(Debug, Clone, Default)]
pub struct AoaOptions {
    pub origin: Origin,
    /// Keep dates as date cells instead of serial numbers.
    pub cell_dates: bool,
    /// Nulls become stub cells.
    pub sheet_stubs: bool,
    /// Nulls become `#NULL!` error cells.
    pub null_error: bool,
    /// Date components are already UTC; skip the local shift.
    pub utc: bool,
    pub date1904: bool,
}

/// Build a sheet from rows of values.
pub fn sheet_from_aoa(rows: &[Vec<AoaCell>], opts: &AoaOptions) -> Result<Worksheet> {
    let mut ws = Worksheet::new();
    sheet_add_aoa(&mut ws, rows, opts)?;
    Ok(ws)
}

/// Add rows of values to a sheet at the requested origin. The used range
/// grows only when at least one cell actually lands.
pub fn sheet_add_aoa(ws: &mut Worksheet, rows: &[Vec<AoaCell>], opts: &AoaOptions) -> Result<()> {
    let origin = match opts.origin {
        Origin::Start => CellRef::new(0, 0),
        Origin::At(at) => at,
        Origin::Append => CellRef::new(
            0,
            ws.dimension.map(|d| d.end.row + 1).unwrap_or(0),
        ),
    };

    let table = FormatTable::new();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let at = CellRef::new(origin.col + c as u32, origin.row + r as u32);
            if let Some(cell) = infer_cell(value, opts, &table) {
                ws.insert(at, cell);
            }
        }
    }
    Ok(())
}

/// The type-inference ladder for one input value.
fn infer_cell(value: &AoaCell, opts: &AoaOptions, table: &FormatTable) -> Option<Cell> {
    match value {
        AoaCell::Skip => None,
        AoaCell::Cell(cell) => Some(cell.clone()),
        AoaCell::Null => {
            if opts.null_error {
                Some(Cell::new(CellValue::Error(error_codes::NULL)))
            } else if opts.sheet_stubs {
                Some(Cell::stub())
            } else {
                None
            }
        }
        AoaCell::Number(n) => Some(if n.is_nan() {
            Cell::new(CellValue::Error(error_codes::VALUE))
        } else if n.is_infinite() {
            Cell::new(CellValue::Error(error_codes::DIV0))
        } else {
            Cell::new(CellValue::Number(*n))
        }),
        AoaCell::Bool(b) => Some(Cell::new(CellValue::Bool(*b))),
        AoaCell::Text(s) => Some(Cell::new(CellValue::Text(s.clone()))),
        AoaCell::Date(dt) => {
            // Local wall-clock components shift to UTC unless the caller
            // marks the input as UTC already.
            let dt = if opts.utc { *dt } else { local_to_utc(*dt) };
            let serial = datetime_to_serial(dt, opts.date1904);
            let mut cell = if opts.cell_dates {
                Cell::new(CellValue::DateTime(dt))
            } else {
                Cell::new(CellValue::Number(serial))
            };
            // Short-date default plus precomputed display text.
            if cell.num_fmt.is_none() {
                cell.num_fmt = Some(NumberFormat::Id(14));
            }
            cell.display = Some(crate::numfmt::format_id(table, 14, serial, opts.date1904));
            Some(cell)
        }
        AoaCell::Formula(inner, formula) => {
            let mut cell = match inner.as_ref() {
                // A null value with a formula still types as numeric.
                AoaCell::Null | AoaCell::Skip => Cell::new(CellValue::Empty),
                other => infer_cell(other, opts, table)?,
            };
            cell.formula = Some(formula.clone());
            Some(cell)
        }
    }
}
