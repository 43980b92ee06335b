//! Rows-of-records conversions.
//!
//! Records are order-preserving maps from column key to cell value; the
//! header row derives from an explicit key list or the union of observed
//! keys in first-seen order.

use indexmap::IndexMap;

use crate::cell::{error_codes, Cell, CellValue, NumberFormat};
use crate::convert::aoa::Origin;
use crate::convert::cell_display_text;
use crate::datetime::{datetime_to_serial, local_to_utc, serial_to_datetime, utc_to_local};
use crate::error::Result;
use crate::numfmt::{self, FormatTable};
use crate::sheet::Worksheet;
use crate::utils::cell_ref::{column_index_to_name, CellRef};

/// One record: column key -> value, insertion-ordered.
pub type Record = IndexMap<String, CellValue>;

/// One exported row: the record plus its 0-based source row.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub row: u32,
    pub fields: Record,
}

/// How [`sheet_to_records`] derives column keys.
#[derive(Debug, Clone, Default)]
pub enum HeaderMode {
    /// Keys come from row 0, deduplicated with `_N` suffixes; data starts
    /// at row 1.
    #[default]
    Infer,
    /// Keys are 0-based column indices; data starts at row 0.
    Index,
    /// Keys are column letters; data starts at row 0.
    Letters,
    /// Explicit keys; data starts at row 0.
    Explicit(Vec<String>),
}

/// Options shared by the record importer and exporter.
#[derive(Debug, Clone, Default)]
pub struct RecordsOptions {
    pub header: HeaderMode,
    /// Importer: suppress the header row.
    pub skip_header: bool,
    pub origin: Origin,
    /// Importer: keep dates as date cells.
    pub cell_dates: bool,
    /// Exporter: format values as display text instead of raw values.
    pub formatted: bool,
    /// Exporter: keep numeric cells raw even when `formatted` is set.
    pub raw_numbers: bool,
    /// Exporter: value used for missing cells; absent keys are omitted.
    pub defval: Option<CellValue>,
    /// Exporter: keep entirely-empty rows.
    pub blankrows: bool,
    /// Date components are already UTC; skip the local/UTC shifts.
    pub utc: bool,
    pub date1904: bool,
}

/// Build a sheet from records.
pub fn sheet_from_records(
    records: &[Record],
    headers: Option<&[String]>,
    opts: &RecordsOptions,
) -> Result<Worksheet> {
    let mut ws = Worksheet::new();
    sheet_add_records(&mut ws, records, headers, opts)?;
    Ok(ws)
}

/// Add records to a sheet. Columns follow the header order; keys a record
/// lacks leave gaps.
pub fn sheet_add_records(
    ws: &mut Worksheet,
    records: &[Record],
    headers: Option<&[String]>,
    opts: &RecordsOptions,
) -> Result<()> {
    // Header: explicit list, or the union of keys in first-seen order.
    let keys: Vec<String> = match headers {
        Some(list) => list.to_vec(),
        None => {
            let mut keys: Vec<String> = Vec::new();
            for record in records {
                for key in record.keys() {
                    if !keys.iter().any(|k| k == key) {
                        keys.push(key.clone());
                    }
                }
            }
            keys
        }
    };

    let origin = match opts.origin {
        Origin::Start => CellRef::new(0, 0),
        Origin::At(at) => at,
        Origin::Append => CellRef::new(0, ws.dimension.map(|d| d.end.row + 1).unwrap_or(0)),
    };

    let mut row = origin.row;
    if !opts.skip_header {
        for (c, key) in keys.iter().enumerate() {
            ws.insert(
                CellRef::new(origin.col + c as u32, row),
                Cell::new(CellValue::Text(key.clone())),
            );
        }
        row += 1;
    }

    for record in records {
        for (c, key) in keys.iter().enumerate() {
            let Some(value) = record.get(key) else {
                continue;
            };
            let at = CellRef::new(origin.col + c as u32, row);
            let cell = match value {
                CellValue::DateTime(dt) => {
                    // Wall-clock input shifts to UTC unless flagged.
                    let dt = if opts.utc { *dt } else { local_to_utc(*dt) };
                    if opts.cell_dates {
                        Cell::new(CellValue::DateTime(dt))
                    } else {
                        let mut cell =
                            Cell::new(CellValue::Number(datetime_to_serial(dt, opts.date1904)));
                        cell.num_fmt = Some(NumberFormat::Id(14));
                        cell
                    }
                }
                other => Cell::new(other.clone()),
            };
            ws.insert(at, cell);
        }
        row += 1;
    }
    Ok(())
}

/// Convert a sheet's used range to records per the header mode.
pub fn sheet_to_records(ws: &Worksheet, opts: &RecordsOptions) -> Result<Vec<RecordRow>> {
    let Some(range) = ws.dimension else {
        return Ok(Vec::new());
    };
    let table = FormatTable::new();

    let col_count = (range.end.col - range.start.col + 1) as usize;
    let (keys, data_start) = match &opts.header {
        HeaderMode::Infer => {
            let mut keys: Vec<String> = Vec::with_capacity(col_count);
            for col in range.start.col..=range.end.col {
                let base = ws
                    .get(CellRef::new(col, range.start.row))
                    .map(|c| cell_display_text(c, &table, opts.date1904))
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| {
                        column_index_to_name(col).unwrap_or_else(|_| "UNKNOWN".to_string())
                    });
                // Collisions pick up a _N suffix.
                let mut key = base.clone();
                let mut n = 1;
                while keys.contains(&key) {
                    key = format!("{base}_{n}");
                    n += 1;
                }
                keys.push(key);
            }
            (keys, range.start.row + 1)
        }
        HeaderMode::Index => (
            (0..col_count).map(|c| c.to_string()).collect(),
            range.start.row,
        ),
        HeaderMode::Letters => {
            let mut keys = Vec::with_capacity(col_count);
            for col in range.start.col..=range.end.col {
                keys.push(column_index_to_name(col)?);
            }
            (keys, range.start.row)
        }
        HeaderMode::Explicit(list) => (list.clone(), range.start.row),
    };

    let mut out = Vec::new();
    for row in data_start..=range.end.row {
        let mut fields = Record::new();
        let mut saw_value = false;

        for (i, col) in (range.start.col..=range.end.col).enumerate() {
            let Some(key) = keys.get(i) else {
                continue;
            };
            let cell = ws.get(CellRef::new(col, row));
            let Some(cell) = cell else {
                if let Some(ref defval) = opts.defval {
                    fields.insert(key.clone(), defval.clone());
                }
                continue;
            };

            let Some(value) = export_value(cell, &table, opts) else {
                if let Some(ref defval) = opts.defval {
                    fields.insert(key.clone(), defval.clone());
                }
                continue;
            };
            saw_value = true;
            fields.insert(key.clone(), value);
        }

        if saw_value || opts.blankrows {
            out.push(RecordRow { row, fields });
        }
    }
    Ok(out)
}

/// Export one cell value per the row-value semantics: stubs and most error
/// cells drop out, date-formatted numbers promote to dates, and `formatted`
/// swaps values for display text.
fn export_value(cell: &Cell, table: &FormatTable, opts: &RecordsOptions) -> Option<CellValue> {
    match &cell.value {
        CellValue::Empty => None,
        CellValue::Error(code) => {
            // A #NULL! error exports as an empty value; others drop.
            if *code == error_codes::NULL {
                Some(CellValue::Empty)
            } else {
                None
            }
        }
        CellValue::Number(n) => {
            let date_fmt = match &cell.num_fmt {
                Some(NumberFormat::Code(code)) => numfmt::is_date_format(code),
                Some(NumberFormat::Id(id)) => table
                    .code_for(*id)
                    .map(|c| numfmt::is_date_format(&c))
                    .unwrap_or(false),
                None => false,
            };
            if date_fmt && !(opts.formatted && !opts.raw_numbers) {
                if let Some(dt) = serial_to_datetime(*n, opts.date1904) {
                    // Serial dates are UTC; shift to local unless flagged.
                    let dt = if opts.utc { dt } else { utc_to_local(dt) };
                    return Some(CellValue::DateTime(dt));
                }
            }
            if opts.formatted && !opts.raw_numbers {
                Some(CellValue::Text(cell_display_text(cell, table, opts.date1904)))
            } else {
                Some(CellValue::Number(*n))
            }
        }
        CellValue::DateTime(dt) => {
            if opts.formatted {
                Some(CellValue::Text(cell_display_text(cell, table, opts.date1904)))
            } else {
                let dt = if opts.utc { *dt } else { utc_to_local(*dt) };
                Some(CellValue::DateTime(dt))
            }
        }
        value => {
            if opts.formatted && !matches!(value, CellValue::Text(_)) {
                Some(CellValue::Text(cell_display_text(cell, table, opts.date1904)))
            } else {
                Some(value.clone())
            }
        }
    }
}
