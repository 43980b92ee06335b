//! gridbook: reading and writing Excel (.xlsx) workbooks.
//!
//! The core is a codec pipeline: ZIP container, OPC layer (content types,
//! relationships), SpreadsheetML parsers and writers, a typed cell model,
//! a number-format engine, and high-level conversions to arrays, records,
//! CSV/TSV, and HTML.
//!
//! # Quick start
//!
//! ```no_run
//! use gridbook::{read_file, write_file, ReadOptions, WriteOptions};
//!
//! let wb = read_file("input.xlsx", &ReadOptions::default()).unwrap();
//! for name in wb.sheet_names() {
//!     println!("{name}");
//! }
//! write_file(&wb, "output.xlsx", &WriteOptions::default()).unwrap();
//! ```
//!
//! # Known losses
//!
//! - `cell_styles` round-trips number formats; fonts, fills, and borders
//!   beyond the minimal stylesheet do not survive a write.
//! - The dynamic-array flag on array formulas is an in-memory marker; the
//!   writer emits the metadata part but not per-cell markers.

use std::path::Path;

pub use gridbook_core::cell::{
    error_code_from_label, error_code_label, error_codes, Cell, CellValue, Hyperlink,
    NumberFormat, StyleRef,
};
pub use gridbook_core::comment::CellComment;
pub use gridbook_core::convert::aoa::{
    sheet_add_aoa, sheet_from_aoa, AoaCell, AoaOptions, Origin,
};
pub use gridbook_core::convert::csv::{sheet_to_csv, CsvOptions};
pub use gridbook_core::convert::formulae::sheet_to_formulae;
pub use gridbook_core::convert::html::{sheet_to_html, HtmlOptions};
pub use gridbook_core::convert::records::{
    sheet_add_records, sheet_from_records, sheet_to_records, HeaderMode, Record, RecordRow,
    RecordsOptions,
};
pub use gridbook_core::error::{Error, Result};
pub use gridbook_core::sheet::{CellStore, ColInfo, RowInfo, SheetMargins, Worksheet};
pub use gridbook_core::workbook::{
    read_workbook, write_workbook, BookType, CalcChainEntry, DefinedName, OutputKind,
    ReadOptions, SheetInfo, SheetSelector, Visibility, Workbook, WorkbookProps, WriteOptions,
    WriteOutput,
};

/// Utility namespaces re-exported for callers that work with raw
/// references and formats.
pub mod utils {
    pub use gridbook_core::datetime::{
        datetime_to_serial, local_to_utc, serial_to_datetime, utc_to_local,
    };
    pub use gridbook_core::formula::{
        a1_to_rc, is_fuzzy_formula, rc_to_a1, shift_formula, shift_formula_for_cell, strip_xlfn,
    };
    pub use gridbook_core::numfmt::{format_id, format_number, is_date_format, FormatTable};
    pub use gridbook_core::utils::cell_ref::{
        column_index_to_name, column_name_to_index, decode_cell_ref, decode_range,
        encode_cell_ref, encode_range, quote_sheet_name, CellRef, Range,
    };
}

/// Parse an `.xlsx` byte buffer.
pub fn read(data: &[u8], opts: &ReadOptions) -> Result<Workbook> {
    read_workbook(data, opts)
}

/// Read a workbook from disk.
pub fn read_file<P: AsRef<Path>>(path: P, opts: &ReadOptions) -> Result<Workbook> {
    let data = std::fs::read(path.as_ref())?;
    read_workbook(&data, opts)
}

/// Serialize a workbook per the options.
pub fn write(wb: &Workbook, opts: &WriteOptions) -> Result<WriteOutput> {
    write_workbook(wb, opts)
}

/// Write a workbook to disk.
pub fn write_file<P: AsRef<Path>>(wb: &Workbook, path: P, opts: &WriteOptions) -> Result<()> {
    let out = write_workbook(wb, opts)?;
    std::fs::write(path.as_ref(), out.into_bytes())?;
    Ok(())
}
