//! CSV and TSV emission.

use crate::cell::CellValue;
use crate::convert::cell_display_text;
use crate::error::Result;
use crate::numfmt::FormatTable;
use crate::sheet::Worksheet;
use crate::utils::cell_ref::CellRef;

/// Options for [`sheet_to_csv`].
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field separator (`","` for CSV, `"\t"` for TSV).
    pub field_separator: String,
    /// Record separator.
    pub record_separator: String,
    /// Quote every field.
    pub force_quotes: bool,
    /// Keep entirely-empty rows.
    pub blankrows: bool,
    /// Trim trailing empty fields from each record.
    pub strip: bool,
    /// Emit raw numbers instead of formatted display text.
    pub raw_numbers: bool,
    /// Date system for display formatting.
    pub date1904: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            field_separator: ",".to_string(),
            record_separator: "\n".to_string(),
            force_quotes: false,
            blankrows: true,
            strip: false,
            raw_numbers: false,
            date1904: false,
        }
    }
}

/// Render a worksheet's used range as delimited text.
pub fn sheet_to_csv(ws: &Worksheet, opts: &CsvOptions) -> Result<String> {
    let Some(range) = ws.dimension else {
        return Ok(String::new());
    };
    let table = FormatTable::new();
    let mut out = String::new();

    for row in range.start.row..=range.end.row {
        let mut fields: Vec<String> = Vec::with_capacity((range.end.col - range.start.col + 1) as usize);
        for col in range.start.col..=range.end.col {
            let text = match ws.get(CellRef::new(col, row)) {
                Some(cell) => {
                    if opts.raw_numbers && matches!(cell.value, CellValue::Number(_)) {
                        cell.value.to_string()
                    } else {
                        cell_display_text(cell, &table, opts.date1904)
                    }
                }
                None => String::new(),
            };
            // Quoting "ID" at A1 defeats SYLK misdetection downstream.
            let sylk_guard = row == 0 && col == 0 && text == "ID";
            fields.push(quote_field(&text, opts, sylk_guard));
        }

        if opts.strip {
            while fields.last().map(|f| f.is_empty()).unwrap_or(false) {
                fields.pop();
            }
        }
        if !opts.blankrows && fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        out.push_str(&fields.join(&opts.field_separator));
        out.push_str(&opts.record_separator);
    }

    Ok(out)
}

fn quote_field(text: &str, opts: &CsvOptions, force: bool) -> String {
    let needs_quotes = force
        || opts.force_quotes
        || text.contains(&opts.field_separator)
        || text.contains(&opts.record_separator)
        || text.contains('\r')
        || text.contains('\n')
        || text.contains('"');
    if needs_quotes {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
