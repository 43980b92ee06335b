//! Crate-wide constants and limits.

/// Maximum number of columns in a sheet (0-based max index 16_383, "XFD").
pub const MAX_COLUMNS: u32 = 16_384;

/// Maximum number of rows in a sheet (0-based max index 1_048_575).
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum length of a sheet name, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Maximum number of sheets a workbook may hold.
pub const MAX_SHEETS: usize = 65_535;

/// Characters forbidden in sheet names.
pub const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &['\\', '/', '?', '*', '[', ']'];

/// Default column width written when a column carries no explicit width.
pub const DEFAULT_COL_WIDTH: f64 = 9.140625;

/// Default row height used in `sheetFormatPr`.
pub const DEFAULT_ROW_HEIGHT: f64 = 16.0;

/// XML declaration prepended to every XML part in the package.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Highest number-format id a stylesheet may define.
pub const MAX_NUMFMT_ID: u32 = 0x187;
