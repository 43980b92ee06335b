//! Cell representation: the tagged value plus the attributes a cell can
//! carry (formula, format, hyperlink, comments, style binding).

use std::fmt;

use chrono::NaiveDateTime;
use gridbook_xml::shared_strings::RichRun;

use crate::comment::CellComment;

/// Numeric cell error codes and their canonical display strings. The codes
/// are part of the on-the-wire model.
pub mod error_codes {
    pub const NULL: u8 = 0x00;
    pub const DIV0: u8 = 0x07;
    pub const VALUE: u8 = 0x0F;
    pub const REF: u8 = 0x17;
    pub const NAME: u8 = 0x1D;
    pub const NUM: u8 = 0x24;
    pub const NA: u8 = 0x2A;
    pub const GETTING_DATA: u8 = 0x2B;
}

/// Canonical display string for a cell error code.
pub fn error_code_label(code: u8) -> &'static str {
    match code {
        error_codes::NULL => "#NULL!",
        error_codes::DIV0 => "#DIV/0!",
        error_codes::VALUE => "#VALUE!",
        error_codes::REF => "#REF!",
        error_codes::NAME => "#NAME?",
        error_codes::NUM => "#NUM!",
        error_codes::NA => "#N/A",
        error_codes::GETTING_DATA => "#GETTING_DATA",
        _ => "#ERR!",
    }
}

/// Parse a canonical error display string back to its code.
pub fn error_code_from_label(label: &str) -> Option<u8> {
    match label {
        "#NULL!" => Some(error_codes::NULL),
        "#DIV/0!" => Some(error_codes::DIV0),
        "#VALUE!" => Some(error_codes::VALUE),
        "#REF!" => Some(error_codes::REF),
        "#NAME?" => Some(error_codes::NAME),
        "#NUM!" => Some(error_codes::NUM),
        "#N/A" => Some(error_codes::NA),
        "#GETTING_DATA" => Some(error_codes::GETTING_DATA),
        _ => None,
    }
}

/// The typed value of a cell. The variants mirror the worksheet type codes
/// `n`, `s`, `b`, `d`, `e`, `z`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value: a stub cell (type `z`).
    Empty,
    /// Numeric value (type `n`).
    Number(f64),
    /// String value (type `s`).
    Text(String),
    /// Boolean value (type `b`).
    Bool(bool),
    /// Live date value (type `d`).
    DateTime(NaiveDateTime),
    /// Error code (type `e`), one of the [`error_codes`] constants.
    Error(u8),
}

impl CellValue {
    /// The single-character worksheet type code for this value.
    pub fn type_code(&self) -> char {
        match self {
            CellValue::Empty => 'z',
            CellValue::Number(_) => 'n',
            CellValue::Text(_) => 's',
            CellValue::Bool(_) => 'b',
            CellValue::DateTime(_) => 'd',
            CellValue::Error(_) => 'e',
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
            CellValue::Error(code) => f.write_str(error_code_label(*code)),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

/// A cell's number format: either an id into the format table or a literal
/// format code.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberFormat {
    Id(u32),
    Code(String),
}

/// A hyperlink attached to a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hyperlink {
    pub target: String,
    pub tooltip: Option<String>,
}

/// Style binding carried by cells read with `cell_styles`: the numFmtId the
/// cell's xf record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRef {
    pub num_fmt_id: u32,
}

/// A worksheet cell: tagged value plus optional attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// The tagged value.
    pub value: CellValue,
    /// Formula text, without the leading `=`.
    pub formula: Option<String>,
    /// For array formulas, the A1 range the formula covers.
    pub array_range: Option<String>,
    /// Dynamic-array flag; set by the API, not serialized.
    pub dynamic_array: bool,
    /// Cached formatted display text (best-effort).
    pub display: Option<String>,
    /// Number format attached to this cell.
    pub num_fmt: Option<NumberFormat>,
    /// Hyperlink attached to this cell.
    pub hyperlink: Option<Hyperlink>,
    /// Comments anchored at this cell.
    pub comments: Vec<CellComment>,
    /// Style binding (numFmtId) when styles are tracked.
    pub style: Option<StyleRef>,
    /// Rich-text runs preserved from the shared string table.
    pub rich_runs: Option<Vec<RichRun>>,
    /// HTML rendering of the cell text.
    pub html: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// A stub cell: present in the grid, no value.
    pub fn stub() -> Self {
        Self::new(CellValue::Empty)
    }

    /// True when the cell carries nothing worth writing: empty value, no
    /// formula, no comments.
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.formula.is_none() && self.comments.is_empty()
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::new(CellValue::Number(n))
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::new(CellValue::Number(f64::from(n)))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::new(CellValue::Text(s.to_string()))
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::new(CellValue::Text(s))
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::new(CellValue::Bool(b))
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::new(CellValue::DateTime(dt))
    }
}
