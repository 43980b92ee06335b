//! Workbook model: the ordered sheet collection plus document-level
//! properties, defined names, and the user-facing mutation API.

use std::collections::HashMap;

use gridbook_xml::doc_props::{CoreProperties, CustomProperty};

use crate::cell::{Cell, CellValue, Hyperlink, NumberFormat};
use crate::comment::{insert_comment, CellComment};
use crate::error::{Error, Result};
use crate::formula::strip_xlfn;
use crate::sheet::Worksheet;
use crate::utils::cell_ref::decode_range;
use crate::utils::constants::{FORBIDDEN_SHEET_NAME_CHARS, MAX_SHEETS, MAX_SHEET_NAME_LEN};

mod read;
mod write;

pub use read::{read_workbook, ReadOptions, SheetSelector};
pub use write::{write_workbook, BookType, OutputKind, WriteOptions, WriteOutput};

/// Sheet visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl Visibility {
    /// Numeric code: 0 visible, 1 hidden, 2 very hidden.
    pub fn as_code(self) -> u8 {
        match self {
            Visibility::Visible => 0,
            Visibility::Hidden => 1,
            Visibility::VeryHidden => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Visibility::Visible),
            1 => Ok(Visibility::Hidden),
            2 => Ok(Visibility::VeryHidden),
            other => Err(Error::Internal(format!("invalid visibility code: {other}"))),
        }
    }

    /// The workbook-part `state` attribute value, `None` for visible.
    pub fn state_attr(self) -> Option<&'static str> {
        match self {
            Visibility::Visible => None,
            Visibility::Hidden => Some("hidden"),
            Visibility::VeryHidden => Some("veryHidden"),
        }
    }

    pub fn from_state_attr(state: Option<&str>) -> Self {
        match state {
            Some("hidden") => Visibility::Hidden,
            Some("veryHidden") => Visibility::VeryHidden,
            _ => Visibility::Visible,
        }
    }
}

/// Per-sheet metadata carried by the workbook part.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetInfo {
    pub name: String,
    pub visibility: Visibility,
}

/// A defined name, optionally scoped to one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedName {
    pub name: String,
    pub refers_to: String,
    /// Sheet scope as an index into the sheet order; `None` is
    /// workbook-global.
    pub sheet: Option<usize>,
    pub hidden: bool,
}

/// Workbook-level properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookProps {
    pub date1904: bool,
    pub filter_privacy: bool,
    pub code_name: Option<String>,
    pub active_tab: u32,
}

/// One calc-chain entry with its sticky sheet index resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcChainEntry {
    pub cell: String,
    pub sheet_index: u32,
}

/// An in-memory workbook.
#[derive(Debug, Default)]
pub struct Workbook {
    /// Sheet order and visibility; the authoritative name sequence.
    sheet_info: Vec<SheetInfo>,
    sheets: HashMap<String, Worksheet>,
    pub props: WorkbookProps,
    pub defined_names: Vec<DefinedName>,
    pub core_props: Option<CoreProperties>,
    pub custom_props: Vec<CustomProperty>,
    /// Parsed calc chain (not rewritten on save).
    pub calc_chain: Vec<CalcChainEntry>,
    /// Package part names, kept when the reader is asked to.
    pub part_names: Option<Vec<String>>,
}

impl Workbook {
    /// A new, empty workbook with no sheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheet_info.iter().map(|s| s.name.as_str()).collect()
    }

    /// Per-sheet metadata in workbook order.
    pub fn sheet_info(&self) -> &[SheetInfo] {
        &self.sheet_info
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_info.len()
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.get(name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.sheets.get_mut(name).ok_or_else(|| Error::SheetNotFound {
            name: name.to_string(),
        })
    }

    pub fn sheet_at(&self, index: usize) -> Option<(&str, &Worksheet)> {
        let info = self.sheet_info.get(index)?;
        self.sheets
            .get(&info.name)
            .map(|ws| (info.name.as_str(), ws))
    }

    /// Append a worksheet.
    ///
    /// With `name: None`, picks the first free `SheetN`. With `roll`, a
    /// colliding requested name gets a numeric suffix (trailing digits of
    /// the base are stripped first, then the counter increments until the
    /// name is free).
    pub fn append_sheet(
        &mut self,
        name: Option<&str>,
        ws: Worksheet,
        roll: bool,
    ) -> Result<String> {
        if self.sheet_info.len() >= MAX_SHEETS {
            return Err(Error::SheetLimitExceeded(self.sheet_info.len()));
        }

        let resolved = match name {
            None => {
                let mut n = self.sheet_info.len() + 1;
                loop {
                    let candidate = format!("Sheet{n}");
                    if !self.sheets.contains_key(&candidate) {
                        break candidate;
                    }
                    n += 1;
                }
            }
            Some(requested) => {
                validate_sheet_name(requested)?;
                if !self.sheets.contains_key(requested) {
                    requested.to_string()
                } else if roll {
                    let base = requested.trim_end_matches(|c: char| c.is_ascii_digit());
                    let mut n = 1;
                    loop {
                        let candidate = format!("{base}{n}");
                        validate_sheet_name(&candidate)?;
                        if !self.sheets.contains_key(&candidate) {
                            break candidate;
                        }
                        n += 1;
                    }
                } else {
                    return Err(Error::SheetAlreadyExists {
                        name: requested.to_string(),
                    });
                }
            }
        };

        self.sheet_info.push(SheetInfo {
            name: resolved.clone(),
            visibility: Visibility::Visible,
        });
        self.sheets.insert(resolved.clone(), ws);
        Ok(resolved)
    }

    /// Set a sheet's visibility.
    pub fn set_sheet_visibility(&mut self, name: &str, visibility: Visibility) -> Result<()> {
        let info = self
            .sheet_info
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound {
                name: name.to_string(),
            })?;
        info.visibility = visibility;
        Ok(())
    }

    /// Set a cell's value, creating the cell if needed.
    pub fn set_cell_value(&mut self, sheet: &str, a1: &str, value: CellValue) -> Result<()> {
        let ws = self.sheet_mut(sheet)?;
        let cell = ws.cell_entry(a1)?;
        cell.value = value;
        Ok(())
    }

    /// Read back a cell's value (empty cells and missing cells both read as
    /// `None`... a stored stub reads as `Some(Empty)`).
    pub fn get_cell_value(&self, sheet: &str, a1: &str) -> Result<Option<CellValue>> {
        let ws = self.sheet(sheet).ok_or_else(|| Error::SheetNotFound {
            name: sheet.to_string(),
        })?;
        Ok(ws.cell(a1)?.map(|c| c.value.clone()))
    }

    /// Attach a number format to a cell.
    pub fn set_cell_format(&mut self, sheet: &str, a1: &str, fmt: NumberFormat) -> Result<()> {
        let ws = self.sheet_mut(sheet)?;
        ws.cell_entry(a1)?.num_fmt = Some(fmt);
        Ok(())
    }

    /// Attach a hyperlink to a cell.
    pub fn set_hyperlink(&mut self, sheet: &str, a1: &str, link: Hyperlink) -> Result<()> {
        let ws = self.sheet_mut(sheet)?;
        ws.cell_entry(a1)?.hyperlink = Some(link);
        Ok(())
    }

    /// Attach a comment to a cell (threaded comments displace plain ones).
    pub fn add_comment(&mut self, sheet: &str, a1: &str, comment: CellComment) -> Result<()> {
        let ws = self.sheet_mut(sheet)?;
        let threaded = comment.threaded;
        insert_comment(ws, a1, comment, threaded)
    }

    /// Install an array formula over `range`. The range origin carries the
    /// formula; every covered cell carries the range so readers can tell
    /// the group apart. `dynamic` marks a spilled (dynamic) array.
    pub fn set_array_formula(
        &mut self,
        sheet: &str,
        range: &str,
        formula: &str,
        dynamic: bool,
    ) -> Result<()> {
        let parsed = decode_range(range)?;
        let range_str = range.to_string();
        let formula = strip_xlfn(formula);
        let ws = self.sheet_mut(sheet)?;

        for row in parsed.start.row..=parsed.end.row {
            for col in parsed.start.col..=parsed.end.col {
                let at = crate::utils::cell_ref::CellRef { col, row };
                if ws.get(at).is_none() {
                    ws.insert(at, Cell::stub());
                }
                let cell = ws.get_mut(at).ok_or_else(|| {
                    Error::Internal("array formula cell vanished".to_string())
                })?;
                cell.array_range = Some(range_str.clone());
                if row == parsed.start.row && col == parsed.start.col {
                    cell.formula = Some(formula.clone());
                    cell.dynamic_array = dynamic;
                    if cell.value.is_empty() {
                        cell.value = CellValue::Number(0.0);
                    }
                } else {
                    cell.formula = None;
                }
            }
        }
        Ok(())
    }

    /// Validate the workbook ahead of write: sheet-name rules, duplicates,
    /// and the name/sheet pairing invariant.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for info in &self.sheet_info {
            validate_sheet_name(&info.name)?;
            if !seen.insert(info.name.as_str()) {
                return Err(Error::SheetAlreadyExists {
                    name: info.name.clone(),
                });
            }
            if !self.sheets.contains_key(&info.name) {
                return Err(Error::SheetNotFound {
                    name: info.name.clone(),
                });
            }
        }
        if self.sheet_info.len() > MAX_SHEETS {
            return Err(Error::SheetLimitExceeded(self.sheet_info.len()));
        }
        Ok(())
    }

    /// Used by the reader, which has already validated the part data.
    pub(crate) fn push_sheet_unchecked(
        &mut self,
        name: String,
        visibility: Visibility,
        ws: Worksheet,
    ) {
        self.sheet_info.push(SheetInfo {
            name: name.clone(),
            visibility,
        });
        self.sheets.insert(name, ws);
    }
}

/// Check a sheet name against the naming rules: non-empty, at most 31
/// characters after trimming, and none of `\ / ? * [ ]`.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidSheetName("empty sheet name".to_string()));
    }
    if trimmed.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "sheet name longer than {MAX_SHEET_NAME_LEN} characters: {name}"
        )));
    }
    if name.chars().any(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(&c)) {
        return Err(Error::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_sheet_default_names() {
        let mut wb = Workbook::new();
        assert_eq!(wb.append_sheet(None, Worksheet::new(), false).unwrap(), "Sheet1");
        assert_eq!(wb.append_sheet(None, Worksheet::new(), false).unwrap(), "Sheet2");
        assert_eq!(wb.sheet_names(), vec!["Sheet1", "Sheet2"]);
    }

    #[test]
    fn test_append_sheet_duplicate_rejected() {
        let mut wb = Workbook::new();
        wb.append_sheet(Some("Data"), Worksheet::new(), false).unwrap();
        let err = wb
            .append_sheet(Some("Data"), Worksheet::new(), false)
            .unwrap_err();
        assert!(matches!(err, Error::SheetAlreadyExists { .. }));
    }

    #[test]
    fn test_append_sheet_roll_suffixes() {
        let mut wb = Workbook::new();
        wb.append_sheet(Some("Data"), Worksheet::new(), false).unwrap();
        assert_eq!(
            wb.append_sheet(Some("Data"), Worksheet::new(), true).unwrap(),
            "Data1"
        );
        assert_eq!(
            wb.append_sheet(Some("Data"), Worksheet::new(), true).unwrap(),
            "Data2"
        );
        // Trailing digits of the base strip before the counter lands.
        assert_eq!(
            wb.append_sheet(Some("Data1"), Worksheet::new(), true).unwrap(),
            "Data3"
        );
    }

    #[test]
    fn test_sheet_name_rules() {
        assert!(validate_sheet_name("Sheet1").is_ok());
        assert!(validate_sheet_name("日本語シート").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("   ").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
        for c in ['\\', '/', '?', '*', '[', ']'] {
            assert!(validate_sheet_name(&format!("bad{c}name")).is_err(), "{c}");
        }
    }

    #[test]
    fn test_visibility_codes() {
        assert_eq!(Visibility::Visible.as_code(), 0);
        assert_eq!(Visibility::Hidden.as_code(), 1);
        assert_eq!(Visibility::VeryHidden.as_code(), 2);
        assert_eq!(Visibility::from_code(2).unwrap(), Visibility::VeryHidden);
        assert!(Visibility::from_code(3).is_err());
        assert_eq!(Visibility::Hidden.state_attr(), Some("hidden"));
        assert_eq!(
            Visibility::from_state_attr(Some("veryHidden")),
            Visibility::VeryHidden
        );
        assert_eq!(Visibility::from_state_attr(None), Visibility::Visible);
    }

    #[test]
    fn test_set_and_get_cell_value() {
        let mut wb = Workbook::new();
        wb.append_sheet(Some("S"), Worksheet::new(), false).unwrap();
        wb.set_cell_value("S", "B2", CellValue::Number(42.0)).unwrap();
        assert_eq!(
            wb.get_cell_value("S", "B2").unwrap(),
            Some(CellValue::Number(42.0))
        );
        assert_eq!(wb.get_cell_value("S", "A1").unwrap(), None);
        assert!(wb.get_cell_value("Missing", "A1").is_err());
    }

    #[test]
    fn test_set_array_formula_shape() {
        let mut wb = Workbook::new();
        wb.append_sheet(Some("S"), Worksheet::new(), false).unwrap();
        wb.set_array_formula("S", "C1:C2", "A1:A2*B1:B2", false)
            .unwrap();

        let ws = wb.sheet("S").unwrap();
        let origin = ws.cell("C1").unwrap().unwrap();
        assert_eq!(origin.formula.as_deref(), Some("A1:A2*B1:B2"));
        assert_eq!(origin.array_range.as_deref(), Some("C1:C2"));

        let second = ws.cell("C2").unwrap().unwrap();
        assert!(second.formula.is_none());
        assert_eq!(second.array_range.as_deref(), Some("C1:C2"));
    }

    #[test]
    fn test_set_array_formula_dynamic_flag() {
        let mut wb = Workbook::new();
        wb.append_sheet(Some("S"), Worksheet::new(), false).unwrap();
        wb.set_array_formula("S", "E1", "_xlfn.UNIQUE(A1:A9)", true)
            .unwrap();
        let cell = wb.sheet("S").unwrap().cell("E1").unwrap().unwrap();
        assert!(cell.dynamic_array);
        assert_eq!(cell.formula.as_deref(), Some("UNIQUE(A1:A9)"));
    }

    #[test]
    fn test_validate_catches_handmade_duplicates() {
        let mut wb = Workbook::new();
        wb.push_sheet_unchecked("A".to_string(), Visibility::Visible, Worksheet::new());
        wb.push_sheet_unchecked("A".to_string(), Visibility::Visible, Worksheet::new());
        assert!(matches!(
            wb.validate(),
            Err(Error::SheetAlreadyExists { .. })
        ));
    }
}
