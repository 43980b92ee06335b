//! Workbook XML schema structures.
//!
//! Represents `xl/workbook.xml` in the OOXML package.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Workbook root element (`xl/workbook.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "workbook")]
pub struct WorkbookXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:r")]
    pub xmlns_r: String,

    #[serde(rename = "workbookPr", skip_serializing_if = "Option::is_none")]
    pub workbook_pr: Option<WorkbookPr>,

    #[serde(rename = "bookViews", skip_serializing_if = "Option::is_none")]
    pub book_views: Option<BookViews>,

    #[serde(rename = "sheets")]
    pub sheets: Sheets,

    #[serde(rename = "definedNames", skip_serializing_if = "Option::is_none")]
    pub defined_names: Option<DefinedNames>,

    #[serde(rename = "calcPr", skip_serializing_if = "Option::is_none")]
    pub calc_pr: Option<CalcPr>,
}

/// Workbook properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookPr {
    #[serde(rename = "@date1904", skip_serializing_if = "Option::is_none")]
    pub date1904: Option<bool>,

    #[serde(rename = "@filterPrivacy", skip_serializing_if = "Option::is_none")]
    pub filter_privacy: Option<bool>,

    #[serde(rename = "@codeName", skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
}

/// Book views container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookViews {
    #[serde(rename = "workbookView")]
    pub workbook_views: Vec<WorkbookView>,
}

/// Individual workbook view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookView {
    #[serde(rename = "@xWindow", skip_serializing_if = "Option::is_none")]
    pub x_window: Option<i32>,

    #[serde(rename = "@yWindow", skip_serializing_if = "Option::is_none")]
    pub y_window: Option<i32>,

    #[serde(rename = "@windowWidth", skip_serializing_if = "Option::is_none")]
    pub window_width: Option<u32>,

    #[serde(rename = "@windowHeight", skip_serializing_if = "Option::is_none")]
    pub window_height: Option<u32>,

    #[serde(rename = "@activeTab", skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<u32>,
}

/// Sheets container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheets {
    #[serde(rename = "sheet", default)]
    pub sheets: Vec<SheetEntry>,
}

/// Individual sheet entry in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@sheetId")]
    pub sheet_id: u32,

    /// Visibility state: absent (visible), "hidden", or "veryHidden".
    #[serde(rename = "@state", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "@r:id", alias = "@id")]
    pub r_id: String,
}

/// Sheet visibility state strings used in the `state` attribute.
pub mod sheet_states {
    pub const HIDDEN: &str = "hidden";
    pub const VERY_HIDDEN: &str = "veryHidden";
}

/// Defined names container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedNames {
    #[serde(rename = "definedName", default)]
    pub defined_names: Vec<DefinedNameXml>,
}

/// Individual defined name. The element text is the reference the name
/// refers to (e.g. `Sheet1!$A$1:$B$2`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedNameXml {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@localSheetId", skip_serializing_if = "Option::is_none")]
    pub local_sheet_id: Option<u32>,

    #[serde(rename = "@hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(rename = "$value", default)]
    pub value: String,
}

/// Calculation properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcPr {
    #[serde(rename = "@calcId", skip_serializing_if = "Option::is_none")]
    pub calc_id: Option<u32>,

    #[serde(rename = "@fullCalcOnLoad", skip_serializing_if = "Option::is_none")]
    pub full_calc_on_load: Option<bool>,
}

impl Default for WorkbookXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            xmlns_r: namespaces::RELATIONSHIPS.to_string(),
            workbook_pr: None,
            book_views: None,
            sheets: Sheets { sheets: vec![] },
            defined_names: None,
            calc_pr: None,
        }
    }
}
