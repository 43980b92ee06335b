//! Worksheet XML schema structures.
//!
//! Represents `xl/worksheets/sheet*.xml` in the OOXML package.

use serde::{Deserialize, Serialize};

use crate::namespaces;
use crate::shared_strings::{RichRun, Text};

/// Worksheet root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "worksheet")]
pub struct WorksheetXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:r")]
    pub xmlns_r: String,

    #[serde(rename = "dimension", skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,

    #[serde(rename = "sheetViews", skip_serializing_if = "Option::is_none")]
    pub sheet_views: Option<SheetViews>,

    #[serde(rename = "sheetFormatPr", skip_serializing_if = "Option::is_none")]
    pub sheet_format_pr: Option<SheetFormatPr>,

    #[serde(rename = "cols", skip_serializing_if = "Option::is_none")]
    pub cols: Option<Cols>,

    #[serde(rename = "sheetData")]
    pub sheet_data: SheetData,

    #[serde(rename = "autoFilter", skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<AutoFilter>,

    #[serde(rename = "mergeCells", skip_serializing_if = "Option::is_none")]
    pub merge_cells: Option<MergeCells>,

    #[serde(rename = "hyperlinks", skip_serializing_if = "Option::is_none")]
    pub hyperlinks: Option<Hyperlinks>,

    #[serde(rename = "pageMargins", skip_serializing_if = "Option::is_none")]
    pub page_margins: Option<PageMargins>,

    #[serde(rename = "legacyDrawing", skip_serializing_if = "Option::is_none")]
    pub legacy_drawing: Option<LegacyDrawingRef>,
}

/// Sheet dimension reference (the used range, e.g. `A1:D10`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Sheet views container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetViews {
    #[serde(rename = "sheetView")]
    pub sheet_views: Vec<SheetView>,
}

/// Individual sheet view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetView {
    #[serde(rename = "@tabSelected", skip_serializing_if = "Option::is_none")]
    pub tab_selected: Option<bool>,

    #[serde(rename = "@workbookViewId")]
    pub workbook_view_id: u32,
}

/// Sheet format properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetFormatPr {
    #[serde(rename = "@defaultRowHeight")]
    pub default_row_height: f64,

    #[serde(rename = "@defaultColWidth", skip_serializing_if = "Option::is_none")]
    pub default_col_width: Option<f64>,
}

/// Columns container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cols {
    #[serde(rename = "col")]
    pub cols: Vec<Col>,
}

/// Individual column definition. `min`/`max` are 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Col {
    #[serde(rename = "@min")]
    pub min: u32,

    #[serde(rename = "@max")]
    pub max: u32,

    #[serde(rename = "@width", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(rename = "@hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(rename = "@customWidth", skip_serializing_if = "Option::is_none")]
    pub custom_width: Option<bool>,
}

/// Sheet data container holding all rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(rename = "row", default)]
    pub rows: Vec<Row>,
}

/// A single row of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based row number.
    #[serde(rename = "@r")]
    pub r: u32,

    #[serde(rename = "@ht", skip_serializing_if = "Option::is_none")]
    pub ht: Option<f64>,

    #[serde(rename = "@hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(rename = "@customHeight", skip_serializing_if = "Option::is_none")]
    pub custom_height: Option<bool>,

    #[serde(rename = "c", default)]
    pub cells: Vec<CellXml>,
}

/// A single cell element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellXml {
    /// Cell reference (e.g. "A1").
    #[serde(rename = "@r", skip_serializing_if = "Option::is_none")]
    pub r: Option<String>,

    /// Style index into cellXfs.
    #[serde(rename = "@s", skip_serializing_if = "Option::is_none")]
    pub s: Option<u32>,

    /// Cell type: "b", "d", "e", "inlineStr", "n", "s", "str".
    #[serde(rename = "@t", skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Cell metadata index (dynamic-array marker).
    #[serde(rename = "@cm", skip_serializing_if = "Option::is_none")]
    pub cm: Option<u32>,

    #[serde(rename = "f", skip_serializing_if = "Option::is_none")]
    pub f: Option<CellFormula>,

    #[serde(rename = "v", skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,

    #[serde(rename = "is", skip_serializing_if = "Option::is_none")]
    pub is: Option<InlineString>,
}

/// Cell type attribute constants.
pub mod cell_types {
    pub const BOOLEAN: &str = "b";
    pub const DATE: &str = "d";
    pub const ERROR: &str = "e";
    pub const INLINE_STRING: &str = "inlineStr";
    pub const NUMBER: &str = "n";
    pub const SHARED_STRING: &str = "s";
    pub const FORMULA_STRING: &str = "str";
}

/// Cell formula element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFormula {
    /// Formula type: absent (normal), "array", "shared", "dataTable".
    #[serde(rename = "@t", skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Range the formula applies to (array and shared formulas).
    #[serde(rename = "@ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Shared-formula group index.
    #[serde(rename = "@si", skip_serializing_if = "Option::is_none")]
    pub si: Option<u32>,

    #[serde(rename = "$value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Inline string within a cell (`<is>`), either a plain `<t>` or rich runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineString {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub t: Option<Text>,

    #[serde(rename = "r", default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<RichRun>,
}

/// AutoFilter range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFilter {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Merge cells container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCells {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "mergeCell", default)]
    pub merge_cells: Vec<MergeCell>,
}

/// Individual merge cell reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCell {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Hyperlinks container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperlinks {
    #[serde(rename = "hyperlink", default)]
    pub hyperlinks: Vec<HyperlinkXml>,
}

/// Individual hyperlink. External targets resolve through the sheet's
/// relationship file via `r:id`; internal links carry only `location`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HyperlinkXml {
    #[serde(rename = "@ref")]
    pub reference: String,

    #[serde(
        rename = "@r:id",
        alias = "@id",
        skip_serializing_if = "Option::is_none"
    )]
    pub r_id: Option<String>,

    #[serde(rename = "@location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "@tooltip", skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    #[serde(rename = "@display", skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Page margins, all six values in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    #[serde(rename = "@left")]
    pub left: f64,

    #[serde(rename = "@right")]
    pub right: f64,

    #[serde(rename = "@top")]
    pub top: f64,

    #[serde(rename = "@bottom")]
    pub bottom: f64,

    #[serde(rename = "@header")]
    pub header: f64,

    #[serde(rename = "@footer")]
    pub footer: f64,
}

/// Legacy (VML) drawing reference for comment shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyDrawingRef {
    #[serde(rename = "@r:id", alias = "@id")]
    pub r_id: String,
}

impl Default for WorksheetXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            xmlns_r: namespaces::RELATIONSHIPS.to_string(),
            dimension: None,
            sheet_views: None,
            sheet_format_pr: None,
            cols: None,
            sheet_data: SheetData::default(),
            auto_filter: None,
            merge_cells: None,
            hyperlinks: None,
            page_margins: None,
            legacy_drawing: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worksheet_default() {
        let ws = WorksheetXml::default();
        assert_eq!(ws.xmlns, namespaces::SPREADSHEET_ML);
        assert!(ws.sheet_data.rows.is_empty());
        assert!(ws.dimension.is_none());
    }

    #[test]
    fn test_worksheet_roundtrip_with_data() {
        let ws = WorksheetXml {
            dimension: Some(Dimension {
                reference: "A1:B2".to_string(),
            }),
            sheet_data: SheetData {
                rows: vec![Row {
                    r: 1,
                    ht: Some(20.0),
                    hidden: None,
                    custom_height: Some(true),
                    cells: vec![
                        CellXml {
                            r: Some("A1".to_string()),
                            t: Some(cell_types::SHARED_STRING.to_string()),
                            v: Some("0".to_string()),
                            ..CellXml::default()
                        },
                        CellXml {
                            r: Some("B1".to_string()),
                            v: Some("42".to_string()),
                            ..CellXml::default()
                        },
                    ],
                }],
            },
            ..WorksheetXml::default()
        };

        let xml = quick_xml::se::to_string(&ws).unwrap();
        let parsed: WorksheetXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.dimension.as_ref().unwrap().reference, "A1:B2");
        assert_eq!(parsed.sheet_data.rows.len(), 1);
        assert_eq!(parsed.sheet_data.rows[0].ht, Some(20.0));
        assert_eq!(parsed.sheet_data.rows[0].cells.len(), 2);
        assert_eq!(
            parsed.sheet_data.rows[0].cells[0].t,
            Some("s".to_string())
        );
    }

    #[test]
    fn test_cell_with_array_formula() {
        let cell = CellXml {
            r: Some("C1".to_string()),
            f: Some(CellFormula {
                t: Some("array".to_string()),
                reference: Some("C1:C2".to_string()),
                si: None,
                value: Some("A1:A2*B1:B2".to_string()),
            }),
            v: Some("6".to_string()),
            ..CellXml::default()
        };
        let xml = quick_xml::se::to_string(&cell).unwrap();
        assert!(xml.contains("t=\"array\""));
        assert!(xml.contains("ref=\"C1:C2\""));
        let parsed: CellXml = quick_xml::de::from_str(&xml).unwrap();
        let f = parsed.f.unwrap();
        assert_eq!(f.reference.as_deref(), Some("C1:C2"));
        assert_eq!(f.value.as_deref(), Some("A1:A2*B1:B2"));
    }

    #[test]
    fn test_shared_formula_attributes() {
        let xml = r#"<c r="B2"><f t="shared" ref="B2:B4" si="0">A2*2</f><v>4</v></c>"#;
        let parsed: CellXml = quick_xml::de::from_str(xml).unwrap();
        let f = parsed.f.unwrap();
        assert_eq!(f.t.as_deref(), Some("shared"));
        assert_eq!(f.si, Some(0));
        assert_eq!(f.value.as_deref(), Some("A2*2"));
    }

    #[test]
    fn test_worksheet_with_merges_and_autofilter() {
        let ws = WorksheetXml {
            auto_filter: Some(AutoFilter {
                reference: "A1:C1".to_string(),
            }),
            merge_cells: Some(MergeCells {
                count: Some(1),
                merge_cells: vec![MergeCell {
                    reference: "A1:B2".to_string(),
                }],
            }),
            ..WorksheetXml::default()
        };
        let xml = quick_xml::se::to_string(&ws).unwrap();
        let parsed: WorksheetXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.auto_filter.unwrap().reference, "A1:C1");
        assert_eq!(parsed.merge_cells.unwrap().merge_cells.len(), 1);
    }

    #[test]
    fn test_hyperlink_attributes() {
        let xml = r#"<hyperlink ref="A1" r:id="rId1" location="Sheet2!B2" tooltip="hi"/>"#;
        let parsed: HyperlinkXml = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.reference, "A1");
        assert_eq!(parsed.r_id.as_deref(), Some("rId1"));
        assert_eq!(parsed.location.as_deref(), Some("Sheet2!B2"));
        assert_eq!(parsed.tooltip.as_deref(), Some("hi"));
    }

    #[test]
    fn test_page_margins_roundtrip() {
        let m = PageMargins {
            left: 0.7,
            right: 0.7,
            top: 0.75,
            bottom: 0.75,
            header: 0.3,
            footer: 0.3,
        };
        let xml = quick_xml::se::to_string(&m).unwrap();
        let parsed: PageMargins = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(m, parsed);
    }

    #[test]
    fn test_parse_real_worksheet() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <dimension ref="A1:B2"/>
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="b"><v>1</v></c>
    </row>
    <row r="2" hidden="1" ht="30">
      <c r="A2"><v>100</v></c>
      <c r="B2" t="e"><v>#DIV/0!</v></c>
    </row>
  </sheetData>
  <pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>
</worksheet>"#;
        let parsed: WorksheetXml = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.sheet_data.rows.len(), 2);
        assert_eq!(parsed.sheet_data.rows[1].hidden, Some(true));
        assert_eq!(parsed.sheet_data.rows[1].ht, Some(30.0));
        assert_eq!(
            parsed.sheet_data.rows[1].cells[1].t.as_deref(),
            Some("e")
        );
        assert!(parsed.page_margins.is_some());
    }
}
