//! Styles XML schema structures.
//!
//! Represents `xl/styles.xml`. Parsing extracts the pieces the codec binds
//! to cells (`numFmts` and `cellXfs`); other sections are carried as typed
//! structures so the minimal stylesheet can be written back out.

use serde::{Deserialize, Serialize};

use crate::namespaces;
use crate::shared_strings::{Color, FontName, FontSize};

/// First number format id available for custom formats.
pub const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

/// Stylesheet root element (`xl/styles.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "styleSheet")]
pub struct StyleSheet {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "numFmts", skip_serializing_if = "Option::is_none")]
    pub num_fmts: Option<NumFmts>,

    #[serde(rename = "fonts", skip_serializing_if = "Option::is_none")]
    pub fonts: Option<Fonts>,

    #[serde(rename = "fills", skip_serializing_if = "Option::is_none")]
    pub fills: Option<Fills>,

    #[serde(rename = "borders", skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,

    #[serde(rename = "cellStyleXfs", skip_serializing_if = "Option::is_none")]
    pub cell_style_xfs: Option<CellStyleXfs>,

    #[serde(rename = "cellXfs", skip_serializing_if = "Option::is_none")]
    pub cell_xfs: Option<CellXfs>,

    #[serde(rename = "cellStyles", skip_serializing_if = "Option::is_none")]
    pub cell_styles: Option<CellStyles>,
}

/// Custom number formats container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumFmts {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "numFmt", default)]
    pub num_fmts: Vec<NumFmt>,
}

/// A single number format definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumFmt {
    #[serde(rename = "@numFmtId")]
    pub num_fmt_id: u32,

    #[serde(rename = "@formatCode")]
    pub format_code: String,
}

/// Fonts container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fonts {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "font", default)]
    pub fonts: Vec<Font>,
}

/// A font record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(rename = "sz", skip_serializing_if = "Option::is_none")]
    pub sz: Option<FontSize>,

    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<FontName>,

    #[serde(rename = "family", skip_serializing_if = "Option::is_none")]
    pub family: Option<FamilyVal>,
}

/// Font family wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyVal {
    #[serde(rename = "@val")]
    pub val: u32,
}

/// Fills container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fills {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "fill", default)]
    pub fills: Vec<Fill>,
}

/// A fill record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    #[serde(rename = "patternFill", skip_serializing_if = "Option::is_none")]
    pub pattern_fill: Option<PatternFill>,
}

/// Pattern fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternFill {
    #[serde(rename = "@patternType", skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
}

/// Borders container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "border", default)]
    pub borders: Vec<Border>,
}

/// A border record; empty sides for the minimal stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    #[serde(rename = "left", skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderSide>,

    #[serde(rename = "right", skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderSide>,

    #[serde(rename = "top", skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSide>,

    #[serde(rename = "bottom", skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSide>,

    #[serde(rename = "diagonal", skip_serializing_if = "Option::is_none")]
    pub diagonal: Option<BorderSide>,
}

/// A border side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSide {
    #[serde(rename = "@style", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Formatting records for named cell styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyleXfs {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "xf", default)]
    pub xfs: Vec<Xf>,
}

/// Cell format records; the `s` attribute on a cell indexes this array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellXfs {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "xf", default)]
    pub xfs: Vec<Xf>,
}

/// A single format record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Xf {
    #[serde(rename = "@numFmtId", skip_serializing_if = "Option::is_none")]
    pub num_fmt_id: Option<u32>,

    #[serde(rename = "@fontId", skip_serializing_if = "Option::is_none")]
    pub font_id: Option<u32>,

    #[serde(rename = "@fillId", skip_serializing_if = "Option::is_none")]
    pub fill_id: Option<u32>,

    #[serde(rename = "@borderId", skip_serializing_if = "Option::is_none")]
    pub border_id: Option<u32>,

    #[serde(rename = "@xfId", skip_serializing_if = "Option::is_none")]
    pub xf_id: Option<u32>,

    #[serde(
        rename = "@applyNumberFormat",
        skip_serializing_if = "Option::is_none"
    )]
    pub apply_number_format: Option<bool>,
}

/// Named cell styles container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyles {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "cellStyle", default)]
    pub cell_styles: Vec<CellStyle>,
}

/// A named cell style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@xfId")]
    pub xf_id: u32,

    #[serde(rename = "@builtinId", skip_serializing_if = "Option::is_none")]
    pub builtin_id: Option<u32>,
}

impl Default for StyleSheet {
    /// The minimum valid stylesheet: one custom `General` format (id 164),
    /// one font, the none/gray125 fill pair, one empty border, one
    /// cellStyleXf, two identical default cellXfs, and the Normal style.
    fn default() -> Self {
        let base_xf = Xf {
            num_fmt_id: Some(0),
            font_id: Some(0),
            fill_id: Some(0),
            border_id: Some(0),
            xf_id: Some(0),
            apply_number_format: None,
        };
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            num_fmts: Some(NumFmts {
                count: Some(1),
                num_fmts: vec![NumFmt {
                    num_fmt_id: FIRST_CUSTOM_NUMFMT_ID,
                    format_code: "General".to_string(),
                }],
            }),
            fonts: Some(Fonts {
                count: Some(1),
                fonts: vec![Font {
                    sz: Some(FontSize { val: 12.0 }),
                    color: Some(Color {
                        rgb: Some("FF000000".to_string()),
                        theme: None,
                        tint: None,
                    }),
                    name: Some(FontName {
                        val: "Calibri".to_string(),
                    }),
                    family: Some(FamilyVal { val: 2 }),
                }],
            }),
            fills: Some(Fills {
                count: Some(2),
                fills: vec![
                    Fill {
                        pattern_fill: Some(PatternFill {
                            pattern_type: Some("none".to_string()),
                        }),
                    },
                    Fill {
                        pattern_fill: Some(PatternFill {
                            pattern_type: Some("gray125".to_string()),
                        }),
                    },
                ],
            }),
            borders: Some(Borders {
                count: Some(1),
                borders: vec![Border::default()],
            }),
            cell_style_xfs: Some(CellStyleXfs {
                count: Some(1),
                xfs: vec![base_xf.clone()],
            }),
            cell_xfs: Some(CellXfs {
                count: Some(2),
                xfs: vec![base_xf.clone(), base_xf],
            }),
            cell_styles: Some(CellStyles {
                count: Some(1),
                cell_styles: vec![CellStyle {
                    name: "Normal".to_string(),
                    xf_id: 0,
                    builtin_id: Some(0),
                }],
            }),
        }
    }
}
