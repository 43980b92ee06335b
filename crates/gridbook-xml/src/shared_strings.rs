//! Shared Strings XML schema structures.
//!
//! Represents `xl/sharedStrings.xml` in the OOXML package.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Shared String Table root element (`xl/sharedStrings.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "sst")]
pub struct Sst {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    /// Total reference count of shared strings in the workbook.
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Number of unique string entries.
    #[serde(rename = "@uniqueCount", skip_serializing_if = "Option::is_none")]
    pub unique_count: Option<u32>,

    /// Shared string items.
    #[serde(rename = "si", default)]
    pub items: Vec<StringItem>,
}

/// Shared String Item: a plain `<t>` or a sequence of rich-text runs.
///
/// `<rPh>` phonetic runs carry furigana readings; they are parsed so the
/// reader can skip them when extracting plain text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringItem {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub t: Option<Text>,

    #[serde(rename = "r", default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<RichRun>,

    #[serde(rename = "rPh", default, skip_serializing_if = "Vec::is_empty")]
    pub phonetic_runs: Vec<PhoneticRun>,
}

/// Text element with optional space preservation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(
        rename = "@xml:space",
        alias = "@space",
        skip_serializing_if = "Option::is_none"
    )]
    pub xml_space: Option<String>,

    #[serde(rename = "$value", default)]
    pub value: String,
}

impl Text {
    /// Wrap a string, adding `xml:space="preserve"` when boundary whitespace
    /// or embedded newlines would otherwise be lost.
    pub fn preserving(value: &str) -> Self {
        let needs_preserve = value.starts_with(' ')
            || value.ends_with(' ')
            || value.starts_with('\t')
            || value.ends_with('\t')
            || value.contains('\n');
        Self {
            xml_space: needs_preserve.then(|| "preserve".to_string()),
            value: value.to_string(),
        }
    }
}

/// Rich text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichRun {
    /// Run properties (formatting).
    #[serde(rename = "rPr", skip_serializing_if = "Option::is_none")]
    pub r_pr: Option<RunProperties>,

    /// Text content.
    #[serde(rename = "t")]
    pub t: Text,
}

/// Phonetic run (`<rPh>`), skipped during plain-text extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticRun {
    #[serde(rename = "@sb", skip_serializing_if = "Option::is_none")]
    pub sb: Option<u32>,

    #[serde(rename = "@eb", skip_serializing_if = "Option::is_none")]
    pub eb: Option<u32>,

    #[serde(rename = "t")]
    pub t: Text,
}

/// Run properties (text formatting within a rich text run).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    #[serde(rename = "b", skip_serializing_if = "Option::is_none")]
    pub b: Option<BoolVal>,

    #[serde(rename = "i", skip_serializing_if = "Option::is_none")]
    pub i: Option<BoolVal>,

    #[serde(rename = "strike", skip_serializing_if = "Option::is_none")]
    pub strike: Option<BoolVal>,

    #[serde(rename = "u", skip_serializing_if = "Option::is_none")]
    pub u: Option<Underline>,

    #[serde(rename = "shadow", skip_serializing_if = "Option::is_none")]
    pub shadow: Option<BoolVal>,

    #[serde(rename = "sz", skip_serializing_if = "Option::is_none")]
    pub sz: Option<FontSize>,

    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(rename = "rFont", skip_serializing_if = "Option::is_none")]
    pub r_font: Option<FontName>,

    #[serde(rename = "family", skip_serializing_if = "Option::is_none")]
    pub family: Option<FontFamily>,

    #[serde(rename = "vertAlign", skip_serializing_if = "Option::is_none")]
    pub vert_align: Option<VertAlign>,

    #[serde(rename = "scheme", skip_serializing_if = "Option::is_none")]
    pub scheme: Option<FontScheme>,
}

/// Boolean value wrapper (`<b/>`, `<b val="0"/>`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolVal {
    #[serde(rename = "@val", skip_serializing_if = "Option::is_none")]
    pub val: Option<bool>,
}

/// Underline element with optional variant (`single`, `double`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Underline {
    #[serde(rename = "@val", skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

/// Font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSize {
    #[serde(rename = "@val")]
    pub val: f64,
}

/// Color, as ARGB hex or a theme index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(rename = "@rgb", skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,

    #[serde(rename = "@theme", skip_serializing_if = "Option::is_none")]
    pub theme: Option<u32>,

    #[serde(rename = "@tint", skip_serializing_if = "Option::is_none")]
    pub tint: Option<f64>,
}

/// Font name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontName {
    #[serde(rename = "@val")]
    pub val: String,
}

/// Font family index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFamily {
    #[serde(rename = "@val")]
    pub val: u32,
}

/// Vertical alignment (`superscript`, `subscript`, `baseline`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertAlign {
    #[serde(rename = "@val")]
    pub val: String,
}

/// Font scheme (`major`, `minor`, `none`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontScheme {
    #[serde(rename = "@val")]
    pub val: String,
}

impl Default for Sst {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            count: Some(0),
            unique_count: Some(0),
            items: vec![],
        }
    }
}
