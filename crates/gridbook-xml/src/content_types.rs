//! `[Content_Types].xml` schema structures.
//!
//! Defines the content types for all parts in the OOXML package, plus the
//! fixed category partition the reader sorts overrides into.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// `[Content_Types].xml` root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Types")]
pub struct ContentTypes {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "Default", default)]
    pub defaults: Vec<ContentTypeDefault>,

    #[serde(rename = "Override", default)]
    pub overrides: Vec<ContentTypeOverride>,
}

/// Extension-based default content type mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeDefault {
    #[serde(rename = "@Extension")]
    pub extension: String,

    #[serde(rename = "@ContentType")]
    pub content_type: String,
}

/// Path-specific content type override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeOverride {
    #[serde(rename = "@PartName")]
    pub part_name: String,

    #[serde(rename = "@ContentType")]
    pub content_type: String,
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self {
            xmlns: namespaces::CONTENT_TYPES.to_string(),
            defaults: well_known_defaults(),
            overrides: vec![],
        }
    }
}

/// The Default entries every written package carries, keyed by extension.
pub fn well_known_defaults() -> Vec<ContentTypeDefault> {
    [
        ("xml", mime_types::XML),
        ("rels", mime_types::RELS),
        ("vml", mime_types::VML_DRAWING),
        ("bin", mime_types::BIN),
        ("png", mime_types::PNG),
        ("jpeg", mime_types::JPEG),
        ("pdf", mime_types::PDF),
        ("data", mime_types::DATA),
    ]
    .into_iter()
    .map(|(extension, content_type)| ContentTypeDefault {
        extension: extension.to_string(),
        content_type: content_type.to_string(),
    })
    .collect()
}

/// Standard content type MIME string constants.
pub mod mime_types {
    // Default extensions
    pub const RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const PDF: &str = "application/pdf";
    pub const BIN: &str = "application/vnd.ms-excel.sheet.binary.macroEnabled.main";
    pub const DATA: &str = "application/vnd.openxmlformats-officedocument.model+data";
    pub const VML_DRAWING: &str = "application/vnd.openxmlformats-officedocument.vmlDrawing";

    // Workbook
    pub const WORKBOOK: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const WORKBOOK_MACRO: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

    // Worksheet
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

    // Shared elements
    pub const SHARED_STRINGS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
    pub const STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const CALC_CHAIN: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml";
    pub const SHEET_METADATA: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheetMetadata+xml";

    // Comments
    pub const COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml";
    pub const THREADED_COMMENTS: &str = "application/vnd.ms-excel.threadedcomments+xml";
    pub const PERSON: &str = "application/vnd.ms-excel.person+xml";

    // Document properties
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const CUSTOM_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.custom-properties+xml";
}

/// Category a package part belongs to, as partitioned by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartClass {
    Workbook,
    Sheet,
    SharedStrings,
    Styles,
    Theme,
    Comments,
    ThreadedComments,
    People,
    Metadata,
    CalcChain,
    CoreProps,
    ExtProps,
    CustProps,
    Rels,
}

/// Classify a content-type string into its part category. Returns `None`
/// for content types the codec does not recognize (they are tolerated and
/// skipped).
pub fn classify(content_type: &str) -> Option<PartClass> {
    match content_type {
        mime_types::WORKBOOK | mime_types::WORKBOOK_MACRO => Some(PartClass::Workbook),
        mime_types::WORKSHEET => Some(PartClass::Sheet),
        mime_types::SHARED_STRINGS => Some(PartClass::SharedStrings),
        mime_types::STYLES => Some(PartClass::Styles),
        mime_types::THEME => Some(PartClass::Theme),
        mime_types::COMMENTS => Some(PartClass::Comments),
        mime_types::THREADED_COMMENTS => Some(PartClass::ThreadedComments),
        mime_types::PERSON => Some(PartClass::People),
        mime_types::SHEET_METADATA => Some(PartClass::Metadata),
        mime_types::CALC_CHAIN => Some(PartClass::CalcChain),
        mime_types::CORE_PROPERTIES => Some(PartClass::CoreProps),
        mime_types::EXTENDED_PROPERTIES => Some(PartClass::ExtProps),
        mime_types::CUSTOM_PROPERTIES => Some(PartClass::CustProps),
        mime_types::RELS => Some(PartClass::Rels),
        _ => None,
    }
}
