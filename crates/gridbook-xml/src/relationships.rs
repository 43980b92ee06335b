//! Relationships XML schema structures.
//!
//! Used in `_rels/.rels`, `xl/_rels/workbook.xml.rels`, and per-sheet
//! relationship files.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Relationships root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Relationships")]
pub struct Relationships {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "Relationship", default)]
    pub relationships: Vec<Relationship>,
}

/// Individual relationship entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "@Type")]
    pub rel_type: String,

    #[serde(rename = "@Target")]
    pub target: String,

    #[serde(rename = "@TargetMode", skip_serializing_if = "Option::is_none")]
    pub target_mode: Option<String>,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            xmlns: namespaces::PACKAGE_RELATIONSHIPS.to_string(),
            relationships: vec![],
        }
    }
}

/// Creates the package-level relationships (`_rels/.rels`).
///
/// Contains relationships from the package root to the workbook, core
/// properties, and extended properties parts.
pub fn package_rels() -> Relationships {
    Relationships {
        xmlns: namespaces::PACKAGE_RELATIONSHIPS.to_string(),
        relationships: vec![
            Relationship {
                id: "rId1".to_string(),
                rel_type: rel_types::OFFICE_DOCUMENT.to_string(),
                target: "xl/workbook.xml".to_string(),
                target_mode: None,
            },
            Relationship {
                id: "rId2".to_string(),
                rel_type: rel_types::CORE_PROPERTIES.to_string(),
                target: "docProps/core.xml".to_string(),
                target_mode: None,
            },
            Relationship {
                id: "rId3".to_string(),
                rel_type: rel_types::EXTENDED_PROPERTIES.to_string(),
                target: "docProps/app.xml".to_string(),
                target_mode: None,
            },
        ],
    }
}

/// Relationship type URI constants.
pub mod rel_types {
    // Package level
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const CUSTOM_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties";

    // Workbook level
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const CALC_CHAIN: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain";
    pub const SHEET_METADATA: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sheetMetadata";

    // Worksheet level
    pub const COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const VML_DRAWING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/vmlDrawing";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_rels_factory() {
        let rels = package_rels();
        assert_eq!(rels.xmlns, namespaces::PACKAGE_RELATIONSHIPS);
        assert_eq!(rels.relationships.len(), 3);
        assert_eq!(rels.relationships[0].id, "rId1");
        assert_eq!(rels.relationships[0].rel_type, rel_types::OFFICE_DOCUMENT);
        assert_eq!(rels.relationships[0].target, "xl/workbook.xml");
        assert!(rels.relationships[0].target_mode.is_none());
        assert_eq!(rels.relationships[1].target, "docProps/core.xml");
        assert_eq!(rels.relationships[2].target, "docProps/app.xml");
    }

    #[test]
    fn test_relationships_roundtrip() {
        let rels = package_rels();
        let xml = quick_xml::se::to_string(&rels).unwrap();
        let parsed: Relationships = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(rels, parsed);
    }

    #[test]
    fn test_relationship_with_target_mode() {
        let rel = Relationship {
            id: "rId1".to_string(),
            rel_type: rel_types::HYPERLINK.to_string(),
            target: "https://example.com".to_string(),
            target_mode: Some("External".to_string()),
        };
        let xml = quick_xml::se::to_string(&rel).unwrap();
        assert!(xml.contains("TargetMode=\"External\""));

        let parsed: Relationship = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.target_mode, Some("External".to_string()));
    }

    #[test]
    fn test_relationship_without_target_mode_omits_attr() {
        let rel = Relationship {
            id: "rId1".to_string(),
            rel_type: rel_types::WORKSHEET.to_string(),
            target: "worksheets/sheet1.xml".to_string(),
            target_mode: None,
        };
        let xml = quick_xml::se::to_string(&rel).unwrap();
        assert!(!xml.contains("TargetMode"));
    }

    #[test]
    fn test_parse_real_rels() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

        let parsed: Relationships = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.relationships.len(), 3);
        assert_eq!(parsed.relationships[0].rel_type, rel_types::WORKSHEET);
        assert_eq!(parsed.relationships[1].rel_type, rel_types::STYLES);
        assert_eq!(parsed.relationships[2].rel_type, rel_types::SHARED_STRINGS);
    }

    #[test]
    fn test_empty_relationships_default() {
        let rels = Relationships::default();
        let xml = quick_xml::se::to_string(&rels).unwrap();
        let parsed: Relationships = quick_xml::de::from_str(&xml).unwrap();
        assert!(parsed.relationships.is_empty());
    }
}
