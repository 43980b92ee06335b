//! Metadata and calc-chain schema structures.
//!
//! `xl/metadata.xml` carries cell-metadata descriptors; the only one this
//! codec emits is the dynamic-array descriptor (`XLDAPR`), which is enough
//! for array formulas to be recognized as dynamic. `xl/calcChain.xml` lists
//! the cells the calculation engine last evaluated, in order.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// The fixed `xl/metadata.xml` template: one `XLDAPR` metadata type and one
/// cell-metadata record pointing at it.
pub const DYNAMIC_ARRAY_METADATA: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<metadata xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:xlrd="http://schemas.microsoft.com/office/spreadsheetml/2017/richdata" xmlns:xda="http://schemas.microsoft.com/office/spreadsheetml/2017/dynamicarray">"#,
    r#"<metadataTypes count="1">"#,
    r#"<metadataType name="XLDAPR" minSupportedVersion="120000" copy="1" pasteAll="1" pasteValues="1" merge="1" splitFirst="1" rowColShift="1" clearFormats="1" clearComments="1" assign="1" coerce="1" cellMeta="1"/>"#,
    r#"</metadataTypes>"#,
    r#"<futureMetadata name="XLDAPR" count="1">"#,
    r#"<bk><extLst><ext uri="{bdbb8cdc-fa1e-496e-a857-3c3f30c029c3}">"#,
    r#"<xda:dynamicArrayProperties fDynamic="1" fCollapsed="0"/>"#,
    r#"</ext></extLst></bk>"#,
    r#"</futureMetadata>"#,
    r#"<cellMetadata count="1"><bk><rc t="1" v="0"/></bk></cellMetadata>"#,
    r#"</metadata>"#
);

/// Calc chain root element (`xl/calcChain.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "calcChain")]
pub struct CalcChainXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "c", default)]
    pub cells: Vec<CalcChainCell>,
}

/// One calc-chain entry. The sheet index `i` is sticky: entries that omit
/// it belong to the most recent explicit index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcChainCell {
    #[serde(rename = "@r")]
    pub r: String,

    #[serde(rename = "@i", skip_serializing_if = "Option::is_none")]
    pub i: Option<u32>,

    #[serde(rename = "@s", skip_serializing_if = "Option::is_none")]
    pub s: Option<u32>,
}

impl Default for CalcChainXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            cells: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_template_mentions_xldapr() {
        assert!(DYNAMIC_ARRAY_METADATA.contains("XLDAPR"));
        assert!(DYNAMIC_ARRAY_METADATA.contains("dynamicArrayProperties"));
        assert!(DYNAMIC_ARRAY_METADATA.contains("cellMetadata count=\"1\""));
    }

    #[test]
    fn test_calc_chain_parse_sticky_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<calcChain xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <c r="B2" i="1"/>
  <c r="B3"/>
  <c r="A1" i="2"/>
</calcChain>"#;
        let parsed: CalcChainXml = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.cells.len(), 3);
        assert_eq!(parsed.cells[0].i, Some(1));
        assert_eq!(parsed.cells[1].i, None);
        assert_eq!(parsed.cells[2].i, Some(2));
    }

    #[test]
    fn test_calc_chain_roundtrip() {
        let cc = CalcChainXml {
            cells: vec![CalcChainCell {
                r: "C5".to_string(),
                i: Some(1),
                s: None,
            }],
            ..CalcChainXml::default()
        };
        let xml = quick_xml::se::to_string(&cc).unwrap();
        let parsed: CalcChainXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(cc, parsed);
    }
}
