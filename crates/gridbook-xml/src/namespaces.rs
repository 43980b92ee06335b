//! OOXML namespace definitions.
//! Standard namespaces used across all XML documents in the package.

// Core spreadsheet namespace
pub const SPREADSHEET_ML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

// Relationship namespaces
pub const RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

// Content Types
pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

// Document properties
pub const CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
pub const CUSTOM_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties";

// Dublin Core
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
pub const DC_TERMS: &str = "http://purl.org/dc/terms/";
pub const DC_MITYPE: &str = "http://purl.org/dc/dcmitype/";

// VT variant types (docProps vectors and custom property values)
pub const VT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";

// XML standard
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

// VML (legacy drawing parts for comment shapes)
pub const VML: &str = "urn:schemas-microsoft-com:vml";
pub const VML_OFFICE: &str = "urn:schemas-microsoft-com:office:office";
pub const VML_EXCEL: &str = "urn:schemas-microsoft-com:office:excel";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_constants_are_valid_uris() {
        let namespaces = [
            SPREADSHEET_ML,
            RELATIONSHIPS,
            PACKAGE_RELATIONSHIPS,
            CONTENT_TYPES,
            CORE_PROPERTIES,
            EXTENDED_PROPERTIES,
            CUSTOM_PROPERTIES,
            DC,
            DC_TERMS,
            VT,
            XSI,
        ];
        for ns in namespaces {
            assert!(!ns.is_empty());
            assert!(
                ns.starts_with("http://") || ns.starts_with("urn:"),
                "Namespace should start with http:// or urn: but got: {ns}"
            );
        }
    }

    #[test]
    fn test_spreadsheet_ml_namespace() {
        assert_eq!(
            SPREADSHEET_ML,
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main"
        );
    }

    #[test]
    fn test_vml_namespaces() {
        assert_eq!(VML, "urn:schemas-microsoft-com:vml");
        assert_eq!(VML_EXCEL, "urn:schemas-microsoft-com:office:excel");
    }
}
