//! Error types for the gridbook core library.
//!
//! Provides a single [`Error`] enum covering all failure modes encountered
//! when reading, writing, and manipulating workbooks.

use thiserror::Error;

/// The top-level error type for gridbook.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Cell reference errors =====
    /// The given string is not a valid A1-style cell reference.
    #[error("invalid cell reference: {0}")]
    InvalidCellReference(String),

    /// The column index is out of the allowed range (0..=16_383).
    #[error("invalid column index: {0}")]
    InvalidColumnIndex(i64),

    /// The row index is out of the allowed range (0..=1_048_575).
    #[error("invalid row index: {0}")]
    InvalidRowIndex(i64),

    /// The given string is not a valid A1-style range.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    // ===== Sheet errors =====
    /// No sheet with the given name exists in the workbook.
    #[error("sheet '{name}' does not exist")]
    SheetNotFound { name: String },

    /// A sheet with the given name already exists.
    #[error("sheet '{name}' already exists")]
    SheetAlreadyExists { name: String },

    /// The sheet name violates naming rules (empty, too long, or containing
    /// one of `\ / ? * [ ]`).
    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// The workbook already holds the maximum number of sheets.
    #[error("workbook sheet limit exceeded ({0} sheets)")]
    SheetLimitExceeded(usize),

    // ===== OPC errors =====
    /// A relationship with the given id already exists in the part.
    #[error("duplicate relationship id: {0}")]
    DuplicateRelationshipId(String),

    /// The `[Content_Types].xml` part carries an unexpected namespace.
    #[error("unknown content-types namespace: {0}")]
    UnknownNamespace(String),

    // ===== Container errors =====
    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error originating from the ZIP layer.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// The archive uses a feature or compression method the codec cannot
    /// decode.
    #[error("unsupported ZIP method: {0}")]
    UnsupportedZipMethod(String),

    /// The input carries a recognizable non-spreadsheet signature.
    #[error("not a spreadsheet: {kind} file detected")]
    NotASpreadsheet { kind: &'static str },

    /// The input is not a ZIP container and matches no known signature.
    #[error("unsupported file format")]
    UnsupportedFormat,

    // ===== Parse errors =====
    /// A worksheet cell carries an unrecognized type code.
    #[error("unrecognized cell type: {0}")]
    UnrecognizedCellType(String),

    /// A shared-string item carries content the parser does not recognize.
    #[error("unrecognized rich text content in shared string item {0}")]
    UnrecognizedRichFormat(usize),

    /// A custom-property value uses a variant type the codec cannot map.
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(String),

    /// An error encountered while parsing XML.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// An error encountered while deserializing XML into typed structures.
    #[error("XML deserialization error: {0}")]
    XmlDeserialize(String),

    /// An internal or otherwise unclassified error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_cell_reference() {
        let err = Error::InvalidCellReference("XYZ0".to_string());
        assert_eq!(err.to_string(), "invalid cell reference: XYZ0");
    }

    #[test]
    fn test_error_display_sheet_errors() {
        assert_eq!(
            Error::SheetNotFound {
                name: "Missing".to_string()
            }
            .to_string(),
            "sheet 'Missing' does not exist"
        );
        assert_eq!(
            Error::SheetAlreadyExists {
                name: "Sheet1".to_string()
            }
            .to_string(),
            "sheet 'Sheet1' already exists"
        );
        assert_eq!(
            Error::SheetLimitExceeded(65536).to_string(),
            "workbook sheet limit exceeded (65536 sheets)"
        );
    }

    #[test]
    fn test_error_display_container_errors() {
        assert_eq!(
            Error::NotASpreadsheet { kind: "pdf" }.to_string(),
            "not a spreadsheet: pdf file detected"
        );
        assert_eq!(Error::UnsupportedFormat.to_string(), "unsupported file format");
        assert_eq!(
            Error::Zip("corrupted archive".to_string()).to_string(),
            "ZIP error: corrupted archive"
        );
    }

    #[test]
    fn test_error_display_duplicate_rel_id() {
        assert_eq!(
            Error::DuplicateRelationshipId("rId3".to_string()).to_string(),
            "duplicate relationship id: rId3"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
