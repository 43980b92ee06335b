//! gridbook-xml: Low-level XML schema types for SpreadsheetML packages.
//!
//! This crate provides Rust structures for the XML parts of an `.xlsx`
//! package, with serde-based serialization and deserialization via quick-xml,
//! plus the OOXML-specific string escape layer.
//!
//! # Modules
//!
//! - [`namespaces`] - OOXML namespace URI constants
//! - [`escape`] - `_xHHHH_` escapes, HTML escapes, W3C datetimes
//! - [`content_types`] - `[Content_Types].xml` structures
//! - [`relationships`] - Relationships (`.rels`) structures
//! - [`workbook`] - `xl/workbook.xml` structures
//! - [`worksheet`] - `xl/worksheets/sheet*.xml` structures
//! - [`styles`] - `xl/styles.xml` structures
//! - [`shared_strings`] - `xl/sharedStrings.xml` structures
//! - [`comments`] - `xl/comments*.xml` structures
//! - [`threaded_comment`] - threaded comments and the person list
//! - [`doc_props`] - `docProps/*.xml` structures
//! - [`metadata`] - `xl/metadata.xml` and `xl/calcChain.xml` structures

pub mod comments;
pub mod content_types;
pub mod doc_props;
pub mod escape;
pub mod metadata;
pub mod namespaces;
pub mod relationships;
pub mod shared_strings;
pub mod styles;
pub mod threaded_comment;
pub mod workbook;
pub mod worksheet;
