//! Document properties XML schema structures.
//!
//! Covers:
//! - Core properties (`docProps/core.xml`) - Dublin Core metadata
//! - Extended properties (`docProps/app.xml`) - application metadata,
//!   including the HeadingPairs/TitlesOfParts sheet-name vector
//! - Custom properties (`docProps/custom.xml`) - user-defined typed values
//!
//! These parts lean on namespace prefixes (`dc:`, `dcterms:`, `cp:`, `vt:`)
//! that quick-xml serde does not handle, so serialization and
//! deserialization are done manually with the event API.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Reader;
use quick_xml::Writer;

use crate::namespaces;

// ---------------------------------------------------------------------------
// Core Properties (docProps/core.xml)
// ---------------------------------------------------------------------------

/// Core document properties (docProps/core.xml).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<String>,
    /// W3C datetime string.
    pub created: Option<String>,
    /// W3C datetime string.
    pub modified: Option<String>,
    pub category: Option<String>,
    pub content_status: Option<String>,
}

/// Serialize `CoreProperties` to its XML string representation.
pub fn serialize_core_properties(props: &CoreProperties) -> String {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .unwrap();

    let mut root = BytesStart::new("cp:coreProperties");
    root.push_attribute(("xmlns:cp", namespaces::CORE_PROPERTIES));
    root.push_attribute(("xmlns:dc", namespaces::DC));
    root.push_attribute(("xmlns:dcterms", namespaces::DC_TERMS));
    root.push_attribute(("xmlns:dcmitype", namespaces::DC_MITYPE));
    root.push_attribute(("xmlns:xsi", namespaces::XSI));
    writer.write_event(Event::Start(root)).unwrap();

    fn write_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) {
        writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .unwrap();
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
    }

    fn write_dcterms_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) {
        let mut start = BytesStart::new(tag);
        start.push_attribute(("xsi:type", "dcterms:W3CDTF"));
        writer.write_event(Event::Start(start)).unwrap();
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
    }

    if let Some(ref v) = props.title {
        write_element(&mut writer, "dc:title", v);
    }
    if let Some(ref v) = props.subject {
        write_element(&mut writer, "dc:subject", v);
    }
    if let Some(ref v) = props.creator {
        write_element(&mut writer, "dc:creator", v);
    }
    if let Some(ref v) = props.keywords {
        write_element(&mut writer, "cp:keywords", v);
    }
    if let Some(ref v) = props.description {
        write_element(&mut writer, "dc:description", v);
    }
    if let Some(ref v) = props.last_modified_by {
        write_element(&mut writer, "cp:lastModifiedBy", v);
    }
    if let Some(ref v) = props.revision {
        write_element(&mut writer, "cp:revision", v);
    }
    if let Some(ref v) = props.created {
        write_dcterms_element(&mut writer, "dcterms:created", v);
    }
    if let Some(ref v) = props.modified {
        write_dcterms_element(&mut writer, "dcterms:modified", v);
    }
    if let Some(ref v) = props.category {
        write_element(&mut writer, "cp:category", v);
    }
    if let Some(ref v) = props.content_status {
        write_element(&mut writer, "cp:contentStatus", v);
    }

    writer
        .write_event(Event::End(BytesEnd::new("cp:coreProperties")))
        .unwrap();

    String::from_utf8(writer.into_inner()).unwrap()
}

/// Deserialize `CoreProperties` from an XML string.
pub fn deserialize_core_properties(xml: &str) -> Result<CoreProperties, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut props = CoreProperties::default();
    let mut current_tag: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                current_tag = Some(String::from_utf8_lossy(e.name().as_ref()).to_string());
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref tag) = current_tag {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match tag.as_str() {
                        "dc:title" | "title" => props.title = Some(text),
                        "dc:subject" | "subject" => props.subject = Some(text),
                        "dc:creator" | "creator" => props.creator = Some(text),
                        "cp:keywords" | "keywords" => props.keywords = Some(text),
                        "dc:description" | "description" => props.description = Some(text),
                        "cp:lastModifiedBy" | "lastModifiedBy" => {
                            props.last_modified_by = Some(text);
                        }
                        "cp:revision" | "revision" => props.revision = Some(text),
                        "dcterms:created" | "created" => props.created = Some(text),
                        "dcterms:modified" | "modified" => props.modified = Some(text),
                        "cp:category" | "category" => props.category = Some(text),
                        "cp:contentStatus" | "contentStatus" => {
                            props.content_status = Some(text);
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => current_tag = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
    }

    Ok(props)
}

// ---------------------------------------------------------------------------
// Extended Properties (docProps/app.xml)
// ---------------------------------------------------------------------------

/// Extended (application) properties (`docProps/app.xml`).
///
/// `sheet_names` carries the TitlesOfParts vector; the HeadingPairs vector
/// is derived from its length on write. Very-hidden sheets are excluded from
/// this vector by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedProperties {
    pub application: Option<String>,
    pub doc_security: Option<u32>,
    pub scale_crop: Option<bool>,
    pub sheet_names: Vec<String>,
    pub company: Option<String>,
    pub links_up_to_date: Option<bool>,
    pub shared_doc: Option<bool>,
    pub hyperlinks_changed: Option<bool>,
    pub app_version: Option<String>,
}

/// Serialize `ExtendedProperties` to its XML string representation.
pub fn serialize_extended_properties(props: &ExtendedProperties) -> String {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .unwrap();

    let mut root = BytesStart::new("Properties");
    root.push_attribute(("xmlns", namespaces::EXTENDED_PROPERTIES));
    root.push_attribute(("xmlns:vt", namespaces::VT));
    writer.write_event(Event::Start(root)).unwrap();

    fn write_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) {
        writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .unwrap();
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();
    }

    fn write_bool(writer: &mut Writer<Vec<u8>>, tag: &str, value: bool) {
        write_element(writer, tag, if value { "true" } else { "false" });
    }

    write_element(
        &mut writer,
        "Application",
        props.application.as_deref().unwrap_or("gridbook"),
    );
    write_element(
        &mut writer,
        "DocSecurity",
        &props.doc_security.unwrap_or(0).to_string(),
    );
    write_bool(&mut writer, "ScaleCrop", props.scale_crop.unwrap_or(false));

    // HeadingPairs: one ("Worksheets", count) pair.
    writer
        .write_event(Event::Start(BytesStart::new("HeadingPairs")))
        .unwrap();
    let mut vector = BytesStart::new("vt:vector");
    vector.push_attribute(("size", "2"));
    vector.push_attribute(("baseType", "variant"));
    writer.write_event(Event::Start(vector)).unwrap();
    writer
        .write_event(Event::Start(BytesStart::new("vt:variant")))
        .unwrap();
    write_element(&mut writer, "vt:lpstr", "Worksheets");
    writer
        .write_event(Event::End(BytesEnd::new("vt:variant")))
        .unwrap();
    writer
        .write_event(Event::Start(BytesStart::new("vt:variant")))
        .unwrap();
    write_element(&mut writer, "vt:i4", &props.sheet_names.len().to_string());
    writer
        .write_event(Event::End(BytesEnd::new("vt:variant")))
        .unwrap();
    writer
        .write_event(Event::End(BytesEnd::new("vt:vector")))
        .unwrap();
    writer
        .write_event(Event::End(BytesEnd::new("HeadingPairs")))
        .unwrap();

    // TitlesOfParts: one lpstr per (not very-hidden) sheet.
    writer
        .write_event(Event::Start(BytesStart::new("TitlesOfParts")))
        .unwrap();
    let mut vector = BytesStart::new("vt:vector");
    let size = props.sheet_names.len().to_string();
    vector.push_attribute(("size", size.as_str()));
    vector.push_attribute(("baseType", "lpstr"));
    writer.write_event(Event::Start(vector)).unwrap();
    for name in &props.sheet_names {
        write_element(&mut writer, "vt:lpstr", name);
    }
    writer
        .write_event(Event::End(BytesEnd::new("vt:vector")))
        .unwrap();
    writer
        .write_event(Event::End(BytesEnd::new("TitlesOfParts")))
        .unwrap();

    if let Some(ref v) = props.company {
        write_element(&mut writer, "Company", v);
    }
    write_bool(
        &mut writer,
        "LinksUpToDate",
        props.links_up_to_date.unwrap_or(false),
    );
    write_bool(&mut writer, "SharedDoc", props.shared_doc.unwrap_or(false));
    write_bool(
        &mut writer,
        "HyperlinksChanged",
        props.hyperlinks_changed.unwrap_or(false),
    );
    write_element(
        &mut writer,
        "AppVersion",
        props.app_version.as_deref().unwrap_or("16.0300"),
    );

    writer
        .write_event(Event::End(BytesEnd::new("Properties")))
        .unwrap();

    String::from_utf8(writer.into_inner()).unwrap()
}

/// Deserialize `ExtendedProperties` from an XML string.
pub fn deserialize_extended_properties(xml: &str) -> Result<ExtendedProperties, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut props = ExtendedProperties::default();
    let mut current_tag: Option<String> = None;
    let mut in_titles = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "TitlesOfParts" {
                    in_titles = true;
                }
                current_tag = Some(name);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref tag) = current_tag {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match tag.as_str() {
                        "Application" => props.application = Some(text),
                        "DocSecurity" => props.doc_security = text.parse().ok(),
                        "ScaleCrop" => props.scale_crop = Some(text == "true"),
                        "Company" => props.company = Some(text),
                        "LinksUpToDate" => props.links_up_to_date = Some(text == "true"),
                        "SharedDoc" => props.shared_doc = Some(text == "true"),
                        "HyperlinksChanged" => props.hyperlinks_changed = Some(text == "true"),
                        "AppVersion" => props.app_version = Some(text),
                        "vt:lpstr" | "lpstr" if in_titles => props.sheet_names.push(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"TitlesOfParts" {
                    in_titles = false;
                }
                current_tag = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
    }

    Ok(props)
}

// ---------------------------------------------------------------------------
// Custom Properties (docProps/custom.xml)
// ---------------------------------------------------------------------------

/// Custom properties collection (`docProps/custom.xml`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomProperties {
    pub properties: Vec<CustomProperty>,
}

/// A single custom property entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomProperty {
    pub name: String,
    pub value: VariantValue,
}

/// The typed value of a custom property, mapped to `vt:` elements:
/// string→`vt:lpwstr`, int→`vt:i4`, float→`vt:r8`, bool→`vt:bool`,
/// datetime→`vt:filetime`.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantValue {
    String(String),
    Int(i32),
    Float(f64),
    Bool(bool),
    /// W3C datetime string.
    DateTime(String),
}

impl VariantValue {
    /// The `vt:` element name this variant serializes as.
    pub fn tag(&self) -> &'static str {
        match self {
            VariantValue::String(_) => "vt:lpwstr",
            VariantValue::Int(_) => "vt:i4",
            VariantValue::Float(_) => "vt:r8",
            VariantValue::Bool(_) => "vt:bool",
            VariantValue::DateTime(_) => "vt:filetime",
        }
    }

    fn text(&self) -> String {
        match self {
            VariantValue::String(s) => s.clone(),
            VariantValue::Int(n) => n.to_string(),
            VariantValue::Float(f) => f.to_string(),
            VariantValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            VariantValue::DateTime(dt) => dt.clone(),
        }
    }
}

/// Standard fmtid used for custom properties.
pub const CUSTOM_PROPERTY_FMTID: &str = "{D5CDD505-2E9C-101B-9397-08002B2CF9AE}";

/// Serialize `CustomProperties` to its XML string representation. Property
/// ids are assigned sequentially starting at 2, per the OPC convention.
pub fn serialize_custom_properties(props: &CustomProperties) -> String {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .unwrap();

    let mut root = BytesStart::new("Properties");
    root.push_attribute(("xmlns", namespaces::CUSTOM_PROPERTIES));
    root.push_attribute(("xmlns:vt", namespaces::VT));
    writer.write_event(Event::Start(root)).unwrap();

    for (i, prop) in props.properties.iter().enumerate() {
        let mut elem = BytesStart::new("property");
        elem.push_attribute(("fmtid", CUSTOM_PROPERTY_FMTID));
        elem.push_attribute(("pid", (i + 2).to_string().as_str()));
        elem.push_attribute(("name", prop.name.as_str()));
        writer.write_event(Event::Start(elem)).unwrap();

        let tag = prop.value.tag();
        writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .unwrap();
        writer
            .write_event(Event::Text(BytesText::new(&prop.value.text())))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new(tag))).unwrap();

        writer
            .write_event(Event::End(BytesEnd::new("property")))
            .unwrap();
    }

    writer
        .write_event(Event::End(BytesEnd::new("Properties")))
        .unwrap();

    String::from_utf8(writer.into_inner()).unwrap()
}

/// Deserialize `CustomProperties` from an XML string. An unrecognized `vt:`
/// value element yields an error naming the offending tag.
pub fn deserialize_custom_properties(xml: &str) -> Result<CustomProperties, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut props = CustomProperties::default();
    let mut current_name: Option<String> = None;
    let mut current_tag: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "property" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            current_name =
                                Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                } else if name != "Properties" {
                    current_tag = Some(name);
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(name), Some(tag)) = (&current_name, &current_tag) {
                    let text = e.unescape().unwrap_or_default().to_string();
                    let value = match tag.as_str() {
                        "vt:lpwstr" | "lpwstr" | "vt:lpstr" | "lpstr" => {
                            VariantValue::String(text)
                        }
                        "vt:i4" | "i4" | "vt:i2" | "i2" | "vt:int" | "int" => {
                            VariantValue::Int(text.parse().map_err(|_| {
                                format!("invalid integer custom property: {text}")
                            })?)
                        }
                        "vt:r8" | "r8" | "vt:r4" | "r4" => {
                            VariantValue::Float(text.parse().map_err(|_| {
                                format!("invalid float custom property: {text}")
                            })?)
                        }
                        "vt:bool" | "bool" => VariantValue::Bool(text == "true" || text == "1"),
                        "vt:filetime" | "filetime" => VariantValue::DateTime(text),
                        other => return Err(format!("unsupported variant type: {other}")),
                    };
                    props.properties.push(CustomProperty {
                        name: name.clone(),
                        value,
                    });
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"property" {
                    current_name = None;
                }
                current_tag = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
    }

    Ok(props)
}
