//! Write pipeline: workbook model -> parts -> ZIP -> bytes.
//!
//! The flow validates the model, assigns style indices and shared-string
//! slots while emitting each worksheet, then assembles the remaining parts
//! (styles, SST, workbook, theme, metadata, properties, comments/VML),
//! the Content Types, and the relationship files, and writes the package.

use std::collections::HashMap;
use std::io::{Cursor, Write as _};

use base64::Engine as _;
use chrono::Utc;
use gridbook_xml::comments::{Authors, CommentList, CommentText, CommentXml, CommentsXml};
use gridbook_xml::content_types::{mime_types, ContentTypeOverride, ContentTypes};
use gridbook_xml::doc_props::{
    serialize_core_properties, serialize_custom_properties, serialize_extended_properties,
    CoreProperties, CustomProperties, ExtendedProperties,
};
use gridbook_xml::escape::{escape_ooxml, write_w3c_datetime};
use gridbook_xml::metadata::DYNAMIC_ARRAY_METADATA;
use gridbook_xml::relationships::{package_rels, rel_types};
use gridbook_xml::shared_strings::Text;
use gridbook_xml::threaded_comment::{
    PersonListXml, PersonXml, ThreadedCommentXml, ThreadedCommentsXml,
    REL_TYPE_PERSON, REL_TYPE_THREADED_COMMENT, THREADED_COMMENTS_NS,
};
use gridbook_xml::workbook::{
    BookViews, DefinedNameXml, DefinedNames, SheetEntry, Sheets, WorkbookPr, WorkbookView,
    WorkbookXml,
};
use gridbook_xml::worksheet::{
    cell_types, AutoFilter, CellFormula, CellXml, Col, Cols, Dimension, HyperlinkXml, Hyperlinks,
    LegacyDrawingRef, MergeCell, MergeCells, PageMargins, Row, SheetData, SheetView, SheetViews,
    WorksheetXml,
};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::cell::{error_code_label, Cell, CellValue, NumberFormat};
use crate::comment::{comment_guid, person_guid};
use crate::convert::csv::{sheet_to_csv, CsvOptions};
use crate::convert::html::{sheet_to_html, HtmlOptions};
use crate::datetime::datetime_to_serial;
use crate::error::{Error, Result};
use crate::numfmt::FormatTable;
use crate::opc::{relative_target, rels_path_for, RelationshipSet};
use crate::sheet::Worksheet;
use crate::sst::SharedStringTable;
use crate::style::StyleBuilder;
use crate::utils::cell_ref::{decode_range, encode_cell_ref, encode_range, CellRef, Range};
use crate::utils::constants::{DEFAULT_COL_WIDTH, XML_DECLARATION};
use crate::vml::build_vml_drawing;
use crate::workbook::{Visibility, Workbook};

/// Output container format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookType {
    #[default]
    Xlsx,
    Xlsm,
    Csv,
    Tsv,
    Html,
}

/// Output byte shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
    #[default]
    Buffer,
    Base64,
    String,
}

/// The produced output.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutput {
    Buffer(Vec<u8>),
    Base64(String),
    Text(String),
}

impl WriteOutput {
    /// The raw bytes, whatever the shape.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            WriteOutput::Buffer(b) => b,
            WriteOutput::Base64(s) | WriteOutput::Text(s) => s.into_bytes(),
        }
    }
}

/// Options for [`write_workbook`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub book_type: BookType,
    /// Pool strings into a shared string table.
    pub book_sst: bool,
    /// DEFLATE the package entries (stored otherwise).
    pub compression: bool,
    /// Write date cells as ISO strings instead of serial numbers.
    pub cell_dates: bool,
    /// Emit style records for cells carrying a style binding.
    pub cell_styles: bool,
    pub output: OutputKind,
    /// Core-property override, replacing the workbook's own.
    pub props: Option<CoreProperties>,
    /// Raw theme part replacement.
    pub theme_xml: Option<Vec<u8>>,
    /// Skip workbook validation (the escape hatch).
    pub skip_validation: bool,
}

/// Serialize a workbook per the options.
pub fn write_workbook(wb: &Workbook, opts: &WriteOptions) -> Result<WriteOutput> {
    if !opts.skip_validation {
        wb.validate()?;
    }

    match opts.book_type {
        BookType::Csv | BookType::Tsv => {
            let text = match wb.sheet_at(wb.props.active_tab as usize).or_else(|| wb.sheet_at(0)) {
                Some((_, ws)) => {
                    let csv_opts = CsvOptions {
                        field_separator: if opts.book_type == BookType::Tsv {
                            "\t".to_string()
                        } else {
                            ",".to_string()
                        },
                        date1904: wb.props.date1904,
                        ..CsvOptions::default()
                    };
                    sheet_to_csv(ws, &csv_opts)?
                }
                None => String::new(),
            };
            shape_text_output(text, opts.output)
        }
        BookType::Html => {
            let text = match wb.sheet_at(wb.props.active_tab as usize).or_else(|| wb.sheet_at(0)) {
                Some((_, ws)) => sheet_to_html(
                    ws,
                    &HtmlOptions {
                        date1904: wb.props.date1904,
                        ..HtmlOptions::default()
                    },
                )?,
                None => String::new(),
            };
            shape_text_output(text, opts.output)
        }
        BookType::Xlsx | BookType::Xlsm => {
            let bytes = write_package(wb, opts)?;
            match opts.output {
                OutputKind::Buffer => Ok(WriteOutput::Buffer(bytes)),
                OutputKind::Base64 => Ok(WriteOutput::Base64(
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                )),
                OutputKind::String => Err(Error::Internal(
                    "string output is only available for text book types".to_string(),
                )),
            }
        }
    }
}

fn shape_text_output(text: String, kind: OutputKind) -> Result<WriteOutput> {
    Ok(match kind {
        OutputKind::String => WriteOutput::Text(text),
        OutputKind::Buffer => WriteOutput::Buffer(text.into_bytes()),
        OutputKind::Base64 => WriteOutput::Base64(
            base64::engine::general_purpose::STANDARD.encode(text.as_bytes()),
        ),
    })
}

/// Everything produced for one sheet besides the worksheet XML itself.
#[derive(Default)]
struct SheetExtras {
    rels: RelationshipSet,
    comments: Option<CommentsXml>,
    threaded: Option<ThreadedCommentsXml>,
    vml: Option<String>,
}

/// Running state for threaded-comment GUID fabrication.
#[derive(Default)]
struct ThreadState {
    /// author display name -> person GUID.
    persons: Vec<(String, String)>,
    person_ids: HashMap<String, String>,
    tcid: u64,
}

impl ThreadState {
    fn person_id(&mut self, author: &str) -> String {
        if let Some(id) = self.person_ids.get(author) {
            return id.clone();
        }
        let id = person_guid(self.persons.len() as u64 + 1);
        self.persons.push((author.to_string(), id.clone()));
        self.person_ids.insert(author.to_string(), id.clone());
        id
    }
}

fn write_package(wb: &Workbook, opts: &WriteOptions) -> Result<Vec<u8>> {
    let mut fmt_table = FormatTable::new();
    let mut styles = StyleBuilder::new();
    let mut sst = SharedStringTable::new();
    let mut threads = ThreadState::default();
    let mut any_array_formula = false;

    // Pass over sheets, building the worksheet parts and their side parts.
    let sheet_count = wb.sheet_count();
    let mut sheet_xml: Vec<WorksheetXml> = Vec::with_capacity(sheet_count);
    let mut sheet_extras: Vec<SheetExtras> = Vec::with_capacity(sheet_count);

    for index in 0..sheet_count {
        let (_, ws) = wb
            .sheet_at(index)
            .ok_or_else(|| Error::Internal("sheet order desynchronized".to_string()))?;
        let (xml, extras) = build_sheet_parts(
            ws,
            index,
            opts,
            &mut fmt_table,
            &mut styles,
            &mut sst,
            &mut threads,
            &mut any_array_formula,
        )?;
        sheet_xml.push(xml);
        sheet_extras.push(extras);
    }

    // Workbook part and workbook-level relationships.
    let mut wb_rels = RelationshipSet::new();
    let mut sheet_entries = Vec::with_capacity(sheet_count);
    for (index, info) in wb.sheet_info().iter().enumerate() {
        let rid = wb_rels.add(
            None,
            rel_types::WORKSHEET,
            &format!("worksheets/sheet{}.xml", index + 1),
            None,
        )?;
        sheet_entries.push(SheetEntry {
            name: info.name.clone(),
            sheet_id: index as u32 + 1,
            state: info.visibility.state_attr().map(str::to_string),
            r_id: rid,
        });
    }
    wb_rels.add(None, rel_types::STYLES, "styles.xml", None)?;
    wb_rels.add(None, rel_types::THEME, "theme/theme1.xml", None)?;
    if opts.book_sst && !sst.is_empty() {
        wb_rels.add(None, rel_types::SHARED_STRINGS, "sharedStrings.xml", None)?;
    }
    if any_array_formula {
        wb_rels.add(None, rel_types::SHEET_METADATA, "metadata.xml", None)?;
    }
    if !threads.persons.is_empty() {
        wb_rels.add(None, REL_TYPE_PERSON, "persons/person.xml", None)?;
    }

    let workbook_part = WorkbookXml {
        workbook_pr: Some(WorkbookPr {
            date1904: wb.props.date1904.then_some(true),
            filter_privacy: wb.props.filter_privacy.then_some(true),
            code_name: wb.props.code_name.clone(),
        }),
        book_views: Some(BookViews {
            workbook_views: vec![WorkbookView {
                active_tab: (wb.props.active_tab > 0).then_some(wb.props.active_tab),
                ..WorkbookView::default()
            }],
        }),
        sheets: Sheets {
            sheets: sheet_entries,
        },
        defined_names: (!wb.defined_names.is_empty()).then(|| DefinedNames {
            defined_names: wb
                .defined_names
                .iter()
                .map(|dn| DefinedNameXml {
                    name: dn.name.clone(),
                    local_sheet_id: dn.sheet.map(|i| i as u32),
                    hidden: dn.hidden.then_some(true),
                    value: dn.refers_to.clone(),
                })
                .collect(),
        }),
        calc_pr: None,
        ..WorkbookXml::default()
    };

    // Content types.
    let mut content_types = ContentTypes::default();
    let flavor_ct = if opts.book_type == BookType::Xlsm {
        mime_types::WORKBOOK_MACRO
    } else {
        mime_types::WORKBOOK
    };
    let mut push_override = |part: String, ct: &str| {
        content_types.overrides.push(ContentTypeOverride {
            part_name: part,
            content_type: ct.to_string(),
        });
    };
    push_override("/xl/workbook.xml".to_string(), flavor_ct);
    for index in 0..sheet_count {
        push_override(
            format!("/xl/worksheets/sheet{}.xml", index + 1),
            mime_types::WORKSHEET,
        );
    }
    push_override("/xl/styles.xml".to_string(), mime_types::STYLES);
    push_override("/xl/theme/theme1.xml".to_string(), mime_types::THEME);
    if opts.book_sst && !sst.is_empty() {
        push_override(
            "/xl/sharedStrings.xml".to_string(),
            mime_types::SHARED_STRINGS,
        );
    }
    if any_array_formula {
        push_override("/xl/metadata.xml".to_string(), mime_types::SHEET_METADATA);
    }
    for (index, extras) in sheet_extras.iter().enumerate() {
        if extras.comments.is_some() {
            push_override(
                format!("/xl/comments{}.xml", index + 1),
                mime_types::COMMENTS,
            );
        }
        if extras.threaded.is_some() {
            push_override(
                format!("/xl/threadedComments/threadedComment{}.xml", index + 1),
                mime_types::THREADED_COMMENTS,
            );
        }
    }
    if !threads.persons.is_empty() {
        push_override("/xl/persons/person.xml".to_string(), mime_types::PERSON);
    }
    push_override("/docProps/core.xml".to_string(), mime_types::CORE_PROPERTIES);
    push_override(
        "/docProps/app.xml".to_string(),
        mime_types::EXTENDED_PROPERTIES,
    );
    if !wb.custom_props.is_empty() {
        push_override(
            "/docProps/custom.xml".to_string(),
            mime_types::CUSTOM_PROPERTIES,
        );
    }

    // Package relationships: the fixed trio plus custom properties.
    let mut package = package_rels();
    if !wb.custom_props.is_empty() {
        let mut set = RelationshipSet::from_xml(&package, "");
        set.add(
            None,
            rel_types::CUSTOM_PROPERTIES,
            "docProps/custom.xml",
            None,
        )?;
        package = set.to_xml();
    }

    // Document properties.
    let now = write_w3c_datetime(Utc::now().naive_utc());
    let mut core = opts
        .props
        .clone()
        .or_else(|| wb.core_props.clone())
        .unwrap_or_default();
    if core.created.is_none() {
        core.created = Some(now.clone());
    }
    if core.modified.is_none() {
        core.modified = Some(now);
    }

    let app = ExtendedProperties {
        sheet_names: wb
            .sheet_info()
            .iter()
            .filter(|s| s.visibility != Visibility::VeryHidden)
            .map(|s| s.name.clone())
            .collect(),
        ..ExtendedProperties::default()
    };

    // Assemble the ZIP package.
    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut zip = zip::ZipWriter::new(cursor);
        let method = if opts.compression {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default().compression_method(method);

        write_xml_entry(&mut zip, "[Content_Types].xml", &content_types, options)?;
        write_xml_entry(&mut zip, "_rels/.rels", &package, options)?;
        write_xml_entry(&mut zip, "xl/workbook.xml", &workbook_part, options)?;
        write_xml_entry(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &wb_rels.to_xml(),
            options,
        )?;

        for (index, xml) in sheet_xml.iter().enumerate() {
            let path = format!("xl/worksheets/sheet{}.xml", index + 1);
            write_xml_entry(&mut zip, &path, xml, options)?;
            let extras = &sheet_extras[index];
            if !extras.rels.is_empty() {
                write_xml_entry(&mut zip, &rels_path_for(&path), &extras.rels.to_xml(), options)?;
            }
            if let Some(ref comments) = extras.comments {
                write_xml_entry(
                    &mut zip,
                    &format!("xl/comments{}.xml", index + 1),
                    comments,
                    options,
                )?;
            }
            if let Some(ref threaded) = extras.threaded {
                write_xml_entry(
                    &mut zip,
                    &format!("xl/threadedComments/threadedComment{}.xml", index + 1),
                    threaded,
                    options,
                )?;
            }
            if let Some(ref vml) = extras.vml {
                write_raw_entry(
                    &mut zip,
                    &format!("xl/drawings/vmlDrawing{}.vml", index + 1),
                    vml.as_bytes(),
                    options,
                )?;
            }
        }

        write_xml_entry(&mut zip, "xl/styles.xml", &styles.build(&fmt_table), options)?;

        if opts.book_sst && !sst.is_empty() {
            write_xml_entry(&mut zip, "xl/sharedStrings.xml", &sst.to_sst(), options)?;
        }
        if any_array_formula {
            write_raw_entry(
                &mut zip,
                "xl/metadata.xml",
                DYNAMIC_ARRAY_METADATA.as_bytes(),
                options,
            )?;
        }
        if !threads.persons.is_empty() {
            let list = PersonListXml {
                xmlns: THREADED_COMMENTS_NS.to_string(),
                persons: threads
                    .persons
                    .iter()
                    .map(|(name, id)| PersonXml {
                        display_name: name.clone(),
                        id: id.clone(),
                        user_id: Some(name.clone()),
                        provider_id: Some("None".to_string()),
                    })
                    .collect(),
            };
            write_xml_entry(&mut zip, "xl/persons/person.xml", &list, options)?;
        }

        let theme = opts
            .theme_xml
            .clone()
            .unwrap_or_else(crate::theme::default_theme_xml);
        write_raw_entry(&mut zip, "xl/theme/theme1.xml", &theme, options)?;

        write_raw_entry(
            &mut zip,
            "docProps/core.xml",
            serialize_core_properties(&core).as_bytes(),
            options,
        )?;
        write_raw_entry(
            &mut zip,
            "docProps/app.xml",
            serialize_extended_properties(&app).as_bytes(),
            options,
        )?;
        if !wb.custom_props.is_empty() {
            let props = CustomProperties {
                properties: wb.custom_props.clone(),
            };
            write_raw_entry(
                &mut zip,
                "docProps/custom.xml",
                serialize_custom_properties(&props).as_bytes(),
                options,
            )?;
        }

        zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
    }
    Ok(buf)
}

#[allow(clippy::too_many_arguments)]
fn build_sheet_parts(
    ws: &Worksheet,
    sheet_index: usize,
    opts: &WriteOptions,
    fmt_table: &mut FormatTable,
    styles: &mut StyleBuilder,
    sst: &mut SharedStringTable,
    threads: &mut ThreadState,
    any_array_formula: &mut bool,
) -> Result<(WorksheetXml, SheetExtras)> {
    let mut extras = SheetExtras::default();
    let sheet_path = format!("xl/worksheets/sheet{}.xml", sheet_index + 1);

    // Rows, grouped from the row-major cell iterator.
    let mut rows: Vec<Row> = Vec::new();
    let mut comment_cells: Vec<(CellRef, Vec<crate::comment::CellComment>)> = Vec::new();
    let mut hyperlinks: Vec<HyperlinkXml> = Vec::new();

    for (at, cell) in ws.iter() {
        if !cell.comments.is_empty() {
            comment_cells.push((at, cell.comments.clone()));
        }
        if let Some(ref link) = cell.hyperlink {
            hyperlinks.push(build_hyperlink(at, link, &mut extras.rels)?);
        }

        let Some(cell_xml) = build_cell_xml(cell, at, opts, fmt_table, styles, sst, any_array_formula)?
        else {
            continue;
        };

        let row_number = at.row + 1;
        match rows.last_mut() {
            Some(last) if last.r == row_number => last.cells.push(cell_xml),
            _ => rows.push(Row {
                r: row_number,
                ht: None,
                hidden: None,
                custom_height: None,
                cells: vec![cell_xml],
            }),
        }
    }

    // Row info: attach to emitted rows, add bare rows for info-only rows.
    for (&row_idx, info) in &ws.rows {
        let row_number = row_idx + 1;
        let pos = rows.binary_search_by_key(&row_number, |r| r.r);
        let row = match pos {
            Ok(i) => &mut rows[i],
            Err(i) => {
                rows.insert(
                    i,
                    Row {
                        r: row_number,
                        ht: None,
                        hidden: None,
                        custom_height: None,
                        cells: vec![],
                    },
                );
                &mut rows[i]
            }
        };
        row.ht = info.height;
        row.hidden = info.hidden.then_some(true);
        row.custom_height = info.height.is_some().then_some(true);
    }
    rows.retain(|r| !r.cells.is_empty() || r.ht.is_some() || r.hidden.is_some());

    let dimension = ws
        .dimension
        .map(|d| encode_range(d))
        .unwrap_or_else(|| "A1".to_string());

    let cols = build_cols(ws);

    // Comments and their side parts.
    let legacy_drawing = if comment_cells.is_empty() {
        None
    } else {
        Some(build_comment_parts(
            &comment_cells,
            sheet_index,
            &sheet_path,
            &mut extras,
            threads,
        )?)
    };

    let xml = WorksheetXml {
        dimension: Some(Dimension {
            reference: dimension,
        }),
        sheet_views: Some(SheetViews {
            sheet_views: vec![SheetView {
                tab_selected: (sheet_index == 0).then_some(true),
                workbook_view_id: 0,
            }],
        }),
        sheet_format_pr: None,
        cols,
        sheet_data: SheetData { rows },
        auto_filter: ws.autofilter.map(|r| AutoFilter {
            reference: encode_range(r),
        }),
        merge_cells: (!ws.merges.is_empty()).then(|| MergeCells {
            count: Some(ws.merges.len() as u32),
            merge_cells: ws
                .merges
                .iter()
                .map(|&m| MergeCell {
                    reference: encode_range(m),
                })
                .collect(),
        }),
        hyperlinks: (!hyperlinks.is_empty()).then(|| Hyperlinks { hyperlinks }),
        page_margins: ws.margins.as_ref().map(|m| PageMargins {
            left: m.left,
            right: m.right,
            top: m.top,
            bottom: m.bottom,
            header: m.header,
            footer: m.footer,
        }),
        legacy_drawing,
        ..WorksheetXml::default()
    };

    Ok((xml, extras))
}

fn build_cols(ws: &Worksheet) -> Option<Cols> {
    let cols: Vec<Col> = ws
        .cols
        .iter()
        .enumerate()
        .filter_map(|(idx, info)| {
            info.as_ref().map(|info| Col {
                min: idx as u32 + 1,
                max: idx as u32 + 1,
                width: Some(info.width.unwrap_or(DEFAULT_COL_WIDTH)),
                hidden: info.hidden.then_some(true),
                custom_width: Some(true),
            })
        })
        .collect();
    (!cols.is_empty()).then_some(Cols { cols })
}

fn build_hyperlink(
    at: CellRef,
    link: &crate::cell::Hyperlink,
    rels: &mut RelationshipSet,
) -> Result<HyperlinkXml> {
    let reference = encode_cell_ref(at)?;
    if let Some(location) = link.target.strip_prefix('#') {
        // Internal link: location only, no relationship.
        return Ok(HyperlinkXml {
            reference,
            location: Some(location.to_string()),
            tooltip: link.tooltip.clone(),
            ..HyperlinkXml::default()
        });
    }
    let (target, location) = match link.target.split_once('#') {
        Some((t, loc)) => (t.to_string(), Some(loc.to_string())),
        None => (link.target.clone(), None),
    };
    let rid = rels.add(None, rel_types::HYPERLINK, &target, Some("External"))?;
    Ok(HyperlinkXml {
        reference,
        r_id: Some(rid),
        location,
        tooltip: link.tooltip.clone(),
        ..HyperlinkXml::default()
    })
}

fn build_cell_xml(
    cell: &Cell,
    at: CellRef,
    opts: &WriteOptions,
    fmt_table: &mut FormatTable,
    styles: &mut StyleBuilder,
    sst: &mut SharedStringTable,
    any_array_formula: &mut bool,
) -> Result<Option<CellXml>> {
    let is_date = matches!(cell.value, CellValue::DateTime(_));

    // Blank stubs survive only under cell_styles, except array-group
    // members, which must keep their place in the grid.
    if cell.is_blank()
        && cell.array_range.is_none()
        && !(opts.cell_styles && (cell.num_fmt.is_some() || cell.style.is_some()))
    {
        return Ok(None);
    }

    // Style index: explicit format first, then the tracked binding, then
    // the short-date default for date values written as serials.
    let mut style_index = None;
    if let Some(ref fmt) = cell.num_fmt {
        style_index = Some(styles.xf_for(fmt, fmt_table)?);
    } else if opts.cell_styles {
        if let Some(style) = cell.style {
            style_index = Some(styles.xf_for(&NumberFormat::Id(style.num_fmt_id), fmt_table)?);
        }
    }
    if style_index.is_none() && is_date && !opts.cell_dates {
        style_index = Some(styles.xf_for(&NumberFormat::Id(14), fmt_table)?);
    }

    let mut xml = CellXml {
        r: Some(encode_cell_ref(at)?),
        s: style_index.filter(|&s| s > 0),
        ..CellXml::default()
    };

    // Formula element. Array origins carry the range; covered non-origin
    // cells carry nothing.
    let array_origin = match (cell.array_range.as_deref(), &cell.formula) {
        (Some(range), Some(_)) => {
            let parsed: Range = decode_range(range)?;
            *any_array_formula = true;
            (parsed.start == at).then(|| range.to_string())
        }
        _ => None,
    };
    if let Some(ref formula) = cell.formula {
        if cell.array_range.is_none() || array_origin.is_some() {
            xml.f = Some(CellFormula {
                t: array_origin.is_some().then(|| "array".to_string()),
                reference: array_origin,
                si: None,
                value: Some(escape_ooxml(formula)),
            });
        }
    }

    match &cell.value {
        CellValue::Empty => {}
        CellValue::Number(n) => {
            xml.v = Some(number_to_string(*n));
        }
        CellValue::Text(t) => {
            if opts.book_sst {
                let idx = match &cell.rich_runs {
                    Some(runs) => sst.add_rich(t, runs.clone()),
                    None => sst.add(t),
                };
                xml.t = Some(cell_types::SHARED_STRING.to_string());
                xml.v = Some(idx.to_string());
            } else {
                xml.t = Some(cell_types::FORMULA_STRING.to_string());
                xml.v = Some(escape_ooxml(t));
            }
        }
        CellValue::Bool(b) => {
            xml.t = Some(cell_types::BOOLEAN.to_string());
            xml.v = Some(if *b { "1" } else { "0" }.to_string());
        }
        CellValue::Error(code) => {
            xml.t = Some(cell_types::ERROR.to_string());
            xml.v = Some(error_code_label(*code).to_string());
        }
        CellValue::DateTime(dt) => {
            if opts.cell_dates {
                xml.t = Some(cell_types::DATE.to_string());
                xml.v = Some(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string());
            } else {
                let serial = datetime_to_serial(*dt, false);
                xml.v = Some(number_to_string(serial));
            }
        }
    }

    Ok(Some(xml))
}

fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Build the legacy comments part, the threaded part when needed, the VML
/// drawing, and the sheet relationships tying them together. Returns the
/// legacy-drawing reference for the worksheet element.
fn build_comment_parts(
    comment_cells: &[(CellRef, Vec<crate::comment::CellComment>)],
    sheet_index: usize,
    sheet_path: &str,
    extras: &mut SheetExtras,
    threads: &mut ThreadState,
) -> Result<LegacyDrawingRef> {
    let mut authors: Vec<String> = Vec::new();
    fn author_index(name: &str, authors: &mut Vec<String>) -> u32 {
        if let Some(pos) = authors.iter().position(|a| a == name) {
            return pos as u32;
        }
        authors.push(name.to_string());
        authors.len() as u32 - 1
    }

    let mut legacy_comments: Vec<CommentXml> = Vec::new();
    let mut threaded_comments: Vec<ThreadedCommentXml> = Vec::new();
    let mut vml_cells: Vec<(CellRef, bool)> = Vec::new();

    for (at, comments) in comment_cells {
        let reference = encode_cell_ref(*at)?;
        let hidden = comments.iter().all(|c| c.hidden);
        vml_cells.push((*at, hidden));

        let mut thread_root: Option<String> = None;
        for comment in comments {
            let author_id = author_index(&comment.author, &mut authors);
            legacy_comments.push(CommentXml {
                reference: reference.clone(),
                author_id,
                text: CommentText {
                    t: Some(Text::preserving(&escape_ooxml(&comment.text))),
                    runs: vec![],
                },
            });

            if comment.threaded {
                threads.tcid += 1;
                let id = comment_guid(threads.tcid);
                let person_id = threads.person_id(&comment.author);
                threaded_comments.push(ThreadedCommentXml {
                    cell_ref: reference.clone(),
                    date_time: None,
                    person_id,
                    id: id.clone(),
                    parent_id: thread_root.clone(),
                    done: None,
                    text: escape_ooxml(&comment.text),
                });
                if thread_root.is_none() {
                    thread_root = Some(id);
                }
            }
        }
    }

    extras.comments = Some(CommentsXml {
        authors: Authors { authors },
        comment_list: CommentList {
            comments: legacy_comments,
        },
        ..CommentsXml::default()
    });

    let comments_path = format!("xl/comments{}.xml", sheet_index + 1);
    extras.rels.add(
        None,
        rel_types::COMMENTS,
        &relative_target(sheet_path, &comments_path),
        None,
    )?;

    if !threaded_comments.is_empty() {
        extras.threaded = Some(ThreadedCommentsXml {
            xmlns: THREADED_COMMENTS_NS.to_string(),
            comments: threaded_comments,
        });
        let tc_path = format!(
            "xl/threadedComments/threadedComment{}.xml",
            sheet_index + 1
        );
        extras.rels.add(
            None,
            REL_TYPE_THREADED_COMMENT,
            &relative_target(sheet_path, &tc_path),
            None,
        )?;
    }

    let vml_path = format!("xl/drawings/vmlDrawing{}.vml", sheet_index + 1);
    let vml_rid = extras.rels.add(
        None,
        rel_types::VML_DRAWING,
        &relative_target(sheet_path, &vml_path),
        None,
    )?;
    let rid_number: u32 = vml_rid.trim_start_matches("rId").parse().unwrap_or(1);
    extras.vml = Some(build_vml_drawing(&vml_cells, rid_number));

    Ok(LegacyDrawingRef { r_id: vml_rid })
}

fn write_xml_entry<T: serde::Serialize, W: std::io::Write + std::io::Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    value: &T,
    options: SimpleFileOptions,
) -> Result<()> {
    let body = quick_xml::se::to_string(value).map_err(|e| Error::XmlParse(e.to_string()))?;
    zip.start_file(name, options)
        .map_err(|e| Error::Zip(e.to_string()))?;
    zip.write_all(XML_DECLARATION.as_bytes())?;
    zip.write_all(b"\n")?;
    zip.write_all(body.as_bytes())?;
    Ok(())
}

fn write_raw_entry<W: std::io::Write + std::io::Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| Error::Zip(e.to_string()))?;
    zip.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    fn one_sheet_workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.append_sheet(Some("S"), Worksheet::new(), false).unwrap();
        wb.set_cell_value("S", "A1", CellValue::Number(42.0)).unwrap();
        wb.set_cell_value("S", "B1", CellValue::Text("hi".to_string()))
            .unwrap();
        wb
    }

    #[test]
    fn test_write_produces_zip_with_expected_parts() {
        let wb = one_sheet_workbook();
        let out = write_workbook(&wb, &WriteOptions::default()).unwrap();
        let WriteOutput::Buffer(bytes) = out else {
            panic!("expected buffer output");
        };
        assert_eq!(&bytes[..2], b"PK");

        let cursor = Cursor::new(bytes);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/worksheets/sheet1.xml",
            "xl/styles.xml",
            "xl/theme/theme1.xml",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {part}");
        }
        // No SST requested, so none written.
        assert!(archive.by_name("xl/sharedStrings.xml").is_err());
    }

    #[test]
    fn test_write_with_sst() {
        let wb = one_sheet_workbook();
        let opts = WriteOptions {
            book_sst: true,
            ..WriteOptions::default()
        };
        let bytes = write_workbook(&wb, &opts).unwrap().into_bytes();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("xl/sharedStrings.xml").is_ok());
    }

    #[test]
    fn test_write_validates_sheet_names() {
        let mut wb = Workbook::new();
        wb.push_sheet_unchecked(
            "bad[name".to_string(),
            Visibility::Visible,
            Worksheet::new(),
        );
        assert!(matches!(
            write_workbook(&wb, &WriteOptions::default()),
            Err(Error::InvalidSheetName(_))
        ));
        // The explicit escape hatch skips validation.
        let opts = WriteOptions {
            skip_validation: true,
            ..WriteOptions::default()
        };
        assert!(write_workbook(&wb, &opts).is_ok());
    }

    #[test]
    fn test_csv_book_type_string_output() {
        let wb = one_sheet_workbook();
        let opts = WriteOptions {
            book_type: BookType::Csv,
            output: OutputKind::String,
            ..WriteOptions::default()
        };
        let WriteOutput::Text(text) = write_workbook(&wb, &opts).unwrap() else {
            panic!("expected text output");
        };
        assert_eq!(text, "42,hi\n");
    }

    #[test]
    fn test_string_output_rejected_for_xlsx() {
        let wb = one_sheet_workbook();
        let opts = WriteOptions {
            output: OutputKind::String,
            ..WriteOptions::default()
        };
        assert!(write_workbook(&wb, &opts).is_err());
    }

    #[test]
    fn test_base64_output() {
        let wb = one_sheet_workbook();
        let opts = WriteOptions {
            output: OutputKind::Base64,
            ..WriteOptions::default()
        };
        let WriteOutput::Base64(s) = write_workbook(&wb, &opts).unwrap() else {
            panic!("expected base64 output");
        };
        // ZIP signature "PK\x03\x04" encodes as "UEsDB...".
        assert!(s.starts_with("UEsDB"));
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(42.0), "42");
        assert_eq!(number_to_string(3.5), "3.5");
        assert_eq!(number_to_string(-7.0), "-7");
    }
}
