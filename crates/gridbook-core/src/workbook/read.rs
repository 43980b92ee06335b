//! Read pipeline: bytes -> ZIP -> parts -> workbook model.
//!
//! The flow follows the package structure: Content Types, package
//! relationships, the workbook part (sheet list, properties, defined
//! names), then per sheet the worksheet part with SST resolution, style
//! binding, and the comment/VML overlay.

use std::collections::HashMap;
use std::io::{Cursor, Read as _, Seek};

use chrono::NaiveDate;
use gridbook_xml::comments::CommentsXml;
use gridbook_xml::content_types::ContentTypes;
use gridbook_xml::escape::{escape_html, unescape_ooxml};
use gridbook_xml::metadata::CalcChainXml;
use gridbook_xml::namespaces;
use gridbook_xml::relationships::{rel_types, Relationships};
use gridbook_xml::shared_strings::Sst;
use gridbook_xml::styles::StyleSheet;
use gridbook_xml::threaded_comment::{
    PersonListXml, ThreadedCommentsXml, REL_TYPE_THREADED_COMMENT,
};
use gridbook_xml::workbook::WorkbookXml;
use gridbook_xml::worksheet::{cell_types, CellXml, WorksheetXml};

use crate::cell::{error_code_from_label, error_codes, Cell, CellValue, Hyperlink, NumberFormat, StyleRef};
use crate::comment::{insert_comment, CellComment};
use crate::datetime::serial_to_datetime;
use crate::error::{Error, Result};
use crate::formula::{shift_formula, strip_xlfn};
use crate::numfmt::{self, FormatTable};
use crate::opc::{rels_path_for, resolve_part_path, RelationshipSet};
use crate::sheet::{ColInfo, RowInfo, SheetMargins, Worksheet};
use crate::sst::SharedStringTable;
use crate::style::StyleTable;
use crate::utils::cell_ref::{decode_cell_ref, decode_range, decode_range_fast, CellRef, Range};
use crate::vml::parse_vml_comment_shapes;
use crate::workbook::{
    CalcChainEntry, DefinedName, Visibility, Workbook, WorkbookProps,
};

/// Which sheets to parse. Unselected sheets keep their place in the name
/// order with an empty grid.
#[derive(Debug, Clone)]
pub enum SheetSelector {
    Indices(Vec<usize>),
    Names(Vec<String>),
}

impl SheetSelector {
    fn selects(&self, index: usize, name: &str) -> bool {
        match self {
            SheetSelector::Indices(list) => list.contains(&index),
            SheetSelector::Names(list) => list.iter().any(|n| n == name),
        }
    }
}

/// Options for [`read_workbook`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Build dense worksheets.
    pub dense: bool,
    /// Promote date-formatted numeric cells to date values.
    pub cell_dates: bool,
    /// Capture formulas (default true).
    pub cell_formula: bool,
    /// Attach an HTML rendering to string cells.
    pub cell_html: bool,
    /// Attach the resolved number-format code to styled cells.
    pub cell_nf: bool,
    /// Compute cached display text (default true).
    pub cell_text: bool,
    /// Track column widths and other style-level sheet info.
    pub cell_styles: bool,
    /// Keep only the first N rows of each sheet.
    pub sheet_rows: Option<u32>,
    /// Keep stub cells (present but valueless).
    pub sheet_stubs: bool,
    /// Treat date components as UTC in downstream conversions.
    pub utc: bool,
    /// Parse only workbook-level properties (no cell data).
    pub book_props: bool,
    /// Parse only the sheet list (no cell data).
    pub book_sheets: bool,
    /// Record the package part names on the workbook.
    pub book_files: bool,
    /// Ignore the worksheet `<dimension>` and track the range from cells.
    pub nodim: bool,
    /// Keep `_xlfn.` prefixes on formulas.
    pub xlfn: bool,
    /// Strict mode: surface parse problems instead of skipping.
    pub strict: bool,
    /// Override for the short-date format (id 14).
    pub date_nf: Option<String>,
    /// Restrict parsing to selected sheets.
    pub sheets: Option<SheetSelector>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            dense: false,
            cell_dates: false,
            cell_formula: true,
            cell_html: false,
            cell_nf: false,
            cell_text: true,
            cell_styles: false,
            sheet_rows: None,
            sheet_stubs: false,
            utc: false,
            book_props: false,
            book_sheets: false,
            book_files: false,
            nodim: false,
            xlfn: false,
            strict: false,
            date_nf: None,
            sheets: None,
        }
    }
}

/// Reject inputs that cannot be an OPC package before touching the ZIP
/// layer. Recognizable non-spreadsheet signatures get a dedicated error.
fn sniff_signature(data: &[u8]) -> Result<()> {
    if data.starts_with(b"%PDF") {
        return Err(Error::NotASpreadsheet { kind: "pdf" });
    }
    if data.starts_with(b"\x89PNG") {
        return Err(Error::NotASpreadsheet { kind: "png" });
    }
    if data.len() < 2 || &data[..2] != b"PK" {
        return Err(Error::UnsupportedFormat);
    }
    Ok(())
}

/// Map ZIP-layer failures onto the error taxonomy; unsupported compression
/// methods get their own kind.
fn zip_error(e: zip::result::ZipError) -> Error {
    match e {
        zip::result::ZipError::UnsupportedArchive(msg) => {
            Error::UnsupportedZipMethod(msg.to_string())
        }
        other => Error::Zip(other.to_string()),
    }
}

pub(crate) fn read_xml_part<T: serde::de::DeserializeOwned, R: std::io::Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<T> {
    let content = read_string_part(archive, name)?;
    quick_xml::de::from_str(&content).map_err(|e| Error::XmlDeserialize(format!("{name}: {e}")))
}

pub(crate) fn read_string_part<R: std::io::Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String> {
    let mut entry = archive.by_name(name).map_err(zip_error)?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| Error::Zip(e.to_string()))?;
    Ok(content)
}

pub(crate) fn read_bytes_part<R: std::io::Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name).map_err(zip_error)?;
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| Error::Zip(e.to_string()))?;
    Ok(content)
}

/// Parse an `.xlsx` byte buffer into a [`Workbook`].
pub fn read_workbook(data: &[u8], opts: &ReadOptions) -> Result<Workbook> {
    sniff_signature(data)?;

    let cursor = Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor).map_err(zip_error)?;

    let content_types: ContentTypes = read_xml_part(&mut archive, "[Content_Types].xml")?;
    if content_types.xmlns != namespaces::CONTENT_TYPES {
        return Err(Error::UnknownNamespace(content_types.xmlns));
    }

    let part_names: Option<Vec<String>> = opts
        .book_files
        .then(|| archive.file_names().map(String::from).collect());

    // Locate the workbook part through the package relationships.
    let package_rels: Relationships = read_xml_part(&mut archive, "_rels/.rels")?;
    let package_set = RelationshipSet::from_xml(&package_rels, "");
    let wb_path = package_set
        .find_type(rel_types::OFFICE_DOCUMENT)
        .map(|r| resolve_part_path("", &r.target))
        .unwrap_or_else(|| "xl/workbook.xml".to_string());

    let workbook_xml: WorkbookXml = read_xml_part(&mut archive, &wb_path)?;
    let wb_rels_xml: Relationships =
        read_xml_part(&mut archive, &rels_path_for(&wb_path)).unwrap_or_default();
    let wb_rels = RelationshipSet::from_xml(&wb_rels_xml, &wb_path);

    let mut wb = Workbook::new();
    wb.part_names = part_names;

    if let Some(ref pr) = workbook_xml.workbook_pr {
        wb.props = WorkbookProps {
            date1904: pr.date1904.unwrap_or(false),
            filter_privacy: pr.filter_privacy.unwrap_or(false),
            code_name: pr.code_name.clone(),
            active_tab: 0,
        };
    }
    if let Some(ref views) = workbook_xml.book_views {
        if let Some(view) = views.workbook_views.first() {
            wb.props.active_tab = view.active_tab.unwrap_or(0);
        }
    }
    if let Some(ref names) = workbook_xml.defined_names {
        wb.defined_names = names
            .defined_names
            .iter()
            .map(|dn| DefinedName {
                name: dn.name.clone(),
                refers_to: dn.value.clone(),
                sheet: dn.local_sheet_id.map(|i| i as usize),
                hidden: dn.hidden.unwrap_or(false),
            })
            .collect();
    }

    // Document properties are cheap; parse them unconditionally.
    wb.core_props = read_string_part(&mut archive, "docProps/core.xml")
        .ok()
        .and_then(|xml| gridbook_xml::doc_props::deserialize_core_properties(&xml).ok());
    if let Ok(xml) = read_string_part(&mut archive, "docProps/custom.xml") {
        match gridbook_xml::doc_props::deserialize_custom_properties(&xml) {
            Ok(props) => wb.custom_props = props.properties,
            Err(e) if opts.strict => return Err(Error::UnsupportedVariant(e)),
            Err(_) => {}
        }
    }

    // Names-only and props-only modes skip all cell data.
    if opts.book_sheets || opts.book_props {
        for entry in &workbook_xml.sheets.sheets {
            let vis = Visibility::from_state_attr(entry.state.as_deref());
            let ws = if opts.dense {
                Worksheet::new_dense()
            } else {
                Worksheet::new()
            };
            wb.push_sheet_unchecked(entry.name.clone(), vis, ws);
        }
        return Ok(wb);
    }

    // Styles: xf table + custom formats into the per-call format table.
    let styles_path = wb_rels
        .find_type(rel_types::STYLES)
        .map(|r| resolve_part_path(&wb_path, &r.target))
        .unwrap_or_else(|| "xl/styles.xml".to_string());
    let style_table = read_xml_part::<StyleSheet, _>(&mut archive, &styles_path)
        .map(|ss| StyleTable::from_stylesheet(&ss))
        .unwrap_or_default();

    let mut fmt_table = FormatTable::new();
    style_table.load_into(&mut fmt_table);
    if let Some(ref dnf) = opts.date_nf {
        fmt_table.insert(14, dnf);
    }

    // Shared strings.
    let sst_path = wb_rels
        .find_type(rel_types::SHARED_STRINGS)
        .map(|r| resolve_part_path(&wb_path, &r.target))
        .unwrap_or_else(|| "xl/sharedStrings.xml".to_string());
    let sst = match read_xml_part::<Sst, _>(&mut archive, &sst_path) {
        Ok(part) => SharedStringTable::from_sst(&part, opts.strict)?,
        Err(_) => SharedStringTable::new(),
    };

    // Person list for threaded-comment author resolution.
    let mut people: HashMap<String, String> = HashMap::new();
    for ovr in &content_types.overrides {
        if gridbook_xml::content_types::classify(&ovr.content_type)
            == Some(gridbook_xml::content_types::PartClass::People)
        {
            let path = ovr.part_name.trim_start_matches('/');
            if let Ok(list) = read_xml_part::<PersonListXml, _>(&mut archive, path) {
                for p in list.persons {
                    people.insert(p.id.clone(), p.display_name.clone());
                }
            }
        }
    }

    // Calc chain: sticky sheet index across entries that omit it.
    if let Ok(cc) = read_xml_part::<CalcChainXml, _>(&mut archive, "xl/calcChain.xml") {
        let mut sticky = 1u32;
        wb.calc_chain = cc
            .cells
            .into_iter()
            .map(|c| {
                if let Some(i) = c.i {
                    sticky = i;
                }
                CalcChainEntry {
                    cell: c.r,
                    sheet_index: sticky,
                }
            })
            .collect();
    }

    let ctx = SheetContext {
        opts,
        fmt_table: &fmt_table,
        style_table: &style_table,
        sst: &sst,
        date1904: wb.props.date1904,
    };

    for (index, entry) in workbook_xml.sheets.sheets.iter().enumerate() {
        let vis = Visibility::from_state_attr(entry.state.as_deref());

        let selected = opts
            .sheets
            .as_ref()
            .map(|sel| sel.selects(index, &entry.name))
            .unwrap_or(true);
        if !selected {
            let ws = if opts.dense {
                Worksheet::new_dense()
            } else {
                Worksheet::new()
            };
            wb.push_sheet_unchecked(entry.name.clone(), vis, ws);
            continue;
        }

        let sheet_path = wb_rels
            .get(&entry.r_id)
            .filter(|r| r.rel_type == rel_types::WORKSHEET)
            .map(|r| resolve_part_path(&wb_path, &r.target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));

        let ws_xml: WorksheetXml = read_xml_part(&mut archive, &sheet_path)?;
        let sheet_rels_xml: Relationships =
            read_xml_part(&mut archive, &rels_path_for(&sheet_path)).unwrap_or_default();
        let sheet_rels = RelationshipSet::from_xml(&sheet_rels_xml, &sheet_path);

        let mut ws = parse_worksheet(&ws_xml, &ctx)?;
        attach_hyperlinks(&mut ws, &ws_xml, &sheet_rels)?;
        attach_comments(&mut archive, &mut ws, &sheet_path, &sheet_rels, &people)?;

        wb.push_sheet_unchecked(entry.name.clone(), vis, ws);
    }

    Ok(wb)
}

struct SheetContext<'a> {
    opts: &'a ReadOptions,
    fmt_table: &'a FormatTable,
    style_table: &'a StyleTable,
    sst: &'a SharedStringTable,
    date1904: bool,
}

fn parse_worksheet(ws_xml: &WorksheetXml, ctx: &SheetContext<'_>) -> Result<Worksheet> {
    let opts = ctx.opts;
    let mut ws = if opts.dense {
        Worksheet::new_dense()
    } else {
        Worksheet::new()
    };

    // Shared-formula groups: si -> (origin formula, origin cell).
    let mut shared: HashMap<u32, (String, CellRef)> = HashMap::new();
    // Array-formula ranges to mirror onto covered cells afterwards.
    let mut arrays: Vec<(Range, String)> = Vec::new();
    // The full used range, tracked across every row even past a row limit.
    let mut full_range: Option<Range> = None;

    for (row_seq, row) in ws_xml.sheet_data.rows.iter().enumerate() {
        let row_idx = row.r.saturating_sub(1).max(row_seq as u32);
        let clipped = opts
            .sheet_rows
            .map(|limit| row.r > limit)
            .unwrap_or(false);

        if !clipped {
            if row.ht.is_some() || row.hidden == Some(true) {
                ws.rows.insert(
                    row_idx,
                    RowInfo {
                        height: row.ht,
                        hidden: row.hidden.unwrap_or(false),
                    },
                );
            }
        }

        let mut next_col = 0u32;
        for cx in &row.cells {
            let at = match cx.r.as_deref() {
                Some(r) => decode_cell_ref(r)?,
                None => CellRef::new(next_col, row_idx),
            };
            next_col = at.col + 1;

            match full_range.as_mut() {
                Some(range) => range.expand_to(at),
                None => full_range = Some(Range::single(at)),
            }
            if clipped {
                continue;
            }

            if let Some(cell) = decode_cell(cx, at, ctx, &mut shared, &mut arrays)? {
                ws.insert(at, cell);
            }
        }
    }

    // Mirror array-formula ranges onto every covered cell, stubbing the
    // positions the file left bare.
    for (range, range_str) in &arrays {
        for row in range.start.row..=range.end.row {
            for col in range.start.col..=range.end.col {
                let at = CellRef::new(col, row);
                if ws.get(at).is_none() {
                    ws.insert(at, Cell::stub());
                }
                if let Some(cell) = ws.get_mut(at) {
                    cell.array_range = Some(range_str.clone());
                }
            }
        }
    }

    // The used range: <dimension> unless suppressed, else the tracked one.
    let mut dimension = if !opts.nodim {
        ws_xml
            .dimension
            .as_ref()
            .and_then(|d| decode_range_fast(d.reference.as_bytes()))
            .or(full_range)
    } else {
        full_range
    };
    if let (Some(dim), Some(limit)) = (dimension.as_mut(), opts.sheet_rows) {
        if dim.end.row + 1 > limit {
            ws.full_dimension = Some(*dim);
            dim.end.row = limit - 1;
        }
    }
    ws.dimension = dimension;

    // Column info.
    if let Some(ref cols) = ws_xml.cols {
        for col in &cols.cols {
            for idx in col.min..=col.max {
                let info = ws.col_info_mut(idx.saturating_sub(1));
                *info = ColInfo {
                    width: col.width,
                    hidden: col.hidden.unwrap_or(false),
                    custom_width: col.custom_width.unwrap_or(false),
                };
            }
        }
    }

    // Merges, autofilter, margins.
    if let Some(ref merges) = ws_xml.merge_cells {
        for m in &merges.merge_cells {
            ws.merges.push(decode_range(&m.reference)?);
        }
    }
    if let Some(ref af) = ws_xml.auto_filter {
        ws.autofilter = Some(decode_range(&af.reference)?);
    }
    if let Some(ref m) = ws_xml.page_margins {
        ws.margins = Some(SheetMargins {
            left: m.left,
            right: m.right,
            top: m.top,
            bottom: m.bottom,
            header: m.header,
            footer: m.footer,
        });
    }

    Ok(ws)
}

fn decode_cell(
    cx: &CellXml,
    at: CellRef,
    ctx: &SheetContext<'_>,
    shared: &mut HashMap<u32, (String, CellRef)>,
    arrays: &mut Vec<(Range, String)>,
) -> Result<Option<Cell>> {
    let opts = ctx.opts;
    let mut cell = Cell::default();

    // Formula first; shared groups materialize against the origin.
    if let Some(ref f) = cx.f {
        let mut formula = f.value.clone().filter(|v| !v.is_empty());
        match f.t.as_deref() {
            Some("shared") => {
                if let Some(si) = f.si {
                    match formula.clone() {
                        Some(text) => {
                            shared.insert(si, (text, at));
                        }
                        None => {
                            if let Some((origin_text, origin)) = shared.get(&si) {
                                let d_col = i64::from(at.col) - i64::from(origin.col);
                                let d_row = i64::from(at.row) - i64::from(origin.row);
                                formula = Some(shift_formula(origin_text, d_col, d_row)?);
                            }
                        }
                    }
                }
            }
            Some("array") => {
                if let Some(ref reference) = f.reference {
                    arrays.push((decode_range(reference)?, reference.clone()));
                }
            }
            _ => {}
        }
        if opts.cell_formula {
            cell.formula = formula.map(|text| {
                if opts.xlfn {
                    text
                } else {
                    strip_xlfn(&text)
                }
            });
        }
    }

    let v = cx.v.as_deref().unwrap_or("");
    let type_tag = cx.t.as_deref().unwrap_or(cell_types::NUMBER);

    cell.value = match type_tag {
        cell_types::NUMBER => {
            if v.is_empty() {
                if cell.formula.is_none() && !opts.sheet_stubs && cx.s.is_none() {
                    return Ok(None);
                }
                CellValue::Empty
            } else {
                CellValue::Number(
                    v.parse::<f64>()
                        .map_err(|_| Error::XmlParse(format!("bad numeric cell value: {v}")))?,
                )
            }
        }
        cell_types::SHARED_STRING => {
            let idx: usize = v
                .parse()
                .map_err(|_| Error::XmlParse(format!("bad shared string index: {v}")))?;
            match ctx.sst.get(idx) {
                Some(item) => {
                    if let Some(ref runs) = item.runs {
                        cell.rich_runs = Some(runs.clone());
                    }
                    if opts.cell_html {
                        cell.html = Some(escape_html(&item.text));
                    }
                    CellValue::Text(item.text.clone())
                }
                None if opts.strict => {
                    return Err(Error::XmlParse(format!(
                        "shared string index out of range: {idx}"
                    )))
                }
                None => CellValue::Text(String::new()),
            }
        }
        cell_types::FORMULA_STRING => {
            let text = unescape_ooxml(v, true);
            if opts.cell_html {
                cell.html = Some(escape_html(&text));
            }
            CellValue::Text(text)
        }
        cell_types::INLINE_STRING => {
            let text = match &cx.is {
                Some(is) => {
                    if let Some(ref t) = is.t {
                        unescape_ooxml(&t.value, true)
                    } else {
                        is.runs
                            .iter()
                            .map(|r| unescape_ooxml(&r.t.value, true))
                            .collect()
                    }
                }
                None => String::new(),
            };
            if opts.cell_html {
                cell.html = Some(escape_html(&text));
            }
            CellValue::Text(text)
        }
        cell_types::BOOLEAN => CellValue::Bool(v == "1" || v.eq_ignore_ascii_case("true")),
        cell_types::ERROR => {
            CellValue::Error(error_code_from_label(v).unwrap_or(error_codes::VALUE))
        }
        cell_types::DATE => CellValue::DateTime(parse_iso_datetime(v)?),
        other => {
            if opts.strict {
                return Err(Error::UnrecognizedCellType(other.to_string()));
            }
            return Ok(None);
        }
    };

    // Style binding: the xf's numFmtId, the resolved code, and the
    // date promotion.
    if let Some(s) = cx.s.filter(|&s| s > 0) {
        if let Some(num_fmt_id) = ctx.style_table.num_fmt_id_for_xf(s) {
            cell.style = Some(StyleRef { num_fmt_id });

            let code = ctx.fmt_table.code_for(num_fmt_id);
            if opts.cell_nf {
                cell.num_fmt = Some(match code {
                    Some(ref c) => NumberFormat::Code(c.clone()),
                    None => NumberFormat::Id(num_fmt_id),
                });
            }
            if opts.cell_dates {
                if let (CellValue::Number(n), Some(ref c)) = (&cell.value, &code) {
                    if numfmt::is_date_format(c) {
                        if let Some(dt) = serial_to_datetime(*n, ctx.date1904) {
                            cell.value = CellValue::DateTime(dt);
                        }
                    }
                }
            }
        }
    }

    if opts.cell_text {
        cell.display = render_display(&cell, cx.s, ctx);
    }

    Ok(Some(cell))
}

/// Best-effort cached display text; formatter trouble falls back to plain
/// string coercion.
fn render_display(cell: &Cell, style_index: Option<u32>, ctx: &SheetContext<'_>) -> Option<String> {
    let num_fmt_id = style_index
        .filter(|&s| s > 0)
        .and_then(|s| ctx.style_table.num_fmt_id_for_xf(s))
        .unwrap_or(0);
    match &cell.value {
        CellValue::Number(n) => Some(numfmt::format_id(
            ctx.fmt_table,
            num_fmt_id,
            *n,
            ctx.date1904,
        )),
        CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        CellValue::Error(code) => Some(crate::cell::error_code_label(*code).to_string()),
        CellValue::Text(t) => Some(t.clone()),
        CellValue::DateTime(dt) => {
            let serial = crate::datetime::datetime_to_serial(*dt, ctx.date1904);
            let id = if num_fmt_id == 0 { 14 } else { num_fmt_id };
            Some(numfmt::format_id(ctx.fmt_table, id, serial, ctx.date1904))
        }
        CellValue::Empty => None,
    }
}

fn parse_iso_datetime(v: &str) -> Result<chrono::NaiveDateTime> {
    let v = v.trim().trim_end_matches('Z');
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(Error::XmlParse(format!("bad ISO date cell value: {v}")))
}

fn attach_hyperlinks(
    ws: &mut Worksheet,
    ws_xml: &WorksheetXml,
    sheet_rels: &RelationshipSet,
) -> Result<()> {
    let Some(ref links) = ws_xml.hyperlinks else {
        return Ok(());
    };
    for link in &links.hyperlinks {
        let target = match link.r_id.as_deref() {
            Some(rid) => {
                let Some(rel) = sheet_rels.get(rid) else {
                    continue;
                };
                match link.location.as_deref() {
                    Some(loc) => format!("{}#{}", rel.target, loc),
                    None => rel.target.clone(),
                }
            }
            None => format!("#{}", link.location.as_deref().unwrap_or("")),
        };
        let parsed = decode_range(&link.reference)?;
        let hyperlink = Hyperlink {
            target,
            tooltip: link.tooltip.clone(),
        };

        // The anchor cell always exists afterwards; other covered cells
        // get the link only if they already hold data.
        ws.cell_entry(&crate::utils::cell_ref::encode_range(Range::single(parsed.start)))?
            .hyperlink = Some(hyperlink.clone());
        for row in parsed.start.row..=parsed.end.row {
            for col in parsed.start.col..=parsed.end.col {
                let at = CellRef::new(col, row);
                if at == parsed.start {
                    continue;
                }
                if let Some(cell) = ws.get_mut(at) {
                    cell.hyperlink = Some(hyperlink.clone());
                }
            }
        }
    }
    Ok(())
}

fn attach_comments<R: std::io::Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    ws: &mut Worksheet,
    sheet_path: &str,
    sheet_rels: &RelationshipSet,
    people: &HashMap<String, String>,
) -> Result<()> {
    // Legacy comments first, then threaded (threaded always wins).
    if let Some(rel) = sheet_rels.find_type(rel_types::COMMENTS) {
        let path = resolve_part_path(sheet_path, &rel.target);
        if let Ok(part) = read_xml_part::<CommentsXml, _>(archive, &path) {
            for c in &part.comment_list.comments {
                let author = part
                    .authors
                    .authors
                    .get(c.author_id as usize)
                    .cloned()
                    .unwrap_or_default();
                insert_comment(
                    ws,
                    &c.reference,
                    CellComment {
                        author,
                        text: unescape_ooxml(&c.text.plain_text(), true),
                        hidden: false,
                        threaded: false,
                    },
                    false,
                )?;
            }
        }
    }

    if let Some(rel) = sheet_rels.find_type(REL_TYPE_THREADED_COMMENT) {
        let path = resolve_part_path(sheet_path, &rel.target);
        if let Ok(part) = read_xml_part::<ThreadedCommentsXml, _>(archive, &path) {
            for c in &part.comments {
                let author = people
                    .get(&c.person_id)
                    .cloned()
                    .unwrap_or_else(|| c.person_id.clone());
                insert_comment(
                    ws,
                    &c.cell_ref,
                    CellComment {
                        author,
                        text: unescape_ooxml(&c.text, true),
                        hidden: false,
                        threaded: true,
                    },
                    true,
                )?;
            }
        }
    }

    // VML overlay: shape visibility becomes the comments' hidden flag.
    if let Some(rel) = sheet_rels.find_type(rel_types::VML_DRAWING) {
        let path = resolve_part_path(sheet_path, &rel.target);
        if let Ok(bytes) = read_bytes_part(archive, &path) {
            let vml = String::from_utf8_lossy(&bytes);
            for shape in parse_vml_comment_shapes(&vml) {
                if let Some(cell) = ws.get_mut(CellRef::new(shape.col, shape.row)) {
                    for comment in &mut cell.comments {
                        comment.hidden = !shape.visible;
                    }
                }
            }
        }
    }

    Ok(())
}
