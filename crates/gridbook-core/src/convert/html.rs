//! HTML table emission.

use std::collections::HashSet;
use std::fmt::Write as _;

use gridbook_xml::escape::escape_html;

use crate::cell::{error_code_label, error_codes, CellValue, NumberFormat};
use crate::convert::cell_display_text;
use crate::error::Result;
use crate::numfmt::FormatTable;
use crate::sheet::Worksheet;
use crate::utils::cell_ref::CellRef;

/// Options for [`sheet_to_html`].
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Markup emitted before the table.
    pub header: String,
    /// Markup emitted after the table.
    pub footer: String,
    /// Drop `javascript:` hyperlink targets.
    pub sanitize_links: bool,
    /// Date system for display formatting.
    pub date1904: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            header: "<html><head><meta charset=\"utf-8\"/></head><body>".to_string(),
            footer: "</body></html>".to_string(),
            sanitize_links: false,
            date1904: false,
        }
    }
}

/// Render a worksheet's used range as an HTML table. Merged ranges emit
/// only their top-left cell, carrying `rowspan`/`colspan`.
pub fn sheet_to_html(ws: &Worksheet, opts: &HtmlOptions) -> Result<String> {
    let table = FormatTable::new();
    let mut out = String::new();
    out.push_str(&opts.header);
    out.push_str("<table>");

    if let Some(range) = ws.dimension {
        // Cells covered by a merge, except the merge origin.
        let mut covered: HashSet<(u32, u32)> = HashSet::new();
        for m in &ws.merges {
            for row in m.start.row..=m.end.row {
                for col in m.start.col..=m.end.col {
                    if (col, row) != (m.start.col, m.start.row) {
                        covered.insert((col, row));
                    }
                }
            }
        }

        for row in range.start.row..=range.end.row {
            out.push_str("<tr>");
            for col in range.start.col..=range.end.col {
                if covered.contains(&(col, row)) {
                    continue;
                }
                let span = ws
                    .merges
                    .iter()
                    .find(|m| m.start.col == col && m.start.row == row);

                let mut td = String::from("<td");
                if let Some(m) = span {
                    let colspan = m.end.col - m.start.col + 1;
                    let rowspan = m.end.row - m.start.row + 1;
                    if colspan > 1 {
                        let _ = write!(td, " colspan=\"{colspan}\"");
                    }
                    if rowspan > 1 {
                        let _ = write!(td, " rowspan=\"{rowspan}\"");
                    }
                }

                let cell = ws.get(CellRef::new(col, row));
                let mut body = String::new();
                if let Some(cell) = cell {
                    let (value, text) = html_value_and_text(cell, &table, opts);
                    let _ = write!(td, " data-t=\"{}\"", cell.value.type_code());
                    if let Some(v) = value {
                        let _ = write!(td, " data-v=\"{}\"", escape_html(&v));
                    }
                    if let Some(NumberFormat::Code(ref z)) = cell.num_fmt {
                        let _ = write!(td, " data-z=\"{}\"", escape_html(z));
                    }
                    if let Some(ref f) = cell.formula {
                        let _ = write!(td, " data-f=\"{}\"", escape_html(f));
                    }

                    body = match &cell.html {
                        Some(html) => html.clone(),
                        None => escape_html(&text),
                    };
                    if let Some(ref link) = cell.hyperlink {
                        let dropped = opts.sanitize_links
                            && link
                                .target
                                .trim_start()
                                .to_ascii_lowercase()
                                .starts_with("javascript:");
                        if !dropped {
                            body = format!(
                                "<a href=\"{}\">{}</a>",
                                escape_html(&link.target),
                                body
                            );
                        }
                    }
                }
                td.push('>');
                out.push_str(&td);
                out.push_str(&body);
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
    }

    out.push_str("</table>");
    out.push_str(&opts.footer);
    Ok(out)
}

/// The `data-v` payload and visible text for a cell. Non-finite numbers
/// render as their matching error cells.
fn html_value_and_text(
    cell: &crate::cell::Cell,
    table: &FormatTable,
    opts: &HtmlOptions,
) -> (Option<String>, String) {
    match &cell.value {
        CellValue::Number(n) if n.is_nan() => {
            let label = error_code_label(error_codes::NUM);
            (Some(label.to_string()), label.to_string())
        }
        CellValue::Number(n) if n.is_infinite() => {
            let label = error_code_label(error_codes::DIV0);
            (Some(label.to_string()), label.to_string())
        }
        CellValue::Empty => (None, String::new()),
        value => (
            Some(value.to_string()),
            cell_display_text(cell, table, opts.date1904),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Hyperlink};
    use crate::utils::cell_ref::decode_range;

    fn opts() -> HtmlOptions {
        HtmlOptions {
            header: String::new(),
            footer: String::new(),
            ..HtmlOptions::default()
        }
    }

    #[test]
    fn test_empty_sheet() {
        let html = sheet_to_html(&Worksheet::new(), &opts()).unwrap();
        assert_eq!(html, "<table></table>");
    }

    #[test]
    fn test_basic_table_with_data_attributes() {
        let mut ws = Worksheet::new();
        ws.set_cell("A1", Cell::from(1.5)).unwrap();
        ws.set_cell("B1", Cell::from("x<y")).unwrap();
        let html = sheet_to_html(&ws, &opts()).unwrap();
        assert!(html.contains("<td data-t=\"n\" data-v=\"1.5\">1.5</td>"));
        assert!(html.contains("data-t=\"s\""));
        assert!(html.contains("x&lt;y"));
    }

    #[test]
    fn test_formula_attribute() {
        let mut ws = Worksheet::new();
        let mut cell = Cell::from(3.0);
        cell.formula = Some("A1+A2".to_string());
        ws.set_cell("A3", cell).unwrap();
        let html = sheet_to_html(&ws, &opts()).unwrap();
        assert!(html.contains("data-f=\"A1+A2\""));
    }

    #[test]
    fn test_merges_coalesce() {
        let mut ws = Worksheet::new();
        ws.set_cell("A1", Cell::from("merged")).unwrap();
        ws.set_cell("C2", Cell::from(9.0)).unwrap();
        ws.merges.push(decode_range("A1:B2").unwrap());
        let html = sheet_to_html(&ws, &opts()).unwrap();
        assert!(html.contains("colspan=\"2\""));
        assert!(html.contains("rowspan=\"2\""));
        // Two rows; the first has the merged cell plus C1, not four tds.
        let first_row = html.split("</tr>").next().unwrap();
        assert_eq!(first_row.matches("<td").count(), 2);
    }

    #[test]
    fn test_hyperlink_wrapping() {
        let mut ws = Worksheet::new();
        let mut cell = Cell::from("site");
        cell.hyperlink = Some(Hyperlink {
            target: "https://example.com".to_string(),
            tooltip: None,
        });
        ws.set_cell("A1", cell).unwrap();
        let html = sheet_to_html(&ws, &opts()).unwrap();
        assert!(html.contains("<a href=\"https://example.com\">site</a>"));
    }

    #[test]
    fn test_javascript_links_sanitized() {
        let mut ws = Worksheet::new();
        let mut cell = Cell::from("evil");
        cell.hyperlink = Some(Hyperlink {
            target: "javascript:alert(1)".to_string(),
            tooltip: None,
        });
        ws.set_cell("A1", cell).unwrap();

        let mut o = opts();
        o.sanitize_links = true;
        let html = sheet_to_html(&ws, &o).unwrap();
        assert!(!html.contains("<a "));
        assert!(html.contains("evil"));

        // Without sanitizing, the link passes through.
        let html = sheet_to_html(&ws, &opts()).unwrap();
        assert!(html.contains("<a "));
    }

    #[test]
    fn test_non_finite_numbers_become_errors() {
        let mut ws = Worksheet::new();
        ws.set_cell("A1", Cell::from(f64::NAN)).unwrap();
        ws.set_cell("B1", Cell::from(f64::INFINITY)).unwrap();
        let html = sheet_to_html(&ws, &opts()).unwrap();
        assert!(html.contains("#NUM!"));
        assert!(html.contains("#DIV/0!"));
    }

    #[test]
    fn test_header_footer_wrapping() {
        let mut ws = Worksheet::new();
        ws.set_cell("A1", Cell::from(1.0)).unwrap();
        let html = sheet_to_html(&ws, &HtmlOptions::default()).unwrap();
        assert!(html.starts_with("<html><head>"));
        assert!(html.ends_with("</body></html>"));
    }
}
