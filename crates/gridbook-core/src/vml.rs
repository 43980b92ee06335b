//! VML legacy drawing parts for comment shapes.
//!
//! Spreadsheet applications render note pop-ups from a VML part
//! (`xl/drawings/vmlDrawing{N}.vml`) tied to the sheet via a legacy-drawing
//! relationship. This module generates the minimal markup for written
//! comments and extracts shape visibility when reading.

use std::fmt::Write as _;

use crate::utils::cell_ref::CellRef;

/// One comment shape parsed from a VML part: 0-based anchor cell plus the
/// visibility of its pop-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmlCommentShape {
    pub row: u32,
    pub col: u32,
    pub visible: bool,
}

/// Build a complete VML drawing for the comment cells of one sheet.
///
/// `cells` pairs each anchor with its hidden flag. Shape ids start at
/// `65536 * rid` and increment per shape.
pub fn build_vml_drawing(cells: &[(CellRef, bool)], rid: u32) -> String {
    let mut shapes = String::new();
    for (seq, (cell, hidden)) in cells.iter().enumerate() {
        let shape_id = 65_536u64 * u64::from(rid) + seq as u64 + 1;
        write_vml_shape(&mut shapes, shape_id, cell.col, cell.row, *hidden);
    }

    let mut doc = String::with_capacity(512 + shapes.len());
    doc.push_str("<xml xmlns:v=\"urn:schemas-microsoft-com:vml\"");
    doc.push_str(" xmlns:o=\"urn:schemas-microsoft-com:office:office\"");
    doc.push_str(" xmlns:x=\"urn:schemas-microsoft-com:office:excel\"");
    doc.push_str(" xmlns:mv=\"http://macVmlSchemaUri\">");
    doc.push_str("<o:shapelayout v:ext=\"edit\">");
    doc.push_str("<o:idmap v:ext=\"edit\" data=\"1\"/>");
    doc.push_str("</o:shapelayout>");
    doc.push_str("<v:shapetype id=\"_x0000_t202\" coordsize=\"21600,21600\"");
    doc.push_str(" o:spt=\"202\" path=\"m0,0l0,21600r21600,0l21600,0xe\">");
    doc.push_str("<v:stroke joinstyle=\"miter\"/>");
    doc.push_str("<v:path gradientshapeok=\"t\" o:connecttype=\"rect\"/>");
    doc.push_str("</v:shapetype>");
    doc.push_str(&shapes);
    doc.push_str("</xml>");
    doc
}

fn write_vml_shape(out: &mut String, shape_id: u64, col: u32, row: u32, hidden: bool) {
    let visibility = if hidden { "hidden" } else { "visible" };
    let _ = write!(
        out,
        "<v:shape id=\"_x0000_s{shape_id}\" type=\"#_x0000_t202\" \
         style=\"position:absolute;margin-left:80pt;margin-top:2pt;\
         width:104pt;height:64pt;z-index:10;visibility:{visibility}\" \
         fillcolor=\"#ECFAD4\" strokecolor=\"#edeaa1\">"
    );
    out.push_str("<v:fill color2=\"#ECFAD4\"/>");
    out.push_str("<v:shadow on=\"t\" obscured=\"t\"/>");
    out.push_str("<v:path o:connecttype=\"none\"/>");
    out.push_str("<v:textbox><div style=\"text-align:left\"></div></v:textbox>");
    out.push_str("<x:ClientData ObjectType=\"Note\">");
    out.push_str("<x:MoveWithCells/>");
    out.push_str("<x:SizeWithCells/>");
    let _ = write!(
        out,
        "<x:Anchor>{},0,{},0,{},20,{},20</x:Anchor>",
        col + 1,
        row + 1,
        col + 3,
        row + 5
    );
    out.push_str("<x:AutoFill>False</x:AutoFill>");
    let _ = write!(out, "<x:Row>{row}</x:Row>");
    let _ = write!(out, "<x:Column>{col}</x:Column>");
    if !hidden {
        out.push_str("<x:Visible/>");
    }
    out.push_str("</x:ClientData>");
    out.push_str("</v:shape>");
}

/// Extract comment shapes (anchor + visibility) from a VML part.
///
/// Scans `shape`/`rect` elements whose client data carries
/// `ObjectType="Note"`; a shape is visible when its `<x:Visible>` element
/// is present.
pub fn parse_vml_comment_shapes(vml: &str) -> Vec<VmlCommentShape> {
    let mut shapes = Vec::new();
    for open_tag in ["<v:shape ", "<shape ", "<v:rect ", "<rect "] {
        let close_tag = match open_tag {
            "<v:shape " => "</v:shape>",
            "<shape " => "</shape>",
            "<v:rect " => "</v:rect>",
            _ => "</rect>",
        };
        let mut from = 0;
        while let Some(pos) = vml[from..].find(open_tag) {
            let start = from + pos;
            let Some(end_rel) = vml[start..].find(close_tag) else {
                break;
            };
            let end = start + end_rel + close_tag.len();
            let body = &vml[start..end];
            from = end;

            if !body.contains("ObjectType=\"Note\"") && !body.contains("ObjectType='Note'") {
                continue;
            }
            let Some(row) = element_text(body, "Row").and_then(|t| t.trim().parse().ok()) else {
                continue;
            };
            let Some(col) = element_text(body, "Column").and_then(|t| t.trim().parse().ok())
            else {
                continue;
            };
            let visible = body.contains("<x:Visible") || body.contains("<Visible");
            shapes.push(VmlCommentShape { row, col, visible });
        }
    }
    shapes
}

/// Text content of `<x:tag>...</x:tag>` (or the unprefixed form).
fn element_text<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    for (open, close) in [
        (format!("<x:{tag}>"), format!("</x:{tag}>")),
        (format!("<{tag}>"), format!("</{tag}>")),
    ] {
        if let Some(start) = body.find(&open) {
            let from = start + open.len();
            if let Some(len) = body[from..].find(&close) {
                return Some(&body[from..from + len]);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_single_shape() {
        let vml = build_vml_drawing(&[(CellRef::new(0, 0), false)], 1);
        assert!(vml.contains("xmlns:v=\"urn:schemas-microsoft-com:vml\""));
        assert!(vml.contains("ObjectType=\"Note\""));
        assert!(vml.contains("<x:Row>0</x:Row>"));
        assert!(vml.contains("<x:Column>0</x:Column>"));
        assert!(vml.contains("<x:Visible/>"));
        assert!(vml.contains("_x0000_s65537"));
        assert!(vml.contains("<x:Anchor>1,0,1,0,3,20,5,20</x:Anchor>"));
    }

    #[test]
    fn test_build_hidden_shape_omits_visible() {
        let vml = build_vml_drawing(&[(CellRef::new(2, 4), true)], 1);
        assert!(!vml.contains("<x:Visible/>"));
        assert!(vml.contains("visibility:hidden"));
        assert!(vml.contains("<x:Row>4</x:Row>"));
        assert!(vml.contains("<x:Column>2</x:Column>"));
    }

    #[test]
    fn test_shape_ids_scale_with_rid() {
        let vml = build_vml_drawing(
            &[(CellRef::new(0, 0), false), (CellRef::new(1, 1), false)],
            2,
        );
        assert!(vml.contains("_x0000_s131073"));
        assert!(vml.contains("_x0000_s131074"));
    }

    #[test]
    fn test_parse_roundtrip() {
        let vml = build_vml_drawing(
            &[(CellRef::new(1, 2), false), (CellRef::new(3, 9), true)],
            1,
        );
        let shapes = parse_vml_comment_shapes(&vml);
        assert_eq!(shapes.len(), 2);
        assert_eq!(
            shapes[0],
            VmlCommentShape {
                row: 2,
                col: 1,
                visible: true
            }
        );
        assert_eq!(
            shapes[1],
            VmlCommentShape {
                row: 9,
                col: 3,
                visible: false
            }
        );
    }

    #[test]
    fn test_parse_ignores_non_note_shapes() {
        let vml = r#"<xml><v:shape id="_x0000_s1"><x:ClientData ObjectType="Drop">
<x:Row>1</x:Row><x:Column>1</x:Column></x:ClientData></v:shape></xml>"#;
        assert!(parse_vml_comment_shapes(vml).is_empty());
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_vml_comment_shapes("<xml></xml>").is_empty());
    }
}
