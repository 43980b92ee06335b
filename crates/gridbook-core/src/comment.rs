//! Cell comments: the model shared by legacy and threaded comments, the
//! insertion rules, and the deterministic GUID fabrication the writer uses
//! for threaded-comment parts.

use crate::error::Result;
use crate::sheet::Worksheet;

/// One comment anchored at a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellComment {
    /// Author display name (resolved through the person list for threaded
    /// comments).
    pub author: String,
    /// Plain comment text.
    pub text: String,
    /// Shape visibility from the VML overlay.
    pub hidden: bool,
    /// True when this entry came from (or should be written to) a
    /// threaded-comment part.
    pub threaded: bool,
}

/// Attach a comment to a cell, expanding the sheet's used range and
/// creating a stub cell when the target does not exist yet.
///
/// Threaded comments always win: when `threaded_mode` is off and the cell
/// already carries a threaded comment, the insertion is a no-op; when it is
/// on, plain comments on the cell are dropped first.
pub fn insert_comment(
    ws: &mut Worksheet,
    a1: &str,
    comment: CellComment,
    threaded_mode: bool,
) -> Result<()> {
    let cell = ws.cell_entry(a1)?;

    if !threaded_mode && cell.comments.iter().any(|c| c.threaded) {
        return Ok(());
    }
    if threaded_mode {
        cell.comments.retain(|c| c.threaded);
    }
    cell.comments.push(comment);
    Ok(())
}

/// Deterministic GUID for a threaded comment, driven by a running counter.
pub fn comment_guid(counter: u64) -> String {
    format!("{{54EE7951-7262-4200-6969-{counter:012}}}")
}

/// Deterministic GUID for a person-list entry.
pub fn person_guid(counter: u64) -> String {
    format!("{{54EE7950-7262-4200-6969-{counter:012}}}")
}
