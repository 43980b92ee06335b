//! OPC plumbing: package path resolution and relationship management.
//!
//! Relationships for a part `dir/name.xml` live in `dir/_rels/name.xml.rels`.
//! [`RelationshipSet`] keeps one owning vector of entries with two derived
//! indexes (by rId and by resolved target path) and hands out the next free
//! `rIdN` on insertion.

use std::collections::HashMap;

use gridbook_xml::relationships::{rel_types, Relationship, Relationships};

use crate::error::{Error, Result};

/// Resolve a relationship target against the source part path.
///
/// A leading `/` is absolute within the package; otherwise the target joins
/// the source's directory with `.`/`..` segments resolved. External targets
/// (URLs) should not pass through here; they are preserved verbatim.
pub fn resolve_part_path(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let base_dir = source_part
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or_default();
    let mut parts: Vec<&str> = if base_dir.is_empty() {
        vec![]
    } else {
        base_dir.split('/').collect()
    };

    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(seg),
        }
    }

    parts.join("/")
}

/// The `.rels` part path for a package part.
pub fn rels_path_for(part_path: &str) -> String {
    let normalized = part_path.trim_start_matches('/');
    let (dir, file) = normalized.rsplit_once('/').unwrap_or(("", normalized));
    if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    }
}

/// Build a relative relationship target from `source_part` to `target_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir = source_part
        .trim_start_matches('/')
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or_default();
    let source_parts: Vec<&str> = if source_dir.is_empty() {
        vec![]
    } else {
        source_dir.split('/').collect()
    };
    let target_parts: Vec<&str> = target_part.trim_start_matches('/').split('/').collect();

    let mut common = 0usize;
    while common < source_parts.len()
        && common < target_parts.len()
        && source_parts[common] == target_parts[common]
    {
        common += 1;
    }

    let mut rel_parts: Vec<String> = Vec::new();
    for _ in 0..(source_parts.len() - common) {
        rel_parts.push("..".to_string());
    }
    rel_parts.extend(target_parts[common..].iter().map(|s| s.to_string()));

    if rel_parts.is_empty() {
        ".".to_string()
    } else {
        rel_parts.join("/")
    }
}

/// Relationship entries for one part: an owning vector plus id and
/// resolved-path indexes.
#[derive(Debug, Default)]
pub struct RelationshipSet {
    rels: Vec<Relationship>,
    by_id: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
    /// Scan start for the next free numeric id.
    next_idx: u32,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an already-parsed relationships part. `source_part` anchors
    /// target path resolution for the reverse index.
    pub fn from_xml(xml: &Relationships, source_part: &str) -> Self {
        let mut set = Self::new();
        for rel in &xml.relationships {
            let idx = set.rels.len();
            set.by_id.insert(rel.id.clone(), idx);
            if rel.target_mode.as_deref() != Some("External") {
                let path = resolve_part_path(source_part, &rel.target);
                set.by_path.insert(path, idx);
            }
            set.rels.push(rel.clone());
        }
        set.next_idx = set.rels.len() as u32 + 1;
        set
    }

    /// Add a relationship.
    ///
    /// With `id: None`, scans forward from the running counter for the
    /// first free `rIdN`. An explicit id that is already present fails
    /// with [`Error::DuplicateRelationshipId`]. Hyperlink relationships
    /// default to `TargetMode="External"`.
    pub fn add(
        &mut self,
        id: Option<u32>,
        rel_type: &str,
        target: &str,
        target_mode: Option<&str>,
    ) -> Result<String> {
        let rid = match id {
            Some(n) => {
                let rid = format!("rId{n}");
                if self.by_id.contains_key(&rid) {
                    return Err(Error::DuplicateRelationshipId(rid));
                }
                rid
            }
            None => {
                let mut n = self.next_idx.max(1);
                loop {
                    let candidate = format!("rId{n}");
                    if !self.by_id.contains_key(&candidate) {
                        self.next_idx = n + 1;
                        break candidate;
                    }
                    n += 1;
                }
            }
        };

        let target_mode = match target_mode {
            Some(m) => Some(m.to_string()),
            None if rel_type == rel_types::HYPERLINK => Some("External".to_string()),
            None => None,
        };

        let idx = self.rels.len();
        self.by_id.insert(rid.clone(), idx);
        self.rels.push(Relationship {
            id: rid.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode,
        });
        Ok(rid)
    }

    /// Look up by rId.
    pub fn get(&self, rid: &str) -> Option<&Relationship> {
        self.by_id.get(rid).map(|&i| &self.rels[i])
    }

    /// Reverse lookup by resolved absolute part path.
    pub fn get_by_path(&self, path: &str) -> Option<&Relationship> {
        self.by_path.get(path).map(|&i| &self.rels[i])
    }

    /// First relationship of the given type.
    pub fn find_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.rel_type == rel_type)
    }

    /// All relationships of the given type, in insertion order.
    pub fn find_all(&self, rel_type: &str) -> Vec<&Relationship> {
        self.rels.iter().filter(|r| r.rel_type == rel_type).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize back to the XML structure, insertion-order preserving.
    pub fn to_xml(&self) -> Relationships {
        Relationships {
            relationships: self.rels.clone(),
            ..Relationships::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(
            resolve_part_path("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_part_path("xl/worksheets/sheet1.xml", "../comments1.xml"),
            "xl/comments1.xml"
        );
        assert_eq!(
            resolve_part_path("xl/worksheets/sheet1.xml", "/xl/styles.xml"),
            "xl/styles.xml"
        );
        assert_eq!(
            resolve_part_path("xl/workbook.xml", "./theme/theme1.xml"),
            "xl/theme/theme1.xml"
        );
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(
            rels_path_for("xl/workbook.xml"),
            "xl/_rels/workbook.xml.rels"
        );
        assert_eq!(
            rels_path_for("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(
            relative_target("xl/workbook.xml", "xl/worksheets/sheet1.xml"),
            "worksheets/sheet1.xml"
        );
        assert_eq!(
            relative_target("xl/worksheets/sheet1.xml", "xl/comments1.xml"),
            "../comments1.xml"
        );
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut set = RelationshipSet::new();
        let a = set
            .add(None, rel_types::WORKSHEET, "worksheets/sheet1.xml", None)
            .unwrap();
        let b = set
            .add(None, rel_types::STYLES, "styles.xml", None)
            .unwrap();
        assert_eq!(a, "rId1");
        assert_eq!(b, "rId2");
    }

    #[test]
    fn test_add_skips_taken_slots() {
        let xml = Relationships {
            relationships: vec![Relationship {
                id: "rId1".to_string(),
                rel_type: rel_types::WORKSHEET.to_string(),
                target: "worksheets/sheet1.xml".to_string(),
                target_mode: None,
            }],
            ..Relationships::default()
        };
        let mut set = RelationshipSet::from_xml(&xml, "xl/workbook.xml");
        let rid = set.add(None, rel_types::STYLES, "styles.xml", None).unwrap();
        assert_eq!(rid, "rId2");
    }

    #[test]
    fn test_duplicate_explicit_id_rejected() {
        let mut set = RelationshipSet::new();
        set.add(Some(3), rel_types::STYLES, "styles.xml", None)
            .unwrap();
        let err = set
            .add(Some(3), rel_types::THEME, "theme/theme1.xml", None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRelationshipId(ref id) if id == "rId3"));
    }

    #[test]
    fn test_hyperlink_defaults_external() {
        let mut set = RelationshipSet::new();
        let rid = set
            .add(None, rel_types::HYPERLINK, "https://example.com", None)
            .unwrap();
        assert_eq!(
            set.get(&rid).unwrap().target_mode.as_deref(),
            Some("External")
        );
    }

    #[test]
    fn test_reverse_path_index() {
        let xml = Relationships {
            relationships: vec![
                Relationship {
                    id: "rId1".to_string(),
                    rel_type: rel_types::WORKSHEET.to_string(),
                    target: "worksheets/sheet1.xml".to_string(),
                    target_mode: None,
                },
                Relationship {
                    id: "rId2".to_string(),
                    rel_type: rel_types::HYPERLINK.to_string(),
                    target: "https://example.com".to_string(),
                    target_mode: Some("External".to_string()),
                },
            ],
            ..Relationships::default()
        };
        let set = RelationshipSet::from_xml(&xml, "xl/workbook.xml");
        assert_eq!(
            set.get_by_path("xl/worksheets/sheet1.xml").unwrap().id,
            "rId1"
        );
        // External targets never land in the path index.
        assert!(set.get_by_path("https://example.com").is_none());
        assert_eq!(set.find_type(rel_types::HYPERLINK).unwrap().id, "rId2");
    }

    #[test]
    fn test_to_xml_preserves_order() {
        let mut set = RelationshipSet::new();
        set.add(None, rel_types::WORKSHEET, "worksheets/sheet1.xml", None)
            .unwrap();
        set.add(None, rel_types::WORKSHEET, "worksheets/sheet2.xml", None)
            .unwrap();
        let xml = set.to_xml();
        assert_eq!(xml.relationships[0].target, "worksheets/sheet1.xml");
        assert_eq!(xml.relationships[1].target, "worksheets/sheet2.xml");
    }
}
