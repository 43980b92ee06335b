//! Runtime shared string table.
//!
//! Bridges the XML-level [`gridbook_xml::shared_strings::Sst`] and the cell
//! model: an ordered list of string items (for index-based lookup during
//! worksheet parsing) plus a reverse map (for deduplication during write).
//! Rich-text runs are preserved alongside the plain text so they re-emit
//! unchanged.

use std::collections::HashMap;

use gridbook_xml::escape::{escape_ooxml, unescape_ooxml};
use gridbook_xml::shared_strings::{RichRun, Sst, StringItem, Text};

use crate::error::{Error, Result};

/// One shared string: plain text, optional preserved rich runs, optional
/// HTML rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedString {
    pub text: String,
    pub runs: Option<Vec<RichRun>>,
    pub html: Option<String>,
}

/// Runtime shared string table.
#[derive(Debug, Default)]
pub struct SharedStringTable {
    items: Vec<SharedString>,
    index: HashMap<String, usize>,
    /// Total number of cell references into the table (the `count`
    /// attribute; unique count is `items.len()`).
    total_refs: u32,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the parsed XML part.
    ///
    /// Plain items use `<t>` directly; rich items concatenate run texts,
    /// skipping `<rPh>` phonetic runs, and keep the runs for re-emit. In
    /// strict mode an item with unrecognizable content is an error;
    /// otherwise it lands as an empty string.
    pub fn from_sst(sst: &Sst, strict: bool) -> Result<Self> {
        let mut table = Self::new();
        table.total_refs = sst.count.unwrap_or(0);

        for (idx, si) in sst.items.iter().enumerate() {
            let item = if let Some(ref t) = si.t {
                SharedString {
                    text: unescape_ooxml(&t.value, true),
                    runs: None,
                    html: None,
                }
            } else if !si.runs.is_empty() {
                let text: String = si
                    .runs
                    .iter()
                    .map(|r| unescape_ooxml(&r.t.value, true))
                    .collect();
                SharedString {
                    text,
                    runs: Some(si.runs.clone()),
                    html: None,
                }
            } else if si.phonetic_runs.is_empty() {
                // An empty <si/> is an empty string.
                SharedString::default()
            } else if strict {
                return Err(Error::UnrecognizedRichFormat(idx));
            } else {
                SharedString::default()
            };

            // Positional insert: SST indices are not deduplicated on read.
            let pos = table.items.len();
            table.index.entry(item.text.clone()).or_insert(pos);
            table.items.push(item);
        }

        Ok(table)
    }

    /// Convert back to the XML part.
    pub fn to_sst(&self) -> Sst {
        let items: Vec<StringItem> = self
            .items
            .iter()
            .map(|s| match &s.runs {
                Some(runs) => StringItem {
                    t: None,
                    runs: runs.clone(),
                    phonetic_runs: vec![],
                },
                None => StringItem {
                    t: Some(Text::preserving(&escape_ooxml(&s.text))),
                    runs: vec![],
                    phonetic_runs: vec![],
                },
            })
            .collect();

        let unique = items.len() as u32;
        Sst {
            count: Some(self.total_refs.max(unique)),
            unique_count: Some(unique),
            items,
            ..Sst::default()
        }
    }

    /// Get an item by SST index.
    pub fn get(&self, index: usize) -> Option<&SharedString> {
        self.items.get(index)
    }

    /// Add a string reference, returning its index. Duplicate strings share
    /// one slot; every call counts toward the total reference count.
    pub fn add(&mut self, s: &str) -> usize {
        self.total_refs += 1;
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.items.len();
        self.items.push(SharedString {
            text: s.to_string(),
            runs: None,
            html: None,
        });
        self.index.insert(s.to_string(), idx);
        idx
    }

    /// Add a string carrying preserved rich runs.
    pub fn add_rich(&mut self, s: &str, runs: Vec<RichRun>) -> usize {
        self.total_refs += 1;
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.items.len();
        self.items.push(SharedString {
            text: s.to_string(),
            runs: Some(runs),
            html: None,
        });
        self.index.insert(s.to_string(), idx);
        idx
    }

    /// Number of unique strings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbook_xml::shared_strings::PhoneticRun;

    fn plain(text: &str) -> StringItem {
        StringItem {
            t: Some(Text::preserving(text)),
            ..StringItem::default()
        }
    }

    #[test]
    fn test_add_and_dedup() {
        let mut t = SharedStringTable::new();
        assert_eq!(t.add("hello"), 0);
        assert_eq!(t.add("world"), 1);
        assert_eq!(t.add("hello"), 0);
        assert_eq!(t.len(), 2);
        let sst = t.to_sst();
        assert_eq!(sst.count, Some(3));
        assert_eq!(sst.unique_count, Some(2));
    }

    #[test]
    fn test_from_sst_plain() {
        let sst = Sst {
            count: Some(2),
            unique_count: Some(2),
            items: vec![plain("Name"), plain("Age")],
            ..Sst::default()
        };
        let t = SharedStringTable::from_sst(&sst, false).unwrap();
        assert_eq!(t.get(0).unwrap().text, "Name");
        assert_eq!(t.get(1).unwrap().text, "Age");
        assert!(t.get(2).is_none());
    }

    #[test]
    fn test_from_sst_rich_concatenates_and_preserves() {
        let runs = vec![
            RichRun {
                r_pr: None,
                t: Text::preserving("Bold"),
            },
            RichRun {
                r_pr: None,
                t: Text::preserving(" Normal"),
            },
        ];
        let sst = Sst {
            items: vec![StringItem {
                t: None,
                runs: runs.clone(),
                phonetic_runs: vec![],
            }],
            ..Sst::default()
        };
        let t = SharedStringTable::from_sst(&sst, false).unwrap();
        assert_eq!(t.get(0).unwrap().text, "Bold Normal");
        assert_eq!(t.get(0).unwrap().runs.as_ref().unwrap().len(), 2);

        // Rich runs re-emit unchanged.
        let back = t.to_sst();
        assert_eq!(back.items[0].runs, runs);
    }

    #[test]
    fn test_phonetic_runs_skipped_in_text() {
        let sst = Sst {
            items: vec![StringItem {
                t: Some(Text::preserving("課長")),
                runs: vec![],
                phonetic_runs: vec![PhoneticRun {
                    sb: Some(0),
                    eb: Some(2),
                    t: Text::preserving("カチョウ"),
                }],
            }],
            ..Sst::default()
        };
        let t = SharedStringTable::from_sst(&sst, false).unwrap();
        assert_eq!(t.get(0).unwrap().text, "課長");
    }

    #[test]
    fn test_strict_mode_rejects_phonetic_only_item() {
        let sst = Sst {
            items: vec![StringItem {
                t: None,
                runs: vec![],
                phonetic_runs: vec![PhoneticRun {
                    sb: None,
                    eb: None,
                    t: Text::preserving("x"),
                }],
            }],
            ..Sst::default()
        };
        assert!(matches!(
            SharedStringTable::from_sst(&sst, true),
            Err(Error::UnrecognizedRichFormat(0))
        ));
        // Lenient mode tolerates it as an empty string.
        let t = SharedStringTable::from_sst(&sst, false).unwrap();
        assert_eq!(t.get(0).unwrap().text, "");
    }

    #[test]
    fn test_control_chars_roundtrip_through_escapes() {
        let mut t = SharedStringTable::new();
        t.add("a\u{01}b");
        let sst = t.to_sst();
        assert_eq!(sst.items[0].t.as_ref().unwrap().value, "a_x0001_b");
        let back = SharedStringTable::from_sst(&sst, false).unwrap();
        assert_eq!(back.get(0).unwrap().text, "a\u{01}b");
    }

    #[test]
    fn test_whitespace_preserved_flag() {
        let mut t = SharedStringTable::new();
        t.add(" padded ");
        let sst = t.to_sst();
        assert_eq!(
            sst.items[0].t.as_ref().unwrap().xml_space.as_deref(),
            Some("preserve")
        );
    }
}
