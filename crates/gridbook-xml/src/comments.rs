//! Comments XML schema structures.
//!
//! Represents the legacy comment parts (`xl/comments{N}.xml`).

use serde::{Deserialize, Serialize};

use crate::namespaces;
use crate::shared_strings::{RichRun, Text};

/// Comments root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "comments")]
pub struct CommentsXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "authors")]
    pub authors: Authors,

    #[serde(rename = "commentList")]
    pub comment_list: CommentList,
}

/// Authors container; comments refer to entries here by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authors {
    #[serde(rename = "author", default)]
    pub authors: Vec<String>,
}

/// Comment list container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentList {
    #[serde(rename = "comment", default)]
    pub comments: Vec<CommentXml>,
}

/// Individual comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentXml {
    #[serde(rename = "@ref")]
    pub reference: String,

    #[serde(rename = "@authorId")]
    pub author_id: u32,

    #[serde(rename = "text")]
    pub text: CommentText,
}

/// Comment text content: a plain `<t>` or rich runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentText {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub t: Option<Text>,

    #[serde(rename = "r", default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<RichRun>,
}

impl CommentText {
    /// Extract the plain text of a comment, concatenating runs when no
    /// direct `<t>` child is present.
    pub fn plain_text(&self) -> String {
        if let Some(ref t) = self.t {
            t.value.clone()
        } else {
            self.runs.iter().map(|r| r.t.value.as_str()).collect()
        }
    }
}

impl Default for CommentsXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            authors: Authors::default(),
            comment_list: CommentList::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_default() {
        let comments = CommentsXml::default();
        assert_eq!(comments.xmlns, namespaces::SPREADSHEET_ML);
        assert!(comments.authors.authors.is_empty());
        assert!(comments.comment_list.comments.is_empty());
    }

    #[test]
    fn test_comments_roundtrip() {
        let comments = CommentsXml {
            authors: Authors {
                authors: vec!["Alice".to_string(), "Bob".to_string()],
            },
            comment_list: CommentList {
                comments: vec![CommentXml {
                    reference: "B2".to_string(),
                    author_id: 1,
                    text: CommentText {
                        t: Some(Text::preserving("Check this value")),
                        runs: vec![],
                    },
                }],
            },
            ..CommentsXml::default()
        };
        let xml = quick_xml::se::to_string(&comments).unwrap();
        let parsed: CommentsXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.authors.authors, vec!["Alice", "Bob"]);
        assert_eq!(parsed.comment_list.comments.len(), 1);
        assert_eq!(parsed.comment_list.comments[0].reference, "B2");
        assert_eq!(parsed.comment_list.comments[0].author_id, 1);
        assert_eq!(
            parsed.comment_list.comments[0].text.plain_text(),
            "Check this value"
        );
    }

    #[test]
    fn test_comment_text_from_runs() {
        let xml = r#"<text><r><rPr><b/></rPr><t>Author:</t></r><r><t xml:space="preserve"> note body</t></r></text>"#;
        let parsed: CommentText = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.plain_text(), "Author: note body");
    }

    #[test]
    fn test_parse_real_comments_part() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <authors><author>Reviewer</author></authors>
  <commentList>
    <comment ref="A1" authorId="0"><text><t>hello</t></text></comment>
  </commentList>
</comments>"#;
        let parsed: CommentsXml = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.authors.authors, vec!["Reviewer"]);
        assert_eq!(parsed.comment_list.comments[0].text.plain_text(), "hello");
    }
}
