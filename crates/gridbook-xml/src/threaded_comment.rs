//! Threaded comments XML schema structures.
//!
//! Represents `xl/threadedComments/threadedComment{N}.xml` and
//! `xl/persons/person.xml` in the OOXML package (Excel 2019+).

use serde::{Deserialize, Serialize};

/// Namespace for threaded comments.
pub const THREADED_COMMENTS_NS: &str =
    "http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments";

/// Relationship type for threaded comments (worksheet-level).
pub const REL_TYPE_THREADED_COMMENT: &str =
    "http://schemas.microsoft.com/office/2017/10/relationships/threadedComment";

/// Relationship type for the person list (workbook-level).
pub const REL_TYPE_PERSON: &str =
    "http://schemas.microsoft.com/office/2017/10/relationships/person";

/// Root element for threaded comments XML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "ThreadedComments")]
pub struct ThreadedCommentsXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "threadedComment", default)]
    pub comments: Vec<ThreadedCommentXml>,
}

/// Individual threaded comment entry. The first comment of a thread has no
/// `parentId`; replies carry the root comment's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadedCommentXml {
    #[serde(rename = "@ref")]
    pub cell_ref: String,

    #[serde(rename = "@dT", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,

    #[serde(rename = "@personId")]
    pub person_id: String,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(rename = "@done", skip_serializing_if = "Option::is_none")]
    pub done: Option<String>,

    #[serde(rename = "text")]
    pub text: String,
}

/// Root element for the person list XML (`xl/persons/person.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "personList")]
pub struct PersonListXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "person", default)]
    pub persons: Vec<PersonXml>,
}

/// Individual person entry in the person list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonXml {
    #[serde(rename = "@displayName")]
    pub display_name: String,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(rename = "@providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl Default for ThreadedCommentsXml {
    fn default() -> Self {
        Self {
            xmlns: THREADED_COMMENTS_NS.to_string(),
            comments: Vec::new(),
        }
    }
}

impl Default for PersonListXml {
    fn default() -> Self {
        Self {
            xmlns: THREADED_COMMENTS_NS.to_string(),
            persons: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threaded_comments_default() {
        let tc = ThreadedCommentsXml::default();
        assert_eq!(tc.xmlns, THREADED_COMMENTS_NS);
        assert!(tc.comments.is_empty());
    }

    #[test]
    fn test_thread_roundtrip() {
        let tc = ThreadedCommentsXml {
            comments: vec![
                ThreadedCommentXml {
                    cell_ref: "A1".to_string(),
                    date_time: Some("2024-01-15T10:30:00.00".to_string()),
                    person_id: "{54EE7950-7262-4200-6969-000000000001}".to_string(),
                    id: "{54EE7951-7262-4200-6969-000000000001}".to_string(),
                    parent_id: None,
                    done: None,
                    text: "Initial comment".to_string(),
                },
                ThreadedCommentXml {
                    cell_ref: "A1".to_string(),
                    date_time: Some("2024-01-15T11:00:00.00".to_string()),
                    person_id: "{54EE7950-7262-4200-6969-000000000002}".to_string(),
                    id: "{54EE7951-7262-4200-6969-000000000002}".to_string(),
                    parent_id: Some("{54EE7951-7262-4200-6969-000000000001}".to_string()),
                    done: None,
                    text: "Reply".to_string(),
                },
            ],
            ..ThreadedCommentsXml::default()
        };
        let xml = quick_xml::se::to_string(&tc).unwrap();
        let parsed: ThreadedCommentsXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.comments.len(), 2);
        assert!(parsed.comments[0].parent_id.is_none());
        assert_eq!(
            parsed.comments[1].parent_id.as_deref(),
            Some("{54EE7951-7262-4200-6969-000000000001}")
        );
    }

    #[test]
    fn test_person_list_roundtrip() {
        let pl = PersonListXml {
            persons: vec![PersonXml {
                display_name: "Alice".to_string(),
                id: "{54EE7950-7262-4200-6969-000000000001}".to_string(),
                user_id: Some("Alice".to_string()),
                provider_id: Some("None".to_string()),
            }],
            ..PersonListXml::default()
        };
        let xml = quick_xml::se::to_string(&pl).unwrap();
        let parsed: PersonListXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.persons.len(), 1);
        assert_eq!(parsed.persons[0].display_name, "Alice");
    }

    #[test]
    fn test_parse_real_threaded_comment() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ThreadedComments xmlns="http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments">
  <threadedComment ref="B2" dT="2023-06-01T09:00:00.00" personId="{P-1}" id="{C-1}">
    <text>What is this number?</text>
  </threadedComment>
</ThreadedComments>"#;
        let parsed: ThreadedCommentsXml = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.comments.len(), 1);
        assert_eq!(parsed.comments[0].cell_ref, "B2");
        assert_eq!(parsed.comments[0].text, "What is this number?");
    }
}
