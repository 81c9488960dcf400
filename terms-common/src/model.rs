//! Term record model
//!
//! A term record is the atomic unit of ingestion: a search keyword (`term`),
//! a human-readable label (`title`), a classification tag (`type`) and a
//! UUID `id`. A batch of records sharing one `type` is stored as the `items`
//! array of a single document keyed by `snake_case(type)`.

use serde::{Deserialize, Serialize};

/// The exact key set of a raw term record
pub const RECORD_FIELDS: [&str; 4] = ["id", "type", "term", "title"];

/// A validated term record
///
/// Only produced from raw input that passed shape validation, so every
/// instance carries all four fields with a canonical UUID id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub term: String,
    pub title: String,
}

impl TermRecord {
    pub fn new(
        id: impl Into<String>,
        record_type: impl Into<String>,
        term: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            record_type: record_type.into(),
            term: term.into(),
            title: title.into(),
        }
    }

    /// Create a record with a freshly generated UUIDv4 id
    pub fn generate(
        record_type: impl Into<String>,
        term: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self::new(crate::uuid_utils::generate_string(), record_type, term, title)
    }

    /// Document key for this record's type
    pub fn document_key(&self) -> String {
        snake_case(&self.record_type)
    }
}

/// Stored document: every record of one type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsDocument {
    pub items: Vec<TermRecord>,
}

impl TermsDocument {
    pub fn new(items: Vec<TermRecord>) -> Self {
        Self { items }
    }
}

impl From<Vec<TermRecord>> for TermsDocument {
    fn from(items: Vec<TermRecord>) -> Self {
        Self { items }
    }
}

/// A local record whose `term` or `title` already exists in the stored document
///
/// Exactly one of `term` / `title` is set: the field that collided, holding
/// the stored value. A pair colliding on both fields yields two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Id of the stored record that was collided with
    pub db_id: String,
    /// Index of the offending record in the local batch
    pub index: usize,
    pub term: Option<String>,
    pub title: Option<String>,
}

impl Conflict {
    pub fn on_term(db_id: impl Into<String>, index: usize, term: impl Into<String>) -> Self {
        Self {
            db_id: db_id.into(),
            index,
            term: Some(term.into()),
            title: None,
        }
    }

    pub fn on_title(db_id: impl Into<String>, index: usize, title: impl Into<String>) -> Self {
        Self {
            db_id: db_id.into(),
            index,
            term: None,
            title: Some(title.into()),
        }
    }

    /// Name of the field that triggered this conflict
    pub fn field(&self) -> &'static str {
        if self.term.is_some() {
            "term"
        } else {
            "title"
        }
    }

    /// The stored value that collided
    pub fn value(&self) -> &str {
        self.term
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }
}

/// Deterministic document key for a `type` value
///
/// Lowercases, splits on runs of non-alphanumeric characters and on
/// lower-to-upper camel boundaries, and joins the words with `_`:
/// `"front end"` and `"frontEnd"` both map to `front_end`.
pub fn snake_case(input: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_lowercase() || ch.is_numeric();
            current.extend(ch.to_lowercase());
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_variants() {
        assert_eq!(snake_case("front end"), "front_end");
        assert_eq!(snake_case("Back-End"), "back_end");
        assert_eq!(snake_case("frontEnd"), "front_end");
        assert_eq!(snake_case("  dev   ops  "), "dev_ops");
        assert_eq!(snake_case("css3 grid"), "css3_grid");
        assert_eq!(snake_case("HTML"), "html");
        assert_eq!(snake_case("---"), "");
        assert_eq!(snake_case(""), "");
    }

    #[test]
    fn test_record_serializes_type_field() {
        let record = TermRecord::new(
            "1a1f99ae-a50b-4096-8791-13f0ba3341df",
            "front end",
            "css grid",
            "CSS Grid Tutorials",
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "front end");
        assert!(value.get("record_type").is_none());
        assert_eq!(record.document_key(), "front_end");
    }

    #[test]
    fn test_record_rejects_unknown_fields() {
        let raw = serde_json::json!({
            "id": "1a1f99ae-a50b-4096-8791-13f0ba3341df",
            "type": "front end",
            "term": "css grid",
            "title": "CSS Grid",
            "extra": "nope"
        });
        assert!(serde_json::from_value::<TermRecord>(raw).is_err());
    }

    #[test]
    fn test_generated_record_has_canonical_id() {
        let record = TermRecord::generate("back end", "rust axum", "Axum Tutorials");
        assert!(crate::uuid_utils::is_canonical(&record.id));
    }

    #[test]
    fn test_conflict_accessors() {
        let on_term = Conflict::on_term("db-1", 0, "css grid");
        assert_eq!(on_term.field(), "term");
        assert_eq!(on_term.value(), "css grid");
        assert!(on_term.title.is_none());

        let on_title = Conflict::on_title("db-2", 3, "CSS Grid");
        assert_eq!(on_title.field(), "title");
        assert_eq!(on_title.value(), "CSS Grid");
        assert!(on_title.term.is_none());
    }
}
