//! Data models for bibman
//!
//! Defines the bibliography entry and the helpers that turn caller-supplied
//! text into the integer fields the store needs.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A bibliographic record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BibEntry {
    /// Store-assigned identifier (None until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Title of the work
    pub title: String,
    /// Author(s), free-form
    pub author: String,
    /// Publication year
    pub year: i32,
    /// Journal name
    pub journal: String,
}

impl BibEntry {
    /// Create a new, unpersisted entry
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
        journal: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            year,
            journal: journal.into(),
        }
    }

    /// Attach a store-assigned id (for loading from storage)
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Compare the four content fields, ignoring the id
    pub fn same_content(&self, other: &BibEntry) -> bool {
        self.title == other.title
            && self.author == other.author
            && self.year == other.year
            && self.journal == other.journal
    }
}

/// Parse an entry id supplied as text
pub fn parse_entry_id(raw: &str) -> StoreResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| StoreError::InvalidArgument(format!("entry id must be an integer, got '{}'", raw)))
}

/// Parse a year supplied as text
///
/// Negative years are rejected: BibTeX export keeps only the digits, so the
/// sign would be lost on re-import.
pub fn parse_year(raw: &str) -> StoreResult<i32> {
    let year: i32 = raw
        .trim()
        .parse()
        .map_err(|_| StoreError::InvalidArgument(format!("year must be an integer, got '{}'", raw)))?;

    if year < 0 {
        return Err(StoreError::InvalidArgument(format!(
            "year must not be negative, got '{}'",
            raw
        )));
    }
    Ok(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_has_no_id() {
        let entry = BibEntry::new("A Study", "Jane Doe", 2021, "Nature");
        assert!(entry.id.is_none());
        assert_eq!(entry.title, "A Study");
        assert_eq!(entry.year, 2021);
    }

    #[test]
    fn test_same_content_ignores_id() {
        let a = BibEntry::new("T", "A", 1999, "J").with_id(1);
        let b = BibEntry::new("T", "A", 1999, "J").with_id(2);
        assert!(a.same_content(&b));
        assert_ne!(a, b);

        let c = BibEntry::new("T", "A", 2000, "J");
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_parse_entry_id() {
        assert_eq!(parse_entry_id("42").unwrap(), 42);
        assert_eq!(parse_entry_id(" 7 ").unwrap(), 7);
        assert!(matches!(
            parse_entry_id("abc"),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(parse_entry_id("").is_err());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2020").unwrap(), 2020);
        assert_eq!(parse_year("0").unwrap(), 0);
        assert!(matches!(
            parse_year("twenty"),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_year("-44"),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serialization_omits_missing_id() {
        let entry = BibEntry::new("T", "A", 1, "J");
        let toml_str = toml::to_string(&entry).unwrap();
        assert!(!toml_str.contains("id ="));

        let stored = entry.with_id(5);
        assert!(toml::to_string(&stored).unwrap().contains("id = 5"));
    }
}
