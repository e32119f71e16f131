//! Historical facts with known ground-truth dates.

use serde::{Deserialize, Serialize};

use super::date::CanonicalDate;

/// Category label used when a source does not supply one
pub const DEFAULT_CATEGORY: &str = "general";

/// A historical event and the date it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Free-text event description
    pub event: String,

    /// Ground-truth date
    pub date: CanonicalDate,

    /// Category label (e.g. "politics", "space")
    #[serde(default = "default_category")]
    pub category: String,

    /// Titles of the source pages, when the source provides them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_pages: Vec<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Fact {
    pub fn new(event: impl Into<String>, date: CanonicalDate, category: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            date,
            category: category.into(),
            source_pages: Vec::new(),
        }
    }

    /// Attach source page titles
    pub fn with_source_pages(mut self, pages: Vec<String>) -> Self {
        self.source_pages = pages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_deserializes_with_default_category() {
        let fact: Fact =
            serde_json::from_str(r#"{"event": "Berlin Wall falls", "date": "1989-11-09"}"#)
                .unwrap();
        assert_eq!(fact.category, "general");
        assert!(fact.source_pages.is_empty());
        assert_eq!(fact.date.year(), 1989);
    }

    #[test]
    fn test_fact_rejects_bad_ground_truth() {
        let result = serde_json::from_str::<Fact>(r#"{"event": "x", "date": "1989-02-30"}"#);
        assert!(result.is_err());
    }
}
