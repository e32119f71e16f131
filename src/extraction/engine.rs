//! Precedence-ordered date extraction from free text.

use tracing::trace;

use super::normalize::normalize;
use super::registry::{PatternKind, PatternRegistry};
use crate::domain::{CanonicalDate, ExtractionResult};

/// A date located in text, with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub date: CanonicalDate,
    pub kind: PatternKind,
    /// The surface text that produced the date
    pub matched: String,
    /// Byte offset of the surface text
    pub offset: usize,
}

/// Runs a pattern registry over text.
///
/// The first candidate that normalizes, from the highest-precedence class
/// that yields one, wins. Later occurrences and lower classes are not
/// consulted once a winner is found.
#[derive(Debug, Clone, Copy)]
pub struct DateExtractor<'r> {
    registry: &'r PatternRegistry,
}

impl Default for DateExtractor<'static> {
    fn default() -> Self {
        Self::new(PatternRegistry::standard())
    }
}

impl<'r> DateExtractor<'r> {
    pub fn new(registry: &'r PatternRegistry) -> Self {
        Self { registry }
    }

    /// Find the best date in `text`, with match details
    pub fn find(&self, text: &str) -> Option<DateMatch> {
        if text.trim().is_empty() {
            return None;
        }

        for pattern in self.registry.iter() {
            for candidate in pattern.candidates(text) {
                match normalize(&candidate) {
                    Ok(date) => {
                        return Some(DateMatch {
                            date,
                            kind: candidate.kind,
                            matched: candidate.text.to_string(),
                            offset: candidate.offset,
                        });
                    }
                    Err(rejection) => {
                        trace!(pattern = %candidate.kind, %rejection, "Candidate rejected");
                    }
                }
            }
        }

        None
    }

    /// Find the best date in `text`
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.find(text).map(|m| m.date).into()
    }

    /// Extract from a response that may be absent
    pub fn extract_response(&self, response: Option<&str>) -> ExtractionResult {
        response.map_or(ExtractionResult::NotFound, |text| self.extract(text))
    }
}

/// Extract with the standard registry
pub fn extract_date(text: &str) -> ExtractionResult {
    DateExtractor::default().extract(text)
}
