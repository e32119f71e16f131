//! Domain types for date-recall evaluation.
//!
//! This module contains the core data structures:
//! - CanonicalDate: a validated calendar date
//! - Fact: a historical event with its ground-truth date
//! - Records: extraction results, scores, and the evaluation report

pub mod date;
pub mod fact;
pub mod record;

// Re-export commonly used types
pub use date::{CanonicalDate, DateError};
pub use fact::Fact;
pub use record::{EvaluationRecord, EvaluationReport, ExtractionResult, ReportSummary, ScoreResult};
