//! Core evaluation logic.
//!
//! This module contains:
//! - Questions: Prompt generation from facts
//! - Scoring: Graded comparison against ground truth
//! - Harness: Query, extract, score loop
//! - Sweep: Repeated trials across temperatures
//! - ReportStore: JSONL report persistence

pub mod harness;
pub mod questions;
pub mod report_store;
pub mod scoring;
pub mod sweep;

// Re-export commonly used types
pub use harness::{Harness, HarnessConfig, HarnessError};
pub use questions::{builtin_rules, PromptStyle, QuestionGenerator, QuestionRule};
pub use report_store::{ReportLine, ReportStore, SummaryFile};
pub use scoring::{score, score_dates};
pub use sweep::{SweepCell, SweepReport, TemperatureSummary};
