//! datecheck - Historical date recall evaluation for local LLMs
//!
//! Asks a model when historical events happened, pulls a calendar date out
//! of its free-text answer, and grades the answer against the known date.
//!
//! # Architecture
//!
//! The evaluation core is pure and deterministic:
//! - Extraction tries a fixed, ordered set of date surface forms
//! - Normalization turns a match into a validated calendar date
//! - Scoring grades year, month and day with partial credit
//!
//! Only the model query touches the network; a failed query is recorded
//! as "no date found" and the run continues.
//!
//! # Modules
//!
//! - `adapters`: External system integrations (Ollama, Wikipedia)
//! - `core`: Evaluation logic (Harness, Scoring, Questions, Reports)
//! - `domain`: Data structures (CanonicalDate, Fact, EvaluationRecord)
//! - `extraction`: Date extraction from free text
//! - `facts`: Fact sources and sampling
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Evaluate five random sample facts against the default model
//! datecheck run
//!
//! # Sweep temperatures over a fact file
//! datecheck sweep --facts facts.jsonl --temperatures 0.5,0.7,1.0 --trials 5
//!
//! # Try the extractor by hand
//! echo "It happened on July 20, 1969." | datecheck extract
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod extraction;
pub mod facts;

// Re-export main types at crate root for convenience
pub use adapters::{GenerationParams, GenerationRequest, ModelClient, QueryError};
pub use core::{score, score_dates, Harness, HarnessConfig, HarnessError, ReportStore};
pub use domain::{CanonicalDate, EvaluationRecord, EvaluationReport, ExtractionResult, Fact, ScoreResult};
pub use extraction::{extract_date, DateExtractor, PatternKind};
