//! Per-fact evaluation records and the aggregated report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date::CanonicalDate;
use super::fact::Fact;
use crate::extraction::PatternKind;

/// Outcome of searching a response for a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum ExtractionResult {
    Found(CanonicalDate),
    NotFound,
}

impl ExtractionResult {
    /// The extracted date, if any
    pub fn date(&self) -> Option<CanonicalDate> {
        match self {
            ExtractionResult::Found(date) => Some(*date),
            ExtractionResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ExtractionResult::Found(_))
    }
}

impl From<Option<CanonicalDate>> for ExtractionResult {
    fn from(date: Option<CanonicalDate>) -> Self {
        date.map_or(ExtractionResult::NotFound, ExtractionResult::Found)
    }
}

/// Graduated correctness of an extracted date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Whether the extracted year equals the ground-truth year
    pub is_year_correct: bool,

    /// Partial-credit score in [0, 1]
    pub confidence: f64,
}

impl ScoreResult {
    /// The score given to a missing extraction
    pub fn zero() -> Self {
        Self {
            is_year_correct: false,
            confidence: 0.0,
        }
    }
}

/// Everything recorded for one tested fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// The fact under test
    pub fact: Fact,

    /// Prompt sent to the model
    pub question: String,

    /// Raw model output (None if the query failed)
    pub response: Option<String>,

    /// Date found in the response
    pub extraction: ExtractionResult,

    /// Surface form the date was found in
    pub pattern: Option<PatternKind>,

    /// Score against the fact's ground truth
    pub score: ScoreResult,

    /// Transport error text when the model could not be queried
    pub query_error: Option<String>,
}

impl EvaluationRecord {
    pub fn is_correct(&self) -> bool {
        self.score.is_year_correct
    }

    pub fn is_exact(&self) -> bool {
        self.extraction.date() == Some(self.fact.date)
    }

    pub fn query_failed(&self) -> bool {
        self.query_error.is_some()
    }
}

/// Aggregate statistics over a set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub correct: usize,
    pub exact_matches: usize,
    pub not_found: usize,
    pub query_failures: usize,
    /// correct / total (0.0 for an empty run)
    pub accuracy: f64,
    /// Mean confidence (0.0 for an empty run)
    pub mean_confidence: f64,
}

impl ReportSummary {
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let total = records.len();
        if total == 0 {
            return Self::default();
        }

        let correct = records.iter().filter(|r| r.is_correct()).count();
        let exact_matches = records.iter().filter(|r| r.is_exact()).count();
        let not_found = records.iter().filter(|r| !r.extraction.is_found()).count();
        let query_failures = records.iter().filter(|r| r.query_failed()).count();
        let confidence_sum: f64 = records.iter().map(|r| r.score.confidence).sum();

        Self {
            total,
            correct,
            exact_matches,
            not_found,
            query_failures,
            accuracy: correct as f64 / total as f64,
            mean_confidence: confidence_sum / total as f64,
        }
    }
}

/// Ordered, append-only result of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records: Vec<EvaluationRecord>,
}

impl EvaluationReport {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            model: model.into(),
            started_at: Utc::now(),
            completed_at: None,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: EvaluationRecord) {
        self.records.push(record);
    }

    pub fn complete(mut self) -> Self {
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_records(&self.records)
    }

    /// Print a console summary of the run
    pub fn print_summary(&self) {
        let summary = self.summary();
        if summary.total == 0 {
            println!("No results to summarize");
            return;
        }

        println!("\n{}", "=".repeat(50));
        println!("DATE RECALL SUMMARY ({})", self.model);
        println!("{}", "=".repeat(50));
        println!("Total Tests: {}", summary.total);
        println!("Correct Answers: {}", summary.correct);
        println!("Exact Dates: {}", summary.exact_matches);
        println!("Accuracy: {:.1}%", summary.accuracy * 100.0);
        println!("Average Confidence: {:.2}", summary.mean_confidence);
        if summary.query_failures > 0 {
            println!("Query Failures: {}", summary.query_failures);
        }

        println!("\nDetailed Results:");
        for (i, record) in self.records.iter().enumerate() {
            let status = if record.is_correct() { "✓" } else { "✗" };
            let got = record
                .extraction
                .date()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "None".to_string());
            println!("{}. {} {}", i + 1, status, record.fact.event);
            println!("   Expected: {}, Got: {}", record.fact.date, got);
            println!("   Confidence: {:.2}", record.score.confidence);
            if let Some(ref error) = record.query_error {
                println!("   Query error: {}", error);
            }
        }
    }
}
