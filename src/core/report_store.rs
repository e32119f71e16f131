//! File-based report sink.
//!
//! Each run is written as newline-delimited JSON (one record per line)
//! next to a small summary file, for easy inspection with jq or pandas.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::sweep::{SweepReport, TemperatureSummary};
use crate::domain::{CanonicalDate, EvaluationRecord, EvaluationReport, ReportSummary};
use crate::extraction::PatternKind;

/// One flattened record line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    pub event: String,
    pub category: String,
    pub question: String,
    pub response: Option<String>,
    pub extracted_date: Option<CanonicalDate>,
    pub pattern: Option<PatternKind>,
    pub ground_truth: CanonicalDate,
    pub is_correct: bool,
    pub confidence: f64,
    pub query_error: Option<String>,
}

impl From<&EvaluationRecord> for ReportLine {
    fn from(record: &EvaluationRecord) -> Self {
        Self {
            event: record.fact.event.clone(),
            category: record.fact.category.clone(),
            question: record.question.clone(),
            response: record.response.clone(),
            extracted_date: record.extraction.date(),
            pattern: record.pattern,
            ground_truth: record.fact.date,
            is_correct: record.score.is_year_correct,
            confidence: record.score.confidence,
            query_error: record.query_error.clone(),
        }
    }
}

/// Contents of `<run_id>.summary.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFile {
    pub run_id: Uuid,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub summary: ReportSummary,
}

#[derive(Debug, Serialize)]
struct SweepFile<'a> {
    #[serde(flatten)]
    report: &'a SweepReport,
    by_temperature: Vec<TemperatureSummary>,
}

/// Directory of run reports
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Create or open a report directory
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

        Ok(Self { dir })
    }

    pub fn records_path(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.jsonl", run_id))
    }

    pub fn summary_path(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.summary.json", run_id))
    }

    pub fn sweep_path(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("sweep-{}.json", run_id))
    }

    /// Write the records and summary of a run, returning the records path
    pub async fn write(&self, report: &EvaluationReport) -> Result<PathBuf> {
        let records_path = self.records_path(report.run_id);

        let mut file = File::create(&records_path)
            .await
            .with_context(|| format!("Failed to create report: {}", records_path.display()))?;

        for record in &report.records {
            let mut line = serde_json::to_string(&ReportLine::from(record))
                .context("Failed to serialize report line")?;
            line.push('\n');
            file.write_all(line.as_bytes())
                .await
                .context("Failed to write report line")?;
        }
        file.flush().await.context("Failed to flush report")?;

        let summary = SummaryFile {
            run_id: report.run_id,
            model: report.model.clone(),
            started_at: report.started_at,
            completed_at: report.completed_at,
            summary: report.summary(),
        };
        let summary_path = self.summary_path(report.run_id);
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        fs::write(&summary_path, json)
            .await
            .with_context(|| format!("Failed to write summary: {}", summary_path.display()))?;

        Ok(records_path)
    }

    /// Write a sweep report, returning its path
    pub async fn write_sweep(&self, report: &SweepReport) -> Result<PathBuf> {
        let path = self.sweep_path(report.run_id);
        let file = SweepFile {
            report,
            by_temperature: report.by_temperature(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize sweep")?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write sweep: {}", path.display()))?;
        Ok(path)
    }

    /// Read record lines back from a JSONL report
    pub async fn read_records(path: &Path) -> Result<Vec<ReportLine>> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read report: {}", path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Invalid report line {}", idx + 1))
            })
            .collect()
    }

    /// Read a summary file
    pub async fn read_summary(path: &Path) -> Result<SummaryFile> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read summary: {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse summary")
    }
}
