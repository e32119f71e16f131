//! Temperature sweeps.
//!
//! Asks about every fact `trials` times at each temperature and records how
//! often the model lands on the exact date, on the right year, and the mean
//! confidence. Failed queries count as misses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{CanonicalDate, Fact};

use super::harness::{ensure_some_query_succeeded, Harness, HarnessError};

/// Results for one (fact, temperature) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepCell {
    pub event: String,
    pub ground_truth: CanonicalDate,
    pub temperature: f64,
    pub trials: u32,
    pub exact_hits: u32,
    pub year_hits: u32,
    pub failures: u32,
    pub mean_confidence: f64,
}

impl SweepCell {
    pub fn exact_rate(&self) -> f64 {
        rate(self.exact_hits, self.trials)
    }

    pub fn year_rate(&self) -> f64 {
        rate(self.year_hits, self.trials)
    }
}

/// Aggregate over all facts at one temperature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub temperature: f64,
    pub trials: u32,
    pub exact_rate: f64,
    pub year_rate: f64,
    pub mean_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub cells: Vec<SweepCell>,
}

impl SweepReport {
    /// Per-temperature aggregates, in sweep order
    pub fn by_temperature(&self) -> Vec<TemperatureSummary> {
        let mut temperatures: Vec<f64> = Vec::new();
        for cell in &self.cells {
            if !temperatures.contains(&cell.temperature) {
                temperatures.push(cell.temperature);
            }
        }

        temperatures
            .into_iter()
            .map(|temperature| {
                let cells: Vec<&SweepCell> = self
                    .cells
                    .iter()
                    .filter(|c| c.temperature == temperature)
                    .collect();
                let trials: u32 = cells.iter().map(|c| c.trials).sum();
                let exact: u32 = cells.iter().map(|c| c.exact_hits).sum();
                let year: u32 = cells.iter().map(|c| c.year_hits).sum();
                let confidence_sum: f64 = cells
                    .iter()
                    .map(|c| c.mean_confidence * f64::from(c.trials))
                    .sum();

                TemperatureSummary {
                    temperature,
                    trials,
                    exact_rate: rate(exact, trials),
                    year_rate: rate(year, trials),
                    mean_confidence: if trials == 0 {
                        0.0
                    } else {
                        confidence_sum / f64::from(trials)
                    },
                }
            })
            .collect()
    }

    /// Print a console table of the sweep
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(50));
        println!("TEMPERATURE SWEEP ({})", self.model);
        println!("{}", "=".repeat(50));
        println!("{:>6}  {:>6}  {:>7}  {:>7}  {:>10}", "temp", "trials", "exact%", "year%", "confidence");
        for row in self.by_temperature() {
            println!(
                "{:>6.2}  {:>6}  {:>6.1}%  {:>6.1}%  {:>10.2}",
                row.temperature,
                row.trials,
                row.exact_rate * 100.0,
                row.year_rate * 100.0,
                row.mean_confidence
            );
        }
    }
}

fn rate(hits: u32, trials: u32) -> f64 {
    if trials == 0 {
        0.0
    } else {
        f64::from(hits) / f64::from(trials)
    }
}

impl Harness {
    /// Query each fact `trials` times at each temperature
    #[instrument(skip(self, facts), fields(model = %self.config().model, facts = facts.len()))]
    pub async fn sweep(
        &self,
        facts: &[Fact],
        temperatures: &[f64],
        trials: u32,
    ) -> Result<SweepReport, HarnessError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, ?temperatures, trials, "Starting temperature sweep");

        let mut cells = Vec::with_capacity(facts.len() * temperatures.len());
        let mut errors: Vec<Option<String>> = Vec::new();

        for &temperature in temperatures {
            for fact in facts {
                let mut cell = SweepCell {
                    event: fact.event.clone(),
                    ground_truth: fact.date,
                    temperature,
                    trials,
                    exact_hits: 0,
                    year_hits: 0,
                    failures: 0,
                    mean_confidence: 0.0,
                };

                let mut confidence_sum = 0.0;
                for _ in 0..trials {
                    let record = self.evaluate_at(fact, temperature).await;
                    if record.is_exact() {
                        cell.exact_hits += 1;
                    }
                    if record.is_correct() {
                        cell.year_hits += 1;
                    }
                    if record.query_failed() {
                        cell.failures += 1;
                    }
                    confidence_sum += record.score.confidence;
                    errors.push(record.query_error);
                }

                if trials > 0 {
                    cell.mean_confidence = confidence_sum / f64::from(trials);
                }
                cells.push(cell);
            }
        }

        ensure_some_query_succeeded(errors.iter().map(|e| e.as_deref()))?;

        Ok(SweepReport {
            run_id,
            model: self.config().model.clone(),
            started_at,
            cells,
        })
    }
}
