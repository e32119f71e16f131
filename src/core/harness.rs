//! Evaluation harness.
//!
//! For every fact: build a prompt, query the model, extract a date from
//! the answer, score it against the ground truth, and append the record to
//! the report. A failed query is recorded as a `NotFound` extraction with
//! zero confidence; it does not stop the run. Only a run in which every
//! query failed is reported as an error.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{GenerationParams, GenerationRequest, ModelClient};
use crate::domain::{EvaluationRecord, EvaluationReport, ExtractionResult, Fact};
use crate::extraction::DateExtractor;

use super::questions::{PromptStyle, QuestionGenerator};
use super::scoring::score;

/// Explicit run settings
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Model name passed to the backend
    pub model: String,

    /// System instruction sent with question-style prompts
    pub system_prompt: Option<String>,

    /// Sampling parameters; a missing seed is drawn per query
    pub params: GenerationParams,

    pub prompt_style: PromptStyle,

    /// Facts evaluated at once (1 = strictly sequential)
    pub max_concurrency: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            system_prompt: Some(crate::config::DEFAULT_SYSTEM_PROMPT.to_string()),
            params: GenerationParams::default(),
            prompt_style: PromptStyle::Question,
            max_concurrency: 1,
        }
    }
}

/// Run-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("All {attempted} model queries failed; last error: {last_error}")]
    AllQueriesFailed { attempted: usize, last_error: String },

    #[error("Evaluation worker failed: {0}")]
    Worker(String),
}

/// Composition root for an evaluation run
#[derive(Clone)]
pub struct Harness {
    client: Arc<dyn ModelClient>,
    config: Arc<HarnessConfig>,
    questions: Arc<QuestionGenerator>,
    extractor: DateExtractor<'static>,
}

impl Harness {
    /// Create a harness with the built-in question rules
    pub fn new(client: Arc<dyn ModelClient>, config: HarnessConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
            questions: Arc::new(QuestionGenerator::default()),
            extractor: DateExtractor::default(),
        }
    }

    /// Replace the question rule table
    pub fn with_questions(mut self, questions: QuestionGenerator) -> Self {
        self.questions = Arc::new(questions);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Prompt text for a fact under the configured style
    pub fn prompt_for(&self, fact: &Fact) -> String {
        self.config.prompt_style.prompt_for(&self.questions, fact)
    }

    fn request_for(&self, prompt: &str, temperature: f64) -> GenerationRequest {
        let system = if self.config.prompt_style.uses_system_prompt() {
            self.config.system_prompt.clone()
        } else {
            None
        };

        GenerationRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            system,
            params: GenerationParams {
                temperature,
                max_tokens: self.config.params.max_tokens,
                seed: Some(self.config.params.seed.unwrap_or_else(rand::random)),
            },
        }
    }

    /// Evaluate one fact at the configured temperature
    pub async fn evaluate_fact(&self, fact: &Fact) -> EvaluationRecord {
        self.evaluate_at(fact, self.config.params.temperature).await
    }

    /// Evaluate one fact at a given temperature
    pub async fn evaluate_at(&self, fact: &Fact, temperature: f64) -> EvaluationRecord {
        let question = self.prompt_for(fact);
        let request = self.request_for(&question, temperature);

        let (response, query_error) = match self.client.generate(&request).await {
            Ok(text) => (Some(text), None),
            Err(e) => {
                warn!(event = %fact.event, error = %e, "Model query failed");
                (None, Some(e.to_string()))
            }
        };

        let found = response.as_deref().and_then(|text| self.extractor.find(text));
        let extraction: ExtractionResult = found.as_ref().map(|m| m.date).into();
        let score = score(&extraction, Some(&fact.date));

        debug!(
            event = %fact.event,
            truth = %fact.date,
            extracted = ?extraction.date().map(|d| d.to_string()),
            confidence = score.confidence,
            "Scored fact"
        );

        EvaluationRecord {
            fact: fact.clone(),
            question,
            response,
            extraction,
            pattern: found.map(|m| m.kind),
            score,
            query_error,
        }
    }

    /// Evaluate every fact and aggregate the results
    #[instrument(skip(self, facts), fields(model = %self.config.model, facts = facts.len()))]
    pub async fn run(&self, facts: &[Fact]) -> Result<EvaluationReport, HarnessError> {
        let mut report = EvaluationReport::new(self.config.model.as_str());
        info!(run_id = %report.run_id, "Starting evaluation run");

        let records = if self.config.max_concurrency <= 1 {
            self.run_sequential(facts).await
        } else {
            self.run_concurrent(facts).await?
        };

        ensure_some_query_succeeded(records.iter().map(|r| r.query_error.as_deref()))?;

        for record in records {
            report.push(record);
        }
        let report = report.complete();

        let summary = report.summary();
        info!(
            run_id = %report.run_id,
            total = summary.total,
            correct = summary.correct,
            accuracy = summary.accuracy,
            mean_confidence = summary.mean_confidence,
            "Evaluation run finished"
        );

        Ok(report)
    }

    async fn run_sequential(&self, facts: &[Fact]) -> Vec<EvaluationRecord> {
        let mut records = Vec::with_capacity(facts.len());
        for fact in facts {
            records.push(self.evaluate_fact(fact).await);
        }
        records
    }

    /// Bounded fan-out; records come back in input order
    async fn run_concurrent(&self, facts: &[Fact]) -> Result<Vec<EvaluationRecord>, HarnessError> {
        let permits = self
            .config
            .max_concurrency
            .min(facts.len())
            .clamp(1, Semaphore::MAX_PERMITS);
        let sem = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for (idx, fact) in facts.iter().cloned().enumerate() {
            let harness = self.clone();
            let sem = Arc::clone(&sem);
            tasks.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                (idx, harness.evaluate_fact(&fact).await)
            });
        }

        let mut slots: Vec<Option<EvaluationRecord>> = vec![None; facts.len()];
        while let Some(joined) = tasks.join_next().await {
            let (idx, record) = joined.map_err(|e| HarnessError::Worker(e.to_string()))?;
            slots[idx] = Some(record);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Fail when there was at least one query and none of them succeeded
pub(crate) fn ensure_some_query_succeeded<'a>(
    errors: impl Iterator<Item = Option<&'a str>>,
) -> Result<(), HarnessError> {
    let mut attempted = 0usize;
    let mut last_error = None;

    for error in errors {
        attempted += 1;
        match error {
            Some(e) => last_error = Some(e),
            None => return Ok(()),
        }
    }

    match last_error {
        Some(e) if attempted > 0 => Err(HarnessError::AllQueriesFailed {
            attempted,
            last_error: e.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_some_query_succeeded() {
        assert!(ensure_some_query_succeeded(std::iter::empty()).is_ok());
        assert!(ensure_some_query_succeeded([Some("x"), None].into_iter()).is_ok());

        let err = ensure_some_query_succeeded([Some("a"), Some("b")].into_iter()).unwrap_err();
        assert_eq!(
            err,
            HarnessError::AllQueriesFailed {
                attempted: 2,
                last_error: "b".to_string()
            }
        );
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.params.temperature, 0.3);
        assert!(config.system_prompt.is_some());
    }
}
