//! Harness Integration Tests
//!
//! Runs the evaluation loop against a scripted model client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use datecheck::adapters::{GenerationRequest, ModelClient, QueryError};
use datecheck::core::{Harness, HarnessConfig, HarnessError, PromptStyle, QuestionGenerator, QuestionRule};
use datecheck::domain::{CanonicalDate, ExtractionResult, Fact};
use datecheck::extraction::PatternKind;
use datecheck::facts::SampleFacts;

/// Answers by question text; unknown questions fail with a connection error
#[derive(Default)]
struct ScriptedClient {
    answers: HashMap<String, String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    fn answering(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, QueryError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers
            .get(&request.prompt)
            .cloned()
            .ok_or_else(|| QueryError::Connection("scripted".to_string()))
    }

    async fn health_check(&self) -> Result<(), QueryError> {
        Ok(())
    }
}

fn fact(event: &str, date: &str) -> Fact {
    Fact::new(event, date.parse::<CanonicalDate>().unwrap(), "general")
}

#[tokio::test]
async fn test_run_scores_each_fact() {
    let client = Arc::new(ScriptedClient::answering(&[
        (
            "When did the first moon landing occur?",
            "Apollo 11 landed on July 20, 1969.",
        ),
        ("When did the Titanic sink?", "It sank in April 1912, on 4/14/1912."),
        ("When was JFK assassinated?", "I'm not sure."),
    ]));
    let harness = Harness::new(client.clone(), HarnessConfig::default());

    let facts = vec![
        fact("The first moon landing occurred with Apollo 11", "1969-07-20"),
        fact("The Titanic sank after hitting an iceberg", "1912-04-15"),
        fact("John F. Kennedy was assassinated in Dallas, Texas", "1963-11-22"),
    ];

    let report = harness.run(&facts).await.unwrap();
    assert_eq!(report.records.len(), 3);
    assert!(report.completed_at.is_some());

    let moon = &report.records[0];
    assert!(moon.is_exact());
    assert_eq!(moon.pattern, Some(PatternKind::MonthNameFirst));
    assert_eq!(moon.score.confidence, 1.0);

    let titanic = &report.records[1];
    assert_eq!(titanic.extraction.date().unwrap().to_string(), "1912-04-14");
    assert_eq!(titanic.pattern, Some(PatternKind::NumericSlash));
    assert!(titanic.score.is_year_correct);
    assert_eq!(titanic.score.confidence, 0.9);

    let jfk = &report.records[2];
    assert_eq!(jfk.extraction, ExtractionResult::NotFound);
    assert_eq!(jfk.score.confidence, 0.0);
    assert!(!jfk.query_failed());

    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.correct, 2);
    assert_eq!(summary.exact_matches, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.query_failures, 0);
    assert!((summary.accuracy - 2.0 / 3.0).abs() < 1e-9);
    assert!((summary.mean_confidence - 1.9 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_query_failure_is_recorded_not_fatal() {
    let client = Arc::new(ScriptedClient::answering(&[(
        "When did the Titanic sink?",
        "1912-04-15",
    )]));
    let harness = Harness::new(client, HarnessConfig::default());

    let facts = vec![
        fact("The Titanic sank after hitting an iceberg", "1912-04-15"),
        fact("The Berlin Wall fell", "1989-11-09"),
    ];

    let report = harness.run(&facts).await.unwrap();
    let failed = &report.records[1];
    assert!(failed.query_failed());
    assert!(failed.response.is_none());
    assert_eq!(failed.extraction, ExtractionResult::NotFound);
    assert!(!failed.score.is_year_correct);
    assert_eq!(failed.score.confidence, 0.0);
    assert_eq!(report.summary().query_failures, 1);
}

#[tokio::test]
async fn test_every_query_failing_is_a_run_error() {
    let harness = Harness::new(Arc::new(ScriptedClient::default()), HarnessConfig::default());

    let err = harness.run(&SampleFacts::facts()).await.unwrap_err();
    match err {
        HarnessError::AllQueriesFailed { attempted, last_error } => {
            assert_eq!(attempted, 10);
            assert!(last_error.contains("scripted"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_run_is_not_an_error() {
    let harness = Harness::new(Arc::new(ScriptedClient::default()), HarnessConfig::default());
    let report = harness.run(&[]).await.unwrap();
    assert!(report.records.is_empty());
    assert_eq!(report.summary().accuracy, 0.0);
}

#[tokio::test]
async fn test_question_style_sends_system_prompt_and_params() {
    let client = Arc::new(ScriptedClient::default());
    let mut config = HarnessConfig {
        model: "gemma3n:e4b".to_string(),
        ..Default::default()
    };
    config.params.seed = Some(7);
    let harness = Harness::new(client.clone(), config);

    let _ = harness
        .run(&[fact("The first iPhone was released by Apple", "2007-06-29")])
        .await;

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gemma3n:e4b");
    assert_eq!(requests[0].prompt, "When was the first iPhone released?");
    assert!(requests[0].system.is_some());
    assert_eq!(requests[0].params.temperature, 0.3);
    assert_eq!(requests[0].params.max_tokens, 1000);
    assert_eq!(requests[0].params.seed, Some(7));
}

#[tokio::test]
async fn test_context_style_drops_system_prompt() {
    let client = Arc::new(ScriptedClient::default());
    let config = HarnessConfig {
        prompt_style: PromptStyle::Context {
            preamble: "On what date did the following event occur?".to_string(),
        },
        ..Default::default()
    };
    let harness = Harness::new(client.clone(), config);

    let _ = harness.run(&[fact("Tunguska event", "1908-06-30")]).await;

    let requests = client.requests();
    assert_eq!(
        requests[0].prompt,
        "On what date did the following event occur?\n Tunguska event"
    );
    assert!(requests[0].system.is_none());
    assert!(requests[0].params.seed.is_some());
}

#[tokio::test]
async fn test_custom_rules_take_precedence() {
    let client = Arc::new(ScriptedClient::answering(&[(
        "When did the Tunguska explosion happen?",
        "On 30 June 1908.",
    )]));
    let questions = QuestionGenerator::default()
        .with_leading_rules(vec![QuestionRule::new(
            &["tunguska"],
            "When did the Tunguska explosion happen?",
        )]);
    let harness = Harness::new(client, HarnessConfig::default()).with_questions(questions);

    let report = harness.run(&[fact("Tunguska event", "1908-06-30")]).await.unwrap();
    assert!(report.records[0].is_exact());
    assert_eq!(report.records[0].pattern, Some(PatternKind::DayFirstName));
}

#[tokio::test]
async fn test_concurrent_run_keeps_input_order() {
    let facts = SampleFacts::facts();
    let questions = QuestionGenerator::default();
    let answers: Vec<(String, String)> = facts
        .iter()
        .map(|f| (questions.question_for(f), format!("It was {}.", f.date)))
        .collect();

    let client = ScriptedClient {
        answers: answers.into_iter().collect(),
        delay: Some(Duration::from_millis(5)),
        ..Default::default()
    };
    let config = HarnessConfig {
        max_concurrency: 4,
        ..Default::default()
    };
    let harness = Harness::new(Arc::new(client), config);

    let report = harness.run(&facts).await.unwrap();
    assert_eq!(report.records.len(), facts.len());
    for (record, fact) in report.records.iter().zip(&facts) {
        assert_eq!(&record.fact, fact);
        assert!(record.is_exact());
    }
    assert_eq!(report.summary().accuracy, 1.0);
}

#[tokio::test]
async fn test_oversized_concurrency_is_clamped() {
    let client = Arc::new(ScriptedClient::answering(&[(
        "When did the Titanic sink?",
        "1912-04-15",
    )]));
    let config = HarnessConfig {
        max_concurrency: usize::MAX,
        ..Default::default()
    };
    let harness = Harness::new(client, config);

    let titanic = fact("The Titanic sank after hitting an iceberg", "1912-04-15");
    let report = harness.run(&[titanic.clone(), titanic]).await.unwrap();
    assert_eq!(report.records.len(), 2);
    assert!(report.records.iter().all(|r| r.is_exact()));
}

#[tokio::test]
async fn test_sweep_counts_hits_per_temperature() {
    let client = Arc::new(ScriptedClient::answering(&[(
        "When did the Titanic sink?",
        "April 1912",
    )]));
    let harness = Harness::new(client.clone(), HarnessConfig::default());

    let facts = vec![fact("The Titanic sank after hitting an iceberg", "1912-04-15")];
    let report = harness.sweep(&facts, &[0.5, 1.0], 3).await.unwrap();

    assert_eq!(report.cells.len(), 2);
    for cell in &report.cells {
        assert_eq!(cell.trials, 3);
        assert_eq!(cell.exact_hits, 0);
        assert_eq!(cell.year_hits, 3);
        assert_eq!(cell.failures, 0);
        assert!((cell.mean_confidence - 0.7).abs() < 1e-9);
    }

    let temps: Vec<f64> = client.requests().iter().map(|r| r.params.temperature).collect();
    assert_eq!(temps, vec![0.5, 0.5, 0.5, 1.0, 1.0, 1.0]);

    let rows = report.by_temperature();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].year_rate, 1.0);
}

#[tokio::test]
async fn test_sweep_with_no_successful_query_fails() {
    let harness = Harness::new(Arc::new(ScriptedClient::default()), HarnessConfig::default());
    let facts = vec![fact("Anything", "1900-01-01")];
    assert!(matches!(
        harness.sweep(&facts, &[0.5], 2).await,
        Err(HarnessError::AllQueriesFailed { attempted: 2, .. })
    ));
}
