//! Fact sources.
//!
//! Facts come from a curated built-in list, a JSONL file, or the
//! Wikipedia "On This Day" feed (see `adapters::wikipedia`). Each source
//! yields facts with an already-validated ground-truth date.

pub mod sample;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::fs;

use crate::domain::Fact;

pub use sample::SampleFacts;

/// Trait for fact suppliers
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Load all facts from the source
    async fn load(&self) -> Result<Vec<Fact>>;
}

/// Facts stored one JSON object per line
pub struct JsonlFactFile {
    path: PathBuf,
}

impl JsonlFactFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FactSource for JsonlFactFile {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn load(&self) -> Result<Vec<Fact>> {
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read facts file: {}", self.path.display()))?;

        parse_facts_jsonl(&content)
            .with_context(|| format!("Failed to parse facts file: {}", self.path.display()))
    }
}

/// Parse JSONL facts, skipping blank lines
pub fn parse_facts_jsonl(content: &str) -> Result<Vec<Fact>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Fact>(line)
                .with_context(|| format!("Invalid fact on line {}", idx + 1))
        })
        .collect()
}

/// Write facts as JSONL, sorted by date
pub async fn write_facts_jsonl(path: &Path, facts: &[Fact]) -> Result<()> {
    let mut sorted: Vec<&Fact> = facts.iter().collect();
    sorted.sort_by_key(|f| f.date);

    let mut out = String::new();
    for fact in sorted {
        out.push_str(&serde_json::to_string(fact).context("Failed to serialize fact")?);
        out.push('\n');
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, out)
        .await
        .with_context(|| format!("Failed to write facts file: {}", path.display()))
}

/// Draw up to `count` facts uniformly without replacement
pub fn sample_facts<R: Rng + ?Sized>(facts: &[Fact], count: usize, rng: &mut R) -> Vec<Fact> {
    facts
        .choose_multiple(rng, count.min(facts.len()))
        .cloned()
        .collect()
}

/// Counts describing a fact set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FactStats {
    pub total: usize,
    /// Facts per category, sorted by name
    pub by_category: BTreeMap<String, usize>,
    /// Oldest and newest year, if any facts
    pub year_range: Option<(i32, i32)>,
}

impl FactStats {
    pub fn from_facts(facts: &[Fact]) -> Self {
        let mut by_category = BTreeMap::new();
        for fact in facts {
            *by_category.entry(fact.category.clone()).or_insert(0) += 1;
        }

        let years = facts.iter().map(|f| f.date.year());
        let year_range = years.clone().min().zip(years.max());

        Self {
            total: facts.len(),
            by_category,
            year_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_jsonl() {
        let content = r#"{"event": "A", "date": "1903-12-17", "category": "aviation"}

{"event": "B", "date": "1912-04-15"}
"#;
        let facts = parse_facts_jsonl(content).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].category, "aviation");
        assert_eq!(facts[1].category, "general");
    }

    #[test]
    fn test_parse_jsonl_reports_line() {
        let content = "{\"event\": \"A\", \"date\": \"1903-12-17\"}\n{\"event\": \"B\", \"date\": \"1903-02-30\"}\n";
        let err = parse_facts_jsonl(content).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_sample_without_replacement() {
        let facts = SampleFacts::facts();
        let mut rng = StdRng::seed_from_u64(42);

        let picked = sample_facts(&facts, 5, &mut rng);
        assert_eq!(picked.len(), 5);
        for (i, a) in picked.iter().enumerate() {
            assert!(picked.iter().skip(i + 1).all(|b| b != a));
        }

        let all = sample_facts(&facts, 100, &mut rng);
        assert_eq!(all.len(), facts.len());
    }

    #[test]
    fn test_fact_stats() {
        let stats = FactStats::from_facts(&SampleFacts::facts());
        assert_eq!(stats.total, 10);
        assert_eq!(stats.by_category.get("politics"), Some(&3));
        assert_eq!(stats.by_category.get("war"), Some(&2));
        assert_eq!(stats.year_range, Some((1776, 2007)));

        assert_eq!(FactStats::from_facts(&[]), FactStats::default());
    }

    #[tokio::test]
    async fn test_write_then_load_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("facts.jsonl");

        let mut facts = SampleFacts::facts();
        facts.reverse();
        write_facts_jsonl(&path, &facts).await.unwrap();

        let loaded = JsonlFactFile::new(&path).load().await.unwrap();
        assert_eq!(loaded.len(), facts.len());
        assert!(loaded.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(loaded[0].date.to_string(), "1776-07-04");
    }
}
