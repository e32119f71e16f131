//! Curated fallback facts, used when no other source is available.

use anyhow::Result;
use async_trait::async_trait;

use super::FactSource;
use crate::domain::{CanonicalDate, Fact};

/// (event, year, month, day, category)
const SAMPLES: [(&str, i32, u32, u32, &str); 10] = [
    ("John F. Kennedy was assassinated in Dallas, Texas", 1963, 11, 22, "politics"),
    ("The first moon landing occurred with Apollo 11", 1969, 7, 20, "space"),
    ("World War II ended in Europe with Germany's surrender", 1945, 5, 8, "war"),
    ("The Titanic sank after hitting an iceberg", 1912, 4, 15, "disaster"),
    (
        "The Declaration of Independence was adopted by the Continental Congress",
        1776,
        7,
        4,
        "politics",
    ),
    ("The Berlin Wall fell, marking the end of the Cold War era", 1989, 11, 9, "politics"),
    ("The Wright brothers made their first powered flight", 1903, 12, 17, "aviation"),
    ("The atomic bomb was dropped on Hiroshima", 1945, 8, 6, "war"),
    ("The Great Depression began with the stock market crash", 1929, 10, 29, "economics"),
    ("The first iPhone was released by Apple", 2007, 6, 29, "technology"),
];

/// The built-in ten-fact list
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleFacts;

impl SampleFacts {
    pub fn facts() -> Vec<Fact> {
        SAMPLES
            .iter()
            .filter_map(|&(event, year, month, day, category)| {
                CanonicalDate::new(year, month, day)
                    .ok()
                    .map(|date| Fact::new(event, date, category))
            })
            .collect()
    }
}

#[async_trait]
impl FactSource for SampleFacts {
    fn name(&self) -> &str {
        "sample"
    }

    async fn load(&self) -> Result<Vec<Fact>> {
        Ok(Self::facts())
    }
}
