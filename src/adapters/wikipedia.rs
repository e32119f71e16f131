//! Wikipedia "On This Day" feed adapter.
//!
//! Fetches the events listed for a calendar day and turns them into facts.
//! Events outside the configured year range, or whose year makes the day
//! impossible (29 February in a common year), are skipped.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::fact::DEFAULT_CATEGORY;
use crate::domain::{CanonicalDate, Fact};
use crate::facts::FactSource;

/// Feed root; `/{MM}/{DD}` is appended
pub const FEED_URL: &str = "https://api.wikimedia.org/feed/v1/wikipedia/en/onthisday/all";

const USER_AGENT: &str = "datecheck/0.1 (historical date recall evaluation)";

/// Response from the feed
#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    events: Vec<FeedEvent>,
}

#[derive(Debug, Deserialize)]
struct FeedEvent {
    text: Option<String>,
    year: Option<i32>,
    #[serde(default)]
    pages: Vec<FeedPage>,
}

#[derive(Debug, Deserialize)]
struct FeedPage {
    #[serde(rename = "type")]
    page_type: Option<String>,
    title: Option<String>,
}

/// Client for the On This Day feed
pub struct OnThisDayClient {
    base_url: String,
    client: reqwest::Client,
    min_year: i32,
    max_year: i32,
    /// Day to fetch when used as a `FactSource`
    day: Option<(u32, u32)>,
}

impl OnThisDayClient {
    /// Client keeping years 1000 through the current year
    pub fn new() -> Result<Self> {
        Self::with_base_url(FEED_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            min_year: 1000,
            max_year: Utc::now().year(),
            day: None,
        })
    }

    /// Restrict kept events to `min..=max`
    pub fn with_year_range(mut self, min_year: i32, max_year: i32) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    /// Fix the day loaded through `FactSource::load`
    pub fn for_day(mut self, month: u32, day: u32) -> Self {
        self.day = Some((month, day));
        self
    }

    fn day_url(&self, month: u32, day: u32) -> String {
        format!("{}/{:02}/{:02}", self.base_url, month, day)
    }

    /// Fetch facts for one calendar day
    pub async fn fetch_day(&self, month: u32, day: u32) -> Result<Vec<Fact>> {
        let url = self.day_url(month, day);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("On This Day feed returned {} for {:02}/{:02}", status, month, day);
        }

        let feed: FeedResponse = response
            .json()
            .await
            .context("Failed to parse On This Day response")?;

        let facts = self.facts_from_feed(feed, month, day);
        debug!(month, day, count = facts.len(), "Fetched On This Day events");
        Ok(facts)
    }

    fn facts_from_feed(&self, feed: FeedResponse, month: u32, day: u32) -> Vec<Fact> {
        feed.events
            .into_iter()
            .filter_map(|event| {
                let (text, year) = (event.text?, event.year?);
                if year < self.min_year || year > self.max_year {
                    return None;
                }

                let date = match CanonicalDate::new(year, month, day) {
                    Ok(date) => date,
                    Err(e) => {
                        debug!(error = %e, "Skipping event with impossible date");
                        return None;
                    }
                };

                let category = event
                    .pages
                    .first()
                    .and_then(|p| p.page_type.clone())
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
                let pages = event.pages.into_iter().filter_map(|p| p.title).collect();

                Some(Fact::new(text, date, category).with_source_pages(pages))
            })
            .collect()
    }

    /// Fetch every day of the calendar, pausing `delay` between requests.
    ///
    /// With `target_year`, only events from that year are kept. Days that
    /// fail to load are logged and skipped.
    pub async fn fetch_all_days(&self, target_year: Option<i32>, delay: Duration) -> Vec<Fact> {
        let mut all = Vec::new();
        let mut ok_days = 0usize;
        let days = calendar_days();

        for (idx, (month, day)) in days.iter().copied().enumerate() {
            if idx > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.fetch_day(month, day).await {
                Ok(facts) => {
                    ok_days += 1;
                    all.extend(
                        facts
                            .into_iter()
                            .filter(|f| target_year.map_or(true, |y| f.date.year() == y)),
                    );
                }
                Err(e) => {
                    warn!(month, day, error = %e, "Skipping day");
                }
            }
        }

        info!(
            days = days.len(),
            ok_days,
            events = all.len(),
            "Finished On This Day scrape"
        );
        all
    }
}

#[async_trait]
impl FactSource for OnThisDayClient {
    fn name(&self) -> &str {
        "on-this-day"
    }

    async fn load(&self) -> Result<Vec<Fact>> {
        let (month, day) = self
            .day
            .context("On This Day source needs a month and day")?;
        self.fetch_day(month, day).await
    }
}

/// Every (month, day) pair of a leap year
pub fn calendar_days() -> Vec<(u32, u32)> {
    let mut days = Vec::with_capacity(366);
    let mut current = NaiveDate::from_ymd_opt(2000, 1, 1);
    while let Some(date) = current.filter(|d| d.year() == 2000) {
        days.push((date.month(), date.day()));
        current = date.succ_opt();
    }
    days
}

/// Parse `MM/DD` (or `MM-DD`) into a month and day
pub fn parse_month_day(input: &str) -> Result<(u32, u32)> {
    let (month, day) = input
        .trim()
        .split_once(|c: char| c == '/' || c == '-')
        .with_context(|| format!("Expected MM/DD, got '{}'", input))?;

    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month in '{}'", input))?;
    let day: u32 = day
        .parse()
        .with_context(|| format!("Invalid day in '{}'", input))?;

    if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
        anyhow::bail!("'{}' is not a day of the year", input);
    }

    Ok((month, day))
}
