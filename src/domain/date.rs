//! Canonical calendar dates.
//!
//! A `CanonicalDate` is always a real Gregorian date. Construction validates
//! the (year, month, day) triple, so an invalid date can never be held.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Smallest year a canonical date may carry
pub const MIN_YEAR: i32 = 1;

/// Largest year a canonical date may carry (keeps `YYYY` four digits wide)
pub const MAX_YEAR: i32 = 9999;

/// Errors raised when building a canonical date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Year {year} is outside {MIN_YEAR}..={MAX_YEAR}")]
    YearOutOfRange { year: i32 },

    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidCalendarDate { year: i32, month: u32, day: u32 },

    #[error("Expected a YYYY-MM-DD date, got '{input}'")]
    Unparsable { input: String },
}

/// A validated (year, month, day) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    /// Build a date, rejecting anything that is not on the Gregorian calendar
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateError::YearOutOfRange { year });
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateError::InvalidCalendarDate { year, month, day })
    }

    /// January 1st of the given year
    pub fn year_start(year: i32) -> Result<Self, DateError> {
        Self::new(year, 1, 1)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for CanonicalDate {
    type Err = DateError;

    /// Strict `YYYY-MM-DD` parsing (exactly 4-2-2 digits)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparsable = || DateError::Unparsable {
            input: s.to_string(),
        };

        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('-').collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(unparsable());
        };

        let widths_ok = year.len() == 4 && month.len() == 2 && day.len() == 2;
        let digits_ok = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-');
        if !widths_ok || !digits_ok {
            return Err(unparsable());
        }

        let year: i32 = year.parse().map_err(|_| unparsable())?;
        let month: u32 = month.parse().map_err(|_| unparsable())?;
        let day: u32 = day.parse().map_err(|_| unparsable())?;

        Self::new(year, month, day)
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
