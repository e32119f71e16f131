//! Partial-credit scoring of extracted dates.
//!
//! A matching year earns 70 points, a matching month 20 more and a
//! matching day 10 more. A wrong year is scored by how far off it is.
//! Points are kept as integers and divided once, so 0.7 + 0.2 is exactly
//! `0.9`.

use crate::domain::{CanonicalDate, ExtractionResult, ScoreResult};

const EXACT_POINTS: u32 = 100;
const YEAR_POINTS: u32 = 70;
const MONTH_POINTS: u32 = 20;
const DAY_POINTS: u32 = 10;

/// Points for a wrong year, by absolute distance in years
fn year_distance_points(distance: u32) -> u32 {
    match distance {
        0..=1 => 30,
        2..=5 => 10,
        6..=10 => 5,
        _ => 1,
    }
}

fn from_points(points: u32) -> f64 {
    f64::from(points.min(EXACT_POINTS)) / 100.0
}

/// Score an extraction against an optional ground truth
pub fn score(extraction: &ExtractionResult, truth: Option<&CanonicalDate>) -> ScoreResult {
    match (extraction.date(), truth) {
        (Some(extracted), Some(truth)) => score_dates(&extracted, truth),
        _ => ScoreResult::zero(),
    }
}

/// Score two concrete dates
pub fn score_dates(extracted: &CanonicalDate, truth: &CanonicalDate) -> ScoreResult {
    if extracted == truth {
        return ScoreResult {
            is_year_correct: true,
            confidence: from_points(EXACT_POINTS),
        };
    }

    if extracted.year() == truth.year() {
        let mut points = YEAR_POINTS;
        if extracted.month() == truth.month() {
            points += MONTH_POINTS;
        }
        if extracted.day() == truth.day() {
            points += DAY_POINTS;
        }
        return ScoreResult {
            is_year_correct: true,
            confidence: from_points(points),
        };
    }

    let distance = extracted.year().abs_diff(truth.year());
    ScoreResult {
        is_year_correct: false,
        confidence: from_points(year_distance_points(distance)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> CanonicalDate {
        s.parse().unwrap()
    }

    fn scored(extracted: &str, truth: &str) -> (bool, f64) {
        let result = score_dates(&d(extracted), &d(truth));
        (result.is_year_correct, result.confidence)
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(scored("1969-07-20", "1969-07-20"), (true, 1.0));
    }

    #[test]
    fn test_year_only() {
        assert_eq!(scored("1969-01-15", "1969-07-20"), (true, 0.70));
    }

    #[test]
    fn test_year_and_month() {
        assert_eq!(scored("1969-07-01", "1969-07-20"), (true, 0.90));
    }

    #[test]
    fn test_year_and_day() {
        assert_eq!(scored("1969-01-20", "1969-07-20"), (true, 0.80));
    }

    #[test]
    fn test_year_distance_steps() {
        assert_eq!(scored("1970-07-20", "1969-07-20"), (false, 0.30));
        assert_eq!(scored("1968-07-20", "1969-07-20"), (false, 0.30));
        assert_eq!(scored("1966-07-20", "1969-07-20"), (false, 0.10));
        assert_eq!(scored("1974-07-20", "1969-07-20"), (false, 0.10));
        assert_eq!(scored("1963-07-20", "1969-07-20"), (false, 0.05));
        assert_eq!(scored("1979-07-20", "1969-07-20"), (false, 0.05));
        assert_eq!(scored("1958-07-20", "1969-07-20"), (false, 0.01));
        assert_eq!(scored("1919-07-20", "1969-07-20"), (false, 0.01));
    }

    #[test]
    fn test_not_found_scores_zero() {
        let truth = d("1969-07-20");
        assert_eq!(score(&ExtractionResult::NotFound, Some(&truth)), ScoreResult::zero());
        assert_eq!(score(&ExtractionResult::NotFound, None), ScoreResult::zero());
    }

    #[test]
    fn test_missing_truth_scores_zero() {
        let found = ExtractionResult::Found(d("1969-07-20"));
        assert_eq!(score(&found, None), ScoreResult::zero());
    }

    #[test]
    fn test_confidence_bounds() {
        let truth = d("2000-06-15");
        for extracted in ["0001-01-01", "1999-12-31", "2000-06-14", "2000-06-15", "9999-12-31"] {
            let result = score_dates(&d(extracted), &truth);
            assert!((0.0..=1.0).contains(&result.confidence));
        }
    }
}
