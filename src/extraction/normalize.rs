//! Turns raw pattern matches into canonical dates.

use thiserror::Error;

use super::registry::{month_number, CandidateFields, RawCandidate};
use crate::domain::CanonicalDate;

/// Why a syntactic match did not become a date.
///
/// Rejections are recovered by the extraction engine and never surface
/// to callers of `extract`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateRejection {
    #[error("Malformed candidate '{text}': {reason}")]
    MalformedCandidate { text: String, reason: String },

    #[error("Unrecognized month name '{name}'")]
    UnresolvedMonthName { name: String },
}

/// Normalize one candidate into a validated date
pub fn normalize(candidate: &RawCandidate<'_>) -> Result<CanonicalDate, CandidateRejection> {
    let malformed = |reason: String| CandidateRejection::MalformedCandidate {
        text: candidate.text.to_string(),
        reason,
    };

    let date = match candidate.fields {
        CandidateFields::Numeric { year, month, day } => CanonicalDate::new(
            parse_year(year).map_err(&malformed)?,
            parse_number(month).map_err(&malformed)?,
            parse_number(day).map_err(&malformed)?,
        ),
        CandidateFields::Named {
            year,
            month_name,
            day,
        } => {
            let month = month_number(month_name).ok_or_else(|| {
                CandidateRejection::UnresolvedMonthName {
                    name: month_name.to_string(),
                }
            })?;
            CanonicalDate::new(
                parse_year(year).map_err(&malformed)?,
                month,
                parse_number(day).map_err(&malformed)?,
            )
        }
        CandidateFields::YearOnly { year } => {
            CanonicalDate::year_start(parse_year(year).map_err(&malformed)?)
        }
    };

    date.map_err(|e| malformed(e.to_string()))
}

fn parse_year(digits: &str) -> Result<i32, String> {
    digits
        .parse::<i32>()
        .map_err(|e| format!("'{}' is not a year: {}", digits, e))
}

fn parse_number(digits: &str) -> Result<u32, String> {
    digits
        .parse::<u32>()
        .map_err(|e| format!("'{}' is not a number: {}", digits, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::PatternKind;

    fn candidate(kind: PatternKind, fields: CandidateFields<'static>) -> RawCandidate<'static> {
        RawCandidate {
            kind,
            text: "test",
            offset: 0,
            fields,
        }
    }

    #[test]
    fn test_numeric_fields() {
        let c = candidate(
            PatternKind::NumericIso,
            CandidateFields::Numeric {
                year: "1969",
                month: "07",
                day: "20",
            },
        );
        assert_eq!(normalize(&c).unwrap().to_string(), "1969-07-20");
    }

    #[test]
    fn test_named_fields() {
        let c = candidate(
            PatternKind::DayFirstName,
            CandidateFields::Named {
                year: "1945",
                month_name: "May",
                day: "8",
            },
        );
        assert_eq!(normalize(&c).unwrap().to_string(), "1945-05-08");
    }

    #[test]
    fn test_year_only_defaults_to_january_first() {
        let c = candidate(PatternKind::BareYear, CandidateFields::YearOnly { year: "1969" });
        assert_eq!(normalize(&c).unwrap().to_string(), "1969-01-01");

        let c = candidate(PatternKind::BareYear, CandidateFields::YearOnly { year: "0033" });
        assert_eq!(normalize(&c).unwrap(), CanonicalDate::year_start(33).unwrap());
    }

    #[test]
    fn test_unknown_month_name_rejected() {
        let c = candidate(
            PatternKind::MonthNameFirst,
            CandidateFields::Named {
                year: "1969",
                month_name: "Thermidor",
                day: "9",
            },
        );
        assert_eq!(
            normalize(&c),
            Err(CandidateRejection::UnresolvedMonthName {
                name: "Thermidor".to_string()
            })
        );
    }

    #[test]
    fn test_calendar_invalid_rejected() {
        for (month, day) in [("2", "30"), ("13", "1"), ("1", "32"), ("0", "5")] {
            let c = candidate(
                PatternKind::NumericIso,
                CandidateFields::Numeric {
                    year: "2021",
                    month,
                    day,
                },
            );
            assert!(matches!(
                normalize(&c),
                Err(CandidateRejection::MalformedCandidate { .. })
            ));
        }
    }

    #[test]
    fn test_year_zero_rejected() {
        let c = candidate(PatternKind::BareYear, CandidateFields::YearOnly { year: "0000" });
        assert!(normalize(&c).is_err());
    }
}
