//! Registry of recognized date surface forms.
//!
//! Patterns are held in a fixed precedence order. Each pattern pairs a
//! regular expression with a capture function that lifts its match groups
//! into typed [`CandidateFields`], so the normalizer never has to guess
//! which group holds what.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Full English month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Resolve a month name (any case) to 1-12
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
}

/// Pattern classes, declared in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `YYYY-M-D`
    NumericIso,
    /// `M/D/YYYY` (month first, always)
    NumericSlash,
    /// `<Month> D[,] YYYY`
    MonthNameFirst,
    /// `D <Month> YYYY`
    DayFirstName,
    /// `YYYY` on its own
    BareYear,
}

impl PatternKind {
    /// All classes, highest precedence first
    pub const ALL: [PatternKind; 5] = [
        PatternKind::NumericIso,
        PatternKind::NumericSlash,
        PatternKind::MonthNameFirst,
        PatternKind::DayFirstName,
        PatternKind::BareYear,
    ];

    /// Precedence rank, 1 being tried first
    pub fn rank(self) -> u8 {
        match self {
            PatternKind::NumericIso => 1,
            PatternKind::NumericSlash => 2,
            PatternKind::MonthNameFirst => 3,
            PatternKind::DayFirstName => 4,
            PatternKind::BareYear => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::NumericIso => "numeric_iso",
            PatternKind::NumericSlash => "numeric_slash",
            PatternKind::MonthNameFirst => "month_name_first",
            PatternKind::DayFirstName => "day_first_name",
            PatternKind::BareYear => "bare_year",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured groups, already arranged by meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateFields<'t> {
    /// All-digit forms (ISO and slash)
    Numeric {
        year: &'t str,
        month: &'t str,
        day: &'t str,
    },
    /// Forms with a spelled-out month
    Named {
        year: &'t str,
        month_name: &'t str,
        day: &'t str,
    },
    /// A year with nothing else
    YearOnly { year: &'t str },
}

/// One syntactic match of a pattern in some text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCandidate<'t> {
    /// Which pattern produced this
    pub kind: PatternKind,
    /// The full matched text
    pub text: &'t str,
    /// Byte offset of the match
    pub offset: usize,
    pub fields: CandidateFields<'t>,
}

type CaptureFn = for<'t> fn(&Captures<'t>) -> Option<CandidateFields<'t>>;

/// A recognized date surface form
pub struct SurfacePattern {
    kind: PatternKind,
    regex: Regex,
    capture: CaptureFn,
}

impl SurfacePattern {
    fn new(kind: PatternKind, pattern: &str, capture: CaptureFn) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("Invalid date surface regex"),
            capture,
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn rank(&self) -> u8 {
        self.kind.rank()
    }

    /// Lazily yield matches in order of first occurrence
    pub fn candidates<'a, 't: 'a>(
        &'a self,
        text: &'t str,
    ) -> impl Iterator<Item = RawCandidate<'t>> + 'a {
        self.regex.captures_iter(text).filter_map(move |caps| {
            let whole = caps.get(0)?;
            let fields = (self.capture)(&caps)?;
            Some(RawCandidate {
                kind: self.kind,
                text: whole.as_str(),
                offset: whole.start(),
                fields,
            })
        })
    }

    /// All matches in order of first occurrence
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<RawCandidate<'t>> {
        self.candidates(text).collect()
    }
}

impl fmt::Debug for SurfacePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfacePattern")
            .field("kind", &self.kind)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

fn iso_fields<'t>(caps: &Captures<'t>) -> Option<CandidateFields<'t>> {
    Some(CandidateFields::Numeric {
        year: caps.get(1)?.as_str(),
        month: caps.get(2)?.as_str(),
        day: caps.get(3)?.as_str(),
    })
}

fn slash_fields<'t>(caps: &Captures<'t>) -> Option<CandidateFields<'t>> {
    Some(CandidateFields::Numeric {
        month: caps.get(1)?.as_str(),
        day: caps.get(2)?.as_str(),
        year: caps.get(3)?.as_str(),
    })
}

fn month_first_fields<'t>(caps: &Captures<'t>) -> Option<CandidateFields<'t>> {
    Some(CandidateFields::Named {
        month_name: caps.get(1)?.as_str(),
        day: caps.get(2)?.as_str(),
        year: caps.get(3)?.as_str(),
    })
}

fn day_first_fields<'t>(caps: &Captures<'t>) -> Option<CandidateFields<'t>> {
    Some(CandidateFields::Named {
        day: caps.get(1)?.as_str(),
        month_name: caps.get(2)?.as_str(),
        year: caps.get(3)?.as_str(),
    })
}

fn year_fields<'t>(caps: &Captures<'t>) -> Option<CandidateFields<'t>> {
    Some(CandidateFields::YearOnly {
        year: caps.get(1)?.as_str(),
    })
}

/// Ordered set of surface patterns
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<SurfacePattern>,
}

static STANDARD: LazyLock<PatternRegistry> = LazyLock::new(PatternRegistry::build_standard);

impl PatternRegistry {
    /// The fixed five-pattern registry
    pub fn standard() -> &'static PatternRegistry {
        &STANDARD
    }

    fn build_standard() -> Self {
        let months = MONTH_NAMES.join("|");

        let patterns = vec![
            SurfacePattern::new(
                PatternKind::NumericIso,
                r"\b([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})\b",
                iso_fields,
            ),
            SurfacePattern::new(
                PatternKind::NumericSlash,
                r"\b([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})\b",
                slash_fields,
            ),
            SurfacePattern::new(
                PatternKind::MonthNameFirst,
                &format!(r"(?i)\b({months})\s+([0-9]{{1,2}}),?\s+([0-9]{{4}})\b"),
                month_first_fields,
            ),
            SurfacePattern::new(
                PatternKind::DayFirstName,
                &format!(r"(?i)\b([0-9]{{1,2}})\s+({months})\s+([0-9]{{4}})\b"),
                day_first_fields,
            ),
            SurfacePattern::new(PatternKind::BareYear, r"\b([0-9]{4})\b", year_fields),
        ];

        Self { patterns }
    }

    /// Patterns in precedence order
    pub fn iter(&self) -> impl Iterator<Item = &SurfacePattern> {
        self.patterns.iter()
    }

    pub fn get(&self, kind: PatternKind) -> Option<&SurfacePattern> {
        self.patterns.iter().find(|p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
