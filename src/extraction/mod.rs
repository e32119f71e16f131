//! Date extraction from free-text model responses.
//!
//! - `registry`: the fixed, ordered set of date surface forms
//! - `normalize`: raw matches to validated canonical dates
//! - `engine`: precedence-ordered search over a response
//!
//! # Example
//!
//! ```
//! use datecheck::extraction::extract_date;
//!
//! let result = extract_date("Apollo 11 landed on July 20, 1969.");
//! assert_eq!(result.date().unwrap().to_string(), "1969-07-20");
//! ```

pub mod engine;
pub mod normalize;
pub mod registry;

pub use engine::{extract_date, DateExtractor, DateMatch};
pub use normalize::{normalize, CandidateRejection};
pub use registry::{
    month_number, CandidateFields, PatternKind, PatternRegistry, RawCandidate, SurfacePattern,
    MONTH_NAMES,
};
