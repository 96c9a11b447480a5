//! `jsonmatch-matcher`: structural diff engine for JSON-like values.
//!
//! Pure engine crate: receives pre-loaded values, returns comparison results.
//! Arrays are reconciled without regard to element order. No CLI, no
//! rendering, no IO besides reading a config file.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod object;
pub mod reconcile;
pub mod result;

pub use config::{FieldPath, MatchConfig};
pub use engine::{compare, compare_serialize, compare_with, Matcher};
pub use error::MatchError;
pub use evidence::{failing_paths, summarize};
pub use model::{ComparisonResult, DiffKey, MatchScore, MatchStatus, MatchSummary, Side};
