use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Outcome of comparing one expected value against one actual value.
///
/// Serialized with the short codes report layers key on (`P`, `F`, `OM`,
/// `NE`, `PK`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchStatus {
    #[serde(rename = "P")]
    Pass,
    #[serde(rename = "F")]
    Fail,
    /// Sequence vs mapping, or scalar vs composite.
    #[serde(rename = "OM")]
    ObjectMismatch,
    /// No actual counterpart: missing array element, or business key mismatch.
    #[serde(rename = "NE")]
    NotExists,
    /// Business key fields match, some other field does not.
    #[serde(rename = "PK")]
    KeyMatched,
}

impl MatchStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pass => "P",
            Self::Fail => "F",
            Self::ObjectMismatch => "OM",
            Self::NotExists => "NE",
            Self::KeyMatched => "PK",
        }
    }

    pub fn is_pass(&self) -> bool {
        *self == Self::Pass
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::ObjectMismatch => write!(f, "object_mismatch"),
            Self::NotExists => write!(f, "not_exists"),
            Self::KeyMatched => write!(f, "key_matched"),
        }
    }
}

/// Which input a message or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Expected,
    Actual,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expected => write!(f, "expected"),
            Self::Actual => write!(f, "actual"),
        }
    }
}

// ---------------------------------------------------------------------------
// Result tree
// ---------------------------------------------------------------------------

/// Key of a diff entry: a mapping field, or an index into the expected sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiffKey {
    Field(String),
    Index(usize),
}

impl std::fmt::Display for DiffKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl Serialize for DiffKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for DiffKey {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for DiffKey {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for DiffKey {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// One node of the comparison verdict.
///
/// `exp`/`act` are echoed on non-pass outcomes; `None` there means the side
/// was absent (missing key), `Some(Value::Null)` means an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub diff: BTreeMap<DiffKey, ComparisonResult>,
    /// Actual index assigned to this entry of a sequence diff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_index: Option<usize>,
    /// Passing fields (mappings) or truly matched indices (sequences).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
}

impl ComparisonResult {
    pub fn is_pass(&self) -> bool {
        self.status.is_pass()
    }

    pub fn get(&self, key: &DiffKey) -> Option<&ComparisonResult> {
        self.diff.get(key)
    }

    pub fn field(&self, name: &str) -> Option<&ComparisonResult> {
        self.diff.get(&DiffKey::Field(name.to_string()))
    }

    pub fn index(&self, i: usize) -> Option<&ComparisonResult> {
        self.diff.get(&DiffKey::Index(i))
    }
}

// ---------------------------------------------------------------------------
// Array scoring
// ---------------------------------------------------------------------------

/// Quality of a candidate pairing. Variant order is the ranking:
/// `None < Partial(_) < Exact`, and partial scores rank by count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScore {
    None,
    Partial(usize),
    Exact,
}

impl MatchScore {
    pub fn of(result: &ComparisonResult) -> Self {
        if result.is_pass() {
            return Self::Exact;
        }
        match result.match_count {
            Some(n) => Self::Partial(n),
            None => Self::None,
        }
    }
}

/// How much of a result tree a comparison builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Echo both sides and record every diff entry.
    Full,
    /// Status and match count only. Used to score array candidates.
    Score,
}

impl Detail {
    pub fn echoes(&self) -> bool {
        *self == Self::Full
    }
}

/// Verdict of one expected element against one actual candidate. The full
/// result is rebuilt only for the candidate that gets assigned.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CrossResult {
    pub status: MatchStatus,
    pub element_index: usize,
    /// `None` when the actual sequence was empty.
    pub matching_index: Option<usize>,
    pub score: MatchScore,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub status: MatchStatus,
    pub total_entries: usize,
    pub passed: usize,
    pub failed: usize,
    pub object_mismatches: usize,
    pub not_exists: usize,
    pub key_matched: usize,
    pub status_counts: BTreeMap<String, usize>,
}
