use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::{ComparisonResult, Detail, DiffKey, MatchStatus};

/// Assembles a [`ComparisonResult`]. Every comparator finishes through
/// `build()`, so no partially filled record ever escapes.
///
/// At [`Detail::Score`] the echo and diff setters are no-ops, so scoring a
/// candidate never copies either side.
#[derive(Debug, Clone)]
pub struct ResultBuilder {
    status: MatchStatus,
    detail: Detail,
    exp: Option<Value>,
    act: Option<Value>,
    diff: BTreeMap<DiffKey, ComparisonResult>,
    matched_index: Option<usize>,
    match_count: Option<usize>,
}

impl ResultBuilder {
    pub fn new(status: MatchStatus) -> Self {
        Self::with_detail(status, Detail::Full)
    }

    pub fn with_detail(status: MatchStatus, detail: Detail) -> Self {
        Self {
            status,
            detail,
            exp: None,
            act: None,
            diff: BTreeMap::new(),
            matched_index: None,
            match_count: None,
        }
    }

    pub fn pass() -> Self {
        Self::new(MatchStatus::Pass)
    }

    pub fn status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn expected(mut self, value: Option<&Value>) -> Self {
        if self.detail.echoes() {
            self.exp = value.cloned();
        }
        self
    }

    pub fn actual(mut self, value: Option<&Value>) -> Self {
        if self.detail.echoes() {
            self.act = value.cloned();
        }
        self
    }

    pub fn expected_object(mut self, map: Option<&Map<String, Value>>) -> Self {
        if self.detail.echoes() {
            self.exp = map.map(|m| Value::Object(m.clone()));
        }
        self
    }

    pub fn actual_object(mut self, map: Option<&Map<String, Value>>) -> Self {
        if self.detail.echoes() {
            self.act = map.map(|m| Value::Object(m.clone()));
        }
        self
    }

    pub fn expected_array(mut self, items: Option<&[Value]>) -> Self {
        if self.detail.echoes() {
            self.exp = items.map(|v| Value::Array(v.to_vec()));
        }
        self
    }

    pub fn actual_array(mut self, items: Option<&[Value]>) -> Self {
        if self.detail.echoes() {
            self.act = items.map(|v| Value::Array(v.to_vec()));
        }
        self
    }

    pub fn diff(mut self, diff: BTreeMap<DiffKey, ComparisonResult>) -> Self {
        if self.detail.echoes() {
            self.diff = diff;
        }
        self
    }

    pub fn matched_index(mut self, index: Option<usize>) -> Self {
        self.matched_index = index;
        self
    }

    pub fn match_count(mut self, count: usize) -> Self {
        self.match_count = Some(count);
        self
    }

    pub fn build(self) -> ComparisonResult {
        ComparisonResult {
            status: self.status,
            exp: self.exp,
            act: self.act,
            diff: self.diff,
            matched_index: self.matched_index,
            match_count: self.match_count,
        }
    }
}

impl From<ComparisonResult> for ResultBuilder {
    fn from(r: ComparisonResult) -> Self {
        Self {
            status: r.status,
            detail: Detail::Full,
            exp: r.exp,
            act: r.act,
            diff: r.diff,
            matched_index: r.matched_index,
            match_count: r.match_count,
        }
    }
}

/// Failing record echoing both sides. Status defaults to `Fail`; callers
/// override with `.status(..)` (e.g. `ObjectMismatch`).
pub fn failed_result(
    detail: Detail,
    expected: Option<&Value>,
    actual: Option<&Value>,
) -> ResultBuilder {
    ResultBuilder::with_detail(MatchStatus::Fail, detail)
        .expected(expected)
        .actual(actual)
}
