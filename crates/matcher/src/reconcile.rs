use std::cmp::Reverse;

use serde_json::Value;

use crate::config::{FieldPath, MatchConfig};
use crate::engine::compare_node;
use crate::model::{ComparisonResult, CrossResult, Detail, DiffKey, MatchScore, MatchStatus};
use crate::result::ResultBuilder;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Compare two sequences ignoring element order.
///
/// Every expected element is scored against every actual element, then
/// assigned greedily so that no actual element serves two expected ones.
/// Unconsumed actual elements are never reported.
///
/// This is a heuristic, not an optimal bipartite matching: when several
/// actual elements pass for one expected element, the one at the same
/// position wins, otherwise the first free one is taken. That can leave a
/// later expected element without a partner even though another assignment
/// would have matched everything. Comparing a sequence with itself always
/// passes.
pub fn compare_array(
    config: &MatchConfig,
    path: &FieldPath,
    expected: Option<&[Value]>,
    actual: Option<&[Value]>,
    detail: Detail,
) -> ComparisonResult {
    let (exp, act) = match (expected, actual) {
        (None, None) => return ResultBuilder::pass().build(),
        (Some(exp), Some(act)) => (exp, act),
        _ => {
            return ResultBuilder::with_detail(MatchStatus::Fail, detail)
                .expected_array(expected)
                .actual_array(actual)
                .build()
        }
    };
    if exp.is_empty() && act.is_empty() {
        return ResultBuilder::pass().match_count(0).build();
    }

    let cross: Vec<Vec<CrossResult>> = exp
        .iter()
        .enumerate()
        .map(|(i, element)| score_candidates(config, path, i, element, act))
        .collect();

    let assignment = assign(exp.len(), act.len(), cross);
    log::debug!(
        "reconciled {} expected against {} actual: {} matched, {} nearest, {} not found",
        exp.len(),
        act.len(),
        assignment.direct,
        exp.len() - assignment.direct - assignment.not_found,
        assignment.not_found
    );

    if assignment.direct == exp.len() {
        return ResultBuilder::pass().match_count(assignment.direct).build();
    }
    if !detail.echoes() {
        return ResultBuilder::with_detail(MatchStatus::Fail, detail)
            .match_count(assignment.direct)
            .build();
    }

    let diff = assignment
        .slots
        .iter()
        .enumerate()
        .map(|(i, slot)| (DiffKey::Index(i), entry(config, path, &exp[i], act, *slot)))
        .collect();
    ResultBuilder::new(MatchStatus::Fail)
        .expected_array(Some(exp))
        .actual_array(Some(act))
        .diff(diff)
        .match_count(assignment.direct)
        .build()
}

/// Full diff entry for one expected element: the comparison against its
/// assigned actual element, or `NotExists` when nothing was assigned.
fn entry(
    config: &MatchConfig,
    path: &FieldPath,
    element: &Value,
    actual: &[Value],
    slot: Option<usize>,
) -> ComparisonResult {
    match slot.and_then(|j| actual.get(j).map(|candidate| (j, candidate))) {
        Some((j, candidate)) => {
            let result = compare_node(config, path, Some(element), Some(candidate), Detail::Full);
            ResultBuilder::from(result).matched_index(Some(j)).build()
        }
        None => ResultBuilder::new(MatchStatus::NotExists)
            .expected(Some(element))
            .build(),
    }
}

// ---------------------------------------------------------------------------
// Cross scoring
// ---------------------------------------------------------------------------

/// Score one expected element against every actual element.
///
/// Candidates go through the dispatcher at [`Detail::Score`], so scalars
/// compare strictly, mappings score by passing field count and nested
/// sequences by the number of inner elements they truly matched. Only the
/// verdict is kept.
fn score_candidates(
    config: &MatchConfig,
    path: &FieldPath,
    element_index: usize,
    element: &Value,
    actual: &[Value],
) -> Vec<CrossResult> {
    if actual.is_empty() {
        return vec![CrossResult {
            status: MatchStatus::Fail,
            element_index,
            matching_index: None,
            score: MatchScore::None,
        }];
    }

    actual
        .iter()
        .enumerate()
        .map(|(j, candidate)| {
            let result = compare_node(config, path, Some(element), Some(candidate), Detail::Score);
            CrossResult {
                status: result.status,
                element_index,
                matching_index: Some(j),
                score: MatchScore::of(&result),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// |expected| × |actual| grid of consumed cells. Consuming an actual index
/// blocks its whole column, so each actual element is assigned at most once.
#[derive(Debug, Clone)]
pub(crate) struct AssignmentMatrix {
    rows: usize,
    cols: usize,
    blocked: Vec<bool>,
}

impl AssignmentMatrix {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            blocked: vec![false; rows * cols],
        }
    }

    pub(crate) fn consume(&mut self, col: usize) {
        for row in 0..self.rows {
            self.blocked[row * self.cols + col] = true;
        }
    }

    pub(crate) fn is_available(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && !self.blocked[row * self.cols + col]
    }
}

/// Actual index chosen for each expected index (`None`: not found).
#[derive(Debug)]
struct Assignment {
    slots: Vec<Option<usize>>,
    direct: usize,
    not_found: usize,
}

fn assign(rows: usize, cols: usize, cross: Vec<Vec<CrossResult>>) -> Assignment {
    let mut matrix = AssignmentMatrix::new(rows, cols);
    let mut slots: Vec<Option<usize>> = vec![None; rows];
    let mut deferred: Vec<Vec<CrossResult>> = Vec::new();
    let mut direct = 0;

    // Direct: the passing candidate at the same position if it is free, else
    // the first passing candidate whose actual element is still free.
    for row in cross {
        let passing = |c: &CrossResult| c.status.is_pass() && is_free(&matrix, c);
        let hit = row
            .iter()
            .find(|&c| c.matching_index == Some(c.element_index) && passing(c))
            .or_else(|| row.iter().find(|&c| passing(c)))
            .copied();
        match hit {
            Some(chosen) => {
                if let Some(j) = chosen.matching_index {
                    matrix.consume(j);
                }
                log::trace!(
                    "expected[{}] matched actual[{:?}]",
                    chosen.element_index,
                    chosen.matching_index
                );
                slots[chosen.element_index] = chosen.matching_index;
                direct += 1;
            }
            None => deferred.push(row),
        }
    }

    // Deferred: weakest best-candidate first; stable sort keeps index order on ties.
    deferred.sort_by_key(|row| best_score(row));

    let mut not_found = 0;
    for row in deferred {
        let Some(element_index) = row.first().map(|c| c.element_index) else {
            continue;
        };
        match pick_deferred(&row, &matrix) {
            Some(chosen) => {
                if let Some(j) = chosen.matching_index {
                    matrix.consume(j);
                }
                log::trace!(
                    "expected[{element_index}] nearest actual[{:?}] ({})",
                    chosen.matching_index,
                    chosen.status
                );
                slots[element_index] = chosen.matching_index;
            }
            None => not_found += 1,
        }
    }

    Assignment {
        slots,
        direct,
        not_found,
    }
}

fn is_free(matrix: &AssignmentMatrix, c: &CrossResult) -> bool {
    c.matching_index
        .is_some_and(|j| matrix.is_available(c.element_index, j))
}

fn best_score(row: &[CrossResult]) -> MatchScore {
    row.iter().map(|c| c.score).max().unwrap_or(MatchScore::None)
}

/// `NotExists` candidates (business key mismatch) are never assigned.
fn candidate_rank(status: MatchStatus) -> Option<u8> {
    match status {
        MatchStatus::Pass => Some(3),
        MatchStatus::KeyMatched => Some(2),
        MatchStatus::Fail => Some(1),
        MatchStatus::ObjectMismatch => Some(0),
        MatchStatus::NotExists => None,
    }
}

/// First free candidate in index order among the best-ranked statuses.
fn pick_deferred(row: &[CrossResult], matrix: &AssignmentMatrix) -> Option<CrossResult> {
    row.iter()
        .filter(|c| is_free(matrix, c))
        .filter_map(|c| {
            let rank = candidate_rank(c.status)?;
            Some((rank, Reverse(c.matching_index), *c))
        })
        .max_by_key(|(rank, index, _)| (*rank, *index))
        .map(|(_, _, c)| c)
}
