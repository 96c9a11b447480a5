use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::{FieldPath, MatchConfig};
use crate::engine::compare_node;
use crate::model::{ComparisonResult, Detail, DiffKey, MatchStatus};
use crate::result::ResultBuilder;

/// Compare two mappings field by field over the expected key set.
///
/// Fields only present in actual are never inspected. A field missing from
/// actual counts as absent, so it passes only when expected holds `null`
/// there too. Ignored fields are skipped without being counted.
///
/// With business keys configured at `path`, key fields are checked first: any
/// key mismatch makes the whole mapping `NotExists`, and a mapping whose keys
/// match but whose other fields differ is `KeyMatched`.
pub fn compare_object(
    config: &MatchConfig,
    path: &FieldPath,
    expected: Option<&Map<String, Value>>,
    actual: Option<&Map<String, Value>>,
    detail: Detail,
) -> ComparisonResult {
    let (exp, act) = match (expected, actual) {
        (None, None) => return ResultBuilder::pass().build(),
        (Some(exp), Some(act)) => (exp, act),
        _ => return failed(detail, expected, actual, MatchStatus::Fail, BTreeMap::new(), 0),
    };
    if exp.is_empty() && act.is_empty() {
        return ResultBuilder::pass().match_count(0).build();
    }

    let key_fields = config.key_fields(path);
    let mut diff = BTreeMap::new();
    let mut match_count = 0;

    for field in key_fields {
        let child_path = path.child(field);
        let child = compare_node(config, &child_path, exp.get(field), act.get(field), detail);
        if child.is_pass() {
            match_count += 1;
        } else {
            diff.insert(DiffKey::Field(field.clone()), child);
        }
    }
    if !diff.is_empty() {
        log::trace!("'{path}': business key mismatch on {} field(s)", diff.len());
        return failed(detail, expected, actual, MatchStatus::NotExists, diff, match_count);
    }

    for (field, exp_val) in exp {
        if key_fields.contains(field) {
            continue;
        }
        let child_path = path.child(field);
        if config.is_ignored(&child_path) {
            continue;
        }

        let child = compare_node(config, &child_path, Some(exp_val), act.get(field), detail);
        if child.is_pass() {
            match_count += 1;
        } else {
            diff.insert(DiffKey::Field(field.clone()), child);
        }
    }

    if diff.is_empty() {
        return ResultBuilder::pass().match_count(match_count).build();
    }

    let status = if key_fields.is_empty() {
        MatchStatus::Fail
    } else {
        MatchStatus::KeyMatched
    };
    failed(detail, expected, actual, status, diff, match_count)
}

fn failed(
    detail: Detail,
    expected: Option<&Map<String, Value>>,
    actual: Option<&Map<String, Value>>,
    status: MatchStatus,
    diff: BTreeMap<DiffKey, ComparisonResult>,
    match_count: usize,
) -> ComparisonResult {
    ResultBuilder::with_detail(status, detail)
        .expected_object(expected)
        .actual_object(actual)
        .diff(diff)
        .match_count(match_count)
        .build()
}
