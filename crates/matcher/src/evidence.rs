use std::collections::BTreeMap;

use crate::model::{ComparisonResult, MatchStatus, MatchSummary};

/// Count leaf statuses across a result tree.
///
/// A leaf is any node without diff entries: a scalar verdict, a missing
/// element, a shape mismatch, or a composite that passed as a whole.
pub fn summarize(result: &ComparisonResult) -> MatchSummary {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut passed = 0;
    let mut failed = 0;
    let mut object_mismatches = 0;
    let mut not_exists = 0;
    let mut key_matched = 0;
    let mut total_entries = 0;

    let mut stack = vec![result];
    while let Some(node) = stack.pop() {
        if !node.diff.is_empty() {
            stack.extend(node.diff.values());
            continue;
        }
        total_entries += 1;
        *status_counts.entry(node.status.to_string()).or_insert(0) += 1;

        match node.status {
            MatchStatus::Pass => passed += 1,
            MatchStatus::Fail => failed += 1,
            MatchStatus::ObjectMismatch => object_mismatches += 1,
            MatchStatus::NotExists => not_exists += 1,
            MatchStatus::KeyMatched => key_matched += 1,
        }
    }

    MatchSummary {
        status: result.status,
        total_entries,
        passed,
        failed,
        object_mismatches,
        not_exists,
        key_matched,
        status_counts,
    }
}

/// JSON Pointer (RFC 6901) of every failing leaf, in diff order.
/// A failing root without diff entries yields `""`.
pub fn failing_paths(result: &ComparisonResult) -> Vec<String> {
    let mut paths = Vec::new();
    collect_failing(result, String::new(), &mut paths);
    paths
}

fn collect_failing(node: &ComparisonResult, pointer: String, out: &mut Vec<String>) {
    if node.diff.is_empty() {
        if !node.is_pass() {
            out.push(pointer);
        }
        return;
    }
    for (key, child) in &node.diff {
        let segment = key.to_string().replace('~', "~0").replace('/', "~1");
        collect_failing(child, format!("{pointer}/{segment}"), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compare;
    use serde_json::json;

    #[test]
    fn passing_tree() {
        let r = compare(&json!({"a": [1, 2]}), &json!({"a": [2, 1]})).unwrap();
        let summary = summarize(&r);
        assert_eq!(summary.status, MatchStatus::Pass);
        assert_eq!(summary.total_entries, 1);
        assert_eq!(summary.passed, 1);
        assert!(failing_paths(&r).is_empty());
    }

    #[test]
    fn summary_counts() {
        let r = compare(
            &json!({"name": "x", "tags": ["a", "b", "c"], "addr": {"city": "P"}, "k": {"v": 1}}),
            &json!({"name": "y", "tags": ["a"], "addr": {"city": "P"}, "k": [1]}),
        )
        .unwrap();
        let summary = summarize(&r);
        assert_eq!(summary.status, MatchStatus::Fail);
        // name: fail; tags: 0 pass, 1 and 2 not exists; k: object mismatch
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.not_exists, 2);
        assert_eq!(summary.object_mismatches, 1);
        assert_eq!(summary.total_entries, 5);
        assert_eq!(summary.status_counts["not_exists"], 2);
    }

    #[test]
    fn paths_are_json_pointers() {
        let r = compare(
            &json!({"a/b": 1, "items": [{"sku": "x", "qty": 1}], "t~": true}),
            &json!({"a/b": 2, "items": [{"sku": "x", "qty": 2}], "t~": false}),
        )
        .unwrap();
        assert_eq!(
            failing_paths(&r),
            vec!["/a~1b", "/items/0/qty", "/t~0"]
        );
    }

    #[test]
    fn failing_root_scalar() {
        let r = compare(&json!(1), &json!(2)).unwrap();
        assert_eq!(failing_paths(&r), vec![""]);
    }
}
