use serde::Serialize;
use serde_json::Value;

use crate::config::{FieldPath, MatchConfig};
use crate::error::MatchError;
use crate::model::{ComparisonResult, Detail, MatchStatus, Side};
use crate::object::compare_object;
use crate::reconcile::compare_array;
use crate::result::{failed_result, ResultBuilder};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Compare with the default config: no ignores, no business keys.
pub fn compare(expected: &Value, actual: &Value) -> Result<ComparisonResult, MatchError> {
    compare_with(expected, actual, &MatchConfig::default())
}

/// Validate `config` and both inputs, then compare.
pub fn compare_with(
    expected: &Value,
    actual: &Value,
    config: &MatchConfig,
) -> Result<ComparisonResult, MatchError> {
    config.validate()?;
    run(config, expected, actual)
}

/// Convert two serializable values to JSON, then compare them.
///
/// Inputs that have no JSON representation (maps with non-string keys,
/// non-finite floats) are rejected as `InvalidInput` before any comparison.
pub fn compare_serialize<E, A>(
    expected: &E,
    actual: &A,
    config: &MatchConfig,
) -> Result<ComparisonResult, MatchError>
where
    E: Serialize + ?Sized,
    A: Serialize + ?Sized,
{
    let expected = serde_json::to_value(expected)
        .map_err(|e| MatchError::InvalidInput(format!("{}: {e}", Side::Expected)))?;
    let actual = serde_json::to_value(actual)
        .map_err(|e| MatchError::InvalidInput(format!("{}: {e}", Side::Actual)))?;
    compare_with(&expected, &actual, config)
}

/// A validated config, reusable across many comparisons.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn compare(&self, expected: &Value, actual: &Value) -> Result<ComparisonResult, MatchError> {
        run(&self.config, expected, actual)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            config: MatchConfig::default(),
        }
    }
}

fn run(config: &MatchConfig, expected: &Value, actual: &Value) -> Result<ComparisonResult, MatchError> {
    check_depth(expected, Side::Expected, config.max_depth)?;
    check_depth(actual, Side::Actual, config.max_depth)?;

    let result = compare_node(config, &FieldPath::root(), Some(expected), Some(actual), Detail::Full);
    log::debug!("comparison finished: status={}", result.status);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Only `null` and a missing key are absent. `false`, `0`, `""` are values.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Classify both sides and route to the scalar, object, or array comparison.
/// `None` means the side is missing (e.g. a key absent from actual).
pub(crate) fn compare_node(
    config: &MatchConfig,
    path: &FieldPath,
    expected: Option<&Value>,
    actual: Option<&Value>,
    detail: Detail,
) -> ComparisonResult {
    let (exp, act) = match (present(expected), present(actual)) {
        (None, None) => return ResultBuilder::pass().build(),
        (Some(exp), Some(act)) => (exp, act),
        _ => return failed_result(detail, expected, actual).build(),
    };

    match (exp, act) {
        (Value::Array(e), Value::Array(a)) => {
            compare_array(config, path, Some(e.as_slice()), Some(a.as_slice()), detail)
        }
        (Value::Object(e), Value::Object(a)) => {
            compare_object(config, path, Some(e), Some(a), detail)
        }
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            failed_result(detail, expected, actual)
                .status(MatchStatus::ObjectMismatch)
                .build()
        }
        _ => compare_scalar(exp, act, detail),
    }
}

/// Strict equality, no coercion between kinds or number representations.
fn compare_scalar(expected: &Value, actual: &Value, detail: Detail) -> ComparisonResult {
    if expected == actual {
        ResultBuilder::pass().build()
    } else {
        failed_result(detail, Some(expected), Some(actual)).build()
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Reject values nesting deeper than `limit` without recursing.
fn check_depth(value: &Value, side: Side, limit: usize) -> Result<(), MatchError> {
    let mut stack: Vec<(&Value, usize)> = vec![(value, 0)];
    while let Some((v, depth)) = stack.pop() {
        if depth > limit {
            log::warn!("{side} value rejected: nesting exceeds max_depth={limit}");
            return Err(MatchError::DepthExceeded { side, limit });
        }
        match v {
            Value::Array(items) => stack.extend(items.iter().map(|c| (c, depth + 1))),
            Value::Object(map) => stack.extend(map.values().map(|c| (c, depth + 1))),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmp(expected: Value, actual: Value) -> ComparisonResult {
        compare(&expected, &actual).unwrap()
    }

    #[test]
    fn both_null_pass() {
        let r = cmp(Value::Null, Value::Null);
        assert_eq!(r.status, MatchStatus::Pass);
        assert!(r.diff.is_empty());
    }

    #[test]
    fn one_side_null_fails() {
        let r = cmp(Value::Null, json!(23));
        assert_eq!(r.status, MatchStatus::Fail);
        assert_eq!(r.exp, Some(Value::Null));
        assert_eq!(r.act, Some(json!(23)));

        let r = cmp(json!({"a": 1}), Value::Null);
        assert_eq!(r.status, MatchStatus::Fail);
    }

    #[test]
    fn falsy_scalars_are_present() {
        assert!(cmp(json!(0), json!(0)).is_pass());
        assert!(cmp(json!(""), json!("")).is_pass());
        assert!(cmp(json!(false), json!(false)).is_pass());
        assert_eq!(cmp(json!(false), Value::Null).status, MatchStatus::Fail);
        assert_eq!(cmp(json!(0), json!(false)).status, MatchStatus::Fail);
    }

    #[test]
    fn scalar_mismatch_echoes_values() {
        let r = cmp(json!("Raghav"), json!("Chandra"));
        assert_eq!(r.status, MatchStatus::Fail);
        assert_eq!(r.exp, Some(json!("Raghav")));
        assert_eq!(r.act, Some(json!("Chandra")));
    }

    #[test]
    fn no_coercion_between_kinds() {
        assert_eq!(cmp(json!(1), json!("1")).status, MatchStatus::Fail);
        assert_eq!(cmp(json!(1), json!(1.0)).status, MatchStatus::Fail);
        assert_eq!(cmp(json!(10), json!(11.0)).status, MatchStatus::Fail);
    }

    #[test]
    fn mapping_vs_sequence_is_object_mismatch() {
        let r = cmp(json!({"a": 1}), json!([1]));
        assert_eq!(r.status, MatchStatus::ObjectMismatch);
        assert_eq!(r.exp, Some(json!({"a": 1})));
        assert_eq!(r.act, Some(json!([1])));

        assert_eq!(cmp(json!([]), json!({})).status, MatchStatus::ObjectMismatch);
    }

    #[test]
    fn scalar_vs_composite_is_object_mismatch() {
        assert_eq!(cmp(json!(1), json!([1])).status, MatchStatus::ObjectMismatch);
        assert_eq!(cmp(json!({"a": 1}), json!("a")).status, MatchStatus::ObjectMismatch);
    }

    #[test]
    fn depth_limit_rejects_eagerly() {
        let config = MatchConfig::default().with_max_depth(2);
        let shallow = json!({"a": {"b": 1}});
        let deep = json!({"a": {"b": {"c": 1}}});

        assert!(compare_with(&shallow, &shallow, &config).unwrap().is_pass());

        let err = compare_with(&shallow, &deep, &config).unwrap_err();
        assert!(matches!(
            err,
            MatchError::DepthExceeded { side: Side::Actual, limit: 2 }
        ));
        assert_eq!(err.to_string(), "actual value nests deeper than max_depth=2");
    }

    #[test]
    fn invalid_config_rejected() {
        let config = MatchConfig::default().with_max_depth(0);
        assert!(compare_with(&json!(1), &json!(1), &config).is_err());
        assert!(Matcher::new(config).is_err());

        let unbounded = MatchConfig::default().with_max_depth(10_000_000);
        let err = compare_with(&json!(1), &json!(1), &unbounded).unwrap_err();
        assert!(matches!(err, MatchError::ConfigValidation(_)), "{err}");
        assert!(Matcher::new(unbounded).is_err());
    }

    #[test]
    fn score_detail_builds_no_echo() {
        let config = MatchConfig::default();
        let root = FieldPath::root();
        let exp = json!({"a": {"b": [1, 2]}, "c": "x"});
        let act = json!({"a": {"b": [2]}, "c": "y"});

        let full = compare_node(&config, &root, Some(&exp), Some(&act), Detail::Full);
        let score = compare_node(&config, &root, Some(&exp), Some(&act), Detail::Score);
        assert_eq!(full.status, score.status);
        assert_eq!(full.match_count, score.match_count);
        assert!(full.exp.is_some() && !full.diff.is_empty());
        assert_eq!(score.exp, None);
        assert_eq!(score.act, None);
        assert!(score.diff.is_empty());

        let om = compare_node(&config, &root, Some(&exp), Some(&json!([1])), Detail::Score);
        assert_eq!(om.status, MatchStatus::ObjectMismatch);
        assert_eq!(om.exp, None);
    }

    #[test]
    fn serialize_inputs() {
        #[derive(Serialize)]
        struct Person {
            name: &'static str,
            tags: Vec<&'static str>,
        }
        let exp = Person { name: "Foo", tags: vec!["a", "b"] };
        let act = Person { name: "Foo", tags: vec!["b", "a"] };
        let r = compare_serialize(&exp, &act, &MatchConfig::default()).unwrap();
        assert!(r.is_pass());
    }

    #[test]
    fn serialize_rejects_non_string_map_keys() {
        let mut exp = std::collections::BTreeMap::new();
        exp.insert(vec![1u8], 1);
        let err = compare_serialize(&exp, &json!({}), &MatchConfig::default()).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput(_)), "{err}");
    }

    #[test]
    fn matcher_is_reusable() {
        let matcher = Matcher::default();
        let a = json!({"a": [1, 2, 3]});
        let b = json!({"a": [3, 1, 2], "extra": true});
        let first = matcher.compare(&a, &b).unwrap();
        let second = matcher.compare(&a, &b).unwrap();
        assert!(first.is_pass());
        assert_eq!(first, second);
    }
}
