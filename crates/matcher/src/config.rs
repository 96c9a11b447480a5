use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// serde_json's own parser stops at 128 levels, so default to the same bound.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Largest accepted `max_depth`. Comparison recurses once per level.
pub const MAX_DEPTH_LIMIT: usize = 1024;

// ---------------------------------------------------------------------------
// Field paths
// ---------------------------------------------------------------------------

/// Dotted path of mapping field names from the root value.
///
/// Sequences are transparent: `orders.lines.sku` addresses the `sku` field of
/// every line of every order, whatever the array positions are. The empty
/// string is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn parse(input: &str) -> Result<Self, MatchError> {
        if input.is_empty() {
            return Ok(Self::root());
        }
        let segments: Vec<String> = input.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(MatchError::ConfigValidation(format!(
                "field path '{input}' has an empty segment"
            )));
        }
        Ok(Self(segments))
    }

    pub fn child(&self, field: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(field.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl std::str::FromStr for FieldPath {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = MatchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(p: FieldPath) -> Self {
        p.to_string()
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Comparison options.
///
/// ```toml
/// ignore = ["add.landmark", "name"]
/// max_depth = 64
///
/// [keys]
/// "" = ["id"]
/// "orders.lines" = ["sku"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Fields skipped entirely: not compared, not reported, not scored.
    #[serde(default)]
    pub ignore: Vec<FieldPath>,
    /// Business key fields of the mappings found at each path.
    #[serde(default)]
    pub keys: BTreeMap<FieldPath, Vec<String>>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            keys: BTreeMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MatchConfig {
    pub fn with_ignore(mut self, path: FieldPath) -> Self {
        self.ignore.push(path);
        self
    }

    pub fn with_keys<I, S>(mut self, path: FieldPath, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys
            .entry(path)
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_ignored(&self, path: &FieldPath) -> bool {
        self.ignore.iter().any(|p| p == path)
    }

    pub fn key_fields(&self, path: &FieldPath) -> &[String] {
        self.keys.get(path).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, MatchError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| MatchError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(MatchError::ConfigValidation(format!(
                "max_depth must be between 1 and {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth
            )));
        }

        if self.ignore.iter().any(FieldPath::is_root) {
            return Err(MatchError::ConfigValidation(
                "the root value cannot be ignored".into(),
            ));
        }

        for (path, fields) in &self.keys {
            for field in fields {
                if field.is_empty() || field.contains('.') {
                    return Err(MatchError::ConfigValidation(format!(
                        "keys '{path}': invalid key field name '{field}'"
                    )));
                }

                // An ignored key would make every keyed mapping look like a match.
                let key_path = path.child(field);
                if let Some(ignored) = self.ignore.iter().find(|p| key_path.starts_with(p)) {
                    return Err(MatchError::ConfigValidation(format!(
                        "key field '{key_path}' is ignored by '{ignored}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
ignore = ["add.landmark", "name"]
max_depth = 64

[keys]
"" = ["id"]
"orders.lines" = ["sku", "warehouse"]
"#;

    #[test]
    fn parse_full() {
        let config = MatchConfig::from_toml(FULL).unwrap();
        assert_eq!(config.ignore.len(), 2);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.key_fields(&FieldPath::root()), ["id"]);

        let lines: FieldPath = "orders.lines".parse().unwrap();
        assert_eq!(config.key_fields(&lines), ["sku", "warehouse"]);
        assert!(config.is_ignored(&"add.landmark".parse().unwrap()));
        assert!(!config.is_ignored(&"add".parse().unwrap()));
    }

    #[test]
    fn empty_input_is_default() {
        let config = MatchConfig::from_toml("").unwrap();
        assert_eq!(config, MatchConfig::default());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.key_fields(&FieldPath::root()).is_empty());
    }

    #[test]
    fn field_path_parsing() {
        assert!(FieldPath::parse("").unwrap().is_root());
        let p = FieldPath::parse("a.b.c").unwrap();
        assert_eq!(p.segments(), ["a", "b", "c"]);
        assert_eq!(p.to_string(), "a.b.c");
        assert!(p.starts_with(&FieldPath::parse("a.b").unwrap()));
        assert!(!p.starts_with(&FieldPath::parse("a.c").unwrap()));
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse(".a").is_err());
    }

    #[test]
    fn reject_unknown_field() {
        let err = MatchConfig::from_toml("ignored = [\"a\"]").unwrap_err();
        assert!(matches!(err, MatchError::ConfigParse(_)));
    }

    #[test]
    fn reject_bad_path_in_toml() {
        let err = MatchConfig::from_toml("ignore = [\"a..b\"]").unwrap_err();
        assert!(err.to_string().contains("empty segment"), "{err}");
    }

    #[test]
    fn reject_zero_depth() {
        let err = MatchConfig::from_toml("max_depth = 0").unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn reject_depth_above_limit() {
        let err = MatchConfig::from_toml("max_depth = 10000000").unwrap_err();
        assert!(matches!(err, MatchError::ConfigValidation(_)), "{err}");
        assert!(err.to_string().contains("1024"), "{err}");

        let at_limit = MatchConfig::default().with_max_depth(MAX_DEPTH_LIMIT);
        assert!(at_limit.validate().is_ok());
        assert!(at_limit.with_max_depth(MAX_DEPTH_LIMIT + 1).validate().is_err());
    }

    #[test]
    fn reject_ignored_key_field() {
        let input = r#"
ignore = ["firstName.id"]

[keys]
"firstName" = ["id"]
"#;
        let err = MatchConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'firstName.id'"), "{err}");
    }

    #[test]
    fn reject_key_under_ignored_ancestor() {
        let config = MatchConfig::default()
            .with_ignore("orders".parse().unwrap())
            .with_keys("orders.lines".parse().unwrap(), ["sku"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ignored by 'orders'"), "{err}");
    }

    #[test]
    fn reject_dotted_key_name() {
        let config = MatchConfig::default().with_keys(FieldPath::root(), ["a.b"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_root_ignore() {
        let config = MatchConfig::default().with_ignore(FieldPath::root());
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = MatchConfig::from_path(&path).unwrap();
        assert_eq!(config.max_depth, 64);

        let missing = MatchConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, MatchError::Io(_)));
    }
}
