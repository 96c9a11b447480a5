use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (ignored key field, empty key name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// IO error (config file read).
    #[error("IO error: {0}")]
    Io(String),
    /// Input nests deeper than the configured `max_depth`.
    #[error("{side} value nests deeper than max_depth={limit}")]
    DepthExceeded { side: Side, limit: usize },
    /// Input cannot be represented as a JSON value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for MatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
