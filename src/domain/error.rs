//! Domain error types.

use std::fmt;

/// Which half of a [`Distribution`](crate::domain::distribution::Distribution) a
/// value ranks against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketSide {
    Positive,
    Negative,
}

impl fmt::Display for BucketSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketSide::Positive => write!(f, "positive"),
            BucketSide::Negative => write!(f, "negative"),
        }
    }
}

/// Top-level error type for biasrank.
#[derive(Debug, thiserror::Error)]
pub enum BiasError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol} at {frequency}")]
    NoData { symbol: String, frequency: String },

    #[error(
        "insufficient data for {symbol} at {frequency}: have {bars} bars, need {minimum}"
    )]
    InsufficientData {
        symbol: String,
        frequency: String,
        bars: usize,
        minimum: usize,
    },

    #[error("{side} bias bucket is empty, cannot rank")]
    EmptyBucket { side: BucketSide },

    #[error("bias value {value} is not finite")]
    NonFiniteBias { value: f64 },

    #[error("cache error at {path}: {reason}")]
    Cache { path: String, reason: String },

    #[error("chart error: {reason}")]
    Chart { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BiasError> for std::process::ExitCode {
    fn from(err: &BiasError) -> Self {
        let code: u8 = match err {
            BiasError::Io(_) => 1,
            BiasError::ConfigParse { .. }
            | BiasError::ConfigMissing { .. }
            | BiasError::ConfigInvalid { .. } => 2,
            BiasError::DataSource { .. } => 3,
            BiasError::Cache { .. } | BiasError::Chart { .. } => 4,
            BiasError::NoData { .. }
            | BiasError::InsufficientData { .. }
            | BiasError::EmptyBucket { .. }
            | BiasError::NonFiniteBias { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
