//! Historical bias distribution, split by sign, and the key it is cached under.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::indicator::bias::compute_bias;
use crate::domain::ohlcv::OhlcvBar;

/// Historical bias sample. `positive` holds values `>= 0`, `negative` values `< 0`,
/// each in the order they occurred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(rename = "bias_p")]
    pub positive: Vec<f64>,
    #[serde(rename = "bias_n")]
    pub negative: Vec<f64>,
}

impl Distribution {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let (positive, negative) = values.into_iter().partition(|&v| v >= 0.0);
        Self { positive, negative }
    }

    /// Bias of `bars` partitioned into sign buckets. Warmup rows are not included.
    pub fn build(bars: &[OhlcvBar], short_window: usize, long_window: usize) -> Self {
        Self::from_values(compute_bias(bars, short_window, long_window).values())
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Identity of a cached distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub frequency: String,
    pub short_window: usize,
    pub long_window: usize,
}

impl CacheKey {
    pub fn file_name(&self) -> String {
        format!(
            "bias{}_{}_{}_{}.json",
            self.symbol, self.frequency, self.short_window, self.long_window
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} BIAS({},{})",
            self.symbol, self.frequency, self.short_window, self.long_window
        )
    }
}

/// Outcome of reading a cached distribution.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Distribution),
    Missing,
    Corrupt { reason: String },
}
