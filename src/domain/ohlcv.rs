//! OHLCV bar representation.

use chrono::NaiveDateTime;

/// One price observation at a sampling frequency. Series are ordered by `time` ascending.
#[derive(Debug, Clone)]
pub struct OhlcvBar {
    pub symbol: String,
    pub frequency: String,
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
