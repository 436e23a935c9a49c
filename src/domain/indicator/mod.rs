//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values

pub mod bias;
pub mod sma;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub time: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Bias { short: usize, long: usize },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, or `None` when the point is still in warmup.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Bias { short, long } => write!(f, "BIAS({},{})", short, long),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(valid: bool, value: f64) -> IndicatorPoint {
        IndicatorPoint {
            time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            valid,
            value,
        }
    }

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_bias() {
        let bias = IndicatorType::Bias { short: 3, long: 15 };
        assert_eq!(bias.to_string(), "BIAS(3,15)");
    }

    #[test]
    fn value_at_skips_warmup() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![point(false, 0.0), point(true, 1.5)],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(1.5));
        assert_eq!(series.value_at(2), None);
    }
}
