//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid. A window containing a non-finite
//! close is invalid too.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let warmup = period - 1;
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mean = if i >= warmup {
                let window = &bars[i + 1 - period..=i];
                window.iter().map(|b| b.close).sum::<f64>() / period as f64
            } else {
                f64::NAN
            };
            let valid = mean.is_finite();
            let value = if valid { mean } else { 0.0 };
            IndicatorPoint {
                time: bar.time,
                valid,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
