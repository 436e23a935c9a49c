//! Moving-average bias indicator.
//!
//! BIAS(q,s)[i] = SMA(q)[i] - SMA(s)[i]
//! Warmup: first (max(q,s)-1) bars are invalid, as is any bar whose
//! difference is not finite.

use chrono::NaiveDateTime;

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rank::percentile_rank;

#[derive(Debug, Clone, PartialEq)]
pub struct BiasPoint {
    pub time: NaiveDateTime,
    pub close: f64,
    pub bias: f64,
}

/// Bias values for every bar where both averages are defined, in bar order.
#[derive(Debug, Clone)]
pub struct BiasSeries {
    pub short_window: usize,
    pub long_window: usize,
    pub points: Vec<BiasPoint>,
}

impl BiasSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.bias).collect()
    }

    pub fn last(&self) -> Option<&BiasPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One row of the non-dropping bias table. `None` marks columns still in warmup.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasRankRow {
    pub time: NaiveDateTime,
    pub close: f64,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub bias: Option<f64>,
    pub rank: Option<f64>,
}

pub fn calculate_bias(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bias {
        short: short_window,
        long: long_window,
    };
    if short_window == 0 || long_window == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let short = calculate_sma(bars, short_window);
    let long = calculate_sma(bars, long_window);

    let values = short
        .values
        .iter()
        .zip(long.values.iter())
        .map(|(q, s)| {
            let diff = q.value - s.value;
            let valid = q.valid && s.valid && diff.is_finite();
            IndicatorPoint {
                time: q.time,
                valid,
                value: if valid { diff } else { 0.0 },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Bias over `bars`, dropping leading bars where either window is not yet full.
pub fn compute_bias(bars: &[OhlcvBar], short_window: usize, long_window: usize) -> BiasSeries {
    let series = calculate_bias(bars, short_window, long_window);
    let points = series
        .values
        .iter()
        .zip(bars.iter())
        .filter(|(p, _)| p.valid)
        .map(|(p, bar)| BiasPoint {
            time: bar.time,
            close: bar.close,
            bias: p.value,
        })
        .collect();

    BiasSeries {
        short_window,
        long_window,
        points,
    }
}

/// Bias table that keeps every input row, ranked against its own defined values.
pub fn bias_with_rank(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> Vec<BiasRankRow> {
    let short = calculate_sma(bars, short_window);
    let long = calculate_sma(bars, long_window);
    let bias = calculate_bias(bars, short_window, long_window);

    let defined: Vec<f64> = bias
        .values
        .iter()
        .filter(|p| p.valid)
        .map(|p| p.value)
        .collect();

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let b = bias.value_at(i);
            BiasRankRow {
                time: bar.time,
                close: bar.close,
                short_ma: short.value_at(i),
                long_ma: long.value_at(i),
                bias: b,
                rank: b.and_then(|v| percentile_rank(&defined, v)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                symbol: "TEST".into(),
                frequency: "1m".into(),
                time: start + chrono::Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn bias_drops_warmup_rows() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let series = compute_bias(&bars, 2, 4);

        // 6 - 4 + 1
        assert_eq!(series.len(), 3);
        assert_eq!(series.points[0].time, bars[3].time);
        assert_eq!(series.points[0].close, 4.0);
    }

    #[test]
    fn bias_values_on_linear_trend() {
        // SMA(2) = c - 0.5, SMA(4) = c - 1.5 on a unit-step trend, so bias is constant 1.0
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let series = compute_bias(&bars, 2, 4);

        for v in series.values() {
            assert!((v - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn bias_negative_on_downtrend() {
        let bars = make_bars(&[10.0, 9.0, 8.0, 7.0, 6.0]);
        let series = compute_bias(&bars, 1, 3);

        // last: 6 - (8+7+6)/3 = -1
        assert!((series.last().unwrap().bias + 1.0).abs() < 1e-10);
    }

    #[test]
    fn bias_short_series_is_empty() {
        let bars = make_bars(&[1.0, 2.0]);
        assert!(compute_bias(&bars, 3, 15).is_empty());
        assert!(compute_bias(&[], 3, 15).is_empty());
    }

    #[test]
    fn bias_zero_window_is_empty() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        assert!(compute_bias(&bars, 0, 2).is_empty());
        assert!(calculate_bias(&bars, 2, 0).values.is_empty());
    }

    #[test]
    fn bias_indicator_type() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate_bias(&bars, 3, 15);
        assert_eq!(series.indicator_type, IndicatorType::Bias { short: 3, long: 15 });
    }

    #[test]
    fn bias_with_rank_keeps_every_row() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let rows = bias_with_rank(&bars, 2, 3);

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].short_ma, None);
        assert_eq!(rows[1].short_ma, Some(1.5));
        assert_eq!(rows[1].long_ma, None);
        assert_eq!(rows[1].bias, None);
        assert_eq!(rows[1].rank, None);
        assert!(rows[2].bias.is_some());
    }

    #[test]
    fn bias_with_rank_ranks_against_own_column() {
        // closes chosen so bias grows each row once defined
        let bars = make_bars(&[1.0, 1.0, 1.0, 2.0, 4.0]);
        let rows = bias_with_rank(&bars, 1, 3);

        let ranks: Vec<f64> = rows.iter().filter_map(|r| r.rank).collect();
        assert_eq!(ranks.len(), 3);
        assert!((ranks[0] - 100.0 / 3.0).abs() < 1e-10);
        assert!((ranks[1] - 200.0 / 3.0).abs() < 1e-10);
        assert!((ranks[2] - 100.0).abs() < 1e-10);
    }

    #[test]
    fn bias_skips_rows_touched_by_nan_close() {
        let bars = make_bars(&[1.0, 2.0, 3.0, f64::NAN, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let series = compute_bias(&bars, 2, 3);

        // SMA(3) windows holding the NaN end at bars 3, 4 and 5
        let times: Vec<_> = series.points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![bars[2].time, bars[6].time, bars[7].time, bars[8].time]);
        assert!(series.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn bias_with_rank_leaves_nan_rows_undefined() {
        let bars = make_bars(&[1.0, 2.0, 3.0, f64::NAN, 5.0, 6.0, 7.0]);
        let rows = bias_with_rank(&bars, 2, 3);

        assert_eq!(rows.len(), 7);
        for row in &rows[3..6] {
            assert_eq!(row.bias, None);
            assert_eq!(row.rank, None);
        }
        assert_eq!(rows[4].short_ma, None);
        assert!(rows[6].bias.is_some());
        let ranks: Vec<f64> = rows.iter().filter_map(|r| r.rank).collect();
        assert_eq!(ranks.len(), 2);
        assert!(ranks.iter().all(|r| r.is_finite()));
    }
}
