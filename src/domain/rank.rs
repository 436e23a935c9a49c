//! Percentile ranking of bias values.
//!
//! Ranks use the weak convention: the share of sample values less than or
//! equal to the observation, scaled to 0..=100. A value at or above zero is
//! ranked within the positive bucket; a negative value is ranked within the
//! negative bucket and shifted down by 100, so the signed rank spans -100..=100
//! and values near zero mean "near the long-term average".

use crate::domain::distribution::Distribution;
use crate::domain::error::{BiasError, BucketSide};

/// Share of `sample` that is `<= value`, in percent. `None` for an empty sample.
pub fn percentile_rank(sample: &[f64], value: f64) -> Option<f64> {
    if sample.is_empty() {
        return None;
    }
    let at_or_below = sample.iter().filter(|&&v| v <= value).count();
    Some(at_or_below as f64 / sample.len() as f64 * 100.0)
}

pub fn signed_rank(distribution: &Distribution, value: f64) -> Result<f64, BiasError> {
    if !value.is_finite() {
        return Err(BiasError::NonFiniteBias { value });
    }

    if value >= 0.0 {
        percentile_rank(&distribution.positive, value).ok_or(BiasError::EmptyBucket {
            side: BucketSide::Positive,
        })
    } else {
        percentile_rank(&distribution.negative, value)
            .map(|r| r - 100.0)
            .ok_or(BiasError::EmptyBucket {
                side: BucketSide::Negative,
            })
    }
}
