//! Bias model: a cached historical distribution plus live ranking against it.
//!
//! Opening a model reads the distribution for its [`CacheKey`] through a
//! [`CachePort`]. When nothing usable is stored, `hist_count` bars are fetched,
//! the distribution is built and written back once. After that the
//! distribution never changes for the lifetime of the model.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::domain::distribution::{CacheKey, CacheLookup, Distribution};
use crate::domain::error::{BiasError, BucketSide};
use crate::domain::indicator::bias::compute_bias;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rank::signed_rank;
use crate::domain::settings::BiasSettings;
use crate::ports::cache_port::CachePort;
use crate::ports::chart_port::ChartPort;
use crate::ports::data_port::DataPort;

/// Where the model's distribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    Loaded,
    Built,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticRow {
    pub time: NaiveDateTime,
    pub close: f64,
    pub bias: f64,
    pub rank: f64,
}

pub struct BiasModel<D: DataPort> {
    data: D,
    settings: BiasSettings,
    distribution: Distribution,
    origin: CacheOrigin,
    load_log: Option<String>,
}

impl<D: DataPort> BiasModel<D> {
    pub fn open(data: D, cache: &dyn CachePort, settings: BiasSettings) -> Result<Self, BiasError> {
        let key = settings.cache_key();

        let load_log = match cache.load(&key) {
            CacheLookup::Hit(distribution) => {
                log::info!(
                    "loaded bias distribution for {} ({} positive, {} negative)",
                    key,
                    distribution.positive.len(),
                    distribution.negative.len()
                );
                return Ok(Self {
                    data,
                    settings,
                    distribution,
                    origin: CacheOrigin::Loaded,
                    load_log: None,
                });
            }
            CacheLookup::Missing => {
                log::info!("no cached distribution for {}, building from history", key);
                None
            }
            CacheLookup::Corrupt { reason } => {
                log::warn!(
                    "discarding unreadable cache {}: {}",
                    cache.path_for(&key).display(),
                    reason
                );
                Some(reason)
            }
        };

        let bars = fetch_nonempty(&data, &settings, settings.hist_count)?;
        let distribution = Distribution::build(&bars, settings.short_window, settings.long_window);
        if distribution.is_empty() {
            return Err(BiasError::InsufficientData {
                symbol: settings.symbol.clone(),
                frequency: settings.frequency.clone(),
                bars: bars.len(),
                minimum: warmup_bars(&settings),
            });
        }

        let path = cache.save(&key, &distribution)?;
        log::info!(
            "built bias distribution for {} from {} bars, saved to {}",
            key,
            bars.len(),
            path.display()
        );

        Ok(Self {
            data,
            settings,
            distribution,
            origin: CacheOrigin::Built,
            load_log,
        })
    }

    pub fn settings(&self) -> &BiasSettings {
        &self.settings
    }

    pub fn cache_key(&self) -> CacheKey {
        self.settings.cache_key()
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn cache_origin(&self) -> CacheOrigin {
        self.origin
    }

    /// Why the stored distribution was rejected, if it was.
    pub fn load_log(&self) -> Option<&str> {
        self.load_log.as_deref()
    }

    pub fn data_port(&self) -> &D {
        &self.data
    }

    /// Bias of the latest bar, from a fresh `long_window + 2` bar fetch.
    pub fn current_bias(&self) -> Result<f64, BiasError> {
        let bars = fetch_nonempty(&self.data, &self.settings, self.settings.realtime_count())?;
        compute_bias(&bars, self.settings.short_window, self.settings.long_window)
            .last()
            .map(|p| p.bias)
            .ok_or_else(|| self.insufficient(bars.len()))
    }

    /// Signed rank of `bias`, or of [`current_bias`](Self::current_bias) when `None`.
    pub fn rank_now(&self, bias: Option<f64>) -> Result<f64, BiasError> {
        let bias = match bias {
            Some(v) => v,
            None => self.current_bias()?,
        };
        signed_rank(&self.distribution, bias)
    }

    /// Fresh `hist_count` window with each bar's bias ranked against the cached distribution.
    ///
    /// Bars whose bias falls into an empty bucket have no rank and are left out.
    /// Only when that leaves no rows at all is `EmptyBucket` returned.
    pub fn diagnostic_series(&self) -> Result<Vec<DiagnosticRow>, BiasError> {
        let bars = fetch_nonempty(&self.data, &self.settings, self.settings.hist_count)?;
        let series = compute_bias(&bars, self.settings.short_window, self.settings.long_window);
        if series.is_empty() {
            return Err(self.insufficient(bars.len()));
        }

        let mut rows = Vec::with_capacity(series.len());
        let mut unranked: Option<(BucketSide, usize)> = None;
        for p in &series.points {
            match signed_rank(&self.distribution, p.bias) {
                Ok(rank) => rows.push(DiagnosticRow {
                    time: p.time,
                    close: p.close,
                    bias: p.bias,
                    rank,
                }),
                Err(BiasError::EmptyBucket { side }) => {
                    unranked.get_or_insert((side, 0)).1 += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some((side, skipped)) = unranked {
            if rows.is_empty() {
                return Err(BiasError::EmptyBucket { side });
            }
            log::warn!(
                "{}: skipped {} of {} bars with no bucket to rank against",
                self.cache_key(),
                skipped,
                series.len()
            );
        }
        Ok(rows)
    }

    /// Writes the [`diagnostic_series`](Self::diagnostic_series) rows through `chart`,
    /// titled with the cache key, and returns them.
    pub fn render_diagnostic(
        &self,
        chart: &dyn ChartPort,
        output_path: &Path,
    ) -> Result<Vec<DiagnosticRow>, BiasError> {
        let rows = self.diagnostic_series()?;
        let title = self.cache_key().to_string();
        chart.write(&rows, &title, output_path)?;
        log::info!("wrote diagnostic chart for {} to {}", title, output_path.display());
        Ok(rows)
    }

    fn insufficient(&self, bars: usize) -> BiasError {
        BiasError::InsufficientData {
            symbol: self.settings.symbol.clone(),
            frequency: self.settings.frequency.clone(),
            bars,
            minimum: warmup_bars(&self.settings),
        }
    }
}

fn warmup_bars(settings: &BiasSettings) -> usize {
    settings.short_window.max(settings.long_window)
}

fn fetch_nonempty<D: DataPort>(
    data: &D,
    settings: &BiasSettings,
    count: usize,
) -> Result<Vec<OhlcvBar>, BiasError> {
    let bars = data.fetch_bars(&settings.symbol, &settings.frequency, count)?;
    log::debug!(
        "fetched {} of {} requested bars for {} {}",
        bars.len(),
        count,
        settings.symbol,
        settings.frequency
    );
    if bars.is_empty() {
        return Err(BiasError::NoData {
            symbol: settings.symbol.clone(),
            frequency: settings.frequency.clone(),
        });
    }
    Ok(bars)
}
