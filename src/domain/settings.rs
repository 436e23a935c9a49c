//! Bias model parameters and their validation.
//!
//! Settings come from the `[bias]` and `[cache]` sections of the INI config;
//! every numeric key is optional and falls back to the defaults below, but a
//! value that is present must be a non-negative integer.

use std::path::PathBuf;

use crate::domain::distribution::CacheKey;
use crate::domain::error::BiasError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_HIST_COUNT: usize = 2000;
pub const DEFAULT_SHORT_WINDOW: usize = 3;
pub const DEFAULT_LONG_WINDOW: usize = 15;
pub const DEFAULT_CACHE_DIR: &str = "data/BIAS";

#[derive(Debug, Clone, PartialEq)]
pub struct BiasSettings {
    pub symbol: String,
    pub frequency: String,
    pub hist_count: usize,
    pub short_window: usize,
    pub long_window: usize,
    pub cache_dir: PathBuf,
}

impl BiasSettings {
    pub fn new(symbol: impl Into<String>, frequency: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            frequency: frequency.into(),
            hist_count: DEFAULT_HIST_COUNT,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            symbol: self.symbol.clone(),
            frequency: self.frequency.clone(),
            short_window: self.short_window,
            long_window: self.long_window,
        }
    }

    /// Bars needed for a single fresh bias value.
    pub fn realtime_count(&self) -> usize {
        self.long_window + 2
    }
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<BiasSettings, BiasError> {
    let symbol = require_string(config, "bias", "symbol")?;
    let frequency = require_string(config, "bias", "frequency")?;

    let mut settings = BiasSettings::new(symbol, frequency);
    settings.hist_count = get_count(config, "hist_count", DEFAULT_HIST_COUNT)?;
    settings.short_window = get_count(config, "short_window", DEFAULT_SHORT_WINDOW)?;
    settings.long_window = get_count(config, "long_window", DEFAULT_LONG_WINDOW)?;
    if let Some(dir) = config.get_string("cache", "dir") {
        settings.cache_dir = PathBuf::from(dir);
    }
    Ok(settings)
}

pub fn validate_settings(settings: &BiasSettings) -> Result<(), BiasError> {
    if settings.symbol.trim().is_empty() {
        return Err(invalid("symbol", "symbol must not be empty"));
    }
    if settings.frequency.trim().is_empty() {
        return Err(invalid("frequency", "frequency must not be empty"));
    }
    if settings.short_window == 0 {
        return Err(invalid("short_window", "short_window must be at least 1"));
    }
    if settings.long_window < settings.short_window {
        return Err(invalid(
            "long_window",
            "long_window must not be shorter than short_window",
        ));
    }
    if settings.hist_count <= settings.long_window {
        return Err(invalid(
            "hist_count",
            "hist_count must exceed long_window",
        ));
    }
    Ok(())
}

fn require_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, BiasError> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BiasError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn get_count(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, BiasError> {
    match config.get_string("bias", key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            invalid(
                key,
                &format!("{key} must be a non-negative integer, got {raw:?}"),
            )
        }),
    }
}

fn invalid(key: &str, reason: &str) -> BiasError {
    BiasError::ConfigInvalid {
        section: "bias".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
