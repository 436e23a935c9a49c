#![allow(dead_code)]

use biasrank::domain::error::BiasError;
pub use biasrank::domain::ohlcv::OhlcvBar;
use biasrank::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::cell::RefCell;
use std::collections::HashMap;

/// A recorded `fetch_bars` call: (symbol, frequency, count).
pub type FetchCall = (String, String, usize);

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<FetchCall>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.calls.borrow().iter().map(|c| c.2).collect()
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        frequency: &str,
        count: usize,
    ) -> Result<Vec<OhlcvBar>, BiasError> {
        self.calls
            .borrow_mut()
            .push((symbol.to_string(), frequency.to_string(), count));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BiasError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        let skip = bars.len().saturating_sub(count);
        Ok(bars.into_iter().skip(skip).collect())
    }
}

pub fn start_time() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn bars_from_closes(symbol: &str, frequency: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            symbol: symbol.to_string(),
            frequency: frequency.to_string(),
            time: start_time() + chrono::Duration::minutes(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Deterministic oscillating price path with a slow drift, so bias changes sign.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 5.0 * (t / 7.0).sin() + 0.01 * t
        })
        .collect()
}

pub fn write_bars_csv(dir: &std::path::Path, symbol: &str, frequency: &str, closes: &[f64]) {
    let mut content = String::from("datetime,open,high,low,close,volume\n");
    for bar in bars_from_closes(symbol, frequency, closes) {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.time.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    std::fs::write(dir.join(format!("{}_{}.csv", symbol, frequency)), content).unwrap();
}
