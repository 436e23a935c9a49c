//! CSV file data adapter.
//!
//! Bars live in `{base}/{symbol}_{frequency}.csv` with the header
//! `datetime,open,high,low,close,volume`.

use crate::domain::error::BiasError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, frequency: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, frequency))
    }
}

fn parse_time(raw: &str) -> Result<NaiveDateTime, BiasError> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(t);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| BiasError::DataSource {
            reason: format!("invalid datetime: {}", raw),
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, BiasError> {
    record
        .get(index)
        .ok_or_else(|| BiasError::DataSource {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| BiasError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn authenticate(&self) -> Result<(), BiasError> {
        if self.base_path.is_dir() {
            Ok(())
        } else {
            Err(BiasError::DataSource {
                reason: format!("data directory {} does not exist", self.base_path.display()),
            })
        }
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        frequency: &str,
        count: usize,
    ) -> Result<Vec<OhlcvBar>, BiasError> {
        let path = self.csv_path(symbol, frequency);
        let content = fs::read_to_string(&path).map_err(|e| BiasError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BiasError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let time = parse_time(record.get(0).ok_or_else(|| BiasError::DataSource {
                reason: "missing datetime column".into(),
            })?)?;

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                frequency: frequency.to_string(),
                time,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.time);
        let skip = bars.len().saturating_sub(count);
        Ok(bars.split_off(skip))
    }
}
