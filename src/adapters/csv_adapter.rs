//! CSV file data adapter.
//!
//! One `<SYMBOL>.csv` per symbol in a base directory, columns
//! `timestamp,open,high,low,close,volume`. Rows are sorted by timestamp
//! after reading, so unordered files load fine.

use crate::domain::error::SmacrossError;
use crate::domain::ohlcv::{parse_timestamp, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, SmacrossError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(SmacrossError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| SmacrossError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SmacrossError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| SmacrossError::DataSource {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp =
                parse_timestamp(ts_str).ok_or_else(|| SmacrossError::DataSource {
                    reason: format!("invalid timestamp: {}", ts_str),
                })?;

            let field = |idx: usize, name: &str| -> Result<f64, SmacrossError> {
                record
                    .get(idx)
                    .ok_or_else(|| SmacrossError::DataSource {
                        reason: format!("missing {} column", name),
                    })?
                    .parse()
                    .map_err(|e| SmacrossError::DataSource {
                        reason: format!("invalid {} value: {}", name, e),
                    })
            };

            bars.push(OhlcvBar {
                timestamp,
                open: field(1, "open")?,
                high: field(2, "high")?,
                low: field(3, "low")?,
                close: field(4, "close")?,
                volume: field(5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, SmacrossError> {
        let bars = self.read_all(symbol)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SmacrossError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SmacrossError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, SmacrossError> {
        let bars = self.read_all(symbol)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.timestamp, last.timestamp, bars.len()))),
            _ => Ok(None),
        }
    }
}
