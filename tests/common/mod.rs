#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use smacross::domain::backtest::StrategyParams;
pub use smacross::domain::ohlcv::OhlcvBar;
use std::fs;
use std::path::Path;

pub fn ts(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(index: usize, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(index as i64),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000.0,
    }
}

pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close))
        .collect()
}

pub fn sample_params() -> StrategyParams {
    StrategyParams {
        short_window: 2,
        long_window: 3,
        initial_balance: 1000.0,
    }
}

/// Write a `<symbol>.csv` price file the CsvAdapter can load.
pub fn write_price_csv(dir: &Path, symbol: &str, closes: &[f64]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for bar in make_bars(closes) {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
