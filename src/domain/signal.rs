//! Dual moving-average crossover signal generation.
//!
//! Simple rolling means of close over the trailing short/long windows,
//! `None` during warmup (first `window - 1` bars). The binary signal is 1
//! where the short average strictly exceeds the long average, computed only
//! once the long average is defined; `position` is the first difference of
//! the signal and drives the portfolio simulator.

use chrono::NaiveDateTime;

use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    /// 1 while the short average is strictly above the long average, else 0.
    pub signal: i8,
    /// First difference of `signal`: +1 on a rising edge, -1 on a falling
    /// edge, 0 otherwise. `None` at the first bar, where no prior exists.
    pub position: Option<i8>,
}

/// Derive the signal series from a price series. Pure function of its input;
/// a series shorter than `long_window` yields all-zero signals.
pub fn generate_signals(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> Vec<SignalRow> {
    let sma_short = rolling_mean(bars, short_window);
    let sma_long = rolling_mean(bars, long_window);

    let mut rows = Vec::with_capacity(bars.len());
    let mut prev_signal: i8 = 0;

    for (i, bar) in bars.iter().enumerate() {
        let signal = match (sma_short[i], sma_long[i]) {
            (Some(short), Some(long)) if short > long => 1,
            _ => 0,
        };

        let position = if i == 0 {
            None
        } else {
            Some(signal - prev_signal)
        };

        rows.push(SignalRow {
            timestamp: bar.timestamp,
            close: bar.close,
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            signal,
            position,
        });
        prev_signal = signal;
    }

    rows
}

/// Rolling mean of closes over a trailing window, `None` until the window is
/// fully populated. O(n) sliding sum rather than a rescan per bar.
fn rolling_mean(bars: &[OhlcvBar], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; bars.len()];
    }

    let mut out = Vec::with_capacity(bars.len());
    let mut sum = 0.0_f64;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= window {
            sum -= bars[i - window].close;
        }
        if i >= window - 1 {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }

    out
}
