//! CSV report adapter.
//!
//! Exports a finished backtest as four CSV files in an output directory:
//! `signals.csv` (moving averages and crossover markers for charting),
//! `portfolio.csv` (the equity curve), `trades.csv`, and `metrics.csv`
//! (summary figures rounded to 2 decimal places).

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SmacrossError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn opt_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_dir: &Path,
    ) -> Result<(), SmacrossError> {
        fs::create_dir_all(output_dir)?;

        let mut signals = csv::Writer::from_path(output_dir.join("signals.csv"))
            .map_err(|e| SmacrossError::Io(e.into()))?;
        signals
            .write_record([
                "timestamp",
                "close",
                "sma_short",
                "sma_long",
                "signal",
                "position",
            ])
            .map_err(|e| SmacrossError::Io(e.into()))?;
        for row in &result.signals {
            signals
                .write_record([
                    row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    row.close.to_string(),
                    opt_field(row.sma_short),
                    opt_field(row.sma_long),
                    row.signal.to_string(),
                    row.position.map(|p| p.to_string()).unwrap_or_default(),
                ])
                .map_err(|e| SmacrossError::Io(e.into()))?;
        }
        signals.flush()?;

        let mut portfolio = csv::Writer::from_path(output_dir.join("portfolio.csv"))
            .map_err(|e| SmacrossError::Io(e.into()))?;
        portfolio
            .write_record([
                "timestamp",
                "position_change",
                "close",
                "cash",
                "holdings",
                "portfolio_value",
            ])
            .map_err(|e| SmacrossError::Io(e.into()))?;
        for point in &result.portfolio {
            portfolio
                .write_record([
                    point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    point.position_change.to_string(),
                    point.close.to_string(),
                    point.cash.to_string(),
                    point.holdings.to_string(),
                    point.value.to_string(),
                ])
                .map_err(|e| SmacrossError::Io(e.into()))?;
        }
        portfolio.flush()?;

        let mut trades = csv::Writer::from_path(output_dir.join("trades.csv"))
            .map_err(|e| SmacrossError::Io(e.into()))?;
        trades
            .write_record(["timestamp", "side", "price", "amount", "value"])
            .map_err(|e| SmacrossError::Io(e.into()))?;
        for trade in &result.trades {
            trades
                .write_record([
                    trade.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    trade.side.to_string(),
                    trade.price.to_string(),
                    trade.quantity.to_string(),
                    trade.value.to_string(),
                ])
                .map_err(|e| SmacrossError::Io(e.into()))?;
        }
        trades.flush()?;

        let mut summary = csv::Writer::from_path(output_dir.join("metrics.csv"))
            .map_err(|e| SmacrossError::Io(e.into()))?;
        summary
            .write_record([
                "total_return",
                "sharpe_ratio",
                "max_drawdown",
                "win_rate",
                "final_value",
            ])
            .map_err(|e| SmacrossError::Io(e.into()))?;
        summary
            .write_record([
                format!("{:.2}", metrics.total_return),
                if metrics.sharpe_ratio.is_finite() {
                    format!("{:.2}", metrics.sharpe_ratio)
                } else {
                    String::new()
                },
                format!("{:.2}", metrics.max_drawdown),
                format!("{:.2}", metrics.win_rate),
                format!("{:.2}", metrics.final_value),
            ])
            .map_err(|e| SmacrossError::Io(e.into()))?;
        summary.flush()?;

        Ok(())
    }
}
