//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SmacrossError;
use crate::domain::metrics::Metrics;
use std::path::Path;

/// Port for exporting a finished backtest for a downstream consumer
/// (charting, spreadsheets).
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_dir: &Path,
    ) -> Result<(), SmacrossError>;
}
