//! Persistence port trait.

use crate::domain::backtest::StrategyParams;
use crate::domain::error::SmacrossError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::Trade;
use chrono::NaiveDateTime;

/// Port for persisting backtest outputs. Rows are keyed by a store-side
/// auto-increment id; performance rows are additionally unique by date, so
/// re-running a backtest over the same range updates in place.
pub trait StorePort {
    fn init_schema(&self) -> Result<(), SmacrossError>;

    fn save_trades(&self, trades: &[Trade]) -> Result<(), SmacrossError>;

    fn save_metrics(&self, date: NaiveDateTime, metrics: &Metrics) -> Result<(), SmacrossError>;

    fn save_settings(
        &self,
        symbol: &str,
        params: &StrategyParams,
    ) -> Result<(), SmacrossError>;
}
