//! Backtest engine: a single forward pass turning crossover signals into
//! trades and a bar-by-bar portfolio series.
//!
//! The simulator carries `(cash, holdings)` as running state, one bar at a
//! time in ascending timestamp order. A buy edge commits the entire cash
//! balance; a sell edge liquidates the entire holding. State set at a
//! transition bar persists unchanged until the next transition. No fees,
//! no slippage, no partial sizing.

use super::error::SmacrossError;
use super::ohlcv::{self, OhlcvBar};
use super::portfolio::{PortfolioPoint, Trade, TradeSide};
use super::signal::{generate_signals, SignalRow};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_balance: f64,
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), SmacrossError> {
        if self.short_window == 0 {
            return Err(SmacrossError::InvalidParams {
                reason: "short_window must be at least 1".into(),
            });
        }
        if self.short_window >= self.long_window {
            return Err(SmacrossError::InvalidParams {
                reason: format!(
                    "short_window ({}) must be less than long_window ({})",
                    self.short_window, self.long_window
                ),
            });
        }
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(SmacrossError::InvalidParams {
                reason: "initial_balance must be positive".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub signals: Vec<SignalRow>,
    pub portfolio: Vec<PortfolioPoint>,
    pub trades: Vec<Trade>,
}

/// Run a full backtest over a validated price series.
///
/// Trades come out chronological by construction. If the series ends while
/// still long, the final buy stays unmatched; no synthetic closing trade is
/// emitted, so the trade list may have an odd length.
pub fn run_backtest(
    bars: &[OhlcvBar],
    params: &StrategyParams,
) -> Result<BacktestResult, SmacrossError> {
    params.validate()?;
    ohlcv::validate_series(bars)?;

    let signals = generate_signals(bars, params.short_window, params.long_window);

    let mut portfolio = Vec::with_capacity(bars.len());
    let mut trades = Vec::new();

    let mut cash = params.initial_balance;
    let mut holdings = 0.0_f64;
    let mut long = false;

    for row in &signals {
        let change = row.position.unwrap_or(0);

        if change == 1 {
            // Buy edge: all cash into the asset at this bar's close. The
            // generator never emits consecutive buys, but a buy is applied
            // unconditionally either way.
            let quantity = cash / row.close;
            trades.push(Trade {
                timestamp: row.timestamp,
                side: TradeSide::Buy,
                price: row.close,
                quantity,
                value: quantity * row.close,
            });
            holdings = quantity;
            cash = 0.0;
            long = true;
        } else if change == -1 && long {
            // Sell edge with an open position: liquidate everything. A sell
            // edge while flat is ignored.
            let value = holdings * row.close;
            trades.push(Trade {
                timestamp: row.timestamp,
                side: TradeSide::Sell,
                price: row.close,
                quantity: holdings,
                value,
            });
            cash = value;
            holdings = 0.0;
            long = false;
        }

        // Marked to this bar's own close every bar, so the series tracks
        // unrealized gains while a position is open.
        portfolio.push(PortfolioPoint {
            timestamp: row.timestamp,
            position_change: change,
            close: row.close,
            cash,
            holdings,
            value: cash + holdings * row.close,
        });
    }

    Ok(BacktestResult {
        signals,
        portfolio,
        trades,
    })
}
