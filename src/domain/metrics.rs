//! Performance metrics derived from the completed portfolio series and
//! trade list.

use super::portfolio::{PortfolioPoint, Trade};

const TRADING_PERIODS_PER_YEAR: f64 = 252.0;
const RISK_FREE_RATE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Percent change from first to last portfolio value.
    pub total_return: f64,
    /// Annualized, assuming daily bars. NaN when the return series has zero
    /// variance or fewer than two returns; callers decide how to surface it.
    pub sharpe_ratio: f64,
    /// Percent, always <= 0. Zero iff the value series never dips below a
    /// prior peak.
    pub max_drawdown: f64,
    /// Percent of completed (entry, exit) pairs with strictly positive
    /// return. Zero when there are no completed pairs.
    pub win_rate: f64,
    /// Percent change at the final bar, 0 when undefined.
    pub daily_return: f64,
    /// Last portfolio value.
    pub final_value: f64,
}

impl Metrics {
    pub fn compute(portfolio: &[PortfolioPoint], trades: &[Trade]) -> Self {
        let initial = portfolio.first().map(|p| p.value).unwrap_or(0.0);
        let final_value = portfolio.last().map(|p| p.value).unwrap_or(0.0);

        let total_return = if initial > 0.0 {
            (final_value - initial) / initial * 100.0
        } else {
            0.0
        };

        let returns = periodic_returns(portfolio);

        Metrics {
            total_return,
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown: max_drawdown(portfolio),
            win_rate: win_rate(trades),
            daily_return: returns.last().copied().unwrap_or(0.0) * 100.0,
            final_value,
        }
    }
}

/// Per-bar simple returns of portfolio value. Undefined at bar 0, so the
/// result has one entry fewer than the input.
pub fn periodic_returns(portfolio: &[PortfolioPoint]) -> Vec<f64> {
    portfolio
        .windows(2)
        .map(|w| (w[1].value - w[0].value) / w[0].value)
        .collect()
}

/// sqrt(252) * mean(excess) / std(excess), excess = return - 0.01/252.
/// Sample standard deviation (n - 1 divisor). The 252 annualization assumes
/// daily bars regardless of the actual spacing.
fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }

    let n = returns.len() as f64;
    let daily_rf = RISK_FREE_RATE / TRADING_PERIODS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();

    let mean = excess.iter().sum::<f64>() / n;
    let variance = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        f64::NAN
    } else {
        TRADING_PERIODS_PER_YEAR.sqrt() * mean / stddev
    }
}

/// Most negative percent decline from the running peak. Non-positive; zero
/// for a non-decreasing value series.
fn max_drawdown(portfolio: &[PortfolioPoint]) -> f64 {
    let Some(first) = portfolio.first() else {
        return 0.0;
    };

    let mut peak = first.value;
    let mut worst = 0.0_f64;

    for point in portfolio {
        if point.value > peak {
            peak = point.value;
        }
        let drawdown = (point.value - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst * 100.0
}

/// Trades pair up consecutively as (entry, exit); an unmatched trailing
/// trade is excluded. A pair wins when its return is strictly positive.
fn win_rate(trades: &[Trade]) -> f64 {
    let complete_pairs = trades.len() / 2;
    if complete_pairs == 0 {
        return 0.0;
    }

    let wins = trades
        .chunks_exact(2)
        .filter(|pair| (pair[1].price - pair[0].price) / pair[0].price > 0.0)
        .count();

    wins as f64 / complete_pairs as f64 * 100.0
}
