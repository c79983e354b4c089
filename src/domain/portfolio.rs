//! Portfolio series points and trade records.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An executed all-in/all-out trade. Recorded once at the position-change
/// bar and immutable afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub timestamp: NaiveDateTime,
    pub side: TradeSide,
    pub price: f64,
    pub quantity: f64,
    /// price * quantity at execution.
    pub value: f64,
}

/// Point-in-time portfolio state for one bar. `value` is always
/// `cash + holdings * close` at this bar's own close, never carried forward.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioPoint {
    pub timestamp: NaiveDateTime,
    /// Signal first-difference applied at this bar (0 at the first bar).
    pub position_change: i8,
    pub close: f64,
    pub cash: f64,
    pub holdings: f64,
    pub value: f64,
}
