//! PostgreSQL persistence adapter.
//!
//! Same tables as the SQLite store, for deployments that already run a
//! Postgres instance.

use crate::domain::backtest::StrategyParams;
use crate::domain::error::SmacrossError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::Trade;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::NaiveDateTime;
use postgres::{Client, NoTls};
use std::cell::RefCell;

pub struct PostgresAdapter {
    client: RefCell<Client>,
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SmacrossError> {
        // Try [postgres] connection_string first, fall back to [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| SmacrossError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let client =
            Client::connect(&connection_string, NoTls).map_err(|e| SmacrossError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client: RefCell::new(client),
        })
    }
}

impl StorePort for PostgresAdapter {
    fn init_schema(&self) -> Result<(), SmacrossError> {
        self.client
            .borrow_mut()
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS trades (
                    id SERIAL PRIMARY KEY,
                    timestamp TIMESTAMP NOT NULL,
                    side TEXT NOT NULL,
                    price DOUBLE PRECISION NOT NULL,
                    amount DOUBLE PRECISION NOT NULL,
                    value DOUBLE PRECISION NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_trades_timestamp ON trades(timestamp);
                CREATE TABLE IF NOT EXISTS performance (
                    id SERIAL PRIMARY KEY,
                    date TIMESTAMP NOT NULL UNIQUE,
                    portfolio_value DOUBLE PRECISION NOT NULL,
                    daily_return DOUBLE PRECISION NOT NULL,
                    total_return DOUBLE PRECISION NOT NULL,
                    sharpe_ratio DOUBLE PRECISION,
                    max_drawdown DOUBLE PRECISION NOT NULL
                );
                CREATE TABLE IF NOT EXISTS settings (
                    id SERIAL PRIMARY KEY,
                    short_window INTEGER NOT NULL,
                    long_window INTEGER NOT NULL,
                    initial_balance DOUBLE PRECISION NOT NULL,
                    symbol TEXT NOT NULL
                );",
            )
            .map_err(|e| SmacrossError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn save_trades(&self, trades: &[Trade]) -> Result<(), SmacrossError> {
        let mut client = self.client.borrow_mut();
        let mut tx = client.transaction().map_err(|e| SmacrossError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        for trade in trades {
            tx.execute(
                "INSERT INTO trades (timestamp, side, price, amount, value)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &trade.timestamp,
                    &trade.side.as_str(),
                    &trade.price,
                    &trade.quantity,
                    &trade.value,
                ],
            )
            .map_err(|e| SmacrossError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit().map_err(|e| SmacrossError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn save_metrics(&self, date: NaiveDateTime, metrics: &Metrics) -> Result<(), SmacrossError> {
        let sharpe: Option<f64> = if metrics.sharpe_ratio.is_finite() {
            Some(metrics.sharpe_ratio)
        } else {
            None
        };

        self.client
            .borrow_mut()
            .execute(
                "INSERT INTO performance
                     (date, portfolio_value, daily_return, total_return, sharpe_ratio, max_drawdown)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (date) DO UPDATE SET
                     portfolio_value = EXCLUDED.portfolio_value,
                     daily_return = EXCLUDED.daily_return,
                     total_return = EXCLUDED.total_return,
                     sharpe_ratio = EXCLUDED.sharpe_ratio,
                     max_drawdown = EXCLUDED.max_drawdown",
                &[
                    &date,
                    &metrics.final_value,
                    &metrics.daily_return,
                    &metrics.total_return,
                    &sharpe,
                    &metrics.max_drawdown,
                ],
            )
            .map_err(|e| SmacrossError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn save_settings(
        &self,
        symbol: &str,
        params: &StrategyParams,
    ) -> Result<(), SmacrossError> {
        self.client
            .borrow_mut()
            .execute(
                "INSERT INTO settings (short_window, long_window, initial_balance, symbol)
                 VALUES ($1, $2, $3, $4)",
                &[
                    &(params.short_window as i32),
                    &(params.long_window as i32),
                    &params.initial_balance,
                    &symbol,
                ],
            )
            .map_err(|e| SmacrossError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
