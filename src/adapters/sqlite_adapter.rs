//! SQLite persistence adapter.
//!
//! Stores trades, per-run performance metrics, and the parameter set used.
//! Rows are keyed by auto-increment id; performance is unique by date and
//! upserted, so re-running a backtest over the same range updates in place.

use crate::domain::backtest::StrategyParams;
use crate::domain::error::SmacrossError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::Trade;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::NaiveDateTime;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SmacrossError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| SmacrossError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| SmacrossError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, SmacrossError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| SmacrossError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, SmacrossError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| SmacrossError::Database {
                reason: e.to_string(),
            })
    }
}

impl StorePort for SqliteAdapter {
    fn init_schema(&self) -> Result<(), SmacrossError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                side TEXT NOT NULL,
                price REAL NOT NULL,
                amount REAL NOT NULL,
                value REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_timestamp ON trades(timestamp);
            CREATE TABLE IF NOT EXISTS performance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL UNIQUE,
                portfolio_value REAL NOT NULL,
                daily_return REAL NOT NULL,
                total_return REAL NOT NULL,
                sharpe_ratio REAL,
                max_drawdown REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_window INTEGER NOT NULL,
                long_window INTEGER NOT NULL,
                initial_balance REAL NOT NULL,
                symbol TEXT NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| SmacrossError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn save_trades(&self, trades: &[Trade]) -> Result<(), SmacrossError> {
        let mut conn = self.conn()?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| SmacrossError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        for trade in trades {
            tx.execute(
                "INSERT INTO trades (timestamp, side, price, amount, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    trade.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    trade.side.as_str(),
                    trade.price,
                    trade.quantity,
                    trade.value
                ],
            )
            .map_err(|e: rusqlite::Error| SmacrossError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| SmacrossError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn save_metrics(&self, date: NaiveDateTime, metrics: &Metrics) -> Result<(), SmacrossError> {
        let conn = self.conn()?;

        // An undefined Sharpe (zero-variance returns) persists as NULL.
        let sharpe: Option<f64> = if metrics.sharpe_ratio.is_finite() {
            Some(metrics.sharpe_ratio)
        } else {
            None
        };

        conn.execute(
            "INSERT INTO performance
                 (date, portfolio_value, daily_return, total_return, sharpe_ratio, max_drawdown)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(date) DO UPDATE SET
                 portfolio_value = excluded.portfolio_value,
                 daily_return = excluded.daily_return,
                 total_return = excluded.total_return,
                 sharpe_ratio = excluded.sharpe_ratio,
                 max_drawdown = excluded.max_drawdown",
            params![
                date.format(TIMESTAMP_FORMAT).to_string(),
                metrics.final_value,
                metrics.daily_return,
                metrics.total_return,
                sharpe,
                metrics.max_drawdown
            ],
        )
        .map_err(|e: rusqlite::Error| SmacrossError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn save_settings(
        &self,
        symbol: &str,
        params: &StrategyParams,
    ) -> Result<(), SmacrossError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO settings (short_window, long_window, initial_balance, symbol)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                params.short_window as i64,
                params.long_window as i64,
                params.initial_balance,
                symbol
            ],
        )
        .map_err(|e: rusqlite::Error| SmacrossError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
