//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for smacross.
#[derive(Debug, thiserror::Error)]
pub enum SmacrossError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid strategy parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("empty price series")]
    EmptySeries,

    #[error("bad bar at {timestamp}: {reason}")]
    BadBar {
        timestamp: NaiveDateTime,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SmacrossError> for std::process::ExitCode {
    fn from(err: &SmacrossError) -> Self {
        let code: u8 = match err {
            SmacrossError::Io(_) => 1,
            SmacrossError::ConfigParse { .. }
            | SmacrossError::ConfigMissing { .. }
            | SmacrossError::ConfigInvalid { .. } => 2,
            SmacrossError::Database { .. } | SmacrossError::DatabaseQuery { .. } => 3,
            SmacrossError::InvalidParams { .. } => 4,
            SmacrossError::DataSource { .. }
            | SmacrossError::NoData { .. }
            | SmacrossError::EmptySeries
            | SmacrossError::BadBar { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
