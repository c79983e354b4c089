//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, so a bad value fails
//! the invocation instead of leaking degenerate numbers into results.

use super::error::SmacrossError;
use super::ohlcv::parse_timestamp;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SHORT_WINDOW: i64 = 20;
pub const DEFAULT_LONG_WINDOW: i64 = 50;
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let short = config.get_int("strategy", "short_window", DEFAULT_SHORT_WINDOW);
    let long = config.get_int("strategy", "long_window", DEFAULT_LONG_WINDOW);

    if short < 1 {
        return Err(SmacrossError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be at least 1".to_string(),
        });
    }
    if long <= short {
        return Err(SmacrossError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "long_window".to_string(),
            reason: format!("long_window ({long}) must be greater than short_window ({short})"),
        });
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    validate_initial_balance(config)?;
    validate_symbol(config)?;
    validate_data_path(config)?;
    validate_range(config)?;
    Ok(())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let value = config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE);
    if value <= 0.0 {
        return Err(SmacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SmacrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SmacrossError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

/// `start`/`end` are optional; when present they must parse and be ordered.
fn validate_range(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let start = parse_optional(config, "start")?;
    let end = parse_optional(config, "end")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(SmacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start".to_string(),
                reason: "start must be before end".to_string(),
            });
        }
    }
    Ok(())
}

fn parse_optional(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<chrono::NaiveDateTime>, SmacrossError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| SmacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!(
                    "invalid {key} format, expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS"
                ),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[data]
path = ./data

[backtest]
symbol = BTC-USD
initial_balance = 10000
start = 2024-01-01
end = 2024-06-30

[strategy]
short_window = 20
long_window = 50
"#;

    #[test]
    fn valid_config_passes() {
        let a = adapter(VALID);
        assert!(validate_backtest_config(&a).is_ok());
        assert!(validate_strategy_config(&a).is_ok());
    }

    #[test]
    fn defaults_pass_strategy_validation() {
        let a = adapter("[strategy]\n");
        assert!(validate_strategy_config(&a).is_ok());
    }

    #[test]
    fn zero_short_window_rejected() {
        let a = adapter("[strategy]\nshort_window = 0\nlong_window = 50\n");
        let err = validate_strategy_config(&a).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { ref key, .. } if key == "short_window"));
    }

    #[test]
    fn short_window_not_less_than_long_rejected() {
        let a = adapter("[strategy]\nshort_window = 50\nlong_window = 50\n");
        let err = validate_strategy_config(&a).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { ref key, .. } if key == "long_window"));
    }

    #[test]
    fn negative_initial_balance_rejected() {
        let a = adapter(
            "[data]\npath = ./data\n[backtest]\nsymbol = BTC-USD\ninitial_balance = -100\n",
        );
        let err = validate_backtest_config(&a).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { ref key, .. } if key == "initial_balance"));
    }

    #[test]
    fn missing_symbol_rejected() {
        let a = adapter("[data]\npath = ./data\n[backtest]\ninitial_balance = 100\n");
        let err = validate_backtest_config(&a).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigMissing { ref key, .. } if key == "symbol"));
    }

    #[test]
    fn missing_data_path_rejected() {
        let a = adapter("[backtest]\nsymbol = BTC-USD\n");
        let err = validate_backtest_config(&a).unwrap_err();
        assert!(
            matches!(err, SmacrossError::ConfigMissing { ref section, .. } if section == "data")
        );
    }

    #[test]
    fn missing_range_is_fine() {
        let a = adapter("[data]\npath = ./data\n[backtest]\nsymbol = BTC-USD\n");
        assert!(validate_backtest_config(&a).is_ok());
    }

    #[test]
    fn bad_start_format_rejected() {
        let a = adapter(
            "[data]\npath = ./data\n[backtest]\nsymbol = BTC-USD\nstart = 01/01/2024\n",
        );
        let err = validate_backtest_config(&a).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { ref key, .. } if key == "start"));
    }

    #[test]
    fn inverted_range_rejected() {
        let a = adapter(
            "[data]\npath = ./data\n[backtest]\nsymbol = BTC-USD\nstart = 2024-06-30\nend = 2024-01-01\n",
        );
        let err = validate_backtest_config(&a).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { ref key, .. } if key == "start"));
    }

    #[test]
    fn intraday_range_accepted() {
        let a = adapter(
            "[data]\npath = ./data\n[backtest]\nsymbol = BTC-USD\nstart = 2024-01-01 00:00:00\nend = 2024-01-01 12:00:00\n",
        );
        assert!(validate_backtest_config(&a).is_ok());
    }
}
