//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult, StrategyParams};
use crate::domain::config_validation::{
    validate_backtest_config, validate_strategy_config, DEFAULT_INITIAL_BALANCE,
    DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crate::domain::error::SmacrossError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::parse_timestamp;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "smacross", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for the configured symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest_cmd(&config, symbol.as_deref(), output.as_deref())
            }
        }
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SmacrossError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> StrategyParams {
    StrategyParams {
        short_window: adapter.get_int("strategy", "short_window", DEFAULT_SHORT_WINDOW) as usize,
        long_window: adapter.get_int("strategy", "long_window", DEFAULT_LONG_WINDOW) as usize,
        initial_balance: adapter.get_double(
            "backtest",
            "initial_balance",
            DEFAULT_INITIAL_BALANCE,
        ),
    }
}

/// Backtest window from config, full history when unset. Validation has
/// already checked the formats, so parse failures fall back to the extremes.
pub fn resolve_range(adapter: &dyn ConfigPort) -> (NaiveDateTime, NaiveDateTime) {
    let start = adapter
        .get_string("backtest", "start")
        .and_then(|s| parse_timestamp(&s))
        .unwrap_or(NaiveDateTime::MIN);
    let end = adapter
        .get_string("backtest", "end")
        .and_then(|s| parse_timestamp(&s))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

pub fn resolve_symbol(symbol_override: Option<&str>, adapter: &dyn ConfigPort) -> Option<String> {
    if let Some(s) = symbol_override {
        return Some(s.to_string());
    }
    adapter
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Format a value for display: 12345678.9 → "12.35M", 12345.6 → "12.35K".
pub fn format_number(num: f64) -> String {
    if num.abs() >= 1e6 {
        format!("{:.2}M", num / 1e6)
    } else if num.abs() >= 1e3 {
        format!("{:.2}K", num / 1e3)
    } else {
        format!("{:.2}", num)
    }
}

fn run_backtest_cmd(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    output_dir: Option<&std::path::Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Resolve symbol, range, and parameters
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required (use --symbol or set in config)");
            return ExitCode::from(2);
        }
    };
    let (start, end) = resolve_range(&adapter);
    let params = build_strategy_params(&adapter);

    // Stage 3: Fetch price data
    let data_path = adapter.get_string("data", "path").unwrap_or_default();
    let data_port = CsvAdapter::new(PathBuf::from(&data_path));

    let bars = match data_port.fetch_ohlcv(&symbol, start, end) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loaded {} bars for {}", bars.len(), symbol);

    // Stage 4: Run the backtest
    eprintln!(
        "Running backtest: SMA({}) / SMA({}), initial balance {}",
        params.short_window,
        params.long_window,
        format_number(params.initial_balance),
    );

    let result = match run_backtest(&bars, &params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Compute metrics and print summary
    let metrics = Metrics::compute(&result.portfolio, &result.trades);
    print_summary(&result, &metrics);

    // Stage 6: Persist to the configured store
    if let Err(e) = persist_results(&adapter, &symbol, &params, &result, &metrics) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 7: Write CSV report
    if let Some(dir) = output_dir {
        let report = CsvReportAdapter::new();
        if let Err(e) = report.write(&result, &metrics, dir) {
            eprintln!("error: failed to write report: {e}");
            return (&e).into();
        }
        eprintln!("Report written to: {}", dir.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, metrics: &Metrics) {
    let sharpe = if metrics.sharpe_ratio.is_finite() {
        format!("{:.2}", metrics.sharpe_ratio)
    } else {
        "n/a".to_string()
    };

    eprintln!("\n=== Results ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return);
    eprintln!("Sharpe Ratio:     {}", sharpe);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown);
    eprintln!("Win Rate:         {:.2}%", metrics.win_rate);
    eprintln!("Final Value:      {}", format_number(metrics.final_value));
    eprintln!("Trades:           {}", result.trades.len());

    if result.trades.len() % 2 == 1 {
        eprintln!("  (position still open at end of series)");
    }
}

fn persist_results(
    adapter: &FileConfigAdapter,
    symbol: &str,
    params: &StrategyParams,
    result: &BacktestResult,
    metrics: &Metrics,
) -> Result<(), SmacrossError> {
    // Performance rows key on the final bar's timestamp, so re-running the
    // same range updates in place rather than duplicating.
    let Some(run_date) = result.portfolio.last().map(|p| p.timestamp) else {
        return Ok(());
    };

    #[cfg(feature = "sqlite")]
    if adapter.get_string("sqlite", "path").is_some() {
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::ports::store_port::StorePort;

        let store = SqliteAdapter::from_config(adapter)?;
        store.init_schema()?;
        store.save_settings(symbol, params)?;
        store.save_trades(&result.trades)?;
        store.save_metrics(run_date, metrics)?;
        eprintln!("Saved {} trades and metrics to SQLite", result.trades.len());
    }

    #[cfg(feature = "postgres")]
    if adapter.get_string("postgres", "connection_string").is_some() {
        use crate::adapters::postgres_adapter::PostgresAdapter;
        use crate::ports::store_port::StorePort;

        let store = PostgresAdapter::from_config(adapter)?;
        store.init_schema()?;
        store.save_settings(symbol, params)?;
        store.save_trades(&result.trades)?;
        store.save_metrics(run_date, metrics)?;
        eprintln!(
            "Saved {} trades and metrics to PostgreSQL",
            result.trades.len()
        );
    }

    #[cfg(not(any(feature = "sqlite", feature = "postgres")))]
    {
        let _ = (adapter, symbol, params, metrics, run_date);
    }

    Ok(())
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let params = build_strategy_params(&adapter);
    let symbol = resolve_symbol(None, &adapter).unwrap_or_default();

    eprintln!("\nStrategy:");
    eprintln!("  short_window:    {}", params.short_window);
    eprintln!("  long_window:     {}", params.long_window);
    eprintln!("  initial_balance: {}", format_number(params.initial_balance));
    eprintln!("  symbol:          {}", symbol);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_path = config.get_string("data", "path").unwrap_or_default();
    let adapter = CsvAdapter::new(PathBuf::from(&data_path));

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_path);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &config) {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required (use --symbol or set in config)");
            return ExitCode::from(2);
        }
    };

    let data_path = config.get_string("data", "path").unwrap_or_default();
    let adapter = CsvAdapter::new(PathBuf::from(&data_path));

    match adapter.get_data_range(&symbol) {
        Ok(Some((min_ts, max_ts, count))) => {
            println!("{}: {} bars, {} to {}", symbol, count, min_ts, max_ts);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", symbol);
            ExitCode::from(5)
        }
        Err(e) => {
            eprintln!("error querying {}: {}", symbol, e);
            (&e).into()
        }
    }
}
