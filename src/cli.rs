//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_session_store::InMemorySessionStore;
use crate::domain::backtest::{self as engine, SimulationResult};
use crate::domain::catalog::{StrategyName, list_strategies};
use crate::domain::config_validation::{
    LogFormat, LoggingConfig, load_backtest_config, load_heatmap_axes, load_logging_config,
    load_monte_carlo_config, load_paper_days, load_strategy, load_walk_forward_config,
    validate_all,
};
use crate::domain::error::TradebotError;
use crate::domain::heatmap::{HeatmapResult, run_heatmap};
use crate::domain::metrics::Metrics;
use crate::domain::monte_carlo::{MonteCarloResult, run_monte_carlo};
use crate::domain::ohlcv::Bar;
use crate::domain::paper::{PaperTradeRequest, PaperTradingManager, Session};
use crate::domain::walk_forward::{WalkForwardResult, run_walk_forward};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "TRADEBOT_LOG";

#[derive(Parser, Debug)]
#[command(name = "tradebot", about = "Strategy backtesting and robustness analysis")]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding <TICKER>.csv files
    #[arg(long)]
    pub data_dir: PathBuf,
    #[arg(short, long)]
    pub ticker: String,
    /// First date to load (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last date to load (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and print metrics and trades
    Backtest {
        #[command(flatten)]
        data: DataArgs,
        /// Also run the trade-order resampling analysis
        #[arg(long)]
        monte_carlo: bool,
        /// Also run the rolling-window analysis
        #[arg(long)]
        walk_forward: bool,
    },
    /// Resample the backtest's trade order
    MonteCarlo {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Rolling train/test window analysis
    WalkForward {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Take-profit by stop-loss grid search
    Heatmap {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Start a paper-trading session over recent bars
    Paper {
        #[command(flatten)]
        data: DataArgs,
    },
    /// List the strategy catalog
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers available in a data directory
    ListTickers {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match config_path(&cli.command) {
        Some(path) => match FileConfigAdapter::from_file(path) {
            Ok(c) => c,
            Err(e) => return report_error(&e),
        },
        None => FileConfigAdapter::empty(),
    };

    match load_logging_config(&config) {
        Ok(logging) => init_tracing(&logging),
        Err(e) => return report_error(&e),
    }

    let json = cli.json;
    let outcome = match cli.command {
        Command::Backtest {
            data,
            monte_carlo,
            walk_forward,
        } => run_backtest(&config, &data, monte_carlo, walk_forward, json),
        Command::MonteCarlo { data } => run_monte_carlo_cmd(&config, &data, json),
        Command::WalkForward { data } => run_walk_forward_cmd(&config, &data, json),
        Command::Heatmap { data } => run_heatmap_cmd(&config, &data, json),
        Command::Paper { data } => run_paper(&config, &data, json),
        Command::Strategies => run_strategies(json),
        Command::Validate { config: path } => run_validate(&config, &path),
        Command::ListTickers { data_dir } => run_list_tickers(&data_dir, json),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn config_path(command: &Command) -> Option<&PathBuf> {
    match command {
        Command::Backtest { data, .. }
        | Command::MonteCarlo { data }
        | Command::WalkForward { data }
        | Command::Heatmap { data }
        | Command::Paper { data } => data.config.as_ref(),
        Command::Validate { config } => Some(config),
        Command::Strategies | Command::ListTickers { .. } => None,
    }
}

fn report_error(err: &TradebotError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Filter precedence: `TRADEBOT_LOG`, then `[logging] level`, then `info`.
/// Logs go to stderr so stdout carries only results.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::try_new(logging.level.as_deref().unwrap_or("info"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // try_init fails only when a subscriber is already installed
    let _ = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };
}

pub fn load_bars(data: &DataArgs) -> Result<Vec<Bar>, TradebotError> {
    let adapter = CsvAdapter::new(data.data_dir.clone());
    let bars = adapter.fetch_bars(&data.ticker, data.start, data.end)?;
    info!(ticker = %data.ticker, bars = bars.len(), "loaded bars");
    Ok(bars)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TradebotError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

#[derive(Serialize)]
struct BacktestReport<'a> {
    strategy: &'a str,
    ticker: &'a str,
    metrics: Metrics,
    result: &'a SimulationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    monte_carlo: Option<MonteCarloResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    walk_forward: Option<WalkForwardResult>,
}

fn simulate(
    config: &dyn ConfigPort,
    bars: &[Bar],
) -> Result<(StrategyName, SimulationResult), TradebotError> {
    let bt_config = load_backtest_config(config)?;
    let (strategy, params) = load_strategy(config)?;
    info!(%strategy, bars = bars.len(), "running backtest");
    let result = engine::run_backtest(bars, strategy, &params, &bt_config)?;
    Ok((strategy, result))
}

pub fn run_backtest(
    config: &dyn ConfigPort,
    data: &DataArgs,
    with_monte_carlo: bool,
    with_walk_forward: bool,
    json: bool,
) -> Result<(), TradebotError> {
    let bars = load_bars(data)?;
    let (strategy, result) = simulate(config, &bars)?;
    let metrics = Metrics::from_result(&result);

    let monte_carlo = if with_monte_carlo {
        let mc_config = load_monte_carlo_config(config)?;
        Some(run_monte_carlo(&result.trades, result.initial_capital, &mc_config)?)
    } else {
        None
    };
    let walk_forward = if with_walk_forward {
        Some(run_walk_forward(&bars, &load_walk_forward_config(config)?)?)
    } else {
        None
    };

    if json {
        return print_json(&BacktestReport {
            strategy: strategy.as_str(),
            ticker: &data.ticker,
            metrics,
            result: &result,
            monte_carlo,
            walk_forward,
        });
    }

    print_metrics(&metrics);
    print_trades(&result);
    if let Some(mc) = &monte_carlo {
        print_monte_carlo(mc);
    }
    if let Some(wf) = &walk_forward {
        print_walk_forward(wf);
    }
    Ok(())
}

fn run_monte_carlo_cmd(
    config: &dyn ConfigPort,
    data: &DataArgs,
    json: bool,
) -> Result<(), TradebotError> {
    let bars = load_bars(data)?;
    let (_, result) = simulate(config, &bars)?;
    let mc = run_monte_carlo(
        &result.trades,
        result.initial_capital,
        &load_monte_carlo_config(config)?,
    )?;
    if json {
        return print_json(&mc);
    }
    print_monte_carlo(&mc);
    Ok(())
}

fn run_walk_forward_cmd(
    config: &dyn ConfigPort,
    data: &DataArgs,
    json: bool,
) -> Result<(), TradebotError> {
    let bars = load_bars(data)?;
    let wf = run_walk_forward(&bars, &load_walk_forward_config(config)?)?;
    if json {
        return print_json(&wf);
    }
    print_walk_forward(&wf);
    Ok(())
}

fn run_heatmap_cmd(
    config: &dyn ConfigPort,
    data: &DataArgs,
    json: bool,
) -> Result<(), TradebotError> {
    let bars = load_bars(data)?;
    let bt_config = load_backtest_config(config)?;
    let (strategy, params) = load_strategy(config)?;
    let axes = load_heatmap_axes(config)?;
    let heatmap = run_heatmap(
        &bars,
        strategy,
        &params,
        &bt_config,
        axes.take_profit_values.as_deref(),
        axes.stop_loss_values.as_deref(),
    )?;
    if json {
        return print_json(&heatmap);
    }
    print_heatmap(&heatmap);
    Ok(())
}

#[derive(Serialize)]
struct PaperReport {
    session: Session,
    sessions: Vec<Session>,
}

fn run_paper(config: &dyn ConfigPort, data: &DataArgs, json: bool) -> Result<(), TradebotError> {
    let bars = load_bars(data)?;
    let (strategy, params) = load_strategy(config)?;
    let request = PaperTradeRequest {
        ticker: data.ticker.clone(),
        strategy,
        days: load_paper_days(config)?,
        params,
        config: load_backtest_config(config)?,
    };

    let manager = PaperTradingManager::new(Arc::new(InMemorySessionStore::new()));
    let started = manager.start(&request, &bars)?;
    let session = manager.status(&started.id).unwrap_or(started);
    let sessions = manager.list();

    if json {
        return print_json(&PaperReport { session, sessions });
    }

    print_session(&session);
    println!("\n=== Sessions ===");
    for s in &sessions {
        let state = if s.is_active { "active" } else { "stopped" };
        println!("  {}  {} {}  {}", s.id, s.ticker, s.strategy, state);
    }
    Ok(())
}

fn run_strategies(json: bool) -> Result<(), TradebotError> {
    let catalog = list_strategies();
    if json {
        return print_json(&catalog);
    }
    for info in &catalog {
        println!("{} ({})", info.display_name, info.name);
        println!("  {}", info.description);
        println!("  indicators: {}", info.indicators.join(", "));
        println!("  entry: {}", info.entry_logic);
        println!("  exit:  {}", info.exit_logic);
    }
    Ok(())
}

pub fn run_validate(config: &dyn ConfigPort, path: &PathBuf) -> Result<(), TradebotError> {
    info!(path = %path.display(), "validating config");
    validate_all(config)?;
    let (strategy, params) = load_strategy(config)?;
    let bt_config = load_backtest_config(config)?;
    println!("strategy:        {}", strategy);
    println!("initial capital: {:.2}", bt_config.initial_capital);
    println!(
        "stop loss:       {}%  take profit: {}%",
        params.stop_loss_pct, params.take_profit_pct
    );
    println!("Configuration is valid.");
    Ok(())
}

fn run_list_tickers(data_dir: &PathBuf, json: bool) -> Result<(), TradebotError> {
    let tickers = CsvAdapter::new(data_dir.clone()).list_tickers()?;
    if json {
        return print_json(&tickers);
    }
    if tickers.is_empty() {
        warn!(data_dir = %data_dir.display(), "no tickers found");
    }
    for ticker in &tickers {
        println!("{ticker}");
    }
    Ok(())
}

fn print_metrics(m: &Metrics) {
    println!("=== Results ===");
    println!("Total Return:     {:.2}%", m.total_return);
    println!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    println!("Max Drawdown:     {:.2}%", m.max_drawdown);
    println!("Total Trades:     {}", m.total_trades);
    println!("Win Rate:         {:.1}%", m.win_rate);
    println!("Profit Factor:    {:.2}", m.profit_factor);
    println!("Risk/Reward:      {:.2}", m.risk_reward_ratio);
    println!("Avg Win / Loss:   {:.2} / {:.2}", m.avg_win, m.avg_loss);
    println!("Streaks:          +{} / -{}", m.best_streak, m.worst_streak);
}

fn print_trades(result: &SimulationResult) {
    if result.trades.is_empty() {
        return;
    }
    println!("\n=== Trades ===");
    for t in &result.trades {
        let sign = if t.pnl >= 0.0 { "+" } else { "" };
        println!(
            "  {} {} x{} {:.2} -> {} {:.2}  {}{:.2} ({:?})",
            t.entry_timestamp,
            t.direction,
            t.size,
            t.entry_price,
            t.exit_timestamp,
            t.exit_price,
            sign,
            t.pnl,
            t.exit_reason,
        );
    }
    if let Some(pos) = &result.open_position {
        println!(
            "  open: {} x{} @ {:.2} since {}",
            pos.direction, pos.size, pos.entry_price, pos.entry_timestamp
        );
    }
}

fn print_monte_carlo(mc: &MonteCarloResult) {
    println!("\n=== Monte Carlo ({} simulations, {} trades) ===", mc.simulations, mc.trade_count);
    println!("Median Return:    {:.2}%", mc.median_return);
    println!("5th / 95th:       {:.2}% / {:.2}%", mc.percentile_5, mc.percentile_95);
    println!("Worst / Best:     {:.2}% / {:.2}%", mc.worst_return, mc.best_return);
    println!("Median Max DD:    {:.2}%", mc.median_max_drawdown);
    println!("Worst Max DD:     {:.2}%", mc.worst_max_drawdown);
}

fn print_walk_forward(wf: &WalkForwardResult) {
    println!("\n=== Walk-Forward ===");
    for w in &wf.windows {
        println!(
            "  window {}: test from {} ({} bars)  {:.2}%",
            w.index, w.test_start, w.test_size, w.return_pct
        );
    }
    println!(
        "Profitable:       {}/{} ({:.1}%)",
        wf.profitable_windows, wf.completed_windows, wf.consistency
    );
    println!("Avg Return:       {:.2}%", wf.avg_return);
}

fn print_heatmap(heatmap: &HeatmapResult) {
    println!("=== Heatmap: return % (rows TP, columns SL) ===");
    let header: Vec<String> = heatmap
        .stop_loss_values
        .iter()
        .map(|sl| format!("{:>8}", sl))
        .collect();
    println!("{:>8}{}", "TP\\SL", header.join(""));
    for (i, tp) in heatmap.take_profit_values.iter().enumerate() {
        let row: Vec<String> = (0..heatmap.stop_loss_values.len())
            .map(|j| {
                heatmap
                    .point(i, j)
                    .map_or_else(String::new, |p| format!("{:>8.2}", p.return_pct))
            })
            .collect();
        println!("{:>8}{}", tp, row.join(""));
    }
    println!(
        "Best: TP {}% / SL {}% -> {:.2}% ({} backtests)",
        heatmap.best_take_profit,
        heatmap.best_stop_loss,
        heatmap.best_return,
        heatmap.total_backtests
    );
}

fn print_session(s: &Session) {
    println!("=== Paper Session {} ===", s.id);
    println!("Ticker / Strategy: {} / {}", s.ticker, s.strategy);
    println!("Period:            {} to {}", s.start, s.end);
    println!("Capital:           {:.2} -> {:.2}", s.starting_capital, s.current_capital);
    println!("Realized P&L:      {:.2} ({:.2}%)", s.realized_pnl, s.realized_pnl_pct);
    println!("Unrealized P&L:    {:.2}", s.unrealized_pnl);
    println!("Total P&L:         {:.2}", s.total_pnl);
    println!("Trades:            {}", s.total_trades);
    if let Some(pos) = &s.current_position {
        println!(
            "Position:          {} x{} @ {:.2}, now {:.2} ({:+.2}%)",
            pos.direction, pos.size, pos.entry_price, pos.current_price, pos.unrealized_pnl_pct
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backtest_with_flags() {
        let cli = Cli::try_parse_from([
            "tradebot",
            "--json",
            "backtest",
            "--data-dir",
            "data",
            "--ticker",
            "ACME",
            "--start",
            "2024-01-01",
            "--monte-carlo",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Backtest {
                data,
                monte_carlo,
                walk_forward,
            } => {
                assert_eq!(data.ticker, "ACME");
                assert_eq!(data.start, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert!(data.end.is_none());
                assert!(monte_carlo);
                assert!(!walk_forward);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ticker_is_required_for_data_commands() {
        assert!(Cli::try_parse_from(["tradebot", "heatmap", "--data-dir", "d"]).is_err());
    }

    #[test]
    fn config_path_follows_command() {
        let cli = Cli::try_parse_from(["tradebot", "validate", "--config", "a.ini"]).unwrap();
        assert_eq!(config_path(&cli.command), Some(&PathBuf::from("a.ini")));
        let cli = Cli::try_parse_from(["tradebot", "strategies"]).unwrap();
        assert_eq!(config_path(&cli.command), None);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn load_bars_reports_through_tracing() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("ACME.csv"),
            "timestamp,open,high,low,close,volume\n\
             2024-01-02,1,1,1,1,10\n\
             2024-01-03,2,2,2,2,20\n",
        )
        .unwrap();
        let data = DataArgs {
            config: None,
            data_dir: dir.path().to_path_buf(),
            ticker: "ACME".to_string(),
            start: None,
            end: None,
        };

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let bars = tracing::subscriber::with_default(subscriber, || load_bars(&data)).unwrap();

        assert_eq!(bars.len(), 2);
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("loaded bars"), "missing event: {output}");
        assert!(output.contains("ticker=ACME"));
        assert!(output.contains("bars=2"));
    }
}
