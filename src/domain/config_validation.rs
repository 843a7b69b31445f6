//! Typed configuration loading.
//!
//! Every section is read into its domain struct and validated with the same
//! bounds the domain re-checks at run time. Missing keys take their defaults;
//! malformed or out-of-range values are reported against their section and
//! key.

use std::str::FromStr;

use crate::domain::backtest::BacktestConfig;
use crate::domain::catalog::StrategyName;
use crate::domain::error::TradebotError;
use crate::domain::monte_carlo::MonteCarloConfig;
use crate::domain::paper::{DEFAULT_DAYS, MAX_DAYS};
use crate::domain::strategy::{
    IndicatorSettings, PositionSizing, StrategyParameters, TradeDirection,
};
use crate::domain::walk_forward::WalkForwardConfig;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: LogFormat,
}

/// Optional overrides for the grid-search axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapAxes {
    pub take_profit_values: Option<Vec<f64>>,
    pub stop_loss_values: Option<Vec<f64>>,
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TradebotError> {
    let defaults = BacktestConfig::default();
    let loaded = BacktestConfig {
        initial_capital: double_or(config, "backtest", "initial_capital", defaults.initial_capital)?,
        commission_per_trade: double_or(
            config,
            "backtest",
            "commission_per_trade",
            defaults.commission_per_trade,
        )?,
        commission_pct: double_or(config, "backtest", "commission_pct", defaults.commission_pct)?,
        slippage_pct: double_or(config, "backtest", "slippage_pct", defaults.slippage_pct)?,
    };
    loaded.validate().map_err(|e| in_section("backtest", e))?;
    Ok(loaded)
}

pub fn load_strategy(
    config: &dyn ConfigPort,
) -> Result<(StrategyName, StrategyParameters), TradebotError> {
    let name = match config.get_string("strategy", "name") {
        Some(raw) => StrategyName::from_str(&raw)?,
        None => StrategyName::VwapMaVolume,
    };
    Ok((name, load_strategy_parameters(config)?))
}

pub fn load_strategy_parameters(
    config: &dyn ConfigPort,
) -> Result<StrategyParameters, TradebotError> {
    const S: &str = "strategy";
    let defaults = StrategyParameters::default();
    let ind = IndicatorSettings::default();

    let position_sizing = match config.get_string(S, "position_sizing") {
        Some(raw) => PositionSizing::from_str(&raw).map_err(|e| in_section(S, e))?,
        None => defaults.position_sizing,
    };
    let trade_direction = match config.get_string(S, "direction") {
        Some(raw) => TradeDirection::from_str(&raw).map_err(|e| in_section(S, e))?,
        None => defaults.trade_direction,
    };

    let indicators = IndicatorSettings {
        vwap_period: period_or(config, S, "vwap_period", ind.vwap_period)?,
        ma_period: period_or(config, S, "ma_period", ind.ma_period)?,
        volume_period: period_or(config, S, "volume_period", ind.volume_period)?,
        volume_mult: double_or(config, S, "volume_mult", ind.volume_mult)?,
        fast_period: period_or(config, S, "fast_period", ind.fast_period)?,
        slow_period: period_or(config, S, "slow_period", ind.slow_period)?,
        rsi_period: period_or(config, S, "rsi_period", ind.rsi_period)?,
        oversold: double_or(config, S, "oversold", ind.oversold)?,
        overbought: double_or(config, S, "overbought", ind.overbought)?,
        macd_fast: period_or(config, S, "macd_fast", ind.macd_fast)?,
        macd_slow: period_or(config, S, "macd_slow", ind.macd_slow)?,
        macd_signal: period_or(config, S, "macd_signal", ind.macd_signal)?,
        bb_period: period_or(config, S, "bb_period", ind.bb_period)?,
        bb_devfactor: double_or(config, S, "bb_devfactor", ind.bb_devfactor)?,
    };

    let params = StrategyParameters {
        stop_loss_pct: double_or(config, S, "stop_loss_pct", defaults.stop_loss_pct)?,
        take_profit_pct: double_or(config, S, "take_profit_pct", defaults.take_profit_pct)?,
        risk_per_trade_pct: double_or(config, S, "risk_per_trade_pct", defaults.risk_per_trade_pct)?,
        position_sizing,
        lot_size: config.get_int(S, "lot_size")?.unwrap_or(defaults.lot_size),
        percent_of_equity: double_or(config, S, "percent_of_equity", defaults.percent_of_equity)?,
        trade_direction,
        indicators,
    };
    params.validate().map_err(|e| in_section(S, e))?;
    Ok(params)
}

pub fn load_monte_carlo_config(config: &dyn ConfigPort) -> Result<MonteCarloConfig, TradebotError> {
    let defaults = MonteCarloConfig::default();
    let simulations = match config.get_int("monte_carlo", "simulations")? {
        Some(n) if n >= 1 => n as usize,
        Some(n) => {
            return Err(out_of_range("monte_carlo", "simulations", format!("must be at least 1, got {n}")));
        }
        None => defaults.simulations,
    };
    let seed = match config.get_string("monte_carlo", "seed") {
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            out_of_range("monte_carlo", "seed", format!("expected an unsigned integer, got '{}'", raw.trim()))
        })?),
        None => defaults.seed,
    };
    Ok(MonteCarloConfig { simulations, seed })
}

pub fn load_walk_forward_config(
    config: &dyn ConfigPort,
) -> Result<WalkForwardConfig, TradebotError> {
    let defaults = WalkForwardConfig::default();
    let windows = match config.get_int("walk_forward", "windows")? {
        Some(n) if n >= 1 => n as usize,
        Some(n) => {
            return Err(out_of_range("walk_forward", "windows", format!("must be at least 1, got {n}")));
        }
        None => defaults.windows,
    };
    let loaded = WalkForwardConfig {
        windows,
        train_fraction: double_or(config, "walk_forward", "train_fraction", defaults.train_fraction)?,
    };
    loaded.validate().map_err(|e| in_section("walk_forward", e))?;
    Ok(loaded)
}

pub fn load_heatmap_axes(config: &dyn ConfigPort) -> Result<HeatmapAxes, TradebotError> {
    let axes = HeatmapAxes {
        take_profit_values: config.get_double_list("heatmap", "take_profit_values")?,
        stop_loss_values: config.get_double_list("heatmap", "stop_loss_values")?,
    };
    for (key, values) in [
        ("take_profit_values", &axes.take_profit_values),
        ("stop_loss_values", &axes.stop_loss_values),
    ] {
        if values.as_ref().is_some_and(Vec::is_empty) {
            return Err(out_of_range("heatmap", key, "must list at least one value".to_string()));
        }
    }
    Ok(axes)
}

pub fn load_paper_days(config: &dyn ConfigPort) -> Result<u32, TradebotError> {
    match config.get_int("paper", "days")? {
        None => Ok(DEFAULT_DAYS),
        Some(days) if (1..=i64::from(MAX_DAYS)).contains(&days) => Ok(days as u32),
        Some(days) => Err(out_of_range(
            "paper",
            "days",
            format!("must be between 1 and {MAX_DAYS}, got {days}"),
        )),
    }
}

pub fn load_logging_config(config: &dyn ConfigPort) -> Result<LoggingConfig, TradebotError> {
    let format = match config.get_string("logging", "format") {
        None => LogFormat::Text,
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(out_of_range(
                    "logging",
                    "format",
                    format!("expected text or json, got '{other}'"),
                ));
            }
        },
    };
    let level = config
        .get_string("logging", "level")
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    Ok(LoggingConfig { level, format })
}

/// Load every section, stopping at the first error.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), TradebotError> {
    load_backtest_config(config)?;
    load_strategy(config)?;
    load_monte_carlo_config(config)?;
    load_walk_forward_config(config)?;
    load_heatmap_axes(config)?;
    load_paper_days(config)?;
    load_logging_config(config)?;
    Ok(())
}

fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TradebotError> {
    Ok(config.get_double(section, key)?.unwrap_or(default))
}

fn period_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TradebotError> {
    match config.get_int(section, key)? {
        None => Ok(default),
        Some(n) => usize::try_from(n)
            .map_err(|_| out_of_range(section, key, format!("must not be negative, got {n}"))),
    }
}

fn out_of_range(section: &str, key: &str, reason: String) -> TradebotError {
    TradebotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

/// Report a domain validation failure against its config section.
fn in_section(section: &str, err: TradebotError) -> TradebotError {
    match err {
        TradebotError::InvalidParameters { field, reason } => TradebotError::ConfigInvalid {
            section: section.to_string(),
            key: field,
            reason,
        },
        other => other,
    }
}
