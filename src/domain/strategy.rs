//! Strategy parameters: risk limits, sizing, direction and indicator periods.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::error::TradebotError;
use crate::domain::position::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSizing {
    /// Always trade `lot_size` units.
    Fixed,
    /// floor(equity * percent_of_equity / 100 / price) units.
    Percent,
}

impl FromStr for PositionSizing {
    type Err = TradebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fixed_lot" => Ok(PositionSizing::Fixed),
            "percent" | "percent_of_equity" => Ok(PositionSizing::Percent),
            other => Err(TradebotError::invalid(
                "position_sizing",
                format!("expected fixed or percent, got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Long,
    Short,
    Both,
}

impl TradeDirection {
    pub fn allows(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (TradeDirection::Both, _)
                | (TradeDirection::Long, Direction::Long)
                | (TradeDirection::Short, Direction::Short)
        )
    }
}

impl FromStr for TradeDirection {
    type Err = TradebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(TradeDirection::Long),
            "short" => Ok(TradeDirection::Short),
            "both" => Ok(TradeDirection::Both),
            other => Err(TradebotError::invalid(
                "direction",
                format!("expected long, short or both, got '{}'", other),
            )),
        }
    }
}

/// Lookback periods and thresholds for every signal module.
///
/// Each module reads only the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub vwap_period: usize,
    pub ma_period: usize,
    pub volume_period: usize,
    pub volume_mult: f64,
    pub fast_period: usize,
    pub slow_period: usize,
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_devfactor: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            vwap_period: 14,
            ma_period: 200,
            volume_period: 20,
            volume_mult: 1.5,
            fast_period: 10,
            slow_period: 30,
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_devfactor: 2.0,
        }
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<(), TradebotError> {
        for (field, value) in [
            ("vwap_period", self.vwap_period),
            ("ma_period", self.ma_period),
            ("volume_period", self.volume_period),
            ("fast_period", self.fast_period),
            ("slow_period", self.slow_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bb_period", self.bb_period),
        ] {
            if value == 0 {
                return Err(TradebotError::invalid(field, "period must be at least 1"));
            }
        }
        if self.fast_period >= self.slow_period {
            return Err(TradebotError::invalid(
                "fast_period",
                "fast_period must be less than slow_period",
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(TradebotError::invalid(
                "macd_fast",
                "macd_fast must be less than macd_slow",
            ));
        }
        check_range("oversold", self.oversold, 0.0, 100.0)?;
        check_range("overbought", self.overbought, 0.0, 100.0)?;
        if self.oversold >= self.overbought {
            return Err(TradebotError::invalid(
                "oversold",
                "oversold must be below overbought",
            ));
        }
        if !(self.volume_mult > 0.0) {
            return Err(TradebotError::invalid("volume_mult", "must be positive"));
        }
        if !(self.bb_devfactor > 0.0) {
            return Err(TradebotError::invalid("bb_devfactor", "must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    /// Bounded for compatibility; sizing does not read it.
    pub risk_per_trade_pct: f64,
    pub position_sizing: PositionSizing,
    pub lot_size: i64,
    pub percent_of_equity: f64,
    pub trade_direction: TradeDirection,
    pub indicators: IndicatorSettings,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        StrategyParameters {
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
            risk_per_trade_pct: 2.0,
            position_sizing: PositionSizing::Percent,
            lot_size: 50,
            percent_of_equity: 10.0,
            trade_direction: TradeDirection::Long,
            indicators: IndicatorSettings::default(),
        }
    }
}

impl StrategyParameters {
    pub fn validate(&self) -> Result<(), TradebotError> {
        check_range("stop_loss_pct", self.stop_loss_pct, 0.1, 20.0)?;
        check_range("take_profit_pct", self.take_profit_pct, 0.1, 50.0)?;
        check_range("risk_per_trade_pct", self.risk_per_trade_pct, 0.1, 10.0)?;
        if self.lot_size < 1 {
            return Err(TradebotError::invalid("lot_size", "must be at least 1"));
        }
        check_range("percent_of_equity", self.percent_of_equity, 1.0, 100.0)?;
        self.indicators.validate()
    }

    /// Units to trade at `price` given current `equity`. Zero means skip.
    pub fn position_size(&self, equity: f64, price: f64) -> i64 {
        match self.position_sizing {
            PositionSizing::Fixed => self.lot_size,
            PositionSizing::Percent => {
                if price <= 0.0 || equity <= 0.0 {
                    return 0;
                }
                (equity * self.percent_of_equity / 100.0 / price).floor() as i64
            }
        }
    }
}

/// Inclusive bound check shared by every parameter struct.
pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), TradebotError> {
    if !value.is_finite() || value < min || value > max {
        return Err(TradebotError::invalid(
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}
