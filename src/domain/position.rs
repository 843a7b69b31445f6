//! Position tracking and closed-trade records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// What the engine is holding right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

impl From<Option<Direction>> for PositionState {
    fn from(direction: Option<Direction>) -> Self {
        match direction {
            None => PositionState::Flat,
            Some(Direction::Long) => PositionState::Long,
            Some(Direction::Short) => PositionState::Short,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub size: i64,
    pub entry_price: f64,
    pub entry_timestamp: NaiveDateTime,
    pub entry_commission: f64,
}

impl Position {
    pub fn entry_notional(&self) -> f64 {
        self.size as f64 * self.entry_price
    }

    /// Cash value of the position if it were closed at `price` before costs.
    ///
    /// A short holds its entry notional in escrow, so its value is the
    /// escrow plus the price difference.
    pub fn market_value(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => self.size as f64 * price,
            Direction::Short => self.size as f64 * (2.0 * self.entry_price - price),
        }
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.size as f64
    }

    /// Unrealized P&L as a percentage of the entry price.
    pub fn unrealized_pnl_pct(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.direction.sign() * (price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn should_stop_loss(&self, price: f64, stop_loss_pct: f64) -> bool {
        self.unrealized_pnl_pct(price) <= -stop_loss_pct
    }

    pub fn should_take_profit(&self, price: f64, take_profit_pct: f64) -> bool {
        self.unrealized_pnl_pct(price) >= take_profit_pct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: Direction,
    pub entry_timestamp: NaiveDateTime,
    pub exit_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: i64,
    /// Net of entry and exit commission.
    pub pnl: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
}
