//! Account state for a single-instrument simulation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::position::{Position, TradeRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    pub fn record_equity(&mut self, timestamp: NaiveDateTime, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }

    /// Cash plus the marked-to-market value of the open position.
    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash
            + self
                .position
                .as_ref()
                .map_or(0.0, |pos| pos.market_value(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Direction;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_portfolio() {
        let portfolio = Portfolio::new(100_000.0);
        assert!((portfolio.cash - 100_000.0).abs() < f64::EPSILON);
        assert!(portfolio.is_flat());
        assert!(portfolio.trades.is_empty());
        assert!(portfolio.equity_curve.is_empty());
    }

    #[test]
    fn total_equity_flat_is_cash() {
        let portfolio = Portfolio::new(10_000.0);
        assert!((portfolio.total_equity(123.0) - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_equity_marks_position() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.cash = 5_000.0;
        portfolio.position = Some(Position {
            direction: Direction::Long,
            size: 50,
            entry_price: 100.0,
            entry_timestamp: ts(1),
            entry_commission: 0.0,
        });
        assert!((portfolio.total_equity(110.0) - 10_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn record_equity_appends() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.record_equity(ts(2), 10_100.0);
        assert_eq!(portfolio.equity_curve.len(), 1);
        assert_eq!(portfolio.equity_curve[0].timestamp, ts(2));
    }
}
