//! Fill simulation: slippage, commission and cash settlement.
//!
//! Entries and exits settle against the portfolio's single position slot.
//! A short escrows its entry notional; on exit the escrow comes back with
//! the price difference, so realized cash always moves by the trade's net
//! P&L over a round trip.

use chrono::NaiveDateTime;
use tracing::debug;

use super::portfolio::Portfolio;
use super::position::{Direction, ExitReason, Position, TradeRecord};

/// Cost model applied to every fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Flat amount charged per fill.
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_per_trade: 1.0,
            commission_pct: 0.0,
            slippage_pct: 0.1,
        }
    }
}

/// Calculate commission: flat_fee + (trade_value * pct / 100).
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Buying (long entry, short exit) pays up; selling receives less.
pub fn apply_slippage(market_price: f64, slippage_pct: f64, buying: bool) -> f64 {
    if buying {
        market_price * (1.0 + slippage_pct / 100.0)
    } else {
        market_price * (1.0 - slippage_pct / 100.0)
    }
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        size: i64,
        execution_price: f64,
        commission: f64,
    },
    InsufficientCapital,
    AlreadyInPosition,
}

/// Open a position of `size` units at `market_price` adjusted for slippage.
///
/// The portfolio must be flat and hold enough cash for the notional plus
/// commission; otherwise nothing changes.
pub fn enter_position(
    portfolio: &mut Portfolio,
    direction: Direction,
    size: i64,
    market_price: f64,
    timestamp: NaiveDateTime,
    config: &ExecutionConfig,
) -> EntryResult {
    if portfolio.position.is_some() {
        return EntryResult::AlreadyInPosition;
    }
    if size <= 0 {
        return EntryResult::InsufficientCapital;
    }

    let execution_price = apply_slippage(
        market_price,
        config.slippage_pct,
        direction == Direction::Long,
    );
    let notional = size as f64 * execution_price;
    let commission = calculate_commission(notional, config);

    if notional + commission > portfolio.cash {
        debug!(
            %direction,
            size,
            required = notional + commission,
            cash = portfolio.cash,
            "entry rejected: insufficient cash"
        );
        return EntryResult::InsufficientCapital;
    }

    portfolio.cash -= notional + commission;
    portfolio.position = Some(Position {
        direction,
        size,
        entry_price: execution_price,
        entry_timestamp: timestamp,
        entry_commission: commission,
    });

    debug!(%direction, size, price = execution_price, commission, %timestamp, "entry filled");

    EntryResult::Entered {
        size,
        execution_price,
        commission,
    }
}

/// Close the open position, record the trade and return it.
///
/// Returns `None` when the portfolio is flat.
pub fn exit_position(
    portfolio: &mut Portfolio,
    market_price: f64,
    timestamp: NaiveDateTime,
    reason: ExitReason,
    config: &ExecutionConfig,
) -> Option<TradeRecord> {
    let position = portfolio.position.take()?;

    let exit_price = apply_slippage(
        market_price,
        config.slippage_pct,
        position.direction == Direction::Short,
    );
    let size = position.size as f64;
    let exit_value = size * exit_price;
    let exit_commission = calculate_commission(exit_value, config);

    let price_pnl = position.direction.sign() * (exit_price - position.entry_price) * size;
    let pnl = price_pnl - position.entry_commission - exit_commission;

    match position.direction {
        Direction::Long => portfolio.cash += exit_value - exit_commission,
        Direction::Short => {
            let escrow = position.entry_notional();
            portfolio.cash += escrow + (escrow - exit_value) - exit_commission;
        }
    }

    let entry_notional = position.entry_notional();
    let pnl_pct = if entry_notional > 0.0 {
        pnl / entry_notional * 100.0
    } else {
        0.0
    };

    let trade = TradeRecord {
        direction: position.direction,
        entry_timestamp: position.entry_timestamp,
        exit_timestamp: timestamp,
        entry_price: position.entry_price,
        exit_price,
        size: position.size,
        pnl,
        pnl_pct,
        exit_reason: reason,
    };

    debug!(
        direction = %trade.direction,
        size = trade.size,
        price = exit_price,
        pnl,
        reason = ?reason,
        %timestamp,
        "exit filled"
    );

    portfolio.record_trade(trade.clone());
    Some(trade)
}
