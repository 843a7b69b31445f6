//! Paper-trading sessions.
//!
//! A session replays the strategy over the most recent window of bars and
//! keeps the outcome as a queryable, stoppable record. Stopping a session
//! only marks it inactive; the simulation is never re-run.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::backtest::{BacktestConfig, SimulationResult, run_backtest};
use crate::domain::catalog::StrategyName;
use crate::domain::error::TradebotError;
use crate::domain::numeric::{round_to, safe_ratio};
use crate::domain::ohlcv::{Bar, validate_series};
use crate::domain::position::{Direction, Position, TradeRecord};
use crate::domain::strategy::StrategyParameters;
use crate::ports::session_port::SessionStore;

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct PaperTradeRequest {
    pub ticker: String,
    pub strategy: StrategyName,
    /// Length of the replay window, counted back from the last bar.
    pub days: u32,
    pub params: StrategyParameters,
    pub config: BacktestConfig,
}

impl PaperTradeRequest {
    pub fn new(ticker: impl Into<String>, strategy: StrategyName) -> Self {
        PaperTradeRequest {
            ticker: ticker.into(),
            strategy,
            days: DEFAULT_DAYS,
            params: StrategyParameters::default(),
            config: BacktestConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), TradebotError> {
        if self.days < 1 || self.days > MAX_DAYS {
            return Err(TradebotError::invalid(
                "days",
                format!("must be between 1 and {}, got {}", MAX_DAYS, self.days),
            ));
        }
        if self.ticker.trim().is_empty() {
            return Err(TradebotError::invalid("ticker", "must not be empty"));
        }
        Ok(())
    }
}

/// The position still open at the end of the replay, marked at the last close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPosition {
    pub direction: Direction,
    pub size: i64,
    pub entry_price: f64,
    pub entry_timestamp: NaiveDateTime,
    pub current_price: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
}

impl CurrentPosition {
    fn mark(position: &Position, price: f64) -> Self {
        CurrentPosition {
            direction: position.direction,
            size: position.size,
            entry_price: position.entry_price,
            entry_timestamp: position.entry_timestamp,
            current_price: price,
            unrealized_pnl: round_to(position.unrealized_pnl(price), 2),
            unrealized_pnl_pct: round_to(position.unrealized_pnl_pct(price), 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub ticker: String,
    pub strategy: StrategyName,
    pub params: StrategyParameters,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub starting_capital: f64,
    /// Final equity of the replay.
    pub current_capital: f64,
    pub current_position: Option<CurrentPosition>,
    /// Sum of closed-trade P&L.
    pub realized_pnl: f64,
    /// Change in equity relative to starting capital, percent.
    pub realized_pnl_pct: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub total_trades: usize,
    pub result: SimulationResult,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
}

impl Session {
    pub fn trades(&self) -> &[TradeRecord] {
        &self.result.trades
    }

    fn from_result(
        request: &PaperTradeRequest,
        window: &[Bar],
        result: SimulationResult,
    ) -> Self {
        let current_position = result
            .open_position
            .as_ref()
            .map(|pos| CurrentPosition::mark(pos, result.last_close));
        let realized: f64 = result.trades.iter().map(|t| t.pnl).sum();
        let unrealized = current_position.as_ref().map_or(0.0, |p| p.unrealized_pnl);
        let starting = result.initial_capital;

        Session {
            id: Uuid::new_v4().to_string(),
            ticker: request.ticker.clone(),
            strategy: request.strategy,
            params: request.params.clone(),
            start: window[0].timestamp,
            end: result.last_timestamp,
            starting_capital: starting,
            current_capital: round_to(result.final_equity, 2),
            current_position,
            realized_pnl: round_to(realized, 2),
            realized_pnl_pct: round_to(
                safe_ratio(result.final_equity - starting, starting) * 100.0,
                2,
            ),
            unrealized_pnl: round_to(unrealized, 2),
            total_pnl: round_to(realized + unrealized, 2),
            total_trades: result.trades.len(),
            result,
            is_active: true,
            last_updated: Utc::now(),
        }
    }
}

/// Bars within `days` of the last bar's timestamp, inclusive.
pub fn recent_window(bars: &[Bar], days: u32) -> &[Bar] {
    let Some(last) = bars.last() else {
        return bars;
    };
    let cutoff = last.timestamp - Duration::days(i64::from(days));
    let start = bars
        .iter()
        .position(|b| b.timestamp >= cutoff)
        .unwrap_or(bars.len());
    &bars[start..]
}

/// Runs sessions and keeps them in an injected [`SessionStore`].
#[derive(Clone)]
pub struct PaperTradingManager {
    store: Arc<dyn SessionStore>,
}

impl PaperTradingManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        PaperTradingManager { store }
    }

    pub fn start(
        &self,
        request: &PaperTradeRequest,
        bars: &[Bar],
    ) -> Result<Session, TradebotError> {
        request.validate()?;
        validate_series(bars)?;

        let window = recent_window(bars, request.days);
        let result = run_backtest(window, request.strategy, &request.params, &request.config)?;
        let session = Session::from_result(request, window, result);

        info!(
            session = %session.id,
            ticker = %session.ticker,
            strategy = %session.strategy,
            bars = window.len(),
            trades = session.total_trades,
            total_pnl = session.total_pnl,
            "paper session started"
        );

        self.store.insert(session.clone());
        Ok(session)
    }

    pub fn status(&self, id: &str) -> Option<Session> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<Session> {
        self.store.list()
    }

    /// Mark a session inactive. Stopping twice is harmless.
    pub fn stop(&self, id: &str) -> Option<Session> {
        let stopped = self.store.modify(id, &mut |session| {
            session.is_active = false;
            session.last_updated = Utc::now();
        });
        if stopped.is_some() {
            info!(session = %id, "paper session stopped");
        }
        stopped
    }
}
