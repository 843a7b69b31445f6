//! Bar-by-bar simulation engine.
//!
//! Orders are raised from a bar's close and filled when the engine steps to
//! the next bar, before that bar is evaluated. Fills use the raising bar's
//! close and timestamp. An order raised on the final bar is settled after
//! the loop. At most one order is outstanding at any time.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::domain::catalog::StrategyName;
use crate::domain::error::TradebotError;
use crate::domain::execution::{EntryResult, ExecutionConfig, enter_position, exit_position};
use crate::domain::ohlcv::{Bar, validate_series};
use crate::domain::portfolio::{EquityPoint, Portfolio};
use crate::domain::position::{Direction, ExitReason, Position, PositionState, TradeRecord};
use crate::domain::signal::{Signal, SignalGenerator, SignalModule};
use crate::domain::strategy::{StrategyParameters, check_range};

/// Account-level settings shared by every simulation of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 10_000.0,
            commission_per_trade: 1.0,
            commission_pct: 0.0,
            slippage_pct: 0.1,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), TradebotError> {
        if !self.initial_capital.is_finite() || self.initial_capital < 100.0 {
            return Err(TradebotError::invalid(
                "initial_capital",
                format!("must be at least 100, got {}", self.initial_capital),
            ));
        }
        check_range("commission_per_trade", self.commission_per_trade, 0.0, 50.0)?;
        check_range("commission_pct", self.commission_pct, 0.0, 5.0)?;
        check_range("slippage_pct", self.slippage_pct, 0.0, 5.0)?;
        Ok(())
    }

    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_per_trade: self.commission_per_trade,
            commission_pct: self.commission_pct,
            slippage_pct: self.slippage_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub initial_capital: f64,
    /// Cash plus the open position marked at the last close.
    pub final_equity: f64,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub open_position: Option<Position>,
    pub last_close: f64,
    pub last_timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum OrderIntent {
    Entry { direction: Direction, size: i64 },
    Exit(ExitReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingOrder {
    intent: OrderIntent,
    price: f64,
    timestamp: NaiveDateTime,
}

/// Run one catalog strategy over `bars`.
pub fn run_backtest(
    bars: &[Bar],
    strategy: StrategyName,
    params: &StrategyParameters,
    config: &BacktestConfig,
) -> Result<SimulationResult, TradebotError> {
    params.validate()?;
    let signals = SignalModule::build(strategy, &params.indicators, bars);
    run_with_signals(bars, &signals, params, config)
}

/// Run an arbitrary signal generator over `bars`.
pub fn run_with_signals<S: SignalGenerator + ?Sized>(
    bars: &[Bar],
    signals: &S,
    params: &StrategyParameters,
    config: &BacktestConfig,
) -> Result<SimulationResult, TradebotError> {
    params.validate()?;
    config.validate()?;
    validate_series(bars)?;

    let execution = config.execution();
    let mut portfolio = Portfolio::new(config.initial_capital);
    portfolio.record_equity(bars[0].timestamp, config.initial_capital);

    let mut pending: Option<PendingOrder> = None;

    for (index, bar) in bars.iter().enumerate() {
        if let Some(order) = pending.take() {
            fill(&mut portfolio, order, &execution);
        }
        pending = match &portfolio.position {
            Some(position) => exit_intent(position, index, bar, signals, params),
            None => entry_intent(&portfolio, index, bar, signals, params),
        };
    }
    if let Some(order) = pending.take() {
        fill(&mut portfolio, order, &execution);
    }

    // validate_series guarantees at least one bar
    let last = &bars[bars.len() - 1];
    let final_equity = portfolio.total_equity(last.close);
    if portfolio
        .equity_curve
        .last()
        .is_none_or(|p| p.timestamp != last.timestamp)
    {
        portfolio.record_equity(last.timestamp, final_equity);
    }

    debug!(
        bars = bars.len(),
        trades = portfolio.trades.len(),
        final_equity,
        "simulation complete"
    );

    Ok(SimulationResult {
        initial_capital: portfolio.initial_capital,
        final_equity,
        trades: portfolio.trades,
        equity_curve: portfolio.equity_curve,
        open_position: portfolio.position,
        last_close: last.close,
        last_timestamp: last.timestamp,
    })
}

fn entry_intent<S: SignalGenerator + ?Sized>(
    portfolio: &Portfolio,
    index: usize,
    bar: &Bar,
    signals: &S,
    params: &StrategyParameters,
) -> Option<PendingOrder> {
    let Signal::Enter(direction) =
        signals.evaluate(index, PositionState::Flat, params.trade_direction)
    else {
        return None;
    };
    let size = params.position_size(portfolio.total_equity(bar.close), bar.close);
    if size <= 0 {
        debug!(%direction, close = bar.close, "entry skipped: size resolves to zero");
        return None;
    }
    Some(PendingOrder {
        intent: OrderIntent::Entry { direction, size },
        price: bar.close,
        timestamp: bar.timestamp,
    })
}

fn exit_intent<S: SignalGenerator + ?Sized>(
    position: &Position,
    index: usize,
    bar: &Bar,
    signals: &S,
    params: &StrategyParameters,
) -> Option<PendingOrder> {
    let reason = if position.should_stop_loss(bar.close, params.stop_loss_pct) {
        ExitReason::StopLoss
    } else if position.should_take_profit(bar.close, params.take_profit_pct) {
        ExitReason::TakeProfit
    } else {
        let state = PositionState::from(Some(position.direction));
        match signals.evaluate(index, state, params.trade_direction) {
            Signal::Exit => ExitReason::Signal,
            _ => return None,
        }
    };
    Some(PendingOrder {
        intent: OrderIntent::Exit(reason),
        price: bar.close,
        timestamp: bar.timestamp,
    })
}

fn fill(portfolio: &mut Portfolio, order: PendingOrder, execution: &ExecutionConfig) {
    match order.intent {
        OrderIntent::Entry { direction, size } => {
            let result = enter_position(
                portfolio,
                direction,
                size,
                order.price,
                order.timestamp,
                execution,
            );
            if !matches!(result, EntryResult::Entered { .. }) {
                debug!(?result, "entry order rejected");
            }
        }
        OrderIntent::Exit(reason) => {
            if exit_position(portfolio, order.price, order.timestamp, reason, execution).is_some() {
                portfolio.record_equity(order.timestamp, portfolio.cash);
            }
        }
    }
}
