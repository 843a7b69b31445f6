//! Performance metrics derived from a trade log and equity trajectory.
//!
//! Reported values are rounded for display: percentages and ratios to two
//! decimals, win rate to one. Every ratio with a zero denominator is 0.

use serde::Serialize;

use super::backtest::SimulationResult;
use super::numeric::{mean, round_to, safe_ratio, sample_stddev};
use super::portfolio::EquityPoint;
use super::position::TradeRecord;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Percent.
    pub total_return: f64,
    pub win_rate: f64,
    /// Percent, reported as a non-positive number.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub profit_factor: f64,
    pub risk_reward_ratio: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub best_streak: usize,
    pub worst_streak: usize,
}

impl Metrics {
    pub fn compute(
        initial_capital: f64,
        final_capital: f64,
        trades: &[TradeRecord],
        equity_curve: &[EquityPoint],
    ) -> Self {
        let total_return = safe_ratio(final_capital - initial_capital, initial_capital) * 100.0;

        if trades.is_empty() {
            return Metrics {
                total_return: round_to(total_return, 2),
                ..Default::default()
            };
        }

        let (wins, losses): (Vec<f64>, Vec<f64>) =
            trades.iter().map(|t| t.pnl).partition(|pnl| *pnl > 0.0);

        let gross_profit: f64 = wins.iter().sum();
        let gross_loss = losses.iter().sum::<f64>().abs();
        let avg_win = mean(&wins);
        let avg_loss = mean(&losses).abs();
        let largest_win = wins.iter().copied().fold(0.0, f64::max);
        let largest_loss = losses.iter().copied().fold(0.0, f64::min).abs();

        let (best_streak, worst_streak) = compute_streaks(trades);

        Metrics {
            total_return: round_to(total_return, 2),
            win_rate: round_to(safe_ratio(wins.len() as f64, trades.len() as f64) * 100.0, 1),
            max_drawdown: round_to(-compute_max_drawdown(equity_curve, initial_capital), 2),
            sharpe_ratio: round_to(compute_sharpe(equity_curve), 2),
            total_trades: trades.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            profit_factor: round_to(safe_ratio(gross_profit, gross_loss), 2),
            risk_reward_ratio: round_to(safe_ratio(avg_win, avg_loss), 2),
            avg_win: round_to(avg_win, 2),
            avg_loss: round_to(avg_loss, 2),
            largest_win: round_to(largest_win, 2),
            largest_loss: round_to(largest_loss, 2),
            best_streak,
            worst_streak,
        }
    }

    pub fn from_result(result: &SimulationResult) -> Self {
        Metrics::compute(
            result.initial_capital,
            result.final_equity,
            &result.trades,
            &result.equity_curve,
        )
    }
}

/// Largest peak-to-trough decline in percent, as a positive number. The
/// running peak starts at `initial_capital`.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint], initial_capital: f64) -> f64 {
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        peak = peak.max(point.equity);
        max_dd = max_dd.max(safe_ratio(peak - point.equity, peak) * 100.0);
    }
    max_dd
}

/// Drawdown at every equity point, as non-positive percentages.
pub fn drawdown_curve(equity_curve: &[EquityPoint], initial_capital: f64) -> Vec<EquityPoint> {
    let mut peak = initial_capital;
    equity_curve
        .iter()
        .map(|point| {
            peak = peak.max(point.equity);
            EquityPoint {
                timestamp: point.timestamp,
                equity: -(safe_ratio(peak - point.equity, peak) * 100.0),
            }
        })
        .collect()
}

/// Annualized Sharpe of point-to-point equity changes, zero risk-free rate.
fn compute_sharpe(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| safe_ratio(w[1].equity - w[0].equity, w[0].equity))
        .collect();
    safe_ratio(mean(&returns), sample_stddev(&returns)) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Longest runs of winning (pnl > 0) and non-winning trades.
fn compute_streaks(trades: &[TradeRecord]) -> (usize, usize) {
    let mut best = 0;
    let mut worst = 0;
    let mut wins = 0;
    let mut losses = 0;
    for trade in trades {
        if trade.pnl > 0.0 {
            wins += 1;
            losses = 0;
            best = best.max(wins);
        } else {
            losses += 1;
            wins = 0;
            worst = worst.max(losses);
        }
    }
    (best, worst)
}
