//! Trade-order resampling ("Monte Carlo") robustness analysis.
//!
//! Each iteration shuffles the trade P&Ls and replays them as an additive
//! walk from the starting capital. The final equity is the same for every
//! ordering; only the path, and with it the drawdown, changes.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::error::TradebotError;
use crate::domain::numeric::{percentile_sorted, round_to, safe_ratio, sort_ascending};
use crate::domain::position::TradeRecord;

pub const DEFAULT_SIMULATIONS: usize = 1000;

/// Percentiles reported in the return distribution: 0, 5, ..., 100.
const DISTRIBUTION_STEP: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    /// Fixed base seed for reproducible runs; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBin {
    pub percentile: u32,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloResult {
    pub simulations: usize,
    pub trade_count: usize,
    pub median_return: f64,
    pub best_return: f64,
    pub worst_return: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub median_max_drawdown: f64,
    pub worst_max_drawdown: f64,
    pub distribution: Vec<DistributionBin>,
}

/// Outcome of replaying one ordering of the trade P&Ls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathOutcome {
    pub final_equity: f64,
    /// Percent, non-negative.
    pub max_drawdown: f64,
}

/// Walk `pnls` in order from `starting_capital`, tracking the deepest
/// decline from the running peak.
pub fn replay_path(pnls: &[f64], starting_capital: f64) -> PathOutcome {
    let mut equity = starting_capital;
    let mut peak = equity;
    let mut max_drawdown = 0.0_f64;
    for pnl in pnls {
        equity += pnl;
        peak = peak.max(equity);
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - equity) / peak * 100.0);
        }
    }
    PathOutcome {
        final_equity: equity,
        max_drawdown,
    }
}

pub fn run_monte_carlo(
    trades: &[TradeRecord],
    starting_capital: f64,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult, TradebotError> {
    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    run_monte_carlo_pnls(&pnls, starting_capital, config)
}

pub fn run_monte_carlo_pnls(
    pnls: &[f64],
    starting_capital: f64,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult, TradebotError> {
    if config.simulations == 0 {
        return Err(TradebotError::invalid("simulations", "must be at least 1"));
    }
    if !starting_capital.is_finite() || starting_capital <= 0.0 {
        return Err(TradebotError::invalid(
            "starting_capital",
            "must be positive",
        ));
    }

    info!(
        simulations = config.simulations,
        trades = pnls.len(),
        "running monte carlo"
    );

    if pnls.is_empty() {
        warn!("no trades to resample");
        return Ok(empty_result(config.simulations));
    }

    let base_seed = config.seed.unwrap_or_else(rand::random::<u64>);

    let outcomes: Vec<PathOutcome> = (0..config.simulations)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let mut shuffled = pnls.to_vec();
            shuffled.shuffle(&mut rng);
            replay_path(&shuffled, starting_capital)
        })
        .collect();

    let mut returns: Vec<f64> = outcomes
        .iter()
        .map(|o| safe_ratio(o.final_equity - starting_capital, starting_capital) * 100.0)
        .collect();
    let mut drawdowns: Vec<f64> = outcomes.iter().map(|o| o.max_drawdown).collect();
    sort_ascending(&mut returns);
    sort_ascending(&mut drawdowns);

    let result = MonteCarloResult {
        simulations: config.simulations,
        trade_count: pnls.len(),
        median_return: round_to(percentile_sorted(&returns, 50.0), 2),
        best_return: round_to(percentile_sorted(&returns, 100.0), 2),
        worst_return: round_to(percentile_sorted(&returns, 0.0), 2),
        percentile_5: round_to(percentile_sorted(&returns, 5.0), 2),
        percentile_95: round_to(percentile_sorted(&returns, 95.0), 2),
        median_max_drawdown: round_to(percentile_sorted(&drawdowns, 50.0), 2),
        worst_max_drawdown: round_to(percentile_sorted(&drawdowns, 100.0), 2),
        distribution: distribution(|pct| round_to(percentile_sorted(&returns, pct), 2)),
    };

    info!(
        median_return = result.median_return,
        worst_return = result.worst_return,
        best_return = result.best_return,
        worst_max_drawdown = result.worst_max_drawdown,
        "monte carlo complete"
    );

    Ok(result)
}

fn distribution(value_at: impl Fn(f64) -> f64) -> Vec<DistributionBin> {
    (0..=100)
        .step_by(DISTRIBUTION_STEP)
        .map(|p| DistributionBin {
            percentile: p as u32,
            label: format!("{}%", p),
            value: value_at(p as f64),
        })
        .collect()
}

fn empty_result(simulations: usize) -> MonteCarloResult {
    MonteCarloResult {
        simulations,
        trade_count: 0,
        median_return: 0.0,
        best_return: 0.0,
        worst_return: 0.0,
        percentile_5: 0.0,
        percentile_95: 0.0,
        median_max_drawdown: 0.0,
        worst_max_drawdown: 0.0,
        distribution: distribution(|_| 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn seeded(simulations: usize) -> MonteCarloConfig {
        MonteCarloConfig {
            simulations,
            seed: Some(7),
        }
    }

    #[test]
    fn return_is_order_invariant() {
        let pnls = [200.0, -100.0, 150.0, -50.0, 100.0];
        let result = run_monte_carlo_pnls(&pnls, 10_000.0, &seeded(1000)).unwrap();

        assert_eq!(result.simulations, 1000);
        assert_abs_diff_eq!(result.median_return, 3.0);
        assert_abs_diff_eq!(result.best_return, 3.0);
        assert_abs_diff_eq!(result.worst_return, 3.0);
        assert_abs_diff_eq!(result.percentile_5, 3.0);
        assert_abs_diff_eq!(result.percentile_95, 3.0);
    }

    #[test]
    fn drawdown_ordering() {
        let pnls = [500.0, -300.0, -200.0, 400.0, -600.0, 250.0];
        let result = run_monte_carlo_pnls(&pnls, 10_000.0, &seeded(500)).unwrap();
        assert!(result.median_max_drawdown >= 0.0);
        assert!(result.worst_max_drawdown >= result.median_max_drawdown);
    }

    #[test]
    fn same_seed_same_result() {
        let pnls = [50.0, -20.0, 30.0, -70.0, 10.0, 5.0];
        let a = run_monte_carlo_pnls(&pnls, 1_000.0, &seeded(200)).unwrap();
        let b = run_monte_carlo_pnls(&pnls, 1_000.0, &seeded(200)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_trade_log_reports_zeros() {
        let result = run_monte_carlo(&[], 10_000.0, &seeded(250)).unwrap();
        assert_eq!(result.simulations, 250);
        assert_eq!(result.trade_count, 0);
        assert_eq!(result.median_return, 0.0);
        assert_eq!(result.worst_max_drawdown, 0.0);
        assert!(result.distribution.iter().all(|b| b.value == 0.0));
    }

    #[test]
    fn distribution_has_21_bins() {
        let result = run_monte_carlo_pnls(&[10.0, -5.0], 1_000.0, &seeded(10)).unwrap();
        assert_eq!(result.distribution.len(), 21);
        assert_eq!(result.distribution[0].label, "0%");
        assert_eq!(result.distribution[20].percentile, 100);
    }

    #[test]
    fn zero_simulations_rejected() {
        let err = run_monte_carlo_pnls(&[1.0], 1_000.0, &seeded(0)).unwrap_err();
        assert!(matches!(err, TradebotError::InvalidParameters { .. }));
    }

    #[test]
    fn replay_tracks_peak_to_trough() {
        let outcome = replay_path(&[100.0, -220.0, 50.0], 1_000.0);
        assert_abs_diff_eq!(outcome.final_equity, 930.0);
        assert_abs_diff_eq!(outcome.max_drawdown, 20.0, epsilon = 1e-9);
    }
}
