//! Take-profit by stop-loss grid search.
//!
//! Every cell is an independent simulation with all other parameters held
//! fixed. Cells run in parallel but are reported in grid order: take-profit
//! outer, stop-loss inner.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::backtest::{BacktestConfig, run_backtest};
use crate::domain::catalog::StrategyName;
use crate::domain::error::TradebotError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::{Bar, validate_series};
use crate::domain::strategy::StrategyParameters;

pub const DEFAULT_TAKE_PROFIT_VALUES: [f64; 6] = [1.0, 2.0, 4.0, 6.0, 8.0, 10.0];
pub const DEFAULT_STOP_LOSS_VALUES: [f64; 6] = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub take_profit: f64,
    pub stop_loss: f64,
    pub return_pct: f64,
    pub sharpe: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
}

impl HeatmapPoint {
    fn zeroed(take_profit: f64, stop_loss: f64) -> Self {
        HeatmapPoint {
            take_profit,
            stop_loss,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapResult {
    pub take_profit_values: Vec<f64>,
    pub stop_loss_values: Vec<f64>,
    /// Row-major: `points[tp_index * stop_loss_values.len() + sl_index]`.
    pub points: Vec<HeatmapPoint>,
    pub best_take_profit: f64,
    pub best_stop_loss: f64,
    pub best_return: f64,
    pub total_backtests: usize,
}

impl HeatmapResult {
    pub fn point(&self, tp_index: usize, sl_index: usize) -> Option<&HeatmapPoint> {
        if sl_index >= self.stop_loss_values.len() {
            return None;
        }
        self.points
            .get(tp_index * self.stop_loss_values.len() + sl_index)
    }
}

/// Grid search over take-profit and stop-loss. `None` selects the default
/// axis values.
pub fn run_heatmap(
    bars: &[Bar],
    strategy: StrategyName,
    params: &StrategyParameters,
    config: &BacktestConfig,
    take_profit_values: Option<&[f64]>,
    stop_loss_values: Option<&[f64]>,
) -> Result<HeatmapResult, TradebotError> {
    let tp_values = take_profit_values.unwrap_or(&DEFAULT_TAKE_PROFIT_VALUES[..]).to_vec();
    let sl_values = stop_loss_values.unwrap_or(&DEFAULT_STOP_LOSS_VALUES[..]).to_vec();
    if tp_values.is_empty() {
        return Err(TradebotError::invalid("take_profit_values", "must not be empty"));
    }
    if sl_values.is_empty() {
        return Err(TradebotError::invalid("stop_loss_values", "must not be empty"));
    }
    validate_series(bars)?;
    config.validate()?;

    let cells: Vec<(f64, f64)> = tp_values
        .iter()
        .flat_map(|&tp| sl_values.iter().map(move |&sl| (tp, sl)))
        .collect();

    info!(
        strategy = %strategy,
        cells = cells.len(),
        "running heatmap"
    );

    let points: Vec<HeatmapPoint> = cells
        .par_iter()
        .map(|&(tp, sl)| evaluate_cell(bars, strategy, params, config, tp, sl))
        .collect();

    let best = best_point(&points);
    let result = HeatmapResult {
        best_take_profit: best.map_or(0.0, |p| p.take_profit),
        best_stop_loss: best.map_or(0.0, |p| p.stop_loss),
        best_return: best.map_or(0.0, |p| p.return_pct),
        total_backtests: points.len(),
        take_profit_values: tp_values,
        stop_loss_values: sl_values,
        points,
    };

    info!(
        best_take_profit = result.best_take_profit,
        best_stop_loss = result.best_stop_loss,
        best_return = result.best_return,
        "heatmap complete"
    );

    Ok(result)
}

fn evaluate_cell(
    bars: &[Bar],
    strategy: StrategyName,
    params: &StrategyParameters,
    config: &BacktestConfig,
    take_profit: f64,
    stop_loss: f64,
) -> HeatmapPoint {
    let cell_params = StrategyParameters {
        take_profit_pct: take_profit,
        stop_loss_pct: stop_loss,
        ..params.clone()
    };
    match run_backtest(bars, strategy, &cell_params, config) {
        Ok(result) => {
            let metrics = Metrics::from_result(&result);
            debug!(
                take_profit,
                stop_loss,
                return_pct = metrics.total_return,
                trades = metrics.total_trades,
                "heatmap cell done"
            );
            HeatmapPoint {
                take_profit,
                stop_loss,
                return_pct: metrics.total_return,
                sharpe: metrics.sharpe_ratio,
                win_rate: metrics.win_rate,
                max_drawdown: metrics.max_drawdown,
                trade_count: metrics.total_trades,
            }
        }
        Err(err) => {
            warn!(take_profit, stop_loss, error = %err, "heatmap cell failed");
            HeatmapPoint::zeroed(take_profit, stop_loss)
        }
    }
}

/// Highest return; the first point in grid order wins ties.
pub fn best_point(points: &[HeatmapPoint]) -> Option<&HeatmapPoint> {
    let mut best: Option<&HeatmapPoint> = None;
    for point in points {
        if best.is_none_or(|b| point.return_pct > b.return_pct) {
            best = Some(point);
        }
    }
    best
}
