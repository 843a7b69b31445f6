//! Rolling-window ("walk-forward") consistency analysis.
//!
//! The series is cut into contiguous windows, each split into a training and
//! a held-out test segment. A window's return is the plain close-to-close
//! price change over its test segment. This is a cheap proxy: it does not
//! replay the strategy, so results will differ from a true walk-forward
//! backtest.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::error::TradebotError;
use crate::domain::numeric::{round_to, safe_ratio};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_WINDOWS: usize = 5;
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
pub const MIN_BARS_PER_WINDOW: usize = 10;
pub const MIN_TEST_BARS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardConfig {
    pub windows: usize,
    pub train_fraction: f64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        WalkForwardConfig {
            windows: DEFAULT_WINDOWS,
            train_fraction: DEFAULT_TRAIN_FRACTION,
        }
    }
}

impl WalkForwardConfig {
    pub fn validate(&self) -> Result<(), TradebotError> {
        if self.windows == 0 {
            return Err(TradebotError::invalid("windows", "must be at least 1"));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(TradebotError::invalid(
                "train_fraction",
                format!("must be strictly between 0 and 1, got {}", self.train_fraction),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkForwardWindow {
    /// 1-based position among all windows, including skipped ones.
    pub index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Absent when the training segment is empty.
    pub train_end: Option<NaiveDateTime>,
    pub test_start: NaiveDateTime,
    pub train_size: usize,
    pub test_size: usize,
    pub return_pct: f64,
    pub profitable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkForwardResult {
    pub windows: Vec<WalkForwardWindow>,
    pub completed_windows: usize,
    pub profitable_windows: usize,
    /// Percent of completed windows that were profitable.
    pub consistency: f64,
    pub avg_return: f64,
    pub train_fraction: f64,
}

impl WalkForwardResult {
    fn empty(train_fraction: f64) -> Self {
        WalkForwardResult {
            windows: Vec::new(),
            completed_windows: 0,
            profitable_windows: 0,
            consistency: 0.0,
            avg_return: 0.0,
            train_fraction,
        }
    }
}

pub fn run_walk_forward(
    bars: &[Bar],
    config: &WalkForwardConfig,
) -> Result<WalkForwardResult, TradebotError> {
    config.validate()?;

    let minimum = config.windows * MIN_BARS_PER_WINDOW;
    if bars.len() < minimum {
        warn!(bars = bars.len(), minimum, "insufficient data for walk-forward");
        return Ok(WalkForwardResult::empty(config.train_fraction));
    }

    let window_size = bars.len() / config.windows;
    info!(
        bars = bars.len(),
        windows = config.windows,
        window_size,
        "running walk-forward"
    );

    let mut windows = Vec::new();
    let mut total_return = 0.0;
    for i in 0..config.windows {
        let start = i * window_size;
        let end = if i + 1 < config.windows {
            start + window_size
        } else {
            bars.len()
        };
        if let Some((window, raw_return)) =
            evaluate_window(i + 1, &bars[start..end], config.train_fraction)
        {
            total_return += raw_return;
            windows.push(window);
        }
    }

    let completed = windows.len();
    let profitable = windows.iter().filter(|w| w.profitable).count();

    let result = WalkForwardResult {
        completed_windows: completed,
        profitable_windows: profitable,
        consistency: round_to(safe_ratio(profitable as f64, completed as f64) * 100.0, 1),
        avg_return: round_to(safe_ratio(total_return, completed as f64), 2),
        train_fraction: config.train_fraction,
        windows,
    };

    info!(
        completed,
        profitable,
        consistency = result.consistency,
        avg_return = result.avg_return,
        "walk-forward complete"
    );

    Ok(result)
}

/// The window summary plus its unrounded return.
fn evaluate_window(
    index: usize,
    window: &[Bar],
    train_fraction: f64,
) -> Option<(WalkForwardWindow, f64)> {
    let train_size = (window.len() as f64 * train_fraction).floor() as usize;
    let test_size = window.len().saturating_sub(train_size);
    if test_size < MIN_TEST_BARS {
        warn!(window = index, test_size, "test segment too small, skipping");
        return None;
    }

    let test = &window[train_size..];
    let first_close = test[0].close;
    let last_close = test[test.len() - 1].close;
    if first_close <= 0.0 {
        warn!(window = index, first_close, "invalid first close, skipping");
        return None;
    }

    let return_pct = (last_close - first_close) / first_close * 100.0;

    let summary = WalkForwardWindow {
        index,
        start: window[0].timestamp,
        end: window[window.len() - 1].timestamp,
        train_end: train_size.checked_sub(1).map(|i| window[i].timestamp),
        test_start: test[0].timestamp,
        train_size,
        test_size,
        return_pct: round_to(return_pct, 2),
        profitable: return_pct > 0.0,
    };
    Some((summary, return_pct))
}
