//! Rolling volume-weighted average price.
//!
//! VWAP[i] = Σ(close*volume) / Σvolume over the last n bars. A window with
//! zero total volume has no VWAP.

use crate::domain::indicator::sma::build_series;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_vwap(bars: &[Bar], period: usize) -> IndicatorSeries {
    let raw: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let pv_sum: f64 = window.iter().map(Bar::close_volume).sum();
            let vol_sum: f64 = window.iter().map(|b| b.volume as f64).sum();
            (vol_sum > 0.0).then(|| pv_sum / vol_sum)
        })
        .collect();
    build_series(bars, IndicatorType::Vwap(period), &raw)
}
