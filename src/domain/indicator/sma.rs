//! Simple moving averages over closes and volumes.
//!
//! SMA[i] = mean(x[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    build_series(bars, IndicatorType::Sma(period), &rolling_mean(&closes, period))
}

/// Rolling mean of bar volume, used as the "average volume" baseline.
pub fn calculate_volume_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
    build_series(
        bars,
        IndicatorType::VolumeSma(period),
        &rolling_mean(&volumes, period),
    )
}

/// Windowed mean, each window summed fresh so identical windows give
/// identical values; `None` until `period` values are seen.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            (i + 1 >= period)
                .then(|| values[i + 1 - period..=i].iter().sum::<f64>() / period as f64)
        })
        .collect()
}

pub(crate) fn build_series(
    bars: &[Bar],
    indicator_type: IndicatorType,
    raw: &[Option<f64>],
) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(raw)
        .map(|(bar, v)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: v.is_some(),
            value: IndicatorValue::Simple(v.unwrap_or(0.0)),
        })
        .collect();
    IndicatorSeries {
        indicator_type,
        values,
    }
}
