//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) inputs are invalid.

use crate::domain::indicator::sma::build_series;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    build_series(bars, IndicatorType::Ema(period), &ema_of(&closes, period))
}

/// EMA over an arbitrary sequence whose leading entries may be missing.
///
/// The seed is the mean of the first `period` present values; missing
/// entries before that point are skipped, and any later gap yields `None`.
pub(crate) fn ema_of_optional(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut seen = 0usize;
    let mut sum = 0.0;
    let mut ema: Option<f64> = None;

    for (i, v) in values.iter().enumerate() {
        let Some(x) = *v else {
            if ema.is_some() {
                ema = None;
                seen = 0;
                sum = 0.0;
            }
            continue;
        };
        match ema {
            Some(prev) => {
                let next = x * k + prev * (1.0 - k);
                ema = Some(next);
                out[i] = ema;
            }
            None => {
                seen += 1;
                sum += x;
                if seen == period {
                    ema = Some(sum / period as f64);
                    out[i] = ema;
                }
            }
        }
    }
    out
}

pub(crate) fn ema_of(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema_of_optional(&wrapped, period)
}
