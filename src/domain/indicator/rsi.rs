//! Relative Strength Index with Wilder smoothing.
//!
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), and 100 when avg_loss == 0.
//! Warmup: first n bars are invalid (n changes are needed for the seed).

use crate::domain::indicator::sma::build_series;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut raw = vec![None; bars.len()];
    if period > 0 && bars.len() > period {
        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();
        let gain = |c: f64| c.max(0.0);
        let loss = |c: f64| (-c).max(0.0);

        let mut avg_gain = changes[..period].iter().copied().map(gain).sum::<f64>() / period as f64;
        let mut avg_loss = changes[..period].iter().copied().map(loss).sum::<f64>() / period as f64;
        raw[period] = Some(rsi_value(avg_gain, avg_loss));

        let n = period as f64;
        for (i, &change) in changes.iter().enumerate().skip(period) {
            avg_gain = (avg_gain * (n - 1.0) + gain(change)) / n;
            avg_loss = (avg_loss * (n - 1.0) + loss(change)) / n;
            raw[i + 1] = Some(rsi_value(avg_gain, avg_loss));
        }
    }
    build_series(bars, IndicatorType::Rsi(period), &raw)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::daily_bars;

    #[test]
    fn rsi_empty_bars() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&daily_bars(&closes), 14);

        assert_eq!(series.len(), 15);
        for i in 0..14 {
            assert!(!series.values[i].valid, "Bar {} should be invalid", i);
        }
        assert!(series.values[14].valid);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&daily_bars(&closes), 14);
        assert!((series.simple_at(14).unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&daily_bars(&closes), 14);
        assert!(series.simple_at(14).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        // period 2: changes +2, -1, +3
        let series = calculate_rsi(&daily_bars(&[10.0, 12.0, 11.0, 14.0]), 2);
        // seed: gain 1.0, loss 0.5 -> rs 2 -> 66.67
        let seed = series.simple_at(2).unwrap();
        assert!((seed - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
        // next: gain (1*1+3)/2 = 2, loss (0.5*1+0)/2 = 0.25 -> rs 8
        let next = series.simple_at(3).unwrap();
        assert!((next - (100.0 - 100.0 / 9.0)).abs() < 1e-9);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let series = calculate_rsi(&daily_bars(&closes), 14);
        for i in 0..series.len() {
            if let Some(rsi) = series.simple_at(i) {
                assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
            }
        }
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&daily_bars(&[100.0, 101.0]), 0);
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_valid(), None);
    }
}
