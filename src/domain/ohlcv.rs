//! OHLCV bar representation and series validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::TradebotError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// close * volume, the numerator term of a volume-weighted price.
    pub fn close_volume(&self) -> f64 {
        self.close * self.volume as f64
    }
}

/// Check the bar-series contract: at least one bar and strictly increasing
/// timestamps.
pub fn validate_series(bars: &[Bar]) -> Result<(), TradebotError> {
    if bars.is_empty() {
        return Err(TradebotError::EmptySeries);
    }
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(TradebotError::UnorderedSeries { index: i + 1 });
        }
    }
    Ok(())
}

/// Closing prices of a bar slice.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Daily bars starting 2024-01-01 with flat OHLC at each close and volume 1000.
#[cfg(test)]
pub(crate) fn daily_bars(closes: &[f64]) -> Vec<Bar> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar_at(hour: u32, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 500,
        }
    }

    #[test]
    fn close_volume() {
        let bar = bar_at(10, 20.0);
        assert!((bar.close_volume() - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_series_rejected() {
        assert!(matches!(validate_series(&[]), Err(TradebotError::EmptySeries)));
    }

    #[test]
    fn single_bar_is_valid() {
        assert!(validate_series(&[bar_at(9, 100.0)]).is_ok());
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let bars = vec![bar_at(9, 100.0), bar_at(10, 101.0), bar_at(10, 102.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(TradebotError::UnorderedSeries { index: 2 })
        ));
    }

    #[test]
    fn out_of_order_rejected() {
        let bars = vec![bar_at(11, 100.0), bar_at(10, 101.0)];
        assert!(matches!(
            validate_series(&bars),
            Err(TradebotError::UnorderedSeries { index: 1 })
        ));
    }

    #[test]
    fn closes_extracts_close_prices() {
        let bars = vec![bar_at(9, 1.0), bar_at(10, 2.0)];
        assert_eq!(closes(&bars), vec![1.0, 2.0]);
    }
}
