//! Trend plus volume confirmation (VWAP, long moving average, volume spike).
//!
//! No structural exit: positions close on stop-loss or take-profit only.

use crate::domain::indicator::{
    IndicatorSeries, calculate_sma, calculate_volume_sma, calculate_vwap,
};
use crate::domain::ohlcv::Bar;
use crate::domain::signal::SignalGenerator;
use crate::domain::strategy::IndicatorSettings;

#[derive(Debug, Clone)]
pub struct TrendVolumeSignal {
    closes: Vec<f64>,
    volumes: Vec<f64>,
    vwap: IndicatorSeries,
    ma: IndicatorSeries,
    volume_avg: IndicatorSeries,
    volume_mult: f64,
}

struct Snapshot {
    close: f64,
    volume: f64,
    vwap: f64,
    ma: f64,
    volume_avg: f64,
}

impl TrendVolumeSignal {
    pub fn new(bars: &[Bar], settings: &IndicatorSettings) -> Self {
        TrendVolumeSignal {
            closes: bars.iter().map(|b| b.close).collect(),
            volumes: bars.iter().map(|b| b.volume as f64).collect(),
            vwap: calculate_vwap(bars, settings.vwap_period),
            ma: calculate_sma(bars, settings.ma_period),
            volume_avg: calculate_volume_sma(bars, settings.volume_period),
            volume_mult: settings.volume_mult,
        }
    }

    fn snapshot(&self, index: usize) -> Option<Snapshot> {
        Some(Snapshot {
            close: *self.closes.get(index)?,
            volume: *self.volumes.get(index)?,
            vwap: self.vwap.simple_at(index)?,
            ma: self.ma.simple_at(index)?,
            volume_avg: self.volume_avg.simple_at(index)?,
        })
    }

    fn volume_spike(&self, s: &Snapshot) -> bool {
        s.volume > s.volume_avg * self.volume_mult
    }
}

impl SignalGenerator for TrendVolumeSignal {
    fn long_entry(&self, index: usize) -> bool {
        self.snapshot(index)
            .is_some_and(|s| s.close > s.vwap && s.close > s.ma && self.volume_spike(&s))
    }

    fn short_entry(&self, index: usize) -> bool {
        self.snapshot(index)
            .is_some_and(|s| s.close < s.vwap && s.close < s.ma && self.volume_spike(&s))
    }
}
