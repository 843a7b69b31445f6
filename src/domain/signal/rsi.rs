//! RSI mean reversion: buy the bounce out of oversold, sell the drop out of
//! overbought, and close when the oscillator reaches the opposite extreme.

use crate::domain::indicator::{IndicatorSeries, calculate_rsi};
use crate::domain::ohlcv::Bar;
use crate::domain::position::Direction;
use crate::domain::signal::{SignalGenerator, with_prev};
use crate::domain::strategy::IndicatorSettings;

#[derive(Debug, Clone)]
pub struct RsiSignal {
    rsi: IndicatorSeries,
    oversold: f64,
    overbought: f64,
}

impl RsiSignal {
    pub fn new(bars: &[Bar], settings: &IndicatorSettings) -> Self {
        RsiSignal {
            rsi: calculate_rsi(bars, settings.rsi_period),
            oversold: settings.oversold,
            overbought: settings.overbought,
        }
    }
}

impl SignalGenerator for RsiSignal {
    fn long_entry(&self, index: usize) -> bool {
        with_prev(index, |i| self.rsi.simple_at(i))
            .is_some_and(|(prev, cur)| prev <= self.oversold && cur > self.oversold)
    }

    fn short_entry(&self, index: usize) -> bool {
        with_prev(index, |i| self.rsi.simple_at(i))
            .is_some_and(|(prev, cur)| prev >= self.overbought && cur < self.overbought)
    }

    fn structural_exit(&self, index: usize, direction: Direction) -> bool {
        let Some(rsi) = self.rsi.simple_at(index) else {
            return false;
        };
        match direction {
            Direction::Long => rsi >= self.overbought,
            Direction::Short => rsi <= self.oversold,
        }
    }
}
