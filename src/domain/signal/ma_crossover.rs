//! Fast/slow simple moving average crossover.

use crate::domain::indicator::{IndicatorSeries, calculate_sma};
use crate::domain::ohlcv::Bar;
use crate::domain::position::Direction;
use crate::domain::signal::{SignalGenerator, crossed_above, crossed_below, with_prev};
use crate::domain::strategy::IndicatorSettings;

#[derive(Debug, Clone)]
pub struct MaCrossoverSignal {
    fast: IndicatorSeries,
    slow: IndicatorSeries,
}

impl MaCrossoverSignal {
    pub fn new(bars: &[Bar], settings: &IndicatorSettings) -> Self {
        MaCrossoverSignal {
            fast: calculate_sma(bars, settings.fast_period),
            slow: calculate_sma(bars, settings.slow_period),
        }
    }

    fn pair(&self, index: usize) -> Option<((f64, f64), (f64, f64))> {
        with_prev(index, |i| Some((self.fast.simple_at(i)?, self.slow.simple_at(i)?)))
    }

    fn cross_up(&self, index: usize) -> bool {
        self.pair(index).is_some_and(|(p, c)| crossed_above(p, c))
    }

    fn cross_down(&self, index: usize) -> bool {
        self.pair(index).is_some_and(|(p, c)| crossed_below(p, c))
    }
}

impl SignalGenerator for MaCrossoverSignal {
    fn long_entry(&self, index: usize) -> bool {
        self.cross_up(index)
    }

    fn short_entry(&self, index: usize) -> bool {
        self.cross_down(index)
    }

    fn structural_exit(&self, index: usize, direction: Direction) -> bool {
        match direction {
            Direction::Long => self.cross_down(index),
            Direction::Short => self.cross_up(index),
        }
    }
}
