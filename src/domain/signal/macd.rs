//! MACD line / signal line crossover.

use crate::domain::indicator::{IndicatorSeries, calculate_macd};
use crate::domain::ohlcv::Bar;
use crate::domain::position::Direction;
use crate::domain::signal::{SignalGenerator, crossed_above, crossed_below, with_prev};
use crate::domain::strategy::IndicatorSettings;

#[derive(Debug, Clone)]
pub struct MacdSignal {
    macd: IndicatorSeries,
}

impl MacdSignal {
    pub fn new(bars: &[Bar], settings: &IndicatorSettings) -> Self {
        MacdSignal {
            macd: calculate_macd(
                bars,
                settings.macd_fast,
                settings.macd_slow,
                settings.macd_signal,
            ),
        }
    }

    fn cross_up(&self, index: usize) -> bool {
        with_prev(index, |i| self.macd.macd_at(i)).is_some_and(|(p, c)| crossed_above(p, c))
    }

    fn cross_down(&self, index: usize) -> bool {
        with_prev(index, |i| self.macd.macd_at(i)).is_some_and(|(p, c)| crossed_below(p, c))
    }
}

impl SignalGenerator for MacdSignal {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::daily_bars;

    fn settings() -> IndicatorSettings {
        IndicatorSettings {
            macd_fast: 2,
            macd_slow: 3,
            macd_signal: 2,
            ..Default::default()
        }
    }

    #[test]
    fn crossover_detected_after_flat_start() {
        // flat prices keep line == signal == 0, then a jump pushes the line up
        let bars = daily_bars(&[10.0, 10.0, 10.0, 10.0, 10.0, 14.0]);
        let signal = MacdSignal::new(&bars, &settings());
        let (line, sig) = signal.macd.macd_at(5).unwrap();
        assert!(line > sig);
        assert!(signal.long_entry(5));
        assert!(signal.structural_exit(5, Direction::Short));
        assert!(!signal.short_entry(5));
    }

    #[test]
    fn crossunder_detected_after_flat_start() {
        let bars = daily_bars(&[10.0, 10.0, 10.0, 10.0, 10.0, 6.0]);
        let signal = MacdSignal::new(&bars, &settings());
        assert!(signal.short_entry(5));
        assert!(signal.structural_exit(5, Direction::Long));
    }

    #[test]
    fn warmup_is_silent() {
        let bars = daily_bars(&[10.0, 10.0, 14.0]);
        let signal = MacdSignal::new(&bars, &settings());
        assert!(!signal.long_entry(2));
    }
}
