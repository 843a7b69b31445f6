//! Bollinger band mean reversion.
//!
//! Entry when the close pushes through an outer band, exit when it crosses
//! back over the middle band. The previous close is compared against the
//! current bar's bands.

use crate::domain::indicator::bollinger::mult_to_x100;
use crate::domain::indicator::{IndicatorSeries, calculate_bollinger};
use crate::domain::ohlcv::Bar;
use crate::domain::position::Direction;
use crate::domain::signal::SignalGenerator;
use crate::domain::strategy::IndicatorSettings;

#[derive(Debug, Clone)]
pub struct BollingerSignal {
    closes: Vec<f64>,
    bands: IndicatorSeries,
}

struct Frame {
    prev_close: f64,
    close: f64,
    upper: f64,
    middle: f64,
    lower: f64,
}

impl BollingerSignal {
    pub fn new(bars: &[Bar], settings: &IndicatorSettings) -> Self {
        BollingerSignal {
            closes: bars.iter().map(|b| b.close).collect(),
            bands: calculate_bollinger(bars, settings.bb_period, mult_to_x100(settings.bb_devfactor)),
        }
    }

    fn frame(&self, index: usize) -> Option<Frame> {
        let (upper, middle, lower) = self.bands.bollinger_at(index)?;
        Some(Frame {
            prev_close: *self.closes.get(index.checked_sub(1)?)?,
            close: *self.closes.get(index)?,
            upper,
            middle,
            lower,
        })
    }
}

impl SignalGenerator for BollingerSignal {
    fn long_entry(&self, index: usize) -> bool {
        self.frame(index)
            .is_some_and(|f| f.close <= f.lower && f.prev_close > f.lower)
    }

    fn short_entry(&self, index: usize) -> bool {
        self.frame(index)
            .is_some_and(|f| f.close >= f.upper && f.prev_close < f.upper)
    }

    fn structural_exit(&self, index: usize, direction: Direction) -> bool {
        self.frame(index).is_some_and(|f| match direction {
            Direction::Long => f.close >= f.middle && f.prev_close < f.middle,
            Direction::Short => f.close <= f.middle && f.prev_close > f.middle,
        })
    }
}
