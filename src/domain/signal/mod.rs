//! Signal modules: per-strategy entry and structural-exit rules.
//!
//! Each module precomputes its indicators once over the whole bar series and
//! then answers questions about a single bar index. Indicators are causal, so
//! looking at index `i` never sees bars after `i`. Any bar where a required
//! indicator is still warming up produces no signal.
//!
//! The simulation engine owns positions and orders; modules only report
//! intent through [`SignalGenerator::evaluate`].

pub mod bollinger;
pub mod ma_crossover;
pub mod macd;
pub mod rsi;
pub mod trend_volume;

pub use bollinger::BollingerSignal;
pub use ma_crossover::MaCrossoverSignal;
pub use macd::MacdSignal;
pub use rsi::RsiSignal;
pub use trend_volume::TrendVolumeSignal;

use crate::domain::catalog::StrategyName;
use crate::domain::ohlcv::Bar;
use crate::domain::position::{Direction, PositionState};
use crate::domain::strategy::{IndicatorSettings, TradeDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hold,
    Enter(Direction),
    Exit,
}

pub trait SignalGenerator {
    fn long_entry(&self, index: usize) -> bool;

    fn short_entry(&self, index: usize) -> bool;

    /// Strategy-specific exit for an open position. Stop-loss and
    /// take-profit are checked by the engine before this.
    fn structural_exit(&self, _index: usize, _direction: Direction) -> bool {
        false
    }

    /// Long entries take precedence when both sides are allowed.
    fn evaluate(&self, index: usize, state: PositionState, allowed: TradeDirection) -> Signal {
        match state {
            PositionState::Flat => {
                if allowed.allows(Direction::Long) && self.long_entry(index) {
                    Signal::Enter(Direction::Long)
                } else if allowed.allows(Direction::Short) && self.short_entry(index) {
                    Signal::Enter(Direction::Short)
                } else {
                    Signal::Hold
                }
            }
            PositionState::Long if self.structural_exit(index, Direction::Long) => Signal::Exit,
            PositionState::Short if self.structural_exit(index, Direction::Short) => Signal::Exit,
            _ => Signal::Hold,
        }
    }
}

/// The closed set of shipped modules.
#[derive(Debug, Clone)]
pub enum SignalModule {
    TrendVolume(TrendVolumeSignal),
    MaCrossover(MaCrossoverSignal),
    Rsi(RsiSignal),
    Macd(MacdSignal),
    Bollinger(BollingerSignal),
}

impl SignalModule {
    pub fn build(name: StrategyName, settings: &IndicatorSettings, bars: &[Bar]) -> Self {
        match name {
            StrategyName::VwapMaVolume => {
                SignalModule::TrendVolume(TrendVolumeSignal::new(bars, settings))
            }
            StrategyName::SmaCrossover => {
                SignalModule::MaCrossover(MaCrossoverSignal::new(bars, settings))
            }
            StrategyName::Rsi => SignalModule::Rsi(RsiSignal::new(bars, settings)),
            StrategyName::Macd => SignalModule::Macd(MacdSignal::new(bars, settings)),
            StrategyName::BollingerBands => {
                SignalModule::Bollinger(BollingerSignal::new(bars, settings))
            }
        }
    }

    fn inner(&self) -> &dyn SignalGenerator {
        match self {
            SignalModule::TrendVolume(s) => s,
            SignalModule::MaCrossover(s) => s,
            SignalModule::Rsi(s) => s,
            SignalModule::Macd(s) => s,
            SignalModule::Bollinger(s) => s,
        }
    }
}

impl SignalGenerator for SignalModule {
    fn long_entry(&self, index: usize) -> bool {
        self.inner().long_entry(index)
    }

    fn short_entry(&self, index: usize) -> bool {
        self.inner().short_entry(index)
    }

    fn structural_exit(&self, index: usize, direction: Direction) -> bool {
        self.inner().structural_exit(index, direction)
    }
}

/// `a` moved from at-or-below `b` to strictly above it.
pub(crate) fn crossed_above(prev: (f64, f64), cur: (f64, f64)) -> bool {
    prev.0 <= prev.1 && cur.0 > cur.1
}

/// `a` moved from at-or-above `b` to strictly below it.
pub(crate) fn crossed_below(prev: (f64, f64), cur: (f64, f64)) -> bool {
    prev.0 >= prev.1 && cur.0 < cur.1
}

/// Value pair at `index - 1` and `index`, if both exist.
pub(crate) fn with_prev<T>(index: usize, at: impl Fn(usize) -> Option<T>) -> Option<(T, T)> {
    let prev = at(index.checked_sub(1)?)?;
    Some((prev, at(index)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::daily_bars;

    struct Fixed {
        long: bool,
        short: bool,
        exit: bool,
    }

    impl SignalGenerator for Fixed {
        fn long_entry(&self, _: usize) -> bool {
            self.long
        }
        fn short_entry(&self, _: usize) -> bool {
            self.short
        }
        fn structural_exit(&self, _: usize, _: Direction) -> bool {
            self.exit
        }
    }

    #[test]
    fn long_wins_when_both_fire() {
        let g = Fixed {
            long: true,
            short: true,
            exit: false,
        };
        assert_eq!(
            g.evaluate(5, PositionState::Flat, TradeDirection::Both),
            Signal::Enter(Direction::Long)
        );
        assert_eq!(
            g.evaluate(5, PositionState::Flat, TradeDirection::Short),
            Signal::Enter(Direction::Short)
        );
    }

    #[test]
    fn direction_filter_blocks_entries() {
        let g = Fixed {
            long: false,
            short: true,
            exit: false,
        };
        assert_eq!(
            g.evaluate(5, PositionState::Flat, TradeDirection::Long),
            Signal::Hold
        );
    }

    #[test]
    fn exit_only_when_in_position() {
        let g = Fixed {
            long: true,
            short: false,
            exit: true,
        };
        assert_eq!(
            g.evaluate(5, PositionState::Long, TradeDirection::Long),
            Signal::Exit
        );
        assert_eq!(
            g.evaluate(5, PositionState::Short, TradeDirection::Both),
            Signal::Exit
        );
    }

    #[test]
    fn cross_helpers_are_strict_on_current_bar() {
        assert!(crossed_above((1.0, 1.0), (1.1, 1.0)));
        assert!(!crossed_above((1.1, 1.0), (1.2, 1.0)));
        assert!(!crossed_above((0.9, 1.0), (1.0, 1.0)));
        assert!(crossed_below((1.0, 1.0), (0.9, 1.0)));
        assert!(!crossed_below((0.9, 1.0), (0.8, 1.0)));
    }

    #[test]
    fn with_prev_needs_both_points() {
        let values = [None, Some(1.0), Some(2.0)];
        let at = |i: usize| values.get(i).copied().flatten();
        assert_eq!(with_prev(0, at), None);
        assert_eq!(with_prev(1, at), None);
        assert_eq!(with_prev(2, at), Some((1.0, 2.0)));
    }

    #[test]
    fn build_dispatches_by_name() {
        let bars = daily_bars(&[100.0; 10]);
        let settings = IndicatorSettings::default();
        for name in StrategyName::ALL {
            let module = SignalModule::build(name, &settings, &bars);
            // flat prices never cross anything
            for i in 0..bars.len() {
                assert_eq!(
                    module.evaluate(i, PositionState::Flat, TradeDirection::Both),
                    Signal::Hold
                );
            }
        }
    }
}
