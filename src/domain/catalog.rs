//! Strategy catalog: the closed set of signal modules and their metadata.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TradebotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    VwapMaVolume,
    SmaCrossover,
    Rsi,
    Macd,
    BollingerBands,
}

impl StrategyName {
    pub const ALL: [StrategyName; 5] = [
        StrategyName::VwapMaVolume,
        StrategyName::SmaCrossover,
        StrategyName::Rsi,
        StrategyName::Macd,
        StrategyName::BollingerBands,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyName::VwapMaVolume => "vwap_ma_volume",
            StrategyName::SmaCrossover => "sma_crossover",
            StrategyName::Rsi => "rsi",
            StrategyName::Macd => "macd",
            StrategyName::BollingerBands => "bollinger_bands",
        }
    }

    pub fn info(self) -> StrategyInfo {
        match self {
            StrategyName::VwapMaVolume => StrategyInfo {
                name: self.as_str(),
                display_name: "VWAP + MA + Volume",
                description: "Trend following confirmed by above-average volume",
                indicators: &["VWAP", "SMA", "Volume SMA"],
                entry_logic: "Long when close is above VWAP and the moving average with volume above average times the multiplier; short on the mirror condition",
                exit_logic: "Stop-loss or take-profit only",
            },
            StrategyName::SmaCrossover => StrategyInfo {
                name: self.as_str(),
                display_name: "SMA Crossover",
                description: "Classic fast/slow moving average crossover",
                indicators: &["Fast SMA", "Slow SMA"],
                entry_logic: "Long when the fast SMA crosses above the slow SMA; short when it crosses below",
                exit_logic: "Opposite crossover, stop-loss or take-profit",
            },
            StrategyName::Rsi => StrategyInfo {
                name: self.as_str(),
                display_name: "RSI Mean Reversion",
                description: "Fade oversold and overbought extremes",
                indicators: &["RSI"],
                entry_logic: "Long when RSI crosses back above the oversold level; short when it crosses back below the overbought level",
                exit_logic: "RSI reaches the opposite extreme, stop-loss or take-profit",
            },
            StrategyName::Macd => StrategyInfo {
                name: self.as_str(),
                display_name: "MACD Crossover",
                description: "Momentum shifts via MACD and its signal line",
                indicators: &["MACD", "Signal line"],
                entry_logic: "Long when MACD crosses above the signal line; short when it crosses below",
                exit_logic: "Opposite crossover, stop-loss or take-profit",
            },
            StrategyName::BollingerBands => StrategyInfo {
                name: self.as_str(),
                display_name: "Bollinger Bands Reversion",
                description: "Mean reversion from the outer bands",
                indicators: &["Bollinger Bands"],
                entry_logic: "Long when close crosses below the lower band; short when close crosses above the upper band",
                exit_logic: "Close crosses the middle band, stop-loss or take-profit",
            },
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyName {
    type Err = TradebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        StrategyName::ALL
            .into_iter()
            .find(|n| n.as_str() == wanted)
            .ok_or_else(|| TradebotError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub indicators: &'static [&'static str],
    pub entry_logic: &'static str,
    pub exit_logic: &'static str,
}

/// Metadata for every available strategy, in catalog order.
pub fn list_strategies() -> Vec<StrategyInfo> {
    StrategyName::ALL.into_iter().map(StrategyName::info).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_name() {
        for name in StrategyName::ALL {
            assert_eq!(name.as_str().parse::<StrategyName>().unwrap(), name);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("RSI".parse::<StrategyName>().unwrap(), StrategyName::Rsi);
    }

    #[test]
    fn unknown_name_is_error() {
        let err = "turtle".parse::<StrategyName>().unwrap_err();
        assert!(matches!(err, TradebotError::UnknownStrategy { ref name } if name == "turtle"));
    }

    #[test]
    fn catalog_lists_five_entries() {
        let catalog = list_strategies();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[0].name, "vwap_ma_volume");
        assert!(catalog.iter().all(|info| !info.indicators.is_empty()));
    }
}
