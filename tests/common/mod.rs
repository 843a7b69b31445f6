#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tradebot::domain::error::TradebotError;
pub use tradebot::domain::ohlcv::Bar;
use tradebot::domain::position::{Direction, ExitReason, TradeRecord};
use tradebot::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, TradebotError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TradebotError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start.is_none_or(|s| b.timestamp.date() >= s))
                    .filter(|b| end.is_none_or(|e| b.timestamp.date() <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, TradebotError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(0, 0, 0).unwrap()
}

/// One daily bar per close starting 2024-01-01, volume 1000.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = midnight(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

/// Linearly rising closes from `start_price`, one per day.
pub fn generate_bars(count: usize, start_price: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(&closes)
}

/// Oscillating closes around 100 that produce regular crossovers.
pub fn sine_bars(count: usize, amplitude: f64, period: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + amplitude * (i as f64 * std::f64::consts::TAU / period).sin())
        .collect();
    bars_from_closes(&closes)
}

pub fn trade(pnl: f64) -> TradeRecord {
    TradeRecord {
        direction: Direction::Long,
        entry_timestamp: midnight(2024, 1, 1),
        exit_timestamp: midnight(2024, 1, 2),
        entry_price: 100.0,
        exit_price: 100.0 + pnl,
        size: 1,
        pnl,
        pnl_pct: pnl,
        exit_reason: ExitReason::Signal,
    }
}

/// Write bars as `<dir>/<ticker>.csv` in the data-file layout.
pub fn write_csv(dir: &Path, ticker: &str, bars: &[Bar]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}
