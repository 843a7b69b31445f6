//! Data access port trait.

use crate::domain::error::TradebotError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `ticker` sorted by timestamp, limited to the inclusive date
    /// range when bounds are given.
    fn fetch_bars(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, TradebotError>;

    fn list_tickers(&self) -> Result<Vec<String>, TradebotError>;
}
