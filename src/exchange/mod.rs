//! Exchange module - REST candle sources
//!
//! Translates symbol/interval queries into exchange requests and the
//! positional kline rows that come back into [`Candle`] records.

mod binance;
mod error;

pub use binance::{parse_kline_row, parse_klines, ExchangeClient, KLINE_COLUMNS};
pub use error::FetchError;

use crate::types::Candle;
use async_trait::async_trait;

/// Trait for latest-candle sources
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fetch the most recent candle for `symbol` at `interval`
    async fn latest_candle(&self, symbol: &str, interval: &str) -> Result<Candle, FetchError>;
}
