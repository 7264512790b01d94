//! Core types used throughout BinanceWatch
//!
//! Defines the candle record returned by the exchange and the column
//! selector used by the aggregator statistics.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// One exchange-reported candle (kline)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candle {
    /// Bucket start in epoch milliseconds; identifies the interval instance
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Base asset volume
    pub volume: Decimal,
    /// Bucket end in epoch milliseconds
    pub close_time: i64,
    pub quote_asset_volume: Decimal,
    pub num_trades: u64,
    pub taker_buy_base_volume: Decimal,
    pub taker_buy_quote_volume: Decimal,
}

impl Candle {
    /// Bucket start as a UTC timestamp
    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.open_time).single()
    }

    /// Read one decimal column
    pub fn field(&self, field: CandleField) -> Decimal {
        match field {
            CandleField::Open => self.open,
            CandleField::High => self.high,
            CandleField::Low => self.low,
            CandleField::Close => self.close,
            CandleField::Volume => self.volume,
            CandleField::QuoteAssetVolume => self.quote_asset_volume,
            CandleField::TakerBuyBaseVolume => self.taker_buy_base_volume,
            CandleField::TakerBuyQuoteVolume => self.taker_buy_quote_volume,
        }
    }
}

/// Decimal candle column a statistic can be computed over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CandleField {
    Open,
    High,
    Low,
    #[default]
    Close,
    Volume,
    QuoteAssetVolume,
    TakerBuyBaseVolume,
    TakerBuyQuoteVolume,
}

impl fmt::Display for CandleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleField::Open => write!(f, "open"),
            CandleField::High => write!(f, "high"),
            CandleField::Low => write!(f, "low"),
            CandleField::Close => write!(f, "close"),
            CandleField::Volume => write!(f, "volume"),
            CandleField::QuoteAssetVolume => write!(f, "asset_volume"),
            CandleField::TakerBuyBaseVolume => write!(f, "taker_buy_vol_base"),
            CandleField::TakerBuyQuoteVolume => write!(f, "taker_buy_vol_asset"),
        }
    }
}
