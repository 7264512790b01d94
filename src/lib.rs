//! BinanceWatch Library
//!
//! Polls the latest Binance candle and reports the running average price
//! of the interval that is currently open.

pub mod aggregator;
pub mod config;
pub mod exchange;
pub mod types;
pub mod watcher;
