//! Binance REST client for kline (candlestick) data
//!
//! Queries the spot klines endpoint and converts its positional rows into
//! candles. Endpoint documented at:
//! https://github.com/binance/binance-spot-api-docs/blob/master/rest-api.md

use async_trait::async_trait;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Duration;

use crate::config::ExchangeConfig;
use crate::exchange::{CandleSource, FetchError};
use crate::types::Candle;

/// Column order of a kline row, as listed in the exchange docs
pub const KLINE_COLUMNS: [&str; 12] = [
    "open_time",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "close_time",
    "asset_volume",
    "num_trades",
    "taker_buy_vol_base",
    "taker_buy_vol_asset",
    "ignore",
];

/// Error bodies are cut to this many characters in diagnostics
const MAX_ERROR_BODY_CHARS: usize = 256;

/// REST client for the Binance spot API
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    client: Client,
    base_url: String,
}

impl ExchangeClient {
    /// Create a new client for `{base_url}/{api_version}`
    pub fn new(config: &ExchangeConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("binancewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                config.api_version.trim_matches('/')
            ),
        })
    }

    /// Versioned API root every endpoint hangs off
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/{action}?k=v&...` with the parameters query-encoded in order
    pub fn endpoint_url(&self, action: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        Url::parse_with_params(&format!("{}/{}", self.base_url, action), params)
            .map_err(|e| FetchError::InvalidUrl(format!("{}/{}: {}", self.base_url, action, e)))
    }

    /// URL for the newest `limit` klines of a symbol
    pub fn klines_url(&self, symbol: &str, interval: &str, limit: u16) -> Result<Url, FetchError> {
        self.endpoint_url(
            "klines",
            &[
                ("symbol", symbol.trim().to_uppercase()),
                ("interval", interval.trim().to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    /// Fetch the newest `limit` klines, oldest first
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>, FetchError> {
        let url = self.klines_url(symbol, interval, limit)?;

        tracing::debug!(
            symbol = %symbol,
            interval = %interval,
            url = %url,
            "Fetching klines from Binance"
        );

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        parse_klines(&body)
    }
}

#[async_trait]
impl CandleSource for ExchangeClient {
    fn name(&self) -> &'static str {
        "Binance"
    }

    async fn latest_candle(&self, symbol: &str, interval: &str) -> Result<Candle, FetchError> {
        self.fetch_klines(symbol, interval, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(FetchError::Empty)
    }
}

/// Parse a klines payload: a JSON array of 12-column arrays
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, FetchError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter().map(|row| parse_kline_row(row)).collect()
}

/// Parse one positional kline row
pub fn parse_kline_row(row: &[Value]) -> Result<Candle, FetchError> {
    if row.len() != KLINE_COLUMNS.len() {
        return Err(FetchError::MalformedCandle(format!(
            "expected {} columns, got {}",
            KLINE_COLUMNS.len(),
            row.len()
        )));
    }

    Ok(Candle {
        open_time: int_column(row, 0)?,
        open: decimal_column(row, 1)?,
        high: decimal_column(row, 2)?,
        low: decimal_column(row, 3)?,
        close: decimal_column(row, 4)?,
        volume: decimal_column(row, 5)?,
        close_time: int_column(row, 6)?,
        quote_asset_volume: decimal_column(row, 7)?,
        num_trades: row[8].as_u64().ok_or_else(|| malformed(row, 8))?,
        taker_buy_base_volume: decimal_column(row, 9)?,
        taker_buy_quote_volume: decimal_column(row, 10)?,
    })
}

fn int_column(row: &[Value], idx: usize) -> Result<i64, FetchError> {
    row[idx].as_i64().ok_or_else(|| malformed(row, idx))
}

// Prices and quantities arrive as strings to keep their exact digits;
// bare JSON numbers are accepted too.
fn decimal_column(row: &[Value], idx: usize) -> Result<Decimal, FetchError> {
    let parsed = match &row[idx] {
        Value::String(s) => s.parse::<Decimal>().ok(),
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(row, idx))
}

fn malformed(row: &[Value], idx: usize) -> FetchError {
    FetchError::MalformedCandle(format!(
        "column {} ({}) has unexpected value {}",
        idx, KLINE_COLUMNS[idx], row[idx]
    ))
}
