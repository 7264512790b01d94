//! Configuration management for BinanceWatch
//!
//! Built-in defaults overlaid with whatever the command line supplies.
//! There are no config files and no environment sources.

use config::{Config, ConfigError as SourceError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::aggregator::MAX_PRECISION;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api";
pub const DEFAULT_API_VERSION: &str = "v3";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_INTERVAL: &str = "1m";
pub const DEFAULT_PRECISION: u32 = 2;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Source(#[from] SourceError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// REST root without the version segment
    pub base_url: String,
    /// API version path segment (v3)
    pub api_version: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// Candle interval label, e.g. 1m
    pub interval: String,
    /// Fractional digits of the reported average
    pub precision: u32,
    /// Delay between polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            precision: DEFAULT_PRECISION,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Values given on the command line; `None` keeps the default
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pair: Option<String>,
    pub decimals: Option<u32>,
    pub interval: Option<String>,
}

impl AppConfig {
    /// Resolve defaults plus command line overrides
    pub fn load(overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Exchange defaults
            .set_default("exchange.base_url", DEFAULT_BASE_URL)?
            .set_default("exchange.api_version", DEFAULT_API_VERSION)?
            .set_default(
                "exchange.request_timeout_secs",
                DEFAULT_REQUEST_TIMEOUT_SECS as i64,
            )?
            // Watch defaults
            .set_default("watch.symbol", DEFAULT_SYMBOL)?
            .set_default("watch.interval", DEFAULT_INTERVAL)?
            .set_default("watch.precision", i64::from(DEFAULT_PRECISION))?
            .set_default("watch.poll_interval_ms", DEFAULT_POLL_INTERVAL_MS as i64)?
            // Command line wins
            .set_override_option("watch.symbol", overrides.pair.clone())?
            .set_override_option("watch.precision", overrides.decimals.map(i64::from))?
            .set_override_option("watch.interval", overrides.interval.clone())?
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.watch.symbol = app_config.watch.symbol.trim().to_uppercase();
        app_config.watch.interval = app_config.watch.interval.trim().to_string();
        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.symbol.is_empty() {
            return Err(ConfigError::Invalid("trading pair must not be empty".into()));
        }
        if self.watch.interval.is_empty() {
            return Err(ConfigError::Invalid("interval must not be empty".into()));
        }
        if self.watch.precision > MAX_PRECISION {
            return Err(ConfigError::Invalid(format!(
                "decimals must be at most {}, got {}",
                MAX_PRECISION, self.watch.precision
            )));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll interval must be positive".into()));
        }
        if self.exchange.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request timeout must be positive".into()));
        }
        Ok(())
    }

    /// One-line summary for logging
    pub fn digest(&self) -> String {
        format!(
            "pair={} interval={} decimals={} poll_ms={} api={}/{}",
            self.watch.symbol,
            self.watch.interval,
            self.watch.precision,
            self.watch.poll_interval_ms,
            self.exchange.base_url,
            self.exchange.api_version
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
