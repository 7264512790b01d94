//! Watcher - the polling loop
//!
//! Fetches the latest candle on a fixed cadence, feeds it through the
//! interval aggregator and hands the running average to a [`Reporter`].
//! Runs until a fetch fails or the shutdown signal fires.

mod reporter;

pub use reporter::{ConsoleReporter, Reporter, StatusReport};

use rust_decimal::Decimal;
use std::future::Future;

use crate::aggregator::{self, WindowState};
use crate::config::WatchConfig;
use crate::exchange::{CandleSource, FetchError};
use crate::types::CandleField;

/// Externally visible watcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Reporting,
    Terminated,
}

/// Why a run ended
#[derive(Debug)]
pub enum Termination {
    /// Shutdown signal received
    Cancelled,
    /// A fetch failed; the run is over
    FetchFailed(FetchError),
}

/// Owns a candle source, a reporter and the current window
pub struct Watcher<S, R> {
    source: S,
    reporter: R,
    config: WatchConfig,
    field: CandleField,
    window: WindowState,
    state: WatcherState,
}

impl<S: CandleSource, R: Reporter> Watcher<S, R> {
    pub fn new(source: S, reporter: R, config: WatchConfig) -> Self {
        Self {
            source,
            reporter,
            config,
            field: CandleField::default(),
            window: WindowState::new(),
            state: WatcherState::Reporting,
        }
    }

    /// Average a column other than the close
    pub fn with_field(mut self, field: CandleField) -> Self {
        self.field = field;
        self
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// One poll cycle: fetch, ingest, average, render
    pub async fn tick(&mut self) -> Result<Option<Decimal>, FetchError> {
        let candle = self
            .source
            .latest_candle(&self.config.symbol, &self.config.interval)
            .await?;

        let window = std::mem::take(&mut self.window);
        self.window = aggregator::ingest(window, candle);

        if let Some(latest) = self.window.latest() {
            if self.window.is_new_interval() {
                tracing::info!(
                    source = %self.source.name(),
                    symbol = %self.config.symbol,
                    interval = %self.config.interval,
                    open_time = latest.open_time,
                    opened_at = ?latest.open_datetime(),
                    "New interval started"
                );
            } else {
                tracing::debug!(
                    symbol = %self.config.symbol,
                    open_time = latest.open_time,
                    close = %latest.close,
                    samples = self.window.len(),
                    "Sample added to window"
                );
            }
        }

        let average = aggregator::average(&self.window, self.field, self.config.precision);
        if let Some(average) = average {
            let status = StatusReport {
                symbol: &self.config.symbol,
                interval: &self.config.interval,
                average,
                precision: self.config.precision,
                new_interval: self.window.is_new_interval(),
            };
            if let Err(e) = self.reporter.report(&status) {
                tracing::warn!(error = %e, "Failed to write status line");
            }
        }

        Ok(average)
    }

    /// Poll until a fetch fails or Ctrl-C is pressed
    pub async fn run(&mut self) -> Termination {
        self.run_until(ctrl_c()).await
    }

    /// Poll until a fetch fails or `shutdown` resolves
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> Termination {
        tokio::pin!(shutdown);

        tracing::info!(
            source = %self.source.name(),
            symbol = %self.config.symbol,
            interval = %self.config.interval,
            field = %self.field,
            "Watcher started"
        );

        loop {
            let fetched = tokio::select! {
                _ = &mut shutdown => None,
                result = self.tick() => Some(result),
            };
            match fetched {
                None => return self.cancel(),
                Some(Err(error)) => return self.fail(error),
                Some(Ok(_)) => {}
            }

            let stop = tokio::select! {
                _ = &mut shutdown => true,
                _ = tokio::time::sleep(self.config.poll_interval()) => false,
            };
            if stop {
                return self.cancel();
            }
        }
    }

    fn fail(&mut self, error: FetchError) -> Termination {
        self.state = WatcherState::Terminated;
        tracing::error!(
            symbol = %self.config.symbol,
            interval = %self.config.interval,
            status = ?error.status(),
            error = %error,
            "Fetch failed, stopping watcher"
        );
        if let Err(e) = self.reporter.fatal(&error) {
            tracing::warn!(error = %e, "Failed to write diagnostic");
        }
        Termination::FetchFailed(error)
    }

    fn cancel(&mut self) -> Termination {
        self.state = WatcherState::Terminated;
        tracing::info!(symbol = %self.config.symbol, "Watcher cancelled");
        if let Err(e) = self.reporter.finish() {
            tracing::warn!(error = %e, "Failed to close status line");
        }
        Termination::Cancelled
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}
