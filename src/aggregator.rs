//! Interval Aggregator - Windows repeated candle samples by interval
//!
//! Polling the klines endpoint with `limit=1` returns the same `open_time`
//! for as long as the interval is open and a new one as soon as it rolls
//! over. Equality on `open_time` is therefore the only boundary detector
//! needed; the exchange's own bucketing is authoritative.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Candle, CandleField};

/// Largest number of fractional digits a [`Decimal`] can carry
pub const MAX_PRECISION: u32 = 28;

/// Samples observed for the interval currently being tracked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowState {
    current_open_time: Option<i64>,
    samples: Vec<Candle>,
    is_new_interval: bool,
}

impl WindowState {
    /// Empty window, before the first sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of the tracked interval, `None` before the first sample
    pub fn current_open_time(&self) -> Option<i64> {
        self.current_open_time
    }

    /// Samples in arrival order
    pub fn samples(&self) -> &[Candle] {
        &self.samples
    }

    /// True only right after the sample that opened this window
    pub fn is_new_interval(&self) -> bool {
        self.is_new_interval
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&Candle> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Feed one sample into the window.
///
/// A sample whose `open_time` differs from the tracked one replaces the
/// whole window; a matching one is appended.
pub fn ingest(window: WindowState, candle: Candle) -> WindowState {
    let WindowState {
        current_open_time,
        mut samples,
        ..
    } = window;

    if current_open_time == Some(candle.open_time) {
        samples.push(candle);
        WindowState {
            current_open_time,
            samples,
            is_new_interval: false,
        }
    } else {
        WindowState {
            current_open_time: Some(candle.open_time),
            samples: vec![candle],
            is_new_interval: true,
        }
    }
}

/// Mean of `field` across the window, rounded half-to-even to `precision`
/// fractional digits. `None` for an empty window.
pub fn average(window: &WindowState, field: CandleField, precision: u32) -> Option<Decimal> {
    if window.is_empty() {
        return None;
    }

    let sum: Decimal = window.samples.iter().map(|c| c.field(field)).sum();
    let mean = sum / Decimal::from(window.samples.len());

    Some(mean.round_dp_with_strategy(
        precision.min(MAX_PRECISION),
        RoundingStrategy::MidpointNearestEven,
    ))
}
