//! Intraday indicator implementations.
//!
//! Every series indicator implements [`Indicator`]: candle history in, one
//! value per candle out, NaN during warm-up. [`compute_snapshot`] reads the
//! latest value of each series into an [`IndicatorSnapshot`].
//!
//! ORB is exposed as two named instances (high and low band), keeping the
//! single-series trait unchanged.

pub mod orb;
pub mod slope;
pub mod snapshot;
pub mod vwap;

pub use orb::{Orb, OrbBand};
pub use slope::CloseSlope;
pub use snapshot::{compute_snapshot, IndicatorSnapshot, Trend};
pub use vwap::Vwap;

use crate::domain::Candle;

/// Trait for series indicators.
///
/// # Look-ahead contamination guard
/// No value at candle t may depend on candle t+1 or later. Every indicator
/// must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "vwap", "orb_high_5").
    fn name(&self) -> &str;

    /// Number of candles needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole series.
    ///
    /// Returns a `Vec<f64>` of the same length as `candles`; the first
    /// `lookback()` values are `f64::NAN`.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Create synthetic 3-minute candles from close prices for testing.
///
/// open = prev close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let session_open = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: session_open + chrono::Duration::minutes(3 * i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
