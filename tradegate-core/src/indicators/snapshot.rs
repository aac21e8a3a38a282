//! Indicator snapshot — the latest value of every intraday indicator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::{validate_series, Candle, TradeDirection};
use crate::error::EvalError;
use crate::indicators::{CloseSlope, Indicator, Orb, Vwap};

/// Direction of the intraday trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Indicators derived from one session's candles. Recomputed every cycle and
/// never shared across symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub vwap: f64,
    pub orb_high: f64,
    pub orb_low: f64,
    /// Cumulative session volume.
    pub volume: u64,
    pub trend: Trend,
    /// OLS slope of the last `trend_lookback` closes.
    pub close_slope: f64,
    pub last_close: f64,
    pub session_high: f64,
    pub session_low: f64,
    pub candle_count: usize,
}

impl IndicatorSnapshot {
    /// True when the opening range has been broken in the given direction.
    pub fn beyond_orb(&self, price: f64, direction: TradeDirection) -> bool {
        match direction {
            TradeDirection::Long => price > self.orb_high,
            TradeDirection::Short => price < self.orb_low,
        }
    }
}

/// Classify the trend: UP when the last close is above VWAP and the close
/// slope is positive, DOWN when mirrored, FLAT otherwise (a zero slope is FLAT).
pub fn classify_trend(last_close: f64, vwap: f64, slope: f64) -> Trend {
    if last_close > vwap && slope > 0.0 {
        Trend::Up
    } else if last_close < vwap && slope < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// Compute the indicator snapshot for a session.
///
/// Fails with `InsufficientData` when the series is invalid or shorter than
/// the opening window; callers show "indicators pending" in that case.
pub fn compute_snapshot(
    candles: &[Candle],
    config: &EngineConfig,
) -> Result<IndicatorSnapshot, EvalError> {
    validate_series(candles, config.candle_interval_minutes)?;

    let window = config.opening_window_candles;
    if candles.len() < window {
        return Err(EvalError::InsufficientData(format!(
            "market just opened: {} of {} opening-range candles, indicators pending",
            candles.len(),
            window
        )));
    }

    let vwap = Vwap::new()
        .compute(candles)
        .last()
        .copied()
        .unwrap_or(f64::NAN);
    let orb_high = Orb::high(window).bound(candles).unwrap_or(f64::NAN);
    let orb_low = Orb::low(window).bound(candles).unwrap_or(f64::NAN);

    // Short sessions fit the slope over every close available.
    let period = config.trend_lookback.min(candles.len());
    let close_slope = if period < 2 {
        0.0
    } else {
        CloseSlope::new(period)
            .compute(candles)
            .last()
            .copied()
            .unwrap_or(0.0)
    };

    let last_close = candles[candles.len() - 1].close;
    let trend = classify_trend(last_close, vwap, close_slope);

    let snapshot = IndicatorSnapshot {
        vwap,
        orb_high,
        orb_low,
        volume: candles.iter().map(|c| c.volume).sum(),
        trend,
        close_slope,
        last_close,
        session_high: candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
        session_low: candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
        candle_count: candles.len(),
    };

    debug!(
        vwap = snapshot.vwap,
        orb_high = snapshot.orb_high,
        orb_low = snapshot.orb_low,
        trend = ?snapshot.trend,
        "indicator snapshot computed"
    );

    Ok(snapshot)
}
