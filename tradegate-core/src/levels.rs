//! Support / resistance derivation.
//!
//! Candidates come from three sources:
//! - swing highs and lows (strict fractals of `swing_lookback` candles per side)
//! - the opening-range bounds
//! - classic floor pivots (P, R1, S1, R2, S2) from session high / low / last close
//!
//! Candidates below the reference price (last close) are support, above are
//! resistance. Each side is de-duplicated within `level_spacing_pct` of the
//! reference price, keeping the level nearest the price, trimmed to
//! `max_levels_per_side` and stored ascending.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::domain::Candle;
use crate::error::EvalError;
use crate::indicators::IndicatorSnapshot;

/// Support and resistance bands, both ascending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

impl LevelSet {
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }

    /// Highest support strictly below `price`.
    pub fn nearest_support(&self, price: f64) -> Option<f64> {
        self.support.iter().rev().copied().find(|&s| s < price)
    }

    /// Lowest resistance strictly above `price`.
    pub fn nearest_resistance(&self, price: f64) -> Option<f64> {
        self.resistance.iter().copied().find(|&r| r > price)
    }

    /// Levels violating `support < price < resistance`: supports at or above
    /// the price and resistances at or below it.
    pub fn stale_against(&self, price: f64) -> Vec<f64> {
        self.support
            .iter()
            .filter(|&&s| s >= price)
            .chain(self.resistance.iter().filter(|&&r| r <= price))
            .copied()
            .collect()
    }
}

/// Values of strict swing highs: high[i] above every high within `k` candles each side.
pub fn swing_highs(candles: &[Candle], k: usize) -> Vec<f64> {
    swings(candles, k, |c| c.high, |a, b| a > b)
}

/// Values of strict swing lows: low[i] below every low within `k` candles each side.
pub fn swing_lows(candles: &[Candle], k: usize) -> Vec<f64> {
    swings(candles, k, |c| c.low, |a, b| a < b)
}

fn swings(
    candles: &[Candle],
    k: usize,
    value: impl Fn(&Candle) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<f64> {
    if k == 0 || candles.len() < 2 * k + 1 {
        return Vec::new();
    }
    (k..candles.len() - k)
        .filter_map(|i| {
            let v = value(&candles[i]);
            let left = &candles[i - k..i];
            let right = &candles[i + 1..=i + k];
            let is_swing = left.iter().chain(right).all(|c| beats(v, value(c)));
            is_swing.then_some(v)
        })
        .collect()
}

/// Classic floor pivots: P, R1, S1, R2, S2.
pub fn floor_pivots(high: f64, low: f64, close: f64) -> [f64; 5] {
    let p = (high + low + close) / 3.0;
    let r1 = 2.0 * p - low;
    let s1 = 2.0 * p - high;
    let r2 = p + (high - low);
    let s2 = p - (high - low);
    [p, r1, s1, r2, s2]
}

/// Derive the level set for a session.
pub fn compute_levels(
    candles: &[Candle],
    snapshot: &IndicatorSnapshot,
    config: &EngineConfig,
) -> Result<LevelSet, EvalError> {
    if candles.len() < config.opening_window_candles {
        return Err(EvalError::InsufficientData(format!(
            "levels need {} candles, have {}",
            config.opening_window_candles,
            candles.len()
        )));
    }

    let reference = snapshot.last_close;
    let mut candidates = Vec::new();
    candidates.extend(swing_highs(candles, config.swing_lookback));
    candidates.extend(swing_lows(candles, config.swing_lookback));
    candidates.push(snapshot.orb_high);
    candidates.push(snapshot.orb_low);
    candidates.extend(floor_pivots(
        snapshot.session_high,
        snapshot.session_low,
        snapshot.last_close,
    ));

    let (below, above): (Vec<f64>, Vec<f64>) = candidates
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0 && *v != reference)
        .partition(|&v| v < reference);

    let tolerance = config.level_spacing_pct * reference;
    let support = consolidate(below, reference, tolerance, config.max_levels_per_side);
    let resistance = consolidate(above, reference, tolerance, config.max_levels_per_side);

    if support.is_empty() || resistance.is_empty() {
        return Err(EvalError::InsufficientData(format!(
            "no {} level around {reference:.2} yet",
            if support.is_empty() { "support" } else { "resistance" }
        )));
    }

    debug!(?support, ?resistance, "levels computed");
    Ok(LevelSet {
        support,
        resistance,
    })
}

/// Merge levels within `tolerance` (nearest to `reference` wins), keep the
/// `max` nearest, return ascending.
fn consolidate(mut levels: Vec<f64>, reference: f64, tolerance: f64, max: usize) -> Vec<f64> {
    levels.sort_by(|a, b| (a - reference).abs().total_cmp(&(b - reference).abs()));

    let mut kept: Vec<f64> = Vec::with_capacity(max);
    for level in levels {
        if kept.len() == max {
            break;
        }
        if kept.iter().all(|k| (k - level).abs() > tolerance) {
            kept.push(level);
        }
    }

    kept.sort_by(f64::total_cmp);
    kept
}
