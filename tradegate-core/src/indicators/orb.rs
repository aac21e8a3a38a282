//! Opening Range Breakout bounds — highest high / lowest low over the first
//! `window` candles of the session.
//!
//! Produces two series (exposed as separate Indicator instances):
//! - High: max(high[0..window])
//! - Low:  min(low[0..window])
//!
//! Values are NaN until the window closes, then frozen for the rest of the
//! session: later candles never move the bounds.
//!
//! Lookback: window - 1.

use crate::domain::Candle;
use crate::indicators::Indicator;

/// Which bound of the opening range to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbBand {
    High,
    Low,
}

#[derive(Debug, Clone)]
pub struct Orb {
    window: usize,
    band: OrbBand,
    name: String,
}

impl Orb {
    pub fn high(window: usize) -> Self {
        assert!(window >= 1, "ORB window must be >= 1");
        Self {
            window,
            band: OrbBand::High,
            name: format!("orb_high_{window}"),
        }
    }

    pub fn low(window: usize) -> Self {
        assert!(window >= 1, "ORB window must be >= 1");
        Self {
            window,
            band: OrbBand::Low,
            name: format!("orb_low_{window}"),
        }
    }

    /// Opening-range bound over `candles`, or `None` while the window is still open.
    pub fn bound(&self, candles: &[Candle]) -> Option<f64> {
        if candles.len() < self.window {
            return None;
        }
        let opening = &candles[..self.window];
        Some(match self.band {
            OrbBand::High => opening
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max),
            OrbBand::Low => opening.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
        })
    }
}

impl Indicator for Orb {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        if let Some(bound) = self.bound(candles) {
            for value in result.iter_mut().skip(self.window - 1) {
                *value = bound;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn orb_high_low_over_window() {
        // highs: 11, 13, 13, 16, 21 / lows: 9, 9, 10, 10, 14
        let candles = make_candles(&[10.0, 12.0, 11.0, 15.0, 20.0]);
        let high = Orb::high(3).compute(&candles);
        let low = Orb::low(3).compute(&candles);

        assert!(high[0].is_nan());
        assert!(high[1].is_nan());
        assert_approx(high[2], 13.0, DEFAULT_EPSILON);
        assert_approx(low[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn orb_is_frozen_after_window() {
        let candles = make_candles(&[10.0, 12.0, 11.0, 15.0, 20.0]);
        let high = Orb::high(3).compute(&candles);
        // candle 4 has high 21 but the range closed at candle 2
        assert_approx(high[3], 13.0, DEFAULT_EPSILON);
        assert_approx(high[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn orb_pending_with_too_few_candles() {
        let candles = make_candles(&[10.0, 12.0]);
        assert!(Orb::high(3).bound(&candles).is_none());
        assert!(Orb::low(3).compute(&candles).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn orb_lookback() {
        assert_eq!(Orb::high(5).lookback(), 4);
        assert_eq!(Orb::low(1).lookback(), 0);
    }
}
