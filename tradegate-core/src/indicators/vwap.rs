//! Session VWAP — cumulative(typical price × volume) / cumulative(volume).
//!
//! Anchored at the first candle of the session. Lookback: 0.
//!
//! Index symbols often report zero volume; while cumulative volume is zero the
//! value falls back to the equal-weighted mean of typical prices so far, which
//! keeps VWAP inside the session's [low, high] range.

use crate::domain::Candle;
use crate::indicators::Indicator;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = Vec::with_capacity(candles.len());
        let mut pv = 0.0;
        let mut vol = 0.0;
        let mut tp_sum = 0.0;

        for (i, candle) in candles.iter().enumerate() {
            let tp = candle.typical_price();
            let v = candle.volume as f64;
            pv += tp * v;
            vol += v;
            tp_sum += tp;

            if vol > 0.0 {
                result.push(pv / vol);
            } else {
                result.push(tp_sum / (i + 1) as f64);
            }
        }

        result
    }
}
