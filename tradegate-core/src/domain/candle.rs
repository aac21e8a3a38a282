//! Candle — the fundamental intraday market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for one fixed-width intraday bucket (3 minutes by default).
///
/// Candles are immutable once appended to a session; a session is an ordered
/// slice with strictly increasing timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Returns true if any price field is not finite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= open/close/low, low <= open/close, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }
}

/// Why a candle series was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("candle series is empty")]
    Empty,

    #[error("candle {index} at {timestamp} has invalid OHLC values")]
    Insane {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("candle {index} at {timestamp} is not after the previous candle")]
    NotIncreasing {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error(
        "candle {index} at {timestamp} is off the {interval_minutes}-minute bucket grid"
    )]
    OffGrid {
        index: usize,
        timestamp: NaiveDateTime,
        interval_minutes: u32,
    },
}

/// Validate a session's candle series.
///
/// Requires a non-empty series of sane candles whose timestamps strictly
/// increase by a whole number of buckets. Gaps (missing buckets) are allowed.
pub fn validate_series(candles: &[Candle], interval_minutes: u32) -> Result<(), CandleError> {
    let first = candles.first().ok_or(CandleError::Empty)?;
    if !first.is_sane() {
        return Err(CandleError::Insane {
            index: 0,
            timestamp: first.timestamp,
        });
    }

    let bucket_secs = i64::from(interval_minutes.max(1)) * 60;
    for (index, pair) in candles.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let index = index + 1;
        if !cur.is_sane() {
            return Err(CandleError::Insane {
                index,
                timestamp: cur.timestamp,
            });
        }
        let delta = (cur.timestamp - prev.timestamp).num_seconds();
        if delta <= 0 {
            return Err(CandleError::NotIncreasing {
                index,
                timestamp: cur.timestamp,
            });
        }
        if delta % bucket_secs != 0 {
            return Err(CandleError::OffGrid {
                index,
                timestamp: cur.timestamp,
                interval_minutes,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap()
            + Duration::minutes(minute)
    }

    fn sample_candle(minute: i64) -> Candle {
        Candle {
            timestamp: at(minute),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle(0).is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut c = sample_candle(0);
        c.open = f64::NAN;
        assert!(c.is_void());
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut c = sample_candle(0);
        c.high = 97.0;
        assert!(!c.is_sane());
    }

    #[test]
    fn typical_price_is_hlc_mean() {
        let c = sample_candle(0);
        assert!((c.typical_price() - (105.0 + 98.0 + 103.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn validate_accepts_gapped_grid() {
        let candles = vec![sample_candle(0), sample_candle(3), sample_candle(9)];
        assert!(validate_series(&candles, 3).is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        assert_eq!(validate_series(&[], 3), Err(CandleError::Empty));
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let candles = vec![sample_candle(0), sample_candle(0)];
        assert!(matches!(
            validate_series(&candles, 3),
            Err(CandleError::NotIncreasing { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_off_grid() {
        let candles = vec![sample_candle(0), sample_candle(4)];
        assert!(matches!(
            validate_series(&candles, 3),
            Err(CandleError::OffGrid { index: 1, .. })
        ));
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let c = sample_candle(6);
        let json = serde_json::to_string(&c).unwrap();
        let back: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
