//! Deterministic synthetic sessions for demos, tests and benchmarks.
//!
//! Each symbol gets its own random walk seeded from a BLAKE3 hash of the
//! symbol and session date, so the same symbol always produces the same
//! session on the same day. Never a substitute for real data: output is
//! tagged by the provider name `synthetic`.

use chrono::{NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tradegate_core::domain::Candle;
use tradegate_core::provider::{DataError, MarketDataProvider, MarketSnapshot, SentimentProvider};

#[derive(Debug, Clone)]
pub struct SyntheticMarketData {
    date: NaiveDate,
    /// Candles generated per session so far.
    candles: usize,
    interval_minutes: u32,
}

impl SyntheticMarketData {
    pub fn new(date: NaiveDate, candles: usize, interval_minutes: u32) -> Self {
        Self {
            date,
            candles,
            interval_minutes: interval_minutes.max(1),
        }
    }

    fn rng(&self, symbol: &str, salt: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(self.date.to_string().as_bytes());
        hasher.update(salt.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Generate the session for `symbol`.
    pub fn session(&self, symbol: &str) -> Vec<Candle> {
        let mut rng = self.rng(symbol, "candles");
        let open_time = self
            .date
            .and_time(NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default());

        let mut price: f64 = rng.gen_range(80.0..2_500.0);
        let drift: f64 = rng.gen_range(-0.0008..0.0008);
        let base_volume: u64 = rng.gen_range(5_000..200_000);

        (0..self.candles)
            .map(|i| {
                let step: f64 = drift + rng.gen_range(-0.002..0.002);
                let open = price;
                let close = (price * (1.0 + step)).max(1.0);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.0015));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.0015));
                price = close;
                Candle {
                    timestamp: open_time
                        + chrono::Duration::minutes(i as i64 * i64::from(self.interval_minutes)),
                    open,
                    high,
                    low,
                    close,
                    volume: base_volume + rng.gen_range(0..base_volume),
                }
            })
            .collect()
    }
}

impl MarketDataProvider for SyntheticMarketData {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot, DataError> {
        let candles = self.session(symbol);
        if candles.is_empty() {
            return Err(DataError::InsufficientCandles {
                symbol: symbol.to_string(),
                available: 0,
            });
        }
        Ok(MarketSnapshot::from_candles(symbol, candles))
    }
}

impl SentimentProvider for SyntheticMarketData {
    fn pcr(&self, symbol: &str) -> Option<f64> {
        let value: f64 = self.rng(symbol, "pcr").gen_range(0.5..1.6);
        Some((value * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradegate_core::domain::validate_series;

    fn provider() -> SyntheticMarketData {
        SyntheticMarketData::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 40, 3)
    }

    #[test]
    fn sessions_are_deterministic_per_symbol() {
        let p = provider();
        assert_eq!(p.session("SBIN"), p.session("SBIN"));
        assert_ne!(p.session("SBIN"), p.session("TCS"));
        assert_eq!(p.pcr("SBIN"), p.pcr("SBIN"));
    }

    #[test]
    fn sessions_pass_validation() {
        let p = provider();
        for symbol in ["SBIN", "TCS", "INFY", "M&M"] {
            let candles = p.session(symbol);
            assert_eq!(candles.len(), 40);
            validate_series(&candles, 3).unwrap();
        }
    }

    #[test]
    fn empty_session_is_insufficient() {
        let p = SyntheticMarketData::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 0, 3);
        assert!(matches!(
            p.snapshot("SBIN"),
            Err(DataError::InsufficientCandles { .. })
        ));
    }
}
