//! Market data and sentiment provider contracts.
//!
//! The engine never performs I/O. Providers hand it already-fetched,
//! immutable snapshots; fetching, caching and fallback between feeds live on
//! the other side of these traits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Candle;

/// Structured errors a provider may report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("market data unavailable for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("only {available} candles available for '{symbol}'")]
    InsufficientCandles { symbol: String, available: usize },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },
}

/// Everything the engine needs about one symbol at one evaluation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// Session candles, oldest first.
    pub candles: Vec<Candle>,
    /// Current last-traded price.
    pub last_price: f64,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>, last_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            candles,
            last_price,
        }
    }

    /// Snapshot whose last price is the close of the latest candle.
    pub fn from_candles(symbol: impl Into<String>, candles: Vec<Candle>) -> Self {
        let last_price = candles.last().map(|c| c.close).unwrap_or(f64::NAN);
        Self::new(symbol, candles, last_price)
    }
}

/// Supplies session candles and the last-traded price per symbol.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the current session snapshot for a symbol.
    fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot, DataError>;
}

/// Supplies a raw put/call ratio per symbol or index.
///
/// `None` is a valid answer: the sentiment adapter turns it into an explicit
/// "sentiment unavailable" NEUTRAL reading.
pub trait SentimentProvider: Send + Sync {
    fn pcr(&self, symbol: &str) -> Option<f64>;
}

/// One PCR reading for every symbol (typically the index PCR).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPcr(pub Option<f64>);

impl SentimentProvider for FixedPcr {
    fn pcr(&self, _symbol: &str) -> Option<f64> {
        self.0
    }
}

impl SentimentProvider for HashMap<String, f64> {
    fn pcr(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).copied()
    }
}

/// In-memory provider over pre-built snapshots. Symbols can be marked as
/// failing to exercise the `DataUnavailable` path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    snapshots: HashMap<String, MarketSnapshot>,
    failing: HashMap<String, String>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: MarketSnapshot) {
        self.snapshots.insert(snapshot.symbol.clone(), snapshot);
    }

    /// Force `snapshot(symbol)` to fail with `DataUnavailable`.
    pub fn fail(&mut self, symbol: impl Into<String>, reason: impl Into<String>) {
        self.failing.insert(symbol.into(), reason.into());
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl MarketDataProvider for InMemoryMarketData {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot, DataError> {
        if let Some(reason) = self.failing.get(symbol) {
            return Err(DataError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.snapshots
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_reports_forced_failure() {
        let mut data = InMemoryMarketData::new();
        data.insert(MarketSnapshot::new("TCS", vec![], 100.0));
        data.fail("TCS", "feed timeout");
        assert!(matches!(
            data.snapshot("TCS"),
            Err(DataError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn in_memory_unknown_symbol() {
        let data = InMemoryMarketData::new();
        assert_eq!(
            data.snapshot("XYZ"),
            Err(DataError::SymbolNotFound {
                symbol: "XYZ".into()
            })
        );
    }

    #[test]
    fn from_candles_without_candles_has_nan_price() {
        let snap = MarketSnapshot::from_candles("TCS", vec![]);
        assert!(snap.last_price.is_nan());
    }

    #[test]
    fn map_sentiment_provider() {
        let mut map = HashMap::new();
        map.insert("NIFTY".to_string(), 1.1);
        assert_eq!(map.pcr("NIFTY"), Some(1.1));
        assert_eq!(map.pcr("BANKNIFTY"), None);
        assert_eq!(FixedPcr(Some(0.9)).pcr("anything"), Some(0.9));
    }
}
