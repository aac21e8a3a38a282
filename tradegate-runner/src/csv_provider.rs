//! CSV-backed market data.
//!
//! Directory layout:
//! - `<dir>/<SYMBOL>.csv`: `timestamp,open,high,low,close,volume`, oldest first
//! - `<dir>/quotes.csv` (optional): `symbol,last_price,pcr`, either value may be blank
//!
//! Candle files are read on every `snapshot` call so an external writer can
//! keep appending during the session. Quotes are read once at open.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

use tradegate_core::domain::Candle;
use tradegate_core::provider::{DataError, MarketDataProvider, MarketSnapshot, SentimentProvider};
use tradegate_core::sentiment::{OptionChain, OptionStrike};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path}: row {row} has unparseable timestamp '{value}'")]
    Timestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Quote {
    last_price: Option<f64>,
    pcr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    symbol: String,
    last_price: Option<f64>,
    pcr: Option<f64>,
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

/// Read one candle file.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut candles = Vec::new();
    for (row, record) in reader.deserialize::<CandleRow>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            path: path.to_path_buf(),
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        candles.push(Candle {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }
    Ok(candles)
}

/// Read an option chain: `strike,ce_oi,pe_oi[,ce_oi_change,pe_oi_change]`.
pub fn load_option_chain(path: &Path) -> Result<OptionChain, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let strikes = reader
        .deserialize::<OptionStrike>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OptionChain::new(strikes))
}

/// Write candles in the format [`load_candles`] reads.
pub fn write_candles(path: &Path, candles: &[Candle]) -> Result<(), LoadError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for c in candles {
        writer.write_record([
            c.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.volume.to_string(),
        ])?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct CsvMarketData {
    dir: PathBuf,
    quotes: HashMap<String, Quote>,
}

impl CsvMarketData {
    /// Open a data directory, reading `quotes.csv` when present.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let dir = dir.into();
        let quotes_path = dir.join("quotes.csv");
        let mut quotes = HashMap::new();
        if quotes_path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(&quotes_path)?;
            for record in reader.deserialize::<QuoteRow>() {
                let row = record?;
                quotes.insert(
                    row.symbol,
                    Quote {
                        last_price: row.last_price,
                        pcr: row.pcr,
                    },
                );
            }
        }
        Ok(Self { dir, quotes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candle_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl MarketDataProvider for CsvMarketData {
    fn name(&self) -> &str {
        "csv"
    }

    fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot, DataError> {
        let path = self.candle_path(symbol);
        if !path.exists() {
            return Err(DataError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no candle file at {}", path.display()),
            });
        }
        let candles = load_candles(&path).map_err(|e| DataError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;
        if candles.is_empty() {
            return Err(DataError::InsufficientCandles {
                symbol: symbol.to_string(),
                available: 0,
            });
        }

        match self.quotes.get(symbol).and_then(|q| q.last_price) {
            Some(price) => Ok(MarketSnapshot::new(symbol, candles, price)),
            None => Ok(MarketSnapshot::from_candles(symbol, candles)),
        }
    }
}

impl SentimentProvider for CsvMarketData {
    fn pcr(&self, symbol: &str) -> Option<f64> {
        self.quotes.get(symbol).and_then(|q| q.pcr)
    }
}
