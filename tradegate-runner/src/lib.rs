//! TradeGate Runner — scanning, file configuration, market data and reports.
//!
//! This crate builds on `tradegate-core` to provide:
//! - The opportunity scanner (parallel per-symbol evaluation, BUY/WATCH/AVOID)
//! - `tradegate.toml` configuration loading
//! - CSV-backed and deterministic synthetic market data providers
//! - JSON and CSV scan reports

pub mod config;
pub mod csv_provider;
pub mod report;
pub mod scanner;
pub mod synthetic;

pub use config::{ConfigFileError, ScanSettings, TradegateConfig};
pub use csv_provider::{load_candles, load_option_chain, write_candles, CsvMarketData, LoadError};
pub use report::{export_csv, export_json, import_json, write_report, ScanReport};
pub use scanner::{
    Classification, OpportunityScanner, ScanError, ScanOptions, ScanResult, ScanSummary,
};
pub use synthetic::SyntheticMarketData;
