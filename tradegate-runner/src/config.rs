//! `tradegate.toml` — file-backed configuration for scans and the CLI.
//!
//! ```toml
//! [engine]
//! opening_window_candles = 5
//! min_confidence = 60
//! buy_threshold = 75
//!
//! [engine.sentiment]
//! lower_threshold = 0.7
//! upper_threshold = 1.3
//!
//! [risk]
//! max_risk_per_trade = 1000.0
//! max_daily_loss = 3000.0
//! selected_strategy = "ORB"
//!
//! [day]
//! realized_loss = 0.0
//!
//! [scan]
//! index = "NIFTY 50"
//! parallel = true
//! ```
//!
//! The `[engine]` decision thresholds (`min_confidence`, `buy_threshold` and
//! both `[engine.sentiment]` bounds) are required. Every other key falls back
//! to its default. Values that are present but invalid are rejected, never
//! replaced.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradegate_core::config::{require_thresholds, ConfigError, EngineConfig};
use tradegate_core::risk::{DayRiskState, RiskProfile};
use tradegate_core::session::MarketSession;

use crate::scanner::ScanOptions;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// What to scan and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Index name from the universe; ignored when `symbols` is non-empty.
    pub index: String,
    /// Explicit symbol list.
    pub symbols: Vec<String>,
    /// Restrict the pass to the deterministic daily watchlist of this size.
    pub watchlist_size: Option<usize>,
    /// Optional universe TOML file; the built-in NSE indices otherwise.
    pub universe_file: Option<PathBuf>,
    /// Directory of per-symbol candle CSVs.
    pub data_dir: Option<PathBuf>,
    pub parallel: bool,
    /// Dedicated pool size; 0 uses the global Rayon pool.
    pub threads: usize,
}

impl ScanSettings {
    pub fn options(&self) -> ScanOptions {
        ScanOptions {
            parallel: self.parallel,
            threads: self.threads,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            index: "NIFTY 50".to_string(),
            symbols: Vec::new(),
            watchlist_size: None,
            universe_file: None,
            data_dir: None,
            parallel: true,
            threads: 0,
        }
    }
}

/// Complete file configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradegateConfig {
    pub engine: EngineConfig,
    pub risk: RiskProfile,
    pub day: DayRiskState,
    pub session: MarketSession,
    pub scan: ScanSettings,
}

impl TradegateConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse, check the required thresholds, validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        let config: Self = toml::from_str(content)?;
        let table: toml::Table = toml::from_str(content)?;
        let engine = table
            .get("engine")
            .and_then(toml::Value::as_table)
            .cloned()
            .unwrap_or_default();
        require_thresholds(&engine, "engine.")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.risk.validate()?;
        self.session.validate()?;
        if let Some(0) = self.scan.watchlist_size {
            return Err(ConfigError::TooSmall {
                field: "scan.watchlist_size",
                min: 1.0,
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
