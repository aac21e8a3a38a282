//! Engine configuration — every threshold and weight the rules consult.
//!
//! Read-only for the duration of an evaluation cycle (and of a scan pass, see
//! the runner). Invalid values are rejected by [`EngineConfig::validate`]; they
//! are never silently replaced with defaults.
//!
//! `Default` is for configs built in code. A parsed file must set the decision
//! thresholds ([`REQUIRED_KEYS`]) explicitly; other keys fall back to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::confidence::ConfidenceWeights;
use crate::domain::TradeDirection;
use crate::sentiment::SentimentThresholds;

/// Invalid or inconsistent configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("sentiment thresholds must satisfy 0 < lower < upper (lower={lower}, upper={upper})")]
    SentimentThresholds { lower: f64, upper: f64 },

    #[error("buy_threshold ({buy}) must not be below min_confidence ({min})")]
    BuyBelowMinimum { buy: u8, min: u8 },

    #[error("risk profile: {0}")]
    RiskProfile(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("missing required threshold '{0}'")]
    MissingKey(String),
}

/// Threshold keys a configuration file must set.
pub const REQUIRED_KEYS: [&str; 4] = [
    "min_confidence",
    "buy_threshold",
    "sentiment.lower_threshold",
    "sentiment.upper_threshold",
];

/// Fail on the first [`REQUIRED_KEYS`] entry absent from `table`. `prefix` is
/// prepended to the reported key (e.g. `"engine."`).
pub fn require_thresholds(table: &toml::Table, prefix: &str) -> Result<(), ConfigError> {
    for key in REQUIRED_KEYS {
        if lookup(table, key).is_none() {
            return Err(ConfigError::MissingKey(format!("{prefix}{key}")));
        }
    }
    Ok(())
}

fn lookup<'a>(table: &'a toml::Table, path: &str) -> Option<&'a toml::Value> {
    let mut parts = path.split('.');
    let mut value = table.get(parts.next()?)?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(value)
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Candle bucket width in minutes.
    pub candle_interval_minutes: u32,
    /// Number of candles forming the opening range.
    pub opening_window_candles: usize,
    /// Number of closes used for the trend slope.
    pub trend_lookback: usize,
    /// Candles on each side required for a swing high/low.
    pub swing_lookback: usize,
    /// Levels closer than this fraction of price are merged.
    pub level_spacing_pct: f64,
    /// Keep at most this many support (and resistance) levels, nearest first.
    pub max_levels_per_side: usize,
    /// Price within this fraction of an opposing level counts as "near".
    pub near_level_pct: f64,
    pub sentiment: SentimentThresholds,
    pub weights: ConfidenceWeights,
    /// Minimum confidence for an ALLOWED decision.
    pub min_confidence: u8,
    /// Minimum confidence for an ALLOWED decision to be classified BUY.
    pub buy_threshold: u8,
    /// Direction proposed when the trend is FLAT.
    pub default_direction: TradeDirection,
    /// ORB strategy: price further than this fraction from VWAP is a misfit.
    pub orb_max_vwap_distance_pct: f64,
    /// Mean reversion: price closer than this fraction to VWAP is a misfit.
    pub mean_reversion_min_vwap_distance_pct: f64,
    /// Trades taken today from which the fatigue penalty applies.
    pub fatigue_trade_count: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candle_interval_minutes: 3,
            opening_window_candles: 5,
            trend_lookback: 5,
            swing_lookback: 3,
            level_spacing_pct: 0.001,
            max_levels_per_side: 3,
            near_level_pct: 0.002,
            sentiment: SentimentThresholds::default(),
            weights: ConfidenceWeights::default(),
            min_confidence: 60,
            buy_threshold: 75,
            default_direction: TradeDirection::Long,
            orb_max_vwap_distance_pct: 0.01,
            mean_reversion_min_vwap_distance_pct: 0.002,
            fatigue_trade_count: 5,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML string. Thresholds are required;
    /// other absent keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parse = |e: toml::de::Error| ConfigError::Parse(e.to_string());
        let config: Self = toml::from_str(content).map_err(parse)?;
        let table: toml::Table = toml::from_str(content).map_err(parse)?;
        require_thresholds(&table, "")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every option; the first invalid one is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("candle_interval_minutes", self.candle_interval_minutes as f64, 1.0)?;
        at_least("opening_window_candles", self.opening_window_candles as f64, 1.0)?;
        at_least("trend_lookback", self.trend_lookback as f64, 2.0)?;
        at_least("swing_lookback", self.swing_lookback as f64, 1.0)?;
        at_least("max_levels_per_side", self.max_levels_per_side as f64, 1.0)?;
        at_least("fatigue_trade_count", f64::from(self.fatigue_trade_count), 1.0)?;
        fraction("level_spacing_pct", self.level_spacing_pct)?;
        fraction("near_level_pct", self.near_level_pct)?;
        fraction("orb_max_vwap_distance_pct", self.orb_max_vwap_distance_pct)?;
        fraction(
            "mean_reversion_min_vwap_distance_pct",
            self.mean_reversion_min_vwap_distance_pct,
        )?;
        percent("min_confidence", self.min_confidence)?;
        percent("buy_threshold", self.buy_threshold)?;
        if self.buy_threshold < self.min_confidence {
            return Err(ConfigError::BuyBelowMinimum {
                buy: self.buy_threshold,
                min: self.min_confidence,
            });
        }
        self.sentiment.validate()?;
        self.weights.validate()?;
        Ok(())
    }
}

fn at_least(field: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            min: 0.0,
            max: 1.0,
            value,
        });
    }
    Ok(())
}

fn percent(field: &'static str, value: u8) -> Result<(), ConfigError> {
    if value > 100 {
        return Err(ConfigError::OutOfRange {
            field,
            min: 0.0,
            max: 100.0,
            value: f64::from(value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_opening_window_rejected() {
        let config = EngineConfig {
            opening_window_candles: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooSmall {
                field: "opening_window_candles",
                ..
            })
        ));
    }

    #[test]
    fn threshold_above_hundred_rejected() {
        let config = EngineConfig {
            min_confidence: 101,
            buy_threshold: 101,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "min_confidence",
                ..
            })
        ));
    }

    #[test]
    fn buy_threshold_below_minimum_rejected() {
        let config = EngineConfig {
            min_confidence: 70,
            buy_threshold: 65,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BuyBelowMinimum { buy: 65, min: 70 })
        );
    }

    #[test]
    fn inverted_sentiment_thresholds_rejected() {
        let mut config = EngineConfig::default();
        config.sentiment.lower_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SentimentThresholds { .. })
        ));
    }

    const THRESHOLDS: &str = r#"
        min_confidence = 50
        buy_threshold = 75

        [sentiment]
        lower_threshold = 0.7
        upper_threshold = 1.5
    "#;

    #[test]
    fn toml_overrides_selected_keys() {
        let config =
            EngineConfig::from_toml(&format!("opening_window_candles = 10\n{THRESHOLDS}")).unwrap();
        assert_eq!(config.opening_window_candles, 10);
        assert_eq!(config.min_confidence, 50);
        assert_eq!(config.sentiment.upper_threshold, 1.5);
        assert_eq!(config.sentiment.lower_threshold, 0.7);
        assert_eq!(config.trend_lookback, 5);
    }

    #[test]
    fn toml_with_invalid_value_is_error() {
        let err =
            EngineConfig::from_toml(&format!("near_level_pct = 2.0\n{THRESHOLDS}")).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn empty_toml_is_missing_thresholds() {
        let err = EngineConfig::from_toml("").unwrap_err();
        assert_eq!(err, ConfigError::MissingKey("min_confidence".to_string()));
    }

    #[test]
    fn omitted_sentiment_threshold_is_not_defaulted() {
        let err = EngineConfig::from_toml(
            r#"
            min_confidence = 60
            buy_threshold = 75

            [sentiment]
            lower_threshold = 0.7
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingKey("sentiment.upper_threshold".to_string())
        );
    }

    #[test]
    fn prefix_names_the_section() {
        let table: toml::Table = toml::from_str("min_confidence = 60").unwrap();
        let err = require_thresholds(&table, "engine.").unwrap_err();
        assert_eq!(err, ConfigError::MissingKey("engine.buy_threshold".to_string()));
    }

    #[test]
    fn toml_with_wrong_type_is_parse_error() {
        let err = EngineConfig::from_toml("min_confidence = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
