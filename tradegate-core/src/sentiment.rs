//! Sentiment adapter — put/call ratio to a discrete label.
//!
//! PCR above the upper threshold reads BEARISH, below the lower threshold
//! BULLISH, NEUTRAL in between. A missing (or unusable) reading is NEUTRAL
//! with `available = false`, never an error.
//!
//! Also derives PCR and open-interest flow from a raw option chain.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::TradeDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    /// Whether this label supports (`Some(true)`) or opposes (`Some(false)`) a
    /// trade direction. NEUTRAL has no opinion.
    pub fn alignment(self, direction: TradeDirection) -> Option<bool> {
        match (self, direction) {
            (Self::Neutral, _) => None,
            (Self::Bullish, TradeDirection::Long) | (Self::Bearish, TradeDirection::Short) => {
                Some(true)
            }
            _ => Some(false),
        }
    }
}

/// PCR bucketing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentThresholds {
    pub lower_threshold: f64,
    pub upper_threshold: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            lower_threshold: 0.7,
            upper_threshold: 1.3,
        }
    }
}

impl SentimentThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.lower_threshold.is_finite()
            && self.upper_threshold.is_finite()
            && self.lower_threshold > 0.0
            && self.lower_threshold < self.upper_threshold;
        if !ok {
            return Err(ConfigError::SentimentThresholds {
                lower: self.lower_threshold,
                upper: self.upper_threshold,
            });
        }
        Ok(())
    }

    pub fn label(&self, pcr: f64) -> SentimentLabel {
        if pcr > self.upper_threshold {
            SentimentLabel::Bearish
        } else if pcr < self.lower_threshold {
            SentimentLabel::Bullish
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// The raw ratio, when one was supplied.
    pub pcr: Option<f64>,
    pub label: SentimentLabel,
    /// False when no usable PCR was supplied ("sentiment unavailable").
    pub available: bool,
}

impl SentimentReading {
    pub fn unavailable() -> Self {
        Self {
            pcr: None,
            label: SentimentLabel::Neutral,
            available: false,
        }
    }
}

/// Normalize a raw PCR. Missing, non-finite or negative ratios are unavailable.
pub fn read_sentiment(pcr: Option<f64>, thresholds: &SentimentThresholds) -> SentimentReading {
    match pcr {
        Some(value) if value.is_finite() && value >= 0.0 => SentimentReading {
            pcr: Some(value),
            label: thresholds.label(value),
            available: true,
        },
        _ => SentimentReading::unavailable(),
    }
}

/// One strike of an option chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionStrike {
    pub strike: f64,
    pub ce_oi: f64,
    pub pe_oi: f64,
    #[serde(default)]
    pub ce_oi_change: f64,
    #[serde(default)]
    pub pe_oi_change: f64,
}

/// Direction of open-interest build-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionsFlow {
    /// Put OI growing faster than call OI with PCR above 1 (supportive).
    PutWriting,
    /// Call OI growing faster than put OI with PCR below 1 (capping).
    CallWriting,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionChain {
    pub strikes: Vec<OptionStrike>,
}

impl OptionChain {
    pub fn new(strikes: Vec<OptionStrike>) -> Self {
        Self { strikes }
    }

    /// Σ put OI / Σ call OI, rounded to 2 decimals. `None` when call OI is zero.
    pub fn pcr(&self) -> Option<f64> {
        let ce: f64 = self.strikes.iter().map(|s| s.ce_oi).sum();
        let pe: f64 = self.strikes.iter().map(|s| s.pe_oi).sum();
        if ce <= 0.0 {
            return None;
        }
        Some((pe / ce * 100.0).round() / 100.0)
    }

    /// Strikes within `width` steps of the at-the-money strike, plus the ATM strike.
    pub fn atm_region(&self, spot: f64, step: f64, width: usize) -> (OptionChain, f64) {
        let atm = (spot / step).round() * step;
        let half_span = step * width as f64 + step / 2.0;
        let strikes = self
            .strikes
            .iter()
            .filter(|s| (s.strike - atm).abs() < half_span)
            .copied()
            .collect();
        (OptionChain { strikes }, atm)
    }

    pub fn flow(&self) -> OptionsFlow {
        let ce_chg: f64 = self.strikes.iter().map(|s| s.ce_oi_change).sum();
        let pe_chg: f64 = self.strikes.iter().map(|s| s.pe_oi_change).sum();
        match self.pcr() {
            Some(pcr) if pe_chg > ce_chg.abs() && pcr > 1.0 => OptionsFlow::PutWriting,
            Some(pcr) if ce_chg > pe_chg.abs() && pcr < 1.0 => OptionsFlow::CallWriting,
            _ => OptionsFlow::Balanced,
        }
    }

    pub fn sentiment(&self, thresholds: &SentimentThresholds) -> SentimentReading {
        read_sentiment(self.pcr(), thresholds)
    }
}
