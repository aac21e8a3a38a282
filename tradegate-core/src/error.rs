//! Evaluation error taxonomy.
//!
//! Only conditions that prevent a decision from being produced are errors.
//! Risk-limit breaches are ordinary outcomes (`RiskCode`) and surface as
//! BLOCKED reasons instead.

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::CandleError;
use crate::provider::DataError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Not enough candles or levels yet. Recoverable: wait and retry.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Upstream fetch failed or returned unusable data. Recoverable.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Missing or invalid thresholds. Fatal to the evaluation cycle.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl EvalError {
    /// True when the caller should show "indicators pending" rather than a failure.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }

    /// Short machine-readable kind, used in scan diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData(_) => "INSUFFICIENT_DATA",
            Self::DataUnavailable(_) => "DATA_UNAVAILABLE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<CandleError> for EvalError {
    fn from(err: CandleError) -> Self {
        Self::InsufficientData(err.to_string())
    }
}

impl From<DataError> for EvalError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::InsufficientCandles { .. } => Self::InsufficientData(err.to_string()),
            other => Self::DataUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_errors_are_pending() {
        let err: EvalError = CandleError::Empty.into();
        assert!(err.is_pending());
        assert_eq!(err.kind(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn data_unavailable_maps_through() {
        let err: EvalError = DataError::DataUnavailable {
            symbol: "TCS".into(),
            reason: "timeout".into(),
        }
        .into();
        assert_eq!(err.kind(), "DATA_UNAVAILABLE");
        assert!(err.to_string().contains("TCS"));
    }

    #[test]
    fn short_provider_series_is_pending() {
        let err: EvalError = DataError::InsufficientCandles {
            symbol: "INFY".into(),
            available: 2,
        }
        .into();
        assert!(err.is_pending());
    }
}
