//! Opportunity scanner — the shared evaluation cycle replayed per symbol.
//!
//! Each symbol is fetched and evaluated independently (in parallel on a Rayon
//! pool, or sequentially), classified BUY / WATCH / AVOID, and reassembled
//! into the universe order. A symbol that cannot be fetched or evaluated is
//! recorded as AVOID with a diagnostic reason; it never aborts the pass.
//!
//! The scanner clones the engine config, risk profile and day state when it
//! is built, so every pass sees one frozen snapshot even if the caller's
//! copies change in the meantime.

use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use tradegate_core::config::{ConfigError, EngineConfig};
use tradegate_core::decision::Decision;
use tradegate_core::domain::TradeDirection;
use tradegate_core::error::EvalError;
use tradegate_core::evaluation::{evaluate, EvaluationContext};
use tradegate_core::provider::{MarketDataProvider, SentimentProvider};
use tradegate_core::risk::{DayRiskState, RiskProfile};

/// Errors that prevent a scan from starting. Per-symbol failures are not
/// errors; they become AVOID results.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Buy,
    Watch,
    Avoid,
}

impl Classification {
    /// ALLOWED at or above `buy_threshold` → BUY, ALLOWED below → WATCH,
    /// BLOCKED → AVOID.
    pub fn of(decision: &Decision, buy_threshold: u8) -> Self {
        if !decision.allowed {
            Self::Avoid
        } else if decision.confidence.score >= buy_threshold {
            Self::Buy
        } else {
            Self::Watch
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Watch => write!(f, "WATCH"),
            Self::Avoid => write!(f, "AVOID"),
        }
    }
}

/// One row of a scan pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub classification: Classification,
    /// Direction evaluated; `None` when the symbol could not be evaluated.
    pub direction: Option<TradeDirection>,
    pub decision: Decision,
    /// Error kind when evaluation failed (e.g. `DATA_UNAVAILABLE`).
    pub error: Option<String>,
}

/// Execution options for a scan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub parallel: bool,
    /// Dedicated pool size; 0 uses the global Rayon pool.
    pub threads: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
        }
    }
}

/// Counts per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub buy: usize,
    pub watch: usize,
    pub avoid: usize,
    pub failed: usize,
}

impl ScanSummary {
    pub fn of(results: &[ScanResult]) -> Self {
        results.iter().fold(Self::default(), |mut s, r| {
            match r.classification {
                Classification::Buy => s.buy += 1,
                Classification::Watch => s.watch += 1,
                Classification::Avoid => s.avoid += 1,
            }
            if r.error.is_some() {
                s.failed += 1;
            }
            s
        })
    }
}

pub struct OpportunityScanner<'a> {
    config: EngineConfig,
    profile: RiskProfile,
    day: DayRiskState,
    market: &'a dyn MarketDataProvider,
    sentiment: &'a dyn SentimentProvider,
    options: ScanOptions,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> OpportunityScanner<'a> {
    /// Build a scanner over a frozen copy of the configuration.
    ///
    /// Configuration is validated here, once; an invalid value fails the whole
    /// scan rather than any single symbol.
    pub fn new(
        config: &EngineConfig,
        profile: &RiskProfile,
        day: &DayRiskState,
        market: &'a dyn MarketDataProvider,
        sentiment: &'a dyn SentimentProvider,
        options: ScanOptions,
    ) -> Result<Self, ScanError> {
        config.validate()?;
        profile.validate()?;

        let pool = if options.parallel && options.threads > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.threads)
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            config: config.clone(),
            profile: profile.clone(),
            day: *day,
            market,
            sentiment,
            options,
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scan `universe`. Output has one entry per input symbol, in input order.
    pub fn scan(&self, universe: &[String]) -> Vec<ScanResult> {
        let started = Instant::now();
        info!(
            symbols = universe.len(),
            provider = self.market.name(),
            parallel = self.options.parallel,
            "scan started"
        );

        let results: Vec<ScanResult> = if !self.options.parallel {
            universe.iter().map(|s| self.scan_symbol(s)).collect()
        } else if let Some(pool) = &self.pool {
            pool.install(|| universe.par_iter().map(|s| self.scan_symbol(s)).collect())
        } else {
            universe.par_iter().map(|s| self.scan_symbol(s)).collect()
        };

        let summary = ScanSummary::of(&results);
        info!(
            buy = summary.buy,
            watch = summary.watch,
            avoid = summary.avoid,
            failed = summary.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );
        results
    }

    /// Fetch and evaluate one symbol; failures degrade to AVOID.
    pub fn scan_symbol(&self, symbol: &str) -> ScanResult {
        let ctx = EvaluationContext {
            config: &self.config,
            profile: &self.profile,
            day: &self.day,
        };

        let outcome = self
            .market
            .snapshot(symbol)
            .map_err(EvalError::from)
            .and_then(|snapshot| evaluate(&snapshot, self.sentiment.pcr(symbol), None, &ctx));

        match outcome {
            Ok(evaluation) => {
                let classification =
                    Classification::of(&evaluation.decision, self.config.buy_threshold);
                debug!(
                    symbol,
                    %classification,
                    score = evaluation.decision.confidence.score,
                    reason = %evaluation.decision.reason,
                    "symbol evaluated"
                );
                ScanResult {
                    symbol: symbol.to_string(),
                    classification,
                    direction: Some(evaluation.direction),
                    decision: evaluation.decision,
                    error: None,
                }
            }
            Err(err) => {
                warn!(symbol, kind = err.kind(), error = %err, "symbol skipped");
                ScanResult {
                    symbol: symbol.to_string(),
                    classification: Classification::Avoid,
                    direction: None,
                    decision: Decision::unavailable(format!("{}: {err}", err.kind())),
                    error: Some(err.kind().to_string()),
                }
            }
        }
    }
}
