//! TradeGate Core — rule-based intraday trade evaluation.
//!
//! This crate turns an already-fetched market snapshot into an explainable
//! verdict:
//! - Domain types (candles, trade direction) and series validation
//! - Intraday indicators (VWAP, opening range, close slope, trend)
//! - Support/resistance levels
//! - Put/call-ratio sentiment and option chain reading
//! - Risk gate and position sizing
//! - Weighted confidence scorer with per-factor breakdown
//! - ALLOWED / BLOCKED decision engine
//!
//! Nothing here performs I/O or reads the clock; every evaluation is a pure
//! function of its inputs.

pub mod confidence;
pub mod config;
pub mod decision;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod indicators;
pub mod levels;
pub mod provider;
pub mod risk;
pub mod sentiment;
pub mod session;
pub mod universe;

pub use config::{ConfigError, EngineConfig};
pub use decision::{Decision, DecisionState};
pub use error::EvalError;
pub use evaluation::{evaluate, Evaluation, EvaluationContext};
