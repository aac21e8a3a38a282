//! Risk gate — validates a proposed setup against the trader's limits.
//!
//! Checks run in order and stop at the first failure:
//! 1. risk per share × quantity ≤ max risk per trade
//! 2. realized loss + open risk + this trade's risk ≤ max daily loss
//! 3. stop distance strictly positive and on the protective side of entry
//! 4. trades taken today below the optional daily trade cap
//!
//! A failing check is an expected outcome (a [`RiskCode`]), not an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::TradeDirection;

/// Trading strategy the user selected for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Opening-range breakout: trade with the trend, near VWAP.
    #[default]
    Orb,
    /// Fade extensions back toward VWAP.
    VwapMeanReversion,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orb => write!(f, "ORB"),
            Self::VwapMeanReversion => write!(f, "VWAP_MEAN_REVERSION"),
        }
    }
}

/// User-configured risk limits. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskProfile {
    pub max_risk_per_trade: f64,
    pub max_daily_loss: f64,
    pub account_size: f64,
    pub selected_strategy: Strategy,
    /// Optional cap on trades per day.
    pub max_trades_per_day: Option<u32>,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            max_risk_per_trade: 1_000.0,
            max_daily_loss: 3_000.0,
            account_size: 100_000.0,
            selected_strategy: Strategy::Orb,
            max_trades_per_day: None,
        }
    }
}

impl RiskProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("max_risk_per_trade", self.max_risk_per_trade),
            ("max_daily_loss", self.max_daily_loss),
            ("account_size", self.account_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::RiskProfile(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.max_risk_per_trade > self.max_daily_loss {
            return Err(ConfigError::RiskProfile(format!(
                "max_risk_per_trade ({}) exceeds max_daily_loss ({})",
                self.max_risk_per_trade, self.max_daily_loss
            )));
        }
        Ok(())
    }

    /// Largest quantity whose risk fits the per-trade limit and the remaining
    /// daily budget, capped by what the account can buy at `entry`.
    pub fn position_size(&self, entry: f64, stop: f64, day: &DayRiskState) -> u64 {
        let per_share = (entry - stop).abs();
        if !(per_share.is_finite() && per_share > 0.0 && entry > 0.0) {
            return 0;
        }
        let budget = self
            .max_risk_per_trade
            .min(day.remaining_budget(self.max_daily_loss));
        let by_risk = (budget / per_share).floor();
        let by_capital = (self.account_size / entry).floor();
        by_risk.min(by_capital).max(0.0) as u64
    }
}

/// What has already happened today. Supplied by the caller (ledger).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DayRiskState {
    /// Realized loss so far, as a positive amount (0 when flat or in profit).
    pub realized_loss: f64,
    /// Risk still open in live positions.
    pub open_risk: f64,
    pub trades_taken: u32,
}

impl DayRiskState {
    pub fn committed(&self) -> f64 {
        self.realized_loss.max(0.0) + self.open_risk.max(0.0)
    }

    pub fn remaining_budget(&self, max_daily_loss: f64) -> f64 {
        (max_daily_loss - self.committed()).max(0.0)
    }
}

/// A proposed (never executed) trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub direction: TradeDirection,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub quantity: u64,
}

impl TradeSetup {
    pub fn risk_per_share(&self) -> f64 {
        (self.entry - self.stop).abs()
    }

    pub fn trade_risk(&self) -> f64 {
        self.risk_per_share() * self.quantity as f64
    }

    /// Reward per share over risk per share, when both are meaningful.
    pub fn reward_risk(&self) -> Option<f64> {
        let risk = self.risk_per_share();
        let reward = (self.target - self.entry) * self.direction.sign();
        (risk > 0.0 && reward.is_finite()).then(|| reward / risk)
    }

    /// Stop strictly on the protective side of entry.
    pub fn stop_is_valid(&self) -> bool {
        let finite = self.entry.is_finite() && self.stop.is_finite();
        let distance = (self.entry - self.stop) * self.direction.sign();
        finite && self.entry > 0.0 && distance > 0.0
    }
}

/// Outcome code of the risk gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCode {
    Ok,
    RiskExceedsPerTrade,
    RiskExceedsDaily,
    InvalidStop,
    MaxTradesReached,
}

impl RiskCode {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::RiskExceedsPerTrade => "RISK_EXCEEDS_PER_TRADE",
            Self::RiskExceedsDaily => "RISK_EXCEEDS_DAILY",
            Self::InvalidStop => "INVALID_STOP",
            Self::MaxTradesReached => "MAX_TRADES_REACHED",
        }
    }
}

impl fmt::Display for RiskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskGateResult {
    pub code: RiskCode,
    /// Risk of the proposed trade (risk per share × quantity).
    pub trade_risk: f64,
    /// Day risk including this trade.
    pub day_risk: f64,
    pub reward_risk: Option<f64>,
    /// Human-readable explanation of the code.
    pub detail: String,
}

impl RiskGateResult {
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }

    /// "CODE: detail", used verbatim as a BLOCKED reason.
    pub fn reason(&self) -> String {
        format!("{}: {}", self.code, self.detail)
    }
}

/// Run the gate.
pub fn evaluate_risk(
    setup: &TradeSetup,
    profile: &RiskProfile,
    day: &DayRiskState,
) -> RiskGateResult {
    let trade_risk = setup.trade_risk();
    let day_risk = day.committed() + trade_risk;
    let result = |code, detail: String| RiskGateResult {
        code,
        trade_risk,
        day_risk,
        reward_risk: setup.reward_risk(),
        detail,
    };

    if !trade_risk.is_finite() {
        return result(
            RiskCode::InvalidStop,
            format!("risk cannot be computed from entry {} / stop {}", setup.entry, setup.stop),
        );
    }
    if trade_risk > profile.max_risk_per_trade {
        return result(
            RiskCode::RiskExceedsPerTrade,
            format!(
                "trade risk {trade_risk:.2} exceeds per-trade limit {:.2}",
                profile.max_risk_per_trade
            ),
        );
    }
    if day_risk > profile.max_daily_loss {
        return result(
            RiskCode::RiskExceedsDaily,
            format!(
                "day risk {day_risk:.2} exceeds daily loss limit {:.2}",
                profile.max_daily_loss
            ),
        );
    }
    if !setup.stop_is_valid() {
        return result(
            RiskCode::InvalidStop,
            format!(
                "stop {:.2} is not on the protective side of {} entry {:.2}",
                setup.stop, setup.direction, setup.entry
            ),
        );
    }
    if let Some(cap) = profile.max_trades_per_day {
        if day.trades_taken >= cap {
            return result(
                RiskCode::MaxTradesReached,
                format!("{} trades taken, daily cap is {cap}", day.trades_taken),
            );
        }
    }

    result(
        RiskCode::Ok,
        format!("trade risk {trade_risk:.2} within limits"),
    )
}
