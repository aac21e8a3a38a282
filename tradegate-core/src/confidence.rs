//! Confidence scorer — weighted, explainable 0–100 setup strength.
//!
//! Each signal adds a signed, configurable weight. Contributions are summed
//! and clamped to [0, 100]; a failed risk gate pins the score to 0. When
//! either step changes the total, the difference is recorded as a
//! `clamp_adjustment` factor, so the factor map always sums exactly to the
//! reported score.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::domain::TradeDirection;
use crate::indicators::{IndicatorSnapshot, Trend};
use crate::levels::LevelSet;
use crate::risk::{DayRiskState, RiskGateResult, Strategy};
use crate::sentiment::SentimentReading;

/// Signed weight per signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Starting score before any signal.
    pub base: i32,
    pub trend_aligned: i32,
    pub trend_opposed: i32,
    pub orb_breakout: i32,
    pub vwap_side: i32,
    pub sentiment_aligned: i32,
    pub sentiment_opposed: i32,
    pub level_proximity: i32,
    pub strategy_misfit: i32,
    pub risk_failure: i32,
    /// Applied once `fatigue_trade_count` trades were taken today.
    pub fatigue: i32,
    /// Applied while the day carries a realized loss.
    pub drawdown: i32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            base: 40,
            trend_aligned: 20,
            trend_opposed: -15,
            orb_breakout: 15,
            vwap_side: 10,
            sentiment_aligned: 10,
            sentiment_opposed: -10,
            level_proximity: -15,
            strategy_misfit: -10,
            risk_failure: -100,
            fatigue: -5,
            drawdown: -5,
        }
    }
}

impl ConfidenceWeights {
    /// Rewards must be non-negative and penalties non-positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rewards = [
            ("weights.base", self.base),
            ("weights.trend_aligned", self.trend_aligned),
            ("weights.orb_breakout", self.orb_breakout),
            ("weights.vwap_side", self.vwap_side),
            ("weights.sentiment_aligned", self.sentiment_aligned),
        ];
        for (field, value) in rewards {
            if !(0..=100).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    min: 0.0,
                    max: 100.0,
                    value: f64::from(value),
                });
            }
        }
        let penalties = [
            ("weights.trend_opposed", self.trend_opposed),
            ("weights.sentiment_opposed", self.sentiment_opposed),
            ("weights.level_proximity", self.level_proximity),
            ("weights.strategy_misfit", self.strategy_misfit),
            ("weights.risk_failure", self.risk_failure),
            ("weights.fatigue", self.fatigue),
            ("weights.drawdown", self.drawdown),
        ];
        for (field, value) in penalties {
            if !(-100..=0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    min: -100.0,
                    max: 0.0,
                    value: f64::from(value),
                });
            }
        }
        Ok(())
    }
}

/// Named contributor to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Base,
    TrendAlignment,
    OrbBreakout,
    VwapSide,
    Sentiment,
    LevelProximity,
    StrategyFit,
    Fatigue,
    Drawdown,
    RiskGate,
    ClampAdjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLabel {
    High,
    Moderate,
    Low,
    NoTrade,
}

impl ConfidenceLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            75..=u8::MAX => Self::High,
            60..=74 => Self::Moderate,
            45..=59 => Self::Low,
            _ => Self::NoTrade,
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
            Self::NoTrade => "NO_TRADE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub score: u8,
    pub label: ConfidenceLabel,
    pub factors: BTreeMap<Factor, i32>,
    /// One line per contributing factor, in scoring order.
    pub reasons: Vec<String>,
}

impl ConfidenceResult {
    /// A zero score with no contributors.
    pub fn zero() -> Self {
        Self {
            score: 0,
            label: ConfidenceLabel::NoTrade,
            factors: BTreeMap::new(),
            reasons: Vec::new(),
        }
    }

    pub fn factor_sum(&self) -> i32 {
        self.factors.values().sum()
    }
}

/// Trade context the scorer needs besides the indicator inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringContext {
    pub price: f64,
    pub direction: TradeDirection,
    pub strategy: Strategy,
    pub day: DayRiskState,
}

#[derive(Default)]
struct Tally {
    factors: BTreeMap<Factor, i32>,
    reasons: Vec<String>,
}

impl Tally {
    fn add(&mut self, factor: Factor, weight: i32, reason: String) {
        *self.factors.entry(factor).or_insert(0) += weight;
        self.reasons.push(format!("{reason} ({weight:+})"));
    }
}

/// Score a setup.
pub fn score_confidence(
    snapshot: &IndicatorSnapshot,
    levels: &LevelSet,
    sentiment: &SentimentReading,
    risk: &RiskGateResult,
    ctx: &ScoringContext,
    config: &EngineConfig,
) -> ConfidenceResult {
    let w = &config.weights;
    let price = ctx.price;
    let direction = ctx.direction;
    let mut tally = Tally::default();

    tally.add(Factor::Base, w.base, "base score".to_string());

    match (snapshot.trend, direction) {
        (Trend::Up, TradeDirection::Long) | (Trend::Down, TradeDirection::Short) => tally.add(
            Factor::TrendAlignment,
            w.trend_aligned,
            format!("trend {:?} aligned with {direction}", snapshot.trend),
        ),
        (Trend::Up, TradeDirection::Short) | (Trend::Down, TradeDirection::Long) => tally.add(
            Factor::TrendAlignment,
            w.trend_opposed,
            format!("trend {:?} against {direction}", snapshot.trend),
        ),
        (Trend::Flat, _) => {}
    }

    if snapshot.beyond_orb(price, direction) {
        tally.add(
            Factor::OrbBreakout,
            w.orb_breakout,
            format!(
                "price {price:.2} beyond opening range [{:.2}, {:.2}]",
                snapshot.orb_low, snapshot.orb_high
            ),
        );
    }

    if (price - snapshot.vwap) * direction.sign() > 0.0 {
        tally.add(
            Factor::VwapSide,
            w.vwap_side,
            format!("price on the {direction} side of VWAP {:.2}", snapshot.vwap),
        );
    }

    match sentiment.label.alignment(direction) {
        Some(true) => tally.add(
            Factor::Sentiment,
            w.sentiment_aligned,
            format!("sentiment {:?} supports {direction}", sentiment.label),
        ),
        Some(false) => tally.add(
            Factor::Sentiment,
            w.sentiment_opposed,
            format!("sentiment {:?} opposes {direction}", sentiment.label),
        ),
        None => {}
    }

    let opposing = match direction {
        TradeDirection::Long => levels.nearest_resistance(price),
        TradeDirection::Short => levels.nearest_support(price),
    };
    if let Some(level) = opposing {
        if (level - price).abs() <= config.near_level_pct * price {
            tally.add(
                Factor::LevelProximity,
                w.level_proximity,
                format!("price {price:.2} near opposing level {level:.2}"),
            );
        }
    }

    let vwap_distance = (price - snapshot.vwap).abs() / price;
    let misfit = match ctx.strategy {
        Strategy::Orb => vwap_distance > config.orb_max_vwap_distance_pct,
        Strategy::VwapMeanReversion => {
            vwap_distance < config.mean_reversion_min_vwap_distance_pct
        }
    };
    if misfit {
        tally.add(
            Factor::StrategyFit,
            w.strategy_misfit,
            format!(
                "{} setup with price {:.2}% from VWAP",
                ctx.strategy,
                vwap_distance * 100.0
            ),
        );
    }

    if ctx.day.trades_taken >= config.fatigue_trade_count {
        tally.add(
            Factor::Fatigue,
            w.fatigue,
            format!("{} trades already taken today", ctx.day.trades_taken),
        );
    }

    if ctx.day.realized_loss > 0.0 {
        tally.add(
            Factor::Drawdown,
            w.drawdown,
            format!("day in drawdown, realized loss {:.2}", ctx.day.realized_loss),
        );
    }

    if !risk.is_ok() {
        tally.add(
            Factor::RiskGate,
            w.risk_failure,
            format!("risk gate failed with {}", risk.code),
        );
    }

    let raw: i32 = tally.factors.values().sum();
    let clamped = if risk.is_ok() { raw.clamp(0, 100) } else { 0 };
    if clamped != raw {
        tally.add(
            Factor::ClampAdjustment,
            clamped - raw,
            format!("raw score {raw} clamped to {clamped}"),
        );
    }

    let score = clamped as u8;
    ConfidenceResult {
        score,
        label: ConfidenceLabel::from_score(score),
        factors: tally.factors,
        reasons: tally.reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskCode;
    use crate::sentiment::SentimentLabel;

    fn snapshot(trend: Trend) -> IndicatorSnapshot {
        IndicatorSnapshot {
            vwap: 100.0,
            orb_high: 100.5,
            orb_low: 99.0,
            volume: 10_000,
            trend,
            close_slope: 0.5,
            last_close: 100.9,
            session_high: 102.0,
            session_low: 98.5,
            candle_count: 10,
        }
    }

    fn levels() -> LevelSet {
        LevelSet {
            support: vec![99.0, 100.0],
            resistance: vec![103.0, 105.0],
        }
    }

    fn risk(code: RiskCode) -> RiskGateResult {
        RiskGateResult {
            code,
            trade_risk: 500.0,
            day_risk: 500.0,
            reward_risk: Some(2.0),
            detail: String::new(),
        }
    }

    fn sentiment(label: SentimentLabel) -> SentimentReading {
        SentimentReading {
            pcr: Some(1.0),
            label,
            available: true,
        }
    }

    fn long_ctx(price: f64) -> ScoringContext {
        ScoringContext {
            price,
            direction: TradeDirection::Long,
            strategy: Strategy::Orb,
            day: DayRiskState::default(),
        }
    }

    #[test]
    fn strong_long_setup_scores_high() {
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &sentiment(SentimentLabel::Bullish),
            &risk(RiskCode::Ok),
            &long_ctx(100.9),
            &EngineConfig::default(),
        );
        // 40 + 20 + 15 + 10 + 10
        assert_eq!(result.score, 95);
        assert_eq!(result.label, ConfidenceLabel::High);
        assert_eq!(result.factor_sum(), 95);
        assert!(!result.factors.contains_key(&Factor::ClampAdjustment));
    }

    #[test]
    fn risk_failure_forces_zero_with_clamp_factor() {
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &sentiment(SentimentLabel::Bullish),
            &risk(RiskCode::RiskExceedsPerTrade),
            &long_ctx(100.9),
            &EngineConfig::default(),
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.factors[&Factor::RiskGate], -100);
        assert_eq!(result.factors[&Factor::ClampAdjustment], 5);
        assert_eq!(result.factor_sum(), 0);
    }

    #[test]
    fn risk_failure_pins_zero_despite_large_base() {
        let mut config = EngineConfig::default();
        config.weights.base = 100;
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &sentiment(SentimentLabel::Bullish),
            &risk(RiskCode::RiskExceedsDaily),
            &long_ctx(100.9),
            &config,
        );
        // 100 + 20 + 15 + 10 + 10 - 100 = 55, pinned to 0
        assert_eq!(result.score, 0);
        assert_eq!(result.factors[&Factor::ClampAdjustment], -55);
        assert_eq!(result.factor_sum(), 0);
    }

    #[test]
    fn strategy_misfit_is_counted_in_total() {
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &sentiment(SentimentLabel::Bullish),
            &risk(RiskCode::Ok),
            &long_ctx(101.5),
            &EngineConfig::default(),
        );
        // 40 + 20 + 15 + 10 + 10 - 10 (1.48% from VWAP)
        assert_eq!(result.factors[&Factor::StrategyFit], -10);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn busy_losing_day_penalizes() {
        let ctx = ScoringContext {
            day: DayRiskState {
                realized_loss: 800.0,
                open_risk: 0.0,
                trades_taken: 5,
            },
            ..long_ctx(100.9)
        };
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &sentiment(SentimentLabel::Bullish),
            &risk(RiskCode::Ok),
            &ctx,
            &EngineConfig::default(),
        );
        assert_eq!(result.factors[&Factor::Fatigue], -5);
        assert_eq!(result.factors[&Factor::Drawdown], -5);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn fresh_day_has_no_fatigue_or_drawdown() {
        let ctx = ScoringContext {
            day: DayRiskState {
                realized_loss: 0.0,
                open_risk: 200.0,
                trades_taken: 4,
            },
            ..long_ctx(100.9)
        };
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &SentimentReading::unavailable(),
            &risk(RiskCode::Ok),
            &ctx,
            &EngineConfig::default(),
        );
        assert!(!result.factors.contains_key(&Factor::Fatigue));
        assert!(!result.factors.contains_key(&Factor::Drawdown));
    }

    #[test]
    fn opposing_trend_and_sentiment_penalize() {
        let result = score_confidence(
            &snapshot(Trend::Down),
            &levels(),
            &sentiment(SentimentLabel::Bearish),
            &risk(RiskCode::Ok),
            &long_ctx(100.5),
            &EngineConfig::default(),
        );
        // 40 - 15 + 10 (above vwap) - 10
        assert_eq!(result.score, 25);
        assert_eq!(result.label, ConfidenceLabel::NoTrade);
    }

    #[test]
    fn near_resistance_penalizes_long() {
        let result = score_confidence(
            &snapshot(Trend::Flat),
            &levels(),
            &SentimentReading::unavailable(),
            &risk(RiskCode::Ok),
            &long_ctx(102.9),
            &EngineConfig::default(),
        );
        assert_eq!(result.factors[&Factor::LevelProximity], -15);
        assert_eq!(result.factor_sum(), i32::from(result.score));
    }

    #[test]
    fn orb_far_from_vwap_is_misfit() {
        let result = score_confidence(
            &snapshot(Trend::Flat),
            &levels(),
            &SentimentReading::unavailable(),
            &risk(RiskCode::Ok),
            &long_ctx(104.0),
            &EngineConfig::default(),
        );
        assert_eq!(result.factors[&Factor::StrategyFit], -10);
    }

    #[test]
    fn mean_reversion_hugging_vwap_is_misfit() {
        let ctx = ScoringContext {
            price: 100.05,
            direction: TradeDirection::Short,
            strategy: Strategy::VwapMeanReversion,
            day: DayRiskState::default(),
        };
        let result = score_confidence(
            &snapshot(Trend::Flat),
            &levels(),
            &SentimentReading::unavailable(),
            &risk(RiskCode::Ok),
            &ctx,
            &EngineConfig::default(),
        );
        assert_eq!(result.factors[&Factor::StrategyFit], -10);
    }

    #[test]
    fn generous_weights_clamp_at_hundred() {
        let mut config = EngineConfig::default();
        config.weights.base = 90;
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &sentiment(SentimentLabel::Bullish),
            &risk(RiskCode::Ok),
            &long_ctx(100.9),
            &config,
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.factors[&Factor::ClampAdjustment], -45);
        assert_eq!(result.factor_sum(), 100);
    }

    #[test]
    fn labels_follow_bands() {
        assert_eq!(ConfidenceLabel::from_score(100), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_score(75), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_score(74), ConfidenceLabel::Moderate);
        assert_eq!(ConfidenceLabel::from_score(45), ConfidenceLabel::Low);
        assert_eq!(ConfidenceLabel::from_score(44), ConfidenceLabel::NoTrade);
    }

    #[test]
    fn positive_penalty_rejected() {
        let weights = ConfidenceWeights {
            risk_failure: 10,
            ..ConfidenceWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn factor_map_serializes_with_names() {
        let result = score_confidence(
            &snapshot(Trend::Up),
            &levels(),
            &SentimentReading::unavailable(),
            &risk(RiskCode::Ok),
            &long_ctx(100.9),
            &EngineConfig::default(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["factors"]["trend_alignment"], 20);
        assert_eq!(json["factors"]["base"], 40);
    }
}
