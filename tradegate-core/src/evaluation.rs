//! One evaluation cycle: candles → indicators → levels → sentiment + risk →
//! confidence → decision.
//!
//! [`evaluate`] is the single shared entry point used for the one-symbol view
//! and, once per symbol, by the scanner. It is pure: no I/O, no clock, no
//! state carried between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confidence::{score_confidence, ScoringContext};
use crate::config::EngineConfig;
use crate::decision::{decide, Decision};
use crate::domain::TradeDirection;
use crate::error::EvalError;
use crate::indicators::{compute_snapshot, IndicatorSnapshot, Trend};
use crate::levels::{compute_levels, LevelSet};
use crate::provider::MarketSnapshot;
use crate::risk::{evaluate_risk, DayRiskState, RiskGateResult, RiskProfile, Strategy, TradeSetup};
use crate::sentiment::{read_sentiment, SentimentReading};

/// Read-only inputs shared by every cycle of a pass.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub config: &'a EngineConfig,
    pub profile: &'a RiskProfile,
    pub day: &'a DayRiskState,
}

/// Everything one cycle produced, for display and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: String,
    pub price: f64,
    pub direction: TradeDirection,
    pub strategy: Strategy,
    pub indicators: IndicatorSnapshot,
    pub sentiment: SentimentReading,
    pub setup: TradeSetup,
    pub risk: RiskGateResult,
    pub decision: Decision,
}

/// Pick the trade direction for a strategy when the caller gave none.
///
/// ORB follows the trend (FLAT falls back to `default_direction`); mean
/// reversion trades back toward VWAP.
pub fn choose_direction(
    snapshot: &IndicatorSnapshot,
    price: f64,
    strategy: Strategy,
    fallback: TradeDirection,
) -> TradeDirection {
    match strategy {
        Strategy::Orb => match snapshot.trend {
            Trend::Up => TradeDirection::Long,
            Trend::Down => TradeDirection::Short,
            Trend::Flat => fallback,
        },
        Strategy::VwapMeanReversion => {
            if price > snapshot.vwap {
                TradeDirection::Short
            } else if price < snapshot.vwap {
                TradeDirection::Long
            } else {
                fallback
            }
        }
    }
}

/// Build the setup the risk gate will judge.
///
/// Stop is the nearest level against the trade (the far ORB bound when there
/// is none), target the nearest level in the trade direction (2R when there is
/// none). Quantity is at least one share, so a stop too wide for the limits
/// surfaces as a risk code instead of a silent zero-size trade.
pub fn propose_setup(
    snapshot: &IndicatorSnapshot,
    levels: &LevelSet,
    price: f64,
    direction: TradeDirection,
    profile: &RiskProfile,
    day: &DayRiskState,
) -> TradeSetup {
    let (stop, target) = match direction {
        TradeDirection::Long => (
            levels.nearest_support(price).unwrap_or(snapshot.orb_low),
            levels.nearest_resistance(price),
        ),
        TradeDirection::Short => (
            levels.nearest_resistance(price).unwrap_or(snapshot.orb_high),
            levels.nearest_support(price),
        ),
    };
    let target = target.unwrap_or(price + 2.0 * (price - stop));
    let quantity = profile.position_size(price, stop, day).max(1);

    TradeSetup {
        direction,
        entry: price,
        stop,
        target,
        quantity,
    }
}

/// Run one full evaluation cycle for a symbol.
///
/// Indicator and level failures short-circuit before risk and confidence run,
/// so no partial decision is ever produced.
pub fn evaluate(
    market: &MarketSnapshot,
    pcr: Option<f64>,
    direction: Option<TradeDirection>,
    ctx: &EvaluationContext<'_>,
) -> Result<Evaluation, EvalError> {
    let config = ctx.config;
    config.validate()?;
    ctx.profile.validate()?;

    let price = market.last_price;
    if !(price.is_finite() && price > 0.0) {
        return Err(EvalError::DataUnavailable(format!(
            "{}: invalid last price {price}",
            market.symbol
        )));
    }

    let indicators = compute_snapshot(&market.candles, config)?;
    let levels = compute_levels(&market.candles, &indicators, config)?;
    let sentiment = read_sentiment(pcr, &config.sentiment);

    let strategy = ctx.profile.selected_strategy;
    let direction = direction.unwrap_or_else(|| {
        choose_direction(&indicators, price, strategy, config.default_direction)
    });
    let setup = propose_setup(&indicators, &levels, price, direction, ctx.profile, ctx.day);
    let risk = evaluate_risk(&setup, ctx.profile, ctx.day);
    debug!(symbol = %market.symbol, %direction, code = %risk.code, "risk gate evaluated");

    let scoring = ScoringContext {
        price,
        direction,
        strategy,
        day: *ctx.day,
    };
    let confidence = score_confidence(&indicators, &levels, &sentiment, &risk, &scoring, config);
    let decision = decide(&risk, confidence, config.min_confidence, levels, price);
    debug!(
        symbol = %market.symbol,
        allowed = decision.allowed,
        score = decision.confidence.score,
        "decision produced"
    );

    Ok(Evaluation {
        symbol: market.symbol.clone(),
        price,
        direction,
        strategy,
        indicators,
        sentiment,
        setup,
        risk,
        decision,
    })
}
