//! Decision engine — the final ALLOWED / BLOCKED verdict.
//!
//! A pure function of the risk gate result, the confidence result and the
//! minimum-confidence threshold. Every BLOCKED decision names a specific
//! cause; there is no generic "blocked" outcome.

use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceResult;
use crate::levels::LevelSet;
use crate::risk::{RiskCode, RiskGateResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    Allowed,
    Blocked,
}

/// Machine-readable cause of a BLOCKED decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    Risk { code: RiskCode },
    LowConfidence { score: u8, threshold: u8 },
    /// The symbol could not be evaluated at all.
    Unavailable,
}

/// Terminal artifact of one evaluation cycle. Consumers must treat it as
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub state: DecisionState,
    pub reason: String,
    pub block: Option<BlockReason>,
    pub confidence: ConfidenceResult,
    pub levels: LevelSet,
    /// Set when the level set does not bracket the evaluation price.
    pub stale_levels: bool,
    pub warnings: Vec<String>,
}

impl Decision {
    /// BLOCKED decision for a symbol that could not be evaluated.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            state: DecisionState::Blocked,
            reason: reason.into(),
            block: Some(BlockReason::Unavailable),
            confidence: ConfidenceResult::zero(),
            levels: LevelSet::default(),
            stale_levels: false,
            warnings: Vec::new(),
        }
    }

    /// BLAKE3 hex digest of the decision's canonical JSON, for audit logs.
    pub fn fingerprint(&self) -> String {
        // Factor maps are BTreeMaps, so key order is stable.
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

/// Apply the transition rules:
/// risk not OK → BLOCKED; score below threshold → BLOCKED; otherwise ALLOWED.
pub fn decide(
    risk: &RiskGateResult,
    confidence: ConfidenceResult,
    threshold: u8,
    levels: LevelSet,
    price: f64,
) -> Decision {
    let stale = levels.stale_against(price);
    let warnings: Vec<String> = stale
        .iter()
        .map(|level| format!("stale level {level:.2} does not bracket price {price:.2}"))
        .collect();
    let stale_levels = !warnings.is_empty();

    let score = confidence.score;
    let (state, reason, block) = if !risk.is_ok() {
        (
            DecisionState::Blocked,
            risk.reason(),
            Some(BlockReason::Risk { code: risk.code }),
        )
    } else if score < threshold {
        (
            DecisionState::Blocked,
            format!("confidence below threshold: {score} < {threshold}"),
            Some(BlockReason::LowConfidence { score, threshold }),
        )
    } else {
        (
            DecisionState::Allowed,
            format!("all rules satisfied, confidence {score}"),
            None,
        )
    };

    Decision {
        allowed: state == DecisionState::Allowed,
        state,
        reason,
        block,
        confidence,
        levels,
        stale_levels,
        warnings,
    }
}
