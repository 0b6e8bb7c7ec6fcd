//! Policy types: actions, difficulties, gate decisions, policy decisions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pattern::{ConfidenceTier, PatternState};

/// Problem difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn step_up(self) -> Option<Self> {
        match self {
            Self::Easy => Some(Self::Medium),
            Self::Medium => Some(Self::Hard),
            Self::Hard => None,
        }
    }

    pub fn step_down(self) -> Option<Self> {
        match self {
            Self::Easy => None,
            Self::Medium => Some(Self::Easy),
            Self::Hard => Some(Self::Medium),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty `{other}`")),
        }
    }
}

/// Direction of a difficulty change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyAction {
    Increase,
    Decrease,
    Maintain,
}

impl fmt::Display for DifficultyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase => write!(f, "increase"),
            Self::Decrease => write!(f, "decrease"),
            Self::Maintain => write!(f, "maintain"),
        }
    }
}

/// The five gates, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyGate {
    ConfidenceGate,
    PatternGate,
    CooldownGate,
    HysteresisGate,
    DirectionalBiasGate,
}

impl PolicyGate {
    pub const ORDER: [PolicyGate; 5] = [
        PolicyGate::ConfidenceGate,
        PolicyGate::PatternGate,
        PolicyGate::CooldownGate,
        PolicyGate::HysteresisGate,
        PolicyGate::DirectionalBiasGate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfidenceGate => "confidence_gate",
            Self::PatternGate => "pattern_gate",
            Self::CooldownGate => "cooldown_gate",
            Self::HysteresisGate => "hysteresis_gate",
            Self::DirectionalBiasGate => "directional_bias_gate",
        }
    }
}

impl fmt::Display for PolicyGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateResult {
    Allowed,
    /// The proposal is rejected; the engine falls back to maintain.
    Blocked,
    /// The gate overrides the proposal with maintain.
    Forced,
}

impl GateResult {
    /// Blocked or forced: evaluation stops here.
    pub fn stops_pipeline(self) -> bool {
        !matches!(self, Self::Allowed)
    }
}

impl fmt::Display for GateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "ALLOWED"),
            Self::Blocked => write!(f, "BLOCKED"),
            Self::Forced => write!(f, "FORCED"),
        }
    }
}

/// One gate's verdict. Immutable, one per gate per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub gate_name: PolicyGate,
    pub result: GateResult,
    pub proposed_action: DifficultyAction,
    pub reason: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl GateDecision {
    pub fn allowed(gate: PolicyGate, proposed: DifficultyAction, reason: impl Into<String>) -> Self {
        Self::new(gate, GateResult::Allowed, proposed, reason)
    }

    pub fn blocked(gate: PolicyGate, proposed: DifficultyAction, reason: impl Into<String>) -> Self {
        Self::new(gate, GateResult::Blocked, proposed, reason)
    }

    pub fn forced(gate: PolicyGate, proposed: DifficultyAction, reason: impl Into<String>) -> Self {
        Self::new(gate, GateResult::Forced, proposed, reason)
    }

    fn new(
        gate_name: PolicyGate,
        result: GateResult,
        proposed_action: DifficultyAction,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            gate_name,
            result,
            proposed_action,
            reason: reason.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Everything the policy engine looks at. Snapshotted into the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInput {
    pub proposed_action: DifficultyAction,
    pub proposed_difficulty: Difficulty,
    pub current_difficulty: Difficulty,
    pub confidence: f64,
    pub confidence_tier: ConfidenceTier,
    /// `None` means the caller could not name a state; treated as blocking.
    pub pattern_state: Option<PatternState>,
    pub consecutive_eligible: u32,
    /// `None` is treated as zero.
    pub submissions_since_change: Option<u32>,
    pub last_action: Option<DifficultyAction>,
}

/// Result of one policy evaluation. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub final_action: DifficultyAction,
    pub final_difficulty: Difficulty,
    pub confidence: f64,
    pub reason: String,
    pub gates_evaluated: Vec<GateDecision>,
    pub blocking_gate: Option<PolicyGate>,
    pub input: PolicyInput,
    /// Updated hysteresis counter for the caller to persist.
    pub consecutive_eligible_count: u32,
    pub cooldown_remaining: u32,
}

impl PolicyDecision {
    /// Whether the final action differs from the proposal.
    pub fn was_overridden(&self) -> bool {
        self.final_action != self.input.proposed_action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_steps() {
        assert_eq!(Difficulty::Easy.step_up(), Some(Difficulty::Medium));
        assert_eq!(Difficulty::Hard.step_up(), None);
        assert_eq!(Difficulty::Easy.step_down(), None);
        assert!(Difficulty::Easy < Difficulty::Hard);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn test_gate_serializes_with_gate_suffix() {
        let json = serde_json::to_value(PolicyGate::ConfidenceGate).unwrap();
        assert_eq!(json, "confidence_gate");
        assert_eq!(PolicyGate::DirectionalBiasGate.to_string(), "directional_bias_gate");
    }

    #[test]
    fn test_gate_decision_metadata() {
        let decision = GateDecision::blocked(PolicyGate::CooldownGate, DifficultyAction::Increase, "wait")
            .with_meta("remaining", 2);
        assert!(decision.result.stops_pipeline());
        assert_eq!(decision.metadata["remaining"], 2);
    }
}
