//! The five policy gates. Each is a pure function of the input and config.

use crate::config::PolicyConfig;
use crate::pattern::{ConfidenceTier, PatternState};

use super::types::{DifficultyAction, GateDecision, PolicyGate, PolicyInput};

/// Gate 1: only a high-tier confidence may raise difficulty.
pub fn confidence_gate(input: &PolicyInput) -> GateDecision {
    let gate = PolicyGate::ConfidenceGate;
    let proposed = input.proposed_action;
    if proposed != DifficultyAction::Increase {
        return GateDecision::allowed(gate, proposed, format!("{proposed} is not confidence-gated"))
            .with_meta("tier", input.confidence_tier.to_string());
    }
    let decision = match input.confidence_tier {
        ConfidenceTier::High => {
            GateDecision::allowed(gate, proposed, "high confidence permits increase")
        }
        ConfidenceTier::Medium => GateDecision::blocked(
            gate,
            proposed,
            "medium confidence is not enough to increase difficulty",
        ),
        ConfidenceTier::Low => {
            GateDecision::forced(gate, proposed, "low confidence forces maintain")
        }
    };
    decision
        .with_meta("tier", input.confidence_tier.to_string())
        .with_meta("confidence", finite_or_zero(input.confidence))
}

/// Gate 2: an unsettled mistake pattern holds difficulty where it is.
pub fn pattern_gate(input: &PolicyInput) -> GateDecision {
    let gate = PolicyGate::PatternGate;
    let proposed = input.proposed_action;
    let state_label = input
        .pattern_state
        .map(|s| s.as_str())
        .unwrap_or("unknown");
    if proposed != DifficultyAction::Increase {
        return GateDecision::allowed(gate, proposed, format!("{proposed} is not pattern-gated"))
            .with_meta("pattern_state", state_label);
    }
    let decision = match input.pattern_state {
        Some(PatternState::Suspected) | Some(PatternState::Confirmed) => GateDecision::forced(
            gate,
            proposed,
            format!("active {state_label} pattern forces maintain"),
        ),
        Some(PatternState::None) => {
            GateDecision::allowed(gate, proposed, "no active mistake pattern")
        }
        Some(PatternState::Stable) => {
            GateDecision::allowed(gate, proposed, "stable pattern does not hold difficulty")
        }
        None => GateDecision::blocked(gate, proposed, "pattern state unknown, holding difficulty"),
    };
    decision.with_meta("pattern_state", state_label)
}

/// Gate 3: minimum submissions between changes.
///
/// Increase is blocked until `increase_cooldown` submissions have elapsed.
/// The decrease cooldown is reported but never blocks.
pub fn cooldown_gate(input: &PolicyInput, config: &PolicyConfig) -> GateDecision {
    let gate = PolicyGate::CooldownGate;
    let proposed = input.proposed_action;
    let elapsed = input.submissions_since_change.unwrap_or(0);
    let remaining = cooldown_remaining(input, config);
    let last_action = input
        .last_action
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let decision = match proposed {
        DifficultyAction::Increase if remaining > 0 => GateDecision::blocked(
            gate,
            proposed,
            format!(
                "{elapsed} of {} submissions since last change",
                config.increase_cooldown
            ),
        ),
        DifficultyAction::Increase => {
            GateDecision::allowed(gate, proposed, "increase cooldown elapsed")
        }
        DifficultyAction::Decrease if remaining > 0 => GateDecision::allowed(
            gate,
            proposed,
            format!("decrease within cooldown ({remaining} remaining), allowed as fail-safe"),
        )
        .with_meta("advisory", true),
        DifficultyAction::Decrease => {
            GateDecision::allowed(gate, proposed, "decrease cooldown elapsed")
        }
        DifficultyAction::Maintain => GateDecision::allowed(gate, proposed, "maintain has no cooldown"),
    };
    decision
        .with_meta("submissions_since_change", elapsed)
        .with_meta("cooldown_remaining", remaining)
        .with_meta("last_action", last_action)
}

/// Gate 4: increase needs sustained eligibility.
pub fn hysteresis_gate(input: &PolicyInput, config: &PolicyConfig) -> GateDecision {
    let gate = PolicyGate::HysteresisGate;
    let proposed = input.proposed_action;
    if proposed != DifficultyAction::Increase {
        return GateDecision::allowed(gate, proposed, format!("{proposed} is exempt from hysteresis"));
    }
    let required = config.hysteresis_threshold;
    let decision = if input.consecutive_eligible >= required {
        GateDecision::allowed(
            gate,
            proposed,
            format!("eligible for {} consecutive cycles", input.consecutive_eligible),
        )
    } else {
        GateDecision::blocked(
            gate,
            proposed,
            format!(
                "eligible for {} of {required} required consecutive cycles",
                input.consecutive_eligible
            ),
        )
    };
    decision
        .with_meta("consecutive_eligible", input.consecutive_eligible)
        .with_meta("required", required)
}

/// Gate 5: never blocks. Notes that decrease is the fail-safe direction.
pub fn directional_bias_gate(input: &PolicyInput) -> GateDecision {
    let proposed = input.proposed_action;
    let reason = match proposed {
        DifficultyAction::Decrease => "decrease is the fail-safe direction",
        DifficultyAction::Increase => "increase passed all restrictive gates",
        DifficultyAction::Maintain => "maintain needs no bias",
    };
    GateDecision::allowed(PolicyGate::DirectionalBiasGate, proposed, reason)
        .with_meta("fail_safe_direction", DifficultyAction::Decrease.to_string())
}

/// Submissions still needed before the proposed direction's cooldown clears.
pub fn cooldown_remaining(input: &PolicyInput, config: &PolicyConfig) -> u32 {
    let elapsed = input.submissions_since_change.unwrap_or(0);
    let required = match input.proposed_action {
        DifficultyAction::Increase => config.increase_cooldown,
        DifficultyAction::Decrease => config.decrease_cooldown,
        DifficultyAction::Maintain => 0,
    };
    required.saturating_sub(elapsed)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::types::{Difficulty, GateResult};

    fn increase() -> PolicyInput {
        PolicyInput {
            proposed_action: DifficultyAction::Increase,
            proposed_difficulty: Difficulty::Medium,
            current_difficulty: Difficulty::Easy,
            confidence: 0.9,
            confidence_tier: ConfidenceTier::High,
            pattern_state: Some(PatternState::None),
            consecutive_eligible: 3,
            submissions_since_change: Some(10),
            last_action: Some(DifficultyAction::Maintain),
        }
    }

    #[test]
    fn test_confidence_gate_tiers() {
        let mut input = increase();
        assert_eq!(confidence_gate(&input).result, GateResult::Allowed);
        input.confidence_tier = ConfidenceTier::Medium;
        assert_eq!(confidence_gate(&input).result, GateResult::Blocked);
        input.confidence_tier = ConfidenceTier::Low;
        assert_eq!(confidence_gate(&input).result, GateResult::Forced);
        input.proposed_action = DifficultyAction::Decrease;
        assert_eq!(confidence_gate(&input).result, GateResult::Allowed);
    }

    #[test]
    fn test_pattern_gate_unknown_state_blocks() {
        let mut input = increase();
        input.pattern_state = None;
        let decision = pattern_gate(&input);
        assert_eq!(decision.result, GateResult::Blocked);
        assert_eq!(decision.metadata["pattern_state"], "unknown");
    }

    #[test]
    fn test_cooldown_missing_counter_is_restrictive() {
        let mut input = increase();
        input.submissions_since_change = None;
        let decision = cooldown_gate(&input, &PolicyConfig::default());
        assert_eq!(decision.result, GateResult::Blocked);
        assert_eq!(decision.metadata["cooldown_remaining"], 5);
    }

    #[test]
    fn test_decrease_cooldown_is_advisory() {
        let mut input = increase();
        input.proposed_action = DifficultyAction::Decrease;
        input.submissions_since_change = Some(1);
        let decision = cooldown_gate(&input, &PolicyConfig::default());
        assert_eq!(decision.result, GateResult::Allowed);
        assert_eq!(decision.metadata["advisory"], true);
        assert_eq!(cooldown_remaining(&input, &PolicyConfig::default()), 2);
    }

    #[test]
    fn test_directional_bias_never_blocks() {
        for action in [
            DifficultyAction::Increase,
            DifficultyAction::Decrease,
            DifficultyAction::Maintain,
        ] {
            let mut input = increase();
            input.proposed_action = action;
            assert_eq!(directional_bias_gate(&input).result, GateResult::Allowed);
        }
    }
}
