//! Difficulty Policy Engine: ordered gate pipeline.
//!
//! Gates run in a fixed order and the first one that blocks or forces stops
//! the pipeline. `gates_evaluated` holds every gate that ran, in order, so
//! the trail always ends at the gate that decided the outcome.

use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::telemetry;

use super::gates;
use super::types::{DifficultyAction, GateDecision, PolicyDecision, PolicyGate, PolicyInput};

/// Stateless policy evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifficultyPolicyEngine {
    config: PolicyConfig,
}

impl DifficultyPolicyEngine {
    /// Create with default gate counts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Run the gate pipeline over one proposal.
    pub fn evaluate(&self, input: PolicyInput) -> PolicyDecision {
        let span = telemetry::policy_span(
            &input.proposed_action.to_string(),
            input.current_difficulty.as_str(),
        );
        let _guard = span.enter();

        let mut gates_evaluated = Vec::with_capacity(PolicyGate::ORDER.len());
        let mut blocking: Option<GateDecision> = None;

        for gate in PolicyGate::ORDER {
            let decision = self.run_gate(gate, &input);
            {
                let gate_span = telemetry::gate_span(&decision);
                let _g = gate_span.enter();
                debug!(gate = %gate, result = %decision.result, reason = %decision.reason, "Gate evaluated");
            }
            let stops = decision.result.stops_pipeline();
            gates_evaluated.push(decision.clone());
            if stops {
                blocking = Some(decision);
                break;
            }
        }

        let consecutive_eligible_count = self.next_eligible_count(&input, blocking.as_ref());
        let cooldown_remaining = gates::cooldown_remaining(&input, &self.config);

        let decision = match blocking {
            Some(gate) => PolicyDecision {
                final_action: DifficultyAction::Maintain,
                final_difficulty: input.current_difficulty,
                confidence: input.confidence,
                reason: format!("{}: {}", gate.gate_name, gate.reason),
                gates_evaluated,
                blocking_gate: Some(gate.gate_name),
                consecutive_eligible_count,
                cooldown_remaining,
                input,
            },
            None => {
                let final_difficulty = match input.proposed_action {
                    DifficultyAction::Maintain => input.current_difficulty,
                    _ => input.proposed_difficulty,
                };
                PolicyDecision {
                    final_action: input.proposed_action,
                    final_difficulty,
                    confidence: input.confidence,
                    reason: format!("{} passed all gates", input.proposed_action),
                    gates_evaluated,
                    blocking_gate: None,
                    consecutive_eligible_count,
                    cooldown_remaining,
                    input,
                }
            }
        };

        telemetry::record_policy_result(&span, &decision);
        info!(
            proposed = %decision.input.proposed_action,
            final_action = %decision.final_action,
            final_difficulty = %decision.final_difficulty,
            blocking_gate = decision.blocking_gate.map(|g| g.as_str()).unwrap_or("none"),
            "Policy evaluated"
        );
        decision
    }

    fn run_gate(&self, gate: PolicyGate, input: &PolicyInput) -> GateDecision {
        match gate {
            PolicyGate::ConfidenceGate => gates::confidence_gate(input),
            PolicyGate::PatternGate => gates::pattern_gate(input),
            PolicyGate::CooldownGate => gates::cooldown_gate(input, &self.config),
            PolicyGate::HysteresisGate => gates::hysteresis_gate(input, &self.config),
            PolicyGate::DirectionalBiasGate => gates::directional_bias_gate(input),
        }
    }

    /// An increase that cleared confidence and pattern is an eligible cycle.
    /// It keeps counting while cooldown or hysteresis hold it, and resets once
    /// it is applied or when the learner stops being eligible.
    fn next_eligible_count(&self, input: &PolicyInput, blocking: Option<&GateDecision>) -> u32 {
        if input.proposed_action != DifficultyAction::Increase {
            return 0;
        }
        match blocking.map(|g| g.gate_name) {
            Some(PolicyGate::CooldownGate) | Some(PolicyGate::HysteresisGate) => {
                input.consecutive_eligible.saturating_add(1)
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{ConfidenceTier, PatternState};
    use crate::policy::types::{Difficulty, GateResult};

    fn eligible_increase() -> PolicyInput {
        PolicyInput {
            proposed_action: DifficultyAction::Increase,
            proposed_difficulty: Difficulty::Hard,
            current_difficulty: Difficulty::Medium,
            confidence: 0.92,
            confidence_tier: ConfidenceTier::High,
            pattern_state: Some(PatternState::Stable),
            consecutive_eligible: 3,
            submissions_since_change: Some(6),
            last_action: Some(DifficultyAction::Maintain),
        }
    }

    #[test]
    fn test_all_gates_pass() {
        let decision = DifficultyPolicyEngine::new().evaluate(eligible_increase());
        assert_eq!(decision.final_action, DifficultyAction::Increase);
        assert_eq!(decision.final_difficulty, Difficulty::Hard);
        assert_eq!(decision.blocking_gate, None);
        assert_eq!(decision.gates_evaluated.len(), 5);
        assert_eq!(decision.consecutive_eligible_count, 0);
        assert!(!decision.was_overridden());
    }

    #[test]
    fn test_short_circuit_on_confidence() {
        let mut input = eligible_increase();
        input.confidence_tier = ConfidenceTier::Low;
        let decision = DifficultyPolicyEngine::new().evaluate(input);
        assert_eq!(decision.final_action, DifficultyAction::Maintain);
        assert_eq!(decision.final_difficulty, Difficulty::Medium);
        assert_eq!(decision.blocking_gate, Some(PolicyGate::ConfidenceGate));
        assert_eq!(decision.gates_evaluated.len(), 1);
        assert_eq!(decision.gates_evaluated[0].result, GateResult::Forced);
        assert!(decision.was_overridden());
    }

    #[test]
    fn test_hysteresis_hold_counts_eligible_cycle() {
        let mut input = eligible_increase();
        input.consecutive_eligible = 1;
        let decision = DifficultyPolicyEngine::new().evaluate(input);
        assert_eq!(decision.blocking_gate, Some(PolicyGate::HysteresisGate));
        assert_eq!(decision.consecutive_eligible_count, 2);
    }

    #[test]
    fn test_pattern_block_resets_eligibility() {
        let mut input = eligible_increase();
        input.pattern_state = Some(PatternState::Confirmed);
        input.consecutive_eligible = 2;
        let decision = DifficultyPolicyEngine::new().evaluate(input);
        assert_eq!(decision.blocking_gate, Some(PolicyGate::PatternGate));
        assert_eq!(decision.consecutive_eligible_count, 0);
    }

    #[test]
    fn test_decrease_reports_advisory_cooldown() {
        let mut input = eligible_increase();
        input.proposed_action = DifficultyAction::Decrease;
        input.proposed_difficulty = Difficulty::Easy;
        input.submissions_since_change = Some(0);
        input.confidence_tier = ConfidenceTier::Low;
        let decision = DifficultyPolicyEngine::new().evaluate(input);
        assert_eq!(decision.final_action, DifficultyAction::Decrease);
        assert_eq!(decision.final_difficulty, Difficulty::Easy);
        assert_eq!(decision.blocking_gate, None);
        assert_eq!(decision.cooldown_remaining, 3);
    }

    #[test]
    fn test_custom_config() {
        let engine = DifficultyPolicyEngine::with_config(PolicyConfig {
            increase_cooldown: 1,
            decrease_cooldown: 1,
            hysteresis_threshold: 1,
        });
        let mut input = eligible_increase();
        input.consecutive_eligible = 1;
        input.submissions_since_change = Some(1);
        assert_eq!(engine.evaluate(input).final_action, DifficultyAction::Increase);
    }
}
