//! The decision record: a mutable draft while the pipeline runs, then a
//! frozen value once an id is assigned.
//!
//! `Decision` has no public constructor other than [`DecisionDraft::freeze`]
//! and no setters, so writing to a frozen decision does not compile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mechanism::FailureMechanism;
use crate::pattern::{PatternState, PatternStateRecord, PatternStrength};
use crate::policy::PolicyDecision;
use crate::taxonomy::{MigrationKind, RootCause, Subtype};
use crate::verdict::{FeedbackPayload, GatedDecision, Verdict};

use super::collaborators::{DegradationLevel, PerformanceOutput, ReadinessOutput};
use super::instructions::AgentInstructions;
use super::misinterpretation::MisinterpretationFinding;

/// Result of updating the user's record for the diagnosed pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOutcome {
    pub pattern_name: String,
    pub previous_state: PatternState,
    pub state: PatternState,
    pub strength: PatternStrength,
    /// The evidence was below the medium tier; no claim is surfaced.
    pub confidence_gated: bool,
    /// Whether the pattern may be shown to the learner.
    pub surfaced: bool,
    /// Updated record for the caller to persist.
    pub record: PatternStateRecord,
}

/// What the collaborators said, for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_migration: Option<MigrationKind>,
    pub readiness: ReadinessOutput,
    pub performance: PerformanceOutput,
}

/// Decision under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionDraft {
    pub submission_id: String,
    pub user_id: String,
    pub verdict: Verdict,
    pub root_cause: Option<RootCause>,
    pub subtype: Option<Subtype>,
    pub failure_mechanism: Option<FailureMechanism>,
    pub pattern: Option<PatternOutcome>,
    pub policy: PolicyDecision,
    pub feedback: FeedbackPayload,
    pub instructions: AgentInstructions,
    pub is_cold_start: bool,
    pub model_version: String,
    pub degradation: DegradationLevel,
    pub fallback_reason: Option<String>,
    pub predictions: Option<PredictionSummary>,
    pub misinterpretation: Option<MisinterpretationFinding>,
    pub decided_at: DateTime<Utc>,
}

impl DecisionDraft {
    /// Consume the draft and assign its id. Write-once from here on.
    pub fn freeze(self, decision_id: Uuid) -> Decision {
        Decision {
            decision_id,
            frozen: true,
            submission_id: self.submission_id,
            user_id: self.user_id,
            verdict: self.verdict,
            root_cause: self.root_cause,
            subtype: self.subtype,
            failure_mechanism: self.failure_mechanism,
            pattern: self.pattern,
            policy: self.policy,
            feedback: self.feedback,
            instructions: self.instructions,
            is_cold_start: self.is_cold_start,
            model_version: self.model_version,
            degradation: self.degradation,
            fallback_reason: self.fallback_reason,
            predictions: self.predictions,
            misinterpretation: self.misinterpretation,
            decided_at: self.decided_at,
        }
    }
}

fn diagnostic_fields(
    root_cause: Option<RootCause>,
    subtype: Option<Subtype>,
    failure_mechanism: Option<FailureMechanism>,
    pattern: Option<&PatternOutcome>,
) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if root_cause.is_some() {
        fields.push("root_cause");
    }
    if subtype.is_some() {
        fields.push("subtype");
    }
    if failure_mechanism.is_some() {
        fields.push("failure_mechanism");
    }
    if pattern.is_some() {
        fields.push("mistake_pattern");
    }
    fields
}

fn reinforcement_fields(instructions: &AgentInstructions) -> Vec<&'static str> {
    if instructions.strengths.is_some() {
        vec!["strengths"]
    } else {
        Vec::new()
    }
}

impl GatedDecision for DecisionDraft {
    fn feedback(&self) -> &FeedbackPayload {
        &self.feedback
    }

    fn populated_diagnostic_fields(&self) -> Vec<&'static str> {
        diagnostic_fields(
            self.root_cause,
            self.subtype,
            self.failure_mechanism,
            self.pattern.as_ref(),
        )
    }

    fn populated_reinforcement_fields(&self) -> Vec<&'static str> {
        reinforcement_fields(&self.instructions)
    }
}

/// Frozen output of `decide`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    decision_id: Uuid,
    frozen: bool,
    submission_id: String,
    user_id: String,
    verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root_cause: Option<RootCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtype: Option<Subtype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_mechanism: Option<FailureMechanism>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<PatternOutcome>,
    policy: PolicyDecision,
    feedback: FeedbackPayload,
    instructions: AgentInstructions,
    is_cold_start: bool,
    model_version: String,
    degradation: DegradationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    predictions: Option<PredictionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    misinterpretation: Option<MisinterpretationFinding>,
    decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn decision_id(&self) -> Uuid {
        self.decision_id
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn root_cause(&self) -> Option<RootCause> {
        self.root_cause
    }

    pub fn subtype(&self) -> Option<Subtype> {
        self.subtype
    }

    pub fn failure_mechanism(&self) -> Option<FailureMechanism> {
        self.failure_mechanism
    }

    pub fn pattern(&self) -> Option<&PatternOutcome> {
        self.pattern.as_ref()
    }

    pub fn policy(&self) -> &PolicyDecision {
        &self.policy
    }

    pub fn feedback(&self) -> &FeedbackPayload {
        &self.feedback
    }

    pub fn instructions(&self) -> &AgentInstructions {
        &self.instructions
    }

    pub fn is_cold_start(&self) -> bool {
        self.is_cold_start
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn degradation(&self) -> DegradationLevel {
        self.degradation
    }

    pub fn is_fallback(&self) -> bool {
        self.degradation == DegradationLevel::Unavailable
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    pub fn predictions(&self) -> Option<&PredictionSummary> {
        self.predictions.as_ref()
    }

    pub fn misinterpretation(&self) -> Option<&MisinterpretationFinding> {
        self.misinterpretation.as_ref()
    }

    pub fn decided_at(&self) -> DateTime<Utc> {
        self.decided_at
    }

    /// Updated pattern record to persist, if this decision produced one.
    pub fn updated_pattern(&self) -> Option<&PatternStateRecord> {
        self.pattern.as_ref().map(|p| &p.record)
    }
}

impl GatedDecision for Decision {
    fn feedback(&self) -> &FeedbackPayload {
        &self.feedback
    }

    fn populated_diagnostic_fields(&self) -> Vec<&'static str> {
        diagnostic_fields(
            self.root_cause,
            self.subtype,
            self.failure_mechanism,
            self.pattern.as_ref(),
        )
    }

    fn populated_reinforcement_fields(&self) -> Vec<&'static str> {
        reinforcement_fields(&self.instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::instructions::{FeedbackTone, HintDepth};
    use crate::pattern::ConfidenceTier;
    use crate::policy::{Difficulty, DifficultyAction, DifficultyPolicyEngine, PolicyInput};
    use crate::verdict::{Reinforcement, VerdictGateEnforcer};

    fn accepted_draft() -> DecisionDraft {
        let policy = DifficultyPolicyEngine::new().evaluate(PolicyInput {
            proposed_action: DifficultyAction::Maintain,
            proposed_difficulty: Difficulty::Hard,
            current_difficulty: Difficulty::Hard,
            confidence: 1.0,
            confidence_tier: ConfidenceTier::High,
            pattern_state: Some(PatternState::None),
            consecutive_eligible: 0,
            submissions_since_change: Some(3),
            last_action: None,
        });
        DecisionDraft {
            submission_id: "s1".to_string(),
            user_id: "u1".to_string(),
            verdict: Verdict::Accepted,
            root_cause: None,
            subtype: None,
            failure_mechanism: None,
            pattern: None,
            policy,
            feedback: FeedbackPayload::Reinforcement(Reinforcement {
                strengths: vec!["solved a hard problem".to_string()],
                next_challenge: None,
            }),
            instructions: AgentInstructions {
                tone: FeedbackTone::Celebratory,
                hint_focus: None,
                hint_depth: HintDepth::Guided,
                focus_areas: Vec::new(),
                mention_pattern: false,
                strengths: Some(vec!["solved a hard problem".to_string()]),
            },
            is_cold_start: false,
            model_version: "root-cause-v3".to_string(),
            degradation: DegradationLevel::Full,
            fallback_reason: None,
            predictions: None,
            misinterpretation: None,
            decided_at: Utc::now(),
        }
    }

    #[test]
    fn test_freeze_assigns_id_and_flag() {
        let id = Uuid::new_v4();
        let decision = accepted_draft().freeze(id);
        assert_eq!(decision.decision_id(), id);
        assert!(decision.is_frozen());
        assert_eq!(decision.verdict(), Verdict::Accepted);
        assert!(!decision.is_fallback());
    }

    #[test]
    fn test_accepted_draft_with_root_cause_violates_gate() {
        let mut draft = accepted_draft();
        assert!(VerdictGateEnforcer::enforce_decision(Verdict::Accepted, &draft).is_ok());
        draft.root_cause = Some(RootCause::Correctness);
        assert!(VerdictGateEnforcer::enforce_decision(Verdict::Accepted, &draft).is_err());
    }

    #[test]
    fn test_frozen_decision_serializes_without_diagnosis() {
        let decision = accepted_draft().freeze(Uuid::new_v4());
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["frozen"], true);
        assert!(json.get("root_cause").is_none());
        assert!(VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &json).is_ok());
    }
}
