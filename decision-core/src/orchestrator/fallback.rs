//! Rule-based decision used when any collaborator fails.
//!
//! Built from the verdict and cold-start status alone: no diagnosis, no
//! pattern update, and a maintain proposal.

use tracing::warn;

use crate::error::CollaboratorError;
use crate::pattern::ConfidenceTier;
use crate::policy::{DifficultyAction, PolicyInput};
use crate::telemetry;
use crate::verdict::{Diagnosis, DiagnosisTrack, FeedbackPayload, Reinforcement};

use super::collaborators::DegradationLevel;
use super::decision::DecisionDraft;
use super::engine::{DecideRequest, DecisionEngine};
use super::instructions;

impl DecisionEngine {
    pub(super) fn fallback_draft(
        &self,
        request: &DecideRequest<'_>,
        err: &CollaboratorError,
    ) -> DecisionDraft {
        warn!(
            target: telemetry::ANOMALY_TARGET,
            collaborator = err.collaborator(),
            error = %err,
            submission_id = %request.submission.submission_id,
            verdict = %request.verdict,
            "Collaborator failed, using rule-based fallback decision"
        );

        let history = request.history;
        let current = history.current_difficulty;
        let policy = self.policy.evaluate(PolicyInput {
            proposed_action: DifficultyAction::Maintain,
            proposed_difficulty: current,
            current_difficulty: current,
            confidence: 0.0,
            confidence_tier: ConfidenceTier::Low,
            pattern_state: Some(history.most_restrictive_pattern()),
            consecutive_eligible: history.consecutive_eligible,
            submissions_since_change: history.submissions_since_change,
            last_action: history.last_action,
        });

        let ctx = self.instruction_context(request, None);
        let accepted = request.verdict.is_accepted();
        let feedback = if accepted {
            FeedbackPayload::Reinforcement(Reinforcement {
                strengths: instructions::strengths(&ctx),
                next_challenge: None,
            })
        } else {
            let track =
                DiagnosisTrack::for_verdict(request.verdict).unwrap_or(DiagnosisTrack::Correctness);
            FeedbackPayload::Diagnosis(Diagnosis::bare(track))
        };

        DecisionDraft {
            submission_id: request.submission.submission_id.clone(),
            user_id: request.submission.user_id.clone(),
            verdict: request.verdict,
            root_cause: None,
            subtype: None,
            failure_mechanism: None,
            pattern: None,
            policy,
            feedback,
            instructions: instructions::fallback_instructions(&ctx, accepted),
            is_cold_start: request.is_cold_start,
            model_version: self.config.orchestrator.model_version.clone(),
            degradation: DegradationLevel::Unavailable,
            fallback_reason: Some(err.to_string()),
            predictions: None,
            misinterpretation: None,
            decided_at: request.now(),
        }
    }
}
