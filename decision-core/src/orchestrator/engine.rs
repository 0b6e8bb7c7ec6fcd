//! Decision Engine: one immutable decision per submission.
//!
//! ```text
//! verdict ─┬─ accepted ──► features, readiness, performance ──► success heuristic
//!          │
//!          └─ failed ────► features, classifier, readiness, performance
//!                            ├─ migrate label
//!                            ├─ misinterpretation override
//!                            ├─ validate pair            (TaxonomyViolation propagates)
//!                            ├─ decay + add evidence
//!                            ├─ resolve mechanism
//!                            └─ failure heuristic
//!          ──► policy gates ──► instructions ──► verdict gate ──► freeze
//!
//! any CollaboratorError ──► rule-based fallback from verdict + cold start
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{CollaboratorError, ConfigError, EngineResult};
use crate::mechanism::FailureMechanismResolver;
use crate::pattern::{pattern_name, PatternState, PatternStateMachine, PatternStateRecord};
use crate::policy::{Difficulty, DifficultyAction, DifficultyPolicyEngine, PolicyInput};
use crate::taxonomy::{LabelMigrator, RootCause, Subtype, TaxonomyRegistry};
use crate::telemetry;
use crate::verdict::{Diagnosis, DiagnosisTrack, FeedbackPayload, Reinforcement, Verdict, VerdictGateEnforcer};

use super::collaborators::{
    ClassifierOutput, CodeFeatures, Collaborators, DegradationLevel, PerformanceOutput,
    ReadinessOutput,
};
use super::decision::{Decision, DecisionDraft, PatternOutcome, PredictionSummary};
use super::input::{most_restrictive, ProblemContext, Submission, UserHistory, UserProfile, UserStateSnapshot};
use super::instructions::{self, InstructionContext};
use super::misinterpretation;

/// Everything `decide` was called with, plus what is derived up front.
pub(super) struct DecideRequest<'a> {
    pub submission: &'a Submission,
    pub history: &'a UserHistory,
    pub problem: Option<&'a ProblemContext>,
    pub snapshot: Option<&'a UserStateSnapshot>,
    pub profile: Option<&'a UserProfile>,
    pub verdict: Verdict,
    pub is_cold_start: bool,
}

impl DecideRequest<'_> {
    pub fn now(&self) -> DateTime<Utc> {
        self.submission.submitted_at
    }
}

struct FailurePredictions {
    features: CodeFeatures,
    classification: ClassifierOutput,
    readiness: ReadinessOutput,
    performance: PerformanceOutput,
}

/// A proposed policy action with its target difficulty.
struct Proposal {
    action: DifficultyAction,
    difficulty: Difficulty,
}

impl Proposal {
    fn maintain(current: Difficulty) -> Self {
        Self {
            action: DifficultyAction::Maintain,
            difficulty: current,
        }
    }
}

/// Built once at process start and shared by reference across requests.
#[derive(Debug)]
pub struct DecisionEngine {
    pub(super) config: EngineConfig,
    pub(super) registry: TaxonomyRegistry,
    pub(super) resolver: FailureMechanismResolver,
    pub(super) patterns: PatternStateMachine,
    pub(super) policy: DifficultyPolicyEngine,
    pub(super) collaborators: Collaborators,
}

impl DecisionEngine {
    /// Engine over the canonical taxonomy. `config` is validated here as
    /// well, so hand-built configs get the same checks as loaded ones.
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: TaxonomyRegistry::canonical(),
            resolver: FailureMechanismResolver::new(),
            patterns: PatternStateMachine::new(config.confidence, config.pattern),
            policy: DifficultyPolicyEngine::with_config(config.policy),
            config,
            collaborators,
        })
    }

    /// Replace the taxonomy registry.
    pub fn with_registry(mut self, registry: TaxonomyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TaxonomyRegistry {
        &self.registry
    }

    /// Produce the frozen decision for one submission.
    ///
    /// Collaborator failures never surface here; they turn into a fallback
    /// decision. Taxonomy and verdict-gate violations always do.
    pub fn decide(
        &self,
        submission: &Submission,
        history: &UserHistory,
        problem: Option<&ProblemContext>,
        snapshot: Option<&UserStateSnapshot>,
        profile: Option<&UserProfile>,
    ) -> EngineResult<Decision> {
        let verdict = Verdict::parse(&submission.verdict);
        let span = telemetry::decide_span(&submission.submission_id, &submission.user_id, verdict.as_str());
        let _guard = span.enter();

        let request = DecideRequest {
            submission,
            history,
            problem,
            snapshot,
            profile,
            verdict,
            is_cold_start: history.total_submissions < self.config.orchestrator.cold_start_submissions,
        };

        let draft = if verdict.is_accepted() {
            match self.predict_success(&request) {
                Ok((readiness, performance)) => self.success_draft(&request, readiness, performance),
                Err(err) => self.fallback_draft(&request, &err),
            }
        } else {
            match self.predict_failure(&request) {
                Ok(predictions) => self.failure_draft(&request, predictions)?,
                Err(err) => self.fallback_draft(&request, &err),
            }
        };

        VerdictGateEnforcer::enforce_decision(verdict, &draft)?;

        let decision = draft.freeze(Uuid::new_v4());
        telemetry::record_decide_result(
            &span,
            &decision.policy().final_action.to_string(),
            decision.is_fallback(),
            decision.policy().gates_evaluated.len(),
        );
        info!(
            decision_id = %decision.decision_id(),
            verdict = %verdict,
            root_cause = decision.root_cause().map(|r| r.as_str()).unwrap_or("none"),
            action = %decision.policy().final_action,
            degradation = %decision.degradation(),
            "Decision frozen"
        );
        Ok(decision)
    }

    // ── Collaborators ────────────────────────────────────────────────

    fn predict_success(
        &self,
        request: &DecideRequest<'_>,
    ) -> Result<(ReadinessOutput, PerformanceOutput), CollaboratorError> {
        let features = self
            .collaborators
            .features
            .extract(request.submission, request.problem)?;
        let readiness = self.collaborators.readiness.predict_readiness(&features)?;
        readiness.validate()?;
        let performance = self.collaborators.performance.predict_performance(&features)?;
        performance.validate()?;
        Ok((readiness, performance))
    }

    fn predict_failure(&self, request: &DecideRequest<'_>) -> Result<FailurePredictions, CollaboratorError> {
        let features = self
            .collaborators
            .features
            .extract(request.submission, request.problem)?;
        let classification = self.collaborators.classifier.classify(&features)?;
        classification.validate()?;
        let readiness = self.collaborators.readiness.predict_readiness(&features)?;
        readiness.validate()?;
        let performance = self.collaborators.performance.predict_performance(&features)?;
        performance.validate()?;
        Ok(FailurePredictions {
            features,
            classification,
            readiness,
            performance,
        })
    }

    // ── Success path ─────────────────────────────────────────────────

    fn success_draft(
        &self,
        request: &DecideRequest<'_>,
        readiness: ReadinessOutput,
        performance: PerformanceOutput,
    ) -> DecisionDraft {
        let history = request.history;
        let current = history.current_difficulty;
        let window = history.recent_window(request.verdict, self.config.orchestrator.recent_window);
        let acceptance_rate =
            window.iter().filter(|v| v.is_accepted()).count() as f64 / window.len().max(1) as f64;

        let proposal = if !request.is_cold_start
            && acceptance_rate >= self.config.orchestrator.success_increase_rate
        {
            match current.step_up() {
                Some(next) => Proposal {
                    action: DifficultyAction::Increase,
                    difficulty: next,
                },
                None => Proposal::maintain(current),
            }
        } else {
            Proposal::maintain(current)
        };
        debug!(
            acceptance_rate,
            proposed = %proposal.action,
            cold_start = request.is_cold_start,
            "Success-path proposal"
        );

        let now = request.now();
        let pattern_state = most_restrictive(
            history
                .patterns
                .values()
                .map(|r| self.patterns.apply_decay(r.clone(), now).state),
        );

        let policy = self.policy.evaluate(PolicyInput {
            proposed_action: proposal.action,
            proposed_difficulty: proposal.difficulty,
            current_difficulty: current,
            confidence: acceptance_rate,
            confidence_tier: self.patterns.tier(acceptance_rate),
            pattern_state: Some(pattern_state),
            consecutive_eligible: history.consecutive_eligible,
            submissions_since_change: history.submissions_since_change,
            last_action: history.last_action,
        });

        let ctx = self.instruction_context(request, Some(&performance));
        let instructions = instructions::reinforcement_instructions(&ctx);
        let next_challenge =
            (policy.final_action == DifficultyAction::Increase).then_some(policy.final_difficulty);
        let feedback = FeedbackPayload::Reinforcement(Reinforcement {
            strengths: instructions::strengths(&ctx),
            next_challenge,
        });

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
            instructions,
            is_cold_start: request.is_cold_start,
            model_version: self.config.orchestrator.model_version.clone(),
            degradation: DegradationLevel::Full,
            fallback_reason: None,
            predictions: Some(PredictionSummary {
                classifier_label: None,
                classifier_confidence: None,
                label_migration: None,
                readiness,
                performance,
            }),
            misinterpretation: None,
            decided_at: now,
        }
    }

    // ── Failure path ─────────────────────────────────────────────────

    fn failure_draft(
        &self,
        request: &DecideRequest<'_>,
        predictions: FailurePredictions,
    ) -> EngineResult<DecisionDraft> {
        let FailurePredictions {
            features,
            classification,
            readiness,
            performance,
        } = predictions;

        let migrated = LabelMigrator::new(&self.registry).migrate(&classification.label)?;
        let finding =
            misinterpretation::detect(&request.submission.code, request.problem, &features.signals);
        let (root_cause, subtype, confidence) = match &finding {
            Some(found) => {
                info!(
                    classifier_root_cause = %migrated.root_cause,
                    subtype = %found.subtype,
                    "Misinterpretation heuristic overrides classifier"
                );
                (
                    RootCause::ProblemMisinterpretation,
                    found.subtype,
                    self.config.orchestrator.misinterpretation_confidence,
                )
            }
            None => (migrated.root_cause, migrated.subtype, classification.confidence),
        };
        self.registry.validate(root_cause, subtype)?;

        let pattern = self.update_pattern(request, root_cause, subtype, confidence);

        let category = request.problem.map(|p| p.category.as_str()).unwrap_or("");
        let mechanism = self
            .resolver
            .derive(root_cause, subtype, category, &features.signals);

        let proposal = self.failure_proposal(request, pattern.state, &readiness, &performance);
        let history = request.history;
        let policy = self.policy.evaluate(PolicyInput {
            proposed_action: proposal.action,
            proposed_difficulty: proposal.difficulty,
            current_difficulty: history.current_difficulty,
            confidence,
            confidence_tier: self.patterns.tier(confidence),
            pattern_state: Some(pattern.state),
            consecutive_eligible: history.consecutive_eligible,
            submissions_since_change: history.submissions_since_change,
            last_action: history.last_action,
        });

        let ctx = self.instruction_context(request, Some(&performance));
        let instructions = instructions::diagnosis_instructions(
            &ctx,
            mechanism,
            &pattern.pattern_name,
            pattern.state,
            pattern.surfaced,
        );
        let track = DiagnosisTrack::for_verdict(request.verdict).unwrap_or(DiagnosisTrack::Correctness);
        let feedback = FeedbackPayload::Diagnosis(Diagnosis {
            track,
            root_cause: Some(root_cause),
            subtype: Some(subtype),
            failure_mechanism: Some(mechanism),
            mistake_pattern: instructions
                .mention_pattern
                .then(|| pattern.pattern_name.clone()),
        });

        Ok(DecisionDraft {
            submission_id: request.submission.submission_id.clone(),
            user_id: request.submission.user_id.clone(),
            verdict: request.verdict,
            root_cause: Some(root_cause),
            subtype: Some(subtype),
            failure_mechanism: Some(mechanism),
            pattern: Some(pattern),
            policy,
            feedback,
            instructions,
            is_cold_start: request.is_cold_start,
            model_version: self.config.orchestrator.model_version.clone(),
            degradation: DegradationLevel::Full,
            fallback_reason: None,
            predictions: Some(PredictionSummary {
                classifier_label: Some(classification.label),
                classifier_confidence: Some(classification.confidence),
                label_migration: Some(migrated.kind),
                readiness,
                performance,
            }),
            misinterpretation: finding,
            decided_at: request.now(),
        })
    }

    /// Decay the stored record to the submission time, then add this occurrence.
    fn update_pattern(
        &self,
        request: &DecideRequest<'_>,
        root_cause: RootCause,
        subtype: Subtype,
        confidence: f64,
    ) -> PatternOutcome {
        let name = pattern_name(root_cause, subtype);
        let span = telemetry::pattern_span(&name);
        let _guard = span.enter();

        let now = request.now();
        let stored = request
            .history
            .patterns
            .get(&name)
            .cloned()
            .unwrap_or_else(|| PatternStateRecord::new(name.clone()));
        let previous_state = stored.state;

        let record = self.patterns.apply_decay(stored, now);
        let record = self.patterns.add_evidence(
            record,
            confidence,
            root_cause,
            Some(subtype),
            Some(request.submission.problem_id.as_str()),
            now,
        );
        telemetry::record_pattern_result(
            &span,
            previous_state.as_str(),
            record.state.as_str(),
            record.weighted_evidence,
        );

        PatternOutcome {
            pattern_name: name,
            previous_state,
            state: record.state,
            strength: self.patterns.get_pattern_strength(&record),
            confidence_gated: record.confidence_gated,
            surfaced: !record.confidence_gated && record.state != PatternState::None,
            record,
        }
    }

    /// Decrease when the learner is clearly struggling, otherwise hold.
    fn failure_proposal(
        &self,
        request: &DecideRequest<'_>,
        pattern_state: PatternState,
        readiness: &ReadinessOutput,
        performance: &PerformanceOutput,
    ) -> Proposal {
        let cfg = &self.config.orchestrator;
        let current = request.history.current_difficulty;
        if request.is_cold_start {
            return Proposal::maintain(current);
        }

        let window = request.history.recent_window(request.verdict, cfg.recent_window);
        let all_failing = window.len() >= cfg.recent_window && window.iter().all(|v| !v.is_accepted());
        let struggling = matches!(pattern_state, PatternState::Confirmed | PatternState::Stable)
            || readiness.readiness_for(current) < cfg.struggle_readiness
            || performance.expected_success_rate < cfg.struggle_success_rate
            || all_failing;
        debug!(
            %pattern_state,
            readiness = readiness.readiness_for(current),
            expected_success = performance.expected_success_rate,
            all_failing,
            struggling,
            "Failure-path proposal"
        );

        match (struggling, current.step_down()) {
            (true, Some(lower)) => Proposal {
                action: DifficultyAction::Decrease,
                difficulty: lower,
            },
            _ => Proposal::maintain(current),
        }
    }

    pub(super) fn instruction_context<'a>(
        &self,
        request: &DecideRequest<'a>,
        performance: Option<&'a PerformanceOutput>,
    ) -> InstructionContext<'a> {
        InstructionContext {
            submission: request.submission,
            problem: request.problem,
            snapshot: request.snapshot,
            profile: request.profile,
            performance,
            burnout_risk_threshold: self.config.orchestrator.burnout_risk_threshold,
            is_cold_start: request.is_cold_start,
        }
    }
}
