//! Safety-Gated Decision Engine
//!
//! Turns noisy ML output about a judged submission into one taxonomy-valid,
//! policy-gated, immutable decision that text agents can verbalize safely.
//!
//! # Components
//!
//! - [`taxonomy`]: root cause ↔ subtype validity mask, legacy label migration
//! - [`mechanism`]: deterministic failure-mechanism resolution
//! - [`pattern`]: confidence-gated recurring-mistake state machine with decay
//! - [`policy`]: five-gate difficulty adjustment pipeline
//! - [`verdict`]: reinforcement/diagnosis separation gate
//! - [`orchestrator`]: `DecisionEngine::decide`
//!
//! # Usage
//!
//! ```rust,ignore
//! use decision_core::{DecisionEngine, EngineConfig};
//!
//! let engine = DecisionEngine::new(EngineConfig::load()?, collaborators)?;
//! let decision = engine.decide(&submission, &history, Some(&problem), None, None)?;
//! if let Some(record) = decision.updated_pattern() {
//!     store.save(&history.user_id, record)?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod mechanism;
pub mod orchestrator;
pub mod pattern;
pub mod policy;
pub mod taxonomy;
pub mod telemetry;
pub mod verdict;

pub use config::{
    ConfidenceThresholds, EngineConfig, OrchestratorConfig, PatternConfig, PolicyConfig,
};
pub use error::{
    CollaboratorError, ConfigError, EngineError, EngineResult, TaxonomyMaskError,
    TaxonomyViolation, VerdictGateViolation,
};
pub use mechanism::{FailureMechanism, FailureMechanismResolver, ProblemCategory, Signals};
pub use orchestrator::{
    Collaborators, Decision, DecisionEngine, ProblemContext, Submission, UserHistory,
    UserProfile, UserStateSnapshot,
};
pub use pattern::{ConfidenceTier, PatternState, PatternStateMachine, PatternStateRecord};
pub use policy::{
    Difficulty, DifficultyAction, DifficultyPolicyEngine, GateDecision, GateResult,
    PolicyDecision, PolicyGate, PolicyInput,
};
pub use taxonomy::{LabelMigrator, RootCause, Subtype, TaxonomyRegistry};
pub use verdict::{FeedbackPayload, Verdict, VerdictGateEnforcer};
