//! Verdicts, feedback payloads and the verdict separation gate.

pub mod enforcer;
pub mod payload;
pub mod types;

pub use enforcer::{GatedDecision, VerdictGateEnforcer, DIAGNOSTIC_FIELDS, REINFORCEMENT_FIELDS};
pub use payload::{Diagnosis, DiagnosisTrack, FeedbackPayload, Reinforcement};
pub use types::Verdict;
