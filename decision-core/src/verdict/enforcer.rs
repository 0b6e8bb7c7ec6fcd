//! Verdict Gate Enforcer: fail-fast separation of the success and failure paths.
//!
//! Accepted submissions get reinforcement and nothing diagnostic. Failed
//! submissions never get reinforcement. Any crossing is a pipeline defect
//! and is returned as a `VerdictGateViolation` for the caller to propagate.

use serde_json::Value;

use crate::error::VerdictGateViolation;
use crate::telemetry;

use super::payload::FeedbackPayload;
use super::types::Verdict;

/// Keys that only a diagnosis may carry.
pub const DIAGNOSTIC_FIELDS: &[&str] = &[
    "root_cause",
    "subtype",
    "failure_mechanism",
    "diagnosis",
    "mistake_pattern",
];

/// Keys that only reinforcement may carry.
pub const REINFORCEMENT_FIELDS: &[&str] = &["reinforcement", "strengths", "celebration"];

/// A decision-shaped value the enforcer can inspect.
pub trait GatedDecision {
    fn feedback(&self) -> &FeedbackPayload;

    /// Names of diagnostic fields populated outside the payload.
    fn populated_diagnostic_fields(&self) -> Vec<&'static str>;

    /// Names of reinforcement fields populated outside the payload.
    fn populated_reinforcement_fields(&self) -> Vec<&'static str>;
}

/// Stateless checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictGateEnforcer;

impl VerdictGateEnforcer {
    /// Accepted must carry reinforcement, everything else a diagnosis.
    pub fn enforce(verdict: Verdict, payload: &FeedbackPayload) -> Result<(), VerdictGateViolation> {
        match (verdict.is_accepted(), payload) {
            (true, FeedbackPayload::Reinforcement(_)) => Ok(()),
            (false, FeedbackPayload::Diagnosis(_)) => Ok(()),
            (true, FeedbackPayload::Diagnosis(_)) => Err(VerdictGateViolation::PayloadShape {
                verdict,
                expected: "reinforcement",
                found: payload.kind(),
            }),
            (false, FeedbackPayload::Reinforcement(_)) => {
                Err(VerdictGateViolation::PayloadShape {
                    verdict,
                    expected: "diagnosis",
                    found: payload.kind(),
                })
            }
        }
    }

    /// Check a dict-shaped payload by key. Keys are matched at any depth;
    /// a key whose value is `null` counts as absent. An accepted payload
    /// must also carry at least one reinforcement key.
    pub fn enforce_fields(verdict: Verdict, payload: &Value) -> Result<(), VerdictGateViolation> {
        if verdict.is_accepted() {
            if let Some(field) = find_populated_key(payload, DIAGNOSTIC_FIELDS) {
                return Err(VerdictGateViolation::DiagnosisOnAccepted { field });
            }
            if find_populated_key(payload, REINFORCEMENT_FIELDS).is_none() {
                return Err(VerdictGateViolation::MissingReinforcement);
            }
        } else if let Some(field) = find_populated_key(payload, REINFORCEMENT_FIELDS) {
            return Err(VerdictGateViolation::ReinforcementOnFailure { verdict, field });
        }
        Ok(())
    }

    /// Full check on an assembled decision.
    pub fn enforce_decision(
        verdict: Verdict,
        decision: &impl GatedDecision,
    ) -> Result<(), VerdictGateViolation> {
        let span = telemetry::enforce_span(verdict.as_str());
        let _guard = span.enter();

        let result = Self::check_decision(verdict, decision);
        telemetry::record_enforce_result(&span, result.is_ok());
        if let Err(violation) = &result {
            tracing::error!(%verdict, %violation, "Verdict gate violated");
        }
        result
    }

    fn check_decision(
        verdict: Verdict,
        decision: &impl GatedDecision,
    ) -> Result<(), VerdictGateViolation> {
        Self::enforce(verdict, decision.feedback())?;
        if verdict.is_accepted() {
            if let Some(field) = decision.populated_diagnostic_fields().first() {
                return Err(VerdictGateViolation::DiagnosisOnAccepted {
                    field: (*field).to_string(),
                });
            }
        } else if let Some(field) = decision.populated_reinforcement_fields().first() {
            return Err(VerdictGateViolation::ReinforcementOnFailure {
                verdict,
                field: (*field).to_string(),
            });
        }
        Ok(())
    }
}

fn find_populated_key(value: &Value, forbidden: &[&str]) -> Option<String> {
    match value {
        Value::Object(map) => map.iter().find_map(|(key, inner)| {
            if forbidden.contains(&key.as_str()) && !inner.is_null() {
                Some(key.clone())
            } else {
                find_populated_key(inner, forbidden)
            }
        }),
        Value::Array(items) => items.iter().find_map(|v| find_populated_key(v, forbidden)),
        _ => None,
    }
}
