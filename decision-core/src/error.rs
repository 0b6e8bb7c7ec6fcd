//! Error taxonomy for the decision engine.
//!
//! Two families that must never be confused:
//! - invariant violations (`TaxonomyViolation`, `VerdictGateViolation`) are
//!   defects in the pipeline and always propagate out of `decide`;
//! - `CollaboratorError` is an expected runtime failure of an ML dependency
//!   and is always recovered into a fallback decision.
//!
//! `EngineError` only carries the first family, so a caller matching on it
//! cannot swallow a collaborator failure by accident and cannot receive one.

use std::path::PathBuf;

use thiserror::Error;

use crate::taxonomy::{RootCause, Subtype};
use crate::verdict::Verdict;

/// A label or (root cause, subtype) pair outside the canonical taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyViolation {
    #[error("unknown root cause label `{label}`")]
    UnknownRootCause { label: String },

    #[error("unknown subtype label `{label}`")]
    UnknownSubtype { label: String },

    /// Raw classifier label with no canonical or legacy mapping.
    #[error("classifier label `{label}` has no taxonomy mapping")]
    UnknownLabel { label: String },

    #[error("subtype `{subtype}` is not valid under root cause `{root_cause}`")]
    InvalidPair {
        root_cause: RootCause,
        subtype: Subtype,
    },
}

/// A custom taxonomy mask that breaks the bidirectional coverage invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyMaskError {
    #[error("root cause `{0}` has no valid subtypes")]
    RootCauseWithoutSubtypes(RootCause),

    #[error("subtype `{0}` is not reachable from any root cause")]
    SubtypeWithoutRootCauses(Subtype),
}

/// Shape contamination between the reinforcement and diagnosis paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerdictGateViolation {
    /// An accepted submission carries a diagnosis-bearing field.
    #[error("accepted verdict carries diagnostic field `{field}`")]
    DiagnosisOnAccepted { field: String },

    /// A failed submission carries a reinforcement-only field.
    #[error("{verdict} verdict carries reinforcement field `{field}`")]
    ReinforcementOnFailure { verdict: Verdict, field: String },

    /// An accepted payload with no reinforcement field at all.
    #[error("accepted verdict payload carries no reinforcement field")]
    MissingReinforcement,

    /// The payload variant does not match the verdict family.
    #[error("{verdict} verdict requires a {expected} payload, found {found}")]
    PayloadShape {
        verdict: Verdict,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors that escape `DecisionEngine::decide`.
///
/// Both variants are defects. Callers translate them into a generic
/// "feedback temporarily unavailable" response and alert.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("taxonomy violation: {0}")]
    Taxonomy(#[from] TaxonomyViolation),

    #[error("verdict gate violation: {0}")]
    VerdictGate(#[from] VerdictGateViolation),
}

impl EngineError {
    /// Machine-readable code for alerting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Taxonomy(_) => "TAXONOMY_VIOLATION",
            Self::VerdictGate(_) => "VERDICT_GATE_VIOLATION",
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of an external ML collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The caller-imposed time budget elapsed.
    #[error("{collaborator} timed out after {budget_ms}ms")]
    Timeout {
        collaborator: &'static str,
        budget_ms: u64,
    },

    /// The collaborator answered with something unusable.
    #[error("{collaborator} returned a malformed response: {detail}")]
    Malformed {
        collaborator: &'static str,
        detail: String,
    },

    /// Any other failure raised by the implementation.
    #[error("{collaborator} failed: {source}")]
    Failed {
        collaborator: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl CollaboratorError {
    /// Name of the collaborator that failed.
    pub fn collaborator(&self) -> &'static str {
        match self {
            Self::Timeout { collaborator, .. }
            | Self::Malformed { collaborator, .. }
            | Self::Failed { collaborator, .. } => collaborator,
        }
    }
}

/// Errors from loading or validating `EngineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_codes() {
        let err: EngineError = TaxonomyViolation::UnknownLabel {
            label: "mystery".to_string(),
        }
        .into();
        assert_eq!(err.code(), "TAXONOMY_VIOLATION");
        assert!(err.to_string().contains("mystery"));

        let err: EngineError = VerdictGateViolation::DiagnosisOnAccepted {
            field: "root_cause".to_string(),
        }
        .into();
        assert_eq!(err.code(), "VERDICT_GATE_VIOLATION");
    }

    #[test]
    fn test_collaborator_error_names_source() {
        let err = CollaboratorError::Failed {
            collaborator: "readiness_predictor",
            source: anyhow::anyhow!("model file missing"),
        };
        assert_eq!(err.collaborator(), "readiness_predictor");
        assert!(err.to_string().contains("model file missing"));

        let err = CollaboratorError::Timeout {
            collaborator: "root_cause_classifier",
            budget_ms: 250,
        };
        assert_eq!(err.collaborator(), "root_cause_classifier");
        assert!(err.to_string().contains("250ms"));
    }
}
