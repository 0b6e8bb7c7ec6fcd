//! Feedback payloads, one variant per verdict family.

use serde::{Deserialize, Serialize};

use crate::mechanism::FailureMechanism;
use crate::policy::Difficulty;
use crate::taxonomy::{RootCause, Subtype};

use super::types::Verdict;

/// Positive-only feedback reserved for accepted submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reinforcement {
    pub strengths: Vec<String>,
    /// Set when the policy raised difficulty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_challenge: Option<Difficulty>,
}

/// Which diagnostic lens the feedback uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisTrack {
    Correctness,
    Efficiency,
    Implementation,
}

impl DiagnosisTrack {
    /// Track for a failed verdict. Accepted has no track.
    pub fn for_verdict(verdict: Verdict) -> Option<Self> {
        match verdict {
            Verdict::Accepted => None,
            Verdict::TimeLimitExceeded | Verdict::MemoryLimitExceeded => Some(Self::Efficiency),
            Verdict::RuntimeError | Verdict::CompileError => Some(Self::Implementation),
            Verdict::WrongAnswer | Verdict::Unknown => Some(Self::Correctness),
        }
    }
}

/// Diagnostic feedback for a failed submission.
///
/// The fields are optional so a degraded decision can still carry the
/// diagnosis shape without a classifier result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub track: DiagnosisTrack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<RootCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_mechanism: Option<FailureMechanism>,
    /// Pattern name, only when the pattern is surfaced to the learner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistake_pattern: Option<String>,
}

impl Diagnosis {
    /// Diagnosis with only the track known.
    pub fn bare(track: DiagnosisTrack) -> Self {
        Self {
            track,
            root_cause: None,
            subtype: None,
            failure_mechanism: None,
            mistake_pattern: None,
        }
    }
}

/// Feedback handed to the text agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackPayload {
    Reinforcement(Reinforcement),
    Diagnosis(Diagnosis),
}

impl FeedbackPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reinforcement(_) => "reinforcement",
            Self::Diagnosis(_) => "diagnosis",
        }
    }

    pub fn is_reinforcement(&self) -> bool {
        matches!(self, Self::Reinforcement(_))
    }

    pub fn as_diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Self::Diagnosis(d) => Some(d),
            Self::Reinforcement(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_tagged_by_kind() {
        let payload = FeedbackPayload::Diagnosis(Diagnosis::bare(DiagnosisTrack::Efficiency));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "diagnosis");
        assert_eq!(json["track"], "efficiency");
        assert!(json.get("root_cause").is_none());
    }

    #[test]
    fn test_track_for_verdict() {
        assert_eq!(DiagnosisTrack::for_verdict(Verdict::Accepted), None);
        assert_eq!(
            DiagnosisTrack::for_verdict(Verdict::TimeLimitExceeded),
            Some(DiagnosisTrack::Efficiency)
        );
        assert_eq!(
            DiagnosisTrack::for_verdict(Verdict::Unknown),
            Some(DiagnosisTrack::Correctness)
        );
    }
}
