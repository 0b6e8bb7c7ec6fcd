//! Pattern state records: the per-(user, pattern) value the caller persists.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::taxonomy::{RootCause, Subtype};

use super::confidence::ConfidenceTier;

/// Lifecycle stage of a recurring-mistake hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternState {
    #[default]
    None,
    Suspected,
    Confirmed,
    Stable,
}

impl PatternState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Suspected => "suspected",
            Self::Confirmed => "confirmed",
            Self::Stable => "stable",
        }
    }

    /// Legal edges of the lifecycle graph:
    ///
    /// ```text
    /// None → Suspected → Confirmed → Stable
    ///   ↑        │           │          │
    ///   └────────┴───────────┴──────────┘   (decay)
    /// ```
    pub fn can_transition_to(self, to: PatternState) -> bool {
        use PatternState::*;
        matches!(
            (self, to),
            (None, Suspected)
                | (Suspected, Confirmed)
                | (Confirmed, Stable)
                | (Suspected, None)
                | (Confirmed, None)
                | (Stable, None)
        )
    }

    /// Suspected or confirmed: a live hypothesis that still holds difficulty back.
    pub fn is_unsettled(self) -> bool {
        matches!(self, Self::Suspected | Self::Confirmed)
    }
}

impl fmt::Display for PatternState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "suspected" => Ok(Self::Suspected),
            "confirmed" => Ok(Self::Confirmed),
            "stable" => Ok(Self::Stable),
            other => Err(format!("unknown pattern state `{other}`")),
        }
    }
}

/// One observed occurrence. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub root_cause: RootCause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Audit record of a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternTransition {
    pub from: PatternState,
    pub to: PatternState,
    pub at: DateTime<Utc>,
    pub weighted_evidence: f64,
    pub reason: String,
}

/// Per-(user, pattern) state. Mutated only by `PatternStateMachine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternStateRecord {
    pub pattern_name: String,
    pub state: PatternState,
    /// Ordered by insertion.
    pub evidence: Vec<Evidence>,
    pub weighted_evidence: f64,
    pub mean_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_occurrence: Option<DateTime<Utc>>,
    /// Decay factor of the most recent occurrence, in [0, 1].
    pub recency_score: f64,
    /// The latest evidence was below the medium tier.
    pub confidence_gated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_since: Option<DateTime<Utc>>,
    /// Non-gated evidence cycles observed while CONFIRMED.
    pub confirmed_cycles: u32,
    /// Instant the weights were last recomputed at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transitions: Vec<PatternTransition>,
}

impl PatternStateRecord {
    /// Empty record in state NONE.
    pub fn new(pattern_name: impl Into<String>) -> Self {
        Self {
            pattern_name: pattern_name.into(),
            state: PatternState::None,
            evidence: Vec::new(),
            weighted_evidence: 0.0,
            mean_confidence: 0.0,
            last_occurrence: None,
            recency_score: 0.0,
            confidence_gated: false,
            confirmed_since: None,
            confirmed_cycles: 0,
            evaluated_at: None,
            transitions: Vec::new(),
        }
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }
}

/// Canonical pattern key for a (root cause, subtype) pair.
pub fn pattern_name(root_cause: RootCause, subtype: Subtype) -> String {
    format!("{root_cause}:{subtype}")
}

/// Summary of how strongly a pattern is supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternStrength {
    pub evidence_count: usize,
    pub weighted_evidence: f64,
    pub mean_confidence: f64,
    pub recency_score: f64,
    /// Share of the weighted evidence coming from medium/high evidence.
    pub confidence_support: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use PatternState::*;
        assert!(None.can_transition_to(Suspected));
        assert!(!None.can_transition_to(Confirmed));
        assert!(!Suspected.can_transition_to(Stable));
        assert!(Stable.can_transition_to(None));
        assert!(!Stable.can_transition_to(Confirmed));
        assert!(!None.can_transition_to(None));
    }

    #[test]
    fn test_pattern_name_and_state_parse() {
        assert_eq!(
            pattern_name(RootCause::Correctness, Subtype::IncorrectBoundary),
            "correctness:incorrect_boundary"
        );
        assert_eq!("Confirmed".parse::<PatternState>().unwrap(), PatternState::Confirmed);
        assert!("dormant".parse::<PatternState>().is_err());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = PatternStateRecord::new("efficiency:state_loss");
        let json = serde_json::to_string(&record).unwrap();
        let back: PatternStateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
