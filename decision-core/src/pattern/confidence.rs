//! Confidence tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfidenceThresholds;

/// Discretized classifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Pure mapping from a scalar confidence. NaN is low.
    pub fn from_confidence(confidence: f64, thresholds: &ConfidenceThresholds) -> Self {
        if confidence >= thresholds.high {
            Self::High
        } else if confidence >= thresholds.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Low-tier evidence may be recorded but never surfaced as a claim.
    pub fn is_gated(self) -> bool {
        self == Self::Low
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}
