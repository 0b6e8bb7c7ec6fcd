//! External ML collaborators, specified only by interface.
//!
//! Implementations are synchronous. Callers that need a time budget wrap
//! their implementation and report an overrun as
//! [`CollaboratorError::Timeout`]; the engine treats it like any other
//! failure and falls back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::mechanism::Signals;
use crate::policy::Difficulty;

use super::input::{ProblemContext, Submission};

pub const FEATURE_EXTRACTOR: &str = "feature_extractor";
pub const ROOT_CAUSE_CLASSIFIER: &str = "root_cause_classifier";
pub const READINESS_PREDICTOR: &str = "readiness_predictor";
pub const PERFORMANCE_PREDICTOR: &str = "performance_predictor";

/// Features extracted from the submitted code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeFeatures {
    pub signals: Signals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub confidence: f64,
}

/// Root-cause classifier answer. The label may be legacy vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub alternatives: Vec<LabelScore>,
}

impl ClassifierOutput {
    pub fn validate(&self) -> Result<(), CollaboratorError> {
        if self.label.trim().is_empty() {
            return Err(malformed(ROOT_CAUSE_CLASSIFIER, "empty label"));
        }
        unit(ROOT_CAUSE_CLASSIFIER, "confidence", self.confidence)
    }
}

/// Readiness for each difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessOutput {
    pub current_level: Difficulty,
    pub easy_readiness: f64,
    pub medium_readiness: f64,
    pub hard_readiness: f64,
    pub recommended_difficulty: Difficulty,
}

impl ReadinessOutput {
    pub fn readiness_for(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy_readiness,
            Difficulty::Medium => self.medium_readiness,
            Difficulty::Hard => self.hard_readiness,
        }
    }

    pub fn validate(&self) -> Result<(), CollaboratorError> {
        unit(READINESS_PREDICTOR, "easy_readiness", self.easy_readiness)?;
        unit(READINESS_PREDICTOR, "medium_readiness", self.medium_readiness)?;
        unit(READINESS_PREDICTOR, "hard_readiness", self.hard_readiness)
    }
}

/// Short-horizon performance and risk outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceOutput {
    pub expected_success_rate: f64,
    pub plateau_risk: f64,
    pub burnout_risk: f64,
    /// Signed; negative means regressing.
    pub learning_velocity: f64,
}

impl PerformanceOutput {
    pub fn validate(&self) -> Result<(), CollaboratorError> {
        unit(PERFORMANCE_PREDICTOR, "expected_success_rate", self.expected_success_rate)?;
        unit(PERFORMANCE_PREDICTOR, "plateau_risk", self.plateau_risk)?;
        unit(PERFORMANCE_PREDICTOR, "burnout_risk", self.burnout_risk)?;
        if !self.learning_velocity.is_finite() {
            return Err(malformed(PERFORMANCE_PREDICTOR, "learning_velocity is not finite"));
        }
        Ok(())
    }
}

pub trait FeatureExtractor {
    fn extract(
        &self,
        submission: &Submission,
        problem: Option<&ProblemContext>,
    ) -> Result<CodeFeatures, CollaboratorError>;
}

pub trait RootCauseClassifier {
    fn classify(&self, features: &CodeFeatures) -> Result<ClassifierOutput, CollaboratorError>;
}

pub trait ReadinessPredictor {
    fn predict_readiness(&self, features: &CodeFeatures) -> Result<ReadinessOutput, CollaboratorError>;
}

pub trait PerformancePredictor {
    fn predict_performance(
        &self,
        features: &CodeFeatures,
    ) -> Result<PerformanceOutput, CollaboratorError>;
}

/// Shared collaborator handles. Swapping a handle for a reloaded model is
/// a matter of building a new `Collaborators` and a new engine.
#[derive(Clone)]
pub struct Collaborators {
    pub features: Arc<dyn FeatureExtractor + Send + Sync>,
    pub classifier: Arc<dyn RootCauseClassifier + Send + Sync>,
    pub readiness: Arc<dyn ReadinessPredictor + Send + Sync>,
    pub performance: Arc<dyn PerformancePredictor + Send + Sync>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// How much of the ML stack contributed to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationLevel {
    /// Every collaborator answered.
    Full,
    /// A collaborator failed; the decision is rule-based from the verdict.
    Unavailable,
}

impl std::fmt::Display for DegradationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

fn unit(collaborator: &'static str, field: &str, value: f64) -> Result<(), CollaboratorError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(malformed(collaborator, format!("{field} = {value} is outside [0, 1]")))
    }
}

fn malformed(collaborator: &'static str, detail: impl Into<String>) -> CollaboratorError {
    CollaboratorError::Malformed {
        collaborator,
        detail: detail.into(),
    }
}
