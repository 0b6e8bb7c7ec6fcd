//! Deterministic mock collaborators for tests and local wiring.

use std::sync::Arc;

use crate::error::CollaboratorError;
use crate::mechanism::Signals;
use crate::policy::Difficulty;

use super::collaborators::{
    ClassifierOutput, CodeFeatures, Collaborators, FeatureExtractor, PerformanceOutput,
    PerformancePredictor, ReadinessOutput, ReadinessPredictor, RootCauseClassifier,
    FEATURE_EXTRACTOR, PERFORMANCE_PREDICTOR, READINESS_PREDICTOR, ROOT_CAUSE_CLASSIFIER,
};
use super::input::{ProblemContext, Submission};

/// How a mock should fail, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Timeout,
    Malformed,
    Error,
}

impl MockFailure {
    fn into_error(self, collaborator: &'static str) -> CollaboratorError {
        match self {
            Self::Timeout => CollaboratorError::Timeout {
                collaborator,
                budget_ms: 250,
            },
            Self::Malformed => CollaboratorError::Malformed {
                collaborator,
                detail: "simulated malformed response".to_string(),
            },
            Self::Error => CollaboratorError::Failed {
                collaborator,
                source: anyhow::anyhow!("simulated failure"),
            },
        }
    }
}

/// Returns a fixed signal set.
#[derive(Debug, Clone, Default)]
pub struct MockFeatureExtractor {
    pub signals: Signals,
    pub failure: Option<MockFailure>,
}

impl MockFeatureExtractor {
    pub fn with_signals(signals: Signals) -> Self {
        Self {
            signals,
            failure: None,
        }
    }
}

impl FeatureExtractor for MockFeatureExtractor {
    fn extract(
        &self,
        _submission: &Submission,
        _problem: Option<&ProblemContext>,
    ) -> Result<CodeFeatures, CollaboratorError> {
        if let Some(failure) = self.failure {
            return Err(failure.into_error(FEATURE_EXTRACTOR));
        }
        Ok(CodeFeatures {
            signals: self.signals.clone(),
        })
    }
}

/// Returns a fixed label and confidence.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub label: String,
    pub confidence: f64,
    pub failure: Option<MockFailure>,
}

impl MockClassifier {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            failure: None,
        }
    }

    pub fn failing(failure: MockFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new("correctness", 0.0)
        }
    }
}

impl RootCauseClassifier for MockClassifier {
    fn classify(&self, _features: &CodeFeatures) -> Result<ClassifierOutput, CollaboratorError> {
        if let Some(failure) = self.failure {
            return Err(failure.into_error(ROOT_CAUSE_CLASSIFIER));
        }
        Ok(ClassifierOutput {
            label: self.label.clone(),
            confidence: self.confidence,
            alternatives: Vec::new(),
        })
    }
}

/// Returns the same readiness for every call.
#[derive(Debug, Clone)]
pub struct MockReadiness {
    pub output: ReadinessOutput,
    pub failure: Option<MockFailure>,
}

impl MockReadiness {
    /// Uniform readiness at every level.
    pub fn uniform(level: Difficulty, readiness: f64) -> Self {
        Self {
            output: ReadinessOutput {
                current_level: level,
                easy_readiness: readiness,
                medium_readiness: readiness,
                hard_readiness: readiness,
                recommended_difficulty: level,
            },
            failure: None,
        }
    }
}

impl Default for MockReadiness {
    fn default() -> Self {
        Self::uniform(Difficulty::Medium, 0.6)
    }
}

impl ReadinessPredictor for MockReadiness {
    fn predict_readiness(&self, _features: &CodeFeatures) -> Result<ReadinessOutput, CollaboratorError> {
        if let Some(failure) = self.failure {
            return Err(failure.into_error(READINESS_PREDICTOR));
        }
        Ok(self.output.clone())
    }
}

/// Returns the same outlook for every call.
#[derive(Debug, Clone)]
pub struct MockPerformance {
    pub output: PerformanceOutput,
    pub failure: Option<MockFailure>,
}

impl Default for MockPerformance {
    fn default() -> Self {
        Self {
            output: PerformanceOutput {
                expected_success_rate: 0.6,
                plateau_risk: 0.2,
                burnout_risk: 0.1,
                learning_velocity: 0.05,
            },
            failure: None,
        }
    }
}

impl PerformancePredictor for MockPerformance {
    fn predict_performance(
        &self,
        _features: &CodeFeatures,
    ) -> Result<PerformanceOutput, CollaboratorError> {
        if let Some(failure) = self.failure {
            return Err(failure.into_error(PERFORMANCE_PREDICTOR));
        }
        Ok(self.output.clone())
    }
}

/// Builder over the four mocks.
#[derive(Debug, Clone)]
pub struct MockCollaborators {
    pub features: MockFeatureExtractor,
    pub classifier: MockClassifier,
    pub readiness: MockReadiness,
    pub performance: MockPerformance,
}

impl MockCollaborators {
    /// Healthy mocks answering `label` at `confidence`.
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            features: MockFeatureExtractor::default(),
            classifier: MockClassifier::new(label, confidence),
            readiness: MockReadiness::default(),
            performance: MockPerformance::default(),
        }
    }

    pub fn with_signals(mut self, signals: Signals) -> Self {
        self.features.signals = signals;
        self
    }

    pub fn with_readiness(mut self, readiness: MockReadiness) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn with_performance(mut self, output: PerformanceOutput) -> Self {
        self.performance.output = output;
        self
    }

    pub fn failing_classifier(mut self, failure: MockFailure) -> Self {
        self.classifier.failure = Some(failure);
        self
    }

    pub fn failing_readiness(mut self, failure: MockFailure) -> Self {
        self.readiness.failure = Some(failure);
        self
    }

    pub fn failing_performance(mut self, failure: MockFailure) -> Self {
        self.performance.failure = Some(failure);
        self
    }

    pub fn failing_features(mut self, failure: MockFailure) -> Self {
        self.features.failure = Some(failure);
        self
    }

    pub fn build(self) -> Collaborators {
        Collaborators {
            features: Arc::new(self.features),
            classifier: Arc::new(self.classifier),
            readiness: Arc::new(self.readiness),
            performance: Arc::new(self.performance),
        }
    }
}
