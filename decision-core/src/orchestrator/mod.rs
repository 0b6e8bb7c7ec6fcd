//! Decision orchestration: collaborators in, one frozen `Decision` out.

pub mod collaborators;
pub mod decision;
pub mod engine;
mod fallback;
pub mod input;
pub mod instructions;
pub mod misinterpretation;
pub mod mock;

pub use collaborators::{
    ClassifierOutput, CodeFeatures, Collaborators, DegradationLevel, FeatureExtractor,
    LabelScore, PerformanceOutput, PerformancePredictor, ReadinessOutput, ReadinessPredictor,
    RootCauseClassifier,
};
pub use decision::{Decision, DecisionDraft, PatternOutcome, PredictionSummary};
pub use engine::DecisionEngine;
pub use input::{
    ExperienceLevel, OutputMode, ProblemContext, Submission, UserHistory, UserProfile,
    UserStateSnapshot,
};
pub use instructions::{AgentInstructions, FeedbackTone, HintDepth};
pub use misinterpretation::{MisinterpretationFinding, MisinterpretationReason};
