//! Pre-computed guidance for the text agents. No generation happens here.

use serde::{Deserialize, Serialize};

use crate::mechanism::{FailureMechanism, ProblemCategory};
use crate::pattern::PatternState;

use super::collaborators::PerformanceOutput;
use super::input::{ExperienceLevel, ProblemContext, Submission, UserProfile, UserStateSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
    Celebratory,
    Encouraging,
    Direct,
    Supportive,
}

/// How much of the fix the hint may give away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintDepth {
    Nudge,
    Guided,
    Detailed,
}

impl HintDepth {
    fn deeper(self) -> Self {
        match self {
            Self::Nudge => Self::Guided,
            Self::Guided | Self::Detailed => Self::Detailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInstructions {
    pub tone: FeedbackTone,
    /// Topic key for the hint, failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_focus: Option<String>,
    pub hint_depth: HintDepth,
    pub focus_areas: Vec<String>,
    /// Whether the agent may name the recurring pattern.
    pub mention_pattern: bool,
    /// Reinforcement only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
}

/// Attempts after which hints go one level deeper.
const DEEPER_HINT_ATTEMPT: u32 = 3;
const MAX_FOCUS_AREAS: usize = 3;

/// Inputs shared by both instruction builders.
pub struct InstructionContext<'a> {
    pub submission: &'a Submission,
    pub problem: Option<&'a ProblemContext>,
    pub snapshot: Option<&'a UserStateSnapshot>,
    pub profile: Option<&'a UserProfile>,
    pub performance: Option<&'a PerformanceOutput>,
    pub burnout_risk_threshold: f64,
    pub is_cold_start: bool,
}

impl InstructionContext<'_> {
    fn burnout(&self) -> bool {
        self.performance
            .is_some_and(|p| p.burnout_risk >= self.burnout_risk_threshold)
    }

    fn category(&self) -> Option<ProblemCategory> {
        self.problem.map(|p| ProblemCategory::normalize(&p.category))
    }

    fn hint_depth(&self) -> HintDepth {
        let base = match self.profile.map(|p| p.experience_level) {
            Some(ExperienceLevel::Beginner) => HintDepth::Detailed,
            Some(ExperienceLevel::Advanced) => HintDepth::Nudge,
            Some(ExperienceLevel::Intermediate) | None => HintDepth::Guided,
        };
        if self.submission.attempt_number >= DEEPER_HINT_ATTEMPT {
            base.deeper()
        } else {
            base
        }
    }
}

/// Instructions for an accepted submission.
pub fn reinforcement_instructions(ctx: &InstructionContext<'_>) -> AgentInstructions {
    let tone = if ctx.burnout() {
        FeedbackTone::Encouraging
    } else {
        FeedbackTone::Celebratory
    };
    let focus_areas = ctx
        .snapshot
        .map(|s| s.improving_areas.iter().take(MAX_FOCUS_AREAS).cloned().collect())
        .unwrap_or_default();

    AgentInstructions {
        tone,
        hint_focus: None,
        hint_depth: ctx.hint_depth(),
        focus_areas,
        mention_pattern: false,
        strengths: Some(strengths(ctx)),
    }
}

/// What went right, in a fixed order.
pub fn strengths(ctx: &InstructionContext<'_>) -> Vec<String> {
    let mut strengths = vec![format!("solved a {} problem", ctx.submission.difficulty)];
    if ctx.submission.attempt_number <= 1 {
        strengths.push("first attempt".to_string());
    }
    if let (Some(category), Some(snapshot)) = (ctx.category(), ctx.snapshot) {
        let strong = snapshot
            .strong_categories
            .iter()
            .any(|c| ProblemCategory::normalize(c) == category);
        if strong && category != ProblemCategory::Other {
            strengths.push(format!("consistent in {}", category.as_str()));
        }
    }
    strengths
}

/// Instructions for a failed submission with a resolved mechanism.
pub fn diagnosis_instructions(
    ctx: &InstructionContext<'_>,
    mechanism: FailureMechanism,
    pattern_name: &str,
    pattern_state: PatternState,
    pattern_surfaced: bool,
) -> AgentInstructions {
    let mention_pattern = pattern_surfaced
        && matches!(pattern_state, PatternState::Confirmed | PatternState::Stable);
    let tone = if ctx.is_cold_start || ctx.burnout() {
        FeedbackTone::Supportive
    } else if mention_pattern {
        FeedbackTone::Direct
    } else {
        FeedbackTone::Encouraging
    };

    let mut focus_areas = vec![mechanism.hint_focus().to_string()];
    if let (Some(category), Some(snapshot)) = (ctx.category(), ctx.snapshot) {
        let struggling = snapshot
            .stagnant_areas
            .iter()
            .chain(&snapshot.regressing_areas)
            .any(|a| ProblemCategory::normalize(a) == category);
        if struggling && category != ProblemCategory::Other {
            focus_areas.push(category.as_str().to_string());
        }
    }
    if let Some(snapshot) = ctx.snapshot {
        if snapshot.dominant_failure_modes.iter().any(|m| m == pattern_name) {
            focus_areas.push(pattern_name.to_string());
        }
    }
    focus_areas.dedup();
    focus_areas.truncate(MAX_FOCUS_AREAS);

    AgentInstructions {
        tone,
        hint_focus: Some(mechanism.hint_focus().to_string()),
        hint_depth: ctx.hint_depth(),
        focus_areas,
        mention_pattern,
        strengths: None,
    }
}

/// Conservative instructions when no diagnosis is available.
pub fn fallback_instructions(ctx: &InstructionContext<'_>, accepted: bool) -> AgentInstructions {
    if accepted {
        return AgentInstructions {
            tone: FeedbackTone::Celebratory,
            hint_focus: None,
            hint_depth: ctx.hint_depth(),
            focus_areas: Vec::new(),
            mention_pattern: false,
            strengths: Some(strengths(ctx)),
        };
    }
    let tone = if ctx.is_cold_start {
        FeedbackTone::Supportive
    } else {
        FeedbackTone::Encouraging
    };
    AgentInstructions {
        tone,
        hint_focus: None,
        hint_depth: ctx.hint_depth(),
        focus_areas: Vec::new(),
        mention_pattern: false,
        strengths: None,
    }
}
