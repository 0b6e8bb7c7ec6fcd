//! Per-request inputs to `DecisionEngine::decide`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pattern::{PatternState, PatternStateRecord};
use crate::policy::{Difficulty, DifficultyAction};
use crate::verdict::Verdict;

/// One judged submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: String,
    pub user_id: String,
    pub problem_id: String,
    /// Raw judge verdict, e.g. `"wrong_answer"` or `"TLE"`.
    pub verdict: String,
    pub code: String,
    pub language: String,
    pub difficulty: Difficulty,
    #[serde(default = "default_attempt")]
    pub attempt_number: u32,
    pub submitted_at: DateTime<Utc>,
}

fn default_attempt() -> u32 {
    1
}

/// Caller-owned learner state. Nothing here is mutated by the engine; the
/// updated values come back inside the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserHistory {
    pub user_id: String,
    /// Submissions before this one.
    #[serde(default)]
    pub total_submissions: u32,
    /// Prior verdicts, oldest first.
    #[serde(default)]
    pub recent_verdicts: Vec<String>,
    pub current_difficulty: Difficulty,
    #[serde(default)]
    pub consecutive_eligible: u32,
    #[serde(default)]
    pub submissions_since_change: Option<u32>,
    #[serde(default)]
    pub last_action: Option<DifficultyAction>,
    /// Pattern records keyed by pattern name.
    #[serde(default)]
    pub patterns: BTreeMap<String, PatternStateRecord>,
}

impl UserHistory {
    /// Fresh history for a user with no submissions.
    pub fn new(user_id: impl Into<String>, current_difficulty: Difficulty) -> Self {
        Self {
            user_id: user_id.into(),
            total_submissions: 0,
            recent_verdicts: Vec::new(),
            current_difficulty,
            consecutive_eligible: 0,
            submissions_since_change: None,
            last_action: None,
            patterns: BTreeMap::new(),
        }
    }

    /// The last `window` verdicts, counting the current one.
    pub fn recent_window(&self, current: Verdict, window: usize) -> Vec<Verdict> {
        let prior = window.saturating_sub(1);
        let skip = self.recent_verdicts.len().saturating_sub(prior);
        self.recent_verdicts[skip..]
            .iter()
            .map(|v| Verdict::parse(v))
            .chain(std::iter::once(current))
            .collect()
    }

    /// Most restrictive state across the stored records, for the pattern gate.
    /// An unsettled pattern outranks stable and none.
    pub fn most_restrictive_pattern(&self) -> PatternState {
        most_restrictive(self.patterns.values().map(|r| r.state))
    }
}

pub(crate) fn most_restrictive(states: impl Iterator<Item = PatternState>) -> PatternState {
    states
        .max_by_key(|state| match state {
            PatternState::None => 0,
            PatternState::Stable => 1,
            PatternState::Suspected => 2,
            PatternState::Confirmed => 3,
        })
        .unwrap_or(PatternState::None)
}

/// How the problem expects the answer to be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Return,
    Stdout,
}

/// Static facts about the problem being solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemContext {
    pub problem_id: String,
    /// Free-form category text; normalized by the mechanism resolver.
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub expected_function: Option<String>,
    #[serde(default)]
    pub expected_params: Option<usize>,
    #[serde(default)]
    pub output_mode: Option<OutputMode>,
}

/// Pre-computed, read-only summary of the learner's trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStateSnapshot {
    pub dominant_failure_modes: Vec<String>,
    pub stagnant_areas: Vec<String>,
    pub improving_areas: Vec<String>,
    pub regressing_areas: Vec<String>,
    pub strong_categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

/// Learner profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub experience_level: ExperienceLevel,
    pub preferred_language: Option<String>,
}
