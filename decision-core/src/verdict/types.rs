//! Judge verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Judge outcome of a submission.
///
/// Parsing never fails: anything unrecognized is `Unknown`, which belongs to
/// the failure family so it can never reach the reinforcement path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompileError,
    Unknown,
}

impl Verdict {
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "accepted" | "ac" | "ok" | "passed" => Self::Accepted,
            "wrong_answer" | "wa" => Self::WrongAnswer,
            "time_limit_exceeded" | "tle" | "timeout" => Self::TimeLimitExceeded,
            "memory_limit_exceeded" | "mle" => Self::MemoryLimitExceeded,
            "runtime_error" | "re" => Self::RuntimeError,
            "compile_error" | "compilation_error" | "ce" => Self::CompileError,
            _ => Self::Unknown,
        }
    }

    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }

    /// Resource-limit verdicts point at efficiency rather than correctness.
    pub fn is_resource_limit(self) -> bool {
        matches!(self, Self::TimeLimitExceeded | Self::MemoryLimitExceeded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::WrongAnswer => "wrong_answer",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::RuntimeError => "runtime_error",
            Self::CompileError => "compile_error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Verdict {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
