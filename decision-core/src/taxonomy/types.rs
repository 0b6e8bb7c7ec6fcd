//! Root causes and subtypes: the closed label vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxonomyViolation;

use super::normalize_label;

/// Coarse category of why a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCause {
    /// The algorithm produces wrong answers.
    Correctness,
    /// Right answers, too slow or too much memory.
    Efficiency,
    /// Right idea, broken translation into code.
    Implementation,
    /// A required concept is missing or misapplied.
    UnderstandingGap,
    /// The solution answers a different problem.
    ProblemMisinterpretation,
}

impl RootCause {
    pub const ALL: [RootCause; 5] = [
        RootCause::Correctness,
        RootCause::Efficiency,
        RootCause::Implementation,
        RootCause::UnderstandingGap,
        RootCause::ProblemMisinterpretation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correctness => "correctness",
            Self::Efficiency => "efficiency",
            Self::Implementation => "implementation",
            Self::UnderstandingGap => "understanding_gap",
            Self::ProblemMisinterpretation => "problem_misinterpretation",
        }
    }
}

impl fmt::Display for RootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootCause {
    type Err = TaxonomyViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|rc| rc.as_str() == key)
            .ok_or_else(|| TaxonomyViolation::UnknownRootCause {
                label: s.to_string(),
            })
    }
}

/// Fine-grained failure category. Valid under one or more root causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    WrongInvariant,
    IncorrectBoundary,
    PartialCaseHandling,
    StateLoss,
    BruteForceUnderConstraints,
    RedundantRecomputation,
    SuboptimalDataStructure,
    PrematureOptimization,
    MisreadConstraint,
    MissingConcept,
    MisreadProblemStatement,
    WrongOutputFormat,
    WrongInputSchema,
}

impl Subtype {
    pub const ALL: [Subtype; 13] = [
        Subtype::WrongInvariant,
        Subtype::IncorrectBoundary,
        Subtype::PartialCaseHandling,
        Subtype::StateLoss,
        Subtype::BruteForceUnderConstraints,
        Subtype::RedundantRecomputation,
        Subtype::SuboptimalDataStructure,
        Subtype::PrematureOptimization,
        Subtype::MisreadConstraint,
        Subtype::MissingConcept,
        Subtype::MisreadProblemStatement,
        Subtype::WrongOutputFormat,
        Subtype::WrongInputSchema,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WrongInvariant => "wrong_invariant",
            Self::IncorrectBoundary => "incorrect_boundary",
            Self::PartialCaseHandling => "partial_case_handling",
            Self::StateLoss => "state_loss",
            Self::BruteForceUnderConstraints => "brute_force_under_constraints",
            Self::RedundantRecomputation => "redundant_recomputation",
            Self::SuboptimalDataStructure => "suboptimal_data_structure",
            Self::PrematureOptimization => "premature_optimization",
            Self::MisreadConstraint => "misread_constraint",
            Self::MissingConcept => "missing_concept",
            Self::MisreadProblemStatement => "misread_problem_statement",
            Self::WrongOutputFormat => "wrong_output_format",
            Self::WrongInputSchema => "wrong_input_schema",
        }
    }

    /// Root cause used when a bare subtype label arrives without one.
    pub fn primary_root_cause(self) -> RootCause {
        match self {
            Self::WrongInvariant
            | Self::IncorrectBoundary
            | Self::PartialCaseHandling
            | Self::StateLoss => RootCause::Correctness,
            Self::BruteForceUnderConstraints
            | Self::RedundantRecomputation
            | Self::SuboptimalDataStructure => RootCause::Efficiency,
            Self::PrematureOptimization => RootCause::Implementation,
            Self::MisreadConstraint | Self::MissingConcept => RootCause::UnderstandingGap,
            Self::MisreadProblemStatement | Self::WrongOutputFormat | Self::WrongInputSchema => {
                RootCause::ProblemMisinterpretation
            }
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = TaxonomyViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == key)
            .ok_or_else(|| TaxonomyViolation::UnknownSubtype {
                label: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_parse_is_case_and_separator_insensitive() {
        assert_eq!(
            "Understanding-Gap".parse::<RootCause>().unwrap(),
            RootCause::UnderstandingGap
        );
        assert_eq!(
            " problem misinterpretation ".parse::<RootCause>().unwrap(),
            RootCause::ProblemMisinterpretation
        );
        assert!(matches!(
            "syntax".parse::<RootCause>(),
            Err(TaxonomyViolation::UnknownRootCause { .. })
        ));
    }

    #[test]
    fn test_subtype_display_round_trips_through_from_str() {
        for st in Subtype::ALL {
            assert_eq!(st.to_string().parse::<Subtype>().unwrap(), st);
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Subtype::BruteForceUnderConstraints).unwrap();
        assert_eq!(json, "\"brute_force_under_constraints\"");
        let rc: RootCause = serde_json::from_str("\"understanding_gap\"").unwrap();
        assert_eq!(rc, RootCause::UnderstandingGap);
    }
}
