//! Static resolution tables.
//!
//! One `SubtypeRules` entry per canonical subtype. Signal rules are checked
//! in slice order, then category rules, then the default. The
//! `ROOT_CAUSE_DEFAULTS` table refines the default for overlapping subtypes
//! whose meaning shifts with the root cause.

use serde::Serialize;

use crate::taxonomy::{RootCause, Subtype};

use super::category::ProblemCategory;
use super::signals::Signals;
use super::types::FailureMechanism as M;

/// Condition over the signal map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalCondition {
    /// Signal is set.
    Set { name: &'static str },
    /// Numeric signal is at least `min`.
    AtLeast { name: &'static str, min: f64 },
    /// `name` is set while `absent` is not.
    SetWithout {
        name: &'static str,
        absent: &'static str,
    },
}

impl SignalCondition {
    pub fn matches(&self, signals: &Signals) -> bool {
        match *self {
            Self::Set { name } => signals.is_set(name),
            Self::AtLeast { name, min } => signals.number(name).is_some_and(|n| n >= min),
            Self::SetWithout { name, absent } => signals.is_set(name) && !signals.is_set(absent),
        }
    }

    /// Primary signal name, for audit.
    pub fn signal_name(&self) -> &'static str {
        match *self {
            Self::Set { name } | Self::AtLeast { name, .. } | Self::SetWithout { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SignalRule {
    pub condition: SignalCondition,
    pub mechanism: M,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubtypeRules {
    pub subtype: Subtype,
    pub signals: &'static [SignalRule],
    pub categories: &'static [(ProblemCategory, M)],
    pub default: M,
}

const fn set(name: &'static str, mechanism: M) -> SignalRule {
    SignalRule {
        condition: SignalCondition::Set { name },
        mechanism,
    }
}

const fn at_least(name: &'static str, min: f64, mechanism: M) -> SignalRule {
    SignalRule {
        condition: SignalCondition::AtLeast { name, min },
        mechanism,
    }
}

const fn set_without(name: &'static str, absent: &'static str, mechanism: M) -> SignalRule {
    SignalRule {
        condition: SignalCondition::SetWithout { name, absent },
        mechanism,
    }
}

use ProblemCategory as C;

pub const CANONICAL_RULES: &[SubtypeRules] = &[
    SubtypeRules {
        subtype: Subtype::WrongInvariant,
        signals: &[
            set("loop_invariant", M::LoopInvariantBroken),
            set("greedy_choice", M::GreedyChoiceUnjustified),
            set("dp_transition", M::DpStateDefinitionError),
        ],
        categories: &[
            (C::Greedy, M::GreedyChoiceUnjustified),
            (C::DynamicProgramming, M::DpStateDefinitionError),
            (C::Graph, M::GraphVisitStateError),
            (C::SlidingWindow, M::WindowBoundaryDrift),
            (C::TwoPointers, M::LoopInvariantBroken),
        ],
        default: M::LoopInvariantBroken,
    },
    SubtypeRules {
        subtype: Subtype::IncorrectBoundary,
        signals: &[
            set("loop_bounds", M::OffByOne),
            set("binary_search", M::BinarySearchBounds),
            set("sliding_window", M::WindowBoundaryDrift),
            set("empty_check_missing", M::EmptyInputUnhandled),
        ],
        categories: &[
            (C::BinarySearch, M::BinarySearchBounds),
            (C::SlidingWindow, M::WindowBoundaryDrift),
            (C::TwoPointers, M::OffByOne),
            (C::Arrays, M::OffByOne),
            (C::Strings, M::OffByOne),
        ],
        default: M::BoundaryMiss,
    },
    SubtypeRules {
        subtype: Subtype::PartialCaseHandling,
        signals: &[
            set("empty_check_missing", M::EmptyInputUnhandled),
            set("early_return", M::EdgeCaseOmission),
        ],
        categories: &[
            (C::Tree, M::EmptyInputUnhandled),
            (C::Graph, M::GraphVisitStateError),
        ],
        default: M::EdgeCaseOmission,
    },
    SubtypeRules {
        subtype: Subtype::StateLoss,
        signals: &[
            set("memo", M::MemoNotPersisted),
            set("recursion_depth", M::RecursionStateLeak),
            set("global_state", M::StaleGlobalState),
        ],
        categories: &[
            (C::DynamicProgramming, M::MemoNotPersisted),
            (C::Recursion, M::RecursionStateLeak),
            (C::Graph, M::GraphVisitStateError),
        ],
        default: M::StateNotPreserved,
    },
    SubtypeRules {
        subtype: Subtype::BruteForceUnderConstraints,
        signals: &[
            at_least("nested_loop_depth", 2.0, M::QuadraticScan),
            set_without("recursion_depth", "memo", M::ExponentialRecursion),
        ],
        categories: &[
            (C::DynamicProgramming, M::ExponentialRecursion),
            (C::Recursion, M::ExponentialRecursion),
            (C::Arrays, M::QuadraticScan),
            (C::Strings, M::QuadraticScan),
            (C::TwoPointers, M::QuadraticScan),
            (C::SlidingWindow, M::QuadraticScan),
        ],
        default: M::ComplexityExplosion,
    },
    SubtypeRules {
        subtype: Subtype::RedundantRecomputation,
        signals: &[
            set_without("recursion_depth", "memo", M::RepeatedSubproblem),
            set("memo", M::MemoNotPersisted),
        ],
        categories: &[
            (C::DynamicProgramming, M::RepeatedSubproblem),
            (C::Recursion, M::RepeatedSubproblem),
        ],
        default: M::RepeatedSubproblem,
    },
    SubtypeRules {
        subtype: Subtype::SuboptimalDataStructure,
        signals: &[
            set("linear_search_in_loop", M::LinearLookupInLoop),
            at_least("nested_loop_depth", 2.0, M::QuadraticScan),
        ],
        categories: &[
            (C::HashTable, M::LinearLookupInLoop),
            (C::Sorting, M::QuadraticScan),
        ],
        default: M::LinearLookupInLoop,
    },
    SubtypeRules {
        subtype: Subtype::PrematureOptimization,
        signals: &[set("bit_manipulation", M::OptimizationIntroducedBug)],
        categories: &[],
        default: M::OptimizationIntroducedBug,
    },
    SubtypeRules {
        subtype: Subtype::MisreadConstraint,
        signals: &[
            set("overflow_risk", M::IntegerOverflow),
            at_least("nested_loop_depth", 2.0, M::ConstraintScaleMisjudged),
        ],
        categories: &[(C::Math, M::IntegerOverflow)],
        default: M::ConstraintScaleMisjudged,
    },
    SubtypeRules {
        subtype: Subtype::MissingConcept,
        signals: &[],
        categories: &[
            (C::DynamicProgramming, M::DpStateDefinitionError),
            (C::Greedy, M::GreedyChoiceUnjustified),
            (C::Graph, M::GraphVisitStateError),
        ],
        default: M::ConceptNotApplied,
    },
    SubtypeRules {
        subtype: Subtype::MisreadProblemStatement,
        signals: &[
            set("output_format_mismatch", M::OutputFormatMismatch),
            set("input_parse_mismatch", M::InputSchemaMismatch),
        ],
        categories: &[],
        default: M::ProblemGoalMisread,
    },
    SubtypeRules {
        subtype: Subtype::WrongOutputFormat,
        signals: &[],
        categories: &[],
        default: M::OutputFormatMismatch,
    },
    SubtypeRules {
        subtype: Subtype::WrongInputSchema,
        signals: &[],
        categories: &[],
        default: M::InputSchemaMismatch,
    },
];

/// Defaults that depend on the root cause as well as the subtype.
pub const ROOT_CAUSE_DEFAULTS: &[(RootCause, Subtype, M)] = &[
    (RootCause::UnderstandingGap, Subtype::WrongInvariant, M::ConceptNotApplied),
    (RootCause::Implementation, Subtype::PartialCaseHandling, M::EmptyInputUnhandled),
    (RootCause::ProblemMisinterpretation, Subtype::MisreadConstraint, M::ProblemGoalMisread),
];
