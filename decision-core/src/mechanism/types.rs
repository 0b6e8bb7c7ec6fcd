//! Failure mechanisms: concrete explanations of how a subtype manifested.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Concrete, non-generic mechanism label.
///
/// `TaxonomyCoverageGap` is the single reserved non-specific value. It is
/// only produced when no rule matched and is always logged as an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMechanism {
    OffByOne,
    BoundaryMiss,
    BinarySearchBounds,
    WindowBoundaryDrift,
    EmptyInputUnhandled,
    EdgeCaseOmission,
    LoopInvariantBroken,
    GreedyChoiceUnjustified,
    DpStateDefinitionError,
    GraphVisitStateError,
    StateNotPreserved,
    StaleGlobalState,
    MemoNotPersisted,
    RecursionStateLeak,
    ComplexityExplosion,
    ExponentialRecursion,
    QuadraticScan,
    RepeatedSubproblem,
    LinearLookupInLoop,
    OptimizationIntroducedBug,
    IntegerOverflow,
    ConstraintScaleMisjudged,
    ConceptNotApplied,
    ProblemGoalMisread,
    OutputFormatMismatch,
    InputSchemaMismatch,
    TaxonomyCoverageGap,
}

impl FailureMechanism {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OffByOne => "off_by_one",
            Self::BoundaryMiss => "boundary_miss",
            Self::BinarySearchBounds => "binary_search_bounds",
            Self::WindowBoundaryDrift => "window_boundary_drift",
            Self::EmptyInputUnhandled => "empty_input_unhandled",
            Self::EdgeCaseOmission => "edge_case_omission",
            Self::LoopInvariantBroken => "loop_invariant_broken",
            Self::GreedyChoiceUnjustified => "greedy_choice_unjustified",
            Self::DpStateDefinitionError => "dp_state_definition_error",
            Self::GraphVisitStateError => "graph_visit_state_error",
            Self::StateNotPreserved => "state_not_preserved",
            Self::StaleGlobalState => "stale_global_state",
            Self::MemoNotPersisted => "memo_not_persisted",
            Self::RecursionStateLeak => "recursion_state_leak",
            Self::ComplexityExplosion => "complexity_explosion",
            Self::ExponentialRecursion => "exponential_recursion",
            Self::QuadraticScan => "quadratic_scan",
            Self::RepeatedSubproblem => "repeated_subproblem",
            Self::LinearLookupInLoop => "linear_lookup_in_loop",
            Self::OptimizationIntroducedBug => "optimization_introduced_bug",
            Self::IntegerOverflow => "integer_overflow",
            Self::ConstraintScaleMisjudged => "constraint_scale_misjudged",
            Self::ConceptNotApplied => "concept_not_applied",
            Self::ProblemGoalMisread => "problem_goal_misread",
            Self::OutputFormatMismatch => "output_format_mismatch",
            Self::InputSchemaMismatch => "input_schema_mismatch",
            Self::TaxonomyCoverageGap => "taxonomy_coverage_gap",
        }
    }

    /// Whether this is the reserved coverage-gap sentinel.
    pub fn is_coverage_gap(self) -> bool {
        self == Self::TaxonomyCoverageGap
    }

    /// Topic key the hint generator should steer toward.
    pub fn hint_focus(self) -> &'static str {
        match self {
            Self::OffByOne | Self::BoundaryMiss => "loop_bounds",
            Self::BinarySearchBounds => "search_interval",
            Self::WindowBoundaryDrift => "window_invariant",
            Self::EmptyInputUnhandled | Self::EdgeCaseOmission => "edge_cases",
            Self::LoopInvariantBroken => "loop_invariant",
            Self::GreedyChoiceUnjustified => "greedy_proof",
            Self::DpStateDefinitionError => "dp_state",
            Self::GraphVisitStateError => "visited_set",
            Self::StateNotPreserved | Self::StaleGlobalState => "state_lifetime",
            Self::MemoNotPersisted | Self::RepeatedSubproblem => "memoization",
            Self::RecursionStateLeak => "recursion_state",
            Self::ComplexityExplosion | Self::QuadraticScan => "complexity_budget",
            Self::ExponentialRecursion => "recursion_tree",
            Self::LinearLookupInLoop => "data_structure_choice",
            Self::OptimizationIntroducedBug => "simplify_first",
            Self::IntegerOverflow => "value_ranges",
            Self::ConstraintScaleMisjudged => "constraint_reading",
            Self::ConceptNotApplied => "core_concept",
            Self::ProblemGoalMisread => "problem_statement",
            Self::OutputFormatMismatch => "output_contract",
            Self::InputSchemaMismatch => "input_contract",
            Self::TaxonomyCoverageGap => "general_review",
        }
    }
}

impl fmt::Display for FailureMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
