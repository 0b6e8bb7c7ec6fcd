//! Label migration: maps raw classifier labels onto the canonical taxonomy.
//!
//! Classifier vocabularies drift: older models emit names like
//! `off_by_one_error` or `tle`. Every raw label passes through here before it
//! reaches the registry. Accepted forms, in lookup order:
//!
//! ```text
//! "root_cause:subtype" | "root_cause/subtype"   explicit pair
//! "legacy_name"                                 static legacy table
//! "subtype"                                     subtype's primary root cause
//! "root_cause"                                  root cause's primary subtype
//! ```
//!
//! Anything else is a `TaxonomyViolation::UnknownLabel`. Migrated pairs are
//! validated against the registry so a bad table entry fails loudly.

use serde::{Deserialize, Serialize};

use crate::error::TaxonomyViolation;

use super::normalize_label;
use super::registry::TaxonomyRegistry;
use super::types::{RootCause, Subtype};

/// Legacy label → canonical pair.
const LEGACY_LABELS: &[(&str, RootCause, Subtype)] = &[
    ("off_by_one_error", RootCause::Correctness, Subtype::IncorrectBoundary),
    ("off_by_one", RootCause::Correctness, Subtype::IncorrectBoundary),
    ("boundary_error", RootCause::Correctness, Subtype::IncorrectBoundary),
    ("index_out_of_bounds", RootCause::Implementation, Subtype::IncorrectBoundary),
    ("edge_case_error", RootCause::Correctness, Subtype::PartialCaseHandling),
    ("missed_edge_case", RootCause::Correctness, Subtype::PartialCaseHandling),
    ("null_handling", RootCause::Implementation, Subtype::PartialCaseHandling),
    ("logic_error", RootCause::Correctness, Subtype::WrongInvariant),
    ("wrong_logic", RootCause::Correctness, Subtype::WrongInvariant),
    ("variable_reset", RootCause::Implementation, Subtype::StateLoss),
    ("state_management", RootCause::Implementation, Subtype::StateLoss),
    ("tle", RootCause::Efficiency, Subtype::BruteForceUnderConstraints),
    ("time_complexity", RootCause::Efficiency, Subtype::BruteForceUnderConstraints),
    ("inefficient_algorithm", RootCause::Efficiency, Subtype::BruteForceUnderConstraints),
    ("redundant_computation", RootCause::Efficiency, Subtype::RedundantRecomputation),
    ("missing_memoization", RootCause::Efficiency, Subtype::RedundantRecomputation),
    ("wrong_data_structure", RootCause::Efficiency, Subtype::SuboptimalDataStructure),
    ("mle", RootCause::Efficiency, Subtype::SuboptimalDataStructure),
    ("over_engineering", RootCause::Implementation, Subtype::PrematureOptimization),
    ("constraint_violation", RootCause::UnderstandingGap, Subtype::MisreadConstraint),
    ("integer_overflow", RootCause::UnderstandingGap, Subtype::MisreadConstraint),
    ("wrong_algorithm", RootCause::UnderstandingGap, Subtype::MissingConcept),
    ("conceptual_error", RootCause::UnderstandingGap, Subtype::MissingConcept),
    ("misunderstood_problem", RootCause::ProblemMisinterpretation, Subtype::MisreadProblemStatement),
    ("output_format_error", RootCause::ProblemMisinterpretation, Subtype::WrongOutputFormat),
    ("input_parsing_error", RootCause::ProblemMisinterpretation, Subtype::WrongInputSchema),
];

/// Legacy root-cause names that still appear on the left of `a:b` labels.
const LEGACY_ROOT_CAUSES: &[(&str, RootCause)] = &[
    ("logic", RootCause::Correctness),
    ("wrong_answer", RootCause::Correctness),
    ("performance", RootCause::Efficiency),
    ("time_limit", RootCause::Efficiency),
    ("coding", RootCause::Implementation),
    ("conceptual", RootCause::UnderstandingGap),
    ("misinterpretation", RootCause::ProblemMisinterpretation),
];

/// How a raw label was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationKind {
    /// Already canonical (`root:subtype`).
    Canonical,
    /// Found in the legacy table.
    Legacy,
    /// Bare subtype, root cause inferred.
    SubtypeOnly,
    /// Bare root cause, subtype inferred.
    RootCauseOnly,
}

/// Result of migrating a raw label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigratedLabel {
    pub raw: String,
    pub root_cause: RootCause,
    pub subtype: Subtype,
    pub kind: MigrationKind,
}

/// Subtype assumed when the classifier only names a root cause.
pub fn primary_subtype(root_cause: RootCause) -> Subtype {
    match root_cause {
        RootCause::Correctness => Subtype::WrongInvariant,
        RootCause::Efficiency => Subtype::BruteForceUnderConstraints,
        RootCause::Implementation => Subtype::StateLoss,
        RootCause::UnderstandingGap => Subtype::MissingConcept,
        RootCause::ProblemMisinterpretation => Subtype::MisreadProblemStatement,
    }
}

/// Stateless label migrator bound to a registry.
#[derive(Debug, Clone, Copy)]
pub struct LabelMigrator<'a> {
    registry: &'a TaxonomyRegistry,
}

impl<'a> LabelMigrator<'a> {
    pub fn new(registry: &'a TaxonomyRegistry) -> Self {
        Self { registry }
    }

    /// Map a raw classifier label to a validated canonical pair.
    pub fn migrate(&self, raw: &str) -> Result<MigratedLabel, TaxonomyViolation> {
        let (root_cause, subtype, kind) = self.interpret(raw)?;
        self.registry.validate(root_cause, subtype)?;
        Ok(MigratedLabel {
            raw: raw.to_string(),
            root_cause,
            subtype,
            kind,
        })
    }

    fn interpret(&self, raw: &str) -> Result<(RootCause, Subtype, MigrationKind), TaxonomyViolation> {
        if let Some((left, right)) = raw.split_once([':', '/']) {
            let root_cause = parse_root_cause(left)?;
            let subtype: Subtype = right.parse()?;
            return Ok((root_cause, subtype, MigrationKind::Canonical));
        }

        let key = normalize_label(raw);
        if let Some((_, rc, st)) = LEGACY_LABELS.iter().find(|(name, _, _)| *name == key) {
            return Ok((*rc, *st, MigrationKind::Legacy));
        }
        if let Ok(st) = key.parse::<Subtype>() {
            return Ok((st.primary_root_cause(), st, MigrationKind::SubtypeOnly));
        }
        if let Ok(rc) = parse_root_cause(&key) {
            return Ok((rc, primary_subtype(rc), MigrationKind::RootCauseOnly));
        }

        Err(TaxonomyViolation::UnknownLabel {
            label: raw.to_string(),
        })
    }
}

fn parse_root_cause(label: &str) -> Result<RootCause, TaxonomyViolation> {
    let key = normalize_label(label);
    if let Some((_, rc)) = LEGACY_ROOT_CAUSES.iter().find(|(name, _)| *name == key) {
        return Ok(*rc);
    }
    key.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrate(raw: &str) -> Result<MigratedLabel, TaxonomyViolation> {
        let registry = TaxonomyRegistry::canonical();
        LabelMigrator::new(&registry).migrate(raw)
    }

    #[test]
    fn test_legacy_table_entries_are_all_valid_pairs() {
        let registry = TaxonomyRegistry::canonical();
        for (name, rc, st) in LEGACY_LABELS {
            assert!(registry.is_valid_pair(*rc, *st), "legacy label {name} maps to invalid pair");
        }
    }

    #[test]
    fn test_primary_defaults_are_valid_pairs() {
        let registry = TaxonomyRegistry::canonical();
        for rc in RootCause::ALL {
            assert!(registry.is_valid_pair(rc, primary_subtype(rc)));
        }
        for st in Subtype::ALL {
            assert!(registry.is_valid_pair(st.primary_root_cause(), st));
        }
    }

    #[test]
    fn test_off_by_one_error_migrates_to_boundary() {
        let migrated = migrate("Off-By-One Error").unwrap();
        assert_eq!(migrated.root_cause, RootCause::Correctness);
        assert_eq!(migrated.subtype, Subtype::IncorrectBoundary);
        assert_eq!(migrated.kind, MigrationKind::Legacy);
    }

    #[test]
    fn test_explicit_pair_forms() {
        let migrated = migrate("implementation:state_loss").unwrap();
        assert_eq!(migrated.kind, MigrationKind::Canonical);
        assert_eq!(migrated.root_cause, RootCause::Implementation);

        let migrated = migrate("performance/redundant_recomputation").unwrap();
        assert_eq!(migrated.root_cause, RootCause::Efficiency);
        assert_eq!(migrated.subtype, Subtype::RedundantRecomputation);
    }

    #[test]
    fn test_bare_labels_infer_the_missing_half() {
        let migrated = migrate("misread_constraint").unwrap();
        assert_eq!(migrated.kind, MigrationKind::SubtypeOnly);
        assert_eq!(migrated.root_cause, RootCause::UnderstandingGap);

        let migrated = migrate("efficiency").unwrap();
        assert_eq!(migrated.kind, MigrationKind::RootCauseOnly);
        assert_eq!(migrated.subtype, Subtype::BruteForceUnderConstraints);
    }

    #[test]
    fn test_explicit_invalid_pair_is_a_violation() {
        assert!(matches!(
            migrate("efficiency:wrong_output_format"),
            Err(TaxonomyViolation::InvalidPair { .. })
        ));
    }

    #[test]
    fn test_unknown_label_is_a_violation() {
        assert!(matches!(
            migrate("cosmic_ray"),
            Err(TaxonomyViolation::UnknownLabel { .. })
        ));
    }
}
