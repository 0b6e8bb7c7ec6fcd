//! Taxonomy registry: the authoritative RootCause ↔ Subtype validity mask.
//!
//! The relation is many-to-many: `misread_constraint` is valid under
//! efficiency, understanding_gap and problem_misinterpretation. Both lookup
//! directions are materialized at construction so queries are symmetric and
//! allocation-free. The registry is immutable after construction.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{TaxonomyMaskError, TaxonomyViolation};

use super::types::{RootCause, Subtype};

/// Canonical mask: (root cause, valid subtypes).
const CANONICAL_MASK: &[(RootCause, &[Subtype])] = &[
    (
        RootCause::Correctness,
        &[
            Subtype::WrongInvariant,
            Subtype::IncorrectBoundary,
            Subtype::PartialCaseHandling,
            Subtype::StateLoss,
        ],
    ),
    (
        RootCause::Efficiency,
        &[
            Subtype::BruteForceUnderConstraints,
            Subtype::RedundantRecomputation,
            Subtype::SuboptimalDataStructure,
            Subtype::MisreadConstraint,
        ],
    ),
    (
        RootCause::Implementation,
        &[
            Subtype::IncorrectBoundary,
            Subtype::PartialCaseHandling,
            Subtype::StateLoss,
            Subtype::PrematureOptimization,
        ],
    ),
    (
        RootCause::UnderstandingGap,
        &[
            Subtype::WrongInvariant,
            Subtype::MisreadConstraint,
            Subtype::MissingConcept,
        ],
    ),
    (
        RootCause::ProblemMisinterpretation,
        &[
            Subtype::MisreadProblemStatement,
            Subtype::WrongOutputFormat,
            Subtype::WrongInputSchema,
            Subtype::MisreadConstraint,
        ],
    ),
];

/// Bidirectional validity mask.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyRegistry {
    by_root_cause: BTreeMap<RootCause, BTreeSet<Subtype>>,
    by_subtype: BTreeMap<Subtype, BTreeSet<RootCause>>,
}

impl TaxonomyRegistry {
    /// The canonical production mask.
    pub fn canonical() -> Self {
        let pairs = CANONICAL_MASK
            .iter()
            .flat_map(|(rc, subtypes)| subtypes.iter().map(move |st| (*rc, *st)));
        // The canonical table covers every variant; the test suite pins this.
        match Self::from_pairs(pairs) {
            Ok(registry) => registry,
            Err(err) => unreachable!("canonical taxonomy mask is incomplete: {err}"),
        }
    }

    /// Build a registry from explicit pairs, checking that every root cause
    /// and every subtype is covered at least once.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (RootCause, Subtype)>,
    ) -> Result<Self, TaxonomyMaskError> {
        let mut by_root_cause: BTreeMap<RootCause, BTreeSet<Subtype>> = BTreeMap::new();
        let mut by_subtype: BTreeMap<Subtype, BTreeSet<RootCause>> = BTreeMap::new();

        for (rc, st) in pairs {
            by_root_cause.entry(rc).or_default().insert(st);
            by_subtype.entry(st).or_default().insert(rc);
        }

        if let Some(rc) = RootCause::ALL
            .into_iter()
            .find(|rc| by_root_cause.get(rc).map_or(true, BTreeSet::is_empty))
        {
            return Err(TaxonomyMaskError::RootCauseWithoutSubtypes(rc));
        }
        if let Some(st) = Subtype::ALL
            .into_iter()
            .find(|st| by_subtype.get(st).map_or(true, BTreeSet::is_empty))
        {
            return Err(TaxonomyMaskError::SubtypeWithoutRootCauses(st));
        }

        Ok(Self {
            by_root_cause,
            by_subtype,
        })
    }

    /// Validate a typed pair.
    pub fn validate(&self, root_cause: RootCause, subtype: Subtype) -> Result<(), TaxonomyViolation> {
        if self.is_valid_pair(root_cause, subtype) {
            Ok(())
        } else {
            Err(TaxonomyViolation::InvalidPair {
                root_cause,
                subtype,
            })
        }
    }

    /// Parse and validate a pair of raw labels.
    pub fn validate_labels(
        &self,
        root_cause: &str,
        subtype: &str,
    ) -> Result<(RootCause, Subtype), TaxonomyViolation> {
        let rc: RootCause = root_cause.parse()?;
        let st: Subtype = subtype.parse()?;
        self.validate(rc, st)?;
        Ok((rc, st))
    }

    /// Subtypes valid under a root cause.
    pub fn valid_subtypes(&self, root_cause: RootCause) -> &BTreeSet<Subtype> {
        // Construction guarantees an entry for every root cause.
        &self.by_root_cause[&root_cause]
    }

    /// Root causes under which a subtype is valid.
    pub fn valid_root_causes(&self, subtype: Subtype) -> &BTreeSet<RootCause> {
        &self.by_subtype[&subtype]
    }

    pub fn is_valid_pair(&self, root_cause: RootCause, subtype: Subtype) -> bool {
        self.by_root_cause
            .get(&root_cause)
            .is_some_and(|set| set.contains(&subtype))
    }

    /// Every valid pair, ordered by root cause then subtype.
    pub fn pairs(&self) -> impl Iterator<Item = (RootCause, Subtype)> + '_ {
        self.by_root_cause
            .iter()
            .flat_map(|(rc, set)| set.iter().map(move |st| (*rc, *st)))
    }
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_mask_covers_every_variant() {
        let registry = TaxonomyRegistry::canonical();
        for rc in RootCause::ALL {
            assert!(!registry.valid_subtypes(rc).is_empty(), "{rc} has no subtypes");
        }
        for st in Subtype::ALL {
            assert!(!registry.valid_root_causes(st).is_empty(), "{st} is orphaned");
        }
    }

    #[test]
    fn test_lookups_are_symmetric() {
        let registry = TaxonomyRegistry::canonical();
        for rc in RootCause::ALL {
            for st in registry.valid_subtypes(rc) {
                assert!(registry.valid_root_causes(*st).contains(&rc));
            }
        }
    }

    #[test]
    fn test_overlapping_subtype_is_many_to_many() {
        let registry = TaxonomyRegistry::canonical();
        let roots = registry.valid_root_causes(Subtype::MisreadConstraint);
        assert_eq!(roots.len(), 3);
        assert!(roots.contains(&RootCause::Efficiency));
        assert!(roots.contains(&RootCause::ProblemMisinterpretation));
    }

    #[test]
    fn test_validate_rejects_mismatched_pair() {
        let registry = TaxonomyRegistry::canonical();
        let err = registry
            .validate(RootCause::Efficiency, Subtype::WrongOutputFormat)
            .unwrap_err();
        assert_eq!(
            err,
            TaxonomyViolation::InvalidPair {
                root_cause: RootCause::Efficiency,
                subtype: Subtype::WrongOutputFormat,
            }
        );
    }

    #[test]
    fn test_validate_labels_rejects_unknown_strings() {
        let registry = TaxonomyRegistry::canonical();
        assert!(matches!(
            registry.validate_labels("logic", "wrong_invariant"),
            Err(TaxonomyViolation::UnknownRootCause { .. })
        ));
        assert!(matches!(
            registry.validate_labels("correctness", "typo"),
            Err(TaxonomyViolation::UnknownSubtype { .. })
        ));
        assert_eq!(
            registry
                .validate_labels("Correctness", "incorrect-boundary")
                .unwrap(),
            (RootCause::Correctness, Subtype::IncorrectBoundary)
        );
    }

    #[test]
    fn test_from_pairs_rejects_orphaned_subtype() {
        let pairs = RootCause::ALL
            .into_iter()
            .map(|rc| (rc, Subtype::WrongInvariant));
        let err = TaxonomyRegistry::from_pairs(pairs).unwrap_err();
        assert!(matches!(err, TaxonomyMaskError::SubtypeWithoutRootCauses(_)));
    }

    #[test]
    fn test_from_pairs_rejects_empty_root_cause() {
        let pairs = Subtype::ALL.into_iter().map(|st| (RootCause::Correctness, st));
        let err = TaxonomyRegistry::from_pairs(pairs).unwrap_err();
        assert_eq!(
            err,
            TaxonomyMaskError::RootCauseWithoutSubtypes(RootCause::Efficiency)
        );
    }
}
