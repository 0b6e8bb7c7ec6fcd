//! Failure mechanism resolver: pure, total, deterministic.
//!
//! Same inputs always produce the same mechanism. No I/O, no clock. The only
//! side effect is a `warn` event when the coverage-gap sentinel is returned.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::taxonomy::{RootCause, Subtype};
use crate::telemetry;

use super::category::ProblemCategory;
use super::rules::{SubtypeRules, CANONICAL_RULES, ROOT_CAUSE_DEFAULTS};
use super::signals::Signals;
use super::types::FailureMechanism;

/// Which precedence step produced the mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ResolutionSource {
    Signal { name: String },
    Category { category: ProblemCategory },
    RootCauseDefault,
    SubtypeDefault,
    CoverageGap,
}

/// Mechanism plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub mechanism: FailureMechanism,
    pub source: ResolutionSource,
}

#[derive(Debug, Clone, Copy)]
pub struct FailureMechanismResolver {
    rules: &'static [SubtypeRules],
}

impl FailureMechanismResolver {
    /// Resolver over the canonical rule tables.
    pub fn new() -> Self {
        Self {
            rules: CANONICAL_RULES,
        }
    }

    /// Resolver over a custom table. Subtypes missing from it resolve to the
    /// coverage-gap sentinel.
    pub fn with_rules(rules: &'static [SubtypeRules]) -> Self {
        Self { rules }
    }

    pub fn derive(
        &self,
        root_cause: RootCause,
        subtype: Subtype,
        category: &str,
        signals: &Signals,
    ) -> FailureMechanism {
        self.resolve(root_cause, subtype, category, signals).mechanism
    }

    /// `derive` with the audit trail of which step matched.
    pub fn resolve(
        &self,
        root_cause: RootCause,
        subtype: Subtype,
        category: &str,
        signals: &Signals,
    ) -> Resolution {
        let Some(rules) = self.rules.iter().find(|r| r.subtype == subtype) else {
            warn!(
                target: telemetry::ANOMALY_TARGET,
                root_cause = %root_cause,
                subtype = %subtype,
                category,
                "No failure-mechanism rules for subtype; returning coverage gap"
            );
            return Resolution {
                mechanism: FailureMechanism::TaxonomyCoverageGap,
                source: ResolutionSource::CoverageGap,
            };
        };

        if let Some(rule) = rules.signals.iter().find(|r| r.condition.matches(signals)) {
            return Resolution {
                mechanism: rule.mechanism,
                source: ResolutionSource::Signal {
                    name: rule.condition.signal_name().to_string(),
                },
            };
        }

        let normalized = ProblemCategory::normalize(category);
        if let Some((cat, mechanism)) = rules.categories.iter().find(|(c, _)| *c == normalized) {
            return Resolution {
                mechanism: *mechanism,
                source: ResolutionSource::Category { category: *cat },
            };
        }

        if let Some((_, _, mechanism)) = ROOT_CAUSE_DEFAULTS
            .iter()
            .find(|(rc, st, _)| *rc == root_cause && *st == subtype)
        {
            return Resolution {
                mechanism: *mechanism,
                source: ResolutionSource::RootCauseDefault,
            };
        }

        Resolution {
            mechanism: rules.default,
            source: ResolutionSource::SubtypeDefault,
        }
    }
}

impl Default for FailureMechanismResolver {
    fn default() -> Self {
        Self::new()
    }
}
