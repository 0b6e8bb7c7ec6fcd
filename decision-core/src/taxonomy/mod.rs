//! Taxonomy: root causes, subtypes, and their validity mask.
//!
//! ```text
//! raw classifier label ──► LabelMigrator ──► (RootCause, Subtype) ──► TaxonomyRegistry::validate
//! ```
//!
//! The registry is built once at process start and never mutated. A
//! `TaxonomyViolation` anywhere in the decision path means stale label
//! vocabulary or a migration bug; it is never caught-and-ignored.

pub mod migration;
pub mod registry;
pub mod types;

pub use migration::{primary_subtype, LabelMigrator, MigratedLabel, MigrationKind};
pub use registry::TaxonomyRegistry;
pub use types::{RootCause, Subtype};

/// Lowercase, trim, and fold `-`, `.` and whitespace runs into single `_`.
pub(crate) fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' || ch == '.' {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.extend(ch.to_lowercase());
    }
    out
}
