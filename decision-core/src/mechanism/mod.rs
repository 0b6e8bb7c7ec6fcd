//! Failure mechanism resolution.
//!
//! ```text
//! (root_cause, subtype, category, signals)
//!     │
//!     ├─ 1. subtype signal rules, fixed priority order
//!     ├─ 2. normalized problem category
//!     ├─ 3. (root_cause, subtype) default, then subtype default
//!     └─ no rules for subtype → TaxonomyCoverageGap (logged)
//! ```

pub mod category;
pub mod resolver;
pub mod rules;
pub mod signals;
pub mod types;

pub use category::ProblemCategory;
pub use resolver::{FailureMechanismResolver, Resolution, ResolutionSource};
pub use signals::{SignalValue, Signals};
pub use types::FailureMechanism;
