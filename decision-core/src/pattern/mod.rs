//! Recurring-mistake pattern tracking.
//!
//! # Lifecycle
//!
//! ```text
//! NONE ──(medium/high evidence)──► SUSPECTED
//!   SUSPECTED ──(≥3 occurrences, weighted ≥ threshold, mean ≥ high)──► CONFIRMED
//!   CONFIRMED ──(sustained cycles over the stable window)──► STABLE
//! any ──(weighted evidence below floor after decay)──► NONE
//! ```
//!
//! Low-confidence evidence is stored (it still decays and counts toward the
//! mean) but can never by itself move a pattern out of NONE.

pub mod confidence;
pub mod machine;
pub mod record;

pub use confidence::ConfidenceTier;
pub use machine::PatternStateMachine;
pub use record::{
    pattern_name, Evidence, PatternState, PatternStateRecord, PatternStrength, PatternTransition,
};
