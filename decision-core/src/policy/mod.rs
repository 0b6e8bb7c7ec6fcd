//! Difficulty adjustment policy.
//!
//! Five gates, evaluated in order and short-circuiting on the first
//! blocked/forced result:
//!
//! | # | Gate | Blocks |
//! |---|------|--------|
//! | 1 | confidence | increase below the high tier |
//! | 2 | pattern | increase while a pattern is suspected/confirmed, or unknown |
//! | 3 | cooldown | increase before enough submissions since the last change |
//! | 4 | hysteresis | increase before enough consecutive eligible cycles |
//! | 5 | directional bias | never |
//!
//! Decrease is never blocked.

pub mod engine;
pub mod gates;
pub mod types;

pub use engine::DifficultyPolicyEngine;
pub use types::{
    Difficulty, DifficultyAction, GateDecision, GateResult, PolicyDecision, PolicyGate,
    PolicyInput,
};
