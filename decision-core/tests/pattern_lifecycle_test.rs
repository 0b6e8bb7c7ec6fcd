//! Pattern lifecycle integration tests.
//!
//! Tests verify:
//! - Low-confidence evidence never moves a pattern out of NONE
//! - Three high-confidence occurrences inside two weeks confirm a pattern
//! - Sixty quiet days decay a confirmed pattern back to NONE
//! - Decay is monotone and never adds weight
//! - Every recorded transition is a legal lifecycle edge

use chrono::{DateTime, Duration, TimeZone, Utc};
use decision_core::pattern::{pattern_name, PatternState, PatternStateRecord};
use decision_core::taxonomy::{RootCause, Subtype};
use decision_core::{ConfidenceThresholds, PatternConfig, PatternStateMachine};

fn machine() -> PatternStateMachine {
    PatternStateMachine::new(ConfidenceThresholds::default(), PatternConfig::default())
}

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap() + Duration::days(n)
}

fn record() -> PatternStateRecord {
    PatternStateRecord::new(pattern_name(RootCause::Correctness, Subtype::IncorrectBoundary))
}

fn add(m: &PatternStateMachine, r: PatternStateRecord, confidence: f64, at: DateTime<Utc>) -> PatternStateRecord {
    m.add_evidence(
        r,
        confidence,
        RootCause::Correctness,
        Some(Subtype::IncorrectBoundary),
        Some("two-sum"),
        at,
    )
}

// ── Property: low confidence is gated ──────────────────────────────

#[test]
fn prop_low_confidence_never_leaves_none() {
    let m = machine();
    for confidence in [0.0, 0.1, 0.3, 0.5, 0.64] {
        let mut r = record();
        for n in 0..10 {
            r = add(&m, r, confidence, day(n));
            assert_eq!(r.state, PatternState::None, "confidence {confidence} day {n}");
            assert!(r.confidence_gated);
        }
        assert_eq!(r.evidence_count(), 10);
        assert!(r.transitions.is_empty());
    }
}

#[test]
fn test_out_of_range_confidence_is_clamped() {
    let m = machine();
    let r = add(&m, record(), 7.5, day(0));
    assert_eq!(r.evidence[0].confidence, 1.0);
    let r = add(&m, record(), f64::NAN, day(0));
    assert_eq!(r.evidence[0].confidence, 0.0);
    assert_eq!(r.state, PatternState::None);
}

// ── Lifecycle ──────────────────────────────────────────────────────

#[test]
fn test_confirm_then_decay_to_none() {
    let m = machine();
    let mut r = record();

    r = add(&m, r, 0.9, day(0));
    assert_eq!(r.state, PatternState::Suspected);
    r = add(&m, r, 0.9, day(5));
    assert_eq!(r.state, PatternState::Suspected, "two occurrences cannot confirm");
    r = add(&m, r, 0.9, day(10));
    assert_eq!(r.state, PatternState::Confirmed);
    assert!(r.weighted_evidence >= 1.5);
    assert_eq!(r.confirmed_since, Some(day(10)));

    let decayed = m.apply_decay(r, day(70));
    assert_eq!(decayed.state, PatternState::None);
    assert!(decayed.weighted_evidence < 0.5);
    assert_eq!(decayed.confirmed_since, None);

    let last = decayed.transitions.last().unwrap();
    assert_eq!((last.from, last.to), (PatternState::Confirmed, PatternState::None));
    assert_eq!(last.at, day(70));
}

#[test]
fn test_state_advances_one_step_per_occurrence() {
    let m = machine();
    let mut r = record();
    let mut previous = r.state;
    for n in 0..8 {
        r = add(&m, r, 0.95, day(n));
        assert!(
            r.state == previous || previous.can_transition_to(r.state),
            "{previous} → {}",
            r.state
        );
        previous = r.state;
    }
}

#[test]
fn test_sustained_confirmation_becomes_stable() {
    let m = machine();
    let mut r = record();
    for n in [0, 1, 2] {
        r = add(&m, r, 0.9, day(n));
    }
    assert_eq!(r.state, PatternState::Confirmed);

    for n in [4, 6, 9] {
        r = add(&m, r, 0.9, day(n));
    }
    assert_eq!(r.state, PatternState::Stable);

    let strength = m.get_pattern_strength(&r);
    assert_eq!(strength.evidence_count, 6);
    assert!(strength.confidence_support > 0.99);
}

#[test]
fn test_stable_pattern_decays_to_none() {
    let m = machine();
    let mut r = record();
    for n in [0, 1, 2, 4, 6, 9] {
        r = add(&m, r, 0.9, day(n));
    }
    assert_eq!(r.state, PatternState::Stable);
    let r = m.apply_decay(r, day(120));
    assert_eq!(r.state, PatternState::None);
}

// ── Property: decay ────────────────────────────────────────────────

#[test]
fn prop_decay_is_monotone() {
    let m = machine();
    let mut r = record();
    for n in [0, 3, 6] {
        r = add(&m, r, 0.85, day(n));
    }

    let mut last = r.weighted_evidence;
    for n in (7..90).step_by(4) {
        let decayed = m.apply_decay(r.clone(), day(n));
        assert!(
            decayed.weighted_evidence <= last + 1e-12,
            "day {n}: {} > {last}",
            decayed.weighted_evidence
        );
        last = decayed.weighted_evidence;
    }
}

#[test]
fn prop_every_transition_is_legal() {
    let m = machine();
    let confidences = [0.9, 0.4, 0.7, 0.95, 0.2, 0.85, 0.9, 0.9, 0.5, 0.99];
    let mut r = record();
    for (n, c) in confidences.iter().enumerate() {
        r = add(&m, r, *c, day(n as i64 * 2));
        if n % 3 == 2 {
            r = m.apply_decay(r, day(n as i64 * 2 + 1));
        }
    }
    r = m.apply_decay(r, day(200));

    for t in &r.transitions {
        assert!(t.from.can_transition_to(t.to), "{} → {}", t.from, t.to);
    }
    assert_eq!(r.state, PatternState::None);
}

#[test]
fn test_record_survives_persistence_round_trip() {
    let m = machine();
    let mut r = record();
    for n in [0, 2, 4] {
        r = add(&m, r, 0.9, day(n));
    }
    let json = serde_json::to_string(&r).unwrap();
    let restored: PatternStateRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.state, PatternState::Confirmed);

    let next = add(&m, restored, 0.9, day(5));
    assert_eq!(next.confirmed_cycles, 1);
}
