//! Verdict separation gate tests.
//!
//! Tests verify:
//! - Accepted verdicts never carry diagnostic fields
//! - Accepted payloads always carry a reinforcement field
//! - Failed verdicts never carry reinforcement fields
//! - Payload variants must match the verdict family
//! - Raw judge strings map onto the verdict families

use decision_core::verdict::{
    Diagnosis, DiagnosisTrack, FeedbackPayload, Reinforcement, DIAGNOSTIC_FIELDS,
    REINFORCEMENT_FIELDS,
};
use decision_core::{RootCause, Subtype, Verdict, VerdictGateEnforcer, VerdictGateViolation};
use serde_json::json;

const FAILED: [Verdict; 6] = [
    Verdict::WrongAnswer,
    Verdict::TimeLimitExceeded,
    Verdict::MemoryLimitExceeded,
    Verdict::RuntimeError,
    Verdict::CompileError,
    Verdict::Unknown,
];

fn reinforcement() -> FeedbackPayload {
    FeedbackPayload::Reinforcement(Reinforcement {
        strengths: vec!["solved a hard problem".to_string()],
        next_challenge: None,
    })
}

fn full_diagnosis() -> FeedbackPayload {
    FeedbackPayload::Diagnosis(Diagnosis {
        track: DiagnosisTrack::Correctness,
        root_cause: Some(RootCause::Correctness),
        subtype: Some(Subtype::IncorrectBoundary),
        failure_mechanism: None,
        mistake_pattern: None,
    })
}

// ── Accepted path ──────────────────────────────────────────────────

#[test]
fn test_accepted_with_root_cause_is_violation() {
    let payload = json!({
        "verdict": "accepted",
        "strengths": ["clean code"],
        "root_cause": "correctness",
    });
    let err = VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &payload).unwrap_err();
    assert_eq!(
        err,
        VerdictGateViolation::DiagnosisOnAccepted {
            field: "root_cause".to_string()
        }
    );
}

#[test]
fn prop_every_diagnostic_field_is_rejected_on_accepted() {
    for field in DIAGNOSTIC_FIELDS {
        let payload = json!({ *field: "anything" });
        assert!(
            VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &payload).is_err(),
            "{field} slipped through"
        );
    }
}

#[test]
fn test_empty_accepted_payload_is_violation() {
    let err = VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &json!({})).unwrap_err();
    assert_eq!(err, VerdictGateViolation::MissingReinforcement);

    let celebrated = json!({ "celebration": "first hard solve" });
    assert!(VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &celebrated).is_ok());
}

#[test]
fn test_accepted_with_diagnosis_payload_is_violation() {
    let err = VerdictGateEnforcer::enforce(Verdict::Accepted, &full_diagnosis()).unwrap_err();
    assert!(matches!(err, VerdictGateViolation::PayloadShape { .. }));
}

// ── Failure path ───────────────────────────────────────────────────

#[test]
fn test_wrong_answer_with_strengths_is_violation() {
    let payload = json!({ "root_cause": "correctness", "strengths": ["nice variable names"] });
    let err = VerdictGateEnforcer::enforce_fields(Verdict::WrongAnswer, &payload).unwrap_err();
    assert_eq!(
        err,
        VerdictGateViolation::ReinforcementOnFailure {
            verdict: Verdict::WrongAnswer,
            field: "strengths".to_string()
        }
    );
}

#[test]
fn prop_reinforcement_rejected_on_every_failed_verdict() {
    for verdict in FAILED {
        assert!(VerdictGateEnforcer::enforce(verdict, &reinforcement()).is_err(), "{verdict}");
        assert!(VerdictGateEnforcer::enforce(verdict, &full_diagnosis()).is_ok(), "{verdict}");
        for field in REINFORCEMENT_FIELDS {
            let payload = json!({ "feedback": { *field: true } });
            assert!(
                VerdictGateEnforcer::enforce_fields(verdict, &payload).is_err(),
                "{verdict} {field}"
            );
        }
    }
}

#[test]
fn test_serialized_payloads_pass_their_own_gate() {
    let accepted = serde_json::to_value(reinforcement()).unwrap();
    assert!(VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &accepted).is_ok());

    let failed = serde_json::to_value(full_diagnosis()).unwrap();
    assert!(VerdictGateEnforcer::enforce_fields(Verdict::WrongAnswer, &failed).is_ok());
    assert!(VerdictGateEnforcer::enforce_fields(Verdict::Accepted, &failed).is_err());
}

#[test]
fn test_null_fields_count_as_absent() {
    let payload = json!({ "strengths": null, "reinforcement": null, "subtype": "state_loss" });
    assert!(VerdictGateEnforcer::enforce_fields(Verdict::RuntimeError, &payload).is_ok());
}

// ── Verdict parsing ────────────────────────────────────────────────

#[test]
fn test_judge_strings_map_to_families() {
    assert!(Verdict::parse("AC").is_accepted());
    assert!(Verdict::parse("Accepted").is_accepted());
    assert_eq!(Verdict::parse("TLE"), Verdict::TimeLimitExceeded);
    assert_eq!(Verdict::parse("wrong_answer"), Verdict::WrongAnswer);
    assert_eq!(Verdict::parse("judge exploded"), Verdict::Unknown);
    assert!(!Verdict::parse("judge exploded").is_accepted());
}
