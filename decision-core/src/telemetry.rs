//! Tracing span helpers for the decision pipeline.
//!
//! All spans use dot-notation names so they export cleanly to any
//! OpenTelemetry-compatible collector.
//!
//! # Span Hierarchy
//!
//! ```text
//! decision.decide              (root, one per submission)
//!   ├─ decision.pattern        (pattern record update)
//!   ├─ decision.policy         (gate pipeline)
//!   │   └─ decision.gate       (one per evaluated gate)
//!   └─ decision.enforce        (verdict separation check)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let span = telemetry::decide_span("sub-1", "user-7", "wrong_answer");
//! let _guard = span.enter();
//! // ... run the pipeline ...
//! telemetry::record_decide_result(&span, "decrease", false, 2);
//! ```

use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::policy::{GateDecision, PolicyDecision};

// ── Span Name Constants ──────────────────────────────────────────────

pub const SPAN_DECIDE: &str = "decision.decide";
pub const SPAN_PATTERN: &str = "decision.pattern";
pub const SPAN_POLICY: &str = "decision.policy";
pub const SPAN_GATE: &str = "decision.gate";
pub const SPAN_ENFORCE: &str = "decision.enforce";

/// Target for monitoring anomalies (coverage gaps, collaborator fallbacks).
pub const ANOMALY_TARGET: &str = "decision_core::anomaly";

// ── Span Builders ────────────────────────────────────────────────────

/// Root span for one `decide` call.
///
/// Fields filled later via [`record_decide_result`]: `decision.action`,
/// `decision.fallback`, `decision.gates`.
pub fn decide_span(submission_id: &str, user_id: &str, verdict: &str) -> Span {
    tracing::info_span!(
        "decision.decide",
        "submission.id" = %submission_id,
        "user.id" = %user_id,
        "decision.verdict" = %verdict,
        "decision.action" = tracing::field::Empty,
        "decision.fallback" = tracing::field::Empty,
        "decision.gates" = tracing::field::Empty,
    )
}

pub fn record_decide_result(span: &Span, action: &str, fallback: bool, gates_evaluated: usize) {
    span.record("decision.action", action);
    span.record("decision.fallback", fallback);
    span.record("decision.gates", gates_evaluated as u64);
}

/// Span for updating one pattern record.
pub fn pattern_span(pattern_name: &str) -> Span {
    tracing::debug_span!(
        "decision.pattern",
        "pattern.name" = %pattern_name,
        "pattern.from" = tracing::field::Empty,
        "pattern.to" = tracing::field::Empty,
        "pattern.weighted" = tracing::field::Empty,
    )
}

pub fn record_pattern_result(span: &Span, from: &str, to: &str, weighted_evidence: f64) {
    span.record("pattern.from", from);
    span.record("pattern.to", to);
    span.record("pattern.weighted", weighted_evidence);
}

/// Span for one policy evaluation.
pub fn policy_span(proposed_action: &str, current_difficulty: &str) -> Span {
    tracing::debug_span!(
        "decision.policy",
        "policy.proposed" = %proposed_action,
        "policy.current" = %current_difficulty,
        "policy.final" = tracing::field::Empty,
        "policy.blocking_gate" = tracing::field::Empty,
    )
}

pub fn record_policy_result(span: &Span, decision: &PolicyDecision) {
    span.record("policy.final", decision.final_action.to_string().as_str());
    if let Some(gate) = decision.blocking_gate {
        span.record("policy.blocking_gate", gate.as_str());
    }
}

/// Span for a single gate, already carrying its outcome.
pub fn gate_span(gate: &GateDecision) -> Span {
    tracing::trace_span!(
        "decision.gate",
        "gate.name" = %gate.gate_name,
        "gate.result" = %gate.result,
    )
}

/// Span for the verdict separation check.
pub fn enforce_span(verdict: &str) -> Span {
    tracing::debug_span!(
        "decision.enforce",
        "decision.verdict" = %verdict,
        "enforce.ok" = tracing::field::Empty,
    )
}

pub fn record_enforce_result(span: &Span, ok: bool) {
    span.record("enforce.ok", ok);
}

/// Install a global fmt subscriber honoring `RUST_LOG` (default `info`).
///
/// For host binaries; the library never calls this itself. Returns an error
/// if a global subscriber is already set.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Targets of every event emitted while `f` runs on this thread.
#[cfg(test)]
pub(crate) fn capture_event_targets(f: impl FnOnce()) -> Vec<String> {
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    struct TargetLayer(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for TargetLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(event.metadata().target().to_string());
            }
        }
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(TargetLayer(Arc::clone(&seen)));
    tracing::subscriber::with_default(subscriber, f);
    let targets = seen.lock().map(|s| s.clone()).unwrap_or_default();
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DifficultyAction, PolicyGate};
    use std::sync::Once;

    static INIT: Once = Once::new();

    fn init_test_subscriber() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(tracing::Level::TRACE)
                .try_init();
        });
    }

    #[test]
    fn test_decide_span_records_result() {
        init_test_subscriber();
        let span = decide_span("sub-1", "user-1", "wrong_answer");
        assert!(!span.is_disabled());
        record_decide_result(&span, "maintain", true, 0);
    }

    #[test]
    fn test_pattern_and_enforce_spans() {
        init_test_subscriber();
        let span = pattern_span("correctness:incorrect_boundary");
        assert!(!span.is_disabled());
        record_pattern_result(&span, "none", "suspected", 0.9);

        let span = enforce_span("accepted");
        assert!(!span.is_disabled());
        record_enforce_result(&span, true);
    }

    #[test]
    fn test_gate_span_uses_gate_fields() {
        init_test_subscriber();
        let gate = GateDecision::allowed(
            PolicyGate::HysteresisGate,
            DifficultyAction::Maintain,
            "exempt",
        );
        let span = gate_span(&gate);
        assert!(!span.is_disabled());
    }

    #[test]
    fn test_anomaly_target_is_under_crate_filter() {
        assert!(ANOMALY_TARGET.starts_with(env!("CARGO_CRATE_NAME")));
        let targets = capture_event_targets(|| {
            tracing::warn!(target: ANOMALY_TARGET, "gap");
        });
        assert_eq!(targets, vec![ANOMALY_TARGET.to_string()]);
    }

    #[test]
    fn test_span_names_use_dot_notation() {
        for name in [SPAN_DECIDE, SPAN_PATTERN, SPAN_POLICY, SPAN_GATE, SPAN_ENFORCE] {
            assert!(name.starts_with("decision."));
        }
    }
}
