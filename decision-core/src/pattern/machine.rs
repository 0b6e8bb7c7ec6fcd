//! Pattern state machine: confidence-gated evidence accumulation with decay.
//!
//! Every operation takes a record by value and returns the updated record.
//! Time is always an argument; nothing here reads the clock, so replays of
//! stored evidence are exact.
//!
//! # Weighting
//!
//! ```text
//! weight = confidence × 0.5^(age_days / half_life_days)
//! if age_days <= recency_window_days: weight = min(1.0, weight × recency_boost)
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{ConfidenceThresholds, PatternConfig};
use crate::taxonomy::{RootCause, Subtype};

use super::confidence::ConfidenceTier;
use super::record::{Evidence, PatternState, PatternStateRecord, PatternStrength, PatternTransition};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternStateMachine {
    thresholds: ConfidenceThresholds,
    config: PatternConfig,
}

impl PatternStateMachine {
    pub fn new(thresholds: ConfidenceThresholds, config: PatternConfig) -> Self {
        Self { thresholds, config }
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }

    pub fn tier(&self, confidence: f64) -> ConfidenceTier {
        ConfidenceTier::from_confidence(confidence, &self.thresholds)
    }

    /// Append one occurrence and advance the state at most one step.
    pub fn add_evidence(
        &self,
        mut record: PatternStateRecord,
        confidence: f64,
        root_cause: RootCause,
        subtype: Option<Subtype>,
        problem_id: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> PatternStateRecord {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        let tier = self.tier(confidence);
        let gated = tier.is_gated();

        record.evidence.push(Evidence {
            confidence,
            tier,
            root_cause,
            subtype,
            problem_id: problem_id.map(String::from),
            timestamp,
        });

        let now = record.evaluated_at.map_or(timestamp, |prev| prev.max(timestamp));
        self.recompute(&mut record, now);
        record.confidence_gated = gated;

        match record.state {
            PatternState::None if !gated => {
                self.transition(&mut record, PatternState::Suspected, now, format!("first {tier}-confidence occurrence"));
            }
            PatternState::Suspected if !gated && self.meets_confirmation(&record) => {
                let reason = format!(
                    "{} occurrences, weighted {:.2}, mean confidence {:.2}",
                    record.evidence.len(),
                    record.weighted_evidence,
                    record.mean_confidence
                );
                self.transition(&mut record, PatternState::Confirmed, now, reason);
                record.confirmed_since = Some(now);
                record.confirmed_cycles = 0;
            }
            PatternState::Confirmed if gated => {
                record.confirmed_cycles = 0;
            }
            PatternState::Confirmed => {
                record.confirmed_cycles += 1;
                if self.meets_stability(&record, now) {
                    let reason = format!("confirmed for {} cycles", record.confirmed_cycles);
                    self.transition(&mut record, PatternState::Stable, now, reason);
                }
            }
            _ => {}
        }

        record
    }

    /// Recompute decayed weights at `now`, prune dead evidence, and drop the
    /// state to NONE when the weighted evidence falls below the floor.
    pub fn apply_decay(&self, mut record: PatternStateRecord, now: DateTime<Utc>) -> PatternStateRecord {
        let before = record.evidence.len();
        record
            .evidence
            .retain(|ev| self.evidence_weight(ev, now) >= self.config.prune_weight);
        if record.evidence.len() != before {
            debug!(
                pattern = %record.pattern_name,
                pruned = before - record.evidence.len(),
                "Pruned decayed evidence"
            );
        }

        self.recompute(&mut record, now);

        if record.state != PatternState::None && record.weighted_evidence < self.config.decay_floor {
            let reason = format!(
                "weighted evidence {:.3} below floor {:.3}",
                record.weighted_evidence, self.config.decay_floor
            );
            self.transition(&mut record, PatternState::None, now, reason);
            record.confirmed_since = None;
            record.confirmed_cycles = 0;
        }

        record
    }

    /// Strength summary from the record's last recomputation.
    pub fn get_pattern_strength(&self, record: &PatternStateRecord) -> PatternStrength {
        let confidence_support = match record.evaluated_at {
            Some(at) if record.weighted_evidence > 0.0 => {
                let supported: f64 = record
                    .evidence
                    .iter()
                    .filter(|ev| !ev.tier.is_gated())
                    .map(|ev| self.evidence_weight(ev, at))
                    .sum();
                (supported / record.weighted_evidence).clamp(0.0, 1.0)
            }
            _ => 0.0,
        };

        PatternStrength {
            evidence_count: record.evidence.len(),
            weighted_evidence: record.weighted_evidence,
            mean_confidence: record.mean_confidence,
            recency_score: record.recency_score,
            confidence_support,
        }
    }

    /// Decayed, recency-boosted weight of one occurrence at `now`.
    pub fn evidence_weight(&self, evidence: &Evidence, now: DateTime<Utc>) -> f64 {
        let age = age_days(evidence.timestamp, now);
        let weight = evidence.confidence * self.decay_factor(age);
        if age <= self.config.recency_window_days {
            (weight * self.config.recency_boost).min(1.0)
        } else {
            weight
        }
    }

    fn decay_factor(&self, age_days: f64) -> f64 {
        0.5_f64.powf(age_days / self.config.half_life_days)
    }

    fn recompute(&self, record: &mut PatternStateRecord, now: DateTime<Utc>) {
        record.weighted_evidence = record
            .evidence
            .iter()
            .map(|ev| self.evidence_weight(ev, now))
            .sum();
        record.mean_confidence = if record.evidence.is_empty() {
            0.0
        } else {
            record.evidence.iter().map(|ev| ev.confidence).sum::<f64>() / record.evidence.len() as f64
        };
        record.last_occurrence = record.evidence.iter().map(|ev| ev.timestamp).max();
        record.recency_score = record
            .last_occurrence
            .map_or(0.0, |last| self.decay_factor(age_days(last, now)));
        record.evaluated_at = Some(now);
    }

    fn meets_confirmation(&self, record: &PatternStateRecord) -> bool {
        record.evidence.len() >= self.config.confirm_min_occurrences
            && record.weighted_evidence >= self.config.confirm_weighted_threshold
            && record.mean_confidence >= self.thresholds.high
    }

    fn meets_stability(&self, record: &PatternStateRecord, now: DateTime<Utc>) -> bool {
        let Some(since) = record.confirmed_since else {
            return false;
        };
        record.confirmed_cycles >= self.config.stable_min_cycles
            && age_days(since, now) >= self.config.stable_window_days
    }

    fn transition(&self, record: &mut PatternStateRecord, to: PatternState, at: DateTime<Utc>, reason: String) {
        debug_assert!(
            record.state.can_transition_to(to),
            "illegal pattern transition {} → {}",
            record.state,
            to
        );
        debug!(
            pattern = %record.pattern_name,
            from = %record.state,
            to = %to,
            weighted = record.weighted_evidence,
            "Pattern transition"
        );
        record.transitions.push(PatternTransition {
            from: record.state,
            to,
            at,
            weighted_evidence: record.weighted_evidence,
            reason,
        });
        record.state = to;
    }
}

/// Fractional days from `from` to `to`, never negative.
fn age_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn machine() -> PatternStateMachine {
        PatternStateMachine::default()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn add(m: &PatternStateMachine, r: PatternStateRecord, conf: f64, at: DateTime<Utc>) -> PatternStateRecord {
        m.add_evidence(r, conf, RootCause::Correctness, Some(Subtype::IncorrectBoundary), Some("p1"), at)
    }

    #[test]
    fn test_weight_decays_by_half_per_half_life() {
        let m = machine();
        let ev = Evidence {
            confidence: 0.8,
            tier: ConfidenceTier::High,
            root_cause: RootCause::Correctness,
            subtype: None,
            problem_id: None,
            timestamp: t0(),
        };
        let w = m.evidence_weight(&ev, t0() + Duration::days(14));
        assert!((w - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_recency_boost_is_capped_at_one() {
        let m = machine();
        let ev = Evidence {
            confidence: 0.95,
            tier: ConfidenceTier::High,
            root_cause: RootCause::Correctness,
            subtype: None,
            problem_id: None,
            timestamp: t0(),
        };
        assert_eq!(m.evidence_weight(&ev, t0()), 1.0);
        let boosted = m.evidence_weight(&ev, t0() + Duration::days(3));
        assert!(boosted <= 1.0);
        let unboosted = m.evidence_weight(&ev, t0() + Duration::days(4));
        assert!(unboosted < 0.95);
    }

    #[test]
    fn test_low_confidence_never_leaves_none() {
        let m = machine();
        let mut r = PatternStateRecord::new("p");
        for day in 0..5 {
            r = add(&m, r, 0.5, t0() + Duration::days(day));
            assert_eq!(r.state, PatternState::None);
            assert!(r.confidence_gated);
        }
        assert_eq!(r.evidence_count(), 5);
    }

    #[test]
    fn test_medium_confidence_suspects_but_cannot_confirm() {
        let m = machine();
        let mut r = PatternStateRecord::new("p");
        for day in 0..4 {
            r = add(&m, r, 0.7, t0() + Duration::days(day));
        }
        assert_eq!(r.state, PatternState::Suspected);
        assert!(!r.confidence_gated);
    }

    #[test]
    fn test_stable_after_sustained_confirmation() {
        let m = machine();
        let mut r = PatternStateRecord::new("p");
        for day in [0, 2, 4] {
            r = add(&m, r, 0.9, t0() + Duration::days(day));
        }
        assert_eq!(r.state, PatternState::Confirmed);

        for day in [6, 8] {
            r = add(&m, r, 0.9, t0() + Duration::days(day));
            assert_eq!(r.state, PatternState::Confirmed);
        }
        // Third cycle, but only 6 days since confirmation.
        r = add(&m, r, 0.9, t0() + Duration::days(10));
        assert_eq!(r.state, PatternState::Confirmed);
        r = add(&m, r, 0.9, t0() + Duration::days(12));
        assert_eq!(r.state, PatternState::Stable);
        assert_eq!(r.transitions.len(), 3);
    }

    #[test]
    fn test_gated_evidence_interrupts_stability_count() {
        let m = machine();
        let mut r = PatternStateRecord::new("p");
        for day in [0, 2, 4, 6, 8] {
            r = add(&m, r, 0.9, t0() + Duration::days(day));
        }
        assert_eq!(r.confirmed_cycles, 2);
        r = add(&m, r, 0.3, t0() + Duration::days(9));
        assert_eq!(r.confirmed_cycles, 0);
        assert_eq!(r.state, PatternState::Confirmed);
    }

    #[test]
    fn test_decay_prunes_ancient_evidence() {
        let m = machine();
        let r = add(&m, PatternStateRecord::new("p"), 0.9, t0());
        let r = m.apply_decay(r, t0() + Duration::days(365));
        assert_eq!(r.evidence_count(), 0);
        assert_eq!(r.state, PatternState::None);
        assert_eq!(r.weighted_evidence, 0.0);
        assert_eq!(r.recency_score, 0.0);
    }

    #[test]
    fn test_decay_is_a_no_op_for_fresh_evidence() {
        let m = machine();
        let r = add(&m, PatternStateRecord::new("p"), 0.9, t0());
        let decayed = m.apply_decay(r.clone(), t0());
        assert_eq!(decayed.state, r.state);
        assert_eq!(decayed.weighted_evidence, r.weighted_evidence);
    }

    #[test]
    fn test_strength_reports_confidence_support() {
        let m = machine();
        let mut r = PatternStateRecord::new("p");
        r = add(&m, r, 0.9, t0());
        r = add(&m, r, 0.4, t0());
        let strength = m.get_pattern_strength(&r);
        assert_eq!(strength.evidence_count, 2);
        // 1.0 supported weight of 1.6 total.
        assert!((strength.confidence_support - 1.0 / 1.6).abs() < 1e-9);
        assert_eq!(strength.recency_score, 1.0);
    }
}
