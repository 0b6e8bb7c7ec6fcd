//! Engine configuration.
//!
//! Thresholds, half-lives and gate counts are product decisions tuned
//! offline, so they live here instead of in the components. Every section is
//! `#[serde(default)]`: a TOML file only needs the keys it overrides.
//!
//! ```toml
//! [confidence]
//! high = 0.85
//!
//! [policy]
//! hysteresis_threshold = 4
//!
//! [orchestrator]
//! success_increase_rate = 0.85
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a TOML config file for `EngineConfig::load`.
pub const CONFIG_PATH_ENV: &str = "DECISION_ENGINE_CONFIG";

/// Confidence tier boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    /// Minimum confidence for the high tier.
    pub high: f64,
    /// Minimum confidence for the medium tier.
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.80,
            medium: 0.65,
        }
    }
}

/// Pattern evidence accumulation and decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Evidence weight halves every `half_life_days`.
    pub half_life_days: f64,
    /// Evidence younger than this gets `recency_boost`.
    pub recency_window_days: f64,
    /// Multiplier for recent evidence; boosted weights are capped at 1.0.
    pub recency_boost: f64,
    /// Weighted evidence needed for SUSPECTED → CONFIRMED.
    pub confirm_weighted_threshold: f64,
    /// Occurrences needed for SUSPECTED → CONFIRMED.
    pub confirm_min_occurrences: usize,
    /// Below this weighted evidence the pattern decays to NONE.
    pub decay_floor: f64,
    /// Non-gated evidence cycles while CONFIRMED before STABLE.
    pub stable_min_cycles: u32,
    /// Days since confirmation before STABLE.
    pub stable_window_days: f64,
    /// Evidence weighing less than this is pruned on decay.
    pub prune_weight: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            half_life_days: 14.0,
            recency_window_days: 3.0,
            recency_boost: 1.5,
            confirm_weighted_threshold: 1.5,
            confirm_min_occurrences: 3,
            decay_floor: 0.5,
            stable_min_cycles: 3,
            stable_window_days: 7.0,
            prune_weight: 0.001,
        }
    }
}

/// Difficulty policy gate counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Submissions since the last change before an increase.
    pub increase_cooldown: u32,
    /// Advisory cooldown reported for decreases.
    pub decrease_cooldown: u32,
    /// Consecutive eligible cycles before an increase.
    pub hysteresis_threshold: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            increase_cooldown: 5,
            decrease_cooldown: 3,
            hysteresis_threshold: 3,
        }
    }
}

/// Orchestrator heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Stamped on every decision.
    pub model_version: String,
    /// Users with fewer submissions are cold-start.
    pub cold_start_submissions: u32,
    /// Number of recent verdicts the heuristics look at.
    pub recent_window: usize,
    /// Recent acceptance rate needed to propose an increase after AC. The
    /// rate is also the decision confidence, so it may not sit below
    /// `confidence.high`.
    pub success_increase_rate: f64,
    /// Readiness for the current level below which a decrease is proposed.
    pub struggle_readiness: f64,
    /// Expected success rate below which a decrease is proposed.
    pub struggle_success_rate: f64,
    /// Confidence assigned to a structural misinterpretation finding.
    pub misinterpretation_confidence: f64,
    /// Burnout risk above which feedback turns encouraging.
    pub burnout_risk_threshold: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model_version: "root-cause-v3".to_string(),
            cold_start_submissions: 5,
            recent_window: 5,
            success_increase_rate: 0.8,
            struggle_readiness: 0.4,
            struggle_success_rate: 0.3,
            misinterpretation_confidence: 0.85,
            burnout_risk_threshold: 0.7,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub confidence: ConfidenceThresholds,
    pub pattern: PatternConfig,
    pub policy: PolicyConfig,
    pub orchestrator: OrchestratorConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `$DECISION_ENGINE_CONFIG` when set, defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                tracing::info!(path = %path.display(), "Loading engine config");
                Self::from_file(path)
            }
            None => {
                tracing::debug!("{} not set, using default engine config", CONFIG_PATH_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Reject values that would break the gates or the decay math.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.confidence;
        unit_interval("confidence.high", c.high)?;
        unit_interval("confidence.medium", c.medium)?;
        if c.medium >= c.high {
            return Err(invalid(
                "confidence.medium",
                format!("must be below confidence.high ({} >= {})", c.medium, c.high),
            ));
        }

        let p = &self.pattern;
        positive("pattern.half_life_days", p.half_life_days)?;
        non_negative("pattern.recency_window_days", p.recency_window_days)?;
        if !(p.recency_boost.is_finite() && p.recency_boost >= 1.0) {
            return Err(invalid("pattern.recency_boost", "must be >= 1.0".to_string()));
        }
        positive("pattern.confirm_weighted_threshold", p.confirm_weighted_threshold)?;
        non_negative("pattern.decay_floor", p.decay_floor)?;
        if p.decay_floor >= p.confirm_weighted_threshold {
            return Err(invalid(
                "pattern.decay_floor",
                "must be below pattern.confirm_weighted_threshold".to_string(),
            ));
        }
        if p.confirm_min_occurrences == 0 {
            return Err(invalid("pattern.confirm_min_occurrences", "must be >= 1".to_string()));
        }
        non_negative("pattern.stable_window_days", p.stable_window_days)?;
        unit_interval("pattern.prune_weight", p.prune_weight)?;

        if self.policy.hysteresis_threshold == 0 {
            return Err(invalid("policy.hysteresis_threshold", "must be >= 1".to_string()));
        }

        let o = &self.orchestrator;
        if o.model_version.trim().is_empty() {
            return Err(invalid("orchestrator.model_version", "must not be empty".to_string()));
        }
        if o.recent_window == 0 {
            return Err(invalid("orchestrator.recent_window", "must be >= 1".to_string()));
        }
        unit_interval("orchestrator.success_increase_rate", o.success_increase_rate)?;
        if o.success_increase_rate < c.high {
            return Err(invalid(
                "orchestrator.success_increase_rate",
                format!(
                    "must be at least confidence.high ({} < {})",
                    o.success_increase_rate, c.high
                ),
            ));
        }
        unit_interval("orchestrator.struggle_readiness", o.struggle_readiness)?;
        unit_interval("orchestrator.struggle_success_rate", o.struggle_success_rate)?;
        unit_interval("orchestrator.misinterpretation_confidence", o.misinterpretation_confidence)?;
        unit_interval("orchestrator.burnout_risk_threshold", o.burnout_risk_threshold)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be > 0")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be >= 0")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [confidence]
            high = 0.9

            [policy]
            hysteresis_threshold = 4

            [orchestrator]
            success_increase_rate = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.confidence.high, 0.9);
        assert_eq!(config.confidence.medium, 0.65);
        assert_eq!(config.policy.hysteresis_threshold, 4);
        assert_eq!(config.policy.increase_cooldown, 5);
        assert_eq!(config.pattern.half_life_days, 14.0);
    }

    #[test]
    fn test_rejects_inverted_tiers() {
        let err = EngineConfig::from_toml_str("[confidence]\nhigh = 0.6\nmedium = 0.7\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "confidence.medium",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_increase_rate_below_high_tier() {
        let err = EngineConfig::from_toml_str("[orchestrator]\nsuccess_increase_rate = 0.7\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "orchestrator.success_increase_rate",
                ..
            }
        ));

        let err = EngineConfig::from_toml_str("[confidence]\nhigh = 0.9\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "orchestrator.success_increase_rate",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_positive_half_life() {
        let err = EngineConfig::from_toml_str("[pattern]\nhalf_life_days = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "pattern.half_life_days",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("[policy\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[orchestrator]\nmodel_version = \"rc-test\"").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.orchestrator.model_version, "rc-test");
    }

    #[test]
    fn test_from_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/decision.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
