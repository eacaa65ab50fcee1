use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine tuning knobs. Threaded through the resolver, collector, and
/// controller as an immutable value; there is no ambient global state.
///
/// Timeouts are expressed in milliseconds so the struct can round-trip
/// through a config file unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-strategy window in the resolver. Much shorter than the action
    /// timeout: a strategy that misses this window is treated as a miss,
    /// not waited on.
    pub fast_timeout_ms: u64,
    /// Bound on a single element action (click, fill, ...).
    pub action_timeout_ms: u64,
    /// Bound on navigation and page settling.
    pub navigation_timeout_ms: u64,
    /// Escalation attempt budget. Each attempt runs up to three sub-stages.
    pub max_heal_attempts: u32,
    /// Gates the model-proposal sub-stage only; declared fallbacks and
    /// candidate search always run.
    pub healing_enabled: bool,
    /// How many ranked candidates the recovery prompt includes.
    pub candidate_top_n: usize,
    /// Minimum score for accepting the top-ranked candidate.
    pub min_candidate_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fast_timeout_ms: 1_000,
            action_timeout_ms: 10_000,
            navigation_timeout_ms: 60_000,
            max_heal_attempts: 2,
            healing_enabled: true,
            candidate_top_n: 8,
            min_candidate_score: 0.3,
        }
    }
}

impl EngineConfig {
    pub fn fast_timeout(&self) -> Duration {
        Duration::from_millis(self.fast_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.fast_timeout(), Duration::from_secs(1));
        assert_eq!(config.action_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_heal_attempts, 2);
        assert!(config.healing_enabled);
        assert_eq!(config.candidate_top_n, 8);
        assert!((config.min_candidate_score - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: EngineConfig =
            serde_yaml::from_str("max_heal_attempts: 5\nhealing_enabled: false\n").unwrap();
        assert_eq!(config.max_heal_attempts, 5);
        assert!(!config.healing_enabled);
        assert_eq!(config.fast_timeout_ms, 1_000);
    }
}
