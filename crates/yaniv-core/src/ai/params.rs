use serde::{Deserialize, Serialize};

/// Fewest deck samples a rollout is allowed to use.
pub const MIN_ROLLOUT_SAMPLES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPolicy {
    /// Expected-value search with rollouts and an Assaf-risk model.
    #[default]
    Expected,
    /// Minimizes next turn's hand and declares whenever every opponent
    /// looks heavier.
    Greedy,
}

impl AgentPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "expected" | "v2" | "default" => Some(AgentPolicy::Expected),
            "greedy" | "v1" | "legacy" => Some(AgentPolicy::Greedy),
            _ => None,
        }
    }
}

/// Tunable parameters of an autonomous player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// Deck cards sampled per rollout (raised to at least 4).
    pub rollout_samples: usize,
    /// Entries kept by each memo table before least-recently-used eviction.
    pub cache_capacity: usize,
    pub policy: AgentPolicy,
    /// Weight of opponent threat times the points kept after the turn.
    pub threat_weight: f64,
    /// Weight of the penalty for discarding cards opponents can use.
    pub feed_weight: f64,
    pub joker_weight: f64,
    /// Weight of the unseen-card spread on deck draws.
    pub uncertainty_weight: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            rollout_samples: 24,
            cache_capacity: 50_000,
            policy: AgentPolicy::Expected,
            threat_weight: 0.06,
            feed_weight: 0.12,
            joker_weight: 0.08,
            uncertainty_weight: 0.04,
        }
    }
}

impl AgentParams {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_rollout_samples(mut self, samples: usize) -> Self {
        self.rollout_samples = samples;
        self
    }

    pub fn with_policy(mut self, policy: AgentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn rollout_samples(&self) -> usize {
        self.rollout_samples.max(MIN_ROLLOUT_SAMPLES)
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();

        let rollout_samples = read("YANIV_ROLLOUT_SAMPLES")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(base.rollout_samples);

        let cache_capacity = read("YANIV_CACHE_CAPACITY")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(base.cache_capacity);

        let policy = read("YANIV_AI_POLICY")
            .and_then(|raw| AgentPolicy::parse(&raw))
            .unwrap_or(base.policy);

        Self {
            rollout_samples,
            cache_capacity,
            policy,
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reader_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("YANIV_ROLLOUT_SAMPLES", "8"),
            ("YANIV_AI_POLICY", "v1"),
        ]
        .into_iter()
        .collect();
        let params = AgentParams::from_reader(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(params.rollout_samples, 8);
        assert_eq!(params.policy, AgentPolicy::Greedy);
        assert_eq!(params.cache_capacity, 50_000);
    }

    #[test]
    fn garbage_values_fall_back() {
        let params = AgentParams::from_reader(|key| match key {
            "YANIV_ROLLOUT_SAMPLES" => Some("many".into()),
            "YANIV_AI_POLICY" => Some("chaotic".into()),
            _ => None,
        });
        assert_eq!(params, AgentParams::default());
    }

    #[test]
    fn rollout_samples_have_a_floor() {
        assert_eq!(AgentParams::default().with_rollout_samples(1).rollout_samples(), 4);
        assert_eq!(AgentParams::default().rollout_samples(), 24);
    }
}
