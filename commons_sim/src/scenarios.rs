//! Baseline population scenarios.

use crate::policies::{CooperativeHarvester, GreedyHarvester, ResourceAwareHarvester};
use commons_core::EngineConfig;
use commons_env::{AgentId, Policy};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Every agent harvests the maximum
    Greedy,

    /// Every agent takes a share of the per-capita stock and contributes
    Cooperative,

    /// Every agent adapts to the stock level
    Adaptive,

    /// First half greedy, second half cooperative
    Mixed,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Greedy,
            ScenarioId::Cooperative,
            ScenarioId::Adaptive,
            ScenarioId::Mixed,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Greedy => "greedy",
            ScenarioId::Cooperative => "coop",
            ScenarioId::Adaptive => "adaptive",
            ScenarioId::Mixed => "mixed",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Greedy => "All agents request h_max and never contribute",
            ScenarioId::Cooperative => "All agents take half their per-capita share and contribute 5% of wealth",
            ScenarioId::Adaptive => "All agents scale harvest and contribution with the stock level",
            ScenarioId::Mixed => "Greedy first half, cooperative second half",
        }
    }

    /// Builds one policy per agent, in index order.
    pub fn build_policies(&self, config: &EngineConfig) -> Vec<Box<dyn Policy>> {
        let n = config.num_agents;
        let h_max = config.max_harvest;

        (0..n)
            .map(|i| {
                let agent = AgentId::from_index(i);
                let policy: Box<dyn Policy> = match self {
                    ScenarioId::Greedy => Box::new(GreedyHarvester::new(agent, h_max)),
                    ScenarioId::Cooperative => Box::new(CooperativeHarvester::new(agent, h_max)),
                    ScenarioId::Adaptive => Box::new(ResourceAwareHarvester::new(
                        agent,
                        h_max,
                        Some(config.capacity),
                    )),
                    ScenarioId::Mixed if i < n / 2 => Box::new(GreedyHarvester::new(agent, h_max)),
                    ScenarioId::Mixed => Box::new(CooperativeHarvester::new(agent, h_max)),
                };
                policy
            })
            .collect()
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greedy" => Ok(ScenarioId::Greedy),
            "coop" | "cooperative" => Ok(ScenarioId::Cooperative),
            "adaptive" | "resource_aware" => Ok(ScenarioId::Adaptive),
            "mixed" => Ok(ScenarioId::Mixed),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert_eq!("COOPERATIVE".parse::<ScenarioId>(), Ok(ScenarioId::Cooperative));
        assert!("tragedy".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_mixed_splits_population() {
        let config = EngineConfig {
            num_agents: 5,
            ..Default::default()
        };
        let names: Vec<String> = ScenarioId::Mixed
            .build_policies(&config)
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["greedy", "greedy", "cooperative", "cooperative", "cooperative"]
        );
    }

    #[test]
    fn test_one_policy_per_agent() {
        let config = EngineConfig {
            num_agents: 9,
            ..Default::default()
        };
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.build_policies(&config).len(), 9);
        }
    }
}
