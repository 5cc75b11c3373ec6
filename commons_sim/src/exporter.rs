//! JSON exporter for replay inspection.
//!
//! Writes a full run (configuration, every step record and the summary)
//! as pretty-printed JSON.

use crate::error::SimError;
use crate::runner::{first_divergence, RunSummary, ScenarioResult, ScenarioRunner};
use crate::scenarios::ScenarioId;
use commons_core::{EngineConfig, StepRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Complete run export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    pub config: EngineConfig,

    /// One record per executed step
    pub records: Vec<StepRecord>,

    pub summary: RunSummary,
}

impl RunExport {
    /// Creates an export from a finished run.
    pub fn new(result: &ScenarioResult) -> Self {
        Self {
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            config: result.config.clone(),
            records: result.records.clone(),
            summary: result.summary.clone(),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Reads an export written by [`RunExport::write_to_file`].
    pub fn read_from_file(path: &str) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Re-runs the recorded actions and checks the trajectory matches.
    pub fn verify_replay(&self) -> Result<ScenarioResult, SimError> {
        let scenario: ScenarioId = self
            .scenario
            .parse()
            .map_err(|_| SimError::UnknownScenario(self.scenario.clone()))?;

        let replayed = ScenarioRunner::new(self.config.clone(), self.seed).replay(scenario, &self.records)?;
        match first_divergence(&self.records, &replayed.records) {
            Some(step) => Err(SimError::ReplayDiverged { step }),
            None => Ok(replayed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_survives_file_roundtrip() {
        let config = EngineConfig {
            num_agents: 3,
            governance_enabled: true,
            bonus_coefficient: 0.5,
            ..Default::default()
        };
        let result = ScenarioRunner::new(config, 11)
            .with_rounds(6)
            .run(ScenarioId::Cooperative)
            .unwrap();
        let export = RunExport::new(&result);

        let path = std::env::temp_dir().join(format!("commons_export_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();
        export.write_to_file(&path).unwrap();

        let back = RunExport::read_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.scenario, "coop");
        assert_eq!(back.seed, 11);
        assert_eq!(back.records.len(), 6);
        assert_eq!(back.summary.steps, 6);
        assert!(back.records.iter().all(|r| r.pool_after.is_some()));
        assert!(back.verify_replay().is_ok());
    }

    #[test]
    fn test_tampered_export_fails_replay() {
        let config = EngineConfig {
            num_agents: 4,
            ..Default::default()
        };
        let result = ScenarioRunner::new(config, 8).with_rounds(5).run(ScenarioId::Adaptive).unwrap();
        let mut export = RunExport::new(&result);
        export.records[3].wealth[1] += 0.5;

        let err = export.verify_replay().unwrap_err();
        assert!(matches!(err, SimError::ReplayDiverged { step: 3 }));
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let config = EngineConfig {
            num_agents: 1,
            ..Default::default()
        };
        let result = ScenarioRunner::new(config, 1).with_rounds(1).run(ScenarioId::Greedy).unwrap();
        let err = RunExport::new(&result)
            .write_to_file("/nonexistent-dir/commons/export.json")
            .unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
