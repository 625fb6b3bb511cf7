//! Simulation configuration and scenario definitions.
//!
//! Supports loading scenarios from YAML files for reproducible experiments.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_course_code() -> String {
    "sim".to_string()
}
fn default_legos_per_seed() -> u32 {
    2
}
fn default_phrases_per_lego() -> u32 {
    3
}

/// A synthetic course shape: seed count, LEGOs per seed, practice phrases per
/// LEGO. Course content is generated in memory from these parameters rather
/// than read from a real database — the course content store is an external,
/// already-populated collaborator out of scope here, so this harness
/// generates its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_course_code")]
    pub course_code: String,
    pub seed_count: u32,
    #[serde(default = "default_legos_per_seed")]
    pub legos_per_seed: u32,
    #[serde(default = "default_phrases_per_lego")]
    pub phrases_per_lego: u32,
}

impl Scenario {
    pub fn small() -> Self {
        Self {
            name: "small".to_string(),
            course_code: default_course_code(),
            seed_count: 5,
            legos_per_seed: 2,
            phrases_per_lego: 3,
        }
    }

    pub fn large() -> Self {
        Self {
            name: "large".to_string(),
            course_code: default_course_code(),
            seed_count: 50,
            legos_per_seed: 3,
            phrases_per_lego: 4,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::small()
    }
}

fn default_speech_db() -> f64 {
    -18.0
}
fn default_silence_db() -> f64 {
    -60.0
}
fn default_frame_count() -> u32 {
    40
}

/// Deterministic learner behaviour: the energy profile fed to the Voice
/// Activity Analyzer through a `ScriptedMicrophoneInput`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub name: String,
    #[serde(default = "default_speech_db")]
    pub speech_energy_db: f64,
    #[serde(default = "default_silence_db")]
    pub silence_energy_db: f64,
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
}

impl LearnerProfile {
    pub fn attentive() -> Self {
        Self {
            name: "attentive".to_string(),
            speech_energy_db: default_speech_db(),
            silence_energy_db: default_silence_db(),
            frame_count: default_frame_count(),
        }
    }

    /// Speaks quietly, close to the VAD floor — exercises the "speech never
    /// confirmed" degrade path.
    pub fn quiet() -> Self {
        Self {
            name: "quiet".to_string(),
            speech_energy_db: -42.0,
            silence_energy_db: -60.0,
            frame_count: default_frame_count(),
        }
    }
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self::attentive()
    }
}

fn default_base_seed() -> u64 {
    42
}
fn default_repeats() -> usize {
    3
}

/// Main simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub learner: LearnerProfile,
    /// Base RNG seed for reproducible course generation.
    #[serde(default = "default_base_seed")]
    pub base_seed: u64,
    /// Number of times each scenario is replayed to verify determinism.
    #[serde(default = "default_repeats")]
    pub repeats: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenarios: vec![Scenario::default()],
            learner: LearnerProfile::default(),
            base_seed: default_base_seed(),
            repeats: default_repeats(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Save configuration to a YAML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_yaml_round_trip() {
        let config = SimulationConfig::default();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_yaml::to_string(&config).unwrap().as_bytes())
            .unwrap();

        let loaded = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(loaded.base_seed, config.base_seed);
        assert_eq!(loaded.scenarios.len(), 1);
        assert_eq!(loaded.scenarios[0].name, "small");
    }

    #[test]
    fn scenario_defaults() {
        let scenario = Scenario::default();
        assert_eq!(scenario.seed_count, 5);
        assert_eq!(scenario.legos_per_seed, 2);
    }
}
