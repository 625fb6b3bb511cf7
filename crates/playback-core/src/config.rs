//! Three-tier configuration merge (defaults < course < learner) over a
//! closed schema (spec §3/§9): "a plain deep merge over a closed record
//! schema. Enumerate the option set statically and reject unknown keys."
//!
//! A value-merge rather than env-var sourcing, since the core is embedded
//! rather than a standalone process; errors surface as a `thiserror`
//! `ConfigError`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fully-populated, immutable-per-session configuration (spec §3 table).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// Cognitive lead time before the learner is expected to speak.
    pub pause_bootup_ms: u64,
    /// Fraction of target audio duration added to the pause.
    pub pause_scale_factor: f64,
    /// Cap on build cycles per round.
    pub max_build_phrases: usize,
    /// Cap on spaced-rep cycles per round.
    pub max_spaced_rep_phrases: usize,
    /// Number of `use` cycles closing a round.
    pub use_consolidation_count: usize,
    /// Spaced-rep phrases contributed by the immediately prior LEGO.
    pub n_minus1_phrase_count: usize,
    /// Voice-activity floor, in dB.
    pub vad_energy_threshold_db: f64,
    /// Consecutive frames above the floor needed to confirm speech.
    pub vad_min_frames_above: u32,
    /// Silence needed to confirm speech end, in ms.
    pub vad_speech_end_debounce_ms: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            pause_bootup_ms: 2000,
            pause_scale_factor: 0.75,
            max_build_phrases: 7,
            max_spaced_rep_phrases: 12,
            use_consolidation_count: 2,
            n_minus1_phrase_count: 3,
            vad_energy_threshold_db: -40.0,
            vad_min_frames_above: 3,
            vad_speech_end_debounce_ms: 600,
        }
    }
}

/// A sparse override tier. Every field is optional; unknown JSON keys are
/// rejected at deserialization, enumerating the option set statically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigPatch {
    pub pause_bootup_ms: Option<u64>,
    pub pause_scale_factor: Option<f64>,
    pub max_build_phrases: Option<usize>,
    pub max_spaced_rep_phrases: Option<usize>,
    pub use_consolidation_count: Option<usize>,
    pub n_minus1_phrase_count: Option<usize>,
    pub vad_energy_threshold_db: Option<f64>,
    pub vad_min_frames_above: Option<u32>,
    pub vad_speech_end_debounce_ms: Option<u64>,
}

impl ResolvedConfig {
    /// Apply a patch tier on top of this configuration, overriding only the
    /// fields the patch sets.
    pub fn apply(mut self, patch: &ConfigPatch) -> Self {
        if let Some(v) = patch.pause_bootup_ms {
            self.pause_bootup_ms = v;
        }
        if let Some(v) = patch.pause_scale_factor {
            self.pause_scale_factor = v;
        }
        if let Some(v) = patch.max_build_phrases {
            self.max_build_phrases = v;
        }
        if let Some(v) = patch.max_spaced_rep_phrases {
            self.max_spaced_rep_phrases = v;
        }
        if let Some(v) = patch.use_consolidation_count {
            self.use_consolidation_count = v;
        }
        if let Some(v) = patch.n_minus1_phrase_count {
            self.n_minus1_phrase_count = v;
        }
        if let Some(v) = patch.vad_energy_threshold_db {
            self.vad_energy_threshold_db = v;
        }
        if let Some(v) = patch.vad_min_frames_above {
            self.vad_min_frames_above = v;
        }
        if let Some(v) = patch.vad_speech_end_debounce_ms {
            self.vad_speech_end_debounce_ms = v;
        }
        self
    }

    /// Three-tier deep merge: defaults < course < learner (spec §3/§9).
    pub fn merge(
        defaults: ResolvedConfig,
        course: Option<&ConfigPatch>,
        learner: Option<&ConfigPatch>,
    ) -> ResolvedConfig {
        let mut resolved = defaults;
        if let Some(course) = course {
            resolved = resolved.apply(course);
        }
        if let Some(learner) = learner {
            resolved = resolved.apply(learner);
        }
        resolved
    }

    /// Parse a tier from its JSON-object wire form, rejecting unknown keys.
    pub fn parse_patch(json: &str) -> Result<ConfigPatch, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidPatch(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration patch: {0}")]
    InvalidPatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let d = ResolvedConfig::default();
        assert_eq!(d.pause_bootup_ms, 2000);
        assert_eq!(d.max_build_phrases, 7);
        assert_eq!(d.max_spaced_rep_phrases, 12);
        assert_eq!(d.use_consolidation_count, 2);
        assert_eq!(d.n_minus1_phrase_count, 3);
    }

    #[test]
    fn course_overrides_defaults_and_learner_overrides_course() {
        let course = ConfigPatch {
            max_build_phrases: Some(5),
            ..Default::default()
        };
        let learner = ConfigPatch {
            max_build_phrases: Some(3),
            pause_bootup_ms: Some(1000),
            ..Default::default()
        };
        let resolved = ResolvedConfig::merge(ResolvedConfig::default(), Some(&course), Some(&learner));
        assert_eq!(resolved.max_build_phrases, 3);
        assert_eq!(resolved.pause_bootup_ms, 1000);
        assert_eq!(resolved.max_spaced_rep_phrases, 12);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = ResolvedConfig::parse_patch(r#"{"totallyUnknownKey": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPatch(_)));
    }

    #[test]
    fn pause_computation_matches_spec_scenario_s4() {
        let cfg = ResolvedConfig {
            pause_bootup_ms: 2000,
            pause_scale_factor: 0.75,
            ..ResolvedConfig::default()
        };
        let voice1 = 1500u64;
        let voice2 = 1600u64;
        let pause = (cfg.pause_bootup_ms as f64
            + cfg.pause_scale_factor * (voice1 + voice2) as f64)
            .round() as u64;
        assert_eq!(pause, 4325);
    }
}
