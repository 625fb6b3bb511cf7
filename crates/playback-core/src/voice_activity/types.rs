//! The per-cycle speech-timing result the analyzer produces (spec §4.5
//! table).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpeechTimingResult {
    pub prompt_end_ms: Option<u64>,
    pub voice1_start_ms: Option<u64>,
    pub speech_start_ms: Option<u64>,
    pub speech_end_ms: Option<u64>,
    pub response_latency_ms: Option<u64>,
    pub learner_duration_ms: Option<u64>,
    pub duration_delta_ms: Option<i64>,
    pub started_during_prompt: bool,
    pub still_speaking_at_voice1: bool,
    pub speech_detected: bool,
    pub peak_energy_db: Option<f64>,
    pub average_energy_db: Option<f64>,
}

impl SpeechTimingResult {
    /// The no-timing-mode result used when microphone acquisition fails
    /// (spec §4.5: "MUST NOT fail the session").
    pub fn degraded() -> Self {
        Self::default()
    }
}
