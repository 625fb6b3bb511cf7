//! Deterministic learner "speech" shaped into scripted microphone frames for
//! the Voice Activity Analyzer (spec §4.5).

use playback_core::ports::EnergyFrame;
use playback_core::testing::ScriptedMicrophoneInput;

use crate::config::LearnerProfile;

const FRAME_STEP_MS: u64 = 100;

/// Builds a silence/speech/silence frame sequence: the middle third of the
/// recording sits at the profile's speech energy, the rest at its silence
/// energy — enough to exercise the analyzer's consecutive-above-threshold and
/// debounce logic without modelling a real speech envelope.
pub fn scripted_frames(profile: &LearnerProfile) -> Vec<EnergyFrame> {
    let total = profile.frame_count.max(3);
    let speech_start = total / 3;
    let speech_end = total - total / 3;

    (0..total)
        .map(|i| {
            let energy_db = if i >= speech_start && i < speech_end {
                profile.speech_energy_db
            } else {
                profile.silence_energy_db
            };
            EnergyFrame {
                elapsed_ms: i as u64 * FRAME_STEP_MS,
                energy_db,
            }
        })
        .collect()
}

/// A fresh `ScriptedMicrophoneInput` loaded with `profile`'s frame sequence.
/// The analyzer consumes and discards the mic per cycle, so callers build one
/// of these per cycle rather than trying to reuse it.
pub fn scripted_mic(profile: &LearnerProfile) -> ScriptedMicrophoneInput {
    ScriptedMicrophoneInput::new(scripted_frames(profile))
}
