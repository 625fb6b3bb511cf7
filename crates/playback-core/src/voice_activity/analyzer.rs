//! RMS-energy speech-timing analysis (spec §4.5). Holds transient per-cycle
//! state only; callers reset it at each cycle boundary by calling
//! `monitor_cycle` again.

use crate::config::ResolvedConfig;
use crate::cycle_player::CyclePhaseEvent;
use crate::ports::MicrophoneInput;

use super::types::SpeechTimingResult;

/// Wall-clock phase-boundary markers the Cycle Player reports, relative to
/// monitoring start (time 0 at PROMPT start) (spec §4.5).
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseMarkers {
    pub prompt_end_ms: Option<u64>,
    pub voice1_start_ms: Option<u64>,
}

impl PhaseMarkers {
    pub fn record(&mut self, event: &CyclePhaseEvent, elapsed_ms: u64) {
        match event {
            CyclePhaseEvent::PromptEnd { .. } => self.prompt_end_ms = Some(elapsed_ms),
            CyclePhaseEvent::Voice1Start { .. } => self.voice1_start_ms = Some(elapsed_ms),
            _ => {}
        }
    }
}

/// One continuous sampling pass against a microphone input. Acquisition must
/// happen inside the same user gesture that unlocks audio output (spec §4.5,
/// §9); acquisition failure degrades the analyzer to no-timing mode rather
/// than failing the session.
pub struct VoiceActivityAnalyzer {
    mic: Box<dyn MicrophoneInput>,
    energy_threshold_db: f64,
    min_frames_above: u32,
    speech_end_debounce_ms: u64,
    degraded: bool,
}

impl VoiceActivityAnalyzer {
    pub fn new(mic: Box<dyn MicrophoneInput>, config: &ResolvedConfig) -> Self {
        Self {
            mic,
            energy_threshold_db: config.vad_energy_threshold_db,
            min_frames_above: config.vad_min_frames_above,
            speech_end_debounce_ms: config.vad_speech_end_debounce_ms,
            degraded: false,
        }
    }

    pub async fn acquire(&mut self) {
        if self.mic.acquire().await.is_err() {
            self.degraded = true;
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Consumes frames from the microphone until it yields `None` (monitoring
    /// stopped, by cycle completion or `stop()`), then folds the samples into
    /// a [`SpeechTimingResult`] against the supplied phase markers and the
    /// model's target response duration.
    pub async fn monitor_cycle(
        &mut self,
        markers: &PhaseMarkers,
        model_target_duration_ms: Option<u64>,
    ) -> SpeechTimingResult {
        if self.degraded {
            return SpeechTimingResult::degraded();
        }

        let mut consecutive_above = 0u32;
        let mut speech_active = false;
        let mut speech_start_ms: Option<u64> = None;
        let mut speech_end_ms: Option<u64> = None;
        let mut pending_end_since: Option<u64> = None;
        let mut peak_energy_db: Option<f64> = None;
        let mut energy_sum = 0.0_f64;
        let mut energy_count = 0u64;

        while let Some(frame) = self.mic.next_frame().await {
            peak_energy_db = Some(peak_energy_db.map_or(frame.energy_db, |p| p.max(frame.energy_db)));
            energy_sum += frame.energy_db;
            energy_count += 1;

            if frame.energy_db > self.energy_threshold_db {
                pending_end_since = None;
                consecutive_above += 1;
                if !speech_active && consecutive_above >= self.min_frames_above {
                    speech_active = true;
                    if speech_start_ms.is_none() {
                        speech_start_ms = Some(frame.elapsed_ms);
                    }
                }
            } else {
                consecutive_above = 0;
                if speech_active {
                    let since = *pending_end_since.get_or_insert(frame.elapsed_ms);
                    if frame.elapsed_ms.saturating_sub(since) >= self.speech_end_debounce_ms {
                        speech_end_ms = Some(since);
                        speech_active = false;
                        pending_end_since = None;
                    }
                }
            }
        }

        if speech_active && speech_end_ms.is_none() {
            speech_end_ms = pending_end_since.or(speech_start_ms);
        }

        let learner_duration_ms = match (speech_start_ms, speech_end_ms) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        };
        let duration_delta_ms = match (learner_duration_ms, model_target_duration_ms) {
            (Some(l), Some(m)) => Some(l as i64 - m as i64),
            _ => None,
        };
        let started_during_prompt = match (speech_start_ms, markers.prompt_end_ms) {
            (Some(s), Some(p)) => s < p,
            _ => false,
        };
        let still_speaking_at_voice1 = match (speech_end_ms, markers.voice1_start_ms) {
            (Some(e), Some(v)) => e > v,
            _ => false,
        };

        SpeechTimingResult {
            prompt_end_ms: markers.prompt_end_ms,
            voice1_start_ms: markers.voice1_start_ms,
            speech_start_ms,
            speech_end_ms,
            response_latency_ms: speech_start_ms,
            learner_duration_ms,
            duration_delta_ms,
            started_during_prompt,
            still_speaking_at_voice1,
            speech_detected: speech_start_ms.is_some(),
            peak_energy_db,
            average_energy_db: (energy_count > 0).then(|| energy_sum / energy_count as f64),
        }
    }

    /// Aborts the current monitoring pass; the caller discards whatever
    /// partial result it was assembling (spec §4.5 "Cancellation").
    pub fn stop(&mut self) {
        self.mic.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{EnergyFrame, MockMicrophoneInput};

    fn config() -> ResolvedConfig {
        ResolvedConfig {
            vad_energy_threshold_db: -40.0,
            vad_min_frames_above: 2,
            vad_speech_end_debounce_ms: 300,
            ..ResolvedConfig::default()
        }
    }

    fn frames(values: Vec<(u64, f64)>) -> MockMicrophoneInput {
        let mut mic = MockMicrophoneInput::new();
        mic.expect_acquire().returning(|| Ok(()));
        let mut iter = values.into_iter();
        mic.expect_next_frame()
            .returning(move || Some(iter.next()).flatten().map(|(elapsed_ms, energy_db)| EnergyFrame { elapsed_ms, energy_db }));
        mic
    }

    #[tokio::test]
    async fn s5_vad_happy_path_matches_spec_scenario() {
        // Speech from 2500ms to 5000ms; voice1 begins at 6000ms (spec S5).
        let mic = frames(vec![
            (0, -60.0),
            (1000, -60.0),
            (2500, -10.0),
            (2600, -10.0),
            (5000, -60.0),
            (5301, -60.0),
        ]);
        let mut analyzer = VoiceActivityAnalyzer::new(Box::new(mic), &config());
        analyzer.acquire().await;

        let markers = PhaseMarkers {
            prompt_end_ms: Some(2000),
            voice1_start_ms: Some(6000),
        };
        let result = analyzer.monitor_cycle(&markers, None).await;

        assert_eq!(result.response_latency_ms, Some(2500));
        assert_eq!(result.learner_duration_ms, Some(2500));
        assert!(!result.started_during_prompt);
        assert!(!result.still_speaking_at_voice1);
        assert!(result.speech_detected);
    }

    #[tokio::test]
    async fn degraded_after_acquisition_failure_skips_monitoring() {
        let mut mic = MockMicrophoneInput::new();
        mic.expect_acquire().returning(|| anyhow::bail!("no mic"));
        let mut analyzer = VoiceActivityAnalyzer::new(Box::new(mic), &config());
        analyzer.acquire().await;
        assert!(analyzer.is_degraded());

        let result = analyzer.monitor_cycle(&PhaseMarkers::default(), None).await;
        assert_eq!(result, SpeechTimingResult::degraded());
    }
}
