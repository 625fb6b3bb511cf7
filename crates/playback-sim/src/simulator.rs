//! Drives generated scripts through the real `SessionController`/`CyclePlayer`
//! under a `FakeClock`, exercising the Voice Activity Analyzer against a
//! scripted microphone once per cycle, and reports what happened — standing
//! in for a real browser session driving a synthetic learner through many
//! scripts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use playback_core::ports::{AudioError, AudioOutput, VecEventSink};
use playback_core::testing::FakeClock;
use playback_core::{
    generate_script, AudioRef, ControllerState, CyclePhaseEvent, CyclePlayer, PhaseMarkers,
    ResolvedConfig, SeedId, SessionController, SessionEvent, SpeechTimingResult,
    ValidationReport, VoiceActivityAnalyzer,
};

use crate::config::{LearnerProfile, Scenario};
use crate::course_gen::build_repository;
use crate::learner_mic::scripted_mic;

/// Resolves every call immediately, so a whole script plays out in zero
/// wall-clock time once paired with a `FakeClock`.
#[derive(Debug, Default)]
struct InstantAudioOutput;

#[async_trait]
impl AudioOutput for InstantAudioOutput {
    async fn unlock(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn play(&self, _audio: &AudioRef) -> Result<(), AudioError> {
        Ok(())
    }

    async fn stop_current(&self) {}
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationSummary {
    pub total_rounds: usize,
    pub valid: bool,
    pub error_count: usize,
}

impl From<&ValidationReport> for ValidationSummary {
    fn from(report: &ValidationReport) -> Self {
        Self {
            total_rounds: report.total_rounds,
            valid: report.valid,
            error_count: report.errors.len(),
        }
    }
}

/// What one scenario run produced: whether the scheduler reached
/// `SessionComplete`, how many rounds it played, the validation outcome, and
/// a speech-timing result per cycle the scripted microphone was monitored
/// against.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimulationReport {
    pub scenario_name: String,
    pub seed: u64,
    pub validation: ValidationSummary,
    pub rounds_completed: usize,
    pub session_complete: bool,
    pub speech_timings: Vec<SpeechTimingResult>,
}

/// Plays a fully-built set of rounds to completion against an instant audio
/// output and fake clock, and returns the final controller state alongside
/// every event it emitted. Exposed so integration tests can drive a
/// hand-built round set the same way `run_scenario` drives a generated one.
pub async fn play_rounds_to_completion(
    rounds: Vec<playback_core::Round>,
) -> anyhow::Result<(ControllerState, Vec<SessionEvent>)> {
    let clock = Arc::new(FakeClock::at(Utc::now()));
    let audio = Arc::new(InstantAudioOutput::default());
    let player = CyclePlayer::new(audio, clock);
    let mut controller = SessionController::new(player);
    let sink = Arc::new(VecEventSink::new());
    controller.add_listener(sink.clone());

    let total_rounds = rounds.len();
    controller.initialize(rounds, Some(total_rounds), HashMap::new());
    controller.start().await?;

    Ok((controller.state(), sink.events()))
}

/// Generates a script for `scenario` at `seed`, plays it to completion against
/// an instant audio output and fake clock, and runs the Voice Activity
/// Analyzer once per cycle against a scripted microphone built from
/// `learner`.
pub async fn run_scenario(
    scenario: &Scenario,
    learner: &LearnerProfile,
    seed: u64,
) -> anyhow::Result<SimulationReport> {
    let repo = build_repository(scenario, seed);
    let config = ResolvedConfig::default();
    let script = generate_script(
        &repo,
        &scenario.course_code,
        SeedId::new(1),
        SeedId::new(scenario.seed_count),
        &config,
    )
    .await?;
    let validation = script.validation_report();

    let (state, events) = play_rounds_to_completion(script.rounds).await?;
    let rounds_completed = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::RoundCompleted { .. }))
        .count();
    let session_complete = state == ControllerState::Complete;
    let speech_timings = replay_speech_timing(&events, learner, &config).await;

    Ok(SimulationReport {
        scenario_name: scenario.name.clone(),
        seed,
        validation: ValidationSummary::from(&validation),
        rounds_completed,
        session_complete,
        speech_timings,
    })
}

/// Replays the recorded phase events one cycle at a time against a fresh
/// scripted microphone, so the analyzer sees the same shape of frames a real
/// learner attempt would produce (spec §4.5), decoupled from the instant
/// virtual clock the cycles themselves played under.
async fn replay_speech_timing(
    events: &[SessionEvent],
    learner: &LearnerProfile,
    config: &ResolvedConfig,
) -> Vec<SpeechTimingResult> {
    let mut results = Vec::new();
    let mut cycle_start = None;
    let mut markers = PhaseMarkers::default();

    for event in events {
        let SessionEvent::Phase(phase) = event else {
            continue;
        };
        match phase {
            CyclePhaseEvent::PromptStart { at } => {
                cycle_start = Some(*at);
                markers = PhaseMarkers::default();
            }
            CyclePhaseEvent::PromptEnd { at } | CyclePhaseEvent::Voice1Start { at } => {
                if let Some(start) = cycle_start {
                    let elapsed_ms = (*at - start).num_milliseconds().max(0) as u64;
                    markers.record(phase, elapsed_ms);
                }
            }
            CyclePhaseEvent::CycleComplete { .. } => {
                if cycle_start.take().is_some() {
                    let mut analyzer =
                        VoiceActivityAnalyzer::new(Box::new(scripted_mic(learner)), config);
                    analyzer.acquire().await;
                    results.push(analyzer.monitor_cycle(&markers, None).await);
                }
            }
            _ => {}
        }
    }
    results
}
