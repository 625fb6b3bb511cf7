//! The Cycle Player (spec §4.2): executes one immutable cycle against a
//! single reusable audio handle and emits ordered phase events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{AudioRef, Cycle, IntroItem};
use crate::ports::{AudioError, AudioOutput, Clock};

use super::events::CyclePhaseEvent;

/// The terminal outcome of one `play_cycle`/`play_intro` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    Aborted,
    AudioError,
}

enum PhaseResult {
    Completed,
    Aborted,
    AudioError(AudioError),
}

/// Owns exactly one `AudioOutput` handle for the lifetime of the session
/// (spec §4.2, §5, §9). `unlock()` must be called once, synchronously from
/// a user gesture, before the first `play_cycle`.
pub struct CyclePlayer {
    audio: Arc<dyn AudioOutput>,
    clock: Arc<dyn Clock>,
    unlocked: AtomicBool,
    stop_requested: AtomicBool,
    stop_notify: tokio::sync::Notify,
}

impl CyclePlayer {
    pub fn new(audio: Arc<dyn AudioOutput>, clock: Arc<dyn Clock>) -> Self {
        Self {
            audio,
            clock,
            unlocked: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            stop_notify: tokio::sync::Notify::new(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Must be invoked synchronously from a user gesture before the first
    /// `play_cycle`/`play_intro` call.
    pub async fn unlock(&self) -> anyhow::Result<()> {
        self.audio.unlock().await?;
        self.unlocked.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Aborts whatever phase is currently in flight. The next
    /// `play_cycle`/`play_intro` call starts fresh.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.stop_notify.notify_one();
    }

    /// Executes one immutable cycle's four phases in order (spec §4.2 state
    /// machine), emitting events via `emit` as each transition occurs.
    pub async fn play_cycle(
        &self,
        cycle: &Cycle,
        emit: &mut dyn FnMut(CyclePhaseEvent),
    ) -> CycleOutcome {
        self.stop_requested.store(false, Ordering::SeqCst);
        let started_at = self.clock.now();

        emit(CyclePhaseEvent::PromptStart { at: started_at });
        let known_ref = AudioRef::new(cycle.known.audio_id.clone(), cycle.known.duration_ms);
        match self.play_phase(&known_ref).await {
            PhaseResult::Aborted => return self.abort(emit),
            PhaseResult::AudioError(e) => return self.audio_error(emit, e, started_at),
            PhaseResult::Completed => emit(CyclePhaseEvent::PromptEnd { at: self.clock.now() }),
        }

        emit(CyclePhaseEvent::PauseStart { at: self.clock.now() });
        match self.wait_phase(cycle.pause_duration_ms).await {
            PhaseResult::Aborted => return self.abort(emit),
            PhaseResult::AudioError(_) => unreachable!("a timer wait never produces an audio error"),
            PhaseResult::Completed => emit(CyclePhaseEvent::PauseEnd { at: self.clock.now() }),
        }

        emit(CyclePhaseEvent::Voice1Start { at: self.clock.now() });
        let voice1_ref = AudioRef::new(
            cycle.target.voice1_audio_id.clone(),
            cycle.target.voice1_duration_ms,
        );
        match self.play_phase(&voice1_ref).await {
            PhaseResult::Aborted => return self.abort(emit),
            PhaseResult::AudioError(e) => return self.audio_error(emit, e, started_at),
            PhaseResult::Completed => emit(CyclePhaseEvent::Voice1End { at: self.clock.now() }),
        }

        emit(CyclePhaseEvent::Voice2Start { at: self.clock.now() });
        let voice2_ref = AudioRef::new(
            cycle.target.voice2_audio_id.clone(),
            cycle.target.voice2_duration_ms,
        );
        match self.play_phase(&voice2_ref).await {
            PhaseResult::Aborted => return self.abort(emit),
            PhaseResult::AudioError(e) => return self.audio_error(emit, e, started_at),
            PhaseResult::Completed => emit(CyclePhaseEvent::Voice2End { at: self.clock.now() }),
        }

        let elapsed_ms = elapsed_ms(started_at, self.clock.now());
        emit(CyclePhaseEvent::CycleComplete { elapsed_ms });
        CycleOutcome::Completed
    }

    /// Plays an intro item's single presentation audio with no pause and no
    /// voice2 measurement (spec §4.2).
    pub async fn play_intro(
        &self,
        intro: &IntroItem,
        emit: &mut dyn FnMut(CyclePhaseEvent),
    ) -> CycleOutcome {
        self.stop_requested.store(false, Ordering::SeqCst);
        let Some(audio_id) = intro.presentation_audio_id.clone() else {
            emit(CyclePhaseEvent::CycleAudioError {
                message: format!("lego {} has no presentation audio", intro.lego_id),
            });
            emit(CyclePhaseEvent::CycleComplete { elapsed_ms: 0 });
            return CycleOutcome::AudioError;
        };
        let audio_ref = AudioRef::new(audio_id, None);
        match self.play_phase(&audio_ref).await {
            PhaseResult::Aborted => {
                emit(CyclePhaseEvent::CycleAborted);
                CycleOutcome::Aborted
            }
            PhaseResult::AudioError(e) => {
                emit(CyclePhaseEvent::CycleAudioError { message: e.to_string() });
                emit(CyclePhaseEvent::CycleComplete { elapsed_ms: 0 });
                CycleOutcome::AudioError
            }
            PhaseResult::Completed => {
                emit(CyclePhaseEvent::IntroComplete);
                CycleOutcome::Completed
            }
        }
    }

    async fn play_phase(&self, audio: &AudioRef) -> PhaseResult {
        tokio::select! {
            () = self.await_stop() => PhaseResult::Aborted,
            res = self.audio.play(audio) => match res {
                Ok(()) => PhaseResult::Completed,
                Err(e) => PhaseResult::AudioError(e),
            },
        }
    }

    async fn wait_phase(&self, duration_ms: u64) -> PhaseResult {
        tokio::select! {
            () = self.await_stop() => PhaseResult::Aborted,
            () = self.clock.sleep_ms(duration_ms) => PhaseResult::Completed,
        }
    }

    async fn await_stop(&self) {
        if self.stop_requested.load(Ordering::SeqCst) {
            return;
        }
        self.stop_notify.notified().await;
    }

    fn abort(&self, emit: &mut dyn FnMut(CyclePhaseEvent)) -> CycleOutcome {
        self.audio_output_stop();
        emit(CyclePhaseEvent::CycleAborted);
        CycleOutcome::Aborted
    }

    fn audio_error(
        &self,
        emit: &mut dyn FnMut(CyclePhaseEvent),
        error: AudioError,
        started_at: DateTime<Utc>,
    ) -> CycleOutcome {
        emit(CyclePhaseEvent::CycleAudioError { message: error.to_string() });
        emit(CyclePhaseEvent::CycleComplete {
            elapsed_ms: elapsed_ms(started_at, self.clock.now()),
        });
        CycleOutcome::AudioError
    }

    fn audio_output_stop(&self) {
        let audio = Arc::clone(&self.audio);
        tokio::spawn(async move {
            audio.stop_current().await;
        });
    }
}

fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}
