//! The round-level state machine (spec §4.3): sequences rounds, drives the
//! Cycle Player one item at a time, and coordinates spaced-repetition
//! bookkeeping. Runs under the single-threaded cooperative model (spec §5) —
//! no internal locking; an embedding crate that needs shared access wraps a
//! controller in its own mutex at its boundary.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use thiserror::Error;

use crate::cycle_player::{CycleOutcome, CyclePlayer};
use crate::domain::{LegoId, LegoPracticeState, Round, RoundItem};
use crate::ports::EventSink;

use super::events::SessionEvent;
use super::scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Playing,
    Paused,
    Complete,
}

/// Programmer-contract violations (spec §7: "Only programmer-contract
/// violations ... may throw synchronously"). Every other failure mode is
/// reported as an event instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("start() called before initialize()")]
    NotInitialized,
    #[error("cannot {action} from state {state:?}")]
    InvalidState {
        action: &'static str,
        state: ControllerState,
    },
}

/// Sequences a script's rounds against a [`CyclePlayer`], one item at a time.
pub struct SessionController {
    state: ControllerState,
    rounds: Vec<Round>,
    total_rounds: Option<usize>,
    round_index: usize,
    item_index: usize,
    practice_states: HashMap<LegoId, LegoPracticeState>,
    player: CyclePlayer,
    listeners: Vec<Arc<dyn EventSink>>,
    initialized: bool,
}

impl SessionController {
    pub fn new(player: CyclePlayer) -> Self {
        Self {
            state: ControllerState::Idle,
            rounds: Vec::new(),
            total_rounds: None,
            round_index: 0,
            item_index: 0,
            practice_states: HashMap::new(),
            player,
            listeners: Vec::new(),
            initialized: false,
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn EventSink>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn has_round(&self, index: usize) -> bool {
        index < self.rounds.len()
    }

    pub fn current_round_index(&self) -> usize {
        self.round_index
    }

    /// Accepts either a fully built script's rounds (`total_rounds =
    /// Some(script.round_count())`) or an empty session with a resume point
    /// (`rounds` empty, `total_rounds = None`, prior LEGO practice state
    /// supplied) (spec §4.3 `initialize`).
    pub fn initialize(
        &mut self,
        rounds: Vec<Round>,
        total_rounds: Option<usize>,
        resume_practice_states: HashMap<LegoId, LegoPracticeState>,
    ) {
        self.rounds = rounds;
        self.total_rounds = total_rounds;
        self.practice_states = resume_practice_states;
        self.round_index = 0;
        self.item_index = 0;
        self.state = ControllerState::Idle;
        self.initialized = true;
    }

    /// Append-only. Resumes playback if the controller was parked waiting on
    /// exactly this round (spec §4.3 `addRound`).
    pub async fn add_round(&mut self, round: Round) {
        self.add_rounds(vec![round]).await;
    }

    pub async fn add_rounds(&mut self, rounds: Vec<Round>) {
        let was_blocked = self.state == ControllerState::Playing && !self.has_round(self.round_index);
        self.rounds.extend(rounds);
        if was_blocked && self.has_round(self.round_index) {
            self.drive().await;
        }
    }

    /// Unlocks the audio handle — must be called synchronously from a user
    /// gesture — and begins the current item (spec §4.3 `start`).
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        if !self.initialized {
            return Err(ControllerError::NotInitialized);
        }
        match self.state {
            ControllerState::Idle | ControllerState::Paused => {}
            other => {
                return Err(ControllerError::InvalidState {
                    action: "start",
                    state: other,
                })
            }
        }
        self.player.unlock().await.ok();
        self.state = ControllerState::Playing;
        self.emit(SessionEvent::SessionStarted);
        self.drive().await;
        Ok(())
    }

    /// Stops the current cycle (emits `cycle:aborted`) and returns to
    /// `paused`. Cycle progress within the round is lost; `resume` restarts
    /// the current item from the beginning — a deliberate simplification
    /// (spec §4.3, §9 "Open question: half-cycle resume").
    pub fn pause(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Playing {
            return Err(ControllerError::InvalidState {
                action: "pause",
                state: self.state,
            });
        }
        self.player.stop();
        self.state = ControllerState::Paused;
        self.emit(SessionEvent::SessionPaused);
        Ok(())
    }

    pub async fn resume(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Paused {
            return Err(ControllerError::InvalidState {
                action: "resume",
                state: self.state,
            });
        }
        self.state = ControllerState::Playing;
        self.emit(SessionEvent::SessionResumed);
        self.drive().await;
        Ok(())
    }

    /// Abort and return to `idle`; session state is retained for a later
    /// `start` (spec §4.3 `stop`).
    pub fn stop(&mut self) {
        self.player.stop();
        self.state = ControllerState::Idle;
    }

    pub async fn skip_cycle(&mut self) {
        self.player.stop();
        if self.state == ControllerState::Playing {
            self.item_index += 1;
            self.drive().await;
        }
    }

    pub async fn skip_round(&mut self) {
        self.player.stop();
        if self.state == ControllerState::Playing {
            self.round_index += 1;
            self.item_index = 0;
            self.drive().await;
        }
    }

    pub async fn jump_to_round(&mut self, round_index: usize) {
        self.player.stop();
        self.round_index = round_index;
        self.item_index = 0;
        if self.state == ControllerState::Playing {
            self.drive().await;
        }
    }

    fn total_reached(&self) -> bool {
        self.total_rounds.is_some_and(|t| self.round_index >= t)
    }

    /// The item-advance algorithm (spec §4.3). Runs until the session parks
    /// (waiting on a round), completes, or a cycle is aborted.
    async fn drive(&mut self) {
        loop {
            if self.state != ControllerState::Playing {
                return;
            }

            if !self.has_round(self.round_index) {
                if self.total_reached() {
                    self.state = ControllerState::Complete;
                    self.emit(SessionEvent::SessionComplete);
                } else {
                    self.emit(SessionEvent::RoundLoading {
                        round_index: self.round_index,
                    });
                }
                return;
            }

            if self.item_index == 0 {
                self.emit(SessionEvent::RoundLoaded {
                    round_index: self.round_index,
                });
                let round = &self.rounds[self.round_index];
                if !round.valid {
                    self.emit(SessionEvent::RoundInvalid {
                        round_index: self.round_index,
                    });
                }
                self.emit(SessionEvent::RoundStarted {
                    round_index: self.round_index,
                    lego_id: round.lego_id,
                });
            }

            let round = &self.rounds[self.round_index];
            if self.item_index >= round.items.len() {
                self.emit(SessionEvent::RoundCompleted {
                    round_index: self.round_index,
                });
                scheduler::decrement_all(&mut self.practice_states);
                self.round_index += 1;
                self.item_index = 0;
                continue;
            }

            let item = round.items[self.item_index].clone();
            if !item.is_playable() {
                self.emit(SessionEvent::ItemStarted {
                    round_index: self.round_index,
                    item_index: self.item_index,
                });
                self.emit(SessionEvent::ItemCompleted {
                    round_index: self.round_index,
                    item_index: self.item_index,
                });
                self.item_index += 1;
                continue;
            }

            self.emit(SessionEvent::ItemStarted {
                round_index: self.round_index,
                item_index: self.item_index,
            });

            let mut phase_events = Vec::new();
            let outcome = match &item {
                RoundItem::Intro(intro) => {
                    self.player
                        .play_intro(intro, &mut |e| phase_events.push(e))
                        .await
                }
                _ => {
                    let cycle = item.cycle().expect("non-intro item always carries a cycle");
                    self.player
                        .play_cycle(cycle, &mut |e| phase_events.push(e))
                        .await
                }
            };
            for e in phase_events {
                self.emit(SessionEvent::Phase(e));
            }

            match outcome {
                CycleOutcome::Aborted => return,
                CycleOutcome::Completed | CycleOutcome::AudioError => {
                    self.emit(SessionEvent::ItemCompleted {
                        round_index: self.round_index,
                        item_index: self.item_index,
                    });
                    self.item_index += 1;
                }
            }
        }
    }

    /// Dispatches to every listener, isolating a panicking listener so it
    /// never derails sequencing (spec §4.3, §9 "Listener errors").
    fn emit(&self, event: SessionEvent) {
        for listener in &self.listeners {
            let listener = Arc::clone(listener);
            let event = event.clone();
            if std::panic::catch_unwind(AssertUnwindSafe(|| listener.emit(event))).is_err() {
                tracing::error!("session event listener panicked; continuing sequencing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cycle, CycleType, IntroItem, KnownSide, TargetSide};
    use crate::ports::{MockAudioOutput, MockClock, VecEventSink};
    use chrono::Utc;

    fn cycle(lego_id: LegoId, cycle_type: CycleType) -> Cycle {
        Cycle {
            id: format!("{lego_id}-{cycle_type:?}"),
            lego_id,
            seed_id: lego_id.seed_id(),
            cycle_type,
            known: KnownSide {
                text: "hello".into(),
                audio_id: "a1".into(),
                duration_ms: Some(100),
            },
            target: TargetSide {
                text: "bonjour".into(),
                voice1_audio_id: "v1".into(),
                voice1_duration_ms: Some(100),
                voice2_audio_id: "v2".into(),
                voice2_duration_ms: Some(100),
            },
            pause_duration_ms: 10,
        }
    }

    fn well_formed_round(lego_id: LegoId, round_number: u32) -> Round {
        let items = vec![
            RoundItem::Intro(IntroItem {
                lego_id,
                known_text: "hello".into(),
                target_text: "bonjour".into(),
                presentation_audio_id: Some("p1".into()),
            }),
            RoundItem::Debut(cycle(lego_id, CycleType::Debut)),
            RoundItem::Use(cycle(lego_id, CycleType::Use)),
        ];
        Round::new(round_number, lego_id, items)
    }

    fn player_with_working_audio() -> CyclePlayer {
        let mut audio = MockAudioOutput::new();
        audio.expect_play().returning(|_| Ok(()));
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        clock.expect_sleep_ms().returning(|_| ());
        CyclePlayer::new(Arc::new(audio), Arc::new(clock))
    }

    #[tokio::test]
    async fn start_before_initialize_is_a_contract_violation() {
        let mut controller = SessionController::new(player_with_working_audio());
        let err = controller.start().await.unwrap_err();
        assert_eq!(err, ControllerError::NotInitialized);
    }

    #[tokio::test]
    async fn full_script_plays_through_to_complete() {
        let lego_id = LegoId::new(1, 1);
        let round = well_formed_round(lego_id, 1);
        let mut controller = SessionController::new(player_with_working_audio());
        controller.initialize(vec![round], Some(1), HashMap::new());

        let sink = Arc::new(VecEventSink::new());
        controller.add_listener(sink.clone());
        controller.start().await.unwrap();

        assert_eq!(controller.state(), ControllerState::Complete);
        let events = sink.events();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::SessionStarted)));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::RoundCompleted { .. })));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::SessionComplete)));
    }

    #[tokio::test]
    async fn missing_round_parks_and_add_round_resumes() {
        let lego_id = LegoId::new(1, 1);
        let mut controller = SessionController::new(player_with_working_audio());
        controller.initialize(vec![], Some(1), HashMap::new());

        let sink = Arc::new(VecEventSink::new());
        controller.add_listener(sink.clone());
        controller.start().await.unwrap();

        assert_eq!(controller.state(), ControllerState::Playing);
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::RoundLoading { round_index: 0 })));

        controller.add_round(well_formed_round(lego_id, 1)).await;
        assert_eq!(controller.state(), ControllerState::Complete);
    }

    #[tokio::test]
    async fn pause_outside_playing_is_a_contract_violation() {
        let lego_id = LegoId::new(1, 1);
        let round = well_formed_round(lego_id, 1);
        let mut controller = SessionController::new(player_with_working_audio());
        controller.initialize(vec![round], Some(1), HashMap::new());

        assert!(matches!(
            controller.pause(),
            Err(ControllerError::InvalidState { action: "pause", .. })
        ));
    }

    #[tokio::test]
    async fn a_panicking_listener_does_not_interrupt_sequencing() {
        struct PanickyListener;
        impl EventSink for PanickyListener {
            fn emit(&self, _event: SessionEvent) {
                panic!("boom");
            }
        }

        let lego_id = LegoId::new(1, 1);
        let round = well_formed_round(lego_id, 1);
        let mut controller = SessionController::new(player_with_working_audio());
        controller.initialize(vec![round], Some(1), HashMap::new());
        controller.add_listener(Arc::new(PanickyListener));

        controller.start().await.unwrap();
        assert_eq!(controller.state(), ControllerState::Complete);
    }
}
