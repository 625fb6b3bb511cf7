//! In-memory test fixtures for the core's ports, shared across crates under
//! the `testing` feature: one fixture per port (repository, microphone,
//! clock).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{LegoId, SeedId};
use crate::ports::clock::Clock;
use crate::ports::content_repository::{AudioRow, CourseContentRepository, LegoRow, PhraseRow};
use crate::ports::microphone::{EnergyFrame, MicrophoneInput};

/// A `CourseContentRepository` backed by plain in-memory rows, for tests and
/// the CLI's offline script-generation mode.
#[derive(Debug, Default)]
pub struct InMemoryCourseContentRepository {
    pub legos: Vec<LegoRow>,
    pub phrases: HashMap<LegoId, Vec<PhraseRow>>,
    pub audio: Vec<AudioRow>,
}

impl InMemoryCourseContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legos(mut self, legos: Vec<LegoRow>) -> Self {
        self.legos = legos;
        self
    }

    pub fn with_phrases(mut self, lego_id: LegoId, phrases: Vec<PhraseRow>) -> Self {
        self.phrases.insert(lego_id, phrases);
        self
    }

    pub fn with_audio(mut self, audio: Vec<AudioRow>) -> Self {
        self.audio = audio;
        self
    }
}

#[async_trait]
impl CourseContentRepository for InMemoryCourseContentRepository {
    async fn legos_in_range(
        &self,
        _course_code: &str,
        start_seed: SeedId,
        end_seed: SeedId,
    ) -> anyhow::Result<Vec<LegoRow>> {
        Ok(self
            .legos
            .iter()
            .filter(|l| l.lego_id().seed_id() >= start_seed && l.lego_id().seed_id() <= end_seed)
            .cloned()
            .collect())
    }

    async fn phrases_for_lego(
        &self,
        _course_code: &str,
        lego_id: LegoId,
    ) -> anyhow::Result<Vec<PhraseRow>> {
        Ok(self.phrases.get(&lego_id).cloned().unwrap_or_default())
    }

    async fn audio_for_course(&self, _course_code: &str) -> anyhow::Result<Vec<AudioRow>> {
        Ok(self.audio.clone())
    }
}

/// A `MicrophoneInput` that replays a fixed sequence of frames, then yields
/// `None`. Used to drive the Voice Activity Analyzer deterministically.
#[derive(Debug, Default)]
pub struct ScriptedMicrophoneInput {
    frames: Mutex<std::collections::VecDeque<EnergyFrame>>,
    fail_acquire: bool,
}

impl ScriptedMicrophoneInput {
    pub fn new(frames: Vec<EnergyFrame>) -> Self {
        Self {
            frames: Mutex::new(frames.into()),
            fail_acquire: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            frames: Mutex::new(Default::default()),
            fail_acquire: true,
        }
    }
}

#[async_trait]
impl MicrophoneInput for ScriptedMicrophoneInput {
    async fn acquire(&mut self) -> anyhow::Result<()> {
        if self.fail_acquire {
            anyhow::bail!("scripted microphone configured to fail acquisition");
        }
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<EnergyFrame> {
        self.frames.lock().expect("scripted mic mutex poisoned").pop_front()
    }

    fn stop(&mut self) {
        self.frames.lock().expect("scripted mic mutex poisoned").clear();
    }
}

/// A `Clock` whose `now()` advances by a fixed step on every call and whose
/// `sleep_ms` returns immediately, for deterministic Cycle Player tests.
#[derive(Debug)]
pub struct FakeClock {
    current: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn advance(&self, duration_ms: i64) {
        let mut current = self.current.lock().expect("fake clock mutex poisoned");
        *current += chrono::Duration::milliseconds(duration_ms);
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("fake clock mutex poisoned")
    }

    async fn sleep_ms(&self, duration_ms: u64) {
        self.advance(duration_ms as i64);
    }
}
