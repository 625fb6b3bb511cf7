//! The Script Generator's and Priority Round Loader's sole dependency on
//! course content (spec §4.1, §6): three read-only row sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{LegoId, SeedId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegoType {
    /// Atomic
    A,
    /// Multi-word
    M,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegoRow {
    pub course_code: String,
    pub seed_number: u32,
    pub lego_index: u32,
    pub known_text: String,
    pub target_text: String,
    pub lego_type: LegoType,
    pub is_new: bool,
}

impl LegoRow {
    pub fn lego_id(&self) -> LegoId {
        LegoId::new(self.seed_number, self.lego_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseRole {
    Component,
    Build,
    Use,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRow {
    pub course_code: String,
    pub seed_number: u32,
    pub lego_index: u32,
    pub position: u32,
    pub phrase_role: PhraseRole,
    pub known_text: String,
    pub target_text: String,
    pub target_syllable_count: u32,
}

impl PhraseRow {
    pub fn lego_id(&self) -> LegoId {
        LegoId::new(self.seed_number, self.lego_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioRole {
    Known,
    Source,
    Target1,
    Target2,
    Presentation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRow {
    pub id: String,
    pub text_normalized: String,
    pub role: AudioRole,
    /// Required when `role == Presentation`.
    pub lego_id: Option<String>,
    pub course_code: String,
    pub duration_ms: Option<u64>,
}

/// The Script Generator and Priority Round Loader's only dependency on
/// course content. Implemented by `playback-storage` against SQLite;
/// mocked in tests via the `testing` feature.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CourseContentRepository: Send + Sync {
    /// `course_legos` rows for seeds in `[start_seed, end_seed]`, ordered by
    /// `(seed_number, lego_index)` ascending.
    async fn legos_in_range(
        &self,
        course_code: &str,
        start_seed: SeedId,
        end_seed: SeedId,
    ) -> anyhow::Result<Vec<LegoRow>>;

    /// `course_practice_phrases` rows for one LEGO, ordered by `position`
    /// ascending.
    async fn phrases_for_lego(
        &self,
        course_code: &str,
        lego_id: LegoId,
    ) -> anyhow::Result<Vec<PhraseRow>>;

    /// `course_audio` rows for an entire course, used to build the
    /// normalised-text audio index.
    async fn audio_for_course(&self, course_code: &str) -> anyhow::Result<Vec<AudioRow>>;
}
