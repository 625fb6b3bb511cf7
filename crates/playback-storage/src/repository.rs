//! SQLite-backed `CourseContentRepository` (spec §6) over the three
//! read-only row sources: `course_legos`, `course_practice_phrases`, and
//! `course_audio`.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use playback_core::domain::{LegoId, SeedId};
use playback_core::ports::content_repository::{
    AudioRole, AudioRow, CourseContentRepository, LegoRow, LegoType, PhraseRole, PhraseRow,
};

pub struct SqliteCourseContentRepository {
    pool: SqlitePool,
}

impl SqliteCourseContentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn lego_type_from_column(value: &str) -> LegoType {
    match value {
        "M" => LegoType::M,
        _ => LegoType::A,
    }
}

fn phrase_role_from_column(value: &str) -> PhraseRole {
    match value {
        "build" => PhraseRole::Build,
        "use" => PhraseRole::Use,
        _ => PhraseRole::Component,
    }
}

fn audio_role_from_column(value: &str) -> AudioRole {
    match value {
        "source" => AudioRole::Source,
        "target1" => AudioRole::Target1,
        "target2" => AudioRole::Target2,
        "presentation" => AudioRole::Presentation,
        _ => AudioRole::Known,
    }
}

#[async_trait]
impl CourseContentRepository for SqliteCourseContentRepository {
    async fn legos_in_range(
        &self,
        course_code: &str,
        start_seed: SeedId,
        end_seed: SeedId,
    ) -> anyhow::Result<Vec<LegoRow>> {
        let rows = sqlx::query(
            "SELECT seed_number, lego_index, known_text, target_text, lego_type, is_new
             FROM course_legos
             WHERE course_code = ? AND seed_number BETWEEN ? AND ?
             ORDER BY seed_number ASC, lego_index ASC",
        )
        .bind(course_code)
        .bind(start_seed.number())
        .bind(end_seed.number())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LegoRow {
                course_code: course_code.to_string(),
                seed_number: r.get::<i64, _>("seed_number") as u32,
                lego_index: r.get::<i64, _>("lego_index") as u32,
                known_text: r.get("known_text"),
                target_text: r.get("target_text"),
                lego_type: lego_type_from_column(r.get::<String, _>("lego_type").as_str()),
                is_new: r.get::<i64, _>("is_new") != 0,
            })
            .collect())
    }

    async fn phrases_for_lego(
        &self,
        course_code: &str,
        lego_id: LegoId,
    ) -> anyhow::Result<Vec<PhraseRow>> {
        let rows = sqlx::query(
            "SELECT position, phrase_role, known_text, target_text, target_syllable_count
             FROM course_practice_phrases
             WHERE course_code = ? AND seed_number = ? AND lego_index = ?
             ORDER BY position ASC",
        )
        .bind(course_code)
        .bind(lego_id.seed)
        .bind(lego_id.index)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PhraseRow {
                course_code: course_code.to_string(),
                seed_number: lego_id.seed,
                lego_index: lego_id.index,
                position: r.get::<i64, _>("position") as u32,
                phrase_role: phrase_role_from_column(r.get::<String, _>("phrase_role").as_str()),
                known_text: r.get("known_text"),
                target_text: r.get("target_text"),
                target_syllable_count: r.get::<i64, _>("target_syllable_count") as u32,
            })
            .collect())
    }

    async fn audio_for_course(&self, course_code: &str) -> anyhow::Result<Vec<AudioRow>> {
        let rows = sqlx::query(
            "SELECT id, text_normalized, role, lego_id, duration_ms
             FROM course_audio
             WHERE course_code = ?",
        )
        .bind(course_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AudioRow {
                id: r.get("id"),
                text_normalized: r.get("text_normalized"),
                role: audio_role_from_column(r.get::<String, _>("role").as_str()),
                lego_id: r.get("lego_id"),
                course_code: course_code.to_string(),
                duration_ms: r.get::<Option<i64>, _>("duration_ms").map(|v| v as u64),
            })
            .collect())
    }
}
