use playback_core::domain::{LegoId, SeedId};
use playback_core::ports::content_repository::{AudioRole, CourseContentRepository, LegoType, PhraseRole};
use playback_storage::{init_content_db, SqliteCourseContentRepository};

async fn seeded_db() -> sqlx::SqlitePool {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("content.db");
    let pool = init_content_db(db_path.to_str().unwrap())
        .await
        .expect("init content db");

    sqlx::query(
        "INSERT INTO course_legos (course_code, seed_number, lego_index, known_text, target_text, lego_type, is_new)
         VALUES ('ar-en', 1, 1, 'hello', 'marhaba', 'A', 1),
                ('ar-en', 1, 2, 'world', 'alam', 'M', 1),
                ('ar-en', 2, 1, 'peace', 'salam', 'A', 0)",
    )
    .execute(&pool)
    .await
    .expect("seed legos");

    sqlx::query(
        "INSERT INTO course_practice_phrases
            (course_code, seed_number, lego_index, position, phrase_role, known_text, target_text, target_syllable_count)
         VALUES ('ar-en', 1, 1, 0, 'component', 'hi', 'marhaba', 3),
                ('ar-en', 1, 1, 1, 'use', 'hello there', 'marhaba bik', 5)",
    )
    .execute(&pool)
    .await
    .expect("seed phrases");

    sqlx::query(
        "INSERT INTO course_audio (id, course_code, text_normalized, role, lego_id, duration_ms)
         VALUES ('a1', 'ar-en', 'marhaba', 'target1', NULL, 900),
                ('a2', 'ar-en', 'marhaba', 'presentation', 'S0001L01', 1800)",
    )
    .execute(&pool)
    .await
    .expect("seed audio");

    // dir is leaked on purpose so the pool keeps a live path for the test's
    // duration; the OS reclaims it on process exit.
    std::mem::forget(dir);
    pool
}

#[tokio::test]
async fn legos_in_range_respects_seed_bounds_and_ordering() {
    let repo = SqliteCourseContentRepository::new(seeded_db().await);

    let rows = repo
        .legos_in_range("ar-en", SeedId::new(1), SeedId::new(1))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].lego_id(), LegoId::new(1, 1));
    assert_eq!(rows[1].lego_id(), LegoId::new(1, 2));
    assert_eq!(rows[0].lego_type, LegoType::A);
    assert_eq!(rows[1].lego_type, LegoType::M);
}

#[tokio::test]
async fn phrases_for_lego_orders_by_position() {
    let repo = SqliteCourseContentRepository::new(seeded_db().await);

    let phrases = repo
        .phrases_for_lego("ar-en", LegoId::new(1, 1))
        .await
        .unwrap();

    assert_eq!(phrases.len(), 2);
    assert_eq!(phrases[0].phrase_role, PhraseRole::Component);
    assert_eq!(phrases[1].phrase_role, PhraseRole::Use);
    assert_eq!(phrases[1].target_syllable_count, 5);
}

#[tokio::test]
async fn audio_for_course_maps_roles_and_nullable_lego_id() {
    let repo = SqliteCourseContentRepository::new(seeded_db().await);

    let rows = repo.audio_for_course("ar-en").await.unwrap();

    assert_eq!(rows.len(), 2);
    let presentation = rows.iter().find(|r| r.role == AudioRole::Presentation).unwrap();
    assert_eq!(presentation.lego_id.as_deref(), Some("S0001L01"));
    let target1 = rows.iter().find(|r| r.role == AudioRole::Target1).unwrap();
    assert_eq!(target1.duration_ms, Some(900));
}
