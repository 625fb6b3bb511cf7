//! Deterministic synthetic course generation: turns a [`Scenario`] shape plus
//! an RNG seed into an `InMemoryCourseContentRepository`, standing in for the
//! real, already-populated course content database.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use playback_core::domain::LegoId;
use playback_core::ports::{AudioRole, AudioRow, LegoRow, LegoType, PhraseRole, PhraseRow};
use playback_core::testing::InMemoryCourseContentRepository;

use crate::config::Scenario;

fn push_text_audio(
    audio: &mut Vec<AudioRow>,
    course_code: &str,
    known_text: &str,
    target_text: &str,
    rng: &mut StdRng,
) {
    audio.push(AudioRow {
        id: format!("audio-known-{known_text}"),
        text_normalized: known_text.to_string(),
        role: AudioRole::Known,
        lego_id: None,
        course_code: course_code.to_string(),
        duration_ms: Some(rng.gen_range(400..1200)),
    });
    audio.push(AudioRow {
        id: format!("audio-target1-{target_text}"),
        text_normalized: target_text.to_string(),
        role: AudioRole::Target1,
        lego_id: None,
        course_code: course_code.to_string(),
        duration_ms: Some(rng.gen_range(400..1200)),
    });
    audio.push(AudioRow {
        id: format!("audio-target2-{target_text}"),
        text_normalized: target_text.to_string(),
        role: AudioRole::Target2,
        lego_id: None,
        course_code: course_code.to_string(),
        duration_ms: Some(rng.gen_range(400..1200)),
    });
}

/// Builds a fully-playable course: every known/target phrase text gets a
/// matching audio row, and every LEGO gets presentation audio, so the Script
/// Generator never has to degrade a round for missing audio (spec §4.1 edge
/// case) — the simulation is exercising the scheduler, not audio gaps.
pub fn build_repository(scenario: &Scenario, seed: u64) -> InMemoryCourseContentRepository {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut legos = Vec::with_capacity((scenario.seed_count * scenario.legos_per_seed) as usize);
    let mut audio = Vec::new();
    let mut phrase_map: HashMap<LegoId, Vec<PhraseRow>> = HashMap::new();

    for seed_number in 1..=scenario.seed_count {
        for lego_index in 1..=scenario.legos_per_seed {
            let lego_id = LegoId::new(seed_number, lego_index);
            let known_text = format!("known-{lego_id}");
            let target_text = format!("target-{lego_id}");

            legos.push(LegoRow {
                course_code: scenario.course_code.clone(),
                seed_number,
                lego_index,
                known_text: known_text.clone(),
                target_text: target_text.clone(),
                lego_type: LegoType::A,
                is_new: true,
            });

            push_text_audio(&mut audio, &scenario.course_code, &known_text, &target_text, &mut rng);
            audio.push(AudioRow {
                id: format!("audio-presentation-{lego_id}"),
                text_normalized: known_text.clone(),
                role: AudioRole::Presentation,
                lego_id: Some(lego_id.to_string()),
                course_code: scenario.course_code.clone(),
                duration_ms: Some(rng.gen_range(400..1200)),
            });

            let mut phrases = Vec::with_capacity(scenario.phrases_per_lego as usize);
            for position in 0..scenario.phrases_per_lego {
                let role = match position % 3 {
                    0 => PhraseRole::Component,
                    1 => PhraseRole::Build,
                    _ => PhraseRole::Use,
                };
                let phrase_known = format!("{known_text}-p{position}");
                let phrase_target = format!("{target_text}-p{position}");
                push_text_audio(&mut audio, &scenario.course_code, &phrase_known, &phrase_target, &mut rng);

                phrases.push(PhraseRow {
                    course_code: scenario.course_code.clone(),
                    seed_number,
                    lego_index,
                    position,
                    phrase_role: role,
                    known_text: phrase_known,
                    target_text: phrase_target,
                    target_syllable_count: rng.gen_range(1..4),
                });
            }
            phrase_map.insert(lego_id, phrases);
        }
    }

    let mut repo = InMemoryCourseContentRepository::new().with_legos(legos).with_audio(audio);
    for (lego_id, phrases) in phrase_map {
        repo = repo.with_phrases(lego_id, phrases);
    }
    repo
}
