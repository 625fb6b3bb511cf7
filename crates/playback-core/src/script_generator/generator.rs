//! The Script Generator (spec §4.1): turns course content into a validated
//! sequence of rounds ready to hand to the Cycle Player.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::ResolvedConfig;
use crate::domain::{
    Cycle, CycleIntegrityError, CycleType, IntroItem, KnownSide, LegoId, LegoPracticeState, Round,
    RoundItem, Script, SeedId, TargetSide, UsePhrase,
};
use crate::ports::content_repository::{CourseContentRepository, LegoRow, PhraseRole, PhraseRow};
use crate::text_norm::normalize;

use super::audio_index::AudioIndex;
use super::errors::ScriptGeneratorError;
use super::fibonacci;

#[derive(Debug, Clone)]
struct Phrase {
    known_text: String,
    target_text: String,
    syllables: u32,
}

impl From<&PhraseRow> for Phrase {
    fn from(row: &PhraseRow) -> Self {
        Self {
            known_text: row.known_text.clone(),
            target_text: row.target_text.clone(),
            syllables: row.target_syllable_count,
        }
    }
}

impl From<&Phrase> for UsePhrase {
    fn from(p: &Phrase) -> Self {
        UsePhrase {
            known_text: p.known_text.clone(),
            target_text: p.target_text.clone(),
            target_syllable_count: p.syllables,
        }
    }
}

/// Turn `(course_code, start_seed, end_seed)` into a fully validated
/// sequence of rounds (spec §4.1).
pub async fn generate_script(
    repo: &dyn CourseContentRepository,
    course_code: &str,
    start_seed: SeedId,
    end_seed: SeedId,
    config: &ResolvedConfig,
) -> Result<Script, ScriptGeneratorError> {
    if end_seed < start_seed {
        // Spec §4.1 edge case / §8 Scenario S1: an empty range is valid, not
        // an error.
        return Ok(Script {
            course_code: course_code.to_string(),
            start_seed,
            end_seed,
            rounds: Vec::new(),
        });
    }

    let audio_rows = repo.audio_for_course(course_code).await?;
    let audio_index = AudioIndex::build(&audio_rows);

    let lego_rows = repo.legos_in_range(course_code, start_seed, end_seed).await?;

    let mut rounds = Vec::with_capacity(lego_rows.len());
    let mut practice_states: HashMap<LegoId, LegoPracticeState> = HashMap::new();
    let mut round_number: u32 = 0;

    for lego_row in &lego_rows {
        round_number += 1;
        let lego_id = lego_row.lego_id();
        let phrase_rows = repo.phrases_for_lego(course_code, lego_id).await?;

        let (round, state) = build_round(
            round_number,
            lego_id,
            lego_row,
            &phrase_rows,
            &audio_index,
            config,
            &mut practice_states,
        );
        rounds.push(round);
        practice_states.insert(lego_id, state);
    }

    Ok(Script {
        course_code: course_code.to_string(),
        start_seed,
        end_seed,
        rounds,
    })
}

fn build_round(
    round_number: u32,
    lego_id: LegoId,
    lego_row: &LegoRow,
    phrase_rows: &[PhraseRow],
    audio_index: &AudioIndex,
    config: &ResolvedConfig,
    practice_states: &mut HashMap<LegoId, LegoPracticeState>,
) -> (Round, LegoPracticeState) {
    let seed_id = lego_id.seed_id();
    let mut cycle_errors: Vec<CycleIntegrityError> = Vec::new();
    let mut used_texts: HashSet<String> = HashSet::new();
    let mut items: Vec<RoundItem> = Vec::new();

    // Step 2: partition this LEGO's phrases into build/use pools, `component`
    // discarded. Sort each by target syllable count ascending; Rust's
    // `sort_by_key` is stable so ties keep insertion order.
    let mut build_pool: Vec<Phrase> = phrase_rows
        .iter()
        .filter(|r| r.phrase_role == PhraseRole::Build)
        .map(Phrase::from)
        .collect();
    build_pool.sort_by_key(|p| p.syllables);
    let mut build_pool: VecDeque<Phrase> = build_pool.into();

    let mut use_pool: Vec<Phrase> = phrase_rows
        .iter()
        .filter(|r| r.phrase_role == PhraseRole::Use)
        .map(Phrase::from)
        .collect();
    use_pool.sort_by_key(|p| p.syllables);
    // The LEGO's rotating spaced-rep pool is this full sorted set, captured
    // before this round drains a local copy for its own build-fill and
    // consolidation cycles — future spaced-rep review must still be able to
    // draw on every USE phrase this LEGO has, not just what this round left.
    let full_use_pool: Vec<UsePhrase> = use_pool.iter().map(UsePhrase::from).collect();
    let mut use_pool: VecDeque<Phrase> = use_pool.into();

    // Intro item.
    let presentation_audio_id = audio_index.presentation(&lego_id.to_string()).map(|s| s.id.clone());
    if presentation_audio_id.is_none() {
        cycle_errors.push(CycleIntegrityError::MissingAudio {
            lego_id,
            field: "presentation",
            text: lego_row.known_text.clone(),
        });
    }
    items.push(RoundItem::Intro(IntroItem {
        lego_id,
        known_text: lego_row.known_text.clone(),
        target_text: lego_row.target_text.clone(),
        presentation_audio_id,
    }));

    // Debut cycle: known/target text from the LEGO row itself.
    items.push(RoundItem::Debut(make_cycle(
        format!("{lego_id}-debut"),
        lego_id,
        seed_id,
        CycleType::Debut,
        &lego_row.known_text,
        &lego_row.target_text,
        audio_index,
        config,
        &mut cycle_errors,
    )));

    // Build cycles, filling from the use pool once the build pool is
    // exhausted (spec §4.1 step 3). Fillers are capped so they never drain
    // the use pool past one phrase beyond what `useConsolidationCount` will
    // take later this round (spec §8 S2: 3 build phrases + 2 USE fillers,
    // not enough fillers to reach `maxBuildPhrases` outright).
    let max_fillers = use_pool
        .len()
        .saturating_sub(config.use_consolidation_count)
        .saturating_sub(1);
    let mut fillers_taken = 0usize;
    let mut build_idx = 0usize;
    while build_idx < config.max_build_phrases {
        let phrase = if let Some(p) = build_pool.pop_front() {
            p
        } else if fillers_taken < max_fillers {
            let Some(p) = use_pool.pop_front() else {
                break;
            };
            fillers_taken += 1;
            p
        } else {
            break;
        };
        if !used_texts.insert(phrase.target_text.clone()) {
            continue;
        }
        items.push(RoundItem::Build(make_cycle(
            format!("{lego_id}-build-{build_idx}"),
            lego_id,
            seed_id,
            CycleType::Build,
            &phrase.known_text,
            &phrase.target_text,
            audio_index,
            config,
            &mut cycle_errors,
        )));
        build_idx += 1;
    }

    // Spaced-rep cycles: due LEGOs, earliest Fibonacci offset first, ties
    // broken by earliest prior LEGO (spec §4.1 step 3, §4.4).
    let mut due: Vec<(u32, LegoId, u32)> = practice_states
        .iter()
        .filter_map(|(id, state)| {
            fibonacci::is_due(round_number, state.last_round).map(|offset| (offset, *id, state.last_round))
        })
        .collect();
    due.sort_by(|a, b| a.0.cmp(&b.0).then(a.2.cmp(&b.2)).then(a.1.cmp(&b.1)));

    let mut spaced_rep_count = 0usize;
    'due_legos: for (_, due_lego_id, last_round) in due {
        if spaced_rep_count >= config.max_spaced_rep_phrases {
            break;
        }
        let is_n_minus1 = last_round == round_number.saturating_sub(1);
        let target_count = if is_n_minus1 {
            config.n_minus1_phrase_count
        } else {
            1
        };
        let state = practice_states
            .get_mut(&due_lego_id)
            .expect("due lego must have practice state");
        // The N-1 LEGO is expected to repeat the same rotated phrase
        // `nMinus1PhraseCount` times (spec §8 S3), so its attempts aren't
        // bounded by distinct-phrase count and aren't subject to the
        // in-round dedup that applies to every other source.
        let attempts_cap = if is_n_minus1 {
            target_count
        } else {
            state.use_pool.len().max(1)
        };
        let mut taken = 0usize;
        let mut attempts = 0usize;
        while taken < target_count && attempts < attempts_cap {
            attempts += 1;
            if spaced_rep_count >= config.max_spaced_rep_phrases {
                break 'due_legos;
            }
            let Some(phrase) = state.next_use_phrase().cloned() else {
                break;
            };
            if is_n_minus1 {
                used_texts.insert(phrase.target_text.clone());
            } else if !used_texts.insert(phrase.target_text.clone()) {
                continue;
            }
            items.push(RoundItem::SpacedRep(make_cycle(
                format!("{due_lego_id}-spacedrep-r{round_number}-{spaced_rep_count}"),
                due_lego_id,
                due_lego_id.seed_id(),
                CycleType::SpacedRep,
                &phrase.known_text,
                &phrase.target_text,
                audio_index,
                config,
                &mut cycle_errors,
            )));
            taken += 1;
            spaced_rep_count += 1;
        }
    }

    // Use (consolidation) cycles: next unused USE phrases.
    let mut use_idx = 0usize;
    while use_idx < config.use_consolidation_count {
        let Some(phrase) = use_pool.pop_front() else {
            break;
        };
        if !used_texts.insert(phrase.target_text.clone()) {
            continue;
        }
        items.push(RoundItem::Use(make_cycle(
            format!("{lego_id}-use-{use_idx}"),
            lego_id,
            seed_id,
            CycleType::Use,
            &phrase.known_text,
            &phrase.target_text,
            audio_index,
            config,
            &mut cycle_errors,
        )));
        use_idx += 1;
    }

    // The rotating spaced-rep pool for future rounds is the LEGO's full USE
    // set, not whatever this round's own build-fill/consolidation happened
    // to leave behind.
    let state = LegoPracticeState::new(lego_id, round_number, full_use_pool);

    let round = Round::with_cycle_errors(round_number, lego_id, items, cycle_errors);
    (round, state)
}

#[allow(clippy::too_many_arguments)]
fn make_cycle(
    id: String,
    lego_id: LegoId,
    seed_id: SeedId,
    cycle_type: CycleType,
    known_text: &str,
    target_text: &str,
    audio_index: &AudioIndex,
    config: &ResolvedConfig,
    cycle_errors: &mut Vec<CycleIntegrityError>,
) -> Cycle {
    let norm_known = normalize(known_text);
    let norm_target = normalize(target_text);

    let known_audio = audio_index.known(&norm_known);
    let target1_audio = audio_index.target1(&norm_target);
    let target2_audio = audio_index.target2(&norm_target);

    if known_audio.is_none() {
        cycle_errors.push(CycleIntegrityError::MissingAudio {
            lego_id,
            field: "known",
            text: known_text.to_string(),
        });
    }
    if target1_audio.is_none() {
        cycle_errors.push(CycleIntegrityError::MissingAudio {
            lego_id,
            field: "target1",
            text: target_text.to_string(),
        });
    }
    if target2_audio.is_none() {
        cycle_errors.push(CycleIntegrityError::MissingAudio {
            lego_id,
            field: "target2",
            text: target_text.to_string(),
        });
    }

    let voice1_duration_ms = target1_audio.and_then(|a| a.duration_ms);
    let voice2_duration_ms = target2_audio.and_then(|a| a.duration_ms);

    Cycle {
        id,
        lego_id,
        seed_id,
        cycle_type,
        known: KnownSide {
            text: known_text.to_string(),
            audio_id: known_audio.map(|a| a.id.clone()).unwrap_or_default(),
            duration_ms: known_audio.and_then(|a| a.duration_ms),
        },
        target: TargetSide {
            text: target_text.to_string(),
            voice1_audio_id: target1_audio.map(|a| a.id.clone()).unwrap_or_default(),
            voice1_duration_ms,
            voice2_audio_id: target2_audio.map(|a| a.id.clone()).unwrap_or_default(),
            voice2_duration_ms,
        },
        pause_duration_ms: compute_pause_duration_ms(config, voice1_duration_ms, voice2_duration_ms),
    }
}

/// `pauseDurationMs = round(pauseBootupMs + pauseScaleFactor *
/// (voice1DurationMs + voice2DurationMs))`, falling back to a 4000 ms default
/// when durations are unknown (spec §4.1 step 4).
fn compute_pause_duration_ms(
    config: &ResolvedConfig,
    voice1_duration_ms: Option<u64>,
    voice2_duration_ms: Option<u64>,
) -> u64 {
    match (voice1_duration_ms, voice2_duration_ms) {
        (Some(v1), Some(v2)) => {
            (config.pause_bootup_ms as f64 + config.pause_scale_factor * (v1 + v2) as f64).round() as u64
        }
        _ => 4000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemCategory;
    use crate::ports::content_repository::{AudioRole, AudioRow};
    use async_trait::async_trait;

    #[derive(Default)]
    struct FakeRepo {
        legos: Vec<LegoRow>,
        phrases: HashMap<LegoId, Vec<PhraseRow>>,
        audio: Vec<AudioRow>,
    }

    #[async_trait]
    impl CourseContentRepository for FakeRepo {
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

    fn lego_row(seed: u32, index: u32, known: &str, target: &str) -> LegoRow {
        LegoRow {
            course_code: "x".into(),
            seed_number: seed,
            lego_index: index,
            known_text: known.into(),
            target_text: target.into(),
            lego_type: crate::ports::content_repository::LegoType::A,
            is_new: true,
        }
    }

    fn phrase_row(
        seed: u32,
        index: u32,
        position: u32,
        role: PhraseRole,
        known: &str,
        target: &str,
        syllables: u32,
    ) -> PhraseRow {
        PhraseRow {
            course_code: "x".into(),
            seed_number: seed,
            lego_index: index,
            position,
            phrase_role: role,
            known_text: known.into(),
            target_text: target.into(),
            target_syllable_count: syllables,
        }
    }

    fn audio_row(id: &str, text: &str, role: AudioRole, lego_id: Option<&str>) -> AudioRow {
        AudioRow {
            id: id.into(),
            text_normalized: normalize(text),
            role,
            lego_id: lego_id.map(|s| s.to_string()),
            course_code: "x".into(),
            duration_ms: Some(500),
        }
    }

    #[tokio::test]
    async fn s1_empty_range_yields_zero_valid_rounds() {
        let repo = FakeRepo::default();
        let script = generate_script(
            &repo,
            "x",
            SeedId::new(1),
            SeedId::new(0),
            &ResolvedConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(script.rounds.len(), 0);
        let report = script.validation_report();
        assert_eq!(report.total_rounds, 0);
        assert!(report.valid);
    }

    #[tokio::test]
    async fn s2_single_lego_round_shape() {
        let lego_id = LegoId::new(1, 1);
        let mut repo = FakeRepo::default();
        repo.legos.push(lego_row(1, 1, "hello", "bonjour"));
        repo.phrases.insert(
            lego_id,
            vec![
                phrase_row(1, 1, 1, PhraseRole::Build, "k1", "t1", 2),
                phrase_row(1, 1, 2, PhraseRole::Build, "k2", "t2", 3),
                phrase_row(1, 1, 3, PhraseRole::Build, "k3", "t3", 4),
                phrase_row(1, 1, 4, PhraseRole::Use, "u1", "ut1", 2),
                phrase_row(1, 1, 5, PhraseRole::Use, "u2", "ut2", 3),
                phrase_row(1, 1, 6, PhraseRole::Use, "u3", "ut3", 3),
                phrase_row(1, 1, 7, PhraseRole::Use, "u4", "ut4", 4),
                phrase_row(1, 1, 8, PhraseRole::Use, "u5", "ut5", 5),
            ],
        );
        for (known, target) in [
            ("hello", "bonjour"),
            ("k1", "t1"),
            ("k2", "t2"),
            ("k3", "t3"),
            ("u1", "ut1"),
            ("u2", "ut2"),
            ("u3", "ut3"),
            ("u4", "ut4"),
            ("u5", "ut5"),
        ] {
            repo.audio.push(audio_row(
                &format!("{known}-known"),
                known,
                AudioRole::Known,
                None,
            ));
            repo.audio.push(audio_row(
                &format!("{target}-v1"),
                target,
                AudioRole::Target1,
                None,
            ));
            repo.audio.push(audio_row(
                &format!("{target}-v2"),
                target,
                AudioRole::Target2,
                None,
            ));
        }
        repo.audio
            .push(audio_row("presentation-1", "hello", AudioRole::Presentation, Some("S0001L01")));

        let mut config = ResolvedConfig::default();
        config.max_build_phrases = 7;
        config.use_consolidation_count = 2;

        let script = generate_script(&repo, "x", SeedId::new(1), SeedId::new(1), &config)
            .await
            .unwrap();
        assert_eq!(script.rounds.len(), 1);
        let round = &script.rounds[0];
        assert!(round.valid, "{:?}", round.errors);

        let categories: Vec<ItemCategory> = round.items.iter().map(|i| i.category()).collect();
        assert_eq!(
            categories,
            vec![
                ItemCategory::Intro,
                ItemCategory::Debut,
                ItemCategory::Build,
                ItemCategory::Build,
                ItemCategory::Build,
                ItemCategory::Build,
                ItemCategory::Build,
                ItemCategory::Use,
                ItemCategory::Use,
            ]
        );
        let playable_cycles = round.items.iter().filter(|i| i.cycle().is_some()).count();
        assert_eq!(playable_cycles, 8);
    }

    #[tokio::test]
    async fn s4_pause_computation_matches_spec() {
        let lego_id = LegoId::new(1, 1);
        let mut repo = FakeRepo::default();
        repo.legos.push(lego_row(1, 1, "hello", "bonjour"));
        repo.phrases.insert(lego_id, vec![]);
        repo.audio.push(audio_row("k1", "hello", AudioRole::Known, None));
        repo.audio.push({
            let mut row = audio_row("v1", "bonjour", AudioRole::Target1, None);
            row.duration_ms = Some(1500);
            row
        });
        repo.audio.push({
            let mut row = audio_row("v2", "bonjour", AudioRole::Target2, None);
            row.duration_ms = Some(1600);
            row
        });

        let mut config = ResolvedConfig::default();
        config.pause_bootup_ms = 2000;
        config.pause_scale_factor = 0.75;

        let script = generate_script(&repo, "x", SeedId::new(1), SeedId::new(1), &config)
            .await
            .unwrap();
        let debut = script.rounds[0].debut().unwrap();
        assert_eq!(debut.pause_duration_ms, 4325);
    }

    #[tokio::test]
    async fn s6_round_without_intro_is_invalid() {
        let lego_id = LegoId::new(1, 1);
        let items = vec![
            RoundItem::Debut(make_cycle(
                "d".into(),
                lego_id,
                lego_id.seed_id(),
                CycleType::Debut,
                "hello",
                "bonjour",
                &AudioIndex::default(),
                &ResolvedConfig::default(),
                &mut Vec::new(),
            )),
            RoundItem::Build(make_cycle(
                "b".into(),
                lego_id,
                lego_id.seed_id(),
                CycleType::Build,
                "k1",
                "t1",
                &AudioIndex::default(),
                &ResolvedConfig::default(),
                &mut Vec::new(),
            )),
            RoundItem::Use(make_cycle(
                "u".into(),
                lego_id,
                lego_id.seed_id(),
                CycleType::Use,
                "u1",
                "ut1",
                &AudioIndex::default(),
                &ResolvedConfig::default(),
                &mut Vec::new(),
            )),
        ];
        let round = Round::new(1, lego_id, items);
        assert!(!round.valid);
        assert!(matches!(
            round.errors[0],
            crate::domain::RoundStructureError::MissingIntro { .. }
        ));
    }

    #[tokio::test]
    async fn determinism_same_inputs_yield_identical_output() {
        let lego_id = LegoId::new(1, 1);
        let mut repo = FakeRepo::default();
        repo.legos.push(lego_row(1, 1, "hello", "bonjour"));
        repo.phrases.insert(
            lego_id,
            vec![phrase_row(1, 1, 1, PhraseRole::Use, "u1", "ut1", 2)],
        );
        repo.audio.push(audio_row("k1", "hello", AudioRole::Known, None));
        repo.audio.push(audio_row("v1", "bonjour", AudioRole::Target1, None));
        repo.audio.push(audio_row("v2", "bonjour", AudioRole::Target2, None));

        let config = ResolvedConfig::default();
        let first = generate_script(&repo, "x", SeedId::new(1), SeedId::new(1), &config)
            .await
            .unwrap();
        let second = generate_script(&repo, "x", SeedId::new(1), SeedId::new(1), &config)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn s3_fibonacci_schedule_matches_spec_scenario() {
        let mut repo = FakeRepo::default();
        for seed in 1..=9u32 {
            let lego_id = LegoId::new(seed, 1);
            repo.legos.push(lego_row(seed, 1, &format!("k{seed}"), &format!("t{seed}")));
            repo.phrases.insert(
                lego_id,
                vec![phrase_row(
                    seed,
                    1,
                    1,
                    PhraseRole::Use,
                    &format!("u{seed}"),
                    &format!("ut{seed}"),
                    2,
                )],
            );
            repo.audio
                .push(audio_row(&format!("k{seed}-a"), &format!("k{seed}"), AudioRole::Known, None));
            repo.audio.push(audio_row(
                &format!("t{seed}-v1"),
                &format!("t{seed}"),
                AudioRole::Target1,
                None,
            ));
            repo.audio.push(audio_row(
                &format!("t{seed}-v2"),
                &format!("t{seed}"),
                AudioRole::Target2,
                None,
            ));
            repo.audio.push(audio_row(
                &format!("u{seed}-a"),
                &format!("u{seed}"),
                AudioRole::Known,
                None,
            ));
            repo.audio.push(audio_row(
                &format!("ut{seed}-v1"),
                &format!("ut{seed}"),
                AudioRole::Target1,
                None,
            ));
            repo.audio.push(audio_row(
                &format!("ut{seed}-v2"),
                &format!("ut{seed}"),
                AudioRole::Target2,
                None,
            ));
        }

        let mut config = ResolvedConfig::default();
        config.n_minus1_phrase_count = 3;
        config.max_spaced_rep_phrases = 12;

        let script = generate_script(&repo, "x", SeedId::new(1), SeedId::new(9), &config)
            .await
            .unwrap();
        let round9 = &script.rounds[8];
        assert_eq!(round9.round_number, 9);

        let spaced_rep: Vec<&Cycle> = round9
            .items
            .iter()
            .filter_map(|i| match i {
                RoundItem::SpacedRep(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(spaced_rep.len(), 7);
        let lego_order: Vec<u32> = spaced_rep.iter().map(|c| c.lego_id.seed).collect();
        assert_eq!(lego_order, vec![8, 8, 8, 7, 6, 4, 1]);
    }
}
