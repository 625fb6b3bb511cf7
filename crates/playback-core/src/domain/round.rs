//! Rounds: an ordered sequence of items introducing and practising one LEGO.

use serde::{Deserialize, Serialize};

use super::cycle::{ItemCategory, RoundItem};
use super::errors::{CycleIntegrityError, RoundStructureError, RoundStructureWarning};
use super::ids::LegoId;

/// An ordered sequence of round items for one LEGO (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub lego_id: LegoId,
    pub items: Vec<RoundItem>,
    /// `false` when `validate()` recorded a `RoundStructureError`; the
    /// Session Controller still sequences the valid items within it.
    pub valid: bool,
    pub errors: Vec<RoundStructureError>,
    pub warnings: Vec<RoundStructureWarning>,
    /// Per-cycle audio-lock failures (spec §7 `CycleIntegrityError`). These
    /// mark individual items unplayable without invalidating the round.
    pub cycle_errors: Vec<CycleIntegrityError>,
}

impl Round {
    pub fn new(round_number: u32, lego_id: LegoId, items: Vec<RoundItem>) -> Self {
        Self::with_cycle_errors(round_number, lego_id, items, Vec::new())
    }

    pub fn with_cycle_errors(
        round_number: u32,
        lego_id: LegoId,
        items: Vec<RoundItem>,
        cycle_errors: Vec<CycleIntegrityError>,
    ) -> Self {
        let mut round = Self {
            round_number,
            lego_id,
            items,
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            cycle_errors,
        };
        round.validate(7, 12);
        round
    }

    /// Validate structural invariants (spec §4.1 step 5, §7, §8 Properties
    /// 2–4). Warnings never flip `valid`; errors do.
    pub fn validate(&mut self, max_build_phrases: usize, max_spaced_rep_phrases: usize) {
        self.errors.clear();
        self.warnings.clear();

        let intro = self.items.iter().find_map(|i| match i {
            RoundItem::Intro(intro) => Some(intro),
            _ => None,
        });
        let debut = self.items.iter().find_map(|i| match i {
            RoundItem::Debut(c) => Some(c),
            _ => None,
        });

        match intro {
            None => self.errors.push(RoundStructureError::MissingIntro {
                round_number: self.round_number,
            }),
            Some(intro) => match debut {
                None => self.errors.push(RoundStructureError::MissingDebut {
                    round_number: self.round_number,
                }),
                Some(debut) => {
                    if intro.known_text != debut.known.text || intro.target_text != debut.target.text
                    {
                        self.errors.push(RoundStructureError::IntroDebutMismatch {
                            round_number: self.round_number,
                            intro_text: intro.target_text.clone(),
                            debut_text: debut.target.text.clone(),
                        });
                    }
                }
            },
        }

        let build_count = self
            .items
            .iter()
            .filter(|i| i.category() == ItemCategory::Build)
            .count();
        if build_count > max_build_phrases {
            self.errors.push(RoundStructureError::TooManyBuildCycles {
                round_number: self.round_number,
                count: build_count,
                max: max_build_phrases,
            });
        }

        let spaced_rep_count = self
            .items
            .iter()
            .filter(|i| i.category() == ItemCategory::SpacedRep)
            .count();
        if spaced_rep_count > max_spaced_rep_phrases {
            self.errors
                .push(RoundStructureError::TooManySpacedRepCycles {
                    round_number: self.round_number,
                    count: spaced_rep_count,
                    max: max_spaced_rep_phrases,
                });
        }

        let mut last_category = ItemCategory::Intro;
        for item in &self.items {
            let category = item.category();
            if category < last_category {
                self.warnings.push(RoundStructureWarning {
                    round_number: self.round_number,
                    message: format!(
                        "item of category {category:?} appears after category {last_category:?}"
                    ),
                });
            }
            last_category = category;
        }

        self.valid = self.errors.is_empty();
    }

    pub fn intro(&self) -> Option<&super::cycle::IntroItem> {
        self.items.iter().find_map(|i| match i {
            RoundItem::Intro(intro) => Some(intro),
            _ => None,
        })
    }

    pub fn debut(&self) -> Option<&super::cycle::Cycle> {
        self.items.iter().find_map(|i| match i {
            RoundItem::Debut(c) => Some(c),
            _ => None,
        })
    }
}

/// Aggregates validation outcomes across every round a Script Generator run
/// produced (spec §4.1 "diagnostic", §8 Scenarios S1/S6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    pub total_rounds: usize,
    pub valid: bool,
    pub errors: Vec<RoundValidationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssue {
    Structure(RoundStructureError),
    CycleIntegrity(CycleIntegrityError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundValidationEntry {
    pub round_number: u32,
    pub issue: ValidationIssue,
}

impl ValidationReport {
    /// `valid` reflects only `RoundStructureError`s (spec §7: a
    /// `CycleIntegrityError` marks one item invalid without invalidating the
    /// round), but both kinds are reported for diagnostics.
    pub fn from_rounds(rounds: &[Round]) -> Self {
        let mut errors = Vec::new();
        let mut valid = true;
        for round in rounds {
            for error in &round.errors {
                valid = false;
                errors.push(RoundValidationEntry {
                    round_number: round.round_number,
                    issue: ValidationIssue::Structure(error.clone()),
                });
            }
            for error in &round.cycle_errors {
                errors.push(RoundValidationEntry {
                    round_number: round.round_number,
                    issue: ValidationIssue::CycleIntegrity(error.clone()),
                });
            }
        }
        Self {
            total_rounds: rounds.len(),
            valid,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::{Cycle, CycleType, IntroItem, KnownSide, TargetSide};

    fn cycle(lego_id: LegoId, cycle_type: CycleType) -> Cycle {
        Cycle {
            id: format!("{lego_id}-{cycle_type:?}"),
            lego_id,
            seed_id: lego_id.seed_id(),
            cycle_type,
            known: KnownSide {
                text: "hello".into(),
                audio_id: "a1".into(),
                duration_ms: Some(500),
            },
            target: TargetSide {
                text: "bonjour".into(),
                voice1_audio_id: "v1".into(),
                voice1_duration_ms: Some(500),
                voice2_audio_id: "v2".into(),
                voice2_duration_ms: Some(500),
            },
            pause_duration_ms: 4000,
        }
    }

    #[test]
    fn empty_round_is_invalid_missing_intro_and_debut() {
        let lego_id = LegoId::new(1, 1);
        let round = Round::new(1, lego_id, vec![]);
        assert!(!round.valid);
        assert!(matches!(
            round.errors[0],
            RoundStructureError::MissingIntro { .. }
        ));
    }

    #[test]
    fn missing_intro_with_debut_present() {
        let lego_id = LegoId::new(1, 1);
        let items = vec![
            RoundItem::Debut(cycle(lego_id, CycleType::Debut)),
            RoundItem::Build(cycle(lego_id, CycleType::Build)),
            RoundItem::Use(cycle(lego_id, CycleType::Use)),
        ];
        let round = Round::new(1, lego_id, items);
        assert!(!round.valid);
        assert!(matches!(
            round.errors[0],
            RoundStructureError::MissingIntro { .. }
        ));
    }

    #[test]
    fn well_formed_round_is_valid() {
        let lego_id = LegoId::new(1, 1);
        let items = vec![
            RoundItem::Intro(IntroItem {
                lego_id,
                known_text: "hello".into(),
                target_text: "bonjour".into(),
                presentation_audio_id: Some("p1".into()),
            }),
            RoundItem::Debut(cycle(lego_id, CycleType::Debut)),
            RoundItem::Build(cycle(lego_id, CycleType::Build)),
            RoundItem::Use(cycle(lego_id, CycleType::Use)),
        ];
        let round = Round::new(1, lego_id, items);
        assert!(round.valid, "{:?}", round.errors);
        assert!(round.warnings.is_empty());
    }

    #[test]
    fn intro_debut_text_mismatch_is_an_error() {
        let lego_id = LegoId::new(1, 1);
        let mut debut = cycle(lego_id, CycleType::Debut);
        debut.target.text = "au revoir".into();
        let items = vec![
            RoundItem::Intro(IntroItem {
                lego_id,
                known_text: "hello".into(),
                target_text: "bonjour".into(),
                presentation_audio_id: Some("p1".into()),
            }),
            RoundItem::Debut(debut),
        ];
        let round = Round::new(1, lego_id, items);
        assert!(!round.valid);
        assert!(matches!(
            round.errors[0],
            RoundStructureError::IntroDebutMismatch { .. }
        ));
    }

    #[test]
    fn out_of_order_items_are_warnings_not_errors() {
        let lego_id = LegoId::new(1, 1);
        let items = vec![
            RoundItem::Intro(IntroItem {
                lego_id,
                known_text: "hello".into(),
                target_text: "bonjour".into(),
                presentation_audio_id: Some("p1".into()),
            }),
            RoundItem::Debut(cycle(lego_id, CycleType::Debut)),
            RoundItem::Use(cycle(lego_id, CycleType::Use)),
            RoundItem::Build(cycle(lego_id, CycleType::Build)),
        ];
        let round = Round::new(1, lego_id, items);
        assert!(round.valid);
        assert_eq!(round.warnings.len(), 1);
    }

    #[test]
    fn too_many_build_cycles_is_an_error() {
        let lego_id = LegoId::new(1, 1);
        let mut items = vec![
            RoundItem::Intro(IntroItem {
                lego_id,
                known_text: "hello".into(),
                target_text: "bonjour".into(),
                presentation_audio_id: Some("p1".into()),
            }),
            RoundItem::Debut(cycle(lego_id, CycleType::Debut)),
        ];
        for _ in 0..8 {
            items.push(RoundItem::Build(cycle(lego_id, CycleType::Build)));
        }
        let round = Round::new(1, lego_id, items);
        assert!(!round.valid);
        assert!(matches!(
            round.errors[0],
            RoundStructureError::TooManyBuildCycles { .. }
        ));
    }
}
