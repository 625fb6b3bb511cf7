use thiserror::Error;

use super::ids::LegoId;

/// Failure parsing a `SeedId`/`LegoId` from its `S{seed:04}[L{index:02}]` text form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid identifier format: {0}")]
    InvalidFormat(String),

    #[error("malformed identifier: {0}")]
    Malformed(String),
}

/// A single cycle failed validation (spec §7: `CycleIntegrityError`).
///
/// Does not invalidate the whole round; the Session Controller skips the
/// offending item and continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CycleIntegrityError {
    #[error("cycle for lego {lego_id} is missing {field} audio for text {text:?}")]
    MissingAudio {
        lego_id: LegoId,
        field: &'static str,
        text: String,
    },

    #[error("cycle for lego {lego_id} has no known/target text")]
    EmptyText { lego_id: LegoId },
}

/// A round-level structural failure (spec §7: `RoundStructureError`).
///
/// Invalidates the round as a whole; the controller still sequences the
/// valid items in order but emits `round:invalid`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoundStructureError {
    #[error("round {round_number} is missing an intro item")]
    MissingIntro { round_number: u32 },

    #[error("round {round_number} is missing a debut cycle")]
    MissingDebut { round_number: u32 },

    #[error(
        "round {round_number} intro/debut text mismatch: intro={intro_text:?} debut={debut_text:?}"
    )]
    IntroDebutMismatch {
        round_number: u32,
        intro_text: String,
        debut_text: String,
    },

    #[error("round {round_number} has {count} build cycles, exceeding the cap of {max}")]
    TooManyBuildCycles {
        round_number: u32,
        count: usize,
        max: usize,
    },

    #[error("round {round_number} has {count} spaced-rep cycles, exceeding the cap of {max}")]
    TooManySpacedRepCycles {
        round_number: u32,
        count: usize,
        max: usize,
    },
}

/// A non-fatal ordering anomaly surfaced by validation (spec §4.1: "Out-of-order
/// items are warnings").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStructureWarning {
    pub round_number: u32,
    pub message: String,
}
