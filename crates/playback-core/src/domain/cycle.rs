//! Immutable playback units (spec §3: "A Cycle is either complete or it does
//! not exist").

use serde::{Deserialize, Serialize};

use super::ids::{LegoId, SeedId};

/// An opaque, content-addressed audio identifier with an optional known
/// duration. Resolution to bytes is an external collaborator (spec §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub id: String,
    pub duration_ms: Option<u64>,
}

impl AudioRef {
    pub fn new(id: impl Into<String>, duration_ms: Option<u64>) -> Self {
        Self {
            id: id.into(),
            duration_ms,
        }
    }
}

/// The known-language prompt side of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSide {
    pub text: String,
    pub audio_id: String,
    pub duration_ms: Option<u64>,
}

/// The target-language confirmation side of a cycle: two model-voice takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSide {
    pub text: String,
    pub voice1_audio_id: String,
    pub voice1_duration_ms: Option<u64>,
    pub voice2_audio_id: String,
    pub voice2_duration_ms: Option<u64>,
}

/// Round-item category. Ordered per spec §3/§8 Property 2: intro < debut <
/// build < spacedRep < use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemCategory {
    Intro,
    Debut,
    Build,
    SpacedRep,
    Use,
}

/// A cycle's type, one-to-one with its non-intro `ItemCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CycleType {
    Debut,
    Build,
    SpacedRep,
    Use,
}

impl CycleType {
    pub fn category(self) -> ItemCategory {
        match self {
            CycleType::Debut => ItemCategory::Debut,
            CycleType::Build => ItemCategory::Build,
            CycleType::SpacedRep => ItemCategory::SpacedRep,
            CycleType::Use => ItemCategory::Use,
        }
    }
}

/// A complete, self-contained playback unit. Every text field has a matching
/// audio identifier drawn from the same row as the text (spec §3 invariant);
/// builders must refuse to emit a partially-populated `Cycle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: String,
    pub lego_id: LegoId,
    pub seed_id: SeedId,
    pub cycle_type: CycleType,
    pub known: KnownSide,
    pub target: TargetSide,
    pub pause_duration_ms: u64,
}

impl Cycle {
    pub fn category(&self) -> ItemCategory {
        self.cycle_type.category()
    }
}

/// A non-cycle round item introducing a LEGO for the first time. No pause,
/// no voice2-phase response measurement (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroItem {
    pub lego_id: LegoId,
    pub known_text: String,
    pub target_text: String,
    /// `None` when the LEGO has no usable presentation audio; the intro is
    /// still emitted but flagged (spec §4.1 edge case).
    pub presentation_audio_id: Option<String>,
}

/// A tagged union of round-item kinds, in the order they may legally appear
/// within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RoundItem {
    Intro(IntroItem),
    Debut(Cycle),
    Build(Cycle),
    SpacedRep(Cycle),
    Use(Cycle),
}

impl RoundItem {
    pub fn category(&self) -> ItemCategory {
        match self {
            RoundItem::Intro(_) => ItemCategory::Intro,
            RoundItem::Debut(_) => ItemCategory::Debut,
            RoundItem::Build(_) => ItemCategory::Build,
            RoundItem::SpacedRep(_) => ItemCategory::SpacedRep,
            RoundItem::Use(_) => ItemCategory::Use,
        }
    }

    pub fn lego_id(&self) -> LegoId {
        match self {
            RoundItem::Intro(i) => i.lego_id,
            RoundItem::Debut(c) | RoundItem::Build(c) | RoundItem::SpacedRep(c) | RoundItem::Use(c) => {
                c.lego_id
            }
        }
    }

    pub fn cycle(&self) -> Option<&Cycle> {
        match self {
            RoundItem::Intro(_) => None,
            RoundItem::Debut(c) | RoundItem::Build(c) | RoundItem::SpacedRep(c) | RoundItem::Use(c) => {
                Some(c)
            }
        }
    }

    pub fn is_playable(&self) -> bool {
        match self {
            RoundItem::Intro(i) => i.presentation_audio_id.is_some(),
            RoundItem::Debut(c) | RoundItem::Build(c) | RoundItem::SpacedRep(c) | RoundItem::Use(c) => {
                !c.known.audio_id.is_empty()
                    && !c.target.voice1_audio_id.is_empty()
                    && !c.target.voice2_audio_id.is_empty()
            }
        }
    }
}
