//! The Script Generator's output: an ordered sequence of rounds.

use super::ids::SeedId;
use super::round::{Round, ValidationReport};

/// An ordered sequence of rounds covering a seed range `[start_seed,
/// end_seed]`. Rounds are sorted by zero-padded LEGO identifier; the first
/// LEGO of the range yields `round_number` 1 (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub course_code: String,
    pub start_seed: SeedId,
    pub end_seed: SeedId,
    pub rounds: Vec<Round>,
}

impl Script {
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn validation_report(&self) -> ValidationReport {
        ValidationReport::from_rounds(&self.rounds)
    }
}
