//! Per-LEGO spaced-repetition bookkeeping (spec §3, §4.4).

use super::ids::LegoId;

/// State tracked for each LEGO introduced in a session. Created on first
/// debut, mutated only by the Session Controller on cycle completion and by
/// the spaced-repetition scheduler, discarded when the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegoPracticeState {
    pub lego_id: LegoId,
    /// The round in which this LEGO was debuted.
    pub last_round: u32,
    /// Ordered USE-phrase pool, built once at debut time.
    pub use_pool: Vec<UsePhrase>,
    /// Rotating cursor into `use_pool`.
    pub use_cursor: usize,
    /// Decremented (floor 0) on every `round:completed`.
    pub skip_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsePhrase {
    pub known_text: String,
    pub target_text: String,
    pub target_syllable_count: u32,
}

impl LegoPracticeState {
    pub fn new(lego_id: LegoId, debut_round: u32, use_pool: Vec<UsePhrase>) -> Self {
        Self {
            lego_id,
            last_round: debut_round,
            use_pool,
            use_cursor: 0,
            skip_count: 0,
        }
    }

    /// Take the next phrase from the rotating pool, advancing and wrapping
    /// the cursor. Returns `None` if the pool is empty.
    pub fn next_use_phrase(&mut self) -> Option<&UsePhrase> {
        if self.use_pool.is_empty() {
            return None;
        }
        let idx = self.use_cursor % self.use_pool.len();
        self.use_cursor = (self.use_cursor + 1) % self.use_pool.len();
        Some(&self.use_pool[idx])
    }

    /// Applied once per completed round, for every introduced LEGO (spec §4.4).
    pub fn decrement_skip_count(&mut self) {
        self.skip_count = self.skip_count.saturating_sub(1);
    }
}
