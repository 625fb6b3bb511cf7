//! Wire protocol between a connected client and the session this server
//! drives on its behalf: a `Command`/`ServerMessage` pair that carries the
//! playback core's own `SessionEvent`s verbatim rather than re-modelling
//! them.

use serde::{Deserialize, Serialize};

use playback_core::SessionEvent;

#[derive(Debug, Clone, Deserialize)]
pub struct BeltSpec {
    pub name: String,
    pub start_seed: u32,
    pub end_seed: u32,
}

/// Client-to-server commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Generates an initial script over `[current_seed, current_seed + lookahead]`
    /// and starts a session; the priority loader takes over background
    /// fetches for the rest of the course.
    StartSession {
        course_code: String,
        current_seed: u32,
        total_seeds: u32,
        #[serde(default)]
        belts: Vec<BeltSpec>,
        #[serde(default = "default_lookahead")]
        lookahead_seeds: u32,
    },
    Pause,
    Resume,
    Stop,
    SkipCycle,
    SkipRound,
    JumpToRound { round_index: usize },
    /// Re-heads the priority loader's queue at `seed` (spec §4.6 `prioritize`).
    Prioritize { seed: u32 },
}

fn default_lookahead() -> u32 {
    2
}

/// Server-to-client messages.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    Session(SessionEvent),
    Error { message: String },
}
