//! Wire types mirroring `playback-server`'s WebSocket protocol. Kept as a
//! small local copy rather than a shared dependency, so each side (server,
//! CLI) owns its own view of the wire format rather than sharing a protocol
//! crate.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltSpec {
    pub name: String,
    pub start_seed: u32,
    pub end_seed: u32,
}

fn default_lookahead() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
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
    Prioritize { seed: u32 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    Session(serde_json::Value),
    Error { message: String },
}
