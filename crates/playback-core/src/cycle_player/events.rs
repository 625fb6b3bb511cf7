//! Phase events emitted by the Cycle Player (spec §4.2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CyclePhaseEvent {
    PromptStart { at: DateTime<Utc> },
    PromptEnd { at: DateTime<Utc> },
    PauseStart { at: DateTime<Utc> },
    PauseEnd { at: DateTime<Utc> },
    Voice1Start { at: DateTime<Utc> },
    Voice1End { at: DateTime<Utc> },
    Voice2Start { at: DateTime<Utc> },
    Voice2End { at: DateTime<Utc> },
    /// Terminal, natural-end event. `elapsed_ms` is total wall-clock time
    /// since `PromptStart`.
    CycleComplete { elapsed_ms: u64 },
    /// Terminal event from `stop()`. No `:end` event is emitted for the
    /// phase in flight (spec §4.2 contract).
    CycleAborted,
    /// Audio resolution or playback failed; the remaining phases of the
    /// cycle are skipped and `CycleComplete` still follows (spec §4.2, §7).
    CycleAudioError { message: String },
    /// Terminal event for an intro item's single phase.
    IntroComplete,
}
