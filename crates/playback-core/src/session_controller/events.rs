//! Events the Session Controller emits while sequencing a session (spec
//! §4.3): "at-most-once per occurrence, per listener."

use serde::{Deserialize, Serialize};

use crate::cycle_player::CyclePhaseEvent;
use crate::domain::LegoId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    SessionStarted,
    SessionPaused,
    SessionResumed,
    SessionComplete,
    /// The current round index is beyond what has arrived; sequencing is
    /// parked until `add_round`/`add_rounds` supplies it.
    RoundLoading { round_index: usize },
    RoundLoaded { round_index: usize },
    RoundStarted { round_index: usize, lego_id: LegoId },
    RoundCompleted { round_index: usize },
    /// A round failed structural validation; its valid items still play.
    RoundInvalid { round_index: usize },
    ItemStarted { round_index: usize, item_index: usize },
    ItemCompleted { round_index: usize, item_index: usize },
    /// Forwarded Cycle Player phase event, for UI visualisation.
    Phase(CyclePhaseEvent),
}
