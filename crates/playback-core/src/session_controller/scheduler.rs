//! Spaced-repetition bookkeeping owned by the Session Controller (spec
//! §4.4). The Script Generator computes the schedule itself at generation
//! time; this module applies only the live, controller-side bookkeeping the
//! spec assigns to round completion.

use std::collections::HashMap;

use crate::domain::{LegoId, LegoPracticeState};

/// Applied once per `round:completed`, for every LEGO introduced so far
/// (spec §4.4: "decrements `skipCount` for every introduced LEGO, floor at
/// 0").
pub fn decrement_all(practice_states: &mut HashMap<LegoId, LegoPracticeState>) {
    for state in practice_states.values_mut() {
        state.decrement_skip_count();
    }
}
