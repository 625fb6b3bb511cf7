//! Belt-aware queue construction (spec §4.6 step 1-5).

use std::collections::{HashSet, VecDeque};

use crate::domain::{BeltMap, SeedId};

/// Builds the background-fetch queue for a learner currently at
/// `current_seed`, against a course of `total_seeds` seeds:
/// 1. `current_seed + 1`.
/// 2. The first seed of the next belt.
/// 3. The remainder of the current belt.
/// 4. The remainder of the next belt.
/// 5. Belt-by-belt forward until `total_seeds`.
///
/// Seeds outside `[1, total_seeds]` are dropped; each seed appears at most
/// once, at its earliest-listed priority.
pub fn build_queue(current_seed: SeedId, total_seeds: u32, belts: &BeltMap) -> VecDeque<SeedId> {
    let mut queue = VecDeque::new();
    let mut seen = HashSet::new();
    let mut push = |seed: SeedId| {
        if seed.number() >= 1 && seed.number() <= total_seeds && seen.insert(seed) {
            queue.push_back(seed);
        }
    };

    let next_seed = current_seed.next();
    push(next_seed);

    let current_belt_idx = belts.belt_index_of(current_seed);
    let next_belt = current_belt_idx.and_then(|i| belts.belt_at(i + 1)).cloned();
    if let Some(nb) = &next_belt {
        push(nb.start_seed);
    }

    if let Some(idx) = current_belt_idx {
        if let Some(cb) = belts.belt_at(idx).cloned() {
            let mut s = next_seed.next();
            while s <= cb.end_seed {
                push(s);
                s = s.next();
            }
        }
    }

    if let Some(nb) = &next_belt {
        let mut s = nb.start_seed.next();
        while s <= nb.end_seed {
            push(s);
            s = s.next();
        }
    }

    match current_belt_idx {
        Some(idx) => {
            for belt_idx in (idx + 2)..belts.len() {
                if let Some(b) = belts.belt_at(belt_idx).cloned() {
                    let mut s = b.start_seed;
                    while s <= b.end_seed {
                        push(s);
                        s = s.next();
                    }
                }
            }
        }
        None => {
            // The current position isn't inside any known belt: fall back to
            // a simple forward fill.
            let mut s = next_seed.next();
            while s.number() <= total_seeds {
                push(s);
                s = s.next();
            }
        }
    }

    queue
}
