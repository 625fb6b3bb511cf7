pub mod events;
pub mod player;

pub use events::CyclePhaseEvent;
pub use player::{CycleOutcome, CyclePlayer};
