pub mod loader;
pub mod queue;

pub use loader::PriorityRoundLoader;
pub use queue::build_queue;
