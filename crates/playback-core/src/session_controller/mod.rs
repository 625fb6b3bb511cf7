pub mod controller;
pub mod events;
pub mod scheduler;

pub use controller::{ControllerError, ControllerState, SessionController};
pub use events::SessionEvent;
