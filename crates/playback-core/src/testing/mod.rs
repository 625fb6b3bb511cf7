//! Shared in-memory test fixtures, available to this crate's own tests and
//! to downstream crates via the `testing` feature.

pub mod fixtures;

pub use fixtures::{FakeClock, InMemoryCourseContentRepository, ScriptedMicrophoneInput};
