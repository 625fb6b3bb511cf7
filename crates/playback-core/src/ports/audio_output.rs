//! The Cycle Player's single reusable audio sink (spec §4.2, §5).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioRef;

/// Spec §7 error taxonomy: resolution failure (id has no resolvable source)
/// vs. playback failure (resolved but failed to play). Both are handled
/// identically by the Cycle Player but are distinguished for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("failed to resolve audio id {0}")]
    Resolution(String),

    #[error("playback failed for audio id {0}: {1}")]
    Playback(String, String),
}

/// A single reusable audio output handle. Creation/unlock requires a
/// synchronous user-gesture call path (spec §4.2, §5, §9); the Cycle Player
/// holds exactly one implementor for the lifetime of the session.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Unlocks the handle. Must be invoked exactly once, synchronously from
    /// a user gesture, before the first `play`.
    async fn unlock(&self) -> anyhow::Result<()>;

    /// Plays the given audio to completion. Resolves `Ok(())` on natural
    /// end, or `Err(AudioError)` on resolution/playback failure.
    async fn play(&self, audio: &AudioRef) -> Result<(), AudioError>;

    /// Stops whatever is currently playing, if anything. Used by `stop()`
    /// to abort a cycle without waiting for natural end.
    async fn stop_current(&self);
}
