//! Microphone acquisition for the Voice Activity Analyzer (spec §4.5, §5).

use async_trait::async_trait;

/// One per-tick sample: elapsed milliseconds since monitoring start and the
/// RMS energy in decibels across the frequency bins at that tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyFrame {
    pub elapsed_ms: u64,
    pub energy_db: f64,
}

/// Owns exactly one microphone input stream, with lifetime >= session
/// lifetime (spec §5). Acquisition must happen inside the same user gesture
/// that unlocks audio output; acquisition failure degrades the core to
/// no-timing mode rather than failing the session.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MicrophoneInput: Send + Sync {
    /// Acquires the stream. `Err` means the caller should fall back to
    /// `MicrophoneUnavailable` degrade-to-no-timing-mode behaviour.
    async fn acquire(&mut self) -> anyhow::Result<()>;

    /// The next energy sample, or `None` once monitoring has been stopped.
    async fn next_frame(&mut self) -> Option<EnergyFrame>;

    /// Stops the current monitoring pass; does not release the underlying
    /// stream (it is reused for the next cycle).
    fn stop(&mut self);
}

/// Always degrades; used for the no-timing-mode path when acquisition fails
/// or microphone support is absent entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMicrophoneInput;

#[async_trait]
impl MicrophoneInput for NullMicrophoneInput {
    async fn acquire(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("no microphone available")
    }

    async fn next_frame(&mut self) -> Option<EnergyFrame> {
        None
    }

    fn stop(&mut self) {}
}
