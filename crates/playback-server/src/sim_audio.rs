//! A no-hardware `AudioOutput` for this headless test server: it "plays"
//! audio by sleeping for the reference's known duration. Real playback
//! happens client-side; this server only drives sequencing and timing for
//! integration tests.

use async_trait::async_trait;
use std::time::Duration;

use playback_core::domain::AudioRef;
use playback_core::ports::audio_output::{AudioError, AudioOutput};

const DEFAULT_DURATION_MS: u64 = 800;

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedAudioOutput;

#[async_trait]
impl AudioOutput for SimulatedAudioOutput {
    async fn unlock(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn play(&self, audio: &AudioRef) -> Result<(), AudioError> {
        let duration_ms = audio.duration_ms.unwrap_or(DEFAULT_DURATION_MS);
        tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        Ok(())
    }

    async fn stop_current(&self) {}
}
