//! `AudioOutput` backed by `cpal`, adapted from the system-speaker playback
//! pattern of blocking on a buffer-drained flag inside an output callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;

use playback_core::domain::AudioRef;
use playback_core::ports::audio_output::{AudioError, AudioOutput};

use crate::resolver::AudioBlobResolver;

struct PlaybackBuffer {
    samples: Vec<f32>,
    position: usize,
    finished: bool,
}

pub struct CpalAudioOutput {
    resolver: Arc<dyn AudioBlobResolver>,
    device: cpal::Device,
    stream_config: StreamConfig,
    unlocked: AtomicBool,
    active_stop: Mutex<Option<Arc<AtomicBool>>>,
}

impl CpalAudioOutput {
    pub fn new(resolver: Arc<dyn AudioBlobResolver>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("no default output device"))?;
        let default_config = device.default_output_config()?;
        let stream_config: StreamConfig = default_config.config();

        Ok(Self {
            resolver,
            device,
            stream_config,
            unlocked: AtomicBool::new(false),
            active_stop: Mutex::new(None),
        })
    }

    fn decode_wav(path: &std::path::Path) -> Result<Vec<f32>, AudioError> {
        let mut reader = hound::WavReader::open(path)
            .map_err(|e| AudioError::Resolution(format!("{}: {e}", path.display())))?;
        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Playback(path.display().to_string(), e.to_string()))?,
            hound::SampleFormat::Int => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Playback(path.display().to_string(), e.to_string()))?,
        };
        Ok(samples)
    }
}

#[async_trait]
impl AudioOutput for CpalAudioOutput {
    async fn unlock(&self) -> anyhow::Result<()> {
        // Native output needs no user-gesture unlock; the flag only tracks
        // the contract that `unlock` precedes the first `play`.
        self.unlocked.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn play(&self, audio: &AudioRef) -> Result<(), AudioError> {
        let path = self
            .resolver
            .resolve(&audio.id)
            .map_err(|e| AudioError::Resolution(e.to_string()))?;
        let samples = Self::decode_wav(&path)?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        *self.active_stop.lock().expect("active_stop mutex poisoned") = Some(stop_flag.clone());

        let device = self.device.clone();
        let stream_config = self.stream_config.clone();
        let audio_id = audio.id.clone();

        let result = tokio::task::spawn_blocking(move || -> Result<(), AudioError> {
            let buffer = Arc::new(Mutex::new(PlaybackBuffer {
                samples,
                position: 0,
                finished: false,
            }));
            let buffer_clone = Arc::clone(&buffer);

            let stream = device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                        let mut buf = match buffer_clone.lock() {
                            Ok(b) => b,
                            Err(_) => return,
                        };
                        for sample in data.iter_mut() {
                            if buf.position < buf.samples.len() {
                                *sample = buf.samples[buf.position];
                                buf.position += 1;
                            } else {
                                *sample = 0.0;
                                buf.finished = true;
                            }
                        }
                    },
                    move |err| tracing::error!(%err, "audio output stream error"),
                    None,
                )
                .map_err(|e| AudioError::Playback(audio_id.clone(), e.to_string()))?;

            stream
                .play()
                .map_err(|e| AudioError::Playback(audio_id.clone(), e.to_string()))?;

            loop {
                std::thread::sleep(std::time::Duration::from_millis(10));
                let finished = buffer.lock().expect("playback buffer mutex poisoned").finished;
                if finished || stop_flag.load(Ordering::SeqCst) {
                    break;
                }
            }
            drop(stream);
            Ok(())
        })
        .await;

        *self.active_stop.lock().expect("active_stop mutex poisoned") = None;

        match result {
            Ok(inner) => inner,
            Err(join_err) => Err(AudioError::Playback(audio.id.clone(), join_err.to_string())),
        }
    }

    async fn stop_current(&self) {
        if let Some(flag) = self.active_stop.lock().expect("active_stop mutex poisoned").as_ref() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}
