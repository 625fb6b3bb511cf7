//! `MicrophoneInput` backed by `cpal`, adapted from the native-capture
//! pattern of a dedicated OS thread owning the stream and forwarding
//! analysed frames over a channel (cpal streams are not portably movable
//! across an async task boundary).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tokio::sync::mpsc;

use playback_core::ports::microphone::{EnergyFrame, MicrophoneInput};

const TICK_FRAMES: usize = 1024;

fn rms_energy_db(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return f64::NEG_INFINITY;
    }
    let sum_sq: f64 = frame.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    let rms = (sum_sq / frame.len() as f64).sqrt();
    20.0 * rms.max(1e-10).log10()
}

pub struct CpalMicrophoneInput {
    device: cpal::Device,
    stream_config: StreamConfig,
    rx: Option<mpsc::UnboundedReceiver<EnergyFrame>>,
    stop_flag: Option<Arc<AtomicBool>>,
    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl CpalMicrophoneInput {
    pub fn new() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("no default input device"))?;
        let default_config = device.default_input_config()?;
        let stream_config: StreamConfig = default_config.config();

        Ok(Self {
            device,
            stream_config,
            rx: None,
            stop_flag: None,
            capture_thread: None,
        })
    }
}

#[async_trait]
impl MicrophoneInput for CpalMicrophoneInput {
    async fn acquire(&mut self) -> anyhow::Result<()> {
        let (tx, rx) = mpsc::unbounded_channel::<EnergyFrame>();
        let stop_flag = Arc::new(AtomicBool::new(false));

        let device = self.device.clone();
        let stream_config = self.stream_config.clone();
        let channels = stream_config.channels as usize;
        let thread_stop = stop_flag.clone();

        let handle = std::thread::Builder::new()
            .name("playback-mic-capture".into())
            .spawn(move || {
                let start = Instant::now();
                let mut pending: Vec<f32> = Vec::with_capacity(TICK_FRAMES * 2);

                let stream = match device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                        let mono: Vec<f32> = if channels > 1 {
                            data.chunks(channels)
                                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                                .collect()
                        } else {
                            data.to_vec()
                        };
                        pending.extend(mono);
                        while pending.len() >= TICK_FRAMES {
                            let chunk: Vec<f32> = pending.drain(..TICK_FRAMES).collect();
                            let frame = EnergyFrame {
                                elapsed_ms: start.elapsed().as_millis() as u64,
                                energy_db: rms_energy_db(&chunk),
                            };
                            let _ = tx.send(frame);
                        }
                    },
                    |err| tracing::error!(%err, "audio input stream error"),
                    None,
                ) {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to build input stream");
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    tracing::error!(error = %e, "failed to start input stream");
                    return;
                }

                while !thread_stop.load(Ordering::SeqCst) {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
                drop(stream);
            })?;

        self.rx = Some(rx);
        self.stop_flag = Some(stop_flag);
        self.capture_thread = Some(handle);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<EnergyFrame> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    fn stop(&mut self) {
        if let Some(flag) = self.stop_flag.take() {
            flag.store(true, Ordering::SeqCst);
        }
        self.rx = None;
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }
}
