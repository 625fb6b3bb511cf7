use thiserror::Error;

#[derive(Debug, Error)]
pub enum NativeAudioError {
    #[error("no default {0} device")]
    NoDefaultDevice(&'static str),

    #[error("cannot enumerate {0} devices: {1}")]
    Enumeration(&'static str, String),

    #[error("failed to build {0} stream: {1}")]
    StreamBuild(&'static str, String),

    #[error("failed to start {0} stream: {1}")]
    StreamStart(&'static str, String),

    #[error("failed to decode audio blob: {0}")]
    Decode(#[from] hound::Error),
}
