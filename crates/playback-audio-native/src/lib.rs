//! Native `cpal`-backed implementations of the playback core's
//! `AudioOutput` and `MicrophoneInput` ports, so the core can be exercised
//! and demoed outside a browser embedding (spec §1: the browser embedding
//! itself is out of scope).

pub mod error;
pub mod input;
pub mod output;
pub mod resolver;

pub use error::NativeAudioError;
pub use input::CpalMicrophoneInput;
pub use output::CpalAudioOutput;
pub use resolver::{AudioBlobResolver, FilesystemAudioBlobResolver};
