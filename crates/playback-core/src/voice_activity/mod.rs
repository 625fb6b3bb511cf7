pub mod analyzer;
pub mod types;

pub use analyzer::{PhaseMarkers, VoiceActivityAnalyzer};
pub use types::SpeechTimingResult;
