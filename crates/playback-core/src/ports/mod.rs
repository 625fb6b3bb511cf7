pub mod audio_output;
pub mod clock;
pub mod content_repository;
pub mod event_sink;
pub mod microphone;

pub use audio_output::{AudioError, AudioOutput};
pub use clock::{Clock, SystemClock};
pub use content_repository::{AudioRole, AudioRow, CourseContentRepository, LegoRow, LegoType, PhraseRole, PhraseRow};
pub use event_sink::{EventSink, TracingEventSink, VecEventSink};
pub use microphone::{EnergyFrame, MicrophoneInput, NullMicrophoneInput};

#[cfg(any(test, feature = "testing"))]
pub use audio_output::MockAudioOutput;
#[cfg(any(test, feature = "testing"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "testing"))]
pub use content_repository::MockCourseContentRepository;
#[cfg(any(test, feature = "testing"))]
pub use microphone::MockMicrophoneInput;
