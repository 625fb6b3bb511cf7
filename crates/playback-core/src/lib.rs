pub mod config;
pub mod cycle_player;
pub mod domain;
pub mod ports;
pub mod priority_loader;
pub mod script_generator;
pub mod session_controller;
pub mod text_norm;
pub mod voice_activity;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{ConfigError, ConfigPatch, ResolvedConfig};
pub use cycle_player::{CycleOutcome, CyclePhaseEvent, CyclePlayer};
pub use domain::{
    AudioRef, Belt, BeltMap, Cycle, CycleIntegrityError, CycleType, IdParseError, IntroItem,
    ItemCategory, KnownSide, LegoId, LegoPracticeState, Round, RoundItem, RoundStructureError,
    RoundStructureWarning, RoundValidationEntry, Script, SeedId, TargetSide, UsePhrase,
    ValidationIssue, ValidationReport,
};
pub use priority_loader::PriorityRoundLoader;
pub use script_generator::{generate_script, ScriptGeneratorError};
pub use session_controller::{ControllerError, ControllerState, SessionController, SessionEvent};
pub use voice_activity::{PhaseMarkers, SpeechTimingResult, VoiceActivityAnalyzer};
