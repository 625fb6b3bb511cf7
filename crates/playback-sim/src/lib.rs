//! Deterministic session/learner simulation harness for the playback core.
//!
//! Generates synthetic courses, plays the resulting scripts through the real
//! `playback-core` `SessionController`/`CyclePlayer`/`VoiceActivityAnalyzer`
//! under fakes for audio output and the clock, and reports what happened —
//! standing in for a real browser session driving a real learner through the
//! scheduling pipeline.
//!
//! # Key components
//!
//! - [`config::SimulationConfig`] / [`config::Scenario`] / [`config::LearnerProfile`]:
//!   YAML-loadable simulation parameters.
//! - [`course_gen::build_repository`]: deterministic synthetic course
//!   generation from a scenario and RNG seed.
//! - [`learner_mic::scripted_mic`]: turns a learner profile into a scripted
//!   microphone input for the Voice Activity Analyzer.
//! - [`simulator::run_scenario`]: plays one scenario end to end and reports
//!   the outcome.

pub mod config;
pub mod course_gen;
pub mod learner_mic;
pub mod simulator;

pub use config::{LearnerProfile, Scenario, SimulationConfig};
pub use simulator::{play_rounds_to_completion, run_scenario, SimulationReport, ValidationSummary};
