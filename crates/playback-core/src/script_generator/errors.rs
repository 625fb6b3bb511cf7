use thiserror::Error;

/// Distinguishes "couldn't reach the database" from "the course content
/// itself is malformed" (spec §4.1 supplement).
#[derive(Debug, Error)]
pub enum ScriptGeneratorError {
    #[error("course content repository error: {0}")]
    Repository(#[from] anyhow::Error),
}
