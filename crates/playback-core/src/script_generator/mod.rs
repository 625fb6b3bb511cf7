pub mod audio_index;
pub mod errors;
pub mod fibonacci;
pub mod generator;

pub use errors::ScriptGeneratorError;
pub use generator::generate_script;
