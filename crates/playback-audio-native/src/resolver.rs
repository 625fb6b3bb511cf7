//! Resolves an audio identifier (spec §6 `course_audio.id`) to a local
//! playable blob. The audio object store itself is out of scope (spec §1);
//! this trait is the seam a real deployment plugs a content-addressed fetch
//! into.

use std::path::{Path, PathBuf};

pub trait AudioBlobResolver: Send + Sync {
    /// Returns a path to a readable WAV file for `audio_id`, or an error if
    /// the id has no resolvable blob.
    fn resolve(&self, audio_id: &str) -> anyhow::Result<PathBuf>;
}

/// Resolves audio ids to `<root>/<audio_id>.wav`. Used for native demos and
/// the CLI's offline session driver; a browser embedding would instead
/// resolve ids against the audio object store over HTTP.
#[derive(Debug, Clone)]
pub struct FilesystemAudioBlobResolver {
    root: PathBuf,
}

impl FilesystemAudioBlobResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AudioBlobResolver for FilesystemAudioBlobResolver {
    fn resolve(&self, audio_id: &str) -> anyhow::Result<PathBuf> {
        let path = self.root.join(format!("{audio_id}.wav"));
        if !Path::new(&path).exists() {
            anyhow::bail!("no audio blob for id '{audio_id}' at {}", path.display());
        }
        Ok(path)
    }
}
