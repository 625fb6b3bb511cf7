use std::sync::Arc;

use playback_core::domain::BeltMap;
use playback_core::ports::content_repository::CourseContentRepository;
use playback_core::ResolvedConfig;

/// Shared across all connections; each connection drives its own
/// `SessionController` (spec §9: the core is single-session per instance).
pub struct AppState {
    pub repo: Arc<dyn CourseContentRepository>,
    pub config: ResolvedConfig,
}

impl AppState {
    pub fn new(repo: Arc<dyn CourseContentRepository>, config: ResolvedConfig) -> Self {
        Self { repo, config }
    }
}

pub fn belts_from_spec(specs: &[crate::protocol::BeltSpec]) -> BeltMap {
    use playback_core::domain::{Belt, SeedId};

    BeltMap::new(
        specs
            .iter()
            .map(|b| Belt {
                name: b.name.clone(),
                start_seed: SeedId::new(b.start_seed),
                end_seed: SeedId::new(b.end_seed),
            })
            .collect(),
    )
}
