//! Abstracts the Cycle Player's pause-duration wait so wall-clock timing is
//! deterministic and instantly advanceable under test (spec §8 Property 9).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Suspends for `duration_ms`. A real implementation delegates to
    /// `tokio::time::sleep`; a fake implementation under
    /// `tokio::time::pause()` returns as soon as time is advanced.
    async fn sleep_ms(&self, duration_ms: u64);
}

/// Production clock backed by the system wall clock and the tokio timer
/// wheel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_ms(&self, duration_ms: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(duration_ms)).await;
    }
}
