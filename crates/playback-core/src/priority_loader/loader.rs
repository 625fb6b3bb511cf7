//! The Priority Round Loader (spec §4.6): a background fetcher that shapes
//! database load around plausible learner intent.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

use crate::config::ResolvedConfig;
use crate::domain::{BeltMap, Round, SeedId};
use crate::ports::content_repository::CourseContentRepository;
use crate::script_generator::generate_script;
use crate::session_controller::SessionController;

use super::queue::build_queue;

const FETCH_THROTTLE: Duration = Duration::from_millis(50);
const PRIORITIZE_DEADLINE: Duration = Duration::from_secs(30);

/// A single asynchronous worker that dequeues seeds, builds rounds, and
/// appends them to a [`SessionController`] (spec §4.6 "Execution model").
pub struct PriorityRoundLoader {
    repo: Arc<dyn CourseContentRepository>,
    course_code: String,
    config: ResolvedConfig,
    queue: Mutex<VecDeque<SeedId>>,
    queue_notify: Notify,
    loaded: Mutex<HashSet<SeedId>>,
    loaded_notify: Notify,
    seen_error_signatures: Mutex<HashSet<String>>,
    end_of_course: AtomicBool,
    stop_requested: AtomicBool,
}

impl PriorityRoundLoader {
    pub fn new(
        repo: Arc<dyn CourseContentRepository>,
        course_code: impl Into<String>,
        config: ResolvedConfig,
        current_seed: SeedId,
        total_seeds: u32,
        belts: &BeltMap,
    ) -> Self {
        let queue = build_queue(current_seed, total_seeds, belts);
        Self {
            repo,
            course_code: course_code.into(),
            config,
            queue: Mutex::new(queue),
            queue_notify: Notify::new(),
            loaded: Mutex::new(HashSet::new()),
            loaded_notify: Notify::new(),
            seen_error_signatures: Mutex::new(HashSet::new()),
            end_of_course: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    pub fn is_end_of_course(&self) -> bool {
        self.end_of_course.load(Ordering::SeqCst)
    }

    /// Moves `seed` to the queue head and resolves when its round has been
    /// handed to the controller or the 30s deadline passes, whichever comes
    /// first (spec §4.6 `prioritize`). Concurrent calls race the queue head;
    /// the last call to re-head it wins (spec §9 Open Question).
    pub async fn prioritize(&self, seed: SeedId) {
        {
            let mut queue = self.queue.lock().await;
            queue.retain(|s| *s != seed);
            queue.push_front(seed);
        }
        self.queue_notify.notify_waiters();

        let deadline = tokio::time::Instant::now() + PRIORITIZE_DEADLINE;
        loop {
            if self.loaded.lock().await.contains(&seed) {
                return;
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return;
            }
            let _ = tokio::time::timeout(deadline - now, self.loaded_notify.notified()).await;
        }
    }

    /// Signals the worker to finish its current seed and exit (spec §4.6
    /// "Cancellation").
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.queue_notify.notify_waiters();
    }

    /// Runs until the queue is drained, end-of-course is inferred, or
    /// `stop()` is called. Appends each fetched round to `controller`.
    pub async fn run(self: &Arc<Self>, controller: &Arc<Mutex<SessionController>>) {
        loop {
            if self.stop_requested.load(Ordering::SeqCst) {
                return;
            }

            let seed = {
                let mut queue = self.queue.lock().await;
                queue.pop_front()
            };
            let Some(seed) = seed else {
                return;
            };

            match self.fetch_rounds(seed).await {
                Ok(Some(rounds)) => {
                    controller.lock().await.add_rounds(rounds).await;
                    self.loaded.lock().await.insert(seed);
                    self.loaded_notify.notify_waiters();
                }
                Ok(None) => {
                    self.end_of_course.store(true, Ordering::SeqCst);
                    self.queue.lock().await.clear();
                    return;
                }
                Err(e) => {
                    let signature = e.to_string();
                    let mut seen = self.seen_error_signatures.lock().await;
                    if seen.insert(signature.clone()) {
                        tracing::warn!(seed = %seed, error = %signature, "priority loader fetch failed");
                    }
                }
            }

            tokio::time::sleep(FETCH_THROTTLE).await;
        }
    }

    /// `None` signals end-of-course (no LEGO found at this seed position).
    async fn fetch_rounds(&self, seed: SeedId) -> anyhow::Result<Option<Vec<Round>>> {
        let script = generate_script(
            self.repo.as_ref(),
            &self.course_code,
            seed,
            seed,
            &self.config,
        )
        .await?;
        if script.rounds.is_empty() {
            return Ok(None);
        }
        Ok(Some(script.rounds))
    }
}
