//! Session event delivery (spec §4.3): "Listener errors are caught and
//! logged; they never interrupt sequencing."

use crate::session_controller::events::SessionEvent;

/// Receives `SessionEvent`s as the Session Controller sequences rounds.
/// `emit` is infallible by contract: an implementor that would otherwise
/// panic is wrapped by the controller in `catch_unwind` at the call site, so
/// a listener crash never aborts sequencing.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Collects every emitted event in order; used by tests and the CLI's
/// headless session driver.
#[derive(Debug, Default)]
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<SessionEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events.lock().expect("event sink mutex poisoned"))
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().expect("event sink mutex poisoned").clone()
    }
}

impl EventSink for VecEventSink {
    fn emit(&self, event: SessionEvent) {
        self.events.lock().expect("event sink mutex poisoned").push(event);
    }
}

/// Logs every event via `tracing` at debug level; used by the CLI when no
/// richer sink is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: SessionEvent) {
        tracing::debug!(?event, "session event");
    }
}
