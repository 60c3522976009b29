//! Lifecycle event fan-out.
//!
//! Two subscription granularities: a global feed carrying every event, and
//! per-job-type feeds carrying only that type's `Recover`/`Start`/`Done`.
//! `Drain` is global only. Events are fire-and-forget broadcasts, dropped
//! when nobody listens.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Queue lifecycle notification.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// A persisted record from a previous run was resubmitted at startup.
    Recover { job_type: String, payload: Bytes },
    /// A handler is about to run.
    Start { job_type: String, payload: Bytes },
    /// A handler signaled completion and the record was deleted.
    Done { job_type: String, payload: Bytes },
    /// The in-progress counter returned to zero.
    Drain,
}

impl QueueEvent {
    /// The job type this event concerns; `None` for [`QueueEvent::Drain`].
    pub fn job_type(&self) -> Option<&str> {
        match self {
            QueueEvent::Recover { job_type, .. }
            | QueueEvent::Start { job_type, .. }
            | QueueEvent::Done { job_type, .. } => Some(job_type),
            QueueEvent::Drain => None,
        }
    }
}

pub(crate) struct EventBus {
    global: broadcast::Sender<QueueEvent>,
    scoped: RwLock<HashMap<String, broadcast::Sender<QueueEvent>>>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (global, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            global,
            scoped: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.global.subscribe()
    }

    pub(crate) fn subscribe_job_type(&self, job_type: &str) -> broadcast::Receiver<QueueEvent> {
        let mut scoped = self.scoped.write();
        scoped
            .entry(job_type.to_string())
            .or_insert_with(|| broadcast::channel(EVENT_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send on the global feed and, when the event names a job type, on that
    /// type's scoped feed.
    pub(crate) fn emit(&self, event: QueueEvent) {
        if let Some(job_type) = event.job_type() {
            let scoped = self.scoped.read();
            if let Some(tx) = scoped.get(job_type) {
                let _ = tx.send(event.clone());
            }
        }
        let _ = self.global.send(event);
    }
}
