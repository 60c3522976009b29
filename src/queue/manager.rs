//! Core `JobQueue` struct, configuration, constructors, and lifecycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use super::clock::MonotonicClock;
use super::dedup::DedupRegistry;
use super::dispatch::{Completion, Submission};
use super::error::QueueError;
use super::events::{EventBus, QueueEvent};
use crate::store::Store;

/// Handler invoked with the record payload and a completion handle.
///
/// The queue deletes the record and decrements its in-progress counter only
/// when [`Completion::complete`] is called. A handler that panics or never
/// completes leaves the record persisted and blocks drain; the queue provides
/// no timeout, retry, or dead-letter mechanism for it.
pub type Handler = Arc<dyn Fn(Bytes, Completion) + Send + Sync>;

/// Queue configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Namespace prefix for record keys.
    pub prefix: String,
    /// Delay between a record being observed and its handler running.
    pub dispatch_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            prefix: "~queue".to_string(),
            dispatch_delay: Duration::from_millis(1000),
        }
    }
}

impl QueueConfig {
    /// Read overrides from `DURAQ_PREFIX` and `DURAQ_DISPATCH_DELAY_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(prefix) = std::env::var("DURAQ_PREFIX") {
            if !prefix.is_empty() {
                config.prefix = prefix;
            }
        }
        if let Ok(ms) = std::env::var("DURAQ_DISPATCH_DELAY_MS") {
            if let Ok(ms) = ms.parse() {
                config.dispatch_delay = Duration::from_millis(ms);
            }
        }
        config
    }
}

/// Durable job queue over an ordered key-value store.
///
/// Each instance owns its own handler registry, dedup registry, and counters;
/// multiple instances over the same store share nothing in process memory.
pub struct JobQueue {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) config: QueueConfig,
    pub(crate) handlers: RwLock<HashMap<String, Handler>>,
    pub(crate) dedup: Arc<DedupRegistry>,
    pub(crate) clock: MonotonicClock,
    pub(crate) events: Arc<EventBus>,
    pub(crate) in_progress: AtomicUsize,
    pub(crate) submit_tx: mpsc::UnboundedSender<Submission>,
    started: AtomicBool,
}

impl JobQueue {
    /// Create a queue over `store`.
    ///
    /// The queue is inert until [`start`](Self::start) runs: handlers can be
    /// registered and event feeds subscribed first, so nothing from the
    /// startup replay is missed.
    pub fn new(store: Arc<dyn Store>, config: QueueConfig) -> Arc<Self> {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let queue = Arc::new(Self {
            store,
            config,
            handlers: RwLock::new(HashMap::new()),
            dedup: Arc::new(DedupRegistry::new()),
            clock: MonotonicClock::new(),
            events: Arc::new(EventBus::new()),
            in_progress: AtomicUsize::new(0),
            submit_tx,
            started: AtomicBool::new(false),
        });
        Arc::clone(&queue).spawn_dispatch_loop(submit_rx);
        queue
    }

    /// Replay unfinished records from a previous run, then watch the store
    /// for new writes. Idempotent; only the first call does the work.
    pub async fn start(&self) -> Result<(), QueueError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Subscribe before the scan so a write racing with startup is not
        // missed; the dispatch loop's in-flight set absorbs the overlap.
        let changes = self.store.subscribe();
        self.recover().await?;
        self.spawn_change_listener(changes);
        info!(
            prefix = %self.config.prefix,
            backend = %self.store.name(),
            "job queue ready"
        );
        Ok(())
    }

    /// Create and start a queue in one step.
    pub async fn open(store: Arc<dyn Store>, config: QueueConfig) -> Result<Arc<Self>, QueueError> {
        let queue = Self::new(store, config);
        queue.start().await?;
        Ok(queue)
    }

    /// Number of records currently scheduled or running.
    pub fn in_progress(&self) -> usize {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Subscribe to every lifecycle event this queue emits.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Subscribe to `Recover`/`Start`/`Done` for a single job type.
    pub fn subscribe_job_type(&self, job_type: &str) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe_job_type(job_type)
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }
}
