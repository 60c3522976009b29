//! Queue tests and shared helpers.

mod dedup;
mod events;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::queue::{Completion, Handler, JobQueue, QueueConfig, QueueEvent};
use crate::store::{MemoryStore, Store};

/// Short dispatch delay so tests finish quickly.
const TEST_DELAY_MS: u64 = 20;

fn config_with_delay(ms: u64) -> QueueConfig {
    QueueConfig {
        dispatch_delay: Duration::from_millis(ms),
        ..QueueConfig::default()
    }
}

fn new_queue(store: &Arc<MemoryStore>, delay_ms: u64) -> Arc<JobQueue> {
    JobQueue::new(
        Arc::clone(store) as Arc<dyn Store>,
        config_with_delay(delay_ms),
    )
}

async fn setup() -> (Arc<MemoryStore>, Arc<JobQueue>) {
    setup_with_delay(TEST_DELAY_MS).await
}

async fn setup_with_delay(delay_ms: u64) -> (Arc<MemoryStore>, Arc<JobQueue>) {
    let store = Arc::new(MemoryStore::new());
    let queue = new_queue(&store, delay_ms);
    let mut events = queue.subscribe();
    queue.start().await.unwrap();
    // The empty store drains as soon as the startup scan finishes. Absorb
    // that drain here so tests only observe the events they cause.
    while !matches!(events.recv().await, Ok(QueueEvent::Drain)) {}
    (store, queue)
}

/// Handler that counts invocations and completes immediately.
fn counting_handler(counter: &Arc<AtomicUsize>) -> Handler {
    let counter = Arc::clone(counter);
    Arc::new(move |_payload: Bytes, done: Completion| {
        counter.fetch_add(1, Ordering::SeqCst);
        done.complete();
    })
}

/// Handler that stashes its completion handle without firing it, so tests
/// can observe the running state and complete jobs explicitly.
fn capturing_handler(captured: &Arc<Mutex<Vec<Completion>>>) -> Handler {
    let captured = Arc::clone(captured);
    Arc::new(move |_payload: Bytes, done: Completion| {
        captured.lock().push(done);
    })
}

/// Poll `cond` until it holds or a couple of seconds pass.
async fn wait_for(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Collect every event delivered within `window`.
async fn collect_events(
    rx: &mut broadcast::Receiver<QueueEvent>,
    window: Duration,
) -> Vec<QueueEvent> {
    let deadline = tokio::time::Instant::now() + window;
    let mut events = Vec::new();
    while let Ok(Ok(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        events.push(event);
    }
    events
}

fn count_starts(events: &[QueueEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, QueueEvent::Start { .. }))
        .count()
}

fn count_dones(events: &[QueueEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, QueueEvent::Done { .. }))
        .count()
}

fn count_recovers(events: &[QueueEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, QueueEvent::Recover { .. }))
        .count()
}

fn count_drains(events: &[QueueEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, QueueEvent::Drain))
        .count()
}
