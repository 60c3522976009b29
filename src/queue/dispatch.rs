//! Dispatch state machine: scheduling, handler invocation, completion, drain.
//!
//! A single loop consumes submissions from the recovery scan and the change
//! listener and processes them in arrival order. Each record moves through
//! Submitted -> Scheduled -> Running -> Completed(removed). A seen-set of
//! in-flight keys drops the duplicate when the startup scan and a racing
//! live write deliver the same record twice.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::codec;
use super::events::QueueEvent;
use super::manager::JobQueue;

/// Messages consumed by the dispatch loop.
pub(crate) enum Submission {
    /// A persisted record to schedule.
    Record {
        job_type: String,
        timestamp: String,
        payload: Bytes,
        recovered: bool,
    },
    /// The startup scan finished; `backlog` is true when it found records.
    RecoveryDone { backlog: bool },
    /// A handler signaled completion for the record at `key`.
    Completed {
        key: String,
        job_type: String,
        payload: Bytes,
    },
}

/// Completion handle passed to handlers.
///
/// Cloneable and idempotent: calls after the first are ignored, so a handler
/// that signals completion more than once cannot delete the record twice or
/// double-decrement the in-progress counter.
#[derive(Clone)]
pub struct Completion {
    key: String,
    job_type: String,
    payload: Bytes,
    fired: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<Submission>,
}

impl Completion {
    /// Mark the job done: the record is deleted and `Done` (and possibly
    /// `Drain`) events fire.
    pub fn complete(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(Submission::Completed {
            key: self.key.clone(),
            job_type: self.job_type.clone(),
            payload: self.payload.clone(),
        });
    }
}

impl JobQueue {
    pub(crate) fn spawn_dispatch_loop(
        self: Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<Submission>,
    ) {
        tokio::spawn(async move {
            // Keys between submission and completion. Doubles as the
            // cross-path dedup between the startup scan and the listener.
            let mut in_flight: HashSet<String> = HashSet::new();
            while let Some(msg) = rx.recv().await {
                match msg {
                    Submission::Record {
                        job_type,
                        timestamp,
                        payload,
                        recovered,
                    } => {
                        self.schedule(&mut in_flight, job_type, timestamp, payload, recovered);
                    }
                    Submission::RecoveryDone { backlog } => {
                        if !backlog && self.in_progress() == 0 {
                            self.events.emit(QueueEvent::Drain);
                        }
                    }
                    Submission::Completed {
                        key,
                        job_type,
                        payload,
                    } => {
                        self.finish(&mut in_flight, key, job_type, payload).await;
                    }
                }
            }
        });
    }

    fn schedule(
        &self,
        in_flight: &mut HashSet<String>,
        job_type: String,
        timestamp: String,
        payload: Bytes,
        recovered: bool,
    ) {
        let key = codec::encode_key(&self.config.prefix, &job_type, &timestamp);
        if !in_flight.insert(key.clone()) {
            debug!(key = %key, "record already in flight, dropping duplicate submission");
            return;
        }

        let handler = self.handlers.read().get(&job_type).cloned();
        let Some(handler) = handler else {
            // Left in the store untouched; the next restart retries it.
            in_flight.remove(&key);
            warn!(job_type = %job_type, "no handler registered for job type");
            return;
        };

        if recovered {
            self.events.emit(QueueEvent::Recover {
                job_type: job_type.clone(),
                payload: payload.clone(),
            });
        }

        self.in_progress.fetch_add(1, Ordering::SeqCst);

        let dedup = Arc::clone(&self.dedup);
        let events = Arc::clone(&self.events);
        let submit_tx = self.submit_tx.clone();
        let delay = self.config.dispatch_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // The reservation lifts when the handler starts, not when it
            // finishes: the same payload is enqueueable again from here on.
            dedup.release(&job_type, &payload);

            let completion = Completion {
                key,
                job_type: job_type.clone(),
                payload: payload.clone(),
                fired: Arc::new(AtomicBool::new(false)),
                tx: submit_tx,
            };
            events.emit(QueueEvent::Start {
                job_type,
                payload: payload.clone(),
            });
            handler(payload, completion);
        });
    }

    async fn finish(
        &self,
        in_flight: &mut HashSet<String>,
        key: String,
        job_type: String,
        payload: Bytes,
    ) {
        if let Err(e) = self.store.delete(key.as_bytes()).await {
            // The record outlives the failure; the next restart redelivers it.
            warn!(key = %key, error = %e, "failed to delete completed record");
        }
        in_flight.remove(&key);
        let remaining = self.in_progress.fetch_sub(1, Ordering::SeqCst) - 1;
        self.events.emit(QueueEvent::Done { job_type, payload });
        if remaining == 0 {
            self.events.emit(QueueEvent::Drain);
        }
    }
}
