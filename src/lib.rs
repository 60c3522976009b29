//! duraq - durable, crash-recoverable job queue over an ordered key-value store.
//!
//! Producers enqueue `(job type, payload)` pairs; each pair is persisted as a
//! record in the store and, once a configurable delay elapses, the handler
//! registered for that job type runs with the payload. Records survive process
//! crashes: on startup the queue replays every record a previous run left
//! behind. Identical outstanding payloads collapse into a single record.
//!
//! ```no_run
//! use std::sync::Arc;
//! use duraq::{JobQueue, MemoryStore, QueueConfig, Store};
//!
//! # async fn demo() -> Result<(), duraq::QueueError> {
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! let queue = JobQueue::open(store, QueueConfig::default()).await?;
//!
//! queue.register_handler("email", Arc::new(|payload, done| {
//!     println!("sending {} bytes", payload.len());
//!     done.complete();
//! }));
//!
//! queue.enqueue("email", &b"hello"[..]).await?;
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod store;
pub mod telemetry;

pub use queue::{
    Completion, EnqueueOutcome, Handler, JobQueue, QueueConfig, QueueError, QueueEvent,
};
pub use store::{ChangeEvent, ChangeOp, MemoryStore, Store, StoreError, WriteOp};
