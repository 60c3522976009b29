//! Durable job queue core.
//!
//! ## Module Organization
//!
//! - `manager.rs` - JobQueue struct, configuration, constructors, lifecycle
//! - `codec.rs` - record key encoding/decoding and scan range bounds
//! - `clock.rs` - monotonic, lexicographically sortable timestamps
//! - `dedup.rs` - content-hash registry of outstanding enqueues
//! - `enqueue.rs` - enqueue, prepare_enqueue, register_handler
//! - `recovery.rs` - startup scan of records left by a previous run
//! - `listener.rs` - store change-notification listener
//! - `dispatch.rs` - scheduling, handler invocation, completion, drain
//! - `events.rs` - lifecycle event fan-out (global + per-job-type)

mod clock;
mod codec;
mod dedup;
mod dispatch;
mod enqueue;
mod error;
mod events;
mod listener;
mod manager;
mod recovery;

#[cfg(test)]
mod tests;

pub use dispatch::Completion;
pub use enqueue::EnqueueOutcome;
pub use error::QueueError;
pub use events::QueueEvent;
pub use manager::{Handler, JobQueue, QueueConfig};
