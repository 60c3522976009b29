//! Ordered key-value store abstraction.
//!
//! The queue needs very little from its store: durable puts and deletes,
//! atomic batches, forward range scans in lexicographic key order, and a
//! post-commit change feed. Anything with those semantics can back a queue;
//! [`MemoryStore`] is the embedded default and the test double.

mod memory;

pub use memory::MemoryStore;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;

/// Storage error type.
#[derive(Debug)]
pub enum StoreError {
    /// Backend I/O failure.
    Io(String),
    /// The store has shut down and no longer accepts operations.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {}", e),
            StoreError::Closed => write!(f, "store is closed"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A single operation inside an atomic batch write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: Bytes, value: Bytes },
    Delete { key: Bytes },
}

/// Kind of committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Put,
    Delete,
}

/// Post-commit write notification delivered to subscribers.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub op: ChangeOp,
    pub key: Bytes,
    pub value: Bytes,
}

/// Common ordered-store interface.
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Durably insert or overwrite `key`.
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`; removing an absent key is a no-op.
    async fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Apply a sequence of writes atomically, in order.
    async fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Forward scan over `[start, end)` in lexicographic key order.
    async fn scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Bytes, Bytes)>, StoreError>;

    /// Subscribe to post-commit change notifications. Every committed put and
    /// delete is delivered to every live subscriber, in commit order.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
