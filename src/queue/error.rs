//! Queue error types.

use std::fmt;

use crate::store::StoreError;

/// Errors surfaced by the queue.
///
/// A duplicate enqueue is not an error (see
/// [`EnqueueOutcome::Duplicate`](super::EnqueueOutcome)), and an unregistered
/// job type is reported through the log only: the record stays in the store
/// and is retried on the next startup.
#[derive(Debug)]
pub enum QueueError {
    /// A stored key does not decode into `prefix~job-type~timestamp`.
    MalformedKey(String),
    /// Job-type names must be non-empty and free of the key separator.
    InvalidJobType(String),
    /// The underlying store failed.
    Store(StoreError),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::MalformedKey(key) => write!(f, "malformed record key: {}", key),
            QueueError::InvalidJobType(name) => write!(f, "invalid job type: {:?}", name),
            QueueError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueueError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for QueueError {
    fn from(e: StoreError) -> Self {
        QueueError::Store(e)
    }
}
