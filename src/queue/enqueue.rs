//! Enqueue operations and handler registration.

use bytes::Bytes;
use tracing::debug;

use super::codec;
use super::error::QueueError;
use super::manager::{Handler, JobQueue};
use crate::store::WriteOp;

/// Outcome of an enqueue call.
#[derive(Debug, Clone)]
pub enum EnqueueOutcome {
    /// An identical payload is already outstanding; nothing was written.
    Duplicate,
    /// The record was written to the store.
    Written,
    /// The record was prepared for an external atomic batch. The reservation
    /// is held either way; the caller is responsible for eventually applying
    /// the batch.
    Pending(WriteOp),
}

impl EnqueueOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, EnqueueOutcome::Duplicate)
    }
}

impl JobQueue {
    /// Persist a `(job_type, payload)` record, deduplicating against
    /// identical outstanding work. The matching handler runs once the
    /// dispatch delay elapses.
    pub async fn enqueue(
        &self,
        job_type: &str,
        payload: impl Into<Bytes>,
    ) -> Result<EnqueueOutcome, QueueError> {
        let payload = payload.into();
        match self.reserve_and_encode(job_type, &payload)? {
            None => Ok(EnqueueOutcome::Duplicate),
            Some(key) => {
                self.store.put(key.as_bytes(), &payload).await?;
                Ok(EnqueueOutcome::Written)
            }
        }
    }

    /// Like [`enqueue`](Self::enqueue), but instead of writing returns the
    /// pending put for the caller to fold into an external atomic batch
    /// (see [`Store::write_batch`](crate::store::Store::write_batch)).
    pub fn prepare_enqueue(
        &self,
        job_type: &str,
        payload: impl Into<Bytes>,
    ) -> Result<EnqueueOutcome, QueueError> {
        let payload = payload.into();
        match self.reserve_and_encode(job_type, &payload)? {
            None => Ok(EnqueueOutcome::Duplicate),
            Some(key) => Ok(EnqueueOutcome::Pending(WriteOp::Put {
                key: Bytes::from(key),
                value: payload,
            })),
        }
    }

    /// Register (or replace) the handler for `job_type`. Safe to call at any
    /// time; takes effect for records dispatched afterwards.
    pub fn register_handler(&self, job_type: impl Into<String>, handler: Handler) {
        self.handlers.write().insert(job_type.into(), handler);
    }

    /// Dedup check plus key computation shared by both enqueue flavors.
    /// `None` means an identical payload is already outstanding.
    fn reserve_and_encode(
        &self,
        job_type: &str,
        payload: &Bytes,
    ) -> Result<Option<String>, QueueError> {
        codec::validate_job_type(job_type)?;
        if !self.dedup.try_reserve(job_type, payload) {
            debug!(job_type = %job_type, "duplicate enqueue, payload already outstanding");
            return Ok(None);
        }
        let timestamp = self.clock.next();
        Ok(Some(codec::encode_key(
            &self.config.prefix,
            job_type,
            &timestamp,
        )))
    }
}
