//! Registry of outstanding enqueues, keyed by payload content.
//!
//! A reservation is taken at enqueue and lifted when the dispatch timer
//! fires, so identical payloads collapse into one persisted record while the
//! first is still waiting, and become enqueueable again as soon as its
//! handler has started (not when it finishes). Reservations live in memory
//! only; after a restart, outstanding work is re-read from the store instead.

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use super::clock::wall_clock_ms;

type ContentHash = [u8; 32];

pub(crate) struct DedupRegistry {
    /// Digest of `job-type:payload` mapped to the enqueue wall-clock time.
    /// The time is diagnostic only.
    reservations: DashMap<ContentHash, u64>,
}

impl DedupRegistry {
    pub(crate) fn new() -> Self {
        Self {
            reservations: DashMap::new(),
        }
    }

    fn content_hash(job_type: &str, payload: &[u8]) -> ContentHash {
        let mut hasher = Sha256::new();
        hasher.update(job_type.as_bytes());
        hasher.update(b":");
        hasher.update(payload);
        hasher.finalize().into()
    }

    /// Reserve `(job_type, payload)`; returns false when an identical
    /// reservation is already outstanding.
    pub(crate) fn try_reserve(&self, job_type: &str, payload: &[u8]) -> bool {
        use dashmap::mapref::entry::Entry;
        match self
            .reservations
            .entry(Self::content_hash(job_type, payload))
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(wall_clock_ms());
                true
            }
        }
    }

    /// Drop the reservation; releasing an absent key is a no-op.
    pub(crate) fn release(&self, job_type: &str, payload: &[u8]) {
        self.reservations
            .remove(&Self::content_hash(job_type, payload));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.reservations.len()
    }
}
