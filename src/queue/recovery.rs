//! Startup recovery scan.
//!
//! Replays records left in the store by a previous run (crash or shutdown
//! before completion). Runs once inside `start`, before the change listener
//! spawns. Found records are submitted with `recovered = true` and without a
//! dedup reservation, since none was ever taken for them in this process.

use tracing::{info, warn};

use super::codec;
use super::dispatch::Submission;
use super::error::QueueError;
use super::manager::JobQueue;

impl JobQueue {
    pub(crate) async fn recover(&self) -> Result<(), QueueError> {
        let (start, end) = codec::scan_range(&self.config.prefix);
        let records = self.store.scan(start.as_bytes(), end.as_bytes()).await?;

        let mut backlog = 0usize;
        for (key, value) in records {
            let key = String::from_utf8_lossy(&key);
            match codec::decode_key(&key) {
                Ok((job_type, timestamp)) => {
                    backlog += 1;
                    let _ = self.submit_tx.send(Submission::Record {
                        job_type,
                        timestamp,
                        payload: value,
                        recovered: true,
                    });
                }
                Err(e) => {
                    // Skip and keep going; the bad key stays in the store.
                    warn!(key = %key, error = %e, "skipping malformed record key");
                }
            }
        }

        if backlog > 0 {
            info!(count = backlog, "recovered unfinished records");
        }
        let _ = self.submit_tx.send(Submission::RecoveryDone {
            backlog: backlog > 0,
        });
        Ok(())
    }
}
