//! Store change-notification listener.
//!
//! Watches the store's post-commit feed for inserts under the namespace and
//! submits each to the dispatcher. Deletes are ignored, so the dispatcher's
//! own completion deletes never re-trigger dispatch.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::codec::{self, SEPARATOR};
use super::dispatch::Submission;
use super::manager::JobQueue;
use crate::store::{ChangeEvent, ChangeOp};

impl JobQueue {
    pub(crate) fn spawn_change_listener(&self, mut changes: broadcast::Receiver<ChangeEvent>) {
        let namespace = format!("{}{}", self.config.prefix, SEPARATOR);
        let submit_tx = self.submit_tx.clone();
        tokio::spawn(async move {
            loop {
                let event = match changes.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Anything lost here is still in the store and
                        // surfaces on the next restart's recovery scan.
                        warn!(missed, "change feed lagged, records deferred to next restart");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("change feed closed, listener stopping");
                        return;
                    }
                };
                if event.op != ChangeOp::Put {
                    continue;
                }
                let key = String::from_utf8_lossy(&event.key).into_owned();
                if !key.starts_with(&namespace) {
                    continue;
                }
                match codec::decode_key(&key) {
                    Ok((job_type, timestamp)) => {
                        let _ = submit_tx.send(Submission::Record {
                            job_type,
                            timestamp,
                            payload: event.value,
                            recovered: false,
                        });
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "ignoring write with malformed key");
                    }
                }
            }
        });
    }
}
