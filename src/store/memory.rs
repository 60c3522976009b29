//! In-memory ordered store backed by a `BTreeMap`.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::{ChangeEvent, ChangeOp, Store, StoreError, WriteOp};

const CHANGE_CHANNEL_CAPACITY: usize = 1024;

/// Ordered in-memory store with a post-commit change feed.
///
/// Not durable across processes; it exists as the embedded default backend
/// and as the test double for the `Store` trait.
pub struct MemoryStore {
    map: RwLock<BTreeMap<Vec<u8>, Bytes>>,
    change_tx: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            map: RwLock::new(BTreeMap::new()),
            change_tx,
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    fn notify(&self, event: ChangeEvent) {
        // Nobody listening is fine; events are fire-and-forget.
        let _ = self.change_tx.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let value = Bytes::copy_from_slice(value);
        self.map.write().insert(key.to_vec(), value.clone());
        self.notify(ChangeEvent {
            op: ChangeOp::Put,
            key: Bytes::copy_from_slice(key),
            value,
        });
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let removed = self.map.write().remove(key);
        if let Some(value) = removed {
            self.notify(ChangeEvent {
                op: ChangeOp::Delete,
                key: Bytes::copy_from_slice(key),
                value,
            });
        }
        Ok(())
    }

    async fn write_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut events = Vec::with_capacity(ops.len());
        {
            let mut map = self.map.write();
            for op in ops {
                match op {
                    WriteOp::Put { key, value } => {
                        map.insert(key.to_vec(), value.clone());
                        events.push(ChangeEvent {
                            op: ChangeOp::Put,
                            key,
                            value,
                        });
                    }
                    WriteOp::Delete { key } => {
                        if let Some(value) = map.remove(key.as_ref()) {
                            events.push(ChangeEvent {
                                op: ChangeOp::Delete,
                                key,
                                value,
                            });
                        }
                    }
                }
            }
        }
        // Notifications go out after the whole batch is visible.
        for event in events {
            self.notify(event);
        }
        Ok(())
    }

    async fn scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Bytes, Bytes)>, StoreError> {
        let map = self.map.read();
        Ok(map
            .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(k, v)| (Bytes::copy_from_slice(k), v.clone()))
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.change_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_is_ordered_and_end_exclusive() {
        let store = MemoryStore::new();
        store.put(b"b", b"2").await.unwrap();
        store.put(b"a", b"1").await.unwrap();
        store.put(b"c", b"3").await.unwrap();

        let pairs = store.scan(b"a", b"c").await.unwrap();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_ref().to_vec()).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[tokio::test]
    async fn test_put_notifies_subscribers() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.put(b"k", b"v").await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.op, ChangeOp::Put);
        assert_eq!(event.key.as_ref(), b"k");
        assert_eq!(event.value.as_ref(), b"v");
    }

    #[tokio::test]
    async fn test_delete_notifies_only_when_present() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.delete(b"missing").await.unwrap();
        store.put(b"k", b"v").await.unwrap();
        store.delete(b"k").await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.op, ChangeOp::Put);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.op, ChangeOp::Delete);
        assert_eq!(second.key.as_ref(), b"k");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_write_batch_applies_all_then_notifies() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store
            .write_batch(vec![
                WriteOp::Put {
                    key: Bytes::from_static(b"x"),
                    value: Bytes::from_static(b"1"),
                },
                WriteOp::Put {
                    key: Bytes::from_static(b"y"),
                    value: Bytes::from_static(b"2"),
                },
                WriteOp::Delete {
                    key: Bytes::from_static(b"x"),
                },
            ])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let ops: Vec<ChangeOp> = vec![
            rx.recv().await.unwrap().op,
            rx.recv().await.unwrap().op,
            rx.recv().await.unwrap().op,
        ];
        assert_eq!(ops, vec![ChangeOp::Put, ChangeOp::Put, ChangeOp::Delete]);
    }
}
