use async_trait::async_trait;
use sha2::{Digest, Sha512};
use std::collections::{HashSet, VecDeque};
use tokio::sync::RwLock;

use crate::error::Result;

/// Fingerprint of a delivery, used as the replay key
///
/// Paystack events carry no stable top-level identifier, so replays are
/// detected by digesting the raw body: a replayed delivery is byte-identical
/// to the original, signature included.
pub fn body_fingerprint(raw_body: &[u8]) -> String {
    hex::encode(Sha512::digest(raw_body))
}

/// Trait for tracking already-admitted deliveries
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Check whether a delivery with this fingerprint was already admitted
    async fn is_processed(&self, fingerprint: &str) -> Result<bool>;

    /// Record a delivery as admitted
    async fn mark_processed(&self, fingerprint: String) -> Result<()>;
}

/// In-memory idempotency store with bounded retention
///
/// Retains at most `capacity` fingerprints; the oldest entry is evicted when
/// the bound is reached. A replay older than the retention window is
/// therefore re-admitted, which is the accepted tradeoff for not growing
/// without bound. Use a database-backed store if you need durable
/// deduplication across restarts.
pub struct MemoryIdempotencyStore {
    inner: RwLock<StoreInner>,
    capacity: usize,
}

struct StoreInner {
    seen: HashSet<String>,
    order: VecDeque<String>,
}

impl MemoryIdempotencyStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                seen: HashSet::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn is_processed(&self, fingerprint: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.seen.contains(fingerprint))
    }

    async fn mark_processed(&self, fingerprint: String) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.seen.contains(&fingerprint) {
            return Ok(());
        }
        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.seen.remove(&oldest);
            }
        }
        inner.order.push_back(fingerprint.clone());
        inner.seen.insert(fingerprint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_body_sensitive() {
        let body = br#"{"event":"charge.success","data":{"reference":"abc123"}}"#;
        assert_eq!(body_fingerprint(body), body_fingerprint(body));
        assert_ne!(body_fingerprint(body), body_fingerprint(b"other"));
    }

    #[tokio::test]
    async fn test_mark_and_check() {
        let store = MemoryIdempotencyStore::new(10);
        let fp = body_fingerprint(b"payload");

        assert!(!store.is_processed(&fp).await.unwrap());
        store.mark_processed(fp.clone()).await.unwrap();
        assert!(store.is_processed(&fp).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_is_idempotent() {
        let store = MemoryIdempotencyStore::new(2);
        let fp = body_fingerprint(b"payload");

        store.mark_processed(fp.clone()).await.unwrap();
        store.mark_processed(fp.clone()).await.unwrap();

        // Re-marking must not consume extra capacity
        store
            .mark_processed(body_fingerprint(b"other"))
            .await
            .unwrap();
        assert!(store.is_processed(&fp).await.unwrap());
    }

    #[tokio::test]
    async fn test_bounded_retention_evicts_oldest() {
        let store = MemoryIdempotencyStore::new(2);
        let first = body_fingerprint(b"first");
        let second = body_fingerprint(b"second");
        let third = body_fingerprint(b"third");

        store.mark_processed(first.clone()).await.unwrap();
        store.mark_processed(second.clone()).await.unwrap();
        store.mark_processed(third.clone()).await.unwrap();

        assert!(!store.is_processed(&first).await.unwrap());
        assert!(store.is_processed(&second).await.unwrap());
        assert!(store.is_processed(&third).await.unwrap());
    }
}
