//! Rating cache layer.
//!
//! Maps [`IdentityKey`]s to the last known [`RatingResult`]. Entries never
//! expire and are never evicted. Store failures on the resolution path are
//! logged and degrade to a miss (read) or a lost write (put); they are never
//! returned to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::identity::IdentityKey;
use crate::store::KeyValueStore;
use crate::types::RatingResult;

/// Persistent rating cache shared by every pipeline invocation.
#[derive(Clone)]
pub struct RatingCache {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for RatingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingCache").finish_non_exhaustive()
    }
}

impl RatingCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Get a cached rating; `None` on miss, store failure or undecodable entry.
    pub async fn get(&self, key: &IdentityKey) -> Option<RatingResult> {
        let value = match self.store.get(key.as_str()).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key = %key, "rating not in cache");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "could not read cached rating");
                return None;
            }
        };

        match serde_json::from_value::<RatingResult>(value) {
            Ok(result) => {
                debug!(key = %key, rating = %result.rating, "cache hit");
                Some(result)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cached rating is not decodable, ignoring");
                None
            }
        }
    }

    /// Store a rating. Best-effort: failures are logged and swallowed.
    pub async fn put(&self, key: &IdentityKey, result: &RatingResult) {
        let value = match serde_json::to_value(result) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %key, error = %e, "could not serialize rating");
                return;
            }
        };

        match self.store.set(key.as_str(), value).await {
            Ok(()) => debug!(key = %key, "rating cached"),
            Err(e) => warn!(key = %key, error = %e, "could not cache rating"),
        }
    }

    /// Dump every decodable entry. Used for diagnostics, so errors propagate.
    pub async fn entries(&self) -> StoreResult<Vec<(String, RatingResult)>> {
        let entries = self.store.entries().await?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(result) => Some((key, result)),
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping undecodable entry");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::identity::build_key;
    use crate::store::MemoryStore;
    use crate::types::Identity;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<Value>> {
            Err(StoreError::unavailable("disk on fire"))
        }

        async fn set(&self, _key: &str, _value: Value) -> StoreResult<()> {
            Err(StoreError::unavailable("disk on fire"))
        }

        async fn entries(&self) -> StoreResult<Vec<(String, Value)>> {
            Err(StoreError::unavailable("disk on fire"))
        }
    }

    fn key() -> IdentityKey {
        build_key(&Identity::new("Dr. Martin", "12 Rue de Paris"))
    }

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let cache = RatingCache::new(Arc::new(MemoryStore::new()));
        let result = RatingResult::scored(4.3, 27)
            .with_place_url("https://www.google.com/maps/search/Dr.%20Martin");

        cache.put(&key(), &result).await;

        assert_eq!(cache.get(&key()).await, Some(result));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = RatingCache::new(Arc::new(MemoryStore::new()));
        assert!(cache.get(&key()).await.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_a_miss() {
        let cache = RatingCache::new(Arc::new(BrokenStore));

        cache.put(&key(), &RatingResult::not_available()).await;
        assert!(cache.get(&key()).await.is_none());
        assert!(cache.entries().await.is_err());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(key().as_str(), json!({"rating": "Loading..."}))
            .await
            .unwrap();
        store
            .set("other", json!({"rating": 2.0, "reviewsCount": 1}))
            .await
            .unwrap();

        let cache = RatingCache::new(store);
        assert!(cache.get(&key()).await.is_none());

        let entries = cache.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "other");
    }

    #[tokio::test]
    async fn test_stored_json_shape() {
        let store = Arc::new(MemoryStore::new());
        let cache = RatingCache::new(store.clone());

        cache.put(&key(), &RatingResult::scored(4.3, 27)).await;

        assert_eq!(
            store.get("Dr. Martin-12 Rue de Paris").await.unwrap(),
            Some(json!({"rating": 4.3, "reviewsCount": 27}))
        );
    }
}
