//! Rating resolution.
//!
//! Resolves an identity to a rating with the following priority:
//! 1. Cache (any stored entry, fallbacks included; never revalidated)
//! 2. Provider (one call per miss), persisted before returning
//! 3. Fallback (`"N/A"` + map search on the name) when the provider fails
//!
//! `resolve` never fails. There is no de-duplication across concurrent calls
//! for the same identity: each runs its own cache-then-fetch sequence and the
//! last write wins.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::RatingCache;
use crate::config::RatingConfig;
use crate::error::{ResolutionError, ResolutionResult, StoreResult};
use crate::identity::{build_key, IdentityKey};
use crate::provider::{HttpRatingProvider, RatingProvider};
use crate::store::{FileStore, KeyValueStore};
use crate::types::{Identity, RatingResult};

/// Where a resolved rating came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveSource {
    /// Served from the rating cache.
    Cache,

    /// Fetched from the provider and cached.
    Provider,

    /// Provider failed; the fallback was served and cached.
    Fallback(ResolutionError),
}

impl ResolveSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl std::fmt::Display for ResolveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Provider => write!(f, "provider"),
            Self::Fallback(e) => write!(f, "fallback:{}", e.kind()),
        }
    }
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub key: IdentityKey,
    pub result: RatingResult,
    pub source: ResolveSource,
}

/// Cache-first rating resolution pipeline.
pub struct RatingPipeline {
    provider: Arc<dyn RatingProvider>,
    cache: RatingCache,
}

impl RatingPipeline {
    /// Create a pipeline from custom components.
    pub fn new(provider: Arc<dyn RatingProvider>, cache: RatingCache) -> Self {
        Self { provider, cache }
    }

    /// Create a pipeline with the HTTP provider and a file-backed store.
    pub fn from_config(config: &RatingConfig) -> ResolutionResult<Self> {
        let provider = HttpRatingProvider::new(config)?;
        let store: Arc<dyn KeyValueStore> = match &config.store_path {
            Some(path) => Arc::new(FileStore::with_path(path)),
            None => Arc::new(FileStore::new().map_err(|e| ResolutionError::Config {
                message: e.to_string(),
            })?),
        };

        Ok(Self::new(Arc::new(provider), RatingCache::new(store)))
    }

    /// Resolve an identity to a rating. Never fails.
    pub async fn resolve(&self, identity: &Identity) -> RatingResult {
        self.resolve_detailed(identity).await.result
    }

    /// Resolve an identity and report where the rating came from.
    pub async fn resolve_detailed(&self, identity: &Identity) -> Resolution {
        let key = build_key(identity);
        debug!(key = %key, "resolving rating");

        if let Some(result) = self.cache.get(&key).await {
            info!(key = %key, rating = %result.rating, "using cached rating");
            return Resolution {
                key,
                result,
                source: ResolveSource::Cache,
            };
        }

        let (result, source) = match self.provider.fetch(identity).await {
            Ok(result) => (result, ResolveSource::Provider),
            Err(e) => {
                warn!(key = %key, error = %e, "rating fetch failed, serving fallback");
                (RatingResult::fallback(identity), ResolveSource::Fallback(e))
            }
        };

        // Fallbacks are cached too: a failed lookup stays failed until overwritten.
        self.cache.put(&key, &result).await;

        info!(key = %key, rating = %result.rating, source = %source, "resolved rating");
        Resolution {
            key,
            result,
            source,
        }
    }

    /// Dump the cache for diagnostics.
    pub async fn cached_entries(&self) -> StoreResult<Vec<(String, RatingResult)>> {
        self.cache.entries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        outcome: ResolutionResult<RatingResult>,
    }

    impl CountingProvider {
        fn new(outcome: ResolutionResult<RatingResult>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RatingProvider for CountingProvider {
        async fn fetch(&self, _identity: &Identity) -> ResolutionResult<RatingResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    /// Store whose reads and/or writes always fail.
    struct FailingStore {
        inner: MemoryStore,
        fail_get: bool,
        fail_set: bool,
    }

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
            if self.fail_get {
                return Err(StoreError::unavailable("read failed"));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
            if self.fail_set {
                return Err(StoreError::unavailable("write failed"));
            }
            self.inner.set(key, value).await
        }

        async fn entries(&self) -> StoreResult<Vec<(String, Value)>> {
            self.inner.entries().await
        }
    }

    fn failing(fail_get: bool, fail_set: bool) -> RatingCache {
        RatingCache::new(Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_get,
            fail_set,
        }))
    }

    fn martin() -> Identity {
        Identity::new("Dr. Martin", "12 Rue de Paris")
    }

    fn pipeline(provider: Arc<CountingProvider>) -> RatingPipeline {
        RatingPipeline::new(provider, RatingCache::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_miss_fetches_once_then_hits() {
        let provider = CountingProvider::new(Ok(RatingResult::scored(4.3, 27)));
        let pipeline = pipeline(provider.clone());

        let first = pipeline.resolve_detailed(&martin()).await;
        assert_eq!(first.source, ResolveSource::Provider);
        assert_eq!(provider.calls(), 1);

        let second = pipeline.resolve_detailed(&martin()).await;
        assert_eq!(second.source, ResolveSource::Cache);
        assert_eq!(second.result, first.result);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_serves_and_caches_fallback() {
        let provider = CountingProvider::new(Err(ResolutionError::UpstreamUnavailable {
            message: "connection refused".into(),
        }));
        let pipeline = pipeline(provider.clone());

        let first = pipeline.resolve_detailed(&martin()).await;
        assert!(first.source.is_fallback());
        assert_eq!(first.result, RatingResult::fallback(&martin()));

        // Sticky: no retry on the next resolve.
        let second = pipeline.resolve_detailed(&martin()).await;
        assert_eq!(second.source, ResolveSource::Cache);
        assert_eq!(second.result, first.result);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_error_kind() {
        let provider = CountingProvider::new(Err(ResolutionError::MalformedResponse {
            message: "expected value".into(),
        }));
        let pipeline = pipeline(provider);

        let resolution = pipeline.resolve_detailed(&martin()).await;
        match resolution.source {
            ResolveSource::Fallback(ResolutionError::MalformedResponse { .. }) => {}
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_distinct_identities_do_not_share_entries() {
        let provider = CountingProvider::new(Ok(RatingResult::scored(4.0, 3)));
        let pipeline = pipeline(provider.clone());

        pipeline.resolve(&martin()).await;
        pipeline
            .resolve(&Identity::new("Dr. Martin", "12 rue de Paris"))
            .await;

        assert_eq!(provider.calls(), 2);
        assert_eq!(pipeline.cached_entries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_does_not_change_result() {
        let provider = CountingProvider::new(Ok(RatingResult::scored(4.3, 27)));
        let pipeline = RatingPipeline::new(provider.clone(), failing(true, true));

        let resolution = pipeline.resolve_detailed(&martin()).await;

        assert_eq!(resolution.source, ResolveSource::Provider);
        assert_eq!(resolution.result, RatingResult::scored(4.3, 27));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_still_returns_provider_result() {
        let provider = CountingProvider::new(Ok(RatingResult::scored(4.3, 27)));
        let pipeline = RatingPipeline::new(provider.clone(), failing(false, true));

        let first = pipeline.resolve_detailed(&martin()).await;
        assert_eq!(first.source, ResolveSource::Provider);
        assert_eq!(first.result, RatingResult::scored(4.3, 27));

        // Nothing was persisted, so the next resolve fetches again.
        let second = pipeline.resolve_detailed(&martin()).await;
        assert_eq!(second.source, ResolveSource::Provider);
        assert_eq!(second.result, first.result);
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_resolve_source_display() {
        assert_eq!(ResolveSource::Cache.to_string(), "cache");
        assert_eq!(ResolveSource::Provider.to_string(), "provider");
        assert_eq!(
            ResolveSource::Fallback(ResolutionError::UpstreamUnavailable {
                message: "x".into()
            })
            .to_string(),
            "fallback:upstream_unavailable"
        );
    }
}
