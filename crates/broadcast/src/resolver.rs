//! Topic resolution
//!
//! Maps channel names to remote topic handles. A topic is created (or looked
//! up remotely) the first time its channel is seen, then served from a
//! case-insensitive cache for the lifetime of the resolver.

use crate::error::BroadcastError;
use dashmap::DashMap;
use herald_core::{ChannelName, TopicHandle, topic_name, validate_app_key};
use herald_ports::TopicService;
use log::{debug, trace, warn};
use std::sync::Arc;

/// Channel -> topic resolver with a get-or-create cache
///
/// Concurrent misses for the same channel may each call the topic service;
/// the first handle installed wins and every caller gets that one. Failed
/// lookups are never cached. Entries are never replaced or evicted.
pub struct TopicResolver {
    service: Arc<dyn TopicService>,
    app_key: String,
    /// Keyed by `ChannelName::key()`
    topics: DashMap<String, TopicHandle>,
}

impl TopicResolver {
    pub fn new(
        service: Arc<dyn TopicService>,
        app_key: impl Into<String>,
    ) -> Result<Self, BroadcastError> {
        let app_key = app_key.into();
        validate_app_key(&app_key)?;

        Ok(TopicResolver {
            service,
            app_key,
            topics: DashMap::new(),
        })
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Create or retrieve the remote topic for `channel`, bypassing the cache
    pub async fn ensure_topic(&self, channel: &ChannelName) -> Result<TopicHandle, BroadcastError> {
        let name = topic_name(&self.app_key, channel)?;
        debug!("Ensuring topic {} for channel '{}'", name, channel);

        self.service
            .create_or_retrieve_topic(&name)
            .await
            .map_err(|source| {
                warn!("Topic {} unavailable: {}", name, source);
                BroadcastError::ResourceUnavailable {
                    channel: channel.to_string(),
                    source,
                }
            })
    }

    /// Return the cached topic for `channel`, creating it on a miss
    pub async fn resolve(&self, channel: &ChannelName) -> Result<TopicHandle, BroadcastError> {
        let cached = self.cached(channel);
        if let Some(handle) = cached {
            trace!("Topic cache hit for '{}'", channel);
            return Ok(handle);
        }

        let handle = self.ensure_topic(channel).await?;

        // Another caller may have installed a handle while we were waiting
        let installed = self
            .topics
            .entry(channel.key().to_string())
            .or_insert(handle)
            .value()
            .clone();

        debug!("Topic {} cached for channel '{}'", installed, channel);
        Ok(installed)
    }

    /// Look up a cached topic without touching the backend
    pub fn cached(&self, channel: &ChannelName) -> Option<TopicHandle> {
        self.topics
            .get(channel.key())
            .map(|entry| entry.value().clone())
    }

    /// Number of cached channels
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_ports::{MessageId, TopicServiceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Hands out a fresh handle per call so races are visible
    struct CountingService {
        calls: AtomicUsize,
        failures_left: AtomicUsize,
        delay: Duration,
    }

    impl CountingService {
        fn new() -> Self {
            CountingService {
                calls: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn failing(times: usize) -> Self {
            let service = Self::new();
            service.failures_left.store(times, Ordering::SeqCst);
            service
        }

        fn slow(delay: Duration) -> Self {
            CountingService {
                delay,
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TopicService for CountingService {
        async fn create_or_retrieve_topic(
            &self,
            name: &str,
        ) -> Result<TopicHandle, TopicServiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if failing {
                return Err(TopicServiceError::Unavailable("backend down".to_string()));
            }
            Ok(TopicHandle::new(format!("{}#{}", name, n)))
        }

        async fn publish_message(
            &self,
            _topic: &TopicHandle,
            _channel: &str,
            _payload: &str,
        ) -> Result<MessageId, TopicServiceError> {
            Ok("ok".to_string())
        }
    }

    fn channel(name: &str) -> ChannelName {
        ChannelName::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_caches_handle() {
        let service = Arc::new(CountingService::new());
        let resolver = TopicResolver::new(service.clone(), "app").unwrap();

        let first = resolver.resolve(&channel("orders")).await.unwrap();
        let second = resolver.resolve(&channel("orders")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.as_str(), "app-orders#0");
        assert_eq!(service.calls(), 1);
        assert_eq!(resolver.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_is_case_insensitive() {
        let service = Arc::new(CountingService::new());
        let resolver = TopicResolver::new(service.clone(), "app").unwrap();

        let upper = resolver.resolve(&channel("Orders")).await.unwrap();
        let lower = resolver.resolve(&channel("orders")).await.unwrap();

        assert_eq!(upper, lower);
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_topic_bypasses_cache() {
        let service = Arc::new(CountingService::new());
        let resolver = TopicResolver::new(service.clone(), "app").unwrap();

        resolver.ensure_topic(&channel("orders")).await.unwrap();
        resolver.ensure_topic(&channel("orders")).await.unwrap();

        assert_eq!(service.calls(), 2);
        assert!(resolver.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let service = Arc::new(CountingService::failing(1));
        let resolver = TopicResolver::new(service.clone(), "app").unwrap();

        let err = resolver.resolve(&channel("orders")).await.unwrap_err();
        assert!(err.is_resource_unavailable());
        assert!(resolver.cached(&channel("orders")).is_none());

        let handle = resolver.resolve(&channel("orders")).await.unwrap();
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.cached(&channel("orders")), Some(handle));
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_converge() {
        let service = Arc::new(CountingService::slow(Duration::from_millis(20)));
        let resolver = Arc::new(TopicResolver::new(service.clone(), "app").unwrap());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                resolver.resolve(&channel("new-channel")).await.unwrap()
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let cached = resolver.cached(&channel("new-channel")).unwrap();
        assert!(results.iter().all(|h| *h == cached));
        assert_eq!(resolver.len(), 1);
        assert!(service.calls() >= 1);
    }

    #[test]
    fn test_invalid_app_key_rejected() {
        let service = Arc::new(CountingService::new());
        let err = TopicResolver::new(service, "").err().unwrap();
        assert!(err.is_invalid_argument());
    }
}
