//! Broadcast dispatcher
//!
//! Public send surface. Validates input, resolves the channel's topic,
//! encodes the envelope and hands the publish to a background task.

use crate::config::{AccountSettings, BroadcastConfig};
use crate::error::BroadcastError;
use crate::resolver::TopicResolver;
use herald_core::{ChannelName, DataGram, TopicHandle};
use herald_ports::{Codec, TopicService};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Fire-and-forget broadcaster over a remote topic service
///
/// Sends suspend only while a channel's topic is first resolved. The publish
/// itself runs on a spawned tokio task that nobody joins: its outcome is
/// logged (when `log_failures` is set) and never returned to the sender.
/// Publishes run on the tokio runtime captured at construction, so sends may
/// be polled from any executor.
pub struct BroadcastDispatcher<C: Codec> {
    resolver: TopicResolver,
    service: Arc<dyn TopicService>,
    codec: C,
    runtime: Handle,
    log_failures: bool,
}

impl<C: Codec> BroadcastDispatcher<C> {
    /// Create a dispatcher publishing on the current tokio runtime
    ///
    /// Fails with `NoRuntime` when called outside one; use `with_runtime`
    /// to pass a handle explicitly.
    pub fn new(
        service: Arc<dyn TopicService>,
        codec: C,
        app_key: impl Into<String>,
    ) -> Result<Self, BroadcastError> {
        let runtime =
            Handle::try_current().map_err(|e| BroadcastError::NoRuntime(e.to_string()))?;
        Self::with_runtime(service, codec, app_key, runtime)
    }

    /// Create a dispatcher publishing on the given tokio runtime
    pub fn with_runtime(
        service: Arc<dyn TopicService>,
        codec: C,
        app_key: impl Into<String>,
        runtime: Handle,
    ) -> Result<Self, BroadcastError> {
        let resolver = TopicResolver::new(Arc::clone(&service), app_key)?;

        Ok(BroadcastDispatcher {
            resolver,
            service,
            codec,
            runtime,
            log_failures: true,
        })
    }

    pub fn from_config(
        service: Arc<dyn TopicService>,
        codec: C,
        config: &BroadcastConfig,
    ) -> Result<Self, BroadcastError> {
        let mut dispatcher = Self::new(service, codec, config.unique_app_key.clone())?;
        dispatcher.log_failures = config.publish.log_failures;
        Ok(dispatcher)
    }

    /// Build the topic service from the config's account settings, then the dispatcher
    ///
    /// `connect` receives the backend credentials; the dispatcher itself never
    /// reads them.
    pub fn connect<F>(
        config: &BroadcastConfig,
        codec: C,
        connect: F,
    ) -> Result<Self, BroadcastError>
    where
        F: FnOnce(&AccountSettings) -> Arc<dyn TopicService>,
    {
        let service = connect(&config.account);
        debug!(
            "Connected topic service {} for app {}",
            service.name(),
            config.unique_app_key
        );
        Self::from_config(service, codec, config)
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Create or retrieve the topic for `channel_name` and return its handle
    ///
    /// Goes straight to the topic service and does not touch the cache, so it
    /// can pre-provision topics without affecting later sends.
    pub async fn create_channel(&self, channel_name: &str) -> Result<TopicHandle, BroadcastError> {
        let channel = ChannelName::new(channel_name)?;
        self.resolver.ensure_topic(&channel).await
    }

    /// Broadcast a pre-encoded string message
    pub async fn send_to_channel(&self, channel: &str, message: &str) -> Result<(), BroadcastError> {
        let channel = ChannelName::new(channel)?;
        if message.is_empty() {
            return Err(BroadcastError::InvalidArgument(
                "message must not be empty".to_string(),
            ));
        }

        let topic = self.resolver.resolve(&channel).await?;
        let data = self.codec.encode(&DataGram::new(channel.as_str(), message))?;

        self.submit(topic, channel.as_str().to_string(), data);
        Ok(())
    }

    /// Broadcast any serializable value
    ///
    /// The value is encoded once into a string, which then travels as the
    /// envelope's message and is encoded again with it. Values the codec
    /// reports as absent (`None`, `()`) are rejected.
    pub async fn send_object<T>(&self, channel: &str, message: &T) -> Result<(), BroadcastError>
    where
        T: Serialize + ?Sized,
    {
        ChannelName::new(channel)?;

        let encoded = self.codec.encode(message)?;
        if self.codec.is_absent(&encoded) {
            return Err(BroadcastError::InvalidArgument(
                "message must not be null".to_string(),
            ));
        }

        self.send_to_channel(channel, &encoded).await
    }

    /// Cached topic for a channel, if it has been resolved by a send
    pub fn cached_topic(&self, channel: &str) -> Option<TopicHandle> {
        let channel = ChannelName::new(channel).ok()?;
        self.resolver.cached(&channel)
    }

    /// Number of channels with a cached topic
    pub fn cached_topics(&self) -> usize {
        self.resolver.len()
    }

    fn submit(&self, topic: TopicHandle, channel: String, payload: String) {
        let service = Arc::clone(&self.service);
        let log_failures = self.log_failures;

        // Detached: the caller never waits on or observes the result
        self.runtime.spawn(async move {
            match service.publish_message(&topic, &channel, &payload).await {
                Ok(message_id) => {
                    debug!("Published {} to {} ({})", message_id, topic, channel);
                }
                Err(e) if log_failures => {
                    warn!("Background publish to {} failed: {}", topic, e);
                }
                Err(_) => {}
            }
        });
    }
}
