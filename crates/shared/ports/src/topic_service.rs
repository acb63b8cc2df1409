use crate::error::TopicServiceError;
use async_trait::async_trait;
use herald_core::TopicHandle;

/// Identifier the backend assigns to an accepted publish
pub type MessageId = String;

/// Port for the remote topic-based pub/sub backend
///
/// Implementations own credentials, endpoints, retries and timeouts.
/// The broadcast core only names topics and hands over payloads.
#[async_trait]
pub trait TopicService: Send + Sync {
    /// Create the topic `name`, or return the existing one
    ///
    /// Must be idempotent by name, including across process restarts.
    async fn create_or_retrieve_topic(&self, name: &str) -> Result<TopicHandle, TopicServiceError>;

    /// Publish an encoded payload to a topic
    async fn publish_message(
        &self,
        topic: &TopicHandle,
        channel: &str,
        payload: &str,
    ) -> Result<MessageId, TopicServiceError>;

    /// Get the service's name for debugging
    fn name(&self) -> &str {
        "TopicService"
    }
}
