//! In-process topic service
//!
//! Keeps topics in memory and fans published messages out on a tokio
//! broadcast channel. Used for single-process deployments and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use herald_core::TopicHandle;
use herald_ports::{MessageId, TopicService, TopicServiceError};
use log::debug;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;

/// A message accepted by the in-memory service
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub message_id: MessageId,
    pub topic: TopicHandle,
    pub channel: String,
    pub payload: String,
    pub published_at: DateTime<Utc>,
}

/// Topic service backed by process memory
///
/// Keeps the most recent `history_limit` messages for inspection; older ones
/// are dropped. Subscribers see every message regardless of the limit.
pub struct InMemoryTopicService {
    /// Topic name -> handle
    topics: Arc<DashMap<String, TopicHandle>>,
    /// Every handle handed out, for publish checks
    handles: Arc<DashSet<TopicHandle>>,
    published: Arc<Mutex<VecDeque<PublishedMessage>>>,
    history_limit: usize,
    create_calls: Arc<AtomicUsize>,
    tx: broadcast::Sender<PublishedMessage>,
}

impl InMemoryTopicService {
    /// `capacity` bounds both the subscriber channel and the publish history
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);

        InMemoryTopicService {
            topics: Arc::new(DashMap::new()),
            handles: Arc::new(DashSet::new()),
            published: Arc::new(Mutex::new(VecDeque::new())),
            history_limit: capacity,
            create_calls: Arc::new(AtomicUsize::new(0)),
            tx,
        }
    }

    /// Subscribe to every message published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedMessage> {
        self.tx.subscribe()
    }

    /// Change how many recent messages `published()` keeps
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Snapshot of the most recent published messages, oldest first
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().iter().cloned().collect()
    }

    /// Number of topics that exist
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Number of create-or-retrieve calls received, including retrievals
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn handle_for(name: &str) -> TopicHandle {
        TopicHandle::new(format!("topic:{}", name))
    }
}

impl Default for InMemoryTopicService {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Clone for InMemoryTopicService {
    fn clone(&self) -> Self {
        InMemoryTopicService {
            topics: Arc::clone(&self.topics),
            handles: Arc::clone(&self.handles),
            published: Arc::clone(&self.published),
            history_limit: self.history_limit,
            create_calls: Arc::clone(&self.create_calls),
            tx: self.tx.clone(),
        }
    }
}

#[async_trait]
impl TopicService for InMemoryTopicService {
    async fn create_or_retrieve_topic(&self, name: &str) -> Result<TopicHandle, TopicServiceError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if name.is_empty() {
            return Err(TopicServiceError::CreateFailed {
                name: name.to_string(),
                reason: "empty topic name".to_string(),
            });
        }

        let handle = self
            .topics
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Created in-memory topic {}", name);
                let handle = Self::handle_for(name);
                self.handles.insert(handle.clone());
                handle
            })
            .value()
            .clone();

        Ok(handle)
    }

    async fn publish_message(
        &self,
        topic: &TopicHandle,
        channel: &str,
        payload: &str,
    ) -> Result<MessageId, TopicServiceError> {
        if !self.handles.contains(topic) {
            return Err(TopicServiceError::PublishFailed {
                topic: topic.to_string(),
                reason: "no such topic".to_string(),
            });
        }

        let message = PublishedMessage {
            message_id: Uuid::new_v4().to_string(),
            topic: topic.clone(),
            channel: channel.to_string(),
            payload: payload.to_string(),
            published_at: Utc::now(),
        };

        {
            let mut history = self.published.lock();
            while history.len() >= self.history_limit && !history.is_empty() {
                history.pop_front();
            }
            if self.history_limit > 0 {
                history.push_back(message.clone());
            }
        }
        // Ignore send errors (no subscribers)
        let _ = self.tx.send(message.clone());

        Ok(message.message_id)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let service = InMemoryTopicService::default();

        let first = service.create_or_retrieve_topic("app-orders").await.unwrap();
        let second = service.create_or_retrieve_topic("app-orders").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.as_str(), "topic:app-orders");
        assert_eq!(service.topic_count(), 1);
        assert_eq!(service.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_publish_fans_out() {
        let service = InMemoryTopicService::default();
        let mut rx = service.subscribe();
        let topic = service.create_or_retrieve_topic("app-orders").await.unwrap();

        let id = service
            .publish_message(&topic, "orders", "payload")
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message_id, id);
        assert_eq!(received.channel, "orders");
        assert_eq!(received.payload, "payload");
        assert_eq!(service.published().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_to_unknown_topic_fails() {
        let service = InMemoryTopicService::default();
        let result = service
            .publish_message(&TopicHandle::new("topic:ghost"), "ghost", "x")
            .await;

        assert!(matches!(result, Err(TopicServiceError::PublishFailed { .. })));
        assert!(service.published().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let service = InMemoryTopicService::default().with_history_limit(3);
        let mut rx = service.subscribe();
        let topic = service.create_or_retrieve_topic("app-orders").await.unwrap();

        for i in 0..5 {
            service
                .publish_message(&topic, "orders", &format!("m{}", i))
                .await
                .unwrap();
        }

        let payloads: Vec<String> = service
            .published()
            .into_iter()
            .map(|m| m.payload)
            .collect();
        assert_eq!(payloads, vec!["m2", "m3", "m4"]);

        // Subscribers are not affected by the history bound
        for i in 0..5 {
            assert_eq!(rx.recv().await.unwrap().payload, format!("m{}", i));
        }
    }

    #[tokio::test]
    async fn test_zero_history_keeps_nothing() {
        let service = InMemoryTopicService::default().with_history_limit(0);
        let topic = service.create_or_retrieve_topic("app-orders").await.unwrap();

        service.publish_message(&topic, "orders", "x").await.unwrap();
        assert!(service.published().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let service = InMemoryTopicService::default();
        let clone = service.clone();

        clone.create_or_retrieve_topic("app-a").await.unwrap();
        assert_eq!(service.topic_count(), 1);
    }
}
