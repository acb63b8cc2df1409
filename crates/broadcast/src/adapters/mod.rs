//! Topic service adapters
//!
//! Adapters implement `TopicService` against a concrete backend.

pub mod memory;

pub use memory::{InMemoryTopicService, PublishedMessage};
