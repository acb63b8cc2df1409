//! Herald Broadcast
//!
//! Broadcast half of the Herald cross-process transport. Provides:
//! - Topic resolution (channel name -> remote topic, created on first use and cached)
//! - Fire-and-forget publishing through a pluggable `TopicService`
//! - A JSON codec and an in-memory topic service for single-process use
//!
//! ## Architecture
//!
//! ```text
//!   send_to_channel(channel, message)
//!         │
//!    ┌────▼─────┐   miss    ┌──────────────┐
//!    │ Resolver ├──────────►│ TopicService │ create_or_retrieve_topic
//!    └────┬─────┘           └──────▲───────┘
//!         │ TopicHandle            │
//!    ┌────▼─────┐  runtime.spawn   │
//!    │  Codec   ├──────────────────┘ publish_message (not joined)
//!    └──────────┘
//! ```
//!
//! Resolution errors reach the caller. Publish errors happen after the caller
//! has returned and only show up in the log.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod resolver;

// Re-export commonly used types
pub use adapters::{InMemoryTopicService, PublishedMessage};
pub use codec::{JsonCodec, decode_datagram};
pub use config::{AccountSettings, BroadcastConfig, ConfigError, PublishSettings};
pub use dispatcher::BroadcastDispatcher;
pub use error::BroadcastError;
pub use resolver::TopicResolver;

pub use herald_core::{ChannelName, DataGram, TopicHandle};
pub use herald_ports::{Codec, CodecError, MessageId, TopicService, TopicServiceError};
