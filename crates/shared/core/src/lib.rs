//! Herald Core Domain
//!
//! Pure domain types for the Herald broadcast transport.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod channel;
pub mod datagram;
pub mod topic;

pub use channel::{ChannelError, ChannelName};
pub use datagram::DataGram;
pub use topic::{MAX_TOPIC_NAME_LEN, NamingError, TopicHandle, topic_name, validate_app_key};
