//! Herald Ports
//!
//! Port definitions (traits) for the Herald broadcast transport.
//! These define the boundaries between the broadcast core and the remote
//! pub/sub backend or serialization format it runs against.

mod codec;
mod error;
mod topic_service;

pub use codec::Codec;
pub use error::{CodecError, TopicServiceError};
pub use topic_service::{MessageId, TopicService};
