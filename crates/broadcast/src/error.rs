//! Error types for the broadcast crate

use herald_core::{ChannelError, NamingError};
use herald_ports::{CodecError, TopicServiceError};
use thiserror::Error;

/// Caller-visible broadcast errors
///
/// Background publish failures are deliberately absent: they never reach
/// the caller and are only logged.
#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Topic unavailable for channel '{channel}': {source}")]
    ResourceUnavailable {
        channel: String,
        #[source]
        source: TopicServiceError,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("No tokio runtime to publish on: {0}")]
    NoRuntime(String),
}

impl From<ChannelError> for BroadcastError {
    fn from(e: ChannelError) -> Self {
        BroadcastError::InvalidArgument(e.to_string())
    }
}

impl From<NamingError> for BroadcastError {
    fn from(e: NamingError) -> Self {
        BroadcastError::InvalidArgument(e.to_string())
    }
}

impl BroadcastError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BroadcastError::InvalidArgument(_))
    }

    pub fn is_resource_unavailable(&self) -> bool {
        matches!(self, BroadcastError::ResourceUnavailable { .. })
    }
}
