use thiserror::Error;

/// Errors reported by a topic service backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicServiceError {
    #[error("Topic creation failed for '{name}': {reason}")]
    CreateFailed { name: String, reason: String },

    #[error("Publish to '{topic}' failed: {reason}")]
    PublishFailed { topic: String, reason: String },

    #[error("Topic service unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by a codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),
}
