use serde::{Deserialize, Serialize};

/// Message envelope handed to the codec and the topic service
///
/// Built fresh for every send. Receivers decode the envelope first, then
/// decode `message` a second time when the sender used the object overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGram {
    /// Channel as the sender spelled it
    pub channel: String,
    /// Encoded message payload
    pub message: String,
}

impl DataGram {
    pub fn new(channel: impl Into<String>, message: impl Into<String>) -> Self {
        DataGram {
            channel: channel.into(),
            message: message.into(),
        }
    }
}
