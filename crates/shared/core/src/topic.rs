//! Topic handles and remote topic naming
//!
//! Remote topic names are derived from the deploying application's unique key
//! and the channel key, so applications sharing one backend never collide.

use crate::channel::ChannelName;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Longest topic name the backend accepts
pub const MAX_TOPIC_NAME_LEN: usize = 256;

/// Opaque identifier of a remote topic, immutable once obtained
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicHandle(String);

impl TopicHandle {
    pub fn new(id: impl Into<String>) -> Self {
        TopicHandle(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TopicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("application key must not be empty")]
    EmptyAppKey,

    #[error("application key contains invalid character {0:?}")]
    InvalidAppKey(char),

    #[error("topic name is {len} bytes, limit is {}", MAX_TOPIC_NAME_LEN)]
    TooLong { len: usize },
}

/// Check that an application key is usable as a topic name prefix
pub fn validate_app_key(app_key: &str) -> Result<(), NamingError> {
    if app_key.is_empty() {
        return Err(NamingError::EmptyAppKey);
    }
    match app_key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(c) => Err(NamingError::InvalidAppKey(c)),
        None => Ok(()),
    }
}

/// Derive the remote topic name for a channel: `<app_key>-<escaped key>`
///
/// Pure and deterministic. The escaping keeps ASCII alphanumerics, doubles
/// `_`, and writes every other byte (including `-`) as `_xx`. The escaped key
/// never contains `-`, so the last `-` always splits app key from channel and
/// distinct `(app_key, channel)` pairs never share a name.
pub fn topic_name(app_key: &str, channel: &ChannelName) -> Result<String, NamingError> {
    validate_app_key(app_key)?;

    let mut name = String::with_capacity(app_key.len() + 1 + channel.key().len());
    name.push_str(app_key);
    name.push('-');

    for byte in channel.key().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => name.push(byte as char),
            b'_' => name.push_str("__"),
            other => {
                name.push('_');
                name.push_str(&format!("{:02x}", other));
            }
        }
    }

    if name.len() > MAX_TOPIC_NAME_LEN {
        return Err(NamingError::TooLong { len: name.len() });
    }
    Ok(name)
}
