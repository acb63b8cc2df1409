//! Channel names
//!
//! A channel is the caller-facing name of a broadcast destination. Identity is
//! case-insensitive: `Orders` and `orders` are the same channel.

use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel name must not be empty")]
    Empty,
}

/// Validated, non-empty channel name
///
/// Keeps the caller's spelling for display and logging, while equality and
/// hashing go through the case-folded key.
#[derive(Debug, Clone)]
pub struct ChannelName {
    name: String,
    key: String,
}

impl ChannelName {
    pub fn new(name: impl Into<String>) -> Result<Self, ChannelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ChannelError::Empty);
        }
        let key = fold_case(&name);
        Ok(ChannelName { name, key })
    }

    /// The name as the caller spelled it
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Case-insensitive identity key
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Per-character case fold, independent of surrounding characters
///
/// `str::to_lowercase` maps a word-final `Σ` to `ς`, so it cannot be used as
/// an identity key. Going through uppercase first folds `ς`, `σ` and `Σ` alike.
fn fold_case(name: &str) -> String {
    name.chars()
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
        .collect()
}

impl PartialEq for ChannelName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ChannelName {}

impl Hash for ChannelName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = ChannelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ChannelName::new(value)
    }
}
