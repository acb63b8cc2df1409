use crate::error::CodecError;
use serde::{Serialize, de::DeserializeOwned};

/// Port for payload serialization
///
/// Turns arbitrary values into the string form carried by the transport and
/// back. The object send path uses it twice: once for the value, once for
/// the envelope wrapping the encoded value.
pub trait Codec: Send + Sync {
    /// Encode a value into its transport form
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError>;

    /// Decode a value from its transport form
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, CodecError>;

    /// Whether `encoded` is this codec's representation of a missing value
    fn is_absent(&self, encoded: &str) -> bool {
        encoded.is_empty()
    }

    /// Get the codec's name for debugging
    fn name(&self) -> &str {
        "Codec"
    }
}
