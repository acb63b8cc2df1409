//! JSON codec

use herald_core::DataGram;
use herald_ports::{Codec, CodecError};
use serde::{Serialize, de::DeserializeOwned};

/// Codec producing compact JSON strings
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        JsonCodec
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, CodecError> {
        serde_json::from_str(data).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn is_absent(&self, encoded: &str) -> bool {
        let trimmed = encoded.trim();
        trimmed.is_empty() || trimmed == "null"
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// First receive stage: unwrap the envelope from a transport payload
///
/// Payloads sent with `send_object` need a second `decode` of
/// `DataGram::message` to recover the original value.
pub fn decode_datagram<C: Codec>(codec: &C, payload: &str) -> Result<DataGram, CodecError> {
    codec.decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Tick {
        symbol: String,
        price: u64,
    }

    #[test]
    fn test_absent_values() {
        let codec = JsonCodec::new();
        assert!(codec.is_absent(&codec.encode(&None::<Tick>).unwrap()));
        assert!(codec.is_absent(&codec.encode(&()).unwrap()));
        assert!(!codec.is_absent(&codec.encode("").unwrap()));
        assert!(!codec.is_absent(&codec.encode(&0).unwrap()));
    }

    #[test]
    fn test_two_stage_decode() {
        let codec = JsonCodec::new();
        let tick = Tick {
            symbol: "BTC-USD".to_string(),
            price: 42_000,
        };

        let inner = codec.encode(&tick).unwrap();
        let outer = codec.encode(&DataGram::new("ticks", inner.clone())).unwrap();

        let gram = decode_datagram(&codec, &outer).unwrap();
        assert_eq!(gram.channel, "ticks");
        assert_eq!(gram.message, inner);

        let decoded: Tick = codec.decode(&gram.message).unwrap();
        assert_eq!(decoded, tick);
    }

    #[test]
    fn test_decode_error() {
        let codec = JsonCodec::new();
        let result: Result<Tick, _> = codec.decode("not json");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}
