use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::paths::JSON_SUFFIX;

/// Failure to encode or decode an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CodecError(pub String);

/// Converts between a typed resource and its stored byte form.
pub trait Codec<R>: Send + Sync {
    /// File suffix of encoded objects, including the dot.
    fn suffix(&self) -> &str {
        JSON_SUFFIX
    }

    fn encode(&self, object: &R) -> Result<Bytes, CodecError>;

    fn decode(&self, data: &[u8]) -> Result<R, CodecError>;
}

/// Self-describing JSON via `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl<R> Codec<R> for JsonCodec
where
    R: Serialize + DeserializeOwned,
{
    fn encode(&self, object: &R) -> Result<Bytes, CodecError> {
        serde_json::to_vec(object)
            .map(Bytes::from)
            .map_err(|e| CodecError(e.to_string()))
    }

    fn decode(&self, data: &[u8]) -> Result<R, CodecError> {
        serde_json::from_slice(data).map_err(|e| CodecError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use jsonblob_types::Machine;

    use super::*;

    #[test]
    fn json_codec_preserves_machine() {
        let machine = Machine::new("m1");
        let bytes = JsonCodec.encode(&machine).unwrap();
        let back: Machine = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(back, machine);
        assert_eq!(Codec::<Machine>::suffix(&JsonCodec), ".json");
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = Codec::<Machine>::decode(&JsonCodec, b"{not json").unwrap_err();
        assert!(!err.0.is_empty());
    }
}
